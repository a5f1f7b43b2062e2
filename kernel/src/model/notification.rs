use crate::model::{id::SlotId, reservation::Reservation};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum NotificationKind {
    ReservationCreated,
    SlotFreed,
}

/// Webhook に送る内容。シリアライズ結果がそのまま POST の本文になる
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    ReservationCreated(ReservationCreated),
    SlotFreed(SlotFreed),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreated {
    pub car_number: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub slot_id: SlotId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFreed {
    pub full_name: String,
    pub email: String,
}

impl Notification {
    pub fn reservation_created(reservation: &Reservation) -> Self {
        Self::ReservationCreated(ReservationCreated {
            car_number: reservation.car_number.clone(),
            full_name: reservation.full_name.clone(),
            email: reservation.email.clone(),
            password: reservation.password.clone(),
            slot_id: reservation.slot_id,
        })
    }

    // 解放前の利用者の名前とメールアドレスだけを送る
    pub fn slot_freed(former: &Reservation) -> Self {
        Self::SlotFreed(SlotFreed {
            full_name: former.full_name.clone(),
            email: former.email.clone(),
        })
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::ReservationCreated(_) => NotificationKind::ReservationCreated,
            Notification::SlotFreed(_) => NotificationKind::SlotFreed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reservation() -> Reservation {
        Reservation {
            full_name: "John Smith".into(),
            car_number: "1234567".into(),
            email: "john@example.com".into(),
            password: "Xy12ab9Z".into(),
            slot_id: SlotId::new(1),
        }
    }

    #[test]
    fn reservation_created_payload_carries_full_record() {
        let n = Notification::reservation_created(&reservation());
        assert_eq!(n.kind().to_string(), "reservation-created");
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({
                "carNumber": "1234567",
                "fullName": "John Smith",
                "email": "john@example.com",
                "password": "Xy12ab9Z",
                "slotId": 1
            })
        );
    }

    #[test]
    fn slot_freed_payload_has_only_identity() {
        let n = Notification::slot_freed(&reservation());
        let kind: &'static str = n.kind().into();
        assert_eq!(kind, "slot-freed");
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "fullName": "John Smith", "email": "john@example.com" })
        );
    }
}

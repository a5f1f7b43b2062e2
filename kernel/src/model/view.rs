use crate::model::{
    id::SlotId,
    ledger::Ledger,
    occupancy::Discrepancy,
    sensor::SensorReading,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

// 利用者画面。予約済みスペースには車両番号だけを出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub slots: Vec<UserSlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSlotView {
    pub slot_id: SlotId,
    pub reserved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_number: Option<String>,
}

impl UserView {
    pub fn render(ledger: &Ledger) -> Self {
        let slots = ledger
            .iter()
            .map(|(slot_id, occupant)| UserSlotView {
                slot_id,
                reserved: occupant.is_some(),
                car_number: occupant.map(|r| r.car_number.clone()),
            })
            .collect();
        Self { slots }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorState {
    Occupied,
    Free,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupant {
    pub full_name: String,
    pub car_number: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSlotView {
    pub slot_id: SlotId,
    // None は空き
    pub occupant: Option<Occupant>,
    pub sensor: Option<SensorState>,
}

/// 管理者画面。台帳（正）とセンサー値（参考）を並べ、食い違いも載せる
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub slots: Vec<AdminSlotView>,
    pub sensor_observed_at: Option<DateTime<Utc>>,
    pub discrepancies: Vec<Discrepancy>,
}

impl AdminView {
    pub fn render(
        ledger: &Ledger,
        reading: Option<&SensorReading>,
        discrepancies: Vec<Discrepancy>,
    ) -> Self {
        let slots = ledger
            .iter()
            .map(|(slot_id, occupant)| AdminSlotView {
                slot_id,
                occupant: occupant.map(|r| Occupant {
                    full_name: r.full_name.clone(),
                    car_number: r.car_number.clone(),
                    email: r.email.clone(),
                }),
                sensor: reading
                    .and_then(|r| r.snapshot.is_occupied(slot_id))
                    .map(|occupied| {
                        if occupied {
                            SensorState::Occupied
                        } else {
                            SensorState::Free
                        }
                    }),
            })
            .collect();
        Self {
            slots,
            sensor_observed_at: reading.map(|r| r.observed_at),
            discrepancies,
        }
    }
}

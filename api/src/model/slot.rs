use kernel::model::{id::SlotId, reservation::Reservation, view::Occupant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub slot_id: SlotId,
    pub available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreeSlotQuery {
    // 管理画面の確認ダイアログで OK が押された場合のみ true
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreedSlotResponse {
    pub slot_id: SlotId,
    pub former_occupant: Occupant,
}

impl From<Reservation> for FreedSlotResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            full_name,
            car_number,
            email,
            slot_id,
            ..
        } = value;
        Self {
            slot_id,
            former_occupant: Occupant {
                full_name,
                car_number,
                email,
            },
        }
    }
}

use crate::model::id::SlotId;
use serde::{Deserialize, Serialize};

pub mod event;

// 1 台分の予約。localStorage 互換のキー名で保存する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub full_name: String,
    pub car_number: String,
    pub email: String,
    pub password: String,
    pub slot_id: SlotId,
}

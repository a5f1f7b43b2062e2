use crate::model::{id::SlotId, occupancy::Discrepancy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /getSensorStatus` の応答。i 番目がスペース i + 1 の在車状態で、
/// 表示用の参考値として扱い台帳には書き戻さない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancySnapshot(Vec<bool>);

impl OccupancySnapshot {
    pub fn new(states: Vec<bool>) -> Self {
        Self(states)
    }

    pub fn is_occupied(&self, slot_id: SlotId) -> Option<bool> {
        slot_id.index().and_then(|i| self.0.get(i)).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub snapshot: OccupancySnapshot,
    pub observed_at: DateTime<Utc>,
}

// 最新のセンサー値と、続いている食い違い。ビューはこれを購読する
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorStatus {
    pub reading: Option<SensorReading>,
    pub discrepancies: Vec<Discrepancy>,
}

/// `GET /freeSlotCheck` の応答。車が出ていったスペースがあれば `{"slotId": n}`、
/// 無ければ `{}` が返る。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FreeSlotCheck {
    #[serde(default, rename = "slotId")]
    slot_id: Option<Value>,
}

impl FreeSlotCheck {
    // 0, "", null, false などの偽値はイベント無しとみなす
    pub fn event(&self) -> Option<SlotId> {
        let raw = match self.slot_id.as_ref()? {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        match u8::try_from(raw) {
            Ok(0) | Err(_) => None,
            Ok(id) => Some(SlotId::new(id)),
        }
    }
}

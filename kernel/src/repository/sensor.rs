use crate::model::{id::SlotId, sensor::OccupancySnapshot};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait SensorRepository: Send + Sync {
    // 在車状態（スペース順の bool 配列）を取得する
    async fn sensor_status(&self) -> AppResult<OccupancySnapshot>;
    // 車が出ていったスペースがあれば返す
    async fn free_slot_check(&self) -> AppResult<Option<SlotId>>;
    // ゲートを開ける
    async fn open_gate(&self) -> AppResult<()>;
}

use crate::model::{
    id::SlotId,
    ledger::{Ledger, LedgerChange},
    reservation::{event::CreateReservation, Reservation},
};
use async_trait::async_trait;
use shared::error::AppResult;
use tokio::sync::broadcast;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 現在の台帳を取得する
    async fn find_ledger(&self) -> AppResult<Ledger>;
    // スペースが空いているか
    async fn is_available(&self, slot_id: SlotId) -> AppResult<bool>;
    // 予約操作を行う。保存した予約（パスワード付き）を返す
    async fn reserve(&self, event: CreateReservation) -> AppResult<Reservation>;
    // 管理者による解放。取り除いた予約を返す
    async fn free(&self, slot_id: SlotId) -> AppResult<Reservation>;
    // センサーによる解放。すでに空なら何もせず None を返す
    async fn release_by_sensor(&self, slot_id: SlotId) -> AppResult<Option<Reservation>>;
    // 台帳の変更通知を購読する
    fn subscribe(&self) -> broadcast::Receiver<LedgerChange>;
}

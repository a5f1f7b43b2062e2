use async_trait::async_trait;
use kernel::model::{
    id::SlotId,
    ledger::{FreedBy, Ledger, LedgerChange},
    password::generate_password,
    reservation::{event::CreateReservation, Reservation},
};
use kernel::repository::{ledger::LedgerRepository, reservation::ReservationRepository};
use shared::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// 予約台帳の操作を行う。
///
/// 変更はすべて「台帳全体を読む → 変更 → 保存」を 1 つのロックの中で行う。
/// 重複チェックと書き込みが同じロック内にあるので、センサーからの解放が
/// 同じスペースに 2 回届いても 2 回目は空のスペースを見て何もしない。
pub struct ReservationRepositoryImpl {
    ledger: Arc<dyn LedgerRepository>,
    password_length: usize,
    lock: Mutex<()>,
    changes: broadcast::Sender<LedgerChange>,
}

impl ReservationRepositoryImpl {
    pub fn new(ledger: Arc<dyn LedgerRepository>, password_length: usize) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            ledger,
            password_length,
            lock: Mutex::new(()),
            changes,
        }
    }

    // 保存が成功してから変更を通知する
    async fn commit(&self, ledger: &Ledger, change: LedgerChange) -> AppResult<()> {
        self.ledger.store(ledger).await?;
        match &change {
            LedgerChange::Reserved(_) => {
                tracing::info!(slot_id = %change.slot_id(), "Slot has been reserved")
            }
            LedgerChange::Freed { by, .. } => {
                tracing::info!(slot_id = %change.slot_id(), freed_by = %by, "Slot has been freed")
            }
        }
        // 購読者がいない場合の送信エラーは無視してよい
        let _ = self.changes.send(change);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn find_ledger(&self) -> AppResult<Ledger> {
        self.ledger.load().await
    }

    async fn is_available(&self, slot_id: SlotId) -> AppResult<bool> {
        self.ledger.load().await?.is_available(slot_id)
    }

    async fn reserve(&self, event: CreateReservation) -> AppResult<Reservation> {
        let _guard = self.lock.lock().await;
        let mut ledger = self.ledger.load().await?;

        let slot_id = match event.slot_id {
            Some(slot_id) => slot_id,
            None => ledger.first_available().ok_or(AppError::NoAvailableSlot)?,
        };

        let reservation = Reservation {
            full_name: event.full_name,
            car_number: event.car_number,
            email: event.email,
            password: generate_password(self.password_length),
            slot_id,
        };
        // スペースの存在・空き・重複の確認はここで行われる
        ledger.insert(reservation.clone())?;

        self.commit(&ledger, LedgerChange::Reserved(reservation.clone()))
            .await?;
        Ok(reservation)
    }

    async fn free(&self, slot_id: SlotId) -> AppResult<Reservation> {
        let _guard = self.lock.lock().await;
        let mut ledger = self.ledger.load().await?;

        let former = ledger
            .clear(slot_id)?
            .ok_or(AppError::AlreadyEmpty(slot_id.raw()))?;

        self.commit(
            &ledger,
            LedgerChange::Freed {
                slot_id,
                by: FreedBy::Admin,
            },
        )
        .await?;
        Ok(former)
    }

    async fn release_by_sensor(&self, slot_id: SlotId) -> AppResult<Option<Reservation>> {
        let _guard = self.lock.lock().await;
        let mut ledger = self.ledger.load().await?;

        // 利用者情報は解放前に取り出しておく
        let Some(former) = ledger.clear(slot_id)? else {
            return Ok(None);
        };

        self.commit(
            &ledger,
            LedgerChange::Freed {
                slot_id,
                by: FreedBy::Sensor,
            },
        )
        .await?;
        Ok(Some(former))
    }

    fn subscribe(&self) -> broadcast::Receiver<LedgerChange> {
        self.changes.subscribe()
    }
}

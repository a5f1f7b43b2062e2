use crate::kv::KvStore;
use async_trait::async_trait;
use derive_new::new;
use kernel::{model::ledger::Ledger, repository::ledger::LedgerRepository};
use shared::error::AppResult;

// 台帳は 1 つのキーに JSON でまとめて保存する
pub const LEDGER_KEY: &str = "reservations";

#[derive(new)]
pub struct LedgerRepositoryImpl {
    kv: KvStore,
    slot_count: u8,
}

#[async_trait]
impl LedgerRepository for LedgerRepositoryImpl {
    async fn load(&self) -> AppResult<Ledger> {
        match self.kv.get(LEDGER_KEY).await {
            None => Ok(Ledger::empty(self.slot_count)),
            Some(raw) => {
                let ledger: Ledger = serde_json::from_str(&raw)?;
                ledger.normalized(self.slot_count)
            }
        }
    }

    async fn store(&self, ledger: &Ledger) -> AppResult<()> {
        let raw = serde_json::to_string(ledger)?;
        self.kv.set(LEDGER_KEY, raw).await
    }
}

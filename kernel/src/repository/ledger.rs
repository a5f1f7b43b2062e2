use crate::model::ledger::Ledger;
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    // 初回起動時は全スペース空の台帳を返す
    async fn load(&self) -> AppResult<Ledger>;
    async fn store(&self, ledger: &Ledger) -> AppResult<()>;
}

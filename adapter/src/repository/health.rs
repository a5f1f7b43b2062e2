use async_trait::async_trait;
use derive_new::new;
use kernel::repository::{health::HealthCheckRepository, ledger::LedgerRepository};
use std::sync::Arc;

#[derive(new)]
pub struct HealthCheckRepositoryImpl {
    ledger: Arc<dyn LedgerRepository>,
}

#[async_trait]
impl HealthCheckRepository for HealthCheckRepositoryImpl {
    async fn check_ledger(&self) -> bool {
        self.ledger
            .load()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Ledger store is not readable"))
            .is_ok()
    }
}

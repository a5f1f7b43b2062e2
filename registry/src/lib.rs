use std::sync::Arc;
use std::time::Duration;

use adapter::kv::KvStore;
use adapter::notifier::WebhookNotifier;
use adapter::reconciler::SensorReconciler;
use adapter::repository::{
    health::HealthCheckRepositoryImpl, ledger::LedgerRepositoryImpl,
    reservation::ReservationRepositoryImpl,
};
use adapter::sensor::SensorClient;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::ledger::LedgerRepository;
use kernel::repository::notification::NotificationRepository;
use kernel::repository::reservation::ReservationRepository;
use kernel::repository::sensor::SensorRepository;
use shared::config::AppConfig;
use shared::error::AppResult;

const NOTIFIER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    sensor_repository: Arc<dyn SensorRepository>,
    notification_repository: Arc<dyn NotificationRepository>,
    sensor_reconciler: Arc<SensorReconciler>,
    app_config: Arc<AppConfig>,
    webhook_notifier: Option<Arc<WebhookNotifier>>,
}

impl AppRegistry {
    /// 機器と Webhook に HTTP でつなぐ構成。通知の送信タスクもここで起動する
    pub fn new(kv: KvStore, app_config: AppConfig) -> AppResult<Self> {
        let ledger = Arc::new(LedgerRepositoryImpl::new(kv, app_config.ledger.slot_count));
        let sensor = Arc::new(SensorClient::new(&app_config.sensor)?);
        let notifier = Arc::new(WebhookNotifier::spawn(&app_config.notifier)?);
        let mut registry = Self::from_parts(ledger, sensor, notifier.clone(), app_config);
        registry.webhook_notifier = Some(notifier);
        Ok(registry)
    }

    /// 終了時に呼ぶ。キューに残っている Webhook を送り切る
    pub async fn shutdown(&self) {
        if let Some(notifier) = &self.webhook_notifier {
            notifier.shutdown(NOTIFIER_DRAIN_TIMEOUT).await;
        }
    }

    pub fn from_parts(
        ledger: Arc<dyn LedgerRepository>,
        sensor_repository: Arc<dyn SensorRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
        app_config: AppConfig,
    ) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(ledger.clone()));
        let reservation_repository = Arc::new(ReservationRepositoryImpl::new(
            ledger,
            app_config.ledger.password_length,
        ));
        let sensor_reconciler = Arc::new(SensorReconciler::new(
            sensor_repository.clone(),
            reservation_repository.clone(),
            notification_repository.clone(),
            app_config.occupancy.alert_after_polls,
        ));
        Self {
            health_check_repository,
            reservation_repository,
            sensor_repository,
            notification_repository,
            sensor_reconciler,
            app_config: Arc::new(app_config),
            webhook_notifier: None,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn sensor_repository(&self) -> Arc<dyn SensorRepository> {
        self.sensor_repository.clone()
    }

    pub fn notification_repository(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repository.clone()
    }

    pub fn sensor_reconciler(&self) -> Arc<SensorReconciler> {
        self.sensor_reconciler.clone()
    }

    pub fn app_config(&self) -> Arc<AppConfig> {
        self.app_config.clone()
    }
}

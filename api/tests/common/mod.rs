#![allow(dead_code)]

use adapter::{kv::KvStore, repository::ledger::LedgerRepositoryImpl};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use kernel::{
    model::{id::SlotId, notification::Notification, sensor::OccupancySnapshot},
    repository::{notification::NotificationRepository, sensor::SensorRepository},
};
use registry::AppRegistry;
use serde_json::Value;
use shared::{
    config::AppConfig,
    error::{AppError, AppResult},
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

#[derive(Default)]
pub struct FakeSensor {
    pub events: Mutex<VecDeque<SlotId>>,
    pub snapshot: Mutex<Option<Vec<bool>>>,
    pub gate_opened: Mutex<usize>,
}

#[async_trait]
impl SensorRepository for FakeSensor {
    async fn sensor_status(&self) -> AppResult<OccupancySnapshot> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .map(OccupancySnapshot::new)
            .ok_or_else(|| AppError::ConversionEntityError("device offline".into()))
    }

    async fn free_slot_check(&self) -> AppResult<Option<SlotId>> {
        Ok(self.events.lock().unwrap().pop_front())
    }

    async fn open_gate(&self) -> AppResult<()> {
        *self.gate_opened.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl NotificationRepository for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

pub struct TestApp {
    pub router: Router,
    pub registry: AppRegistry,
    pub sensor: Arc<FakeSensor>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_app() -> TestApp {
    let config = AppConfig::default();
    let ledger = Arc::new(LedgerRepositoryImpl::new(
        KvStore::in_memory(),
        config.ledger.slot_count,
    ));
    let sensor = Arc::new(FakeSensor::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = AppRegistry::from_parts(ledger, sensor.clone(), notifier.clone(), config);
    let router = Router::new()
        .merge(api::route::v1::routes())
        .with_state(registry.clone());
    TestApp {
        router,
        registry,
        sensor,
        notifier,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn john() -> Value {
    serde_json::json!({
        "fullName": "John Smith",
        "carNumber": "1234567",
        "email": "john@example.com"
    })
}

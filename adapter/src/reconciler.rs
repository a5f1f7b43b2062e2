use chrono::Utc;
use kernel::{
    model::{
        id::SlotId,
        notification::Notification,
        occupancy::{Discrepancy, OccupancyTracker},
        sensor::{OccupancySnapshot, SensorReading, SensorStatus},
    },
    repository::{
        notification::NotificationRepository, reservation::ReservationRepository,
        sensor::SensorRepository,
    },
};
use serde::Serialize;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Mutex},
    time::MissedTickBehavior,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    // センサーによって実際に解放されたスペース
    pub freed: Option<SlotId>,
    pub snapshot: Option<OccupancySnapshot>,
    // 今回しきい値に達した食い違い
    pub discrepancies: Vec<Discrepancy>,
}

/// センサーを定期的に問い合わせ、車が出ていったスペースの予約を解放する。
///
/// 在車状態のスナップショットは表示用としてビューに流すだけで、台帳は
/// 解放イベントによってのみ変更される。
pub struct SensorReconciler {
    sensor: Arc<dyn SensorRepository>,
    reservations: Arc<dyn ReservationRepository>,
    notifier: Arc<dyn NotificationRepository>,
    tracker: Mutex<OccupancyTracker>,
    status: watch::Sender<SensorStatus>,
}

impl SensorReconciler {
    pub fn new(
        sensor: Arc<dyn SensorRepository>,
        reservations: Arc<dyn ReservationRepository>,
        notifier: Arc<dyn NotificationRepository>,
        alert_after_polls: u32,
    ) -> Self {
        let (status, _) = watch::channel(SensorStatus::default());
        Self {
            sensor,
            reservations,
            notifier,
            tracker: Mutex::new(OccupancyTracker::new(alert_after_polls)),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorStatus> {
        self.status.subscribe()
    }

    pub fn current_status(&self) -> SensorStatus {
        self.status.borrow().clone()
    }

    /// 1 回分の問い合わせ。機器との通信失敗はログに残してそのステップだけ飛ばす
    pub async fn tick(&self) -> TickReport {
        let freed = match self.sensor.free_slot_check().await {
            Ok(Some(slot_id)) => self.release(slot_id).await,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check for freed slots");
                None
            }
        };

        let (snapshot, discrepancies) = match self.sensor.sensor_status().await {
            Ok(snapshot) => {
                let raised = self.observe(&snapshot).await;
                (Some(snapshot), raised)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch sensor status");
                (None, Vec::new())
            }
        };

        TickReport {
            freed,
            snapshot,
            discrepancies,
        }
    }

    async fn release(&self, slot_id: SlotId) -> Option<SlotId> {
        match self.reservations.release_by_sensor(slot_id).await {
            Ok(Some(former)) => {
                self.notifier.notify(Notification::slot_freed(&former));
                Some(slot_id)
            }
            // すでに空いているスペースへのイベントは無視する（通知も送らない）
            Ok(None) => {
                tracing::debug!(slot_id = %slot_id, "Free event for an empty slot ignored");
                None
            }
            Err(e) => {
                tracing::warn!(slot_id = %slot_id, error = %e, "Failed to release slot");
                None
            }
        }
    }

    async fn observe(&self, snapshot: &OccupancySnapshot) -> Vec<Discrepancy> {
        let reading = SensorReading {
            snapshot: snapshot.clone(),
            observed_at: Utc::now(),
        };
        let ledger = match self.reservations.find_ledger().await {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load ledger for occupancy check");
                self.status.send_modify(|status| status.reading = Some(reading));
                return Vec::new();
            }
        };

        let mut tracker = self.tracker.lock().await;
        let raised = tracker.observe(&ledger, snapshot);
        for d in &raised {
            tracing::warn!(
                slot_id = %d.slot_id,
                kind = ?d.kind,
                polls = d.polls,
                "Sensor occupancy disagrees with the ledger"
            );
        }
        self.status.send_replace(SensorStatus {
            reading: Some(reading),
            discrepancies: tracker.active(),
        });
        raised
    }

    /// `shutdown` が完了するまで `period` ごとに `tick` を実行する
    pub async fn run(&self, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(period_ms = period.as_millis() as u64, "Sensor reconciler started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
        tracing::info!("Sensor reconciler stopped");
    }
}

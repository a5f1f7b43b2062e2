use crate::retry::RetryPolicy;
use kernel::{
    model::notification::{Notification, NotificationKind},
    repository::notification::NotificationRepository,
};
use reqwest::Client;
use shared::{config::NotifierConfig, error::AppResult};
use std::time::Duration;
use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const WEBHOOK_MAX_DELAY: Duration = Duration::from_secs(5);
const WEBHOOK_JITTER: f64 = 0.2;

/// 予約作成・スペース解放を Webhook に知らせる。
///
/// `notify` はキューに積むだけで、送信は別タスクが順番に行う。台帳の更新を
/// 待たせることはなく、送信の失敗で台帳が巻き戻ることもない。
pub struct WebhookNotifier {
    tx: mpsc::Sender<Notification>,
    stop: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WebhookNotifier {
    /// 送信タスクを起動する。tokio ランタイム内で呼ぶこと
    pub fn spawn(config: &NotifierConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        let worker = WebhookWorker {
            client,
            reservation_created_url: config.reservation_webhook_url.clone(),
            slot_freed_url: config.slot_freed_webhook_url.clone(),
            retry: RetryPolicy::new(
                config.max_attempts,
                config.base_delay,
                WEBHOOK_MAX_DELAY,
                WEBHOOK_JITTER,
            ),
        };
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(rx, stop_rx));
        Ok(Self {
            tx,
            stop,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// 新しい通知の受け付けを止め、キューに残っている分を送り切るまで
    /// 最大 `grace` だけ待つ。間に合わなかった分はログに残して捨てる。
    pub async fn shutdown(&self, grace: Duration) {
        let _ = self.stop.send(true);
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(grace, worker).await {
            Ok(_) => tracing::info!("Notifier stopped"),
            Err(_) => tracing::warn!(
                pending = self.pending(),
                "Notifier did not drain in time; queued notifications dropped"
            ),
        }
    }

    fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

impl NotificationRepository for WebhookNotifier {
    fn notify(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!(kind = %kind, error = %e, "Notification dropped");
        }
    }
}

struct WebhookWorker {
    client: Client,
    reservation_created_url: String,
    slot_freed_url: String,
    retry: RetryPolicy,
}

impl WebhookWorker {
    async fn run(self, mut rx: mpsc::Receiver<Notification>, mut stop: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(notification) => self.deliver(&notification).await,
                    None => break,
                },
                _ = stop.changed() => {
                    rx.close();
                    // 閉じた後もキューに残っている分は送る
                    let mut drained = 0;
                    while let Some(notification) = rx.recv().await {
                        self.deliver(&notification).await;
                        drained += 1;
                    }
                    tracing::info!(drained, "Notification queue drained");
                    break;
                }
            }
        }
        tracing::debug!("Notification queue closed");
    }

    fn url_for(&self, kind: NotificationKind) -> &str {
        match kind {
            NotificationKind::ReservationCreated => &self.reservation_created_url,
            NotificationKind::SlotFreed => &self.slot_freed_url,
        }
    }

    async fn deliver(&self, notification: &Notification) {
        let kind = notification.kind();
        let url = self.url_for(kind);
        let result = self
            .retry
            .retry_async(|attempt| {
                if attempt > 0 {
                    tracing::debug!(kind = %kind, attempt, "Retrying webhook");
                }
                self.post(url, notification)
            })
            .await;

        // 応答の中身はログに残すだけ
        match result {
            Ok(body) => tracing::info!(kind = %kind, response = %body, "Webhook delivered"),
            Err(e) => tracing::warn!(kind = %kind, error = %e, "Webhook delivery failed"),
        }
    }

    async fn post(&self, url: &str, notification: &Notification) -> reqwest::Result<String> {
        self.client
            .post(url)
            .json(notification)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

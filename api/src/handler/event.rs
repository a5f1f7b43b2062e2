use super::{admin::render_admin_view, slot::render_user_view};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use kernel::model::sensor::SensorStatus;
use registry::AppRegistry;
use shared::error::AppResult;
use std::{convert::Infallible, time::Duration};
use tokio::{
    sync::{broadcast::error::RecvError, mpsc, watch},
    time::MissedTickBehavior,
};
use tokio_stream::wrappers::ReceiverStream;

type ViewStream = Sse<ReceiverStream<Result<Event, Infallible>>>;

#[derive(Debug, Clone, Copy)]
enum ViewKind {
    User,
    Admin,
}

pub async fn stream_user_view(State(registry): State<AppRegistry>) -> ViewStream {
    let refresh = registry.app_config().view.user_refresh;
    view_stream(registry, ViewKind::User, refresh)
}

pub async fn stream_admin_view(State(registry): State<AppRegistry>) -> ViewStream {
    let refresh = registry.app_config().view.admin_refresh;
    view_stream(registry, ViewKind::Admin, refresh)
}

async fn render(registry: &AppRegistry, kind: ViewKind) -> AppResult<Event> {
    let event = match kind {
        ViewKind::User => Event::default()
            .event("user-view")
            .json_data(render_user_view(registry).await?),
        ViewKind::Admin => Event::default()
            .event("admin-view")
            .json_data(render_admin_view(registry).await?),
    };
    event.map_err(|e| shared::error::AppError::ConversionEntityError(e.to_string()))
}

/// 接続直後・台帳の変更時・`refresh` ごとにビューを送る。管理者画面は
/// センサー値の更新時にも送る。描画は台帳から毎回作り直すので、何度送っても結果は同じ。
fn view_stream(registry: AppRegistry, kind: ViewKind, refresh: Duration) -> ViewStream {
    let (tx, rx) = mpsc::channel(16);
    let mut changes = registry.reservation_repository().subscribe();
    // 利用者画面はセンサー値を表示しない
    let mut status = match kind {
        ViewKind::User => None,
        ViewKind::Admin => Some(registry.sensor_reconciler().subscribe()),
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                received = changes.recv() => match received {
                    Ok(change) => {
                        tracing::debug!(view = ?kind, slot_id = %change.slot_id(), "Ledger changed");
                    }
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
                changed = status_changed(&mut status) => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            let event = match render(&registry, kind).await {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(view = ?kind, error = %e, "Failed to render view");
                    continue;
                }
            };
            // クライアントが切断したら終了
            if tx.send(Ok(event)).await.is_err() {
                break;
            }
        }
        tracing::debug!(view = ?kind, "View stream closed");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}

async fn status_changed(
    status: &mut Option<watch::Receiver<SensorStatus>>,
) -> Result<(), watch::error::RecvError> {
    match status {
        Some(status) => status.changed().await,
        None => std::future::pending().await,
    }
}

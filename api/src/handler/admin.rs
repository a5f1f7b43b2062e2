use crate::extractor::{Path, Query};
use crate::model::slot::{FreeSlotQuery, FreedSlotResponse};
use adapter::reconciler::TickReport;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use kernel::model::{id::SlotId, view::AdminView};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub(crate) async fn render_admin_view(registry: &AppRegistry) -> AppResult<AdminView> {
    let ledger = registry.reservation_repository().find_ledger().await?;
    let status = registry.sensor_reconciler().current_status();
    Ok(AdminView::render(
        &ledger,
        status.reading.as_ref(),
        status.discrepancies,
    ))
}

pub async fn show_admin_view(State(registry): State<AppRegistry>) -> AppResult<Json<AdminView>> {
    render_admin_view(&registry).await.map(Json)
}

pub async fn free_slot(
    Path(slot_id): Path<SlotId>,
    Query(query): Query<FreeSlotQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FreedSlotResponse>> {
    let reservations = registry.reservation_repository();

    // 空きスペースなら確認の前に知らせる
    if reservations.is_available(slot_id).await? {
        return Err(AppError::AlreadyEmpty(slot_id.raw()));
    }
    if !query.confirm {
        return Err(AppError::ConfirmationRequired(slot_id.raw()));
    }

    reservations
        .free(slot_id)
        .await
        .map(FreedSlotResponse::from)
        .map(Json)
}

pub async fn reconcile_now(State(registry): State<AppRegistry>) -> Json<TickReport> {
    Json(registry.sensor_reconciler().tick().await)
}

pub async fn open_gate(State(registry): State<AppRegistry>) -> AppResult<StatusCode> {
    registry
        .sensor_repository()
        .open_gate()
        .await
        .map(|_| StatusCode::ACCEPTED)
}

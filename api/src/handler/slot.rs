use crate::extractor::{JsonBody, Path};
use crate::model::{
    reservation::{CreateReservationRequest, CreateReservationRequestWithSlot, ReservationResponse},
    slot::AvailabilityResponse,
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::SlotId, notification::Notification, view::UserView};
use registry::AppRegistry;
use shared::error::AppResult;

pub(crate) async fn render_user_view(registry: &AppRegistry) -> AppResult<UserView> {
    let ledger = registry.reservation_repository().find_ledger().await?;
    Ok(UserView::render(&ledger))
}

pub async fn show_user_view(State(registry): State<AppRegistry>) -> AppResult<Json<UserView>> {
    render_user_view(&registry).await.map(Json)
}

pub async fn show_availability(
    Path(slot_id): Path<SlotId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AvailabilityResponse>> {
    registry
        .reservation_repository()
        .is_available(slot_id)
        .await
        .map(|available| Json(AvailabilityResponse { slot_id, available }))
}

pub async fn reserve_slot(
    Path(slot_id): Path<SlotId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    reserve(registry, Some(slot_id), req).await
}

// 空いている最初のスペースを予約する
pub async fn reserve_first_available(
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    reserve(registry, None, req).await
}

async fn reserve(
    registry: AppRegistry,
    slot_id: Option<SlotId>,
    req: CreateReservationRequest,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    let req = req.trimmed();
    req.validate(&())?;

    let reservation = registry
        .reservation_repository()
        .reserve(CreateReservationRequestWithSlot::new(slot_id, req).into())
        .await?;

    // 台帳への書き込みが終わってから通知する
    registry
        .notification_repository()
        .notify(Notification::reservation_created(&reservation));

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

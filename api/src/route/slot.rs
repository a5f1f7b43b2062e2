use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::slot::{reserve_first_available, reserve_slot, show_availability, show_user_view};

pub fn build_slot_routers() -> Router<AppRegistry> {
    let slots_routers = Router::new()
        .route("/", get(show_user_view))
        .route("/:slot_id/availability", get(show_availability))
        .route("/:slot_id/reservation", post(reserve_slot));

    Router::new()
        .nest("/slots", slots_routers)
        .route("/reservations", post(reserve_first_available))
}

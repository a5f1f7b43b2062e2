use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::admin::{free_slot, open_gate, reconcile_now, show_admin_view};

pub fn build_admin_routers() -> Router<AppRegistry> {
    let admin_routers = Router::new()
        .route("/slots", get(show_admin_view))
        .route("/slots/:slot_id/reservation", delete(free_slot))
        .route("/reconcile", post(reconcile_now))
        .route("/gate", post(open_gate));

    Router::new().nest("/admin", admin_routers)
}

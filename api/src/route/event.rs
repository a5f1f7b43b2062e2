use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::event::{stream_admin_view, stream_user_view};

pub fn build_event_routers() -> Router<AppRegistry> {
    let event_routers = Router::new()
        .route("/user", get(stream_user_view))
        .route("/admin", get(stream_admin_view));

    Router::new().nest("/events", event_routers)
}

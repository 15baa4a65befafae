pub mod health;
pub mod payment;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/payment", payment::router())
        .merge(health::router())
}

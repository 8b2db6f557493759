use crate::server::{AppState, currency, health};
use axum::Router;

pub struct ServerRoutes;

impl ServerRoutes {
    pub fn create() -> Router<AppState> {
        Router::<AppState>::new()
            .merge(currency::routes())
            .merge(health::routes())
    }
}

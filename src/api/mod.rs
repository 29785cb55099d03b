pub mod dto;
pub mod errors;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{control::ControlService, gateway::SharedGateway};

use handlers::ApiDoc;

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub control: ControlService,
    pub gateway_host: Arc<str>,
}

impl AppState {
    pub fn new(gateway: SharedGateway, gateway_host: &str) -> Self {
        Self {
            control: ControlService::new(gateway),
            gateway_host: Arc::from(gateway_host),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/", get(handlers::root))
        .route("/devices", get(handlers::list_devices))
        .route("/device/{device_id}", get(handlers::get_device))
        .route("/device/{device_id}/temperature", post(handlers::set_temperature))
        .route("/device/{device_id}/mode", post(handlers::set_mode))
        .route("/device/{device_id}/preset", post(handlers::set_preset))
        .route("/zone/temperature", post(handlers::set_zone_temperature))
        .route("/zone/preset", post(handlers::set_zone_preset))
        .with_state(state)
        .split_for_parts();

    router.route(
        "/api-docs/openapi.json",
        get(move || async move { axum::Json(api) }),
    )
}

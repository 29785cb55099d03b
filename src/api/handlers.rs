use axum::{
    extract::{Path, State},
    Json,
};
use utoipa::OpenApi;

use super::{
    dto::{
        DeviceListResponse, DeviceView, ModeRequest, ModeResponse, PresetRequest, PresetResponse,
        ServiceStatus, TemperatureRequest, TemperatureResponse, ZonePresetRequest,
        ZonePresetResponse, ZoneResultEntry, ZoneTemperatureRequest, ZoneTemperatureResponse,
    },
    errors::AppError,
    extract::AppJson,
    AppState,
};
use crate::{
    control::OutcomeStatus,
    gateway::models::{HvacAction, Mode, Preset},
};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Returns `{"status":"ok","gateway":<host>}` when the server is running.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = ServiceStatus),
    ),
    tag = "system"
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus::ok(&state.gateway_host))
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// List every climate device known to the gateway.
#[utoipa::path(
    get,
    path = "/devices",
    responses(
        (status = 200, description = "All climate devices", body = DeviceListResponse),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<DeviceListResponse>, AppError> {
    let devices = state.control.list_devices().await?;
    Ok(Json(devices.into()))
}

/// Fetch one device as of a fresh poll.
#[utoipa::path(
    get,
    path = "/device/{device_id}",
    params(
        ("device_id" = String, Path, description = "Gateway device ID"),
    ),
    responses(
        (status = 200, description = "Climate device", body = DeviceView),
        (status = 404, description = "Unknown device"),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "devices"
)]
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceView>, AppError> {
    let device = state.control.device(&device_id).await?;
    Ok(Json(device.into()))
}

/// Set the target temperature of one device.
#[utoipa::path(
    post,
    path = "/device/{device_id}/temperature",
    params(
        ("device_id" = String, Path, description = "Gateway device ID"),
    ),
    request_body = TemperatureRequest,
    responses(
        (status = 200, description = "Temperature sent", body = TemperatureResponse),
        (status = 404, description = "Unknown device"),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "devices"
)]
pub async fn set_temperature(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    AppJson(body): AppJson<TemperatureRequest>,
) -> Result<Json<TemperatureResponse>, AppError> {
    let applied = state
        .control
        .set_temperature(&device_id, body.temperature)
        .await?;
    Ok(Json(TemperatureResponse::ok(applied.device_id, applied.value)))
}

/// Set the HVAC mode (`off`, `heat`, `auto`) of one device.
#[utoipa::path(
    post,
    path = "/device/{device_id}/mode",
    params(
        ("device_id" = String, Path, description = "Gateway device ID"),
    ),
    request_body = ModeRequest,
    responses(
        (status = 200, description = "Mode sent", body = ModeResponse),
        (status = 400, description = "Invalid mode; the message lists valid modes"),
        (status = 404, description = "Unknown device"),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "devices"
)]
pub async fn set_mode(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    AppJson(body): AppJson<ModeRequest>,
) -> Result<Json<ModeResponse>, AppError> {
    let applied = state.control.set_mode(&device_id, &body.mode).await?;
    Ok(Json(ModeResponse::ok(applied.device_id, applied.value)))
}

/// Set the preset (`Follow Schedule`, `Permanent Hold`, `Off`) of one device.
#[utoipa::path(
    post,
    path = "/device/{device_id}/preset",
    params(
        ("device_id" = String, Path, description = "Gateway device ID"),
    ),
    request_body = PresetRequest,
    responses(
        (status = 200, description = "Preset sent", body = PresetResponse),
        (status = 400, description = "Invalid preset; the message lists valid presets"),
        (status = 404, description = "Unknown device"),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "devices"
)]
pub async fn set_preset(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    AppJson(body): AppJson<PresetRequest>,
) -> Result<Json<PresetResponse>, AppError> {
    let applied = state.control.set_preset(&device_id, &body.preset).await?;
    Ok(Json(PresetResponse::ok(applied.device_id, applied.value)))
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Set the same target temperature on several devices.
///
/// Unknown ids are reported as `not_found` in `results`; they never fail the
/// request.
#[utoipa::path(
    post,
    path = "/zone/temperature",
    request_body = ZoneTemperatureRequest,
    responses(
        (status = 200, description = "Per-device results, in request order", body = ZoneTemperatureResponse),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "zones"
)]
pub async fn set_zone_temperature(
    State(state): State<AppState>,
    AppJson(body): AppJson<ZoneTemperatureRequest>,
) -> Result<Json<ZoneTemperatureResponse>, AppError> {
    let result = state
        .control
        .zone_temperature(&body.device_ids, body.temperature)
        .await?;
    Ok(Json(ZoneTemperatureResponse::ok(result.value, result.results)))
}

/// Set the same preset on several devices.
///
/// An invalid preset rejects the whole request before any device is touched.
#[utoipa::path(
    post,
    path = "/zone/preset",
    request_body = ZonePresetRequest,
    responses(
        (status = 200, description = "Per-device results, in request order", body = ZonePresetResponse),
        (status = 400, description = "Invalid preset; the message lists valid presets"),
        (status = 500, description = "Gateway failure"),
    ),
    tag = "zones"
)]
pub async fn set_zone_preset(
    State(state): State<AppState>,
    AppJson(body): AppJson<ZonePresetRequest>,
) -> Result<Json<ZonePresetResponse>, AppError> {
    let result = state
        .control
        .zone_preset(&body.device_ids, &body.preset)
        .await?;
    Ok(Json(ZonePresetResponse::ok(result.value, result.results)))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        list_devices,
        get_device,
        set_temperature,
        set_mode,
        set_preset,
        set_zone_temperature,
        set_zone_preset,
    ),
    components(schemas(
        ServiceStatus,
        DeviceView,
        DeviceListResponse,
        TemperatureRequest,
        ModeRequest,
        PresetRequest,
        TemperatureResponse,
        ModeResponse,
        PresetResponse,
        ZoneTemperatureRequest,
        ZonePresetRequest,
        ZoneResultEntry,
        ZoneTemperatureResponse,
        ZonePresetResponse,
        OutcomeStatus,
        Mode,
        Preset,
        HvacAction,
    )),
    tags(
        (name = "devices", description = "Single-device endpoints"),
        (name = "zones",   description = "Commands applied to a list of devices"),
        (name = "system",  description = "System endpoints"),
    ),
    info(
        title = "Salus Bridge",
        description = "REST API bridge for Salus iT600 heating system"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

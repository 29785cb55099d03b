use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    control::{DeviceOutcome, OutcomeStatus},
    gateway::models::{Device, HvacAction, Mode, Preset},
};

const OK: &str = "ok";

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceView {
    pub id: String,
    pub name: String,
    /// Degrees Celsius. `null` when the sensor is unavailable.
    pub current_temperature: Option<f64>,
    /// Degrees Celsius
    pub target_temperature: Option<f64>,
    pub hvac_mode: Option<Mode>,
    pub hvac_action: Option<HvacAction>,
    pub preset_mode: Option<String>,
    pub available: bool,
}

impl From<Device> for DeviceView {
    fn from(d: Device) -> Self {
        Self {
            id: d.id,
            name: d.name,
            current_temperature: d.current_temperature,
            target_temperature: d.target_temperature,
            hvac_mode: d.hvac_mode,
            hvac_action: d.hvac_action,
            preset_mode: d.preset_mode,
            available: d.available,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceView>,
    pub count: usize,
}

impl From<Vec<Device>> for DeviceListResponse {
    fn from(devices: Vec<Device>) -> Self {
        let devices: Vec<DeviceView> = devices.into_iter().map(Into::into).collect();
        Self {
            count: devices.len(),
            devices,
        }
    }
}

/// Response for `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
    pub status: String,
    /// Host of the heating gateway this bridge talks to.
    pub gateway: String,
}

impl ServiceStatus {
    pub fn ok(gateway: &str) -> Self {
        Self {
            status: OK.to_owned(),
            gateway: gateway.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Single-device commands
// ---------------------------------------------------------------------------

/// Request body for `POST /device/{device_id}/temperature`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TemperatureRequest {
    /// Degrees Celsius
    pub temperature: f64,
}

/// Request body for `POST /device/{device_id}/mode`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModeRequest {
    /// One of `off`, `heat`, `auto`.
    pub mode: String,
}

/// Request body for `POST /device/{device_id}/preset`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PresetRequest {
    /// One of `Follow Schedule`, `Permanent Hold`, `Off`.
    pub preset: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemperatureResponse {
    pub status: String,
    pub device_id: String,
    pub temperature: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModeResponse {
    pub status: String,
    pub device_id: String,
    pub mode: Mode,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PresetResponse {
    pub status: String,
    pub device_id: String,
    pub preset: Preset,
}

impl TemperatureResponse {
    pub fn ok(device_id: String, temperature: f64) -> Self {
        Self { status: OK.to_owned(), device_id, temperature }
    }
}

impl ModeResponse {
    pub fn ok(device_id: String, mode: Mode) -> Self {
        Self { status: OK.to_owned(), device_id, mode }
    }
}

impl PresetResponse {
    pub fn ok(device_id: String, preset: Preset) -> Self {
        Self { status: OK.to_owned(), device_id, preset }
    }
}

// ---------------------------------------------------------------------------
// Zone commands
// ---------------------------------------------------------------------------

/// Request body for `POST /zone/temperature`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ZoneTemperatureRequest {
    pub device_ids: Vec<String>,
    /// Degrees Celsius
    pub temperature: f64,
}

/// Request body for `POST /zone/preset`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ZonePresetRequest {
    pub device_ids: Vec<String>,
    pub preset: String,
}

/// Outcome for one device of a zone command.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneResultEntry {
    pub device_id: String,
    pub status: OutcomeStatus,
    /// Gateway failure message, only present when `status` is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DeviceOutcome> for ZoneResultEntry {
    fn from(o: DeviceOutcome) -> Self {
        Self {
            device_id: o.device_id,
            status: o.status,
            error: o.error,
        }
    }
}

/// Response for `POST /zone/temperature`.
///
/// `results` holds one entry per requested id, in request order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneTemperatureResponse {
    pub status: String,
    pub temperature: f64,
    pub results: Vec<ZoneResultEntry>,
}

/// Response for `POST /zone/preset`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ZonePresetResponse {
    pub status: String,
    pub preset: Preset,
    pub results: Vec<ZoneResultEntry>,
}

impl ZoneTemperatureResponse {
    pub fn ok(temperature: f64, outcomes: Vec<DeviceOutcome>) -> Self {
        Self {
            status: OK.to_owned(),
            temperature,
            results: outcomes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ZonePresetResponse {
    pub fn ok(preset: Preset, outcomes: Vec<DeviceOutcome>) -> Self {
        Self {
            status: OK.to_owned(),
            preset,
            results: outcomes.into_iter().map(Into::into).collect(),
        }
    }
}

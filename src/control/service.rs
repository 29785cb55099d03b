use tracing::{debug, info};

use super::{
    rules::{validate_mode, validate_preset},
    ControlError,
};
use crate::gateway::{
    models::{Device, Mode, Preset},
    Gateway, SharedGateway,
};

/// Confirmation that `value` was sent to `device_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub device_id: String,
    pub value: T,
}

/// Turns requests into gateway calls.
///
/// Every operation locks the gateway, polls it, and only then looks devices
/// up, so a device added or removed since the previous request is seen.
#[derive(Clone)]
pub struct ControlService {
    pub(super) gateway: SharedGateway,
}

impl ControlService {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }

    /// All climate devices, ordered by id.
    pub async fn list_devices(&self) -> Result<Vec<Device>, ControlError> {
        let mut gateway = self.gateway.lock().await;
        gateway.poll_status().await?;
        Ok(gateway.devices().await.into_values().collect())
    }

    pub async fn device(&self, device_id: &str) -> Result<Device, ControlError> {
        let mut gateway = self.gateway.lock().await;
        poll_and_resolve(&mut **gateway, device_id).await
    }

    pub async fn set_temperature(
        &self,
        device_id: &str,
        temperature: f64,
    ) -> Result<Applied<f64>, ControlError> {
        let mut gateway = self.gateway.lock().await;
        poll_and_resolve(&mut **gateway, device_id).await?;

        gateway.set_temperature(device_id, temperature).await?;
        info!(device_id = %device_id, temperature, "Target temperature set");

        Ok(Applied {
            device_id: device_id.to_owned(),
            value: temperature,
        })
    }

    /// Set the HVAC mode. `mode` is validated after the device is resolved,
    /// so an unknown device reports not-found even with a bad mode.
    pub async fn set_mode(&self, device_id: &str, mode: &str) -> Result<Applied<Mode>, ControlError> {
        let mut gateway = self.gateway.lock().await;
        poll_and_resolve(&mut **gateway, device_id).await?;
        let mode = validate_mode(mode)?;

        gateway.set_mode(device_id, mode).await?;
        info!(device_id = %device_id, mode = %mode, "HVAC mode set");

        Ok(Applied {
            device_id: device_id.to_owned(),
            value: mode,
        })
    }

    pub async fn set_preset(
        &self,
        device_id: &str,
        preset: &str,
    ) -> Result<Applied<Preset>, ControlError> {
        let mut gateway = self.gateway.lock().await;
        poll_and_resolve(&mut **gateway, device_id).await?;
        let preset = validate_preset(preset)?;

        gateway.set_preset(device_id, preset).await?;
        info!(device_id = %device_id, preset = %preset, "Preset set");

        Ok(Applied {
            device_id: device_id.to_owned(),
            value: preset,
        })
    }
}

async fn poll_and_resolve(gateway: &mut dyn Gateway, device_id: &str) -> Result<Device, ControlError> {
    gateway.poll_status().await?;
    gateway.device(device_id).await.ok_or_else(|| {
        debug!(device_id = %device_id, "Device not found");
        ControlError::DeviceNotFound(device_id.to_owned())
    })
}

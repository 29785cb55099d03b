use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::{
    rules::{validate_preset, InvalidEnum},
    ControlError, ControlService,
};
use crate::gateway::{models::Preset, Gateway, GatewayResult};

/// Operation requested for every device in a zone, as received.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneOperation {
    Temperature(f64),
    Preset(String),
}

/// A [`ZoneOperation`] whose value passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneCommand {
    Temperature(f64),
    Preset(Preset),
}

impl ZoneOperation {
    pub fn validate(self) -> Result<ZoneCommand, InvalidEnum> {
        match self {
            ZoneOperation::Temperature(t) => Ok(ZoneCommand::Temperature(t)),
            ZoneOperation::Preset(p) => validate_preset(&p).map(ZoneCommand::Preset),
        }
    }
}

impl ZoneCommand {
    async fn send(self, gateway: &mut dyn Gateway, device_id: &str) -> GatewayResult<()> {
        match self {
            ZoneCommand::Temperature(t) => gateway.set_temperature(device_id, t).await,
            ZoneCommand::Preset(p) => gateway.set_preset(device_id, p).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    NotFound,
    /// The device exists but the gateway rejected the command.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOutcome {
    pub device_id: String,
    pub status: OutcomeStatus,
    /// Gateway failure message when `status` is [`OutcomeStatus::Error`].
    pub error: Option<String>,
}

/// One outcome per requested id, in request order, with the value applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneResult<T> {
    pub value: T,
    pub results: Vec<DeviceOutcome>,
}

impl ControlService {
    /// Apply one operation to every device in `device_ids`.
    ///
    /// The value is validated before the gateway is touched; an invalid
    /// preset fails the whole call. The gateway is polled once for the
    /// batch. After that, each id gets its own outcome: a missing device or
    /// a rejected command is recorded and the next id is processed.
    pub async fn apply_to_zone(
        &self,
        device_ids: &[String],
        operation: ZoneOperation,
    ) -> Result<ZoneResult<ZoneCommand>, ControlError> {
        let command = operation.validate()?;
        let results = self.fan_out(device_ids, command).await?;
        Ok(ZoneResult { value: command, results })
    }

    /// [`ControlService::apply_to_zone`] for a target temperature.
    pub async fn zone_temperature(
        &self,
        device_ids: &[String],
        temperature: f64,
    ) -> Result<ZoneResult<f64>, ControlError> {
        let results = self
            .fan_out(device_ids, ZoneCommand::Temperature(temperature))
            .await?;
        Ok(ZoneResult { value: temperature, results })
    }

    /// [`ControlService::apply_to_zone`] for a preset given as received.
    pub async fn zone_preset(
        &self,
        device_ids: &[String],
        preset: &str,
    ) -> Result<ZoneResult<Preset>, ControlError> {
        let preset = validate_preset(preset)?;
        let results = self.fan_out(device_ids, ZoneCommand::Preset(preset)).await?;
        Ok(ZoneResult { value: preset, results })
    }

    async fn fan_out(
        &self,
        device_ids: &[String],
        command: ZoneCommand,
    ) -> Result<Vec<DeviceOutcome>, ControlError> {
        let mut gateway = self.gateway.lock().await;
        gateway.poll_status().await?;

        let mut results = Vec::with_capacity(device_ids.len());
        for device_id in device_ids {
            let outcome = if gateway.device(device_id).await.is_none() {
                warn!(device_id = %device_id, "Zone device not found");
                DeviceOutcome {
                    device_id: device_id.clone(),
                    status: OutcomeStatus::NotFound,
                    error: None,
                }
            } else {
                match command.send(&mut **gateway, device_id).await {
                    Ok(()) => DeviceOutcome {
                        device_id: device_id.clone(),
                        status: OutcomeStatus::Ok,
                        error: None,
                    },
                    Err(e) => {
                        error!(device_id = %device_id, error = %e, "Zone command failed");
                        DeviceOutcome {
                            device_id: device_id.clone(),
                            status: OutcomeStatus::Error,
                            error: Some(e.to_string()),
                        }
                    }
                }
            };
            results.push(outcome);
        }

        info!(
            command = ?command,
            requested = device_ids.len(),
            applied = results.iter().filter(|r| r.status == OutcomeStatus::Ok).count(),
            "Zone command finished"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        self,
        models::Device,
        simulated::{connected, thermostat, GatewayCall, SimulatedGateway},
        GatewayError,
    };

    async fn service(devices: Vec<Device>) -> (ControlService, SimulatedGateway) {
        let (gw, sim) = connected(devices).await;
        (ControlService::new(gateway::shared(gw)), sim)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn statuses<T>(result: &ZoneResult<T>) -> Vec<(&str, OutcomeStatus)> {
        result
            .results
            .iter()
            .map(|r| (r.device_id.as_str(), r.status))
            .collect()
    }

    #[tokio::test]
    async fn missing_device_does_not_stop_the_batch() {
        let (svc, sim) =
            service(vec![thermostat("A", 19.0, 21.0), thermostat("C", 19.0, 21.0)]).await;

        let result = svc
            .apply_to_zone(&ids(&["A", "B", "C"]), ZoneOperation::Temperature(20.5))
            .await
            .unwrap();

        assert_eq!(result.value, ZoneCommand::Temperature(20.5));
        assert_eq!(
            statuses(&result),
            [
                ("A", OutcomeStatus::Ok),
                ("B", OutcomeStatus::NotFound),
                ("C", OutcomeStatus::Ok),
            ]
        );
        assert_eq!(
            sim.mutations().await,
            [
                GatewayCall::SetTemperature { device_id: "A".into(), temperature: 20.5 },
                GatewayCall::SetTemperature { device_id: "C".into(), temperature: 20.5 },
            ]
        );
    }

    #[tokio::test]
    async fn polls_once_per_batch() {
        let (svc, sim) = service(vec![
            thermostat("a", 19.0, 21.0),
            thermostat("b", 19.0, 21.0),
            thermostat("c", 19.0, 21.0),
        ])
        .await;

        svc.apply_to_zone(&ids(&["a", "b", "c", "x"]), ZoneOperation::Temperature(18.0))
            .await
            .unwrap();

        let polls = sim
            .calls()
            .await
            .into_iter()
            .filter(|c| *c == GatewayCall::Poll)
            .count();
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn invalid_preset_rejects_batch_before_touching_gateway() {
        let (svc, sim) = service(vec![thermostat("d1", 19.0, 21.0)]).await;

        let err = svc
            .apply_to_zone(&ids(&["d1"]), ZoneOperation::Preset("Holiday".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::InvalidEnum(_)));
        assert_eq!(sim.calls().await, [GatewayCall::Connect]);
    }

    #[tokio::test]
    async fn preset_batch_reports_per_device() {
        let (svc, sim) = service(vec![thermostat("d1", 19.0, 21.0)]).await;

        let result = svc
            .apply_to_zone(&ids(&["d1", "d2"]), ZoneOperation::Preset("Off".into()))
            .await
            .unwrap();

        assert_eq!(result.value, ZoneCommand::Preset(Preset::Off));
        assert_eq!(
            statuses(&result),
            [("d1", OutcomeStatus::Ok), ("d2", OutcomeStatus::NotFound)]
        );
        assert_eq!(
            sim.remote_device("d1").await.unwrap().preset_mode.as_deref(),
            Some("Off")
        );
    }

    #[tokio::test]
    async fn typed_zone_calls_report_the_applied_value() {
        let (svc, sim) =
            service(vec![thermostat("d1", 19.0, 21.0), thermostat("d2", 19.0, 21.0)]).await;

        let temps = svc.zone_temperature(&ids(&["d1", "x"]), 23.0).await.unwrap();
        assert_eq!(temps.value, 23.0);
        assert_eq!(
            statuses(&temps),
            [("d1", OutcomeStatus::Ok), ("x", OutcomeStatus::NotFound)]
        );

        let presets = svc
            .zone_preset(&ids(&["d2"]), "Permanent Hold")
            .await
            .unwrap();
        assert_eq!(presets.value, Preset::PermanentHold);
        assert_eq!(statuses(&presets), [("d2", OutcomeStatus::Ok)]);
        assert_eq!(sim.mutations().await.len(), 2);
    }

    #[tokio::test]
    async fn typed_zone_preset_validates_before_polling() {
        let (svc, sim) = service(vec![thermostat("d1", 19.0, 21.0)]).await;

        let err = svc.zone_preset(&ids(&["d1"]), "off").await.unwrap_err();
        assert!(matches!(err, ControlError::InvalidEnum(_)));
        assert_eq!(sim.calls().await, [GatewayCall::Connect]);
    }

    #[tokio::test]
    async fn rejected_command_is_recorded_and_batch_continues() {
        let (svc, sim) =
            service(vec![thermostat("a", 19.0, 21.0), thermostat("b", 19.0, 21.0)]).await;
        sim.fail_commands_for("a").await;

        let result = svc
            .apply_to_zone(&ids(&["a", "b"]), ZoneOperation::Temperature(22.0))
            .await
            .unwrap();

        assert_eq!(
            statuses(&result),
            [("a", OutcomeStatus::Error), ("b", OutcomeStatus::Ok)]
        );
        assert!(result.results[0].error.as_deref().unwrap().contains("device a"));
        assert_eq!(sim.remote_device("b").await.unwrap().target_temperature, Some(22.0));
    }

    #[tokio::test]
    async fn duplicate_and_empty_id_lists_keep_positions() {
        let (svc, sim) = service(vec![thermostat("a", 19.0, 21.0)]).await;

        let empty = svc
            .apply_to_zone(&[], ZoneOperation::Temperature(19.0))
            .await
            .unwrap();
        assert!(empty.results.is_empty());

        let twice = svc
            .apply_to_zone(&ids(&["a", "a"]), ZoneOperation::Temperature(19.0))
            .await
            .unwrap();
        assert_eq!(statuses(&twice), [("a", OutcomeStatus::Ok), ("a", OutcomeStatus::Ok)]);
        assert_eq!(sim.mutations().await.len(), 2);
    }

    #[tokio::test]
    async fn poll_failure_fails_the_batch() {
        let (svc, sim) = service(vec![thermostat("a", 19.0, 21.0)]).await;
        sim.set_reachable(false).await;

        let err = svc
            .apply_to_zone(&ids(&["a"]), ZoneOperation::Temperature(19.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::Gateway(GatewayError::Unreachable(_))));
        assert!(sim.mutations().await.is_empty());
    }
}

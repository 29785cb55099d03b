use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use super::{
    models::{Device, HvacAction, Mode, Preset},
    Gateway, GatewayError, GatewayResult,
};

/// One call made through the [`Gateway`] trait, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Connect,
    Close,
    Poll,
    SetTemperature { device_id: String, temperature: f64 },
    SetMode { device_id: String, mode: Mode },
    SetPreset { device_id: String, preset: Preset },
}

impl GatewayCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GatewayCall::SetTemperature { .. }
                | GatewayCall::SetMode { .. }
                | GatewayCall::SetPreset { .. }
        )
    }
}

/// In-memory stand-in for an iT600 controller.
///
/// `remote` is what the controller holds; `snapshot` is what the last poll
/// saw. Commands change `remote` only, so their effect becomes visible after
/// the next poll, as with the real gateway.
///
/// Clones share state, so a test can keep a handle after passing one into
/// the app and inspect [`SimulatedGateway::calls`] afterwards. Calls are only
/// logged by gateways built with [`SimulatedGateway::recording`].
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug)]
struct State {
    connected: bool,
    reachable: bool,
    remote: BTreeMap<String, Device>,
    snapshot: BTreeMap<String, Device>,
    failing: HashSet<String>,
    /// `None` unless built with [`SimulatedGateway::recording`].
    calls: Option<Vec<GatewayCall>>,
}

impl State {
    fn record(&mut self, call: GatewayCall) {
        if let Some(calls) = &mut self.calls {
            calls.push(call);
        }
    }
}

impl SimulatedGateway {
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        Self::build(devices, None)
    }

    /// Like [`SimulatedGateway::new`], but every trait call is kept for
    /// [`SimulatedGateway::calls`]. The log is never drained.
    pub fn recording(devices: impl IntoIterator<Item = Device>) -> Self {
        Self::build(devices, Some(Vec::new()))
    }

    fn build(devices: impl IntoIterator<Item = Device>, calls: Option<Vec<GatewayCall>>) -> Self {
        let remote = devices
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(State {
                connected: false,
                reachable: true,
                remote,
                snapshot: BTreeMap::new(),
                failing: HashSet::new(),
                calls,
            })),
        }
    }

    /// Load devices from a JSON array of [`Device`] records.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("failed to read devices file {}", path.display()))?;
        let devices: Vec<Device> = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse devices file {}", path.display()))?;
        info!(path = %path.display(), count = devices.len(), "Loaded simulated devices");
        Ok(Self::new(devices))
    }

    /// Add or replace a device on the controller side. Visible after the next poll.
    pub async fn insert_device(&self, device: Device) {
        self.inner
            .write()
            .await
            .remote
            .insert(device.id.clone(), device);
    }

    /// Drop a device from the controller side, as if it had been unpaired.
    pub async fn remove_device(&self, device_id: &str) {
        self.inner.write().await.remote.remove(device_id);
    }

    /// Make every command for `device_id` fail with [`GatewayError::Command`].
    pub async fn fail_commands_for(&self, device_id: &str) {
        self.inner.write().await.failing.insert(device_id.to_owned());
    }

    pub async fn set_reachable(&self, reachable: bool) {
        self.inner.write().await.reachable = reachable;
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.connected
    }

    /// Controller-side state of a device, bypassing the poll snapshot.
    pub async fn remote_device(&self, device_id: &str) -> Option<Device> {
        self.inner.read().await.remote.get(device_id).cloned()
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.inner.read().await.calls.clone().unwrap_or_default()
    }

    pub async fn mutations(&self) -> Vec<GatewayCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.is_mutation())
            .collect()
    }

    /// Record `call`, check the connection, and apply `change` to the
    /// remote copy of `device_id`.
    async fn command(
        &self,
        device_id: &str,
        call: GatewayCall,
        change: impl FnOnce(&mut Device),
    ) -> GatewayResult<()> {
        let mut state = self.inner.write().await;
        state.record(call);

        if !state.connected {
            return Err(GatewayError::NotConnected);
        }
        if !state.reachable {
            return Err(GatewayError::Unreachable("no response from controller".to_owned()));
        }
        if state.failing.contains(device_id) {
            return Err(GatewayError::Command {
                device_id: device_id.to_owned(),
                reason: "controller rejected the command".to_owned(),
            });
        }

        let device = state
            .remote
            .get_mut(device_id)
            .ok_or_else(|| GatewayError::Command {
                device_id: device_id.to_owned(),
                reason: "unknown device".to_owned(),
            })?;
        change(device);
        debug!(device_id = %device_id, "Simulated command applied");
        Ok(())
    }
}

/// Derive what the thermostat is doing from its mode and temperatures.
fn derive_action(device: &Device) -> Option<HvacAction> {
    match device.hvac_mode? {
        Mode::Off => Some(HvacAction::Off),
        Mode::Heat | Mode::Auto => match (device.current_temperature, device.target_temperature) {
            (Some(current), Some(target)) if current < target => Some(HvacAction::Heating),
            (Some(_), Some(_)) => Some(HvacAction::Idle),
            _ => None,
        },
    }
}

#[async_trait]
impl Gateway for SimulatedGateway {
    async fn connect(&mut self) -> GatewayResult<()> {
        let mut state = self.inner.write().await;
        state.record(GatewayCall::Connect);
        if !state.reachable {
            return Err(GatewayError::Unreachable("connection refused".to_owned()));
        }
        state.connected = true;
        Ok(())
    }

    async fn close(&mut self) -> GatewayResult<()> {
        let mut state = self.inner.write().await;
        state.record(GatewayCall::Close);
        state.connected = false;
        Ok(())
    }

    async fn poll_status(&mut self) -> GatewayResult<()> {
        let mut state = self.inner.write().await;
        state.record(GatewayCall::Poll);

        if !state.connected {
            return Err(GatewayError::NotConnected);
        }
        if !state.reachable {
            return Err(GatewayError::Unreachable("poll timed out".to_owned()));
        }

        let snapshot = state
            .remote
            .iter()
            .map(|(id, device)| {
                let mut device = device.clone();
                device.hvac_action = derive_action(&device);
                (id.clone(), device)
            })
            .collect();
        state.snapshot = snapshot;
        Ok(())
    }

    async fn devices(&self) -> BTreeMap<String, Device> {
        self.inner.read().await.snapshot.clone()
    }

    async fn device(&self, device_id: &str) -> Option<Device> {
        self.inner.read().await.snapshot.get(device_id).cloned()
    }

    async fn set_temperature(&mut self, device_id: &str, temperature: f64) -> GatewayResult<()> {
        let call = GatewayCall::SetTemperature {
            device_id: device_id.to_owned(),
            temperature,
        };
        self.command(device_id, call, |d| d.target_temperature = Some(temperature))
            .await
    }

    async fn set_mode(&mut self, device_id: &str, mode: Mode) -> GatewayResult<()> {
        let call = GatewayCall::SetMode {
            device_id: device_id.to_owned(),
            mode,
        };
        self.command(device_id, call, |d| d.hvac_mode = Some(mode)).await
    }

    async fn set_preset(&mut self, device_id: &str, preset: Preset) -> GatewayResult<()> {
        let call = GatewayCall::SetPreset {
            device_id: device_id.to_owned(),
            preset,
        };
        self.command(device_id, call, |d| {
            d.preset_mode = Some(preset.as_str().to_owned())
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A heating thermostat with both temperatures known.
#[cfg(test)]
pub(crate) fn thermostat(id: &str, current: f64, target: f64) -> Device {
    Device {
        id: id.to_owned(),
        name: format!("Thermostat {id}"),
        current_temperature: Some(current),
        target_temperature: Some(target),
        hvac_mode: Some(Mode::Heat),
        hvac_action: None,
        preset_mode: Some(Preset::FollowSchedule.as_str().to_owned()),
        available: true,
    }
}

/// A connected simulator holding `devices`, plus a second handle for inspection.
#[cfg(test)]
pub(crate) async fn connected(devices: Vec<Device>) -> (SimulatedGateway, SimulatedGateway) {
    let mut gateway = SimulatedGateway::recording(devices);
    gateway.connect().await.unwrap();
    let sim = gateway.clone();
    (gateway, sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookups_are_empty_until_first_poll() {
        let (mut gw, _) = connected(vec![thermostat("d1", 19.0, 21.0)]).await;
        assert!(gw.device("d1").await.is_none());

        gw.poll_status().await.unwrap();
        assert_eq!(gw.device("d1").await.unwrap().name, "Thermostat d1");
        assert_eq!(gw.devices().await.len(), 1);
    }

    #[tokio::test]
    async fn plain_gateway_keeps_no_call_log() {
        let mut gw = SimulatedGateway::new(vec![thermostat("d1", 19.0, 21.0)]);
        gw.connect().await.unwrap();
        for _ in 0..100 {
            gw.poll_status().await.unwrap();
        }
        gw.set_temperature("d1", 20.0).await.unwrap();

        assert!(gw.calls().await.is_empty());
        assert!(gw.inner.read().await.calls.is_none());
    }

    #[tokio::test]
    async fn recording_gateway_logs_calls_in_order() {
        let mut gw = SimulatedGateway::recording(vec![thermostat("d1", 19.0, 21.0)]);
        gw.connect().await.unwrap();
        gw.poll_status().await.unwrap();
        assert_eq!(gw.calls().await, [GatewayCall::Connect, GatewayCall::Poll]);
    }

    #[tokio::test]
    async fn poll_requires_connection() {
        let mut gw = SimulatedGateway::new(vec![thermostat("d1", 19.0, 21.0)]);
        let err = gw.poll_status().await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected));
    }

    #[tokio::test]
    async fn close_disconnects() {
        let (mut gw, sim) = connected(vec![]).await;
        assert!(sim.is_connected().await);
        gw.close().await.unwrap();
        assert!(!sim.is_connected().await);
    }

    #[tokio::test]
    async fn commands_become_visible_after_next_poll() {
        let (mut gw, _) = connected(vec![thermostat("d1", 19.0, 21.0)]).await;
        gw.poll_status().await.unwrap();

        gw.set_temperature("d1", 23.5).await.unwrap();
        assert_eq!(gw.device("d1").await.unwrap().target_temperature, Some(21.0));

        gw.poll_status().await.unwrap();
        assert_eq!(gw.device("d1").await.unwrap().target_temperature, Some(23.5));
    }

    #[tokio::test]
    async fn poll_derives_hvac_action() {
        let mut idle = thermostat("idle", 22.0, 20.0);
        idle.hvac_mode = Some(Mode::Auto);
        let mut off = thermostat("off", 15.0, 20.0);
        off.hvac_mode = Some(Mode::Off);
        let mut no_sensor = thermostat("no_sensor", 0.0, 20.0);
        no_sensor.current_temperature = None;

        let (mut gw, _) =
            connected(vec![thermostat("heating", 18.0, 21.0), idle, off, no_sensor]).await;
        gw.poll_status().await.unwrap();

        let action = |d: Option<Device>| d.unwrap().hvac_action;
        assert_eq!(action(gw.device("heating").await), Some(HvacAction::Heating));
        assert_eq!(action(gw.device("idle").await), Some(HvacAction::Idle));
        assert_eq!(action(gw.device("off").await), Some(HvacAction::Off));
        assert_eq!(action(gw.device("no_sensor").await), None);
    }

    #[tokio::test]
    async fn failing_device_rejects_commands_but_records_them() {
        let (mut gw, sim) = connected(vec![thermostat("d1", 19.0, 21.0)]).await;
        sim.fail_commands_for("d1").await;

        let err = gw.set_mode("d1", Mode::Off).await.unwrap_err();
        assert!(matches!(err, GatewayError::Command { .. }));
        assert_eq!(
            sim.mutations().await,
            vec![GatewayCall::SetMode { device_id: "d1".into(), mode: Mode::Off }]
        );
        assert_eq!(sim.remote_device("d1").await.unwrap().hvac_mode, Some(Mode::Heat));
    }

    #[tokio::test]
    async fn unreachable_controller_fails_poll() {
        let (mut gw, sim) = connected(vec![]).await;
        sim.set_reachable(false).await;
        let err = gw.poll_status().await.unwrap_err();
        assert!(matches!(err, GatewayError::Unreachable(_)));
    }

    #[tokio::test]
    async fn removed_device_disappears_on_poll() {
        let (mut gw, sim) = connected(vec![thermostat("d1", 19.0, 21.0)]).await;
        gw.poll_status().await.unwrap();
        sim.remove_device("d1").await;
        gw.poll_status().await.unwrap();
        assert!(gw.device("d1").await.is_none());
    }

    #[tokio::test]
    async fn from_file_reads_device_array() {
        let path = std::env::temp_dir().join("salus_bridge_sim_devices.json");
        fs::write(
            &path,
            br#"[{"id":"a","name":"Hall","target_temperature":20.5,"hvac_mode":"auto"}]"#,
        )
        .await
        .unwrap();

        let mut gw = SimulatedGateway::from_file(&path).await.unwrap();
        gw.connect().await.unwrap();
        gw.poll_status().await.unwrap();
        let device = gw.device("a").await.unwrap();
        assert_eq!(device.name, "Hall");
        assert_eq!(device.hvac_mode, Some(Mode::Auto));

        let _ = fs::remove_file(&path).await;
    }
}

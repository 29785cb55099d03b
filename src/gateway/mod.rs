pub mod models;
pub mod simulated;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use self::models::{Device, Mode, Preset};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway is not connected")]
    NotConnected,

    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    #[error("command for device {device_id} failed: {reason}")]
    Command { device_id: String, reason: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Connection to a heating controller.
///
/// Lookups read the state captured by the last [`Gateway::poll_status`];
/// they never go to the network. Anything that talks to the controller takes
/// `&mut self`, so one connection serves one caller at a time.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn connect(&mut self) -> GatewayResult<()>;

    async fn close(&mut self) -> GatewayResult<()>;

    /// Re-read every device from the controller.
    async fn poll_status(&mut self) -> GatewayResult<()>;

    /// All climate devices keyed by id, as of the last poll.
    async fn devices(&self) -> BTreeMap<String, Device>;

    async fn device(&self, device_id: &str) -> Option<Device>;

    async fn set_temperature(&mut self, device_id: &str, temperature: f64) -> GatewayResult<()>;

    async fn set_mode(&mut self, device_id: &str, mode: Mode) -> GatewayResult<()>;

    async fn set_preset(&mut self, device_id: &str, preset: Preset) -> GatewayResult<()>;
}

/// The process-wide gateway connection.
///
/// Holders lock it for the whole of a poll → lookup → command sequence, which
/// keeps overlapping HTTP requests from interleaving on the connection.
pub type SharedGateway = Arc<Mutex<Box<dyn Gateway>>>;

pub fn shared(gateway: impl Gateway + 'static) -> SharedGateway {
    let gateway: Box<dyn Gateway> = Box::new(gateway);
    Arc::new(Mutex::new(gateway))
}

pub mod rules;
pub mod service;
pub mod zone;

use thiserror::Error;

use crate::gateway::GatewayError;

pub use self::{
    rules::InvalidEnum,
    service::{Applied, ControlService},
    zone::{DeviceOutcome, OutcomeStatus, ZoneCommand, ZoneOperation, ZoneResult},
};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Device {0} not found")]
    DeviceNotFound(String),

    #[error(transparent)]
    InvalidEnum(#[from] InvalidEnum),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

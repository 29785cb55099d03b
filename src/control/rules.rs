use crate::gateway::models::{Mode, Preset};

pub use crate::gateway::models::InvalidEnum;

pub fn validate_mode(value: &str) -> Result<Mode, InvalidEnum> {
    value.parse()
}

pub fn validate_preset(value: &str) -> Result<Preset, InvalidEnum> {
    value.parse()
}

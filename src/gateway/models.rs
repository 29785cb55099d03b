use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A value outside one of the closed enumerations.
///
/// Carries every accepted value so the caller can report them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}. Must be one of: {accepted:?}")]
pub struct InvalidEnum {
    pub field: &'static str,
    pub value: String,
    pub accepted: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// HVAC mode accepted by iT600 thermostats.
///
/// Matching is exact: `"Heat"` or `"HEAT"` are not modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Off,
    Heat,
    Auto,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Off, Mode::Heat, Mode::Auto];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Off => "off",
            Mode::Heat => "heat",
            Mode::Auto => "auto",
        }
    }
}

impl FromStr for Mode {
    type Err = InvalidEnum;

    fn from_str(s: &str) -> Result<Self, InvalidEnum> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "auto" => Ok(Self::Auto),
            other => Err(InvalidEnum {
                field: "mode",
                value: other.to_owned(),
                accepted: Self::ALL.iter().map(|m| m.as_str()).collect(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// Schedule-following preset, distinct from the HVAC mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Preset {
    #[serde(rename = "Follow Schedule")]
    FollowSchedule,
    #[serde(rename = "Permanent Hold")]
    PermanentHold,
    #[serde(rename = "Off")]
    Off,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::FollowSchedule, Preset::PermanentHold, Preset::Off];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::FollowSchedule => "Follow Schedule",
            Preset::PermanentHold => "Permanent Hold",
            Preset::Off => "Off",
        }
    }
}

impl FromStr for Preset {
    type Err = InvalidEnum;

    fn from_str(s: &str) -> Result<Self, InvalidEnum> {
        match s {
            "Follow Schedule" => Ok(Self::FollowSchedule),
            "Permanent Hold" => Ok(Self::PermanentHold),
            "Off" => Ok(Self::Off),
            other => Err(InvalidEnum {
                field: "preset",
                value: other.to_owned(),
                accepted: Self::ALL.iter().map(|p| p.as_str()).collect(),
            }),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HvacAction
// ---------------------------------------------------------------------------

/// What the thermostat is doing right now. Reported by the gateway, never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HvacAction {
    Off,
    Heating,
    Idle,
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Climate device as last seen by a gateway poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Degrees Celsius. `None` when the sensor is unavailable.
    #[serde(default)]
    pub current_temperature: Option<f64>,
    /// Degrees Celsius
    #[serde(default)]
    pub target_temperature: Option<f64>,
    #[serde(default)]
    pub hvac_mode: Option<Mode>,
    #[serde(default)]
    pub hvac_action: Option<HvacAction>,
    #[serde(default)]
    pub preset_mode: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

//! Payloads exchanged with the sway bar protocol

use serde::{Deserialize, Serialize};

/// Supported subset of the i3/sway `barconfig` object
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SwaybarConfig {
    pub id: String,

    /// `dock`, `hide`, `invisible` or `overlay`
    pub mode: String,

    /// `hide` or `show`, only meaningful in `hide` mode
    pub hidden_state: String,

    pub position: String,

    /// Output names, empty for all outputs
    pub outputs: Vec<String>,
}

/// `bar_state_update` event
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BarStateUpdate {
    pub id: String,
    pub visible_by_modifier: bool,
}

/// `mode` event, the binding mode that was entered
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ModeEvent {
    pub change: String,
}

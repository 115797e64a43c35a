//! Bar modes: named bundles of layer, exclusivity, passthrough and visibility

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::constants::modes;
use crate::json::{FromJson, json_get_to};

/// Stacking tier of the bar surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarLayer {
    #[default]
    Bottom,
    Top,
    Overlay,
}

impl BarLayer {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "bottom" => Some(Self::Bottom),
            "top" => Some(Self::Top),
            "overlay" => Some(Self::Overlay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Overlay => "overlay",
        }
    }
}

impl fmt::Display for BarLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

crate::from_json_by_name!(BarLayer);

/// Visual and behavioral flags engaged together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarMode {
    /// `None` keeps whatever layer the surface is already on
    pub layer: Option<BarLayer>,
    pub exclusive: bool,
    pub passthrough: bool,
    pub visible: bool,
}

impl BarMode {
    const fn new(layer: Option<BarLayer>, exclusive: bool, passthrough: bool, visible: bool) -> Self {
        Self { layer, exclusive, passthrough, visible }
    }
}

/// Only the keys present in `j` are applied
impl FromJson for BarMode {
    fn from_json(&mut self, j: &Value) {
        if !j.is_object() {
            return;
        }
        // An unrecognized layer name still engages a layer: the bottom one
        if j["layer"].is_string() {
            json_get_to(&j["layer"], self.layer.insert(BarLayer::default()));
        }
        json_get_to(&j["exclusive"], &mut self.exclusive);
        json_get_to(&j["passthrough"], &mut self.passthrough);
        json_get_to(&j["visible"], &mut self.visible);
    }
}

pub type ModeMap = BTreeMap<String, BarMode>;

/// Built-in modes. Apart from `default`, these match the sway-bar(5) modes.
pub static PRESET_MODES: LazyLock<ModeMap> = LazyLock::new(|| {
    use BarLayer::*;
    BTreeMap::from([
        (modes::DEFAULT.to_string(), BarMode::new(Some(Bottom), true, false, true)),
        (modes::DOCK.to_string(), BarMode::new(Some(Bottom), true, false, true)),
        (modes::HIDE.to_string(), BarMode::new(Some(Top), false, false, true)),
        (modes::INVISIBLE.to_string(), BarMode::new(None, false, true, false)),
        (modes::OVERLAY.to_string(), BarMode::new(Some(Top), false, true, true)),
    ])
});

/// Resolve the mode table for a bar document.
///
/// Presets first, then each `modes` entry merged onto its namesake, then the
/// root-level `layer`/`exclusive`/`passthrough`/`visible` keys merged onto
/// `default`. The root keys therefore win over `modes.default`.
pub fn resolve_modes(doc: &Value) -> ModeMap {
    let mut map = PRESET_MODES.clone();
    if doc["modes"].is_object() {
        json_get_to(&doc["modes"], &mut map);
    }
    json_get_to(doc, map.entry(modes::DEFAULT.to_string()).or_default());
    map
}

//! Resolved configuration of a single bar
//!
//! [`BarConfig`] keeps the bar's JSON document next to the typed fields
//! derived from it. Modules read their own keys straight from the document
//! through [`BarConfig::get_module_config`].

use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use super::group::{bare_name, is_group_ref};
use super::margins::BarMargins;
use super::mode::{ModeMap, PRESET_MODES, resolve_modes};
use super::position::Position;
use crate::constants::{alt_format, modes, mouse, sections};
use crate::json::{FromJson, json_get_to};

/// When a sway bar modifier press resets the hidden state
#[cfg(feature = "sway")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierReset {
    #[default]
    Press,
    Release,
}

#[cfg(feature = "sway")]
impl ModifierReset {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "press" => Some(Self::Press),
            "release" => Some(Self::Release),
            _ => None,
        }
    }
}

#[cfg(feature = "sway")]
crate::from_json_by_name!(ModifierReset);

/// Parsed initial configuration for the bar
#[derive(Debug, Clone)]
pub struct BarConfig {
    json: Value,

    /// Output patterns, see [`output_matches`](crate::output::output_matches)
    pub outputs: Vec<String>,
    pub position: Option<Position>,
    /// Extra style class for the bar window
    pub name: Option<String>,

    pub margins: BarMargins,
    /// 0 lets the toolkit pick the size
    pub width: u32,
    pub height: u32,
    pub spacing: Option<i32>,

    /// Mode engaged at startup
    pub mode: Option<String>,
    /// Presets with the document's customizations applied
    pub modes: ModeMap,

    pub fixed_center: bool,
    pub start_hidden: bool,
    pub reload_styles: bool,

    #[cfg(feature = "sway")]
    pub ipc: bool,
    #[cfg(feature = "sway")]
    pub bar_id: Option<String>,
    #[cfg(feature = "sway")]
    pub modifier_reset: ModifierReset,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            json: Value::Null,
            outputs: Vec::new(),
            position: None,
            name: None,
            margins: BarMargins::default(),
            width: 0,
            height: 0,
            spacing: None,
            mode: None,
            modes: PRESET_MODES.clone(),
            fixed_center: true,
            start_hidden: false,
            reload_styles: false,
            #[cfg(feature = "sway")]
            ipc: false,
            #[cfg(feature = "sway")]
            bar_id: None,
            #[cfg(feature = "sway")]
            modifier_reset: ModifierReset::default(),
        }
    }
}

fn non_empty_str(j: &Value) -> Option<String> {
    j.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

impl FromJson for BarConfig {
    fn from_json(&mut self, j: &Value) {
        match &j["output"] {
            Value::Array(items) => {
                self.outputs = items.iter().filter_map(Value::as_str).map(str::to_owned).collect();
            }
            Value::String(output) => self.outputs = vec![output.clone()],
            _ => {}
        }

        if let Some(name) = non_empty_str(&j["name"]) {
            self.name = Some(name);
        }
        if let Some(mode) = non_empty_str(&j["mode"]) {
            self.mode = Some(mode);
        }

        if let Some(spacing) = j["spacing"].as_i64().and_then(|v| i32::try_from(v).ok()) {
            self.spacing = Some(spacing);
        }
        json_get_to(&j["width"], &mut self.width);
        json_get_to(&j["height"], &mut self.height);

        json_get_to(&j["fixed-center"], &mut self.fixed_center);
        json_get_to(&j["start_hidden"], &mut self.start_hidden);
        json_get_to(&j["reload_style_on_change"], &mut self.reload_styles);

        #[cfg(feature = "sway")]
        {
            json_get_to(&j["ipc"], &mut self.ipc);
            if let Some(id) = non_empty_str(&j["id"]) {
                self.bar_id = Some(id);
            }
            json_get_to(&j["modifier-reset"], &mut self.modifier_reset);
        }

        if let Some(raw) = j["position"].as_str().filter(|s| !s.is_empty()) {
            match Position::from_name(raw) {
                Some(position) => self.position = Some(position),
                None => warn!(position = %raw, "Unknown bar position, using the default"),
            }
        }

        self.modes = resolve_modes(j);
        json_get_to(j, &mut self.margins);
    }
}

/// Module references listed by a section or group. Missing and malformed
/// lists come back empty.
fn module_list<'a>(doc: &'a Value, reference: &str) -> &'a [Value] {
    let list = if reference.starts_with(sections::PREFIX) {
        &doc[reference]
    } else if is_group_ref(reference) {
        &doc[reference][sections::GROUP_MODULES]
    } else {
        return &[];
    };
    list.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn module_names<'a>(doc: &'a Value, reference: &str) -> impl Iterator<Item = &'a str> + use<'a> {
    module_list(doc, reference).iter().filter_map(Value::as_str)
}

impl BarConfig {
    pub fn new(json: Value) -> Self {
        let json = normalize_alt_click(&json);
        let mut config = Self::default();
        config.from_json(&json);
        config.json = json;
        config
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Module configuration object, null when the document has none
    pub fn get_module_config(&self, reference: &str) -> &Value {
        &self.json[reference]
    }

    /// Module names for a section (`modules-left`, ...) or a group
    /// (`group/<id>`), in render order
    pub fn get_module_list(&self, reference: &str) -> Vec<&str> {
        module_names(&self.json, reference).collect()
    }

    /// Check if the module is placed anywhere on the bar, groups included.
    /// A `#class` suffix on the listed name is ignored.
    pub fn is_module_enabled(&self, reference: &str) -> bool {
        let mut visited = HashSet::new();
        sections::ALL
            .iter()
            .any(|section| self.list_contains(section, reference, &mut visited))
    }

    fn list_contains<'a>(&'a self, list: &str, reference: &str, visited: &mut HashSet<&'a str>) -> bool {
        for name in module_names(&self.json, list) {
            if name == reference || bare_name(name) == reference {
                return true;
            }
            if is_group_ref(name) && visited.insert(name) && self.list_contains(name, reference, visited) {
                return true;
            }
        }
        false
    }

    /// Mode engaged when the bar is visible
    pub fn initial_mode(&self) -> &str {
        self.mode.as_deref().unwrap_or(modes::DEFAULT)
    }
}

/// Button code for a symbolic `format-alt-click` value
fn alt_click_button(value: &str) -> u32 {
    match value {
        "click-right" => mouse::BUTTON_RIGHT,
        "click-middle" => mouse::BUTTON_MIDDLE,
        "click-backward" => mouse::BUTTON_BACKWARD,
        "click-forward" => mouse::BUTTON_FORWARD,
        _ => mouse::BUTTON_LEFT,
    }
}

fn normalize_module_alt_click(module: &mut Value) {
    let Value::Object(obj) = module else {
        return;
    };
    if !obj.contains_key(alt_format::FORMAT_ALT) {
        return;
    }
    let button = match obj.get(alt_format::FORMAT_ALT_CLICK) {
        Some(Value::Number(n)) if n.is_u64() => return,
        Some(Value::String(s)) => alt_click_button(s),
        _ => mouse::BUTTON_LEFT,
    };
    obj.insert(alt_format::FORMAT_ALT_CLICK.to_string(), Value::from(button));
}

fn collect_modules<'a>(doc: &'a Value, list: &str, visited: &mut HashSet<&'a str>, out: &mut Vec<&'a str>) {
    for name in module_names(doc, list) {
        if is_group_ref(name) {
            // Each group is walked once, which also breaks reference cycles
            if visited.insert(name) {
                collect_modules(doc, name, visited, out);
            }
        } else {
            out.push(name);
        }
    }
}

/// Copy of `doc` where every module placed on the bar that has a
/// `format-alt` also has a numeric `format-alt-click` button code.
/// Values that are already numeric are kept.
pub fn normalize_alt_click(doc: &Value) -> Value {
    let mut visited = HashSet::new();
    let mut placed = Vec::new();
    for section in sections::ALL {
        collect_modules(doc, section, &mut visited, &mut placed);
    }

    let mut normalized = doc.clone();
    if let Value::Object(obj) = &mut normalized {
        for name in placed {
            if let Some(module) = obj.get_mut(name) {
                normalize_module_alt_click(module);
            }
        }
    }
    normalized
}

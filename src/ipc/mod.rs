//! Sway bar sync
//!
//! Keeps a [`BarInstance`] in line with the compositor's `barconfig` for the
//! bar's id and with the `bar_state_update` / `mode` events. Only the shape
//! of those payloads lives here; the socket client is an external
//! collaborator that feeds them in.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

mod messages;
pub use messages::{BarStateUpdate, ModeEvent, SwaybarConfig};

use crate::bar::config::ModifierReset;
use crate::bar::instance::BarInstance;
use crate::bar::surface::LayerSurface;
use crate::constants::{modes, sway::DEFAULT_BAR_ID};

/// Binding mode reported when no mode is active
const BINDING_MODE_DEFAULT: &str = "default";

/// Bar id to follow: the configured one, else the one the compositor
/// launched us with, else `bar-0`
pub fn resolve_bar_id(configured: Option<&str>, fallback: Option<&str>) -> String {
    configured
        .or(fallback)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_BAR_ID)
        .to_string()
}

/// Parse one JSON payload received from the compositor
pub fn parse_payload<T: DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .with_context(|| format!("Failed to parse {}", std::any::type_name::<T>()))
}

/// Mode a sway bar should be in. `revealed` is set while a modifier,
/// binding mode or urgent workspace asks for the bar.
pub fn swaybar_mode(config: &SwaybarConfig, revealed: bool) -> &str {
    let visible = match config.mode.as_str() {
        modes::INVISIBLE => false,
        modes::HIDE if config.hidden_state == modes::HIDE => revealed,
        _ => true,
    };
    if visible { &config.mode } else { modes::INVISIBLE }
}

impl<S: LayerSurface> BarInstance<S> {
    pub fn bar_id(&self) -> &str {
        &self.bar_id
    }

    /// Use the id the compositor passed on the command line unless the
    /// config names one
    pub fn set_fallback_bar_id(&mut self, fallback: &str) {
        self.bar_id = resolve_bar_id(self.config.bar_id.as_deref(), Some(fallback));
    }

    /// Last `hidden_state` received from the compositor
    pub fn hidden_state(&self) -> Option<&str> {
        self.hidden_state.as_deref()
    }

    /// Apply a `barconfig` update. Updates for other bars are ignored.
    /// Returns whether the update was applied.
    pub fn apply_swaybar_config(&mut self, config: &SwaybarConfig, revealed: bool) -> bool {
        if config.id != self.bar_id {
            debug!(id = %config.id, bar_id = %self.bar_id, "Ignoring config for another bar");
            return false;
        }
        info!(id = %config.id, mode = %config.mode, position = %config.position, "Received bar config");

        self.set_outputs(config.outputs.clone());
        self.set_position(&config.position);
        self.hidden_state = Some(config.hidden_state.clone());
        self.set_mode(swaybar_mode(config, revealed));
        true
    }
}

/// Visibility state driven by sway events
#[derive(Debug, Default)]
pub struct SwaybarSync {
    config: Option<SwaybarConfig>,
    modifier_reset: ModifierReset,
    visible_by_modifier: bool,
    visible_by_mode: bool,
    visible_by_urgency: bool,
    /// Modifier is held and nothing else happened yet
    modifier_no_action: bool,
}

impl SwaybarSync {
    pub fn new(modifier_reset: ModifierReset) -> Self {
        Self { modifier_reset, ..Default::default() }
    }

    pub fn revealed(&self) -> bool {
        self.visible_by_modifier || self.visible_by_mode || self.visible_by_urgency
    }

    pub fn on_config<S: LayerSurface>(&mut self, bar: &mut BarInstance<S>, config: SwaybarConfig) {
        if bar.apply_swaybar_config(&config, self.revealed()) {
            self.config = Some(config);
        }
    }

    pub fn on_bar_state_update<S: LayerSurface>(&mut self, bar: &mut BarInstance<S>, event: &BarStateUpdate) {
        if event.id != bar.bar_id() {
            return;
        }

        if event.visible_by_modifier {
            self.modifier_no_action = true;
            if self.modifier_reset == ModifierReset::Press {
                self.visible_by_urgency = false;
            }
        } else if self.modifier_reset == ModifierReset::Release && self.modifier_no_action {
            self.visible_by_urgency = false;
        }
        self.visible_by_modifier = event.visible_by_modifier;
        self.update(bar);
    }

    pub fn on_mode<S: LayerSurface>(&mut self, bar: &mut BarInstance<S>, event: &ModeEvent) {
        self.modifier_no_action = false;
        self.visible_by_mode = event.change != BINDING_MODE_DEFAULT;
        self.update(bar);
    }

    /// Some workspace became urgent, or the last urgent one was cleared
    pub fn on_urgency<S: LayerSurface>(&mut self, bar: &mut BarInstance<S>, urgent: bool) {
        self.modifier_no_action = false;
        self.visible_by_urgency = urgent;
        self.update(bar);
    }

    fn update<S: LayerSurface>(&self, bar: &mut BarInstance<S>) {
        if let Some(config) = &self.config {
            bar.set_mode(swaybar_mode(config, self.revealed()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::config::BarConfig;
    use crate::bar::position::Position;
    use crate::bar::surface::tests::RecordingSurface;
    use serde_json::json;

    fn instance(doc: serde_json::Value) -> BarInstance<RecordingSurface> {
        BarInstance::new(BarConfig::new(doc))
    }

    fn hide_config() -> SwaybarConfig {
        SwaybarConfig {
            id: "bar-0".to_string(),
            mode: "hide".to_string(),
            hidden_state: "hide".to_string(),
            position: "bottom".to_string(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_bar_id() {
        assert_eq!(resolve_bar_id(Some("main"), Some("bar-1")), "main");
        assert_eq!(resolve_bar_id(None, Some("bar-1")), "bar-1");
        assert_eq!(resolve_bar_id(None, None), "bar-0");
        assert_eq!(resolve_bar_id(None, Some("")), "bar-0");
    }

    #[test]
    fn test_fallback_bar_id() {
        let mut inst = instance(json!({}));
        assert_eq!(inst.bar_id(), "bar-0");
        inst.set_fallback_bar_id("bar-2");
        assert_eq!(inst.bar_id(), "bar-2");

        let mut inst = instance(json!({"id": "main"}));
        inst.set_fallback_bar_id("bar-2");
        assert_eq!(inst.bar_id(), "main");
    }

    #[test]
    fn test_parse_barconfig() {
        let config: SwaybarConfig = parse_payload(
            r#"{"id": "bar-0", "mode": "dock", "position": "top", "hidden_state": "hide",
                "outputs": ["eDP-1"], "status_command": "i3status", "colors": {}}"#,
        )
        .unwrap();
        assert_eq!(config.mode, "dock");
        assert_eq!(config.outputs, vec!["eDP-1"]);

        let event: BarStateUpdate = parse_payload(r#"{"id": "bar-0", "visible_by_modifier": true}"#).unwrap();
        assert!(event.visible_by_modifier);

        assert!(parse_payload::<ModeEvent>("{not json").is_err());
    }

    #[test]
    fn test_swaybar_mode() {
        let mut config = hide_config();
        assert_eq!(swaybar_mode(&config, false), modes::INVISIBLE);
        assert_eq!(swaybar_mode(&config, true), modes::HIDE);

        config.hidden_state = "show".to_string();
        assert_eq!(swaybar_mode(&config, false), modes::HIDE);

        config.mode = "invisible".to_string();
        assert_eq!(swaybar_mode(&config, true), modes::INVISIBLE);

        config.mode = "dock".to_string();
        assert_eq!(swaybar_mode(&config, false), modes::DOCK);
    }

    #[test]
    fn test_apply_swaybar_config() {
        let mut inst = instance(json!({}));
        let config = SwaybarConfig {
            mode: "overlay".to_string(),
            outputs: vec!["eDP-1".to_string()],
            ..hide_config()
        };

        assert!(inst.apply_swaybar_config(&config, false));
        assert_eq!(inst.mode(), modes::OVERLAY);
        assert_eq!(inst.position(), Position::Bottom);
        assert_eq!(inst.outputs(), ["eDP-1"]);
        assert_eq!(inst.hidden_state(), Some("hide"));
    }

    #[test]
    fn test_config_for_other_bar_ignored() {
        let mut inst = instance(json!({"id": "main"}));
        let mut sync = SwaybarSync::default();
        sync.on_config(&mut inst, hide_config());

        assert_eq!(inst.mode(), modes::DEFAULT);
        assert_eq!(inst.hidden_state(), None);

        // Nothing to apply events against yet
        sync.on_mode(&mut inst, &ModeEvent { change: "resize".to_string() });
        assert_eq!(inst.mode(), modes::DEFAULT);
    }

    #[test]
    fn test_events_reveal_hidden_bar() {
        let mut inst = instance(json!({}));
        let mut sync = SwaybarSync::default();
        sync.on_config(&mut inst, hide_config());
        assert_eq!(inst.mode(), modes::INVISIBLE);

        let pressed = BarStateUpdate { id: "bar-0".to_string(), visible_by_modifier: true };
        let released = BarStateUpdate { visible_by_modifier: false, ..pressed.clone() };

        sync.on_bar_state_update(&mut inst, &pressed);
        assert_eq!(inst.mode(), modes::HIDE);
        sync.on_bar_state_update(&mut inst, &released);
        assert_eq!(inst.mode(), modes::INVISIBLE);

        sync.on_mode(&mut inst, &ModeEvent { change: "resize".to_string() });
        assert_eq!(inst.mode(), modes::HIDE);
        sync.on_mode(&mut inst, &ModeEvent { change: "default".to_string() });
        assert_eq!(inst.mode(), modes::INVISIBLE);

        // Another bar's modifier state
        let other = BarStateUpdate { id: "bar-1".to_string(), visible_by_modifier: true };
        sync.on_bar_state_update(&mut inst, &other);
        assert_eq!(inst.mode(), modes::INVISIBLE);
    }

    #[test]
    fn test_modifier_press_resets_urgency() {
        let mut inst = instance(json!({}));
        let mut sync = SwaybarSync::new(ModifierReset::Press);
        sync.on_config(&mut inst, hide_config());

        sync.on_urgency(&mut inst, true);
        assert_eq!(inst.mode(), modes::HIDE);

        let pressed = BarStateUpdate { id: "bar-0".to_string(), visible_by_modifier: true };
        sync.on_bar_state_update(&mut inst, &pressed);
        sync.on_bar_state_update(&mut inst, &BarStateUpdate { visible_by_modifier: false, ..pressed });
        assert_eq!(inst.mode(), modes::INVISIBLE);
    }

    #[test]
    fn test_modifier_release_resets_urgency_only_without_action() {
        let mut inst = instance(json!({}));
        let mut sync = SwaybarSync::new(ModifierReset::Release);
        sync.on_config(&mut inst, hide_config());
        sync.on_urgency(&mut inst, true);

        let pressed = BarStateUpdate { id: "bar-0".to_string(), visible_by_modifier: true };
        let released = BarStateUpdate { visible_by_modifier: false, ..pressed.clone() };

        // An action while the modifier is held keeps the urgent reveal
        sync.on_bar_state_update(&mut inst, &pressed);
        sync.on_mode(&mut inst, &ModeEvent { change: "default".to_string() });
        sync.on_bar_state_update(&mut inst, &released);
        assert_eq!(inst.mode(), modes::HIDE);

        sync.on_bar_state_update(&mut inst, &pressed);
        sync.on_bar_state_update(&mut inst, &released);
        assert_eq!(inst.mode(), modes::INVISIBLE);
    }
}

//! Runtime state shared by every bar created from one config

use tracing::{debug, info, warn};

use super::config::BarConfig;
use super::position::Position;
use super::surface::{Bar, LayerSurface, Rect};
use crate::constants::modes;
use crate::output::{Output, output_matches};

pub struct BarInstance<S> {
    pub config: BarConfig,
    mode: String,
    position: Position,
    visible: bool,
    /// Runtime output patterns, seeded from the config
    outputs: Vec<String>,
    bars: Vec<Bar<S>>,
    #[cfg(feature = "sway")]
    pub(crate) bar_id: String,
    #[cfg(feature = "sway")]
    pub(crate) hidden_state: Option<String>,
}

impl<S: LayerSurface> BarInstance<S> {
    pub fn new(config: BarConfig) -> Self {
        let visible = !config.start_hidden;
        let mode = if visible { config.initial_mode() } else { modes::INVISIBLE };
        Self {
            mode: mode.to_string(),
            position: config.position.unwrap_or_default(),
            visible,
            outputs: config.outputs.clone(),
            bars: Vec::new(),
            #[cfg(feature = "sway")]
            bar_id: crate::ipc::resolve_bar_id(config.bar_id.as_deref(), None),
            #[cfg(feature = "sway")]
            hidden_state: None,
            config,
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn bars(&self) -> &[Bar<S>] {
        &self.bars
    }

    pub fn bar_mut(&mut self, output: &str) -> Option<&mut Bar<S>> {
        self.bars.iter_mut().find(|bar| bar.output.name == output)
    }

    pub fn is_output_enabled(&self, output: &Output) -> bool {
        output_matches(&self.outputs, output)
    }

    /// Create a bar on `output` unless it is filtered out or already has one.
    /// Returns whether a bar was created.
    pub fn on_output_added(&mut self, output: Output, monitor: Rect, surface: S) -> bool {
        if !self.is_output_enabled(&output) {
            debug!(output = %output, "Output not enabled for this bar");
            return false;
        }
        if self.bars.iter().any(|bar| bar.output.name == output.name) {
            return false;
        }

        info!(output = %output, "Bar created");
        let bar = Bar::new(&self.config, output, monitor, surface, self.position, &self.mode);
        self.bars.push(bar);
        true
    }

    pub fn on_output_removed(&mut self, name: &str) {
        self.bars.retain(|bar| {
            let keep = bar.output.name != name;
            if !keep {
                info!(output = %name, "Bar removed from output");
            }
            keep
        });
    }

    pub fn set_mode(&mut self, mode: &str) {
        if !self.config.modes.contains_key(mode) {
            warn!(mode = %mode, "Invalid mode");
            return;
        }
        if mode == self.mode {
            return;
        }

        self.mode = mode.to_string();
        for bar in &mut self.bars {
            bar.on_mode_change(&self.config, mode);
        }
    }

    /// Move the bars to another edge. Ignored when the config pins the
    /// position; an update that would change the orientation is refused.
    pub fn set_position(&mut self, position: &str) {
        if self.config.position.is_some() {
            return;
        }

        let Some(new_position) = Position::from_name(position) else {
            return;
        };
        if new_position == self.position {
            return;
        }

        if new_position.orientation() != self.position.orientation() {
            warn!(
                from = %self.position,
                to = %new_position,
                "Invalid position update, refusing to change bar orientation"
            );
            return;
        }
        debug!(from = %self.position, to = %new_position, "Bar position updated");

        self.position = new_position;
        for bar in &mut self.bars {
            bar.on_position_change(&self.config, new_position);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let mode = if visible { self.config.initial_mode() } else { modes::INVISIBLE }.to_string();
        self.set_mode(&mode);
    }

    pub fn toggle(&mut self) {
        self.set_visible(!self.visible);
    }

    /// Replace the output patterns and drop bars on outputs they no longer
    /// enable. Newly enabled outputs get a bar on their next `on_output_added`.
    pub fn set_outputs(&mut self, patterns: Vec<String>) {
        self.outputs = patterns;
        let outputs = &self.outputs;
        self.bars.retain(|bar| {
            let keep = output_matches(outputs, &bar.output);
            if !keep {
                info!(output = %bar.output, "Bar removed from output");
            }
            keep
        });
    }

    pub fn configure(&mut self, output: &str, width: u32, height: u32) {
        let Some(bar) = self.bars.iter_mut().find(|bar| bar.output.name == output) else {
            warn!(output = %output, "Configure event for an output without a bar");
            return;
        };
        bar.configure(&self.config, width, height);
    }
}

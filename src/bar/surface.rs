//! Per-output bar window
//!
//! The windowing toolkit is reached only through [`LayerSurface`]. [`Bar`]
//! turns configuration and runtime state (mode, position, size) into calls
//! on that surface.

use tracing::{debug, info, warn};

use super::config::BarConfig;
use super::margins::BarMargins;
use super::mode::{BarLayer, BarMode};
use super::position::{Orientation, Position};
use crate::constants::modes;
use crate::output::Output;

/// Monitor geometry in global compositor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Screen edges the surface is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Anchors {
    /// Attach to every edge except the one facing away from `position`.
    /// A fixed size along the bar's length also releases both ends.
    pub fn for_position(position: Position, width: u32, height: u32) -> Self {
        let mut anchors = Self { left: true, right: true, top: true, bottom: true };
        match position {
            Position::Left => anchors.right = false,
            Position::Right => anchors.left = false,
            Position::Bottom => anchors.top = false,
            Position::Top => anchors.bottom = false,
        }

        match position.orientation() {
            Orientation::Vertical if height > 1 => {
                anchors.top = false;
                anchors.bottom = false;
            }
            Orientation::Horizontal if width > 1 => {
                anchors.left = false;
                anchors.right = false;
            }
            _ => {}
        }
        anchors
    }
}

/// Layer-shell window operations the bar needs from the toolkit
pub trait LayerSurface {
    fn set_layer(&mut self, layer: BarLayer);
    /// `true` reserves space matching the surface size, `false` reserves none
    fn set_exclusive_zone(&mut self, auto: bool);
    /// Let pointer input fall through to the windows below
    fn set_passthrough(&mut self, passthrough: bool);
    fn set_visible(&mut self, visible: bool);
    fn set_anchors(&mut self, anchors: Anchors);
    fn set_margins(&mut self, margins: BarMargins);
    /// 0 on either axis lets the toolkit decide
    fn set_size_request(&mut self, width: u32, height: u32);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
}

pub struct Bar<S> {
    pub output: Output,
    surface: S,
    monitor: Rect,
    position: Position,
    orientation: Orientation,
    width: u32,
    height: u32,
    last_mode: String,
    offset: (i32, i32),
}

impl<S: LayerSurface> Bar<S> {
    /// Set up `surface` for `output` and engage the initial position and mode
    pub fn new(
        config: &BarConfig,
        output: Output,
        monitor: Rect,
        mut surface: S,
        position: Position,
        mode: &str,
    ) -> Self {
        surface.add_class(&output.name);
        if let Some(name) = &config.name {
            surface.add_class(name);
        }
        surface.add_class(position.as_str());
        surface.set_margins(config.margins);
        surface.set_size_request(config.width, config.height);

        let mut bar = Self {
            output,
            surface,
            monitor,
            position,
            orientation: position.orientation(),
            width: config.width,
            height: config.height,
            last_mode: modes::DEFAULT.to_string(),
            offset: (0, 0),
        };
        bar.on_position_change(config, position);
        bar.on_mode_change(config, mode);
        bar
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Style class suffix of the mode currently applied
    pub fn mode(&self) -> &str {
        &self.last_mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bar origin in global coordinates, as of the last configure
    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn on_mode_change(&mut self, config: &BarConfig, mode: &str) {
        self.surface.remove_class(&mode_class(&self.last_mode));

        let bar_mode = match config.modes.get(mode) {
            Some(bar_mode) => {
                self.last_mode = mode.to_string();
                *bar_mode
            }
            None => {
                warn!(mode = %mode, output = %self.output.name, "Unknown mode requested");
                self.last_mode = modes::DEFAULT.to_string();
                config.modes.get(modes::DEFAULT).copied().unwrap_or_default()
            }
        };

        self.surface.add_class(&mode_class(&self.last_mode));
        self.apply_mode(&bar_mode);
    }

    fn apply_mode(&mut self, mode: &BarMode) {
        if let Some(layer) = mode.layer {
            self.surface.set_layer(layer);
        }
        self.surface.set_exclusive_zone(mode.exclusive);
        self.surface.set_passthrough(mode.passthrough);
        self.surface.set_visible(mode.visible);
    }

    pub fn on_position_change(&mut self, config: &BarConfig, position: Position) {
        let anchors = Anchors::for_position(position, config.width, config.height);

        self.surface.remove_class(self.position.as_str());
        self.position = position;
        self.surface.add_class(position.as_str());

        self.surface.set_anchors(anchors);
        debug!(position = %position, output = %self.output.name, ?anchors, "Bar anchored");
    }

    /// The toolkit settled on a size for the window
    pub fn configure(&mut self, config: &BarConfig, width: u32, height: u32) {
        match self.orientation {
            Orientation::Vertical if self.width > 1 && width > self.width => {
                warn!(
                    requested = self.width,
                    required = width,
                    "Requested width is less than the minimum width required by the modules"
                );
            }
            Orientation::Horizontal if self.height > 1 && height > self.height => {
                warn!(
                    requested = self.height,
                    required = height,
                    "Requested height is less than the minimum height required by the modules"
                );
            }
            _ => {}
        }
        self.width = width;
        self.height = height;

        self.offset = global_offset(self.position, &config.margins, self.monitor, width, height);
        info!(width, height, output = %self.output.name, "Bar configured");
    }

    pub fn on_monitor_geometry_changed(&mut self, config: &BarConfig, monitor: Rect) {
        self.monitor = monitor;
        self.offset = global_offset(self.position, &config.margins, monitor, self.width, self.height);
    }
}

fn mode_class(mode: &str) -> String {
    format!("{}{mode}", modes::CLASS_PREFIX)
}

/// Top-left corner of a `width` x `height` bar on `monitor`, in global
/// coordinates. Along its length the bar is centered unless it and its
/// margins fill the monitor. Results past the `i32` range are clamped.
pub fn global_offset(
    position: Position,
    margins: &BarMargins,
    monitor: Rect,
    width: u32,
    height: u32,
) -> (i32, i32) {
    let (width, height) = (i64::from(width), i64::from(height));
    let [top, right, bottom, left] =
        [margins.top, margins.right, margins.bottom, margins.left].map(i64::from);
    let [mx, my, mw, mh] = [monitor.x, monitor.y, monitor.width, monitor.height].map(i64::from);

    let along_x = || if width + left + right >= mw { left } else { (mw - width) / 2 };
    let along_y = || if height + top + bottom >= mh { top } else { (mh - height) / 2 };

    let (x, y) = match position {
        Position::Top => (along_x(), top),
        Position::Bottom => (along_x(), mh - height - bottom),
        Position::Left => (left, along_y()),
        Position::Right => (mw - width - right, along_y()),
    };
    (clamp_i32(x + mx), clamp_i32(y + my))
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

//! Application-wide constants
//!
//! Config keys, well-known names and numeric codes shared by the bar config
//! resolution and the runtime bar state.

/// Module list sections and group references
pub mod sections {
    /// Prefix shared by the three section keys
    pub const PREFIX: &str = "modules-";

    pub const LEFT: &str = "modules-left";
    pub const CENTER: &str = "modules-center";
    pub const RIGHT: &str = "modules-right";

    /// All sections in render order
    pub const ALL: [&str; 3] = [LEFT, CENTER, RIGHT];

    /// Prefix of a group reference (`group/<id>[#<class>]`)
    pub const GROUP_PREFIX: &str = "group/";

    /// Key holding a group's module list
    pub const GROUP_MODULES: &str = "modules";

    /// Separator between a module or group name and its CSS class suffix
    pub const CLASS_SEPARATOR: char = '#';
}

/// Mode names the bar relies on
pub mod modes {
    /// Holds the global bar options
    pub const DEFAULT: &str = "default";

    /// Engaged when the bar is hidden
    pub const INVISIBLE: &str = "invisible";

    pub const DOCK: &str = "dock";
    pub const HIDE: &str = "hide";
    pub const OVERLAY: &str = "overlay";

    /// Style class prefix for the active mode
    pub const CLASS_PREFIX: &str = "mode-";
}

/// Mouse button codes used by module click handlers
pub mod mouse {
    /// Left mouse button number
    pub const BUTTON_LEFT: u32 = 1;

    /// Middle mouse button number
    pub const BUTTON_MIDDLE: u32 = 2;

    /// Right mouse button number
    pub const BUTTON_RIGHT: u32 = 3;

    /// Back side button
    pub const BUTTON_BACKWARD: u32 = 8;

    /// Forward side button
    pub const BUTTON_FORWARD: u32 = 9;
}

/// Alternate format keys on module objects
pub mod alt_format {
    pub const FORMAT_ALT: &str = "format-alt";
    pub const FORMAT_ALT_CLICK: &str = "format-alt-click";
}

/// Config file discovery
pub mod config {
    /// Directory under the XDG config dirs
    pub const APP_DIR: &str = "wlbar";

    /// Candidate file names, tried in order
    pub const FILENAMES: [&str; 3] = ["config.jsonc", "config.json", "config"];

    /// System-wide fallback directory
    pub const SYSTEM_DIR: &str = "/etc/xdg";

    /// Key listing other config files to merge in
    pub const INCLUDE_KEY: &str = "include";

    /// Maximum nesting of `include` chains
    pub const MAX_INCLUDE_DEPTH: usize = 8;
}

/// Sway bar sync defaults
#[cfg(feature = "sway")]
pub mod sway {
    /// Bar id used when neither the config nor the compositor names one
    pub const DEFAULT_BAR_ID: &str = "bar-0";
}

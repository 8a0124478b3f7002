//! Typed desktop configuration loaded from TOML.
//!
//! Every field has a default, so an empty document (or no document at all) yields a usable
//! desktop. Semantic checks live in [`DesktopConfig::validate`]; loading only handles I/O and
//! TOML decoding.

use std::fs;
use std::path::Path;

use platform_host::{Vec2, WindowRect};
use serde::{Deserialize, Serialize};

use crate::error::{DesktopError, DesktopResult};

/// Tunables for hit-testing, window behavior, animation timing, and screen layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Pointer travel (units) before a title-bar press becomes a drag.
    pub drag_threshold: f32,
    /// Width of the resize band along each window edge.
    pub resize_margin: f32,
    /// Minimum window width and height.
    pub min_window_size: f32,
    /// Distance from a screen edge that arms a snap target while dragging.
    pub snap_distance: f32,
    /// Height of the standard title bar.
    pub title_bar_height: f32,
    /// Height of the taskbar along the bottom edge.
    pub taskbar_height: f32,
    /// Width of one taskbar button.
    pub taskbar_button_width: f32,
    /// Frames within which a second title-bar press counts as a double-click.
    pub double_click_frames: u32,
    /// Frames an element must stay hovered before its tooltip shows.
    pub tooltip_delay_frames: u32,
    /// Frames a submenu entry must stay hovered before the submenu opens.
    pub submenu_open_delay_frames: u32,
    /// Frames the pointer may spend outside an open submenu before it closes.
    pub submenu_close_delay_frames: u32,
    /// Frames a flashed modal window alternates its title highlight.
    pub flash_frames: u32,
    /// Seconds for the minimize animation.
    pub minimize_duration: f32,
    /// Seconds for the restore-from-minimized animation.
    pub restore_duration: f32,
    /// Seconds for maximize and un-maximize.
    pub maximize_duration: f32,
    /// Seconds for the close fade.
    pub close_duration: f32,
    /// Seconds for the edge-snap animation.
    pub snap_duration: f32,
    /// Seconds for a cancelled drag payload to return to its source.
    pub drag_snap_back_duration: f32,
    /// Screen width in desktop units.
    pub screen_width: f32,
    /// Screen height in desktop units.
    pub screen_height: f32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            resize_margin: 6.0,
            min_window_size: 100.0,
            snap_distance: 10.0,
            title_bar_height: 28.0,
            taskbar_height: 40.0,
            taskbar_button_width: 160.0,
            double_click_frames: 30,
            tooltip_delay_frames: 30,
            submenu_open_delay_frames: 15,
            submenu_close_delay_frames: 20,
            flash_frames: 24,
            minimize_duration: 0.25,
            restore_duration: 0.25,
            maximize_duration: 0.2,
            close_duration: 0.15,
            snap_duration: 0.2,
            drag_snap_back_duration: 0.3,
            screen_width: 1280.0,
            screen_height: 800.0,
        }
    }
}

impl DesktopConfig {
    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::Config`] when the document is not valid TOML for this schema.
    pub fn from_toml_str(raw: &str) -> DesktopResult<Self> {
        toml::from_str(raw)
            .map_err(|err| DesktopError::config(format!("failed to parse desktop config: {err}")))
    }

    /// Reads and parses a TOML file, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::Config`] when the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> DesktopResult<Self> {
        let body = fs::read_to_string(path).map_err(|err| {
            DesktopError::config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&body)
            .map_err(|err| DesktopError::config(format!("{}: {err}", path.display())))?
            .validate()
    }

    /// Clamps recoverable values and rejects unusable ones.
    ///
    /// Negative or non-finite distances and durations fall back to their defaults. A screen
    /// too small to hold the taskbar plus one minimum-size window is an error.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::Config`] for an unusable screen size.
    pub fn validate(mut self) -> DesktopResult<Self> {
        let defaults = Self::default();
        let sanitize = |value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                tracing::warn!(value, fallback, "desktop config value out of range");
                fallback
            }
        };

        self.drag_threshold = sanitize(self.drag_threshold, defaults.drag_threshold);
        self.resize_margin = sanitize(self.resize_margin, defaults.resize_margin);
        self.min_window_size = sanitize(self.min_window_size, defaults.min_window_size).max(1.0);
        self.snap_distance = sanitize(self.snap_distance, defaults.snap_distance);
        self.title_bar_height = sanitize(self.title_bar_height, defaults.title_bar_height);
        self.taskbar_height = sanitize(self.taskbar_height, defaults.taskbar_height);
        self.taskbar_button_width =
            sanitize(self.taskbar_button_width, defaults.taskbar_button_width).max(1.0);
        self.minimize_duration = sanitize(self.minimize_duration, defaults.minimize_duration);
        self.restore_duration = sanitize(self.restore_duration, defaults.restore_duration);
        self.maximize_duration = sanitize(self.maximize_duration, defaults.maximize_duration);
        self.close_duration = sanitize(self.close_duration, defaults.close_duration);
        self.snap_duration = sanitize(self.snap_duration, defaults.snap_duration);
        self.drag_snap_back_duration =
            sanitize(self.drag_snap_back_duration, defaults.drag_snap_back_duration);

        let usable = self.screen_width.is_finite()
            && self.screen_height.is_finite()
            && self.screen_width >= self.min_window_size
            && self.screen_height >= self.min_window_size + self.taskbar_height;
        if !usable {
            return Err(DesktopError::config(format!(
                "screen {}x{} cannot hold a {} unit window above a {} unit taskbar",
                self.screen_width, self.screen_height, self.min_window_size, self.taskbar_height
            )));
        }
        Ok(self)
    }

    /// Full screen rectangle.
    pub fn screen_rect(&self) -> WindowRect {
        WindowRect::new(0.0, 0.0, self.screen_width, self.screen_height)
    }

    /// Screen minus the taskbar; maximize and snap targets live here.
    pub fn work_area(&self) -> WindowRect {
        WindowRect::new(
            0.0,
            0.0,
            self.screen_width,
            (self.screen_height - self.taskbar_height).max(self.min_window_size),
        )
    }

    /// Minimum window size as a vector.
    pub fn min_size(&self) -> Vec2 {
        Vec2::new(self.min_window_size, self.min_window_size)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = DesktopConfig::from_toml_str("").expect("parse empty");
        assert_eq!(config, DesktopConfig::default());
        assert_eq!(config.drag_threshold, 5.0);
        assert_eq!(config.resize_margin, 6.0);
        assert_eq!(config.min_window_size, 100.0);
        assert_eq!(config.snap_distance, 10.0);
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let raw = "screen_width = 1920.0\ntooltip_delay_frames = 10";
        let config = DesktopConfig::from_toml_str(raw).expect("parse");
        assert_eq!(config.screen_width, 1920.0);
        assert_eq!(config.tooltip_delay_frames, 10);
        assert_eq!(config.screen_height, 800.0);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = DesktopConfig::from_toml_str("drag_threshold = \"far\"").expect_err("bad type");
        assert!(matches!(err, DesktopError::Config(_)));
    }

    #[test]
    fn validate_clamps_negative_values_and_rejects_tiny_screens() {
        let config = DesktopConfig {
            drag_threshold: -3.0,
            close_duration: f32::NAN,
            ..DesktopConfig::default()
        }
        .validate()
        .expect("recoverable");
        assert_eq!(config.drag_threshold, 5.0);
        assert_eq!(config.close_duration, 0.15);

        let tiny = DesktopConfig {
            screen_height: 90.0,
            ..DesktopConfig::default()
        };
        assert!(matches!(tiny.validate(), Err(DesktopError::Config(_))));
    }

    #[test]
    fn work_area_excludes_the_taskbar() {
        let config = DesktopConfig::default();
        assert_eq!(config.work_area(), WindowRect::new(0.0, 0.0, 1280.0, 760.0));
    }

    #[test]
    fn load_reports_missing_files() {
        let missing = std::env::temp_dir().join("desktop-runtime-config-test-missing.toml");
        let err = DesktopConfig::load(&missing).expect_err("missing file");
        assert!(err.to_string().contains("failed to read"));
    }
}

//! Game configuration.
//!
//! Settings are loaded from an INI configuration file. Defaults are safe for
//! startup, and any key missing from the file keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//!
//! [physics]
//! gravity = 980.0
//! fixed_dt = 0.0166667
//!
//! [player]
//! speed = 220.0
//! jump_speed = 520.0
//! lives = 3
//!
//! [game]
//! level = assets/levels/level1.json
//! editor_output = assets/levels/edited.json
//! cutscene_seconds = 2.0
//! grid = 32.0
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::rigidbody::DEFAULT_GRAVITY;

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FIXED_DT: f32 = 1.0 / 60.0;
const DEFAULT_PLAYER_SPEED: f32 = 220.0;
const DEFAULT_JUMP_SPEED: f32 = 520.0;
const DEFAULT_LIVES: u32 = 3;
const DEFAULT_LEVEL: &str = "assets/levels/level1.json";
const DEFAULT_EDITOR_OUTPUT: &str = "assets/levels/edited.json";
const DEFAULT_CUTSCENE_SECONDS: f32 = 2.0;
const DEFAULT_GRID: f32 = 32.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path:?}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("failed to save config file {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Game configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Default downward gravity for moving bodies.
    pub gravity: f32,
    /// Length of one simulation step in seconds.
    pub fixed_dt: f32,
    /// Horizontal player speed.
    pub player_speed: f32,
    /// Initial upward speed of a jump.
    pub jump_speed: f32,
    pub lives: u32,
    /// Level loaded by the running screen and the editor.
    pub level_path: PathBuf,
    /// Where the editor saves.
    pub editor_output: PathBuf,
    pub cutscene_seconds: f32,
    /// Editor placement grid size.
    pub grid: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            gravity: DEFAULT_GRAVITY,
            fixed_dt: DEFAULT_FIXED_DT,
            player_speed: DEFAULT_PLAYER_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            lives: DEFAULT_LIVES,
            level_path: PathBuf::from(DEFAULT_LEVEL),
            editor_output: PathBuf::from(DEFAULT_EDITOR_OUTPUT),
            cutscene_seconds: DEFAULT_CUTSCENE_SECONDS,
            grid: DEFAULT_GRID,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing or unparsable values retain their current values.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(|message| ConfigError::Load {
            path: self.config_path.clone(),
            message,
        })?;

        let float = |section: &str, key: &str| config.getfloat(section, key).ok().flatten().map(|v| v as f32);
        let uint = |section: &str, key: &str| config.getuint(section, key).ok().flatten().map(|v| v as u32);

        // [window] section
        if let Some(width) = uint("window", "width") {
            self.window_width = width;
        }
        if let Some(height) = uint("window", "height") {
            self.window_height = height;
        }
        if let Some(fps) = uint("window", "target_fps") {
            self.target_fps = fps;
        }

        // [physics] section
        if let Some(gravity) = float("physics", "gravity") {
            self.gravity = gravity;
        }
        if let Some(dt) = float("physics", "fixed_dt").filter(|dt| *dt > 0.0) {
            self.fixed_dt = dt;
        }

        // [player] section
        if let Some(speed) = float("player", "speed") {
            self.player_speed = speed;
        }
        if let Some(jump) = float("player", "jump_speed") {
            self.jump_speed = jump;
        }
        if let Some(lives) = uint("player", "lives") {
            self.lives = lives;
        }

        // [game] section
        if let Some(level) = config.get("game", "level") {
            self.level_path = PathBuf::from(level);
        }
        if let Some(output) = config.get("game", "editor_output") {
            self.editor_output = PathBuf::from(output);
        }
        if let Some(seconds) = float("game", "cutscene_seconds") {
            self.cutscene_seconds = seconds.max(0.0);
        }
        if let Some(grid) = float("game", "grid").filter(|grid| *grid > 0.0) {
            self.grid = grid;
        }

        info!(
            "Loaded config: {}x{} window, fps={}, gravity={}, dt={}, level={:?}",
            self.window_width, self.window_height, self.target_fps, self.gravity, self.fixed_dt, self.level_path
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        self.save_to(&self.config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        config.set("physics", "gravity", Some(self.gravity.to_string()));
        config.set("physics", "fixed_dt", Some(self.fixed_dt.to_string()));

        config.set("player", "speed", Some(self.player_speed.to_string()));
        config.set("player", "jump_speed", Some(self.jump_speed.to_string()));
        config.set("player", "lives", Some(self.lives.to_string()));

        config.set("game", "level", Some(self.level_path.display().to_string()));
        config.set("game", "editor_output", Some(self.editor_output.display().to_string()));
        config.set("game", "cutscene_seconds", Some(self.cutscene_seconds.to_string()));
        config.set("game", "grid", Some(self.grid.to_string()));

        config.write(path).map_err(|source| ConfigError::Save {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved config to {:?}", path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ledgehop_{}_{}.ini", name, std::process::id()))
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let path = temp_path("partial");
        fs::write(&path, "[player]\nlives = 5\n\n[physics]\ngravity = 500.0\n").unwrap();
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.lives, 5);
        assert!((config.gravity - 500.0).abs() < 1e-4);
        assert_eq!(config.window_size(), (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));
        assert_eq!(config.grid, DEFAULT_GRID);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let mut config = GameConfig::with_path(temp_path("does_not_exist"));
        let err = config.load_from_file().unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
        assert_eq!(config.lives, DEFAULT_LIVES);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_path("saved");
        let mut config = GameConfig::with_path(&path);
        config.jump_speed = 600.0;
        config.level_path = PathBuf::from("levels/other.json");
        config.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, config);
        fs::remove_file(&path).ok();
    }
}

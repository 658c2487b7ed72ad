//! Session settings
//!
//! Read from JSON; missing fields take their defaults. Nothing is written back.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GROUND_Y, MAX_HEARTS, STARTING_HEARTS};

/// Frame rate the host loop aims for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetFps {
    Fps30,
    Fps45,
    #[default]
    Fps60,
}

impl TargetFps {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFps::Fps30 => "30",
            TargetFps::Fps45 => "45",
            TargetFps::Fps60 => "60",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().trim_end_matches("fps") {
            "30" => Some(TargetFps::Fps30),
            "45" => Some(TargetFps::Fps45),
            "60" => Some(TargetFps::Fps60),
            _ => None,
        }
    }

    pub fn frames_per_sec(&self) -> u32 {
        match self {
            TargetFps::Fps30 => 30,
            TargetFps::Fps45 => 45,
            TargetFps::Fps60 => 60,
        }
    }

    /// Target frame duration in seconds
    pub fn frame_secs(&self) -> f64 {
        1.0 / self.frames_per_sec() as f64
    }

    /// Next preset in the 60 -> 30 -> 45 -> 60 cycle
    pub fn next(&self) -> Self {
        match self {
            TargetFps::Fps60 => TargetFps::Fps30,
            TargetFps::Fps30 => TargetFps::Fps45,
            TargetFps::Fps45 => TargetFps::Fps60,
        }
    }
}

/// Failure to read a settings file
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read settings: {err}"),
            Self::Parse(err) => write!(f, "failed to parse settings: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for stage layouts
    pub seed: u64,
    pub target_fps: TargetFps,

    // === Ledger ===
    /// Hearts at the start of a fresh run
    pub starting_hearts: u8,
    /// Heart cap for shop purchases
    pub max_hearts: u8,

    // === World ===
    /// Ground line y in world units
    pub ground_y: f32,

    // === Debug ===
    /// Allow the +10 coin cheat
    pub cheats: bool,
    /// Show the frame rate overlay
    pub debug_overlay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            target_fps: TargetFps::default(),
            starting_hearts: STARTING_HEARTS,
            max_hearts: MAX_HEARTS,
            ground_y: DEFAULT_GROUND_Y,
            cheats: false,
            debug_overlay: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Read settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Read settings from `path`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values
    pub fn sanitized(mut self) -> Self {
        if self.max_hearts == 0 {
            log::warn!("max_hearts must be at least 1");
            self.max_hearts = 1;
        }
        if self.starting_hearts == 0 || self.starting_hearts > self.max_hearts {
            let clamped = self.starting_hearts.clamp(1, self.max_hearts);
            log::warn!("starting_hearts {} clamped to {clamped}", self.starting_hearts);
            self.starting_hearts = clamped;
        }
        if !self.ground_y.is_finite() || self.ground_y <= 0.0 {
            log::warn!("ground_y {} is invalid, using default", self.ground_y);
            self.ground_y = DEFAULT_GROUND_Y;
        }
        self
    }

    /// Cycle the frame rate target (F3 in the original controls)
    pub fn cycle_target_fps(&mut self) -> TargetFps {
        self.target_fps = self.target_fps.next();
        self.target_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 99, "cheats": true }"#).unwrap();
        assert_eq!(settings.seed, 99);
        assert!(settings.cheats);
        assert_eq!(settings.starting_hearts, 3);
        assert_eq!(settings.max_hearts, 7);
        assert_eq!(settings.target_fps, TargetFps::Fps60);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Settings::from_json("{ seed: }").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse settings"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load_from("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
        assert_eq!(
            Settings::load_or_default("/definitely/not/here.json"),
            Settings::default()
        );
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = Settings {
            starting_hearts: 12,
            max_hearts: 5,
            ground_y: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.starting_hearts, 5);
        assert_eq!(settings.ground_y, DEFAULT_GROUND_Y);

        let settings = Settings {
            starting_hearts: 0,
            max_hearts: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.max_hearts, 1);
        assert_eq!(settings.starting_hearts, 1);
    }

    #[test]
    fn test_target_fps_cycle() {
        let mut settings = Settings::default();
        assert_eq!(settings.cycle_target_fps(), TargetFps::Fps30);
        assert_eq!(settings.cycle_target_fps(), TargetFps::Fps45);
        assert_eq!(settings.cycle_target_fps(), TargetFps::Fps60);
        assert_eq!(TargetFps::from_str("45fps"), Some(TargetFps::Fps45));
        assert_eq!(TargetFps::from_str("50"), None);
        assert!((TargetFps::Fps30.frame_secs() - 1.0 / 30.0).abs() < 1e-12);
    }
}

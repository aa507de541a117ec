//! Persisted bake configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Smallest allowed bake resolution.
pub const MIN_RESOLUTION: u32 = 1;
/// Largest allowed bake resolution.
pub const MAX_RESOLUTION: u32 = 8192;
/// Resolution used when nothing else is configured.
pub const DEFAULT_RESOLUTION: u32 = 256;

/// The two user-facing bake settings plus one behavioral flag, stored per
/// document and persisted as RON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeSettings {
    resolution: u32,
    /// Whether to run the second, alpha-only bake pass and composite it
    /// into the color result.
    pub bake_alpha: bool,
    /// Whether the object's pre-bake material slots stay attached after
    /// the bake material is appended. The host tool always kept them;
    /// setting this to false clears them instead.
    pub keep_original_slots: bool,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            bake_alpha: false,
            keep_original_slots: true,
        }
    }
}

impl BakeSettings {
    /// The configured bake resolution, clamped to the allowed range.
    pub fn resolution(&self) -> u32 {
        self.resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION)
    }

    /// Set the bake resolution, clamping to the allowed range.
    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION);
    }

    /// Read settings from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Write settings to a RON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BakeSettings::default();
        assert_eq!(settings.resolution(), 256);
        assert!(!settings.bake_alpha);
        assert!(settings.keep_original_slots);
    }

    #[test]
    fn test_resolution_is_clamped() {
        let mut settings = BakeSettings::default();
        settings.set_resolution(0);
        assert_eq!(settings.resolution(), MIN_RESOLUTION);
        settings.set_resolution(100_000);
        assert_eq!(settings.resolution(), MAX_RESOLUTION);
        settings.set_resolution(8192);
        assert_eq!(settings.resolution(), 8192);
        settings.set_resolution(1);
        assert_eq!(settings.resolution(), 1);
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("griddle_settings_{}.ron", std::process::id()));

        let mut settings = BakeSettings::default();
        settings.set_resolution(64);
        settings.bake_alpha = true;
        settings.save(&path).unwrap();

        let loaded = BakeSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.resolution(), 64);
        assert!(loaded.bake_alpha);
        assert!(loaded.keep_original_slots);
    }
}

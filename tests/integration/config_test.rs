//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use r_vidplay::config::Settings;
use r_vidplay::player::PlayerOptions;
use std::error::Error;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        // Create a temporary directory for test
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        // Create settings with test values
        let mut settings = Settings::default();
        settings.volume = 0.4;
        settings.playback_rate = 1.25;
        settings.subtitle_activation_grace_ms = 250;
        settings.sidecar_search_dirs = vec![dir.path().join("subs")];

        // Validate and save settings
        settings.validate()?;
        settings.save(&config_path)?;

        // Load settings back
        let loaded_settings = Settings::load(&config_path)?;
        assert_eq!(loaded_settings, settings);

        // Test overriding settings
        let mut updated_settings = loaded_settings;
        updated_settings.auto_advance = false;
        updated_settings.save(&config_path)?;

        // Load again and verify updates
        let reloaded_settings = Settings::load(&config_path)?;
        assert!(!reloaded_settings.auto_advance);

        Ok(())
    }

    /// Settings flow into the player options
    #[test]
    fn test_player_options_from_settings() {
        let settings = Settings {
            volume: 0.0,
            playback_rate: 2.0,
            auto_enable_first_subtitle: false,
            subtitle_activation_grace_ms: 250,
            ..Settings::default()
        };

        let options = PlayerOptions::from(&settings);

        assert!(options.audio.muted);
        assert_eq!(options.audio.playback_rate, 2.0);
        assert!(!options.auto_enable_first_subtitle);
        assert_eq!(options.activation_grace, Duration::from_millis(250));
        assert_eq!(options.command_buffer_size, 32);
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let invalid_settings = Settings {
            volume: -0.1,
            ..Settings::default()
        };

        let result = invalid_settings.validate();
        assert!(result.is_err());

        if let Err(e) = result {
            assert!(e.to_string().contains("Volume must be between 0 and 1"));
        }

        let slow = Settings {
            playback_rate: 0.1,
            ..Settings::default()
        };
        assert!(slow.validate().is_err());
    }
}

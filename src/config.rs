use crate::error::{Result, WordwatchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub session: SessionConfig,
    pub export: ExportConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Monitoring session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Keyword specs in the same syntax the CLI accepts,
    /// e.g. "TARIFFS:5" or "3+ ELECTION".
    pub keywords: Vec<String>,
    /// Whether to schedule audio replies for playback.
    pub voice_replies: bool,
}

/// Transcript export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: crate::defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            voice_replies: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { directory: None }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    ///
    /// # Errors
    /// `ConfigFileNotFound` when the file is absent, `Config` for invalid
    /// TOML, `ConfigInvalidValue` for values that parse but cannot work.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WordwatchError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                WordwatchError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Errors for invalid TOML so a typo never silently drops keywords.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(WordwatchError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(WordwatchError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - WORDWATCH_AUDIO_DEVICE → audio.device
    /// - WORDWATCH_KEYWORDS → session.keywords (comma-separated specs)
    /// - WORDWATCH_EXPORT_DIR → export.directory
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("WORDWATCH_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(keywords) = std::env::var("WORDWATCH_KEYWORDS")
            && !keywords.is_empty()
        {
            self.session.keywords = keywords
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(dir) = std::env::var("WORDWATCH_EXPORT_DIR")
            && !dir.is_empty()
        {
            self.export.directory = Some(PathBuf::from(dir));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/wordwatch/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("wordwatch")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_wordwatch_env() {
        remove_env("WORDWATCH_AUDIO_DEVICE");
        remove_env("WORDWATCH_KEYWORDS");
        remove_env("WORDWATCH_EXPORT_DIR");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert!(config.session.keywords.is_empty());
        assert!(config.session.voice_replies);
        assert_eq!(config.export.directory, None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [audio]
            device = "hw:0,0"
            sample_rate = 48000

            [session]
            keywords = ["TARIFFS:5", "3+ ELECTION"]
            voice_replies = false

            [export]
            directory = "/tmp/transcripts"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.audio.device, Some("hw:0,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.session.keywords, vec!["TARIFFS:5", "3+ ELECTION"]);
        assert!(!config.session.voice_replies);
        assert_eq!(
            config.export.directory,
            Some(PathBuf::from("/tmp/transcripts"))
        );
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [session]
            keywords = ["AI"]
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.session.keywords, vec!["AI"]);
        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert!(config.session.voice_replies);
    }

    #[test]
    fn test_env_override_device() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_wordwatch_env();

        set_env("WORDWATCH_AUDIO_DEVICE", "pulse");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.audio.device, Some("pulse".to_string()));

        clear_wordwatch_env();
    }

    #[test]
    fn test_env_override_keywords_splits_on_commas() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_wordwatch_env();

        set_env("WORDWATCH_KEYWORDS", "TRUMP:8, 5+ BIDEN ,AI+++");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.session.keywords, vec!["TRUMP:8", "5+ BIDEN", "AI+++"]);

        clear_wordwatch_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_wordwatch_env();

        set_env("WORDWATCH_KEYWORDS", "");
        let config = Config::default().with_env_overrides();

        assert!(config.session.keywords.is_empty());

        clear_wordwatch_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [audio
            device = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_config_file_not_found() {
        let err = Config::load(Path::new("/tmp/nonexistent_wordwatch_config_12345.toml"))
            .unwrap_err();
        assert!(matches!(err, WordwatchError::ConfigFileNotFound { .. }));
        assert!(err.to_string().contains("nonexistent_wordwatch_config_12345"));
    }

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        let toml_content = r#"
            [audio]
            sample_rate = 0
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let err = Config::load(temp_file.path()).unwrap_err();
        match err {
            WordwatchError::ConfigInvalidValue { key, .. } => {
                assert_eq!(key, "audio.sample_rate");
            }
            other => panic!("expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_wordwatch_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let invalid_toml = r#"
            [audio
            device = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("wordwatch"));
        assert!(path_str.ends_with("config.toml"));
    }
}

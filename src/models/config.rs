use crate::models::storage::PersistentStore;
use serde::{Deserialize, Serialize};

/// User configuration, kept in its own storage slot next to the notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the title-suggestion endpoint. The `GEMINI_API_KEY`
    /// environment variable takes precedence over the stored value.
    pub api_key: Option<String>,
    /// Model segment of the generative endpoint path.
    pub model: String,
    /// Locale handed to the transcription engine.
    pub locale: String,
    /// Shell command that produces transcript lines on stdout. When unset,
    /// the record control is not offered.
    pub transcriber_command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: String::from("gemini-2.0-flash"),
            locale: String::from("en-US"),
            transcriber_command: None,
        }
    }
}

impl AppConfig {
    /// Loads the config slot and applies environment overrides.
    pub fn load(store: &PersistentStore) -> Self {
        let mut config: AppConfig = store.load("config", AppConfig::default());
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        config
    }
}

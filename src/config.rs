use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Regdoc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "regdoc=info".to_string()
}

/// Get the application data directory
/// ~/Regdoc/ on all platforms (user-visible on purpose)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Regdoc")
}

/// Audit history file
pub fn history_path() -> PathBuf {
    app_data_dir().join("history.json")
}

/// Optional prompt template overrides
pub fn prompts_dir() -> PathBuf {
    app_data_dir().join("prompts")
}

/// Model routing and the validation gate.
///
/// Constructed once at startup and passed by reference into the
/// orchestrator; there is no process-wide configuration cache.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Fast first-pass model.
    pub primary_model: String,
    /// Higher-precision model, invoked only below the threshold.
    pub validator_model: String,
    /// Primary confidence below this triggers the validator call.
    pub validation_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            primary_model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            validator_model: "meta-llama/llama-3.1-70b-instruct".to_string(),
            validation_threshold: 0.6,
        }
    }
}

use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "signal-decoder";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("signal_decoder_config.json"))
    }

    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("signal-decoder.log")
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|pd| pd.data_local_dir().join("signal-decoder.log"))
                .unwrap_or_else(|| PathBuf::from("signal-decoder.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_expected_file_names() {
        assert!(AppDirs::config_path().ends_with("config.json"));
        assert!(AppDirs::log_path().ends_with("signal-decoder.log"));
    }
}

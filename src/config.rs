use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub web_port: u16,
    /// Root of the photo archive and static assets.
    pub www_dir: PathBuf,
    /// Status document the coordinator maintains, relative to `www_dir`.
    pub status_file: String,
    /// Opaque key required on configure requests; empty disables the check.
    pub pass_key: String,
    pub forward_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web_port: 8080,
            www_dir: PathBuf::from("./www"),
            status_file: "status.json".to_string(),
            pass_key: String::new(),
            forward_timeout_ms: 5000,
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        if let Ok(config_str) = fs::read_to_string(path) {
            let config: AppConfig = serde_json::from_str(&config_str)?;
            return Ok(config);
        }

        tracing::warn!("{} not found, using default configuration", path);
        Ok(AppConfig::default())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = serde_json::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn status_path(&self) -> PathBuf {
        self.www_dir.join(&self.status_file)
    }

    pub fn camera_db_path(&self, camera: &str) -> PathBuf {
        self.www_dir.join("cameras").join(format!("{camera}.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_json() {
        let config = AppConfig::default();
        let raw = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.web_port, config.web_port);
        assert_eq!(parsed.status_file, "status.json");
    }

    #[test]
    fn paths_are_rooted_in_www_dir() {
        let config = AppConfig::default();
        assert_eq!(config.status_path(), PathBuf::from("./www/status.json"));
        assert_eq!(
            config.camera_db_path("cam-7"),
            PathBuf::from("./www/cameras/cam-7.db")
        );
    }
}

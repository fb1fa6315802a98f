pub mod chat;
pub mod init;
pub mod materials;
pub mod serve;
pub mod upload;

use studybuddy_config::AppConfig;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

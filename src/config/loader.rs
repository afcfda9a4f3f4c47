//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（qc-console.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::MAX_OFFSET_MINUTES;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["qc-console", "qc-console.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "QC_CONSOLE";

/// 加载应用配置
///
/// # 环境变量示例
/// - `QC_CONSOLE_INSPECTION__URL=http://qc-server:8000`
/// - `QC_CONSOLE_CAMERA__SOURCE=synthetic`
/// - `QC_CONSOLE_DISPLAY__UTC_OFFSET_MINUTES=420`
/// - `QC_CONSOLE_UPLOAD__ACCEPTED_EXTENSIONS=png,jpg`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("inspection.url", "http://127.0.0.1:8000")?
        .set_default("inspection.timeout_secs", 120)?
        .set_default("history.url", "http://127.0.0.1:8000")?
        .set_default("history.timeout_secs", 30)?
        .set_default("camera.source", "cctv")?
        .set_default("camera.cctv_url", "http://127.0.0.1:8000")?
        .set_default("camera.connect_timeout_secs", 5)?
        .set_default("camera.jpeg_quality", 90)?
        .set_default("upload.max_size_bytes", 10 * 1024 * 1024)?
        .set_default("display.utc_offset_minutes", 0)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("upload.accepted_extensions")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.inspection.url.trim().is_empty() {
        return invalid("Inspection URL cannot be empty");
    }
    if config.history.url.trim().is_empty() {
        return invalid("History URL cannot be empty");
    }
    if config.camera.cctv_url.trim().is_empty() {
        return invalid("CCTV URL cannot be empty");
    }

    if config.inspection.timeout_secs == 0
        || config.history.timeout_secs == 0
        || config.camera.connect_timeout_secs == 0
    {
        return invalid("Timeouts cannot be 0");
    }

    if !(1..=100).contains(&config.camera.jpeg_quality) {
        return invalid("JPEG quality must be between 1 and 100");
    }

    if config.upload.max_size_bytes == 0 {
        return invalid("Upload size limit cannot be 0");
    }
    if config.upload.accepted_extensions.is_empty() {
        return invalid("At least one upload extension must be accepted");
    }

    if config.display.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(ConfigError::ValidationError(format!(
            "Display UTC offset must be within ±{} minutes",
            MAX_OFFSET_MINUTES
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== QC Console Configuration ===");
    tracing::info!("Inspection URL: {}", config.inspection.url);
    tracing::info!("Inspection Timeout: {}s", config.inspection.timeout_secs);
    tracing::info!("History URL: {}", config.history.url);
    tracing::info!("History Timeout: {}s", config.history.timeout_secs);
    tracing::info!("Camera Source: {}", config.camera.source);
    tracing::info!("CCTV URL: {}", config.camera.cctv_url);
    tracing::info!("JPEG Quality: {}", config.camera.jpeg_quality);
    tracing::info!("Upload Limit: {} bytes", config.upload.max_size_bytes);
    tracing::info!("Upload Extensions: {}", config.upload.accepted_extensions.join(", "));
    tracing::info!("Display UTC Offset: {} min", config.display.utc_offset_minutes);
    tracing::info!("Log Level: {}", config.log.level);
    if let Some(dir) = &config.log.file_dir {
        tracing::info!("Log Directory: {:?}", dir);
    }
    tracing::info!("================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraSourceKind;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_url() {
        let mut config = AppConfig::default();
        config.inspection.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_jpeg_quality() {
        let mut config = AppConfig::default();
        config.camera.jpeg_quality = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_offset() {
        let mut config = AppConfig::default();
        config.display.utc_offset_minutes = 15 * 60;
        assert!(validate_config(&config).is_err());
        config.display.utc_offset_minutes = -7 * 60;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_timeout() {
        let mut config = AppConfig::default();
        config.history.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[inspection]
url = "http://qc-server:9000"

[camera]
source = "synthetic"
jpeg_quality = 75

[display]
utc_offset_minutes = 420
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.inspection.url, "http://qc-server:9000");
        assert_eq!(config.inspection.timeout_secs, 120);
        assert_eq!(config.camera.source, CameraSourceKind::Synthetic);
        assert_eq!(config.camera.jpeg_quality, 75);
        assert_eq!(config.display.utc_offset_minutes, 420);
        assert_eq!(config.upload.accepted_extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = load_config_from_path(Some(Path::new("/nonexistent/qc-console.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}

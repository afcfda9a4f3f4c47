//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::domain::inspection::UploadPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 检验服务配置
    #[serde(default)]
    pub inspection: InspectionConfig,

    /// 历史记录服务配置
    #[serde(default)]
    pub history: HistoryConfig,

    /// 摄像头配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 上传校验配置
    #[serde(default)]
    pub upload: UploadConfig,

    /// 显示配置
    #[serde(default)]
    pub display: DisplayConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

fn default_service_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

/// 检验服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionConfig {
    /// 检验服务基础 URL
    #[serde(default = "default_service_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_inspection_timeout")]
    pub timeout_secs: u64,
}

fn default_inspection_timeout() -> u64 {
    120
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            timeout_secs: default_inspection_timeout(),
        }
    }
}

/// 历史记录服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_service_url")]
    pub url: String,

    #[serde(default = "default_history_timeout")]
    pub timeout_secs: u64,
}

fn default_history_timeout() -> u64 {
    30
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            timeout_secs: default_history_timeout(),
        }
    }
}

/// 摄像头来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSourceKind {
    /// 检验服务的 MJPEG 端点
    #[default]
    Cctv,
    /// 合成画面
    Synthetic,
}

impl fmt::Display for CameraSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cctv => write!(f, "cctv"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// 摄像头配置
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub source: CameraSourceKind,

    /// CCTV 服务基础 URL
    #[serde(default = "default_service_url")]
    pub cctv_url: String,

    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 抓拍 JPEG 质量 (1..=100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_jpeg_quality() -> u8 {
    90
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSourceKind::default(),
            cctv_url: default_service_url(),
            connect_timeout_secs: default_connect_timeout(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// 上传校验配置
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 上传文件最大大小（字节），默认 10MB
    #[serde(default = "default_max_upload_size")]
    pub max_size_bytes: u64,

    /// 允许的扩展名（小写，不带点）
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

fn default_accepted_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_upload_size(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_size_bytes: self.max_size_bytes,
            accepted_extensions: self
                .accepted_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

/// 显示配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// 时间显示使用的固定 UTC 偏移（分钟），0 即 UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,

    /// 日志文件目录；设置后按天滚动写入文件而不是终端
    #[serde(default)]
    pub file_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_dir: None,
        }
    }
}

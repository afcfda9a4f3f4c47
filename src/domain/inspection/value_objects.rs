//! Inspection Context - Value Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::InspectionDomainError;

/// 分数与百分比判定的容差
const FRACTION_EPSILON: f64 = 1e-9;

/// 提交唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 检验结论，只有两种取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// 严格解析；未知值是显示错误，不会被强制归为 PASS 或 FAIL
    pub fn parse(raw: &str) -> Result<Self, InspectionDomainError> {
        match raw.trim() {
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            other => Err(InspectionDomainError::UnrecognizedVerdict(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上游给出的结论字段
///
/// 未知取值原样保留，由展示层渲染为显示错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportedVerdict {
    Known(Verdict),
    Unrecognized(String),
}

impl ReportedVerdict {
    pub fn from_raw(raw: &str) -> Self {
        match Verdict::parse(raw) {
            Ok(verdict) => Self::Known(verdict),
            Err(_) => Self::Unrecognized(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<Verdict> {
        match self {
            Self::Known(verdict) => Some(*verdict),
            Self::Unrecognized(_) => None,
        }
    }
}

/// 计量方式：新版接口按重量，旧版按数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementKind {
    Weight,
    Count,
}

impl MeasurementKind {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Weight => "grams",
            Self::Count => "pieces",
        }
    }

    pub fn column_header(&self) -> &'static str {
        match self {
            Self::Weight => "Weight (grams)",
            Self::Count => "Count (pieces)",
        }
    }

    pub fn total_label(&self) -> &'static str {
        match self {
            Self::Weight => "Total Weight",
            Self::Count => "Total Count",
        }
    }
}

/// 规范化后的百分比 (0..100)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction * 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// 上游比例的刻度
///
/// 两个接口的刻度不一致（历史接口给分数，检验接口可能给百分比），
/// 在边界处按整组比例判定一次：全部不超过 1 视为分数，否则视为百分比。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioScale {
    Fraction,
    Percent,
}

impl RatioScale {
    pub fn detect<I>(ratios: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let all_fractional = ratios
            .into_iter()
            .all(|ratio| ratio <= 1.0 + FRACTION_EPSILON);
        if all_fractional {
            Self::Fraction
        } else {
            Self::Percent
        }
    }

    pub fn normalize(&self, ratio: f64) -> Percentage {
        match self {
            Self::Fraction => Percentage::from_fraction(ratio),
            Self::Percent => Percentage::new(ratio),
        }
    }
}

/// 单个分类的计量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMeasure {
    pub category: String,
    pub kind: MeasurementKind,
    pub magnitude: f64,
    pub share: Percentage,
    /// CSS 颜色，旧版接口可能缺失
    pub color: Option<String>,
}

/// 图像来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    UploadedFile,
    CameraCapture,
    ServerCamera,
}

impl ImageSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UploadedFile => "uploaded file",
            Self::CameraCapture => "camera capture",
            Self::ServerCamera => "CCTV Capture",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 预览句柄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewHandle {
    /// 本地文件
    File(PathBuf),
    /// 摄像头快照（原生分辨率）
    Snapshot { width: u32, height: u32 },
    /// 服务端图片地址
    Remote(String),
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Snapshot { width, height } => write!(f, "camera frame {}x{}", width, height),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// 当前预览（显示在界面左侧）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePreview {
    pub name: String,
    pub source: ImageSource,
    pub handle: PreviewHandle,
}

/// 待提交的图像
///
/// 不变量:
/// - 创建后不可变，只会被新的 payload 整体替换
/// - bytes 非空
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    file_name: String,
    content_type: String,
    source: ImageSource,
    preview: PreviewHandle,
    created_at: DateTime<Utc>,
}

impl ImagePayload {
    /// 用户上传的文件
    pub fn from_upload(path: &Path, bytes: Vec<u8>) -> Result<Self, InspectionDomainError> {
        if bytes.is_empty() {
            return Err(InspectionDomainError::EmptyPayload);
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type_for(&file_name)
            .ok_or_else(|| InspectionDomainError::UnsupportedFormat(file_name.clone()))?;
        Ok(Self {
            bytes: bytes.into(),
            file_name,
            content_type: content_type.to_string(),
            source: ImageSource::UploadedFile,
            preview: PreviewHandle::File(path.to_path_buf()),
            created_at: Utc::now(),
        })
    }

    /// 摄像头快照（已编码为 JPEG）
    pub fn from_capture(jpeg: Vec<u8>, width: u32, height: u32) -> Result<Self, InspectionDomainError> {
        if jpeg.is_empty() {
            return Err(InspectionDomainError::EmptyPayload);
        }
        let now = Utc::now();
        Ok(Self {
            bytes: jpeg.into(),
            file_name: format!("capture_{}.jpg", now.format("%Y%m%d_%H%M%S")),
            content_type: "image/jpeg".to_string(),
            source: ImageSource::CameraCapture,
            preview: PreviewHandle::Snapshot { width, height },
            created_at: now,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn source(&self) -> ImageSource {
        self.source
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_active_preview(&self) -> ActivePreview {
        ActivePreview {
            name: self.file_name.clone(),
            source: self.source,
            handle: self.preview.clone(),
        }
    }
}

/// 根据扩展名推断 MIME 类型
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// 上传限制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub accepted_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            accepted_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

impl UploadPolicy {
    /// 在读取文件之前检查文件名和大小
    pub fn check(&self, path: &Path, size: u64) -> Result<(), InspectionDomainError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self
            .accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&extension))
        {
            return Err(InspectionDomainError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }
        if size == 0 {
            return Err(InspectionDomainError::EmptyPayload);
        }
        if size > self.max_size_bytes {
            return Err(InspectionDomainError::PayloadTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }
}

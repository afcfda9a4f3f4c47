//! Inspection Commands - 检验提交命令
//!
//! 三个提交入口共享同一把单飞锁

use std::path::PathBuf;

use crate::domain::inspection::{ImageSource, SubmissionId};

/// 提交检验命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitInspectionCommand {
    /// 上传本地图片 (POST /qc)
    Upload { path: PathBuf },
    /// 从打开的摄像头抓拍后上传 (POST /qc)
    CameraCapture,
    /// 服务端摄像头抓拍 (POST /qc/camera)
    ServerCapture,
}

impl SubmitInspectionCommand {
    pub fn source(&self) -> ImageSource {
        match self {
            Self::Upload { .. } => ImageSource::UploadedFile,
            Self::CameraCapture => ImageSource::CameraCapture,
            Self::ServerCapture => ImageSource::ServerCamera,
        }
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 已有提交在途，本次触发被丢弃（不是错误）
    Dropped,
    Succeeded { submission_id: SubmissionId },
    Failed {
        submission_id: SubmissionId,
        reason: String,
    },
}

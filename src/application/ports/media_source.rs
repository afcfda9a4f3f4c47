//! Media Source Port - 图像来源管理
//!
//! 持有摄像头会话，负责打开/关闭、显示面绑定以及抓拍。

use async_trait::async_trait;
use std::sync::Arc;

use super::{CameraError, PreviewSurface};
use crate::domain::inspection::ImagePayload;

/// 打开摄像头的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraOpened {
    /// 新建会话
    Opened { device_label: String },
    /// 已有会话，什么也不做
    AlreadyOpen,
}

#[async_trait]
pub trait MediaSourcePort: Send + Sync {
    /// 打开摄像头；已打开时为空操作。失败时不留下会话。
    async fn open_camera(&self) -> Result<CameraOpened, CameraError>;

    /// 关闭摄像头；没有会话时为空操作，返回是否真的关闭了会话
    fn close_camera(&self) -> bool;

    /// 挂接显示面；会话存在时立即绑定
    fn attach_surface(&self, surface: Arc<dyn PreviewSurface>);

    /// 摘除显示面（同时解除绑定）
    fn detach_surface(&self);

    /// 按原生分辨率抓拍当前画面；前置条件不满足时静默返回 None
    fn capture_frame(&self) -> Option<ImagePayload>;

    fn is_open(&self) -> bool;
}

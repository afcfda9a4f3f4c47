//! Preview Surface Port - 实时预览显示面
//!
//! 相当于界面上的视频元素：绑定采集流后显示实时画面，
//! 并能把当前画面绘制成一帧快照。

use std::fmt;
use std::sync::Arc;

use super::{CaptureStream, FrameSize, VideoFrame};

/// 显示面标识；标识变化说明显示面被替换，需要重新绑定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

pub trait PreviewSurface: Send + Sync {
    fn id(&self) -> SurfaceId;

    /// 绑定采集流并开始播放
    fn bind(&self, stream: Arc<dyn CaptureStream>);

    /// 解除绑定（暂停）
    fn unbind(&self);

    fn is_bound(&self) -> bool;

    /// 已绑定流的原生尺寸；未绑定或尚无画面时为 None
    fn natural_size(&self) -> Option<FrameSize>;

    /// 按原生分辨率绘制当前画面；绘制上下文不可用时返回 None
    fn snapshot(&self) -> Option<VideoFrame>;
}

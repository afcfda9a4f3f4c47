//! Camera Commands - 摄像头会话命令

/// 打开摄像头命令
#[derive(Debug, Clone, Default)]
pub struct OpenCameraCommand;

/// 打开摄像头响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCameraResponse {
    /// false 表示已有会话，本次为空操作
    pub opened: bool,
    pub device_label: Option<String>,
}

/// 关闭摄像头命令
#[derive(Debug, Clone, Default)]
pub struct CloseCameraCommand;

/// 关闭摄像头响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseCameraResponse {
    /// false 表示本来就没有会话
    pub closed: bool,
}

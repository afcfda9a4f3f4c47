//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（检验服务、历史服务、摄像头、显示面、状态存储）
//! - commands: CQRS 命令及处理器（提交检验、摄像头开关）
//! - queries: CQRS 查询及处理器（历史记录）
//! - presentation: 展示模型
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod presentation;
pub mod queries;

// Re-exports
pub use commands::{
    // Camera commands
    CloseCameraCommand,
    CloseCameraResponse,
    OpenCameraCommand,
    OpenCameraResponse,
    // Inspection commands
    SubmitInspectionCommand,
    SubmitOutcome,
    // Handlers
    handlers::{CloseCameraHandler, OpenCameraHandler, StartedSubmission, SubmitInspectionHandler},
};

pub use error::ApplicationError;

pub use ports::{
    // Camera
    CameraDevicePort,
    CameraError,
    CameraOpened,
    CaptureStream,
    FrameSize,
    MediaSourcePort,
    PreviewSurface,
    SurfaceId,
    VideoFrame,
    // History
    HistoryError,
    HistoryServicePort,
    HistoryStorePort,
    // Inspection
    InspectionError,
    InspectionServicePort,
    ScreenStatePort,
};

pub use queries::{
    ChangeHistoryFilter,
    LoadHistory,
    RefreshHistory,
    ToggleHistoryDetail,
    // Handlers
    handlers::{
        ChangeHistoryFilterHandler, HistoryQueryOutcome, LoadHistoryHandler,
        ToggleHistoryDetailHandler,
    },
};

//! QC Console - 食品重量质检控制台
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Inspection Context: 单飞提交锁、请求状态机、检验结果
//! - History Context: 筛选条件、时间窗口、过期响应丢弃、单行展开
//!
//! 应用层 (application/):
//! - Ports: 检验服务、历史服务、摄像头设备、预览显示面、状态存储
//! - Commands: 提交检验、摄像头开关
//! - Queries: 历史记录查询
//! - Presentation: 结果与历史表格展示模型
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: reqwest 检验/历史客户端、MJPEG 摄像头、合成摄像头
//! - Memory: 界面状态、历史状态、摄像头会话
//! - Events: 控制台事件广播
//! - Console: 终端渲染与交互式命令循环

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

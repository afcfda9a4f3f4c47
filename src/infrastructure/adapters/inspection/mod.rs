//! Inspection Adapter - 检验服务客户端实现

mod dto;
mod fake_inspection_client;
mod http_inspection_client;

pub use dto::{ErrorBodyDto, QcItemDto, QcResponseDto};
pub use fake_inspection_client::FakeInspectionClient;
pub use http_inspection_client::*;

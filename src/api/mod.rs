// ==========================================
// 现场项目跟踪器 - API 层
// ==========================================
// 职责: 提供用例级接口，供命令行调用
// ==========================================

pub mod error;
pub mod tracker_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use tracker_api::{ImportSummary, TrackerApi};

// ==========================================
// 现场项目跟踪器 - 数据仓储层
// ==========================================
// 职责: 任务与延误日志的 JSON 文件持久化，兼容旧版存储
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod delay_log_repo;
pub mod error;
pub mod json_file;
pub mod task_store;

// 重导出核心仓储
pub use delay_log_repo::{DelayLogRepository, DELAY_LOG_FILE_NAME, LEGACY_DELAY_LOG_FILE_NAME};
pub use error::{RepositoryError, RepositoryResult};
pub use task_store::{TaskStore, LEGACY_TASKS_FILE_NAME, TASKS_FILE_NAME, TASKS_SCHEMA_VERSION};

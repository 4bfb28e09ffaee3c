// ==========================================
// 现场项目跟踪器 - 核心库
// ==========================================
// 职责: MS Project 计划导入（CSV / MSPDI XML）、班次任务跟踪、延误日志与导出
// 技术栈: Rust + JSON 文件存储
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - JSON 文件持久化
pub mod repository;

// 引擎层 - 状态机/展示窗口/导出
pub mod engine;

// 导入层 - 外部计划文件
pub mod importer;

// 配置层 - 系统配置与导入策略
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 用例接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, ImportSummary, TrackerApi};
pub use config::{ImportPolicy, ConfigManager};
pub use domain::{DelayLogEntry, Task, TaskState};
pub use importer::{import_project_bytes, import_project_file, ImportError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "现场项目跟踪器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

// ==========================================
// 现场项目跟踪器 - 配置层
// ==========================================
// 职责: 系统配置管理与导入策略
// 存储: <data_dir>/config.json
// ==========================================

pub mod config_manager;
pub mod import_policy;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_data_dir, ConfigError, ConfigManager};
pub use import_policy::{DateOrder, DepartmentPolicy, HierarchyStrategy, ImportPolicy};

// ==========================================
// 现场项目跟踪器 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、旧数据升级
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod legacy;
pub mod task;
pub mod types;

// 重导出核心类型
pub use legacy::{upgrade_delay_entry, upgrade_task};
pub use task::{AuditEntry, DelayLogEntry, RawTaskRecord, Task, UNNAMED_TASK};
pub use types::{AuditKind, CanonicalField, TaskState};

// ==========================================
// 现场项目跟踪器 - 领域类型定义
// ==========================================
// 职责: 标准字段、任务状态、审计类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 与源文件表头拼写无关的逻辑列名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    UniqueId,
    Name,
    Summary,
    OutlineLevel,
    Wbs,
    Start,
    Finish,
    PercentComplete,
    ResourceNames,
    Department,
    TaskSummaryName,
}

impl CanonicalField {
    /// 全部标准字段（按列映射构建顺序）
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::UniqueId,
        CanonicalField::Name,
        CanonicalField::Summary,
        CanonicalField::OutlineLevel,
        CanonicalField::Wbs,
        CanonicalField::Start,
        CanonicalField::Finish,
        CanonicalField::PercentComplete,
        CanonicalField::ResourceNames,
        CanonicalField::Department,
        CanonicalField::TaskSummaryName,
    ];

    /// CSV 导入必填字段，缺任一即整体失败
    pub const REQUIRED: [CanonicalField; 7] = [
        CanonicalField::UniqueId,
        CanonicalField::Name,
        CanonicalField::OutlineLevel,
        CanonicalField::Wbs,
        CanonicalField::Start,
        CanonicalField::Finish,
        CanonicalField::PercentComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::UniqueId => "uniqueId",
            CanonicalField::Name => "name",
            CanonicalField::Summary => "summary",
            CanonicalField::OutlineLevel => "outlineLevel",
            CanonicalField::Wbs => "wbs",
            CanonicalField::Start => "start",
            CanonicalField::Finish => "finish",
            CanonicalField::PercentComplete => "percentComplete",
            CanonicalField::ResourceNames => "resourceNames",
            CanonicalField::Department => "department",
            CanonicalField::TaskSummaryName => "taskSummaryName",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 任务状态 (Task State)
// ==========================================
// 导入时一律为 Idle，后续由状态机推进
// 旧版本存储中的 "Active" 等价于 Running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    Idle,
    #[serde(alias = "Active")]
    Running,
    Paused,
    Finished,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Idle => "Idle",
            TaskState::Running => "Running",
            TaskState::Paused => "Paused",
            TaskState::Finished => "Finished",
        }
    }

    /// 宽松解析（用于旧数据升级），未知值返回 None
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Some(TaskState::Idle),
            "running" | "active" => Some(TaskState::Running),
            "paused" => Some(TaskState::Paused),
            "finished" => Some(TaskState::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 审计事件类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditKind {
    Start,
    Resume,
    Pause,
    Finish,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Start => "start",
            AuditKind::Resume => "resume",
            AuditKind::Pause => "pause",
            AuditKind::Finish => "finish",
        }
    }

    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Some(AuditKind::Start),
            "resume" => Some(AuditKind::Resume),
            "pause" => Some(AuditKind::Pause),
            "finish" => Some(AuditKind::Finish),
            _ => None,
        }
    }
}

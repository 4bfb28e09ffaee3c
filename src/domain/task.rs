// ==========================================
// 现场项目跟踪器 - 任务领域模型
// ==========================================
// 职责: 标准任务记录、审计条目、延误日志条目、导入中间记录
// 红线: 任务永远不是汇总行（汇总行在层级解析阶段已剔除）
// ==========================================

use crate::domain::types::{AuditKind, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 名称缺失时的占位名
pub const UNNAMED_TASK: &str = "Unnamed Task";

// ==========================================
// Task - 标准任务记录
// ==========================================
// 生命周期: 导入时创建 → 状态机原地修改 → 清空项目或下次导入时整体替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    // ===== 标识 =====
    #[serde(rename = "taskUID")]
    pub task_uid: String,
    pub task_name: String,
    pub summary_task_name: String, // 最近祖先汇总行名称，顶层为空
    pub department: String,

    // ===== 计划时间（原始字符串始终保留） =====
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_start_raw: String,
    pub planned_finish: Option<DateTime<Utc>>,
    pub planned_finish_raw: String,

    pub percent_complete: u8, // 0-100

    // ===== 执行状态 =====
    pub state: TaskState,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_finish: Option<DateTime<Utc>>,

    // ===== 工时累计 =====
    pub total_active_minutes: u64,
    pub total_paused_minutes: u64,
    pub last_start: Option<DateTime<Utc>>,
    pub last_pause: Option<DateTime<Utc>>,

    // 只追加
    pub audit: Vec<AuditEntry>,
}

impl Task {
    /// 计划开始的展示文本：解析成功用 RFC 3339，否则回退原始字符串
    pub fn planned_start_display(&self) -> String {
        display_instant(self.planned_start, &self.planned_start_raw)
    }

    pub fn planned_finish_display(&self) -> String {
        display_instant(self.planned_finish, &self.planned_finish_raw)
    }
}

fn display_instant(instant: Option<DateTime<Utc>>, raw: &str) -> String {
    match instant {
        Some(value) => value.to_rfc3339(),
        None => raw.to_string(),
    }
}

// ==========================================
// AuditEntry - 审计条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "type")]
    pub kind: AuditKind,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AuditEntry {
    pub fn new(kind: AuditKind, time: DateTime<Utc>) -> Self {
        Self {
            kind,
            time,
            reason: None,
            notes: None,
        }
    }
}

// ==========================================
// DelayLogEntry - 延误日志条目
// ==========================================
// 每次暂停写入一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayLogEntry {
    pub logged_at: Option<DateTime<Utc>>,
    #[serde(rename = "taskUID")]
    pub task_uid: String,
    pub task_name: String,
    pub summary_task_name: String,
    pub department: String,
    pub planned_start: Option<DateTime<Utc>>,
    pub actual_start: Option<DateTime<Utc>>,
    pub reason: String,
    pub notes: String,
}

impl DelayLogEntry {
    /// 是否为无意义的空条目（清洗时丢弃）
    pub fn is_blank(&self) -> bool {
        self.task_uid.is_empty()
            && self.task_name.is_empty()
            && self.reason.is_empty()
            && self.notes.is_empty()
    }
}

// ==========================================
// RawTaskRecord - 导入中间记录
// ==========================================
// 一行 CSV 或一个 XML <Task> 映射后的结果，仅在导入期间存在
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTaskRecord {
    pub uid: String,
    pub name: String,
    pub is_summary: bool,
    pub wbs: String,
    pub outline_level: u32,
    pub start_raw: String,
    pub finish_raw: String,
    pub percent_complete: u8,
    pub department: String,
    pub direct_parent: String, // 源文件显式给出的父级名称（可为空）

    // 元信息
    pub row_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            task_uid: "12".to_string(),
            task_name: "Rig pump".to_string(),
            summary_task_name: "Pump skid".to_string(),
            department: "Rigging".to_string(),
            planned_start: Some(Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap()),
            planned_start_raw: "01/12/2025 08:00".to_string(),
            planned_finish: None,
            planned_finish_raw: "TBC".to_string(),
            percent_complete: 0,
            state: TaskState::Idle,
            actual_start: None,
            actual_finish: None,
            total_active_minutes: 0,
            total_paused_minutes: 0,
            last_start: None,
            last_pause: None,
            audit: Vec::new(),
        }
    }

    #[test]
    fn test_task_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["taskUID"], "12");
        assert_eq!(json["summaryTaskName"], "Pump skid");
        assert_eq!(json["plannedFinishRaw"], "TBC");
        assert!(json["plannedFinish"].is_null());
        assert_eq!(json["state"], "Idle");
    }

    #[test]
    fn test_display_falls_back_to_raw() {
        let task = sample_task();
        assert_eq!(task.planned_finish_display(), "TBC");
        assert!(task.planned_start_display().starts_with("2025-12-01T08:00:00"));
    }

    #[test]
    fn test_audit_entry_omits_empty_reason() {
        let entry = AuditEntry::new(AuditKind::Start, Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "start");
        assert!(json.get("reason").is_none());
    }
}

// ==========================================
// 现场项目跟踪器 - 旧版存储结构升级
// ==========================================
// 职责: 把历史版本写入的任意形状任务/延误记录升级为严格结构
// 兼容: PascalCase (TaskUID)、camelCase (taskUID)、短键 (uid/name)
// 红线: 与导入管道解耦，仅处理已存储数据
// ==========================================

use crate::domain::task::{AuditEntry, DelayLogEntry, Task, UNNAMED_TASK};
use crate::domain::types::{AuditKind, TaskState};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// 升级单条任务记录
///
/// # 返回
/// - Some(Task): 升级后的任务（缺失的 UID 会重新生成）
/// - None: 输入不是对象
pub fn upgrade_task(value: &Value) -> Option<Task> {
    if !value.is_object() {
        return None;
    }

    let planned_start_value = first_string(value, &["PlannedStart", "plannedStart"]);
    let planned_start_raw = first_string(value, &["PlannedStartRaw", "plannedStartRaw"]);
    let planned_finish_value = first_string(value, &["PlannedFinish", "plannedFinish"]);
    let planned_finish_raw = first_string(value, &["PlannedFinishRaw", "plannedFinishRaw"]);

    let state = first_string(value, &["State", "state"])
        .and_then(|s| TaskState::parse_lenient(&s))
        .unwrap_or_default();

    Some(Task {
        task_uid: first_string(value, &["TaskUID", "taskUID", "taskUid", "uid"])
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        task_name: first_string(value, &["TaskName", "taskName", "name"])
            .unwrap_or_else(|| UNNAMED_TASK.to_string()),
        summary_task_name: first_string(value, &["SummaryTaskName", "summaryTaskName"])
            .unwrap_or_default(),
        department: first_string(value, &["Department", "department"]).unwrap_or_default(),
        planned_start: planned_start_value
            .as_deref()
            .or(planned_start_raw.as_deref())
            .and_then(parse_stored_instant),
        planned_start_raw: planned_start_raw.or(planned_start_value).unwrap_or_default(),
        planned_finish: planned_finish_value
            .as_deref()
            .or(planned_finish_raw.as_deref())
            .and_then(parse_stored_instant),
        planned_finish_raw: planned_finish_raw.or(planned_finish_value).unwrap_or_default(),
        percent_complete: first_number(value, &["PercentComplete", "percentComplete"])
            .map(|n| n.clamp(0.0, 100.0) as u8)
            .unwrap_or(0),
        state,
        actual_start: first_instant(value, &["ActualStart", "actualStart"]),
        actual_finish: first_instant(value, &["ActualFinish", "actualFinish"]),
        total_active_minutes: first_minutes(value, &["TotalActiveMinutes", "totalActiveMinutes"]),
        total_paused_minutes: first_minutes(value, &["TotalPausedMinutes", "totalPausedMinutes"]),
        last_start: first_instant(value, &["lastStart", "LastStart"]),
        last_pause: first_instant(value, &["lastPause", "LastPause"]),
        audit: upgrade_audit(value),
    })
}

/// 升级单条延误日志记录，空条目返回 None
pub fn upgrade_delay_entry(value: &Value) -> Option<DelayLogEntry> {
    if !value.is_object() {
        return None;
    }

    let entry = DelayLogEntry {
        logged_at: first_instant(value, &["LoggedAt", "loggedAt"]),
        task_uid: first_string(value, &["TaskUID", "taskUID", "uid"]).unwrap_or_default(),
        task_name: first_string(value, &["TaskName", "taskName"]).unwrap_or_default(),
        summary_task_name: first_string(value, &["SummaryTaskName", "summaryTaskName"])
            .unwrap_or_default(),
        department: first_string(value, &["Department", "department"]).unwrap_or_default(),
        planned_start: first_instant(value, &["PlannedStart", "plannedStart"]),
        actual_start: first_instant(value, &["ActualStart", "actualStart"]),
        reason: first_string(value, &["Reason", "reason"]).unwrap_or_default(),
        notes: first_string(value, &["Notes", "notes"]).unwrap_or_default(),
    };

    if entry.is_blank() {
        None
    } else {
        Some(entry)
    }
}

/// 解析已存储的时间戳（RFC 3339，或无时区 ISO 视为 UTC）
pub fn parse_stored_instant(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn upgrade_audit(value: &Value) -> Vec<AuditEntry> {
    let Some(items) = ["Audit", "audit"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let kind = first_string(item, &["type", "Type"])
                .and_then(|s| AuditKind::parse_lenient(&s))?;
            // 早期版本使用 "at" 作为时间键
            let time = first_instant(item, &["time", "at"])?;
            Some(AuditEntry {
                kind,
                time,
                reason: first_string(item, &["reason"]),
                notes: first_string(item, &["notes"]),
            })
        })
        .collect()
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_f64))
        .filter(|n| n.is_finite())
}

fn first_minutes(value: &Value, keys: &[&str]) -> u64 {
    first_number(value, keys)
        .map(|n| n.max(0.0).round() as u64)
        .unwrap_or(0)
}

fn first_instant(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .and_then(parse_stored_instant)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_upgrade_pascal_case_task() {
        let legacy = json!({
            "TaskUID": "7",
            "TaskName": "Install valve",
            "SummaryTaskName": "Area 1",
            "Department": "Mechanical",
            "PlannedStart": "2025-11-05T08:00:00.000Z",
            "PlannedStartRaw": "05/11/2025 08:00",
            "State": "Active",
            "TotalActiveMinutes": 42.4,
            "Audit": [{ "type": "start", "at": "2025-11-05T08:05:00.000Z" }],
            "PercentComplete": 250
        });

        let task = upgrade_task(&legacy).unwrap();
        assert_eq!(task.task_uid, "7");
        assert_eq!(task.state, TaskState::Running);
        assert_eq!(task.total_active_minutes, 42);
        assert_eq!(task.percent_complete, 100);
        assert_eq!(
            task.planned_start,
            Some(Utc.with_ymd_and_hms(2025, 11, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(task.planned_start_raw, "05/11/2025 08:00");
        assert_eq!(task.audit.len(), 1);
        assert_eq!(task.audit[0].kind, AuditKind::Start);
    }

    #[test]
    fn test_upgrade_fills_defaults() {
        let task = upgrade_task(&json!({ "State": "Exploded", "PlannedStart": "garbage" })).unwrap();
        assert!(!task.task_uid.is_empty());
        assert_eq!(task.task_name, UNNAMED_TASK);
        assert_eq!(task.state, TaskState::Idle);
        assert_eq!(task.planned_start, None);
        assert_eq!(task.planned_start_raw, "garbage");
        assert!(upgrade_task(&json!("not an object")).is_none());
    }

    #[test]
    fn test_upgrade_current_shape_is_lossless() {
        let task = upgrade_task(&json!({
            "taskUID": "3",
            "taskName": "Weld",
            "summaryTaskName": "",
            "department": "",
            "plannedStart": null,
            "plannedStartRaw": "",
            "percentComplete": 10,
            "state": "Paused",
            "lastPause": "2025-11-05T09:00:00Z",
            "audit": [{ "type": "pause", "time": "2025-11-05T09:00:00Z", "reason": "Parts" }]
        }))
        .unwrap();
        assert_eq!(task.state, TaskState::Paused);
        assert_eq!(task.audit[0].reason.as_deref(), Some("Parts"));
        assert!(task.last_pause.is_some());
    }

    #[test]
    fn test_blank_delay_entry_is_dropped() {
        assert!(upgrade_delay_entry(&json!({ "LoggedAt": "2025-11-05T09:00:00Z" })).is_none());
        let entry = upgrade_delay_entry(&json!({ "uid": "5", "reason": "Weather" })).unwrap();
        assert_eq!(entry.task_uid, "5");
        assert_eq!(entry.reason, "Weather");
    }
}

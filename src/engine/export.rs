// ==========================================
// 现场项目跟踪器 - CSV 导出
// ==========================================
// 职责: 班次报表 / 延误日志导出
// 文件名: shift_report_YYYYMMDD_HHMM.csv / delay_log_YYYYMMDD_HHMM.csv
// ==========================================

use crate::domain::task::{DelayLogEntry, Task};
use crate::engine::error::ExportError;
use chrono::{DateTime, Local, Utc};
use csv::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SHIFT_REPORT_HEADERS: [&str; 11] = [
    "TaskUID",
    "TaskName",
    "SummaryTaskName",
    "Department",
    "PlannedStart",
    "PlannedFinish",
    "ActualStart",
    "ActualFinish",
    "State",
    "TotalActiveMinutes",
    "TotalPausedMinutes",
];

pub const DELAY_LOG_HEADERS: [&str; 9] = [
    "LoggedAt",
    "TaskUID",
    "TaskName",
    "SummaryTaskName",
    "Department",
    "PlannedStart",
    "ActualStart",
    "Reason",
    "Notes",
];

fn instant_text(value: Option<DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339()).unwrap_or_default()
}

/// 写出班次报表
pub fn write_shift_report<W: Write>(writer: W, tasks: &[Task]) -> Result<(), ExportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(SHIFT_REPORT_HEADERS)?;
    for task in tasks {
        csv.write_record([
            task.task_uid.clone(),
            task.task_name.clone(),
            task.summary_task_name.clone(),
            task.department.clone(),
            task.planned_start_display(),
            task.planned_finish_display(),
            instant_text(task.actual_start),
            instant_text(task.actual_finish),
            task.state.as_str().to_string(),
            task.total_active_minutes.to_string(),
            task.total_paused_minutes.to_string(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// 写出延误日志
pub fn write_delay_log<W: Write>(writer: W, entries: &[DelayLogEntry]) -> Result<(), ExportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(DELAY_LOG_HEADERS)?;
    for entry in entries {
        csv.write_record([
            instant_text(entry.logged_at),
            entry.task_uid.clone(),
            entry.task_name.clone(),
            entry.summary_task_name.clone(),
            entry.department.clone(),
            instant_text(entry.planned_start),
            instant_text(entry.actual_start),
            entry.reason.clone(),
            entry.notes.clone(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn shift_report_file_name(now: DateTime<Local>) -> String {
    format!("shift_report_{}.csv", now.format("%Y%m%d_%H%M"))
}

pub fn delay_log_file_name(now: DateTime<Local>) -> String {
    format!("delay_log_{}.csv", now.format("%Y%m%d_%H%M"))
}

/// 导出班次报表到目录，返回文件路径
pub fn export_shift_report(
    dir: &Path,
    tasks: &[Task],
    now: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(shift_report_file_name(now));
    write_shift_report(create_file(&path)?, tasks)?;
    tracing::info!(path = %path.display(), rows = tasks.len(), "班次报表已导出");
    Ok(path)
}

/// 导出延误日志到目录，返回文件路径
pub fn export_delay_log(
    dir: &Path,
    entries: &[DelayLogEntry],
    now: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(delay_log_file_name(now));
    write_delay_log(create_file(&path)?, entries)?;
    tracing::info!(path = %path.display(), rows = entries.len(), "延误日志已导出");
    Ok(path)
}

fn create_file(path: &Path) -> Result<std::fs::File, ExportError> {
    let io_error = |e: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::File::create(path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportPolicy;
    use crate::domain::task::RawTaskRecord;
    use crate::importer::TaskBuilder;
    use chrono::TimeZone;

    fn task() -> Task {
        let record = RawTaskRecord {
            uid: "7".to_string(),
            name: "Weld \"A\", spool 3".to_string(),
            start_raw: "TBC".to_string(),
            ..Default::default()
        };
        TaskBuilder::new(&ImportPolicy::default()).build(&record, "Piping".to_string())
    }

    #[test]
    fn test_shift_report_quotes_and_falls_back_to_raw() {
        let mut out = Vec::new();
        write_shift_report(&mut out, &[task()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SHIFT_REPORT_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "7,\"Weld \"\"A\"\", spool 3\",Piping,,TBC,,,,Idle,0,0"
        );
    }

    #[test]
    fn test_delay_log_csv() {
        let entry = DelayLogEntry {
            logged_at: Some(Utc.with_ymd_and_hms(2025, 11, 5, 9, 30, 0).unwrap()),
            task_uid: "7".to_string(),
            task_name: "Weld".to_string(),
            summary_task_name: String::new(),
            department: "Piping".to_string(),
            planned_start: None,
            actual_start: None,
            reason: "No welder".to_string(),
            notes: "line1\nline2".to_string(),
        };
        let mut out = Vec::new();
        write_delay_log(&mut out, &[entry]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("LoggedAt,TaskUID,TaskName"));
        assert!(text.contains("2025-11-05T09:30:00+00:00,7,Weld,,Piping,,,No welder,\"line1\nline2\""));
    }

    #[test]
    fn test_file_names() {
        let now = Local.with_ymd_and_hms(2025, 11, 5, 6, 7, 0).unwrap();
        assert_eq!(shift_report_file_name(now), "shift_report_20251105_0607.csv");
        assert_eq!(delay_log_file_name(now), "delay_log_20251105_0607.csv");
    }

    #[test]
    fn test_export_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2025, 11, 5, 18, 0, 0).unwrap();
        let path = export_shift_report(&dir.path().join("out"), &[task()], now).unwrap();
        assert!(path.ends_with("shift_report_20251105_1800.csv"));
        assert!(std::fs::read_to_string(path).unwrap().contains("Piping"));
    }
}

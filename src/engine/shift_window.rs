// ==========================================
// 现场项目跟踪器 - 滚动展示窗口
// ==========================================
// 职责: 按计划开始排序 + 过滤 [今天 00:00, 今天 + N 天)
// 红线: 计划开始未知的任务总是显示（排在最后）
// ==========================================

use crate::domain::task::Task;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// 默认窗口天数（今天 → +2 天）
pub const DEFAULT_WINDOW_DAYS: u32 = 3;

/// 窗口摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSummary {
    pub shown: usize,
    pub total: usize,
    pub from: NaiveDate,
    pub to: NaiveDate, // 含当天
}

/// 窗口视图
#[derive(Debug, Clone, Serialize)]
pub struct WindowView {
    pub tasks: Vec<Task>,
    pub summary: WindowSummary,
}

pub struct ShiftWindow {
    days: u32,
}

impl Default for ShiftWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

impl ShiftWindow {
    pub fn new(days: u32) -> Self {
        Self { days: days.max(1) }
    }

    /// 选出窗口内的任务（已排序）
    pub fn select(&self, tasks: &[Task], today: NaiveDate) -> WindowView {
        let from = today;
        let end = today + Duration::days(self.days as i64);
        let (start_instant, end_instant) = (local_midnight(from), local_midnight(end));

        let mut shown: Vec<Task> = tasks
            .iter()
            .filter(|task| match task.planned_start {
                None => true,
                Some(start) => match (start_instant, end_instant) {
                    (Some(lo), Some(hi)) => start >= lo && start < hi,
                    _ => true,
                },
            })
            .cloned()
            .collect();
        sort_by_planned_start(&mut shown);

        tracing::debug!(shown = shown.len(), total = tasks.len(), from = %from, days = self.days, "窗口筛选完成");

        WindowView {
            summary: WindowSummary {
                shown: shown.len(),
                total: tasks.len(),
                from,
                to: end - Duration::days(1),
            },
            tasks: shown,
        }
    }
}

/// 计划开始升序；无计划开始的排最后；相同时按名称
pub fn sort_by_planned_start(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.planned_start, b.planned_start) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.task_name.cmp(&b.task_name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.task_name.cmp(&b.task_name),
    });
}

/// 本地零点对应的 UTC 时刻
fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportPolicy;
    use crate::domain::task::RawTaskRecord;
    use crate::importer::TaskBuilder;

    fn task(name: &str, start_raw: &str) -> Task {
        let record = RawTaskRecord {
            uid: name.to_string(),
            name: name.to_string(),
            start_raw: start_raw.to_string(),
            ..Default::default()
        };
        TaskBuilder::new(&ImportPolicy::default()).build(&record, String::new())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
    }

    #[test]
    fn test_window_filters_and_sorts() {
        let tasks = vec![
            task("Late", "07/11/2025 23:59"),
            task("Unknown", "TBC"),
            task("Past", "04/11/2025 23:00"),
            task("Early", "05/11/2025 00:00"),
            task("Outside", "08/11/2025 00:00"),
            task("Also early", "05/11/2025 00:00"),
        ];

        let view = ShiftWindow::default().select(&tasks, today());
        let names: Vec<&str> = view.tasks.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["Also early", "Early", "Late", "Unknown"]);
        assert_eq!(
            view.summary,
            WindowSummary {
                shown: 4,
                total: 6,
                from: today(),
                to: NaiveDate::from_ymd_opt(2025, 11, 7).unwrap(),
            }
        );
    }

    #[test]
    fn test_single_day_window() {
        let tasks = vec![task("Today", "05/11/2025 10:00"), task("Tomorrow", "06/11/2025 10:00")];
        let view = ShiftWindow::new(1).select(&tasks, today());
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.summary.to, today());
    }
}

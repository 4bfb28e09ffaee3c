// ==========================================
// 现场项目跟踪器 - 任务构建器
// ==========================================
// 职责: RawTaskRecord + 层级解析结果 → Task
// 默认值: UID 缺失 → uuid v4；名称缺失 → "Unnamed Task"；状态 → Idle
// ==========================================

use crate::config::import_policy::ImportPolicy;
use crate::domain::task::{RawTaskRecord, Task, UNNAMED_TASK};
use crate::domain::types::TaskState;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::date_normalizer::DateNormalizer;
use crate::importer::hierarchy::{HierarchyResolver, RowRole};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct TaskBuilder {
    dates: DateNormalizer,
    hierarchy: HierarchyResolver,
}

impl TaskBuilder {
    pub fn new(policy: &ImportPolicy) -> Self {
        Self {
            dates: DateNormalizer::new(policy.date_order),
            hierarchy: HierarchyResolver::new(policy.hierarchy),
        }
    }

    /// 解析层级并构建全部叶子任务（保持源文件顺序）
    pub fn build_all(&self, records: &[RawTaskRecord]) -> Vec<Task> {
        let roles = self.hierarchy.resolve(records);
        let summary_count = roles.iter().filter(|r| r.is_summary()).count();

        let tasks: Vec<Task> = records
            .iter()
            .zip(roles)
            .filter_map(|(record, role)| match role {
                RowRole::Summary => None,
                RowRole::Leaf { parent_name } => Some(self.build(record, parent_name)),
            })
            .collect();

        let unparsed_dates = tasks
            .iter()
            .map(|t| {
                let start = (t.planned_start.is_none() && !t.planned_start_raw.is_empty()) as usize;
                let finish = (t.planned_finish.is_none() && !t.planned_finish_raw.is_empty()) as usize;
                start + finish
            })
            .sum::<usize>();

        info!(
            rows = records.len(),
            summary_rows = summary_count,
            tasks = tasks.len(),
            "层级解析完成"
        );
        if unparsed_dates > 0 {
            debug!(unparsed_dates = unparsed_dates, "部分日期无法解析，保留原始文本");
        }

        tasks
    }

    /// 构建单个任务
    pub fn build(&self, record: &RawTaskRecord, summary_task_name: String) -> Task {
        let start = self.dates.parse(&record.start_raw);
        let finish = self.dates.parse(&record.finish_raw);

        for (field, parsed) in [("start", &start), ("finish", &finish)] {
            if !parsed.is_parsed() && !parsed.raw.is_empty() {
                debug!(row = record.row_number, field, raw = %parsed.raw, "日期无法解析，保留原始文本");
            }
        }

        let uid = record.uid.trim();
        let name = record.name.trim();

        Task {
            task_uid: if uid.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                uid.to_string()
            },
            task_name: if name.is_empty() {
                UNNAMED_TASK.to_string()
            } else {
                name.to_string()
            },
            summary_task_name: summary_task_name.trim().to_string(),
            department: record.department.trim().to_string(),
            planned_start: start.instant,
            planned_start_raw: start.raw,
            planned_finish: finish.instant,
            planned_finish_raw: finish.raw,
            percent_complete: DataCleaner::clamp_percent(record.percent_complete as i64),
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
}

/// 重复 UID 只告警不剔除，返回重复条数
pub fn report_duplicate_uids(tasks: &[Task]) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for task in tasks {
        if !seen.insert(task.task_uid.as_str()) {
            duplicates += 1;
            warn!(task_uid = %task.task_uid, task_name = %task.task_name, "任务 UID 重复");
        }
    }
    duplicates
}

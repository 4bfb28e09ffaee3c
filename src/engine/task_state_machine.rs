// ==========================================
// 现场项目跟踪器 - 任务状态机
// ==========================================
// 状态: Idle → Running ⇄ Paused → Finished
// 职责: 状态推进 + 工时累计 + 审计追加 + 生成延误日志条目
// 红线: 暂停必须填写原因；审计只追加
// ==========================================
// 工时: round((结束 - 开始) / 60 秒)，不为负
// ==========================================

use crate::domain::task::{AuditEntry, DelayLogEntry, Task};
use crate::domain::types::{AuditKind, TaskState};
use crate::engine::error::{EngineResult, StateTransitionError};
use chrono::{DateTime, Utc};
use tracing::debug;

pub struct TaskStateMachine;

impl TaskStateMachine {
    /// 开始（或从暂停恢复）
    ///
    /// # 规则
    /// - Running / Finished 状态拒绝
    /// - 首次开始记录 actual_start
    /// - 从 Paused 恢复时把暂停时长计入 total_paused_minutes，审计记为 resume
    pub fn start(task: &mut Task, now: DateTime<Utc>) -> EngineResult<()> {
        if matches!(task.state, TaskState::Running | TaskState::Finished) {
            return Err(invalid(task.state, TaskState::Running));
        }

        if task.actual_start.is_none() {
            task.actual_start = Some(now);
        }

        let kind = if task.state == TaskState::Paused {
            if let Some(paused_at) = task.last_pause.take() {
                task.total_paused_minutes += minutes_between(paused_at, now);
            }
            AuditKind::Resume
        } else {
            AuditKind::Start
        };

        task.state = TaskState::Running;
        task.last_start = Some(now);
        task.audit.push(AuditEntry::new(kind, now));

        debug!(task_uid = %task.task_uid, audit = kind.as_str(), "任务开始");
        Ok(())
    }

    /// 暂停，返回应写入延误日志的条目
    ///
    /// # 规则
    /// - 仅 Running 可暂停
    /// - 原因去空白后不能为空
    pub fn pause(
        task: &mut Task,
        reason: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<DelayLogEntry> {
        if task.state != TaskState::Running {
            return Err(invalid(task.state, TaskState::Paused));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(StateTransitionError::MissingReason);
        }
        let notes = notes.trim();

        if let Some(started_at) = task.last_start.take() {
            task.total_active_minutes += minutes_between(started_at, now);
        }

        task.state = TaskState::Paused;
        task.last_pause = Some(now);
        task.audit.push(AuditEntry {
            kind: AuditKind::Pause,
            time: now,
            reason: Some(reason.to_string()),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        });

        debug!(task_uid = %task.task_uid, reason = %reason, "任务暂停");
        Ok(DelayLogEntry {
            logged_at: Some(now),
            task_uid: task.task_uid.clone(),
            task_name: task.task_name.clone(),
            summary_task_name: task.summary_task_name.clone(),
            department: task.department.clone(),
            planned_start: task.planned_start,
            actual_start: task.actual_start,
            reason: reason.to_string(),
            notes: notes.to_string(),
        })
    }

    /// 完成
    ///
    /// # 规则
    /// - Finished 状态拒绝
    /// - 关闭当前进行中或暂停中的时段
    pub fn finish(task: &mut Task, now: DateTime<Utc>) -> EngineResult<()> {
        if task.state == TaskState::Finished {
            return Err(invalid(task.state, TaskState::Finished));
        }

        match task.state {
            TaskState::Running => {
                if let Some(started_at) = task.last_start {
                    task.total_active_minutes += minutes_between(started_at, now);
                }
            }
            TaskState::Paused => {
                if let Some(paused_at) = task.last_pause {
                    task.total_paused_minutes += minutes_between(paused_at, now);
                }
            }
            TaskState::Idle | TaskState::Finished => {}
        }

        task.state = TaskState::Finished;
        task.actual_finish = Some(now);
        task.last_start = None;
        task.last_pause = None;
        task.audit.push(AuditEntry::new(AuditKind::Finish, now));

        debug!(
            task_uid = %task.task_uid,
            active_minutes = task.total_active_minutes,
            paused_minutes = task.total_paused_minutes,
            "任务完成"
        );
        Ok(())
    }
}

fn invalid(from: TaskState, to: TaskState) -> StateTransitionError {
    StateTransitionError::InvalidTransition { from, to }
}

/// 两个时刻之间的分钟数（四舍五入，不为负）
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    ((millis as f64) / 60_000.0).round() as u64
}

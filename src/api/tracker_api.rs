// ==========================================
// 现场项目跟踪器 - 跟踪 API
// ==========================================
// 职责: 组合配置、导入器、任务存储、延误日志，对外提供用例级接口
// 红线: 导入全有或全无，失败时存储保持不变
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::task::{DelayLogEntry, Task};
use crate::engine::{
    export_delay_log, export_shift_report, sort_by_planned_start, ShiftWindow, TaskStateMachine,
    WindowView,
};
use crate::importer::{ImportOutcome, ProjectImporter, ProjectImporterImpl};
use crate::repository::{DelayLogRepository, TaskStore};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// 导入结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_name: String,
    pub format: String,
    pub encoding: String,
    pub task_count: usize,
    pub duplicate_uids: usize,
    /// 计划开始/完成中有原始文本但无法解析的任务数
    pub unparsed_dates: usize,
    pub elapsed_ms: u128,
}

impl ImportSummary {
    fn from_outcome(outcome: &ImportOutcome) -> Self {
        let unparsed_dates = outcome
            .tasks
            .iter()
            .filter(|t| {
                (t.planned_start.is_none() && !t.planned_start_raw.is_empty())
                    || (t.planned_finish.is_none() && !t.planned_finish_raw.is_empty())
            })
            .count();

        Self {
            batch_id: outcome.batch_id.clone(),
            file_name: outcome.file_name.clone(),
            format: outcome.format.as_str().to_string(),
            encoding: outcome.encoding.as_str().to_string(),
            task_count: outcome.tasks.len(),
            duplicate_uids: outcome.duplicate_uids,
            unparsed_dates,
            elapsed_ms: outcome.elapsed_ms,
        }
    }
}

// ==========================================
// TrackerApi
// ==========================================
pub struct TrackerApi {
    data_dir: PathBuf,
    config: ConfigManager,
    importer: ProjectImporterImpl,
    task_store: TaskStore,
    delay_log: DelayLogRepository,
}

impl TrackerApi {
    /// 打开数据目录（读取 `<data_dir>/config.json`）
    pub fn open(data_dir: impl AsRef<Path>) -> ApiResult<Self> {
        let config = ConfigManager::from_data_dir(data_dir.as_ref())?;
        Ok(Self::with_config(data_dir, config))
    }

    /// 使用给定配置创建
    pub fn with_config(data_dir: impl AsRef<Path>, config: ConfigManager) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let importer = ProjectImporterImpl::new(config.import_policy());
        Self {
            task_store: TaskStore::new(&data_dir),
            delay_log: DelayLogRepository::new(&data_dir),
            importer,
            config,
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入项目文件并整体替换当前任务
    #[instrument(skip(self, file_path))]
    pub async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ApiResult<ImportSummary> {
        let outcome = self.importer.import_file(file_path.as_ref()).await?;
        self.task_store.replace_all(&outcome.tasks)?;

        let summary = ImportSummary::from_outcome(&outcome);
        info!(
            batch_id = %summary.batch_id,
            tasks = summary.task_count,
            duplicate_uids = summary.duplicate_uids,
            unparsed_dates = summary.unparsed_dates,
            "项目导入完成"
        );
        Ok(summary)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 滚动窗口内的任务（今天起 window_days 天，计划开始未知的始终显示）
    pub fn list_window(&self, today: NaiveDate) -> ApiResult<WindowView> {
        let tasks = self.task_store.load_all()?;
        Ok(ShiftWindow::new(self.config.window_days()).select(&tasks, today))
    }

    /// 全部任务（按计划开始排序）
    pub fn list_all(&self) -> ApiResult<Vec<Task>> {
        let mut tasks = self.task_store.load_all()?;
        sort_by_planned_start(&mut tasks);
        Ok(tasks)
    }

    pub fn list_delay_log(&self) -> ApiResult<Vec<DelayLogEntry>> {
        Ok(self.delay_log.list()?)
    }

    // ==========================================
    // 状态推进
    // ==========================================

    pub fn start_task(&self, task_uid: &str, now: DateTime<Utc>) -> ApiResult<Task> {
        self.mutate_task(task_uid, |task| {
            TaskStateMachine::start(task, now)?;
            Ok(())
        })
    }

    /// 暂停并写入延误日志
    ///
    /// 延误日志先落盘；写入失败时任务存储保持不变
    pub fn pause_task(
        &self,
        task_uid: &str,
        reason: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<Task> {
        let (mut tasks, idx) = self.load_for_update(task_uid)?;
        let entry = apply_transition(&mut tasks[idx], |task| {
            Ok(TaskStateMachine::pause(task, reason, notes, now)?)
        })?;
        self.delay_log.append(entry)?;
        self.commit(&tasks, idx)
    }

    pub fn finish_task(&self, task_uid: &str, now: DateTime<Utc>) -> ApiResult<Task> {
        self.mutate_task(task_uid, |task| {
            TaskStateMachine::finish(task, now)?;
            Ok(())
        })
    }

    /// 读取 → 修改第一条匹配任务 → 整体写回
    fn mutate_task<F>(&self, task_uid: &str, apply: F) -> ApiResult<Task>
    where
        F: FnOnce(&mut Task) -> ApiResult<()>,
    {
        let (mut tasks, idx) = self.load_for_update(task_uid)?;
        apply_transition(&mut tasks[idx], apply)?;
        self.commit(&tasks, idx)
    }

    /// 读取全部任务并定位第一条匹配项
    fn load_for_update(&self, task_uid: &str) -> ApiResult<(Vec<Task>, usize)> {
        let task_uid = task_uid.trim();
        if task_uid.is_empty() {
            return Err(ApiError::InvalidInput("任务 UID 不能为空".to_string()));
        }

        let tasks = self.task_store.load_all()?;
        let idx = tasks
            .iter()
            .position(|t| t.task_uid == task_uid)
            .ok_or_else(|| ApiError::NotFound(format!("Task(id={})不存在", task_uid)))?;
        Ok((tasks, idx))
    }

    fn commit(&self, tasks: &[Task], idx: usize) -> ApiResult<Task> {
        self.task_store.replace_all(tasks)?;
        let updated = tasks[idx].clone();
        info!(task_uid = %updated.task_uid, state = %updated.state, "任务状态已更新");
        Ok(updated)
    }

    // ==========================================
    // 清空
    // ==========================================

    pub fn clear_project(&self) -> ApiResult<()> {
        Ok(self.task_store.clear()?)
    }

    pub fn clear_delay_log(&self) -> ApiResult<()> {
        Ok(self.delay_log.clear()?)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出班次报表（全部任务），返回文件路径
    pub fn export_shift_report(&self, dir: &Path, now: DateTime<Local>) -> ApiResult<PathBuf> {
        let tasks = self.list_all()?;
        Ok(export_shift_report(dir, &tasks, now)?)
    }

    /// 导出延误日志（最新在前），返回文件路径
    pub fn export_delay_log(&self, dir: &Path, now: DateTime<Local>) -> ApiResult<PathBuf> {
        let entries = self.delay_log.list()?;
        Ok(export_delay_log(dir, &entries, now)?)
    }
}

/// 在内存副本上推进状态；被拒绝时记录告警
fn apply_transition<R, F>(task: &mut Task, apply: F) -> ApiResult<R>
where
    F: FnOnce(&mut Task) -> ApiResult<R>,
{
    apply(&mut *task).map_err(|e| {
        warn!(task_uid = %task.task_uid, error = %e, "任务状态推进被拒绝");
        e
    })
}

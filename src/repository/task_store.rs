// ==========================================
// 现场项目跟踪器 - 任务存储
// ==========================================
// 文件: <data_dir>/LPT_TASKS_V2.json  { schemaVersion, tasks }
// 兼容: 当前文件为空或缺失时读取旧版 PROJECT_TASKS_V1.json（数组），升级后立即写入新版文件
// 红线: 读取时每条记录都经过旧数据升级；导入结果整体替换，不做合并
// ==========================================

use crate::domain::legacy::upgrade_task;
use crate::domain::task::Task;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::json_file::{read_value, write_value};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const TASKS_FILE_NAME: &str = "LPT_TASKS_V2.json";
pub const LEGACY_TASKS_FILE_NAME: &str = "PROJECT_TASKS_V1.json";
pub const TASKS_SCHEMA_VERSION: u32 = 2;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredTasks<'a> {
    schema_version: u32,
    tasks: &'a [Task],
}

// ==========================================
// TaskStore - 任务存储
// ==========================================
#[derive(Debug, Clone)]
pub struct TaskStore {
    data_dir: PathBuf,
}

impl TaskStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE_NAME)
    }

    fn legacy_path(&self) -> PathBuf {
        self.data_dir.join(LEGACY_TASKS_FILE_NAME)
    }

    /// 读取全部任务（源文件顺序）
    pub fn load_all(&self) -> RepositoryResult<Vec<Task>> {
        let current = read_value(&self.path())?
            .map(|doc| upgrade_all(&doc))
            .unwrap_or_default();
        if !current.is_empty() {
            return Ok(current);
        }

        let legacy = read_value(&self.legacy_path())?
            .map(|doc| upgrade_all(&doc))
            .unwrap_or_default();
        if !legacy.is_empty() {
            // 升级结果立即写入新版存储，补生成的 UID 从此固定
            self.replace_all(&legacy)?;
            info!(count = legacy.len(), file = LEGACY_TASKS_FILE_NAME, "从旧版存储升级任务");
        }
        Ok(legacy)
    }

    /// 整体替换
    pub fn replace_all(&self, tasks: &[Task]) -> RepositoryResult<()> {
        write_value(
            &self.path(),
            &StoredTasks {
                schema_version: TASKS_SCHEMA_VERSION,
                tasks,
            },
        )?;
        debug!(count = tasks.len(), "任务已保存");
        Ok(())
    }

    /// 清空项目（旧版文件一并移除，避免再次被升级读取）
    pub fn clear(&self) -> RepositoryResult<()> {
        self.replace_all(&[])?;
        let legacy = self.legacy_path();
        if legacy.exists() {
            std::fs::remove_file(&legacy).map_err(|e| RepositoryError::Io {
                path: legacy.display().to_string(),
                message: e.to_string(),
            })?;
        }
        info!("项目任务已清空");
        Ok(())
    }

    /// 按 UID 查找
    pub fn find_by_uid(&self, task_uid: &str) -> RepositoryResult<Task> {
        self.load_all()?
            .into_iter()
            .find(|t| t.task_uid == task_uid)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Task".to_string(),
                id: task_uid.to_string(),
            })
    }

    /// 更新单个任务（按 UID 匹配第一条）
    pub fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut tasks = self.load_all()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.task_uid == task.task_uid)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Task".to_string(),
                id: task.task_uid.clone(),
            })?;
        *slot = task.clone();
        self.replace_all(&tasks)
    }
}

/// 文档可以是 { tasks: [...] } 或裸数组
fn upgrade_all(doc: &Value) -> Vec<Task> {
    let items: &[Value] = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("tasks").or_else(|| map.get("Tasks")) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let tasks: Vec<Task> = items.iter().filter_map(upgrade_task).collect();
    if tasks.len() < items.len() {
        warn!(dropped = items.len() - tasks.len(), "丢弃无法识别的任务记录");
    }
    tasks
}

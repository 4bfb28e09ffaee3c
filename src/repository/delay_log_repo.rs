// ==========================================
// 现场项目跟踪器 - 延误日志仓储
// ==========================================
// 文件: <data_dir>/LPT_DELAY_LOG_V1.json（条目数组）
// 兼容: 当前文件为空或缺失时读取旧版 DELAY_LOG_V1.json
// 红线: 读取与写入都做清洗，空条目不落盘
// ==========================================

use crate::domain::legacy::upgrade_delay_entry;
use crate::domain::task::DelayLogEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::json_file::{read_value, write_value};
use serde_json::Value;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DELAY_LOG_FILE_NAME: &str = "LPT_DELAY_LOG_V1.json";
pub const LEGACY_DELAY_LOG_FILE_NAME: &str = "DELAY_LOG_V1.json";

#[derive(Debug, Clone)]
pub struct DelayLogRepository {
    data_dir: PathBuf,
}

impl DelayLogRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(DELAY_LOG_FILE_NAME)
    }

    fn load_raw(&self) -> RepositoryResult<Vec<DelayLogEntry>> {
        let current = read_value(&self.path())?
            .map(|doc| sanitize(&doc))
            .unwrap_or_default();
        if !current.is_empty() {
            return Ok(current);
        }

        let legacy = read_value(&self.data_dir.join(LEGACY_DELAY_LOG_FILE_NAME))?
            .map(|doc| sanitize(&doc))
            .unwrap_or_default();
        if !legacy.is_empty() {
            info!(count = legacy.len(), file = LEGACY_DELAY_LOG_FILE_NAME, "从旧版存储读取延误日志");
        }
        Ok(legacy)
    }

    fn save(&self, entries: &[DelayLogEntry]) -> RepositoryResult<()> {
        let kept: Vec<&DelayLogEntry> = entries.iter().filter(|e| !e.is_blank()).collect();
        write_value(&self.path(), &kept)?;
        debug!(count = kept.len(), "延误日志已保存");
        Ok(())
    }

    /// 追加一条
    pub fn append(&self, entry: DelayLogEntry) -> RepositoryResult<()> {
        let mut entries = self.load_raw()?;
        entries.push(entry);
        self.save(&entries)
    }

    /// 列出全部条目（最新在前，无时间的排最后）
    pub fn list(&self) -> RepositoryResult<Vec<DelayLogEntry>> {
        let mut entries = self.load_raw()?;
        entries.sort_by_key(|e| (e.logged_at.is_none(), Reverse(e.logged_at)));
        Ok(entries)
    }

    /// 清空延误日志（旧版文件一并移除）
    pub fn clear(&self) -> RepositoryResult<()> {
        self.save(&[])?;
        let legacy = self.data_dir.join(LEGACY_DELAY_LOG_FILE_NAME);
        if legacy.exists() {
            std::fs::remove_file(&legacy).map_err(|e| RepositoryError::Io {
                path: legacy.display().to_string(),
                message: e.to_string(),
            })?;
        }
        info!("延误日志已清空");
        Ok(())
    }
}

fn sanitize(doc: &Value) -> Vec<DelayLogEntry> {
    let items: &[Value] = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("entries") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    items.iter().filter_map(upgrade_delay_entry).collect()
}

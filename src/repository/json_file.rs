// ==========================================
// 现场项目跟踪器 - JSON 文件读写
// ==========================================
// 职责: 存储文件的读取（缺失/空文件视为无数据）与原子落盘
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

fn io_error(path: &Path, err: std::io::Error) -> RepositoryError {
    RepositoryError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// 读取 JSON 文档
///
/// # 返回
/// - Ok(None): 文件不存在或内容为空
/// - Err(InvalidData): 内容不是合法 JSON
pub fn read_value(path: &Path) -> RepositoryResult<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| RepositoryError::InvalidData {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// 写入 JSON 文档（先写临时文件再改名）
pub fn write_value<T: Serialize>(path: &Path, value: &T) -> RepositoryResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content).map_err(|e| io_error(&tmp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&tmp_path, permissions).map_err(|e| io_error(&tmp_path, e))?;
    }

    std::fs::rename(&tmp_path, path).map_err(|e| io_error(path, e))
}

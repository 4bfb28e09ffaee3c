// ==========================================
// 现场项目跟踪器 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 数据目录下的 config.json（扁平 key-value）
// ==========================================

use crate::config::import_policy::{
    DateOrder, DepartmentPolicy, HierarchyStrategy, ImportPolicy, DEFAULT_DEPARTMENT_ALIAS,
    DEFAULT_TEXT30_FIELD_ID,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 数据目录环境变量
pub const DATA_DIR_ENV: &str = "LPT_DATA_DIR";

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    FormatError { path: String, message: String },

    #[error("配置文件写入失败 ({path}): {message}")]
    WriteError { path: String, message: String },
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 从配置文件加载；文件不存在时使用全部默认值
    ///
    /// # 参数
    /// - path: config.json 路径
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let raw: BTreeMap<String, serde_json::Value> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::FormatError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        };

        // 数值/布尔也统一按字符串保存
        let values = raw
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();

        Ok(Self { path, values })
    }

    /// 从数据目录加载（`<data_dir>/config.json`）
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(data_dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_config_value(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    /// 解析枚举型配置；非法值记录警告后回退默认
    fn parse_or_default<T>(&self, key: &str) -> T
    where
        T: FromStr<Err = String> + Default,
    {
        match self.get_config_value(key) {
            None => T::default(),
            Some(raw) => raw.parse::<T>().unwrap_or_else(|e| {
                tracing::warn!(config_key = key, raw_value = %raw, error = %e, "配置值非法，使用默认值");
                T::default()
            }),
        }
    }

    /// 覆写配置值（仅内存，需调用 save 落盘）
    pub fn set_config_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// 写回配置文件
    pub fn save(&self) -> Result<(), ConfigError> {
        let write_error = |e: String| ConfigError::WriteError {
            path: self.path.display().to_string(),
            message: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(&self.values).map_err(|e| write_error(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| write_error(e.to_string()))
    }

    /// 获取所有生效配置的快照（JSON，含默认值）
    pub fn get_config_snapshot(&self) -> String {
        let policy = self.import_policy();
        let mut snapshot: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        snapshot.insert(config_keys::HIERARCHY_STRATEGY, json!(policy.hierarchy));
        snapshot.insert(config_keys::DEPARTMENT_POLICY, json!(policy.department));
        snapshot.insert(config_keys::DATE_ORDER, json!(policy.date_order));
        snapshot.insert(config_keys::TEXT30_FIELD_ID, json!(policy.text30_field_id));
        snapshot.insert(config_keys::DEPARTMENT_ALIAS, json!(policy.department_alias));
        snapshot.insert(config_keys::WINDOW_DAYS, json!(self.window_days()));
        snapshot.insert(config_keys::LOCALE, json!(self.locale()));
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    // ===== 导入策略 =====

    /// 组装导入策略
    pub fn import_policy(&self) -> ImportPolicy {
        let mut policy = ImportPolicy::default()
            .with_hierarchy(self.parse_or_default::<HierarchyStrategy>(config_keys::HIERARCHY_STRATEGY))
            .with_department(self.parse_or_default::<DepartmentPolicy>(config_keys::DEPARTMENT_POLICY))
            .with_date_order(self.parse_or_default::<DateOrder>(config_keys::DATE_ORDER));
        policy.text30_field_id = self
            .get_config_or_default(config_keys::TEXT30_FIELD_ID, DEFAULT_TEXT30_FIELD_ID)
            .to_string();
        policy.department_alias = self
            .get_config_or_default(config_keys::DEPARTMENT_ALIAS, DEFAULT_DEPARTMENT_ALIAS)
            .to_string();
        policy
    }

    // ===== 展示窗口 =====

    /// 滚动窗口天数（默认 3：今天 → +2 天）
    pub fn window_days(&self) -> u32 {
        let value = self.get_config_or_default(config_keys::WINDOW_DAYS, "3");
        match value.parse::<u32>() {
            Ok(days) if days > 0 => days,
            _ => {
                tracing::warn!(config_key = config_keys::WINDOW_DAYS, raw_value = %value, "窗口天数非法，使用默认值 3");
                3
            }
        }
    }

    /// 界面语言
    pub fn locale(&self) -> String {
        self.get_config_or_default(config_keys::LOCALE, "en").to_string()
    }
}

/// 默认数据目录
///
/// # 优先级
/// 1. 环境变量 LPT_DATA_DIR
/// 2. 用户数据目录/live-project-tracker
/// 3. ./.lpt-data
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("live-project-tracker"),
        None => PathBuf::from("./.lpt-data"),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入策略
    pub const HIERARCHY_STRATEGY: &str = "hierarchy_strategy";
    pub const DEPARTMENT_POLICY: &str = "department_policy";
    pub const DATE_ORDER: &str = "date_order";
    pub const TEXT30_FIELD_ID: &str = "text30_field_id";
    pub const DEPARTMENT_ALIAS: &str = "department_alias";

    // 展示
    pub const WINDOW_DAYS: &str = "window_days";
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ConfigManager::from_data_dir(dir.path()).unwrap();
        assert_eq!(config.import_policy(), ImportPolicy::default());
        assert_eq!(config.window_days(), 3);
        assert_eq!(config.locale(), "en");
    }

    #[test]
    fn test_load_overrides_and_numbers() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "hierarchy_strategy": "outline_stack", "window_days": 5, "date_order": "nonsense" }"#,
        )
        .unwrap();

        let config = ConfigManager::from_data_dir(dir.path()).unwrap();
        let policy = config.import_policy();
        assert_eq!(policy.hierarchy, HierarchyStrategy::OutlineStack);
        // 非法值回退默认
        assert_eq!(policy.date_order, DateOrder::DayFirst);
        assert_eq!(config.window_days(), 5);
    }

    #[test]
    fn test_month_first_and_text_overrides() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "date_order": "month_first", "department_alias": "Discipline" }"#,
        )
        .unwrap();

        let policy = ConfigManager::from_data_dir(dir.path()).unwrap().import_policy();
        assert_eq!(policy.date_order, DateOrder::MonthFirst);
        assert_eq!(policy.department_alias, "Discipline");
        assert_eq!(policy.hierarchy, HierarchyStrategy::WbsPrefix);
        assert_eq!(policy.text30_field_id, DEFAULT_TEXT30_FIELD_ID);
    }

    #[test]
    fn test_set_and_save_roundtrip() {
        let dir = tempdir().unwrap();
        let mut config = ConfigManager::from_data_dir(dir.path()).unwrap();
        config.set_config_value(config_keys::DEPARTMENT_POLICY, "text30_with_resource_fallback");
        config.save().unwrap();

        let reloaded = ConfigManager::from_data_dir(dir.path()).unwrap();
        assert_eq!(
            reloaded.import_policy().department,
            DepartmentPolicy::Text30WithResourceFallback
        );
        assert!(reloaded.get_config_snapshot().contains("text30_with_resource_fallback"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();
        assert!(matches!(
            ConfigManager::from_data_dir(dir.path()),
            Err(ConfigError::FormatError { .. })
        ));
    }
}

// ==========================================
// 现场项目跟踪器 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向用户的提示
// ==========================================

use crate::engine::error::{ExportError, StateTransitionError};
use crate::i18n::t_with_args;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 导入错误 =====
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    // ===== 存储/导出错误 =====
    #[error("数据存储失败: {0}")]
    Repository(RepositoryError),

    #[error("导出失败: {0}")]
    Export(#[from] ExportError),

    // ===== 业务规则错误 =====
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    Config(#[from] crate::config::ConfigError),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
// NotFound 提升为业务错误，其余保留原始存储错误
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            other => ApiError::Repository(other),
        }
    }
}

impl From<StateTransitionError> for ApiError {
    fn from(err: StateTransitionError) -> Self {
        match err {
            StateTransitionError::InvalidTransition { from, to } => {
                ApiError::InvalidStateTransition {
                    from: from.to_string(),
                    to: to.to_string(),
                }
            }
            StateTransitionError::MissingReason => ApiError::InvalidInput(err.to_string()),
        }
    }
}

impl ApiError {
    /// 稳定的错误代码（CLI 退出信息/日志使用）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Import(e) => e.code(),
            ApiError::Repository(_) => "repository_error",
            ApiError::Export(_) => "export_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::InvalidStateTransition { .. } => "invalid_state_transition",
            ApiError::Config(_) => "config_error",
        }
    }

    /// 面向最终用户的本地化提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Import(e) => e.user_message(),
            ApiError::Repository(e) => {
                t_with_args("api.repository_error", &[("message", &e.to_string())])
            }
            ApiError::Export(e) => t_with_args("api.export_error", &[("message", &e.to_string())]),
            ApiError::NotFound(message) => t_with_args("api.not_found", &[("message", message)]),
            ApiError::InvalidInput(message) => {
                t_with_args("api.invalid_input", &[("message", message)])
            }
            ApiError::InvalidStateTransition { from, to } => {
                t_with_args("api.invalid_state_transition", &[("from", from), ("to", to)])
            }
            ApiError::Config(e) => t_with_args("api.config_error", &[("message", &e.to_string())]),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 现场项目跟踪器 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::TaskState;
use thiserror::Error;

/// 状态机错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: TaskState, to: TaskState },

    #[error("暂停原因不能为空")]
    MissingReason,
}

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("导出文件写入失败 ({path}): {message}")]
    Io { path: String, message: String },

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
}

pub type EngineResult<T> = Result<T, StateTransitionError>;

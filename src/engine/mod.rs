// ==========================================
// 现场项目跟踪器 - 引擎层
// ==========================================
// 职责: 任务状态机、滚动展示窗口、CSV 导出
// 红线: 引擎不做持久化，只操作内存中的任务
// ==========================================

pub mod error;
pub mod export;
pub mod shift_window;
pub mod task_state_machine;

// 重导出核心引擎
pub use error::{EngineResult, ExportError, StateTransitionError};
pub use export::{
    delay_log_file_name, export_delay_log, export_shift_report, shift_report_file_name,
    write_delay_log, write_shift_report,
};
pub use shift_window::{sort_by_planned_start, ShiftWindow, WindowSummary, WindowView};
pub use task_state_machine::{minutes_between, TaskStateMachine};

// ==========================================
// 现场项目跟踪器 - 导入策略
// ==========================================
// 职责: 把历史上各版本导入器之间存在分歧的行为
//       固化为显式、可测试的策略选项
// ==========================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// MS Project 中 Task Text30 自定义字段的 FieldID
pub const DEFAULT_TEXT30_FIELD_ID: &str = "188744016";

/// 部门自定义字段的默认别名
pub const DEFAULT_DEPARTMENT_ALIAS: &str = "Assigned Department";

// ==========================================
// HierarchyStrategy - 父级汇总名称推导策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyStrategy {
    /// WBS 前缀：逐级向上查找最近的已存在祖先
    #[default]
    WbsPrefix,
    /// 大纲级别栈：取 level-1 层最近出现的汇总行
    OutlineStack,
}

impl FromStr for HierarchyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wbs_prefix" | "wbs" => Ok(HierarchyStrategy::WbsPrefix),
            "outline_stack" | "outline" => Ok(HierarchyStrategy::OutlineStack),
            other => Err(format!("未知的层级策略: {}", other)),
        }
    }
}

// ==========================================
// DepartmentPolicy - 部门字段取值策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentPolicy {
    /// 仅取 Text30 / Assigned Department，不回退（产品决策）
    #[default]
    Text30Only,
    /// Text30 为空时回退到资源名称的第一项
    Text30WithResourceFallback,
}

impl FromStr for DepartmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text30_only" => Ok(DepartmentPolicy::Text30Only),
            "text30_with_resource_fallback" => Ok(DepartmentPolicy::Text30WithResourceFallback),
            other => Err(format!("未知的部门策略: {}", other)),
        }
    }
}

// ==========================================
// DateOrder - 纯数字日期的日/月顺序
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// dd/mm/yyyy
    #[default]
    DayFirst,
    /// mm/dd/yyyy
    MonthFirst,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day_first" | "dmy" => Ok(DateOrder::DayFirst),
            "month_first" | "mdy" => Ok(DateOrder::MonthFirst),
            other => Err(format!("未知的日期顺序: {}", other)),
        }
    }
}

// ==========================================
// ImportPolicy - 一次导入使用的全部策略
// ==========================================
// 以值的形式显式传入导入管道，管道本身不读取任何全局状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPolicy {
    pub hierarchy: HierarchyStrategy,
    pub department: DepartmentPolicy,
    pub date_order: DateOrder,
    pub text30_field_id: String,
    pub department_alias: String,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            hierarchy: HierarchyStrategy::default(),
            department: DepartmentPolicy::default(),
            date_order: DateOrder::default(),
            text30_field_id: DEFAULT_TEXT30_FIELD_ID.to_string(),
            department_alias: DEFAULT_DEPARTMENT_ALIAS.to_string(),
        }
    }
}

impl ImportPolicy {
    pub fn with_hierarchy(mut self, hierarchy: HierarchyStrategy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn with_department(mut self, department: DepartmentPolicy) -> Self {
        self.department = department;
        self
    }

    pub fn with_date_order(mut self, date_order: DateOrder) -> Self {
        self.date_order = date_order;
        self
    }
}

// ==========================================
// 现场项目跟踪器 - 层级解析器
// ==========================================
// 职责: 识别汇总行，为每个叶子行推导最近祖先汇总名称
// 策略: WBS 前缀（默认） / 大纲级别栈
// 红线: 汇总行只参与祖先查找，不进入最终任务列表
// ==========================================

use crate::config::import_policy::HierarchyStrategy;
use crate::domain::task::RawTaskRecord;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 单行的层级解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRole {
    /// 汇总/容器行
    Summary,
    /// 叶子行及其父级汇总名称（顶层为空串）
    Leaf { parent_name: String },
}

impl RowRole {
    pub fn is_summary(&self) -> bool {
        matches!(self, RowRole::Summary)
    }
}

// ==========================================
// HierarchyResolver
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyResolver {
    strategy: HierarchyStrategy,
}

impl HierarchyResolver {
    pub fn new(strategy: HierarchyStrategy) -> Self {
        Self { strategy }
    }

    /// 解析整张表，结果与输入逐行对应
    ///
    /// 源文件显式给出的父级名称（direct_parent）优先于推导结果
    pub fn resolve(&self, rows: &[RawTaskRecord]) -> Vec<RowRole> {
        let derived = match self.strategy {
            HierarchyStrategy::WbsPrefix => resolve_by_wbs(rows),
            HierarchyStrategy::OutlineStack => resolve_by_outline(rows),
        };

        derived
            .into_iter()
            .zip(rows)
            .map(|(role, row)| match role {
                RowRole::Leaf { .. } if !row.direct_parent.trim().is_empty() => RowRole::Leaf {
                    parent_name: row.direct_parent.trim().to_string(),
                },
                other => other,
            })
            .collect()
    }
}

/// 所有严格的点分前缀，由长到短（"1.2.3" → ["1.2", "1"]）
fn ancestors(wbs: &str) -> impl Iterator<Item = &str> {
    wbs.char_indices()
        .filter(|(_, c)| *c == '.')
        .map(move |(idx, _)| &wbs[..idx])
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
}

fn resolve_by_wbs(rows: &[RawTaskRecord]) -> Vec<RowRole> {
    // 同一 WBS 出现多次时后者覆盖前者
    let by_wbs: HashMap<&str, &RawTaskRecord> = rows
        .iter()
        .filter(|r| !r.wbs.is_empty())
        .map(|r| (r.wbs.as_str(), r))
        .collect();

    let parent_set: HashSet<&str> = rows.iter().flat_map(|r| ancestors(&r.wbs)).collect();

    rows.iter()
        .map(|row| {
            if row.is_summary || parent_set.contains(row.wbs.as_str()) {
                return RowRole::Summary;
            }
            let parent_name = ancestors(&row.wbs)
                .filter_map(|key| by_wbs.get(key))
                .find(|candidate| !candidate.name.trim().is_empty())
                .map(|candidate| candidate.name.trim().to_string())
                .unwrap_or_default();
            RowRole::Leaf { parent_name }
        })
        .collect()
}

fn resolve_by_outline(rows: &[RawTaskRecord]) -> Vec<RowRole> {
    // 缺失或为 0 的大纲级别按 1 处理；级别可跳跃，只记录实际出现过的级别
    let level_of = |row: &RawTaskRecord| row.outline_level.max(1) as usize;
    let mut stack: BTreeMap<usize, String> = BTreeMap::new();
    let mut roles = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let level = level_of(row);
        stack.split_off(&level);
        stack.insert(level, row.name.trim().to_string());

        let has_children = rows
            .get(idx + 1)
            .map(|next| level_of(next) > level)
            .unwrap_or(false);

        if row.is_summary || has_children {
            roles.push(RowRole::Summary);
            continue;
        }

        let parent_name = if level > 1 {
            stack.get(&(level - 1)).cloned().unwrap_or_default()
        } else {
            String::new()
        };
        roles.push(RowRole::Leaf { parent_name });
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(wbs: &str, name: &str, is_summary: bool, level: u32) -> RawTaskRecord {
        RawTaskRecord {
            uid: wbs.to_string(),
            name: name.to_string(),
            is_summary,
            wbs: wbs.to_string(),
            outline_level: level,
            ..Default::default()
        }
    }

    fn leaf(name: &str) -> RowRole {
        RowRole::Leaf {
            parent_name: name.to_string(),
        }
    }

    fn sample() -> Vec<RawTaskRecord> {
        vec![
            row("1", "Shutdown", true, 1),
            row("1.1", "Isolate", false, 2),
            row("1.2", "Pump skid", true, 2),
            row("1.2.1", "Rig pump", false, 3),
        ]
    }

    #[test]
    fn test_wbs_prefix_resolution() {
        let roles = HierarchyResolver::default().resolve(&sample());
        assert_eq!(
            roles,
            vec![RowRole::Summary, leaf("Shutdown"), RowRole::Summary, leaf("Pump skid")]
        );
    }

    #[test]
    fn test_outline_stack_resolution() {
        let roles = HierarchyResolver::new(HierarchyStrategy::OutlineStack).resolve(&sample());
        assert_eq!(
            roles,
            vec![RowRole::Summary, leaf("Shutdown"), RowRole::Summary, leaf("Pump skid")]
        );
    }

    #[test]
    fn test_wbs_prefix_infers_summary_without_flag() {
        let rows = vec![
            row("2", "Commissioning", false, 0),
            row("2.1", "Loop checks", false, 0),
            row("20.1", "Unrelated", false, 0),
        ];
        let roles = HierarchyResolver::default().resolve(&rows);
        assert_eq!(roles, vec![RowRole::Summary, leaf("Commissioning"), leaf("")]);
    }

    #[test]
    fn test_wbs_walks_up_past_missing_levels() {
        let rows = vec![row("3", "Handover", true, 1), row("3.4.1", "Sign off", false, 3)];
        let roles = HierarchyResolver::default().resolve(&rows);
        assert_eq!(roles[1], leaf("Handover"));
    }

    #[test]
    fn test_independent_roots_have_empty_parent() {
        let rows = vec![row("1", "Alpha", false, 1), row("2", "Beta", false, 1)];
        for strategy in [HierarchyStrategy::WbsPrefix, HierarchyStrategy::OutlineStack] {
            let roles = HierarchyResolver::new(strategy).resolve(&rows);
            assert_eq!(roles, vec![leaf(""), leaf("")]);
        }
    }

    #[test]
    fn test_outline_stack_handles_skipped_and_huge_levels() {
        let rows = vec![
            row("1", "Root", false, 0),
            row("1.1", "Deep", false, 4),
            row("1.1.1", "Huge", false, u32::MAX),
            row("1.2", "Back", false, 2),
        ];
        let roles = HierarchyResolver::new(HierarchyStrategy::OutlineStack).resolve(&rows);
        // 跳过的级别没有名称；回到浅层时深层条目被丢弃
        assert_eq!(
            roles,
            vec![RowRole::Summary, RowRole::Summary, leaf(""), leaf("Root")]
        );
    }

    #[test]
    fn test_direct_parent_overrides_derived() {
        let mut rows = sample();
        rows[3].direct_parent = " Explicit parent ".to_string();
        let roles = HierarchyResolver::default().resolve(&rows);
        assert_eq!(roles[3], leaf("Explicit parent"));
        // 汇总行不受影响
        assert!(roles[2].is_summary());
    }
}

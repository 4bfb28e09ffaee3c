// ==========================================
// 现场项目跟踪器 - 字段映射器
// ==========================================
// 职责: 表头 → 列映射（ColumnMap）；CSV 行 → RawTaskRecord
// 红线: 必填列缺任一即整体失败，并列出全部缺失字段
// ==========================================

use crate::config::import_policy::{DepartmentPolicy, ImportPolicy};
use crate::domain::task::RawTaskRecord;
use crate::domain::types::CanonicalField;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::{normalize_header, resolve_alias};
use std::collections::HashMap;

// ==========================================
// ColumnMap - 标准字段 → 列下标
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<CanonicalField, usize>,
}

impl ColumnMap {
    /// 根据原始表头构建列映射
    ///
    /// # 参数
    /// - headers: 原始表头
    /// - policy: 导入策略（提供额外的部门别名）
    ///
    /// # 返回
    /// - Err(MissingColumns): 缺少必填列
    pub fn build(headers: &[String], policy: &ImportPolicy) -> ImportResult<Self> {
        let normalized_headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let mut columns = HashMap::new();
        for field in CanonicalField::ALL {
            if let Some(idx) = resolve_alias(&normalized_headers, field) {
                columns.insert(field, idx);
            }
        }

        // 配置的部门别名作为补充
        if !columns.contains_key(&CanonicalField::Department) {
            let alias = normalize_header(&policy.department_alias);
            if let Some(idx) = normalized_headers
                .iter()
                .position(|h| !alias.is_empty() && *h == alias)
            {
                columns.insert(CanonicalField::Department, idx);
            }
        }

        let missing: Vec<CanonicalField> = CanonicalField::REQUIRED
            .iter()
            .copied()
            .filter(|field| !columns.contains_key(field))
            .collect();

        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                found_headers = ?normalized_headers,
                "CSV 缺少必需列"
            );
            return Err(ImportError::MissingColumns {
                missing,
                found_headers: normalized_headers,
            });
        }

        tracing::debug!(columns = ?columns, "列映射构建完成");
        Ok(Self { columns })
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// 取单元格（列缺失或行过短时为空串）
    fn cell(&self, cells: &[String], field: CanonicalField) -> String {
        let value = self.index_of(field).and_then(|idx| cells.get(idx));
        DataCleaner::clean_text(value.map(String::as_str))
    }

    /// 映射一行
    ///
    /// # 返回
    /// - None: uid 与 name 都为空（无意义行）
    pub fn map_row(
        &self,
        cells: &[String],
        row_number: usize,
        policy: &ImportPolicy,
    ) -> Option<RawTaskRecord> {
        let uid = self.cell(cells, CanonicalField::UniqueId);
        let name = self.cell(cells, CanonicalField::Name);
        if uid.is_empty() && name.is_empty() {
            return None;
        }

        // 无汇总列时一律视为非汇总，由层级解析推断
        let is_summary = self.index_of(CanonicalField::Summary).is_some()
            && DataCleaner::parse_summary_flag(&self.cell(cells, CanonicalField::Summary));

        let mut department = self.cell(cells, CanonicalField::Department);
        if department.is_empty() && policy.department == DepartmentPolicy::Text30WithResourceFallback {
            department = DataCleaner::first_resource(&self.cell(cells, CanonicalField::ResourceNames));
        }

        Some(RawTaskRecord {
            uid,
            name,
            is_summary,
            wbs: self.cell(cells, CanonicalField::Wbs),
            outline_level: DataCleaner::parse_outline_level(
                &self.cell(cells, CanonicalField::OutlineLevel),
            ),
            start_raw: self.cell(cells, CanonicalField::Start),
            finish_raw: self.cell(cells, CanonicalField::Finish),
            percent_complete: DataCleaner::parse_percent(
                &self.cell(cells, CanonicalField::PercentComplete),
            ),
            department,
            direct_parent: self.cell(cells, CanonicalField::TaskSummaryName),
            row_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn full_headers() -> Vec<String> {
        strings(&[
            "Unique ID",
            "Name",
            "Summary",
            "Outline Level",
            "WBS",
            "Start",
            "Finish",
            "% Complete",
            "Resource Names",
            "Text30",
        ])
    }

    #[test]
    fn test_missing_finish_is_reported_alone() {
        let headers = strings(&["Unique ID", "Name", "Outline Level", "WBS", "Start", "% Complete"]);
        let err = ColumnMap::build(&headers, &ImportPolicy::default()).unwrap_err();
        match err {
            ImportError::MissingColumns {
                missing,
                found_headers,
            } => {
                assert_eq!(missing, vec![CanonicalField::Finish]);
                assert_eq!(
                    found_headers,
                    strings(&["unique id", "name", "outline level", "wbs", "start", "% complete"])
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_map_row() {
        let map = ColumnMap::build(&full_headers(), &ImportPolicy::default()).unwrap();
        let cells = strings(&["7", " Rig pump ", "No", "3", "1.2.1", "01/12/2025 08:00", "", "45%", "Crew A", "Mechanical"]);
        let record = map.map_row(&cells, 2, &ImportPolicy::default()).unwrap();
        assert_eq!(record.uid, "7");
        assert_eq!(record.name, "Rig pump");
        assert!(!record.is_summary);
        assert_eq!(record.outline_level, 3);
        assert_eq!(record.percent_complete, 45);
        assert_eq!(record.department, "Mechanical");
        assert_eq!(record.start_raw, "01/12/2025 08:00");
        assert_eq!(record.row_number, 2);
    }

    #[test]
    fn test_department_policy_fallback() {
        let map = ColumnMap::build(&full_headers(), &ImportPolicy::default()).unwrap();
        let cells = strings(&["7", "Rig pump", "No", "3", "1.2.1", "", "", "0", "Crew A, Crew B", ""]);

        let strict = map.map_row(&cells, 2, &ImportPolicy::default()).unwrap();
        assert_eq!(strict.department, "");

        let policy = ImportPolicy::default().with_department(DepartmentPolicy::Text30WithResourceFallback);
        let fallback = map.map_row(&cells, 2, &policy).unwrap();
        assert_eq!(fallback.department, "Crew A");
    }

    #[test]
    fn test_short_and_empty_rows() {
        let map = ColumnMap::build(&full_headers(), &ImportPolicy::default()).unwrap();
        // 行过短: 缺失的单元格视为空
        let record = map.map_row(&strings(&["9", "Loop check"]), 3, &ImportPolicy::default()).unwrap();
        assert_eq!(record.wbs, "");
        assert_eq!(record.percent_complete, 0);
        // uid 与 name 均为空的行被丢弃
        assert!(map.map_row(&strings(&["", " ", "Y"]), 4, &ImportPolicy::default()).is_none());
    }

    #[test]
    fn test_configured_department_alias() {
        let mut headers = full_headers();
        headers[9] = "Discipline".to_string();
        let mut policy = ImportPolicy::default();
        policy.department_alias = "Discipline".to_string();
        let map = ColumnMap::build(&headers, &policy).unwrap();
        assert_eq!(map.index_of(CanonicalField::Department), Some(9));
    }
}

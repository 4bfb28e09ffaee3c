// ==========================================
// 现场项目跟踪器 - CSV 导入器
// ==========================================
// 流程: 分词 → 列映射 → 行映射 → 层级解析 → 任务构建
// ==========================================

use crate::config::import_policy::ImportPolicy;
use crate::domain::task::{RawTaskRecord, Task};
use crate::importer::csv_tokenizer;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::ColumnMap;
use crate::importer::project_importer_trait::ProjectParser;
use crate::importer::task_builder::TaskBuilder;

pub struct CsvImporter;

impl ProjectParser for CsvImporter {
    fn parse_records(
        &self,
        text: &str,
        policy: &ImportPolicy,
    ) -> ImportResult<Vec<RawTaskRecord>> {
        let table = csv_tokenizer::parse(text)?;
        let column_map = ColumnMap::build(&table.headers, policy)?;

        // 行号从 2 开始（第 1 行为表头）
        let records: Vec<RawTaskRecord> = table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(idx, cells)| column_map.map_row(cells, idx + 2, policy))
            .collect();

        tracing::debug!(
            data_rows = table.rows.len(),
            records = records.len(),
            delimiter = %table.delimiter.escape_default(),
            "CSV 行映射完成"
        );
        Ok(records)
    }
}

/// CSV 文本 → 任务列表
pub fn import_csv(text: &str, policy: &ImportPolicy) -> ImportResult<Vec<Task>> {
    let records = CsvImporter.parse_records(text, policy)?;
    Ok(TaskBuilder::new(policy).build_all(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_policy::HierarchyStrategy;
    use crate::importer::error::ImportError;
    use chrono::{Local, NaiveDate};

    const END_TO_END: &str = "Unique ID,Name,Summary,Outline Level,WBS,Start,Finish,% Complete,Text30\n\
        1,Pump skid,Y,1,1,01/12/2025 07:00,02/12/2025 17:00,0,\n\
        2,Rig pump,N,2,1.1,01/12/2025 08:00,01/12/2025 12:00,10,Mechanical\n";

    #[test]
    fn test_end_to_end_summary_and_child() {
        let tasks = import_csv(END_TO_END, &ImportPolicy::default()).unwrap();
        assert_eq!(tasks.len(), 1);

        let task = &tasks[0];
        assert_eq!(task.task_uid, "2");
        assert_eq!(task.task_name, "Rig pump");
        assert_eq!(task.summary_task_name, "Pump skid");
        assert_eq!(task.department, "Mechanical");
        assert_eq!(task.percent_complete, 10);

        let expected = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let local = task.planned_start.unwrap().with_timezone(&Local).naive_local();
        assert_eq!(local, expected);
    }

    #[test]
    fn test_import_is_deterministic() {
        let first = import_csv(END_TO_END, &ImportPolicy::default()).unwrap();
        let second = import_csv(END_TO_END, &ImportPolicy::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_finish_column() {
        let text = "Unique ID,Name,Outline Level,WBS,Start,% Complete\n1,A,1,1,,0\n";
        let err = import_csv(text, &ImportPolicy::default()).unwrap_err();
        assert_eq!(err.missing_fields(), Some(&[crate::domain::CanonicalField::Finish][..]));
    }

    #[test]
    fn test_semicolon_file_without_summary_column() {
        let text = "UID;Task Name;Level;WBS;Start Date;Finish Date;Percent Complete;Assigned Department\n\
            10;Electrical;1;2;;;0;\n\
            11;Terminate cables;2;2.1;05 Nov 2025 08:00;05 Nov 2025 16:00;150;E&I\n";
        let tasks = import_csv(text, &ImportPolicy::default()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].summary_task_name, "Electrical");
        assert_eq!(tasks[0].percent_complete, 100);
        assert_eq!(tasks[0].department, "E&I");
    }

    #[test]
    fn test_huge_outline_level_is_tolerated() {
        let text = "Unique ID,Name,Outline Level,WBS,Start,Finish,% Complete\n\
            1,Turnaround,1,1,,,0\n\
            2,Runaway level,4294967295,1.1,,,0\n\
            3,Back to top,1,2,,,0\n";
        let policy = ImportPolicy::default().with_hierarchy(HierarchyStrategy::OutlineStack);
        let tasks = import_csv(text, &policy).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["Runaway level", "Back to top"]);
        assert_eq!(tasks[0].summary_task_name, "");
        assert_eq!(tasks[1].summary_task_name, "");
    }

    #[test]
    fn test_empty_csv() {
        assert!(matches!(
            import_csv("\n\n", &ImportPolicy::default()),
            Err(ImportError::EmptyInput)
        ));
    }
}

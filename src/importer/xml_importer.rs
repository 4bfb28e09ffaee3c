// ==========================================
// 现场项目跟踪器 - MSPDI XML 导入器
// ==========================================
// 流程: 解析文档 → 定位 Project → 扩展属性定义 → Tasks/Task → 层级解析 → 任务构建
// 规则: 全部按本地元素名匹配，忽略默认命名空间
// ==========================================

use crate::config::import_policy::{DepartmentPolicy, ImportPolicy};
use crate::domain::task::{RawTaskRecord, Task};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::project_importer_trait::ProjectParser;
use crate::importer::task_builder::TaskBuilder;
use roxmltree::{Document, Node};
use std::collections::HashMap;

/// 项目级扩展属性定义
#[derive(Debug, Clone, Default)]
struct AttributeDefinition {
    alias: String,
    field_name: String,
}

pub struct XmlImporter;

impl ProjectParser for XmlImporter {
    fn parse_records(
        &self,
        text: &str,
        policy: &ImportPolicy,
    ) -> ImportResult<Vec<RawTaskRecord>> {
        let doc = Document::parse(text)?;
        let project = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "Project")
            .ok_or(ImportError::NotMspdi)?;

        let definitions = attribute_definitions(project);

        let mut records = Vec::new();
        let mut skipped_null = 0usize;
        let task_nodes = project.descendants().filter(|n| {
            n.is_element()
                && n.tag_name().name() == "Task"
                && n.parent_element().map(|p| p.tag_name().name()) == Some("Tasks")
        });

        for (idx, node) in task_nodes.enumerate() {
            // MS Project 空白行
            if DataCleaner::parse_xml_flag(&child_text(node, "IsNull")) {
                skipped_null += 1;
                continue;
            }

            let uid = child_text(node, "UID");
            let name = child_text(node, "Name");
            if uid.is_empty() && name.is_empty() {
                continue;
            }

            records.push(RawTaskRecord {
                uid,
                name,
                is_summary: DataCleaner::parse_xml_flag(&child_text(node, "Summary")),
                wbs: child_text(node, "WBS"),
                outline_level: DataCleaner::parse_outline_level(&child_text(node, "OutlineLevel")),
                start_raw: child_text(node, "Start"),
                finish_raw: child_text(node, "Finish"),
                percent_complete: DataCleaner::parse_percent(&child_text(node, "PercentComplete")),
                department: department_of(node, &definitions, policy),
                direct_parent: child_text(node, "SummaryName"),
                row_number: idx + 1,
            });
        }

        tracing::debug!(
            records = records.len(),
            skipped_null = skipped_null,
            attribute_definitions = definitions.len(),
            "MSPDI 任务读取完成"
        );
        Ok(records)
    }
}

/// XML 文本 → 任务列表
pub fn import_xml(text: &str, policy: &ImportPolicy) -> ImportResult<Vec<Task>> {
    let records = XmlImporter.parse_records(text, policy)?;
    Ok(TaskBuilder::new(policy).build_all(&records))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// 子元素文本（缺失为空串）
fn child_text(node: Node, name: &str) -> String {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Project/ExtendedAttributes/ExtendedAttribute: FieldID → Alias / FieldName
fn attribute_definitions(project: Node) -> HashMap<String, AttributeDefinition> {
    let Some(block) = child(project, "ExtendedAttributes") else {
        return HashMap::new();
    };

    block
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "ExtendedAttribute")
        .filter_map(|n| {
            let field_id = child_text(n, "FieldID");
            if field_id.is_empty() {
                return None;
            }
            Some((
                field_id,
                AttributeDefinition {
                    alias: child_text(n, "Alias"),
                    field_name: child_text(n, "FieldName"),
                },
            ))
        })
        .collect()
}

/// 部门取值
///
/// 顺序: 扩展属性（FieldID 为 Text30，或别名/字段名匹配）→ Text30 子元素 →
/// （仅回退策略）ResourceNames 子元素
fn department_of(
    task: Node,
    definitions: &HashMap<String, AttributeDefinition>,
    policy: &ImportPolicy,
) -> String {
    let from_attributes = task
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "ExtendedAttribute")
        .find_map(|attr| {
            let field_id = child_text(attr, "FieldID");
            let value = child_text(attr, "Value");
            if value.is_empty() {
                return None;
            }
            let matches_id = field_id == policy.text30_field_id;
            let matches_definition = definitions.get(&field_id).is_some_and(|def| {
                def.alias.eq_ignore_ascii_case(&policy.department_alias)
                    || def.field_name.eq_ignore_ascii_case("Text30")
            });
            (matches_id || matches_definition).then_some(value)
        });

    if let Some(value) = from_attributes {
        return value;
    }

    let direct = child_text(task, "Text30");
    if !direct.is_empty() {
        return direct;
    }

    match policy.department {
        DepartmentPolicy::Text30Only => String::new(),
        DepartmentPolicy::Text30WithResourceFallback => {
            DataCleaner::first_resource(&child_text(task, "ResourceNames"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Project xmlns="http://schemas.microsoft.com/project">
  <Name>Shutdown 2025</Name>
  <ExtendedAttributes>
    <ExtendedAttribute>
      <FieldID>188744017</FieldID>
      <FieldName>Text31</FieldName>
      <Alias>Assigned Department</Alias>
    </ExtendedAttribute>
  </ExtendedAttributes>
  <Tasks>
    <Task><UID>0</UID><Name>Shutdown 2025</Name><WBS>0</WBS><OutlineLevel>0</OutlineLevel><Summary>1</Summary></Task>
    <Task><UID>1</UID><Name>Pump skid</Name><WBS>1</WBS><OutlineLevel>1</OutlineLevel><Summary>1</Summary></Task>
    <Task>
      <UID>2</UID><Name>Rig pump</Name><WBS>1.1</WBS><OutlineLevel>2</OutlineLevel><Summary>0</Summary>
      <Start>2025-12-01T08:00:00</Start><Finish>2025-12-01T12:00:00</Finish>
      <PercentComplete>25</PercentComplete>
      <ExtendedAttribute><FieldID>188744016</FieldID><Value>Mechanical</Value></ExtendedAttribute>
    </Task>
    <Task>
      <UID>3</UID><Name>Align pump</Name><WBS>1.2</WBS><OutlineLevel>2</OutlineLevel><Summary>0</Summary>
      <Start>bad</Start>
      <ExtendedAttribute><FieldID>188744017</FieldID><Value>Millwrights</Value></ExtendedAttribute>
      <ResourceNames>Crew B</ResourceNames>
    </Task>
    <Task><UID>4</UID><IsNull>1</IsNull></Task>
    <Task><UID>5</UID><Name>Punch list</Name><WBS>2</WBS><OutlineLevel>1</OutlineLevel><ResourceNames>QA, Ops</ResourceNames></Task>
  </Tasks>
  <Assignments><Assignment><TaskUID>2</TaskUID></Assignment></Assignments>
</Project>"#;

    #[test]
    fn test_import_sample_project() {
        let tasks = import_xml(SAMPLE, &ImportPolicy::default()).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["Rig pump", "Align pump", "Punch list"]);

        assert_eq!(tasks[0].summary_task_name, "Pump skid");
        assert_eq!(tasks[0].department, "Mechanical");
        assert_eq!(tasks[0].percent_complete, 25);
        assert!(tasks[0].planned_start.is_some());

        // 别名匹配 Assigned Department
        assert_eq!(tasks[1].department, "Millwrights");
        assert!(tasks[1].planned_start.is_none());
        assert_eq!(tasks[1].planned_start_raw, "bad");

        // 默认策略不回退到资源名称
        assert_eq!(tasks[2].department, "");
        assert_eq!(tasks[2].summary_task_name, "");
    }

    #[test]
    fn test_resource_fallback_policy() {
        let policy =
            ImportPolicy::default().with_department(DepartmentPolicy::Text30WithResourceFallback);
        let tasks = import_xml(SAMPLE, &policy).unwrap();
        assert_eq!(tasks[2].department, "QA");
    }

    #[test]
    fn test_prefixed_namespace_and_direct_text30() {
        let xml = r#"<p:Project xmlns:p="urn:x"><p:Tasks><p:Task><p:UID>7</p:UID><p:Name>Flush</p:Name><p:WBS>1</p:WBS><p:Text30>Process</p:Text30></p:Task></p:Tasks></p:Project>"#;
        let tasks = import_xml(xml, &ImportPolicy::default()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].department, "Process");
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            import_xml("<Project><Tasks>", &ImportPolicy::default()),
            Err(ImportError::XmlParse(_))
        ));
        assert!(matches!(
            import_xml("<Schedule><Tasks/></Schedule>", &ImportPolicy::default()),
            Err(ImportError::NotMspdi)
        ));
    }
}

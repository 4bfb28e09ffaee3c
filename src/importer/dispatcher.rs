// ==========================================
// 现场项目跟踪器 - 导入分发器
// ==========================================
// 职责: (字节 | 文本, 文件名, 策略) → 任务列表 | 结构性错误
// 判定: 文件名以 .xml 结尾，或文本以 XML 声明 / <Project 开头 → XML；否则 CSV
// 红线: 纯函数，不读写任何全局状态
// ==========================================

use crate::config::import_policy::ImportPolicy;
use crate::domain::task::Task;
use crate::importer::byte_decoder::{decode_with_encoding, DecodedText};
use crate::importer::csv_importer::import_csv;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::project_importer_trait::ProjectFormat;
use crate::importer::task_builder::report_duplicate_uids;
use crate::importer::xml_importer::import_xml;

/// 判断源文件格式
pub fn detect_format(text: &str, file_name: &str) -> ProjectFormat {
    let trimmed = text.trim_start();
    if file_name.trim().to_ascii_lowercase().ends_with(".xml")
        || trimmed.starts_with("<?xml")
        || trimmed.starts_with("<Project")
    {
        ProjectFormat::Xml
    } else {
        ProjectFormat::Csv
    }
}

/// 文本导入入口
pub fn import_project_file(
    text: &str,
    file_name: &str,
    policy: &ImportPolicy,
) -> ImportResult<Vec<Task>> {
    import_text(text, file_name, policy).map(|(tasks, _)| tasks)
}

/// 解析文本并统计重复 UID（重复项只扫描一次）
pub(crate) fn import_text(
    text: &str,
    file_name: &str,
    policy: &ImportPolicy,
) -> ImportResult<(Vec<Task>, usize)> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let format = detect_format(text, file_name);
    tracing::info!(file_name = %file_name, format = format.as_str(), "开始解析项目文件");

    let tasks = match format {
        ProjectFormat::Xml => import_xml(text, policy)?,
        ProjectFormat::Csv => import_csv(text, policy)?,
    };

    let duplicate_uids = report_duplicate_uids(&tasks);
    Ok((tasks, duplicate_uids))
}

/// 字节导入入口（先解码再分发）
pub fn import_project_bytes(
    bytes: &[u8],
    file_name: &str,
    policy: &ImportPolicy,
) -> ImportResult<Vec<Task>> {
    let decoded = decode_bytes(bytes)?;
    import_project_file(&decoded.text, file_name, policy)
}

/// 解码并记录编码（空字节流直接报空文件）
pub(crate) fn decode_bytes(bytes: &[u8]) -> ImportResult<DecodedText> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }
    let decoded = decode_with_encoding(bytes);
    tracing::debug!(
        encoding = decoded.encoding.as_str(),
        bytes = bytes.len(),
        chars = decoded.text.chars().count(),
        "文件解码完成"
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("a,b", "plan.XML"), ProjectFormat::Xml);
        assert_eq!(detect_format("  <?xml version=\"1.0\"?>", "plan.txt"), ProjectFormat::Xml);
        assert_eq!(detect_format("\n<Project>", "upload"), ProjectFormat::Xml);
        assert_eq!(detect_format("Unique ID,Name", "plan.csv"), ProjectFormat::Csv);
    }

    #[test]
    fn test_blank_input_is_empty_file() {
        let policy = ImportPolicy::default();
        assert!(matches!(
            import_project_file(" \r\n ", "plan.csv", &policy),
            Err(ImportError::EmptyFile)
        ));
        assert!(matches!(
            import_project_bytes(&[], "plan.xml", &policy),
            Err(ImportError::EmptyFile)
        ));
        // 只有 BOM 的文件同样为空
        assert!(matches!(
            import_project_bytes(&[0xEF, 0xBB, 0xBF], "plan.csv", &policy),
            Err(ImportError::EmptyFile)
        ));
    }

    #[test]
    fn test_xml_detected_by_content() {
        let xml = "<Project><Tasks><Task><UID>1</UID><Name>Walkdown</Name><WBS>1</WBS></Task></Tasks></Project>";
        let tasks = import_project_file(xml, "upload.txt", &ImportPolicy::default()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_name, "Walkdown");
    }

    #[test]
    fn test_duplicate_uids_counted_once_and_kept() {
        let csv = "Unique ID,Name,Outline Level,WBS,Start,Finish,% Complete\n\
            7,Rig pump,1,1,,,0\n\
            7,Rig pump again,1,2,,,0\n\
            8,Commission,1,3,,,0\n";
        let (tasks, duplicate_uids) = import_text(csv, "plan.csv", &ImportPolicy::default()).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(duplicate_uids, 1);
    }
}

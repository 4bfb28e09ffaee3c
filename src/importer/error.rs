// ==========================================
// 现场项目跟踪器 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 结构性错误（空文件/XML 损坏/缺列）整体失败;
//       字段级缺陷（日期/部门/百分比）降级为默认值，不进入此类型
// ==========================================

use crate::domain::types::CanonicalField;
use crate::i18n::t_with_args;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件为空")]
    EmptyFile,

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileRead(String),

    // ===== CSV 错误 =====
    #[error("CSV 内容为空")]
    EmptyInput,

    #[error("CSV 解析失败: {0}")]
    CsvParse(String),

    #[error("缺少必需列: {} (识别到的表头: {})", join_fields(.missing), .found_headers.join(", "))]
    MissingColumns {
        missing: Vec<CanonicalField>,
        found_headers: Vec<String>,
    },

    // ===== XML 错误 =====
    #[error("XML 解析失败: {0}")]
    XmlParse(String),

    #[error("不是 MSPDI 文件: 未找到 Project 元素")]
    NotMspdi,

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 稳定错误码（供调用方分支处理）
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::EmptyFile => "empty_file",
            ImportError::FileNotFound(_) => "file_not_found",
            ImportError::FileRead(_) => "file_read_error",
            ImportError::EmptyInput => "empty_input",
            ImportError::CsvParse(_) => "csv_parse_error",
            ImportError::MissingColumns { .. } => "missing_columns",
            ImportError::XmlParse(_) => "xml_parse_error",
            ImportError::NotMspdi => "not_mspdi",
            ImportError::Other(_) => "internal_error",
        }
    }

    /// 面向最终用户的本地化提示（界面层原样弹出）
    pub fn user_message(&self) -> String {
        match self {
            ImportError::EmptyFile => t_with_args("import.empty_file", &[]),
            ImportError::FileNotFound(path) => {
                t_with_args("import.file_not_found", &[("path", path)])
            }
            ImportError::FileRead(message) => {
                t_with_args("import.file_read_error", &[("message", message)])
            }
            ImportError::EmptyInput => t_with_args("import.empty_input", &[]),
            ImportError::CsvParse(message) => {
                t_with_args("import.csv_parse_error", &[("message", message)])
            }
            ImportError::MissingColumns {
                missing,
                found_headers,
            } => {
                let missing = join_fields(missing);
                let found = found_headers.join(", ");
                t_with_args(
                    "import.missing_columns",
                    &[("missing", &missing), ("found", &found)],
                )
            }
            ImportError::XmlParse(message) => {
                t_with_args("import.xml_parse_error", &[("message", message)])
            }
            ImportError::NotMspdi => t_with_args("import.not_mspdi", &[]),
            ImportError::Other(err) => {
                t_with_args("import.internal_error", &[("message", &err.to_string())])
            }
        }
    }

    /// 缺列错误中的缺失字段（其他错误返回 None）
    pub fn missing_fields(&self) -> Option<&[CanonicalField]> {
        match self {
            ImportError::MissingColumns { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(CanonicalField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileRead(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParse(err.to_string())
    }
}

// 实现 From<roxmltree::Error>
impl From<roxmltree::Error> for ImportError {
    fn from(err: roxmltree::Error) -> Self {
        ImportError::XmlParse(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_fields() {
        let err = ImportError::MissingColumns {
            missing: vec![CanonicalField::Finish, CanonicalField::Wbs],
            found_headers: vec!["unique id".to_string(), "name".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("finish, wbs"));
        assert!(message.contains("unique id, name"));
        assert_eq!(err.code(), "missing_columns");
        assert_eq!(
            err.missing_fields(),
            Some(&[CanonicalField::Finish, CanonicalField::Wbs][..])
        );
    }

    #[test]
    fn test_io_error_maps_to_file_read_error() {
        let err: ImportError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.code(), "file_read_error");
        assert!(err.missing_fields().is_none());
    }
}

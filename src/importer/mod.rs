// ==========================================
// 现场项目跟踪器 - 导入层
// ==========================================
// 职责: 项目计划文件（CSV / MSPDI XML）→ 规范任务列表
// 支持: UTF-8 / UTF-8 BOM / UTF-16LE / UTF-16BE
// 红线: 纯函数 (字节, 文件名, 策略) → 任务 | 错误，无隐藏状态
// ==========================================

// 模块声明
pub mod byte_decoder;
pub mod csv_importer;
pub mod csv_tokenizer;
pub mod data_cleaner;
pub mod date_normalizer;
pub mod dispatcher;
pub mod error;
pub mod field_mapper;
pub mod header_normalizer;
pub mod hierarchy;
pub mod project_importer_impl;
pub mod project_importer_trait;
pub mod task_builder;
pub mod xml_importer;

// 重导出核心类型
pub use byte_decoder::{decode, decode_with_encoding, DecodedText, TextEncoding};
pub use csv_importer::{import_csv, CsvImporter};
pub use csv_tokenizer::{sniff_delimiter, ParsedTable};
pub use data_cleaner::DataCleaner;
pub use date_normalizer::{parse_date, DateNormalizer, ParsedDate};
pub use dispatcher::{detect_format, import_project_bytes, import_project_file};
pub use error::{ImportError, ImportResult};
pub use field_mapper::ColumnMap;
pub use header_normalizer::{normalize_header, resolve_alias};
pub use hierarchy::{HierarchyResolver, RowRole};
pub use project_importer_impl::ProjectImporterImpl;
pub use task_builder::TaskBuilder;
pub use xml_importer::{import_xml, XmlImporter};

// 重导出 Trait 接口
pub use project_importer_trait::{ImportOutcome, ProjectFormat, ProjectImporter, ProjectParser};

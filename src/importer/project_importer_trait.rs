// ==========================================
// 现场项目跟踪器 - 项目导入 Trait
// ==========================================
// 职责: 定义项目导入接口（不包含实现）
// ==========================================

use crate::config::import_policy::ImportPolicy;
use crate::domain::task::{RawTaskRecord, Task};
use crate::importer::byte_decoder::TextEncoding;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// 源文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectFormat {
    Csv,
    Xml,
}

impl ProjectFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectFormat::Csv => "csv",
            ProjectFormat::Xml => "xml",
        }
    }
}

/// 一次文件导入的结果
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub file_name: String,
    pub format: ProjectFormat,
    pub encoding: TextEncoding,
    pub tasks: Vec<Task>,
    pub duplicate_uids: usize,
    pub elapsed_ms: u128,
}

// ==========================================
// ProjectImporter Trait
// ==========================================
// 用途: 项目文件导入主接口（唯一的异步边界是读取文件字节）
// 实现者: ProjectImporterImpl
#[async_trait]
pub trait ProjectImporter: Send + Sync {
    /// 从文件导入项目任务
    ///
    /// # 参数
    /// - file_path: .csv 或 .xml 文件路径
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 规范化后的任务列表及元信息
    /// - Err: 文件不存在/为空、XML 损坏、缺少必需列
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<ImportOutcome>;

    /// 从内存字节导入（文件名仅用于格式判断）
    fn import_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<ImportOutcome>;
}

// ==========================================
// ProjectParser Trait
// ==========================================
// 用途: 把解码后的文本映射为中间记录（层级解析之前）
// 实现者: CsvImporter, XmlImporter
pub trait ProjectParser: Send + Sync {
    /// 解析为中间记录（源文件顺序）
    ///
    /// # 返回
    /// - Err: 结构性错误（空输入/XML 损坏/非 MSPDI/缺列）
    fn parse_records(&self, text: &str, policy: &ImportPolicy)
        -> ImportResult<Vec<RawTaskRecord>>;
}

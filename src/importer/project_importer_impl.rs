// ==========================================
// 现场项目跟踪器 - 项目导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到规范任务列表
// 流程: 读取字节（异步） → 解码 → 分发 → 层级解析 → 任务构建
// ==========================================

use crate::config::import_policy::ImportPolicy;
use crate::importer::dispatcher::{decode_bytes, detect_format, import_text};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::project_importer_trait::{ImportOutcome, ProjectImporter};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// ProjectImporterImpl - 项目导入器实现
// ==========================================
pub struct ProjectImporterImpl {
    policy: ImportPolicy,
}

impl ProjectImporterImpl {
    /// 创建导入器
    ///
    /// # 参数
    /// - policy: 导入策略（层级/部门/日期顺序）
    pub fn new(policy: ImportPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ImportPolicy {
        &self.policy
    }
}

#[async_trait::async_trait]
impl ProjectImporter for ProjectImporterImpl {
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportOutcome> {
        let path = file_path.as_ref();
        let path_str = path.display().to_string();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            error!(file_path = %path_str, "文件不存在");
            return Err(ImportError::FileNotFound(path_str));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!(file_path = %path_str, error = %e, "文件读取失败");
            ImportError::from(e)
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(path_str);

        self.import_bytes(&bytes, &file_name)
    }

    fn import_bytes(&self, bytes: &[u8], file_name: &str) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, file_name = %file_name, "开始导入项目文件");

        let decoded = decode_bytes(bytes)?;
        let format = detect_format(&decoded.text, file_name);

        let (tasks, duplicate_uids) =
            import_text(&decoded.text, file_name, &self.policy).map_err(|e| {
                error!(batch_id = %batch_id, code = e.code(), error = %e, "项目文件导入失败");
                e
            })?;

        let elapsed_ms = start_time.elapsed().as_millis();
        info!(
            batch_id = %batch_id,
            format = format.as_str(),
            encoding = decoded.encoding.as_str(),
            tasks = tasks.len(),
            duplicate_uids = duplicate_uids,
            elapsed_ms = elapsed_ms as u64,
            "项目文件导入完成"
        );

        Ok(ImportOutcome {
            batch_id,
            file_name: file_name.to_string(),
            format,
            encoding: decoded.encoding,
            tasks,
            duplicate_uids,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::byte_decoder::TextEncoding;
    use crate::importer::project_importer_trait::ProjectFormat;
    use tempfile::tempdir;

    const CSV: &str = "Unique ID,Name,Outline Level,WBS,Start,Finish,% Complete\n\
        1,Mobilise,1,1,03/11/2025 07:00,03/11/2025 09:00,0\n";

    #[tokio::test]
    async fn test_import_file_reads_and_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        std::fs::write(&path, CSV).unwrap();

        let importer = ProjectImporterImpl::new(ImportPolicy::default());
        let outcome = importer.import_file(&path).await.unwrap();
        assert_eq!(outcome.format, ProjectFormat::Csv);
        assert_eq!(outcome.encoding, TextEncoding::Utf8);
        assert_eq!(outcome.file_name, "plan.csv");
        assert_eq!(outcome.tasks.len(), 1);
        assert_eq!(outcome.duplicate_uids, 0);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let importer = ProjectImporterImpl::new(ImportPolicy::default());
        let err = importer
            .import_file(dir.path().join("nope.csv"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "file_not_found");
    }
}

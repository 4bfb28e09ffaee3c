// ==========================================
// 现场项目跟踪器 - 表头规范化与别名解析
// ==========================================
// 职责: 原始表头 → 规范键；规范键 + 标准字段 → 列下标
// 规则: 大小写/变音符/标点不敏感，别名表固定不可配置
// ==========================================

use crate::domain::types::CanonicalField;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 原始别名表（标准字段 → 可接受的表头拼写）
const RAW_ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::UniqueId,
        &["unique id", "uniqueid", "task unique id", "uid", "unique_id"],
    ),
    (CanonicalField::Name, &["name", "task name", "taskname"]),
    (CanonicalField::Summary, &["summary", "is summary", "issummary"]),
    (
        CanonicalField::OutlineLevel,
        &["outline level", "outlinelevel", "level", "outline lvl", "outline"],
    ),
    (CanonicalField::Wbs, &["wbs"]),
    (
        CanonicalField::Start,
        &[
            "start",
            "start date",
            "start time",
            "startdate",
            "start datetime",
            "start date time",
            "scheduled start",
        ],
    ),
    (
        CanonicalField::Finish,
        &[
            "finish",
            "finish date",
            "finish time",
            "finishdate",
            "finish datetime",
            "finish date time",
            "scheduled finish",
        ],
    ),
    (
        CanonicalField::PercentComplete,
        &[
            "% complete",
            "percent complete",
            "percentcomplete",
            "percent",
            "pct complete",
            "percent complete.",
            "%complete",
        ],
    ),
    (
        CanonicalField::ResourceNames,
        &["resource names", "resources", "resource name", "resourcename"],
    ),
    (
        CanonicalField::Department,
        &[
            "text30",
            "assigned department",
            "department",
            "dept",
            "text 30",
            "text-30",
            "text_30",
        ],
    ),
    (
        CanonicalField::TaskSummaryName,
        &[
            "task summary name",
            "summary task name",
            "parent summary",
            "parent task",
        ],
    ),
];

/// 规范化后的别名表（构建一次）
static ALIASES: Lazy<HashMap<CanonicalField, Vec<String>>> = Lazy::new(|| {
    RAW_ALIASES
        .iter()
        .map(|(field, aliases)| {
            let normalized = aliases.iter().map(|a| normalize_header(a)).collect();
            (*field, normalized)
        })
        .collect()
});

/// 规范化表头
///
/// 步骤: 去前导 BOM/零宽字符 → NFKD 并去掉组合变音符 →
/// 下划线/连字符转空格 → 非 [A-Za-z0-9%. ] 字符转空格 → 压缩空白 → 小写
pub fn normalize_header(raw: &str) -> String {
    let stripped = raw.trim_start_matches(|c: char| {
        matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}')
    });

    let mapped: String = stripped
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '%' | '.' => c,
            _ => ' ',
        })
        .collect();

    mapped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// 某标准字段的规范化别名
pub fn aliases(field: CanonicalField) -> &'static [String] {
    ALIASES.get(&field).map(Vec::as_slice).unwrap_or(&[])
}

/// 在已规范化的表头中查找标准字段对应的列
///
/// 先按别名精确匹配（按列顺序取第一个），再走字段级宽松规则
pub fn resolve_alias(normalized_headers: &[String], field: CanonicalField) -> Option<usize> {
    let field_aliases = aliases(field);
    normalized_headers
        .iter()
        .position(|header| field_aliases.iter().any(|alias| alias == header))
        .or_else(|| {
            normalized_headers
                .iter()
                .position(|header| matches_fallback(header, field))
        })
}

fn matches_fallback(header: &str, field: CanonicalField) -> bool {
    let words: Vec<&str> = header.split(' ').collect();
    let has_word = |w: &str| words.iter().any(|x| *x == w);

    match field {
        CanonicalField::Start | CanonicalField::Finish => {
            let leading = if field == CanonicalField::Start {
                "start"
            } else {
                "finish"
            };
            words.first() == Some(&leading)
                && !["baseline", "actual", "early", "late"]
                    .iter()
                    .any(|q| has_word(q))
        }
        CanonicalField::PercentComplete => {
            (header.contains('%') || header.contains("percent") || header.contains("pct"))
                && header.contains("complete")
                && !header.contains("work")
                && !header.contains("physical")
        }
        CanonicalField::Department => {
            if header.contains("text30") {
                return true;
            }
            (header.contains("department") || has_word("dept"))
                && !["cost", "baseline", "resource"]
                    .iter()
                    .any(|q| header.contains(q))
        }
        _ => false,
    }
}

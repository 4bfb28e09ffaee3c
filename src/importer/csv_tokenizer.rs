// ==========================================
// 现场项目跟踪器 - CSV 分词器
// ==========================================
// 职责: 分隔符嗅探 + 带引号字段的分词
// 支持: , ; <tab> | 四种分隔符，CR / LF / CRLF 行结束
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;

/// 候选分隔符（并列时取靠前者，逗号优先）
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// 分词结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: char,
}

/// 在第一条非空行上嗅探分隔符
///
/// 只统计引号外的出现次数，取次数最多者；无信号时返回逗号
pub fn sniff_delimiter(text: &str) -> char {
    let first_line = text
        .split(['\r', '\n'])
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for c in first_line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == c) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// 分词
///
/// # 返回
/// - Ok(ParsedTable): 第一条非空记录为表头，其余为数据行（已去除全空行）
/// - Err(EmptyInput): 输入为空或只含空白
pub fn parse(text: &str) -> ImportResult<ParsedTable> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let delimiter = sniff_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 允许行长度不一致
        .delimiter(delimiter as u8)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();

        // 跳过完全空白的行
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }

    let mut iter = records.into_iter();
    let headers = iter.next().ok_or(ImportError::EmptyInput)?;
    let rows: Vec<Vec<String>> = iter.collect();

    tracing::debug!(
        delimiter = %delimiter.escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "CSV 分词完成"
    );

    Ok(ParsedTable {
        headers,
        rows,
        delimiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_comma_is_not_a_delimiter() {
        let table = parse("name,value\n\"Task, One\",5").unwrap();
        assert_eq!(table.headers, vec!["name", "value"]);
        assert_eq!(table.rows, vec![vec!["Task, One".to_string(), "5".to_string()]]);
    }

    #[test]
    fn test_quoted_header_and_escaped_quote() {
        let table = parse("a,\"b,c\",d\n1,\"say \"\"hi\"\"\",3").unwrap();
        assert_eq!(table.headers, vec!["a", "b,c", "d"]);
        assert_eq!(table.rows[0][1], "say \"hi\"");
    }

    #[test]
    fn test_sniff_semicolon() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), ';');
        let table = parse("a;b;c\n1;2;3").unwrap();
        assert_eq!(table.delimiter, ';');
        assert_eq!(table.rows[0], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sniff_ignores_quoted_delimiters_and_blank_lines() {
        assert_eq!(sniff_delimiter("\n\n\"x;y;z\"\ta\tb"), '\t');
        assert_eq!(sniff_delimiter("a|b|c"), '|');
        // 无信号时默认逗号
        assert_eq!(sniff_delimiter("single"), ',');
        // 并列时逗号优先
        assert_eq!(sniff_delimiter("a,b;c"), ',');
    }

    #[test]
    fn test_line_terminators_and_blank_rows() {
        let table = parse("h1,h2\r\n1,2\r3,4\n\n , \n5,6\n").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2], vec!["5", "6"]);
    }

    #[test]
    fn test_newline_inside_quotes_stays_in_field() {
        let table = parse("name,notes\nPump,\"line one\nline two\"").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "line one\nline two");
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(parse(""), Err(ImportError::EmptyInput)));
        assert!(matches!(parse("  \r\n\t "), Err(ImportError::EmptyInput)));
    }
}

// ==========================================
// 现场项目跟踪器 - 字节解码器
// ==========================================
// 职责: 原始文件字节 → 文本
// 识别: UTF-8 BOM / UTF-16LE BOM / UTF-16BE BOM / 无 BOM 的 UTF-16 / UTF-8
// 红线: 永不失败，非法序列以 U+FFFD 替换，交由下游报缺列
// ==========================================

use serde::Serialize;

/// 无 BOM 的 UTF-16 探测窗口（字节）
const SNIFF_WINDOW: usize = 64;

/// 识别出的文本编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Bom => "utf-8-bom",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
        }
    }
}

/// 解码结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// 解码为文本（丢弃编码信息）
pub fn decode(bytes: &[u8]) -> String {
    decode_with_encoding(bytes).text
}

/// 解码为文本并返回识别出的编码
pub fn decode_with_encoding(bytes: &[u8]) -> DecodedText {
    let (encoding, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (TextEncoding::Utf16Le, rest),
        [0xFE, 0xFF, rest @ ..] => (TextEncoding::Utf16Be, rest),
        [0xEF, 0xBB, 0xBF, rest @ ..] => (TextEncoding::Utf8Bom, rest),
        _ => (sniff_utf16(bytes).unwrap_or(TextEncoding::Utf8), bytes),
    };

    let text = match encoding {
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => String::from_utf8_lossy(body).into_owned(),
    };

    DecodedText {
        text: clean_text(&text),
        encoding,
    }
}

/// 交替零字节探测
///
/// 取前 64 字节按两字节分组（至少 2 组），
/// ≥ 3/4 的组奇数位为 0 → LE，偶数位为 0 → BE
fn sniff_utf16(bytes: &[u8]) -> Option<TextEncoding> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let pairs: Vec<&[u8]> = window.chunks_exact(2).collect();
    if pairs.len() < 2 {
        return None;
    }

    let odd_zero = pairs.iter().filter(|p| p[1] == 0 && p[0] != 0).count();
    let even_zero = pairs.iter().filter(|p| p[0] == 0 && p[1] != 0).count();
    let threshold = pairs.len() * 3;

    if odd_zero * 4 >= threshold {
        Some(TextEncoding::Utf16Le)
    } else if even_zero * 4 >= threshold {
        Some(TextEncoding::Utf16Be)
    } else {
        None
    }
}

fn decode_utf16(body: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    // 末尾落单的字节直接丢弃
    let units = body.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn clean_text(text: &str) -> String {
    text.strip_prefix('\u{FEFF}')
        .unwrap_or(text)
        .chars()
        .filter(|c| *c != '\0')
        .collect()
}

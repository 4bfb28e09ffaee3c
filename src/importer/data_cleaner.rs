// ==========================================
// 现场项目跟踪器 - 数据清洗器
// ==========================================
// 职责: TRIM / 汇总标志 / 前导数字解析 / 百分比钳制 / 资源名拆分
// 红线: 字段级缺陷只降级为默认值，不报错
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    /// 去首尾空白
    pub fn clean_text(value: Option<&str>) -> String {
        value.map(str::trim).unwrap_or("").to_string()
    }

    /// CSV 汇总标志: y / yes / true / 1（大小写不敏感）
    pub fn parse_summary_flag(value: &str) -> bool {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "true" | "1"
        )
    }

    /// XML 汇总标志: 1 / true
    pub fn parse_xml_flag(value: &str) -> bool {
        matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
    }

    /// 解析前导整数（"45%" → 45，"37.5" → 37，" -3x" → -3）
    pub fn parse_leading_int(value: &str) -> Option<i64> {
        let trimmed = value.trim();
        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        digits[..end].parse::<i64>().ok().map(|n| sign * n)
    }

    /// 大纲级别，非法或负数为 0
    pub fn parse_outline_level(value: &str) -> u32 {
        Self::parse_leading_int(value)
            .map(|n| n.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0)
    }

    /// 完成百分比，钳制到 0-100，非法为 0
    pub fn parse_percent(value: &str) -> u8 {
        Self::parse_leading_int(value)
            .map(Self::clamp_percent)
            .unwrap_or(0)
    }

    pub fn clamp_percent(value: i64) -> u8 {
        value.clamp(0, 100) as u8
    }

    /// 资源名称列表的第一项（逗号或分号分隔）
    pub fn first_resource(value: &str) -> String {
        value
            .split([',', ';'])
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string()
    }
}

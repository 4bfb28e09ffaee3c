// ==========================================
// 现场项目跟踪器 - 日期规范化
// ==========================================
// 职责: 原始日期字符串 → 时刻（失败为 None，原文始终保留）
// 顺序: 清理 → 通用格式 → 纯数字日/月/年 → 日 + 英文月名 + 年
// 红线: 永不报错；无时区的结果按本地时区解释
// ==========================================

use crate::config::import_policy::DateOrder;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid regex")
});

static MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d)\s*([ap])\.?\s*m\b\.?").expect("valid regex"));

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})(?:[ T]+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM)?)?$",
    )
    .expect("valid regex")
});

static MONTH_NAME_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2})[ -]?([a-z]{3,})\.?[ -]?(\d{2,4})(?:[ T]+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM)?)?$",
    )
    .expect("valid regex")
});

/// 三字母月份缩写
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// 带偏移量的通用格式
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// 年在前的无时区格式（仅用于以四位年份开头的文本）
const YEAR_FIRST_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M %p",
];

/// 英文月名在前的无时区格式（%B 同时接受缩写）
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
];

const YEAR_FIRST_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%B %d %Y"];

// ==========================================
// ParsedDate - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub instant: Option<DateTime<Utc>>,
    pub raw: String,
}

impl ParsedDate {
    pub fn is_parsed(&self) -> bool {
        self.instant.is_some()
    }
}

// ==========================================
// DateNormalizer - 日期规范化器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    order: DateOrder,
}

impl DateNormalizer {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    /// 解析原始日期字符串
    pub fn parse(&self, raw: &str) -> ParsedDate {
        let raw = raw.trim().to_string();
        if raw.is_empty() {
            return ParsedDate { instant: None, raw };
        }

        let cleaned = clean(&raw);
        let instant = parse_with_offset(&raw)
            .or_else(|| parse_with_offset(&cleaned))
            .or_else(|| parse_native(&cleaned))
            .or_else(|| self.parse_numeric(&cleaned))
            .or_else(|| parse_month_name(&cleaned))
            .and_then(Parsed::to_utc_instant);

        ParsedDate { instant, raw }
    }

    fn parse_numeric(&self, text: &str) -> Option<Parsed> {
        let caps = NUMERIC_DATE.captures(text)?;
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let (day, month) = match self.order {
            DateOrder::DayFirst => (first, second),
            DateOrder::MonthFirst => (second, first),
        };
        let date = NaiveDate::from_ymd_opt(expand_year(&caps[3])?, month, day)?;
        Some(Parsed::Naive(date.and_time(time_from_captures(&caps)?)))
    }
}

/// 按日在前解析（默认策略）
pub fn parse_date(raw: &str) -> ParsedDate {
    DateNormalizer::default().parse(raw)
}

// 中间结果：带偏移量的时刻直接可用，无时区的需按本地时区换算
enum Parsed {
    Fixed(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl Parsed {
    fn to_utc_instant(self) -> Option<DateTime<Utc>> {
        match self {
            Parsed::Fixed(instant) => Some(instant),
            Parsed::Naive(naive) => local_to_utc(naive),
        }
    }
}

/// 去星期前缀、去逗号、统一上下午写法、压缩空白
fn clean(raw: &str) -> String {
    let without_weekday = WEEKDAY_PREFIX.replace(raw, "");
    let without_commas = without_weekday.replace(',', " ");
    let meridiem = MERIDIEM.replace_all(&without_commas, |caps: &Captures| {
        let suffix = if caps[2].eq_ignore_ascii_case("a") {
            "AM"
        } else {
            "PM"
        };
        format!("{} {}", &caps[1], suffix)
    });
    meridiem.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// chrono 的 %Y 接受任意位数，年在前的格式只对四位年份开头的文本尝试
fn starts_with_year(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && !bytes[4].is_ascii_digit()
}

fn parse_with_offset(text: &str) -> Option<Parsed> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .or_else(|| {
            if !starts_with_year(text) {
                return None;
            }
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        })
        .map(|dt| Parsed::Fixed(dt.with_timezone(&Utc)))
}

fn parse_native(text: &str) -> Option<Parsed> {
    let (datetime_formats, date_formats) = if starts_with_year(text) {
        (YEAR_FIRST_FORMATS, YEAR_FIRST_DATE_FORMATS)
    } else if text.starts_with(|c: char| c.is_ascii_alphabetic()) {
        (MONTH_FIRST_FORMATS, MONTH_FIRST_DATE_FORMATS)
    } else {
        // 纯数字日期交给日/月顺序策略处理
        return None;
    };

    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(Parsed::Naive)
}

fn parse_month_name(text: &str) -> Option<Parsed> {
    let caps = MONTH_NAME_DATE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let prefix = caps[2].get(..3)?.to_ascii_lowercase();
    let month = MONTH_ABBREVIATIONS.iter().position(|m| *m == prefix)? as u32 + 1;
    let date = NaiveDate::from_ymd_opt(expand_year(&caps[3])?, month, day)?;
    Some(Parsed::Naive(date.and_time(time_from_captures(&caps)?)))
}

/// 两位年份按 2000+ 处理
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    Some(if year < 100 { 2000 + year } else { year })
}

/// 捕获组 4-7: 时、分、秒、上下午；缺省为 00:00:00
fn time_from_captures(caps: &Captures) -> Option<NaiveTime> {
    let number = |idx: usize| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let mut hour = number(4)?;
    let minute = number(5)?;
    let second = number(6)?;

    if let Some(meridiem) = caps.get(7) {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    // 夏令时跳变缺口内的本地时间顺延一小时
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

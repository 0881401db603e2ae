//! Combined Log Format rendering
//!
//! See <http://httpd.apache.org/docs/1.3/logs.html#combined>.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::record::RequestRecord;

/// `[10/Oct/2000:13:55:36 -0000]` style date, always in UTC
pub fn clf_date(time: &DateTime<Utc>) -> String {
    time.format("%d/%b/%Y:%H:%M:%S -0000").to_string()
}

/// Hourly log file name, `YYYY-MM-DDhHH.log`.
///
/// Zero-padded and year-major, so string order matches time order.
pub fn log_file_name(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dh%H.log").to_string()
}

/// Double-quote `value`, escaping quotes, backslashes and non-printable characters
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// One newline-terminated Combined Log Format line
pub fn combined_log_line(record: &RequestRecord) -> String {
    let request_line = format!("{} {} {}", record.method, record.raw_path, record.proto);
    format!(
        "{} - - [{}] {} {} {} {} {}\n",
        record.ip,
        clf_date(&record.time),
        quote(&request_line),
        record.status(),
        record.bytes(),
        quote(&record.referer),
        quote(&record.user_agent),
    )
}

//! Text renderings that match Process Monitor's CSV export.
//!
//! Times are printed in UTC; Process Monitor uses the local time zone of
//! the machine doing the export.

use chrono::{DateTime, Datelike, Timelike};

use super::consts::{EventClass, result_message};
use super::details::{DetailMap, DetailValue, format_ticks};
use super::event::Event;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_DIFF_SECS: i64 = 11_644_473_600;
const TICKS_PER_SECOND: u64 = 10_000_000;

/// `m/d/yyyy h:mm:ss AM` with an optional seven-digit fraction.
pub fn date_time(filetime: u64, show_day: bool, show_fraction: bool) -> String {
    let secs = (filetime / TICKS_PER_SECOND) as i64 - FILETIME_UNIX_DIFF_SECS;
    let fraction = filetime % TICKS_PER_SECOND;
    let Some(date) = DateTime::from_timestamp(secs, 0) else {
        return String::new();
    };

    let (is_pm, hour) = date.hour12();
    let mut text = String::new();
    if show_day {
        text.push_str(&format!("{}/{}/{} ", date.month(), date.day(), date.year()));
    }
    text.push_str(&format!("{hour}:{:02}:{:02}", date.minute(), date.second()));
    if show_fraction {
        text.push_str(&format!(".{fraction:07}"));
    }
    text.push_str(if is_pm { " PM" } else { " AM" });
    text
}

/// `hh:mm:ss.fffffff` elapsed since `first`.
pub fn relative_time(date: u64, first: u64) -> String {
    let delta = date.saturating_sub(first);
    let secs = delta / TICKS_PER_SECOND;
    format!(
        "{:02}:{:02}:{:02}.{:07}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        delta % TICKS_PER_SECOND
    )
}

pub fn duration(ticks: u64) -> String {
    format_ticks(ticks)
}

/// `1234567` -> `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Virtualization flag as shown in the Virtualized column.
pub fn bool_text(value: u32) -> &'static str {
    match value {
        0 => "False",
        1 => "True",
        _ => "n/a",
    }
}

pub fn authentication_id(luid: u64) -> String {
    format!("{:08x}:{:08x}", luid >> 32, luid & 0xffff_ffff)
}

fn group_numbers(details: &mut DetailMap, keys: &[&str]) {
    for key in keys {
        if let Some(DetailValue::Number(n)) = details.get(key) {
            let text = thousands(*n);
            details.insert(*key, text);
        }
    }
}

fn registry_detail(operation: &str, details: &mut DetailMap) {
    group_numbers(details, &["Length"]);

    let data = match details.get("Type").and_then(DetailValue::as_str) {
        // not printed by the export
        Some("REG_QWORD") if details.contains_key("Data") => Some(String::new()),
        Some("REG_BINARY" | "REG_MULTI_SZ") => None,
        _ => match details.get("Data") {
            Some(DetailValue::Text(text)) => Some(text.split("\r\n").collect::<Vec<_>>().join("\n;")),
            _ => None,
        },
    };
    if let Some(data) = data {
        details.insert("Data", data);
    }

    if operation == "RegQueryValue" {
        details.remove("Name");
    }
}

/// The Detail column: `key: value` pairs joined by `, `.
pub fn detail_column(event: &Event) -> String {
    if event.details.is_empty() {
        return String::new();
    }
    let mut details = event.details.clone();
    match (event.event_class, event.operation.as_str()) {
        (EventClass::Process, "Load Image") => {
            for key in ["Image Base", "Image Size"] {
                if let Some(n) = details.get(key).and_then(DetailValue::as_u64) {
                    details.insert(key, format!("0x{n:x}"));
                }
            }
        }
        (EventClass::Process, "Process Start") => {
            if let Some(DetailValue::List(environment)) = details.get("Environment") {
                let text = format!("\n;\t{}", environment.join("\n;\t"));
                details.insert("Environment", text);
            }
        }
        (EventClass::Registry, operation) => registry_detail(operation, &mut details),
        (EventClass::FileSystem, _) => {
            group_numbers(&mut details, &["Length", "Offset", "AllocationSize"]);
        }
        _ => {}
    }

    details
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Column titles of the CSV export, in order.
pub const CSV_COLUMNS: [&str; 27] = [
    "Date & Time",
    "Process Name",
    "PID",
    "Operation",
    "Result",
    "Detail",
    "Sequence",
    "Company",
    "Description",
    "Command Line",
    "User",
    "Image Path",
    "Session",
    "Path",
    "TID",
    "Relative Time",
    "Duration",
    "Time of Day",
    "Version",
    "Event Class",
    "Authentication ID",
    "Virtualized",
    "Integrity",
    "Category",
    "Parent PID",
    "Architecture",
    "Completion Time",
];

/// One event rendered for every column of [`CSV_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    values: Vec<String>,
}

impl CsvRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = CSV_COLUMNS.iter().position(|c| *c == column)?;
        self.values.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        CSV_COLUMNS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// The record as one CSV line, every field quoted.
    pub fn to_csv_line(&self) -> String {
        csv_line(self.values.iter().map(String::as_str))
    }
}

pub fn csv_header() -> String {
    csv_line(CSV_COLUMNS.iter().copied())
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

impl Event {
    /// Column values as the CSV export prints them. Relative Time counts
    /// from `first_event_date`, or from this event when `None`.
    pub fn csv_record(&self, first_event_date: Option<u64>) -> CsvRecord {
        let process = &self.process;
        let result = result_message(self.result);
        let completed = !result.is_empty();

        let values = vec![
            date_time(self.date, true, false),
            process.process_name.clone(),
            process.pid.to_string(),
            self.operation.clone(),
            result.to_string(),
            detail_column(self),
            "n/a".to_owned(),
            process.company.clone(),
            process.description.clone(),
            process.command_line.clone(),
            process.user.clone(),
            process.image_path.clone(),
            process.session.to_string(),
            self.path.clone(),
            self.tid.to_string(),
            relative_time(self.date, first_event_date.unwrap_or(self.date)),
            if completed { duration(self.duration) } else { String::new() },
            date_time(self.date, false, true),
            process.version.clone(),
            self.event_class.name().to_owned(),
            authentication_id(process.authentication_id),
            bool_text(process.virtualized).to_owned(),
            process.integrity.clone(),
            self.category.to_string(),
            process.parent_pid.to_string(),
            if process.is_process_64bit { "64-bit" } else { "32-bit" }.to_owned(),
            if completed {
                date_time(self.date.saturating_add(self.duration), false, true)
            } else {
                String::new()
            },
        ];
        CsvRecord { values }
    }
}

//! Timestamp helpers for manifests and per-run output directories

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as an ISO 8601 string (`2024-06-01T12:30:00Z`).
pub fn now_iso8601() -> String {
    let (y, mo, d, h, mi, s) = utc_parts();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y, mo, d, h, mi, s
    )
}

/// Current UTC time as a filesystem-friendly slug (`20240601_123000`),
/// used to name per-run output directories.
pub fn run_slug() -> String {
    let (y, mo, d, h, mi, s) = utc_parts();
    format!("{:04}{:02}{:02}_{:02}{:02}{:02}", y, mo, d, h, mi, s)
}

fn utc_parts() -> (i64, u32, u32, u64, u64, u64) {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days = secs / 86400;
    let time_secs = secs % 86400;
    let hours = time_secs / 3600;
    let mins = (time_secs % 3600) / 60;
    let s = time_secs % 60;

    let mut year = 1970i64;
    let mut remaining = days as i64;
    loop {
        let year_days = if is_leap(year) { 366 } else { 365 };
        if remaining < year_days {
            break;
        }
        remaining -= year_days;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let month_days = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 0usize;
    for (i, &md) in month_days.iter().enumerate() {
        if remaining < md {
            month = i;
            break;
        }
        remaining -= md;
    }

    (
        year,
        month as u32 + 1,
        remaining as u32 + 1,
        hours,
        mins,
        s,
    )
}

fn is_leap(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

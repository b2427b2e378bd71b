//! Synthetic clinic exports for integration tests and demos

use chrono::{Duration, NaiveDate};

use crate::columns;
use crate::table::RawTable;

/// The eleven required columns in export order.
pub fn clinic_header() -> Vec<&'static str> {
    columns::REQUIRED.to_vec()
}

/// A deterministic table of `n` patients. Even rows have their next
/// appointment before 2024-10-07 and odd rows after it, so a clock pinned to
/// that day labels exactly the even rows as defaulters.
pub fn synthetic_clinic_rows(n: usize) -> Vec<Vec<String>> {
    let base = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap_or_default();
    (0..n)
        .map(|i| {
            let defaulter = i % 2 == 0;
            let next = if defaulter {
                base - Duration::days(3 + i as i64)
            } else {
                base + Duration::days(10 + i as i64)
            };
            let last = next - Duration::days(if defaulter { 28 } else { 84 });
            let self_visit = last + Duration::days((i % 4) as i64 * 7);
            let dob = NaiveDate::from_ymd_opt(
                1960 + (i as i32 * 3) % 40,
                1 + (i as u32 % 12),
                1 + (i as u32 * 5) % 28,
            )
            .unwrap_or_default();
            vec![
                dob.format("%d/%m/%Y").to_string(),
                next.format("%Y-%m-%d").to_string(),
                last.format("%Y-%m-%d").to_string(),
                self_visit.format("%Y-%m-%d").to_string(),
                format!("{}", 55 + (i * 7) % 30),
                format!("{}", 150 + (i * 11) % 35),
                if i % 3 == 0 { "F" } else { "M" }.to_string(),
                if defaulter { "No" } else { "Yes" }.to_string(),
                if i % 4 == 0 { "Yes" } else { "No" }.to_string(),
                format!("{}/{}", 110 + (i * 3) % 40, 70 + (i * 2) % 20),
                if defaulter { "1" } else { "3" }.to_string(),
            ]
        })
        .collect()
}

pub fn synthetic_clinic_table(n: usize) -> RawTable {
    let columns = clinic_header().into_iter().map(String::from).collect();
    let rows = synthetic_clinic_rows(n)
        .into_iter()
        .map(|r| r.into_iter().map(Some).collect())
        .collect();
    RawTable::new(columns, rows)
}

/// CSV export of [`synthetic_clinic_table`] with four preamble lines before
/// the header, matching the spreadsheet layout.
pub fn synthetic_clinic_csv(n: usize) -> String {
    let mut out =
        String::from("Active on ART\nFacility,Central\nReport Date,07/10/2024\nGenerated by EMR\n");
    out.push_str(&clinic_header().join(","));
    out.push('\n');
    for row in synthetic_clinic_rows(n) {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

//! Feature derivation: raw clinic rows to model-ready records.

use std::io::Write;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::codebook::{CategoryMap, Codebook};
use crate::columns;
use crate::dates::{completed_years, day_count, parse_date};
use crate::error::DataError;
use crate::impute::ImputationTable;
use crate::table::RawTable;
use crate::vitals::{bmi, parse_number, split_blood_pressure};

/// One patient row after derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(rename = "Age")]
    pub age: i32,
    #[serde(rename = "BMI")]
    pub bmi: Option<f64>,
    #[serde(rename = "Systolic_BP")]
    pub systolic_bp: Option<f64>,
    #[serde(rename = "Diastolic_BP")]
    pub diastolic_bp: Option<f64>,
    #[serde(rename = "Days Between Last and Next Visit")]
    pub days_last_to_next: Option<i64>,
    #[serde(rename = "Days Between Last and Self Visit")]
    pub days_last_to_self: Option<i64>,
    #[serde(rename = "Months Of Prescription")]
    pub months_of_prescription: Option<f64>,
    #[serde(rename = "AHD Client")]
    pub ahd_client: u32,
    #[serde(rename = "Medical Cover")]
    pub medical_cover: u32,
    #[serde(rename = "Sex")]
    pub sex: u32,
    pub defaulter: u8,
}

impl DerivedRecord {
    /// Feature vector in [`columns::FEATURES`] order; missing values are NaN.
    pub fn features(&self) -> Vec<f64> {
        let opt = |v: Option<f64>| v.unwrap_or(f64::NAN);
        vec![
            self.age as f64,
            opt(self.bmi),
            opt(self.systolic_bp),
            opt(self.diastolic_bp),
            opt(self.days_last_to_next.map(|d| d as f64)),
            opt(self.days_last_to_self.map(|d| d as f64)),
            opt(self.months_of_prescription),
            self.ahd_client as f64,
            self.medical_cover as f64,
            self.sex as f64,
        ]
    }
}

/// Derived rows plus the codebook they were encoded with.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub records: Vec<DerivedRecord>,
    pub codebook: Codebook,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn features(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(DerivedRecord::features).collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.defaulter).collect()
    }

    /// Write the records as CSV with the derived column names as header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DataError> {
        let mut w = csv::Writer::from_writer(writer);
        for r in &self.records {
            w.serialize(r)?;
        }
        w.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Where the categorical codes come from.
#[derive(Debug, Clone, Copy)]
pub enum Encoding<'a> {
    /// Fit a fresh codebook from this table (training).
    Fit,
    /// Reuse a persisted codebook (evaluation, serving).
    Use(&'a Codebook),
}

pub struct FeatureDeriver {
    reference_date: NaiveDate,
    imputation: ImputationTable,
    clock: Box<dyn Clock>,
}

impl FeatureDeriver {
    /// `reference_date` is `DD/MM/YYYY` or `YYYY-MM-DD`; ages are computed against it.
    pub fn new(reference_date: &str) -> Result<Self, DataError> {
        let reference_date = parse_date(reference_date)
            .ok_or_else(|| DataError::InvalidReferenceDate(reference_date.to_string()))?;
        Ok(Self {
            reference_date,
            imputation: ImputationTable::default(),
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_imputation(mut self, imputation: ImputationTable) -> Self {
        self.imputation = imputation;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn derive(&self, raw: &RawTable, encoding: Encoding<'_>) -> Result<DerivedTable, DataError> {
        raw.require_columns(&columns::REQUIRED)?;

        let mut table = raw.clone();
        self.imputation.apply(&mut table);

        let col = |name: &str| table.column_index(name);
        let dob_c = col(columns::DOB)?;
        let next_c = col(columns::NEXT_APPOINTMENT_DATE)?;
        let last_c = col(columns::LAST_VISIT_DATE)?;
        let self_c = col(columns::SELF_VISIT_DATE)?;
        let weight_c = col(columns::WEIGHT)?;
        let height_c = col(columns::HEIGHT)?;
        let bp_c = col(columns::BLOOD_PRESSURE)?;
        let months_c = col(columns::MONTHS_OF_PRESCRIPTION)?;

        let codebook = match encoding {
            Encoding::Fit => fit_codebook(&table)?,
            Encoding::Use(book) => book.clone(),
        };

        let now = self.clock.now();
        let mut records = Vec::with_capacity(table.len());
        for i in 0..table.len() {
            let row = i + 1;
            let cell = |c: usize| table.get(i, c);

            let dob_raw = cell(dob_c).ok_or_else(|| missing(columns::DOB, row))?;
            let dob = parse_date(dob_raw).ok_or_else(|| DataError::InvalidDate {
                column: columns::DOB.to_string(),
                row,
                value: dob_raw.to_string(),
            })?;

            let next = visit_date(cell(next_c), columns::NEXT_APPOINTMENT_DATE, row);
            let last = visit_date(cell(last_c), columns::LAST_VISIT_DATE, row);
            let self_visit = visit_date(cell(self_c), columns::SELF_VISIT_DATE, row);

            let weight = parse_number(cell(weight_c), columns::WEIGHT, row)?;
            let height = parse_number(cell(height_c), columns::HEIGHT, row)?;
            let (systolic_bp, diastolic_bp) = match cell(bp_c) {
                Some(bp) => {
                    let (s, d) = split_blood_pressure(bp, row)?;
                    (Some(s), Some(d))
                }
                None => (None, None),
            };

            let encode = |name: &str| -> Result<u32, DataError> {
                let label = category_label(&table, i, name)?;
                codebook.encode(name, label)
            };

            records.push(DerivedRecord {
                age: completed_years(dob, self.reference_date),
                bmi: weight.zip(height).and_then(|(w, h)| bmi(w, h)),
                systolic_bp,
                diastolic_bp,
                days_last_to_next: day_count(next, last),
                days_last_to_self: day_count(self_visit, last),
                months_of_prescription: parse_number(
                    cell(months_c),
                    columns::MONTHS_OF_PRESCRIPTION,
                    row,
                )?,
                ahd_client: encode(columns::AHD_CLIENT)?,
                medical_cover: encode(columns::MEDICAL_COVER)?,
                sex: encode(columns::SEX)?,
                defaulter: next.is_some_and(|d| d.and_time(NaiveTime::MIN) < now) as u8,
            });
        }

        let defaulters = records.iter().filter(|r| r.defaulter == 1).count();
        log::info!(
            "Derived {} records ({} defaulters) against reference date {}",
            records.len(),
            defaulters,
            self.reference_date
        );
        Ok(DerivedTable { records, codebook })
    }
}

fn missing(column: &str, row: usize) -> DataError {
    DataError::MissingValue {
        column: column.to_string(),
        row,
    }
}

fn visit_date(value: Option<&str>, column: &str, row: usize) -> Option<NaiveDate> {
    let value = value?;
    let parsed = parse_date(value);
    if parsed.is_none() {
        log::debug!("Row {row}: '{value}' in '{column}' is not a date, treating as missing");
    }
    parsed
}

/// The label to encode for a categorical cell, substituting the default flag
/// for AHD Client / Medical Cover.
fn category_label<'t>(table: &'t RawTable, i: usize, column: &str) -> Result<&'t str, DataError> {
    let c = table.column_index(column)?;
    match table.get(i, c) {
        Some(v) => Ok(v),
        None if column == columns::SEX => Err(missing(column, i + 1)),
        None => Ok(columns::DEFAULT_FLAG),
    }
}

fn fit_codebook(table: &RawTable) -> Result<Codebook, DataError> {
    let mut book = Codebook::new();
    for column in columns::CATEGORICAL {
        let labels = (0..table.len())
            .map(|i| category_label(table, i, column))
            .collect::<Result<Vec<_>, _>>()?;
        let map = CategoryMap::fit(labels);
        log::debug!("Codes for '{column}': {map:?}");
        book = book.with_column(column, map);
    }
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::impute::ImputePolicy;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDateTime;

    const HEADER: [&str; 11] = [
        "DOB",
        "Next Appointment Date",
        "Last Visit Date",
        "Self Visit Date",
        "Weight",
        "Height",
        "Sex",
        "AHD Client",
        "Medical Cover",
        "Blood Pressure",
        "Months Of Prescription",
    ];

    fn noon(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock(NaiveDateTime::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        ))
    }

    fn deriver() -> FeatureDeriver {
        FeatureDeriver::new("07/10/2024")
            .unwrap()
            .with_clock(noon(2024, 10, 7))
    }

    #[test]
    fn derives_one_row() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[vec![
                "08/10/1990", "2024-10-10", "2024-10-01", "2024-09-20", "70", "170", "M", "Yes",
                "", "120/80", "3",
            ]],
        );
        let t = deriver().derive(&raw, Encoding::Fit).unwrap();
        let r = &t.records[0];
        assert_eq!(r.age, 33);
        assert_abs_diff_eq!(r.bmi.unwrap(), 24.22, epsilon = 0.005);
        assert_eq!((r.systolic_bp, r.diastolic_bp), (Some(120.0), Some(80.0)));
        assert_eq!(r.days_last_to_next, Some(9));
        assert_eq!(r.days_last_to_self, Some(-11));
        assert_eq!(r.months_of_prescription, Some(3.0));
        assert_eq!(r.defaulter, 0);
        assert_eq!(t.codebook.column("Medical Cover").unwrap().code("No"), Some(0));
    }

    #[test]
    fn label_follows_injected_clock() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[
                vec!["01/01/1980", "2024-10-06", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "2024-10-07", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "2024-10-08", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "garbage", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
            ],
        );
        let t = deriver().derive(&raw, Encoding::Fit).unwrap();
        assert_eq!(t.labels(), vec![1, 1, 0, 0]);
        assert_eq!(t.records[3].days_last_to_next, None);
        assert_eq!(t.records[0].days_last_to_self, None);
    }

    #[test]
    fn blank_visit_dates_inherit_previous_row() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[
                vec!["01/01/1980", "2024-10-01", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "", "", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "not a date", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
            ],
        );
        let t = deriver().derive(&raw, Encoding::Fit).unwrap();
        assert_eq!(t.records[1].defaulter, 1);
        assert_eq!(t.records[1].days_last_to_next, Some(30));
        assert_eq!(t.records[2].defaulter, 0);
        assert_eq!(t.records[2].days_last_to_next, None);
    }

    #[test]
    fn missing_column_fails_before_derivation() {
        let raw = RawTable::from_strs(&HEADER[..10], &[]);
        let err = deriver().derive(&raw, Encoding::Fit).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "Months Of Prescription"));
    }

    #[test]
    fn malformed_blood_pressure_aborts() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[
                vec!["01/01/1980", "2024-10-06", "2024-09-01", "", "60", "160", "F", "No", "No", "110/70", "1"],
                vec!["01/01/1980", "2024-10-06", "2024-09-01", "", "60", "160", "F", "No", "No", "120", "1"],
            ],
        );
        let err = deriver().derive(&raw, Encoding::Fit).unwrap_err();
        assert!(matches!(err, DataError::InvalidBloodPressure { row: 2, .. }));
    }

    #[test]
    fn forward_fill_then_zero_height() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[
                vec!["01/01/1980", "2024-10-06", "2024-09-01", "", "60", "0", "F", "No", "No", "110/70", "1"],
                vec!["", "2024-10-06", "2024-09-01", "", "", "", "", "", "", "", ""],
            ],
        );
        let t = deriver().derive(&raw, Encoding::Fit).unwrap();
        assert_eq!(t.records[1].age, 44);
        assert_eq!(t.records[1].bmi, None);
        assert_eq!(t.records[1].systolic_bp, Some(110.0));
    }

    #[test]
    fn reused_codebook_rejects_unseen_labels() {
        let train = RawTable::from_strs(
            &HEADER,
            &[vec!["01/01/1980", "", "", "", "60", "160", "F", "No", "No", "110/70", "1"]],
        );
        let t = deriver().derive(&train, Encoding::Fit).unwrap();
        let other = RawTable::from_strs(
            &HEADER,
            &[vec!["01/01/1980", "", "", "", "60", "160", "M", "No", "No", "110/70", "1"]],
        );
        let err = deriver()
            .derive(&other, Encoding::Use(&t.codebook))
            .unwrap_err();
        assert!(matches!(err, DataError::UnknownCategory { .. }));
    }

    #[test]
    fn leave_policy_keeps_first_gap_and_sex_must_exist() {
        let raw = RawTable::from_strs(
            &HEADER,
            &[vec!["01/01/1980", "", "", "", "60", "160", "", "No", "No", "110/70", "1"]],
        );
        let d = deriver().with_imputation(ImputationTable::uniform(ImputePolicy::Leave));
        let err = d.derive(&raw, Encoding::Fit).unwrap_err();
        assert!(matches!(err, DataError::MissingValue { row: 1, .. }));
    }
}

//! Clinic record ingestion and feature derivation for appointment-defaulter
//! prediction.
//!
//! Examples:
//! - Read the CSV export of the clinic spreadsheet with [`read_csv`]
//! - Derive model features with [`FeatureDeriver`]
//! - Freeze categorical codes in a [`Codebook`] and reuse them later
//!
//! Derive features from a literal table:
//! ```
//! use chrono::NaiveDate;
//! use defaulter_data::{clock::FixedClock, Encoding, FeatureDeriver};
//! use defaulter_data::testdata::synthetic_clinic_table;
//! let now = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let deriver = FeatureDeriver::new("07/10/2024").unwrap().with_clock(FixedClock(now));
//! let table = deriver.derive(&synthetic_clinic_table(4), Encoding::Fit).unwrap();
//! assert_eq!(table.labels(), vec![1, 0, 1, 0]);
//! assert_eq!(table.features()[0].len(), defaulter_data::columns::FEATURES.len());
//! ```
//!
//! Imputation overrides:
//! ```
//! use defaulter_data::impute::{ImputationTable, ImputePolicy};
//! let table = ImputationTable::default().with_policy("Weight", ImputePolicy::Leave);
//! assert_eq!(table.policy_for("Weight"), &ImputePolicy::Leave);
//! assert_eq!(table.policy_for("Height"), &ImputePolicy::ForwardFill);
//! ```
pub mod clock;
pub mod codebook;
pub mod columns;
pub mod dates;
pub mod derive;
pub mod error;
pub mod impute;
pub mod table;
pub mod testdata;
pub mod vitals;

pub use codebook::{CategoryMap, Codebook, CODEBOOK_VERSION};
pub use derive::{DerivedRecord, DerivedTable, Encoding, FeatureDeriver};
pub use error::DataError;
pub use impute::{ImputationTable, ImputePolicy};
pub use table::{read_csv, read_csv_from, RawTable};

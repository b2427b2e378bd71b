//! Column names of the clinic export and of the derived feature table.

pub const DOB: &str = "DOB";
pub const NEXT_APPOINTMENT_DATE: &str = "Next Appointment Date";
pub const LAST_VISIT_DATE: &str = "Last Visit Date";
pub const SELF_VISIT_DATE: &str = "Self Visit Date";
pub const WEIGHT: &str = "Weight";
pub const HEIGHT: &str = "Height";
pub const SEX: &str = "Sex";
pub const AHD_CLIENT: &str = "AHD Client";
pub const MEDICAL_COVER: &str = "Medical Cover";
pub const BLOOD_PRESSURE: &str = "Blood Pressure";
pub const MONTHS_OF_PRESCRIPTION: &str = "Months Of Prescription";

pub const AGE: &str = "Age";
pub const BMI: &str = "BMI";
pub const SYSTOLIC_BP: &str = "Systolic_BP";
pub const DIASTOLIC_BP: &str = "Diastolic_BP";
pub const DAYS_LAST_TO_NEXT: &str = "Days Between Last and Next Visit";
pub const DAYS_LAST_TO_SELF: &str = "Days Between Last and Self Visit";
pub const DEFAULTER: &str = "defaulter";

/// Raw columns that must be present in every input table.
pub const REQUIRED: [&str; 11] = [
    DOB,
    NEXT_APPOINTMENT_DATE,
    LAST_VISIT_DATE,
    SELF_VISIT_DATE,
    WEIGHT,
    HEIGHT,
    SEX,
    AHD_CLIENT,
    MEDICAL_COVER,
    BLOOD_PRESSURE,
    MONTHS_OF_PRESCRIPTION,
];

/// Label-encoded categorical columns.
pub const CATEGORICAL: [&str; 3] = [SEX, AHD_CLIENT, MEDICAL_COVER];

/// Feature columns in the order the model is trained and queried with.
pub const FEATURES: [&str; 10] = [
    AGE,
    BMI,
    SYSTOLIC_BP,
    DIASTOLIC_BP,
    DAYS_LAST_TO_NEXT,
    DAYS_LAST_TO_SELF,
    MONTHS_OF_PRESCRIPTION,
    AHD_CLIENT,
    MEDICAL_COVER,
    SEX,
];

/// Category substituted for a missing AHD Client / Medical Cover flag.
pub const DEFAULT_FLAG: &str = "No";

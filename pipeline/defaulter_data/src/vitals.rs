use crate::error::DataError;

/// Body-mass index from weight in kg and height in cm; `None` when height <= 0.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm > 0.0 {
        let m = height_cm / 100.0;
        Some(weight_kg / (m * m))
    } else {
        None
    }
}

/// Split a "systolic/diastolic" reading into its two components.
///
/// `row` is only used for error reporting.
pub fn split_blood_pressure(value: &str, row: usize) -> Result<(f64, f64), DataError> {
    let invalid = || DataError::InvalidBloodPressure {
        row,
        value: value.to_string(),
    };
    let mut parts = value.split('/');
    let (Some(sys), Some(dia), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let sys = sys.trim().parse::<f64>().map_err(|_| invalid())?;
    let dia = dia.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok((sys, dia))
}

/// Parse a numeric cell; `None` stays `None`.
pub fn parse_number(value: Option<&str>, column: &str, row: usize) -> Result<Option<f64>, DataError> {
    value
        .map(|v| {
            v.trim().parse::<f64>().map_err(|_| DataError::InvalidNumber {
                column: column.to_string(),
                row,
                value: v.to_string(),
            })
        })
        .transpose()
}

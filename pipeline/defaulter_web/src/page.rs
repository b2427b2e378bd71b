//! HTML for the prediction page.

use crate::form::PredictForm;

/// Shown in place of a prediction when the form cannot be converted or the
/// model rejects the row.
pub const INPUT_ERROR: &str = "Error: Check input features!";

/// What to show under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Empty,
    Prediction(u8),
    Error(String),
}

const FIELDS: [(&str, &str, &str); 10] = [
    ("age", "Age", "number"),
    ("bmi", "BMI", "text"),
    ("systolic_bp", "Systolic BP", "number"),
    ("diastolic_bp", "Diastolic BP", "number"),
    ("days_between_next_last", "Days Between Last and Next Visit", "number"),
    ("days_between_last_self", "Days Between Last and Self Visit", "number"),
    ("months_of_prescription", "Months Of Prescription", "number"),
    ("ahd_client", "AHD Client", "text"),
    ("medical_cover", "Medical Cover", "text"),
    ("sex", "Sex", "text"),
];

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn value_of<'a>(form: &'a PredictForm, name: &str) -> &'a str {
    match name {
        "age" => &form.age,
        "bmi" => &form.bmi,
        "systolic_bp" => &form.systolic_bp,
        "diastolic_bp" => &form.diastolic_bp,
        "days_between_next_last" => &form.days_between_next_last,
        "days_between_last_self" => &form.days_between_last_self,
        "months_of_prescription" => &form.months_of_prescription,
        "ahd_client" => &form.ahd_client,
        "medical_cover" => &form.medical_cover,
        "sex" => &form.sex,
        _ => "",
    }
}

/// Render the form, pre-filled with `form`, followed by `outcome`.
pub fn render(form: &PredictForm, outcome: &Outcome) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\">\
         <title>Defaulter Prediction</title></head>\n<body>\n\
         <h1>Appointment Defaulter Prediction</h1>\n\
         <form method=\"post\" action=\"/predict\">\n",
    );
    for (name, label, kind) in FIELDS {
        html.push_str(&format!(
            "  <label>{label} <input type=\"{kind}\" name=\"{name}\" value=\"{}\"></label><br>\n",
            escape(value_of(form, name))
        ));
    }
    html.push_str("  <button type=\"submit\">Predict</button>\n</form>\n");
    match outcome {
        Outcome::Empty => {}
        Outcome::Prediction(label) => html.push_str(&format!(
            "<p id=\"prediction\">Prediction: {label}</p>\n"
        )),
        Outcome::Error(msg) => {
            html.push_str(&format!("<p id=\"error\">{}</p>\n", escape(msg)))
        }
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_all_fields() {
        let html = render(&PredictForm::default(), &Outcome::Empty);
        for (name, _, _) in FIELDS {
            assert!(html.contains(&format!("name=\"{name}\"")), "{name}");
        }
        assert!(!html.contains("Prediction:"));
    }

    #[test]
    fn submitted_values_are_escaped() {
        let form = PredictForm {
            sex: "<M>".into(),
            ..PredictForm::default()
        };
        let html = render(&form, &Outcome::Error(INPUT_ERROR.into()));
        assert!(html.contains("value=\"&lt;M&gt;\""));
        assert!(html.contains("Error: Check input features!"));
    }

    #[test]
    fn prediction_is_shown() {
        let html = render(&PredictForm::default(), &Outcome::Prediction(1));
        assert!(html.contains("Prediction: 1"));
    }
}

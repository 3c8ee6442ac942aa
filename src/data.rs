use crate::lookup::CategoricalField;
use crate::normalize::CategoryNormalizer;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Quantity-valued attributes, in the order the form reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    AgeAtEnrollment,
    FirstSemCredited,
    FirstSemEnrolled,
    FirstSemEvaluations,
    FirstSemApproved,
    FirstSemGrade,
    FirstSemWithoutEvaluations,
    SecondSemCredited,
    SecondSemEnrolled,
    SecondSemEvaluations,
    SecondSemApproved,
    SecondSemGrade,
    SecondSemWithoutEvaluations,
    ApplicationOrder,
    PreviousQualificationGrade,
    AdmissionGrade,
    UnemploymentRate,
    InflationRate,
    Gdp,
}

impl NumericField {
    pub const ALL: [NumericField; 19] = [
        NumericField::AgeAtEnrollment,
        NumericField::FirstSemCredited,
        NumericField::FirstSemEnrolled,
        NumericField::FirstSemEvaluations,
        NumericField::FirstSemApproved,
        NumericField::FirstSemGrade,
        NumericField::FirstSemWithoutEvaluations,
        NumericField::SecondSemCredited,
        NumericField::SecondSemEnrolled,
        NumericField::SecondSemEvaluations,
        NumericField::SecondSemApproved,
        NumericField::SecondSemGrade,
        NumericField::SecondSemWithoutEvaluations,
        NumericField::ApplicationOrder,
        NumericField::PreviousQualificationGrade,
        NumericField::AdmissionGrade,
        NumericField::UnemploymentRate,
        NumericField::InflationRate,
        NumericField::Gdp,
    ];

    pub fn column(self) -> &'static str {
        match self {
            NumericField::AgeAtEnrollment => AGE_COLUMN,
            NumericField::FirstSemCredited => "Curricular_units_1st_sem_credited",
            NumericField::FirstSemEnrolled => "Curricular_units_1st_sem_enrolled",
            NumericField::FirstSemEvaluations => "Curricular_units_1st_sem_evaluations",
            NumericField::FirstSemApproved => "Curricular_units_1st_sem_approved",
            NumericField::FirstSemGrade => "Curricular_units_1st_sem_grade",
            NumericField::FirstSemWithoutEvaluations => {
                "Curricular_units_1st_sem_without_evaluations"
            }
            NumericField::SecondSemCredited => "Curricular_units_2nd_sem_credited",
            NumericField::SecondSemEnrolled => "Curricular_units_2nd_sem_enrolled",
            NumericField::SecondSemEvaluations => "Curricular_units_2nd_sem_evaluations",
            NumericField::SecondSemApproved => "Curricular_units_2nd_sem_approved",
            NumericField::SecondSemGrade => "Curricular_units_2nd_sem_grade",
            NumericField::SecondSemWithoutEvaluations => {
                "Curricular_units_2nd_sem_without_evaluations"
            }
            NumericField::ApplicationOrder => "Application_order",
            NumericField::PreviousQualificationGrade => "Previous_qualification_grade",
            NumericField::AdmissionGrade => "Admission_grade",
            NumericField::UnemploymentRate => "Unemployment_rate",
            NumericField::InflationRate => "Inflation_rate",
            NumericField::Gdp => "GDP",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NumericField::AgeAtEnrollment => "Age at enrollment",
            NumericField::FirstSemCredited => "1st sem units credited",
            NumericField::FirstSemEnrolled => "1st sem units enrolled",
            NumericField::FirstSemEvaluations => "1st sem units evaluated",
            NumericField::FirstSemApproved => "1st sem units approved",
            NumericField::FirstSemGrade => "1st sem avg grade",
            NumericField::FirstSemWithoutEvaluations => "1st sem units w/o eval",
            NumericField::SecondSemCredited => "2nd sem units credited",
            NumericField::SecondSemEnrolled => "2nd sem units enrolled",
            NumericField::SecondSemEvaluations => "2nd sem units evaluated",
            NumericField::SecondSemApproved => "2nd sem units approved",
            NumericField::SecondSemGrade => "2nd sem avg grade",
            NumericField::SecondSemWithoutEvaluations => "2nd sem units w/o eval",
            NumericField::ApplicationOrder => "Application order",
            NumericField::PreviousQualificationGrade => "Prev qual grade",
            NumericField::AdmissionGrade => "Admission grade",
            NumericField::UnemploymentRate => "Unemployment rate",
            NumericField::InflationRate => "Inflation rate",
            NumericField::Gdp => "GDP",
        }
    }

    fn is_count(self) -> bool {
        matches!(
            self,
            NumericField::AgeAtEnrollment
                | NumericField::ApplicationOrder
                | NumericField::FirstSemCredited
                | NumericField::FirstSemEnrolled
                | NumericField::FirstSemEvaluations
                | NumericField::FirstSemApproved
                | NumericField::FirstSemWithoutEvaluations
                | NumericField::SecondSemCredited
                | NumericField::SecondSemEnrolled
                | NumericField::SecondSemEvaluations
                | NumericField::SecondSemApproved
                | NumericField::SecondSemWithoutEvaluations
        )
    }

    /// Checks a present value against the field's accepted range.
    fn check(self, value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err("must be a finite number".to_string());
        }
        if self.is_count() && value.fract() != 0.0 {
            return Err("must be a whole number".to_string());
        }

        let in_range = match self {
            NumericField::AgeAtEnrollment => (0.0..100.0).contains(&value),
            NumericField::PreviousQualificationGrade | NumericField::AdmissionGrade => {
                (0.0..=200.0).contains(&value)
            }
            NumericField::FirstSemGrade | NumericField::SecondSemGrade => {
                (0.0..=20.0).contains(&value)
            }
            NumericField::UnemploymentRate | NumericField::InflationRate => {
                (0.0..=100.0).contains(&value)
            }
            _ => value >= 0.0,
        };

        if in_range {
            Ok(())
        } else {
            Err(match self {
                NumericField::AgeAtEnrollment => "must be between 0 and 99".to_string(),
                NumericField::PreviousQualificationGrade | NumericField::AdmissionGrade => {
                    "must be between 0 and 200".to_string()
                }
                NumericField::FirstSemGrade | NumericField::SecondSemGrade => {
                    "must be between 0 and 20".to_string()
                }
                NumericField::UnemploymentRate | NumericField::InflationRate => {
                    "must be between 0 and 100".to_string()
                }
                _ => "must not be negative".to_string(),
            })
        }
    }
}

pub const AGE_COLUMN: &str = "Age_at_enrollment";

/// One submission from the form. Any attribute may be absent; nothing here
/// has been checked yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentForm {
    pub age_at_enrollment: Option<f64>,

    #[serde(deserialize_with = "deserialize_code")]
    pub marital_status: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub application_mode: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub course: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub previous_qualification: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub nationality: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub mothers_qualification: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub fathers_qualification: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub mothers_occupation: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub fathers_occupation: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub daytime_evening_attendance: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub displaced: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub educational_special_needs: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub debtor: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub scholarship_holder: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub international: Option<String>,
    #[serde(deserialize_with = "deserialize_code")]
    pub tuition_fees_up_to_date: Option<String>,

    pub curricular_units_1st_sem_credited: Option<f64>,
    pub curricular_units_1st_sem_enrolled: Option<f64>,
    pub curricular_units_1st_sem_evaluations: Option<f64>,
    pub curricular_units_1st_sem_approved: Option<f64>,
    pub curricular_units_1st_sem_grade: Option<f64>,
    pub curricular_units_1st_sem_without_evaluations: Option<f64>,
    pub curricular_units_2nd_sem_credited: Option<f64>,
    pub curricular_units_2nd_sem_enrolled: Option<f64>,
    pub curricular_units_2nd_sem_evaluations: Option<f64>,
    pub curricular_units_2nd_sem_approved: Option<f64>,
    pub curricular_units_2nd_sem_grade: Option<f64>,
    pub curricular_units_2nd_sem_without_evaluations: Option<f64>,

    pub application_order: Option<f64>,
    pub previous_qualification_grade: Option<f64>,
    pub admission_grade: Option<f64>,
    pub unemployment_rate: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub gdp: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Text(String),
    Number(i64),
    Float(f64),
}

/// Select codes arrive as strings or bare JSON numbers. `9147.0` reads as
/// `"9147"`; a fractional code stays as written and fails lookup later.
fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<CodeRepr>::deserialize(deserializer)?;
    Ok(repr.map(|r| match r {
        CodeRepr::Text(s) => s.trim().to_string(),
        CodeRepr::Number(n) => n.to_string(),
        CodeRepr::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        CodeRepr::Float(f) => f.to_string(),
    }))
}

impl EnrollmentForm {
    /// A form with every select on its first option and every number unset.
    pub fn with_default_selections() -> Self {
        let mut form = Self::default();
        for field in CategoricalField::ALL {
            *form.code_mut(field) = field.table().first_code().map(str::to_string);
        }
        form
    }

    pub fn code(&self, field: CategoricalField) -> Option<&str> {
        let slot = match field {
            CategoricalField::MaritalStatus => &self.marital_status,
            CategoricalField::ApplicationMode => &self.application_mode,
            CategoricalField::Course => &self.course,
            CategoricalField::PreviousQualification => &self.previous_qualification,
            CategoricalField::Nationality => &self.nationality,
            CategoricalField::MothersQualification => &self.mothers_qualification,
            CategoricalField::FathersQualification => &self.fathers_qualification,
            CategoricalField::MothersOccupation => &self.mothers_occupation,
            CategoricalField::FathersOccupation => &self.fathers_occupation,
            CategoricalField::DaytimeEveningAttendance => &self.daytime_evening_attendance,
            CategoricalField::Displaced => &self.displaced,
            CategoricalField::EducationalSpecialNeeds => &self.educational_special_needs,
            CategoricalField::Debtor => &self.debtor,
            CategoricalField::Gender => &self.gender,
            CategoricalField::ScholarshipHolder => &self.scholarship_holder,
            CategoricalField::International => &self.international,
            CategoricalField::TuitionFeesUpToDate => &self.tuition_fees_up_to_date,
        };
        slot.as_deref()
    }

    pub fn code_mut(&mut self, field: CategoricalField) -> &mut Option<String> {
        match field {
            CategoricalField::MaritalStatus => &mut self.marital_status,
            CategoricalField::ApplicationMode => &mut self.application_mode,
            CategoricalField::Course => &mut self.course,
            CategoricalField::PreviousQualification => &mut self.previous_qualification,
            CategoricalField::Nationality => &mut self.nationality,
            CategoricalField::MothersQualification => &mut self.mothers_qualification,
            CategoricalField::FathersQualification => &mut self.fathers_qualification,
            CategoricalField::MothersOccupation => &mut self.mothers_occupation,
            CategoricalField::FathersOccupation => &mut self.fathers_occupation,
            CategoricalField::DaytimeEveningAttendance => &mut self.daytime_evening_attendance,
            CategoricalField::Displaced => &mut self.displaced,
            CategoricalField::EducationalSpecialNeeds => &mut self.educational_special_needs,
            CategoricalField::Debtor => &mut self.debtor,
            CategoricalField::Gender => &mut self.gender,
            CategoricalField::ScholarshipHolder => &mut self.scholarship_holder,
            CategoricalField::International => &mut self.international,
            CategoricalField::TuitionFeesUpToDate => &mut self.tuition_fees_up_to_date,
        }
    }

    pub fn number(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::AgeAtEnrollment => self.age_at_enrollment,
            NumericField::FirstSemCredited => self.curricular_units_1st_sem_credited,
            NumericField::FirstSemEnrolled => self.curricular_units_1st_sem_enrolled,
            NumericField::FirstSemEvaluations => self.curricular_units_1st_sem_evaluations,
            NumericField::FirstSemApproved => self.curricular_units_1st_sem_approved,
            NumericField::FirstSemGrade => self.curricular_units_1st_sem_grade,
            NumericField::FirstSemWithoutEvaluations => {
                self.curricular_units_1st_sem_without_evaluations
            }
            NumericField::SecondSemCredited => self.curricular_units_2nd_sem_credited,
            NumericField::SecondSemEnrolled => self.curricular_units_2nd_sem_enrolled,
            NumericField::SecondSemEvaluations => self.curricular_units_2nd_sem_evaluations,
            NumericField::SecondSemApproved => self.curricular_units_2nd_sem_approved,
            NumericField::SecondSemGrade => self.curricular_units_2nd_sem_grade,
            NumericField::SecondSemWithoutEvaluations => {
                self.curricular_units_2nd_sem_without_evaluations
            }
            NumericField::ApplicationOrder => self.application_order,
            NumericField::PreviousQualificationGrade => self.previous_qualification_grade,
            NumericField::AdmissionGrade => self.admission_grade,
            NumericField::UnemploymentRate => self.unemployment_rate,
            NumericField::InflationRate => self.inflation_rate,
            NumericField::Gdp => self.gdp,
        }
    }

    pub fn set_number(&mut self, field: NumericField, value: Option<f64>) {
        let slot = match field {
            NumericField::AgeAtEnrollment => &mut self.age_at_enrollment,
            NumericField::FirstSemCredited => &mut self.curricular_units_1st_sem_credited,
            NumericField::FirstSemEnrolled => &mut self.curricular_units_1st_sem_enrolled,
            NumericField::FirstSemEvaluations => &mut self.curricular_units_1st_sem_evaluations,
            NumericField::FirstSemApproved => &mut self.curricular_units_1st_sem_approved,
            NumericField::FirstSemGrade => &mut self.curricular_units_1st_sem_grade,
            NumericField::FirstSemWithoutEvaluations => {
                &mut self.curricular_units_1st_sem_without_evaluations
            }
            NumericField::SecondSemCredited => &mut self.curricular_units_2nd_sem_credited,
            NumericField::SecondSemEnrolled => &mut self.curricular_units_2nd_sem_enrolled,
            NumericField::SecondSemEvaluations => &mut self.curricular_units_2nd_sem_evaluations,
            NumericField::SecondSemApproved => &mut self.curricular_units_2nd_sem_approved,
            NumericField::SecondSemGrade => &mut self.curricular_units_2nd_sem_grade,
            NumericField::SecondSemWithoutEvaluations => {
                &mut self.curricular_units_2nd_sem_without_evaluations
            }
            NumericField::ApplicationOrder => &mut self.application_order,
            NumericField::PreviousQualificationGrade => &mut self.previous_qualification_grade,
            NumericField::AdmissionGrade => &mut self.admission_grade,
            NumericField::UnemploymentRate => &mut self.unemployment_rate,
            NumericField::InflationRate => &mut self.inflation_rate,
            NumericField::Gdp => &mut self.gdp,
        };
        *slot = value;
    }

    /// Resolves every select code and range-checks every number, collecting
    /// all problems rather than stopping at the first.
    pub fn validate(&self) -> Result<ValidatedForm, ValidationError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        // An age of 0 is the widget's untouched state, not a real age.
        let age = self.age_at_enrollment.filter(|age| *age != 0.0);
        if age.is_none() {
            missing.push(NumericField::AgeAtEnrollment.display_name());
        }

        let mut categories = Vec::with_capacity(CategoricalField::ALL.len());
        for field in CategoricalField::ALL {
            match self.code(field) {
                None | Some("") => missing.push(field.display_name()),
                Some(code) => match field.table().label(code) {
                    Some(label) => categories.push((field, label)),
                    None => invalid.push(InvalidField {
                        field: field.display_name(),
                        reason: format!("unknown code `{}`", code),
                    }),
                },
            }
        }

        let mut numbers = Vec::with_capacity(NumericField::ALL.len());
        for field in NumericField::ALL {
            let value = match field {
                NumericField::AgeAtEnrollment => age,
                _ => self.number(field),
            };
            match value {
                Some(v) if v.is_nan() => missing.push(field.display_name()),
                Some(v) => match field.check(v) {
                    Ok(()) => numbers.push((field, v)),
                    Err(reason) => invalid.push(InvalidField {
                        field: field.display_name(),
                        reason,
                    }),
                },
                None if field == NumericField::AgeAtEnrollment => {}
                None => missing.push(field.display_name()),
            }
        }

        if missing.is_empty() && invalid.is_empty() {
            Ok(ValidatedForm {
                categories,
                numbers,
            })
        } else {
            Err(ValidationError { missing, invalid })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.field, self.reason)
    }
}

/// The form was incomplete or held out-of-range values; nothing was
/// encoded.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}", render_problems(.missing, .invalid))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<InvalidField>,
}

fn render_problems(missing: &[&'static str], invalid: &[InvalidField]) -> String {
    let mut out = String::from(if missing.is_empty() {
        "Some fields have invalid values."
    } else {
        "Please fill in all fields before predicting."
    });
    if !missing.is_empty() {
        out.push_str(" Missing:");
        for name in missing {
            out.push_str("\n- ");
            out.push_str(name);
        }
    }
    if !invalid.is_empty() {
        out.push_str(if missing.is_empty() { " Invalid:" } else { "\nInvalid:" });
        for field in invalid {
            out.push_str("\n- ");
            out.push_str(&field.to_string());
        }
    }
    out
}

/// A complete submission with every code resolved to its label.
#[derive(Debug, Clone)]
pub struct ValidatedForm {
    categories: Vec<(CategoricalField, &'static str)>,
    numbers: Vec<(NumericField, f64)>,
}

impl ValidatedForm {
    /// Builds the raw record the encoder consumes, passing every label
    /// through the normalizer.
    pub fn into_record(self, normalizer: &CategoryNormalizer<'_>) -> RawRecord {
        let mut record = RawRecord::default();
        for (field, value) in self.numbers {
            record.insert(field.column(), FieldValue::Numeric(value));
        }
        for (field, label) in self.categories {
            let label = normalizer.normalize_field(field, label);
            record.insert(field.column(), FieldValue::Category(label.to_string()));
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Category(String),
    Numeric(f64),
}

/// Flat attribute → value mapping for a single prediction request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawRecord {
    /// Sets `name`, replacing any earlier value for it.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let position = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(position).1)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

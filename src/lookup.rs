//! Code → label tables for every categorical enrollment attribute.
//!
//! The form submits numeric codes; the model was trained on the
//! human-readable labels, so every code is resolved through one of these
//! tables before encoding. Entries are kept in form order: the first entry
//! of each table is the option a blank form starts on.

use serde::Serialize;

/// An immutable, ordered code → label mapping.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    entries: &'static [(&'static str, &'static str)],
}

impl LookupTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn label(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    pub fn first_code(&self) -> Option<&'static str> {
        self.entries.first().map(|(code, _)| *code)
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const MARITAL_STATUS: LookupTable = LookupTable::new(&[
    ("1", "Single"),
    ("2", "Married"),
    ("3", "Widower"),
    ("4", "Divorced"),
    ("5", "Facto Union"),
    ("6", "Legally Separated"),
]);

pub const APPLICATION_MODE: LookupTable = LookupTable::new(&[
    ("1", "1st phase - general contingent"),
    ("2", "Ordinance No. 612/93"),
    ("5", "1st phase - special contingent (Azores Island)"),
    ("7", "Holders of other higher courses"),
    ("10", "Ordinance No. 854-B/99"),
    ("15", "International student (bachelor)"),
    ("16", "1st phase - special contingent (Madeira Island)"),
    ("17", "2nd phase - general contingent"),
    ("18", "3rd phase - general contingent"),
    ("26", "Ordinance No. 533-A/99, item b2 (Different Plan)"),
    ("27", "Ordinance No. 533-A/99, item b3 (Other Institution)"),
    ("39", "Over 23 years old"),
    ("42", "Transfer"),
    ("43", "Change of course"),
    ("44", "Technological specialization diploma holders"),
    ("51", "Change of institution/course"),
    ("53", "Short cycle diploma holders"),
    ("57", "Change of institution/course (International)"),
]);

pub const COURSE: LookupTable = LookupTable::new(&[
    ("33", "Biofuel Production Technologies"),
    ("171", "Animation and Multimedia Design"),
    ("8014", "Social Service (evening attendance)"),
    ("9003", "Agronomy"),
    ("9070", "Communication Design"),
    ("9085", "Veterinary Nursing"),
    ("9119", "Informatics Engineering"),
    ("9130", "Equinculture"),
    ("9147", "Management"),
    ("9238", "Social Service"),
    ("9254", "Tourism"),
    ("9500", "Nursing"),
    ("9556", "Oral Hygiene"),
    ("9670", "Advertising and Marketing Management"),
    ("9773", "Journalism and Communication"),
    ("9853", "Basic Education"),
    ("9991", "Management (evening attendance)"),
]);

pub const PREVIOUS_QUALIFICATION: LookupTable = LookupTable::new(&[
    ("1", "Secondary education"),
    ("2", "Higher education - bachelor's degree"),
    ("3", "Higher education - degree"),
    ("4", "Higher education - master's"),
    ("5", "Higher education - doctorate"),
    ("6", "Frequency of higher education"),
    ("9", "12th year of schooling - not completed"),
    ("10", "11th year of schooling - not completed"),
    ("12", "Other - 11th year of schooling"),
    ("14", "10th year of schooling"),
    ("15", "10th year of schooling - not completed"),
    ("19", "Basic education 3rd cycle (9th/10th/11th year) or equiv."),
    ("38", "Basic education 2nd cycle (6th/7th/8th year) or equiv."),
    ("39", "Technological specialization course"),
    ("40", "Higher education - degree (1st cycle)"),
    ("42", "Professional higher technical course"),
    ("43", "Higher education - master (2nd cycle)"),
]);

pub const NATIONALITY: LookupTable = LookupTable::new(&[
    ("1", "Portuguese"),
    ("2", "German"),
    ("6", "Spanish"),
    ("11", "Italian"),
    ("13", "Dutch"),
    ("14", "English"),
    ("17", "Lithuanian"),
    ("21", "Angolan"),
    ("22", "Cape Verdean"),
    ("24", "Guinean"),
    ("25", "Mozambican"),
    ("26", "Santomean"),
    ("32", "Turkish"),
    ("41", "Brazilian"),
    ("62", "Romanian"),
    ("100", "Moldova (Republic of)"),
    ("101", "Mexican"),
    ("103", "Ukrainian"),
    ("105", "Russian"),
    ("108", "Cuban"),
    ("109", "Colombian"),
]);

/// Shared by the mother's and father's qualification attributes.
pub const PARENT_QUALIFICATION: LookupTable = LookupTable::new(&[
    ("1", "Secondary Education - 12th Year of Schooling or Eq."),
    ("2", "Higher Education - Bachelor's Degree"),
    ("3", "Higher Education - Degree"),
    ("4", "Higher Education - Master's"),
    ("5", "Higher Education - Doctorate"),
    ("6", "Frequency of Higher Education"),
    ("9", "12th Year of Schooling - Not Completed"),
    ("10", "11th Year of Schooling - Not Completed"),
    ("11", "7th Year (Old)"),
    ("12", "Other - 11th Year of Schooling"),
    ("13", "2nd year complementary high school course"),
    ("14", "10th Year of Schooling"),
    ("18", "General commerce course"),
    ("19", "Basic Education 3rd Cycle (9th/10th/11th Year) or Equiv."),
    ("20", "Complementary High School Course"),
    ("22", "Technical-professional course"),
    ("25", "Complementary High School Course - not concluded"),
    ("26", "7th year of schooling"),
    ("27", "2nd cycle of the general high school course"),
    ("29", "9th Year of Schooling - Not Completed"),
    ("30", "8th year of schooling"),
    ("31", "General Course of Administration and Commerce"),
    ("33", "Supplementary Accounting and Administration"),
    ("34", "Unknown"),
    ("35", "Can't read or write"),
    ("36", "Can read without having a 4th year of schooling"),
    ("37", "Basic education 1st cycle (4th/5th year) or equiv."),
    ("38", "Basic Education 2nd Cycle (6th/7th/8th Year) or Equiv."),
    ("39", "Technological specialization course"),
    ("40", "Higher education - degree (1st cycle)"),
    ("41", "Specialized higher studies course"),
    ("42", "Professional higher technical course"),
    ("43", "Higher Education - Master (2nd cycle)"),
    ("44", "Higher Education - Doctorate (3rd cycle)"),
]);

pub const MOTHERS_OCCUPATION: LookupTable = LookupTable::new(&[
    ("0", "Student"),
    ("1", "Legislative/Executive/Director/Manager"),
    ("2", "Intellectual & Scientific Activities"),
    ("3", "Intermediate Technicians & Professions"),
    ("4", "Administrative Staff"),
    ("5", "Personal Services/Security/Sellers"),
    ("6", "Farmers/Skilled Agriculture"),
    ("7", "Skilled Industry/Construction/Crafts"),
    ("8", "Machine Operators/Assembly Workers"),
    ("9", "Unskilled Workers"),
    ("10", "Armed Forces"),
    ("90", "Other Situation"),
    ("99", "(Blank)"),
    ("122", "Health Professionals"),
    ("123", "Teachers"),
    ("125", "ICT Specialists"),
    ("131", "Science/Engineering Techs"),
    ("132", "Intermediate Health Technicians"),
    ("134", "Legal/Social/Sports/Cultural Techs"),
    ("141", "Office Workers/Data Operators"),
    ("143", "Accounting/Financial Operators"),
    ("144", "Other Admin Support Staff"),
    ("151", "Personal Service Workers"),
    ("152", "Sellers"),
    ("153", "Personal Care Workers"),
    ("171", "Skilled Construction (not electricians)"),
    ("173", "Printing/Precision/Jewelry/Artisans"),
    ("175", "Food/Wood/Clothing Industries"),
    ("191", "Cleaning Workers"),
    ("192", "Unskilled Agriculture Workers"),
    ("193", "Unskilled Construction/Manufacturing"),
    ("194", "Meal Prep Assistants"),
]);

pub const FATHERS_OCCUPATION: LookupTable = LookupTable::new(&[
    ("0", "Student"),
    ("1", "Legislative/Executive/Director/Manager"),
    ("2", "Intellectual & Scientific Activities"),
    ("3", "Intermediate Technicians & Professions"),
    ("4", "Administrative Staff"),
    ("5", "Personal Services/Security/Sellers"),
    ("6", "Farmers/Skilled Agriculture"),
    ("7", "Skilled Industry/Construction/Crafts"),
    ("8", "Machine Operators/Assembly Workers"),
    ("9", "Unskilled Workers"),
    ("10", "Armed Forces"),
    ("90", "Other Situation"),
    ("99", "(Blank)"),
    ("101", "Armed Forces Officers"),
    ("102", "Armed Forces Sergeants"),
    ("103", "Other Armed Forces Personnel"),
    ("112", "Admin/Commercial Service Directors"),
    ("114", "Hotel/Catering/Trade Directors"),
    ("121", "Physical Sciences/Engineering Specialists"),
    ("122", "Health Professionals"),
    ("123", "Teachers"),
    ("124", "Finance/Admin/Public Relations"),
    ("131", "Science/Engineering Technicians"),
    ("132", "Intermediate Health Technicians"),
    ("134", "Legal/Social/Sports/Cultural Techs"),
    ("135", "ICT Technicians"),
    ("141", "Office Workers/Data Operators"),
    ("143", "Accounting/Financial Operators"),
    ("144", "Other Admin Support Staff"),
    ("151", "Personal Service Workers"),
    ("152", "Sellers"),
    ("153", "Personal Care Workers"),
    ("154", "Security Services"),
    ("161", "Skilled Agricultural Workers"),
    ("163", "Subsistence Farmers/Fishers"),
    ("171", "Skilled Construction (not electricians)"),
    ("172", "Metalworking Workers"),
    ("174", "Electrical Workers"),
    ("175", "Food/Wood/Clothing Industries"),
    ("181", "Plant/Machine Operators"),
    ("182", "Assembly Workers"),
    ("183", "Vehicle/Mobile Equipment Operators"),
    ("192", "Unskilled Agriculture Workers"),
    ("193", "Unskilled Construction/Manufacturing"),
    ("194", "Meal Prep Assistants"),
    ("195", "Street Vendors/Service Providers"),
]);

pub const ATTENDANCE: LookupTable = LookupTable::new(&[("1", "Daytime"), ("0", "Evening")]);

pub const YES_NO: LookupTable = LookupTable::new(&[("1", "Yes"), ("0", "No")]);

pub const GENDER: LookupTable = LookupTable::new(&[("1", "Male"), ("0", "Female")]);

pub const TUITION_FEES: LookupTable =
    LookupTable::new(&[("1", "Fees up to date"), ("0", "Fees NOT up to date")]);

/// Every label-valued attribute the form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    MaritalStatus,
    ApplicationMode,
    Course,
    PreviousQualification,
    Nationality,
    MothersQualification,
    FathersQualification,
    MothersOccupation,
    FathersOccupation,
    DaytimeEveningAttendance,
    Displaced,
    EducationalSpecialNeeds,
    Debtor,
    Gender,
    ScholarshipHolder,
    International,
    TuitionFeesUpToDate,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 17] = [
        CategoricalField::MaritalStatus,
        CategoricalField::ApplicationMode,
        CategoricalField::Course,
        CategoricalField::PreviousQualification,
        CategoricalField::Nationality,
        CategoricalField::MothersQualification,
        CategoricalField::FathersQualification,
        CategoricalField::MothersOccupation,
        CategoricalField::FathersOccupation,
        CategoricalField::DaytimeEveningAttendance,
        CategoricalField::Displaced,
        CategoricalField::EducationalSpecialNeeds,
        CategoricalField::Debtor,
        CategoricalField::Gender,
        CategoricalField::ScholarshipHolder,
        CategoricalField::International,
        CategoricalField::TuitionFeesUpToDate,
    ];

    /// Column prefix used by the trained schema (`"<column>_<label>"`).
    ///
    /// The spelling matches the training data, typo included.
    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::MaritalStatus => "Marital status",
            CategoricalField::ApplicationMode => "Application mode",
            CategoricalField::Course => "Course",
            CategoricalField::PreviousQualification => "Previous qualification",
            CategoricalField::Nationality => "Nacionality",
            CategoricalField::MothersQualification => "Mother's qualification",
            CategoricalField::FathersQualification => "Father's qualification",
            CategoricalField::MothersOccupation => "Mother's occupation",
            CategoricalField::FathersOccupation => "Father's occupation",
            CategoricalField::DaytimeEveningAttendance => "Daytime/evening attendance",
            CategoricalField::Displaced => "Displaced",
            CategoricalField::EducationalSpecialNeeds => "Educational special needs",
            CategoricalField::Debtor => "Debtor",
            CategoricalField::Gender => "Gender",
            CategoricalField::ScholarshipHolder => "Scholarship holder",
            CategoricalField::International => "International",
            CategoricalField::TuitionFeesUpToDate => "Tuition_fees_up_to_date",
        }
    }

    /// Name shown to the user when the field is missing or invalid.
    pub fn display_name(self) -> &'static str {
        match self {
            CategoricalField::Nationality => "Nationality",
            CategoricalField::TuitionFeesUpToDate => "Tuition fees up to date",
            other => other.column(),
        }
    }

    pub fn table(self) -> LookupTable {
        match self {
            CategoricalField::MaritalStatus => MARITAL_STATUS,
            CategoricalField::ApplicationMode => APPLICATION_MODE,
            CategoricalField::Course => COURSE,
            CategoricalField::PreviousQualification => PREVIOUS_QUALIFICATION,
            CategoricalField::Nationality => NATIONALITY,
            CategoricalField::MothersQualification | CategoricalField::FathersQualification => {
                PARENT_QUALIFICATION
            }
            CategoricalField::MothersOccupation => MOTHERS_OCCUPATION,
            CategoricalField::FathersOccupation => FATHERS_OCCUPATION,
            CategoricalField::DaytimeEveningAttendance => ATTENDANCE,
            CategoricalField::Gender => GENDER,
            CategoricalField::TuitionFeesUpToDate => TUITION_FEES,
            CategoricalField::Displaced
            | CategoricalField::EducationalSpecialNeeds
            | CategoricalField::Debtor
            | CategoricalField::ScholarshipHolder
            | CategoricalField::International => YES_NO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_label_lookup() {
        assert_eq!(COURSE.label("9147"), Some("Management"));
        assert_eq!(NATIONALITY.label("108"), Some("Cuban"));
        assert_eq!(NATIONALITY.label("7"), None);
        assert_eq!(GENDER.label("0"), Some("Female"));
    }

    #[test]
    fn test_first_code_is_form_default() {
        assert_eq!(MARITAL_STATUS.first_code(), Some("1"));
        assert_eq!(ATTENDANCE.first_code(), Some("1"));
        assert_eq!(MOTHERS_OCCUPATION.first_code(), Some("0"));
    }

    #[test]
    fn test_codes_are_unique_per_table() {
        for field in CategoricalField::ALL {
            let table = field.table();
            let codes: HashSet<_> = table.entries().iter().map(|(c, _)| *c).collect();
            assert_eq!(codes.len(), table.len(), "duplicate code in {:?}", field);
            assert!(!table.is_empty());
        }
    }

    #[test]
    fn test_column_prefixes_are_distinct() {
        let columns: HashSet<_> = CategoricalField::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(columns.len(), CategoricalField::ALL.len());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(CategoricalField::Nationality.display_name(), "Nationality");
        assert_eq!(CategoricalField::Nationality.column(), "Nacionality");
        assert_eq!(CategoricalField::Course.display_name(), "Course");
    }
}

//! Section and submission data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw, unvalidated fields of one section as received from the client.
pub type RawFields = Map<String, Value>;

/// The three sections of the wizard, in the order they are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Personal,
    Education,
    Experience,
}

impl SectionKind {
    /// Every section kind, in wizard order.
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Personal,
        SectionKind::Education,
        SectionKind::Experience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Personal => "personal",
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(SectionKind::Personal),
            "education" => Ok(SectionKind::Education),
            "experience" => Ok(SectionKind::Experience),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationInfo {
    pub tenth_percentage: f64,
    pub twelfth_percentage: f64,
    pub graduation_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceInfo {
    pub company_name: String,
    pub domain: String,
    pub years_of_experience: f64,
    pub last_salary: f64,
}

/// A validated section. Only values of this type ever reach the staging store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionRecord {
    Personal(PersonalInfo),
    Education(EducationInfo),
    Experience(ExperienceInfo),
}

impl SectionRecord {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionRecord::Personal(_) => SectionKind::Personal,
            SectionRecord::Education(_) => SectionKind::Education,
            SectionRecord::Experience(_) => SectionKind::Experience,
        }
    }

    /// The section's fields as a flat JSON object, the shape clients send.
    pub fn to_raw_fields(&self) -> RawFields {
        let value = match self {
            SectionRecord::Personal(info) => serde_json::to_value(info),
            SectionRecord::Education(info) => serde_json::to_value(info),
            SectionRecord::Experience(info) => serde_json::to_value(info),
        };

        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// The committed, immutable result of a session: every section merged into
/// one record plus the durable identifier and commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub tenth_percentage: f64,
    pub twelfth_percentage: f64,
    pub graduation_marks: f64,
    pub company_name: String,
    pub domain: String,
    pub years_of_experience: f64,
    pub last_salary: f64,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn merge(
        id: String,
        created_at: DateTime<Utc>,
        personal: PersonalInfo,
        education: EducationInfo,
        experience: ExperienceInfo,
    ) -> Self {
        Self {
            id,
            name: personal.name,
            phone_number: personal.phone_number,
            email: personal.email,
            date_of_birth: personal.date_of_birth,
            tenth_percentage: education.tenth_percentage,
            twelfth_percentage: education.twelfth_percentage,
            graduation_marks: education.graduation_marks,
            company_name: experience.company_name,
            domain: experience.domain,
            years_of_experience: experience.years_of_experience,
            last_salary: experience.last_salary,
            created_at,
        }
    }
}

//! Section validators.
//!
//! Each section has one pure function turning [`RawFields`] into a typed
//! [`SectionRecord`]. Rules run in a fixed order and the first failure is
//! returned. Nothing here touches a store.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::section::{
    EducationInfo, ExperienceInfo, PersonalInfo, RawFields, SectionKind, SectionRecord,
};

/// Longest text value any section accepts, in characters.
pub const MAX_TEXT_LEN: usize = 255;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid")
});

/// Validate the raw fields of `kind`, producing the typed record on success.
pub fn validate(kind: SectionKind, fields: &RawFields) -> Result<SectionRecord, ValidationError> {
    match kind {
        SectionKind::Personal => validate_personal(fields).map(SectionRecord::Personal),
        SectionKind::Education => validate_education(fields).map(SectionRecord::Education),
        SectionKind::Experience => validate_experience(fields).map(SectionRecord::Experience),
    }
}

/// Re-run the validator over an already typed record.
pub fn revalidate(record: &SectionRecord) -> Result<(), ValidationError> {
    validate(record.kind(), &record.to_raw_fields()).map(|_| ())
}

pub fn validate_personal(fields: &RawFields) -> Result<PersonalInfo, ValidationError> {
    let name = non_blank(fields, "name")?;

    let phone_number = text(fields, "phone_number")?;
    if phone_number.len() != 10 || !phone_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            "phone_number",
            "must be exactly 10 digits",
        ));
    }

    let email = bounded(fields, "email")?;
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::new(
            "email",
            "must be a valid email address",
        ));
    }

    let raw_dob = text(fields, "date_of_birth")?;
    let date_of_birth = NaiveDate::parse_from_str(raw_dob.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new("date_of_birth", "must be a valid date (YYYY-MM-DD)")
    })?;

    Ok(PersonalInfo {
        name,
        phone_number,
        email,
        date_of_birth,
    })
}

pub fn validate_education(fields: &RawFields) -> Result<EducationInfo, ValidationError> {
    Ok(EducationInfo {
        tenth_percentage: percentage(fields, "tenth_percentage")?,
        twelfth_percentage: percentage(fields, "twelfth_percentage")?,
        graduation_marks: percentage(fields, "graduation_marks")?,
    })
}

pub fn validate_experience(fields: &RawFields) -> Result<ExperienceInfo, ValidationError> {
    let company_name = non_blank(fields, "company_name")?;
    let domain = non_blank(fields, "domain")?;

    let years_of_experience = number(fields, "years_of_experience")?;
    if years_of_experience < 0.0 {
        return Err(ValidationError::new(
            "years_of_experience",
            "must not be negative",
        ));
    }

    let last_salary = number(fields, "last_salary")?;
    if last_salary < 0.0 {
        return Err(ValidationError::new("last_salary", "must not be negative"));
    }

    Ok(ExperienceInfo {
        company_name,
        domain,
        years_of_experience,
        last_salary,
    })
}

fn text(fields: &RawFields, field: &'static str) -> Result<String, ValidationError> {
    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Err(ValidationError::new(field, "is required")),
        Some(_) => Err(ValidationError::new(field, "must be a string")),
    }
}

/// A string of at most [`MAX_TEXT_LEN`] characters.
fn bounded(fields: &RawFields, field: &'static str) -> Result<String, ValidationError> {
    let value = text(fields, field)?;
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(value)
}

fn non_blank(fields: &RawFields, field: &'static str) -> Result<String, ValidationError> {
    let value = bounded(fields, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(value)
}

/// Accepts JSON numbers and numeric strings.
fn number(fields: &RawFields, field: &'static str) -> Result<f64, ValidationError> {
    let parsed = match fields.get(field) {
        None | Some(Value::Null) => return Err(ValidationError::new(field, "is required")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::new(field, "must be a number")),
    }
}

fn percentage(fields: &RawFields, field: &'static str) -> Result<f64, ValidationError> {
    let value = number(fields, field)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::new(field, "must be between 0 and 100"));
    }
    Ok(value)
}

//! Declarative validation for the create/edit record form.
//!
//! All strings are trimmed first; each field reports at most one
//! message, in declaration order, and the cross-field discharge check
//! attaches to `dischargeDate`. Success yields the normalized
//! [`RecordPayload`] (uppercased patient id, parsed dates).

use chrono::{NaiveDate, Utc};

use crate::models::{RecordDraft, RecordPayload, RecordStatus};

pub const FIELD_PATIENT_ID: &str = "patientId";
pub const FIELD_PATIENT_NAME: &str = "patientName";
pub const FIELD_DATE_OF_BIRTH: &str = "dateOfBirth";
pub const FIELD_DIAGNOSIS: &str = "diagnosis";
pub const FIELD_ADMISSION_DATE: &str = "admissionDate";
pub const FIELD_DISCHARGE_DATE: &str = "dischargeDate";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_DEPARTMENT: &str = "department";

/// Field-name-to-message mapping produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        // First error per field wins.
        if self.message_for(field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Fields with errors, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Map a create/update failure onto form fields: 409 means the patient
/// id is already taken. Anything else stays a page-level error.
pub fn field_errors_from_api(err: &crate::error::ApiError) -> Option<FieldErrors> {
    match err.status() {
        Some(409) => {
            let mut errors = FieldErrors::default();
            errors.push(
                FIELD_PATIENT_ID,
                "Patient ID already exists. Please use a unique value.",
            );
            Some(errors)
        }
        _ => None,
    }
}

/// Validate a form draft into a request payload.
pub fn validate_draft(draft: &RecordDraft) -> Result<RecordPayload, FieldErrors> {
    validate_draft_at(draft, Utc::now().date_naive())
}

/// Same as [`validate_draft`] with an explicit "today" for the
/// date-of-birth check.
pub fn validate_draft_at(
    draft: &RecordDraft,
    today: NaiveDate,
) -> Result<RecordPayload, FieldErrors> {
    let mut errors = FieldErrors::default();

    let patient_id = draft.patient_id.trim().to_uppercase();
    if patient_id.is_empty() {
        errors.push(FIELD_PATIENT_ID, "Patient ID is required.");
    } else if !is_patient_id(&patient_id) {
        errors.push(
            FIELD_PATIENT_ID,
            "Patient ID must be in format P### (example: P007).",
        );
    }

    let patient_name = draft.patient_name.trim().to_string();
    if patient_name.chars().count() < 2 {
        errors.push(
            FIELD_PATIENT_NAME,
            "Patient name must be at least 2 characters.",
        );
    }

    let date_of_birth = parse_date_field(
        &draft.date_of_birth,
        &mut errors,
        FIELD_DATE_OF_BIRTH,
        "Date of birth is required.",
        "Please enter a valid date of birth.",
    );
    if let Some(dob) = date_of_birth {
        if dob >= today {
            errors.push(FIELD_DATE_OF_BIRTH, "Date of birth must be in the past.");
        }
    }

    let diagnosis = draft.diagnosis.trim().to_string();
    if diagnosis.chars().count() < 2 {
        errors.push(FIELD_DIAGNOSIS, "Diagnosis must be at least 2 characters.");
    }

    let admission_date = parse_date_field(
        &draft.admission_date,
        &mut errors,
        FIELD_ADMISSION_DATE,
        "Admission date is required.",
        "Please enter a valid admission date.",
    );

    let discharge_raw = draft.discharge_date.trim();
    let mut discharge_date = None;
    if !discharge_raw.is_empty() {
        match parse_date(discharge_raw) {
            Some(date) => discharge_date = Some(date),
            None => errors.push(FIELD_DISCHARGE_DATE, "Please enter a valid discharge date."),
        }
    }
    if let (Some(admitted), Some(discharged)) = (admission_date, discharge_date) {
        if discharged < admitted {
            errors.push(
                FIELD_DISCHARGE_DATE,
                "Discharge date must be after or equal to admission date.",
            );
        }
    }

    let status_raw = draft.status.trim();
    let status = if status_raw.is_empty() {
        errors.push(FIELD_STATUS, "Status is required.");
        None
    } else {
        let parsed = RecordStatus::parse(status_raw);
        if parsed.is_none() {
            errors.push(FIELD_STATUS, "Please select a valid status.");
        }
        parsed
    };

    let department = draft.department.trim().to_string();
    if department.chars().count() < 2 {
        errors.push(FIELD_DEPARTMENT, "Department must be at least 2 characters.");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // All parse results are present when no errors were recorded.
    match (date_of_birth, admission_date, status) {
        (Some(date_of_birth), Some(admission_date), Some(status)) => Ok(RecordPayload {
            patient_id,
            patient_name,
            date_of_birth,
            diagnosis,
            admission_date,
            discharge_date,
            status,
            department,
        }),
        _ => Err(errors),
    }
}

/// `P` followed by one or more digits, input already uppercased.
fn is_patient_id(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next() == Some('P')
        && value.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn parse_date_field(
    raw: &str,
    errors: &mut FieldErrors,
    field: &'static str,
    required_message: &'static str,
    invalid_message: &'static str,
) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(field, required_message);
        return None;
    }
    match parse_date(trimmed) {
        Some(date) => Some(date),
        None => {
            errors.push(field, invalid_message);
            None
        }
    }
}

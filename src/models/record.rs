use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record status lifecycle values, serialized capitalized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Active,
    Discharged,
    Pending,
    Cancelled,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Active,
        RecordStatus::Discharged,
        RecordStatus::Pending,
        RecordStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "Active",
            RecordStatus::Discharged => "Discharged",
            RecordStatus::Pending => "Pending",
            RecordStatus::Cancelled => "Cancelled",
        }
    }

    /// Parse a wire value; anything outside the enum yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clinical record as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub patient_id: String,
    pub patient_name: String,
    pub date_of_birth: NaiveDate,
    pub diagnosis: String,
    pub admission_date: NaiveDate,
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    pub status: RecordStatus,
    pub department: String,
}

/// Validated request body for create/update; the server assigns the id.
///
/// Text fields are trimmed, the patient id is uppercased, and an empty
/// discharge date is `None` (serialized as `null`, matching the wire).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub patient_id: String,
    pub patient_name: String,
    pub date_of_birth: NaiveDate,
    pub diagnosis: String,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub status: RecordStatus,
    pub department: String,
}

/// Untrusted form input: every field exactly as the user typed it.
///
/// Runs through [`crate::validate::validate_draft`] to become a
/// [`RecordPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub patient_id: String,
    pub patient_name: String,
    pub date_of_birth: String,
    pub diagnosis: String,
    pub admission_date: String,
    pub discharge_date: String,
    pub status: String,
    pub department: String,
}

impl RecordDraft {
    /// Seed an edit form from an existing record (ISO date strings,
    /// empty string for a missing discharge date).
    pub fn from_record(record: &Record) -> Self {
        Self {
            patient_id: record.patient_id.clone(),
            patient_name: record.patient_name.clone(),
            date_of_birth: record.date_of_birth.to_string(),
            diagnosis: record.diagnosis.clone(),
            admission_date: record.admission_date.to_string(),
            discharge_date: record
                .discharge_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            status: record.status.as_str().to_string(),
            department: record.department.clone(),
        }
    }
}

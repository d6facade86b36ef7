//! Medical record payloads
//!
//! The ledger itself treats block data as opaque JSON. This is the shape the
//! records front end writes into it.

use crate::core::block::Block;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attending physician used when none is given
pub const DEFAULT_DOCTOR: &str = "Dr. Ibrahim";

/// A single clinical entry for a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub patient_id: String,
    pub doctor: String,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MedicalRecord {
    /// Create a record attributed to the default doctor
    pub fn new(
        patient_id: impl Into<String>,
        diagnosis: impl Into<String>,
        treatment: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            doctor: DEFAULT_DOCTOR.to_string(),
            diagnosis: diagnosis.into(),
            treatment: treatment.into(),
            notes: None,
        }
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = doctor.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Convert into a block payload
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Read a record back out of a block, if its payload has record shape
    pub fn from_block(block: &Block) -> Option<Self> {
        serde_json::from_value(block.data.clone()).ok()
    }
}

//! Medical code handling: format validation and the demo autocomplete index.
//!
//! Codes are only format-checked. Nothing here consults an authoritative
//! ICD-10, CPT or HCPCS code set.

pub mod autocomplete;
pub mod catalog;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The coding systems handled by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    /// ICD-10 diagnosis codes.
    #[serde(rename = "ICD10")]
    Icd10,
    /// CPT procedure codes.
    #[serde(rename = "CPT")]
    Cpt,
    /// HCPCS Level II codes.
    #[serde(rename = "HCPCS")]
    Hcpcs,
}

impl CodeType {
    pub const ALL: [CodeType; 3] = [CodeType::Icd10, CodeType::Cpt, CodeType::Hcpcs];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Icd10 => "ICD10",
            CodeType::Cpt => "CPT",
            CodeType::Hcpcs => "HCPCS",
        }
    }

    /// Human readable label, e.g. for placeholders and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            CodeType::Icd10 => "ICD-10",
            CodeType::Cpt => "CPT",
            CodeType::Hcpcs => "HCPCS",
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "ICD10" => Ok(CodeType::Icd10),
            "CPT" => Ok(CodeType::Cpt),
            "HCPCS" => Ok(CodeType::Hcpcs),
            other => Err(format!("unknown code type '{}'", other)),
        }
    }
}

/// One entry of the autocomplete catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
    pub code_type: CodeType,
}

/// Outcome of a format check. `message` is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

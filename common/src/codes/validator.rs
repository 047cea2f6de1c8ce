//! Format checks for ICD-10, CPT and HCPCS codes.
//!
//! Used by the coding workspace to gate the "add code" action and by the
//! backend before persisting page codes.

use super::{CodeType, ValidationResult};
use regex::Regex;
use std::sync::LazyLock;

static ICD10_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{2}(\.[A-Z0-9]{1,4})?$").expect("valid ICD-10 regex"));

static HCPCS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{4}$").expect("valid HCPCS regex"));

/// ICD-10 prefixes held back for provisional assignment (U00-U49).
pub const RESERVED_ICD10_PREFIXES: &[&str] = &["U0", "U1", "U2", "U3", "U4"];

pub const CPT_MIN: u32 = 100;
pub const CPT_MAX: u32 = 99_999;

/// Validates an ICD-10 diagnosis code such as `A00.0` or `E11`.
pub fn validate_icd10(code: &str) -> ValidationResult {
    let code = code.trim();
    if code.is_empty() {
        return ValidationResult::invalid("ICD-10 code is required");
    }
    if code != code.to_uppercase() {
        return ValidationResult::invalid("ICD-10 code must be uppercase");
    }
    if !ICD10_RE.is_match(code) {
        return ValidationResult::invalid(
            "ICD-10 code must be a letter, two digits and an optional '.' with 1-4 characters",
        );
    }
    if let Some(prefix) = RESERVED_ICD10_PREFIXES
        .iter()
        .find(|prefix| code.starts_with(*prefix))
    {
        return ValidationResult::invalid(format!(
            "ICD-10 codes starting with '{}' are reserved",
            prefix
        ));
    }
    ValidationResult::ok("Valid ICD-10 code")
}

/// Validates a five digit CPT procedure code.
pub fn validate_cpt(code: &str) -> ValidationResult {
    let code = code.trim();
    if code.is_empty() {
        return ValidationResult::invalid("CPT code is required");
    }
    if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return ValidationResult::invalid("CPT code must be exactly 5 digits");
    }
    match code.parse::<u32>() {
        Ok(value) if (CPT_MIN..=CPT_MAX).contains(&value) => ValidationResult::ok("Valid CPT code"),
        _ => ValidationResult::invalid(format!(
            "CPT code must be between {:05} and {}",
            CPT_MIN, CPT_MAX
        )),
    }
}

/// Validates a HCPCS Level II code: one letter followed by four digits.
pub fn validate_hcpcs(code: &str) -> ValidationResult {
    let code = code.trim();
    if code.is_empty() {
        return ValidationResult::invalid("HCPCS code is required");
    }
    if !HCPCS_RE.is_match(code) {
        return ValidationResult::invalid("HCPCS code must be one uppercase letter followed by 4 digits");
    }
    ValidationResult::ok("Valid HCPCS code")
}

pub fn validate(code_type: CodeType, code: &str) -> ValidationResult {
    match code_type {
        CodeType::Icd10 => validate_icd10(code),
        CodeType::Cpt => validate_cpt(code),
        CodeType::Hcpcs => validate_hcpcs(code),
    }
}

/// Procedure lists on a page hold CPT and HCPCS codes side by side.
pub fn validate_procedure(code: &str) -> ValidationResult {
    let cpt = validate_cpt(code);
    if cpt.valid {
        return cpt;
    }
    let hcpcs = validate_hcpcs(code);
    if hcpcs.valid {
        return hcpcs;
    }
    ValidationResult::invalid(format!("'{}' is neither a CPT nor a HCPCS code", code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icd10_accepts_category_and_subcategory() {
        assert!(validate_icd10("A00.0").valid);
        assert!(validate_icd10("E11").valid);
        assert!(validate_icd10("S72.001A").valid);
        assert!(validate_icd10("  J45.909 ").valid);
    }

    #[test]
    fn icd10_rejects_reserved_prefix() {
        let result = validate_icd10("U00");
        assert!(!result.valid);
        assert!(result.message.contains("reserved"));
        assert!(!validate_icd10("U49.9").valid);
        assert!(validate_icd10("U50").valid);
    }

    #[test]
    fn icd10_rejects_malformed() {
        assert!(!validate_icd10("").valid);
        assert!(!validate_icd10("a00.0").valid);
        assert!(!validate_icd10("A0").valid);
        assert!(!validate_icd10("A00.").valid);
        assert!(!validate_icd10("A00.12345").valid);
        assert!(!validate_icd10("100.0").valid);
    }

    #[test]
    fn cpt_length_and_range() {
        assert!(validate_cpt("99213").valid);
        assert!(validate_cpt("00100").valid);
        assert!(!validate_cpt("123").valid);
        assert!(!validate_cpt("123456").valid);
        assert!(!validate_cpt("9921A").valid);
        assert!(!validate_cpt("00099").valid);
        assert!(!validate_cpt("").valid);
    }

    #[test]
    fn hcpcs_letter_and_four_digits() {
        assert!(validate_hcpcs("J0585").valid);
        assert!(validate_hcpcs("G0438").valid);
        assert!(!validate_hcpcs("JJ058").valid);
        assert!(!validate_hcpcs("J058").valid);
        assert!(!validate_hcpcs("j0585").valid);
    }

    #[test]
    fn dispatch_by_code_type() {
        assert!(validate(CodeType::Icd10, "I10").valid);
        assert!(validate(CodeType::Cpt, "36415").valid);
        assert!(!validate(CodeType::Hcpcs, "36415").valid);
    }

    #[test]
    fn procedure_accepts_cpt_or_hcpcs() {
        assert!(validate_procedure("99213").valid);
        assert!(validate_procedure("J0585").valid);
        assert!(!validate_procedure("A00.0").valid);
    }
}

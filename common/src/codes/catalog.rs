//! The fixed demo catalog behind the code autocomplete.

use super::{CodeEntry, CodeType};
use std::sync::LazyLock;

const ICD10_CODES: &[(&str, &str)] = &[
    ("A09", "Infectious gastroenteritis and colitis, unspecified"),
    ("E11.9", "Type 2 diabetes mellitus without complications"),
    ("E66.9", "Obesity, unspecified"),
    ("E78.5", "Hyperlipidemia, unspecified"),
    ("F41.1", "Generalized anxiety disorder"),
    ("I10", "Essential (primary) hypertension"),
    ("J06.9", "Acute upper respiratory infection, unspecified"),
    ("J18.9", "Pneumonia, unspecified organism"),
    ("J45.909", "Unspecified asthma, uncomplicated"),
    ("K21.9", "Gastro-esophageal reflux disease without esophagitis"),
    ("M54.50", "Low back pain, unspecified"),
    ("N39.0", "Urinary tract infection, site not specified"),
    ("R05.9", "Cough, unspecified"),
    ("R07.9", "Chest pain, unspecified"),
    ("R51.9", "Headache, unspecified"),
    (
        "Z00.00",
        "Encounter for general adult medical examination without abnormal findings",
    ),
];

const CPT_CODES: &[(&str, &str)] = &[
    ("99202", "Office or outpatient visit, new patient, straightforward"),
    ("99203", "Office or outpatient visit, new patient, low complexity"),
    ("99204", "Office or outpatient visit, new patient, moderate complexity"),
    ("99211", "Office or outpatient visit, established patient, minimal"),
    ("99212", "Office or outpatient visit, established patient, straightforward"),
    ("99213", "Office or outpatient visit, established patient, low complexity"),
    ("99214", "Office or outpatient visit, established patient, moderate complexity"),
    ("99215", "Office or outpatient visit, established patient, high complexity"),
    ("99221", "Initial hospital inpatient care, low complexity"),
    ("99232", "Subsequent hospital inpatient care, moderate complexity"),
    ("99283", "Emergency department visit, low complexity"),
    ("99285", "Emergency department visit, high complexity"),
    ("36415", "Collection of venous blood by venipuncture"),
    ("80053", "Comprehensive metabolic panel"),
    ("85025", "Complete blood count with automated differential"),
    ("93000", "Electrocardiogram, routine, with interpretation and report"),
];

const HCPCS_CODES: &[(&str, &str)] = &[
    ("A4253", "Blood glucose test or reagent strips, per 50 strips"),
    ("A4550", "Surgical trays"),
    ("E0114", "Crutches, underarm, other than wood, adjustable, pair"),
    ("E0601", "Continuous positive airway pressure (CPAP) device"),
    ("G0008", "Administration of influenza virus vaccine"),
    ("G0438", "Annual wellness visit, initial"),
    ("G0439", "Annual wellness visit, subsequent"),
    ("G2211", "Visit complexity inherent to evaluation and management"),
    ("J0585", "Injection, onabotulinumtoxinA, 1 unit"),
    ("J1100", "Injection, dexamethasone sodium phosphate, 1 mg"),
    ("J1885", "Injection, ketorolac tromethamine, per 15 mg"),
    ("J3301", "Injection, triamcinolone acetonide, not otherwise specified, 10 mg"),
    ("J7030", "Infusion, normal saline solution, 1000 cc"),
    ("K0001", "Standard wheelchair"),
    ("L3908", "Wrist hand orthosis, wrist extension control cock-up"),
    ("Q4081", "Injection, epoetin alfa, 100 units, for ESRD on dialysis"),
];

static CATALOG: LazyLock<Vec<CodeEntry>> = LazyLock::new(|| {
    [
        (CodeType::Icd10, ICD10_CODES),
        (CodeType::Cpt, CPT_CODES),
        (CodeType::Hcpcs, HCPCS_CODES),
    ]
    .into_iter()
    .flat_map(|(code_type, codes)| {
        codes.iter().map(move |(code, description)| CodeEntry {
            code: code.to_string(),
            description: description.to_string(),
            code_type,
        })
    })
    .collect()
});

/// Every catalog entry, grouped by code type in declaration order.
pub fn entries() -> &'static [CodeEntry] {
    &CATALOG
}

pub fn entries_of(code_type: CodeType) -> impl Iterator<Item = &'static CodeEntry> {
    entries().iter().filter(move |e| e.code_type == code_type)
}

/// Exact lookup, used to show the description next to an already added code.
pub fn describe(code: &str) -> Option<&'static CodeEntry> {
    let code = code.trim();
    entries().iter().find(|e| e.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::validator::validate;

    #[test]
    fn sixteen_entries_per_type() {
        for code_type in CodeType::ALL {
            assert_eq!(entries_of(code_type).count(), 16, "{}", code_type);
        }
    }

    #[test]
    fn catalog_codes_pass_their_own_validator() {
        for entry in entries() {
            let result = validate(entry.code_type, &entry.code);
            assert!(result.valid, "{} {}", entry.code, result.message);
        }
    }

    #[test]
    fn describe_is_case_insensitive() {
        assert_eq!(describe("j0585").map(|e| e.code_type), Some(CodeType::Hcpcs));
        assert!(describe("Z99.99").is_none());
    }
}

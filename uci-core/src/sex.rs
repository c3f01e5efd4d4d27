use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical sex tag: `"F"`, `"M"`, an unrecognized code passed through in
/// uppercase, or empty for blank input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SexCode(String);

impl SexCode {
    pub const FEMALE: &'static str = "F";
    pub const MALE: &'static str = "M";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_female(&self) -> bool {
        self.0 == Self::FEMALE
    }

    pub fn is_male(&self) -> bool {
        self.0 == Self::MALE
    }

    /// Chart label for a code; unrecognized codes are shown as-is.
    pub fn display_label(code: &str) -> &str {
        match code {
            Self::FEMALE => "Femenino",
            Self::MALE => "Masculino",
            other => other,
        }
    }
}

impl fmt::Display for SexCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps free-text sex values onto the canonical vocabulary. Total and
/// idempotent.
pub fn normalize_sex(raw: &str) -> SexCode {
    let value = raw
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_uppercase();
    if value.is_empty() {
        return SexCode::default();
    }
    if value == SexCode::FEMALE || value.starts_with("FEM") {
        return SexCode(SexCode::FEMALE.to_string());
    }
    if value == SexCode::MALE || value.starts_with("MAS") {
        return SexCode(SexCode::MALE.to_string());
    }
    SexCode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_prefixes() {
        assert_eq!(normalize_sex("femenino").as_str(), "F");
        assert_eq!(normalize_sex("  Fem ").as_str(), "F");
        assert_eq!(normalize_sex("f").as_str(), "F");
        assert_eq!(normalize_sex("Masc").as_str(), "M");
        assert_eq!(normalize_sex("MASCULINO").as_str(), "M");
        assert_eq!(normalize_sex("m").as_str(), "M");
    }

    #[test]
    fn byte_order_mark_is_trimmed() {
        assert_eq!(normalize_sex("\u{feff}F").as_str(), "F");
        assert_eq!(normalize_sex("\u{feff} masculino ").as_str(), "M");
        assert!(normalize_sex("\u{feff}").is_empty());
    }

    #[test]
    fn blank_maps_to_empty_tag() {
        assert!(normalize_sex("").is_empty());
        assert!(normalize_sex("   ").is_empty());
    }

    #[test]
    fn unrecognized_codes_pass_through_uppercased() {
        assert_eq!(normalize_sex("X").as_str(), "X");
        assert_eq!(normalize_sex(" indeterminado ").as_str(), "INDETERMINADO");
        // "Male" does not start with the Spanish prefix.
        assert_eq!(normalize_sex("male").as_str(), "MALE");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "", " ", "f", "F", "femenino", "Fem", "m", "Masc", "masculino", "X", "otro", "ß",
            "  nb ", "Mujer", "hombre", "FEMALE", "M/F",
        ];
        for input in inputs {
            let once = normalize_sex(input);
            let twice = normalize_sex(once.as_str());
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn display_labels() {
        assert_eq!(SexCode::display_label("F"), "Femenino");
        assert_eq!(SexCode::display_label("M"), "Masculino");
        assert_eq!(SexCode::display_label("OTRO"), "OTRO");
    }
}

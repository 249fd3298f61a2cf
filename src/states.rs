//! U.S. state reference table and normalization.
//!
//! The table is plain read-only data: 50 states plus the District of
//! Columbia, keyed by USPS abbreviation. All lookups are case-insensitive.

/// (abbreviation, full name) pairs, 51 entries including DC.
pub const US_STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Normalize a submitted state (full name or abbreviation) to its lowercase
/// full name.
///
/// Total function: unrecognized input yields `None`, never an error. Input is
/// trimmed and compared case-insensitively, so "CA", "ca" and " California "
/// all normalize to "california".
pub fn normalize_state(input: &str) -> Option<String> {
    let token = input.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    for (abbr, full) in US_STATES {
        if token == full.to_lowercase() || token == abbr.to_lowercase() {
            return Some(full.to_lowercase());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_passes_through_lowercased() {
        assert_eq!(normalize_state("California"), Some("california".to_string()));
        assert_eq!(normalize_state("district of columbia"), Some("district of columbia".to_string()));
    }

    #[test]
    fn test_abbreviation_maps_to_full_name() {
        assert_eq!(normalize_state("CA"), Some("california".to_string()));
        assert_eq!(normalize_state("ny"), Some("new york".to_string()));
        assert_eq!(normalize_state("Dc"), Some("district of columbia".to_string()));
    }

    #[test]
    fn test_whitespace_and_case_are_ignored() {
        assert_eq!(normalize_state(" california "), Some("california".to_string()));
        assert_eq!(normalize_state("\tCA\n"), Some("california".to_string()));
        assert_eq!(normalize_state("nEw YoRk"), Some("new york".to_string()));
    }

    #[test]
    fn test_unknown_input_is_unmatched() {
        assert_eq!(normalize_state("Atlantis"), None);
        assert_eq!(normalize_state("XX"), None);
        assert_eq!(normalize_state(""), None);
        assert_eq!(normalize_state("   "), None);
        // Canadian province, not a U.S. state
        assert_eq!(normalize_state("Ontario"), None);
    }

    #[test]
    fn test_table_has_unique_entries() {
        let mut abbrs: Vec<&str> = US_STATES.iter().map(|(a, _)| *a).collect();
        let mut names: Vec<&str> = US_STATES.iter().map(|(_, n)| *n).collect();
        abbrs.sort();
        abbrs.dedup();
        names.sort();
        names.dedup();
        assert_eq!(abbrs.len(), 51);
        assert_eq!(names.len(), 51);
    }
}

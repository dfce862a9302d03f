//! Inverse mapping from evaluator paths back to roles.
//!
//! The rule evaluator knows nothing about the category / domain-index /
//! `Roles` / role-index nesting convention, so a violation path is
//! re-resolved against the live data tree here. Resolution navigates the
//! raw JSON value rather than a typed index: the trees that need localizing
//! are exactly the ones that failed validation, so no shape can be assumed.
//! A malformed, non-numeric, or out-of-range path degrades to explicit
//! unknown markers and never aborts the reporting pass.

use serde_json::Value;

use super::role_name;

pub const UNKNOWN: &str = "UNKNOWN";
pub const NO_INDEX: &str = "N/A";

/// One classified path segment: array index or object key. Classification
/// happens before use; segments are never coerced in place.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    fn classify(raw: &str) -> PathSegment {
        match raw.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(raw.to_string()),
        }
    }

    fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(_) => None,
        }
    }
}

/// Where a violation landed, re-derived from its structural path.
/// Every field falls back to an explicit sentinel when derivation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub category: String,
    pub domain_index: Option<usize>,
    pub role_name: String,
}

impl Location {
    fn unknown(category: impl Into<String>) -> Self {
        Location {
            category: category.into(),
            domain_index: None,
            role_name: UNKNOWN.to_string(),
        }
    }

    /// Domain index for display, `N/A` when it could not be derived.
    pub fn domain_label(&self) -> String {
        self.domain_index
            .map(|index| index.to_string())
            .unwrap_or_else(|| NO_INDEX.to_string())
    }
}

/// Resolve a structural path against the raw data tree.
///
/// The first segment is the category; the segment after it is the domain
/// index; the segment after the literal `Roles` marker is the role index.
/// Navigation reads `data[category][domain].Roles[role].IIQ_Role_Name`.
/// This function never fails: any unusable path or any hole in the data
/// yields unknown markers so the rest of the report survives.
pub fn resolve_location(path: &str, data: &Value) -> Location {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let Some(&category) = segments.first() else {
        return Location::unknown(UNKNOWN);
    };

    let marker = segments.iter().position(|segment| *segment == "Roles");
    let role_slot = match marker {
        Some(at) if at + 1 < segments.len() => at + 1,
        _ => return Location::unknown(category),
    };

    let domain_index = segments
        .get(1)
        .map(|raw| PathSegment::classify(raw))
        .and_then(|segment| segment.as_index());
    let role_index = PathSegment::classify(segments[role_slot]).as_index();

    let name = domain_index
        .zip(role_index)
        .and_then(|(domain_at, role_at)| {
            let role = data
                .get(category)?
                .get(domain_at)?
                .get("Roles")?
                .get(role_at)?;
            role_name(role)
        })
        .unwrap_or(UNKNOWN);

    Location {
        category: category.to_string(),
        domain_index,
        role_name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_data() -> Value {
        json!({
            "SSDP_IIQ_Roles": [
                {
                    "id": "cdl",
                    "Roles": [
                        { "IIQ_Role_Name": "IIQ_Reader" },
                        { "IIQ_Role_Name": "IIQ_Writer" }
                    ]
                },
                {
                    "id": "ops",
                    "Roles": [{ "AD_Organizational_Unit": "CN=X" }]
                },
                { "Roles": "not-an-array" }
            ],
            "EDC_IIQ_Roles": [
                { "id": "edge", "Roles": [{ "IIQ_Role_Name": "IIQ_Edge" }] }
            ]
        })
    }

    #[test]
    fn exact_path_resolves_to_the_role_name() {
        let data = sample_data();
        let location = resolve_location("/SSDP_IIQ_Roles/0/Roles/1/IIQ_Role_Name", &data);
        assert_eq!(location.category, "SSDP_IIQ_Roles");
        assert_eq!(location.domain_index, Some(0));
        assert_eq!(location.role_name, "IIQ_Writer");

        let location = resolve_location("/EDC_IIQ_Roles/0/Roles/0", &data);
        assert_eq!(location.role_name, "IIQ_Edge");
    }

    #[test]
    fn out_of_range_role_index_degrades_to_unknown() {
        let location = resolve_location("/SSDP_IIQ_Roles/0/Roles/99", &sample_data());
        assert_eq!(location.category, "SSDP_IIQ_Roles");
        assert_eq!(location.domain_index, Some(0));
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn missing_roles_marker_reports_best_effort_category() {
        let location = resolve_location("/SSDP_IIQ_Roles/1/id", &sample_data());
        assert_eq!(location.category, "SSDP_IIQ_Roles");
        assert_eq!(location.domain_index, None);
        assert_eq!(location.domain_label(), NO_INDEX);
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn trailing_roles_marker_degrades() {
        let location = resolve_location("/SSDP_IIQ_Roles/0/Roles", &sample_data());
        assert_eq!(location.domain_index, None);
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn empty_path_is_fully_unknown() {
        let location = resolve_location("", &sample_data());
        assert_eq!(location.category, UNKNOWN);
        assert_eq!(location.domain_index, None);
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn non_numeric_indices_degrade_without_panicking() {
        let data = sample_data();
        let location = resolve_location("/SSDP_IIQ_Roles/first/Roles/0", &data);
        assert_eq!(location.domain_index, None);
        assert_eq!(location.role_name, UNKNOWN);

        let location = resolve_location("/SSDP_IIQ_Roles/0/Roles/last", &data);
        assert_eq!(location.domain_index, Some(0));
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn unknown_category_degrades() {
        let location = resolve_location("/Nope_Roles/0/Roles/0", &sample_data());
        assert_eq!(location.category, "Nope_Roles");
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn role_without_display_name_resolves_to_unknown() {
        let location = resolve_location("/SSDP_IIQ_Roles/1/Roles/0", &sample_data());
        assert_eq!(location.domain_index, Some(1));
        assert_eq!(location.role_name, UNKNOWN);
    }

    #[test]
    fn malformed_domain_records_degrade_instead_of_failing() {
        let data = sample_data();
        // Domain whose Roles is not an array.
        let location = resolve_location("/SSDP_IIQ_Roles/2/Roles/0", &data);
        assert_eq!(location.domain_index, Some(2));
        assert_eq!(location.role_name, UNKNOWN);

        // Root that is not even an object.
        let location = resolve_location("/SSDP_IIQ_Roles/0/Roles/0", &json!([1, 2, 3]));
        assert_eq!(location.category, "SSDP_IIQ_Roles");
        assert_eq!(location.role_name, UNKNOWN);
    }
}

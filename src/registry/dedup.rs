//! Identity uniqueness: one pass over the whole index with two first-seen
//! maps, one keyed by the short identifier (the first `CN=` component of the
//! AD organizational unit) and one by the display name.
//!
//! The scan walks the raw data tree and degrades on malformed records: a
//! domain without an `id` is reported under an unknown-domain label, a
//! `Roles` value that is not an array scans as empty. Scope is global: both
//! categories feed the same maps, so a CN reused across SSDP and EDC is
//! still a collision. The scan never stops early; every finding is reported
//! in one pass.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use super::{org_unit, role_name, EDC_CATEGORY, SSDP_CATEGORY};
use super::locate::UNKNOWN;

/// Label for a domain record with no usable `id`.
pub const UNKNOWN_DOMAIN: &str = "unknown-domain";

/// One dedup finding. Invalid identifiers are reported but never registered
/// for duplicate tracking; duplicates cite the first-seen location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The organizational unit is missing, not a string, or has no leading
    /// `CN=` component to derive a short identifier from.
    InvalidOrgUnit {
        role_name: String,
        value: String,
        location: String,
    },
    DuplicateCn {
        cn: String,
        role_name: String,
        location: String,
        first_seen: String,
    },
    DuplicateRoleName {
        role_name: String,
        cn: String,
        location: String,
        first_seen: String,
    },
}

/// Explicit accumulator for one checker invocation. First occurrence wins;
/// the maps live exactly as long as the scan.
pub struct UniquenessChecker {
    cn_pattern: Regex,
    seen_cns: HashMap<String, String>,
    seen_names: HashMap<String, String>,
    findings: Vec<Finding>,
}

impl Default for UniquenessChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl UniquenessChecker {
    pub fn new() -> Self {
        UniquenessChecker {
            // Anchored and case-insensitive: only the first CN component of
            // the distinguished name counts.
            cn_pattern: Regex::new(r"(?i)^CN=([^,]+)").expect("valid regex"),
            seen_cns: HashMap::new(),
            seen_names: HashMap::new(),
            findings: Vec::new(),
        }
    }

    /// Extract the short identifier from a distinguished-name string.
    pub fn extract_cn(&self, dn: &str) -> Option<String> {
        self.cn_pattern
            .captures(dn)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Scan one category bucket of raw domain records. Location strings are
    /// `<category> / <id>`, with an unknown-domain label when `id` is
    /// missing or empty. Non-array `Roles` values scan as empty.
    pub fn check_category(&mut self, category: &str, domains: &[Value]) {
        for domain in domains {
            let id = domain
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_DOMAIN);
            let location = format!("{category} / {id}");
            let roles = domain.get("Roles").and_then(Value::as_array);
            for role in roles.map(Vec::as_slice).unwrap_or_default() {
                self.check_role(&location, role);
            }
        }
    }

    fn check_role(&mut self, location: &str, role: &Value) {
        let display_name = role_name(role).map(str::to_string);
        let shown = display_name.clone().unwrap_or_else(|| UNKNOWN.to_string());

        let cn = org_unit(role)
            .and_then(Value::as_str)
            .and_then(|dn| self.extract_cn(dn));
        let Some(cn) = cn else {
            let value = match org_unit(role) {
                Some(Value::String(dn)) => dn.clone(),
                Some(other) => other.to_string(),
                None => "<missing>".to_string(),
            };
            self.findings.push(Finding::InvalidOrgUnit {
                role_name: shown,
                value,
                location: location.to_string(),
            });
            return;
        };

        if let Some(first_seen) = self.seen_cns.get(&cn) {
            self.findings.push(Finding::DuplicateCn {
                cn: cn.clone(),
                role_name: shown.clone(),
                location: location.to_string(),
                first_seen: first_seen.clone(),
            });
        } else {
            self.seen_cns
                .insert(cn.clone(), format!("{location} -> {shown}"));
        }

        // Roles with no display name are the schema stage's problem; only
        // real names take part in name-duplicate tracking.
        if let Some(name) = display_name {
            if let Some(first_seen) = self.seen_names.get(&name) {
                self.findings.push(Finding::DuplicateRoleName {
                    role_name: name.clone(),
                    cn,
                    location: location.to_string(),
                    first_seen: first_seen.clone(),
                });
            } else {
                self.seen_names.insert(name, format!("{location} -> {cn}"));
            }
        }
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Check the whole raw data tree, both categories, one shared scope.
/// Missing or non-array buckets scan as empty.
pub fn check_index(data: &Value) -> Vec<Finding> {
    let mut checker = UniquenessChecker::new();
    for category in [SSDP_CATEGORY, EDC_CATEGORY] {
        let bucket = data.get(category).and_then(Value::as_array);
        checker.check_category(category, bucket.map(Vec::as_slice).unwrap_or_default());
    }
    checker.into_findings()
}

//! Domain merge: group per-domain role files by `id`, concatenating role
//! lists in discovery order, and write the consolidated index.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use super::discover::discover_role_files;
use super::{Domain, RegistryError, RoleIndex};

/// Category source subdirectories under the roles root.
pub const SSDP_SUBDIR: &str = "ssdp";
pub const EDC_SUBDIR: &str = "edc";

#[derive(Debug, Default, Clone, Copy)]
pub struct MergeStats {
    pub files_read: usize,
    pub files_skipped: usize,
}

/// Merge every candidate file under `dir` into domain records.
///
/// First file with a new `id` creates the domain; later files with the same
/// `id` append their roles. First-seen domain order is preserved. A file
/// without a non-empty string `id` and a `Roles` array is skipped with a
/// warning; a file that is not valid JSON aborts the run.
pub fn merge_category(dir: &Path, stats: &mut MergeStats) -> Result<Vec<Domain>, RegistryError> {
    let mut domains: Vec<Domain> = Vec::new();
    for path in discover_role_files(dir)? {
        let raw = fs::read_to_string(&path).map_err(|err| RegistryError::Io {
            path: path.clone(),
            source: err,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|err| RegistryError::Parse {
            path: path.clone(),
            source: err,
        })?;
        stats.files_read += 1;

        let id = value.get("id").and_then(Value::as_str).unwrap_or("");
        let roles = value.get("Roles").and_then(Value::as_array);
        let (id, roles) = match roles {
            Some(roles) if !id.is_empty() => (id, roles),
            _ => {
                warn!(
                    "skipping {}: missing non-empty 'id' or 'Roles' array",
                    path.display()
                );
                stats.files_skipped += 1;
                continue;
            }
        };

        match domains.iter_mut().find(|domain| domain.id == id) {
            Some(domain) => domain.roles.extend(roles.iter().cloned()),
            None => domains.push(Domain {
                id: id.to_string(),
                roles: roles.clone(),
            }),
        }
        debug!("merged {}", path.display());
    }
    Ok(domains)
}

/// Merge both category subtrees under `root` into a consolidated index.
pub fn merge_tree(root: &Path) -> Result<(RoleIndex, MergeStats), RegistryError> {
    let mut stats = MergeStats::default();
    let index = RoleIndex {
        ssdp: merge_category(&root.join(SSDP_SUBDIR), &mut stats)?,
        edc: merge_category(&root.join(EDC_SUBDIR), &mut stats)?,
    };
    Ok((index, stats))
}

/// Write the index as pretty two-space JSON, once, fully formed.
/// Re-running on an unchanged tree produces byte-identical output.
pub fn write_index(index: &RoleIndex, path: &Path) -> Result<(), RegistryError> {
    let body = serde_json::to_string_pretty(index).map_err(RegistryError::Encode)?;
    fs::write(path, body).map_err(|err| RegistryError::Io {
        path: path.to_path_buf(),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    fn write_file(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string(value).unwrap()).expect("write");
    }

    #[test]
    fn files_sharing_an_id_merge_into_one_domain() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "a.json",
            &json!({ "id": "cdl", "Roles": [{ "IIQ_Role_Name": "One" }] }),
        );
        write_file(
            dir.path(),
            "b.json",
            &json!({ "id": "cdl", "Roles": [{ "IIQ_Role_Name": "Two" }, { "IIQ_Role_Name": "Three" }] }),
        );
        write_file(
            dir.path(),
            "c.json",
            &json!({ "id": "other", "Roles": [] }),
        );

        let mut stats = MergeStats::default();
        let domains = merge_category(dir.path(), &mut stats).expect("merge");

        assert_eq!(stats.files_read, 3);
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].id, "cdl");
        assert_eq!(domains[0].roles.len(), 3);
        let names: Vec<_> = domains[0]
            .roles
            .iter()
            .map(|r| r["IIQ_Role_Name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert_eq!(domains[1].id, "other");
    }

    #[test]
    fn malformed_shape_is_skipped_without_aborting() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), "good.json", &json!({ "id": "x", "Roles": [] }));
        write_file(dir.path(), "no_id.json", &json!({ "Roles": [] }));
        write_file(dir.path(), "no_roles.json", &json!({ "id": "y" }));
        write_file(dir.path(), "empty_id.json", &json!({ "id": "", "Roles": [] }));

        let mut stats = MergeStats::default();
        let domains = merge_category(dir.path(), &mut stats).expect("merge");

        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].id, "x");
        assert_eq!(stats.files_skipped, 3);
    }

    #[test]
    fn invalid_json_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.json"), "{ not json").expect("write");

        let mut stats = MergeStats::default();
        assert!(merge_category(dir.path(), &mut stats).is_err());
    }

    #[test]
    fn merge_tree_is_byte_identical_on_rerun() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("ssdp")).expect("mkdir");
        fs::create_dir_all(dir.path().join("edc")).expect("mkdir");
        write_file(
            &dir.path().join("ssdp"),
            "cdl.json",
            &json!({ "id": "cdl", "Roles": [{ "IIQ_Role_Name": "One" }] }),
        );

        // Park the output inside a source subtree: it must be excluded from
        // discovery, so re-running never merges its own output.
        let out = dir.path().join("ssdp").join("index.json");
        let (index, _) = merge_tree(dir.path()).expect("merge");
        write_index(&index, &out).expect("write");
        let first = fs::read(&out).expect("read");

        let (index, _) = merge_tree(dir.path()).expect("merge");
        assert_eq!(index.ssdp.len(), 1);
        assert_eq!(index.ssdp[0].roles.len(), 1);
        write_index(&index, &out).expect("write");
        let second = fs::read(&out).expect("read");

        assert_eq!(first, second);
    }
}

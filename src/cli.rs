//! Command dispatch for the `roleforge` binary.
//!
//! Exit codes: 0 success, 1 findings or fatal error, 2 usage. Reports go to
//! stderr; success confirmations go to stdout.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::registry::{
    check_index, load_json, merge_tree, require_input, resolve_location, validate_index,
    write_index, Finding, RegistryError, Violation, INDEX_FILE, SCHEMA_FILE,
};

pub const DEFAULT_ROLES_ROOT: &str = "data/roles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Merge,
    Validate,
    Check,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("merge") => Some(Command::Merge),
        Some("validate") => Some(Command::Validate),
        Some("check") => Some(Command::Check),
        _ => None,
    }
}

fn roles_root(args: &[String]) -> PathBuf {
    args.get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROLES_ROOT))
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Merge) => handle_merge(&roles_root(args)),
        Some(Command::Validate) => handle_validate(&roles_root(args)),
        Some(Command::Check) => handle_check(&roles_root(args)),
        None => {
            eprintln!("usage: roleforge <merge|validate|check> [roles-root]");
            2
        }
    }
}

fn handle_merge(root: &Path) -> i32 {
    let (index, stats) = match merge_tree(root) {
        Ok(merged) => merged,
        Err(err) => {
            eprintln!("merge failed: {err}");
            return 1;
        }
    };

    let out = root.join(INDEX_FILE);
    if let Err(err) = write_index(&index, &out) {
        eprintln!("merge failed: {err}");
        return 1;
    }

    println!(
        "{} generated successfully ({} files merged, {} skipped, {} + {} domains)",
        out.display(),
        stats.files_read - stats.files_skipped,
        stats.files_skipped,
        index.ssdp.len(),
        index.edc.len()
    );
    0
}

fn load_validation_inputs(
    schema_path: &Path,
    index_path: &Path,
) -> Result<(Value, Vec<Violation>), RegistryError> {
    let schema = load_json(schema_path)?;
    // Violations are localized against the same raw tree they were found
    // in; a tree the typed model cannot represent must still be reported.
    let data = load_json(index_path)?;
    let violations = validate_index(&schema, &data)?;
    Ok((data, violations))
}

fn handle_validate(root: &Path) -> i32 {
    let schema_path = root.join(SCHEMA_FILE);
    let index_path = root.join(INDEX_FILE);
    if let Err(err) = require_input(&schema_path) {
        eprintln!("{err}");
        return 1;
    }
    if let Err(err) = require_input(&index_path) {
        eprintln!("{err}. Run merge first");
        return 1;
    }

    let (data, violations) = match load_validation_inputs(&schema_path, &index_path) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("validate failed: {err}");
            return 1;
        }
    };

    if violations.is_empty() {
        println!("Schema validation passed");
        return 0;
    }

    eprintln!();
    eprintln!("Schema validation failed");
    for violation in &violations {
        let location = resolve_location(&violation.path, &data);
        eprintln!("----------------------------------------");
        eprintln!("Category     : {}", location.category);
        eprintln!("Domain index : {}", location.domain_label());
        eprintln!("Role name    : {}", location.role_name);
        eprintln!("Keyword      : {}", violation.keyword);
        let path = if violation.path.is_empty() {
            "(root)"
        } else {
            &violation.path
        };
        eprintln!("Path         : {path}");
        eprintln!("Message      : {}", violation.message);
        if let Some(pattern) = &violation.pattern {
            eprintln!("Expected     : {pattern}");
        }
    }
    eprintln!();
    eprintln!("Fix the above errors and retry");
    1
}

fn handle_check(root: &Path) -> i32 {
    let index_path = root.join(INDEX_FILE);
    if let Err(err) = require_input(&index_path) {
        eprintln!("{err}. Run merge first");
        return 1;
    }

    let data = match load_json(&index_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("check failed: {err}");
            return 1;
        }
    };

    let findings = check_index(&data);
    if findings.is_empty() {
        println!("Duplicate check passed (CN + IIQ role name)");
        return 0;
    }

    for finding in &findings {
        eprint_finding(finding);
    }
    eprintln!();
    eprintln!("Duplicate check failed");
    1
}

fn eprint_finding(finding: &Finding) {
    match finding {
        Finding::InvalidOrgUnit {
            role_name,
            value,
            location,
        } => {
            eprintln!();
            eprintln!("Invalid AD organizational unit");
            eprintln!("Role name  : {role_name}");
            eprintln!("Value      : {value}");
            eprintln!("Location   : {location}");
        }
        Finding::DuplicateCn {
            cn,
            role_name,
            location,
            first_seen,
        } => {
            eprintln!();
            eprintln!("Duplicate CN detected");
            eprintln!("CN         : {cn}");
            eprintln!("Role name  : {role_name}");
            eprintln!("Location   : {location}");
            eprintln!("Previously : {first_seen}");
        }
        Finding::DuplicateRoleName {
            role_name,
            cn,
            location,
            first_seen,
        } => {
            eprintln!();
            eprintln!("Duplicate IIQ role name detected");
            eprintln!("Role name  : {role_name}");
            eprintln!("CN         : {cn}");
            eprintln!("Location   : {location}");
            eprintln!("Previously : {first_seen}");
        }
    }
}

//! Schema validation: compile once, validate once, collect every violation.
//!
//! Rule semantics live entirely in the evaluator; this stage only shapes its
//! errors into structural-path violations for the reporter.

use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use serde_json::Value;

use super::RegistryError;

/// One schema violation, localized by a structural path into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Slash-delimited path into the merged tree, e.g.
    /// `/SSDP_IIQ_Roles/0/Roles/2/IIQ_Role_Name`. Empty for the root.
    pub path: String,
    pub keyword: String,
    pub message: String,
    /// Expected pattern literal, present only for pattern-match failures.
    pub pattern: Option<String>,
}

/// Validate the consolidated index against `schema`.
///
/// Returns every violation in evaluator order, never failing fast; an empty
/// vec means the index conforms. A schema that does not compile is an error.
pub fn validate_index(schema: &Value, index: &Value) -> Result<Vec<Violation>, RegistryError> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|err| RegistryError::SchemaCompile(err.to_string()))?;

    let mut violations = Vec::new();
    if let Err(errors) = compiled.validate(index) {
        for error in errors {
            let pattern = match &error.kind {
                ValidationErrorKind::Pattern { pattern } => Some(pattern.clone()),
                _ => None,
            };
            let schema_path = error.schema_path.to_string();
            let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
            violations.push(Violation {
                path: error.instance_path.to_string(),
                keyword,
                message: error.to_string(),
                pattern,
            });
        }
    }
    Ok(violations)
}

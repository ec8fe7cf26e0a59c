//! `${VAR}` and `${VAR:-default}` references in credential and path fields.
//!
//! Bare `$VAR` and template placeholders such as `{page_title}` are left
//! alone; only the braced form is expanded.

use crate::ConfigError;

/// Expand references in `value` from the process environment, in place.
///
/// `field` names the setting in error messages (`confluence.api_token`).
pub(crate) fn expand_field(value: &mut String, field: &str) -> Result<(), ConfigError> {
    expand_field_with(value, field, |name| std::env::var(name).ok())
}

/// Expand references in `value` using `lookup` to resolve variable names.
fn expand_field_with(
    value: &mut String,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), |name| {
        lookup(name).map(Some).ok_or_else(|| name.to_owned())
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause),
    })?;

    *value = expanded.into_owned();
    Ok(())
}

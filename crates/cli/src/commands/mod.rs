// CLI command implementations

pub mod assignments;
pub mod attendee;
pub mod auth;
pub mod drafts;
pub mod schedules;

use miseventos_core::SyncError;

use crate::output::print_errors;

/// Parse `field=value` for `--set`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{}`", s))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{}`", s));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Turn a lifecycle error into a CLI error, listing field errors on stderr
pub fn sync_error(err: SyncError) -> anyhow::Error {
    if let SyncError::Validation(errors) = &err {
        eprintln!("Validation failed:");
        print_errors(errors);
    }
    err.into()
}

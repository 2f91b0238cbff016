//! Helpers for applying connection parameters to candidate URLs.

use crate::discovery::domain::{CandidateRewriteError, DiscoveryContext, parameter_keys};
use url::Url;

/// Parses a candidate URL for rewriting.
///
/// # Errors
///
/// Returns [`CandidateRewriteError::Unparseable`] when `url` is not a valid
/// URL (multi-host connection strings, for example).
pub fn parse_candidate(url: &str) -> Result<Url, CandidateRewriteError> {
    Url::parse(url).map_err(|err| CandidateRewriteError::Unparseable {
        url: url.to_owned(),
        reason: err.to_string(),
    })
}

/// Returns `true` when the context carries any of `keys`.
#[must_use]
pub fn has_any_parameter(context: &DiscoveryContext, keys: &[&str]) -> bool {
    keys.iter().any(|key| context.parameter_str(key).is_some())
}

/// Applies `username` and `password` parameters, keeping credentials
/// already embedded in the URL when the context carries none.
///
/// Returns `true` when credentials were applied.
///
/// # Errors
///
/// Returns [`CandidateRewriteError::CannotCarryCredentials`] when the URL
/// has no host to attach credentials to.
pub fn apply_credentials(
    url: &mut Url,
    context: &DiscoveryContext,
) -> Result<bool, CandidateRewriteError> {
    let username = context.parameter_str(parameter_keys::USERNAME);
    let password = context.parameter_str(parameter_keys::PASSWORD);
    if username.is_none() && password.is_none() {
        return Ok(false);
    }

    let cannot_carry =
        |target: &Url| CandidateRewriteError::CannotCarryCredentials(target.to_string());
    if let Some(name) = username.as_deref() {
        url.set_username(name).map_err(|()| cannot_carry(&*url))?;
    }
    if let Some(secret) = password.as_deref() {
        url.set_password(Some(secret)).map_err(|()| cannot_carry(&*url))?;
    }
    Ok(true)
}

/// Replaces the URL path with `/<segment>` when `key` is present.
///
/// Returns `true` when the path was replaced.
pub fn apply_path_parameter(url: &mut Url, context: &DiscoveryContext, key: &str) -> bool {
    let Some(segment) = context.parameter_str(key) else {
        return false;
    };
    let trimmed = segment.trim_matches('/');
    url.set_path(&format!("/{trimmed}"));
    true
}

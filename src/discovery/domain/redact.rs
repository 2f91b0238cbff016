//! Credential redaction for addresses shown in logs and reports.

use url::Url;

const REDACTED: &str = "***";

/// Replaces the password component of `url` with `***`.
///
/// Unparseable inputs are returned unchanged when they contain no `@`;
/// otherwise everything before the last `@` in the authority is masked.
#[must_use]
pub fn redact_credentials(url: &str) -> String {
    if let Ok(mut parsed) = Url::parse(url) {
        if parsed.password().is_none() {
            return url.to_owned();
        }
        if parsed.set_password(Some(REDACTED)).is_ok() {
            return parsed.to_string();
        }
    }

    mask_userinfo(url)
}

fn mask_userinfo(url: &str) -> String {
    let (scheme, remainder) = url.split_once("://").unwrap_or(("", url));
    let authority_end = remainder.find('/').unwrap_or(remainder.len());
    let (authority, path) = remainder.split_at(authority_end);
    match authority.rsplit_once('@') {
        Some((_, hosts)) if scheme.is_empty() => format!("{REDACTED}@{hosts}{path}"),
        Some((_, hosts)) => format!("{scheme}://{REDACTED}@{hosts}{path}"),
        None => url.to_owned(),
    }
}

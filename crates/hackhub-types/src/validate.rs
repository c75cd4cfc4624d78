//! Input rules enforced by the server and checked early by the client.

use url::Url;

use crate::models::{TeamMember, TeamSize};

/// A project link must be an absolute http(s) URL with a host.
pub fn project_url(field: &str, value: &str) -> Result<(), String> {
    let invalid = || format!("{field} must be a valid http(s) URL");
    let parsed = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

pub fn team_size(bounds: &TeamSize, members: usize) -> Result<(), String> {
    if bounds.contains(members) {
        return Ok(());
    }
    if members < bounds.min as usize {
        Err(format!(
            "Team needs at least {} member(s), got {}",
            bounds.min, members
        ))
    } else {
        Err(format!(
            "Team can have at most {} member(s), got {}",
            bounds.max, members
        ))
    }
}

/// Names end up in one-line lists and CSV rows.
pub fn single_line(field: &str, value: &str) -> Result<(), String> {
    if value.chars().any(char::is_control) {
        return Err(format!(
            "{field} cannot contain line breaks or control characters"
        ));
    }
    Ok(())
}

pub fn team_members(members: &[TeamMember]) -> Result<(), String> {
    for member in members {
        if member.name.trim().is_empty() {
            return Err("Every team member needs a name".to_string());
        }
        single_line("Team member name", &member.name)?;
        single_line("Team member email", &member.email)?;
        if !looks_like_email(&member.email) {
            return Err(format!("'{}' is not a valid email address", member.email));
        }
    }
    Ok(())
}

pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Join codes are compared trimmed and upper-cased.
pub fn normalize_team_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

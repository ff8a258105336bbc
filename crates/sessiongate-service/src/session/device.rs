//! Device label resolution for registrations.

use sessiongate_entity::device::describe_user_agent;

/// Longest device label stored, in characters.
pub const MAX_DEVICE_INFO_CHARS: usize = 255;

/// Pick the label to store for a registration.
///
/// A non-blank client-supplied label wins, then one derived from the
/// User-Agent, then `fallback`. Never fails.
pub fn resolve_device_info(
    supplied: Option<&str>,
    user_agent: Option<&str>,
    fallback: &str,
) -> String {
    let label = supplied
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| user_agent.and_then(describe_user_agent))
        .unwrap_or_else(|| fallback.to_string());
    truncate_chars(&label, MAX_DEVICE_INFO_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

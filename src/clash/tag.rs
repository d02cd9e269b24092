/// Canonical form of a player or clan tag: no `#`, uppercase, letter `O`
/// replaced by digit `0` since the game never issues tags containing `O`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .trim_start_matches('#')
        .to_uppercase()
        .replace('O', "0")
}

/// Path segment for a tag, with the leading `#` percent-encoded.
pub fn encode_tag(tag: &str) -> String {
    format!("%23{}", normalize_tag(tag))
}

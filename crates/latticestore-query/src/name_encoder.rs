//! Component A: derives a physical keyspace name from `(reverseDomain,
//! table)` that is deterministic, charset-valid, and no longer than 48
//! characters.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha1::{Digest, Sha1};

const MAX_LEN: usize = 48;
const MIN_DOMAIN_LEN: usize = 26;
const INFIX: &str = "_T_";

fn is_charset_valid(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn longest_valid_prefix(s: &str) -> &str {
    let end = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &s[..end]
}

fn sha1_charset_safe(input: &str) -> String {
    let digest = Sha1::digest(input.as_bytes());
    STANDARD
        .encode(digest)
        .chars()
        .filter(|c| *c != '=')
        .map(|c| match c {
            '+' | '/' => '_',
            other => other,
        })
        .collect()
}

/// Encode a single component (the reverse domain, or the table name) to at
/// most `length` characters.
pub fn encode_component(input: &str, length: usize) -> String {
    let replaced = input.replace('_', "__").replace('.', "_");
    if is_charset_valid(&replaced) && replaced.chars().count() <= length {
        return replaced;
    }

    let prefix_cap = length * 2 / 3;
    let prefix: String = longest_valid_prefix(&replaced).chars().take(prefix_cap).collect();
    let hash = sha1_charset_safe(input);

    let mut out = prefix;
    out.push_str(&hash);
    out.chars().take(length).collect()
}

/// The full keyspace name for `(reverseDomain, table)`.
pub fn keyspace_name(reverse_domain: &str, table: &str) -> String {
    let domain_len = (MAX_LEN.saturating_sub(table.chars().count()).saturating_sub(3)).max(MIN_DOMAIN_LEN);
    let domain_part = encode_component(reverse_domain, domain_len);
    let table_len = MAX_LEN.saturating_sub(domain_part.chars().count()).saturating_sub(INFIX.len());
    let table_part = encode_component(table, table_len);
    format!("{domain_part}{INFIX}{table_part}")
}

//! Implicit schema-node identifiers.
//!
//! Every declaration that was not given an explicit `@0x...` ID receives one
//! derived from its parent's ID and a discriminant:
//! ```text
//! child   = fold(MD5(parent_le64 || name))
//! group   = fold(MD5(parent_le64 || group_index_le16))
//! params  = fold(MD5(parent_le64 || ordinal_le16 || is_results_u8))
//! fold(d) = u64::from_be_bytes(d[0..8]) | 1 << 63
//! ```
//! The mapping is frozen: changing it would silently renumber previously
//! compiled schemas.

use tracing::trace;

use super::digest::StreamingDigest;

/// Bit that every schema ID must have set.
pub const ID_HIGH_BIT: u64 = 1 << 63;

/// Derives the ID of a named child declaration (nested type, constant, ...).
pub fn derive_child_id(parent_id: u64, name: impl AsRef<[u8]>) -> u64 {
    let mut digest = StreamingDigest::new();
    digest.absorb(&parent_id.to_le_bytes());
    digest.absorb(name.as_ref());

    let id = fold(digest.finish());
    trace!(parent_id, id, "derived child id");
    id
}

/// Derives the ID of the `group_index`-th group inside a struct.
pub fn derive_group_id(parent_id: u64, group_index: u16) -> u64 {
    let mut bytes = [0u8; 10];
    bytes[..8].copy_from_slice(&parent_id.to_le_bytes());
    bytes[8..].copy_from_slice(&group_index.to_le_bytes());

    let mut digest = StreamingDigest::new();
    digest.absorb(&bytes);

    let id = fold(digest.finish());
    trace!(parent_id, group_index, id, "derived group id");
    id
}

/// Derives the ID of the implicit params (or results) struct of a method.
pub fn derive_method_params_id(parent_id: u64, method_ordinal: u16, is_results: bool) -> u64 {
    let mut bytes = [0u8; 11];
    bytes[..8].copy_from_slice(&parent_id.to_le_bytes());
    bytes[8..10].copy_from_slice(&method_ordinal.to_le_bytes());
    bytes[10] = is_results as u8;

    let mut digest = StreamingDigest::new();
    digest.absorb(&bytes);

    let id = fold(digest.finish());
    trace!(parent_id, method_ordinal, is_results, id, "derived method params id");
    id
}

/// Takes the first 8 digest bytes big-endian and forces the high bit.
///
/// The remaining 8 bytes are discarded.
fn fold(digest: [u8; 16]) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) | ID_HIGH_BIT
}

/// Returns true if `id` lies in the range declarations must use.
pub fn is_valid_id(id: u64) -> bool {
    id & ID_HIGH_BIT != 0
}

/// Formats an ID the way it is written in schema files (`@0x` + 16 hex digits).
pub fn format_id(id: u64) -> String {
    format!("@0x{:016x}", id)
}

/// Parses an ID written as `@0x...` or `0x...`.
///
/// Returns `None` for malformed input and for IDs without the high bit set.
pub fn parse_id(s: &str) -> Option<u64> {
    let s = s.strip_prefix('@').unwrap_or(s);
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if hex.is_empty() || hex.len() > 16 {
        return None;
    }
    let id = u64::from_str_radix(hex, 16).ok()?;
    is_valid_id(id).then_some(id)
}

//! Default limits applied when decoding untrusted text.

/// Maximum accepted input length in bytes.
pub const MAX_INPUT_LEN: usize = 16 * 1024 * 1024;

/// Maximum nesting of `(` and `[` brackets.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Largest input whose byte offsets fit in a [`Span`](crate::error::Span).
/// Configured input limits are clamped to this.
pub const MAX_SPAN_OFFSET: usize = u32::MAX as usize;

//! Schema-node identifiers.
//!
//! - [`digest`]: the streaming MD5 core
//! - [`derive`]: child, group and method-params ID derivation, plus the
//!   `@0x...` text form

pub mod derive;
pub mod digest;

pub use derive::{
    derive_child_id, derive_group_id, derive_method_params_id, format_id, is_valid_id, parse_id,
    ID_HIGH_BIT,
};
pub use digest::StreamingDigest;

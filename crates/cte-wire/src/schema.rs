//! Field kinds and their size limits.
//!
//! Every limit here is hard: values outside it are rejected, never clamped.

/// Size of one public key blob in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of one signature blob in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Minimum number of elements in a key or signature list.
pub const MIN_LIST_LEN: usize = 1;

/// Maximum number of elements in a key or signature list.
pub const MAX_LIST_LEN: usize = 15;

/// Largest index reference value.
pub const MAX_INDEX: u8 = 15;

/// Longest command payload that fits the short (inline) length form.
pub const COMMAND_DATA_SHORT_MAX_LEN: usize = 31;

/// Longest command payload the format allows.
pub const COMMAND_DATA_EXTENDED_MAX_LEN: usize = 1197;

/// Format version carried by the Version field.
pub const FORMAT_VERSION: u8 = 1;

/// A public key blob.
pub type PublicKey = [u8; PUBLIC_KEY_SIZE];

/// A signature blob.
pub type Signature = [u8; SIGNATURE_SIZE];

/// The closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Version,
    PublicKeyList,
    SignatureList,
    IndexReference,
    CommandData,
}

impl FieldKind {
    /// Numeric kind code used by host bindings. Code 0 is reserved for unknown kinds.
    pub fn code(self) -> u8 {
        match self {
            FieldKind::Version => 1,
            FieldKind::PublicKeyList => 2,
            FieldKind::SignatureList => 3,
            FieldKind::IndexReference => 4,
            FieldKind::CommandData => 5,
        }
    }

    /// Human-readable kind name.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Version => "Version",
            FieldKind::PublicKeyList => "PublicKeyList",
            FieldKind::SignatureList => "SignatureList",
            FieldKind::IndexReference => "IndexReference",
            FieldKind::CommandData => "CommandData",
        }
    }

    /// Element size for list kinds.
    pub fn element_size(self) -> Option<usize> {
        match self {
            FieldKind::PublicKeyList => Some(PUBLIC_KEY_SIZE),
            FieldKind::SignatureList => Some(SIGNATURE_SIZE),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true if `count` is a legal key/signature list length.
pub fn is_valid_list_len(count: usize) -> bool {
    (MIN_LIST_LEN..=MAX_LIST_LEN).contains(&count)
}

/// Returns true if `len` is a legal command payload length.
pub fn is_valid_command_len(len: usize) -> bool {
    len <= COMMAND_DATA_EXTENDED_MAX_LEN
}

/// Returns true if a command payload of `len` bytes uses the short length form.
pub fn uses_short_form(len: usize) -> bool {
    len <= COMMAND_DATA_SHORT_MAX_LEN
}

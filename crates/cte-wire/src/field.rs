use std::borrow::Cow;

use bytes::Bytes;

use crate::schema::{FieldKind, PublicKey, Signature};

/// One self-delimiting unit of a CTE stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Format version marker. Carries no payload.
    Version,
    /// 1 to 15 public keys, in order.
    PublicKeyList(Vec<PublicKey>),
    /// 1 to 15 signatures, in order.
    SignatureList(Vec<Signature>),
    /// A reference in the range 0..=15.
    IndexReference(u8),
    /// Opaque command bytes, at most 1197.
    CommandData(Bytes),
}

impl Field {
    /// Create a command field from text, stored as its UTF-8 bytes.
    pub fn command_text(text: &str) -> Self {
        Field::CommandData(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// The kind of this field.
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Version => FieldKind::Version,
            Field::PublicKeyList(_) => FieldKind::PublicKeyList,
            Field::SignatureList(_) => FieldKind::SignatureList,
            Field::IndexReference(_) => FieldKind::IndexReference,
            Field::CommandData(_) => FieldKind::CommandData,
        }
    }

    /// Element count for list kinds.
    pub fn count(&self) -> Option<usize> {
        match self {
            Field::PublicKeyList(keys) => Some(keys.len()),
            Field::SignatureList(sigs) => Some(sigs.len()),
            _ => None,
        }
    }

    /// Index value for index references.
    pub fn index(&self) -> Option<u8> {
        match self {
            Field::IndexReference(value) => Some(*value),
            _ => None,
        }
    }

    /// Raw command bytes.
    pub fn command_data(&self) -> Option<&[u8]> {
        match self {
            Field::CommandData(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    /// Command bytes decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.command_data().map(String::from_utf8_lossy)
    }
}

//! Compact Transaction Encoding field schema and wire codec.
//!
//! A CTE stream is a flat concatenation of fields with no outer envelope.
//! Each field starts with a header that names its kind and size, so a reader
//! always knows how many bytes belong to the field without looking further:
//! - Version marker
//! - Public key list (1-15 keys of 32 bytes)
//! - Signature list (1-15 signatures of 64 bytes)
//! - Index reference (0-15)
//! - Command data (0-1197 opaque bytes, short or extended length form)
//!
//! This crate only moves bytes of fixed sizes. It never interprets key or
//! signature content.

pub mod codec;
pub mod error;
pub mod field;
pub mod schema;

pub use codec::{
    decode_all, decode_field, encode_field, encode_to_bytes, encoded_len, validate_blobs, Decoded,
    Header, HeaderDecode, MAX_HEADER_SIZE,
};
pub use error::{
    CteError, Result, CTE_ERROR_ALLOCATION_FAILED, CTE_ERROR_BUFFER_OVERFLOW,
    CTE_ERROR_END_OF_BUFFER, CTE_ERROR_INSUFFICIENT_DATA, CTE_ERROR_INVALID_ARGUMENT,
    CTE_ERROR_INVALID_FORMAT, CTE_ERROR_INVALID_STATE, CTE_ERROR_IO, CTE_SUCCESS,
};
pub use field::Field;
pub use schema::{
    FieldKind, PublicKey, Signature, COMMAND_DATA_EXTENDED_MAX_LEN, COMMAND_DATA_SHORT_MAX_LEN,
    FORMAT_VERSION, MAX_INDEX, MAX_LIST_LEN, MIN_LIST_LEN, PUBLIC_KEY_SIZE, SIGNATURE_SIZE,
};

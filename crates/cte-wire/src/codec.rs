use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CteError, Result};
use crate::field::Field;
use crate::schema::{
    is_valid_command_len, is_valid_list_len, uses_short_form, FieldKind, PublicKey, Signature,
    COMMAND_DATA_EXTENDED_MAX_LEN, COMMAND_DATA_SHORT_MAX_LEN, FORMAT_VERSION, MAX_INDEX,
    MAX_LIST_LEN, PUBLIC_KEY_SIZE, SIGNATURE_SIZE,
};

/// Largest header: the extended command form uses two bytes.
pub const MAX_HEADER_SIZE: usize = 2;

const TAG_SHIFT: u8 = 5;
const SIZE_MASK: u8 = 0b0001_1111;

const TAG_VERSION: u8 = 1;
const TAG_PUBLIC_KEY_LIST: u8 = 2;
const TAG_SIGNATURE_LIST: u8 = 3;
const TAG_INDEX_REFERENCE: u8 = 4;
const TAG_COMMAND_SHORT: u8 = 5;
const TAG_COMMAND_EXTENDED: u8 = 6;

const EXTENDED_RESERVED_MASK: u8 = 0b0001_1000;
const EXTENDED_HIGH_MASK: u8 = 0b0000_0111;

/// A decoded or validated field header.
///
/// Wire format, one header byte per field:
/// ```text
/// ┌─────────────┬──────────────────┐
/// │ Tag (3 bit) │ Size (5 bit)     │
/// │ bits 7..5   │ bits 4..0        │
/// └─────────────┴──────────────────┘
///
/// tag 1  Version          size = 1 (format version)
/// tag 2  PublicKeyList    size = count (1..=15), then count x 32 bytes
/// tag 3  SignatureList    size = count (1..=15), then count x 64 bytes
/// tag 4  IndexReference   size = value (0..=15)
/// tag 5  CommandData      size = length (0..=31), then length bytes
/// tag 6  CommandData      size = 00hhh, one more byte lll: length = hhh << 8 | lll
///                         (32..=1197), then length bytes
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Version,
    PublicKeyList { count: u8 },
    SignatureList { count: u8 },
    IndexReference { value: u8 },
    CommandData { len: u16 },
}

/// Result of reading one header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDecode {
    Known(Header),
    /// The tag is outside the schema; the payload size cannot be known.
    Unknown { tag: u8 },
}

/// Result of reading one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete field and the number of bytes it occupied.
    Field { field: Field, consumed: usize },
    /// A header with an unknown tag. Nothing past the header byte was read.
    UnknownKind { tag: u8 },
}

impl Decoded {
    /// Treat the schema as closed: unknown kinds become `InvalidFormat`.
    pub fn into_field(self) -> Result<(Field, usize)> {
        match self {
            Decoded::Field { field, consumed } => Ok((field, consumed)),
            Decoded::UnknownKind { tag } => Err(CteError::InvalidFormat(format!(
                "unknown field tag {tag}"
            ))),
        }
    }
}

impl Header {
    /// Header of the Version field.
    pub fn version() -> Self {
        Header::Version
    }

    /// Header of a public key list with `count` keys.
    pub fn public_key_list(count: usize) -> Result<Self> {
        list_count(count, "public key").map(|count| Header::PublicKeyList { count })
    }

    /// Header of a signature list with `count` signatures.
    pub fn signature_list(count: usize) -> Result<Self> {
        list_count(count, "signature").map(|count| Header::SignatureList { count })
    }

    /// Header of an index reference. Negative and out-of-range values are rejected.
    pub fn index_reference<V>(value: V) -> Result<Self>
    where
        V: TryInto<u8> + Copy + std::fmt::Display,
    {
        let converted: std::result::Result<u8, _> = value.try_into();
        match converted {
            Ok(v) if v <= MAX_INDEX => Ok(Header::IndexReference { value: v }),
            _ => Err(CteError::InvalidArgument(format!(
                "index must be an integer between 0 and {MAX_INDEX}, got {value}"
            ))),
        }
    }

    /// Header of a command payload of `len` bytes.
    pub fn command_data(len: usize) -> Result<Self> {
        if !is_valid_command_len(len) {
            return Err(CteError::InvalidArgument(format!(
                "command data too large ({len} bytes, max {COMMAND_DATA_EXTENDED_MAX_LEN})"
            )));
        }
        Ok(Header::CommandData { len: len as u16 })
    }

    /// Validate `field` and build its header.
    pub fn for_field(field: &Field) -> Result<Self> {
        match field {
            Field::Version => Ok(Header::version()),
            Field::PublicKeyList(keys) => Header::public_key_list(keys.len()),
            Field::SignatureList(sigs) => Header::signature_list(sigs.len()),
            Field::IndexReference(value) => Header::index_reference(*value),
            Field::CommandData(data) => Header::command_data(data.len()),
        }
    }

    /// The field kind this header introduces.
    pub fn kind(&self) -> FieldKind {
        match self {
            Header::Version => FieldKind::Version,
            Header::PublicKeyList { .. } => FieldKind::PublicKeyList,
            Header::SignatureList { .. } => FieldKind::SignatureList,
            Header::IndexReference { .. } => FieldKind::IndexReference,
            Header::CommandData { .. } => FieldKind::CommandData,
        }
    }

    /// Bytes taken by the header itself.
    pub fn header_len(&self) -> usize {
        match self {
            Header::CommandData { len } if !uses_short_form(*len as usize) => 2,
            _ => 1,
        }
    }

    /// Bytes of payload following the header.
    pub fn payload_len(&self) -> usize {
        match self {
            Header::Version | Header::IndexReference { .. } => 0,
            Header::PublicKeyList { count } | Header::SignatureList { count } => self
                .kind()
                .element_size()
                .map_or(0, |size| *count as usize * size),
            Header::CommandData { len } => *len as usize,
        }
    }

    /// Total bytes of the field on the wire.
    pub fn wire_len(&self) -> usize {
        self.header_len() + self.payload_len()
    }

    /// Write the header bytes.
    pub fn encode_into<B: BufMut>(&self, dst: &mut B) {
        match *self {
            Header::Version => dst.put_u8(tag_byte(TAG_VERSION, FORMAT_VERSION)),
            Header::PublicKeyList { count } => dst.put_u8(tag_byte(TAG_PUBLIC_KEY_LIST, count)),
            Header::SignatureList { count } => dst.put_u8(tag_byte(TAG_SIGNATURE_LIST, count)),
            Header::IndexReference { value } => dst.put_u8(tag_byte(TAG_INDEX_REFERENCE, value)),
            Header::CommandData { len } if uses_short_form(len as usize) => {
                dst.put_u8(tag_byte(TAG_COMMAND_SHORT, len as u8));
            }
            Header::CommandData { len } => {
                dst.put_u8(tag_byte(
                    TAG_COMMAND_EXTENDED,
                    (len >> 8) as u8 & EXTENDED_HIGH_MASK,
                ));
                dst.put_u8((len & 0xFF) as u8);
            }
        }
    }

    /// Read a header from the start of `src`.
    ///
    /// Returns `EndOfBuffer` if `src` is empty. Values outside the schema are
    /// `InvalidFormat`; they are never clamped.
    pub fn decode(src: &[u8]) -> Result<HeaderDecode> {
        let Some(&first) = src.first() else {
            return Err(CteError::EndOfBuffer);
        };
        let tag = first >> TAG_SHIFT;
        let size = first & SIZE_MASK;

        let header = match tag {
            TAG_VERSION => {
                if size != FORMAT_VERSION {
                    return Err(CteError::InvalidFormat(format!(
                        "unsupported format version {size}"
                    )));
                }
                Header::Version
            }
            TAG_PUBLIC_KEY_LIST => Header::PublicKeyList {
                count: decoded_count(size, "public key")?,
            },
            TAG_SIGNATURE_LIST => Header::SignatureList {
                count: decoded_count(size, "signature")?,
            },
            TAG_INDEX_REFERENCE => {
                if size > MAX_INDEX {
                    return Err(CteError::InvalidFormat(format!(
                        "index {size} out of range (max {MAX_INDEX})"
                    )));
                }
                Header::IndexReference { value: size }
            }
            TAG_COMMAND_SHORT => Header::CommandData { len: size as u16 },
            TAG_COMMAND_EXTENDED => {
                if size & EXTENDED_RESERVED_MASK != 0 {
                    return Err(CteError::InvalidFormat(
                        "reserved bits set in extended command header".to_string(),
                    ));
                }
                let Some(&low) = src.get(1) else {
                    return Err(CteError::InsufficientData {
                        needed: MAX_HEADER_SIZE,
                        remaining: src.len(),
                    });
                };
                let len = (u16::from(size & EXTENDED_HIGH_MASK) << 8) | u16::from(low);
                if uses_short_form(len as usize) {
                    return Err(CteError::InvalidFormat(format!(
                        "extended command length {len} fits the short form (max {COMMAND_DATA_SHORT_MAX_LEN})"
                    )));
                }
                if !is_valid_command_len(len as usize) {
                    return Err(CteError::InvalidFormat(format!(
                        "command length {len} exceeds {COMMAND_DATA_EXTENDED_MAX_LEN}"
                    )));
                }
                Header::CommandData { len }
            }
            _ => return Ok(HeaderDecode::Unknown { tag }),
        };

        Ok(HeaderDecode::Known(header))
    }
}

fn tag_byte(tag: u8, size: u8) -> u8 {
    (tag << TAG_SHIFT) | (size & SIZE_MASK)
}

fn list_count(count: usize, what: &str) -> Result<u8> {
    if !is_valid_list_len(count) {
        return Err(CteError::InvalidArgument(format!(
            "{what} list must have 1 to {MAX_LIST_LEN} elements, got {count}"
        )));
    }
    Ok(count as u8)
}

fn decoded_count(size: u8, what: &str) -> Result<u8> {
    if !is_valid_list_len(size as usize) {
        return Err(CteError::InvalidFormat(format!(
            "{what} list count {size} out of range (1 to {MAX_LIST_LEN})"
        )));
    }
    Ok(size)
}

/// Check that every blob is exactly `size` bytes.
pub fn validate_blobs<K: AsRef<[u8]>>(blobs: &[K], size: usize, what: &str) -> Result<()> {
    for (i, blob) in blobs.iter().enumerate() {
        let len = blob.as_ref().len();
        if len != size {
            return Err(CteError::InvalidArgument(format!(
                "{what} {i} must be {size} bytes, got {len}"
            )));
        }
    }
    Ok(())
}

/// Number of bytes `field` takes on the wire. Fails if the field is invalid.
pub fn encoded_len(field: &Field) -> Result<usize> {
    Header::for_field(field).map(|header| header.wire_len())
}

/// Encode one field into `dst`.
///
/// The field is validated before anything is written; on error `dst` is untouched.
pub fn encode_field<B: BufMut>(field: &Field, dst: &mut B) -> Result<()> {
    let header = Header::for_field(field)?;
    let needed = header.wire_len();
    if dst.remaining_mut() < needed {
        return Err(CteError::BufferOverflow {
            needed,
            available: dst.remaining_mut(),
        });
    }

    header.encode_into(dst);
    match field {
        Field::Version | Field::IndexReference(_) => {}
        Field::PublicKeyList(keys) => keys.iter().for_each(|key| dst.put_slice(key)),
        Field::SignatureList(sigs) => sigs.iter().for_each(|sig| dst.put_slice(sig)),
        Field::CommandData(data) => dst.put_slice(data),
    }
    Ok(())
}

/// Decode one field from the start of `src`.
///
/// `EndOfBuffer` when `src` is empty, `InsufficientData` when the header
/// promises more bytes than `src` holds. Command payloads share `src`'s storage.
pub fn decode_field(src: &Bytes) -> Result<Decoded> {
    let header = match Header::decode(src)? {
        HeaderDecode::Known(header) => header,
        HeaderDecode::Unknown { tag } => return Ok(Decoded::UnknownKind { tag }),
    };

    let consumed = header.wire_len();
    if src.len() < consumed {
        return Err(CteError::InsufficientData {
            needed: consumed,
            remaining: src.len(),
        });
    }

    let payload = &src[header.header_len()..consumed];
    let field = match header {
        Header::Version => Field::Version,
        Header::IndexReference { value } => Field::IndexReference(value),
        Header::PublicKeyList { .. } => Field::PublicKeyList(
            payload
                .chunks_exact(PUBLIC_KEY_SIZE)
                .map(|chunk| {
                    let mut key: PublicKey = [0; PUBLIC_KEY_SIZE];
                    key.copy_from_slice(chunk);
                    key
                })
                .collect(),
        ),
        Header::SignatureList { .. } => Field::SignatureList(
            payload
                .chunks_exact(SIGNATURE_SIZE)
                .map(|chunk| {
                    let mut sig: Signature = [0; SIGNATURE_SIZE];
                    sig.copy_from_slice(chunk);
                    sig
                })
                .collect(),
        ),
        Header::CommandData { .. } => {
            Field::CommandData(src.slice(header.header_len()..consumed))
        }
    };

    Ok(Decoded::Field { field, consumed })
}

/// Encode a sequence of fields into one buffer.
pub fn encode_to_bytes(fields: &[Field]) -> Result<Bytes> {
    let mut total = 0usize;
    for field in fields {
        total += encoded_len(field)?;
    }

    let mut dst = BytesMut::with_capacity(total);
    for field in fields {
        encode_field(field, &mut dst)?;
    }
    Ok(dst.freeze())
}

/// Decode every field in `src`. Fails on the first malformed or unknown field.
pub fn decode_all(src: Bytes) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut offset = 0usize;
    while offset < src.len() {
        let (field, consumed) = decode_field(&src.slice(offset..))?.into_field()?;
        fields.push(field);
        offset += consumed;
    }
    Ok(fields)
}

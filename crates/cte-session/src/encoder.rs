use bytes::Bytes;
use cte_wire::{
    encode_field, validate_blobs, CteError, Field, Header, Result, PUBLIC_KEY_SIZE,
    SIGNATURE_SIZE,
};
use tracing::{debug, trace};

use crate::config::SessionConfig;

/// Sequentially appends fields into an owned, growable buffer.
///
/// Fields may be appended in any order. Every append validates its input
/// before touching the buffer, so a failed append leaves the output exactly as
/// it was. [`finalize`](Self::finalize) hands the bytes to the caller once;
/// after that every operation fails with `InvalidState`.
#[derive(Debug)]
pub struct EncoderSession {
    buf: Vec<u8>,
    finalized: bool,
    config: SessionConfig,
}

impl EncoderSession {
    /// Create an encoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create an encoder with explicit configuration.
    ///
    /// No memory is reserved until the first append.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            buf: Vec::new(),
            finalized: false,
            config,
        }
    }

    /// Append the Version marker.
    pub fn append_version(&mut self) -> Result<()> {
        self.ensure_building()?;
        let header = Header::version();
        self.reserve(header.wire_len())?;
        header.encode_into(&mut self.buf);
        self.trace_append(&header);
        Ok(())
    }

    /// Append a list of 1 to 15 public keys, each exactly 32 bytes.
    pub fn append_public_key_list<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<()> {
        self.ensure_building()?;
        let header = Header::public_key_list(keys.len())?;
        validate_blobs(keys, PUBLIC_KEY_SIZE, "public key")?;
        self.append_blobs(&header, keys)
    }

    /// Append a list of 1 to 15 signatures, each exactly 64 bytes.
    pub fn append_signature_list<K: AsRef<[u8]>>(&mut self, signatures: &[K]) -> Result<()> {
        self.ensure_building()?;
        let header = Header::signature_list(signatures.len())?;
        validate_blobs(signatures, SIGNATURE_SIZE, "signature")?;
        self.append_blobs(&header, signatures)
    }

    /// Append an index reference in the range 0 to 15.
    pub fn append_index_reference<V>(&mut self, value: V) -> Result<()>
    where
        V: TryInto<u8> + Copy + std::fmt::Display,
    {
        self.ensure_building()?;
        let header = Header::index_reference(value)?;
        self.reserve(header.wire_len())?;
        header.encode_into(&mut self.buf);
        self.trace_append(&header);
        Ok(())
    }

    /// Append up to 1197 bytes of opaque command data.
    pub fn append_command_data(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_building()?;
        let header = Header::command_data(data.len())?;
        self.reserve(header.wire_len())?;
        header.encode_into(&mut self.buf);
        self.buf.extend_from_slice(data);
        self.trace_append(&header);
        Ok(())
    }

    /// Append text as command data. The limit applies to its UTF-8 byte length.
    pub fn append_command_text(&mut self, text: &str) -> Result<()> {
        self.append_command_data(text.as_bytes())
    }

    /// Append an already-built field.
    pub fn append_field(&mut self, field: &Field) -> Result<()> {
        self.ensure_building()?;
        let header = Header::for_field(field)?;
        self.reserve(header.wire_len())?;
        encode_field(field, &mut self.buf)?;
        self.trace_append(&header);
        Ok(())
    }

    /// Take the encoded bytes. Callable once.
    pub fn finalize(&mut self) -> Result<Bytes> {
        self.ensure_building()?;
        self.finalized = true;
        let bytes = Bytes::from(std::mem::take(&mut self.buf));
        debug!(size = bytes.len(), "encoder finalized");
        Ok(bytes)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True once [`finalize`](Self::finalize) has succeeded.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Current encoder configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_building(&self) -> Result<()> {
        if self.finalized {
            return Err(CteError::InvalidState("encoder already finalized"));
        }
        Ok(())
    }

    fn append_blobs<K: AsRef<[u8]>>(&mut self, header: &Header, blobs: &[K]) -> Result<()> {
        self.reserve(header.wire_len())?;
        header.encode_into(&mut self.buf);
        for blob in blobs {
            self.buf.extend_from_slice(blob.as_ref());
        }
        self.trace_append(header);
        Ok(())
    }

    /// Make room for `needed` more bytes, honoring the configured ceiling.
    ///
    /// `try_reserve` grows geometrically, so repeated appends stay amortized.
    fn reserve(&mut self, needed: usize) -> Result<()> {
        let len = self.buf.len();
        let max = self.config.max_encoded_size;
        let available = max.saturating_sub(len);
        if needed > available {
            return Err(CteError::BufferOverflow { needed, available });
        }

        let additional = if self.buf.capacity() == 0 {
            needed.max(self.config.initial_capacity.min(max))
        } else {
            needed
        };
        self.buf.try_reserve(additional)?;
        Ok(())
    }

    fn trace_append(&self, header: &Header) {
        trace!(
            kind = %header.kind(),
            bytes = header.wire_len(),
            total = self.buf.len(),
            "appended field"
        );
    }
}

impl Default for EncoderSession {
    fn default() -> Self {
        Self::new()
    }
}

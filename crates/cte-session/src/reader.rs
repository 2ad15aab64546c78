use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use cte_wire::{decode_field, CteError, Field, Header, HeaderDecode, Result, MAX_HEADER_SIZE};
use tracing::{debug, trace};

use crate::config::SessionConfig;

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;
const READ_CHUNK_SIZE: usize = 2 * 1024;

/// Reads complete CTE fields from any `Read` stream.
///
/// Handles partial reads internally. End of stream on a field boundary is
/// `Ok(None)`; end of stream inside a field is `InsufficientData`. At most
/// `max_input_size` bytes are buffered at once. After any error the reader is
/// failed and every later call returns `InvalidState`.
pub struct FieldReader<T> {
    inner: T,
    buf: BytesMut,
    failed: bool,
    config: SessionConfig,
}

impl<T: Read> FieldReader<T> {
    /// Create a field reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, SessionConfig::default())
    }

    /// Create a field reader with explicit configuration.
    pub fn with_config(inner: T, config: SessionConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            failed: false,
            config,
        }
    }

    /// Read the next complete field (blocking).
    pub fn read_field(&mut self) -> Result<Option<Field>> {
        if self.failed {
            return Err(CteError::InvalidState("field reader already failed"));
        }
        let result = self.next_field();
        if let Err(err) = &result {
            self.failed = true;
            debug!(error = %err, buffered = self.buf.len(), "field reader failed");
        }
        result
    }

    fn next_field(&mut self) -> Result<Option<Field>> {
        loop {
            if let Some(field) = self.take_buffered()? {
                return Ok(Some(field));
            }

            let room = self.config.max_input_size.saturating_sub(self.buf.len());
            if room == 0 {
                return Err(CteError::InvalidArgument(format!(
                    "pending field exceeds max input size ({} bytes)",
                    self.config.max_input_size
                )));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let limit = room.min(READ_CHUNK_SIZE);
            let read = match self.inner.read(&mut chunk[..limit]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CteError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(CteError::InsufficientData {
                    needed: self.pending_len(),
                    remaining: self.buf.len(),
                });
            }
            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current field reader configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Decode a field from the buffer if one is complete.
    fn take_buffered(&mut self) -> Result<Option<Field>> {
        let header = match Header::decode(&self.buf) {
            Ok(HeaderDecode::Known(header)) => header,
            Ok(HeaderDecode::Unknown { tag }) => {
                return Err(CteError::InvalidFormat(format!("unknown field tag {tag}")))
            }
            Err(err) if err.is_end_of_buffer() => return Ok(None),
            Err(CteError::InsufficientData { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let wire_len = header.wire_len();
        if self.buf.len() < wire_len {
            return Ok(None);
        }

        let bytes = self.buf.split_to(wire_len).freeze();
        let (field, _) = decode_field(&bytes)?.into_field()?;
        trace!(kind = %field.kind(), bytes = wire_len, "read field");
        Ok(Some(field))
    }

    /// Size of the partially buffered field, as far as its header tells.
    fn pending_len(&self) -> usize {
        match Header::decode(&self.buf) {
            Ok(HeaderDecode::Known(header)) => header.wire_len(),
            _ => MAX_HEADER_SIZE,
        }
    }
}

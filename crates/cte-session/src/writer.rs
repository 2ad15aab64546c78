use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use cte_wire::{encode_field, CteError, Field, Result};
use tracing::trace;

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;

/// Writes encoded CTE fields to any `Write` stream.
pub struct FieldWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FieldWriter<T> {
    /// Create a new field writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and write one field, then flush (blocking).
    ///
    /// An invalid field is rejected before anything reaches the stream.
    pub fn write_field(&mut self, field: &Field) -> Result<()> {
        self.buf.clear();
        encode_field(field, &mut self.buf)?;
        self.write_buffered()?;
        trace!(kind = %field.kind(), bytes = self.buf.len(), "wrote field");
        self.flush()
    }

    /// Encode and write several fields with a single flush.
    ///
    /// All fields are validated before any is written.
    pub fn write_fields(&mut self, fields: &[Field]) -> Result<()> {
        self.buf.clear();
        for field in fields {
            encode_field(field, &mut self.buf)?;
        }
        self.write_buffered()?;
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CteError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(CteError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CteError::Io(err)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::Bytes;
    use cte_wire::encode_to_bytes;

    use super::*;
    use crate::reader::FieldReader;

    #[test]
    fn write_single_field() {
        let mut writer = FieldWriter::new(Vec::<u8>::new());
        writer.write_field(&Field::IndexReference(3)).unwrap();
        assert_eq!(writer.get_ref().as_slice(), &[0x83]);
    }

    #[test]
    fn write_fields_matches_encode_to_bytes() {
        let fields = vec![
            Field::Version,
            Field::SignatureList(vec![[1; 64]]),
            Field::CommandData(Bytes::from(vec![4u8; 100])),
        ];
        let mut writer = FieldWriter::new(Vec::<u8>::new());
        writer.write_fields(&fields).unwrap();
        assert_eq!(
            writer.into_inner(),
            encode_to_bytes(&fields).unwrap().to_vec()
        );
    }

    #[test]
    fn invalid_field_writes_nothing() {
        let mut writer = FieldWriter::new(Vec::<u8>::new());
        let fields = vec![Field::Version, Field::IndexReference(99)];
        assert!(matches!(
            writer.write_fields(&fields),
            Err(CteError::InvalidArgument(_))
        ));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn writer_reader_roundtrip() {
        let fields = vec![
            Field::PublicKeyList(vec![[8; 32]; 3]),
            Field::command_text("transfer"),
            Field::IndexReference(0),
        ];
        let mut writer = FieldWriter::new(Vec::<u8>::new());
        for field in &fields {
            writer.write_field(field).unwrap();
        }

        let mut reader = FieldReader::new(Cursor::new(writer.into_inner()));
        for expected in &fields {
            assert_eq!(reader.read_field().unwrap().as_ref(), Some(expected));
        }
        assert_eq!(reader.read_field().unwrap(), None);
    }

    #[test]
    fn zero_length_write_is_an_error() {
        let mut writer = FieldWriter::new(ZeroWriter);
        let err = writer.write_field(&Field::Version).unwrap_err();
        assert!(matches!(err, CteError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn interrupted_write_retries() {
        let mut writer = FieldWriter::new(InterruptedOnce {
            interrupted: false,
            out: Vec::new(),
        });
        writer.write_field(&Field::Version).unwrap();
        assert_eq!(writer.get_mut().out, vec![0x21]);
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        out: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

//! Sequential encoder and decoder sessions for Compact Transaction Encoding.
//!
//! - [`EncoderSession`] appends fields into a growable buffer and hands the
//!   bytes out exactly once.
//! - [`DecoderSession`] walks a received buffer one field at a time, forward
//!   only, until the input runs out or a field is malformed.
//! - [`FieldReader`] and [`FieldWriter`] do the same over `std::io` streams.
//!
//! Sessions are single-threaded state machines. Use one session per stream.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod reader;
pub mod writer;

pub use config::{SessionConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_SIZE};
pub use decoder::{DecoderSession, DecoderState};
pub use encoder::EncoderSession;
pub use reader::FieldReader;
pub use writer::FieldWriter;

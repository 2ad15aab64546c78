//! Compact Transaction Encoding.
//!
//! CTE packs a small, fixed vocabulary of transaction fields (version, public
//! keys, signatures, index references and opaque command data) into one
//! contiguous buffer with no outer framing.
//!
//! # Crate Structure
//!
//! - [`wire`] — Field schema, header layout and the per-field codec
//! - [`session`] — Encoder/decoder sessions and `std::io` field streams
//!
//! ```
//! use cte::session::{DecoderSession, EncoderSession};
//! use cte::wire::Field;
//!
//! let mut encoder = EncoderSession::new();
//! encoder.append_index_reference(5)?;
//! encoder.append_command_text("Hello")?;
//! let bytes = encoder.finalize()?;
//!
//! let mut decoder = DecoderSession::new(bytes)?;
//! assert_eq!(decoder.advance()?, Some(Field::IndexReference(5)));
//! assert_eq!(decoder.advance()?, Some(Field::command_text("Hello")));
//! assert_eq!(decoder.advance()?, None);
//! # Ok::<(), cte::wire::CteError>(())
//! ```

/// Re-export wire types.
pub mod wire {
    pub use cte_wire::*;
}

/// Re-export session types.
pub mod session {
    pub use cte_session::*;
}

pub use cte_session::{DecoderSession, DecoderState, EncoderSession, SessionConfig};
pub use cte_wire::{CteError, Field, FieldKind, Result};

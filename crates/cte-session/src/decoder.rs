use std::iter::FusedIterator;

use bytes::Bytes;
use cte_wire::{decode_field, CteError, Decoded, Field, Result};
use tracing::{debug, trace};

use crate::config::SessionConfig;

/// Lifecycle of a [`DecoderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// More fields may follow.
    Positioned,
    /// The input ended cleanly on a field boundary.
    Exhausted,
    /// A field failed to decode.
    Errored,
}

/// Forward-only cursor over an encoded buffer.
///
/// The session holds its own reference-counted view of the input, so nothing
/// else can mutate the bytes while it is decoding. Each [`advance`](Self::advance)
/// yields one field; there is no peek or rewind. Exhausted and Errored are
/// terminal.
#[derive(Debug)]
pub struct DecoderSession {
    input: Bytes,
    pos: usize,
    state: DecoderState,
    config: SessionConfig,
}

impl DecoderSession {
    /// Create a decoder over `input` with default configuration.
    pub fn new(input: impl Into<Bytes>) -> Result<Self> {
        Self::with_config(input, SessionConfig::default())
    }

    /// Create a decoder over `input`, rejecting inputs above `config.max_input_size`.
    pub fn with_config(input: impl Into<Bytes>, config: SessionConfig) -> Result<Self> {
        let input = input.into();
        if input.len() > config.max_input_size {
            return Err(CteError::InvalidArgument(format!(
                "input too large ({} bytes, max {})",
                input.len(),
                config.max_input_size
            )));
        }
        Ok(Self {
            input,
            pos: 0,
            state: DecoderState::Positioned,
            config,
        })
    }

    /// Decode the next field.
    ///
    /// Returns `Ok(None)` once the input is used up on a field boundary. A
    /// decode failure moves the session to Errored; after either outcome every
    /// further call fails with `InvalidState`.
    pub fn advance(&mut self) -> Result<Option<Field>> {
        match self.state {
            DecoderState::Positioned => {}
            DecoderState::Exhausted => {
                return Err(CteError::InvalidState("decoder already exhausted"))
            }
            DecoderState::Errored => return Err(CteError::InvalidState("decoder already failed")),
        }

        if self.pos == self.input.len() {
            self.state = DecoderState::Exhausted;
            debug!(size = self.input.len(), "decoder exhausted");
            return Ok(None);
        }

        let rest = self.input.slice(self.pos..);
        match decode_field(&rest).and_then(Decoded::into_field) {
            Ok((field, consumed)) => {
                trace!(
                    kind = %field.kind(),
                    bytes = consumed,
                    offset = self.pos,
                    "decoded field"
                );
                self.pos += consumed;
                Ok(Some(field))
            }
            Err(err) => {
                self.state = DecoderState::Errored;
                debug!(error = %err, offset = self.pos, "decoder failed");
                Err(err)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Byte offset of the next field.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True once the session is Exhausted or Errored.
    pub fn is_finished(&self) -> bool {
        self.state != DecoderState::Positioned
    }
}

impl Iterator for DecoderSession {
    type Item = Result<Field>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        self.advance().transpose()
    }
}

impl FusedIterator for DecoderSession {}

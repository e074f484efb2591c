use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::protocol::DecodeError;

/// A decoder that takes over body chunks instead of the stream buffer,
/// e.g. a `multipart/form-data` parser.
///
/// Once a chunk was offered the decoder owns it.
pub trait BodyDecoder: Send + Sync {
    fn offer(&self, chunk: Bytes) -> Result<(), DecodeError>;
}

/// Supplies the decoder for the next chunk, `None` means raw pass-through.
///
/// The provider is asked again for every chunk, so the surrounding system may
/// switch a request from raw to decoded mode while the body is streaming.
pub trait DecoderProvider: Send + Sync {
    fn decoder(&self) -> Option<Arc<dyn BodyDecoder>>;
}

impl<F> DecoderProvider for F
where
    F: Fn() -> Option<Arc<dyn BodyDecoder>> + Send + Sync,
{
    fn decoder(&self) -> Option<Arc<dyn BodyDecoder>> {
        self()
    }
}

/// A provider holding at most one decoder that can be armed and disarmed at any time.
#[derive(Default)]
pub struct DecoderSlot {
    decoder: RwLock<Option<Arc<dyn BodyDecoder>>>,
}

impl DecoderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every following chunk into `decoder`.
    pub fn arm(&self, decoder: Arc<dyn BodyDecoder>) {
        *self.decoder.write() = Some(decoder);
    }

    /// Switches back to raw pass-through, returning the decoder that was armed.
    pub fn disarm(&self) -> Option<Arc<dyn BodyDecoder>> {
        self.decoder.write().take()
    }

    pub fn is_armed(&self) -> bool {
        self.decoder.read().is_some()
    }
}

impl DecoderProvider for DecoderSlot {
    fn decoder(&self) -> Option<Arc<dyn BodyDecoder>> {
        self.decoder.read().clone()
    }
}

impl fmt::Debug for DecoderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderSlot").field("armed", &self.is_armed()).finish()
    }
}

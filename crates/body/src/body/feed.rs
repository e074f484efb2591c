use std::cmp;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::body::BodyInputStream;
use crate::body::listener::notify_error;
use crate::protocol::{BodyError, PayloadItem};

/// at most this many bytes of an unexpected chunk end up in the log
const MAX_LOGGED_BYTES: usize = 255;

impl BodyInputStream {
    /// Delivers the next chunk of the body, called from the network thread.
    ///
    /// The chunk goes to the decoder if the provider currently supplies one, otherwise
    /// into the buffer. Never blocks: waiting consumers are only signalled.
    pub fn on_chunk(&self, chunk: Bytes) {
        if self.is_closed() {
            debug!(size = chunk.len(), "stream closed, drop received chunk");
            return;
        }

        let (provider, decode_failed) = {
            let shared = self.shared.lock();
            if shared.state.content_length.is_empty() && !chunk.is_empty() {
                let logged = &chunk[..cmp::min(chunk.len(), MAX_LOGGED_BYTES)];
                warn!(
                    size = chunk.len(),
                    preview = %String::from_utf8_lossy(logged),
                    "no content length declared, but receive body chunk"
                );
                return;
            }
            (shared.decoder_provider.clone(), shared.state.decode_error.is_some())
        };

        self.flags.received_length.fetch_add(chunk.len() as u64, Ordering::AcqRel);

        // the decoder runs without the stream lock, it may be slow
        let mut decode_error = None;
        let raw_chunk = match provider.and_then(|provider| provider.decoder()) {
            Some(_) if decode_failed => {
                debug!(size = chunk.len(), "body already failed to decode, drop received chunk");
                None
            }
            Some(decoder) => {
                decode_error = decoder.offer(chunk).err();
                None
            }
            None => Some(chunk),
        };

        let (listener, finished) = {
            let mut shared = self.shared.lock();
            if self.is_closed() {
                return;
            }

            if let Some(e) = &decode_error {
                shared.state.decode_error = Some(e.clone());
            }
            if let Some(chunk) = raw_chunk {
                if let Some(accumulator) = shared.accumulator.as_mut() {
                    accumulator.append(chunk);
                }
            }

            self.condvar.notify_all();
            (shared.listener.clone(), shared.state.is_finished(&self.flags))
        };

        let Some(listener) = listener else {
            return;
        };

        if let Some(e) = decode_error {
            notify_error(&*listener, &BodyError::from(e));
        }
        self.dispatch_notifications(&*listener, finished);
    }

    /// The transport reached the end of the body, or the connection ended.
    pub fn on_eof(&self) {
        if self.is_closed() {
            return;
        }

        let (listener, finished) = {
            let mut shared = self.shared.lock();
            shared.state.eof = true;
            self.condvar.notify_all();
            (shared.listener.clone(), shared.state.is_finished(&self.flags))
        };

        if let Some(listener) = listener {
            self.dispatch_notifications(&*listener, finished);
        }
    }

    pub fn on_payload(&self, payload_item: PayloadItem) {
        match payload_item {
            PayloadItem::Chunk(bytes) => self.on_chunk(bytes),
            PayloadItem::Eof => self.on_eof(),
        }
    }
}

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::body::accumulator::ByteAccumulator;
use crate::body::decoder::DecoderProvider;
use crate::body::listener::ReadListener;
use crate::body::state::{StreamFlags, StreamState};
use crate::ensure;
use crate::protocol::{BodyError, DecodeError, PayloadSize};

/// Everything guarded by the stream lock.
#[derive(Default)]
pub(crate) struct Shared {
    pub(crate) state: StreamState,
    pub(crate) accumulator: Option<ByteAccumulator>,
    pub(crate) listener: Option<Arc<dyn ReadListener>>,
    pub(crate) decoder_provider: Option<Arc<dyn DecoderProvider>>,
    /// zero waits forever
    pub(crate) timeout: Duration,
}

impl Shared {
    #[inline]
    pub(crate) fn readable(&self) -> usize {
        self.accumulator.as_ref().map_or(0, ByteAccumulator::readable)
    }
}

/// A blocking request body stream fed chunk by chunk from the network thread.
///
/// The network side calls [`on_chunk`](Self::on_chunk) / [`on_eof`](Self::on_eof) as data
/// arrives, the consumer side reads with [`read`](Self::read) and friends, blocking until
/// bytes are there or the body is finished. Consumers that prefer callbacks register a
/// [`ReadListener`] instead.
///
/// One instance serves many requests: [`wrap`](Self::wrap) starts a request,
/// [`recycle`](Self::recycle) ends it.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use micro_body::body::{BodyInputStream, ByteAccumulator};
/// use micro_body::protocol::PayloadSize;
///
/// let stream = BodyInputStream::new();
/// stream.wrap(ByteAccumulator::new());
/// stream.set_content_length(PayloadSize::Length(5));
///
/// stream.on_chunk(Bytes::from_static(b"hello"));
/// assert!(stream.is_finished());
///
/// let mut buf = [0u8; 16];
/// assert_eq!(stream.read(&mut buf).unwrap(), Some(5));
/// assert_eq!(&buf[..5], b"hello");
/// assert_eq!(stream.read(&mut buf).unwrap(), None);
///
/// stream.recycle();
/// ```
pub struct BodyInputStream {
    pub(crate) flags: StreamFlags,
    pub(crate) shared: Mutex<Shared>,
    pub(crate) condvar: Condvar,
}

impl Default for BodyInputStream {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyInputStream {
    /// Creates a stream without a decoder, every chunk goes to the buffer.
    pub fn new() -> Self {
        Self { flags: StreamFlags::default(), shared: Mutex::new(Shared::default()), condvar: Condvar::new() }
    }

    pub fn with_decoder_provider(provider: Arc<dyn DecoderProvider>) -> Self {
        let stream = Self::new();
        stream.shared.lock().decoder_provider = Some(provider);
        stream
    }

    pub fn set_decoder_provider(&self, provider: Arc<dyn DecoderProvider>) {
        self.shared.lock().decoder_provider = Some(provider);
    }

    /// Declares the body size, [`PayloadSize::Empty`] means no body is expected.
    pub fn set_content_length(&self, content_length: PayloadSize) {
        let mut shared = self.shared.lock();
        shared.state.content_length = content_length;
        // a shorter length may already be satisfied by early chunks
        self.condvar.notify_all();
    }

    pub fn content_length(&self) -> PayloadSize {
        self.shared.lock().state.content_length
    }

    /// Bounds every wait for more data, `Duration::ZERO` waits forever.
    pub fn set_timeout(&self, timeout: Duration) {
        self.shared.lock().timeout = timeout;
    }

    pub fn set_timeout_ms(&self, timeout_ms: u64) {
        self.set_timeout(Duration::from_millis(timeout_ms));
    }

    pub fn timeout(&self) -> Duration {
        self.shared.lock().timeout
    }

    pub fn received_length(&self) -> u64 {
        self.flags.received_length()
    }

    /// The connection carrying this body must be closed, after a read timeout or a decode error.
    pub fn needs_connection_close(&self) -> bool {
        self.flags.needs_connection_close.load(Ordering::Acquire)
    }

    pub fn is_timed_out(&self) -> bool {
        self.flags.is_timed_out()
    }

    pub fn decode_error(&self) -> Option<DecodeError> {
        self.shared.lock().state.decode_error.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.flags.is_closed()
    }

    /// No more bytes will ever arrive for this body.
    pub fn is_finished(&self) -> bool {
        self.shared.lock().state.is_finished(&self.flags)
    }

    /// Bytes can be read without blocking, or there is no body at all.
    pub fn is_ready(&self) -> bool {
        let shared = self.shared.lock();
        shared.state.is_ready(shared.readable())
    }

    /// Reads into `buf`, blocking until data arrives or the body is finished.
    ///
    /// Returns `Ok(None)` at the end of the body. An empty `buf` returns `Ok(Some(0))`
    /// without waiting.
    pub fn read(&self, buf: &mut [u8]) -> Result<Option<usize>, BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);
        if buf.is_empty() {
            return Ok(Some(0));
        }

        let mut shared = self.await_readable_or_finished()?;
        Ok(match shared.accumulator.as_mut() {
            Some(accumulator) if !accumulator.is_empty() => Some(accumulator.read_into(buf)),
            _ => None,
        })
    }

    /// Reads one byte, `Ok(None)` at the end of the body.
    pub fn read_byte(&self) -> Result<Option<u8>, BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);

        let mut shared = self.await_readable_or_finished()?;
        Ok(shared.accumulator.as_mut().and_then(ByteAccumulator::read_byte))
    }

    /// Reads a line into `buf`, stopping after `\n`, when `buf` is full or at the end of the body.
    ///
    /// Returns `Ok(None)` when the body ended before any byte was read.
    pub fn read_line(&self, buf: &mut [u8]) -> Result<Option<usize>, BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);

        let mut count = 0;
        while count < buf.len() {
            let Some(byte) = self.read_byte()? else {
                return Ok((count > 0).then_some(count));
            };
            buf[count] = byte;
            count += 1;
            if byte == b'\n' {
                break;
            }
        }
        Ok(Some(count))
    }

    /// Number of bytes readable without blocking, 0 before the first [`wrap`](Self::wrap).
    pub fn available(&self) -> Result<usize, BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);
        Ok(self.shared.lock().readable())
    }

    /// Discards up to `n` buffered bytes without waiting for more.
    pub fn skip(&self, n: u64) -> Result<u64, BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);

        let mut shared = self.shared.lock();
        let skipped = match shared.accumulator.as_mut() {
            Some(accumulator) => accumulator.skip(usize::try_from(n).unwrap_or(usize::MAX)),
            None => 0,
        };
        Ok(skipped as u64)
    }

    pub fn mark(&self) -> Result<(), BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);
        if let Some(accumulator) = self.shared.lock().accumulator.as_mut() {
            accumulator.mark();
        }
        Ok(())
    }

    pub fn reset(&self) -> Result<(), BodyError> {
        ensure!(!self.is_closed(), BodyError::Closed);
        if let Some(accumulator) = self.shared.lock().accumulator.as_mut() {
            accumulator.reset();
        }
        Ok(())
    }

    /// Starts a new request on this instance with a fresh buffer.
    ///
    /// Every per-request field is reset, the timeout and decoder provider are kept.
    pub fn wrap(&self, accumulator: ByteAccumulator) {
        let mut shared = self.shared.lock();
        shared.state = StreamState::default();
        shared.accumulator = Some(accumulator);
        shared.listener = None;
        self.flags.reset();
    }

    /// Closes the stream, dropping buffered bytes and the listener.
    ///
    /// Only the first call has an effect. A consumer blocked in a read wakes up with
    /// [`BodyError::Closed`].
    pub fn close(&self) {
        if self.flags.closed.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return;
        }

        let mut shared = self.shared.lock();
        shared.accumulator = None;
        shared.listener = None;
        shared.state.decode_error = None;
        self.condvar.notify_all();
    }

    /// Ends the current request, after this the instance may be wrapped again.
    pub fn recycle(&self) {
        if !self.is_closed() {
            self.close();
        }
    }
}

impl fmt::Debug for BodyInputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyInputStream")
            .field("closed", &self.is_closed())
            .field("received_length", &self.received_length())
            .field("timed_out", &self.is_timed_out())
            .field("needs_connection_close", &self.needs_connection_close())
            .finish_non_exhaustive()
    }
}

impl io::Read for &BodyInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(BodyInputStream::read(self, buf)?.unwrap_or(0))
    }
}

impl io::Read for BodyInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(BodyInputStream::read(self, buf)?.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io::Read;

    fn wrapped(content_length: PayloadSize) -> BodyInputStream {
        let stream = BodyInputStream::new();
        stream.wrap(ByteAccumulator::new());
        stream.set_content_length(content_length);
        stream
    }

    #[test]
    fn three_chunks_fill_declared_length() {
        let stream = wrapped(PayloadSize::Length(10));

        let mut progress = vec![];
        for chunk in [&b"abc"[..], b"defg", b"hij"] {
            stream.on_chunk(Bytes::copy_from_slice(chunk));
            progress.push((stream.received_length(), stream.is_finished()));
        }
        assert_eq!(progress, vec![(3, false), (7, false), (10, true)]);

        let mut buf = [0u8; 10];
        assert_eq!(stream.read(&mut buf).unwrap(), Some(10));
        assert_eq!(&buf, b"abcdefghij");
        assert_eq!(stream.read(&mut buf).unwrap(), None);
        assert_eq!(stream.read_byte().unwrap(), None);
    }

    #[test]
    fn no_body_is_finished_and_drops_chunks() {
        let stream = wrapped(PayloadSize::Empty);
        assert!(stream.is_finished());
        assert!(stream.is_ready());

        stream.on_chunk(Bytes::from_static(b"unexpected"));
        assert_eq!(stream.received_length(), 0);
        assert_eq!(stream.available().unwrap(), 0);

        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).unwrap(), None);
    }

    #[test]
    fn zero_length_read_does_not_wait() {
        let stream = wrapped(PayloadSize::Length(10));
        assert_eq!(stream.read(&mut []).unwrap(), Some(0));
    }

    #[test]
    fn read_line_splits_on_newline() {
        let stream = wrapped(PayloadSize::Length(12));
        stream.on_chunk(Bytes::from_static(b"first\nsecond"));

        let mut buf = [0u8; 32];
        assert_eq!(stream.read_line(&mut buf).unwrap(), Some(6));
        assert_eq!(&buf[..6], b"first\n");
        assert_eq!(stream.read_line(&mut buf).unwrap(), Some(6));
        assert_eq!(&buf[..6], b"second");
        assert_eq!(stream.read_line(&mut buf).unwrap(), None);
    }

    #[test]
    fn read_line_stops_when_buffer_is_full() {
        let stream = wrapped(PayloadSize::Length(6));
        stream.on_chunk(Bytes::from_static(b"abcdef"));

        let mut buf = [0u8; 4];
        assert_eq!(stream.read_line(&mut buf).unwrap(), Some(4));
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn skip_mark_reset_and_available() {
        let stream = wrapped(PayloadSize::Length(6));
        stream.on_chunk(Bytes::from_static(b"abc"));
        assert_eq!(stream.available().unwrap(), 3);

        // skip never waits for bytes that have not arrived
        assert_eq!(stream.skip(5).unwrap(), 3);
        assert_eq!(stream.available().unwrap(), 0);

        stream.on_chunk(Bytes::from_static(b"def"));
        stream.mark().unwrap();
        assert_eq!(stream.read_byte().unwrap(), Some(b'd'));
        stream.reset().unwrap();
        assert_eq!(stream.available().unwrap(), 3);
        assert_eq!(stream.read_byte().unwrap(), Some(b'd'));
    }

    #[test]
    fn operations_fail_after_close() {
        let stream = wrapped(PayloadSize::Length(3));
        stream.on_chunk(Bytes::from_static(b"abc"));
        stream.close();
        stream.close();

        assert!(stream.is_closed());
        assert!(stream.is_finished());
        assert!(matches!(stream.read(&mut [0u8; 1]), Err(BodyError::Closed)));
        assert!(matches!(stream.read(&mut []), Err(BodyError::Closed)));
        assert!(matches!(stream.read_byte(), Err(BodyError::Closed)));
        assert!(matches!(stream.available(), Err(BodyError::Closed)));
        assert!(matches!(stream.skip(1), Err(BodyError::Closed)));
        assert!(matches!(stream.mark(), Err(BodyError::Closed)));

        // mutation after close is ignored
        stream.on_chunk(Bytes::from_static(b"more"));
        assert_eq!(stream.received_length(), 3);
    }

    #[test]
    fn recycle_then_wrap_starts_fresh() {
        let stream = wrapped(PayloadSize::Length(3));
        stream.set_timeout_ms(250);
        stream.on_chunk(Bytes::from_static(b"abc"));
        stream.recycle();
        stream.recycle();

        stream.wrap(ByteAccumulator::new());
        assert!(!stream.is_closed());
        assert_eq!(stream.received_length(), 0);
        assert_eq!(stream.content_length(), PayloadSize::Empty);
        assert!(stream.decode_error().is_none());
        assert!(!stream.is_timed_out());
        assert!(!stream.needs_connection_close());
        assert_eq!(stream.available().unwrap(), 0);
        assert_eq!(stream.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn never_wrapped_stream_reads_as_empty() {
        let stream = BodyInputStream::new();
        assert_eq!(stream.available().unwrap(), 0);
        assert_eq!(stream.read(&mut [0u8; 4]).unwrap(), None);
    }

    #[test]
    fn std_read_to_end() {
        let stream = wrapped(PayloadSize::Length(11));
        stream.on_chunk(Bytes::from_static(b"hello "));
        stream.on_chunk(Bytes::from_static(b"world"));

        let mut body = String::new();
        (&stream).read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello world");
    }
}

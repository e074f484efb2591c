use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::protocol::{DecodeError, PayloadSize};

/// Flags both the network thread and the consumer thread check without the stream lock.
#[derive(Debug)]
pub(crate) struct StreamFlags {
    pub(crate) closed: AtomicBool,
    /// "data available" has not been dispatched yet for this request
    pub(crate) first_notification: AtomicBool,
    /// "all data read" has been dispatched for this request
    pub(crate) completion_notified: AtomicBool,
    pub(crate) timed_out: AtomicBool,
    pub(crate) needs_connection_close: AtomicBool,
    pub(crate) interrupted: AtomicBool,
    pub(crate) received_length: AtomicU64,
}

impl Default for StreamFlags {
    fn default() -> Self {
        Self {
            closed: AtomicBool::new(false),
            first_notification: AtomicBool::new(true),
            completion_notified: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            needs_connection_close: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            received_length: AtomicU64::new(0),
        }
    }
}

impl StreamFlags {
    pub(crate) fn reset(&self) {
        self.first_notification.store(true, Ordering::Release);
        self.completion_notified.store(false, Ordering::Release);
        self.timed_out.store(false, Ordering::Release);
        self.needs_connection_close.store(false, Ordering::Release);
        self.interrupted.store(false, Ordering::Release);
        self.received_length.store(0, Ordering::Release);
        self.closed.store(false, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn received_length(&self) -> u64 {
        self.received_length.load(Ordering::Acquire)
    }
}

/// What the stream knows about the completion of the current request body.
///
/// Lives behind the stream lock, the predicates combine it with [`StreamFlags`].
#[derive(Debug, Default)]
pub(crate) struct StreamState {
    pub(crate) content_length: PayloadSize,
    /// the transport reported the end of the body
    pub(crate) eof: bool,
    pub(crate) decode_error: Option<DecodeError>,
}

impl StreamState {
    /// No more bytes will ever become available for this body.
    pub(crate) fn is_finished(&self, flags: &StreamFlags) -> bool {
        if flags.is_closed() {
            return true;
        }

        self.content_length.is_satisfied_by(flags.received_length())
            || self.eof
            || self.decode_error.is_some()
            || flags.is_timed_out()
    }

    /// Something can be read without blocking, or there is no body at all.
    pub(crate) fn is_ready(&self, readable: usize) -> bool {
        self.content_length.is_empty() || readable > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_of(content_length: PayloadSize) -> StreamState {
        StreamState { content_length, ..StreamState::default() }
    }

    #[test]
    fn no_body_is_finished_and_ready() {
        let flags = StreamFlags::default();
        let state = StreamState::default();
        assert!(state.is_finished(&flags));
        assert!(state.is_ready(0));
    }

    #[test]
    fn finished_by_received_length() {
        let flags = StreamFlags::default();
        let state = state_of(PayloadSize::Length(10));
        assert!(!state.is_finished(&flags));
        assert!(!state.is_ready(0));

        flags.received_length.store(7, Ordering::Release);
        assert!(!state.is_finished(&flags));
        flags.received_length.store(10, Ordering::Release);
        assert!(state.is_finished(&flags));
        assert!(state.is_ready(1));
    }

    #[test]
    fn chunked_finished_by_eof() {
        let flags = StreamFlags::default();
        let mut state = state_of(PayloadSize::Chunked);
        flags.received_length.store(1 << 20, Ordering::Release);
        assert!(!state.is_finished(&flags));

        state.eof = true;
        assert!(state.is_finished(&flags));
    }

    #[test]
    fn finished_by_error_timeout_or_close() {
        let mut state = state_of(PayloadSize::Length(10));

        state.decode_error = Some(DecodeError::new("bad"));
        assert!(state.is_finished(&StreamFlags::default()));
        state.decode_error = None;

        let flags = StreamFlags::default();
        flags.timed_out.store(true, Ordering::Release);
        assert!(state.is_finished(&flags));

        let flags = StreamFlags::default();
        flags.closed.store(true, Ordering::Release);
        assert!(state.is_finished(&flags));
    }

    #[test]
    fn reset_restores_fresh_flags() {
        let flags = StreamFlags::default();
        flags.closed.store(true, Ordering::Release);
        flags.first_notification.store(false, Ordering::Release);
        flags.timed_out.store(true, Ordering::Release);
        flags.needs_connection_close.store(true, Ordering::Release);
        flags.received_length.store(42, Ordering::Release);

        flags.reset();
        assert!(!flags.is_closed());
        assert!(flags.first_notification.load(Ordering::Acquire));
        assert!(!flags.is_timed_out());
        assert!(!flags.needs_connection_close.load(Ordering::Acquire));
        assert_eq!(flags.received_length(), 0);
    }
}

use std::sync::atomic::Ordering;

use parking_lot::MutexGuard;
use tracing::warn;

use crate::body::BodyInputStream;
use crate::body::input_stream::Shared;
use crate::ensure;
use crate::protocol::BodyError;

impl BodyInputStream {
    /// Blocks the consumer until bytes are readable or the body is finished.
    ///
    /// Returns the stream lock so the caller reads from the same state it waited for.
    /// Several signals share one condition variable, so every wake-up re-checks
    /// the whole condition. With a timeout configured each wait is bounded by it,
    /// a chunk arriving restarts the clock.
    pub(crate) fn await_readable_or_finished(&self) -> Result<MutexGuard<'_, Shared>, BodyError> {
        let mut shared = self.shared.lock();
        let mut expired = false;

        loop {
            ensure!(!self.flags.is_closed(), BodyError::Closed);

            if self.flags.interrupted.swap(false, Ordering::AcqRel) {
                return Err(BodyError::Interrupted);
            }

            if let Some(decode_error) = &shared.state.decode_error {
                self.flags.needs_connection_close.store(true, Ordering::Release);
                return Err(decode_error.clone().into());
            }

            if shared.readable() > 0 || shared.state.is_finished(&self.flags) {
                return Ok(shared);
            }

            let timeout = shared.timeout;
            if expired {
                warn!(timeout = ?timeout, "await client data stream timeout");
                self.flags.timed_out.store(true, Ordering::Release);
                self.flags.needs_connection_close.store(true, Ordering::Release);
                return Err(BodyError::read_timeout(timeout));
            }

            if timeout.is_zero() {
                self.condvar.wait(&mut shared);
            } else {
                expired = self.condvar.wait_for(&mut shared, timeout).timed_out();
            }
        }
    }

    /// Wakes a consumer blocked in a read, which then fails with [`BodyError::Interrupted`].
    ///
    /// If nobody is waiting, the next blocking read fails instead.
    pub fn interrupt(&self) {
        self.flags.interrupted.store(true, Ordering::Release);
        let _shared = self.shared.lock();
        self.condvar.notify_all();
    }
}

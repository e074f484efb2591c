use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::error;

use crate::body::BodyInputStream;
use crate::protocol::BodyError;

pub type ListenerError = Box<dyn Error + Send + Sync>;

/// Push-style observer of a body stream, the alternative to blocking reads.
///
/// Callbacks run on the thread that delivered the triggering chunk, without the
/// stream lock held, so they may call back into the stream.
pub trait ReadListener: Send + Sync {
    /// The first chunk of the body arrived.
    fn on_data_available(&self) -> Result<(), ListenerError>;

    /// No more data will arrive for this body.
    fn on_all_data_read(&self) -> Result<(), ListenerError>;

    /// Decode failures and errors returned by the other two callbacks end up here.
    fn on_error(&self, error: &BodyError);
}

pub(crate) fn notify_data_available(listener: &dyn ReadListener) {
    if let Err(e) = listener.on_data_available() {
        notify_error(listener, &BodyError::listener(e));
    }
}

pub(crate) fn notify_all_data_read(listener: &dyn ReadListener) {
    if let Err(e) = listener.on_all_data_read() {
        notify_error(listener, &BodyError::listener(e));
    }
}

/// A panicking `on_error` must not take the network thread down with it.
pub(crate) fn notify_error(listener: &dyn ReadListener, error: &BodyError) {
    if panic::catch_unwind(AssertUnwindSafe(|| listener.on_error(error))).is_err() {
        error!(cause = %error, "read listener panicked in on_error");
    }
}

impl BodyInputStream {
    /// Registers `listener`, replacing the previous one.
    ///
    /// If the body is already finished, `on_data_available` and `on_all_data_read`
    /// fire before this returns.
    pub fn set_listener(&self, listener: Arc<dyn ReadListener>) {
        let finished = {
            let mut shared = self.shared.lock();
            if !self.flags.is_closed() {
                shared.listener = Some(Arc::clone(&listener));
            }
            shared.state.is_finished(&self.flags)
        };

        if finished {
            self.flags.first_notification.store(false, Ordering::Release);
            self.flags.completion_notified.store(true, Ordering::Release);
            notify_data_available(&*listener);
            notify_all_data_read(&*listener);
        }
    }

    pub fn has_listener(&self) -> bool {
        self.shared.lock().listener.is_some()
    }

    /// Fires the per-request notifications after a delivery, each at most once.
    pub(crate) fn dispatch_notifications(&self, listener: &dyn ReadListener, finished: bool) {
        if self.flags.first_notification.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            notify_data_available(listener);
        }

        if finished && !self.flags.completion_notified.swap(true, Ordering::AcqRel) {
            notify_all_data_read(listener);
        }
    }
}

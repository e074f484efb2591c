//! Blocking request body stream implementation.
//!
//! The network side receives body chunks out of band, on its own thread or task, while
//! application code wants to consume the body through a plain blocking byte stream.
//! [`BodyInputStream`] sits between the two.
//!
//! # Architecture
//!
//! - [`ByteAccumulator`]: the buffer of received but unread bytes, with mark/reset
//! - [`BodyInputStream`]: the stream itself, which splits into
//!   - the delivery side ([`BodyInputStream::on_chunk`], [`BodyInputStream::on_eof`])
//!     routing chunks into a [`BodyDecoder`] or the buffer
//!   - the blocking read side ([`BodyInputStream::read`] and friends), waiting on a
//!     condition variable until bytes arrive or the body is finished
//!   - the push side, a [`ReadListener`] notified of availability, completion and errors
//! - [`feed_body`]: drives the delivery side from an async stream of [`PayloadItem`]s
//! - [`Recyclable`]: the `wrap`/`recycle` contract for pooling one stream across requests
//!
//! # Completion
//!
//! A body is finished once no more bytes will ever arrive: nothing was declared, the
//! declared length was received, the transport reported the end, decoding failed, a read
//! timed out, or the stream was closed. Decode failures and read timeouts also mark the
//! connection for closing, see [`BodyInputStream::needs_connection_close`].
//!
//! [`PayloadItem`]: crate::protocol::PayloadItem

mod accumulator;
mod body_pump;
mod coordinator;
mod decoder;
mod feed;
mod input_stream;
mod listener;
mod recycle;
mod state;

pub use accumulator::ByteAccumulator;
pub use body_pump::feed_body;
pub use decoder::{BodyDecoder, DecoderProvider, DecoderSlot};
pub use input_stream::BodyInputStream;
pub use listener::{ListenerError, ReadListener};
pub use recycle::Recyclable;

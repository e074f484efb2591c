//! A blocking HTTP request body stream fed by an asynchronous network loop
//!
//! The network side of a server receives request body bytes piecemeal, whenever the
//! event loop gets them. Handlers written against a classic blocking byte stream want
//! `read`, `available`, `skip` and `mark`/`reset` instead. This crate bridges the two.
//!
//! # Features
//!
//! - Blocking reads with an optional inactivity timeout
//! - Readiness polling and push-style listener callbacks over the same state
//! - Pluggable body decoders (e.g. multipart), switchable while the body streams
//! - Known-length, chunked and absent bodies
//! - Decode failures and stalled clients flag the connection for closing
//! - Reuse of one stream instance across many requests
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use futures::channel::mpsc;
//! use micro_body::body::{feed_body, BodyInputStream, ByteAccumulator};
//! use micro_body::protocol::{ParseError, PayloadItem, PayloadSize};
//! use tracing::{error, info};
//!
//! # async fn serve(mut payload_stream: mpsc::Receiver<Result<PayloadItem, ParseError>>) {
//! let body = Arc::new(BodyInputStream::new());
//! body.wrap(ByteAccumulator::new());
//! body.set_content_length(PayloadSize::Length(1024));
//! body.set_timeout(Duration::from_secs(30));
//!
//! // the handler consumes the body on a blocking thread
//! let handler_body = Arc::clone(&body);
//! let handler = tokio::task::spawn_blocking(move || {
//!     let mut content = Vec::new();
//!     (&*handler_body).read_to_end(&mut content).map(|_| content)
//! });
//!
//! // the connection task keeps feeding chunks as they arrive
//! if let Err(e) = feed_body(&body, &mut payload_stream).await {
//!     error!(cause = %e, "failed to receive request body");
//! }
//!
//! match handler.await {
//!     Ok(Ok(content)) => info!(size = content.len(), "receiving request body"),
//!     Ok(Err(e)) => error!(cause = %e, "handler failed to read body"),
//!     Err(e) => error!(cause = %e, "handler panicked"),
//! }
//!
//! if body.needs_connection_close() {
//!     info!("body stream asks for connection close");
//! }
//! body.recycle();
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`body`]: the stream, its buffer, decoder and listener seams, and the async pump
//! - [`protocol`]: payload items, declared sizes and error types
//!
//! # Error Handling
//!
//! - [`protocol::BodyError`]: everything a blocking read can fail with
//! - [`protocol::DecodeError`]: malformed body content reported by a decoder
//! - [`protocol::ParseError`]: transport failures while streaming payload items
//!
//! Listener callbacks never propagate errors to the network side, they are redirected to
//! the listener's own `on_error`.

pub mod body;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

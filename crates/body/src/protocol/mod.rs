//! Protocol level types shared by the transport side and the body stream.
//!
//! - **Message Handling** ([`message`]): what the transport hands over
//!   - [`PayloadItem`]: a body chunk or the end of the body
//!   - [`PayloadSize`]: the declared size of the body
//!
//! - **Error Handling** ([`error`]):
//!   - [`BodyError`]: failures raised to the consumer of a body stream
//!   - [`DecodeError`]: malformed body content reported by a decoder
//!   - [`ParseError`]: transport failures while streaming payload items

mod message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod error;
pub use error::BodyError;
pub use error::DecodeError;
pub use error::ParseError;

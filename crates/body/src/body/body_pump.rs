use futures::{Stream, StreamExt};
use tracing::{error, info};

use crate::body::BodyInputStream;
use crate::protocol::{ParseError, PayloadItem};

/// Streams payload items from the transport into `body` until the end of the body.
///
/// This is the network side of a request: it runs on the connection task while the
/// handler reads `body` on a blocking thread. It keeps draining the transport even after
/// the consumer closed the stream, so the connection is left at a clean request boundary.
///
/// If the transport fails, or ends before the body does, `body` is closed so a blocked
/// reader wakes up, and the error is returned.
pub async fn feed_body<S>(body: &BodyInputStream, payload_stream: &mut S) -> Result<(), ParseError>
where
    S: Stream<Item = Result<PayloadItem, ParseError>> + Unpin,
{
    let mut skipped: usize = 0;

    loop {
        match payload_stream.next().await {
            Some(Ok(PayloadItem::Chunk(bytes))) => {
                if body.is_closed() {
                    skipped += bytes.len();
                }
                body.on_chunk(bytes);
            }

            Some(Ok(PayloadItem::Eof)) => {
                if skipped > 0 {
                    info!(size = skipped, "skip request body");
                }
                body.on_eof();
                return Ok(());
            }

            Some(Err(e)) => {
                error!(cause = %e, "failed to read data from body stream");
                body.close();
                return Err(e);
            }

            None => {
                error!("payload stream ended before body eof");
                body.close();
                return Err(ParseError::invalid_body("payload stream ended before body eof"));
            }
        }
    }
}

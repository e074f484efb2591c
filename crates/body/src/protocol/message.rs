use bytes::Bytes;

/// Represents an item handed over by the transport while a request body is streaming.
///
/// The transport produces either data chunks or signals the end of the body (EOF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of body data
    Chunk(Bytes),
    /// Marks the end of the body
    Eof,
}

/// The declared size of a request body.
///
/// - Known length: the body is complete once that many bytes were received
/// - Chunked: the length is unknown, the body is complete when the transport reports EOF
/// - Empty: no body is expected at all
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    #[default]
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn new_length(length: u64) -> Self {
        PayloadSize::Length(length)
    }

    #[inline]
    pub fn new_chunked() -> Self {
        PayloadSize::Chunked
    }

    #[inline]
    pub fn new_empty() -> Self {
        PayloadSize::Empty
    }

    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// Returns true once `received` bytes are enough to complete the payload.
    ///
    /// A chunked payload never completes by length alone.
    #[inline]
    pub fn is_satisfied_by(&self, received: u64) -> bool {
        match self {
            PayloadSize::Length(length) => received >= *length,
            PayloadSize::Chunked => false,
            PayloadSize::Empty => true,
        }
    }
}

/// Converts a raw content length, `-1` meaning no body, into a `PayloadSize`
impl From<i64> for PayloadSize {
    fn from(content_length: i64) -> Self {
        u64::try_from(content_length).map_or(PayloadSize::Empty, PayloadSize::Length)
    }
}

impl PayloadItem {
    /// Returns true if this item represents the end of the body
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

impl From<Bytes> for PayloadItem {
    fn from(bytes: Bytes) -> Self {
        PayloadItem::Chunk(bytes)
    }
}

//! Error types for GBX decoding

/// Errors that can occur while decoding a GBX file
///
/// Every error aborts the decoding session that produced it. Only failures inside
/// individual embedded archive entries are caught and recorded instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// File does not start with "GBX"
    #[error("invalid magic bytes at offset {offset:#x} (expected 'GBX')")]
    InvalidMagic { offset: usize },

    /// Container version older than 6
    #[error("unsupported GBX version {0} (minimum 6)")]
    UnsupportedGbxVersion(u16),

    /// A read ran past the end of the buffer
    #[error("out of data at offset {offset:#x}: need {need} bytes, {have} available")]
    OutOfData {
        offset: usize,
        need: usize,
        have: usize,
    },

    /// A boolean field held something other than 0 or 1
    #[error("invalid boolean value {value} at offset {offset:#x}")]
    InvalidBoolean { value: u32, offset: usize },

    /// Chunk id not present in the chunk registry
    #[error("unknown chunk {id:#010x} at offset {offset:#x}")]
    UnknownChunk { id: u32, offset: usize },

    /// Chunk version above what the chunk routine implements
    #[error("chunk {chunk_id:#010x}: unsupported version {version} at offset {offset:#x}")]
    UnsupportedVersion {
        chunk_id: u32,
        version: i64,
        offset: usize,
    },

    /// Skippable chunk without the "SKIP" marker
    #[error("chunk {chunk_id:#010x}: expected SKIP marker, found {marker:#010x} at offset {offset:#x}")]
    MalformedSkip {
        chunk_id: u32,
        marker: u32,
        offset: usize,
    },

    /// Lookback back-reference past the end of the string table
    #[error("lookback index {index} out of range ({len} strings stored) at offset {offset:#x}")]
    LookbackIndexOutOfRange { index: u32, len: usize, offset: usize },

    /// Lookback value naming a collection that is not in the static table
    #[error("unknown collection id {id} at offset {offset:#x}")]
    UnknownCollectionId { id: u32, offset: usize },

    /// Decompressed length differs from the declared length
    #[error("compressed block size mismatch: expected {expected} bytes, got {actual}")]
    CompressedSizeMismatch { expected: usize, actual: usize },

    /// Compressed stream is malformed
    #[error("corrupt {codec} data: {reason}")]
    CorruptCompressedData { codec: &'static str, reason: String },

    /// A chunk that annotates an earlier collection ran before that collection existed
    #[error("chunk {chunk_id:#010x} requires field '{field}' from an earlier chunk")]
    MissingField { chunk_id: u32, field: &'static str },

    /// A parsable skippable chunk consumed a different number of bytes than it declared
    #[error(
        "chunk {chunk_id:#010x} declared {declared} bytes but its reader consumed {consumed} (offset {offset:#x})"
    )]
    ChunkSizeMismatch {
        chunk_id: u32,
        declared: usize,
        consumed: usize,
        offset: usize,
    },

    /// Recognised data in a shape the decoder does not handle
    #[error("chunk {chunk_id:#010x}: {what} at offset {offset:#x}")]
    Unsupported {
        chunk_id: u32,
        what: String,
        offset: usize,
    },

    /// Node or folder nesting exceeded the configured limit
    #[error("nesting deeper than {limit} levels at offset {offset:#x}")]
    NestingTooDeep { limit: u32, offset: usize },

    /// Embedded archive blob is not a readable zip archive
    #[error("embedded archive at offset {offset:#x}: {reason}")]
    EmbeddedArchive { offset: usize, reason: String },
}

impl Error {
    /// Byte offset the error refers to, when known
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::InvalidMagic { offset }
            | Self::OutOfData { offset, .. }
            | Self::InvalidBoolean { offset, .. }
            | Self::UnknownChunk { offset, .. }
            | Self::UnsupportedVersion { offset, .. }
            | Self::MalformedSkip { offset, .. }
            | Self::LookbackIndexOutOfRange { offset, .. }
            | Self::UnknownCollectionId { offset, .. }
            | Self::ChunkSizeMismatch { offset, .. }
            | Self::Unsupported { offset, .. }
            | Self::NestingTooDeep { offset, .. }
            | Self::EmbeddedArchive { offset, .. } => Some(*offset),
            Self::UnsupportedGbxVersion(_)
            | Self::CompressedSizeMismatch { .. }
            | Self::CorruptCompressedData { .. }
            | Self::MissingField { .. } => None,
        }
    }

    /// Short stable name of the error kind, used in batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidMagic { .. } => "InvalidMagic",
            Self::UnsupportedGbxVersion(_) => "UnsupportedGbxVersion",
            Self::OutOfData { .. } => "OutOfData",
            Self::InvalidBoolean { .. } => "InvalidBoolean",
            Self::UnknownChunk { .. } => "UnknownChunk",
            Self::UnsupportedVersion { .. } => "UnsupportedVersion",
            Self::MalformedSkip { .. } => "MalformedSkip",
            Self::LookbackIndexOutOfRange { .. } => "LookbackIndexOutOfRange",
            Self::UnknownCollectionId { .. } => "UnknownCollectionId",
            Self::CompressedSizeMismatch { .. } => "CompressedSizeMismatch",
            Self::CorruptCompressedData { .. } => "CorruptCompressedData",
            Self::MissingField { .. } => "MissingField",
            Self::ChunkSizeMismatch { .. } => "ChunkSizeMismatch",
            Self::Unsupported { .. } => "Unsupported",
            Self::NestingTooDeep { .. } => "NestingTooDeep",
            Self::EmbeddedArchive { .. } => "EmbeddedArchive",
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_reported() {
        let err = Error::UnknownChunk {
            id: 0x0304_3099,
            offset: 0x40,
        };
        assert_eq!(err.offset(), Some(0x40));
        assert_eq!(err.kind(), "UnknownChunk");

        let err = Error::CompressedSizeMismatch {
            expected: 10,
            actual: 9,
        };
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_display() {
        let err = Error::UnknownChunk {
            id: 0x0304_3099,
            offset: 0x40,
        };
        assert_eq!(err.to_string(), "unknown chunk 0x03043099 at offset 0x40");
    }
}

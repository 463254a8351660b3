//! Block snapshot encoding with framing.
//!
//! Captured blocks are deep-copied into bytes so the worker shares no mutable
//! state with the submitter.
//!
//! Frame format: [magic: 4][length: u32][crc32: u32][payload: bytes]

use registrar_core::{BlockDefinition, Namespace};
use registrar_registry::Callback;
use thiserror::Error;

/// Leading bytes of every snapshot frame.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"RBLK";

const HEADER_LEN: usize = 12;

/// Errors raised while encoding or decoding a block snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// postcard refused to serialize the block.
    #[error("failed to encode block snapshot: {0}")]
    Encode(postcard::Error),
    /// postcard refused to deserialize the payload.
    #[error("failed to decode block snapshot: {0}")]
    Decode(postcard::Error),
    /// Fewer bytes than a frame header.
    #[error("snapshot too short: {len} bytes (minimum 12)")]
    TooShort {
        /// Bytes available.
        len: usize,
    },
    /// Frame does not start with [`SNAPSHOT_MAGIC`].
    #[error("snapshot magic mismatch")]
    BadMagic,
    /// Length prefix runs past the end of the buffer.
    #[error("incomplete snapshot: expected {expected} bytes, got {got}")]
    Incomplete {
        /// Bytes the header promised.
        expected: usize,
        /// Bytes available.
        got: usize,
    },
    /// Payload does not match its checksum.
    #[error("snapshot checksum mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum in the header.
        expected: u32,
        /// Checksum of the payload.
        actual: u32,
    },
}

/// Encode a block into a framed snapshot.
pub fn encode_block(block: &BlockDefinition) -> Result<Vec<u8>, SnapshotError> {
    let payload = postcard::to_allocvec(block).map_err(SnapshotError::Encode)?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(SNAPSHOT_MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// Decode a block from a framed snapshot.
pub fn decode_block(data: &[u8]) -> Result<BlockDefinition, SnapshotError> {
    if data.len() < HEADER_LEN {
        return Err(SnapshotError::TooShort { len: data.len() });
    }
    if &data[0..4] != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let length = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    let expected_crc = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);

    let end = HEADER_LEN.saturating_add(length);
    if data.len() < end {
        return Err(SnapshotError::Incomplete {
            expected: end,
            got: data.len(),
        });
    }

    let payload = &data[HEADER_LEN..end];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(SnapshotError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    postcard::from_bytes(payload).map_err(SnapshotError::Decode)
}

/// One pending block registration, captured at submission time.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    /// Framed snapshot of the block (see [`encode_block`]).
    pub serialized_block: Vec<u8>,
    /// Namespace to register the block under.
    pub namespace: Namespace,
    /// Custom serializer, if any.
    pub serialize: Option<Callback>,
    /// Custom deserializer, if any.
    pub deserialize: Option<Callback>,
}

impl CaptureRecord {
    /// Snapshot `block` together with its registration arguments.
    pub fn capture(
        block: &BlockDefinition,
        namespace: Namespace,
        serialize: Option<Callback>,
        deserialize: Option<Callback>,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            serialized_block: encode_block(block)?,
            namespace,
            serialize,
            deserialize,
        })
    }
}

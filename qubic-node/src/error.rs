use qubic_base::errors::{ByteEncodingError, QubicError};
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("requested tick {requested} is ahead of the node's current tick {current}")]
    FutureTick { requested: u32, current: u32 },

    #[error("malformed frame header: declared size {0} is smaller than the header itself")]
    MalformedFrame(usize),

    #[error("response ended before a frame of type {expected} arrived")]
    MissingResponse { expected: u8 },

    #[error("asset record of a different kind than requested")]
    UnexpectedAssetRecord,

    #[error("malformed response payload")]
    WireFormat(#[from] ByteEncodingError),

    #[error(transparent)]
    Crypto(#[from] QubicError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("deadline exceeded")]
    Timeout,

    #[error("previous request was cancelled mid-flight, the connection must be discarded")]
    Cancelled,

    #[error("peer source failed")]
    PeerSource(#[source] anyhow::Error),

    #[error("peer source returned no peers")]
    NoPeersAvailable,

    #[error("connection pool exhausted")]
    PoolExhausted,
}

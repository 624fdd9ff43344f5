
pub mod consts;
pub mod types;
pub mod utils;

use rand::Rng;

pub mod prelude {
    pub use crate::consts::*;
    pub use crate::types::assets::*;
    pub use crate::types::contracts::*;
    pub use crate::types::send_to_many::*;
    pub use crate::types::ticks::*;
    pub use crate::types::transactions::*;
    pub use crate::types::*;
    pub use crate::{Header, MessageType, HEADER_SIZE};
}

/// Size of the wire header in bytes.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MessageType {
    ExchangePublicPeers = 0,
    BroadcastComputors = 2,
    QuorumTickResponse = 3,
    BroadcastFutureTickData = 8,
    RequestComputors = 11,
    RequestQuorumTick = 14,
    RequestTickData = 16,
    BroadcastTransaction = 24,

    RequestCurrentTickInfo = 27,
    RespondCurrentTickInfo = 28,

    RequestTickTransactions = 29,

    RequestEntity = 31,
    RespondEntity = 32,

    EndResponse = 35,

    RequestContractFunction = 42,
    RespondContractFunction = 43,

    RequestAssets = 52,
    RespondAssets = 53,

    RequestTxStatus = 201,
    RespondTxStatus = 202,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::ExchangePublicPeers,
            2 => Self::BroadcastComputors,
            3 => Self::QuorumTickResponse,
            8 => Self::BroadcastFutureTickData,
            11 => Self::RequestComputors,
            14 => Self::RequestQuorumTick,
            16 => Self::RequestTickData,
            24 => Self::BroadcastTransaction,
            27 => Self::RequestCurrentTickInfo,
            28 => Self::RespondCurrentTickInfo,
            29 => Self::RequestTickTransactions,
            31 => Self::RequestEntity,
            32 => Self::RespondEntity,
            35 => Self::EndResponse,
            42 => Self::RequestContractFunction,
            43 => Self::RespondContractFunction,
            52 => Self::RequestAssets,
            53 => Self::RespondAssets,
            201 => Self::RequestTxStatus,
            202 => Self::RespondTxStatus,
            other => return Err(other),
        })
    }
}

/// Wire header: 24-bit little-endian total frame size (header included), one
/// raw type byte and the 4 byte dedup token.
///
/// The type byte is kept as `u8` because the node interleaves unsolicited
/// broadcast frames whose tags this crate does not model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Header {
    pub size: [u8; 3],
    pub packet_type: u8,
    pub dejavu: u32,
}

impl Header {
    pub fn new(size: usize, message_type: MessageType, randomize_dejavu: bool) -> Self {
        let mut new = Self {
            size: [0; 3],
            packet_type: message_type as u8,
            dejavu: 0,
        };
        new.set_size(size);
        if randomize_dejavu {
            new.randomize_dejavu();
        }

        new
    }

    pub fn get_size(&self) -> usize {
        (self.size[0] as usize) | (self.size[1] as usize) << 8 | (self.size[2] as usize) << 16
    }

    pub fn set_size(&mut self, size: usize) {
        self.size[0] = size as u8;
        self.size[1] = (size >> 8) as u8;
        self.size[2] = (size >> 16) as u8;
    }

    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::try_from(self.packet_type).ok()
    }

    pub fn is_type(&self, message_type: MessageType) -> bool {
        self.packet_type == message_type as u8
    }

    pub fn zero_dejavu(&mut self) {
        self.dejavu = 0;
    }

    /// Dedup tokens must be nonzero on everything but broadcasts; some peers
    /// drop zero-token requests.
    pub fn randomize_dejavu(&mut self) {
        let mut rng = rand::thread_rng();
        self.dejavu = rng.gen();
        while self.dejavu == 0 {
            self.dejavu = rng.gen();
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..3].copy_from_slice(&self.size);
        bytes[3] = self.packet_type;
        bytes[4..].copy_from_slice(&self.dejavu.to_le_bytes());

        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            size: [bytes[0], bytes[1], bytes[2]],
            packet_type: bytes[3],
            dejavu: u32::from_le_bytes(bytes[4..].try_into().unwrap()),
        }
    }
}

use qubic_base::{
    errors::ByteEncodingError, traits::FromBytes, QubicTxHash, Signature, H256,
};

use crate::{
    consts::{MAX_NUMBER_OF_CONTRACTS, NUMBER_OF_COMPUTORS, NUMBER_OF_TRANSACTIONS_PER_TICK},
    utils::{fixed_wire_encoding, read_wire_struct, set_message_type, set_return_type},
    MessageType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct GetCurrentTickInfo;
set_message_type!(GetCurrentTickInfo, MessageType::RequestCurrentTickInfo);
set_return_type!(GetCurrentTickInfo, CurrentTickInfo);
fixed_wire_encoding!(GetCurrentTickInfo);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct CurrentTickInfo {
    pub tick_duration: u16,
    pub epoch: u16,
    pub tick: u32,
    pub number_of_aligned_votes: u16,
    pub number_of_misaligned_votes: u16,
    pub initial_tick: u32,
}

set_message_type!(CurrentTickInfo, MessageType::RespondCurrentTickInfo);
fixed_wire_encoding!(CurrentTickInfo);

/// Wall-clock stamp carried by tick records; all fields little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct TickTime {
    pub millisecond: u16,
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct RequestTickData {
    pub tick: u32,
}

set_message_type!(RequestTickData, MessageType::RequestTickData);
set_return_type!(RequestTickData, TickData);
fixed_wire_encoding!(RequestTickData);

/// Full tick record as broadcast by computors. The union blob carries the
/// proposal/ballot variants and is kept raw.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct TickData {
    pub computor_index: u16,
    pub epoch: u16,
    pub tick: u32,

    pub time: TickTime,

    pub union_data: [u8; 256],
    pub timelock: [u8; 32],
    pub transaction_digests: [QubicTxHash; NUMBER_OF_TRANSACTIONS_PER_TICK],
    pub contract_fees: [i64; MAX_NUMBER_OF_CONTRACTS],

    pub signature: Signature,
}

set_message_type!(TickData, MessageType::BroadcastFutureTickData);
fixed_wire_encoding!(TickData);

impl TickData {
    /// Number of leading non-zero transaction digests; digests are packed
    /// from the front so this is the tick's transaction count.
    pub fn transaction_count(&self) -> usize {
        self.transaction_digests
            .iter()
            .take_while(|digest| digest.0 != [0; 32])
            .count()
    }
}

impl core::fmt::Debug for TickData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TickData")
            .field("computor_index", &self.computor_index)
            .field("epoch", &self.epoch)
            .field("tick", &self.tick)
            .field("time", &self.time)
            .field("transaction_count", &self.transaction_count())
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct QuorumTickData {
    pub tick: u32,
    pub vote_flags: [u8; (NUMBER_OF_COMPUTORS + 7) / 8],
}

set_message_type!(QuorumTickData, MessageType::RequestQuorumTick);

// hand-rolled: the repr(C) struct carries trailing alignment padding that
// must not reach the wire (the request payload is exactly 89 bytes)
impl qubic_base::traits::ToBytes for QuorumTickData {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = self.tick.to_le_bytes().to_vec();
        buffer.extend_from_slice(&self.vote_flags);

        buffer
    }
}

impl QuorumTickData {
    /// Request every computor's vote.
    pub fn all_votes(tick: u32) -> Self {
        Self {
            tick,
            vote_flags: [0; (NUMBER_OF_COMPUTORS + 7) / 8],
        }
    }
}

/// One computor's vote for a tick.
///
/// Current nodes append the transaction-body digest pair; older ones do not.
/// [`QuorumTickVote::from_bytes`] recognizes the short record by its length
/// and leaves the body digests zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct QuorumTickVote {
    pub computor_index: u16,
    pub epoch: u16,
    pub tick: u32,

    pub time: TickTime,

    pub prev_resource_testing_digest: u64,
    pub salted_resource_testing_digest: u64,

    pub prev_spectrum_digest: H256,
    pub prev_universe_digest: H256,
    pub prev_computer_digest: H256,
    pub salted_spectrum_digest: H256,
    pub salted_universe_digest: H256,
    pub salted_computer_digest: H256,

    pub tx_digest: H256,
    pub expected_next_tick_tx_digest: H256,

    pub prev_transaction_body_digest: H256,
    pub salted_transaction_body_digest: H256,

    pub signature: Signature,
}

set_message_type!(QuorumTickVote, MessageType::QuorumTickResponse);

impl QuorumTickVote {
    /// Byte length of the current vote record.
    pub const SIZE: usize = 416;
    /// Byte length of the record without the transaction-body digest pair.
    pub const SHORT_SIZE: usize = Self::SIZE - 64;

    const BODY_DIGESTS_OFFSET: usize = Self::SHORT_SIZE - 64;
}

impl FromBytes for QuorumTickVote {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() >= Self::SIZE {
            return read_wire_struct(data);
        }

        if data.len() == Self::SHORT_SIZE {
            // pad zeroed body digests in front of the signature
            let mut padded = [0u8; Self::SIZE];
            padded[..Self::BODY_DIGESTS_OFFSET].copy_from_slice(&data[..Self::BODY_DIGESTS_OFFSET]);
            padded[Self::BODY_DIGESTS_OFFSET + 64..]
                .copy_from_slice(&data[Self::BODY_DIGESTS_OFFSET..]);
            return read_wire_struct(&padded);
        }

        Err(ByteEncodingError::InvalidMinimumDataLength {
            expected_min: Self::SHORT_SIZE,
            found: data.len(),
        })
    }
}

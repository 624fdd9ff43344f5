use qubic_base::{
    errors::{ByteEncodingError, QubicError},
    traits::{FromBytes, ToBytes},
    QubicId,
};

use crate::{consts::QUTIL_ADDRESS, types::transactions::Transaction};

pub const SEND_MANY_MAX_TRANSFERS: usize = 25;
pub const SEND_MANY_INPUT_TYPE: u16 = 1;
pub const SEND_MANY_INPUT_SIZE: u16 = 1000;
/// Fee burned by the Qutil contract per send-many invocation.
pub const SEND_MANY_FEE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SendManyTransfer {
    pub destination: QubicId,
    pub amount: i64,
}

/// Input of the Qutil send-many contract procedure: 25 destination slots and
/// their amounts, unused slots zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SendManyPayload {
    destinations: [QubicId; SEND_MANY_MAX_TRANSFERS],
    amounts: [i64; SEND_MANY_MAX_TRANSFERS],
    filled: usize,
    total_amount: i64,
}

impl Default for SendManyPayload {
    fn default() -> Self {
        Self {
            destinations: [QubicId::default(); SEND_MANY_MAX_TRANSFERS],
            amounts: [0; SEND_MANY_MAX_TRANSFERS],
            filled: 0,
            total_amount: 0,
        }
    }
}

impl SendManyPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transfer(&mut self, transfer: SendManyTransfer) -> Result<(), QubicError> {
        if self.filled == SEND_MANY_MAX_TRANSFERS {
            return Err(QubicError::TransferLimitExceeded {
                max: SEND_MANY_MAX_TRANSFERS,
            });
        }

        self.destinations[self.filled] = transfer.destination;
        self.amounts[self.filled] = transfer.amount;
        self.filled += 1;
        self.total_amount += transfer.amount;

        Ok(())
    }

    pub fn add_transfers(&mut self, transfers: &[SendManyTransfer]) -> Result<(), QubicError> {
        if self.filled + transfers.len() > SEND_MANY_MAX_TRANSFERS {
            return Err(QubicError::TransferLimitExceeded {
                max: SEND_MANY_MAX_TRANSFERS,
            });
        }

        for transfer in transfers {
            self.add_transfer(*transfer)?;
        }

        Ok(())
    }

    /// Populated transfers, skipping zeroed destination slots.
    pub fn transfers(&self) -> Vec<SendManyTransfer> {
        self.destinations
            .iter()
            .zip(self.amounts.iter())
            .filter(|(destination, _)| !destination.is_zeroed())
            .map(|(destination, amount)| SendManyTransfer {
                destination: *destination,
                amount: *amount,
            })
            .collect()
    }

    /// Total amount the transaction must carry: all transfers plus the
    /// contract fee.
    pub fn total_amount(&self) -> i64 {
        self.total_amount + SEND_MANY_FEE
    }
}

impl ToBytes for SendManyPayload {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(SEND_MANY_INPUT_SIZE as usize);

        for destination in &self.destinations {
            buffer.extend_from_slice(&destination.0);
        }
        for amount in &self.amounts {
            buffer.extend_from_slice(&amount.to_le_bytes());
        }

        buffer
    }
}

impl FromBytes for SendManyPayload {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() < SEND_MANY_INPUT_SIZE as usize {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: SEND_MANY_INPUT_SIZE as usize,
                found: data.len(),
            });
        }

        let mut payload = Self::default();
        for (i, chunk) in data[..800].chunks_exact(32).enumerate() {
            payload.destinations[i] = QubicId(chunk.try_into().unwrap());
        }
        for (i, chunk) in data[800..1000].chunks_exact(8).enumerate() {
            payload.amounts[i] = i64::from_le_bytes(chunk.try_into().unwrap());
        }

        payload.filled = payload
            .destinations
            .iter()
            .filter(|destination| !destination.is_zeroed())
            .count();
        payload.total_amount = payload.amounts.iter().sum();

        Ok(payload)
    }
}

/// Send-many transaction addressed to the Qutil contract. The carried amount
/// covers all transfers plus the contract fee.
pub fn new_send_many_transaction(
    source: QubicId,
    tick: u32,
    payload: &SendManyPayload,
) -> Transaction {
    Transaction {
        source_public_key: source,
        destination_public_key: QUTIL_ADDRESS,
        amount: payload.total_amount(),
        tick,
        input_type: SEND_MANY_INPUT_TYPE,
        input: payload.to_bytes(),
        signature: Default::default(),
    }
}

use base64::Engine;
use qubic_base::{
    errors::{ByteEncodingError, QubicError},
    traits::{FromBytes, GetSigner, ToBytes},
    QubicId, QubicTxHash, Signature, Signer,
};
use tiny_keccak::{Hasher, IntoXof, KangarooTwelve, Xof};

use crate::{
    consts::{NUMBER_OF_TRANSACTIONS_PER_TICK, SIGNATURE_SIZE},
    utils::{fixed_wire_encoding, set_message_type, set_return_type},
    MessageType,
};

fn k12_32(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut kg = KangarooTwelve::new(b"");
    kg.update(data);
    kg.into_xof().squeeze(&mut out);

    out
}

/// Canonical transaction: fixed header fields, a variable input blob and the
/// trailing SchnorrQ signature.
///
/// The encoded layout is strictly little-endian with no padding; the unsigned
/// digest covers everything up to the signature and the transaction id is the
/// lower-case identity of the digest over the full encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub source_public_key: QubicId,
    pub destination_public_key: QubicId,
    pub amount: i64,
    pub tick: u32,
    pub input_type: u16,
    pub input: Vec<u8>,
    pub signature: Signature,
}

set_message_type!(Transaction, MessageType::BroadcastTransaction);

impl Transaction {
    /// Encoded length of the fixed fields before the input blob.
    pub const HEADER_LEN: usize = 80;

    /// Plain transfer with an empty input.
    pub fn transfer(
        source: QubicId,
        destination: QubicId,
        amount: i64,
        tick: u32,
    ) -> Transaction {
        Transaction {
            source_public_key: source,
            destination_public_key: destination,
            amount,
            tick,
            input_type: 0,
            input: Vec::new(),
            signature: Signature::default(),
        }
    }

    pub fn input_size(&self) -> u16 {
        self.input.len() as u16
    }

    /// Digest of the encoding without the signature; this is what gets
    /// signed.
    pub fn unsigned_digest(&self) -> [u8; 32] {
        let encoded = self.to_bytes();
        k12_32(&encoded[..encoded.len() - SIGNATURE_SIZE])
    }

    /// Digest of the full encoding, the transaction id preimage.
    pub fn digest(&self) -> QubicTxHash {
        QubicTxHash(k12_32(&self.to_bytes()))
    }

    /// Lower-case identity of the signed digest.
    pub fn tx_id(&self) -> String {
        self.digest().get_identity()
    }

    pub fn encode_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Signs the transaction in place. Fails when the signer's key does not
    /// match the source public key.
    pub fn sign(&mut self, signer: &Signer) -> Result<(), QubicError> {
        if signer.public_key() != self.source_public_key {
            return Err(QubicError::WrongSigningIdentity {
                expected: self.source_public_key,
            });
        }

        self.signature = signer.sign_digest(self.unsigned_digest())?;

        Ok(())
    }

    pub fn verify(&self) -> bool {
        self.source_public_key
            .verify_raw(self.unsigned_digest(), self.signature)
    }
}

impl GetSigner for Transaction {
    fn get_signer(&self) -> &QubicId {
        &self.source_public_key
    }
}

impl ToBytes for Transaction {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::HEADER_LEN + self.input.len() + SIGNATURE_SIZE);

        buffer.extend_from_slice(&self.source_public_key.0);
        buffer.extend_from_slice(&self.destination_public_key.0);
        buffer.extend_from_slice(&self.amount.to_le_bytes());
        buffer.extend_from_slice(&self.tick.to_le_bytes());
        buffer.extend_from_slice(&self.input_type.to_le_bytes());
        buffer.extend_from_slice(&self.input_size().to_le_bytes());
        buffer.extend_from_slice(&self.input);
        buffer.extend_from_slice(&self.signature.0);

        buffer
    }
}

impl FromBytes for Transaction {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() < Self::HEADER_LEN + SIGNATURE_SIZE {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: Self::HEADER_LEN + SIGNATURE_SIZE,
                found: data.len(),
            });
        }

        let source_public_key = QubicId::from_bytes(&data[..32]).unwrap();
        let destination_public_key = QubicId::from_bytes(&data[32..64]).unwrap();
        let amount = i64::from_le_bytes(data[64..72].try_into().unwrap());
        let tick = u32::from_le_bytes(data[72..76].try_into().unwrap());
        let input_type = u16::from_le_bytes(data[76..78].try_into().unwrap());
        let input_size = u16::from_le_bytes(data[78..80].try_into().unwrap()) as usize;

        if data.len() < Self::HEADER_LEN + input_size + SIGNATURE_SIZE {
            return Err(ByteEncodingError::InputSizeMismatch {
                declared: input_size,
                found: data.len() - Self::HEADER_LEN - SIGNATURE_SIZE,
            });
        }

        let input = data[Self::HEADER_LEN..Self::HEADER_LEN + input_size].to_vec();
        let signature = Signature::from_bytes(
            &data[Self::HEADER_LEN + input_size..Self::HEADER_LEN + input_size + SIGNATURE_SIZE],
        )
        .unwrap();

        Ok(Self {
            source_public_key,
            destination_public_key,
            amount,
            tick,
            input_type,
            input,
            signature,
        })
    }
}

impl From<&Transaction> for QubicTxHash {
    fn from(tx: &Transaction) -> Self {
        tx.digest()
    }
}

/// Per-index selection for tick transaction requests; a set bit means the
/// index is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct TransactionFlags(pub [u8; NUMBER_OF_TRANSACTIONS_PER_TICK / 8]);

impl TransactionFlags {
    /// Request every transaction of the tick.
    pub fn all() -> Self {
        Self([0; NUMBER_OF_TRANSACTIONS_PER_TICK / 8])
    }

    /// Request the first `count` transactions, rounded up to whole bytes.
    pub fn first(count: usize) -> Self {
        let mut flags = [u8::MAX; NUMBER_OF_TRANSACTIONS_PER_TICK / 8];
        let included_bytes = count.div_ceil(8).min(flags.len());

        for flag in flags[..included_bytes].iter_mut() {
            *flag = 0;
        }

        Self(flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct RequestedTickTransactions {
    pub tick: u32,
    pub flags: TransactionFlags,
}

set_message_type!(RequestedTickTransactions, MessageType::RequestTickTransactions);
fixed_wire_encoding!(RequestedTickTransactions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct RequestTxStatus {
    pub tick: u32,
}

set_message_type!(RequestTxStatus, MessageType::RequestTxStatus);
set_return_type!(RequestTxStatus, TransactionStatus);
fixed_wire_encoding!(RequestTxStatus);

/// Per-tick transaction status report: which of the tick's transactions
/// moved money, and their digests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionStatus {
    pub current_tick_of_node: u32,
    pub tick: u32,
    pub money_flew: Vec<bool>,
    pub digests: Vec<QubicTxHash>,
}

set_message_type!(TransactionStatus, MessageType::RespondTxStatus);

impl TransactionStatus {
    const BITFIELD_LEN: usize = NUMBER_OF_TRANSACTIONS_PER_TICK / 8;
    const FIXED_LEN: usize = 4 + 4 + 4 + Self::BITFIELD_LEN;

    pub fn transaction_count(&self) -> usize {
        self.digests.len()
    }

    /// Transaction ids in wire order.
    pub fn tx_ids(&self) -> Vec<String> {
        self.digests.iter().map(QubicTxHash::get_identity).collect()
    }
}

impl FromBytes for TransactionStatus {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() < Self::FIXED_LEN {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: Self::FIXED_LEN,
                found: data.len(),
            });
        }

        let current_tick_of_node = u32::from_le_bytes(data[..4].try_into().unwrap());
        let tick = u32::from_le_bytes(data[4..8].try_into().unwrap());
        let tx_count = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        let bitfield = &data[12..Self::FIXED_LEN];

        let digests_bytes = &data[Self::FIXED_LEN..];
        if digests_bytes.len() < tx_count * 32 {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: Self::FIXED_LEN + tx_count * 32,
                found: data.len(),
            });
        }

        let money_flew = (0..tx_count)
            .map(|i| bitfield[i / 8] >> (i % 8) & 1 == 1)
            .collect();
        let digests = digests_bytes[..tx_count * 32]
            .chunks_exact(32)
            .map(|chunk| QubicTxHash(chunk.try_into().unwrap()))
            .collect();

        Ok(Self {
            current_tick_of_node,
            tick,
            money_flew,
            digests,
        })
    }
}

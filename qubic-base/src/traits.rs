use crate::{errors::ByteEncodingError, QubicId, QubicTxHash, Signature};

/// Borrow the raw memory of a `repr(C)` value as a byte slice.
///
/// Only sound for types without padding bytes; every wire struct in this
/// workspace is laid out that way.
pub trait AsByteEncoded
where
    Self: Sized,
{
    fn encode_as_bytes(&self) -> &[u8] {
        unsafe {
            core::slice::from_raw_parts(
                (self as *const Self) as *const u8,
                core::mem::size_of::<Self>(),
            )
        }
    }
}

impl<T: Sized> AsByteEncoded for T {}

pub trait ToBytes {
    fn to_bytes(&self) -> Vec<u8>;
}

pub trait FromBytes
where
    Self: Sized,
{
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError>;
}

/// Identifies the public key a signed structure must verify against.
pub trait GetSigner {
    fn get_signer(&self) -> &QubicId;
}

impl ToBytes for QubicId {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl ToBytes for QubicTxHash {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl ToBytes for Signature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl FromBytes for QubicId {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() != 32 {
            return Err(ByteEncodingError::InvalidDataLength {
                expected: 32,
                found: data.len(),
            });
        }

        Ok(Self(data.try_into().unwrap()))
    }
}

impl FromBytes for QubicTxHash {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() != 32 {
            return Err(ByteEncodingError::InvalidDataLength {
                expected: 32,
                found: data.len(),
            });
        }

        Ok(Self(data.try_into().unwrap()))
    }
}

impl FromBytes for Signature {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() != 64 {
            return Err(ByteEncodingError::InvalidDataLength {
                expected: 64,
                found: data.len(),
            });
        }

        let mut sig = [0u8; 64];
        sig.copy_from_slice(data);
        Ok(Self(sig))
    }
}

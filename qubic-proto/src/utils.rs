use core::ptr::read_unaligned;

use qubic_base::errors::ByteEncodingError;

use crate::MessageType;

pub trait QubicRequest {
    fn get_message_type() -> MessageType;
}

pub trait QubicReturnType {
    type ReturnType;
}

/// Reads a `repr(C)` wire struct from the front of a payload buffer.
///
/// The caller guarantees `T` is a plain-old-data wire struct without padding
/// bytes; the read is unaligned so the buffer may start anywhere.
pub fn read_wire_struct<T: Copy>(data: &[u8]) -> Result<T, ByteEncodingError> {
    if data.len() < core::mem::size_of::<T>() {
        return Err(ByteEncodingError::InvalidMinimumDataLength {
            expected_min: core::mem::size_of::<T>(),
            found: data.len(),
        });
    }

    Ok(unsafe { read_unaligned(data.as_ptr() as *const T) })
}

macro_rules! set_message_type {
    ($impl: ident, $message_type: expr) => {
        impl $crate::utils::QubicRequest for $impl {
            fn get_message_type() -> $crate::MessageType {
                $message_type
            }
        }
    };
}

macro_rules! set_return_type {
    ($impl: ident, $return_type: ty) => {
        impl $crate::utils::QubicReturnType for $impl {
            type ReturnType = $return_type;
        }
    };
}

macro_rules! fixed_wire_encoding {
    ($impl: ident) => {
        impl qubic_base::traits::ToBytes for $impl {
            fn to_bytes(&self) -> Vec<u8> {
                use qubic_base::traits::AsByteEncoded;

                self.encode_as_bytes().to_vec()
            }
        }

        impl qubic_base::traits::FromBytes for $impl {
            fn from_bytes(
                data: &[u8],
            ) -> Result<Self, qubic_base::errors::ByteEncodingError> {
                $crate::utils::read_wire_struct(data)
            }
        }
    };
}

pub(crate) use fixed_wire_encoding;
pub(crate) use set_message_type;
pub(crate) use set_return_type;

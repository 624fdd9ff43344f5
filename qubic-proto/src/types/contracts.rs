use qubic_base::traits::ToBytes;

use crate::{
    utils::{set_message_type, set_return_type},
    MessageType,
};

/// Fixed prefix of a contract function call; the function input follows it
/// verbatim on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct RequestContractFunction {
    pub contract_index: u32,
    pub input_type: u16,
    pub input_size: u16,
}

set_message_type!(RequestContractFunction, MessageType::RequestContractFunction);
set_return_type!(RequestContractFunction, ContractFunctionData);

/// A full contract-function call: the 8 byte prefix plus the input blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractFunctionCall {
    pub function: RequestContractFunction,
    pub input: Vec<u8>,
}

impl ContractFunctionCall {
    pub fn new(contract_index: u32, input_type: u16, input: Vec<u8>) -> Self {
        Self {
            function: RequestContractFunction {
                contract_index,
                input_type,
                input_size: input.len() as u16,
            },
            input,
        }
    }
}

set_message_type!(ContractFunctionCall, MessageType::RequestContractFunction);
set_return_type!(ContractFunctionCall, ContractFunctionData);

impl ToBytes for ContractFunctionCall {
    fn to_bytes(&self) -> Vec<u8> {
        use qubic_base::traits::AsByteEncoded;

        let mut buffer = self.function.encode_as_bytes().to_vec();
        buffer.extend_from_slice(&self.input);

        buffer
    }
}

/// Raw output of a contract function; layout is contract specific.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContractFunctionData {
    pub data: Vec<u8>,
}

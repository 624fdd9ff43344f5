pub mod assets;
pub mod contracts;
pub mod send_to_many;
pub mod ticks;
pub mod transactions;

use core::net::Ipv4Addr;

use qubic_base::{
    errors::ByteEncodingError,
    traits::{FromBytes, ToBytes},
    QubicId, Signature,
};

use crate::{
    consts::{NUMBER_OF_COMPUTORS, NUMBER_OF_EXCHANGED_PEERS, SPECTRUM_DEPTH},
    utils::{fixed_wire_encoding, set_message_type, set_return_type, QubicRequest},
    Header, MessageType, HEADER_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct RequestEntity {
    pub public_key: QubicId,
}

set_message_type!(RequestEntity, MessageType::RequestEntity);
set_return_type!(RequestEntity, RespondedEntity);
fixed_wire_encoding!(RequestEntity);

/// Spectrum record of one entity. All amounts are little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Entity {
    pub public_key: QubicId,
    pub incoming_amount: i64,
    pub outgoing_amount: i64,
    pub number_of_incoming_transfers: u32,
    pub number_of_outgoing_transfers: u32,
    pub latest_incoming_transfer_tick: u32,
    pub latest_outgoing_transfer_tick: u32,
}

impl Entity {
    pub fn balance(&self) -> i64 {
        self.incoming_amount - self.outgoing_amount
    }
}

/// Balance response: the entity record plus its position in the spectrum and
/// the Merkle siblings authenticating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct RespondedEntity {
    pub entity: Entity,
    pub tick: u32,
    pub spectrum_index: i32,
    pub siblings: [QubicId; SPECTRUM_DEPTH],
}

set_message_type!(RespondedEntity, MessageType::RespondEntity);
fixed_wire_encoding!(RespondedEntity);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct RequestComputors;

set_message_type!(RequestComputors, MessageType::RequestComputors);
set_return_type!(RequestComputors, Computors);
fixed_wire_encoding!(RequestComputors);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Computors {
    pub epoch: u16,
    pub public_key: [QubicId; NUMBER_OF_COMPUTORS],
    pub signature: Signature,
}

set_message_type!(Computors, MessageType::BroadcastComputors);
fixed_wire_encoding!(Computors);

/// Greeting frame: four peer addresses, zero entries padded out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct ExchangePublicPeers {
    pub peers: [Ipv4Addr; NUMBER_OF_EXCHANGED_PEERS],
}

impl Default for ExchangePublicPeers {
    fn default() -> Self {
        Self {
            peers: [Ipv4Addr::new(0, 0, 0, 0); NUMBER_OF_EXCHANGED_PEERS],
        }
    }
}

impl ExchangePublicPeers {
    /// Printable addresses, skipping the zero padding entries.
    pub fn nonzero_peers(&self) -> Vec<String> {
        self.peers
            .iter()
            .filter(|ip| !ip.is_unspecified())
            .map(|ip| ip.to_string())
            .collect()
    }
}

set_message_type!(ExchangePublicPeers, MessageType::ExchangePublicPeers);

impl ToBytes for ExchangePublicPeers {
    fn to_bytes(&self) -> Vec<u8> {
        self.peers.iter().flat_map(|ip| ip.octets()).collect()
    }
}

impl FromBytes for ExchangePublicPeers {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() < 16 {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: 16,
                found: data.len(),
            });
        }

        let mut peers = [Ipv4Addr::new(0, 0, 0, 0); NUMBER_OF_EXCHANGED_PEERS];
        for (i, peer) in peers.iter_mut().enumerate() {
            let quad: [u8; 4] = data[i * 4..(i + 1) * 4].try_into().unwrap();
            *peer = Ipv4Addr::from(quad);
        }

        Ok(Self { peers })
    }
}

/// A full outgoing frame: header plus typed payload.
#[derive(Debug, Clone)]
#[repr(C)]
pub struct Packet<T> {
    header: Header,
    pub data: T,
}

impl<T: QubicRequest + ToBytes> Packet<T> {
    pub fn new(data: T, randomize_dejavu: bool) -> Packet<T> {
        Self {
            header: Header::new(
                HEADER_SIZE + data.to_bytes().len(),
                T::get_message_type(),
                randomize_dejavu,
            ),
            data,
        }
    }

    pub fn header(&self) -> Header {
        self.header
    }
}

impl<T: ToBytes> ToBytes for Packet<T> {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = self.header.to_bytes().to_vec();

        buffer.extend(self.data.to_bytes());

        buffer
    }
}

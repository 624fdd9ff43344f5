use core::fmt::{Debug, Display};
use core::str::FromStr;

use qubic_base::{
    errors::{ByteEncodingError, QubicError},
    traits::FromBytes,
    QubicId,
};

use crate::{
    consts::QX_ADDRESS,
    utils::{fixed_wire_encoding, read_wire_struct, set_message_type, set_return_type},
    MessageType,
};

use super::transactions::Transaction;

pub const QX_TRANSFER_INPUT_TYPE: u16 = 2;

/// Asset names are up to 7 ASCII characters, zero padded to 8 bytes on the
/// wire.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetName(pub [u8; 8]);

impl FromStr for AssetName {
    type Err = QubicError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.len() > 7 || !name.is_ascii() {
            return Err(QubicError::InvalidAssetName { max: 7 });
        }

        let mut bytes = [0u8; 8];
        bytes[..name.len()].copy_from_slice(name.as_bytes());

        Ok(Self(bytes))
    }
}

impl Display for AssetName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in self.0 {
            if byte != 0 {
                write!(f, "{}", char::from(byte))?;
            }
        }

        Ok(())
    }
}

impl Debug for AssetName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self}")
    }
}

pub const ASSET_TYPE_EMPTY: u8 = 0;
pub const ASSET_TYPE_ISSUANCE: u8 = 1;
pub const ASSET_TYPE_OWNERSHIP: u8 = 2;
pub const ASSET_TYPE_POSSESSION: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetIssuanceData {
    pub public_key: QubicId,
    pub asset_type: u8,
    pub name: [u8; 7],
    pub number_of_decimal_places: i8,
    pub unit_of_measurement: [u8; 7],
}

impl AssetIssuanceData {
    pub fn name_string(&self) -> String {
        self.name
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetOwnershipData {
    pub public_key: QubicId,
    pub asset_type: u8,
    pub padding: u8,
    pub managing_contract_index: u16,
    pub issuance_index: u32,
    pub number_of_units: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetPossessionData {
    pub public_key: QubicId,
    pub asset_type: u8,
    pub padding: u8,
    pub managing_contract_index: u16,
    pub ownership_index: u32,
    pub number_of_units: i64,
}

/// Universe records as returned by the assets endpoint: a 48 byte asset body
/// followed by the reporting tick and the record's universe index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetIssuance {
    pub asset: AssetIssuanceData,
    pub tick: u32,
    pub universe_index: u32,
}

fixed_wire_encoding!(AssetIssuance);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetOwnership {
    pub asset: AssetOwnershipData,
    pub tick: u32,
    pub universe_index: u32,
}

fixed_wire_encoding!(AssetOwnership);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetPossession {
    pub asset: AssetPossessionData,
    pub tick: u32,
    pub universe_index: u32,
}

fixed_wire_encoding!(AssetPossession);

/// One decoded assets-response record; the discriminant is the asset type
/// byte at offset 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRecord {
    Issuance(AssetIssuance),
    Ownership(AssetOwnership),
    Possession(AssetPossession),
}

impl AssetRecord {
    /// Encoded length of every record variant.
    pub const SIZE: usize = 56;

    pub fn tick(&self) -> u32 {
        match self {
            Self::Issuance(record) => record.tick,
            Self::Ownership(record) => record.tick,
            Self::Possession(record) => record.tick,
        }
    }

    pub fn universe_index(&self) -> u32 {
        match self {
            Self::Issuance(record) => record.universe_index,
            Self::Ownership(record) => record.universe_index,
            Self::Possession(record) => record.universe_index,
        }
    }
}

impl FromBytes for AssetRecord {
    fn from_bytes(data: &[u8]) -> Result<Self, ByteEncodingError> {
        if data.len() < Self::SIZE {
            return Err(ByteEncodingError::InvalidMinimumDataLength {
                expected_min: Self::SIZE,
                found: data.len(),
            });
        }

        match data[32] {
            ASSET_TYPE_ISSUANCE => Ok(Self::Issuance(read_wire_struct(data)?)),
            ASSET_TYPE_OWNERSHIP => Ok(Self::Ownership(read_wire_struct(data)?)),
            ASSET_TYPE_POSSESSION => Ok(Self::Possession(read_wire_struct(data)?)),
            other => Err(ByteEncodingError::UnrecognizedTypeTag { found: other }),
        }
    }
}

pub const REQUEST_TYPE_ISSUANCE_RECORDS: u16 = 0;
pub const REQUEST_TYPE_OWNERSHIP_RECORDS: u16 = 1;
pub const REQUEST_TYPE_POSSESSION_RECORDS: u16 = 2;
pub const REQUEST_TYPE_BY_UNIVERSE_INDEX: u16 = 3;

pub const ANY_ISSUER: u16 = 0b10;
pub const ANY_ASSET_NAME: u16 = 0b100;
pub const ANY_OWNER: u16 = 0b1000;
pub const ANY_OWNERSHIP_MANAGING_CONTRACT: u16 = 0b10000;
pub const ANY_POSSESSOR: u16 = 0b100000;
pub const ANY_POSSESSION_MANAGING_CONTRACT: u16 = 0b1000000;

/// Universe-index request: one concrete record by its universe slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct RequestAssetsByUniverseIndex {
    pub request_type: u16,
    pub flags: u16,
    pub universe_index: u32,
    pub padding: [u8; 104],
}

set_message_type!(RequestAssetsByUniverseIndex, MessageType::RequestAssets);
set_return_type!(RequestAssetsByUniverseIndex, AssetRecord);
fixed_wire_encoding!(RequestAssetsByUniverseIndex);

impl RequestAssetsByUniverseIndex {
    pub fn new(universe_index: u32) -> Self {
        Self {
            request_type: REQUEST_TYPE_BY_UNIVERSE_INDEX,
            flags: 0,
            universe_index,
            padding: [0; 104],
        }
    }
}

/// Filter request: issuance, ownership or possession records matched by the
/// populated fields; the `ANY_*` flag bits wildcard the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct RequestAssetsByFilter {
    pub request_type: u16,
    pub flags: u16,
    pub ownership_managing_contract: u16,
    pub possession_managing_contract: u16,
    pub issuer: QubicId,
    pub asset_name: AssetName,
    pub owner: QubicId,
    pub possessor: QubicId,
}

set_message_type!(RequestAssetsByFilter, MessageType::RequestAssets);
set_return_type!(RequestAssetsByFilter, AssetRecord);
fixed_wire_encoding!(RequestAssetsByFilter);

impl RequestAssetsByFilter {
    /// Issuance records. Absent issuer or name wildcard the field.
    pub fn issuances(issuer: Option<QubicId>, asset_name: Option<AssetName>) -> Self {
        let mut flags = 0;
        if issuer.is_none() {
            flags |= ANY_ISSUER;
        }
        if asset_name.is_none() {
            flags |= ANY_ASSET_NAME;
        }

        Self {
            request_type: REQUEST_TYPE_ISSUANCE_RECORDS,
            flags,
            ownership_managing_contract: 0,
            possession_managing_contract: 0,
            issuer: issuer.unwrap_or_default(),
            asset_name: asset_name.unwrap_or_default(),
            owner: QubicId::default(),
            possessor: QubicId::default(),
        }
    }

    /// Ownership records of one asset. The issuing identity is exact (the
    /// zero id for contract-issued assets); owner and managing contract are
    /// wildcarded unless given.
    pub fn ownerships(
        issuer: QubicId,
        asset_name: AssetName,
        owner: Option<QubicId>,
        ownership_managing_contract: u16,
    ) -> Self {
        let mut flags = ANY_OWNER
            | ANY_OWNERSHIP_MANAGING_CONTRACT
            | ANY_POSSESSOR
            | ANY_POSSESSION_MANAGING_CONTRACT;
        if owner.is_some() {
            flags &= !ANY_OWNER;
        }
        if ownership_managing_contract != 0 {
            flags &= !ANY_OWNERSHIP_MANAGING_CONTRACT;
        }

        Self {
            request_type: REQUEST_TYPE_OWNERSHIP_RECORDS,
            flags,
            ownership_managing_contract,
            possession_managing_contract: 0,
            issuer,
            asset_name,
            owner: owner.unwrap_or_default(),
            possessor: QubicId::default(),
        }
    }

    /// Possession records of one asset, analogous to [`Self::ownerships`].
    pub fn possessions(
        issuer: QubicId,
        asset_name: AssetName,
        owner: Option<QubicId>,
        possessor: Option<QubicId>,
        ownership_managing_contract: u16,
        possession_managing_contract: u16,
    ) -> Self {
        let mut flags = ANY_OWNER
            | ANY_OWNERSHIP_MANAGING_CONTRACT
            | ANY_POSSESSOR
            | ANY_POSSESSION_MANAGING_CONTRACT;
        if owner.is_some() {
            flags &= !ANY_OWNER;
        }
        if ownership_managing_contract != 0 {
            flags &= !ANY_OWNERSHIP_MANAGING_CONTRACT;
        }
        if possessor.is_some() {
            flags &= !ANY_POSSESSOR;
        }
        if possession_managing_contract != 0 {
            flags &= !ANY_POSSESSION_MANAGING_CONTRACT;
        }

        Self {
            request_type: REQUEST_TYPE_POSSESSION_RECORDS,
            flags,
            ownership_managing_contract,
            possession_managing_contract,
            issuer,
            asset_name,
            owner: owner.unwrap_or_default(),
            possessor: possessor.unwrap_or_default(),
        }
    }
}

/// QX share transfer input: `issuer || new owner || asset name || units`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct AssetTransferPayload {
    pub issuer: QubicId,
    pub new_owner_and_possessor: QubicId,
    pub asset_name: AssetName,
    pub number_of_units: i64,
}

fixed_wire_encoding!(AssetTransferPayload);

impl AssetTransferPayload {
    pub const INPUT_SIZE: usize = 80;

    pub fn new(
        asset_name: AssetName,
        issuer: QubicId,
        new_owner_and_possessor: QubicId,
        number_of_units: i64,
    ) -> Self {
        Self {
            issuer,
            new_owner_and_possessor,
            asset_name,
            number_of_units,
        }
    }
}

/// QX asset transfer addressed to the QX contract; the fee is burned by the
/// contract on execution.
pub fn new_asset_transfer_transaction(
    source: QubicId,
    tick: u32,
    transfer_fee: i64,
    payload: AssetTransferPayload,
) -> Transaction {
    use qubic_base::traits::ToBytes;

    Transaction {
        source_public_key: source,
        destination_public_key: QX_ADDRESS,
        amount: transfer_fee,
        tick,
        input_type: QX_TRANSFER_INPUT_TYPE,
        input: payload.to_bytes(),
        signature: Default::default(),
    }
}

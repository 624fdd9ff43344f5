#[cfg(test)]
mod tests;
mod impls;
pub mod errors;
pub mod signer;
pub mod traits;

#[cfg(feature = "serde")]
mod serde_impl;

pub use ethereum_types::{H256, H512, U256};
pub use signer::Signer;

/// 64 byte SchnorrQ signature type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Default for Signature {
    fn default() -> Self {
        Self([0; 64])
    }
}

impl Signature {
    pub fn is_zeroed(&self) -> bool {
        self.0 == [0; 64]
    }
}

/// Represents a Qubic ID containing only the decoded public key
///
/// The display form is the 60 character upper-case identity; the last four
/// characters carry an 18-bit KangarooTwelve checksum over the key.
///
/// # Initialization
/// ```
/// use core::str::FromStr;
/// use qubic_base::QubicId;
///
/// let id_str = QubicId::from_str("BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK").unwrap(); // fails if ID is not valid
/// let id_public_key = QubicId([31, 89, 13, 3, 230, 19, 189, 222, 211, 139, 76, 8, 32, 172, 68, 97, 95, 145, 175, 18, 67, 89, 128, 179, 237, 227, 192, 140, 49, 90, 37, 68]);
///
/// assert_eq!(id_str.get_identity(), id_public_key.get_identity());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QubicId(pub [u8; 32]);

/// Represents a Qubic wallet containing private key, subseed and public key of the corresponding wallet
///
/// # Initialization
/// ```
/// use qubic_base::QubicWallet;
///
/// let wallet = QubicWallet::from_seed("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
///
/// assert_eq!(wallet.get_identity(), "BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK");
/// ```
///
/// ## Signing
///
/// ```
/// use qubic_base::QubicWallet;
///
/// let wallet = QubicWallet::from_seed("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
///
/// let digest = [0u8; 32];
/// let signature = wallet.sign_raw(digest);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QubicWallet {
    private_key: [u8; 32],
    subseed: [u8; 32],
    pub public_key: QubicId,
}

/// 32 byte transaction digest; displays as the lower-case identity variant
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QubicTxHash(pub [u8; 32]);

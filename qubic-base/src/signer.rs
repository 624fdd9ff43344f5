use crate::{
    errors::QubicError,
    impls::{schnorrq_sign, schnorrq_verify},
    QubicId, QubicWallet, Signature,
};

/// Signature function contract: `(subseed, public_key, message_digest)` to a
/// 64 byte SchnorrQ signature.
pub type SignFn = fn(&[u8; 32], &[u8; 32], &[u8; 32]) -> Result<Signature, QubicError>;

fn default_sign(
    subseed: &[u8; 32],
    public_key: &[u8; 32],
    message_digest: &[u8; 32],
) -> Result<Signature, QubicError> {
    Ok(schnorrq_sign(subseed, public_key, message_digest))
}

/// Binds signing key material to a signature function.
///
/// The built-in SchnorrQ implementation is used unless an external function
/// is supplied, which keeps hardware or remote signers pluggable.
///
/// ```
/// use qubic_base::Signer;
///
/// let signer = Signer::from_seed("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
/// let signature = signer.sign_digest([0u8; 32]).unwrap();
///
/// assert!(signer.public_key().verify_raw([0u8; 32], signature));
/// ```
#[derive(Clone, Copy)]
pub struct Signer {
    subseed: [u8; 32],
    public_key: QubicId,
    sign_fn: SignFn,
}

impl Signer {
    pub fn from_seed(seed: &str) -> Result<Self, QubicError> {
        Ok(Self::from_wallet(&QubicWallet::from_seed(seed)?))
    }

    pub fn from_wallet(wallet: &QubicWallet) -> Self {
        Self {
            subseed: *wallet.subseed(),
            public_key: wallet.public_key,
            sign_fn: default_sign,
        }
    }

    /// Replaces the built-in signature function.
    pub fn with_sign_fn(mut self, sign_fn: SignFn) -> Self {
        self.sign_fn = sign_fn;
        self
    }

    pub fn public_key(&self) -> QubicId {
        self.public_key
    }

    pub fn sign_digest(&self, message_digest: [u8; 32]) -> Result<Signature, QubicError> {
        (self.sign_fn)(&self.subseed, &self.public_key.0, &message_digest)
    }

    /// Checks a signature produced by this signer's key.
    pub fn verify_digest(&self, message_digest: [u8; 32], signature: &Signature) -> bool {
        schnorrq_verify(&self.public_key.0, &message_digest, signature)
    }
}

impl core::fmt::Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

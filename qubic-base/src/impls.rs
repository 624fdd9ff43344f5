#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{_addcarry_u64, _subborrow_u64};

use core::{
    fmt::{Debug, Display},
    str::FromStr,
};

use base64::Engine;
use four_q::{
    consts::{CURVE_ORDER_0, CURVE_ORDER_1, CURVE_ORDER_2, CURVE_ORDER_3, MONTGOMERY_R_PRIME, ONE},
    ops::{decode, ecc_mul_double, ecc_mul_fixed, encode, montgomery_multiply_mod_order},
    types::PointAffine,
};
use tiny_keccak::{Hasher, IntoXof, KangarooTwelve, Xof};

use crate::{errors::QubicError, QubicId, QubicTxHash, QubicWallet, Signature};

pub(crate) fn k12<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut kg = KangarooTwelve::new(b"");
    kg.update(data);
    kg.into_xof().squeeze(&mut out);

    out
}

fn le_u64_limbs<const N: usize>(bytes: &[u8]) -> [u64; N] {
    core::array::from_fn(|i| u64::from_le_bytes(bytes[i * 8..(i + 1) * 8].try_into().unwrap()))
}

fn limbs_to_le_bytes<const N: usize, const M: usize>(limbs: &[u64; N]) -> [u8; M] {
    core::array::from_fn(|i| limbs[i / 8].to_le_bytes()[i % 8])
}

fn addcarry_u64(c_in: u8, a: u64, b: u64, out: &mut u64) -> u8 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        _addcarry_u64(c_in, a, b, out)
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        let (sum, c0) = a.overflowing_add(b);
        let (sum, c1) = sum.overflowing_add(c_in as u64);

        *out = sum;

        (c0 || c1) as u8
    }
}

fn subborrow_u64(b_in: u8, a: u64, b: u64, out: &mut u64) -> u8 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        _subborrow_u64(b_in, a, b, out)
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        let (diff, b0) = a.overflowing_sub(b);
        let (diff, b1) = diff.overflowing_sub(b_in as u64);

        *out = diff;

        (b0 || b1) as u8
    }
}

/// Writes the 56 base-26 letters of the four key limbs followed by the 4
/// checksum letters. `base` selects the alphabet (`b'A'` or `b'a'`).
fn encode_identity(public_key: &[u8; 32], base: u8) -> [u8; 60] {
    let mut identity = [0u8; 60];

    for (i, limb) in le_u64_limbs::<4>(public_key).into_iter().enumerate() {
        let mut fragment = limb;
        for j in 0..14 {
            identity[i * 14 + j] = (fragment % 26) as u8 + base;
            fragment /= 26;
        }
    }

    let checksum = k12::<3>(public_key);
    let mut checksum =
        (checksum[0] as u64 | (checksum[1] as u64) << 8 | (checksum[2] as u64) << 16) & 0x3FFFF;
    for letter in identity[56..].iter_mut() {
        *letter = (checksum % 26) as u8 + base;
        checksum /= 26;
    }

    identity
}

/// Rebuilds the four key limbs from a 60 letter identity. The checksum suffix
/// is not verified; re-encode and compare to check integrity.
fn decode_identity(id: &str, base: u8, ident: &'static str) -> Result<[u8; 32], QubicError> {
    let id = id.as_bytes();

    if id.len() != 60 {
        return Err(QubicError::InvalidIdLengthError {
            ident,
            expected: 60,
            found: id.len(),
        });
    }

    if !id.iter().all(|c| (base..base + 26).contains(c)) {
        return Err(QubicError::InvalidIdFormatError { ident });
    }

    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        for j in (0..14).rev() {
            *limb = *limb * 26 + (id[i * 14 + j] - base) as u64;
        }
    }

    Ok(limbs_to_le_bytes(&limbs))
}

/// SchnorrQ signature over a 32 byte message digest.
///
/// The nonce is derived from the second half of `K12_64(subseed)` and the
/// digest, so signing is deterministic.
pub(crate) fn schnorrq_sign(
    subseed: &[u8; 32],
    public_key: &[u8; 32],
    message_digest: &[u8; 32],
) -> Signature {
    let mut temp = [0u8; 96];

    let k = k12::<64>(subseed);
    temp[32..64].copy_from_slice(&k[32..]);
    temp[64..].copy_from_slice(message_digest);

    let r = k12::<64>(&temp[32..]);
    let r: [u64; 8] = le_u64_limbs(&r);

    let mut r_a = PointAffine::default();
    ecc_mul_fixed(&r, &mut r_a);

    let mut signature = [0u8; 64];
    encode(&mut r_a, &mut signature);

    let mut sig: [u64; 8] = le_u64_limbs(&signature);

    temp[..32].copy_from_slice(&signature[..32]);
    temp[32..64].copy_from_slice(public_key);

    let h = k12::<64>(&temp);
    let mut h: [u64; 8] = le_u64_limbs(&h);
    let k: [u64; 8] = le_u64_limbs(&k);

    // reduce r and h mod the curve order via the Montgomery domain, then
    // compute s = r - k*h
    let mut red = [0u64; 8];
    montgomery_multiply_mod_order(&r, &MONTGOMERY_R_PRIME, &mut red);
    let mut r = [0u64; 8];
    montgomery_multiply_mod_order(&red, &ONE, &mut r);

    montgomery_multiply_mod_order(&h, &MONTGOMERY_R_PRIME, &mut red);
    montgomery_multiply_mod_order(&red, &ONE, &mut h);

    montgomery_multiply_mod_order(&k, &MONTGOMERY_R_PRIME, &mut sig[4..]);
    montgomery_multiply_mod_order(&h, &MONTGOMERY_R_PRIME, &mut red);
    h.copy_from_slice(&red);

    let mut s = [0u64; 4];
    s.copy_from_slice(&sig[4..]);
    montgomery_multiply_mod_order(&s, &h, &mut sig[4..]);
    s.copy_from_slice(&sig[4..]);
    montgomery_multiply_mod_order(&s, &ONE, &mut sig[4..]);

    let mut borrow = 0;
    for i in 0..4 {
        let minuend = r[i];
        let subtrahend = sig[4 + i];
        borrow = subborrow_u64(borrow, minuend, subtrahend, &mut sig[4 + i]);
    }

    if borrow != 0 {
        let order = [CURVE_ORDER_0, CURVE_ORDER_1, CURVE_ORDER_2, CURVE_ORDER_3];
        let mut carry = 0;
        for i in 0..4 {
            let addend = sig[4 + i];
            carry = addcarry_u64(carry, addend, order[i], &mut sig[4 + i]);
        }
    }

    Signature(limbs_to_le_bytes(&sig))
}

/// SchnorrQ verification of a 32 byte message digest.
pub(crate) fn schnorrq_verify(
    public_key: &[u8; 32],
    message_digest: &[u8; 32],
    signature: &Signature,
) -> bool {
    let signature = signature.0;

    if public_key[15] & 0x80 != 0
        || signature[15] & 0x80 != 0
        || signature[62] & 0xC0 != 0
        || signature[63] != 0
    {
        return false;
    }

    let mut a = PointAffine::default();
    if !decode(public_key, &mut a) {
        return false;
    }

    let mut temp = [0u8; 96];
    temp[..32].copy_from_slice(&signature[..32]);
    temp[32..64].copy_from_slice(public_key);
    temp[64..].copy_from_slice(message_digest);

    let mut sig: [u64; 8] = le_u64_limbs(&signature);
    let h = k12::<64>(&temp);
    let mut h: [u64; 8] = le_u64_limbs(&h);

    if !ecc_mul_double(&mut sig[4..], &mut h, &mut a) {
        return false;
    }

    let mut a_bytes = [0u8; 64];
    encode(&mut a, &mut a_bytes);

    signature[..32] == a_bytes[..32]
}

impl FromStr for QubicId {
    type Err = QubicError;

    #[inline]
    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_identity(id, b'A', "ID")?))
    }
}

impl QubicId {
    #[inline]
    pub fn check_id(id: &str) -> Result<(), QubicError> {
        decode_identity(id, b'A', "ID").map(|_| ())
    }

    #[inline]
    pub fn get_identity(&self) -> String {
        String::from_utf8(encode_identity(&self.0, b'A').to_vec()).unwrap()
    }

    #[inline]
    pub fn get_identity_bytes(&self) -> [u8; 60] {
        encode_identity(&self.0, b'A')
    }

    #[inline]
    pub fn from_slice(slice: &[u8]) -> Result<Self, QubicError> {
        if let Ok(arr) = slice.try_into() {
            Ok(Self(arr))
        } else {
            Err(QubicError::InvalidIdLengthError {
                ident: "PUBLIC_KEY",
                expected: 32,
                found: slice.len(),
            })
        }
    }

    #[inline]
    pub fn from_le_u64(le_u64: [u64; 4]) -> Self {
        Self(limbs_to_le_bytes(&le_u64))
    }

    #[inline]
    pub fn to_le_u64(self) -> [u64; 4] {
        le_u64_limbs(&self.0)
    }

    /// Contract addresses are the contract index in the first key limb.
    pub fn from_contract_id(contract_id: u32) -> QubicId {
        QubicId::from_le_u64([contract_id as u64, 0, 0, 0])
    }

    pub fn is_zeroed(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Verifies a SchnorrQ signature over a precomputed message digest
    ///
    /// ```
    /// use core::str::FromStr;
    /// use qubic_base::{QubicId, Signature};
    ///
    /// let id = QubicId::from_str("BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK").unwrap();
    ///
    /// let digest = [0u8; 32]; // use KangarooTwelve to generate digest of your message data
    /// id.verify_raw(digest, Signature::default());
    /// ```
    #[inline]
    pub fn verify_raw(&self, message_digest: [u8; 32], signature: Signature) -> bool {
        schnorrq_verify(&self.0, &message_digest, &signature)
    }

    /// Hashes `message` with KangarooTwelve and verifies the signature over
    /// the resulting digest.
    #[inline]
    pub fn verify(&self, message: &[u8], signature: Signature) -> bool {
        self.verify_raw(k12::<32>(message), signature)
    }
}

impl Debug for QubicId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = self.get_identity();
        write!(f, "{}...{}", &id[..5], &id[55..])
    }
}

impl Display for QubicId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.get_identity())
    }
}

impl QubicWallet {
    /// Generates a wallet from the given input seed
    ///
    /// ```
    /// use qubic_base::QubicWallet;
    /// let wallet = QubicWallet::from_seed("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
    /// ```
    pub fn from_seed(seed: &str) -> Result<Self, QubicError> {
        let subseed = Self::get_subseed(seed)?;
        Ok(Self::from_subseed(subseed))
    }

    /// Generates an index-derived wallet from the given input seed.
    ///
    /// The derivation rehashes the subseed and the little-endian index before
    /// key generation, so `from_seed_and_index(seed, 0)` is a different wallet
    /// than `from_seed(seed)`.
    pub fn from_seed_and_index(seed: &str, index: u64) -> Result<Self, QubicError> {
        let subseed = Self::get_subseed(seed)?;
        Ok(Self::from_subseed(Self::get_derived_subseed(
            &subseed, index,
        )))
    }

    fn from_subseed(subseed: [u8; 32]) -> Self {
        let private_key = Self::get_private_key(&subseed);
        let public_key = Self::get_public_key(&private_key);

        Self {
            private_key,
            public_key: QubicId(public_key),
            subseed,
        }
    }

    /// Maps the 55 lower-case seed letters to their alphabet offsets and
    /// hashes them into the 32 byte subseed.
    pub fn get_subseed(seed: &str) -> Result<[u8; 32], QubicError> {
        if seed.len() != 55 {
            return Err(QubicError::InvalidIdLengthError {
                ident: "SEED",
                expected: 55,
                found: seed.len(),
            });
        }

        if !seed.bytes().all(|c| c.is_ascii_lowercase()) {
            return Err(QubicError::InvalidIdFormatError { ident: "SEED" });
        }

        let mut seed_bytes = [0u8; 55];
        for (mapped, c) in seed_bytes.iter_mut().zip(seed.bytes()) {
            *mapped = c - b'a';
        }

        Ok(k12(&seed_bytes))
    }

    pub fn get_derived_subseed(subseed: &[u8; 32], index: u64) -> [u8; 32] {
        let subseed_hash = k12::<32>(subseed);
        let index_hash = k12::<32>(&index.to_le_bytes());

        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&subseed_hash);
        combined[32..].copy_from_slice(&index_hash);

        k12(&combined)
    }

    #[inline(always)]
    pub fn get_private_key(subseed: &[u8; 32]) -> [u8; 32] {
        k12(subseed)
    }

    /// SchnorrQ public key generation
    #[inline(always)]
    pub fn get_public_key(private_key: &[u8; 32]) -> [u8; 32] {
        let mut p = PointAffine::default();
        let scalar: [u64; 4] = le_u64_limbs(private_key);

        ecc_mul_fixed(&scalar, &mut p);

        let mut public_key = [0u8; 32];
        encode(&mut p, &mut public_key);

        public_key
    }

    /// Get the identity of the wallet
    ///
    /// ```
    /// use qubic_base::QubicWallet;
    /// let wallet = QubicWallet::from_seed("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
    ///
    /// assert_eq!(wallet.get_identity(), "BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK");
    /// ```
    #[inline(always)]
    pub fn get_identity(&self) -> String {
        self.public_key.get_identity()
    }

    pub(crate) fn subseed(&self) -> &[u8; 32] {
        &self.subseed
    }

    /// SchnorrQ signature generation from a message; the message is hashed
    /// with KangarooTwelve first.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.sign_raw(k12(message))
    }

    /// SchnorrQ signature generation from a precomputed message digest
    pub fn sign_raw(&self, message_digest: [u8; 32]) -> Signature {
        schnorrq_sign(&self.subseed, &self.public_key.0, &message_digest)
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl QubicTxHash {
    #[inline]
    pub fn get_identity(&self) -> String {
        String::from_utf8(encode_identity(&self.0, b'a').to_vec()).unwrap()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }

    pub fn try_from_base64(s: &str) -> Result<Self, QubicError> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| QubicError::FormattingError)?;

        if decoded.len() != 32 {
            return Err(QubicError::InvalidIdLengthError {
                ident: "TxHash",
                expected: 32,
                found: decoded.len(),
            });
        }

        let mut buffer = [0u8; 32];
        buffer.copy_from_slice(&decoded);
        Ok(Self(buffer))
    }
}

impl FromStr for QubicTxHash {
    type Err = QubicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_identity(s, b'a', "TxHash")?))
    }
}

impl Debug for QubicTxHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = self.get_identity();
        write!(f, "{}...{}", &id[..5], &id[55..])
    }
}

impl Display for QubicTxHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.get_identity())
    }
}

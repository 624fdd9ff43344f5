use core::str::FromStr;

use crate::{QubicId, QubicTxHash, QubicWallet, Signer};

const SEED: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const ID: &str = "BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK";

const TEST_SEED: &str = "lmujdbtiimznvyamoyjumfeiglauqfzsznisydmqrdyuwqydjpjixat";
const TEST_ID: &str = "QJRRSSKMJRDKUDTYVNYGAMQPULKAMILQQYOWBEXUDEUWQUMNGDHQYLOAJMEB";
const TEST_PUBLIC_KEY: [u8; 32] = [
    230, 252, 58, 173, 75, 89, 77, 130, 191, 49, 3, 161, 16, 22, 216, 13, 232, 131, 222, 135, 59,
    206, 196, 142, 144, 57, 98, 134, 80, 59, 38, 19,
];

/// Test public key generation from 60 character ID
#[test]
fn test_id() {
    let pk = QubicId::from_str(ID).unwrap();

    assert_eq!(
        pk.0,
        [
            31, 89, 13, 3, 230, 19, 189, 222, 211, 139, 76, 8, 32, 172, 68, 97, 95, 145, 175, 18,
            67, 89, 128, 179, 237, 227, 192, 140, 49, 90, 37, 68
        ]
    );

    assert_eq!(QubicId(pk.0).get_identity(), ID);
}

#[test]
fn test_key_derivation() {
    let subseed = QubicWallet::get_subseed(TEST_SEED).unwrap();
    assert_eq!(
        hex::encode(subseed),
        "f47c9e767216007fa8fe9c294d773be0a23c09bb2b8d01bdd5e0c3182390ee3a"
    );

    let private_key = QubicWallet::get_private_key(&subseed);
    assert_eq!(
        hex::encode(private_key),
        "ff988066a7ac7543cf6279572fc390bfd3e191bb5d53f8eed978a658ce927ce1"
    );

    let public_key = QubicWallet::get_public_key(&private_key);
    assert_eq!(public_key, TEST_PUBLIC_KEY);

    let wallet = QubicWallet::from_seed(TEST_SEED).unwrap();
    assert_eq!(wallet.public_key.0, public_key);
    assert_eq!(wallet.get_identity(), TEST_ID);
}

#[test]
fn test_identity_roundtrip() {
    let id = QubicId::from_str(TEST_ID).unwrap();
    assert_eq!(id.0, TEST_PUBLIC_KEY);
    assert_eq!(id.get_identity(), TEST_ID);

    let lower = QubicTxHash(TEST_PUBLIC_KEY);
    let as_string = lower.get_identity();
    assert_eq!(as_string, TEST_ID.to_lowercase());
    assert_eq!(QubicTxHash::from_str(&as_string).unwrap(), lower);
}

#[test]
fn test_lowercase_identity() {
    let hash =
        QubicTxHash::from_str("zycobqjpgdcagflcvgtkboafbryahgjbbwhgjjlblhzocwncjhhjshqfsndh").unwrap();

    assert_eq!(
        hash.0,
        [
            209, 173, 239, 194, 151, 98, 29, 180, 83, 67, 142, 32, 4, 9, 167, 32, 159, 95, 116,
            116, 214, 221, 171, 255, 13, 125, 86, 112, 5, 31, 191, 193
        ]
    );
}

#[test]
fn test_invalid_inputs() {
    assert!(QubicId::from_str("QJRRSSKMJRDKUDTY").is_err());
    assert!(QubicId::from_str(&TEST_ID.to_lowercase()).is_err());
    assert!(QubicTxHash::from_str(TEST_ID).is_err());

    assert!(QubicWallet::from_seed("tooshort").is_err());
    assert!(QubicWallet::from_seed(&SEED.to_uppercase()).is_err());
    assert!(QubicWallet::from_seed(&format!("{}1", &SEED[..54])).is_err());
}

// Test wallet signature & public key generation from 55 character seed
#[test]
pub fn test_wallet() {
    let wallet = QubicWallet::from_seed(SEED).unwrap();

    assert_eq!(wallet.get_identity(), ID);

    let signature = wallet.sign(&10u64.to_le_bytes());

    assert_eq!(
        signature.0,
        [
            200, 228, 166, 138, 90, 163, 195, 88, 137, 89, 233, 148, 251, 149, 140, 37, 105, 127,
            254, 22, 49, 180, 202, 175, 236, 126, 224, 144, 41, 32, 119, 181, 96, 198, 20, 216,
            126, 166, 96, 192, 252, 172, 247, 82, 47, 83, 49, 37, 227, 94, 186, 154, 189, 60, 111,
            207, 59, 153, 206, 102, 219, 156, 24, 0
        ]
    );

    let id = QubicId::from_str(ID).unwrap();

    assert!(id.verify(&10u64.to_le_bytes(), signature));
}

#[test]
fn test_wallet_determinism() {
    let a = QubicWallet::from_seed(TEST_SEED).unwrap();
    let b = QubicWallet::from_seed(TEST_SEED).unwrap();

    assert_eq!(a.public_key, b.public_key);
}

#[test]
fn test_derived_wallet() {
    let wallet = QubicWallet::from_seed(TEST_SEED).unwrap();
    let derived = QubicWallet::from_seed_and_index(TEST_SEED, 0).unwrap();

    // index derivation is a distinct scheme, index 0 is not the base wallet
    assert_ne!(wallet.public_key, derived.public_key);

    let again = QubicWallet::from_seed_and_index(TEST_SEED, 0).unwrap();
    assert_eq!(derived.public_key, again.public_key);

    let other = QubicWallet::from_seed_and_index(TEST_SEED, 1).unwrap();
    assert_ne!(derived.public_key, other.public_key);
}

#[test]
fn test_signer() {
    let signer = Signer::from_seed(SEED).unwrap();
    let digest = [5u8; 32];

    let signature = signer.sign_digest(digest).unwrap();

    assert!(signer.public_key().verify_raw(digest, signature));
    assert!(!signer.public_key().verify_raw([6u8; 32], signature));

    let other = QubicId::from_str(TEST_ID).unwrap();
    assert!(!other.verify_raw(digest, signature));
}

#[test]
fn test_tx_hash_base64() {
    let hash = QubicTxHash(TEST_PUBLIC_KEY);
    let encoded = hash.to_base64();

    assert_eq!(QubicTxHash::try_from_base64(&encoded).unwrap(), hash);
    assert!(QubicTxHash::try_from_base64("not-base64!").is_err());
}

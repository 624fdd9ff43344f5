use thiserror::Error;

#[derive(Debug, Error)]
pub enum QubicError {
    #[error("Invalid {ident} length (expected {expected}, found {found})")]
    InvalidIdLengthError {
        ident: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid format of {ident}. Make sure all characters are upper/lower case")]
    InvalidIdFormatError { ident: &'static str },

    #[error("Elliptic curve error. Decoded point was not found on the elliptic curve")]
    EllipticCurveError,

    #[error("Signer public key does not match the transaction source {expected}")]
    WrongSigningIdentity { expected: crate::QubicId },

    #[error("Maximum of {max} transfers allowed")]
    TransferLimitExceeded { max: usize },

    #[error("Asset name is longer than {max} characters")]
    InvalidAssetName { max: usize },

    #[error("Data is not formatted correctly")]
    FormattingError,
}

#[derive(Debug, Error)]
pub enum ByteEncodingError {
    #[error("Invalid data length (expected at least {expected_min}, found {found})")]
    InvalidMinimumDataLength { expected_min: usize, found: usize },

    #[error("Invalid data length (expected {expected}, found {found})")]
    InvalidDataLength { expected: usize, found: usize },

    #[error("Declared input size {declared} does not match the {found} input bytes present")]
    InputSizeMismatch { declared: usize, found: usize },

    #[error("Unrecognized type tag {found}")]
    UnrecognizedTypeTag { found: u8 },
}

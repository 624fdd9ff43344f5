use qubic_base::QubicId;

pub const NUMBER_OF_TRANSACTIONS_PER_TICK: usize = 1024;
pub const MAX_NUMBER_OF_CONTRACTS: usize = 1024;
pub const NUMBER_OF_COMPUTORS: usize = 676;
pub const MINIMUM_QUORUM_VOTES: usize = 451;
pub const NUMBER_OF_EXCHANGED_PEERS: usize = 4;
pub const SPECTRUM_DEPTH: usize = 24;
pub const SIGNATURE_SIZE: usize = 64;

/// QX smart contract address (contract index 1), identity
/// `BAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAARMID`
pub const QX_ADDRESS: QubicId = QubicId([
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0,
]);

/// Qutil smart contract address (contract index 4), identity
/// `EAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAVWRF`
pub const QUTIL_ADDRESS: QubicId = QubicId([
    4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0,
]);

pub const ARBITRATOR: QubicId = QubicId([
    158, 26, 16, 12, 251, 85, 109, 239, 123, 204, 98, 82, 228, 125, 223, 9, 133, 66, 134, 55, 195,
    209, 179, 202, 161, 111, 51, 253, 152, 67, 141, 148,
]);

//! Input validation for addresses and transaction ids.

/// Validator contract injected into the adapter.
pub trait AddressValidator: Send + Sync {
    fn is_valid_address(&self, value: &str) -> bool;

    fn is_valid_txid(&self, value: &str) -> bool;
}

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Purely syntactic checks: base58 addresses of 26–35 characters, and
/// transaction ids of 64 hex characters. No checksum verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxValidator;

impl AddressValidator for SyntaxValidator {
    fn is_valid_address(&self, value: &str) -> bool {
        (26..=35).contains(&value.len()) && value.chars().all(|c| BASE58_ALPHABET.contains(c))
    }

    fn is_valid_txid(&self, value: &str) -> bool {
        value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

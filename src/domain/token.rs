//! Token identity type.

use core::fmt;

use super::Address;

/// Opaque identity of a fungible asset held by a Well.
///
/// The engine never interprets tokens beyond equality; decimals, symbols
/// and balances belong to the custody collaborator.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Address, Token};
///
/// let usdc = Token::new(Address::from_low_u64(1));
/// assert_eq!(usdc.address(), Address::from_low_u64(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token(Address);

impl Token {
    /// Creates a token from its address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Returns the token address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_follows_address() {
        let a = Token::new(Address::from_low_u64(1));
        let b = Token::from(Address::from_low_u64(1));
        let c = Token::new(Address::from_low_u64(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_wraps_address() {
        let tok = Token::new(Address::from_low_u64(9));
        assert!(tok.to_string().starts_with("Token(0x"));
    }
}

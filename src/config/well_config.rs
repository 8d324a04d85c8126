//! Immutable identity of a Well.

use crate::domain::{Address, AuxData, Token};
use crate::error::{Result, WellError};

/// Reference to the pricing function a Well prices against.
///
/// `target` identifies the implementation; `data` is its opaque
/// parameter payload, passed on every pricing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingFunctionRef {
    /// Identity of the implementation.
    pub target: Address,
    /// Opaque parameters.
    pub data: AuxData,
}

impl PricingFunctionRef {
    /// Creates a new reference.
    #[must_use]
    pub const fn new(target: Address, data: AuxData) -> Self {
        Self { target, data }
    }
}

/// Reference to a pump attached to a Well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PumpRef {
    /// Identity of the pump.
    pub target: Address,
    /// Opaque payload passed to `attach` and every `update`.
    pub data: AuxData,
}

impl PumpRef {
    /// Creates a new reference.
    #[must_use]
    pub const fn new(target: Address, data: AuxData) -> Self {
        Self { target, data }
    }
}

/// The full, immutable identity of a Well.
///
/// Callers pass a `WellConfig` on every operation; the Well compares it
/// field-by-field with the configuration it was initialized with and
/// rejects the call with [`WellError::ConfigMismatch`] on any difference.
///
/// # Validation
///
/// - At least two tokens.
/// - Tokens are pairwise distinct.
///
/// # Examples
///
/// ```
/// use well_engine::config::{PricingFunctionRef, WellConfig};
/// use well_engine::domain::{Address, AuxData, Token};
///
/// let tokens = vec![
///     Token::new(Address::from_low_u64(1)),
///     Token::new(Address::from_low_u64(2)),
/// ];
/// let function = PricingFunctionRef::new(Address::from_low_u64(100), AuxData::empty());
/// let config = WellConfig::new(tokens, function, vec![]);
/// assert!(config.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WellConfig {
    tokens: Vec<Token>,
    function: PricingFunctionRef,
    pumps: Vec<PumpRef>,
}

impl WellConfig {
    /// Creates and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::InvalidConfiguration`] if fewer than two tokens
    /// are given or a token repeats.
    pub fn new(tokens: Vec<Token>, function: PricingFunctionRef, pumps: Vec<PumpRef>) -> Result<Self> {
        let config = Self {
            tokens,
            function,
            pumps,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the structural rules.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::InvalidConfiguration`] on a violation.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.len() < 2 {
            return Err(WellError::InvalidConfiguration(
                "a well needs at least two tokens",
            ));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if self.tokens[..i].contains(token) {
                return Err(WellError::InvalidConfiguration("tokens must be distinct"));
            }
        }
        Ok(())
    }

    /// The ordered tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Token at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::IndexOutOfRange`] for an invalid index.
    pub fn token(&self, index: usize) -> Result<Token> {
        self.tokens
            .get(index)
            .copied()
            .ok_or(WellError::IndexOutOfRange {
                index,
                token_count: self.tokens.len(),
            })
    }

    /// Index of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::UnknownToken`] if the token is not in the Well.
    pub fn index_of(&self, token: &Token) -> Result<usize> {
        self.tokens
            .iter()
            .position(|t| t == token)
            .ok_or(WellError::UnknownToken)
    }

    /// The pricing function reference.
    #[must_use]
    pub const fn function(&self) -> &PricingFunctionRef {
        &self.function
    }

    /// The pump references in attachment order.
    #[must_use]
    pub fn pumps(&self) -> &[PumpRef] {
        &self.pumps
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tok(n: u64) -> Token {
        Token::new(Address::from_low_u64(n))
    }

    fn function() -> PricingFunctionRef {
        PricingFunctionRef::new(Address::from_low_u64(100), AuxData::empty())
    }

    #[test]
    fn valid_three_token_config() {
        let Ok(cfg) = WellConfig::new(vec![tok(1), tok(2), tok(3)], function(), vec![]) else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.token_count(), 3);
        assert_eq!(cfg.token(2), Ok(tok(3)));
        assert_eq!(cfg.index_of(&tok(2)), Ok(1));
    }

    #[test]
    fn single_token_rejected() {
        let Err(WellError::InvalidConfiguration(_)) = WellConfig::new(vec![tok(1)], function(), vec![])
        else {
            panic!("expected InvalidConfiguration");
        };
    }

    #[test]
    fn duplicate_tokens_rejected() {
        let result = WellConfig::new(vec![tok(1), tok(2), tok(1)], function(), vec![]);
        assert_eq!(
            result,
            Err(WellError::InvalidConfiguration("tokens must be distinct"))
        );
    }

    #[test]
    fn lookups_fail_cleanly() {
        let Ok(cfg) = WellConfig::new(vec![tok(1), tok(2)], function(), vec![]) else {
            panic!("expected Ok");
        };
        assert_eq!(
            cfg.token(5),
            Err(WellError::IndexOutOfRange {
                index: 5,
                token_count: 2
            })
        );
        assert_eq!(cfg.index_of(&tok(9)), Err(WellError::UnknownToken));
    }

    #[test]
    fn equality_covers_pump_data() {
        let pump_a = PumpRef::new(Address::from_low_u64(7), AuxData::new(vec![1]));
        let pump_b = PumpRef::new(Address::from_low_u64(7), AuxData::new(vec![2]));
        let a = WellConfig::new(vec![tok(1), tok(2)], function(), vec![pump_a]);
        let b = WellConfig::new(vec![tok(1), tok(2)], function(), vec![pump_b]);
        assert_ne!(a, b);
    }
}

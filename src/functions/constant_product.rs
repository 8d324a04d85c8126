//! N-token constant product curve (`∏ rᵢ = k`).

use crate::config::PricingFunctionRef;
use crate::domain::{Address, Amount, AuxData, Invariant, Liquidity, Rounding};
use crate::error::{Result, WellError};
use crate::math::{div_round_wide, nth_root_floor, product, to_amount};
use crate::traits::PricingFunction;

/// Constant product pricing over any number of tokens.
///
/// | Primitive | Formula |
/// |-----------|---------|
/// | invariant | `∏ rᵢ` |
/// | solve for `rⱼ` | `⌈k / ∏_{i≠j} rᵢ⌉` |
/// | first LP mint | `⌊(∏ rᵢ)^(1/N)⌋` |
///
/// Auxiliary data is ignored.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Amount, AuxData, Invariant};
/// use well_engine::functions::ConstantProduct;
/// use well_engine::traits::PricingFunction;
///
/// let cp = ConstantProduct;
/// let reserves = [Amount::new(1_100), Amount::new(1_000)];
/// let k = Invariant::from(1_000_000u128);
/// // Smallest y with 1_100 · y ≥ 1_000_000
/// let y = cp.reserve_at_invariant(&reserves, k, 1, &AuxData::empty());
/// assert_eq!(y, Ok(Amount::new(910)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantProduct;

impl ConstantProduct {
    /// Identity under which this function is referenced in a
    /// [`WellConfig`](crate::config::WellConfig).
    pub const TARGET: Address = Address::from_low_u64(0xC0);

    /// Reference with empty auxiliary data.
    #[must_use]
    pub fn function_ref() -> PricingFunctionRef {
        PricingFunctionRef::new(Self::TARGET, AuxData::empty())
    }
}

impl PricingFunction for ConstantProduct {
    fn invariant(&self, reserves: &[Amount], _data: &AuxData) -> Result<Invariant> {
        product(reserves, None).map(Invariant::new)
    }

    fn reserve_at_invariant(
        &self,
        reserves: &[Amount],
        invariant: Invariant,
        index: usize,
        _data: &AuxData,
    ) -> Result<Amount> {
        if index >= reserves.len() {
            return Err(WellError::IndexOutOfRange {
                index,
                token_count: reserves.len(),
            });
        }
        if invariant.is_zero() {
            return Ok(Amount::ZERO);
        }
        let others = product(reserves, Some(index))?;
        let solved = div_round_wide(invariant.get(), others, Rounding::Up).ok_or(
            WellError::InsufficientReserves("cannot reach invariant with a zero reserve"),
        )?;
        to_amount(solved, "solved reserve exceeds u128")
    }

    fn initial_lp_supply(&self, reserves: &[Amount], _data: &AuxData) -> Result<Liquidity> {
        let n = u32::try_from(reserves.len())
            .map_err(|_| WellError::Overflow("token count exceeds u32"))?;
        let k = product(reserves, None)?;
        let root = nth_root_floor(k, n).ok_or(WellError::InvalidConfiguration(
            "constant product needs at least one token",
        ))?;
        Liquidity::try_from_u256(root).ok_or(WellError::Overflow("initial LP supply exceeds u128"))
    }

    fn name(&self) -> &'static str {
        "constant-product"
    }

    fn target(&self) -> Address {
        Self::TARGET
    }
}

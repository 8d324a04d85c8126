//! N-token StableSwap curve (Curve style).
//!
//! The invariant `D` satisfies
//!
//! ```text
//! A·nⁿ·Σxᵢ + D = A·D·nⁿ + Dⁿ⁺¹ / (nⁿ·∏xᵢ)
//! ```
//!
//! and is found by Newton–Raphson iteration starting from `D = Σxᵢ`:
//!
//! ```text
//! D_P    = Dⁿ⁺¹ / (nⁿ·∏xᵢ)
//! D_next = (Ann·S + n·D_P)·D / ((Ann − 1)·D + (n + 1)·D_P)
//! ```
//!
//! with `Ann = A·n`.  Solving for a single reserve `y` reduces to the
//! quadratic `y² + (b − D)·y = c`, iterated as `y ← (y² + c) / (2y + b − D)`.
//! All intermediates are 256-bit.

use primitive_types::U256;

use crate::config::PricingFunctionRef;
use crate::domain::{Address, Amount, AuxData, Invariant, Liquidity};
use crate::error::{Result, WellError};
use crate::math::to_amount;
use crate::traits::PricingFunction;

/// Maximum Newton–Raphson iterations.
const MAX_ITERATIONS: u32 = 256;

/// Absolute difference between consecutive iterates at which Newton stops.
const CONVERGENCE_THRESHOLD: u64 = 1;

/// Maximum unit steps taken to lift a solved reserve onto the target.
const MAX_NUDGES: u32 = 256;

/// Curve-style StableSwap pricing over any number of tokens.
///
/// The amplification coefficient `A` is read from the first 32-byte
/// big-endian word of the auxiliary data; see
/// [`encode_data`](Self::encode_data).
///
/// | Primitive | Method |
/// |-----------|--------|
/// | invariant | `D` by Newton iteration |
/// | solve for `rⱼ` | Newton on `y`, then stepped up until `D ≥ target` |
/// | first LP mint | `D` |
///
/// # Examples
///
/// ```
/// use well_engine::domain::Amount;
/// use well_engine::functions::StableSwap;
/// use well_engine::traits::PricingFunction;
///
/// let data = StableSwap::encode_data(100);
/// let reserves = [Amount::new(1_000_000), Amount::new(1_000_000)];
/// let d = StableSwap.invariant(&reserves, &data);
/// assert_eq!(d.map(|d| d.get().low_u128()), Ok(2_000_000));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StableSwap;

impl StableSwap {
    /// Identity under which this function is referenced in a
    /// [`WellConfig`](crate::config::WellConfig).
    pub const TARGET: Address = Address::from_low_u64(0x55);

    /// Smallest accepted amplification coefficient.
    pub const MIN_AMPLIFICATION: u32 = 1;

    /// Largest accepted amplification coefficient.
    pub const MAX_AMPLIFICATION: u32 = 1_000_000;

    /// Encodes `amplification` as auxiliary data.
    #[must_use]
    pub fn encode_data(amplification: u32) -> AuxData {
        AuxData::from_words(&[U256::from(amplification)])
    }

    /// Reference with the given amplification.
    #[must_use]
    pub fn function_ref(amplification: u32) -> PricingFunctionRef {
        PricingFunctionRef::new(Self::TARGET, Self::encode_data(amplification))
    }

    /// Decodes and range-checks the amplification coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::InvalidFunctionData`] if the payload is shorter
    /// than one word or `A` is outside
    /// `MIN_AMPLIFICATION..=MAX_AMPLIFICATION`.
    pub fn amplification(data: &AuxData) -> Result<u32> {
        let word = data.word(0).ok_or(WellError::InvalidFunctionData(
            "stableswap data must hold the amplification word",
        ))?;
        let in_range = word >= U256::from(Self::MIN_AMPLIFICATION)
            && word <= U256::from(Self::MAX_AMPLIFICATION);
        if !in_range {
            return Err(WellError::InvalidFunctionData(
                "stableswap amplification out of range",
            ));
        }
        Ok(word.low_u32())
    }
}

// ---------------------------------------------------------------------------
// Newton–Raphson helpers
// ---------------------------------------------------------------------------

fn overflow(context: &'static str) -> WellError {
    WellError::Overflow(context)
}

fn close_enough(a: U256, b: U256) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= U256::from(CONVERGENCE_THRESHOLD)
}

/// Invariant `D` of `xs` for `Ann = A·n`.
fn compute_d(xs: &[Amount], ann: U256) -> Result<U256> {
    let n = U256::from(xs.len());
    let s = xs
        .iter()
        .try_fold(U256::zero(), |acc, x| acc.checked_add(x.to_u256()))
        .ok_or(overflow("D: sum overflow"))?;
    if s.is_zero() {
        return Ok(U256::zero());
    }
    if xs.iter().any(Amount::is_zero) {
        return Err(WellError::InsufficientReserves(
            "stableswap invariant needs every reserve non-zero",
        ));
    }

    let ann_s = ann.checked_mul(s).ok_or(overflow("D: Ann·S overflow"))?;
    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        let mut d_p = d;
        for x in xs {
            // D_P = D_P · D / (n · x)
            d_p = d_p
                .checked_mul(d)
                .ok_or(overflow("D: D_P·D overflow"))?
                / (x.to_u256() * n);
        }
        let d_prev = d;
        let numerator = d_p
            .checked_mul(n)
            .and_then(|v| ann_s.checked_add(v))
            .and_then(|v| v.checked_mul(d))
            .ok_or(overflow("D: numerator overflow"))?;
        let denominator = (ann - U256::one())
            .checked_mul(d)
            .and_then(|v| v.checked_add((n + U256::one()).checked_mul(d_p)?))
            .ok_or(overflow("D: denominator overflow"))?;
        if denominator.is_zero() {
            return Err(WellError::DivideByZero);
        }
        d = numerator / denominator;
        if close_enough(d, d_prev) {
            return Ok(d);
        }
    }
    Err(WellError::NonConvergence("D did not converge"))
}

/// Reserve `y` at `index` for which the invariant is `d`, all other
/// reserves fixed.
fn compute_y(xs: &[Amount], index: usize, d: U256, ann: U256) -> Result<U256> {
    let n = U256::from(xs.len());
    let mut c = d;
    let mut s = U256::zero();
    for (i, x) in xs.iter().enumerate() {
        if i == index {
            continue;
        }
        if x.is_zero() {
            return Err(WellError::InsufficientReserves(
                "stableswap solve needs every other reserve non-zero",
            ));
        }
        s = s.checked_add(x.to_u256()).ok_or(overflow("y: sum overflow"))?;
        c = c
            .checked_mul(d)
            .ok_or(overflow("y: c overflow"))?
            / (x.to_u256() * n);
    }
    c = c.checked_mul(d).ok_or(overflow("y: c overflow"))? / (ann * n);
    let b = s + d / ann;

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y;
        let numerator = y
            .checked_mul(y)
            .and_then(|v| v.checked_add(c))
            .ok_or(overflow("y: numerator overflow"))?;
        let denominator = y
            .checked_mul(U256::from(2u8))
            .and_then(|v| v.checked_add(b))
            .ok_or(overflow("y: denominator overflow"))?
            .checked_sub(d)
            .filter(|v| !v.is_zero())
            .ok_or(WellError::NonConvergence("y: non-positive Newton denominator"))?;
        y = numerator / denominator;
        if close_enough(y, y_prev) {
            return Ok(y);
        }
    }
    Err(WellError::NonConvergence("y did not converge"))
}

fn ann_of(data: &AuxData, token_count: usize) -> Result<U256> {
    let amp = StableSwap::amplification(data)?;
    Ok(U256::from(amp) * U256::from(token_count))
}

impl PricingFunction for StableSwap {
    fn invariant(&self, reserves: &[Amount], data: &AuxData) -> Result<Invariant> {
        let ann = ann_of(data, reserves.len())?;
        compute_d(reserves, ann).map(Invariant::new)
    }

    fn reserve_at_invariant(
        &self,
        reserves: &[Amount],
        invariant: Invariant,
        index: usize,
        data: &AuxData,
    ) -> Result<Amount> {
        if index >= reserves.len() {
            return Err(WellError::IndexOutOfRange {
                index,
                token_count: reserves.len(),
            });
        }
        let ann = ann_of(data, reserves.len())?;
        if invariant.is_zero() {
            return Ok(Amount::ZERO);
        }
        let target = invariant.get();
        let mut y = to_amount(
            compute_y(reserves, index, target, ann)?,
            "solved reserve exceeds u128",
        )?;
        let mut candidate = reserves.to_vec();
        for _ in 0..MAX_NUDGES {
            candidate[index] = y;
            if compute_d(&candidate, ann)? >= target {
                return Ok(y);
            }
            y = y
                .checked_add(&Amount::new(1))
                .ok_or(overflow("solved reserve exceeds u128"))?;
        }
        Err(WellError::NonConvergence(
            "solved reserve does not reach the target invariant",
        ))
    }

    fn initial_lp_supply(&self, reserves: &[Amount], data: &AuxData) -> Result<Liquidity> {
        let d = self.invariant(reserves, data)?;
        Liquidity::try_from_u256(d.get()).ok_or(overflow("initial LP supply exceeds u128"))
    }

    fn name(&self) -> &'static str {
        "stable-swap"
    }

    fn target(&self) -> Address {
        Self::TARGET
    }
}

//! The [`Well`]: one pool, its reserves, its pumps and its custody.

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, debug_span, info, warn};

use super::settlement::{Movement, settle};
use crate::config::{WellConfig, WellSettings};
use crate::domain::{Address, Amount, AuxData, Liquidity, ReserveDelta, Reserves, Token, WellEvent};
use crate::engine::{
    FanOutReport, LiquidityEngine, PumpRegistry, ReserveTracker, SwapEngine, is_updating_for,
};
use crate::error::{Result, WellError};
use crate::traits::{Custody, PricingFunction, Pump};

/// Who pays and who receives in a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallContext {
    /// Account tokens and LP shares are taken from.
    pub caller: Address,
    /// Account tokens and LP shares are paid to.
    pub recipient: Address,
}

impl CallContext {
    /// A call paying `recipient` on behalf of `caller`.
    #[must_use]
    pub const fn new(caller: Address, recipient: Address) -> Self {
        Self { caller, recipient }
    }

    /// A call where `account` both pays and receives.
    #[must_use]
    pub const fn own(account: Address) -> Self {
        Self {
            caller: account,
            recipient: account,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Everything fixed by `init`, plus the live reserves and pumps.
#[derive(Debug)]
struct Pool {
    config: WellConfig,
    function: Arc<dyn PricingFunction>,
    tracker: ReserveTracker,
    pumps: PumpRegistry,
}

impl Pool {
    fn bind(&self, config: &WellConfig) -> Result<()> {
        if &self.config == config {
            Ok(())
        } else {
            Err(WellError::ConfigMismatch)
        }
    }

    fn data(&self) -> &AuxData {
        &self.config.function().data
    }

    fn swaps(&self) -> SwapEngine<'_> {
        SwapEngine::new(self.function.as_ref(), self.data())
    }

    fn liquidity(&self) -> LiquidityEngine<'_> {
        LiquidityEngine::new(self.function.as_ref(), self.data())
    }

    fn pair(&self, from: &Token, to: &Token) -> Result<(usize, usize)> {
        let i = self.config.index_of(from)?;
        let j = self.config.index_of(to)?;
        if i == j {
            return Err(WellError::InvalidTokenPair(i));
        }
        Ok((i, j))
    }
}

#[derive(Debug)]
struct State {
    custody: Box<dyn Custody>,
    pool: Option<Pool>,
    events: VecDeque<WellEvent>,
    last_fan_out: FanOutReport,
}

impl State {
    fn live(&self) -> Result<&Pool> {
        self.pool.as_ref().ok_or(WellError::NotInitialized)
    }

    fn bound(&self, config: &WellConfig) -> Result<&Pool> {
        let pool = self.live()?;
        pool.bind(config)?;
        Ok(pool)
    }

    fn balances(&self, tokens: &[Token]) -> Result<Reserves> {
        tokens
            .iter()
            .map(|token| self.custody.balance_of(token).map_err(WellError::from))
            .collect::<Result<Vec<_>>>()
            .map(Reserves::new)
    }
}

// ---------------------------------------------------------------------------
// Well
// ---------------------------------------------------------------------------

/// A constant-function liquidity pool.
///
/// Created uninitialized, configured once with [`Well::init`].  All
/// operations take `&self`; calls are serialized by a re-entrant mutex.  A
/// call made from inside one of this Well's pump updates, or re-entering on
/// the thread that holds the lock, fails with
/// [`WellError::ReentrancyDetected`].
///
/// Every operation takes the caller's copy of the [`WellConfig`] and fails
/// with [`WellError::ConfigMismatch`] unless it equals the one the Well was
/// initialized with.
///
/// Committed calls are recorded as [`WellEvent`]s until taken with
/// [`Well::drain_events`].  At most `settings.event_capacity` undrained
/// events are kept; beyond that the oldest is dropped.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use well_engine::config::{WellConfig, WellSettings};
/// use well_engine::custody::Ledger;
/// use well_engine::domain::{Address, Amount, Liquidity, Token};
/// use well_engine::functions::ConstantProduct;
/// use well_engine::well::{CallContext, Well};
///
/// let (a, b) = (Token::new(Address::from_low_u64(1)), Token::new(Address::from_low_u64(2)));
/// let alice = Address::from_low_u64(0xA);
/// let ledger = Ledger::new();
/// ledger.credit(&alice, &a, Amount::new(2_000));
/// ledger.credit(&alice, &b, Amount::new(1_000));
///
/// let config = WellConfig::new(vec![a, b], ConstantProduct::function_ref(), vec![])?;
/// let well = Well::new(Box::new(ledger.clone()), WellSettings::default());
/// well.init(config.clone(), Arc::new(ConstantProduct), vec![])?;
///
/// let me = CallContext::own(alice);
/// well.add_liquidity(&config, &me, &[Amount::new(1_000), Amount::new(1_000)], Liquidity::ZERO)?;
/// let out = well.swap_from(&config, &me, &a, &b, Amount::new(100), Amount::new(90))?;
/// assert_eq!(out, Amount::new(90));
/// # Ok::<(), well_engine::error::WellError>(())
/// ```
pub struct Well {
    id: u64,
    address: Address,
    settings: WellSettings,
    state: ReentrantMutex<RefCell<State>>,
}

impl fmt::Debug for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Well")
            .field("address", &self.address)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Well {
    /// An uninitialized Well settling through `custody`.
    #[must_use]
    pub fn new(custody: Box<dyn Custody>, settings: WellSettings) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            address: Address::ZERO,
            settings,
            state: ReentrantMutex::new(RefCell::new(State {
                custody,
                pool: None,
                events: VecDeque::new(),
                last_fan_out: FanOutReport::default(),
            })),
        }
    }

    /// Sets the identity pumps see on [`Well::read_pump`].
    #[must_use]
    pub const fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Identity of this Well.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Pump resource limits.
    #[must_use]
    pub const fn settings(&self) -> &WellSettings {
        &self.settings
    }

    /// Rejects calls made from a pump worker of this Well; they would
    /// otherwise wait on the lock held by the call that spawned them.
    fn enter(&self) -> Result<()> {
        if is_updating_for(self.id) {
            warn!(well = %self.address, "call from pump update rejected");
            return Err(WellError::ReentrancyDetected);
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> Result<T>) -> Result<T> {
        self.enter()?;
        let guard = self.state.lock();
        let Ok(state) = guard.try_borrow() else {
            warn!(well = %self.address, "re-entrant read rejected");
            return Err(WellError::ReentrancyDetected);
        };
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        self.enter()?;
        let guard = self.state.lock();
        let Ok(mut state) = guard.try_borrow_mut() else {
            warn!(well = %self.address, "re-entrant call rejected");
            return Err(WellError::ReentrancyDetected);
        };
        f(&mut state)
    }

    /// Applies `post`, fans out, settles `movements` and records `event`.
    ///
    /// A custody failure restores the reserves and discards pump updates.
    fn commit(
        &self,
        state: &mut State,
        post: Reserves,
        movements: &[Movement],
        event: WellEvent,
    ) -> Result<()> {
        let State {
            custody,
            pool,
            events,
            last_fan_out,
        } = state;
        let pool = pool.as_mut().ok_or(WellError::NotInitialized)?;
        let pre = pool.tracker.snapshot();
        pool.tracker.apply(&ReserveDelta::between(&pre, &post)?)?;
        let (staged, report) = pool.pumps.fan_out(&pre);
        if let Err(err) = settle(custody.as_mut(), movements) {
            drop(staged);
            pool.tracker.replace(pre)?;
            warn!(well = %self.address, error = %err, event = event.kind(), "settlement failed, call rolled back");
            return Err(err);
        }
        pool.pumps.commit(staged);
        info!(
            well = %self.address,
            event = event.kind(),
            reserves = %pool.tracker.current(),
            pump_failures = report.failures().len(),
            "committed"
        );
        if events.len() >= self.settings.event_capacity {
            events.pop_front();
            warn!(well = %self.address, capacity = self.settings.event_capacity, "event log full, oldest event dropped");
        }
        events.push_back(event);
        *last_fan_out = report;
        Ok(())
    }

    // -- lifecycle ----------------------------------------------------------

    /// Binds the Well to `config`, its pricing function and its pumps.
    ///
    /// `pumps[i]` implements `config.pumps()[i]`; each pump's `attach` runs
    /// once.  On any error the Well stays uninitialized.
    ///
    /// # Errors
    ///
    /// - [`WellError::AlreadyInitialized`] on a second call.
    /// - [`WellError::InvalidConfiguration`] for a malformed config or
    ///   settings, a pump count mismatch, or a function or pump whose
    ///   `target` differs from the one named in `config`.
    /// - [`WellError::InvalidFunctionData`] if the function rejects its data.
    /// - [`WellError::PumpAttachFailed`] if a pump fails to attach.
    pub fn init(
        &self,
        config: WellConfig,
        function: Arc<dyn PricingFunction>,
        pumps: Vec<Box<dyn Pump>>,
    ) -> Result<()> {
        let _span = debug_span!("well.init", well = %self.address).entered();
        self.write(|state| {
            if state.pool.is_some() {
                return Err(WellError::AlreadyInitialized);
            }
            config.validate()?;
            self.settings.validate()?;
            if function.target() != config.function().target {
                warn!(
                    well = %self.address,
                    expected = %config.function().target,
                    actual = %function.target(),
                    "pricing function identity mismatch"
                );
                return Err(WellError::InvalidConfiguration(
                    "pricing function does not match the configured target",
                ));
            }
            let token_count = config.token_count();
            let empty =
                function.invariant(Reserves::zeroed(token_count).as_slice(), &config.function().data)?;
            debug!(well = %self.address, invariant = %empty, "function data accepted");
            let pumps = PumpRegistry::attach(config.pumps(), pumps, token_count, self.settings)?
                .with_origin(self.id);
            info!(
                well = %self.address,
                tokens = token_count,
                function = function.name(),
                pumps = pumps.len(),
                "well initialized"
            );
            state.pool = Some(Pool {
                config,
                function,
                tracker: ReserveTracker::new(token_count),
                pumps,
            });
            Ok(())
        })
    }

    /// `true` once [`Well::init`] has succeeded.
    ///
    /// # Errors
    ///
    /// [`WellError::ReentrancyDetected`] when called from inside a pump.
    pub fn is_initialized(&self) -> Result<bool> {
        self.read(|state| Ok(state.pool.is_some()))
    }

    // -- accessors ----------------------------------------------------------

    /// Current reserves.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`], [`WellError::ConfigMismatch`].
    pub fn reserves(&self, config: &WellConfig) -> Result<Reserves> {
        self.read(|state| Ok(state.bound(config)?.tracker.snapshot()))
    }

    /// The configuration the Well was initialized with.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`].
    pub fn config(&self) -> Result<WellConfig> {
        self.read(|state| Ok(state.live()?.config.clone()))
    }

    /// Number of tokens.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`].
    pub fn token_count(&self) -> Result<usize> {
        self.read(|state| Ok(state.live()?.config.token_count()))
    }

    /// Total LP supply as reported by custody.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`].
    pub fn lp_supply(&self) -> Result<Liquidity> {
        self.read(|state| {
            state.live()?;
            Ok(state.custody.lp_supply())
        })
    }

    /// Takes every event recorded since the last drain, oldest first.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`].
    pub fn drain_events(&self) -> Result<Vec<WellEvent>> {
        self.write(|state| {
            state.live()?;
            Ok(state.events.drain(..).collect())
        })
    }

    /// Pump outcomes of the most recent committed call.
    ///
    /// # Errors
    ///
    /// [`WellError::NotInitialized`].
    pub fn last_fan_out(&self) -> Result<FanOutReport> {
        self.read(|state| {
            state.live()?;
            Ok(state.last_fan_out.clone())
        })
    }

    /// Forwards `query` to the pump at `index`.
    ///
    /// # Errors
    ///
    /// - [`WellError::NotInitialized`].
    /// - [`WellError::UnknownPump`] for an invalid index.
    /// - [`WellError::PumpReadFailed`] if the pump errors or panics.
    pub fn read_pump(&self, index: usize, query: &[u8]) -> Result<Vec<u8>> {
        self.read(|state| state.live()?.pumps.read(index, &self.address, query))
    }

    // -- quotes -------------------------------------------------------------

    /// Amount of `to` received for paying `amount_in` of `from`.
    ///
    /// # Errors
    ///
    /// - [`WellError::UnknownToken`], [`WellError::InvalidTokenPair`].
    /// - Any error of [`SwapEngine::quote_exact_in`].
    pub fn get_swap_out(
        &self,
        config: &WellConfig,
        from: &Token,
        to: &Token,
        amount_in: Amount,
    ) -> Result<Amount> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let (i, j) = pool.pair(from, to)?;
            let quote = pool
                .swaps()
                .quote_exact_in(pool.tracker.current(), i, j, amount_in)?;
            Ok(quote.amount_out)
        })
    }

    /// Amount of `from` needed to receive exactly `amount_out` of `to`.
    ///
    /// # Errors
    ///
    /// - [`WellError::UnknownToken`], [`WellError::InvalidTokenPair`].
    /// - Any error of [`SwapEngine::quote_exact_out`].
    pub fn get_swap_in(
        &self,
        config: &WellConfig,
        from: &Token,
        to: &Token,
        amount_out: Amount,
    ) -> Result<Amount> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let (i, j) = pool.pair(from, to)?;
            let quote = pool
                .swaps()
                .quote_exact_out(pool.tracker.current(), i, j, amount_out)?;
            Ok(quote.amount_in)
        })
    }

    /// LP shares minted for depositing `amounts_in`.
    ///
    /// # Errors
    ///
    /// Any error of [`LiquidityEngine::quote_add_liquidity`].
    pub fn get_add_liquidity_out(&self, config: &WellConfig, amounts_in: &[Amount]) -> Result<Liquidity> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let quote = pool.liquidity().quote_add_liquidity(
                pool.tracker.current(),
                state.custody.lp_supply(),
                amounts_in,
            )?;
            Ok(quote.lp_amount)
        })
    }

    /// Tokens returned for burning `lp_amount_in` shares.
    ///
    /// # Errors
    ///
    /// Any error of [`LiquidityEngine::quote_remove_liquidity`].
    pub fn get_remove_liquidity_out(&self, config: &WellConfig, lp_amount_in: Liquidity) -> Result<Vec<Amount>> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let quote = pool.liquidity().quote_remove_liquidity(
                pool.tracker.current(),
                state.custody.lp_supply(),
                lp_amount_in,
            )?;
            Ok(quote.amounts)
        })
    }

    /// Amount of `token_out` returned for burning `lp_amount_in` shares.
    ///
    /// # Errors
    ///
    /// [`WellError::UnknownToken`] or any error of
    /// [`LiquidityEngine::quote_remove_liquidity_one_token`].
    pub fn get_remove_liquidity_one_token_out(
        &self,
        config: &WellConfig,
        lp_amount_in: Liquidity,
        token_out: &Token,
    ) -> Result<Amount> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let index = pool.config.index_of(token_out)?;
            let quote = pool.liquidity().quote_remove_liquidity_one_token(
                pool.tracker.current(),
                state.custody.lp_supply(),
                lp_amount_in,
                index,
            )?;
            Ok(quote.amounts[index])
        })
    }

    /// LP shares burned to withdraw exactly `amounts_out`.
    ///
    /// # Errors
    ///
    /// Any error of [`LiquidityEngine::quote_remove_liquidity_imbalanced`].
    pub fn get_remove_liquidity_imbalanced_in(
        &self,
        config: &WellConfig,
        amounts_out: &[Amount],
    ) -> Result<Liquidity> {
        self.read(|state| {
            let pool = state.bound(config)?;
            let quote = pool.liquidity().quote_remove_liquidity_imbalanced(
                pool.tracker.current(),
                state.custody.lp_supply(),
                amounts_out,
            )?;
            Ok(quote.lp_amount)
        })
    }

    // -- swaps --------------------------------------------------------------

    /// Pays exactly `amount_in` of `from` and sends the output of `to` to
    /// the recipient.
    ///
    /// # Errors
    ///
    /// - [`WellError::SlippageExceeded`] if the output is below
    ///   `min_amount_out`.
    /// - [`WellError::Custody`] if a transfer fails; nothing changes.
    /// - Any error of [`Well::get_swap_out`].
    pub fn swap_from(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        from: &Token,
        to: &Token,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Result<Amount> {
        let _span = debug_span!("well.swap_from", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let (i, j) = pool.pair(from, to)?;
            let quote = pool
                .swaps()
                .quote_exact_in(pool.tracker.current(), i, j, amount_in)?;
            if quote.amount_out < min_amount_out {
                return Err(WellError::below_minimum(min_amount_out, quote.amount_out));
            }
            let movements = [
                Movement::In {
                    token: *from,
                    amount: amount_in,
                    from: ctx.caller,
                },
                Movement::Out {
                    token: *to,
                    amount: quote.amount_out,
                    to: ctx.recipient,
                },
            ];
            let event = WellEvent::Swap {
                from_token: *from,
                to_token: *to,
                amount_in,
                amount_out: quote.amount_out,
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(quote.amount_out)
        })
    }

    /// Receives exactly `amount_out` of `to`, paying at most
    /// `max_amount_in` of `from`.  Returns the amount paid.
    ///
    /// # Errors
    ///
    /// - [`WellError::SlippageExceeded`] if the input exceeds
    ///   `max_amount_in`.
    /// - [`WellError::Custody`] if a transfer fails; nothing changes.
    /// - Any error of [`Well::get_swap_in`].
    pub fn swap_to(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        from: &Token,
        to: &Token,
        max_amount_in: Amount,
        amount_out: Amount,
    ) -> Result<Amount> {
        let _span = debug_span!("well.swap_to", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let (i, j) = pool.pair(from, to)?;
            let quote = pool
                .swaps()
                .quote_exact_out(pool.tracker.current(), i, j, amount_out)?;
            if quote.amount_in > max_amount_in {
                return Err(WellError::above_maximum(max_amount_in, quote.amount_in));
            }
            let movements = [
                Movement::In {
                    token: *from,
                    amount: quote.amount_in,
                    from: ctx.caller,
                },
                Movement::Out {
                    token: *to,
                    amount: amount_out,
                    to: ctx.recipient,
                },
            ];
            let event = WellEvent::Swap {
                from_token: *from,
                to_token: *to,
                amount_in: quote.amount_in,
                amount_out,
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(quote.amount_in)
        })
    }

    // -- liquidity ----------------------------------------------------------

    /// Deposits `amounts_in` and mints LP shares to the recipient.
    ///
    /// # Errors
    ///
    /// - [`WellError::SlippageExceeded`] if fewer than `min_lp_out` shares
    ///   would be minted.
    /// - [`WellError::Custody`] if a transfer fails; nothing changes.
    /// - Any error of [`Well::get_add_liquidity_out`].
    pub fn add_liquidity(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        amounts_in: &[Amount],
        min_lp_out: Liquidity,
    ) -> Result<Liquidity> {
        let _span = debug_span!("well.add_liquidity", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let quote = pool.liquidity().quote_add_liquidity(
                pool.tracker.current(),
                state.custody.lp_supply(),
                amounts_in,
            )?;
            if quote.lp_amount < min_lp_out {
                return Err(WellError::below_minimum(
                    Amount::new(min_lp_out.get()),
                    Amount::new(quote.lp_amount.get()),
                ));
            }
            let mut movements: Vec<Movement> = pool
                .config
                .tokens()
                .iter()
                .zip(amounts_in)
                .map(|(token, amount)| Movement::In {
                    token: *token,
                    amount: *amount,
                    from: ctx.caller,
                })
                .collect();
            movements.push(Movement::Mint {
                to: ctx.recipient,
                amount: quote.lp_amount,
            });
            let event = WellEvent::AddLiquidity {
                amounts_in: amounts_in.to_vec(),
                lp_amount_out: quote.lp_amount,
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(quote.lp_amount)
        })
    }

    /// Burns `lp_amount_in` of the caller's shares for a balanced
    /// withdrawal.
    ///
    /// # Errors
    ///
    /// - [`WellError::LengthMismatch`] if `min_amounts_out` has the wrong
    ///   length.
    /// - [`WellError::SlippageExceeded`] for the first token whose output
    ///   is below its bound.
    /// - [`WellError::Custody`] if the burn or a transfer fails.
    /// - Any error of [`Well::get_remove_liquidity_out`].
    pub fn remove_liquidity(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        lp_amount_in: Liquidity,
        min_amounts_out: &[Amount],
    ) -> Result<Vec<Amount>> {
        let _span = debug_span!("well.remove_liquidity", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let token_count = pool.config.token_count();
            if min_amounts_out.len() != token_count {
                return Err(WellError::LengthMismatch {
                    expected: token_count,
                    actual: min_amounts_out.len(),
                });
            }
            let quote = pool.liquidity().quote_remove_liquidity(
                pool.tracker.current(),
                state.custody.lp_supply(),
                lp_amount_in,
            )?;
            if let Some((min, out)) = min_amounts_out
                .iter()
                .zip(&quote.amounts)
                .find(|(min, out)| out < min)
            {
                return Err(WellError::below_minimum(*min, *out));
            }
            let movements = burn_then_pay(pool.config.tokens(), ctx, lp_amount_in, &quote.amounts);
            let event = WellEvent::RemoveLiquidity {
                lp_amount_in,
                amounts_out: quote.amounts.clone(),
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(quote.amounts)
        })
    }

    /// Burns `lp_amount_in` of the caller's shares for `token_out` only.
    ///
    /// # Errors
    ///
    /// - [`WellError::SlippageExceeded`] if the output is below
    ///   `min_amount_out`.
    /// - [`WellError::Custody`] if the burn or the transfer fails.
    /// - Any error of [`Well::get_remove_liquidity_one_token_out`].
    pub fn remove_liquidity_one_token(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        lp_amount_in: Liquidity,
        token_out: &Token,
        min_amount_out: Amount,
    ) -> Result<Amount> {
        let _span = debug_span!("well.remove_liquidity_one_token", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let index = pool.config.index_of(token_out)?;
            let quote = pool.liquidity().quote_remove_liquidity_one_token(
                pool.tracker.current(),
                state.custody.lp_supply(),
                lp_amount_in,
                index,
            )?;
            let amount_out = quote.amounts[index];
            if amount_out < min_amount_out {
                return Err(WellError::below_minimum(min_amount_out, amount_out));
            }
            let movements = [
                Movement::Burn {
                    from: ctx.caller,
                    amount: lp_amount_in,
                },
                Movement::Out {
                    token: *token_out,
                    amount: amount_out,
                    to: ctx.recipient,
                },
            ];
            let event = WellEvent::RemoveLiquidityOneToken {
                lp_amount_in,
                token_out: *token_out,
                amount_out,
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(amount_out)
        })
    }

    /// Withdraws exactly `amounts_out`, burning at most `max_lp_in` of the
    /// caller's shares.  Returns the shares burned.
    ///
    /// # Errors
    ///
    /// - [`WellError::SlippageExceeded`] if more than `max_lp_in` shares
    ///   would be burned.
    /// - [`WellError::Custody`] if the burn or a transfer fails.
    /// - Any error of [`Well::get_remove_liquidity_imbalanced_in`].
    pub fn remove_liquidity_imbalanced(
        &self,
        config: &WellConfig,
        ctx: &CallContext,
        max_lp_in: Liquidity,
        amounts_out: &[Amount],
    ) -> Result<Liquidity> {
        let _span = debug_span!("well.remove_liquidity_imbalanced", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let quote = pool.liquidity().quote_remove_liquidity_imbalanced(
                pool.tracker.current(),
                state.custody.lp_supply(),
                amounts_out,
            )?;
            if quote.lp_amount > max_lp_in {
                return Err(WellError::above_maximum(
                    Amount::new(max_lp_in.get()),
                    Amount::new(quote.lp_amount.get()),
                ));
            }
            let movements = burn_then_pay(pool.config.tokens(), ctx, quote.lp_amount, amounts_out);
            let event = WellEvent::RemoveLiquidity {
                lp_amount_in: quote.lp_amount,
                amounts_out: amounts_out.to_vec(),
                recipient: ctx.recipient,
            };
            self.commit(state, quote.reserves_after, &movements, event)?;
            Ok(quote.lp_amount)
        })
    }

    // -- custody reconciliation ---------------------------------------------

    /// Overwrites the reserves with the pool's custody balances.
    ///
    /// Pumps observe the pre-sync reserves.
    ///
    /// # Errors
    ///
    /// [`WellError::Custody`] if a balance cannot be read.
    pub fn sync(&self, config: &WellConfig) -> Result<Reserves> {
        let _span = debug_span!("well.sync", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let balances = state.balances(pool.config.tokens())?;
            let event = WellEvent::Sync {
                reserves: balances.clone(),
            };
            self.commit(state, balances.clone(), &[], event)?;
            Ok(balances)
        })
    }

    /// Sends every custody balance above the tracked reserve to
    /// `recipient`.  Reserves and pumps are untouched.
    ///
    /// # Errors
    ///
    /// [`WellError::Custody`] if a balance cannot be read or a transfer
    /// fails; earlier transfers are reversed.
    pub fn skim(&self, config: &WellConfig, recipient: &Address) -> Result<Vec<Amount>> {
        let _span = debug_span!("well.skim", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let balances = state.balances(pool.config.tokens())?;
            let excess: Vec<Amount> = balances
                .iter()
                .zip(pool.tracker.current().iter())
                .map(|(held, reserve)| held.checked_sub(reserve).unwrap_or(Amount::ZERO))
                .collect();
            let movements: Vec<Movement> = pool
                .config
                .tokens()
                .iter()
                .zip(&excess)
                .map(|(token, amount)| Movement::Out {
                    token: *token,
                    amount: *amount,
                    to: *recipient,
                })
                .collect();
            settle(state.custody.as_mut(), &movements)?;
            debug!(well = %self.address, %recipient, ?excess, "skimmed");
            Ok(excess)
        })
    }

    /// Treats custody balances above the reserves as swap input and pays
    /// the resulting amount of `token_out` to `recipient`.
    ///
    /// The output keeps the invariant of the current reserves.
    ///
    /// # Errors
    ///
    /// - [`WellError::UnknownToken`] for a token outside the Well.
    /// - [`WellError::InsufficientReserves`] if the balances do not cover
    ///   the current invariant.
    /// - [`WellError::SlippageExceeded`] if the output is below
    ///   `min_amount_out`.
    /// - [`WellError::Custody`] if a balance read or the transfer fails.
    pub fn shift(
        &self,
        config: &WellConfig,
        token_out: &Token,
        min_amount_out: Amount,
        recipient: &Address,
    ) -> Result<Amount> {
        let _span = debug_span!("well.shift", well = %self.address).entered();
        self.write(|state| {
            let pool = state.bound(config)?;
            let index = pool.config.index_of(token_out)?;
            let balances = state.balances(pool.config.tokens())?;
            let target = pool
                .function
                .invariant(pool.tracker.current().as_slice(), pool.data())?;
            let kept = pool
                .function
                .reserve_at_invariant(balances.as_slice(), target, index, pool.data())?;
            let amount_out = balances
                .at(index)?
                .checked_sub(&kept)
                .ok_or(WellError::InsufficientReserves(
                    "balances do not cover the current invariant",
                ))?;
            if amount_out < min_amount_out {
                return Err(WellError::below_minimum(min_amount_out, amount_out));
            }
            let post = balances.with(index, kept)?;
            let movements = [Movement::Out {
                token: *token_out,
                amount: amount_out,
                to: *recipient,
            }];
            let event = WellEvent::Shift {
                reserves: post.clone(),
                token_out: *token_out,
                amount_out,
                recipient: *recipient,
            };
            self.commit(state, post, &movements, event)?;
            Ok(amount_out)
        })
    }
}

/// Burn the caller's shares first, then pay each token to the recipient.
fn burn_then_pay(tokens: &[Token], ctx: &CallContext, lp_amount: Liquidity, amounts: &[Amount]) -> Vec<Movement> {
    core::iter::once(Movement::Burn {
        from: ctx.caller,
        amount: lp_amount,
    })
    .chain(tokens.iter().zip(amounts).map(|(token, amount)| Movement::Out {
        token: *token,
        amount: *amount,
        to: ctx.recipient,
    }))
    .collect()
}

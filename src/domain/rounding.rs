//! Explicit rounding direction for division.

/// Rounding direction for every division the engine performs.
///
/// The engine always rounds in the pool's favour: amounts paid out round
/// [`Down`](Self::Down), amounts owed by the caller round [`Up`](Self::Up).
///
/// # Examples
///
/// ```
/// use well_engine::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert_eq!(Rounding::Up.opposite(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Towards positive infinity (ceiling).
    Up,
    /// Towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// The other direction.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(Rounding::Up.is_up());
        assert!(!Rounding::Up.is_down());
        assert!(Rounding::Down.is_down());
    }

    #[test]
    fn opposite_is_involution() {
        assert_eq!(Rounding::Up.opposite().opposite(), Rounding::Up);
        assert_eq!(Rounding::Down.opposite(), Rounding::Up);
    }
}

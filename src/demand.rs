//! Demand accounting for backpressure.
//!
//! A [`Demand`] is the number of values a subscriber currently allows its
//! publisher to deliver. It is either [`Demand::Unlimited`] or a finite
//! counter, and only ever grows through addition; the producer consumes it
//! one value at a time.

use std::{
  fmt::{Display, Formatter},
  ops::{Add, AddAssign},
};

/// How many more values a subscriber is willing to receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Demand {
  /// No upper bound.
  Unlimited,
  /// At most this many more values.
  Max(usize),
}

impl Demand {
  /// Requests no values. Legal to request, and a no-op when requested.
  pub const NONE: Demand = Demand::Max(0);

  /// Shorthand for [`Demand::Unlimited`].
  pub const UNLIMITED: Demand = Demand::Unlimited;

  #[inline]
  pub fn max(n: usize) -> Self { Demand::Max(n) }

  #[inline]
  pub fn is_none(&self) -> bool { *self == Demand::NONE }

  #[inline]
  pub fn is_unlimited(&self) -> bool { matches!(self, Demand::Unlimited) }

  /// The finite bound, or `None` when unlimited.
  #[inline]
  pub fn as_max(&self) -> Option<usize> {
    match self {
      Demand::Unlimited => None,
      Demand::Max(n) => Some(*n),
    }
  }

  /// Consumes one unit of demand for a value about to be delivered.
  ///
  /// Returns `false` and leaves the counter untouched when no demand is
  /// outstanding. Unlimited demand is never decremented.
  #[inline]
  pub fn consume_one(&mut self) -> bool {
    match self {
      Demand::Unlimited => true,
      Demand::Max(0) => false,
      Demand::Max(n) => {
        *n -= 1;
        true
      }
    }
  }
}

impl Default for Demand {
  #[inline]
  fn default() -> Self { Demand::NONE }
}

impl Add for Demand {
  type Output = Demand;

  /// Saturating addition; a finite overflow becomes unlimited.
  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => a.checked_add(b).map_or(Demand::Unlimited, Demand::Max),
      _ => Demand::Unlimited,
    }
  }
}

impl Add<usize> for Demand {
  type Output = Demand;

  #[inline]
  fn add(self, rhs: usize) -> Demand { self + Demand::Max(rhs) }
}

impl AddAssign for Demand {
  #[inline]
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl From<usize> for Demand {
  #[inline]
  fn from(n: usize) -> Self { Demand::Max(n) }
}

impl Display for Demand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Demand::Unlimited => f.write_str("unlimited"),
      Demand::Max(n) => write!(f, "max({n})"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn addition_saturates_at_unlimited() {
    assert_eq!(Demand::max(2) + Demand::max(3), Demand::max(5));
    assert_eq!(Demand::max(2) + Demand::Unlimited, Demand::Unlimited);
    assert_eq!(Demand::Unlimited + Demand::NONE, Demand::Unlimited);
    assert_eq!(Demand::max(usize::MAX) + 1, Demand::Unlimited);
  }

  #[test]
  fn requesting_none_changes_nothing() {
    let mut demand = Demand::max(4);
    demand += Demand::NONE;
    assert_eq!(demand, Demand::max(4));
  }

  #[test]
  fn consume_never_goes_negative() {
    let mut demand = Demand::max(2);
    assert!(demand.consume_one());
    assert!(demand.consume_one());
    assert!(!demand.consume_one());
    assert_eq!(demand, Demand::NONE);
    assert!(demand.is_none());
  }

  #[test]
  fn unlimited_is_not_decremented() {
    let mut demand = Demand::Unlimited;
    for _ in 0..1000 {
      assert!(demand.consume_one());
    }
    assert!(demand.is_unlimited());
    assert_eq!(demand.as_max(), None);
  }

  #[test]
  fn display() {
    assert_eq!(Demand::Unlimited.to_string(), "unlimited");
    assert_eq!(Demand::max(3).to_string(), "max(3)");
  }
}

//! Fitness alias and the optimization sense used throughout the library.

use std::cmp::Ordering;

/// An alias for a fitness value.
pub type Fitness = f64;

/// The direction in which fitness values improve.
///
/// Every comparison in the crate, from roulette weights to the leader
/// hierarchy, goes through a `Sense`, so an objective declares it once and
/// the rest of the engine follows.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Sense {
  /// Lower fitness is better.
  #[default]
  Minimize,
  /// Higher fitness is better.
  Maximize,
}

impl Sense {
  /// Returns `true` if `a` is *strictly* better than `b`.
  ///
  /// `NaN` is never better than anything.
  pub fn is_better(self, a: Fitness, b: Fitness) -> bool {
    match self {
      Sense::Minimize => a < b,
      Sense::Maximize => a > b,
    }
  }

  /// Orders two fitness values so that the better one compares as `Less`.
  /// `NaN` sorts after everything else.
  pub fn compare(self, a: Fitness, b: Fitness) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Greater,
      (false, true) => Ordering::Less,
      _ => match self {
        Sense::Minimize => a.total_cmp(&b),
        Sense::Maximize => b.total_cmp(&a),
      },
    }
  }

  /// The worst representable fitness under this sense.
  pub fn worst(self) -> Fitness {
    match self {
      Sense::Minimize => Fitness::INFINITY,
      Sense::Maximize => Fitness::NEG_INFINITY,
    }
  }

  /// Returns index and value of the best fitness in a slice. Ties keep the
  /// first occurrence.
  pub fn best_of(self, fitness: &[Fitness]) -> Option<(usize, Fitness)> {
    fitness
      .iter()
      .copied()
      .enumerate()
      .reduce(|best, next| {
        if self.is_better(next.1, best.1) {
          next
        } else {
          best
        }
      })
  }
}

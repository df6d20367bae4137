//! Stopping policies and cancellation.

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use crate::{
  error::{Error, Result},
  history::History,
};

/// A custom stopping condition, checked after every iteration.
///
/// # Examples
/// ```
/// # use popsearch::{history::History, termination::Terminator};
/// // stop as soon as the best fitness drops below a target
/// let mut t = |h: &History| h.last().is_some_and(|r| r.best < 1e-6);
/// assert!(!t.terminate(&History::new()));
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Terminator {
  /// If returns `true`, the run is terminated.
  fn terminate(&mut self, history: &History) -> bool;
}

impl<F> Terminator for F
where
  F: FnMut(&History) -> bool,
{
  fn terminate(&mut self, history: &History) -> bool {
    self(history)
  }
}

/// A handle that stops a run from the outside.
///
/// Clones share the same flag, so one of them can be moved to another thread
/// and cancelled there while the controller observes another one between
/// iterations.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  /// Creates a token that is not cancelled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation. The run stops after the current iteration.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  /// Returns `true` if cancellation was requested.
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

/// Why a run stopped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StopReason {
  /// The iteration budget was used up.
  Budget,
  /// The best fitness stopped changing.
  Stagnation,
  /// A [`CancellationToken`] was cancelled.
  Cancelled,
  /// A custom [`Terminator`] fired.
  Custom,
}

/// When to stop a run before the iteration budget is used up.
///
/// The budget always caps a run; a policy can only stop it earlier.
#[derive(Default)]
pub enum Termination {
  /// Run the whole budget.
  #[default]
  Budget,
  /// Stop once the best fitness did not change for given number of
  /// consecutive iterations, at least 1.
  Stagnation(usize),
  /// Stop once the token is cancelled.
  Cancelled(CancellationToken),
  /// Stop when a custom condition holds.
  Custom(Box<dyn Terminator + Send>),
  /// Stop when any of the policies fires.
  Any(Vec<Termination>),
}

impl Termination {
  /// Wraps a custom condition.
  pub fn custom<T: Terminator + Send + 'static>(terminator: T) -> Self {
    Self::Custom(Box::new(terminator))
  }

  /// Rejects a stagnation window of 0, including inside [`Termination::Any`].
  pub fn validate(&self) -> Result<()> {
    match self {
      Termination::Stagnation(0) => Err(Error::invalid(
        "termination",
        "stagnation window must be at least 1",
      )),
      Termination::Any(policies) => {
        policies.iter().try_for_each(Termination::validate)
      }
      _ => Ok(()),
    }
  }

  /// Checks the policy against the history, returning the reason to stop if
  /// any. Every policy of [`Termination::Any`] is checked, so stateful
  /// terminators observe every iteration.
  pub fn check(&mut self, history: &History) -> Option<StopReason> {
    match self {
      Termination::Budget => None,
      Termination::Stagnation(k) => {
        (history.stagnation() >= *k).then_some(StopReason::Stagnation)
      }
      Termination::Cancelled(token) => {
        token.is_cancelled().then_some(StopReason::Cancelled)
      }
      Termination::Custom(t) => {
        t.terminate(history).then_some(StopReason::Custom)
      }
      Termination::Any(policies) => policies
        .iter_mut()
        .fold(None, |reason, p| {
          let fired = p.check(history);
          reason.or(fired)
        }),
    }
  }
}

impl Terminator for Termination {
  fn terminate(&mut self, history: &History) -> bool {
    self.check(history).is_some()
  }
}

impl fmt::Debug for Termination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Termination::Budget => write!(f, "Budget"),
      Termination::Stagnation(k) => {
        f.debug_tuple("Stagnation").field(k).finish()
      }
      Termination::Cancelled(t) => {
        f.debug_tuple("Cancelled").field(t).finish()
      }
      Termination::Custom(_) => write!(f, "Custom(..)"),
      Termination::Any(p) => f.debug_tuple("Any").field(p).finish(),
    }
  }
}

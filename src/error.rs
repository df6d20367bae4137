//! Errors reported by the engine.

use crate::history::History;

/// An alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop a run.
///
/// Algorithmic edge cases, such as a roulette wheel with no positive weight
/// or a Lévy step blowing up, are recovered where they happen and never
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A parameter is outside of its documented range. Reported before the
  /// first iteration.
  #[error("invalid configuration: {parameter}: {reason}")]
  InvalidConfiguration {
    /// Name of the offending parameter.
    parameter: &'static str,
    /// What is wrong with it.
    reason: String,
  },
  /// The objective function failed for a candidate. The run terminates with
  /// the history collected so far.
  #[error("objective evaluation failed for genes {genes}: {message}")]
  ObjectiveEvaluation {
    /// Debug representation of the offending genes.
    genes: String,
    /// The failure reported by the objective.
    message: String,
    /// Records of every iteration completed before the failure.
    history: History,
  },
}

impl Error {
  pub(crate) fn invalid(
    parameter: &'static str,
    reason: impl Into<String>,
  ) -> Self {
    Self::InvalidConfiguration {
      parameter,
      reason: reason.into(),
    }
  }

  /// Attaches the history of the run to an evaluation failure.
  pub(crate) fn with_history(self, history: &History) -> Self {
    match self {
      Error::ObjectiveEvaluation { genes, message, .. } => {
        Error::ObjectiveEvaluation {
          genes,
          message,
          history: history.clone(),
        }
      }
      other => other,
    }
  }

  /// Returns the partial history carried by an evaluation failure.
  pub fn history(&self) -> Option<&History> {
    match self {
      Error::ObjectiveEvaluation { history, .. } => Some(history),
      Error::InvalidConfiguration { .. } => None,
    }
  }
}

/// Checks that a probability lies in `[0, 1]`.
pub(crate) fn check_probability(
  parameter: &'static str,
  value: f64,
) -> Result<()> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(Error::invalid(parameter, format!("must be in [0, 1], got {value}")))
  }
}

/// Checks that a coefficient is finite and nonnegative.
pub(crate) fn check_nonnegative(
  parameter: &'static str,
  value: f64,
) -> Result<()> {
  if value.is_finite() && value >= 0.0 {
    Ok(())
  } else {
    Err(Error::invalid(
      parameter,
      format!("must be finite and nonnegative, got {value}"),
    ))
  }
}

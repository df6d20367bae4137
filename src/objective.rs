//! The objective adapter: a scalar function, its sense, and optional
//! feasibility and gene-expression layers.

use std::fmt;

use crate::score::{Fitness, Sense};

/// A failure reported by an objective function.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[error("{0}")]
pub struct EvaluationFailure(pub String);

/// A scalar function of a gene vector.
///
/// Implemented for every closure of type `Fn(&[G]) -> f64`. A function that
/// may fail should be wrapped into [`Fallible`] instead.
///
/// # Examples
/// ```
/// # use popsearch::objective::ObjectiveFunction;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]), Ok(5.0));
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait ObjectiveFunction<G> {
  /// Returns the fitness of given genes. Must not depend on any state that
  /// changes between calls.
  fn evaluate(&self, genes: &[G]) -> Result<Fitness, EvaluationFailure>;
}

impl<G, F> ObjectiveFunction<G> for F
where
  F: Fn(&[G]) -> Fitness,
{
  fn evaluate(&self, genes: &[G]) -> Result<Fitness, EvaluationFailure> {
    Ok(self(genes))
  }
}

/// Wraps a function that may fail, i.e. `Fn(&[G]) -> Result<f64, E>`.
///
/// # Examples
/// ```
/// # use popsearch::objective::{Fallible, ObjectiveFunction};
/// let log = Fallible(|x: &[f64]| {
///   if x[0] > 0.0 { Ok(x[0].ln()) } else { Err("log of nonpositive") }
/// });
/// assert!(log.evaluate(&[-1.0]).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Fallible<F>(pub F);

impl<G, F, E> ObjectiveFunction<G> for Fallible<F>
where
  F: Fn(&[G]) -> Result<Fitness, E>,
  E: fmt::Display,
{
  fn evaluate(&self, genes: &[G]) -> Result<Fitness, EvaluationFailure> {
    (self.0)(genes).map_err(|e| EvaluationFailure(e.to_string()))
  }
}

/// Maps a real-valued gene vector to the single scalar the objective is
/// applied to, for encodings where genes are not the decision variable
/// themselves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Expression {
  /// Genes are passed to the objective unchanged.
  #[default]
  Identity,
  /// The arithmetic mean of the genes.
  Mean,
  /// The sum of the genes.
  Sum,
}

impl Expression {
  /// Expresses genes as a scalar. `Identity` returns the first gene.
  pub fn express(self, genes: &[f64]) -> f64 {
    match self {
      Expression::Identity => genes.first().copied().unwrap_or_default(),
      Expression::Mean if genes.is_empty() => 0.0,
      Expression::Mean => genes.iter().sum::<f64>() / genes.len() as f64,
      Expression::Sum => genes.iter().sum(),
    }
  }
}

/// Maps genes to the scalar handed to the function, `None` for identity.
type Expresser<G> = fn(Expression, &[G]) -> Option<G>;

fn express_real(expression: Expression, genes: &[f64]) -> Option<f64> {
  match expression {
    Expression::Identity => None,
    e => Some(e.express(genes)),
  }
}

struct Constraint<G> {
  feasible: Box<dyn Fn(&[G]) -> bool + Send + Sync>,
  penalty: Fitness,
}

/// An objective adapter: the function to optimize together with the sense
/// in which it is optimized.
///
/// Constrained domains declare a feasibility predicate and a penalty with
/// [`Objective::with_constraint`]. Infeasible genes then evaluate to the
/// penalty and the function itself is never called for them.
///
/// # Examples
/// ```
/// # use popsearch::{objective::Objective, score::Sense};
/// let weights = [10.0, 20.0, 30.0];
/// let values = [60.0, 100.0, 120.0];
/// let value = move |x: &[u8]| {
///   x.iter().zip(values).map(|(b, v)| *b as f64 * v).sum::<f64>()
/// };
/// let knapsack = Objective::maximize(value).with_constraint(
///   move |x: &[u8]| {
///     x.iter().zip(weights).map(|(b, w)| *b as f64 * w).sum::<f64>() <= 50.0
///   },
///   0.0,
/// );
/// assert_eq!(knapsack.sense(), Sense::Maximize);
/// assert_eq!(knapsack.evaluate(&[1, 1, 0]), Ok(160.0));
/// assert_eq!(knapsack.evaluate(&[1, 1, 1]), Ok(0.0));
/// ```
pub struct Objective<G = f64> {
  function: Box<dyn ObjectiveFunction<G> + Send + Sync>,
  sense: Sense,
  constraint: Option<Constraint<G>>,
  expression: Expression,
  expresser: Expresser<G>,
}

impl<G> Objective<G> {
  /// Creates an objective optimized in given sense.
  pub fn new<F>(sense: Sense, function: F) -> Self
  where
    F: ObjectiveFunction<G> + Send + Sync + 'static,
  {
    Self {
      function: Box::new(function),
      sense,
      constraint: None,
      expression: Expression::Identity,
      expresser: |_, _| None,
    }
  }

  /// Creates an objective whose lower values are better.
  pub fn minimize<F>(function: F) -> Self
  where
    F: ObjectiveFunction<G> + Send + Sync + 'static,
  {
    Self::new(Sense::Minimize, function)
  }

  /// Creates an objective whose higher values are better.
  pub fn maximize<F>(function: F) -> Self
  where
    F: ObjectiveFunction<G> + Send + Sync + 'static,
  {
    Self::new(Sense::Maximize, function)
  }

  /// Declares a feasibility predicate. Genes for which it returns `false`
  /// evaluate to `penalty`.
  pub fn with_constraint<P>(mut self, feasible: P, penalty: Fitness) -> Self
  where
    P: Fn(&[G]) -> bool + Send + Sync + 'static,
  {
    self.constraint = Some(Constraint {
      feasible: Box::new(feasible),
      penalty,
    });
    self
  }

  /// The declared sense.
  pub fn sense(&self) -> Sense {
    self.sense
  }

  /// The declared gene expression.
  pub fn expression(&self) -> Expression {
    self.expression
  }

  /// Returns `false` if genes violate the declared constraint.
  pub fn is_feasible(&self, genes: &[G]) -> bool {
    self.constraint.as_ref().is_none_or(|c| (c.feasible)(genes))
  }

  /// Evaluates genes. Never mutates them.
  ///
  /// Infeasible genes evaluate to the declared penalty. A `NaN` returned by
  /// the function is reported as a failure since it cannot be ranked.
  pub fn evaluate(&self, genes: &[G]) -> Result<Fitness, EvaluationFailure> {
    if let Some(c) = &self.constraint {
      if !(c.feasible)(genes) {
        return Ok(c.penalty);
      }
    }
    let value = match (self.expresser)(self.expression, genes) {
      Some(scalar) => self.function.evaluate(std::slice::from_ref(&scalar))?,
      None => self.function.evaluate(genes)?,
    };
    match value {
      f if f.is_nan() => {
        Err(EvaluationFailure("objective returned NaN".to_string()))
      }
      f => Ok(f),
    }
  }
}

impl Objective<f64> {
  /// Applies `expression` to genes before they reach the function, which
  /// then receives a single-element slice.
  pub fn with_expression(mut self, expression: Expression) -> Self {
    self.expression = expression;
    self.expresser = express_real;
    self
  }
}

impl<G> fmt::Debug for Objective<G> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Objective")
      .field("sense", &self.sense)
      .field("constrained", &self.constraint.is_some())
      .field("penalty", &self.constraint.as_ref().map(|c| c.penalty))
      .field("expression", &self.expression)
      .finish_non_exhaustive()
  }
}

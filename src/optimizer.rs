//! The convergence controller.

use std::fmt::Debug;

use rand::Rng;
use tracing::instrument;
use typed_builder::TypedBuilder;

use crate::{
  error::{Error, Result},
  execution::Execution,
  history::History,
  leaders::{Leader, Leaders},
  objective::Objective,
  population::Population,
  score::Fitness,
  termination::{StopReason, Termination},
  variation::{Step, Variation},
};

/// Lifecycle of an [`Optimizer`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum State {
  /// Built, nothing evaluated yet.
  #[default]
  Initialized,
  /// At least one iteration has started.
  Running,
  /// Stopped, either by the budget, the termination policy or a failure.
  /// Further steps do nothing.
  Terminated,
}

/// The result of a finished run.
#[derive(Clone, PartialEq, Debug)]
pub struct Outcome<G> {
  /// Genes of the best candidate found.
  pub best: Vec<G>,
  /// Fitness of `best`.
  pub fitness: Fitness,
  /// Best-so-far fitness of every iteration.
  pub history: History,
  /// What stopped the run.
  pub stopped_by: StopReason,
}

/// Drives a population through the evaluate, track, record, vary cycle.
///
/// Each iteration the controller lets the variation operator prepare the
/// population, evaluates every candidate, offers the pass to the leaders,
/// appends the best-so-far fitness to the history and checks whether to
/// stop. If the run goes on, the operator turns the population into the
/// next generation.
///
/// At least one iteration always runs. The iteration budget caps the run,
/// the termination policy may only stop it earlier.
///
/// # Examples
/// ```
/// # use popsearch::{
/// #   bounds::Bounds, objective::Objective, optimizer::Optimizer,
/// #   population::Population, swarm::ParticleSwarm, termination::Termination,
/// # };
/// # use rand::{rngs::StdRng, SeedableRng};
/// let mut rng = StdRng::seed_from_u64(42);
/// let bounds = Bounds::uniform(-10.0, 10.0, 1).unwrap();
/// let outcome = Optimizer::builder()
///   .population(Population::random(10, &bounds, &mut rng).unwrap())
///   .objective(Objective::maximize(|x: &[f64]| -x[0] * x[0] + 5.0 * x[0] + 20.0))
///   .variation(ParticleSwarm::builder().build())
///   .iterations(100)
///   .termination(Termination::Stagnation(1))
///   .rng(rng)
///   .build()
///   .optimize()
///   .unwrap();
/// assert!(outcome.fitness <= 26.25);
/// ```
#[derive(TypedBuilder)]
pub struct Optimizer<G, V, R>
where
  G: Clone,
  V: Variation<G>,
  R: Rng,
{
  /// The initial population.
  population: Population<G>,
  objective: Objective<G>,
  /// The algorithm-specific update rule.
  variation: V,
  /// Iteration budget, at least 1.
  iterations: usize,
  /// Source of every random draw of the run.
  rng: R,
  #[builder(default)]
  execution: Execution,
  #[builder(default)]
  termination: Termination,
  #[builder(setter(skip), default)]
  leaders: V::Leaders,
  #[builder(setter(skip), default)]
  history: History,
  #[builder(setter(skip), default)]
  iteration: usize,
  #[builder(setter(skip), default)]
  state: State,
  #[builder(setter(skip), default)]
  stopped_by: Option<StopReason>,
}

impl<G, V, R> Optimizer<G, V, R>
where
  G: Clone + Debug + Send + Sync,
  V: Variation<G>,
  R: Rng,
{
  /// Current lifecycle state.
  pub fn state(&self) -> State {
    self.state
  }

  /// Number of completed iterations.
  pub fn iteration(&self) -> usize {
    self.iteration
  }

  /// Records of every completed iteration.
  pub fn history(&self) -> &History {
    &self.history
  }

  /// The current population.
  pub fn population(&self) -> &Population<G> {
    &self.population
  }

  /// Leader state of the run.
  pub fn leaders(&self) -> &V::Leaders {
    &self.leaders
  }

  /// Best solution found so far.
  pub fn best(&self) -> Option<&Leader<G>> {
    self.leaders.best()
  }

  /// The variation operator, with whatever state it accumulated.
  pub fn variation(&self) -> &V {
    &self.variation
  }

  /// What stopped the run, once it is terminated by the budget or the
  /// termination policy.
  pub fn stopped_by(&self) -> Option<StopReason> {
    self.stopped_by
  }

  /// Checks the configuration without evaluating anything.
  pub fn validate(&self) -> Result<()> {
    if self.iterations == 0 {
      return Err(Error::invalid("iterations", "must be at least 1"));
    }
    self.termination.validate()?;
    self.variation.validate(&self.population)
  }

  /// Runs a single iteration and returns the state afterwards.
  ///
  /// The configuration is validated before the first iteration. Stepping a
  /// terminated optimizer does nothing. An objective failure terminates the
  /// run and is returned with the history collected before it.
  #[instrument(level = "debug", skip(self), fields(iteration = self.iteration))]
  pub fn step(&mut self) -> Result<State> {
    match self.state {
      State::Terminated => return Ok(State::Terminated),
      State::Initialized => {
        self.validate()?;
        self.state = State::Running;
      }
      State::Running => {}
    }

    self.variation.prepare(&mut self.population);
    let fitness = self
      .population
      .evaluate(&self.objective, self.execution)
      .map_err(|e| self.fail(e))?;

    let sense = self.objective.sense();
    if self.leaders.update(&self.population, &fitness, sense) {
      tracing::debug!(best = self.best_fitness(), "best fitness improved");
    }
    self.history.push(self.iteration, self.best_fitness());
    self.iteration += 1;

    let policy = self.termination.check(&self.history);
    let stop = policy.or_else(|| {
      (self.iteration >= self.iterations).then_some(StopReason::Budget)
    });
    if let Some(reason) = stop {
      self.state = State::Terminated;
      self.stopped_by = Some(reason);
      tracing::info!(
        iterations = self.iteration,
        best = self.best_fitness(),
        ?reason,
        "optimization finished"
      );
      return Ok(self.state);
    }

    let step = Step {
      population: &mut self.population,
      fitness: &fitness,
      leaders: &mut self.leaders,
      objective: &self.objective,
      iteration: self.iteration - 1,
      budget: self.iterations,
    };
    self
      .variation
      .vary(step, &mut self.rng)
      .map_err(|e| self.fail(e))?;
    Ok(self.state)
  }

  /// Runs iterations until the run terminates.
  pub fn optimize(mut self) -> Result<Outcome<G>> {
    while self.step()? != State::Terminated {}
    let (Some(best), Some(stopped_by)) =
      (self.leaders.best().cloned(), self.stopped_by)
    else {
      return Err(Error::invalid("population", "nothing was evaluated"));
    };
    Ok(Outcome {
      best: best.genes,
      fitness: best.fitness,
      history: self.history,
      stopped_by,
    })
  }

  fn best_fitness(&self) -> Fitness {
    self
      .leaders
      .best()
      .map_or(self.objective.sense().worst(), |l| l.fitness)
  }

  fn fail(&mut self, error: Error) -> Error {
    self.state = State::Terminated;
    error.with_history(&self.history)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{
    bounds::Bounds,
    genetic::Genetic,
    objective::Fallible,
    termination::CancellationToken,
  };

  fn population() -> Population {
    Population::from_genes(vec![vec![0.5, 1.0], vec![-1.0, 0.0]]).unwrap()
  }

  fn genetic() -> Genetic {
    Genetic::builder()
      .bounds(Bounds::uniform(-2.0, 2.0, 2).unwrap())
      .build()
  }

  fn sphere() -> Objective {
    Objective::minimize(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())
  }

  #[test]
  fn test_states() {
    let mut optimizer = Optimizer::builder()
      .population(population())
      .objective(sphere())
      .variation(genetic())
      .iterations(2)
      .rng(StdRng::seed_from_u64(0))
      .build();
    assert_eq!(optimizer.state(), State::Initialized);
    assert_eq!(optimizer.step().unwrap(), State::Running);
    assert_eq!(optimizer.history().len(), 1);
    assert_eq!(optimizer.step().unwrap(), State::Terminated);
    assert_eq!(optimizer.stopped_by(), Some(StopReason::Budget));
    assert_eq!(optimizer.step().unwrap(), State::Terminated);
    assert_eq!(optimizer.history().len(), 2);
    assert_eq!(optimizer.iteration(), 2);
  }

  #[test]
  fn test_invalid_configuration_fails_before_evaluation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let objective = Objective::minimize(move |x: &[f64]| {
      seen.fetch_add(1, Ordering::Relaxed);
      x[0]
    });
    let result = Optimizer::builder()
      .population(population())
      .objective(objective)
      .variation(
        Genetic::builder()
          .bounds(Bounds::uniform(-2.0, 2.0, 2).unwrap())
          .crossover_rate(1.5)
          .build(),
      )
      .iterations(10)
      .rng(StdRng::seed_from_u64(0))
      .build()
      .optimize();
    assert!(matches!(
      result,
      Err(Error::InvalidConfiguration {
        parameter: "crossover_rate",
        ..
      })
    ));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
  }

  #[test]
  fn test_zero_budget_is_invalid() {
    let mut optimizer = Optimizer::builder()
      .population(population())
      .objective(sphere())
      .variation(genetic())
      .iterations(0)
      .rng(StdRng::seed_from_u64(0))
      .build();
    assert!(optimizer.validate().is_err());
    assert!(optimizer.step().is_err());
    assert!(optimizer.history().is_empty());
  }

  #[test]
  fn test_failure_terminates_with_partial_history() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    // fails after a few passes
    let objective = Objective::minimize(Fallible(move |x: &[f64]| {
      if seen.fetch_add(1, Ordering::Relaxed) >= 4 {
        Err("diverged")
      } else {
        Ok(x[0] * x[0])
      }
    }));
    let mut optimizer = Optimizer::builder()
      .population(population())
      .objective(objective)
      .variation(genetic())
      .iterations(10)
      .rng(StdRng::seed_from_u64(1))
      .build();
    let mut failure = None;
    for _ in 0..10 {
      if let Err(e) = optimizer.step() {
        failure = Some(e);
        break;
      }
    }
    let failure = failure.unwrap();
    assert_eq!(optimizer.state(), State::Terminated);
    let history = failure.history().unwrap();
    assert!(!history.is_empty());
    assert_eq!(history, optimizer.history());
  }

  #[test]
  fn test_cancellation_stops_after_current_iteration() {
    let token = CancellationToken::new();
    let mut optimizer = Optimizer::builder()
      .population(population())
      .objective(sphere())
      .variation(genetic())
      .iterations(100)
      .termination(Termination::Cancelled(token.clone()))
      .rng(StdRng::seed_from_u64(0))
      .build();
    optimizer.step().unwrap();
    optimizer.step().unwrap();
    token.cancel();
    assert_eq!(optimizer.step().unwrap(), State::Terminated);
    assert_eq!(optimizer.history().len(), 3);
    assert_eq!(optimizer.stopped_by(), Some(StopReason::Cancelled));
  }

  #[test]
  fn test_history_is_monotone() {
    let mut rng = StdRng::seed_from_u64(3);
    let bounds = Bounds::uniform(-2.0, 2.0, 2).unwrap();
    let outcome = Optimizer::builder()
      .population(Population::random(20, &bounds, &mut rng).unwrap())
      .objective(sphere())
      .variation(genetic())
      .iterations(30)
      .execution(Execution::ParallelEach)
      .rng(rng)
      .build()
      .optimize()
      .unwrap();
    assert_eq!(outcome.history.len(), 30);
    assert_eq!(outcome.stopped_by, StopReason::Budget);
    let curve = outcome.history.curve();
    assert!(curve.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(curve.last(), Some(&outcome.fitness));
  }
}

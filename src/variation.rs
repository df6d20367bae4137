//! The variation operator: the pluggable, algorithm-specific update rule.
//!
//! The controller drives every algorithm through the same cycle: evaluate,
//! update leaders, record, vary. What differs between algorithms is captured
//! by one implementation of [`Variation`] each, which also owns whatever
//! state the algorithm carries between iterations (velocities, pheromone
//! trails, ...).
//!
//! | Operator                              | Genes | Leaders           |
//! |:--------------------------------------|:-----:|:-----------------:|
//! | [`Genetic`](crate::genetic::Genetic)           | `f64` | [`BestTracker`]   |
//! | [`ParticleSwarm`](crate::swarm::ParticleSwarm) | `f64` | [`BestTracker`]   |
//! | [`AntColony`](crate::colony::AntColony)        | `usize` | [`BestTracker`] |
//! | [`CuckooSearch`](crate::cuckoo::CuckooSearch)  | `u8`  | [`BestTracker`]   |
//! | [`GreyWolf`](crate::wolves::GreyWolf)          | `f64` | [`Hierarchy`]     |
//! | [`Cellular`](crate::cellular::Cellular)        | `f64` | [`BestTracker`]   |
//!
//! [`BestTracker`]: crate::leaders::BestTracker
//! [`Hierarchy`]: crate::leaders::Hierarchy

use rand::Rng;

use crate::{
  error::Result,
  leaders::Leaders,
  objective::Objective,
  population::Population,
  score::Fitness,
};

/// Everything an operator sees during one variation phase.
pub struct Step<'a, G, L> {
  /// The population to turn into the next generation, in place.
  pub population: &'a mut Population<G>,
  /// Fitness of each candidate of `population` as evaluated in this pass.
  /// Stays untouched while the population is being varied.
  pub fitness: &'a [Fitness],
  /// Leader state updated with this pass.
  pub leaders: &'a mut L,
  /// The objective, for operators that evaluate offspring themselves.
  pub objective: &'a Objective<G>,
  /// Zero-based index of the current iteration.
  pub iteration: usize,
  /// Iteration budget of the run.
  pub budget: usize,
}

impl<G: Clone, L: Leaders<G>> Step<'_, G, L> {
  /// Offers a candidate evaluated by the operator itself to the leaders.
  pub fn offer(&mut self, genes: &[G], fitness: Fitness) -> bool {
    self.leaders.observe(genes, fitness, self.objective.sense())
  }
}

/// Produces the next population from the current one.
///
/// Implementations must read the pass's fitness snapshot and leader state
/// only as they were when `vary` was called: every candidate is updated
/// against the same prior generation.
pub trait Variation<G: Clone> {
  /// The leader state this operator is guided by.
  type Leaders: Leaders<G>;

  /// Checks operator parameters against the initial population. Called by
  /// the controller before the first iteration.
  fn validate(&self, population: &Population<G>) -> Result<()> {
    let _ = population;
    Ok(())
  }

  /// Adjusts candidates right before each evaluation pass, e.g. clipping
  /// them into bounds.
  fn prepare(&mut self, population: &mut Population<G>) {
    let _ = population;
  }

  /// Turns the evaluated population into the next one.
  fn vary<R: Rng + ?Sized>(
    &mut self,
    step: Step<'_, G, Self::Leaders>,
    rng: &mut R,
  ) -> Result<()>;
}

//! Trackers of the best solutions found so far.
//!
//! A tracker is handed every evaluation pass and decides what becomes the
//! new recorded best under the objective's [`Sense`]. Recorded values are
//! only ever overwritten on strict improvement, so the best-so-far fitness
//! never regresses.

use crate::{
  population::Population,
  score::{Fitness, Sense},
};

/// A recorded solution: a copy of its genes and its fitness.
#[derive(Clone, PartialEq, Debug)]
pub struct Leader<G> {
  /// Genes at the time of recording.
  pub genes: Vec<G>,
  /// Fitness of `genes`.
  pub fitness: Fitness,
}

impl<G: Clone> Leader<G> {
  fn new(genes: &[G], fitness: Fitness) -> Self {
    Self {
      genes: genes.to_vec(),
      fitness,
    }
  }
}

/// Keeps track of the best solution(s) seen during a run.
pub trait Leaders<G: Clone>: Default {
  /// Offers a single evaluated gene vector. Returns `true` if the best
  /// recorded fitness improved.
  fn observe(&mut self, genes: &[G], fitness: Fitness, sense: Sense) -> bool;

  /// Offers a whole evaluation pass. Returns `true` if the best recorded
  /// fitness improved.
  fn update(
    &mut self,
    population: &Population<G>,
    fitness: &[Fitness],
    sense: Sense,
  ) -> bool {
    population
      .iter()
      .zip(fitness)
      .fold(false, |improved, (candidate, f)| {
        self.observe(candidate.genes(), *f, sense) || improved
      })
  }

  /// The best solution recorded so far.
  fn best(&self) -> Option<&Leader<G>>;
}

/// Tracks a single global best.
#[derive(Clone, PartialEq, Debug)]
pub struct BestTracker<G> {
  best: Option<Leader<G>>,
}

impl<G> Default for BestTracker<G> {
  fn default() -> Self {
    Self { best: None }
  }
}

impl<G: Clone> Leaders<G> for BestTracker<G> {
  fn observe(&mut self, genes: &[G], fitness: Fitness, sense: Sense) -> bool {
    let improves = self
      .best
      .as_ref()
      .map_or(!fitness.is_nan(), |b| sense.is_better(fitness, b.fitness));
    if improves {
      self.best = Some(Leader::new(genes, fitness));
    }
    improves
  }

  fn update(
    &mut self,
    population: &Population<G>,
    fitness: &[Fitness],
    sense: Sense,
  ) -> bool {
    match sense.best_of(fitness) {
      Some((i, f)) => self.observe(population[i].genes(), f, sense),
      None => false,
    }
  }

  fn best(&self) -> Option<&Leader<G>> {
    self.best.as_ref()
  }
}

/// The three best-ranked solutions, alpha ahead of beta ahead of delta.
///
/// A newcomer that beats alpha pushes alpha down to beta and beta down to
/// delta; otherwise it is compared with beta (pushing beta down to delta),
/// then with delta. After every observation `alpha`, `beta` and `delta` are
/// ordered from best to worst under the sense they were observed with.
#[derive(Clone, PartialEq, Debug)]
pub struct Hierarchy<G> {
  alpha: Option<Leader<G>>,
  beta: Option<Leader<G>>,
  delta: Option<Leader<G>>,
}

impl<G> Default for Hierarchy<G> {
  fn default() -> Self {
    Self {
      alpha: None,
      beta: None,
      delta: None,
    }
  }
}

impl<G> Hierarchy<G> {
  /// The best recorded solution.
  pub fn alpha(&self) -> Option<&Leader<G>> {
    self.alpha.as_ref()
  }

  /// The second best recorded solution.
  pub fn beta(&self) -> Option<&Leader<G>> {
    self.beta.as_ref()
  }

  /// The third best recorded solution.
  pub fn delta(&self) -> Option<&Leader<G>> {
    self.delta.as_ref()
  }

  /// Alpha, beta and delta, with empty lower slots filled by the nearest
  /// occupied slot above them. `None` until something is observed.
  pub fn guides(&self) -> Option<[&Leader<G>; 3]> {
    let alpha = self.alpha.as_ref()?;
    let beta = self.beta.as_ref().unwrap_or(alpha);
    let delta = self.delta.as_ref().unwrap_or(beta);
    Some([alpha, beta, delta])
  }

  /// Returns `true` if occupied slots are ordered from best to worst.
  pub fn is_ordered(&self, sense: Sense) -> bool {
    let scores: Vec<Fitness> = [&self.alpha, &self.beta, &self.delta]
      .into_iter()
      .flatten()
      .map(|l| l.fitness)
      .collect();
    scores.windows(2).all(|w| !sense.is_better(w[1], w[0]))
  }
}

impl<G: Clone> Leaders<G> for Hierarchy<G> {
  fn observe(&mut self, genes: &[G], fitness: Fitness, sense: Sense) -> bool {
    if fitness.is_nan() {
      return false;
    }
    let beats = |slot: &Option<Leader<G>>| {
      slot
        .as_ref()
        .is_none_or(|l| sense.is_better(fitness, l.fitness))
    };
    if beats(&self.alpha) {
      self.delta = self.beta.take();
      self.beta = self.alpha.take();
      self.alpha = Some(Leader::new(genes, fitness));
      true
    } else {
      if beats(&self.beta) {
        self.delta = self.beta.take();
        self.beta = Some(Leader::new(genes, fitness));
      } else if beats(&self.delta) {
        self.delta = Some(Leader::new(genes, fitness));
      }
      false
    }
  }

  fn best(&self) -> Option<&Leader<G>> {
    self.alpha.as_ref()
  }
}

//! Genetic / gene-expression variant: roulette selection, single-point
//! crossover and uniform-reset mutation.
//!
//! When genes are not the decision variable themselves, declare an
//! [`Expression`](crate::objective::Expression) on the objective; the
//! operator itself is oblivious to it.

use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  bounds::Bounds,
  candidate::Candidate,
  error::{check_probability, Error, Result},
  leaders::BestTracker,
  population::Population,
  score::{Fitness, Sense},
  variation::{Step, Variation},
};

/// The genetic variant.
///
/// Parents are picked with fitness-proportionate selection, recombined
/// pairwise and mutated until a full new generation exists, which then
/// replaces the old one.
///
/// # Examples
/// ```
/// # use popsearch::{bounds::Bounds, genetic::Genetic};
/// let genetic = Genetic::builder()
///   .bounds(Bounds::uniform(-1.0, 2.0, 10).unwrap())
///   .crossover_rate(0.8)
///   .mutation_rate(0.05)
///   .build();
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct Genetic {
  /// Range fresh genes are drawn from on mutation.
  bounds: Bounds,
  /// Probability that a pair of parents is crossed over, in `[0, 1]`.
  #[builder(default = 0.8)]
  crossover_rate: f64,
  /// Probability that a single gene is replaced, in `[0, 1]`.
  #[builder(default = 0.05)]
  mutation_rate: f64,
}

impl Variation<f64> for Genetic {
  type Leaders = BestTracker<f64>;

  fn validate(&self, population: &Population<f64>) -> Result<()> {
    check_probability("crossover_rate", self.crossover_rate)?;
    check_probability("mutation_rate", self.mutation_rate)?;
    if self.bounds.dimension() != population.dimension() {
      return Err(Error::invalid(
        "bounds",
        format!(
          "cover {} dimensions, candidates have {}",
          self.bounds.dimension(),
          population.dimension()
        ),
      ));
    }
    Ok(())
  }

  fn vary<R: Rng + ?Sized>(
    &mut self,
    step: Step<'_, f64, Self::Leaders>,
    rng: &mut R,
  ) -> Result<()> {
    let population = step.population;
    let size = population.len();
    let weights = roulette_weights(step.fitness, step.objective.sense());

    let mut offspring = Vec::with_capacity(size + 1);
    while offspring.len() < size {
      let (a, b) = (roulette(&weights, rng), roulette(&weights, rng));
      let (mut first, mut second, crossed) = crossover(
        population[a].genes(),
        population[b].genes(),
        self.crossover_rate,
        rng,
      );
      for (genes, parent) in [(&mut first, a), (&mut second, b)] {
        let mutated = mutate(genes, self.mutation_rate, &self.bounds, rng);
        offspring.push((std::mem::take(genes), parent, crossed || mutated > 0));
      }
    }
    offspring.truncate(size);

    for (i, (genes, parent, changed)) in offspring.into_iter().enumerate() {
      // untouched copies keep their parent's fitness
      let child = if changed {
        Candidate::new(genes)
      } else {
        Candidate::evaluated(genes, step.fitness[parent])
      };
      population.replace(i, child);
    }
    Ok(())
  }
}

/// Turns fitness values into roulette weights: raw values when maximizing,
/// distance to the worst value when minimizing.
pub fn roulette_weights(fitness: &[Fitness], sense: Sense) -> Vec<f64> {
  match sense {
    Sense::Maximize => fitness.to_vec(),
    Sense::Minimize => {
      let worst = fitness.iter().copied().fold(Fitness::MIN, Fitness::max);
      fitness.iter().map(|f| worst - f).collect()
    }
  }
}

/// Picks an index with probability proportional to its weight.
///
/// The draw lies in `[0, total)` and the first index whose cumulative weight
/// exceeds it wins. If the total weight is not positive and finite, every
/// index is equally likely instead.
///
/// # Panics
///
/// Panics if `weights` is empty.
pub fn roulette<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
  let total: f64 = weights.iter().sum();
  if !(total > 0.0 && total.is_finite()) {
    tracing::debug!(total, "degenerate roulette wheel, picking uniformly");
    return rng.gen_range(0..weights.len());
  }
  let pick = rng.gen_range(0.0..total);
  let mut cumulative = 0.0;
  for (i, w) in weights.iter().enumerate() {
    cumulative += w;
    if cumulative > pick {
      return i;
    }
  }
  rng.gen_range(0..weights.len())
}

/// Single-point crossover.
///
/// With probability `rate` a cut point is drawn uniformly from
/// `[1, len - 1]` and the parents' tails are exchanged; otherwise the
/// children are copies of the parents. Parents with fewer than two genes are
/// always copied. The returned flag tells whether tails were exchanged.
pub fn crossover<G: Clone, R: Rng + ?Sized>(
  first: &[G],
  second: &[G],
  rate: f64,
  rng: &mut R,
) -> (Vec<G>, Vec<G>, bool) {
  let len = first.len().min(second.len());
  if len >= 2 && rng.gen_bool(rate) {
    let point = rng.gen_range(1..len);
    let a = [&first[..point], &second[point..]].concat();
    let b = [&second[..point], &first[point..]].concat();
    (a, b, true)
  } else {
    (first.to_vec(), second.to_vec(), false)
  }
}

/// Replaces each gene, with probability `rate`, by a fresh value drawn from
/// its range. Returns the number of replaced genes.
pub fn mutate<R: Rng + ?Sized>(
  genes: &mut [f64],
  rate: f64,
  bounds: &Bounds,
  rng: &mut R,
) -> usize {
  let mut mutated = 0;
  for (i, gene) in genes.iter_mut().enumerate() {
    if rng.gen_bool(rate) {
      *gene = bounds.sample_gene(i, rng);
      mutated += 1;
    }
  }
  mutated
}

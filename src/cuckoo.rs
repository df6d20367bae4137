//! Cuckoo-search variant over binary genes.
//!
//! Nests are moved by Lévy flights in a continuous relaxation of the bit
//! vector, and squashed back to bits through a logistic function.

use std::f64::consts::PI;

use rand::{distributions::Distribution, Rng};
use rand_distr::Normal;
use typed_builder::TypedBuilder;

use crate::{
  candidate::Candidate,
  error::{check_probability, Error, Result},
  leaders::BestTracker,
  population::Population,
  variation::{Step, Variation},
};

/// The cuckoo-search variant.
///
/// For every nest, a Lévy step is added to its bits, the result is squashed
/// into per-gene inclusion probabilities and a new bit vector is sampled from
/// them. The new nest replaces the old one only if it is strictly better.
/// Afterwards each nest is abandoned with probability `abandon_probability`
/// and rebuilt from uniformly random bits.
///
/// Every nest evaluated here is offered to the leaders right away, so a good
/// nest that is later abandoned still counts toward the best-so-far record.
///
/// # Examples
/// ```
/// # use popsearch::cuckoo::CuckooSearch;
/// let cuckoo = CuckooSearch::builder()
///   .lambda(1.5)
///   .abandon_probability(0.25)
///   .build();
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct CuckooSearch {
  /// Shape exponent of the Lévy distribution, in `(0, 2]`.
  #[builder(default = 1.5)]
  lambda: f64,
  /// Probability a nest is abandoned in an iteration, in `[0, 1]`.
  #[builder(default = 0.25)]
  abandon_probability: f64,
  /// Largest magnitude a single step component may take.
  #[builder(default = 10.0)]
  step_limit: f64,
}

impl CuckooSearch {
  /// Draws a Lévy step of `dimension` components with Mantegna's method,
  /// each component clamped to `[-step_limit, step_limit]`.
  ///
  /// The parameters must be valid, see [`Variation::validate`].
  pub fn levy_step<R: Rng + ?Sized>(
    &self,
    dimension: usize,
    rng: &mut R,
  ) -> Vec<f64> {
    let sigma = mantegna_sigma(self.lambda);
    let u = Normal::new(0.0, sigma);
    let v = Normal::<f64>::new(0.0, 1.0);
    let (Ok(u), Ok(v)) = (u, v) else {
      return vec![0.0; dimension];
    };
    (0..dimension)
      .map(|_| {
        let step = u.sample(rng) / v.sample(rng).abs().powf(1.0 / self.lambda);
        clamp_step(step, self.step_limit)
      })
      .collect()
  }

  /// Moves a nest by a Lévy flight and samples new bits from it.
  fn fly<R: Rng + ?Sized>(&self, nest: &[u8], rng: &mut R) -> Vec<u8> {
    let step = self.levy_step(nest.len(), rng);
    nest
      .iter()
      .zip(step)
      .map(|(bit, s)| {
        let p = sigmoid(f64::from(*bit) + s);
        u8::from(rng.gen::<f64>() < p)
      })
      .collect()
  }
}

fn clamp_step(step: f64, limit: f64) -> f64 {
  if step.is_nan() {
    tracing::trace!("undefined levy step replaced by 0");
    0.0
  } else if step.abs() > limit {
    tracing::trace!(step, limit, "levy step clamped");
    step.clamp(-limit, limit)
  } else {
    step
  }
}

/// Standard deviation of the numerator draw of Mantegna's algorithm.
pub fn mantegna_sigma(lambda: f64) -> f64 {
  let numerator = gamma(1.0 + lambda) * (PI * lambda / 2.0).sin();
  let denominator =
    gamma((1.0 + lambda) / 2.0) * lambda * 2f64.powf((lambda - 1.0) / 2.0);
  (numerator / denominator).powf(1.0 / lambda)
}

/// The logistic function.
pub fn sigmoid(x: f64) -> f64 {
  1.0 / (1.0 + (-x).exp())
}

/// Gamma function for positive arguments (Lanczos approximation).
fn gamma(x: f64) -> f64 {
  const COEFFICIENTS: [f64; 6] = [
    76.180_091_729_471_46,
    -86.505_320_329_416_77,
    24.014_098_240_830_91,
    -1.231_739_572_450_155,
    0.120_865_097_386_617_9e-2,
    -0.539_523_938_495_3e-5,
  ];
  let tmp = x + 5.5;
  let tmp = tmp - (x + 0.5) * tmp.ln();
  let series = COEFFICIENTS
    .iter()
    .enumerate()
    .fold(1.000_000_000_190_015, |acc, (j, c)| {
      acc + c / (x + 1.0 + j as f64)
    });
  (-tmp + (2.506_628_274_631_000_5 * series / x).ln()).exp()
}

impl Variation<u8> for CuckooSearch {
  type Leaders = BestTracker<u8>;

  fn validate(&self, population: &Population<u8>) -> Result<()> {
    if !(self.lambda > 0.0 && self.lambda <= 2.0) {
      return Err(Error::invalid(
        "lambda",
        format!("must be in (0, 2], got {}", self.lambda),
      ));
    }
    check_probability("abandon_probability", self.abandon_probability)?;
    if !(self.step_limit.is_finite() && self.step_limit > 0.0) {
      return Err(Error::invalid(
        "step_limit",
        format!("must be finite and positive, got {}", self.step_limit),
      ));
    }
    if population.iter().flat_map(|c| c.genes()).any(|b| *b > 1) {
      return Err(Error::invalid("population", "genes must be 0 or 1"));
    }
    Ok(())
  }

  fn vary<R: Rng + ?Sized>(
    &mut self,
    mut step: Step<'_, u8, Self::Leaders>,
    rng: &mut R,
  ) -> Result<()> {
    let sense = step.objective.sense();
    let fitness = step.fitness;

    for (i, current) in fitness.iter().enumerate() {
      let mut nest = Candidate::new(self.fly(step.population[i].genes(), rng));
      let f = nest.evaluate(step.objective)?;
      step.offer(nest.genes(), f);
      if sense.is_better(f, *current) {
        step.population.replace(i, nest);
      }
    }

    let dimension = step.population.dimension();
    for i in 0..step.population.len() {
      if rng.gen_bool(self.abandon_probability) {
        let mut nest = Candidate::random_binary(dimension, rng);
        let f = nest.evaluate(step.objective)?;
        step.offer(nest.genes(), f);
        step.population.replace(i, nest);
      }
    }
    Ok(())
  }
}

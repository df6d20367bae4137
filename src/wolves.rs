//! Grey-wolf variant, guided by a leader hierarchy.

use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  bounds::Bounds,
  error::{Error, Result},
  leaders::Hierarchy,
  population::Population,
  variation::{Step, Variation},
};

/// The grey-wolf variant.
///
/// Every wolf is pulled toward alpha, beta and delta, each pull with freshly
/// drawn coefficients, and moves to the average of the three proposed
/// positions. The exploration coefficient `a` decays linearly from 2 to 0
/// over the iteration budget. Positions are clipped into bounds right
/// before each evaluation pass, never in the middle of an update.
#[derive(TypedBuilder, Clone, Debug)]
pub struct GreyWolf {
  /// Box wolves are clipped into before evaluation.
  bounds: Bounds,
}

/// Exploration coefficient at zero-based `iteration` of a run of `budget`
/// iterations.
pub fn coefficient(iteration: usize, budget: usize) -> f64 {
  if budget == 0 {
    return 0.0;
  }
  2.0 - iteration as f64 * (2.0 / budget as f64)
}

impl Variation<f64> for GreyWolf {
  type Leaders = Hierarchy<f64>;

  fn validate(&self, population: &Population<f64>) -> Result<()> {
    if self.bounds.dimension() != population.dimension() {
      return Err(Error::invalid(
        "bounds",
        format!(
          "cover {} dimensions, wolves have {}",
          self.bounds.dimension(),
          population.dimension()
        ),
      ));
    }
    Ok(())
  }

  fn prepare(&mut self, population: &mut Population<f64>) {
    for wolf in population.iter_mut() {
      if !self.bounds.contains(wolf.genes()) {
        wolf.update_genes(|x| {
          self.bounds.clip(x);
        });
      }
    }
  }

  fn vary<R: Rng + ?Sized>(
    &mut self,
    step: Step<'_, f64, Self::Leaders>,
    rng: &mut R,
  ) -> Result<()> {
    let Some(guides) = step.leaders.guides() else {
      return Ok(());
    };
    let a = coefficient(step.iteration, step.budget);

    for wolf in step.population.iter_mut() {
      wolf.update_genes(|x| {
        for (d, gene) in x.iter_mut().enumerate() {
          let proposed: f64 = guides
            .iter()
            .map(|leader| {
              let (r1, r2): (f64, f64) = (rng.gen(), rng.gen());
              let big_a = 2.0 * a * r1 - a;
              let c = 2.0 * r2;
              let distance = (c * leader.genes[d] - *gene).abs();
              leader.genes[d] - big_a * distance
            })
            .sum();
          *gene = proposed / 3.0;
        }
      });
    }
    Ok(())
  }
}

//! Particle-swarm variant.

use itertools::izip;
use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  error::{check_nonnegative, Error, Result},
  leaders::{BestTracker, Leader, Leaders},
  population::Population,
  variation::{Step, Variation},
};

/// How the random scalars `r1`, `r2` of the velocity update are drawn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Draws {
  /// One pair per iteration, shared by every particle.
  #[default]
  Shared,
  /// A fresh pair for each particle.
  PerParticle,
}

/// The particle-swarm variant.
///
/// Every particle carries a velocity and a personal best position next to
/// its current position. Each iteration, personal bests are refreshed from
/// the pass's fitness snapshot (strict improvement only), then every particle
/// is pulled toward its personal best and the global best:
///
/// ```text
/// v = v + c1 * r1 * (personal_best - x) + c2 * r2 * (global_best - x)
/// x = x + v
/// ```
///
/// `r1` and `r2` are square roots of uniform draws from `[0, 1)`. Positions
/// are not clipped. The customary stop rule for this variant is
/// [`Termination::Stagnation(1)`](crate::termination::Termination::Stagnation).
#[derive(TypedBuilder, Clone, Debug)]
pub struct ParticleSwarm {
  /// Weight of the pull toward the personal best, finite and nonnegative.
  #[builder(default = 1.0)]
  c1: f64,
  /// Weight of the pull toward the global best, finite and nonnegative.
  #[builder(default = 1.0)]
  c2: f64,
  /// Whether `r1`, `r2` are shared by all particles of an iteration.
  #[builder(default)]
  draws: Draws,
  /// Initial velocities, one per particle. Zero when left empty.
  #[builder(default)]
  velocities: Vec<Vec<f64>>,
  #[builder(setter(skip), default)]
  personal_bests: Vec<Leader<f64>>,
}

impl ParticleSwarm {
  /// Current velocities. Empty until the first variation.
  pub fn velocities(&self) -> &[Vec<f64>] {
    &self.velocities
  }

  /// Personal best of each particle. Empty until the first variation.
  pub fn personal_bests(&self) -> &[Leader<f64>] {
    &self.personal_bests
  }

  fn draw<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    (rng.gen::<f64>().sqrt(), rng.gen::<f64>().sqrt())
  }
}

impl Variation<f64> for ParticleSwarm {
  type Leaders = BestTracker<f64>;

  fn validate(&self, population: &Population<f64>) -> Result<()> {
    check_nonnegative("c1", self.c1)?;
    check_nonnegative("c2", self.c2)?;
    if self.velocities.is_empty() {
      return Ok(());
    }
    if self.velocities.len() != population.len()
      || self
        .velocities
        .iter()
        .any(|v| v.len() != population.dimension())
    {
      return Err(Error::invalid(
        "velocities",
        format!(
          "expected {} velocities of dimension {}",
          population.len(),
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
    let sense = step.objective.sense();
    let population = step.population;

    if self.velocities.is_empty() {
      self.velocities =
        vec![vec![0.0; population.dimension()]; population.len()];
    }
    if self.personal_bests.is_empty() {
      self.personal_bests = population
        .iter()
        .zip(step.fitness)
        .map(|(c, f)| Leader {
          genes: c.genes().to_vec(),
          fitness: *f,
        })
        .collect();
    } else {
      for ((best, candidate), f) in self
        .personal_bests
        .iter_mut()
        .zip(population.iter())
        .zip(step.fitness)
      {
        if sense.is_better(*f, best.fitness) {
          best.genes = candidate.genes().to_vec();
          best.fitness = *f;
        }
      }
    }

    let Some(global) = step.leaders.best().map(|l| l.genes.clone()) else {
      return Ok(());
    };
    let shared = match self.draws {
      Draws::Shared => Some(Self::draw(rng)),
      Draws::PerParticle => None,
    };
    let (c1, c2) = (self.c1, self.c2);
    for ((candidate, velocity), best) in population
      .iter_mut()
      .zip(&mut self.velocities)
      .zip(&self.personal_bests)
    {
      let (r1, r2) = shared.unwrap_or_else(|| Self::draw(rng));
      candidate.update_genes(|genes| {
        for (x, v, p, g) in
          izip!(genes.iter_mut(), velocity.iter_mut(), &best.genes, &global)
        {
          *v += c1 * r1 * (p - *x) + c2 * r2 * (g - *x);
          *x += *v;
        }
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::objective::Objective;

  fn parabola() -> Objective {
    Objective::maximize(|x: &[f64]| -x[0] * x[0] + 5.0 * x[0] + 20.0)
  }

  fn vary_once(
    swarm: &mut ParticleSwarm,
    population: &mut Population,
    objective: &Objective,
    leaders: &mut BestTracker<f64>,
    rng: &mut StdRng,
  ) {
    let fitness = population
      .evaluate(objective, Default::default())
      .unwrap();
    leaders.update(population, &fitness, objective.sense());
    swarm
      .vary(
        Step {
          population,
          fitness: &fitness,
          leaders,
          objective,
          iteration: 0,
          budget: 10,
        },
        rng,
      )
      .unwrap();
  }

  #[test]
  fn test_particle_at_both_bests_stays_put() {
    let mut rng = StdRng::seed_from_u64(0);
    let objective = parabola();
    let mut population = Population::from_genes(vec![vec![1.0]]).unwrap();
    let mut leaders = BestTracker::default();
    let mut swarm = ParticleSwarm::builder().build();

    vary_once(&mut swarm, &mut population, &objective, &mut leaders, &mut rng);

    assert_eq!(swarm.velocities(), &[vec![0.0]]);
    assert_eq!(population[0].genes(), &[1.0]);
    assert_eq!(swarm.personal_bests()[0].genes, vec![1.0]);
  }

  #[test]
  fn test_particles_move_toward_global_best() {
    let mut rng = StdRng::seed_from_u64(1);
    let objective = parabola();
    let mut population =
      Population::from_genes(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
    let mut leaders = BestTracker::default();
    let mut swarm = ParticleSwarm::builder().build();

    vary_once(&mut swarm, &mut population, &objective, &mut leaders, &mut rng);

    // f(2) == f(3) == 26, the first one seen wins
    assert_eq!(leaders.best().unwrap().genes, vec![2.0]);
    assert!(population[0].genes()[0] > 1.0);
    assert_eq!(population[1].genes(), &[2.0]);
    assert!(population[2].genes()[0] < 3.0);
  }

  #[test]
  fn test_personal_best_only_improves() {
    let mut rng = StdRng::seed_from_u64(2);
    let objective = parabola();
    let mut population =
      Population::from_genes(vec![vec![0.0], vec![2.5], vec![6.0]]).unwrap();
    let mut leaders = BestTracker::default();
    let mut swarm = ParticleSwarm::builder()
      .draws(Draws::PerParticle)
      .build();

    let mut previous: Option<Vec<f64>> = None;
    for _ in 0..20 {
      vary_once(
        &mut swarm,
        &mut population,
        &objective,
        &mut leaders,
        &mut rng,
      );
      let current: Vec<f64> =
        swarm.personal_bests().iter().map(|b| b.fitness).collect();
      if let Some(previous) = previous {
        assert!(current.iter().zip(&previous).all(|(c, p)| c >= p));
      }
      previous = Some(current);
    }
  }

  #[test]
  fn test_validate() {
    let population = Population::from_genes(vec![vec![1.0]]).unwrap();
    assert!(ParticleSwarm::builder()
      .c1(-1.0)
      .build()
      .validate(&population)
      .is_err());
    assert!(ParticleSwarm::builder()
      .velocities(vec![vec![0.0, 0.0]])
      .build()
      .validate(&population)
      .is_err());
    assert!(ParticleSwarm::builder()
      .velocities(vec![vec![0.5]])
      .build()
      .validate(&population)
      .is_ok());
  }
}

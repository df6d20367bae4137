//! A single candidate solution and its cached fitness.

use std::fmt::Debug;

use rand::Rng;

use crate::{
  bounds::Bounds,
  error::{Error, Result},
  history::History,
  objective::Objective,
  score::Fitness,
};

/// Cached fitness of a candidate: a value and a flag telling whether the
/// value belongs to the current genes.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
struct CachedFitness {
  value: Fitness,
  valid: bool,
}

/// A fixed-length vector of genes with a lazily computed fitness.
///
/// Genes can only be replaced through methods that invalidate the cache, so
/// a fitness read from a candidate always belongs to its current genes.
#[derive(Clone, PartialEq, Debug)]
pub struct Candidate<G = f64> {
  genes: Vec<G>,
  fitness: CachedFitness,
}

impl<G> Candidate<G> {
  /// Creates a candidate with given genes and no fitness.
  pub fn new(genes: Vec<G>) -> Self {
    Self {
      genes,
      fitness: CachedFitness::default(),
    }
  }

  /// Creates a candidate whose fitness is already known, e.g. because it was
  /// evaluated before being copied.
  pub(crate) fn evaluated(genes: Vec<G>, fitness: Fitness) -> Self {
    Self {
      genes,
      fitness: CachedFitness {
        value: fitness,
        valid: true,
      },
    }
  }

  /// Genes of this candidate.
  pub fn genes(&self) -> &[G] {
    &self.genes
  }

  /// Consumes the candidate, returning its genes.
  pub fn into_genes(self) -> Vec<G> {
    self.genes
  }

  /// Number of genes.
  pub fn len(&self) -> usize {
    self.genes.len()
  }

  /// Returns `true` if the candidate has no genes.
  pub fn is_empty(&self) -> bool {
    self.genes.is_empty()
  }

  /// Overwrites genes and invalidates the cached fitness.
  pub fn set_genes(&mut self, genes: Vec<G>) {
    self.genes = genes;
    self.fitness.valid = false;
  }

  /// Edits genes in place and invalidates the cached fitness.
  pub fn update_genes<F>(&mut self, edit: F)
  where
    F: FnOnce(&mut [G]),
  {
    edit(&mut self.genes);
    self.fitness.valid = false;
  }

  /// Cached fitness, if it is valid for the current genes.
  pub fn fitness(&self) -> Option<Fitness> {
    self.fitness.valid.then_some(self.fitness.value)
  }

  /// Returns `true` if the cached fitness is valid.
  pub fn is_evaluated(&self) -> bool {
    self.fitness.valid
  }
}

impl<G: Debug> Candidate<G> {
  /// Returns the cached fitness or computes, caches and returns it.
  pub fn evaluate(&mut self, objective: &Objective<G>) -> Result<Fitness> {
    if self.fitness.valid {
      return Ok(self.fitness.value);
    }
    let value = objective.evaluate(&self.genes).map_err(|e| {
      tracing::warn!(
        genes = ?self.genes,
        error = %e,
        "objective evaluation failed"
      );
      Error::ObjectiveEvaluation {
        genes: format!("{:?}", self.genes),
        message: e.0,
        history: History::new(),
      }
    })?;
    self.fitness = CachedFitness { value, valid: true };
    Ok(value)
  }
}

impl Candidate<f64> {
  /// Creates a candidate with genes drawn uniformly from the box.
  pub fn random<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> Self {
    Self::new(bounds.sample(rng))
  }
}

impl Candidate<u8> {
  /// Creates a candidate of `len` uniformly random binary genes.
  pub fn random_binary<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
    Self::new((0..len).map(|_| rng.gen_range(0..=1)).collect())
  }
}

impl<G> From<Vec<G>> for Candidate<G> {
  fn from(genes: Vec<G>) -> Self {
    Self::new(genes)
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

  fn counting_sphere() -> (Objective, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let objective = Objective::minimize(move |x: &[f64]| {
      counter.fetch_add(1, Ordering::SeqCst);
      x.iter().map(|v| v * v).sum::<f64>()
    });
    (objective, calls)
  }

  #[test]
  fn test_fitness_is_computed_once() {
    let (objective, calls) = counting_sphere();
    let mut candidate = Candidate::new(vec![1.0, 2.0]);
    assert_eq!(candidate.fitness(), None);
    assert_eq!(candidate.evaluate(&objective).unwrap(), 5.0);
    assert_eq!(candidate.evaluate(&objective).unwrap(), 5.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(candidate.fitness(), Some(5.0));
  }

  #[test]
  fn test_overwriting_genes_invalidates_fitness() {
    let (objective, calls) = counting_sphere();
    let mut candidate = Candidate::new(vec![1.0]);
    candidate.evaluate(&objective).unwrap();

    candidate.set_genes(vec![3.0]);
    assert_eq!(candidate.fitness(), None);
    assert_eq!(candidate.evaluate(&objective).unwrap(), 9.0);

    candidate.update_genes(|g| g[0] = 2.0);
    assert!(!candidate.is_evaluated());
    assert_eq!(candidate.evaluate(&objective).unwrap(), 4.0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn test_clone_is_independent() {
    let (objective, _) = counting_sphere();
    let mut original = Candidate::new(vec![1.0]);
    original.evaluate(&objective).unwrap();
    let mut copy = original.clone();
    copy.set_genes(vec![5.0]);
    assert_eq!(original.genes(), &[1.0]);
    assert_eq!(original.fitness(), Some(1.0));
    assert_eq!(copy.fitness(), None);
  }

  #[test]
  fn test_evaluation_failure_carries_genes() {
    let objective = Objective::minimize(|_: &[f64]| f64::NAN);
    let mut candidate = Candidate::new(vec![0.5, -0.5]);
    match candidate.evaluate(&objective) {
      Err(Error::ObjectiveEvaluation { genes, .. }) => {
        assert_eq!(genes, "[0.5, -0.5]")
      }
      other => panic!("unexpected {other:?}"),
    }
    assert!(!candidate.is_evaluated());
  }

  #[test]
  fn test_random_constructors() {
    let mut rng = StdRng::seed_from_u64(1);
    let bounds = Bounds::uniform(-1.0, 2.0, 10).unwrap();
    let candidate = Candidate::random(&bounds, &mut rng);
    assert_eq!(candidate.len(), 10);
    assert!(bounds.contains(candidate.genes()));

    let binary = Candidate::random_binary(5, &mut rng);
    assert_eq!(binary.len(), 5);
    assert!(binary.genes().iter().all(|b| *b <= 1));
  }
}

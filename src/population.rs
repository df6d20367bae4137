//! An ordered collection of candidates of fixed size.

use std::{fmt::Debug, ops::Index};

use rand::Rng;

use crate::{
  bounds::Bounds,
  candidate::Candidate,
  error::{Error, Result},
  execution::Execution,
  objective::Objective,
  score::Fitness,
};

/// A non-empty sequence of candidates whose size never changes after
/// construction.
///
/// Individual members can be replaced or edited in place, but none can be
/// added or removed.
#[derive(Clone, PartialEq, Debug)]
pub struct Population<G = f64> {
  candidates: Vec<Candidate<G>>,
}

impl<G> Population<G> {
  /// Creates a population from candidates.
  ///
  /// Fails if there are no candidates, a candidate has no genes, or gene
  /// counts differ between candidates.
  pub fn new(candidates: Vec<Candidate<G>>) -> Result<Self> {
    let Some(first) = candidates.first() else {
      return Err(Error::invalid("population", "must not be empty"));
    };
    let dimension = first.len();
    if dimension == 0 {
      return Err(Error::invalid("dimension", "must be at least 1"));
    }
    if let Some(i) = candidates.iter().position(|c| c.len() != dimension) {
      return Err(Error::invalid(
        "population",
        format!(
          "candidate {i} has {} genes, expected {dimension}",
          candidates[i].len()
        ),
      ));
    }
    Ok(Self { candidates })
  }

  /// Creates a population from raw gene vectors.
  pub fn from_genes(genes: Vec<Vec<G>>) -> Result<Self> {
    Self::new(genes.into_iter().map(Candidate::new).collect())
  }

  /// Number of candidates.
  pub fn len(&self) -> usize {
    self.candidates.len()
  }

  /// Always `false`; kept for API symmetry with `len`.
  pub fn is_empty(&self) -> bool {
    self.candidates.is_empty()
  }

  /// Number of genes of each candidate.
  pub fn dimension(&self) -> usize {
    self.candidates[0].len()
  }

  /// Candidate at `index`.
  pub fn get(&self, index: usize) -> Option<&Candidate<G>> {
    self.candidates.get(index)
  }

  /// Mutable candidate at `index`.
  pub fn get_mut(&mut self, index: usize) -> Option<&mut Candidate<G>> {
    self.candidates.get_mut(index)
  }

  /// Replaces the candidate at `index`, returning the old one.
  ///
  /// # Panics
  ///
  /// Panics if `index` is out of bounds.
  pub fn replace(
    &mut self,
    index: usize,
    candidate: Candidate<G>,
  ) -> Candidate<G> {
    std::mem::replace(&mut self.candidates[index], candidate)
  }

  /// Iterates over candidates.
  pub fn iter(&self) -> std::slice::Iter<'_, Candidate<G>> {
    self.candidates.iter()
  }

  /// Iterates over mutable candidates.
  pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Candidate<G>> {
    self.candidates.iter_mut()
  }

  /// Candidates as a slice.
  pub fn as_slice(&self) -> &[Candidate<G>] {
    &self.candidates
  }

  /// Consumes the population, returning its candidates.
  pub fn into_candidates(self) -> Vec<Candidate<G>> {
    self.candidates
  }
}

impl<G: Debug + Send + Sync> Population<G> {
  /// Evaluates every candidate with given strategy and returns a snapshot of
  /// their fitness values in population order.
  pub fn evaluate(
    &mut self,
    objective: &Objective<G>,
    execution: Execution,
  ) -> Result<Vec<Fitness>> {
    execution.evaluate(&mut self.candidates, objective)
  }
}

impl Population<f64> {
  /// Creates `size` candidates with genes drawn uniformly from the box.
  pub fn random<R: Rng + ?Sized>(
    size: usize,
    bounds: &Bounds,
    rng: &mut R,
  ) -> Result<Self> {
    Self::new((0..size).map(|_| Candidate::random(bounds, rng)).collect())
  }
}

impl Population<u8> {
  /// Creates `size` candidates of `len` uniformly random binary genes.
  pub fn random_binary<R: Rng + ?Sized>(
    size: usize,
    len: usize,
    rng: &mut R,
  ) -> Result<Self> {
    Self::new(
      (0..size)
        .map(|_| Candidate::random_binary(len, rng))
        .collect(),
    )
  }
}

impl<G> Index<usize> for Population<G> {
  type Output = Candidate<G>;

  fn index(&self, index: usize) -> &Self::Output {
    &self.candidates[index]
  }
}

impl<'a, G> IntoIterator for &'a Population<G> {
  type Item = &'a Candidate<G>;
  type IntoIter = std::slice::Iter<'a, Candidate<G>>;

  fn into_iter(self) -> Self::IntoIter {
    self.candidates.iter()
  }
}

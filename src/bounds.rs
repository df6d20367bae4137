//! Box constraints of the search space.

use rand::Rng;

use crate::error::{Error, Result};

/// Per-dimension `(lo, hi)` limits of a real-valued search space.
#[derive(Clone, PartialEq, Debug)]
pub struct Bounds {
  ranges: Vec<(f64, f64)>,
}

impl Bounds {
  /// Applies the same `[lo, hi]` range to each of `dimension` genes.
  pub fn uniform(lo: f64, hi: f64, dimension: usize) -> Result<Self> {
    Self::per_dimension(vec![(lo, hi); dimension])
  }

  /// Uses a separate `[lo, hi]` range for every gene.
  pub fn per_dimension(ranges: Vec<(f64, f64)>) -> Result<Self> {
    if ranges.is_empty() {
      return Err(Error::invalid("bounds", "dimension must be at least 1"));
    }
    if let Some((i, (lo, hi))) = ranges
      .iter()
      .enumerate()
      .find(|(_, (lo, hi))| !(lo.is_finite() && hi.is_finite() && lo <= hi))
    {
      return Err(Error::invalid(
        "bounds",
        format!("dimension {i} has invalid range [{lo}, {hi}]"),
      ));
    }
    Ok(Self { ranges })
  }

  /// Number of dimensions.
  pub fn dimension(&self) -> usize {
    self.ranges.len()
  }

  /// Range of the `i`-th dimension.
  pub fn range(&self, i: usize) -> (f64, f64) {
    self.ranges[i]
  }

  /// Draws a value for the `i`-th dimension uniformly from its range.
  pub fn sample_gene<R: Rng + ?Sized>(&self, i: usize, rng: &mut R) -> f64 {
    let (lo, hi) = self.ranges[i];
    if lo == hi {
      lo
    } else {
      rng.gen_range(lo..=hi)
    }
  }

  /// Draws a whole gene vector uniformly from the box.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
    (0..self.dimension()).map(|i| self.sample_gene(i, rng)).collect()
  }

  /// Clamps every gene into its range. Returns `true` if anything changed.
  pub fn clip(&self, genes: &mut [f64]) -> bool {
    let mut changed = false;
    for (gene, &(lo, hi)) in genes.iter_mut().zip(&self.ranges) {
      let clipped = gene.clamp(lo, hi);
      if clipped != *gene {
        *gene = clipped;
        changed = true;
      }
    }
    changed
  }

  /// Returns `true` if every gene lies within its range.
  pub fn contains(&self, genes: &[f64]) -> bool {
    genes
      .iter()
      .zip(&self.ranges)
      .all(|(g, (lo, hi))| (*lo..=*hi).contains(g))
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  #[test]
  fn test_rejects_inverted_range() {
    assert!(Bounds::uniform(1.0, -1.0, 3).is_err());
    assert!(Bounds::per_dimension(vec![(0.0, 1.0), (2.0, 1.0)]).is_err());
    assert!(Bounds::uniform(0.0, f64::INFINITY, 1).is_err());
  }

  #[test]
  fn test_rejects_zero_dimension() {
    assert!(Bounds::uniform(0.0, 1.0, 0).is_err());
  }

  #[test]
  fn test_degenerate_range_is_allowed() {
    let bounds = Bounds::uniform(2.0, 2.0, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(bounds.sample(&mut rng), vec![2.0, 2.0]);
  }

  #[test]
  fn test_samples_stay_inside() {
    let bounds =
      Bounds::per_dimension(vec![(-1.0, 2.0), (10.0, 11.0)]).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
      assert!(bounds.contains(&bounds.sample(&mut rng)));
    }
  }

  #[test]
  fn test_clip() {
    let bounds = Bounds::uniform(-10.0, 10.0, 3).unwrap();
    let mut genes = [-12.0, 3.0, 40.0];
    assert!(bounds.clip(&mut genes));
    assert_eq!(genes, [-10.0, 3.0, 10.0]);
    assert!(!bounds.clip(&mut genes));
  }
}

//! Cellular variant on a toroidal grid.

use itertools::iproduct;
use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  bounds::Bounds,
  error::{check_nonnegative, Error, Result},
  leaders::BestTracker,
  population::Population,
  variation::{Step, Variation},
};

/// The cellular variant.
///
/// Candidates are laid out row by row on a `rows × cols` grid whose edges
/// wrap around. Every cell moves to the mean of its neighborhood, the square
/// of cells at most `radius` rows and columns away (itself included), plus a
/// uniform perturbation from `[-perturbation, perturbation]`, and is clipped
/// into bounds. All cells are computed from the same prior grid.
///
/// # Examples
/// ```
/// # use popsearch::{bounds::Bounds, cellular::Cellular};
/// let cellular = Cellular::builder()
///   .bounds(Bounds::uniform(-10.0, 10.0, 1).unwrap())
///   .build();
/// assert!(cellular.neighbors(0, 0).contains(&(9, 9)));
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct Cellular {
  /// Box every cell is clipped into.
  bounds: Bounds,
  #[builder(default = 10)]
  rows: usize,
  #[builder(default = 10)]
  cols: usize,
  /// Neighborhood radius, in cells, at most the larger grid side.
  #[builder(default = 1)]
  radius: usize,
  /// Magnitude of the uniform perturbation, finite and nonnegative.
  #[builder(default = 0.1)]
  perturbation: f64,
}

impl Cellular {
  /// Grid coordinates of the neighborhood of cell `(row, col)`, wrapping
  /// around the edges. When the radius reaches the grid size, cells appear
  /// as many times as they are reached. The radius is capped at the larger
  /// grid side.
  pub fn neighbors(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
    let cap = self.rows.max(self.cols);
    let r = isize::try_from(self.radius.min(cap)).unwrap_or_default();
    let (rows, cols) = (self.rows as isize, self.cols as isize);
    iproduct!(-r..=r, -r..=r)
      .map(|(dr, dc)| {
        (
          (row as isize + dr).rem_euclid(rows) as usize,
          (col as isize + dc).rem_euclid(cols) as usize,
        )
      })
      .collect()
  }
}

impl Variation<f64> for Cellular {
  type Leaders = BestTracker<f64>;

  fn validate(&self, population: &Population<f64>) -> Result<()> {
    if self.rows == 0 || self.cols == 0 {
      return Err(Error::invalid("grid", "must have at least one cell"));
    }
    if self.rows * self.cols != population.len() {
      return Err(Error::invalid(
        "grid",
        format!(
          "{} × {} cells for {} candidates",
          self.rows,
          self.cols,
          population.len()
        ),
      ));
    }
    let cap = self.rows.max(self.cols);
    if self.radius > cap {
      return Err(Error::invalid(
        "radius",
        format!("must be at most {cap}, got {}", self.radius),
      ));
    }
    check_nonnegative("perturbation", self.perturbation)?;
    if self.bounds.dimension() != population.dimension() {
      return Err(Error::invalid(
        "bounds",
        format!(
          "cover {} dimensions, cells have {}",
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
    let grid: Vec<Vec<f64>> =
      population.iter().map(|c| c.genes().to_vec()).collect();
    let dimension = population.dimension();
    let m = self.perturbation;

    for (k, cell) in population.iter_mut().enumerate() {
      let neighborhood = self.neighbors(k / self.cols, k % self.cols);
      let count = neighborhood.len() as f64;
      let mut next = vec![0.0; dimension];
      for (i, j) in neighborhood {
        for (sum, gene) in next.iter_mut().zip(&grid[i * self.cols + j]) {
          *sum += gene;
        }
      }
      for gene in next.iter_mut() {
        *gene /= count;
        if m > 0.0 {
          *gene += rng.gen_range(-m..=m);
        }
      }
      self.bounds.clip(&mut next);
      cell.set_genes(next);
    }
    Ok(())
  }
}

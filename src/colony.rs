//! Ant-colony variant for tour construction over a distance matrix.

use rand::{
  distributions::{Distribution, WeightedIndex},
  Rng,
};
use typed_builder::TypedBuilder;

use crate::{
  candidate::Candidate,
  error::{check_nonnegative, check_probability, Error, Result},
  leaders::BestTracker,
  population::Population,
  variation::{Step, Variation},
};

/// Trail strength on every directed pair of items.
///
/// Values start equal, decay multiplicatively and grow additively, so they
/// never become negative. Trails are directed: depositing on `(a, b)` leaves
/// `(b, a)` untouched.
#[derive(Clone, PartialEq, Debug)]
pub struct PheromoneMatrix {
  size: usize,
  trails: Vec<f64>,
}

impl PheromoneMatrix {
  /// Creates a `size × size` matrix with every trail set to `initial`.
  pub fn new(size: usize, initial: f64) -> Self {
    Self {
      size,
      trails: vec![initial.max(0.0); size * size],
    }
  }

  /// Number of items.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Trail strength from `from` to `to`.
  pub fn get(&self, from: usize, to: usize) -> f64 {
    self.trails[from * self.size + to]
  }

  /// Multiplies every trail by `1 - rho`.
  pub fn evaporate(&mut self, rho: f64) {
    let keep = (1.0 - rho).clamp(0.0, 1.0);
    self.trails.iter_mut().for_each(|t| *t *= keep);
  }

  /// Adds `amount` to every edge of the closed `route`.
  pub fn deposit(&mut self, route: &[usize], amount: f64) {
    if !(amount.is_finite() && amount > 0.0) {
      return;
    }
    for (a, b) in edges(route) {
      self.trails[a * self.size + b] += amount;
    }
  }
}

/// Edges of a closed tour, including the one from the last item back to the
/// first.
pub fn edges(route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
  route
    .iter()
    .copied()
    .zip(route.iter().copied().cycle().skip(1))
}

/// Length of the closed tour `route` over a distance matrix.
pub fn route_length(route: &[usize], distances: &[Vec<f64>]) -> f64 {
  edges(route).map(|(a, b)| distances[a][b]).sum()
}

/// The ant-colony variant.
///
/// Every candidate is an ant's route: a permutation of all items. Each
/// iteration the trails evaporate by a factor of `1 - rho`, every current
/// route deposits `1 / length` on the edges it uses, and then every ant
/// builds a fresh route. Starting from a random item, the next item is drawn
/// among the unvisited ones with weight
/// `pheromone[i][j]^alpha * (1 / distance[i][j])^beta`.
///
/// The objective is expected to measure route length, typically with
/// [`route_length`], and to be minimized.
///
/// # Examples
/// ```
/// # use popsearch::{colony::{route_length, AntColony}, objective::Objective};
/// # use rand::{rngs::StdRng, SeedableRng};
/// let distances = vec![
///   vec![0.0, 1.0, 2.0],
///   vec![1.0, 0.0, 1.5],
///   vec![2.0, 1.5, 0.0],
/// ];
/// let table = distances.clone();
/// let objective =
///   Objective::minimize(move |route: &[usize]| route_length(route, &table));
/// let mut colony = AntColony::builder().distances(distances).build();
/// let ants = colony
///   .construct_population(5, &mut StdRng::seed_from_u64(0))
///   .unwrap();
/// assert_eq!(ants.len(), 5);
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct AntColony {
  /// Square matrix of nonnegative distances between items.
  distances: Vec<Vec<f64>>,
  /// Exponent of the pheromone term, finite and nonnegative.
  #[builder(default = 1.0)]
  alpha: f64,
  /// Exponent of the inverse-distance term, finite and nonnegative.
  #[builder(default = 2.0)]
  beta: f64,
  /// Evaporation rate, in `[0, 1]`.
  #[builder(default = 0.5)]
  rho: f64,
  /// Trail strength every pair starts with, finite and nonnegative.
  #[builder(default = 1.0)]
  initial_pheromone: f64,
  #[builder(setter(skip), default = PheromoneMatrix::new(0, 0.0))]
  pheromone: PheromoneMatrix,
}

impl AntColony {
  /// Number of items a route visits.
  pub fn size(&self) -> usize {
    self.distances.len()
  }

  /// Current trails.
  pub fn pheromone(&self) -> &PheromoneMatrix {
    &self.pheromone
  }

  fn trails(&mut self) -> &mut PheromoneMatrix {
    if self.pheromone.size() != self.size() {
      self.pheromone =
        PheromoneMatrix::new(self.size(), self.initial_pheromone);
    }
    &mut self.pheromone
  }

  fn desirability(&self, from: usize, to: usize) -> f64 {
    let distance = self.distances[from][to];
    let visibility = if distance > 0.0 {
      (1.0 / distance).powf(self.beta)
    } else {
      f64::INFINITY
    };
    let weight = self.pheromone.get(from, to).powf(self.alpha) * visibility;
    if weight.is_nan() {
      0.0
    } else {
      weight
    }
  }

  /// Builds a single route. Every step adds exactly one unvisited item, so
  /// construction ends after `size` steps with a permutation of all items.
  pub fn construct_route<R: Rng + ?Sized>(
    &mut self,
    rng: &mut R,
  ) -> Vec<usize> {
    let n = self.size();
    self.trails();
    let mut route = Vec::with_capacity(n);
    if n == 0 {
      return route;
    }
    let mut visited = vec![false; n];
    let start = rng.gen_range(0..n);
    route.push(start);
    visited[start] = true;

    while route.len() < n {
      let current = route[route.len() - 1];
      let unvisited: Vec<usize> = (0..n).filter(|j| !visited[*j]).collect();
      let weights: Vec<f64> = unvisited
        .iter()
        .map(|&j| self.desirability(current, j))
        .collect();
      let next = unvisited[choose(&weights, rng)];
      visited[next] = true;
      route.push(next);
    }
    route
  }

  /// Builds `ants` routes on the current trails.
  pub fn construct_population<R: Rng + ?Sized>(
    &mut self,
    ants: usize,
    rng: &mut R,
  ) -> Result<Population<usize>> {
    Population::new(
      (0..ants)
        .map(|_| Candidate::new(self.construct_route(rng)))
        .collect(),
    )
  }
}

/// Picks an index by weight. Infinite weights share all the probability;
/// when no weight is positive every index is equally likely.
fn choose<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
  let infinite: Vec<usize> = (0..weights.len())
    .filter(|&i| weights[i].is_infinite())
    .collect();
  if !infinite.is_empty() {
    return infinite[rng.gen_range(0..infinite.len())];
  }
  match WeightedIndex::new(weights) {
    Ok(distribution) => distribution.sample(rng),
    Err(_) => rng.gen_range(0..weights.len()),
  }
}

impl Variation<usize> for AntColony {
  type Leaders = BestTracker<usize>;

  fn validate(&self, population: &Population<usize>) -> Result<()> {
    check_nonnegative("alpha", self.alpha)?;
    check_nonnegative("beta", self.beta)?;
    check_probability("rho", self.rho)?;
    check_nonnegative("initial_pheromone", self.initial_pheromone)?;
    let n = self.size();
    if n == 0 {
      return Err(Error::invalid("distances", "must not be empty"));
    }
    if self.distances.iter().any(|row| row.len() != n) {
      return Err(Error::invalid("distances", "must be a square matrix"));
    }
    if self.distances.iter().flatten().any(|d| !(d.is_finite() && *d >= 0.0)) {
      return Err(Error::invalid(
        "distances",
        "must be finite and nonnegative",
      ));
    }
    if let Some(i) = population
      .iter()
      .position(|c| !is_permutation(c.genes(), n))
    {
      return Err(Error::invalid(
        "population",
        format!("route {i} is not a permutation of {n} items"),
      ));
    }
    Ok(())
  }

  fn vary<R: Rng + ?Sized>(
    &mut self,
    step: Step<'_, usize, Self::Leaders>,
    rng: &mut R,
  ) -> Result<()> {
    let rho = self.rho;
    let population = step.population;
    self.trails().evaporate(rho);
    for candidate in population.iter() {
      let length = route_length(candidate.genes(), &self.distances);
      self.pheromone.deposit(candidate.genes(), 1.0 / length);
    }
    for i in 0..population.len() {
      let route = self.construct_route(rng);
      population.replace(i, Candidate::new(route));
    }
    Ok(())
  }
}

/// Returns `true` if `route` visits each of `n` items exactly once.
pub fn is_permutation(route: &[usize], n: usize) -> bool {
  let mut seen = vec![false; n];
  route.len() == n
    && route
      .iter()
      .all(|&i| i < n && !std::mem::replace(&mut seen[i], true))
}

use popsearch::{
  bounds::Bounds,
  cellular::Cellular,
  colony::{is_permutation, route_length, AntColony},
  cuckoo::CuckooSearch,
  genetic::Genetic,
  history::History,
  objective::{Expression, Objective},
  optimizer::Optimizer,
  population::Population,
  swarm::ParticleSwarm,
  termination::{StopReason, Termination},
  wolves::GreyWolf,
};
use rand::{rngs::StdRng, SeedableRng};

fn is_monotone(history: &History, maximize: bool) -> bool {
  history.records().windows(2).all(|w| {
    if maximize {
      w[1].best >= w[0].best
    } else {
      w[1].best <= w[0].best
    }
  })
}

#[test]
fn genetic_maximizes_square_of_expressed_genes() {
  let mut rng = StdRng::seed_from_u64(10);
  let bounds = Bounds::uniform(-1.0, 2.0, 10).unwrap();
  let objective = Objective::maximize(|x: &[f64]| x[0] * x[0])
    .with_expression(Expression::Mean);
  let outcome = Optimizer::builder()
    .population(Population::random(20, &bounds, &mut rng).unwrap())
    .objective(objective)
    .variation(Genetic::builder().bounds(bounds.clone()).build())
    .iterations(50)
    .rng(rng)
    .build()
    .optimize()
    .unwrap();

  assert_eq!(outcome.history.len(), 50);
  assert!(is_monotone(&outcome.history, true));
  assert!(bounds.contains(&outcome.best));
  let mean = outcome.best.iter().sum::<f64>() / 10.0;
  assert!((outcome.fitness - mean * mean).abs() < 1e-9);
  assert!(outcome.fitness <= 4.0);
}

#[test]
fn particle_swarm_stops_on_stagnation() {
  let mut rng = StdRng::seed_from_u64(11);
  let bounds = Bounds::uniform(-10.0, 10.0, 1).unwrap();
  let outcome = Optimizer::builder()
    .population(Population::random(10, &bounds, &mut rng).unwrap())
    .objective(Objective::maximize(|x: &[f64]| {
      -x[0] * x[0] + 5.0 * x[0] + 20.0
    }))
    .variation(ParticleSwarm::builder().build())
    .iterations(1000)
    .termination(Termination::Stagnation(1))
    .rng(rng)
    .build()
    .optimize()
    .unwrap();

  assert!(outcome.history.len() < 1000);
  assert_eq!(outcome.stopped_by, StopReason::Stagnation);
  assert!(is_monotone(&outcome.history, true));
  assert!(outcome.fitness <= 26.25);
}

#[test]
fn ant_colony_builds_valid_tours() {
  let mut rng = StdRng::seed_from_u64(12);
  let points: [(f64, f64); 6] =
    [(0.0, 0.0), (0.0, 2.0), (1.0, 3.0), (3.0, 3.0), (4.0, 1.0), (2.0, 0.0)];
  let distances: Vec<Vec<f64>> = points
    .iter()
    .map(|&(ax, ay)| {
      points
        .iter()
        .map(|&(bx, by)| (ax - bx).hypot(ay - by))
        .collect()
    })
    .collect();
  let table = distances.clone();
  let mut colony = AntColony::builder().distances(distances.clone()).build();
  let ants = colony.construct_population(5, &mut rng).unwrap();

  let outcome = Optimizer::builder()
    .population(ants)
    .objective(Objective::minimize(move |route: &[usize]| {
      route_length(route, &table)
    }))
    .variation(colony)
    .iterations(30)
    .rng(rng)
    .build()
    .optimize()
    .unwrap();

  assert!(is_permutation(&outcome.best, 6));
  assert_eq!(outcome.fitness, route_length(&outcome.best, &distances));
  assert!(is_monotone(&outcome.history, false));
}

#[test]
fn cuckoo_search_fills_the_knapsack() {
  let weights = [10.0, 20.0, 30.0, 40.0, 15.0];
  let values = [60.0, 100.0, 120.0, 240.0, 70.0];
  let total = |x: &[u8], table: [f64; 5]| {
    x.iter().zip(table).map(|(b, t)| f64::from(*b) * t).sum::<f64>()
  };
  let objective = Objective::maximize(move |x: &[u8]| total(x, values))
    .with_constraint(move |x: &[u8]| total(x, weights) <= 50.0, 0.0);

  let mut rng = StdRng::seed_from_u64(13);
  let outcome = Optimizer::builder()
    .population(Population::random_binary(20, 5, &mut rng).unwrap())
    .objective(objective)
    .variation(CuckooSearch::builder().build())
    .iterations(100)
    .rng(rng)
    .build()
    .optimize()
    .unwrap();

  assert!(is_monotone(&outcome.history, true));
  assert!(total(&outcome.best, weights) <= 50.0);
  assert_eq!(outcome.fitness, total(&outcome.best, values));
  assert!(outcome.fitness <= 300.0);
}

#[test]
fn grey_wolves_minimize_sphere() {
  let mut rng = StdRng::seed_from_u64(14);
  let bounds = Bounds::uniform(-10.0, 10.0, 5).unwrap();
  let optimizer = Optimizer::builder()
    .population(Population::random(30, &bounds, &mut rng).unwrap())
    .objective(Objective::minimize(|x: &[f64]| {
      x.iter().map(|v| v * v).sum::<f64>()
    }))
    .variation(GreyWolf::builder().bounds(bounds.clone()).build())
    .iterations(60)
    .rng(rng)
    .build();
  let outcome = optimizer.optimize().unwrap();

  assert!(is_monotone(&outcome.history, false));
  assert!(bounds.contains(&outcome.best));
  assert!(outcome.fitness < outcome.history.records()[0].best);
  assert!(outcome.fitness < 0.1);
}

#[test]
fn cellular_grid_minimizes_parabola() {
  let mut rng = StdRng::seed_from_u64(15);
  let bounds = Bounds::uniform(-10.0, 10.0, 1).unwrap();
  let outcome = Optimizer::builder()
    .population(Population::random(100, &bounds, &mut rng).unwrap())
    .objective(Objective::minimize(|x: &[f64]| {
      x[0] * x[0] - 4.0 * x[0] + 4.0
    }))
    .variation(Cellular::builder().bounds(bounds.clone()).build())
    .iterations(100)
    .rng(rng)
    .build()
    .optimize()
    .unwrap();

  assert_eq!(outcome.history.len(), 100);
  assert!(is_monotone(&outcome.history, false));
  assert!(bounds.contains(&outcome.best));
  assert!(outcome.fitness >= 0.0);
  assert!(outcome.fitness < 1.0);
}

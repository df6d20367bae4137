//! **popsearch** is a population-based stochastic optimization engine. It
//! runs genetic, particle-swarm, ant-colony, cuckoo-search, grey-wolf and
//! cellular algorithms through one controller, with each algorithm's update
//! rule plugged in as a strategy.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! Structurally, all of these algorithms do the same thing. They keep a
//! population of candidate solutions and evaluate a scalar objective for each
//! of them. They keep track of the best solutions found and turn the
//! population into a new one until some stopping condition is met. This crate
//! names each of those parts:
//! - **Objective** - a scalar function of a gene vector together with its
//!   sense (minimize or maximize), an optional feasibility penalty and an
//!   optional gene expression
//! - **Population** - a fixed-size sequence of **candidates**, each holding a
//!   gene vector and the cached fitness of those genes
//! - **Leaders** - the best solution(s) found so far: a single global best,
//!   or the alpha/beta/delta hierarchy of the grey-wolf algorithm
//! - **Variation** - the algorithm-specific update rule that produces the
//!   next population, together with whatever state the algorithm carries
//!   (velocities, pheromone trails, ...)
//! - **Optimizer** - the controller that runs the loop:
//!   1. **Prepare** the population (e.g. clip it into bounds)
//!   2. **Evaluate** every candidate, sequentially or in parallel
//!   3. **Track** the leaders
//!   4. **Record** the best-so-far fitness in the **history**
//!   5. **Terminate** if the iteration budget is used up or the
//!      **termination** policy fires
//!   6. **Vary** the population
//!
//! # Algorithms
//!
//! | Algorithm      | Variation                      | Genes   | Leaders         |
//! |:---------------|:-------------------------------|:-------:|:---------------:|
//! | Genetic        | [`Genetic`]                    | `f64`   | [`BestTracker`] |
//! | Particle swarm | [`ParticleSwarm`]              | `f64`   | [`BestTracker`] |
//! | Ant colony     | [`AntColony`]                  | `usize` | [`BestTracker`] |
//! | Cuckoo search  | [`CuckooSearch`]               | `u8`    | [`BestTracker`] |
//! | Grey wolf      | [`GreyWolf`]                   | `f64`   | [`Hierarchy`]   |
//! | Cellular       | [`Cellular`]                   | `f64`   | [`BestTracker`] |
//!
//! Every variation is a plain struct built with a [typed-builder] builder.
//! Its parameters are checked when the run starts, so a bad configuration is
//! reported as [`Error::InvalidConfiguration`] before the objective is called
//! even once. If you happen to need another update rule, implement
//! [`Variation`] for your own type.
//!
//! # Closures
//!
//! Objectives are closures of type `Fn(&[G]) -> f64`. A closure that may fail
//! is wrapped into [`Fallible`] and returns a `Result` instead; the first
//! failure terminates the run, and the returned error carries the history
//! collected so far. Custom stopping conditions are closures of type
//! `FnMut(&History) -> bool`, see [`Terminator`].
//!
//! # Parallelization
//!
//! Evaluations of a single pass are independent, so the controller can spread
//! them over [rayon]'s thread pool with [`Execution::ParallelEach`] or
//! [`Execution::ParallelBatch`]. To be evaluated in parallel, genes must be
//! `Send + Sync`, which the objective already requires of itself. For cheap
//! objectives the overhead usually only decreases performance. Benchmark, if
//! in doubt.
//!
//! # Randomness
//!
//! The optimizer owns its random number generator and hands it to every
//! operator call, so a run seeded with the same value reproduces the same
//! history exactly. Nothing in this crate touches a thread-local generator.
//!
//! # Logging
//!
//! The crate emits [tracing] events: a `debug` span per iteration, `debug`
//! events on every improvement of the best fitness and an `info` event when a
//! run finishes. Install a subscriber of your choice to see them.
//!
//! # Example
//!
//! Minimization of the sphere function with the grey-wolf algorithm.
//! ```
//! use popsearch::{
//!   bounds::Bounds,
//!   objective::Objective,
//!   optimizer::Optimizer,
//!   population::Population,
//!   termination::StopReason,
//!   wolves::GreyWolf,
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//! // seeded for reproducibility
//! let mut rng = StdRng::seed_from_u64(7);
//! // 5 dimensions, each between -10 and 10
//! let bounds = Bounds::uniform(-10.0, 10.0, 5).unwrap();
//! // `f(x) = sum(x_i^2)`
//! let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! let optimizer = Optimizer::builder()
//!   .population(Population::random(30, &bounds, &mut rng).unwrap())
//!   .objective(Objective::minimize(sphere))
//!   .variation(GreyWolf::builder().bounds(bounds).build())
//!   .iterations(50)
//!   .rng(rng)
//!   .build();
//! // upon termination the optimizer returns the best solution it has found
//! let outcome = optimizer.optimize().unwrap();
//! assert_eq!(outcome.stopped_by, StopReason::Budget);
//! assert_eq!(outcome.history.len(), 50);
//! assert!(outcome.fitness < 1.0);
//! ```
//!
//! # Common pitfalls
//!
//! - The objective receives genes as a slice. A closure without a type
//!   annotation on its argument will confuse the compiler, so write
//!   `|x: &[f64]| ...` instead of `|x| ...`.
//! - The ant-colony variant expects an objective that measures route length
//!   and is minimized. Build it with [`route_length`].
//! - Under [`Sense::Maximize`], roulette selection of the genetic variant
//!   expects positive fitness values. Should all weights be zero or negative,
//!   parents are picked uniformly.
//!
//! [`Genetic`]: crate::genetic::Genetic
//! [`ParticleSwarm`]: crate::swarm::ParticleSwarm
//! [`AntColony`]: crate::colony::AntColony
//! [`CuckooSearch`]: crate::cuckoo::CuckooSearch
//! [`GreyWolf`]: crate::wolves::GreyWolf
//! [`Cellular`]: crate::cellular::Cellular
//! [`BestTracker`]: crate::leaders::BestTracker
//! [`Hierarchy`]: crate::leaders::Hierarchy
//! [`Variation`]: crate::variation::Variation
//! [`Error::InvalidConfiguration`]: crate::error::Error::InvalidConfiguration
//! [`Fallible`]: crate::objective::Fallible
//! [`Terminator`]: crate::termination::Terminator
//! [`Execution::ParallelEach`]: crate::execution::Execution::ParallelEach
//! [`Execution::ParallelBatch`]: crate::execution::Execution::ParallelBatch
//! [`route_length`]: crate::colony::route_length
//! [`Sense::Maximize`]: crate::score::Sense::Maximize
//! [typed-builder]: https://docs.rs/typed-builder
//! [rayon]: https://docs.rs/rayon
//! [tracing]: https://docs.rs/tracing

#![warn(missing_docs)]

pub mod bounds;
pub mod candidate;
pub mod cellular;
pub mod colony;
pub mod cuckoo;
pub mod error;
pub mod execution;
pub mod genetic;
pub mod history;
pub mod leaders;
pub mod objective;
pub mod optimizer;
pub mod population;
pub mod score;
pub mod swarm;
pub mod termination;
pub mod variation;
pub mod wolves;

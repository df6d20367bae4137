//! Strategies for evaluating the candidates of one pass.

use std::fmt::Debug;

use rayon::prelude::*;

use crate::{
  candidate::Candidate,
  error::Result,
  objective::Objective,
  score::Fitness,
};

/// How the objective is applied to the candidates of a population.
///
/// Evaluations within one pass never depend on each other and each result is
/// cached in its own candidate, so they can run on [rayon]'s thread pool
/// without any locking.
///
/// **For cheap objectives parallelization may only decrease performance
/// because of additional overhead introduced. Benchmark if in doubt.**
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Execution {
  /// Evaluates candidates one after another on the calling thread.
  #[default]
  Sequential,
  /// Evaluates **each** candidate as a separate parallel task.
  ParallelEach,
  /// Splits candidates into one **batch** per available thread.
  ParallelBatch,
}

impl Execution {
  /// Evaluates every candidate, returning fitness values in population
  /// order. Candidates with a valid cached fitness are not re-evaluated.
  ///
  /// If several evaluations fail, the failure of the candidate with the
  /// lowest index is returned.
  pub fn evaluate<G>(
    self,
    candidates: &mut [Candidate<G>],
    objective: &Objective<G>,
  ) -> Result<Vec<Fitness>>
  where
    G: Debug + Send + Sync,
  {
    let results: Vec<Result<Fitness>> = match self {
      Execution::Sequential => candidates
        .iter_mut()
        .map(|c| c.evaluate(objective))
        .collect(),
      Execution::ParallelEach => candidates
        .par_iter_mut()
        .map(|c| c.evaluate(objective))
        .collect(),
      Execution::ParallelBatch => {
        let chunk_size =
          (candidates.len() / rayon::current_num_threads()).max(1);
        candidates
          .par_chunks_mut(chunk_size)
          .flat_map_iter(|chunk| {
            chunk.iter_mut().map(|c| c.evaluate(objective))
          })
          .collect()
      }
    };
    results.into_iter().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;

  fn candidates() -> Vec<Candidate> {
    (0..37).map(|i| Candidate::new(vec![i as f64, 1.0])).collect()
  }

  #[test]
  fn test_strategies_agree() {
    let objective = Objective::minimize(|x: &[f64]| x[0] * x[1] + 1.0);
    let expected: Vec<_> = (0..37).map(|i| i as f64 + 1.0).collect();
    for execution in [
      Execution::Sequential,
      Execution::ParallelEach,
      Execution::ParallelBatch,
    ] {
      let mut population = candidates();
      let fitness = execution.evaluate(&mut population, &objective).unwrap();
      assert_eq!(fitness, expected);
      assert!(population.iter().all(Candidate::is_evaluated));
    }
  }

  #[test]
  fn test_empty_slice() {
    let objective = Objective::minimize(|x: &[f64]| x[0]);
    let fitness = Execution::ParallelBatch
      .evaluate(&mut Vec::<Candidate>::new(), &objective)
      .unwrap();
    assert!(fitness.is_empty());
  }

  #[test]
  fn test_first_failure_is_reported() {
    let objective = Objective::minimize(|x: &[f64]| {
      if x[0] >= 10.0 {
        f64::NAN
      } else {
        x[0]
      }
    });
    for execution in [Execution::Sequential, Execution::ParallelEach] {
      let mut population = candidates();
      match execution.evaluate(&mut population, &objective) {
        Err(Error::ObjectiveEvaluation { genes, .. }) => {
          assert_eq!(genes, "[10.0, 1.0]")
        }
        other => panic!("unexpected {other:?}"),
      }
    }
  }
}

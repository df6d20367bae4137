//! Per-iteration record of the best fitness found so far.

use crate::score::Fitness;

/// A single entry of [`History`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Record {
  /// Zero-based index of the iteration that produced this record.
  pub iteration: usize,
  /// Best fitness found up to and including `iteration`.
  pub best: Fitness,
}

/// An append-only sequence of [`Record`]s, one per completed iteration.
///
/// Values are copied in, so later mutation of the population never changes
/// what was recorded. The sequence can be handed as is to a plotting
/// collaborator to draw a convergence curve.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct History {
  records: Vec<Record>,
}

impl History {
  /// Creates an empty history.
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn push(&mut self, iteration: usize, best: Fitness) {
    self.records.push(Record { iteration, best });
  }

  /// Number of recorded iterations.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Returns `true` if nothing has been recorded yet.
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// The most recent record.
  pub fn last(&self) -> Option<&Record> {
    self.records.last()
  }

  /// Iterates over records in iteration order.
  pub fn iter(&self) -> impl Iterator<Item = &Record> {
    self.records.iter()
  }

  /// Recorded records as a slice.
  pub fn records(&self) -> &[Record] {
    &self.records
  }

  /// Best-so-far values in iteration order, ready for plotting.
  pub fn curve(&self) -> Vec<Fitness> {
    self.records.iter().map(|r| r.best).collect()
  }

  /// Number of consecutive trailing iterations in which the best fitness did
  /// not change compared to the iteration before.
  pub fn stagnation(&self) -> usize {
    self
      .records
      .windows(2)
      .rev()
      .take_while(|w| w[0].best == w[1].best)
      .count()
  }
}

impl<'a> IntoIterator for &'a History {
  type Item = &'a Record;
  type IntoIter = std::slice::Iter<'a, Record>;

  fn into_iter(self) -> Self::IntoIter {
    self.records.iter()
  }
}

//! Task sequencing: one-time uniform shuffle plus a cursor.
//!
//! The sequence is permuted exactly once, at construction, and never
//! mutated afterwards; the cursor only moves forward.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::task::EvalTask;

/// An immutable, shuffled sequence of tasks with a progress cursor.
#[derive(Debug, Clone)]
pub struct TaskSequence {
    tasks: Vec<EvalTask>,
    cursor: usize,
}

impl TaskSequence {
    /// Builds the sequence, applying the one-and-only uniform shuffle.
    ///
    /// With `seed = None` each run yields a fresh permutation; a fixed
    /// seed gives a reproducible order for tests.
    pub fn shuffled(mut tasks: Vec<EvalTask>, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        tasks.shuffle(&mut rng);
        Self { tasks, cursor: 0 }
    }

    /// The task at the cursor, or `None` once the sequence is exhausted.
    pub fn current(&self) -> Option<&EvalTask> {
        self.tasks.get(self.cursor)
    }

    /// Moves the cursor forward by one. Saturates at the end.
    pub fn advance(&mut self) {
        if self.cursor < self.tasks.len() {
            self.cursor += 1;
        }
    }

    /// `(completed, total)` counts for progress display.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor.min(self.tasks.len()), self.tasks.len())
    }

    /// Total number of tasks in the sequence.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the sequence contains no tasks at all.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether every task has been advanced past.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.tasks.len()
    }
}

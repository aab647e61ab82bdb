//! Lazy cursors over a range of logical snapshot indices

use std::iter::FusedIterator;

use crate::snapshot::Run;

/// Pull-based iterator over the views at logical indices `[start, end)`.
///
/// Runs that end before `start` are skipped whole, without visiting their
/// repetitions. If `end` exceeds the sequence length the cursor simply yields
/// fewer views. Every cursor is independent; build a new one to restart.
#[derive(Debug)]
pub struct RangeCursor<'a, G> {
    runs: &'a [Run<G>],
    /// Index of the run under the cursor
    run: usize,
    /// Logical index of that run's first view
    run_start: usize,
    /// Logical index of the next view to yield
    pos: usize,
    end: usize,
}

impl<'a, G> RangeCursor<'a, G> {
    pub(crate) fn new(runs: &'a [Run<G>], total: usize, start: usize, end: usize) -> Self {
        Self {
            runs,
            run: 0,
            run_start: 0,
            pos: start,
            end: end.min(total),
        }
    }

    /// Logical index of the next view this cursor would yield
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a, G> Iterator for RangeCursor<'a, G> {
    type Item = &'a G;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }

        while let Some(run) = self.runs.get(self.run) {
            let run_end = self.run_start + run.len();
            if self.pos < run_end {
                self.pos += 1;
                return Some(run.view());
            }
            self.run_start = run_end;
            self.run += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<G> ExactSizeIterator for RangeCursor<'_, G> {}

impl<G> FusedIterator for RangeCursor<'_, G> {}

#[cfg(test)]
mod tests {
    use crate::snapshot::SnapshotSequence;

    fn abc() -> SnapshotSequence<char> {
        // [(A,3), (B,2), (C,1)]
        "AAABBC".chars().collect()
    }

    #[test]
    fn test_range_crosses_run_boundary() {
        let seq = abc();
        let got: Vec<char> = seq.range(2, 4).copied().collect();
        assert_eq!(got, vec!['A', 'B']);
    }

    #[test]
    fn test_range_skips_whole_runs() {
        let seq = abc();
        assert_eq!(seq.range(5, 6).copied().collect::<Vec<_>>(), vec!['C']);
        assert_eq!(seq.range(3, 5).copied().collect::<Vec<_>>(), vec!['B', 'B']);
    }

    #[test]
    fn test_range_past_end_is_short() {
        let seq = abc();
        let cursor = seq.range(4, 100);
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.copied().collect::<Vec<_>>(), vec!['B', 'C']);

        assert_eq!(seq.range(6, 10).count(), 0);
        assert_eq!(seq.range(4, 2).count(), 0);
    }

    #[test]
    fn test_cursors_are_independent() {
        let seq = abc();
        let mut first = seq.range(0, 6);
        first.next();
        first.next();

        let second: String = seq.range(0, 6).collect();
        assert_eq!(second, "AAABBC");
        assert_eq!(first.position(), 2);
        assert_eq!(first.collect::<String>(), "ABBC");
    }

    #[test]
    fn test_exact_size_tracks_progress() {
        let seq = abc();
        let mut cursor = seq.range(1, 5);
        assert_eq!(cursor.len(), 4);
        cursor.next();
        assert_eq!(cursor.len(), 3);
        assert_eq!(cursor.size_hint(), (3, Some(3)));
    }
}

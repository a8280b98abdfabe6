//! The bulk-apply primitive Design Notes §9 asks for: "model [loop-level
//! parallelism] as a bulk-apply primitive over an index range with a
//! per-index closure; require the closure to use only thread-safe curve
//! and hash variants." Backed by `rayon`.

/// Below this many items, iterate sequentially rather than pay rayon's
/// work-stealing setup cost. Scenario 5 of §8 (`|X| = 1`) is the
/// motivating case.
const PARALLEL_THRESHOLD: usize = 64;

/// Apply `f` to every index in `0..len`, collecting results in order.
/// `f` must be safe to call concurrently from multiple threads — the
/// same requirement the parallel-pipelined mode places on the curve
/// operations it closes over.
pub fn for_each_indexed<T, F>(len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if len < PARALLEL_THRESHOLD {
        (0..len).map(f).collect()
    } else {
        use rayon::prelude::*;
        (0..len).into_par_iter().map(f).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matches_sequential_map_below_threshold() {
        let out = for_each_indexed(5, |i| i * i);
        assert_eq!(out, vec![0, 1, 4, 9, 16]);
    }

    #[test]
    fn matches_sequential_map_above_threshold() {
        let out = for_each_indexed(200, |i| i * 2);
        let expected: Vec<usize> = (0..200).map(|i| i * 2).collect();
        assert_eq!(out, expected);
    }
}

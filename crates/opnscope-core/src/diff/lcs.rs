//! Longest-common-subsequence support for reorder detection.
use std::collections::HashSet;

/// Returns the set of keys that are positionally stable between `old` and
/// `new`.
///
/// A key is stable when it belongs to a longest common subsequence of the
/// two orderings. The LCS is computed in both directions and intersected:
/// with a single pass, the backtrack tie-break would keep an arbitrary
/// member of a swapped pair and flag only the other, so a plain swap would
/// surface as one move instead of two.
pub(super) fn stable_keys(old: &[String], new: &[String]) -> HashSet<String> {
    let forward = lcs_members(old, new);
    let backward = lcs_members(new, old);
    forward.intersection(&backward).cloned().collect()
}

/// Returns the members of one longest common subsequence of `a` and `b`.
///
/// Standard dynamic program; on ties the backtrack prefers stepping in `a`,
/// which makes the choice deterministic.
fn lcs_members(a: &[String], b: &[String]) -> HashSet<String> {
    let n = a.len();
    let m = b.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut members = HashSet::new();
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if a[i] == b[j] {
            members.insert(a[i].clone());
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    members
}

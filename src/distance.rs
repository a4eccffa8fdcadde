//! Levenshtein edit distance.

use std::cmp::min;

/// The minimum number of single-character insertions, deletions and
/// substitutions that turn `a` into `b`.
///
/// Keeps a single row of `len(a) + 1` cells and walks the characters of `b`
/// as the outer loop. `lastdiag` carries the cell that the in-place update
/// would otherwise have overwritten.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let mut column: Vec<usize> = (0..=a.len()).collect();

    for (x, b_char) in b.chars().enumerate() {
        let mut lastdiag: usize = column[0];
        column[0] = x + 1;
        let mut y: usize = 1;
        while y <= a.len() {
            let olddiag: usize = column[y];
            let cost: usize = usize::from(a[y - 1] != b_char);
            column[y] = min(min(column[y] + 1, column[y - 1] + 1), lastdiag + cost);
            lastdiag = olddiag;
            y += 1;
        }
    }
    column[a.len()]
}

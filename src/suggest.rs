//! Nearest-key suggestions for words that are missing from a table.
//!
//! A scan visits every entry once and keeps the `n` closest keys in a
//! max-heap ordered by edit distance, so the worst kept candidate is always
//! on top and can be swapped out in `O(log n)`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use log::trace;

use crate::distance::levenshtein;
use crate::hash_table::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub word: String,
    /// Edit distance from the query.
    pub distance: usize,
}

/// A kept key and the position it was seen at during the scan.
#[derive(Debug, PartialEq, Eq)]
struct Candidate<'a> {
    distance: usize,
    seen: usize,
    word: &'a str,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then(self.seen.cmp(&other.seen))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns up to `n` keys of `map` closest to `query`, nearest first.
///
/// The first `n` entries seed the result. After that an entry only gets in
/// by being strictly closer than the worst kept one, so among equally distant
/// keys the one met earlier in bucket order wins. Results with the same
/// distance are listed in scan order. The map is not modified.
pub fn suggest<T>(map: &HashMap<T>, query: &str, n: usize) -> Vec<Suggestion>
where
    T: Debug,
{
    if n == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Candidate<'_>> = BinaryHeap::with_capacity(n);
    for (seen, (word, _)) in map.iter().enumerate() {
        let distance: usize = levenshtein(query, word);
        if heap.len() < n {
            heap.push(Candidate {
                distance,
                seen,
                word,
            });
        } else if let Some(mut worst) = heap.peek_mut() {
            if distance < worst.distance {
                *worst = Candidate {
                    distance,
                    seen,
                    word,
                };
            }
        }
    }
    trace!(
        "scanned {} entries for {:?}, kept {}",
        map.size(),
        query,
        heap.len()
    );

    heap.into_sorted_vec()
        .into_iter()
        .map(|c| Suggestion {
            word: c.word.to_string(),
            distance: c.distance,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Misspelled(Vec<Suggestion>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggester {
    /// How many suggestions a misspelled word gets.
    pub count: usize,
}

impl Default for Suggester {
    fn default() -> Self {
        Self { count: 5 }
    }
}

impl Suggester {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// A word present in `dictionary` is correct. Anything else is misspelled
    /// and comes back with the closest dictionary words.
    pub fn check<T>(&self, dictionary: &HashMap<T>, word: &str) -> Verdict
    where
        T: Debug,
    {
        if dictionary.contains_key(word) {
            Verdict::Correct
        } else {
            Verdict::Misspelled(suggest(dictionary, word, self.count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animals() -> HashMap<usize> {
        let mut map: HashMap<usize> = HashMap::with_capacity(10);
        for word in ["cat", "cats", "dog", "dogs", "bat"] {
            map.put(word, 1).unwrap();
        }
        map
    }

    #[test]
    fn test_suggest_closest() {
        let map: HashMap<usize> = animals();
        let results: Vec<Suggestion> = suggest(&map, "cot", 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].distance, 1);
        // cat and cot are the only pair at distance 1
        assert_eq!(results[0].word, "cat");
        let kept_max: usize = results.iter().map(|s| s.distance).max().unwrap();
        for (word, _) in map.iter() {
            if !results.iter().any(|s| s.word == word) {
                assert!(levenshtein("cot", word) >= kept_max, "{word} was skipped");
            }
        }
    }

    #[test]
    fn test_suggest_sorted_by_distance() {
        let map: HashMap<usize> = animals();
        let results: Vec<Suggestion> = suggest(&map, "dgs", 5);
        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(results[0].word, "dogs");
    }

    #[test]
    fn test_suggest_small_table() {
        let mut map: HashMap<usize> = HashMap::with_capacity(4);
        map.put("one", 1).unwrap();
        map.put("two", 2).unwrap();
        assert_eq!(suggest(&map, "three", 5).len(), 2);
        assert!(suggest(&map, "three", 0).is_empty());

        let empty: HashMap<usize> = HashMap::with_capacity(4);
        assert!(suggest(&empty, "three", 5).is_empty());
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let mut map: HashMap<usize> = HashMap::with_capacity(64);
        for word in ["aa", "bb", "cc", "dd"] {
            map.put(word, 0).unwrap();
        }
        let order: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        // all four are two edits from "zz"
        let results: Vec<Suggestion> = suggest(&map, "zz", 2);
        let words: Vec<&str> = results.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, order[..2].to_vec());
    }

    #[test]
    fn test_suggest_leaves_values_alone() {
        let map: HashMap<usize> = animals();
        suggest(&map, "cot", 3);
        assert!(map.iter().all(|(_, v)| *v == 1));
    }

    #[test]
    fn test_check() {
        let map: HashMap<usize> = animals();
        let suggester: Suggester = Suggester::default();
        assert_eq!(suggester.count, 5);
        assert_eq!(suggester.check(&map, "dog"), Verdict::Correct);
        match Suggester::new(1).check(&map, "dot") {
            Verdict::Misspelled(s) => {
                assert_eq!(s.len(), 1);
                assert_eq!(s[0].word, "dog");
            }
            Verdict::Correct => panic!("dot is not in the table"),
        }
    }
}

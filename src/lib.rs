//! A string-keyed hash table with separate chaining, and a spelling
//! suggester that ranks the table's keys by edit distance.
//!
//! ```
//! use rusty_chains::hash_table::HashMap;
//! use rusty_chains::suggest::suggest;
//!
//! let mut map: HashMap<usize> = HashMap::with_capacity(4);
//! for word in ["cat", "cats", "dog", "dogs", "bat"] {
//!     map.put(word, 1).unwrap();
//! }
//! assert_eq!(map.capacity(), 8);
//!
//! let closest = suggest(&map, "cot", 3);
//! assert_eq!(closest[0].word, "cat");
//! ```

pub mod distance;
pub mod error;
pub mod hash_table;
pub mod suggest;
pub mod words;

pub use error::{ChainError, Result};
pub use hash_table::{Config, HashFunction, HashMap};
pub use suggest::{suggest, Suggester, Suggestion, Verdict};

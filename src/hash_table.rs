//! A string-keyed hash table built on separate chaining.
//!
//! Every bucket owns its entries in insertion order. When a new key pushes the
//! load factor over the configured threshold the bucket array is doubled and
//! every entry is rehashed into it before `put` returns.

use std::fmt::{self, Debug, Display};
use std::mem;

use log::debug;

use crate::error::{ChainError, Result};

/// 2^64 divided by the golden ratio.
///
/// ```text
/// golden_ratio = (1 + sqrt(5)) / 2 = 1.618033988749894848204586834
/// 2^64 / golden_ratio = 11400714819323198486
/// ```
const HASH_MULTIPLIER: u64 = 11400714819323198486;

/// The functions a table can use to turn a key into a (possibly negative) hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Sum of the key's byte codes. Anagrams collide.
    CharSum,
    /// Sum of each byte code weighted by its one-based position.
    WeightedCharSum,
    /// Multiplicative mixing of every byte by the golden ratio constant.
    #[default]
    Fibonacci,
}

impl HashFunction {
    pub fn hash(&self, key: &str) -> i64 {
        match self {
            HashFunction::CharSum => key
                .bytes()
                .fold(0i64, |r: i64, b: u8| r.wrapping_add(b as i64)),
            HashFunction::WeightedCharSum => {
                key.bytes().enumerate().fold(0i64, |r: i64, (i, b)| {
                    r.wrapping_add((i as i64 + 1).wrapping_mul(b as i64))
                })
            }
            HashFunction::Fibonacci => {
                let mut h: u64 = 0;
                for b in key.bytes() {
                    h = (h.rotate_left(5) ^ b as u64).wrapping_mul(HASH_MULTIPLIER);
                }
                // reinterpreting the bits is intended, negative hashes are normal
                h as i64
            }
        }
    }
}

/// Maps a hash into `[0, capacity)`. A negative remainder is shifted up by
/// `capacity` rather than cast to unsigned.
#[inline]
fn index_for(hash: i64, capacity: usize) -> usize {
    let capacity: i64 = capacity as i64;
    let mut idx: i64 = hash % capacity;
    if idx < 0 {
        idx += capacity;
    }
    idx as usize
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of buckets the table starts with. Must be positive.
    pub initial_capacity: usize,
    /// The table doubles once `size / capacity` exceeds this.
    pub max_load_factor: f64,
    pub hash_function: HashFunction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            max_load_factor: HashMap::<()>::MAX_LOAD_FACTOR,
            hash_function: HashFunction::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    key: String,
    value: T,
}

impl<T> Entry<T> {
    fn try_new(key: &str, value: T) -> Result<Entry<T>> {
        let mut owned: String = String::new();
        owned
            .try_reserve_exact(key.len())
            .map_err(|_| ChainError::allocation_failed(key.len()))?;
        owned.push_str(key);
        Ok(Entry { key: owned, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

type Bucket<T> = Vec<Entry<T>>;

#[cfg(test)]
thread_local! {
    /// Makes the next growth on this thread fail as if out of memory.
    static FAIL_NEXT_GROWTH: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

#[derive(Debug, Clone)]
pub struct HashMap<T>
where
    T: Debug,
{
    size: usize,
    max_load_factor: f64,
    hash_function: HashFunction,
    buckets: Vec<Bucket<T>>,
}

impl<T> Default for HashMap<T>
where
    T: Debug,
{
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<T> HashMap<T>
where
    T: Debug,
{
    pub const MAX_LOAD_FACTOR: f64 = 0.7;

    pub fn with_capacity(initial_capacity: usize) -> HashMap<T> {
        Self::with_config(Config {
            initial_capacity,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> HashMap<T> {
        assert!(config.initial_capacity > 0, "capacity must be positive");
        assert!(
            config.max_load_factor > 0.0 && config.max_load_factor.is_finite(),
            "max load factor must be a positive number, got {}",
            config.max_load_factor
        );
        HashMap {
            size: 0,
            max_load_factor: config.max_load_factor,
            hash_function: config.hash_function,
            buckets: Self::empty_buckets(config.initial_capacity),
        }
    }

    fn empty_buckets(capacity: usize) -> Vec<Bucket<T>> {
        (0..capacity).map(|_| Bucket::<T>::new()).collect()
    }

    #[inline]
    fn bucket_index(&self, key: &str) -> usize {
        index_for(self.hash_function.hash(key), self.capacity())
    }

    /// Is the load factor above the threshold?
    fn should_grow(&self) -> bool {
        self.load_factor() > self.max_load_factor
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    pub fn empty_bucket_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_empty()).count()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        let h: usize = self.bucket_index(key);
        self.buckets[h]
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let h: usize = self.bucket_index(key);
        self.buckets[h]
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or overwrites `key`. An overwrite hands back the old value and
    /// never resizes. A new key is appended to its bucket, and if the table is
    /// then over its load threshold the capacity is doubled.
    ///
    /// On `AllocationFailed` the table is exactly as it was before the call.
    pub fn put(&mut self, key: &str, value: T) -> Result<Option<T>> {
        let h: usize = self.bucket_index(key);
        if let Some(entry) = self.buckets[h].iter_mut().find(|e| e.key == key) {
            return Ok(Some(mem::replace(&mut entry.value, value)));
        }

        let entry: Entry<T> = Entry::try_new(key, value)?;
        let bucket: &mut Bucket<T> = &mut self.buckets[h];
        bucket
            .try_reserve(1)
            .map_err(|_| ChainError::allocation_failed(bucket.len() + 1))?;
        bucket.push(entry);
        self.size += 1;

        if self.should_grow() {
            if let Err(e) = self.grow() {
                self.buckets[h].pop();
                self.size -= 1;
                return Err(e);
            }
        }
        Ok(None)
    }

    fn grow(&mut self) -> Result<()> {
        #[cfg(test)]
        {
            if FAIL_NEXT_GROWTH.with(|fail| fail.replace(false)) {
                return Err(ChainError::allocation_failed(self.capacity() * 2));
            }
        }
        match self.capacity().checked_mul(2) {
            Some(new_capacity) => self.resize(new_capacity),
            None => Err(ChainError::allocation_failed(usize::MAX)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let h: usize = self.bucket_index(key);
        let bucket: &mut Bucket<T> = &mut self.buckets[h];
        let pos: usize = bucket.iter().position(|e| e.key == key)?;
        self.size -= 1;
        Some(bucket.remove(pos).value)
    }

    /// Rehashes every entry into a table of `capacity` buckets.
    ///
    /// All memory the new table needs is reserved before a single entry moves,
    /// so a failed reservation leaves the current table untouched. The new
    /// bucket array is swapped in whole.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let old_capacity: usize = self.capacity();
        assert!(
            capacity > old_capacity,
            "resize must grow the table: {} -> {}",
            old_capacity,
            capacity
        );

        let mut lengths: Vec<usize> = Vec::new();
        lengths
            .try_reserve_exact(capacity)
            .map_err(|_| ChainError::allocation_failed(capacity))?;
        lengths.resize(capacity, 0);
        for entry in self.buckets.iter().flatten() {
            lengths[index_for(self.hash_function.hash(&entry.key), capacity)] += 1;
        }

        let mut buckets: Vec<Bucket<T>> = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|_| ChainError::allocation_failed(capacity))?;
        for len in lengths {
            let mut bucket: Bucket<T> = Bucket::<T>::new();
            bucket
                .try_reserve_exact(len)
                .map_err(|_| ChainError::allocation_failed(len))?;
            buckets.push(bucket);
        }

        // nothing below allocates
        let old: Vec<Bucket<T>> = mem::replace(&mut self.buckets, buckets);
        for entry in old.into_iter().flatten() {
            let h: usize = index_for(self.hash_function.hash(&entry.key), capacity);
            self.buckets[h].push(entry);
        }

        debug!(
            "resized table from {} to {} buckets ({} entries)",
            old_capacity, capacity, self.size
        );
        Ok(())
    }

    /// Entries in bucket order, then in insertion order within a bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (e.key.as_str(), &e.value))
    }

    /// The non-empty buckets with their indices.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, &[Entry<T>])> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(i, b)| (i, b.as_slice()))
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            size: self.size(),
            capacity: self.capacity(),
            empty_buckets: self.empty_bucket_count(),
            load_factor: self.load_factor(),
        }
    }
}

/// Bucket-by-bucket dump of the table, one line per non-empty bucket.
impl<T> Display for HashMap<T>
where
    T: Debug + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bucket) in self.buckets() {
            write!(f, "Bucket {}:", i)?;
            for entry in bucket {
                write!(f, " [{}, {}] ->", entry.key, entry.value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub size: usize,
    pub capacity: usize,
    pub empty_buckets: usize,
    pub load_factor: f64,
}

impl Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Empty buckets: {}", self.empty_buckets)?;
        writeln!(f, "Number of links: {}", self.size)?;
        writeln!(f, "Number of buckets: {}", self.capacity)?;
        write!(f, "Table load: {:.6}", self.load_factor)
    }
}

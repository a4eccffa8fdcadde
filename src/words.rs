//! Word tokens from a byte stream, and the two ways of loading them into a
//! table.
//!
//! A word is a maximal run of ASCII letters, digits and apostrophes. Words
//! are folded to lowercase before they are handed out; every other byte is a
//! separator.

use std::io::{self, BufRead, Read};

use crate::error::{ChainError, Result};
use crate::hash_table::HashMap;

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'\''
}

/// An iterator over the words of a reader. The read position lives in the
/// iterator, so independent streams never share state.
///
/// A read error in the middle of a word first yields the letters read so far,
/// then the error on the following call.
pub struct Words<R>
where
    R: BufRead,
{
    bytes: io::Bytes<R>,
    pending: Option<io::Error>,
}

impl<R> Words<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Words<R> {
        Words {
            bytes: reader.bytes(),
            pending: None,
        }
    }
}

impl<R> Iterator for Words<R>
where
    R: BufRead,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Result<String>> {
        if let Some(e) = self.pending.take() {
            return Some(Err(ChainError::Io(e)));
        }
        let mut word: String = String::new();
        loop {
            match self.bytes.next() {
                Some(Ok(b)) if is_word_byte(b) => word.push(b.to_ascii_lowercase() as char),
                Some(Ok(_)) => {
                    if !word.is_empty() {
                        return Some(Ok(word));
                    }
                }
                Some(Err(e)) => {
                    if word.is_empty() {
                        return Some(Err(ChainError::Io(e)));
                    }
                    self.pending = Some(e);
                    return Some(Ok(word));
                }
                None => {
                    return if word.is_empty() { None } else { Some(Ok(word)) };
                }
            }
        }
    }
}

/// Accepts a query made only of ASCII letters and returns it lowercased.
pub fn validate_query(input: &str) -> Result<String> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ChainError::invalid_query(input));
    }
    Ok(input.to_ascii_lowercase())
}

/// Counts every word into `map`.
pub fn concordance<I>(words: I, map: &mut HashMap<usize>) -> Result<()>
where
    I: IntoIterator<Item = Result<String>>,
{
    for word in words {
        let word: String = word?;
        match map.get_mut(&word) {
            Some(count) => *count += 1,
            None => {
                map.put(&word, 1)?;
            }
        }
    }
    Ok(())
}

/// Inserts every word into `map` with a value of 0.
pub fn load_dictionary<I>(words: I, map: &mut HashMap<usize>) -> Result<()>
where
    I: IntoIterator<Item = Result<String>>,
{
    for word in words {
        map.put(&word?, 0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    /// Hands out its bytes, then fails every read after that.
    struct BrokenReader {
        data: &'static [u8],
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
            }
            let n: usize = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn words(text: &str) -> Vec<String> {
        Words::new(Cursor::new(text.as_bytes()))
            .collect::<Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn test_words() {
        assert_eq!(
            words("It's a dog-eat-dog world, 2 DOGS!\n"),
            vec!["it's", "a", "dog", "eat", "dog", "world", "2", "dogs"]
        );
        assert!(words("").is_empty());
        assert!(words(" ,.;\n\t").is_empty());
        assert_eq!(words("trailing"), vec!["trailing"]);
    }

    #[test]
    fn test_non_ascii_is_a_separator() {
        assert_eq!(words("café au lait"), vec!["caf", "au", "lait"]);
    }

    #[test]
    fn test_streams_are_independent() {
        let mut first = Words::new(Cursor::new("one two".as_bytes()));
        let mut second = Words::new(Cursor::new("three".as_bytes()));
        assert_eq!(first.next().unwrap().unwrap(), "one");
        assert_eq!(second.next().unwrap().unwrap(), "three");
        assert_eq!(first.next().unwrap().unwrap(), "two");
        assert!(first.next().is_none());
        assert!(second.next().is_none());
    }

    #[test]
    fn test_read_error_mid_word_keeps_partial_word() {
        let mut words = Words::new(BufReader::new(BrokenReader { data: b"one tw" }));
        assert_eq!(words.next().unwrap().unwrap(), "one");
        assert_eq!(words.next().unwrap().unwrap(), "tw");
        match words.next() {
            Some(Err(ChainError::Io(e))) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_error_between_words() {
        let mut words = Words::new(BufReader::new(BrokenReader { data: b"one " }));
        assert_eq!(words.next().unwrap().unwrap(), "one");
        assert!(matches!(words.next(), Some(Err(ChainError::Io(_)))));

        let mut map: HashMap<usize> = HashMap::with_capacity(4);
        let counted = concordance(Words::new(BufReader::new(BrokenReader { data: b"a b" })), &mut map);
        assert!(matches!(counted, Err(ChainError::Io(_))));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("Hello").unwrap(), "hello");
        assert!(matches!(validate_query("c4t"), Err(ChainError::InvalidQuery(_))));
        assert!(matches!(validate_query("don't"), Err(ChainError::InvalidQuery(_))));
        assert!(validate_query("").is_err());
    }

    #[test]
    fn test_concordance() {
        let mut map: HashMap<usize> = HashMap::with_capacity(10);
        let text: &str = "the cat and the hat and the bat";
        concordance(Words::new(Cursor::new(text.as_bytes())), &mut map).unwrap();
        assert_eq!(map.size(), 5);
        assert_eq!(map.get("the"), Some(&3));
        assert_eq!(map.get("and"), Some(&2));
        assert_eq!(map.get("bat"), Some(&1));
    }

    #[test]
    fn test_load_dictionary() {
        let mut map: HashMap<usize> = HashMap::with_capacity(2);
        let text: &str = "apple\nbanana\ncherry\napple\n";
        load_dictionary(Words::new(Cursor::new(text.as_bytes())), &mut map).unwrap();
        assert_eq!(map.size(), 3);
        assert!(map.iter().all(|(_, v)| *v == 0));
        assert!(map.capacity() >= 4);
    }
}

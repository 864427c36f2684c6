//! Utility structs and methods
use std::cmp::Ordering::{Equal, Less};

/// Iterator of all one-way pairwise combinations of the inner slice
///
/// Pairs are returned in the order of the slice, the first item of a
/// pair always precedes the second one.
///
/// # Examples
/// ```
/// use phenobench::utils::Combinations;
///
/// let runs = ["run_1", "run_2", "run_3"];
/// let mut c = Combinations::new(&runs);
///
/// assert_eq!(c.next(), Some((&"run_1", &"run_2")));
/// assert_eq!(c.next(), Some((&"run_1", &"run_3")));
/// assert_eq!(c.next(), Some((&"run_2", &"run_3")));
/// assert!(c.next().is_none());
/// ```
pub struct Combinations<'a, T> {
    inner: &'a [T],
    idx1: usize,
    idx2: usize,
}

impl<'a, T> Combinations<'a, T> {
    /// Creates a new Combinations iterator
    pub fn new(inner: &'a [T]) -> Self {
        Self {
            inner,
            idx1: 0,
            idx2: 1,
        }
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = (&'a T, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (
                self.idx1 < self.inner.len(),
                self.idx2.cmp(&self.inner.len()),
            ) {
                (true, Less) => {
                    self.idx2 += 1;
                    return Some((&self.inner[self.idx1], &self.inner[self.idx2 - 1]));
                }
                (true, Equal) => {
                    self.idx1 += 1;
                    self.idx2 = self.idx1 + 1;
                }
                _ => return None,
            }
        }
    }
}

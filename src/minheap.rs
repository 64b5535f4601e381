use std::{cmp::Reverse, collections::BinaryHeap};

use crate::error::{Error, Result};

/// A binary min heap over `Ord` items, backed by the standard library's max heap.
/// - Peek: O(1)
/// - Push / pop: O(log(n))
/// - Building from an iterator: O(n)
/// Items that compare equal come out in an unspecified order.
#[derive(Clone, Debug)]
pub struct MinHeap<T: Ord> {
    buf: BinaryHeap<Reverse<T>>
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self{buf: BinaryHeap::new()}
    }

    /// Get the number of elements in the heap
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.buf.push(Reverse(item))
    }

    /// Remove and return the minimal element, or `Error::EmptyContainer` if there is none
    pub fn pop(&mut self) -> Result<T> {
        self.buf.pop().map(|Reverse(item)|item).ok_or(Error::EmptyContainer)
    }

    /// Get the minimal element without removing it, or `Error::EmptyContainer` if there is none
    pub fn peek(&self) -> Result<&T> {
        self.buf.peek().map(|Reverse(item)|item).ok_or(Error::EmptyContainer)
    }

    /// Consume the heap, returning its elements in increasing order
    pub fn into_sorted_vec(self) -> Vec<T> {
        // BinaryHeap sorts ascending by Reverse<T>, which is descending by T
        let mut res: Vec<T> = self.buf.into_sorted_vec().into_iter().map(|Reverse(item)|item).collect();
        res.reverse();
        res
    }
}

impl<T: Ord> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for MinHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self{buf: iter.into_iter().map(Reverse).collect()}
    }
}

impl<T: Ord> Extend<T> for MinHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.buf.extend(iter.into_iter().map(Reverse))
    }
}

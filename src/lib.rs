pub mod error;
pub mod fheap;
pub mod hashtable;
pub mod minheap;

use std::cmp::Ordering;

use num_traits::float::TotalOrder;

pub use error::{Error, Result};
pub use fheap::{FibHeap, Handle};
pub use hashtable::HashTable;
pub use minheap::MinHeap;



/// A total order on keys, fixed when a heap is constructed.
/// Implementations must be consistent (transitive, antisymmetric) for the heap's invariants to hold.
pub trait KeyOrder<K: ?Sized> {
    fn cmp(&self, a: &K, b: &K) -> Ordering;
}

/// Order keys by their `Ord` impl
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

/// Order floats by the IEEE 754 totalOrder predicate, so NaNs and signed zeros
/// have a fixed place instead of making comparisons fail
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatTotal;

/// Order keys with an arbitrary comparison function, eg `OrderBy(|a, b| b.cmp(a))` for a max heap
#[derive(Clone, Copy, Debug)]
pub struct OrderBy<F>(pub F);



impl<K: Ord + ?Sized> KeyOrder<K> for Natural {
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: TotalOrder> KeyOrder<K> for FloatTotal {
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.total_cmp(b)
    }
}

impl<K: ?Sized, F: Fn(&K, &K) -> Ordering> KeyOrder<K> for OrderBy<F> {
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

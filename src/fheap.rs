use std::{cmp::Ordering, collections::HashMap, fmt, sync::atomic::{AtomicU64, Ordering as AtomicOrdering}};

use log::{debug, trace};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::{error::{Error, Result}, KeyOrder, Natural};

new_key_type! {
	struct NodeKey;
}

/// Source of `FibHeap` ids, so handles from one heap never resolve in another
static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(0);

/// Generation checked reference to an element of a `FibHeap`, returned by `FibHeap::insert`.
/// Once the element is removed (by `FibHeap::extract_min` or `FibHeap::delete`) the handle
/// goes stale and every operation taking it reports `Error::StaleHandle` / `None`,
/// even if the arena slot has since been reused.
/// A handle also records which heap issued it, so passing it to any other heap
/// (including the heap that absorbed its own in `FibHeap::merge`) is reported the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
	key: NodeKey,
	heap: u64
}

#[derive(Debug)]
struct Node<K, V> {
	key: K,
	value: V,
	prev: NodeKey,
	next: NodeKey,
	first_child: Option<NodeKey>,
	parent: Option<NodeKey>,
	marked: bool,
	degree: usize
}

/// Iterates over one circular sibling ring starting at `start`.
/// The ring must not be modified while iterating, so callers that restructure
/// the forest collect the handles first.
struct SiblingIter<'a, K, V> {
	nodes: &'a SlotMap<NodeKey, Node<K, V>>,
	start: Option<NodeKey>,
	iter: NodeKey
}

impl<'a, K, V> Iterator for SiblingIter<'a, K, V> {
	type Item = NodeKey;
	fn next(&mut self) -> Option<Self::Item> {
		let start = self.start?;
		let res = self.iter;
		self.iter = self.nodes[res].next;
		if self.iter == start { self.start = None }
		Some(res)
	}
}

#[cfg(test)]
#[derive(Debug, PartialEq, Eq)]
enum FibHeapError {
	BrokenPrevLink(NodeKey),
	LessThanParent(NodeKey),
	BrokenParentLink(NodeKey),
	WrongDegree(NodeKey),
	TooSmall(NodeKey),
	MarkedRoot(NodeKey),
	WrongMin,
	WrongCount
}

/// A Fibonacci heap: a forest of heap ordered trees whose roots form a circular list.
/// - Insert: O(1)
/// - Find min: O(1)
/// - Decrease key: amortized O(1)
/// - Extract min / delete: amortized O(log(n))
/// - Merge: O(1) plus the cost of moving the other heap's nodes into this heap's arena
///
/// All nodes live in a single arena owned by the heap and refer to each other by arena key,
/// so the circular sibling lists and parent links are plain index rewrites.
/// Keys are compared with the `KeyOrder` the heap was constructed with.
///
/// The heap does no locking; a host sharing it between threads has to serialize access itself.
pub struct FibHeap<K, V, O = Natural> {
	nodes: SlotMap<NodeKey, Node<K, V>>,
	min_root: Option<NodeKey>,
	order: O,
	id: u64
}

impl<K: Ord, V> FibHeap<K, V, Natural> {
	/// Create an empty heap ordered by `K`'s `Ord` impl
	pub fn new() -> Self {
		Self::with_order(Natural)
	}
}

impl<K: Ord, V> Default for FibHeap<K, V, Natural> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V, O: KeyOrder<K>> FibHeap<K, V, O> {
	/// Create an empty heap that compares keys with `order`
	pub fn with_order(order: O) -> Self {
		Self{nodes: SlotMap::with_key(), min_root: None, order, id: NEXT_HEAP_ID.fetch_add(1, AtomicOrdering::Relaxed)}
	}

	/// Resolve a handle to its arena key if this heap issued it and the element is still here
	fn resolve(&self, ent: Handle) -> Option<NodeKey> {
		(ent.heap == self.id && self.nodes.contains_key(ent.key)).then_some(ent.key)
	}

	fn handle(&self, key: NodeKey) -> Handle {
		Handle{key, heap: self.id}
	}

	/// Get the number of elements in the heap
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.min_root.is_none()
	}

	/// Get the minimal key and its value without removing them.
	/// Fails with `Error::EmptyContainer` if there are no elements.
	pub fn find_min(&self) -> Result<(&K, &V)> {
		let node = &self.nodes[self.min_root.ok_or(Error::EmptyContainer)?];
		Ok((&node.key, &node.value))
	}

	/// Get the key and value of an element by handle, or None if the handle is stale
	pub fn get(&self, ent: Handle) -> Option<(&K, &V)> {
		self.nodes.get(self.resolve(ent)?).map(|node|(&node.key, &node.value))
	}

	/// Get a mutable reference to the value of an element by handle, or None if the handle is stale.
	/// Only the value is exposed since changing the key in place could break heap order;
	/// use `FibHeap::decrease_key` for that.
	pub fn get_value_mut(&mut self, ent: Handle) -> Option<&mut V> {
		let key = self.resolve(ent)?;
		self.nodes.get_mut(key).map(|node|&mut node.value)
	}

	/// Return true if the element behind `ent` is still in the heap
	pub fn contains(&self, ent: Handle) -> bool {
		self.resolve(ent).is_some()
	}

	/// Iterate over all keys and values.  The order is arbitrary.
	pub fn iter(&self) -> impl Iterator<Item=(&K, &V)> + '_ {
		self.nodes.values().map(|node|(&node.key, &node.value))
	}

	/// Insert an element, returning the handle needed to later call
	/// `FibHeap::decrease_key` or `FibHeap::delete` on it
	pub fn insert(&mut self, key: K, value: V) -> Handle {
		let ent = self.nodes.insert_with_key(|ent|Node{
			key, value, prev: ent, next: ent, first_child: None, parent: None, marked: false, degree: 0
		});
		self.add_root(ent);
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		self.handle(ent)
	}

	/// Remove the minimal element and return its key and value.
	/// Fails with `Error::EmptyContainer` if there are no elements.
	pub fn extract_min(&mut self) -> Result<(K, V)> {
		let min_root = self.min_root.ok_or(Error::EmptyContainer)?;
		if let Some(first_child) = self.nodes[min_root].first_child.take() {
			self.nodes[min_root].degree = 0;
			let children: Vec<_> = self.siblings(first_child).collect();
			for child in children {
				let links = &mut self.nodes[child];
				links.parent = None;
				links.marked = false;
			}
			self.concat(min_root, first_child);
		}
		let other_roots = self.unlink(min_root);
		let Some(Node{key, value, ..}) = self.nodes.remove(min_root) else {
			unreachable!("the min root is always a live node")
		};
		self.min_root = other_roots;
		if let Some(root) = other_roots {
			self.consolidate(root);
		}
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		Ok((key, value))
	}

	/// Lower the key of an element.
	/// Fails with `Error::StaleHandle` if the element was already removed, or
	/// `Error::InvalidKeyOrdering` if `new_key` is greater than the current key.
	/// In both cases the heap is left untouched.
	pub fn decrease_key(&mut self, ent: Handle, new_key: K) -> Result<()> {
		let ent = self.resolve(ent).ok_or(Error::StaleHandle)?;
		let node = &mut self.nodes[ent];
		if self.order.cmp(&new_key, &node.key) == Ordering::Greater {
			return Err(Error::InvalidKeyOrdering)
		}
		node.key = new_key;
		if let Some(parent) = node.parent {
			if self.less(ent, parent) {
				self.cut(ent, parent);
				self.cascading_cut(parent);
			}
		}
		if self.nodes[ent].parent.is_none() && self.min_root.is_some_and(|m|self.less(ent, m)) {
			self.min_root = Some(ent);
		}
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		Ok(())
	}

	/// Remove an arbitrary element by handle and return its key and value.
	/// This behaves like decreasing the key to negative infinity and then extracting the min,
	/// but doesn't require the key type to have such a value.
	/// Fails with `Error::StaleHandle` if the element was already removed.
	pub fn delete(&mut self, ent: Handle) -> Result<(K, V)> {
		let ent = self.resolve(ent).ok_or(Error::StaleHandle)?;
		let parent = self.nodes[ent].parent;
		if let Some(parent) = parent {
			self.cut(ent, parent);
			self.cascading_cut(parent);
		}
		self.min_root = Some(ent);
		self.extract_min()
	}

	/// Move every element of `other` into this heap.
	/// Trees are moved as they are and the root lists are concatenated, so no consolidation happens here.
	/// Handles issued by `other` go stale; the returned map translates them
	/// to the handles of the same elements in `self`.
	/// `other` is assumed to use an ordering consistent with this heap's.
	pub fn merge(&mut self, mut other: Self) -> HashMap<Handle, Handle> {
		let mut moved = SecondaryMap::with_capacity(other.len());
		let Some(other_min) = other.min_root else { return HashMap::new() };
		for (old, node) in other.nodes.drain() {
			moved.insert(old, self.nodes.insert(node));
		}
		for (_, &ent) in &moved {
			let links = &mut self.nodes[ent];
			links.prev = moved[links.prev];
			links.next = moved[links.next];
			links.parent = links.parent.map(|p|moved[p]);
			links.first_child = links.first_child.map(|c|moved[c]);
		}
		debug!("merged {} nodes into a heap of {}", moved.len(), self.len() - moved.len());
		let other_min = moved[other_min];
		match self.min_root {
			None => self.min_root = Some(other_min),
			Some(min_root) => {
				self.concat(min_root, other_min);
				if self.less(other_min, min_root) {
					self.min_root = Some(other_min)
				}
			}
		}
		#[cfg(test)]{
			assert_eq!(self.check(), Ok(()))
		}
		moved.into_iter().map(|(old, new)|(other.handle(old), self.handle(new))).collect()
	}

	fn less(&self, a: NodeKey, b: NodeKey) -> bool {
		self.order.cmp(&self.nodes[a].key, &self.nodes[b].key) == Ordering::Less
	}

	fn siblings(&self, start: NodeKey) -> SiblingIter<'_, K, V> {
		SiblingIter{nodes: &self.nodes, start: Some(start), iter: start}
	}

	/// Splice two circular lists together so `b`'s list follows `a`
	fn concat(&mut self, a: NodeKey, b: NodeKey) {
		let a_next = self.nodes[a].next;
		let b_prev = self.nodes[b].prev;
		self.nodes[a].next = b;
		self.nodes[b].prev = a;
		self.nodes[b_prev].next = a_next;
		self.nodes[a_next].prev = b_prev;
	}

	/// Take `ent` out of its sibling list, leaving it as a list of one.
	/// Returns some other member of the list it left, or None if it was alone.
	fn unlink(&mut self, ent: NodeKey) -> Option<NodeKey> {
		let (prev, next) = (self.nodes[ent].prev, self.nodes[ent].next);
		if next == ent {
			return None
		}
		self.nodes[prev].next = next;
		self.nodes[next].prev = prev;
		let links = &mut self.nodes[ent];
		links.prev = ent;
		links.next = ent;
		Some(next)
	}

	fn add_root(&mut self, ent: NodeKey) {
		match self.min_root {
			None => self.min_root = Some(ent),
			Some(min_root) => {
				self.concat(min_root, ent);
				if self.less(ent, min_root) {
					self.min_root = Some(ent)
				}
			}
		}
	}

	/// Make the root with the larger key a child of the other.  Both must be lone roots
	/// (not linked to any siblings).  On ties `ent` stays on top.
	fn link(&mut self, ent: NodeKey, other: NodeKey) -> NodeKey {
		let (res, child) = if self.less(other, ent) { (other, ent) } else { (ent, other) };
		let links = &mut self.nodes[child];
		links.parent = Some(res);
		links.marked = false;
		match self.nodes[res].first_child {
			None => self.nodes[res].first_child = Some(child),
			Some(first_child) => self.concat(first_child, child)
		}
		self.nodes[res].degree += 1;
		res
	}

	/// Merge roots of equal degree until all root degrees are distinct, then rebuild the root list
	fn consolidate(&mut self, start: NodeKey) {
		// A node of degree d has at least F(d+2) >= phi^d descendants, so degrees are bounded by log_phi(n)
		let max_degree = ((((self.len() as f64) + 1.0).log2())*1.4404200904125567).ceil() as usize;
		let mut roots: Vec<Option<NodeKey>> = vec![None; max_degree + 1];
		let snapshot: Vec<_> = self.siblings(start).collect();
		let root_count = snapshot.len();
		for mut root in snapshot {
			let links = &mut self.nodes[root];
			links.prev = root;
			links.next = root;
			loop {
				let degree = self.nodes[root].degree;
				if degree >= roots.len() {
					roots.resize(degree + 1, None);
				}
				match roots[degree].take() {
					None => {
						roots[degree] = Some(root);
						break
					},
					Some(other) => root = self.link(root, other)
				}
			}
		}
		self.min_root = None;
		let mut trees = 0;
		for root in roots.into_iter().flatten() {
			self.add_root(root);
			trees += 1;
		}
		trace!("consolidated {} roots into {} trees", root_count, trees);
	}

	/// Move `ent` out of `parent`'s child list and into the root list
	fn cut(&mut self, ent: NodeKey, parent: NodeKey) {
		let next = self.unlink(ent);
		let parent_links = &mut self.nodes[parent];
		if parent_links.first_child == Some(ent) {
			parent_links.first_child = next;
		}
		parent_links.degree -= 1;
		let links = &mut self.nodes[ent];
		links.parent = None;
		links.marked = false;
		self.add_root(ent);
	}

	/// Walk up from a node that just lost a child, marking the first unmarked
	/// non-root ancestor and cutting every marked one on the way
	fn cascading_cut(&mut self, mut ent: NodeKey) {
		let mut cuts = 0;
		while let Some(parent) = self.nodes[ent].parent {
			let links = &mut self.nodes[ent];
			if !links.marked {
				links.marked = true;
				break
			}
			self.cut(ent, parent);
			cuts += 1;
			ent = parent;
		}
		if cuts != 0 {
			trace!("cascading cut moved {} marked nodes to the root list", cuts);
		}
	}

	/// Checks every structural invariant, returning the first violation found.
	/// Recurses once per tree level, which is at most log_phi(n) deep.
	#[cfg(test)]
	fn check(&self) -> Result<(), FibHeapError> {
		if self.nodes.is_empty() != self.min_root.is_none() {
			return Err(FibHeapError::WrongCount)
		}
		#[cfg(feature = "stress_tests")]{
			return Ok(())
		}
		let Some(min_root) = self.min_root else { return Ok(()) };
		if !self.nodes.contains_key(min_root) || self.nodes[min_root].parent.is_some() {
			return Err(FibHeapError::WrongMin)
		}
		let mut count = 0;
		for root in self.check_ring(min_root, None)? {
			if self.less(root, min_root) {
				return Err(FibHeapError::WrongMin)
			} else if self.nodes[root].marked {
				return Err(FibHeapError::MarkedRoot(root))
			}
			count += self.check_tree(root)?;
		}
		if count != self.nodes.len() {
			Err(FibHeapError::WrongCount)
		} else { Ok(()) }
	}

	/// Verify the prev links and parent links of one sibling ring and return its members
	#[cfg(test)]
	fn check_ring(&self, start: NodeKey, parent: Option<NodeKey>) -> Result<Vec<NodeKey>, FibHeapError> {
		let ring: Vec<_> = self.siblings(start).take(self.nodes.len() + 1).collect();
		if ring.len() > self.nodes.len() {
			return Err(FibHeapError::WrongCount)
		}
		for (i, &ent) in ring.iter().enumerate() {
			let prev = ring[(i + ring.len() - 1)%ring.len()];
			if self.nodes[ent].prev != prev {
				return Err(FibHeapError::BrokenPrevLink(ent))
			} else if self.nodes[ent].parent != parent {
				return Err(FibHeapError::BrokenParentLink(ent))
			}
		}
		Ok(ring)
	}

	/// Returns the size of the subtree rooted at `ent`
	#[cfg(test)]
	fn check_tree(&self, ent: NodeKey) -> Result<usize, FibHeapError> {
		let node = &self.nodes[ent];
		let children = match node.first_child {
			Some(first_child) => self.check_ring(first_child, Some(ent))?,
			None => Vec::new()
		};
		if children.len() != node.degree {
			return Err(FibHeapError::WrongDegree(ent))
		}
		let mut count = 1;
		let (mut fib_d1, mut fib_d2) = (1, 1);
		for child in children {
			(fib_d1, fib_d2) = (fib_d2, fib_d1 + fib_d2);
			if self.less(child, ent) {
				return Err(FibHeapError::LessThanParent(child))
			}
			count += self.check_tree(child)?;
		}
		if count < fib_d2 {
			Err(FibHeapError::TooSmall(ent))
		} else { Ok(count) }
	}
}

impl<K, V, O: KeyOrder<K>> Extend<(K, V)> for FibHeap<K, V, O> {
	fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<K: Ord, V> FromIterator<(K, V)> for FibHeap<K, V, Natural> {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut res = Self::new();
		res.extend(iter);
		res
	}
}

impl<K: fmt::Debug, V: fmt::Debug, O> fmt::Debug for FibHeap<K, V, O> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let min = self.min_root.map(|m|(&self.nodes[m].key, &self.nodes[m].value));
		f.debug_struct("FibHeap").field("len", &self.nodes.len()).field("min", &min).finish()
	}
}

//! An ordered item tree implemented as an AVL tree over an index arena.

use std::cmp::{self, Ordering};
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::error::{Error, Result};
use crate::iter::{Iter, Order};

/// Extracts the ordering key out of a stored item.
///
/// The key type's `Ord` defines the total order of the tree.
pub trait KeyOf<T> {
    type Key: Ord;

    fn key(item: &T) -> &Self::Key;
}

/// Key extraction for items that are their own key.
pub struct SelfKey;

impl<T: Ord> KeyOf<T> for SelfKey {
    type Key = T;

    fn key(item: &T) -> &T {
        item
    }
}

/// An ordered tree of items with unique keys, implemented as an AVL tree
/// whose nodes live in an index arena.
///
/// ```
/// use avltree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(1)?;
/// tree.insert(2)?;
/// tree.insert(3)?;
/// assert_eq!(tree.get(&2), Some(&2));
/// tree.remove(&2)?;
/// assert!(tree.get(&2).is_none());
/// # Ok::<(), avltree::Error>(())
/// ```
pub struct AvlTree<T, S = SelfKey>
where
    S: KeyOf<T>,
{
    slots: Vec<Slot<T>>,
    root: Option<NodeId>,
    free: Option<NodeId>,
    len: usize,
    selector: PhantomData<S>,
}

/// Index of a node slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<NodeId> },
}

#[derive(Clone)]
struct Node<T> {
    item: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: usize,
}

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree whose items are their own keys.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, S> AvlTree<T, S>
where
    S: KeyOf<T>,
{
    /// Returns true if the tree contains no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of items in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree.
    /// An empty tree has height zero, a single node height one.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Clears the tree, dropping all items.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.root = None;
        self.free = None;
        self.len = 0;
    }

    /// Returns a reference to the item with the given key.
    pub fn get(&self, key: &S::Key) -> Option<&T> {
        self.find(key).map(|id| self.item(id))
    }

    /// Returns true if an item with the given key is in the tree.
    pub fn contains(&self, key: &S::Key) -> bool {
        self.find(key).is_some()
    }

    /// Gets an iterator over the items of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter::new(self, Order::In)
    }

    /// Gets an iterator visiting each node before both of its subtrees.
    pub fn iter_preorder(&self) -> Iter<'_, T, S> {
        Iter::new(self, Order::Pre)
    }

    /// Gets an iterator visiting each node after both of its subtrees.
    pub fn iter_postorder(&self) -> Iter<'_, T, S> {
        Iter::new(self, Order::Post)
    }

    /// Inserts an item into the tree.
    /// Fails with [`Error::KeyExists`] if an item with an equal key is
    /// already present; the tree is left untouched then.
    pub fn insert(&mut self, item: T) -> Result<()> {
        self.insert_id(item)?;
        Ok(())
    }

    /// Removes the item with the given key from the tree and returns it.
    /// Fails with [`Error::EmptyTree`] on an empty tree and with
    /// [`Error::NodeNotFound`] if no item carries the key.
    pub fn remove(&mut self, key: &S::Key) -> Result<T> {
        if self.root.is_none() {
            return Err(Error::EmptyTree);
        }
        let id = self.find(key).ok_or(Error::NodeNotFound)?;
        debug_assert!(self.len >= 1);
        self.unlink_node(id)?;
        let item = self.dealloc(id);
        self.len -= 1;
        debug_assert!(!self.contains(key));
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        Ok(item)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        if let Some(root) = self.root {
            assert!(self.node(root).parent.is_none());
        }

        // Check tree nodes
        let mut num_nodes = 0;
        let mut current = self.first_preorder();
        while let Some(id) = current {
            let node = self.node(id);
            let mut height = 1;
            let mut left_height = 0;
            let mut right_height = 0;

            // Check link to left child node
            if let Some(left) = node.left {
                assert!(self.node(left).parent == Some(id));
                assert!(S::key(&self.node(left).item) < S::key(&node.item));
                left_height = self.node(left).height;
                height = cmp::max(height, left_height + 1);
            }

            // Check link to right child node
            if let Some(right) = node.right {
                assert!(self.node(right).parent == Some(id));
                assert!(S::key(&self.node(right).item) > S::key(&node.item));
                right_height = self.node(right).height;
                height = cmp::max(height, right_height + 1);
            }

            // Check height
            assert_eq!(node.height, height);

            // Check AVL condition (near balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            num_nodes += 1;
            current = self.next_preorder(id);
        }

        // Check number of nodes
        assert_eq!(num_nodes, self.len);

        // Check that the free list covers exactly the vacant slots
        let num_vacant = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Vacant { .. }))
            .count();
        assert_eq!(num_nodes + num_vacant, self.slots.len());
        let mut num_free = 0;
        let mut free = self.free;
        while let Some(id) = free {
            free = match self.slots[id.index()] {
                Slot::Vacant { next_free } => next_free,
                Slot::Occupied(_) => panic!("free list points at an occupied slot"),
            };
            num_free += 1;
            assert!(num_free <= num_vacant);
        }
        assert_eq!(num_free, num_vacant);
    }

    // Inserts an item and exposes the new node id for the map layer.
    pub(crate) fn insert_id(&mut self, item: T) -> Result<NodeId> {
        let id = match self.search(S::key(&item)).last() {
            None => {
                let id = self.alloc(item, None);
                self.root = Some(id);
                id
            }
            Some(&(_, Ordering::Equal)) => return Err(Error::KeyExists),
            Some(&(parent, _)) => {
                let id = self.alloc(item, Some(parent));
                self.attach(parent, id)?;
                self.update_and_rebalance(Some(parent))?;
                id
            }
        };
        self.len += 1;
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
        Ok(id)
    }

    pub(crate) fn find(&self, key: &S::Key) -> Option<NodeId> {
        match self.search(key).last() {
            Some(&(id, Ordering::Equal)) => Some(id),
            _ => None,
        }
    }

    pub(crate) fn item(&self, id: NodeId) -> &T {
        &self.node(id).item
    }

    pub(crate) fn item_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).item
    }

    // Calls the closure on every item, visiting each node after both of
    // its subtrees.
    // Kept crate private: mutating an item must not change its key.
    pub(crate) fn for_each_mut_postorder<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let mut current = self.first_postorder();
        while let Some(id) = current {
            let next = self.next_postorder(id);
            f(&mut self.node_mut(id).item);
            current = next;
        }
    }

    // Walks from the root towards the given key.
    // Records every visited node together with the branch direction taken
    // at it; a final `Equal` entry marks an exact match.
    fn search(&self, key: &S::Key) -> Vec<(NodeId, Ordering)> {
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(id) = current {
            let ordering = key.cmp(S::key(self.item(id)));
            path.push((id, ordering));
            current = match ordering {
                Ordering::Equal => break,
                Ordering::Less => self.node(id).left,
                Ordering::Greater => self.node(id).right,
            };
        }
        path
    }

    // Links a freshly created node below its parent on the side given by
    // key order.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        match S::key(self.item(child)).cmp(S::key(self.item(parent))) {
            Ordering::Equal => Err(Error::KeysMatch),
            Ordering::Less => {
                self.node_mut(parent).left = Some(child);
                Ok(())
            }
            Ordering::Greater => {
                self.node_mut(parent).right = Some(child);
                Ok(())
            }
        }
    }

    fn unlink_node(&mut self, id: NodeId) -> Result<()> {
        if let Some(mut succ) = self.node(id).right {
            // Find the smallest node in the right subtree
            let mut succ_parent = id;
            while let Some(left) = self.node(succ).left {
                succ_parent = succ;
                succ = left;
            }

            // The successor has no left child, splice it out of the tree
            debug_assert!(self.node(succ).left.is_none());
            let spliced = self.node(succ).right;
            if self.node(succ_parent).left == Some(succ) {
                self.node_mut(succ_parent).left = spliced;
            } else {
                self.node_mut(succ_parent).right = spliced;
            }
            if let Some(spliced) = spliced {
                self.node_mut(spliced).parent = Some(succ_parent);
            }

            // The successor takes over position, links and height of the
            // node to unlink (up to six links)
            let node = self.node(id);
            let (parent, left, right, height) = (node.parent, node.left, node.right, node.height);
            self.node_mut(succ).left = left;
            if let Some(left) = left {
                self.node_mut(left).parent = Some(succ);
            }
            self.node_mut(succ).right = right;
            if let Some(right) = right {
                self.node_mut(right).parent = Some(succ);
            }
            self.node_mut(succ).parent = parent;
            self.node_mut(succ).height = height;
            match parent {
                None => self.root = Some(succ),
                Some(parent) => {
                    if self.node(parent).left == Some(id) {
                        self.node_mut(parent).left = Some(succ);
                    } else {
                        self.node_mut(parent).right = Some(succ);
                    }
                }
            }

            // The splice point may be out of balance now
            let start = if succ_parent == id { succ } else { succ_parent };
            self.update_and_rebalance(Some(start))
        } else {
            // Node to unlink is stem or leaf, its left child moves up
            debug_assert!(self.node(id).right.is_none());
            let left = self.node(id).left;
            let parent = self.node(id).parent;
            if let Some(left) = left {
                self.node_mut(left).parent = parent;
            }
            match parent {
                None => self.root = left,
                Some(parent) => {
                    if self.node(parent).left == Some(id) {
                        self.node_mut(parent).left = left;
                    } else {
                        self.node_mut(parent).right = left;
                    }
                }
            }

            // The parent may be out of balance now
            self.update_and_rebalance(parent)
        }
    }

    // Walks from the given position towards the root, restoring balance
    // and stored heights.
    // Stops as soon as a subtree kept its previous height; the heights
    // above it cannot have changed then.
    // After an insertion a rotation restores the previous subtree height,
    // so the walk ends there; after a removal it continues as long as
    // subtrees keep shrinking.
    fn update_and_rebalance(&mut self, start_from: Option<NodeId>) -> Result<()> {
        let mut current = start_from;
        while let Some(id) = current {
            let parent = self.node(id).parent;
            let old_height = self.node(id).height;
            let subtree = self.rebalance_node(id)?;
            if self.node(subtree).height == old_height {
                break;
            }
            current = parent;
        }
        Ok(())
    }

    // Restores the AVL condition at the given node if necessary and
    // adjusts its height.
    // The incoming imbalance never exceeds one extra level, so a single
    // or double rotation is enough.
    // Returns the node that roots the subtree afterwards.
    fn rebalance_node(&mut self, id: NodeId) -> Result<NodeId> {
        let left_height = self.height_of(self.node(id).left);
        let right_height = self.height_of(self.node(id).right);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        if left_height > right_height + 1 {
            // Rebalance right
            let left = self.node(id).left.ok_or(Error::NullNode)?;
            if self.height_of(self.node(left).right) > self.height_of(self.node(left).left) {
                self.rotate_left(left)?;
            }
            self.rotate_right(id)
        } else if right_height > left_height + 1 {
            // Rebalance left
            let right = self.node(id).right.ok_or(Error::NullNode)?;
            if self.height_of(self.node(right).left) > self.height_of(self.node(right).right) {
                self.rotate_right(right)?;
            }
            self.rotate_left(id)
        } else {
            self.adjust_height(id);
            Ok(id)
        }
    }

    // Left rotation around the given node.
    // The right child becomes the subtree root and is returned.
    fn rotate_left(&mut self, id: NodeId) -> Result<NodeId> {
        let pivot = self.node(id).right.ok_or(Error::NullNode)?;
        let parent = self.node(id).parent;

        let inner = self.node(pivot).left;
        self.node_mut(id).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(id);
        }

        self.node_mut(pivot).parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(parent) => {
                if self.node(parent).left == Some(id) {
                    self.node_mut(parent).left = Some(pivot);
                } else {
                    self.node_mut(parent).right = Some(pivot);
                }
            }
        }

        self.node_mut(pivot).left = Some(id);
        self.node_mut(id).parent = Some(pivot);

        self.adjust_height(id);
        self.adjust_height(pivot);
        Ok(pivot)
    }

    // Right rotation around the given node.
    // The left child becomes the subtree root and is returned.
    fn rotate_right(&mut self, id: NodeId) -> Result<NodeId> {
        let pivot = self.node(id).left.ok_or(Error::NullNode)?;
        let parent = self.node(id).parent;

        let inner = self.node(pivot).right;
        self.node_mut(id).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(id);
        }

        self.node_mut(pivot).parent = parent;
        match parent {
            None => self.root = Some(pivot),
            Some(parent) => {
                if self.node(parent).left == Some(id) {
                    self.node_mut(parent).left = Some(pivot);
                } else {
                    self.node_mut(parent).right = Some(pivot);
                }
            }
        }

        self.node_mut(pivot).right = Some(id);
        self.node_mut(id).parent = Some(pivot);

        self.adjust_height(id);
        self.adjust_height(pivot);
        Ok(pivot)
    }

    fn adjust_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + cmp::max(self.height_of(node.left), self.height_of(node.right));
        self.node_mut(id).height = height;
    }

    fn height_of(&self, link: Option<NodeId>) -> usize {
        match link {
            None => 0,
            Some(id) => self.node(id).height,
        }
    }

    pub(crate) fn first_inorder(&self) -> Option<NodeId> {
        let mut current = self.root?;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        Some(current)
    }

    pub(crate) fn next_inorder(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            let mut current = right;
            while let Some(left) = self.node(current).left {
                current = left;
            }
            return Some(current);
        }

        // Climb until arriving from a left child
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    pub(crate) fn first_preorder(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn next_preorder(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if node.left.is_some() {
            return node.left;
        }
        if node.right.is_some() {
            return node.right;
        }

        // Climb until an unvisited right subtree remains
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).left == Some(current) {
                if let Some(right) = self.node(parent).right {
                    return Some(right);
                }
            }
            current = parent;
        }
        None
    }

    pub(crate) fn first_postorder(&self) -> Option<NodeId> {
        self.root.map(|root| self.postorder_start(root))
    }

    pub(crate) fn next_postorder(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        if self.node(parent).left == Some(id) {
            if let Some(right) = self.node(parent).right {
                return Some(self.postorder_start(right));
            }
        }
        Some(parent)
    }

    // Descends to the first node of a post order walk of the subtree:
    // follow left links, else right links, down to a leaf.
    fn postorder_start(&self, subtree: NodeId) -> NodeId {
        let mut current = subtree;
        loop {
            while let Some(left) = self.node(current).left {
                current = left;
            }
            match self.node(current).right {
                Some(right) => current = right,
                None => return current,
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("node link points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("node link points at a vacant slot"),
        }
    }

    // Places a node into a vacant slot or grows the arena.
    fn alloc(&mut self, item: T, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            item,
            parent,
            left: None,
            right: None,
            height: 1,
        };
        match self.free {
            Some(id) => {
                self.free = match self.slots[id.index()] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.slots[id.index()] = Slot::Occupied(node);
                id
            }
            None => {
                assert!(self.slots.len() < u32::MAX as usize, "node arena is full");
                let id = NodeId(self.slots.len() as u32);
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    // Takes the item out of a slot and threads the slot onto the free list.
    fn dealloc(&mut self, id: NodeId) -> T {
        let slot = mem::replace(
            &mut self.slots[id.index()],
            Slot::Vacant { next_free: self.free },
        );
        self.free = Some(id);
        match slot {
            Slot::Occupied(node) => node.item,
            Slot::Vacant { .. } => unreachable!("node to remove was already vacant"),
        }
    }
}

impl<T, S> Default for AvlTree<T, S>
where
    S: KeyOf<T>,
{
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            root: None,
            free: None,
            len: 0,
            selector: PhantomData,
        }
    }
}

impl<T, S> Clone for AvlTree<T, S>
where
    T: Clone,
    S: KeyOf<T>,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            root: self.root,
            free: self.free,
            len: self.len,
            selector: PhantomData,
        }
    }
}

impl<T, S> fmt::Debug for AvlTree<T, S>
where
    T: fmt::Debug,
    S: KeyOf<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> FromIterator<T> for AvlTree<T, S>
where
    S: KeyOf<T>,
{
    /// Builds a tree by inserting the items in iteration order.
    /// When keys repeat, the first occurrence stays in the tree.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        for item in iter {
            let _ = tree.insert(item);
        }
        tree
    }
}

impl<T, S, const N: usize> From<[T; N]> for AvlTree<T, S>
where
    S: KeyOf<T>,
{
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T, S> IntoIterator for &'a AvlTree<T, S>
where
    S: KeyOf<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

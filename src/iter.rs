//! Lazy iteration over the nodes of a tree.

use std::iter::FusedIterator;

use crate::tree::{AvlTree, KeyOf, NodeId};

/// The order in which an iterator visits the nodes of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    In,
    Pre,
    Post,
}

impl Order {
    fn first<T, S>(self, tree: &AvlTree<T, S>) -> Option<NodeId>
    where
        S: KeyOf<T>,
    {
        match self {
            Order::In => tree.first_inorder(),
            Order::Pre => tree.first_preorder(),
            Order::Post => tree.first_postorder(),
        }
    }

    fn next<T, S>(self, tree: &AvlTree<T, S>, id: NodeId) -> Option<NodeId>
    where
        S: KeyOf<T>,
    {
        match self {
            Order::In => tree.next_inorder(id),
            Order::Pre => tree.next_preorder(id),
            Order::Post => tree.next_postorder(id),
        }
    }
}

/// An iterator over the items of a tree in one of the traversal orders.
pub struct Iter<'a, T, S>
where
    S: KeyOf<T>,
{
    tree: &'a AvlTree<T, S>,
    current: Option<NodeId>,
    order: Order,
    remaining: usize,
}

impl<'a, T, S> Iter<'a, T, S>
where
    S: KeyOf<T>,
{
    pub(crate) fn new(tree: &'a AvlTree<T, S>, order: Order) -> Self {
        Self {
            tree,
            current: order.first(tree),
            order,
            remaining: tree.len(),
        }
    }
}

impl<'a, T, S> Iterator for Iter<'a, T, S>
where
    S: KeyOf<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.order.next(self.tree, id);
        self.remaining -= 1;
        Some(self.tree.item(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, S> ExactSizeIterator for Iter<'_, T, S> where S: KeyOf<T> {}

impl<T, S> FusedIterator for Iter<'_, T, S> where S: KeyOf<T> {}

impl<T, S> Clone for Iter<'_, T, S>
where
    S: KeyOf<T>,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            current: self.current,
            order: self.order,
            remaining: self.remaining,
        }
    }
}

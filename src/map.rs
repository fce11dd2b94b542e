//! An ordered map implemented with an AVL tree.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::iter;
use crate::tree::{AvlTree, KeyOf};

// Key extraction for key-value entries: the first element orders the pair.
pub(crate) struct EntryKey;

impl<K: Ord, V> KeyOf<(K, V)> for EntryKey {
    type Key = K;

    fn key(entry: &(K, V)) -> &K {
        &entry.0
    }
}

/// An ordered map of key-value entries, implemented with an AVL tree.
///
/// ```
/// use avltree::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(1, "one")?;
/// map.insert(2, "two")?;
/// assert_eq!(map.get(&1), Ok(&"one"));
/// *map.get_or_default(3) = "three";
/// assert_eq!(map.remove(&3), Ok((3, "three")));
/// # Ok::<(), avltree::Error>(())
/// ```
pub struct AvlTreeMap<K: Ord, V> {
    tree: AvlTree<(K, V), EntryKey>,
}

/// An iterator over the entries of a map.
pub struct Iter<'a, K: Ord, V> {
    inner: iter::Iter<'a, (K, V), EntryKey>,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self {
            tree: AvlTree::default(),
        }
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the map, dropping all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    /// Fails with [`Error::KeyNotFound`] if the key is not in the map.
    pub fn get(&self, key: &K) -> Result<&V> {
        match self.tree.find(key) {
            Some(id) => Ok(&self.tree.item(id).1),
            None => Err(Error::KeyNotFound),
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    /// Fails with [`Error::KeyNotFound`] if the key is not in the map.
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        match self.tree.find(key) {
            Some(id) => Ok(&mut self.tree.item_mut(id).1),
            None => Err(Error::KeyNotFound),
        }
    }

    /// Returns a mutable reference to the value corresponding to the key,
    /// inserting an entry with the default value first if the key is not
    /// in the map.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let id = match self.tree.find(&key) {
            Some(id) => id,
            None => self
                .tree
                .insert_id((key, V::default()))
                .expect("insert cannot collide after a failed lookup"),
        };
        &mut self.tree.item_mut(id).1
    }

    /// Returns true if an entry with the given key is in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Inserts a key-value entry into the map.
    /// Fails with [`Error::KeyExists`] if an entry with an equal key is
    /// already present; the map is left untouched then.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.tree.insert((key, value))
    }

    /// Removes the entry with the given key from the map and returns it.
    /// Fails with [`Error::EmptyTree`] on an empty map and with
    /// [`Error::KeyNotFound`] if the key is not in the map.
    pub fn remove(&mut self, key: &K) -> Result<(K, V)> {
        match self.tree.remove(key) {
            Ok(entry) => Ok(entry),
            Err(Error::NodeNotFound) => Err(Error::KeyNotFound),
            Err(err) => Err(err),
        }
    }

    /// Gets an iterator over the entries of the map, visiting each node
    /// after both of its subtrees.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_postorder()
    }

    /// Gets an iterator over the entries of the map in ascending key order.
    pub fn iter_inorder(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Gets an iterator over the entries of the map, visiting each node
    /// before both of its subtrees.
    pub fn iter_preorder(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter_preorder(),
        }
    }

    /// Gets an iterator over the entries of the map, visiting each node
    /// after both of its subtrees.
    pub fn iter_postorder(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter_postorder(),
        }
    }

    /// Calls the closure on every entry, visiting each node after both of
    /// its subtrees.
    /// The key stays shared since changing it would break the order.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        self.tree
            .for_each_mut_postorder(|entry| f(&entry.0, &mut entry.1));
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency();
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for AvlTreeMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K, V> fmt::Debug for AvlTreeMap<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_inorder()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    /// Builds a map by inserting the entries in iteration order.
    /// When keys repeat, the first occurrence stays in the map.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tree: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.0, &entry.1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Ord, V> FusedIterator for Iter<'_, K, V> {}

impl<K: Ord, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

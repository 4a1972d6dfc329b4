use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// Structure for storing elements of type `Value`, the structure can only be indexed by structures
/// of type `Key`.
///
/// Almost all features of this structure require that `Key` implements the [`StorageKey`] trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyedVec<Key, Value> {
    key: PhantomData<Key>,
    elements: Vec<Value>,
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        Self {
            key: PhantomData,
            elements: Vec::default(),
        }
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    /// Add a new value to the vector and return the key which refers to it.
    pub(crate) fn push(&mut self, value: Value) -> Key {
        self.elements.push(value);
        Key::create_from_index(self.elements.len() - 1)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&Value> {
        self.elements.get(key.index())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Value> {
        self.elements.iter()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = Key> {
        (0..self.elements.len()).map(Key::create_from_index)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    pub(crate) fn last(&self) -> Option<&Value> {
        self.elements.last()
    }

    pub(crate) fn pop(&mut self) -> Option<Value> {
        self.elements.pop()
    }
}

impl<Key: StorageKey, Value: Clone> KeyedVec<Key, Value> {
    /// Grow the vector with copies of `default_value` until `key` is a valid index.
    pub(crate) fn accomodate(&mut self, key: Key, default_value: Value) {
        if key.index() >= self.elements.len() {
            self.elements.resize(key.index() + 1, default_value)
        }
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, index: Key) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, index: Key) -> &mut Self::Output {
        &mut self.elements[index.index()]
    }
}

/// A handle which can index a [`KeyedVec`].
pub(crate) trait StorageKey: Copy {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Key(usize);

    impl StorageKey for Key {
        fn index(&self) -> usize {
            self.0
        }

        fn create_from_index(index: usize) -> Self {
            Key(index)
        }
    }

    #[test]
    fn pushed_values_are_reachable_through_their_key() {
        let mut keyed: KeyedVec<Key, &str> = KeyedVec::default();
        let first = keyed.push("a");
        let second = keyed.push("b");

        assert_eq!(Key(0), first);
        assert_eq!("b", keyed[second]);
        assert_eq!(vec![Key(0), Key(1)], keyed.keys().collect::<Vec<_>>());
    }

    #[test]
    fn accomodate_only_grows() {
        let mut keyed: KeyedVec<Key, u32> = KeyedVec::default();
        keyed.accomodate(Key(3), 7);
        assert_eq!(4, keyed.len());

        keyed.accomodate(Key(1), 9);
        assert_eq!(4, keyed.len());
        assert_eq!(7, keyed[Key(1)]);
    }
}

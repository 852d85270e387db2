//! Singly-linked LIFO chain.
//!
//! Every operation at the head is O(1). Iteration and draining both walk from
//! the most recently pushed item backwards, so a sequence of pushes drained
//! with `pop` comes back in reverse.

use std::fmt;
use std::iter::FromIterator;

struct Link<T> {
    item: T,
    next: Option<Box<Link<T>>>,
}

pub struct Chain<T> {
    head: Option<Box<Link<T>>>,
    len: usize,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push(&mut self, item: T) {
        let next = self.head.take();
        self.head = Some(Box::new(Link { item, next }));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        self.head.take().map(|link| {
            let link = *link;
            self.head = link.next;
            self.len -= 1;
            link.item
        })
    }

    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|link| &link.item)
    }

    /// Cursor over the chain, most recent item first. Call again to restart.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Pops every item, most recent first.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain { chain: self }
    }

    /// Unlinks the first item (from the head) matching `predicate`.
    pub fn remove_first<F>(&mut self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = &mut self.head;
        while cursor
            .as_ref()
            .map_or(false, |link| !predicate(&link.item))
        {
            match cursor {
                Some(link) => cursor = &mut link.next,
                None => return None,
            }
        }
        let link = *cursor.take()?;
        *cursor = link.next;
        self.len -= 1;
        Some(link.item)
    }
}

impl<T: PartialEq> Chain<T> {
    /// Removes the first link holding `item`. Items are handles, so equality is identity.
    pub fn remove(&mut self, item: &T) -> bool {
        self.remove_first(|candidate| candidate == item).is_some()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|candidate| candidate == item)
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Unlink iteratively so long chains can't overflow the stack on drop.
impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut link) = cursor {
            cursor = link.next.take();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for Chain<T> {
    fn clone(&self) -> Self {
        // Pushing in iteration order would reverse the copy; go through a buffer.
        let items: Vec<&T> = self.iter().collect();
        let mut chain = Chain::new();
        for item in items.into_iter().rev() {
            chain.push(item.clone());
        }
        chain
    }
}

impl<T> Extend<T> for Chain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for Chain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = Chain::new();
        chain.extend(iter);
        chain
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Link<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|link| {
            self.next = link.next.as_deref();
            &link.item
        })
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Drain<'a, T> {
    chain: &'a mut Chain<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.chain.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.chain.len, Some(self.chain.len))
    }
}

pub struct IntoIter<T> {
    chain: Chain<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.chain.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.chain.len, Some(self.chain.len))
    }
}

impl<T> IntoIterator for Chain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { chain: self }
    }
}

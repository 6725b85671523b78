use std::marker::PhantomData;

use crate::core::{BodyHandle, ConstraintHandle};
use crate::error::PhysicsError;
use crate::Result;

/// Generic storage trait for physics objects
pub trait Storage<T, H> {
    /// Creates a new empty storage
    fn new() -> Self;

    /// Adds an item and returns its handle
    fn add(&mut self, item: T) -> H;

    /// Gets a reference to a live item; `None` for stale handles
    fn get(&self, handle: H) -> Option<&T>;

    fn get_mut(&mut self, handle: H) -> Option<&mut T>;

    /// Removes an item, invalidating its handle
    fn remove(&mut self, handle: H) -> Option<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool;

    fn clear(&mut self);

    /// Live handles, most recently added first
    fn handles(&self) -> Vec<H>;

    /// Iterates live items, most recently added first
    fn iter<'a>(&'a self) -> impl Iterator<Item = (H, &'a T)> + 'a where T: 'a;

    /// Mutable iteration in the same order as [`Storage::iter`]
    fn iter_mut<'a>(&'a mut self) -> impl Iterator<Item = (H, &'a mut T)> + 'a where T: 'a;
}

/// Handle types that can address a [`Pool`] slot
pub trait PoolHandle: Copy + std::fmt::Debug {
    fn from_raw_parts(index: u32, generation: u32) -> Self;

    fn index(&self) -> u32;

    fn generation(&self) -> u32;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

/// Generational arena keeping its live entries in a doubly linked list.
///
/// New entries are linked at the front, so iteration visits the most recent
/// entry first. Freed slots are recycled with a bumped generation so old
/// handles stop resolving.
#[derive(Debug, Clone)]
pub struct Pool<T, H> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

/// Storage for physics bodies
pub type BodyStorage<T> = Pool<T, BodyHandle>;

/// Storage for persistent constraints
pub type ConstraintStorage<T> = Pool<T, ConstraintHandle>;

impl<T, H: PoolHandle> Pool<T, H> {
    fn slot(&self, handle: H) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation() && slot.value.is_some())
    }

    /// Returns true if `handle` refers to a live entry
    pub fn contains(&self, handle: H) -> bool {
        self.slot(handle).is_some()
    }

    /// Gets an item, reporting stale handles as [`PhysicsError::ResourceNotFound`]
    pub fn fetch(&self, handle: H) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} is not a live handle", handle)))
    }

    pub fn fetch_mut(&mut self, handle: H) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} is not a live handle", handle)))
    }

    /// Borrows two distinct entries mutably at once
    pub fn get2_mut(&mut self, a: H, b: H) -> Result<(&mut T, &mut T)> {
        if !self.contains(a) || !self.contains(b) {
            return Err(PhysicsError::ResourceNotFound(format!("{:?} or {:?} is not a live handle", a, b)));
        }
        let (ia, ib) = (a.index() as usize, b.index() as usize);
        if ia == ib {
            return Err(PhysicsError::InvalidParameter(format!("{:?} was passed twice", a)));
        }

        let (first, second) = if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        };
        match (first.value.as_mut(), second.value.as_mut()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(PhysicsError::InternalError("live slot without a value".into())),
        }
    }

    /// Slot indices in list order
    fn order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            order.push(index as usize);
            cursor = self.slots[index as usize].next;
        }
        order
    }

    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let slot = &mut self.slots[index as usize];
            (slot.prev.take(), slot.next.take())
        };
        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.slots[n as usize].prev = prev;
        }
    }
}

impl<T, H: PoolHandle> Storage<T, H> for Pool<T, H> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
            _handle: PhantomData,
        }
    }

    fn add(&mut self, item: T) -> H {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].value = Some(item);
                index
            }
            None => {
                self.slots.push(Slot {
                    value: Some(item),
                    generation: 0,
                    prev: None,
                    next: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        if let Some(old_head) = self.head {
            self.slots[old_head as usize].prev = Some(index);
        }
        let slot = &mut self.slots[index as usize];
        slot.prev = None;
        slot.next = self.head;
        self.head = Some(index);
        self.len += 1;

        H::from_raw_parts(index, slot.generation)
    }

    fn get(&self, handle: H) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    fn remove(&mut self, handle: H) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let index = handle.index();
        self.unlink(index);
        let slot = &mut self.slots[index as usize];
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        value
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn clear(&mut self) {
        for index in self.order() {
            let slot = &mut self.slots[index];
            slot.value = None;
            slot.prev = None;
            slot.next = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
        }
        self.head = None;
        self.len = 0;
    }

    fn handles(&self) -> Vec<H> {
        self.order()
            .into_iter()
            .map(|index| H::from_raw_parts(index as u32, self.slots[index].generation))
            .collect()
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = (H, &'a T)> + 'a where T: 'a {
        self.order().into_iter().filter_map(move |index| {
            let slot = &self.slots[index];
            slot.value
                .as_ref()
                .map(|value| (H::from_raw_parts(index as u32, slot.generation), value))
        })
    }

    fn iter_mut<'a>(&'a mut self) -> impl Iterator<Item = (H, &'a mut T)> + 'a where T: 'a {
        let order = self.order();
        let mut slots: Vec<Option<&'a mut Slot<T>>> = self.slots.iter_mut().map(Some).collect();
        order.into_iter().filter_map(move |index| {
            let slot = slots[index].take()?;
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (H::from_raw_parts(index as u32, generation), value))
        })
    }
}

impl<T, H: PoolHandle> Default for Pool<T, H> {
    fn default() -> Self {
        <Self as Storage<T, H>>::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> BodyStorage<&'static str> {
        BodyStorage::new()
    }

    #[test]
    fn iteration_is_newest_first() {
        let mut p = pool();
        p.add("a");
        p.add("b");
        p.add("c");
        let items: Vec<_> = p.iter().map(|(_, v)| *v).collect();
        assert_eq!(items, vec!["c", "b", "a"]);
    }

    #[test]
    fn removal_unlinks_from_any_position() {
        let mut p = pool();
        let a = p.add("a");
        let b = p.add("b");
        let c = p.add("c");
        assert_eq!(p.remove(b), Some("b"));
        let items: Vec<_> = p.iter().map(|(_, v)| *v).collect();
        assert_eq!(items, vec!["c", "a"]);
        assert_eq!(p.remove(c), Some("c"));
        assert_eq!(p.remove(a), Some("a"));
        assert!(p.is_empty());
        assert_eq!(p.iter().count(), 0);
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut p = pool();
        let a = p.add("a");
        p.remove(a);
        let reused = p.add("b");
        assert_eq!(reused.index(), a.index());
        assert!(p.get(a).is_none());
        assert!(p.get_mut(a).is_none());
        assert_eq!(p.get(reused), Some(&"b"));
        assert!(matches!(p.fetch(a), Err(PhysicsError::ResourceNotFound(_))));
    }

    #[test]
    fn get2_mut_borrows_both() {
        let mut p: BodyStorage<i32> = BodyStorage::new();
        let a = p.add(1);
        let b = p.add(2);
        {
            let (x, y) = p.get2_mut(b, a).unwrap();
            std::mem::swap(x, y);
        }
        assert_eq!(p.get(a), Some(&2));
        assert!(p.get2_mut(a, a).is_err());
    }

    #[test]
    fn iter_mut_matches_iter_order() {
        let mut p: BodyStorage<i32> = BodyStorage::new();
        for i in 0..5 {
            p.add(i);
        }
        let handles: Vec<_> = p.iter_mut().map(|(h, v)| {
            *v *= 10;
            h
        }).collect();
        assert_eq!(handles, p.handles());
        let values: Vec<_> = p.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![40, 30, 20, 10, 0]);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut p = pool();
        let a = p.add("a");
        p.clear();
        assert!(p.is_empty());
        assert!(!p.contains(a));
        p.add("b");
        assert_eq!(p.len(), 1);
    }
}

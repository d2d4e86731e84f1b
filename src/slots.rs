//! Slot storage for arena-backed trees.
//!
//! Every stored item lives in a slot of a single `Vec`. Removing an item turns its slot vacant and
//! pushes it onto a free list so the next insertion reuses it. Each slot carries a generation that
//! is bumped on removal, which lets a [`NodeId`] detect that the item it pointed to is gone even
//! after the slot has been handed out again.

use std::fmt;

/// A stable handle to a node of a [`Tree`](crate::arena::Tree).
///
/// A `NodeId` stays valid until the node it names is deleted. After that, every lookup with it
/// fails (or panics, for the methods documented to do so), even if a newer node happens to occupy
/// the same slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.index
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

#[derive(Clone)]
enum Slot<N> {
    Occupied { generation: u32, item: N },
    Vacant { generation: u32, next_free: Option<usize> },
}

impl<N> Slot<N> {
    fn generation(&self) -> u32 {
        match self {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation, .. } => *generation,
        }
    }
}

/// A `Vec` of slots plus the head of the free list threaded through the vacant ones.
#[derive(Clone)]
pub(crate) struct Slots<N> {
    slots: Vec<Slot<N>>,
    free_head: Option<usize>,
    len: usize,
}

impl<N> Slots<N> {
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Stores `item`, reusing a vacant slot when there is one.
    pub(crate) fn insert(&mut self, item: N) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index];
                let (generation, next_free) = match *slot {
                    Slot::Vacant {
                        generation,
                        next_free,
                    } => (generation, next_free),
                    Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
                };
                *slot = Slot::Occupied { generation, item };
                self.free_head = next_free;
                NodeId { index, generation }
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot::Occupied {
                    generation: 0,
                    item,
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// The id of the item currently stored at `index`, if the slot is occupied.
    pub(crate) fn id_at(&self, index: usize) -> Option<NodeId> {
        match self.slots.get(index)? {
            Slot::Occupied { generation, .. } => Some(NodeId {
                index,
                generation: *generation,
            }),
            Slot::Vacant { .. } => None,
        }
    }

    /// Returns `true` if `id` still names a stored item.
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        matches!(
            self.slots.get(id.index),
            Some(Slot::Occupied { generation, .. }) if *generation == id.generation
        )
    }

    /// The item at `index`.
    ///
    /// ## Panics
    ///
    /// When the slot is vacant. Indices stored inside a tree always point at occupied slots, so
    /// this only fires if a tree's links are corrupted.
    pub(crate) fn at(&self, index: usize) -> &N {
        match &self.slots[index] {
            Slot::Occupied { item, .. } => item,
            Slot::Vacant { .. } => panic!("link to vacant slot {}", index),
        }
    }

    /// Mutable counterpart of [`Slots::at`].
    pub(crate) fn at_mut(&mut self, index: usize) -> &mut N {
        match &mut self.slots[index] {
            Slot::Occupied { item, .. } => item,
            Slot::Vacant { .. } => panic!("link to vacant slot {}", index),
        }
    }

    /// Vacates the slot at `index` and returns its item. The slot's generation is bumped so that
    /// every outstanding id for it goes stale.
    pub(crate) fn remove_at(&mut self, index: usize) -> N {
        let generation = self.slots[index].generation().wrapping_add(1);
        let vacant = Slot::Vacant {
            generation,
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied { item, .. } => {
                self.free_head = Some(index);
                self.len -= 1;
                item
            }
            Slot::Vacant { .. } => panic!("removing vacant slot {}", index),
        }
    }

    /// Vacates every slot, keeping the allocation. All outstanding ids go stale.
    pub(crate) fn clear(&mut self) {
        self.free_head = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let generation = match slot {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *slot = Slot::Vacant {
                generation,
                next_free: self.free_head,
            };
            self.free_head = Some(index);
        }
        self.len = 0;
    }

    /// Drops trailing vacant slots and releases unused capacity.
    pub(crate) fn shrink_to_fit(&mut self) {
        while let Some(Slot::Vacant { .. }) = self.slots.last() {
            self.slots.pop();
        }
        // Popping slots can leave dangling entries in the free list, so rebuild it.
        self.free_head = None;
        for index in (0..self.slots.len()).rev() {
            if let Slot::Vacant { next_free, .. } = &mut self.slots[index] {
                *next_free = self.free_head;
                self.free_head = Some(index);
            }
        }
        self.slots.shrink_to_fit();
    }
}

//! Registry of action lists keyed by update phase.
//!
//! The [`ActionScheduler`] owns every [`ActionList`] the host wants driven
//! automatically. Each list is registered for one [`UpdatePhase`] and gets a
//! [`ListHandle`] backed by a [`MemoryRecycler`] slot, so deregistering one
//! list never invalidates the handles of the others, and freed slots are
//! reused before the slot table grows.
//!
//! This is a non-send resource (actions hold `Rc` value cells): insert it
//! with `insert_non_send_resource` and access it via `NonSend`/`NonSendMut`.
//!
//! # Usage
//!
//! ```ignore
//! let mut scheduler = world.non_send_resource_mut::<ActionScheduler>();
//! let handle = scheduler.register(UpdatePhase::Frame, ActionList::new());
//! scheduler.get_mut(handle).unwrap().push_action(Wait::new(1.0));
//! // ...
//! let list = scheduler.deregister(handle);
//! ```

use log::debug;

use crate::actionlist::ActionList;
use crate::recycler::MemoryRecycler;

/// Host loop phase a list is driven from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatePhase {
    /// Once per rendered frame, variable delta.
    Frame,
    /// Once per fixed step.
    Fixed,
}

/// Stable handle of a registered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle(usize);

impl ListHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct Slot {
    phase: UpdatePhase,
    list: ActionList,
}

#[derive(Default)]
pub struct ActionScheduler {
    slots: Vec<Option<Slot>>,
    recycler: MemoryRecycler,
}

impl ActionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `list` and drive it from `phase`.
    pub fn register(&mut self, phase: UpdatePhase, list: ActionList) -> ListHandle {
        let index = self.recycler.acquire();
        let slot = Some(Slot { phase, list });
        if index == self.slots.len() {
            self.slots.push(slot);
        } else {
            self.slots[index] = slot;
        }
        debug!("registered action list {index} for {phase:?}");
        ListHandle(index)
    }

    /// Stop driving a list and hand it back. Returns `None` for a handle that
    /// is not registered.
    pub fn deregister(&mut self, handle: ListHandle) -> Option<ActionList> {
        let slot = self.slots.get_mut(handle.0)?.take()?;
        self.recycler.delete(handle.0);
        debug!("deregistered action list {}", handle.0);
        Some(slot.list)
    }

    pub fn contains(&self, handle: ListHandle) -> bool {
        matches!(self.slots.get(handle.0), Some(Some(_)))
    }

    pub fn get(&self, handle: ListHandle) -> Option<&ActionList> {
        self.slots.get(handle.0)?.as_ref().map(|s| &s.list)
    }

    pub fn get_mut(&mut self, handle: ListHandle) -> Option<&mut ActionList> {
        self.slots.get_mut(handle.0)?.as_mut().map(|s| &mut s.list)
    }

    pub fn phase_of(&self, handle: ListHandle) -> Option<UpdatePhase> {
        self.slots.get(handle.0)?.as_ref().map(|s| s.phase)
    }

    /// Number of registered lists.
    pub fn len(&self) -> usize {
        self.recycler.allocation_total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Update every list registered for `phase`, in handle order.
    pub fn update_phase(&mut self, phase: UpdatePhase, dt: f64, time_scale: f64) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.phase == phase {
                slot.list.update_with_time_scale(dt, time_scale);
            }
        }
    }

    /// Fast-forward every registered list.
    pub fn fast_forward_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.list.fast_forward();
        }
    }

    /// Total pending actions across all lists.
    pub fn pending_actions(&self) -> usize {
        self.slots.iter().flatten().map(|s| s.list.len()).sum()
    }
}

//! Wrapper slot arena with generational handles.
//!
//! Each upstream element is wrapped exactly once, on seed or insertion, and
//! lives in one arena slot until it is finalized. Consumers address slots
//! through [`ItemHandle`], a generational index: freeing a slot bumps its
//! generation, so a handle that outlives its wrapper is rejected on
//! validation instead of silently resolving to a reused slot.
//!
//! The projection's ordering links (`prev`/`next`) live inside the slots
//! but are owned and mutated exclusively by the retained list; the arena
//! itself only allocates, validates, and frees.

use slab::Slab;

use crate::error::HandleError;

/// A stable, copyable handle to one projection entry.
///
/// Handles compare equal for the same conceptual element for as long as
/// the wrapper exists: `idx` names the slot and `generation` pins the
/// slot's current occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle {
	/// Slot index in the arena.
	pub(crate) idx: u32,
	/// Generation counter for detecting stale handles.
	pub(crate) generation: u32,
}

/// One wrapper: the owned upstream value plus hold/removal state and the
/// projection ordering links.
pub(crate) struct Slot<T> {
	/// The wrapped upstream element, owned for the slot's entire lifetime.
	pub value: T,
	/// Outstanding `hold()` count.
	pub holds: u32,
	/// Whether the upstream has removed this element. Monotonic.
	pub removed: bool,
	/// Previous entry in the projection ordering.
	pub prev: Option<u32>,
	/// Next entry in the projection ordering.
	pub next: Option<u32>,
}

/// Slot storage with a parallel generation vector.
///
/// `slab` reuses freed indices, so generations are tracked separately and
/// bumped on every free; they survive slot reuse.
pub(crate) struct WrapperArena<T> {
	slots: Slab<Slot<T>>,
	generations: Vec<u32>,
}

impl<T> Default for WrapperArena<T> {
	fn default() -> Self {
		Self {
			slots: Slab::new(),
			generations: Vec::new(),
		}
	}
}

impl<T> WrapperArena<T> {
	/// Wraps one upstream element into a fresh, unlinked, unheld slot.
	pub(crate) fn wrap(&mut self, value: T) -> u32 {
		let key = self.slots.insert(Slot {
			value,
			holds: 0,
			removed: false,
			prev: None,
			next: None,
		});
		if key >= self.generations.len() {
			self.generations.resize(key + 1, 0);
		}
		key as u32
	}

	/// Returns the current handle for an occupied slot.
	pub(crate) fn handle(&self, idx: u32) -> ItemHandle {
		ItemHandle {
			idx,
			generation: self.generations[idx as usize],
		}
	}

	/// Validates a handle and returns the slot index if it still names a
	/// wrapper owned by this arena.
	///
	/// # Errors
	///
	/// - [`HandleError::InvalidIndex`] if the index was never allocated here.
	/// - [`HandleError::StaleHandle`] if the wrapper was already finalized.
	pub(crate) fn validate(&self, handle: ItemHandle) -> Result<u32, HandleError> {
		let idx = handle.idx as usize;
		if idx >= self.generations.len() {
			return Err(HandleError::InvalidIndex);
		}
		if self.generations[idx] != handle.generation || !self.slots.contains(idx) {
			return Err(HandleError::StaleHandle);
		}
		Ok(handle.idx)
	}

	pub(crate) fn slot(&self, idx: u32) -> &Slot<T> {
		&self.slots[idx as usize]
	}

	pub(crate) fn slot_mut(&mut self, idx: u32) -> &mut Slot<T> {
		&mut self.slots[idx as usize]
	}

	/// Frees a slot and bumps its generation so outstanding handles go
	/// detectably stale.
	pub(crate) fn discard(&mut self, idx: u32) -> Slot<T> {
		self.generations[idx as usize] = self.generations[idx as usize].wrapping_add(1);
		self.slots.remove(idx as usize)
	}

	/// Frees every slot at once. Used on list teardown.
	pub(crate) fn clear(&mut self) {
		for generation in &mut self.generations {
			*generation = generation.wrapping_add(1);
		}
		self.slots.clear();
	}
}

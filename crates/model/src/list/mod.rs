//! The retained list orchestrator.
//!
//! [`RetainedList`] keeps two orderings in sync:
//!
//! - `live`: a compact vector of slot indices mirroring only the elements
//!   still present upstream, in upstream order. Upstream positions in
//!   incoming notifications index into this vector.
//! - the projection ordering: a doubly-linked chain through every slot
//!   currently visible to consumers: live entries plus tombstones that
//!   are removed upstream but still held.
//!
//! Upstream `changed` notifications come in through
//! [`RetainedList::source_changed`] (see the `translate` module) and come
//! out the other side re-expressed in projection positions, so the list is
//! a transparent decorator over its upstream.
//!
//! # Modules
//!
//! - `translate` - upstream removal/insertion translation
//! - `invariants` - invariant catalog and tests

mod translate;

#[cfg(test)]
mod invariants;

use std::fmt;

use tracing::trace;

use crate::arena::{ItemHandle, WrapperArena};
use crate::error::HandleError;
use crate::events::{Listeners, ModelChange, SubscriptionId};

/// A projection of an upstream ordered collection in which consumers can
/// pin entries past their upstream removal.
///
/// See the crate docs for the overall shape. All operations are
/// synchronous and single-threaded; every notification fires inline on the
/// caller's context.
pub struct RetainedList<T> {
	/// Wrapper storage. Owns every slot's value and hold/removal state.
	arena: WrapperArena<T>,
	/// Live slots in upstream order. Translates upstream positions into
	/// slots without walking the projection.
	live: Vec<u32>,
	/// First entry of the projection ordering.
	head: Option<u32>,
	/// Last entry of the projection ordering.
	tail: Option<u32>,
	/// Number of linked entries: live plus tombstoned-but-held.
	linked: usize,
	/// Registered change listeners.
	listeners: Listeners,
}

impl<T> Default for RetainedList<T> {
	fn default() -> Self {
		Self {
			arena: WrapperArena::default(),
			live: Vec::new(),
			head: None,
			tail: None,
			linked: 0,
			listeners: Listeners::default(),
		}
	}
}

impl<T> RetainedList<T> {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a list seeded with the upstream's pre-existing elements, in
	/// upstream order. Every seeded entry starts live and unheld.
	pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
		let mut list = Self::new();
		for value in items {
			let idx = list.arena.wrap(value);
			let tail = list.tail;
			list.link_after(tail, idx);
			list.live.push(idx);
		}
		list
	}

	/// Returns the projection length: live entries plus tombstones still
	/// held by consumers.
	pub fn len(&self) -> usize {
		self.linked
	}

	/// Returns `true` if the projection is empty.
	pub fn is_empty(&self) -> bool {
		self.linked == 0
	}

	/// Returns the handle at a projection position, or `None` out of range.
	pub fn get(&self, position: usize) -> Option<ItemHandle> {
		if position >= self.linked {
			return None;
		}
		let mut remaining = position;
		let mut cursor = self.head;
		while let Some(idx) = cursor {
			if remaining == 0 {
				return Some(self.arena.handle(idx));
			}
			remaining -= 1;
			cursor = self.arena.slot(idx).next;
		}
		None
	}

	/// Returns the wrapped upstream element for a handle.
	///
	/// Valid for the wrapper's entire lifetime, including while it is
	/// tombstoned.
	///
	/// # Errors
	///
	/// Returns [`HandleError`] if the handle is stale or foreign.
	pub fn value(&self, handle: ItemHandle) -> Result<&T, HandleError> {
		let idx = self.arena.validate(handle)?;
		Ok(&self.arena.slot(idx).value)
	}

	/// Returns `true` if the handle still names a wrapper owned by this
	/// list.
	pub fn is_valid(&self, handle: ItemHandle) -> bool {
		self.arena.validate(handle).is_ok()
	}

	/// Returns whether the upstream has removed the handle's element.
	///
	/// # Errors
	///
	/// Returns [`HandleError`] if the handle is stale or foreign.
	pub fn is_removed(&self, handle: ItemHandle) -> Result<bool, HandleError> {
		let idx = self.arena.validate(handle)?;
		Ok(self.arena.slot(idx).removed)
	}

	/// Returns the outstanding hold count for a handle.
	///
	/// # Errors
	///
	/// Returns [`HandleError`] if the handle is stale or foreign.
	pub fn holds(&self, handle: ItemHandle) -> Result<u32, HandleError> {
		let idx = self.arena.validate(handle)?;
		Ok(self.arena.slot(idx).holds)
	}

	/// Pins the entry in the projection until a matching [`Self::release`].
	///
	/// Holds nest: N holds require N releases.
	///
	/// # Errors
	///
	/// Returns [`HandleError`] if the handle is stale or foreign.
	pub fn hold(&mut self, handle: ItemHandle) -> Result<(), HandleError> {
		let idx = self.arena.validate(handle)?;
		let slot = self.arena.slot_mut(idx);
		slot.holds += 1;
		trace!(idx, holds = slot.holds, "hold");
		Ok(())
	}

	/// Releases one hold on the entry.
	///
	/// If this drops the hold count to zero on a tombstone, the entry is
	/// finalized: unlinked at its current projection position, with a
	/// `changed(position, 1, 0)` notification. The handle is stale
	/// afterwards.
	///
	/// # Errors
	///
	/// Returns [`HandleError`] if the handle is stale or foreign.
	///
	/// # Panics
	///
	/// Panics if the hold count is already zero. An imbalanced release is
	/// a bug in the caller, not a recoverable condition.
	pub fn release(&mut self, handle: ItemHandle) -> Result<(), HandleError> {
		let idx = self.arena.validate(handle)?;
		let finalize = {
			let slot = self.arena.slot_mut(idx);
			assert!(slot.holds > 0, "release() without a matching hold()");
			slot.holds -= 1;
			trace!(idx, holds = slot.holds, "release");
			slot.holds == 0 && slot.removed
		};
		if finalize {
			let position = self.position_of(idx);
			self.unlink(idx);
			self.arena.discard(idx);
			trace!(idx, position, "finalized");
			self.listeners.emit(ModelChange::removal(position));
		}
		Ok(())
	}

	/// Registers a change listener. Notifications use projection positions
	/// in the same `changed(position, removed, added)` convention as the
	/// upstream.
	pub fn subscribe(&mut self, listener: impl FnMut(ModelChange) + 'static) -> SubscriptionId {
		self.listeners.subscribe(listener)
	}

	/// Removes a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.listeners.unsubscribe(id)
	}

	/// Iterates over the projection's handles, front to back.
	pub fn iter(&self) -> impl Iterator<Item = ItemHandle> + '_ {
		std::iter::successors(self.head, |&idx| self.arena.slot(idx).next).map(|idx| self.arena.handle(idx))
	}

	/// Iterates over the projection's values, front to back.
	pub fn values(&self) -> impl Iterator<Item = &T> {
		std::iter::successors(self.head, |&idx| self.arena.slot(idx).next).map(|idx| &self.arena.slot(idx).value)
	}

	/// Inserts `idx` into the projection ordering after `after`
	/// (`None` links at the head).
	fn link_after(&mut self, after: Option<u32>, idx: u32) {
		let next = match after {
			Some(prev) => {
				let old_next = self.arena.slot(prev).next;
				self.arena.slot_mut(prev).next = Some(idx);
				old_next
			}
			None => self.head,
		};
		{
			let slot = self.arena.slot_mut(idx);
			slot.prev = after;
			slot.next = next;
		}
		match next {
			Some(n) => self.arena.slot_mut(n).prev = Some(idx),
			None => self.tail = Some(idx),
		}
		if after.is_none() {
			self.head = Some(idx);
		}
		self.linked += 1;
	}

	/// Detaches `idx` from the projection ordering in O(1).
	fn unlink(&mut self, idx: u32) {
		let (prev, next) = {
			let slot = self.arena.slot(idx);
			(slot.prev, slot.next)
		};
		match prev {
			Some(p) => self.arena.slot_mut(p).next = next,
			None => self.head = next,
		}
		match next {
			Some(n) => self.arena.slot_mut(n).prev = prev,
			None => self.tail = prev,
		}
		let slot = self.arena.slot_mut(idx);
		slot.prev = None;
		slot.next = None;
		self.linked -= 1;
	}

	/// Current projection position of a linked slot, counted from the head.
	fn position_of(&self, idx: u32) -> usize {
		let mut position = 0;
		let mut cursor = self.arena.slot(idx).prev;
		while let Some(p) = cursor {
			position += 1;
			cursor = self.arena.slot(p).prev;
		}
		position
	}
}

impl<T> Drop for RetainedList<T> {
	fn drop(&mut self) {
		// Teardown force-unlinks every remaining wrapper, held or not,
		// without emitting notifications. Outstanding handles require the
		// list to be used at all, so they cannot be dereferenced after
		// this.
		self.head = None;
		self.tail = None;
		self.linked = 0;
		self.live.clear();
		self.arena.clear();
	}
}

impl<T> fmt::Debug for RetainedList<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RetainedList")
			.field("live", &self.live.len())
			.field("linked", &self.linked)
			.finish_non_exhaustive()
	}
}

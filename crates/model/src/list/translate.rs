//! Upstream change translation.
//!
//! Upstream positions count only live entries; projection positions count
//! tombstones too. Every upstream mutation is translated here into zero or
//! more projection mutations plus notifications.

use tracing::trace;

use super::RetainedList;
use crate::events::ModelChange;

impl<T> RetainedList<T> {
	/// Applies one upstream `changed(position, removed, added)`
	/// notification.
	///
	/// Removals are applied first, then insertions, both at `position` in
	/// upstream (live) index space, matching the upstream's post-change
	/// indexing convention. Added elements are handed over by value, in
	/// upstream order.
	///
	/// # Panics
	///
	/// Panics if `position + removed` exceeds the number of live entries;
	/// that means the upstream violated its notification contract.
	pub fn source_changed(&mut self, position: usize, removed: usize, added: Vec<T>) {
		assert!(
			position + removed <= self.live.len(),
			"upstream change out of range: position {position} + removed {removed} > {} live entries",
			self.live.len()
		);
		for _ in 0..removed {
			self.remove_live(position);
		}
		for (offset, value) in added.into_iter().enumerate() {
			self.insert_live(position + offset, value);
		}
	}

	/// Removes the live entry at upstream `position`.
	///
	/// Unheld entries are unlinked and announced immediately. Held entries
	/// become tombstones: they keep their projection link until the last
	/// release finalizes them.
	fn remove_live(&mut self, position: usize) {
		let idx = self.live.remove(position);
		let holds = {
			let slot = self.arena.slot_mut(idx);
			debug_assert!(!slot.removed, "live index held an already-removed slot");
			slot.removed = true;
			slot.holds
		};
		if holds > 0 {
			trace!(idx, holds, "tombstoned");
			return;
		}
		let projection_position = self.position_of(idx);
		self.unlink(idx);
		self.arena.discard(idx);
		trace!(idx, position = projection_position, "removed");
		self.listeners.emit(ModelChange::removal(projection_position));
	}

	/// Wraps and links one new upstream element at upstream `position`.
	fn insert_live(&mut self, position: usize, value: T) {
		let idx = self.arena.wrap(value);

		// Walk from the head counting only live entries to find the link
		// point, then keep walking past tombstones that immediately follow
		// it: the new entry goes after pre-existing tombstones instead of
		// splitting a tombstone chain from its original left neighbor.
		let mut after = None;
		let mut projection_position = 0;
		let mut live_seen = 0;
		let mut cursor = self.head;
		while let Some(c) = cursor {
			if !self.arena.slot(c).removed {
				if live_seen == position {
					break;
				}
				live_seen += 1;
			}
			after = Some(c);
			projection_position += 1;
			cursor = self.arena.slot(c).next;
		}

		self.link_after(after, idx);
		self.live.insert(position, idx);
		trace!(idx, position = projection_position, "inserted");
		self.listeners.emit(ModelChange::insertion(projection_position));
	}
}

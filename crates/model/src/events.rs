//! Change notifications and the listener registry.
//!
//! [`ModelChange`] uses the same `changed(position, removed, added)`
//! convention as the upstream collection, so a subscriber written against
//! the upstream works unmodified against the projection.

use slab::Slab;

/// One change notification: at `position`, `removed` entries were removed
/// and `added` entries were added, using post-change indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelChange {
	/// Projection position the change applies at.
	pub position: usize,
	/// Number of entries removed at `position`.
	pub removed: usize,
	/// Number of entries added at `position`.
	pub added: usize,
}

impl ModelChange {
	pub(crate) fn removal(position: usize) -> Self {
		Self { position, removed: 1, added: 0 }
	}

	pub(crate) fn insertion(position: usize) -> Self {
		Self { position, removed: 0, added: 1 }
	}
}

/// Identifies one subscription, returned by [`crate::RetainedList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(ModelChange)>;

/// Registered change listeners, keyed by [`SubscriptionId`].
#[derive(Default)]
pub(crate) struct Listeners {
	entries: Slab<Listener>,
}

impl Listeners {
	pub(crate) fn subscribe(&mut self, listener: impl FnMut(ModelChange) + 'static) -> SubscriptionId {
		SubscriptionId(self.entries.insert(Box::new(listener)))
	}

	/// Removes a subscription. Returns `false` if it was already gone.
	pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.entries.try_remove(id.0).is_some()
	}

	/// Emits one change to every subscriber, inline and in registration order.
	pub(crate) fn emit(&mut self, change: ModelChange) {
		for (_, listener) in self.entries.iter_mut() {
			listener(change);
		}
	}
}

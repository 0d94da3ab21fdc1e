
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::HandleError;
use crate::events::ModelChange;
use crate::list::RetainedList;

fn record_changes(list: &mut RetainedList<char>) -> Rc<RefCell<Vec<ModelChange>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&log);
	list.subscribe(move |change| sink.borrow_mut().push(change));
	log
}

fn projection(list: &RetainedList<char>) -> Vec<char> {
	list.values().copied().collect()
}

/// A wrapper is linked in the projection iff it is live or still held.
///
/// * Enforced in: `RetainedList::source_changed`, `RetainedList::release`
/// * Failure symptom: `len()` drifts from the visible entries.
#[cfg_attr(test, test)]
pub(crate) fn test_count_equals_live_plus_held_tombstones() {
	let mut list = RetainedList::from_items(['a', 'b', 'c']);
	assert_eq!(list.len(), 3);

	let b = list.get(1).unwrap();
	list.hold(b).unwrap();
	list.source_changed(1, 1, vec![]);
	assert_eq!(list.len(), 3, "held tombstone still counts");

	list.source_changed(1, 1, vec![]);
	assert_eq!(list.len(), 2, "unheld removal drops out immediately");

	list.release(b).unwrap();
	assert_eq!(list.len(), 1, "final release unlinks the tombstone");
}

/// Every handle is generation-validated before any slot access, and the
/// removed flag is monotonic (a finalized wrapper never comes back).
///
/// * Enforced in: `WrapperArena::validate`, callers in `RetainedList`
/// * Failure symptom: A stale handle resolves to whatever wrapper reused
///   the slot.
#[cfg_attr(test, test)]
pub(crate) fn test_stale_handle_rejected_after_finalize() {
	let mut list = RetainedList::from_items(['a', 'b']);
	let b = list.get(1).unwrap();

	list.hold(b).unwrap();
	list.source_changed(1, 1, vec![]);
	list.release(b).unwrap();

	assert_eq!(list.value(b), Err(HandleError::StaleHandle));
	assert_eq!(list.hold(b), Err(HandleError::StaleHandle));
	assert_eq!(list.release(b), Err(HandleError::StaleHandle));
	assert!(!list.is_valid(b));

	// The freed slot gets reused by the next insertion; the old handle
	// must keep failing validation rather than aliasing the newcomer.
	list.source_changed(1, 0, vec!['x']);
	assert_eq!(list.value(b), Err(HandleError::StaleHandle));
	assert_eq!(projection(&list), vec!['a', 'x']);
}

/// Among live wrappers, relative order always equals current upstream order.
///
/// * Enforced in: `RetainedList::remove_live`, `RetainedList::insert_live`
/// * Failure symptom: Projection and upstream disagree on element order.
#[cfg_attr(test, test)]
pub(crate) fn test_live_order_matches_upstream_order() {
	let mut upstream = vec!['a', 'b', 'c', 'd'];
	let mut list = RetainedList::from_items(upstream.iter().copied());

	// Interleave removals and insertions, mirroring them upstream.
	upstream.remove(2);
	list.source_changed(2, 1, vec![]);
	upstream.insert(1, 'x');
	list.source_changed(1, 0, vec!['x']);
	upstream.remove(0);
	list.source_changed(0, 1, vec![]);
	upstream.insert(3, 'y');
	list.source_changed(3, 0, vec!['y']);

	let live: Vec<char> = list
		.iter()
		.filter(|&h| !list.is_removed(h).unwrap())
		.map(|h| *list.value(h).unwrap())
		.collect();
	assert_eq!(live, upstream);
}

/// A tombstone keeps the position it had relative to its then-neighbors.
///
/// * Enforced in: `RetainedList::remove_live` (tombstones stay linked in
///   place)
/// * Failure symptom: A held entry jumps around the projection.
#[cfg_attr(test, test)]
pub(crate) fn test_tombstone_keeps_position_as_neighbors_change() {
	let mut list = RetainedList::from_items(['a', 'b', 'c', 'd']);
	let c = list.get(2).unwrap();
	list.hold(c).unwrap();

	// Remove c upstream: it stays linked between b and d.
	list.source_changed(2, 1, vec![]);
	assert_eq!(projection(&list), vec!['a', 'b', 'c', 'd']);

	// Removing a shifts everything left; c stays glued after b.
	list.source_changed(0, 1, vec![]);
	assert_eq!(projection(&list), vec!['b', 'c', 'd']);

	// Inserting between b and d links after the tombstone chain.
	list.source_changed(1, 0, vec!['x']);
	assert_eq!(projection(&list), vec!['b', 'c', 'x', 'd']);

	list.release(c).unwrap();
	assert_eq!(projection(&list), vec!['b', 'x', 'd']);
}

/// A tombstone's removal notification uses its position at finalize time.
///
/// * Enforced in: `RetainedList::release` (position recomputed before
///   unlink)
/// * Failure symptom: Subscribers remove the wrong entry from mirrored
///   state.
#[cfg_attr(test, test)]
pub(crate) fn test_finalize_emits_current_position() {
	let mut list = RetainedList::from_items(['a', 'b', 'c']);
	let b = list.get(1).unwrap();
	list.hold(b).unwrap();
	let log = record_changes(&mut list);

	// Tombstone b at projection position 1, then remove a so b shifts to 0.
	list.source_changed(1, 1, vec![]);
	list.source_changed(0, 1, vec![]);
	list.release(b).unwrap();

	assert_eq!(
		log.borrow().as_slice(),
		&[
			// a's removal, at its own position.
			ModelChange { position: 0, removed: 1, added: 0 },
			// b's deferred removal: position 0, where it sits *now*.
			ModelChange { position: 0, removed: 1, added: 0 },
		]
	);
	assert_eq!(projection(&list), vec!['c']);
}

/// New live entries link after tombstones trailing their live predecessor.
///
/// * Enforced in: `RetainedList::insert_live`
/// * Failure symptom: A held entry's anchor changes when unrelated items
///   are inserted.
#[cfg_attr(test, test)]
pub(crate) fn test_insert_lands_after_trailing_tombstones() {
	let mut list = RetainedList::from_items(['a', 'b', 'c']);
	let b = list.get(1).unwrap();
	list.hold(b).unwrap();
	list.source_changed(1, 1, vec![]);

	let log = record_changes(&mut list);

	// Upstream is [a, c]; inserting at upstream position 1 lands between
	// a and c, but after the b tombstone: [a, b†, d, c].
	list.source_changed(1, 0, vec!['d']);
	assert_eq!(projection(&list), vec!['a', 'b', 'd', 'c']);
	assert_eq!(
		log.borrow().as_slice(),
		&[ModelChange { position: 2, removed: 0, added: 1 }],
		"insertion is announced at its projection position, past the tombstone"
	);
}

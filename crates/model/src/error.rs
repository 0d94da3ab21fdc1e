use thiserror::Error;

/// Errors that can occur when validating an [`crate::ItemHandle`].
///
/// These cover handles that no longer (or never did) name a wrapper owned
/// by the list. Contract violations by trusted callers (releasing more
/// than was held, or an upstream notification with out-of-range indices)
/// are not represented here; those panic at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
	/// The handle's generation no longer matches its slot (the wrapper was
	/// finalized, or the list was torn down and the slot reused).
	#[error("stale handle: wrapper was already finalized")]
	StaleHandle,
	/// The slot index is out of bounds for this list (handle from a
	/// different list, or a corrupted handle).
	#[error("invalid handle: slot index out of bounds")]
	InvalidIndex,
}

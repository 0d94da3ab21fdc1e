//! Retained projection list over an externally mutated ordered collection.
//!
//! A [`RetainedList`] mirrors an upstream ordered collection while letting
//! consumers keep a stable [`ItemHandle`] to an entry past its upstream
//! removal. A held entry stays in the projection as a *tombstone* until the
//! consumer balances every [`RetainedList::hold`] with a
//! [`RetainedList::release`]; only then is it unlinked and announced as
//! removed.
//!
//! # Architecture
//!
//! ```text
//! upstream changed(pos, removed, added)
//!         │
//!         ▼
//! RetainedList::source_changed          WrapperArena
//! ┌───────────────────────────┐         ┌──────────────────────┐
//! │ live: Vec<slot>           │◄───────►│ generational slots   │
//! │ head/tail + prev/next     │         │ value, holds, removed│
//! │ removal/insert translation│         └──────────────────────┘
//! └───────────────────────────┘
//!         │
//!         ▼
//! subscribers: changed(pos, removed, added)
//! ```
//!
//! The projection exposes the same ordered/indexable/change-notification
//! shape as its upstream, so consumers can treat it as a drop-in view of
//! the source collection.
//!
//! Single-threaded by design: one logical owner drives every mutation and
//! every notification fires inline on that owner's context.

/// Wrapper slot arena with generational handles.
mod arena;
/// Handle validation errors.
mod error;
/// Change notifications and listener registry.
mod events;
/// The retained list orchestrator.
mod list;

pub use arena::ItemHandle;
pub use error::HandleError;
pub use events::{ModelChange, SubscriptionId};
pub use list::RetainedList;

use std::rc::Rc;

use crate::{
	AnyService,
	Container,
};

/// Type-erased constructor stored for lazily-built services
pub(crate) type Factory = Rc<dyn Fn(&Container) -> anyhow::Result<AnyService>>;

/// A single slot in the container
pub(crate) enum ServiceEntry {
	/// Registered eagerly. The value is returned as-is.
	Instance(AnyService),

	/// Registered lazily and not constructed yet.
	Factory(Factory),

	/// The factory is running further up the call stack. The token identifies this particular
	/// construction so a replaced or removed entry is never overwritten by a stale result.
	Constructing(u64),

	/// The factory has produced its value. This is authoritative from now on.
	Resolved(AnyService),
}

impl ServiceEntry {
	pub(crate) fn state(&self) -> EntryState {
		return match self {
			ServiceEntry::Instance(_) => EntryState::Instance,
			ServiceEntry::Factory(_) => EntryState::Pending,
			ServiceEntry::Constructing(_) => EntryState::Constructing,
			ServiceEntry::Resolved(_) => EntryState::Resolved,
		};
	}
}

/// Lifecycle state of a registered key, as observed from outside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
	Instance,
	Pending,
	Constructing,
	Resolved,
}

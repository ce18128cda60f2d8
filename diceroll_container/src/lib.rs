// Mods
mod any_service;
mod container;
mod entry;


// Re-exports
pub use any_service::{
	AnyService,
	downcast_service,
};
pub use container::{
	Container,
	ContainerError,
};
pub use entry::EntryState;

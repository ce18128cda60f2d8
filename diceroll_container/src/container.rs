use std::{
	any::Any,
	cell::{
		Cell,
		RefCell,
	},
	fmt,
	rc::Rc,
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{
	debug,
	trace,
	warn,
};

use crate::{
	any_service::{
		downcast_service,
		AnyService,
	},
	entry::{
		EntryState,
		Factory,
		ServiceEntry,
	},
};

/// An error returned when resolving a service
#[derive(Debug, Error)]
pub enum ContainerError {
	#[error("service \"{0}\" is not registered")]
	NotFound(String),

	#[error("service \"{key}\" is not a {expected}")]
	TypeMismatch {
		key: String,
		expected: &'static str,
	},

	/// A factory requested its own key (directly or through other factories) before it
	/// finished constructing.
	#[error("service \"{0}\" depends on itself")]
	CircularDependency(String),

	/// Whatever the factory returned, passed through untouched.
	#[error(transparent)]
	Factory(anyhow::Error),
}


/// # Lazy singleton registry.
///
/// The `Container` maps string keys to services. A service is either handed over fully built
/// through [`Container::register_instance`], or described by a factory through
/// [`Container::register`] that runs the first time somebody asks for the key. Factories
/// receive the container itself, so they can pull in their own dependencies with
/// [`Container::get`]. Registration order does not matter, only the order of the first `get`.
///
/// ## Ownership
///
/// Services are stored as `Rc<dyn Any>` and resolution hands out clones of that `Rc`, so every
/// caller sees the same allocation. Removing or clearing entries drops only the container's
/// reference; no cleanup hooks are run.
///
/// ## Threading
///
/// The container is single-threaded (`!Send`, `!Sync`). No internal borrow is held while a
/// factory runs, so factories may call back into the container freely.
pub struct Container {
	entries: RefCell<FxHashMap<String, ServiceEntry>>,
	next_token: Cell<u64>,
}

impl Container {

	/// Creates an empty container
	pub fn new() -> Container {
		return Container {
			entries: RefCell::new(FxHashMap::default()),
			next_token: Cell::new(0),
		};
	}

	/// Stores an already-built service under `key`, replacing anything registered there before.
	pub fn register_instance<T: Any>(&self, key: impl Into<String>, value: T) {
		self.register_shared(key, Rc::new(value));
	}

	/// Stores a service the caller already holds an `Rc` to. Resolving `key` afterwards yields
	/// the very same allocation.
	pub fn register_shared<T: Any>(&self, key: impl Into<String>, value: Rc<T>) {
		let key = key.into();
		debug!(key = %key, "registered instance");
		self.insert(key, ServiceEntry::Instance(value));
	}

	/// Stores a factory under `key`, replacing anything registered there before. Nothing is
	/// constructed until the key is first resolved.
	pub fn register<T, F>(&self, key: impl Into<String>, factory: F)
	where
		T: Any,
		F: Fn(&Container) -> anyhow::Result<T> + 'static,
	{
		let key = key.into();
		let factory: Factory = Rc::new(move |container: &Container| -> anyhow::Result<AnyService> {
			let service = factory(container)?;
			return Ok(Rc::new(service) as AnyService);
		});
		debug!(key = %key, "registered factory");
		self.insert(key, ServiceEntry::Factory(factory));
	}

	/// Resolves `key` and casts the result to `T`.
	///
	/// A factory runs at most once successfully; afterwards its cached value is returned. A
	/// factory error is returned as-is and leaves the factory in place, so the next call runs
	/// it again. The same holds if the factory panics and the panic is caught. A type mismatch
	/// does not affect the stored entry.
	pub fn get<T: Any>(&self, key: &str) -> Result<Rc<T>, ContainerError> {
		let service = self.get_any(key)?;
		return downcast_service(key, service);
	}

	/// Resolves `key` without assuming anything about the type of the service.
	pub fn get_any(&self, key: &str) -> Result<AnyService, ContainerError> {
		let (token, factory) = {
			let mut entries = self.entries.borrow_mut();
			let entry = match entries.get_mut(key) {
				Some(entry) => entry,
				None => return Err(ContainerError::NotFound(String::from(key))),
			};
			let factory = match &*entry {
				ServiceEntry::Instance(service) | ServiceEntry::Resolved(service) => {
					trace!(key, "resolved from cache");
					return Ok(Rc::clone(service));
				},
				ServiceEntry::Constructing(_) => {
					warn!(key, "circular dependency detected");
					return Err(ContainerError::CircularDependency(String::from(key)));
				},
				ServiceEntry::Factory(factory) => Rc::clone(factory),
			};
			let token = self.take_token();
			*entry = ServiceEntry::Constructing(token);
			(token, factory)
		};

		// The map is not borrowed here, so the factory can resolve its own dependencies
		debug!(key, "constructing service");
		let guard = ConstructionGuard {
			container: self,
			key,
			token,
			factory: Some(Rc::clone(&factory)),
		};
		let result = factory(self);
		guard.disarm();

		let mut entries = self.entries.borrow_mut();
		let entry = entries.get_mut(key).filter(|entry| {
			matches!(entry, ServiceEntry::Constructing(current) if *current == token)
		});
		if entry.is_none() {
			debug!(key, "entry was replaced during construction; result not cached");
		}
		return match result {
			Ok(service) => {
				if let Some(entry) = entry {
					*entry = ServiceEntry::Resolved(Rc::clone(&service));
				}
				Ok(service)
			},
			Err(error) => {
				if let Some(entry) = entry {
					*entry = ServiceEntry::Factory(factory);
				}
				debug!(key, error = %error, "factory failed");
				Err(ContainerError::Factory(error))
			},
		};
	}

	/// Checks whether anything is registered under `key`. Never runs a factory.
	pub fn has(&self, key: &str) -> bool {
		return self.entries.borrow().contains_key(key);
	}

	/// Returns the lifecycle state of `key`, or `None` if it is not registered
	pub fn state(&self, key: &str) -> Option<EntryState> {
		return self.entries.borrow().get(key).map(ServiceEntry::state);
	}

	/// Checks whether `key` holds a built value, either an instance or a resolved factory
	pub fn is_resolved(&self, key: &str) -> bool {
		return matches!(self.state(key), Some(EntryState::Instance | EntryState::Resolved));
	}

	/// Deregisters `key` whatever its state. Absent keys are ignored.
	pub fn remove(&self, key: &str) {
		let removed = self.entries.borrow_mut().remove(key);
		if removed.is_some() {
			debug!(key, "removed service");
		}
		// Dropped after the borrow ends in case a service's destructor touches the container
		drop(removed);
	}

	/// Removes every entry, returning the container to its initial state
	pub fn clear(&self) {
		let removed = std::mem::take(&mut *self.entries.borrow_mut());
		debug!(count = removed.len(), "cleared container");
		drop(removed);
	}

	/// Number of registered keys
	pub fn len(&self) -> usize {
		return self.entries.borrow().len();
	}

	pub fn is_empty(&self) -> bool {
		return self.entries.borrow().is_empty();
	}

	/// Registered keys, sorted
	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
		keys.sort();
		return keys;
	}

	fn insert(&self, key: String, entry: ServiceEntry) {
		let replaced = self.entries.borrow_mut().insert(key, entry);
		drop(replaced);
	}

	fn take_token(&self) -> u64 {
		let token = self.next_token.get();
		self.next_token.set(token.wrapping_add(1));
		return token;
	}

}

/// Puts the factory back if it panics, so the key is not left in `Constructing` after the
/// panic is caught further up.
struct ConstructionGuard<'a> {
	container: &'a Container,
	key: &'a str,
	token: u64,
	factory: Option<Factory>,
}

impl ConstructionGuard<'_> {
	fn disarm(mut self) {
		self.factory = None;
	}
}

impl Drop for ConstructionGuard<'_> {
	fn drop(&mut self) {
		let factory = match self.factory.take() {
			Some(factory) => factory,
			None => return,
		};
		let mut entries = match self.container.entries.try_borrow_mut() {
			Ok(entries) => entries,
			Err(_) => return,
		};
		if let Some(entry) = entries.get_mut(self.key) {
			if matches!(entry, ServiceEntry::Constructing(current) if *current == self.token) {
				*entry = ServiceEntry::Factory(factory);
				warn!(key = self.key, "factory panicked; entry restored");
			}
		}
	}
}

impl Default for Container {
	fn default() -> Self {
		return Container::new();
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.entries.borrow();
		let mut keys: Vec<&String> = entries.keys().collect();
		keys.sort();
		return f.debug_map()
			.entries(keys.into_iter().map(|key| (key, entries[key].state())))
			.finish();
	}
}

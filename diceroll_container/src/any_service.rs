use std::{
	any::{
		Any,
		type_name,
	},
	rc::Rc,
};

use crate::ContainerError;


/// Type-erased service as stored by the container. The container never looks inside it;
/// callers pick the concrete type when resolving.
pub type AnyService = Rc<dyn Any>;

/// Casts a type-erased service back to `T`, keeping the original allocation so every cast of
/// the same service yields a pointer-equal `Rc`.
pub fn downcast_service<T: Any>(key: &str, service: AnyService) -> Result<Rc<T>, ContainerError> {
	return service.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
		key: String::from(key),
		expected: type_name::<T>(),
	});
}

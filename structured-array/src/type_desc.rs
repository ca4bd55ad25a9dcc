use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Runtime identity of an element type.
///
/// Two descriptors are equal when they name the same type; the name is only
/// carried along for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeDesc {
    id: TypeId,
    name: &'static str,
}

impl TypeDesc {
    /// Create a [`TypeDesc`] for a type.
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Get the underlying [`TypeId`].
    #[inline]
    pub fn id(self) -> TypeId {
        self.id
    }

    /// Full type name, as reported by [`core::any::type_name`].
    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Returns true if this descriptor names `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDesc {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDesc {}

impl Hash for TypeDesc {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

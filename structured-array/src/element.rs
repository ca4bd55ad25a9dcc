use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use bitflags::bitflags;

use crate::{
    ArgKind, ArrayError, ArrayView, Ctor, CtorFailure, ElementModel, SubArrayBuilder, SubPlan,
    cloned, defaulted,
};

/// A type that can live in a [`StructuredArray`](crate::StructuredArray).
///
/// Implementors list their constructible forms in [`Element::CTORS`] (this is
/// the registry the engine and providers look forms up in) and the data
/// members that region copy transfers in [`Element::FIELDS`]. Plain element
/// types hand out `&mut Self` for in-place mutation.
///
/// ```
/// use structured_array::{ArgKind, Ctor, Element, Field, cloned, defaulted, field};
///
/// #[derive(Clone, Default)]
/// struct Particle {
///     id: u64,
///     mass: f64,
/// }
///
/// impl Element for Particle {
///     const CTORS: &'static [Ctor<Self>] = &[
///         Ctor::new("default", &[], defaulted),
///         Ctor::new("copy", &[ArgKind::Source], cloned),
///         Ctor::new("new", &[ArgKind::UInt], |args| {
///             Ok(Particle { id: args.uint(0)?, mass: 1.0 })
///         }),
///     ];
///     const FIELDS: &'static [Field<Self>] = &[
///         field!(Particle, id, immutable),
///         field!(Particle, mass),
///     ];
///     type Mut<'a> = &'a mut Self;
/// }
/// ```
pub trait Element: Sized + Send + Sync + 'static {
    /// Constructible forms of this type. Signatures must be unique.
    const CTORS: &'static [Ctor<Self>];

    /// Data members copied by region copy, in declaration order.
    ///
    /// Field-wise copies refuse types whose list is empty.
    const FIELDS: &'static [Field<Self>];

    /// Mutable access to an element stored in an array.
    ///
    /// `&'a mut Self` for plain types. Sub-arrays use
    /// [`SubArrayMut`](crate::SubArrayMut), which reaches their elements
    /// but cannot replace the sub-array itself.
    type Mut<'a>: From<&'a mut Self>;

    /// Returns true if any field is immutable after construction.
    fn has_immutable_fields() -> bool {
        Self::FIELDS.iter().any(Field::is_immutable)
    }

    #[doc(hidden)]
    fn as_array_view(&self) -> Option<&dyn ArrayView> {
        None
    }

    #[doc(hidden)]
    fn accepts(element: &ElementModel) -> bool {
        matches!(element, ElementModel::Terminal(ty) if ty.is::<Self>())
    }

    #[doc(hidden)]
    fn sub_builder<'a>(
        _plan: SubPlan<'_>,
    ) -> Result<Option<Box<dyn SubArrayBuilder<'a, Self> + 'a>>, ArrayError> {
        Ok(None)
    }
}

bitflags! {
    /// Flags describing a [`Field`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// The field must not change after construction; region copy refuses
        /// to overwrite it unless explicitly allowed.
        const IMMUTABLE = 1 << 0;
    }
}

/// A copyable data member of an element type.
pub struct Field<T> {
    name: &'static str,
    flags: FieldFlags,
    copy: fn(&mut T, &T),
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish()
    }
}

impl<T> Field<T> {
    /// Declare a field with the function that copies it from `src` to `dst`.
    pub const fn new(name: &'static str, copy: fn(&mut T, &T)) -> Self {
        Self {
            name,
            flags: FieldFlags::empty(),
            copy,
        }
    }

    /// Mark the field immutable after construction.
    pub const fn immutable(self) -> Self {
        Self {
            flags: self.flags.union(FieldFlags::IMMUTABLE),
            ..self
        }
    }

    /// Name of the field.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Flags of the field.
    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Returns true if the field is immutable after construction.
    #[inline]
    pub fn is_immutable(&self) -> bool {
        self.flags.contains(FieldFlags::IMMUTABLE)
    }

    /// Copy this field from `src` into `dst`.
    #[inline]
    pub fn copy(&self, dst: &mut T, src: &T) {
        (self.copy)(dst, src)
    }
}

/// Declare a [`Field`] that copies `$name` with [`Clone::clone_from`].
///
/// Append `immutable` to mark the field immutable after construction.
#[macro_export]
macro_rules! field {
    ($ty:ty, $name:ident) => {
        $crate::Field::<$ty>::new(::core::stringify!($name), |dst: &mut $ty, src: &$ty| {
            ::core::clone::Clone::clone_from(&mut dst.$name, &src.$name)
        })
    };
    ($ty:ty, $name:ident, immutable) => {
        $crate::field!($ty, $name).immutable()
    };
}

macro_rules! impl_element_integer {
    ($kind:ident, $accessor:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                const CTORS: &'static [Ctor<Self>] = &[
                    Ctor::new("default", &[], defaulted),
                    Ctor::new("copy", &[ArgKind::Source], cloned),
                    Ctor::new("new", &[ArgKind::$kind], |args| {
                        <$ty>::try_from(args.$accessor(0)?).map_err(|_| {
                            CtorFailure::new(concat!("value out of range for ", stringify!($ty)))
                        })
                    }),
                ];
                const FIELDS: &'static [Field<Self>] =
                    &[Field::new("value", |dst, src| *dst = *src)];
                type Mut<'a> = &'a mut Self;
            }
        )*
    };
}

impl_element_integer!(Int, int => i8, i16, i32, i64, isize);
impl_element_integer!(UInt, uint => u8, u16, u32, u64, usize);

macro_rules! impl_element_float {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                const CTORS: &'static [Ctor<Self>] = &[
                    Ctor::new("default", &[], defaulted),
                    Ctor::new("copy", &[ArgKind::Source], cloned),
                    Ctor::new("new", &[ArgKind::Float], |args| Ok(args.float(0)? as $ty)),
                ];
                const FIELDS: &'static [Field<Self>] =
                    &[Field::new("value", |dst, src| *dst = *src)];
                type Mut<'a> = &'a mut Self;
            }
        )*
    };
}

impl_element_float!(f32, f64);

impl Element for bool {
    const CTORS: &'static [Ctor<Self>] = &[
        Ctor::new("default", &[], defaulted),
        Ctor::new("copy", &[ArgKind::Source], cloned),
        Ctor::new("new", &[ArgKind::Bool], |args| args.bool(0)),
    ];
    const FIELDS: &'static [Field<Self>] = &[Field::new("value", |dst, src| *dst = *src)];
    type Mut<'a> = &'a mut Self;
}

impl Element for String {
    const CTORS: &'static [Ctor<Self>] = &[
        Ctor::new("default", &[], defaulted),
        Ctor::new("copy", &[ArgKind::Source], cloned),
        Ctor::new("new", &[ArgKind::Str], |args| Ok(String::from(args.str(0)?))),
    ];
    const FIELDS: &'static [Field<Self>] = &[Field::new("value", |dst, src| dst.clone_from(src))];
    type Mut<'a> = &'a mut Self;
}

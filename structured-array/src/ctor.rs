//! Constructible forms and construction descriptors.
//!
//! A [`Ctor`] is one way of making a `T`: a name, the kinds of arguments it
//! takes, and a function. A [`CtorAndArgs`] pairs a form with concrete
//! arguments and is what providers hand to the construction engine for every
//! element.

use alloc::borrow::Cow;
use alloc::string::String;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use smallvec::SmallVec;

use crate::{ArrayError, Element, TypeDesc};

/// Kind of a constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// String.
    Str,
    /// Reference to an existing value to copy from.
    Source,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Int => "int",
            ArgKind::UInt => "uint",
            ArgKind::Float => "float",
            ArgKind::Bool => "bool",
            ArgKind::Str => "str",
            ArgKind::Source => "source",
        };
        f.write_str(name)
    }
}

/// A constructor argument.
#[derive(Clone)]
pub enum Arg<'a> {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// String.
    Str(Cow<'a, str>),
    /// Reference to an existing value to copy from.
    Source(&'a (dyn Any + Send + Sync)),
}

impl Arg<'_> {
    /// Kind of this argument.
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Int(_) => ArgKind::Int,
            Arg::UInt(_) => ArgKind::UInt,
            Arg::Float(_) => ArgKind::Float,
            Arg::Bool(_) => ArgKind::Bool,
            Arg::Str(_) => ArgKind::Str,
            Arg::Source(_) => ArgKind::Source,
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => write!(f, "Int({v})"),
            Arg::UInt(v) => write!(f, "UInt({v})"),
            Arg::Float(v) => write!(f, "Float({v})"),
            Arg::Bool(v) => write!(f, "Bool({v})"),
            Arg::Str(v) => write!(f, "Str({v:?})"),
            Arg::Source(_) => write!(f, "Source(..)"),
        }
    }
}

impl From<i64> for Arg<'_> {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<u64> for Arg<'_> {
    fn from(value: u64) -> Self {
        Arg::UInt(value)
    }
}

impl From<f64> for Arg<'_> {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg<'_> {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Arg<'_> {
    fn from(value: String) -> Self {
        Arg::Str(Cow::Owned(value))
    }
}

/// Error returned by constructor functions.
///
/// The engine wraps it into [`ArrayError::ConstructorFailed`] together with
/// the type and form that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorFailure(pub String);

impl CtorFailure {
    /// Create a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for CtorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for CtorFailure {}

/// The argument list of a construction descriptor.
#[derive(Clone, Debug, Default)]
pub struct Args<'a>(SmallVec<[Arg<'a>; 4]>);

impl<'a> Args<'a> {
    /// An empty argument list.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Append an argument.
    pub fn push(&mut self, arg: impl Into<Arg<'a>>) {
        self.0.push(arg.into());
    }

    /// Append an argument, builder style.
    pub fn with(mut self, arg: impl Into<Arg<'a>>) -> Self {
        self.push(arg);
        self
    }

    /// A single `Source` argument pointing at `source`.
    pub fn source(source: &'a (dyn Any + Send + Sync)) -> Self {
        Self::new().with(Arg::Source(source))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kinds of all arguments, in order.
    pub fn kinds(&self) -> SmallVec<[ArgKind; 4]> {
        self.0.iter().map(Arg::kind).collect()
    }

    /// Copy of these arguments with a shorter borrow lifetime.
    pub fn reborrow<'b>(&self) -> Args<'b>
    where
        'a: 'b,
    {
        self.0.iter().map(|arg| -> Arg<'b> { arg.clone() }).collect()
    }

    /// Argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Arg<'a>> {
        self.0.get(index)
    }

    fn missing(index: usize, kind: ArgKind) -> CtorFailure {
        CtorFailure(alloc::format!("argument {index} is not a {kind}"))
    }

    /// Signed integer argument at `index`.
    pub fn int(&self, index: usize) -> Result<i64, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::Int(v)) => Ok(*v),
            _ => Err(Self::missing(index, ArgKind::Int)),
        }
    }

    /// Unsigned integer argument at `index`.
    pub fn uint(&self, index: usize) -> Result<u64, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::UInt(v)) => Ok(*v),
            _ => Err(Self::missing(index, ArgKind::UInt)),
        }
    }

    /// Floating point argument at `index`.
    pub fn float(&self, index: usize) -> Result<f64, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::Float(v)) => Ok(*v),
            _ => Err(Self::missing(index, ArgKind::Float)),
        }
    }

    /// Boolean argument at `index`.
    pub fn bool(&self, index: usize) -> Result<bool, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::Bool(v)) => Ok(*v),
            _ => Err(Self::missing(index, ArgKind::Bool)),
        }
    }

    /// String argument at `index`.
    pub fn str(&self, index: usize) -> Result<&str, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::Str(v)) => Ok(&**v),
            _ => Err(Self::missing(index, ArgKind::Str)),
        }
    }

    /// Source argument at `index`, downcast to `T`.
    pub fn source_as<T: Any>(&self, index: usize) -> Result<&'a T, CtorFailure> {
        match self.0.get(index) {
            Some(Arg::Source(source)) => {
                let source: &'a (dyn Any + Send + Sync) = *source;
                source.downcast_ref::<T>().ok_or_else(|| {
                    CtorFailure(alloc::format!(
                        "argument {index} is not a {}",
                        TypeDesc::of::<T>()
                    ))
                })
            }
            _ => Err(Self::missing(index, ArgKind::Source)),
        }
    }
}

impl<'a, const N: usize> From<[Arg<'a>; N]> for Args<'a> {
    fn from(args: [Arg<'a>; N]) -> Self {
        Self(args.into_iter().collect())
    }
}

impl<'a> FromIterator<Arg<'a>> for Args<'a> {
    fn from_iter<I: IntoIterator<Item = Arg<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Function that performs a construction from an argument list.
pub type CtorFn<T> = for<'a> fn(&Args<'a>) -> Result<T, CtorFailure>;

/// A constructible form of `T`: a named constructor with a fixed argument
/// signature.
pub struct Ctor<T> {
    name: &'static str,
    signature: &'static [ArgKind],
    construct: CtorFn<T>,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Clone for Ctor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ctor<T> {}

impl<T> fmt::Debug for Ctor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctor")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

impl<T> Ctor<T> {
    /// Declare a constructible form.
    pub const fn new(
        name: &'static str,
        signature: &'static [ArgKind],
        construct: CtorFn<T>,
    ) -> Self {
        Self {
            name,
            signature,
            construct,
            _ty: PhantomData,
        }
    }

    /// Name of the form.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Argument kinds the form accepts.
    #[inline]
    pub fn signature(&self) -> &'static [ArgKind] {
        self.signature
    }
}

impl<T: Element> Ctor<T> {
    /// The type this form constructs.
    pub fn declaring(&self) -> TypeDesc {
        TypeDesc::of::<T>()
    }

    /// Find the form of `T` accepting exactly `signature`.
    pub fn lookup(signature: &[ArgKind]) -> Result<Self, ArrayError> {
        T::CTORS
            .iter()
            .find(|ctor| ctor.signature == signature)
            .copied()
            .ok_or_else(|| ArrayError::NoSuchConstructor {
                ty: TypeDesc::of::<T>(),
                signature: signature.iter().copied().collect(),
            })
    }

    /// The zero-argument form of `T`.
    pub fn default_ctor() -> Result<Self, ArrayError> {
        Self::lookup(&[])
    }

    /// The copy form of `T`, taking a single [`ArgKind::Source`].
    pub fn copy_ctor() -> Result<Self, ArrayError> {
        Self::lookup(&[ArgKind::Source])
    }
}

/// Zero-argument construction through [`Default`].
pub fn defaulted<T: Default>(_args: &Args<'_>) -> Result<T, CtorFailure> {
    Ok(T::default())
}

/// Copy construction through [`Clone`] from a `Source` argument.
pub fn cloned<T: Clone + Any>(args: &Args<'_>) -> Result<T, CtorFailure> {
    args.source_as::<T>(0).cloned()
}

/// A construction descriptor: a constructible form plus its arguments.
pub struct CtorAndArgs<'a, T> {
    ctor: Ctor<T>,
    args: Args<'a>,
}

impl<T> Clone for CtorAndArgs<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ctor: self.ctor,
            args: self.args.clone(),
        }
    }
}

impl<T> fmt::Debug for CtorAndArgs<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtorAndArgs")
            .field("ctor", &self.ctor)
            .field("args", &self.args)
            .finish()
    }
}

impl<'a, T> CtorAndArgs<'a, T> {
    /// Pair a form with arguments.
    pub fn new(ctor: Ctor<T>, args: Args<'a>) -> Self {
        Self { ctor, args }
    }

    /// The constructible form.
    pub fn ctor(&self) -> &Ctor<T> {
        &self.ctor
    }

    /// The arguments.
    pub fn args(&self) -> &Args<'a> {
        &self.args
    }

    /// Copy of this descriptor with a shorter borrow lifetime.
    pub fn reborrow<'b>(&self) -> CtorAndArgs<'b, T>
    where
        'a: 'b,
    {
        CtorAndArgs::new(self.ctor, self.args.reborrow())
    }

    /// Replace the arguments, keeping the form.
    pub fn set_args(&mut self, args: Args<'a>) {
        self.args = args;
    }
}

impl<'a, T: Element> CtorAndArgs<'a, T> {
    /// The zero-argument form of `T` with no arguments.
    pub fn default_for() -> Result<Self, ArrayError> {
        Ok(Self::new(Ctor::default_ctor()?, Args::new()))
    }

    /// The copy form of `T`, copying from `source`.
    pub fn copy_of(source: &'a T) -> Result<Self, ArrayError> {
        Ok(Self::new(Ctor::copy_ctor()?, Args::source(source)))
    }

    /// Check the arguments against the form's signature.
    pub(crate) fn check_signature(&self) -> Result<(), ArrayError> {
        let found = self.args.kinds();
        if found.as_slice() == self.ctor.signature {
            Ok(())
        } else {
            Err(ArrayError::ArgumentMismatch {
                ty: TypeDesc::of::<T>(),
                ctor: self.ctor.name,
                expected: self.ctor.signature,
                found,
            })
        }
    }

    /// Run the constructor.
    pub(crate) fn construct(&self) -> Result<T, ArrayError> {
        self.check_signature()?;
        (self.ctor.construct)(&self.args).map_err(|failure| ArrayError::ConstructorFailed {
            ty: TypeDesc::of::<T>(),
            ctor: self.ctor.name,
            message: failure.0,
        })
    }
}

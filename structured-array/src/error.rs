use alloc::string::String;
use core::fmt;

use smallvec::SmallVec;

use crate::{ArgKind, TypeDesc};

/// Errors that can occur when building or copying structured arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayError {
    /// The element type a builder level produces does not match the model.
    ElementTypeMismatch {
        /// Element of the model, rendered for diagnostics.
        expected: String,
        /// Element type the builder level produces.
        found: TypeDesc,
    },

    /// A nested builder level was built for a different model than the one
    /// its parent expects.
    ModelMismatch {
        /// Model expected by the parent level.
        expected: String,
        /// Model of the nested builder.
        found: String,
    },

    /// The builder chain and the model have a different number of levels.
    DepthMismatch {
        /// Depth of the model at the failing level.
        model: usize,
        /// Depth of the builder chain at the failing level.
        builder: usize,
    },

    /// A length does not fit in addressable memory.
    LengthTooLarge {
        /// The offending length.
        length: u64,
    },

    /// More copy regions were given than the source has nesting levels.
    TooManyRegions {
        /// Number of regions supplied.
        regions: usize,
        /// Nesting depth of the source.
        depth: usize,
    },

    /// A builder was used before `resolve()` was called on it.
    Unresolved,

    /// `offset + count` exceeds the length at some depth.
    RegionOutOfBounds {
        /// Nesting depth at which the region does not fit.
        depth: usize,
        /// Length of the array at that depth.
        length: u64,
        /// Start of the region.
        offset: u64,
        /// Number of elements in the region.
        count: u64,
    },

    /// An element index is past the end of an array.
    IndexOutOfBounds {
        /// The requested index.
        index: u64,
        /// Length of the array.
        length: u64,
    },

    /// No constructible form with the requested signature exists.
    NoSuchConstructor {
        /// The type that was searched.
        ty: TypeDesc,
        /// The requested signature.
        signature: SmallVec<[ArgKind; 4]>,
    },

    /// A descriptor's arguments do not match its constructor's signature.
    ArgumentMismatch {
        /// The type being constructed.
        ty: TypeDesc,
        /// Name of the constructible form.
        ctor: &'static str,
        /// Signature of the form.
        expected: &'static [ArgKind],
        /// Kinds of the supplied arguments.
        found: SmallVec<[ArgKind; 4]>,
    },

    /// A constructor function reported a failure.
    ConstructorFailed {
        /// The type being constructed.
        ty: TypeDesc,
        /// Name of the constructible form.
        ctor: &'static str,
        /// The constructor's own message.
        message: String,
    },

    /// A copy provider ran without a source cookie.
    MissingSource {
        /// Nesting depth of the provider.
        depth: usize,
    },

    /// A copy source is not of the type the copy expects.
    SourceMismatch {
        /// The type the copy expects.
        expected: TypeDesc,
    },

    /// Element storage could not be allocated.
    AllocFailed {
        /// Number of elements requested.
        length: u64,
    },

    /// Region copy between arrays of different element types.
    ElementTypesDiffer {
        /// Element type of the source.
        src: TypeDesc,
        /// Element type of the destination.
        dst: TypeDesc,
    },

    /// Region copy is only supported between flat arrays.
    NestedRegionCopy,

    /// A field-wise copy of an element type that declares no fields.
    NoFields {
        /// The element type.
        ty: TypeDesc,
    },

    /// Region copy would overwrite a field that is immutable after construction.
    ImmutableField {
        /// Element type declaring the field.
        ty: TypeDesc,
        /// Name of the field.
        field: &'static str,
    },
}

/// Broad classes of [`ArrayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Builder or model misconfiguration, detected before construction starts.
    Configuration,
    /// Offsets, counts or indices outside an array.
    Bounds,
    /// Failure while constructing elements; the build is abandoned.
    Construction,
    /// Copies between incompatible arrays or element types.
    Type,
    /// Region copy onto protected fields.
    Protection,
}

impl ArrayError {
    /// The class this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ArrayError::ElementTypeMismatch { .. }
            | ArrayError::ModelMismatch { .. }
            | ArrayError::DepthMismatch { .. }
            | ArrayError::LengthTooLarge { .. }
            | ArrayError::TooManyRegions { .. }
            | ArrayError::Unresolved => ErrorCategory::Configuration,
            ArrayError::RegionOutOfBounds { .. } | ArrayError::IndexOutOfBounds { .. } => {
                ErrorCategory::Bounds
            }
            ArrayError::NoSuchConstructor { .. }
            | ArrayError::ArgumentMismatch { .. }
            | ArrayError::ConstructorFailed { .. }
            | ArrayError::MissingSource { .. }
            | ArrayError::SourceMismatch { .. }
            | ArrayError::AllocFailed { .. } => ErrorCategory::Construction,
            ArrayError::ElementTypesDiffer { .. }
            | ArrayError::NestedRegionCopy
            | ArrayError::NoFields { .. } => ErrorCategory::Type,
            ArrayError::ImmutableField { .. } => ErrorCategory::Protection,
        }
    }
}

struct Signature<'a>(&'a [ArgKind]);

impl fmt::Display for Signature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayError::ElementTypeMismatch { expected, found } => {
                write!(
                    f,
                    "Element type mismatch: model expects {expected}, but the builder produces {found}"
                )
            }
            ArrayError::ModelMismatch { expected, found } => {
                write!(f, "Model mismatch: expected {expected}, but the builder builds {found}")
            }
            ArrayError::DepthMismatch { model, builder } => {
                write!(
                    f,
                    "Nesting depth mismatch: model has {model} level(s), builder has {builder}"
                )
            }
            ArrayError::LengthTooLarge { length } => {
                write!(f, "Length {length} does not fit in addressable memory")
            }
            ArrayError::TooManyRegions { regions, depth } => {
                write!(
                    f,
                    "{regions} source region(s) given, but the source nesting depth is only {depth}"
                )
            }
            ArrayError::Unresolved => write!(f, "Builder must be resolved before it is used"),
            ArrayError::RegionOutOfBounds {
                depth,
                length,
                offset,
                count,
            } => write!(
                f,
                "At nesting depth {depth}, length ({length}) is smaller than offset ({offset}) + count ({count})"
            ),
            ArrayError::IndexOutOfBounds { index, length } => {
                write!(f, "Index {index} out of bounds for length {length}")
            }
            ArrayError::NoSuchConstructor { ty, signature } => {
                write!(
                    f,
                    "No constructor {} found for {ty}",
                    Signature(signature.as_slice())
                )
            }
            ArrayError::ArgumentMismatch {
                ty,
                ctor,
                expected,
                found,
            } => write!(
                f,
                "Constructor {ty}::{ctor}{} called with arguments {}",
                Signature(expected),
                Signature(found.as_slice())
            ),
            ArrayError::ConstructorFailed { ty, ctor, message } => {
                write!(f, "Constructor {ty}::{ctor} failed: {message}")
            }
            ArrayError::MissingSource { depth } => {
                write!(f, "Copy at nesting depth {depth} has no source to copy from")
            }
            ArrayError::SourceMismatch { expected } => {
                write!(f, "Copy source is not a {expected}")
            }
            ArrayError::AllocFailed { length } => {
                write!(f, "Failed to allocate storage for {length} element(s)")
            }
            ArrayError::ElementTypesDiffer { src, dst } => {
                write!(f, "Only elements of the same type can be copied: {src} != {dst}")
            }
            ArrayError::NestedRegionCopy => write!(
                f,
                "Region copy is only supported for flat arrays (with no nested arrays)"
            ),
            ArrayError::NoFields { ty } => {
                write!(f, "{ty} declares no fields to copy")
            }
            ArrayError::ImmutableField { ty, field } => {
                write!(f, "Cannot copy onto immutable field {ty}::{field}")
            }
        }
    }
}

impl core::error::Error for ArrayError {}

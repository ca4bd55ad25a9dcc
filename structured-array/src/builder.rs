//! Builders: a model plus the providers that populate every level of it.

use alloc::boxed::Box;
use alloc::string::ToString;

use crate::engine;
use crate::{
    ArrayError, ArrayModel, ArrayView, ConstantCtorAndArgsProvider, ConstructionContext, CopyPolicy,
    CtorAndArgs, CtorAndArgsProvider, Element, Region, StructuredArray, trace,
};

/// Build plan for a [`StructuredArray<T>`].
///
/// A builder pairs an [`ArrayModel`] with a [`CtorAndArgsProvider`] for each
/// nesting level. It must be [resolved](Self::resolve) before it can drive a
/// build; a resolved builder is immutable and can drive any number of
/// independent builds, including concurrently from several threads.
pub struct ArrayBuilder<'a, T: Element> {
    model: ArrayModel,
    provider: Option<Box<dyn CtorAndArgsProvider<T> + 'a>>,
    sub: Option<Box<dyn SubArrayBuilder<'a, T> + 'a>>,
    container_ctor: Option<CtorAndArgs<'a, StructuredArray<T>>>,
    cookie: Option<&'a dyn ArrayView>,
    resolved: bool,
}

impl<'a, T: Element> ArrayBuilder<'a, T> {
    /// Builder for `length` terminal elements of `T`.
    pub fn new(length: u64) -> Self {
        Self::from_parts(ArrayModel::of::<T>(length), None)
    }

    /// Builder for an existing model, with default providers at every level.
    ///
    /// The model is checked against `T` by [`resolve`](Self::resolve).
    pub fn from_model(model: ArrayModel) -> Self {
        // a model that does not fit `T` gets no sub-builder and fails to resolve
        let sub = model
            .sub_model()
            .and_then(|sub_model| T::sub_builder(SubPlan::Default { model: sub_model }).ok())
            .flatten();
        Self::from_parts(model, sub)
    }

    pub(crate) fn from_parts(
        model: ArrayModel,
        sub: Option<Box<dyn SubArrayBuilder<'a, T> + 'a>>,
    ) -> Self {
        Self {
            model,
            provider: None,
            sub,
            container_ctor: None,
            cookie: None,
            resolved: false,
        }
    }

    /// The model this builder builds.
    pub fn model(&self) -> &ArrayModel {
        &self.model
    }

    /// Number of elements at this level.
    pub fn length(&self) -> u64 {
        self.model.length()
    }

    /// Returns true once [`resolve`](Self::resolve) succeeded.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Use `provider` for the elements of this level.
    pub fn element_provider(mut self, provider: impl CtorAndArgsProvider<T> + 'a) -> Self {
        self.provider = Some(Box::new(provider));
        self.resolved = false;
        self
    }

    /// Instantiate the array itself with `ctor_and_args` instead of the
    /// zero-argument form.
    pub fn container_ctor(mut self, ctor_and_args: CtorAndArgs<'a, StructuredArray<T>>) -> Self {
        self.container_ctor = Some(ctor_and_args);
        self.resolved = false;
        self
    }

    /// Attach the source cookie that copy providers read from.
    pub fn source_cookie(mut self, cookie: &'a dyn ArrayView) -> Self {
        self.cookie = Some(cookie);
        self.resolved = false;
        self
    }

    pub(crate) fn provider(&self) -> Result<&(dyn CtorAndArgsProvider<T> + 'a), ArrayError> {
        self.provider.as_deref().ok_or(ArrayError::Unresolved)
    }

    pub(crate) fn sub(&self) -> Option<&(dyn SubArrayBuilder<'a, T> + 'a)> {
        self.sub.as_deref()
    }

    pub(crate) fn container_ctor_ref(&self) -> Option<&CtorAndArgs<'a, StructuredArray<T>>> {
        self.container_ctor.as_ref()
    }

    pub(crate) fn cookie(&self) -> Option<&'a dyn ArrayView> {
        self.cookie
    }

    /// Validate every level against the model and freeze the builder.
    ///
    /// Calling this on an already resolved builder does nothing.
    pub fn resolve(mut self) -> Result<Self, ArrayError> {
        self.resolve_in_place(1)?;
        Ok(self)
    }

    pub(crate) fn resolve_in_place(&mut self, depth: usize) -> Result<(), ArrayError> {
        if self.resolved {
            return Ok(());
        }

        if !T::accepts(self.model.element()) {
            return Err(ArrayError::ElementTypeMismatch {
                expected: self.model.to_string(),
                found: crate::TypeDesc::of::<T>(),
            });
        }

        if usize::try_from(self.model.length()).is_err() {
            return Err(ArrayError::LengthTooLarge {
                length: self.model.length(),
            });
        }

        match (self.model.sub_model(), self.sub.as_deref_mut()) {
            (None, None) => {}
            (Some(sub_model), Some(sub)) => {
                if sub.model() != sub_model {
                    return Err(ArrayError::ModelMismatch {
                        expected: sub_model.to_string(),
                        found: sub.model().to_string(),
                    });
                }
                sub.resolve_in_place(depth + 1)?;
            }
            (model_sub, builder_sub) => {
                return Err(ArrayError::DepthMismatch {
                    model: depth + model_sub.map_or(0, ArrayModel::depth),
                    builder: depth + builder_sub.map_or(0, |sub| sub.model().depth()),
                });
            }
        }

        if self.provider.is_none() {
            self.provider = Some(Box::new(ConstantCtorAndArgsProvider::<T>::new()?));
        }

        trace!(model = %self.model, depth, "resolved builder level");
        self.resolved = true;
        Ok(())
    }

    /// Build one array from this builder.
    pub fn build(&self) -> Result<StructuredArray<T>, ArrayError> {
        StructuredArray::build(self)
    }
}

impl<'a, U: Element> ArrayBuilder<'a, StructuredArray<U>> {
    /// Builder for `length` sub-arrays, each built by `sub`.
    pub fn nested(sub: ArrayBuilder<'a, U>, length: u64) -> Self {
        let model = ArrayModel::nested(sub.model.clone(), length);
        Self::from_parts(model, Some(Box::new(sub)))
    }
}

impl<T: Element> core::fmt::Debug for ArrayBuilder<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArrayBuilder")
            .field("model", &self.model)
            .field("resolved", &self.resolved)
            .field("has_cookie", &self.cookie.is_some())
            .finish()
    }
}

/// The next nesting level of an [`ArrayBuilder`], with its element type
/// erased. `T` is the element type of the enclosing level, which is always a
/// `StructuredArray`.
#[doc(hidden)]
pub trait SubArrayBuilder<'a, T>: Send + Sync {
    /// Model of the sub-arrays.
    fn model(&self) -> &ArrayModel;

    /// Resolve this level and all deeper ones.
    fn resolve_in_place(&mut self, depth: usize) -> Result<(), ArrayError>;

    /// Build the sub-array at `parent.index()`.
    fn build_at(
        &self,
        ctor_and_args: &CtorAndArgs<'_, T>,
        parent: &ConstructionContext<'_>,
    ) -> Result<T, ArrayError>;
}

impl<'a, U: Element> SubArrayBuilder<'a, StructuredArray<U>> for ArrayBuilder<'a, U> {
    fn model(&self) -> &ArrayModel {
        &self.model
    }

    fn resolve_in_place(&mut self, depth: usize) -> Result<(), ArrayError> {
        ArrayBuilder::resolve_in_place(self, depth)
    }

    fn build_at(
        &self,
        ctor_and_args: &CtorAndArgs<'_, StructuredArray<U>>,
        parent: &ConstructionContext<'_>,
    ) -> Result<StructuredArray<U>, ArrayError> {
        engine::instantiate(self, Some(ctor_and_args), ConstructionContext::nested(parent))
    }
}

/// How [`Element::sub_builder`] should derive the builder of the next level.
#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum SubPlan<'p> {
    /// Default providers for every level of `model`.
    Default {
        /// Model of the sub-arrays.
        model: &'p ArrayModel,
    },
    /// Copy providers reading from the cookie.
    Copy {
        /// Model of the source sub-arrays.
        model: &'p ArrayModel,
        /// Regions for every depth, outermost first.
        regions: &'p [Region],
        /// Depth of the level to derive.
        depth: usize,
        /// Source offsets of all enclosing levels.
        offsets: &'p [u64],
        /// How terminal elements are copied.
        policy: CopyPolicy,
    },
}

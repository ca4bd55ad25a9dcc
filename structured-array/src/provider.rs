//! Element constructor providers.
//!
//! A provider is asked once per element, in ascending index order, for the
//! descriptor the element is constructed from.

use smallvec::SmallVec;

use crate::{
    ArrayError, ArrayView, Args, ConstructionContext, CopyPolicy, Ctor, CtorAndArgs, Element,
    StructuredArray, TypeDesc,
};

/// Supplies the construction descriptor for each element of one array level.
pub trait CtorAndArgsProvider<T: Element>: Send + Sync {
    /// Descriptor for the element at `ctx.index()`.
    fn for_context<'c>(
        &self,
        ctx: &ConstructionContext<'c>,
    ) -> Result<CtorAndArgs<'c, T>, ArrayError>;

    /// Hands back a descriptor after its element was constructed, so it can
    /// be reused for the next index.
    fn recycle(&self, _ctor_and_args: CtorAndArgs<'_, T>) {}
}

/// Returns the same descriptor for every element.
#[derive(Debug, Clone)]
pub struct ConstantCtorAndArgsProvider<T> {
    ctor_and_args: CtorAndArgs<'static, T>,
}

impl<T: Element> ConstantCtorAndArgsProvider<T> {
    /// Construct every element with `T`'s zero-argument form.
    pub fn new() -> Result<Self, ArrayError> {
        Ok(Self {
            ctor_and_args: CtorAndArgs::default_for()?,
        })
    }

    /// Construct every element with `ctor` and a copy of `args`.
    pub fn with_args(ctor: Ctor<T>, args: Args<'static>) -> Self {
        Self {
            ctor_and_args: CtorAndArgs::new(ctor, args),
        }
    }
}

impl<T: Element> CtorAndArgsProvider<T> for ConstantCtorAndArgsProvider<T> {
    fn for_context<'c>(
        &self,
        _ctx: &ConstructionContext<'c>,
    ) -> Result<CtorAndArgs<'c, T>, ArrayError> {
        Ok(self.ctor_and_args.reborrow())
    }
}

/// Chooses each element's arguments from its construction context.
///
/// `args` must be a pure function of the context (the index, the indices of
/// enclosing levels) so that builds are reproducible.
pub struct IndexedCtorAndArgsProvider<T, F> {
    ctor: Ctor<T>,
    args: F,
}

impl<T, F> IndexedCtorAndArgsProvider<T, F>
where
    T: Element,
    F: Fn(&ConstructionContext<'_>) -> Args<'static> + Send + Sync,
{
    /// Construct every element with `ctor`, using `args(ctx)` as arguments.
    pub fn new(ctor: Ctor<T>, args: F) -> Self {
        Self { ctor, args }
    }
}

impl<T, F> CtorAndArgsProvider<T> for IndexedCtorAndArgsProvider<T, F>
where
    T: Element,
    F: Fn(&ConstructionContext<'_>) -> Args<'static> + Send + Sync,
{
    fn for_context<'c>(
        &self,
        ctx: &ConstructionContext<'c>,
    ) -> Result<CtorAndArgs<'c, T>, ArrayError> {
        Ok(CtorAndArgs::new(self.ctor, (self.args)(ctx).reborrow()))
    }
}

/// Copies each element from the corresponding element of the source array
/// passed as the build's cookie.
///
/// `source_offsets[d]` is added to the index at depth `d` to find the source
/// element, so the element at index path `[i0, i1]` copies
/// `source[offset0 + i0][offset1 + i1]`.
#[derive(Debug, Clone)]
pub struct CopyCtorAndArgsProvider<T> {
    ctor: Ctor<T>,
    source_offsets: SmallVec<[u64; 4]>,
}

impl<T: Element> CopyCtorAndArgsProvider<T> {
    /// Copy with an explicit copy form (signature `[Source]`).
    pub fn new(ctor: Ctor<T>, source_offsets: &[u64]) -> Self {
        Self {
            ctor,
            source_offsets: source_offsets.iter().copied().collect(),
        }
    }

    /// Copy terminal elements according to `policy`.
    pub fn with_policy(policy: CopyPolicy, source_offsets: &[u64]) -> Result<Self, ArrayError> {
        Ok(Self::new(policy.element_ctor::<T>()?, source_offsets))
    }

    fn source_for<'c>(&self, ctx: &ConstructionContext<'c>) -> Result<&'c T, ArrayError> {
        let path = ctx.index_path();
        let depth = path.len() - 1;
        let mut view: &'c dyn ArrayView = ctx.cookie().ok_or(ArrayError::MissingSource { depth })?;

        for (level, index) in path.iter().enumerate() {
            let offset = self.source_offsets.get(level).copied().unwrap_or(0);
            let position = offset.saturating_add(*index);

            if level == depth {
                let array = view
                    .as_any()
                    .downcast_ref::<StructuredArray<T>>()
                    .ok_or(ArrayError::SourceMismatch {
                        expected: TypeDesc::of::<StructuredArray<T>>(),
                    })?;
                return array.try_get(position);
            }

            view = match view.sub_array(position) {
                Some(sub) => sub,
                None if position >= view.len() => {
                    return Err(ArrayError::IndexOutOfBounds {
                        index: position,
                        length: view.len(),
                    });
                }
                None => {
                    return Err(ArrayError::SourceMismatch {
                        expected: TypeDesc::of::<StructuredArray<T>>(),
                    });
                }
            };
        }

        Err(ArrayError::MissingSource { depth })
    }
}

impl<T: Element> CtorAndArgsProvider<T> for CopyCtorAndArgsProvider<T> {
    fn for_context<'c>(
        &self,
        ctx: &ConstructionContext<'c>,
    ) -> Result<CtorAndArgs<'c, T>, ArrayError> {
        let source = self.source_for(ctx)?;
        Ok(CtorAndArgs::new(self.ctor, Args::source(source)))
    }
}

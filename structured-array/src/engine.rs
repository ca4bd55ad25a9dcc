//! The construction engine: instantiates one array level and populates it,
//! recursing into sub-arrays depth-first.

use crate::placement::Slots;
use crate::{
    Arg, ArgKind, ArrayBuilder, ArrayError, ConstructionContext, CtorAndArgs, Element,
    StructuredArray, TypeDesc, debug, trace,
};

/// Build the array level described by `builder`.
///
/// `container` is the descriptor the enclosing level's provider chose for
/// this array; the top level passes `None` and falls back to the builder's
/// own container descriptor. Elements are constructed in ascending index
/// order, and every sub-array is completed before its successor starts.
pub(crate) fn instantiate<T: Element>(
    builder: &ArrayBuilder<'_, T>,
    container: Option<&CtorAndArgs<'_, StructuredArray<T>>>,
    mut ctx: ConstructionContext<'_>,
) -> Result<StructuredArray<T>, ArrayError> {
    match (container, builder.container_ctor_ref()) {
        (Some(container), _) => check_container(container)?,
        (None, Some(container)) => check_container(container)?,
        (None, None) => check_container(&CtorAndArgs::<StructuredArray<T>>::default_for()?)?,
    }

    let provider = builder.provider()?;
    let length = builder.length();
    let mut slots = Slots::allocate(length)?;

    debug!(
        model = %builder.model(),
        depth = ctx.depth(),
        "instantiating array level"
    );

    for index in 0..length {
        ctx.set_index(index);
        let ctor_and_args = provider.for_context(&ctx)?;
        trace!(index, ctor = ctor_and_args.ctor().name(), "constructing element");
        let element = match builder.sub() {
            Some(sub) => sub.build_at(&ctor_and_args, &ctx)?,
            None => ctor_and_args.construct()?,
        };
        provider.recycle(ctor_and_args);
        slots.place(index, element);
    }

    Ok(StructuredArray::from_parts(
        builder.model().clone(),
        slots.finish(),
    ))
}

/// Only the zero-argument form and the copy form of an array exist, and a
/// copy must be given an array of the same element type.
fn check_container<T: Element>(
    container: &CtorAndArgs<'_, StructuredArray<T>>,
) -> Result<(), ArrayError> {
    container.check_signature()?;
    match container.ctor().signature() {
        [] => Ok(()),
        [ArgKind::Source] => match container.args().get(0) {
            Some(Arg::Source(source)) if source.is::<StructuredArray<T>>() => Ok(()),
            _ => Err(ArrayError::SourceMismatch {
                expected: TypeDesc::of::<StructuredArray<T>>(),
            }),
        },
        signature => Err(ArrayError::NoSuchConstructor {
            ty: TypeDesc::of::<StructuredArray<T>>(),
            signature: signature.iter().copied().collect(),
        }),
    }
}

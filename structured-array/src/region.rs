//! Shallow region copy between flat arrays.
//!
//! Region copy transfers the [fields](crate::Element::FIELDS) of a run of
//! elements onto already constructed elements. It never constructs or drops
//! elements, so it only applies to arrays whose elements are not arrays.

use core::any::Any;
use core::ops::Range;

use crate::{ArrayError, Element, StructuredArray, TypeDesc, debug};

/// What region copy does with fields marked immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImmutableFields {
    /// Refuse to copy element types that have immutable fields.
    #[default]
    Protect,
    /// Overwrite immutable fields like any other.
    Overwrite,
}

/// Copy the fields of `count` elements of `src` starting at `src_offset` onto
/// the elements of `dst` starting at `dst_offset`.
///
/// Both arrays must be flat and hold the same element type. Element types
/// with immutable fields are refused; see [`shallow_copy_with`].
pub fn shallow_copy<S: Element, D: Element>(
    src: &StructuredArray<S>,
    src_offset: u64,
    dst: &mut StructuredArray<D>,
    dst_offset: u64,
    count: u64,
) -> Result<(), ArrayError> {
    shallow_copy_with(
        src,
        src_offset,
        dst,
        dst_offset,
        count,
        ImmutableFields::Protect,
    )
}

/// [`shallow_copy`] with explicit handling of immutable fields.
///
/// All checks run before any element is touched: element types, nesting,
/// declared and protected fields, then bounds. On error both arrays are unchanged.
pub fn shallow_copy_with<S: Element, D: Element>(
    src: &StructuredArray<S>,
    src_offset: u64,
    dst: &mut StructuredArray<D>,
    dst_offset: u64,
    count: u64,
    immutable: ImmutableFields,
) -> Result<(), ArrayError> {
    let dst_any: &mut dyn Any = dst;
    let Some(dst) = dst_any.downcast_mut::<StructuredArray<S>>() else {
        return Err(ArrayError::ElementTypesDiffer {
            src: element_desc(src),
            dst: TypeDesc::of::<D>(),
        });
    };

    check_flat(src)?;
    check_fields::<S>(immutable)?;
    let src_range = check_region(src.len(), src_offset, count)?;
    let dst_range = check_region(dst.len(), dst_offset, count)?;

    debug!(src_offset, dst_offset, count, "region copy");

    let dst = &mut dst.as_mut_slice()[dst_range];
    for (dst, src) in dst.iter_mut().zip(&src.as_slice()[src_range]) {
        copy_element(dst, src, false);
    }
    Ok(())
}

/// Copy the fields of `count` elements within one array, from `src_offset`
/// to `dst_offset`.
///
/// Overlapping regions are handled: the result is as if the source region
/// were first copied to a temporary buffer. Element types with immutable
/// fields are refused; see [`shallow_copy_within_with`].
pub fn shallow_copy_within<T: Element>(
    array: &mut StructuredArray<T>,
    src_offset: u64,
    dst_offset: u64,
    count: u64,
) -> Result<(), ArrayError> {
    shallow_copy_within_with(
        array,
        src_offset,
        dst_offset,
        count,
        ImmutableFields::Protect,
    )
}

/// [`shallow_copy_within`] with explicit handling of immutable fields.
pub fn shallow_copy_within_with<T: Element>(
    array: &mut StructuredArray<T>,
    src_offset: u64,
    dst_offset: u64,
    count: u64,
    immutable: ImmutableFields,
) -> Result<(), ArrayError> {
    check_flat(array)?;
    check_fields::<T>(immutable)?;
    let src = check_region(array.len(), src_offset, count)?;
    let dst = check_region(array.len(), dst_offset, count)?;

    if src.start == dst.start {
        return Ok(());
    }

    debug!(src_offset, dst_offset, count, "region copy within array");

    let elements = array.as_mut_slice();
    if src.start < dst.start && dst.start < src.end {
        // the head of the destination overlaps the tail of the source
        for i in (0..src.len()).rev() {
            let (from, to) = pair_mut(elements, src.start + i, dst.start + i);
            copy_element(to, from, true);
        }
    } else {
        for i in 0..src.len() {
            let (from, to) = pair_mut(elements, src.start + i, dst.start + i);
            copy_element(to, from, false);
        }
    }
    Ok(())
}

fn element_desc<T: Element>(array: &StructuredArray<T>) -> TypeDesc {
    array.element_type().unwrap_or(TypeDesc::of::<T>())
}

fn check_flat<T: Element>(array: &StructuredArray<T>) -> Result<(), ArrayError> {
    if array.model().sub_model().is_some() {
        return Err(ArrayError::NestedRegionCopy);
    }
    Ok(())
}

fn check_fields<T: Element>(immutable: ImmutableFields) -> Result<(), ArrayError> {
    if T::FIELDS.is_empty() {
        return Err(ArrayError::NoFields {
            ty: TypeDesc::of::<T>(),
        });
    }
    if immutable == ImmutableFields::Overwrite {
        return Ok(());
    }
    match T::FIELDS.iter().find(|field| field.is_immutable()) {
        Some(field) => Err(ArrayError::ImmutableField {
            ty: TypeDesc::of::<T>(),
            field: field.name(),
        }),
        None => Ok(()),
    }
}

fn check_region(length: u64, offset: u64, count: u64) -> Result<Range<usize>, ArrayError> {
    let out_of_bounds = || ArrayError::RegionOutOfBounds {
        depth: 0,
        length,
        offset,
        count,
    };
    let end = offset
        .checked_add(count)
        .filter(|end| *end <= length)
        .ok_or_else(out_of_bounds)?;
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(end).map_err(|_| out_of_bounds())?;
    Ok(start..end)
}

fn copy_element<T: Element>(dst: &mut T, src: &T, reverse: bool) {
    if reverse {
        for field in T::FIELDS.iter().rev() {
            field.copy(dst, src);
        }
    } else {
        for field in T::FIELDS {
            field.copy(dst, src);
        }
    }
}

/// Shared access to `src` and mutable access to `dst` of the same slice.
/// `src` and `dst` must differ.
fn pair_mut<T>(elements: &mut [T], src: usize, dst: usize) -> (&T, &mut T) {
    debug_assert_ne!(src, dst);
    if src < dst {
        let (head, tail) = elements.split_at_mut(dst);
        (&head[src], &mut tail[0])
    } else {
        let (head, tail) = elements.split_at_mut(src);
        (&tail[0], &mut head[dst])
    }
}

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Deref, Index};

use crate::engine;
use crate::{
    ArgKind, Args, ArrayBuilder, ArrayError, ArrayModel, ConstructionContext, Ctor,
    CtorAndArgsProvider, CtorFailure, Element, ElementModel, Field, SubArrayBuilder, SubPlan,
    TypeDesc,
};

/// A fixed-length array of `T`, built in place from per-element
/// construction descriptors.
///
/// `T` is either a plain [`Element`] or another `StructuredArray`, so
/// `StructuredArray<StructuredArray<u32>>` is a two-level array whose model
/// fixes the length of every sub-array. Arrays are only ever created by the
/// construction engine, through an [`ArrayBuilder`] or one of the shortcuts
/// below; once built their length never changes.
#[derive(PartialEq)]
pub struct StructuredArray<T> {
    model: ArrayModel,
    elements: Box<[T]>,
}

impl<T: Element> StructuredArray<T> {
    pub(crate) fn from_parts(model: ArrayModel, elements: Box<[T]>) -> Self {
        Self { model, elements }
    }

    /// An array of `length` elements, each built with `T`'s zero-argument
    /// form.
    pub fn new_instance(length: u64) -> Result<Self, ArrayError> {
        ArrayBuilder::new(length).resolve()?.build()
    }

    /// An array of any depth described by `model`, with zero-argument
    /// construction at every level.
    pub fn with_model(model: ArrayModel) -> Result<Self, ArrayError> {
        ArrayBuilder::from_model(model).resolve()?.build()
    }

    /// An array of `length` elements whose descriptors come from `provider`.
    pub fn with_provider(
        provider: impl CtorAndArgsProvider<T>,
        length: u64,
    ) -> Result<Self, ArrayError> {
        ArrayBuilder::new(length)
            .element_provider(provider)
            .resolve()?
            .build()
    }

    /// Build an array from a resolved builder.
    pub fn build(builder: &ArrayBuilder<'_, T>) -> Result<Self, ArrayError> {
        if !builder.is_resolved() {
            return Err(ArrayError::Unresolved);
        }
        engine::instantiate(builder, None, ConstructionContext::root(builder.cookie()))
    }

    /// Mutable access to the element at `index`.
    ///
    /// Plain elements come back as `&mut T`; sub-arrays as a
    /// [`SubArrayMut`], so the shape fixed by the model cannot change.
    pub fn get_mut(&mut self, index: u64) -> Option<T::Mut<'_>> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.elements.get_mut(index))
            .map(Into::into)
    }

    /// Iterates mutably over the elements in index order, with the same
    /// access as [`get_mut`](Self::get_mut).
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = T::Mut<'_>> {
        self.elements.iter_mut().map(Into::into)
    }
}

impl<T> StructuredArray<T> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> u64 {
        self.model.length()
    }

    /// Returns true if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The model this array was built from.
    #[inline]
    pub fn model(&self) -> &ArrayModel {
        &self.model
    }

    /// Type of the elements, or `None` if they are sub-arrays.
    pub fn element_type(&self) -> Option<TypeDesc> {
        self.model.element_type()
    }

    /// Element at `index`.
    pub fn get(&self, index: u64) -> Option<&T> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.elements.get(index))
    }

    /// Element at `index`, or an [`ArrayError::IndexOutOfBounds`].
    pub fn try_get(&self, index: u64) -> Result<&T, ArrayError> {
        self.get(index).ok_or(ArrayError::IndexOutOfBounds {
            index,
            length: self.len(),
        })
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> ElementIter<'_, T> {
        ElementIter {
            elements: &self.elements,
            cursor: 0,
        }
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }
}

impl<T> Index<u64> for StructuredArray<T> {
    type Output = T;

    fn index(&self, index: u64) -> &T {
        match self.get(index) {
            Some(element) => element,
            None => panic!("Index {index} out of bounds for length {}", self.len()),
        }
    }
}

impl<'a, T> IntoIterator for &'a StructuredArray<T> {
    type Item = &'a T;
    type IntoIter = ElementIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for StructuredArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredArray")
            .field("model", &format_args!("{}", self.model))
            .field("elements", &self.elements)
            .finish()
    }
}

/// Mutable access to a sub-array of a nested [`StructuredArray`].
///
/// Reads go through `Deref`. Writes reach the elements of the sub-array but
/// never the sub-array as a whole, so its length stays the one the outer
/// model records:
///
/// ```compile_fail
/// use structured_array::{ArrayModel, StructuredArray};
///
/// let model = ArrayModel::nested(ArrayModel::of::<u64>(4), 3);
/// let mut grid = StructuredArray::<StructuredArray<u64>>::with_model(model)?;
/// let mut row = grid.get_mut(0).unwrap();
/// *row = StructuredArray::new_instance(1)?;
/// # Ok::<(), structured_array::ArrayError>(())
/// ```
pub struct SubArrayMut<'a, U> {
    array: &'a mut StructuredArray<U>,
}

impl<'a, U> From<&'a mut StructuredArray<U>> for SubArrayMut<'a, U> {
    fn from(array: &'a mut StructuredArray<U>) -> Self {
        Self { array }
    }
}

impl<U: Element> SubArrayMut<'_, U> {
    /// Mutable access to the element at `index` of the sub-array.
    pub fn get_mut(&mut self, index: u64) -> Option<U::Mut<'_>> {
        self.array.get_mut(index)
    }

    /// Iterates mutably over the elements of the sub-array.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = U::Mut<'_>> {
        self.array.iter_mut()
    }
}

impl<U> Deref for SubArrayMut<'_, U> {
    type Target = StructuredArray<U>;

    fn deref(&self) -> &StructuredArray<U> {
        self.array
    }
}

impl<U: fmt::Debug> fmt::Debug for SubArrayMut<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.array, f)
    }
}

/// Iterator over the elements of a [`StructuredArray`] that can report its
/// position and be rewound.
#[derive(Debug)]
pub struct ElementIter<'a, T> {
    elements: &'a [T],
    cursor: usize,
}

impl<T> Clone for ElementIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements,
            cursor: self.cursor,
        }
    }
}

impl<T> ElementIter<'_, T> {
    /// Index of the element the next call to `next` returns.
    pub fn cursor(&self) -> u64 {
        self.cursor as u64
    }

    /// Rewind to the first element.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl<'a, T> Iterator for ElementIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let element = self.elements.get(self.cursor)?;
        self.cursor += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for ElementIter<'_, T> {}

impl<T> FusedIterator for ElementIter<'_, T> {}

/// Type-erased read access to an array of any element type.
///
/// This is what a build's source cookie is: copy providers walk it down to
/// the level they copy from and downcast there.
pub trait ArrayView: Any + Send + Sync {
    /// Model of the array.
    fn model(&self) -> &ArrayModel;

    /// Number of elements.
    fn len(&self) -> u64 {
        self.model().length()
    }

    /// Returns true if the array has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sub-array at `index`, or `None` if the index is out of bounds or
    /// the elements are not arrays.
    fn sub_array(&self, index: u64) -> Option<&dyn ArrayView>;

    /// The array as [`Any`], for downcasting to a concrete
    /// [`StructuredArray`].
    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

impl<T: Element> ArrayView for StructuredArray<T> {
    fn model(&self) -> &ArrayModel {
        &self.model
    }

    fn sub_array(&self, index: u64) -> Option<&dyn ArrayView> {
        self.get(index)?.as_array_view()
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

fn engine_only<U>(_args: &Args<'_>) -> Result<StructuredArray<U>, CtorFailure> {
    Err(CtorFailure::new(
        "arrays are instantiated by the construction engine",
    ))
}

impl<U: Element> Element for StructuredArray<U> {
    // Validated by the engine when it instantiates a level; the elements are
    // always placed by the engine itself.
    const CTORS: &'static [Ctor<Self>] = &[
        Ctor::new("new", &[], engine_only::<U>),
        Ctor::new("copy", &[ArgKind::Source], engine_only::<U>),
    ];
    // region copy rejects nested arrays before looking at fields
    const FIELDS: &'static [Field<Self>] = &[];
    type Mut<'a> = SubArrayMut<'a, U>;

    fn as_array_view(&self) -> Option<&dyn ArrayView> {
        Some(self)
    }

    fn accepts(element: &ElementModel) -> bool {
        matches!(element, ElementModel::Nested(sub) if U::accepts(sub.element()))
    }

    fn sub_builder<'a>(
        plan: SubPlan<'_>,
    ) -> Result<Option<Box<dyn SubArrayBuilder<'a, Self> + 'a>>, ArrayError> {
        let builder = match plan {
            SubPlan::Default { model } => ArrayBuilder::<'a, U>::from_model(model.clone()),
            SubPlan::Copy {
                model,
                regions,
                depth,
                offsets,
                policy,
            } => ArrayBuilder::<'a, U>::copy_level(model, regions, depth, offsets, policy)?,
        };
        Ok(Some(Box::new(builder)))
    }
}

use alloc::boxed::Box;
use core::fmt;

use smallvec::SmallVec;

use crate::{Element, TypeDesc};

/// Describes the structure of a [`StructuredArray`](crate::StructuredArray):
/// its length and what each element is.
///
/// Models are plain data. Two models are equal if their lengths, element
/// types and whole nesting chains are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayModel {
    element: ElementModel,
    length: u64,
}

/// What the elements of one array level are.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementModel {
    /// Elements are plain values of the given type.
    Terminal(TypeDesc),
    /// Elements are themselves arrays described by the boxed model.
    Nested(Box<ArrayModel>),
}

impl ArrayModel {
    /// Model of an array with terminal (non-array) elements.
    pub fn terminal(element: TypeDesc, length: u64) -> Self {
        Self {
            element: ElementModel::Terminal(element),
            length,
        }
    }

    /// Model of an array of `length` values of `T`.
    pub fn of<T: Element>(length: u64) -> Self {
        Self::terminal(TypeDesc::of::<T>(), length)
    }

    /// Model of an array whose elements are arrays described by `sub_model`.
    pub fn nested(sub_model: ArrayModel, length: u64) -> Self {
        Self {
            element: ElementModel::Nested(Box::new(sub_model)),
            length,
        }
    }

    /// Number of elements at this level.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// What the elements at this level are.
    #[inline]
    pub fn element(&self) -> &ElementModel {
        &self.element
    }

    /// Element type at this level, or `None` if the elements are arrays.
    pub fn element_type(&self) -> Option<TypeDesc> {
        match &self.element {
            ElementModel::Terminal(ty) => Some(*ty),
            ElementModel::Nested(_) => None,
        }
    }

    /// Model of the element arrays, or `None` at the deepest level.
    pub fn sub_model(&self) -> Option<&ArrayModel> {
        match &self.element {
            ElementModel::Terminal(_) => None,
            ElementModel::Nested(sub) => Some(sub),
        }
    }

    /// Iterates over this level and every nested level, outermost first.
    pub fn levels(&self) -> Levels<'_> {
        Levels { next: Some(self) }
    }

    /// Number of array levels; a flat array has depth 1.
    pub fn depth(&self) -> usize {
        self.levels().count()
    }

    /// Type of the values stored at the deepest level.
    pub fn leaf_type(&self) -> TypeDesc {
        let mut model = self;
        loop {
            match &model.element {
                ElementModel::Terminal(ty) => return *ty,
                ElementModel::Nested(sub) => model = sub,
            }
        }
    }

    /// Lengths of every level, outermost first.
    pub fn lengths(&self) -> SmallVec<[u64; 4]> {
        self.levels().map(ArrayModel::length).collect()
    }

    /// Total number of terminal elements, or `None` on overflow.
    pub fn leaf_count(&self) -> Option<u64> {
        self.levels()
            .try_fold(1u64, |acc, level| acc.checked_mul(level.length))
    }

    /// Returns true if `other` has the same element types at every depth,
    /// regardless of lengths.
    pub fn same_structure(&self, other: &ArrayModel) -> bool {
        match (&self.element, &other.element) {
            (ElementModel::Terminal(a), ElementModel::Terminal(b)) => a == b,
            (ElementModel::Nested(a), ElementModel::Nested(b)) => a.same_structure(b),
            _ => false,
        }
    }
}

impl fmt::Display for ArrayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            ElementModel::Terminal(ty) => write!(f, "[{}; {}]", ty, self.length),
            ElementModel::Nested(sub) => write!(f, "[{}; {}]", sub, self.length),
        }
    }
}

/// Iterator over the levels of an [`ArrayModel`], outermost first.
#[derive(Clone, Debug)]
pub struct Levels<'a> {
    next: Option<&'a ArrayModel>,
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a ArrayModel;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.sub_model();
        Some(current)
    }
}

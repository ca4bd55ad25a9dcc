//! Element storage that is filled strictly in index order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::ArrayError;

/// Storage for the elements of one array level, allocated up front and
/// filled one element at a time.
///
/// Dropping unfinished slots drops the elements placed so far, so a build
/// that fails halfway leaves nothing behind.
pub(crate) struct Slots<T> {
    elements: Vec<T>,
    length: usize,
}

impl<T> Slots<T> {
    pub(crate) fn allocate(length: u64) -> Result<Self, ArrayError> {
        let capacity = usize::try_from(length).map_err(|_| ArrayError::LengthTooLarge { length })?;
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(capacity)
            .map_err(|_| ArrayError::AllocFailed { length })?;
        Ok(Self {
            elements,
            length: capacity,
        })
    }

    /// Number of elements placed so far.
    #[inline]
    pub(crate) fn filled(&self) -> usize {
        self.elements.len()
    }

    /// Place the element for `index`, which must be the next unfilled slot.
    #[inline]
    pub(crate) fn place(&mut self, index: u64, element: T) {
        debug_assert_eq!(usize::try_from(index).ok(), Some(self.filled()));
        debug_assert!(self.filled() < self.length);
        self.elements.push(element);
    }

    pub(crate) fn finish(self) -> Box<[T]> {
        debug_assert_eq!(self.filled(), self.length);
        self.elements.into_boxed_slice()
    }
}

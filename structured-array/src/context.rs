use smallvec::SmallVec;

use crate::ArrayView;

/// Where in the array tree an element is being constructed.
///
/// The engine creates one context per array level per build. A context lives
/// only while its level is being populated and is handed to the level's
/// provider once per element, with [`index`](Self::index) set to the element
/// being built.
#[derive(Clone, Copy)]
pub struct ConstructionContext<'a> {
    index: u64,
    containing: Option<&'a ConstructionContext<'a>>,
    cookie: Option<&'a dyn ArrayView>,
}

impl<'a> ConstructionContext<'a> {
    pub(crate) fn root(cookie: Option<&'a dyn ArrayView>) -> Self {
        Self {
            index: 0,
            containing: None,
            cookie,
        }
    }

    /// Context for the sub-array currently being built at `parent`'s index.
    /// The cookie is inherited unchanged.
    pub(crate) fn nested(parent: &'a ConstructionContext<'a>) -> Self {
        Self {
            index: 0,
            containing: Some(parent),
            cookie: parent.cookie,
        }
    }

    #[inline]
    pub(crate) fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    /// Index of the element being constructed at this level.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Context of the enclosing level, or `None` at the top level.
    #[inline]
    pub fn containing_context(&self) -> Option<&'a ConstructionContext<'a>> {
        self.containing
    }

    /// The source cookie given to the top-level builder.
    #[inline]
    pub fn cookie(&self) -> Option<&'a dyn ArrayView> {
        self.cookie
    }

    /// Nesting depth of this level; the top level is 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut ctx = self.containing;
        while let Some(parent) = ctx {
            depth += 1;
            ctx = parent.containing;
        }
        depth
    }

    /// Indices of this element and all enclosing elements, outermost first.
    pub fn index_path(&self) -> SmallVec<[u64; 4]> {
        let mut path = SmallVec::new();
        path.push(self.index);
        let mut ctx = self.containing;
        while let Some(parent) = ctx {
            path.push(parent.index);
            ctx = parent.containing;
        }
        path.reverse();
        path
    }
}

impl core::fmt::Debug for ConstructionContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConstructionContext")
            .field("index_path", &self.index_path())
            .field("has_cookie", &self.cookie.is_some())
            .finish()
    }
}

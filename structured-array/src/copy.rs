//! Copy derivation: builders that reproduce (a region of) an existing array.

use alloc::string::ToString;

use smallvec::SmallVec;

use crate::{
    ArgKind, Args, ArrayBuilder, ArrayError, ArrayModel, CopyCtorAndArgsProvider, Ctor,
    CtorAndArgs, CtorFailure, Element, StructuredArray, SubPlan, TypeDesc, debug,
};

/// A contiguous range of one nesting level: `count` elements starting at
/// `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// First index of the region.
    pub offset: u64,
    /// Number of elements in the region.
    pub count: u64,
}

impl Region {
    /// A region of `count` elements starting at `offset`.
    pub const fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }

    /// The whole of a level with `length` elements.
    pub const fn full(length: u64) -> Self {
        Self::new(0, length)
    }

    /// One past the last index, or `None` on overflow.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.count)
    }

    fn fits(&self, length: u64) -> bool {
        self.end().is_some_and(|end| end <= length)
    }
}

/// How terminal elements are copied by a copy builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyPolicy {
    /// Use the element type's copy form (signature `[Source]`).
    #[default]
    CopyConstructor,
    /// Construct each element with its zero-argument form, then copy every
    /// entry of [`Element::FIELDS`] from the source element. Types that
    /// declare no fields are refused.
    FieldByField,
}

impl CopyPolicy {
    /// The copy form this policy uses for elements of `T`.
    pub fn element_ctor<T: Element>(self) -> Result<Ctor<T>, ArrayError> {
        match self {
            CopyPolicy::CopyConstructor => Ctor::copy_ctor(),
            CopyPolicy::FieldByField => {
                Ctor::<T>::default_ctor()?;
                if T::FIELDS.is_empty() {
                    return Err(ArrayError::NoFields {
                        ty: TypeDesc::of::<T>(),
                    });
                }
                Ok(Ctor::new("copy_fields", &[ArgKind::Source], copy_fields::<T>))
            }
        }
    }
}

fn copy_fields<T: Element>(args: &Args<'_>) -> Result<T, CtorFailure> {
    let source = args.source_as::<T>(0)?;
    let mut value = CtorAndArgs::<T>::default_for()
        .and_then(|ctor_and_args| ctor_and_args.construct())
        .map_err(|err| CtorFailure::new(err.to_string()))?;
    for field in T::FIELDS {
        field.copy(&mut value, source);
    }
    Ok(value)
}

impl<'a, T: Element> ArrayBuilder<'a, T> {
    /// A resolved builder that copies `source`.
    ///
    /// `regions[d]` selects the part of every array at depth `d` that is
    /// copied; depths without a region are copied whole. The resulting array
    /// has `regions[d].count` elements at depth `d`.
    pub fn copying(
        source: &'a StructuredArray<T>,
        regions: &[Region],
        policy: CopyPolicy,
    ) -> Result<Self, ArrayError> {
        let model = source.model();
        let depth = model.depth();
        if regions.len() > depth {
            return Err(ArrayError::TooManyRegions {
                regions: regions.len(),
                depth,
            });
        }

        for (level, (region, level_model)) in regions.iter().zip(model.levels()).enumerate() {
            if !region.fits(level_model.length()) {
                return Err(ArrayError::RegionOutOfBounds {
                    depth: level,
                    length: level_model.length(),
                    offset: region.offset,
                    count: region.count,
                });
            }
        }

        debug!(source = %model, regions = regions.len(), ?policy, "deriving copy builder");

        Self::copy_level(model, regions, 0, &[], policy)?
            .container_ctor(CtorAndArgs::copy_of(source)?)
            .source_cookie(source)
            .resolve()
    }

    /// Copy builder for the level at `depth` of a source described by
    /// `model`. `offsets` are the source offsets of the enclosing levels.
    pub(crate) fn copy_level(
        model: &ArrayModel,
        regions: &[Region],
        depth: usize,
        offsets: &[u64],
        policy: CopyPolicy,
    ) -> Result<Self, ArrayError> {
        let region = regions
            .get(depth)
            .copied()
            .unwrap_or(Region::full(model.length()));

        let mut source_offsets: SmallVec<[u64; 4]> = offsets.iter().copied().collect();
        source_offsets.push(region.offset);

        let (level_model, sub) = match model.sub_model() {
            Some(sub_model) => {
                let sub = T::sub_builder(SubPlan::Copy {
                    model: sub_model,
                    regions,
                    depth: depth + 1,
                    offsets: &source_offsets,
                    policy,
                })?;
                let element_model = sub
                    .as_ref()
                    .map_or_else(|| sub_model.clone(), |sub| sub.model().clone());
                (ArrayModel::nested(element_model, region.count), sub)
            }
            None => (ArrayModel::terminal(model.leaf_type(), region.count), None),
        };

        // sub-arrays are always copied whole by the engine; the policy only
        // decides how terminal elements are made
        let ctor = if sub.is_some() {
            Ctor::copy_ctor()?
        } else {
            policy.element_ctor::<T>()?
        };

        Ok(Self::from_parts(level_model, sub)
            .element_provider(CopyCtorAndArgsProvider::new(ctor, &source_offsets)))
    }
}

impl<T: Element> StructuredArray<T> {
    /// A deep copy of this array with the same model.
    pub fn copy_instance(&self) -> Result<Self, ArrayError> {
        self.copy_instance_with(&[], CopyPolicy::default())
    }

    /// A copy of `count` elements starting at `offset` of the outermost
    /// level. Nested levels are copied whole.
    pub fn copy_instance_region(&self, offset: u64, count: u64) -> Result<Self, ArrayError> {
        self.copy_instance_with(&[Region::new(offset, count)], CopyPolicy::default())
    }

    /// A copy of one region per nesting depth, outermost first.
    pub fn copy_instance_regions(&self, regions: &[Region]) -> Result<Self, ArrayError> {
        self.copy_instance_with(regions, CopyPolicy::default())
    }

    /// A copy of the given regions, copying terminal elements by `policy`.
    pub fn copy_instance_with(
        &self,
        regions: &[Region],
        policy: CopyPolicy,
    ) -> Result<Self, ArrayError> {
        ArrayBuilder::copying(self, regions, policy)?.build()
    }
}

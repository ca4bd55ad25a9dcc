use structured_array::{
    ArgKind, ArrayBuilder, ArrayError, ArrayModel, CopyCtorAndArgsProvider, CopyPolicy, Ctor,
    Element, ErrorCategory, Region, StructuredArray,
};
use structured_array_testhelpers::{IPanic, test};

use super::support::{Opaque, Particle, counting, grid, opaques, particles};

#[test]
fn full_copy_is_equal_and_independent() -> Result<(), IPanic> {
    let source = counting(10)?;
    let mut copy = source.copy_instance()?;
    assert_eq!(copy, source);
    assert_eq!(copy.model(), source.model());

    *copy.get_mut(0).unwrap() = 99;
    assert_eq!(source[0], 0);
    assert_eq!(copy[0], 99);
    Ok(())
}

#[test]
fn partial_copy() -> Result<(), IPanic> {
    let source = counting(10)?;
    let copy = source.copy_instance_region(3, 4)?;
    assert_eq!(copy.as_slice(), &[3, 4, 5, 6]);
    assert_eq!(copy.model(), &ArrayModel::of::<u64>(4));
    Ok(())
}

#[test]
fn empty_region() -> Result<(), IPanic> {
    let source = counting(10)?;
    let copy = source.copy_instance_region(10, 0)?;
    assert!(copy.is_empty());
    Ok(())
}

#[test]
fn region_past_the_end_is_rejected() -> Result<(), IPanic> {
    let source = counting(10)?;
    let err = source.copy_instance_region(8, 5).unwrap_err();
    insta::assert_snapshot!(err, @"At nesting depth 0, length (10) is smaller than offset (8) + count (5)");
    assert_eq!(err.category(), ErrorCategory::Bounds);

    let err = source.copy_instance_region(u64::MAX, 2).unwrap_err();
    assert!(matches!(err, ArrayError::RegionOutOfBounds { .. }));
    Ok(())
}

#[test]
fn more_regions_than_levels() -> Result<(), IPanic> {
    let source = counting(10)?;
    let err = source
        .copy_instance_regions(&[Region::new(0, 1), Region::new(0, 1)])
        .unwrap_err();
    insta::assert_snapshot!(err, @"2 source region(s) given, but the source nesting depth is only 1");
    Ok(())
}

#[test]
fn nested_full_copy() -> Result<(), IPanic> {
    let source = grid(3, 4)?;
    let copy = source.copy_instance()?;
    assert_eq!(copy, source);
    assert_eq!(copy.model().to_string(), "[[u64; 4]; 3]");
    Ok(())
}

#[test]
fn nested_region_per_depth() -> Result<(), IPanic> {
    let source = grid(3, 4)?;
    let copy = source.copy_instance_regions(&[Region::new(1, 2), Region::new(1, 2)])?;
    assert_eq!(copy.model(), &ArrayModel::nested(ArrayModel::of::<u64>(2), 2));
    assert_eq!(copy[0].as_slice(), &[11, 12]);
    assert_eq!(copy[1].as_slice(), &[21, 22]);

    // only the outer level is narrowed
    let copy = source.copy_instance_region(2, 1)?;
    assert_eq!(copy.len(), 1);
    assert_eq!(copy[0].as_slice(), &[20, 21, 22, 23]);
    Ok(())
}

#[test]
fn inner_region_out_of_bounds() -> Result<(), IPanic> {
    let source = grid(3, 4)?;
    let err = source
        .copy_instance_regions(&[Region::new(0, 3), Region::new(2, 3)])
        .unwrap_err();
    insta::assert_snapshot!(err, @"At nesting depth 1, length (4) is smaller than offset (2) + count (3)");
    Ok(())
}

#[test]
fn field_by_field_policy() -> Result<(), IPanic> {
    let source = particles(5)?;
    let copy = source.copy_instance_with(&[Region::new(1, 3)], CopyPolicy::FieldByField)?;
    assert_eq!(copy.as_slice(), &source.as_slice()[1..4]);

    let grid = grid(2, 2)?;
    let copy = grid.copy_instance_with(&[], CopyPolicy::FieldByField)?;
    assert_eq!(copy, grid);
    Ok(())
}

#[test]
fn field_by_field_without_default_form() -> Result<(), IPanic> {
    #[derive(Debug, Clone)]
    struct CopyOnly(u8);

    impl Element for CopyOnly {
        const CTORS: &'static [Ctor<Self>] = &[
            Ctor::new("copy", &[ArgKind::Source], structured_array::cloned),
            Ctor::new("new", &[ArgKind::UInt], |args| Ok(CopyOnly(args.uint(0)? as u8))),
        ];
        const FIELDS: &'static [structured_array::Field<Self>] =
            &[structured_array::Field::new("0", |dst, src| dst.0 = src.0)];
        type Mut<'a> = &'a mut Self;
    }

    let ctor = Ctor::<CopyOnly>::lookup(&[ArgKind::UInt])?;
    let source = StructuredArray::with_provider(
        structured_array::ConstantCtorAndArgsProvider::with_args(
            ctor,
            structured_array::Args::new().with(7u64),
        ),
        3,
    )?;

    let copy = source.copy_instance()?;
    assert!(copy.iter().all(|element| element.0 == 7));

    let err = source
        .copy_instance_with(&[], CopyPolicy::FieldByField)
        .unwrap_err();
    assert!(matches!(err, ArrayError::NoSuchConstructor { .. }));
    Ok(())
}

#[test]
fn copy_provider_reads_the_cookie() -> Result<(), IPanic> {
    let source = counting(10)?;
    let builder = ArrayBuilder::<u64>::new(3)
        .element_provider(CopyCtorAndArgsProvider::new(Ctor::<u64>::copy_ctor()?, &[5]))
        .source_cookie(&source)
        .resolve()?;
    assert_eq!(builder.build()?.as_slice(), &[5, 6, 7]);

    let builder = ArrayBuilder::<u64>::new(3)
        .element_provider(CopyCtorAndArgsProvider::new(Ctor::<u64>::copy_ctor()?, &[8]))
        .source_cookie(&source)
        .resolve()?;
    insta::assert_snapshot!(builder.build().unwrap_err(), @"Index 10 out of bounds for length 10");
    Ok(())
}

#[test]
fn copy_provider_needs_a_cookie() -> Result<(), IPanic> {
    let builder = ArrayBuilder::<u64>::new(3)
        .element_provider(CopyCtorAndArgsProvider::new(Ctor::<u64>::copy_ctor()?, &[0]))
        .resolve()?;
    insta::assert_snapshot!(builder.build().unwrap_err(), @"Copy at nesting depth 0 has no source to copy from");
    Ok(())
}

#[test]
fn copy_provider_checks_the_source_type() -> Result<(), IPanic> {
    let source = StructuredArray::<u32>::new_instance(3)?;
    let builder = ArrayBuilder::<u64>::new(3)
        .element_provider(CopyCtorAndArgsProvider::new(Ctor::<u64>::copy_ctor()?, &[0]))
        .source_cookie(&source)
        .resolve()?;
    let err = builder.build().unwrap_err();
    assert!(matches!(err, ArrayError::SourceMismatch { .. }));
    Ok(())
}

#[test]
fn copy_builder_is_resolved_and_reusable() -> Result<(), IPanic> {
    let source = particles(4)?;
    let builder = ArrayBuilder::copying(&source, &[Region::new(2, 2)], CopyPolicy::default())?;
    assert!(builder.is_resolved());
    assert_eq!(builder.model(), &ArrayModel::of::<Particle>(2));

    let first = builder.build()?;
    let second = builder.build()?;
    assert_eq!(first, second);
    assert_eq!(first[0].id, 2);
    Ok(())
}

#[test]
fn field_by_field_needs_declared_fields() -> Result<(), IPanic> {
    let source = opaques(4)?;

    let err = source
        .copy_instance_with(&[], CopyPolicy::FieldByField)
        .unwrap_err();
    assert!(matches!(err, ArrayError::NoFields { .. }));
    assert_eq!(err.category(), ErrorCategory::Type);

    let copy = source.copy_instance()?;
    assert_eq!(copy.as_slice(), &[Opaque(1), Opaque(2), Opaque(3), Opaque(4)]);
    Ok(())
}

#[test]
fn copy_after_nested_mutation() -> Result<(), IPanic> {
    let mut source = grid(3, 4)?;
    for mut row in source.iter_mut() {
        *row.get_mut(0).unwrap() = 99;
    }

    let copy = source.copy_instance_region(1, 2)?;
    assert_eq!(copy.model().to_string(), "[[u64; 4]; 2]");
    assert_eq!(copy[0].as_slice(), &[99, 11, 12, 13]);
    assert_eq!(copy[1].as_slice(), &[99, 21, 22, 23]);
    Ok(())
}

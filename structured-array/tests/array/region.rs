use structured_array::{
    ArrayError, ErrorCategory, ImmutableFields, StructuredArray, shallow_copy, shallow_copy_with,
    shallow_copy_within, shallow_copy_within_with,
};
use structured_array_testhelpers::{IPanic, test};

use super::support::{Opaque, counting, grid, opaques, particles};

/// What copying through a temporary buffer would produce.
fn via_buffer(values: &[u64], src: usize, dst: usize, count: usize) -> Vec<u64> {
    let buffer = values[src..src + count].to_vec();
    let mut out = values.to_vec();
    out[dst..dst + count].copy_from_slice(&buffer);
    out
}

#[test]
fn copy_between_arrays() -> Result<(), IPanic> {
    let source = counting(10)?;
    let mut target = StructuredArray::<u64>::new_instance(10)?;
    shallow_copy(&source, 2, &mut target, 5, 3)?;
    assert_eq!(target.as_slice(), &[0, 0, 0, 0, 0, 2, 3, 4, 0, 0]);
    Ok(())
}

#[test]
fn zero_count_is_a_no_op() -> Result<(), IPanic> {
    let source = counting(4)?;
    let mut target = StructuredArray::<u64>::new_instance(4)?;
    shallow_copy(&source, 4, &mut target, 0, 0)?;
    assert_eq!(target.as_slice(), &[0; 4]);
    Ok(())
}

#[test]
fn overlapping_copy_matches_buffered_copy() -> Result<(), IPanic> {
    for (src, dst, count) in [
        (0, 2, 6),
        (2, 0, 6),
        (2, 4, 5),
        (4, 2, 5),
        (0, 1, 9),
        (1, 0, 9),
        (3, 3, 4),
        (0, 5, 5),
    ] {
        let mut array = counting(10)?;
        let expected = via_buffer(array.as_slice(), src, dst, count);
        shallow_copy_within(&mut array, src as u64, dst as u64, count as u64)?;
        assert_eq!(array.as_slice(), expected.as_slice(), "src={src} dst={dst} count={count}");
    }
    Ok(())
}

#[test]
fn out_of_bounds_leaves_target_unchanged() -> Result<(), IPanic> {
    let source = counting(10)?;
    let mut target = StructuredArray::<u64>::new_instance(10)?;

    let err = shallow_copy(&source, 0, &mut target, 8, 5).unwrap_err();
    insta::assert_snapshot!(err, @"At nesting depth 0, length (10) is smaller than offset (8) + count (5)");
    assert_eq!(err.category(), ErrorCategory::Bounds);
    assert_eq!(target.as_slice(), &[0; 10]);

    let err = shallow_copy(&source, 6, &mut target, 0, 5).unwrap_err();
    assert!(matches!(err, ArrayError::RegionOutOfBounds { offset: 6, .. }));
    assert_eq!(target.as_slice(), &[0; 10]);
    Ok(())
}

#[test]
fn element_types_must_match() -> Result<(), IPanic> {
    let source = counting(10)?;
    let mut target = StructuredArray::<u32>::new_instance(10)?;

    let err = shallow_copy(&source, 0, &mut target, 0, 5).unwrap_err();
    insta::assert_snapshot!(err, @"Only elements of the same type can be copied: u64 != u32");
    assert_eq!(err.category(), ErrorCategory::Type);
    assert_eq!(target.as_slice(), &[0; 10]);

    // the type check comes before the bounds check
    let err = shallow_copy(&source, 0, &mut target, 8, 5).unwrap_err();
    assert!(matches!(err, ArrayError::ElementTypesDiffer { .. }));
    Ok(())
}

#[test]
fn nested_arrays_are_refused() -> Result<(), IPanic> {
    let source = grid(2, 3)?;
    let mut target = grid(2, 3)?;

    let err = shallow_copy(&source, 0, &mut target, 1, 1).unwrap_err();
    insta::assert_snapshot!(err, @"Region copy is only supported for flat arrays (with no nested arrays)");

    let err = shallow_copy_within(&mut target, 0, 1, 1).unwrap_err();
    assert!(matches!(err, ArrayError::NestedRegionCopy));
    Ok(())
}

#[test]
fn immutable_fields_are_protected() -> Result<(), IPanic> {
    let source = particles(4)?;
    let mut target = particles(4)?;
    let before = target.copy_instance()?;

    let err = shallow_copy(&source, 0, &mut target, 1, 2).unwrap_err();
    assert!(matches!(err, ArrayError::ImmutableField { field: "id", .. }));
    assert_eq!(err.category(), ErrorCategory::Protection);
    assert_eq!(target, before);

    let err = shallow_copy_within(&mut target, 0, 1, 2).unwrap_err();
    assert!(matches!(err, ArrayError::ImmutableField { .. }));
    assert_eq!(target, before);
    Ok(())
}

#[test]
fn immutable_fields_can_be_overwritten_on_request() -> Result<(), IPanic> {
    let source = particles(4)?;
    let mut target = particles(4)?;

    shallow_copy_with(&source, 0, &mut target, 2, 2, ImmutableFields::Overwrite)?;
    let ids: Vec<u64> = target.iter().map(|p| p.id).collect();
    assert_eq!(ids, [0, 1, 0, 1]);
    assert_eq!(target[3].mass, 0.5);

    shallow_copy_within_with(&mut target, 2, 0, 2, ImmutableFields::Overwrite)?;
    let ids: Vec<u64> = target.iter().map(|p| p.id).collect();
    assert_eq!(ids, [0, 1, 0, 1]);
    Ok(())
}

#[test]
fn element_types_without_fields_are_refused() -> Result<(), IPanic> {
    let source = opaques(4)?;
    let mut target = StructuredArray::<Opaque>::new_instance(4)?;

    let err = shallow_copy(&source, 0, &mut target, 0, 4).unwrap_err();
    assert!(err.to_string().ends_with("::Opaque declares no fields to copy"));
    assert_eq!(err.category(), ErrorCategory::Type);
    assert_eq!(target.as_slice(), &[Opaque(0), Opaque(0), Opaque(0), Opaque(0)]);

    let err = shallow_copy_with(&source, 0, &mut target, 0, 4, ImmutableFields::Overwrite)
        .unwrap_err();
    assert!(matches!(err, ArrayError::NoFields { .. }));

    let mut array = opaques(4)?;
    let err = shallow_copy_within(&mut array, 0, 2, 2).unwrap_err();
    assert!(matches!(err, ArrayError::NoFields { .. }));
    assert_eq!(array, source);
    Ok(())
}

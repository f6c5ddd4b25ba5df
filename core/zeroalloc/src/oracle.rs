use zeroalloc_semantic::SemanticModel;
use zeroalloc_semantic::type_info::TypeInfo;
use zeroalloc_semantic::well_known;

/// Generic interfaces that only expose reading and iteration.
pub const READ_ONLY_SEQUENCE_SHAPES: [&str; 3] = [
    well_known::ENUMERABLE,
    well_known::READ_ONLY_LIST,
    well_known::READ_ONLY_COLLECTION,
];

/// `true` if a `T[]` may stand in wherever `ty` is expected without the
/// consumer being able to tell: any array type, or exactly one of the
/// read-only sequence interfaces. Implementations and subtypes of those
/// interfaces do not qualify.
#[must_use]
pub fn is_read_only_sequence(model: &dyn SemanticModel, ty: &TypeInfo) -> bool {
    if ty.is_array() {
        return true;
    }
    if !ty.is_generic() {
        return false;
    }
    let Some(open) = ty.metadata_name() else {
        return false;
    };
    READ_ONLY_SEQUENCE_SHAPES
        .iter()
        .filter_map(|shape| model.type_by_metadata_name(shape))
        .any(|definition| definition.metadata_name == open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroalloc_semantic::TypedModel;

    fn int() -> TypeInfo {
        TypeInfo::named(well_known::INT32)
    }

    #[test]
    fn test_read_only_shapes() {
        let model = TypedModel::default();
        for shape in READ_ONLY_SEQUENCE_SHAPES {
            assert!(is_read_only_sequence(&model, &TypeInfo::generic(shape, vec![int()])));
        }
        assert!(is_read_only_sequence(&model, &TypeInfo::array(int(), 1)));
        assert!(is_read_only_sequence(&model, &TypeInfo::array(int(), 2)));
    }

    #[test]
    fn test_mutable_and_non_generic_types_are_rejected() {
        let model = TypedModel::default();
        for name in [well_known::LIST, well_known::COLLECTION, well_known::LIST_INTERFACE] {
            assert!(!is_read_only_sequence(&model, &TypeInfo::generic(name, vec![int()])));
        }
        assert!(!is_read_only_sequence(&model, &TypeInfo::named(well_known::NON_GENERIC_ENUMERABLE)));
        assert!(!is_read_only_sequence(&model, &TypeInfo::named(well_known::OBJECT)));
    }
}

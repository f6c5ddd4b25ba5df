use crate::utils::parse;
use zeroalloc_ast::nodes::SyntaxKind;
use zeroalloc_semantic::SemanticModel;
use zeroalloc_semantic::type_info::TypeInfo;
use zeroalloc_semantic::well_known;

const SAMPLE: &str = "using System.Collections.Generic;\n\
namespace Shop\n\
{\n\
    class Basket\n\
    {\n\
        void Add(IReadOnlyList<string> names, int count) { }\n\
        void Fill()\n\
        {\n\
            var items = new List<string>();\n\
            Add(items, 2);\n\
            Add(new string[0], 1);\n\
        }\n\
    }\n\
}\n";

fn int() -> TypeInfo {
    TypeInfo::named(well_known::INT32)
}

#[test]
fn test_creation_types() {
    let document = parse(SAMPLE);
    let model = zeroalloc_semantic::bind(&document);
    assert!(model.errors().is_empty(), "{:?}", model.errors());

    let creations = document
        .arena()
        .nodes_of_kind(&[SyntaxKind::ObjectCreationExpression, SyntaxKind::ArrayCreationExpression]);
    assert_eq!(creations.len(), 2);
    assert_eq!(
        model.type_of(creations[0].id()),
        Some(&TypeInfo::generic(well_known::LIST, vec![TypeInfo::named(well_known::STRING)]))
    );
    assert_eq!(
        model.type_of(creations[1].id()),
        Some(&TypeInfo::array(TypeInfo::named(well_known::STRING), 1))
    );
}

#[test]
fn test_call_targets_resolve_user_methods() {
    let document = parse(SAMPLE);
    let model = zeroalloc_semantic::bind(&document);
    let invocations = document.arena().nodes_of_kind(&[SyntaxKind::InvocationExpression]);
    assert_eq!(invocations.len(), 2);
    for invocation in invocations {
        let target = model.call_target(invocation.id()).unwrap();
        assert_eq!(target.name, "Add");
        assert_eq!(target.parameters.len(), 2);
        assert_eq!(
            target.parameters[0].ty,
            TypeInfo::generic(well_known::READ_ONLY_LIST, vec![TypeInfo::named(well_known::STRING)])
        );
    }
}

#[test]
fn test_interfaces_of_collections() {
    let model = zeroalloc_semantic::TypedModel::default();
    let list = TypeInfo::generic(well_known::LIST, vec![int()]);
    let interfaces = model.all_interfaces(&list);
    for expected in [well_known::COLLECTION, well_known::ENUMERABLE, well_known::READ_ONLY_LIST] {
        assert!(
            interfaces.contains(&TypeInfo::generic(expected, vec![int()])),
            "List<int> should implement {expected}"
        );
    }
    assert!(model.is_reference_type(&list));
    assert!(!model.is_reference_type(&int()));
    assert!(model.is_reference_type(&TypeInfo::array(int(), 1)));
}

#[test]
fn test_missing_import_leaves_type_unresolved() {
    let document = parse("class C { object M() { return new List<int>(); } }");
    let model = zeroalloc_semantic::bind(&document);
    let creation = document.arena().nodes_of_kind(&[SyntaxKind::ObjectCreationExpression])[0].clone();
    assert_eq!(model.type_of(creation.id()), None);
    assert!(!model.errors().is_empty());
}

//! Catalog of the base-library types the binder knows without source.
//!
//! Only the shape the analysis needs is modelled: kind, type parameters,
//! base types, constructors, a few methods and members. Interfaces list
//! their direct bases; transitive closure is computed by the type table.

use crate::type_info::{MemberInfo, MethodSignature, ParameterInfo, TypeDefinition, TypeInfo, TypeKind};

pub const OBJECT: &str = "System.Object";
pub const STRING: &str = "System.String";
pub const VOID: &str = "System.Void";
pub const INT32: &str = "System.Int32";
pub const BOOLEAN: &str = "System.Boolean";
pub const CHAR: &str = "System.Char";
pub const DOUBLE: &str = "System.Double";
pub const SINGLE: &str = "System.Single";
pub const DECIMAL: &str = "System.Decimal";
pub const INT64: &str = "System.Int64";
pub const UINT32: &str = "System.UInt32";
pub const UINT64: &str = "System.UInt64";
pub const ARRAY: &str = "System.Array";

pub const NON_GENERIC_ENUMERABLE: &str = "System.Collections.IEnumerable";
pub const NON_GENERIC_COLLECTION: &str = "System.Collections.ICollection";
pub const NON_GENERIC_LIST: &str = "System.Collections.IList";

pub const ENUMERABLE: &str = "System.Collections.Generic.IEnumerable`1";
pub const READ_ONLY_COLLECTION: &str = "System.Collections.Generic.IReadOnlyCollection`1";
pub const READ_ONLY_LIST: &str = "System.Collections.Generic.IReadOnlyList`1";
pub const COLLECTION: &str = "System.Collections.Generic.ICollection`1";
pub const LIST_INTERFACE: &str = "System.Collections.Generic.IList`1";
pub const SET_INTERFACE: &str = "System.Collections.Generic.ISet`1";
pub const DICTIONARY_INTERFACE: &str = "System.Collections.Generic.IDictionary`2";
pub const READ_ONLY_DICTIONARY: &str = "System.Collections.Generic.IReadOnlyDictionary`2";
pub const EQUALITY_COMPARER: &str = "System.Collections.Generic.IEqualityComparer`1";
pub const COMPARER: &str = "System.Collections.Generic.IComparer`1";
pub const KEY_VALUE_PAIR: &str = "System.Collections.Generic.KeyValuePair`2";
pub const LIST: &str = "System.Collections.Generic.List`1";
pub const HASH_SET: &str = "System.Collections.Generic.HashSet`1";
pub const SORTED_SET: &str = "System.Collections.Generic.SortedSet`1";
pub const LINKED_LIST: &str = "System.Collections.Generic.LinkedList`1";
pub const QUEUE: &str = "System.Collections.Generic.Queue`1";
pub const STACK: &str = "System.Collections.Generic.Stack`1";
pub const DICTIONARY: &str = "System.Collections.Generic.Dictionary`2";
pub const OBJECT_MODEL_COLLECTION: &str = "System.Collections.ObjectModel.Collection`1";
pub const READ_ONLY_COLLECTION_CLASS: &str = "System.Collections.ObjectModel.ReadOnlyCollection`1";
pub const ENUMERABLE_EXTENSIONS: &str = "System.Linq.Enumerable";
pub const STRING_BUILDER: &str = "System.Text.StringBuilder";

/// Covariant (`out T`) generic interfaces.
pub const COVARIANT_INTERFACES: &[&str] = &[ENUMERABLE, READ_ONLY_COLLECTION, READ_ONLY_LIST];

const PREDEFINED: &[(&str, &str)] = &[
    ("bool", BOOLEAN),
    ("byte", "System.Byte"),
    ("sbyte", "System.SByte"),
    ("char", CHAR),
    ("decimal", DECIMAL),
    ("double", DOUBLE),
    ("float", SINGLE),
    ("int", INT32),
    ("uint", UINT32),
    ("long", INT64),
    ("ulong", UINT64),
    ("short", "System.Int16"),
    ("ushort", "System.UInt16"),
    ("object", OBJECT),
    ("string", STRING),
    ("void", VOID),
    ("nint", "System.IntPtr"),
    ("nuint", "System.UIntPtr"),
];

/// Metadata name of a predefined type keyword (`int` -> `System.Int32`).
#[must_use]
pub fn predefined(keyword: &str) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, name)| *name)
}

/// The keyword spelling of a metadata name, if it has one.
#[must_use]
pub fn keyword_for(metadata_name: &str) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(_, name)| *name == metadata_name)
        .map(|(k, _)| *k)
}

const IMPLICIT_NUMERIC: &[(&str, &[&str])] = &[
    (INT32, &[INT64, SINGLE, DOUBLE, DECIMAL]),
    (UINT32, &[INT64, UINT64, SINGLE, DOUBLE, DECIMAL]),
    (INT64, &[SINGLE, DOUBLE, DECIMAL]),
    (UINT64, &[SINGLE, DOUBLE, DECIMAL]),
    (CHAR, &[INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL]),
    (SINGLE, &[DOUBLE]),
];

/// Implicit numeric conversion between two primitive metadata names.
#[must_use]
pub fn widens_to(from: &str, to: &str) -> bool {
    IMPLICIT_NUMERIC
        .iter()
        .any(|(source, targets)| *source == from && targets.contains(&to))
}

/// Metadata name for a source name and arity: ``List`1`` for `List` with one argument.
#[must_use]
pub fn metadata_name(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}`{arity}")
    }
}

fn t(name: &str) -> TypeInfo {
    TypeInfo::type_parameter(name)
}

fn n(name: &str) -> TypeInfo {
    TypeInfo::named(name)
}

fn g(name: &str, arguments: &[TypeInfo]) -> TypeInfo {
    TypeInfo::generic(name, arguments.to_vec())
}

fn int() -> TypeInfo {
    n(INT32)
}

impl TypeDefinition {
    fn with_base(mut self, base: TypeInfo) -> Self {
        self.base_types.push(base);
        self
    }

    fn with_constructor(mut self, parameters: &[(&str, TypeInfo)]) -> Self {
        self.constructors.push(MethodSignature {
            name: ".ctor".to_string(),
            containing_type: self.metadata_name.clone(),
            type_parameters: vec![],
            parameters: parameters
                .iter()
                .map(|(name, ty)| ParameterInfo::new(*name, ty.clone()))
                .collect(),
            return_type: None,
            is_static: false,
        });
        self
    }

    fn with_method(
        mut self,
        name: &str,
        type_parameters: &[&str],
        parameters: &[(&str, TypeInfo)],
        return_type: TypeInfo,
        is_static: bool,
    ) -> Self {
        self.methods.push(MethodSignature {
            name: name.to_string(),
            containing_type: self.metadata_name.clone(),
            type_parameters: type_parameters.iter().map(ToString::to_string).collect(),
            parameters: parameters
                .iter()
                .map(|(name, ty)| ParameterInfo::new(*name, ty.clone()))
                .collect(),
            return_type: Some(return_type),
            is_static,
        });
        self
    }

    fn with_member(mut self, name: &str, ty: TypeInfo) -> Self {
        self.members.push(MemberInfo {
            name: name.to_string(),
            ty,
            is_static: false,
        });
        self
    }
}

fn class(name: &str, type_parameters: &[&str]) -> TypeDefinition {
    TypeDefinition::new(name, TypeKind::Class, type_parameters)
}

fn interface(name: &str, type_parameters: &[&str]) -> TypeDefinition {
    TypeDefinition::new(name, TypeKind::Interface, type_parameters)
}

fn structure(name: &str, type_parameters: &[&str]) -> TypeDefinition {
    TypeDefinition::new(name, TypeKind::Struct, type_parameters)
}

/// Every well-known definition.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn definitions() -> Vec<TypeDefinition> {
    let kvp = || g(KEY_VALUE_PAIR, &[t("TKey"), t("TValue")]);
    let mut definitions = vec![
        class(OBJECT, &[])
            .with_constructor(&[])
            .with_method("ToString", &[], &[], n(STRING), false),
        class(STRING, &[])
            .with_base(g(ENUMERABLE, &[n(CHAR)]))
            .with_member("Length", int()),
        structure(VOID, &[]),
        class(ARRAY, &[])
            .with_base(n(NON_GENERIC_LIST))
            .with_method("Empty", &["T"], &[], TypeInfo::array(t("T"), 1), true)
            .with_member("Length", int()),
        class(ENUMERABLE_EXTENSIONS, &[])
            .with_method("Empty", &["TResult"], &[], g(ENUMERABLE, &[t("TResult")]), true),
        class(STRING_BUILDER, &[])
            .with_constructor(&[])
            .with_constructor(&[("capacity", int())])
            .with_constructor(&[("value", n(STRING))])
            .with_method("Append", &[], &[("value", n(STRING))], n(STRING_BUILDER), false),
        class("System.Exception", &[])
            .with_constructor(&[])
            .with_constructor(&[("message", n(STRING))]),
        class("System.Attribute", &[]),
        class("System.ObsoleteAttribute", &[])
            .with_base(n("System.Attribute"))
            .with_constructor(&[])
            .with_constructor(&[("message", n(STRING))]),
        class("System.CodeDom.Compiler.GeneratedCodeAttribute", &[])
            .with_base(n("System.Attribute"))
            .with_constructor(&[("tool", n(STRING)), ("version", n(STRING))]),
        class("System.Runtime.CompilerServices.CompilerGeneratedAttribute", &[])
            .with_base(n("System.Attribute"))
            .with_constructor(&[]),
        interface(NON_GENERIC_ENUMERABLE, &[]),
        interface(NON_GENERIC_COLLECTION, &[]).with_base(n(NON_GENERIC_ENUMERABLE)),
        interface(NON_GENERIC_LIST, &[]).with_base(n(NON_GENERIC_COLLECTION)),
        interface(ENUMERABLE, &["T"]).with_base(n(NON_GENERIC_ENUMERABLE)),
        interface(READ_ONLY_COLLECTION, &["T"])
            .with_base(g(ENUMERABLE, &[t("T")]))
            .with_member("Count", int()),
        interface(READ_ONLY_LIST, &["T"]).with_base(g(READ_ONLY_COLLECTION, &[t("T")])),
        interface(COLLECTION, &["T"])
            .with_base(g(ENUMERABLE, &[t("T")]))
            .with_method("Add", &[], &[("item", t("T"))], n(VOID), false)
            .with_method("Clear", &[], &[], n(VOID), false)
            .with_member("Count", int()),
        interface(LIST_INTERFACE, &["T"]).with_base(g(COLLECTION, &[t("T")])),
        interface(SET_INTERFACE, &["T"]).with_base(g(COLLECTION, &[t("T")])),
        interface(DICTIONARY_INTERFACE, &["TKey", "TValue"]).with_base(g(COLLECTION, &[kvp()])),
        interface(READ_ONLY_DICTIONARY, &["TKey", "TValue"])
            .with_base(g(READ_ONLY_COLLECTION, &[kvp()])),
        interface(EQUALITY_COMPARER, &["T"]),
        interface(COMPARER, &["T"]),
        structure(KEY_VALUE_PAIR, &["TKey", "TValue"])
            .with_constructor(&[("key", t("TKey")), ("value", t("TValue"))])
            .with_member("Key", t("TKey"))
            .with_member("Value", t("TValue")),
        class(LIST, &["T"])
            .with_base(g(LIST_INTERFACE, &[t("T")]))
            .with_base(g(READ_ONLY_LIST, &[t("T")]))
            .with_base(n(NON_GENERIC_LIST))
            .with_constructor(&[])
            .with_constructor(&[("capacity", int())])
            .with_constructor(&[("collection", g(ENUMERABLE, &[t("T")]))])
            .with_method("AddRange", &[], &[("collection", g(ENUMERABLE, &[t("T")]))], n(VOID), false)
            .with_method("ToArray", &[], &[], TypeInfo::array(t("T"), 1), false),
        class(HASH_SET, &["T"])
            .with_base(g(SET_INTERFACE, &[t("T")]))
            .with_base(g(READ_ONLY_COLLECTION, &[t("T")]))
            .with_constructor(&[])
            .with_constructor(&[("collection", g(ENUMERABLE, &[t("T")]))])
            .with_constructor(&[("comparer", g(EQUALITY_COMPARER, &[t("T")]))])
            .with_constructor(&[
                ("collection", g(ENUMERABLE, &[t("T")])),
                ("comparer", g(EQUALITY_COMPARER, &[t("T")])),
            ])
            .with_constructor(&[("capacity", int())]),
        class(SORTED_SET, &["T"])
            .with_base(g(SET_INTERFACE, &[t("T")]))
            .with_base(g(READ_ONLY_COLLECTION, &[t("T")]))
            .with_constructor(&[])
            .with_constructor(&[("comparer", g(COMPARER, &[t("T")]))])
            .with_constructor(&[("collection", g(ENUMERABLE, &[t("T")]))]),
        class(LINKED_LIST, &["T"])
            .with_base(g(COLLECTION, &[t("T")]))
            .with_base(g(READ_ONLY_COLLECTION, &[t("T")]))
            .with_constructor(&[])
            .with_constructor(&[("collection", g(ENUMERABLE, &[t("T")]))]),
        class(DICTIONARY, &["TKey", "TValue"])
            .with_base(g(DICTIONARY_INTERFACE, &[t("TKey"), t("TValue")]))
            .with_base(g(READ_ONLY_DICTIONARY, &[t("TKey"), t("TValue")]))
            .with_constructor(&[])
            .with_constructor(&[("capacity", int())])
            .with_constructor(&[("comparer", g(EQUALITY_COMPARER, &[t("TKey")]))])
            .with_constructor(&[(
                "dictionary",
                g(DICTIONARY_INTERFACE, &[t("TKey"), t("TValue")]),
            )]),
        class(OBJECT_MODEL_COLLECTION, &["T"])
            .with_base(g(LIST_INTERFACE, &[t("T")]))
            .with_base(g(READ_ONLY_LIST, &[t("T")]))
            .with_constructor(&[])
            .with_constructor(&[("list", g(LIST_INTERFACE, &[t("T")]))]),
        class(READ_ONLY_COLLECTION_CLASS, &["T"])
            .with_base(g(LIST_INTERFACE, &[t("T")]))
            .with_base(g(READ_ONLY_LIST, &[t("T")]))
            .with_constructor(&[("list", g(LIST_INTERFACE, &[t("T")]))]),
    ];
    // Queue and Stack are sequences but not ICollection<T>.
    for name in [QUEUE, STACK] {
        definitions.push(
            class(name, &["T"])
                .with_base(g(ENUMERABLE, &[t("T")]))
                .with_base(g(READ_ONLY_COLLECTION, &[t("T")]))
                .with_base(n(NON_GENERIC_COLLECTION))
                .with_constructor(&[])
                .with_constructor(&[("capacity", int())])
                .with_constructor(&[("collection", g(ENUMERABLE, &[t("T")]))]),
        );
    }
    for (_, name) in PREDEFINED {
        if !matches!(*name, OBJECT | STRING | VOID) {
            definitions.push(structure(name, &[]));
        }
    }
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_keywords_round_trip() {
        assert_eq!(predefined("int"), Some(INT32));
        assert_eq!(keyword_for(INT32), Some("int"));
        assert_eq!(predefined("List"), None);
    }

    #[test]
    fn test_metadata_name_carries_arity() {
        assert_eq!(metadata_name("System.Collections.Generic.List", 1), LIST);
        assert_eq!(metadata_name("System.Array", 0), ARRAY);
    }

    #[test]
    fn test_definitions_are_unique() {
        let definitions = definitions();
        let mut names: Vec<_> = definitions.iter().map(|d| d.metadata_name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}

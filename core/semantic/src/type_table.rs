use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::type_info::{TypeDefinition, TypeInfo, TypeKind};
use crate::well_known;

/// Every type definition visible to one document: the well-known catalog
/// plus the types the document declares.
#[derive(Debug, Clone)]
pub struct TypeTable {
    definitions: FxHashMap<String, TypeDefinition>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    /// A table seeded with the well-known definitions.
    #[must_use]
    pub fn new() -> Self {
        let definitions = well_known::definitions()
            .into_iter()
            .map(|d| (d.metadata_name.clone(), d))
            .collect();
        Self { definitions }
    }

    /// Adds or replaces a definition. Returns `true` if the name was new.
    pub fn insert(&mut self, definition: TypeDefinition) -> bool {
        self.definitions
            .insert(definition.metadata_name.clone(), definition)
            .is_none()
    }

    #[must_use]
    pub fn get(&self, metadata_name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(metadata_name)
    }

    pub(crate) fn get_mut(&mut self, metadata_name: &str) -> Option<&mut TypeDefinition> {
        self.definitions.get_mut(metadata_name)
    }

    #[must_use]
    pub fn contains(&self, metadata_name: &str) -> bool {
        self.definitions.contains_key(metadata_name)
    }

    /// Definition of the type `ty` is constructed from. Arrays resolve to `System.Array`.
    #[must_use]
    pub fn definition_of(&self, ty: &TypeInfo) -> Option<&TypeDefinition> {
        match ty {
            TypeInfo::Named { name, .. } => self.get(name),
            TypeInfo::Array { .. } => self.get(well_known::ARRAY),
            TypeInfo::TypeParameter(_) => None,
        }
    }

    /// Direct base types of `ty`, with the receiver's type arguments substituted.
    #[must_use]
    pub fn direct_supertypes(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        match ty {
            TypeInfo::Array { element, rank } => {
                let mut bases = vec![TypeInfo::named(well_known::ARRAY)];
                if *rank == 1 {
                    let element = (**element).clone();
                    bases.push(TypeInfo::generic(well_known::LIST_INTERFACE, vec![element.clone()]));
                    bases.push(TypeInfo::generic(well_known::READ_ONLY_LIST, vec![element]));
                }
                bases
            }
            TypeInfo::Named { name, .. } => {
                let Some(definition) = self.get(name) else {
                    return vec![];
                };
                let substitutions = definition.substitutions_for(ty);
                let mut bases: Vec<TypeInfo> = definition
                    .base_types
                    .iter()
                    .map(|b| b.substitute(&substitutions))
                    .collect();
                if definition.kind != TypeKind::Interface
                    && name != well_known::OBJECT
                    && !bases.iter().any(|b| self.kind_of(b) == Some(TypeKind::Class))
                {
                    bases.push(TypeInfo::named(well_known::OBJECT));
                }
                bases
            }
            TypeInfo::TypeParameter(_) => vec![TypeInfo::named(well_known::OBJECT)],
        }
    }

    /// Every base class and interface of `ty`, transitively, nearest first.
    #[must_use]
    pub fn supertypes(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        let mut seen = FxHashSet::default();
        let mut result = vec![];
        let mut queue: VecDeque<TypeInfo> = self.direct_supertypes(ty).into();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.direct_supertypes(&next));
            result.push(next);
        }
        result
    }

    /// Interfaces `ty` implements, transitively.
    #[must_use]
    pub fn all_interfaces(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        self.supertypes(ty)
            .into_iter()
            .filter(|t| self.kind_of(t) == Some(TypeKind::Interface))
            .collect()
    }

    #[must_use]
    pub fn kind_of(&self, ty: &TypeInfo) -> Option<TypeKind> {
        match ty {
            TypeInfo::Array { .. } => Some(TypeKind::Class),
            TypeInfo::Named { name, .. } => self.get(name).map(|d| d.kind),
            TypeInfo::TypeParameter(_) => None,
        }
    }

    /// `true` for arrays, classes and interfaces. Unknown types and type
    /// parameters are not known to be references.
    #[must_use]
    pub fn is_reference_type(&self, ty: &TypeInfo) -> bool {
        match ty {
            TypeInfo::Array { .. } => true,
            TypeInfo::Named { name, .. } => self.get(name).is_some_and(TypeDefinition::is_reference_type),
            TypeInfo::TypeParameter(_) => false,
        }
    }

    /// Implicit reference or identity conversion from `from` to `to`.
    ///
    /// Type parameters convert both ways; this table does not track
    /// constraints, so overload resolution stays permissive for them.
    #[must_use]
    pub fn is_assignable(&self, from: &TypeInfo, to: &TypeInfo) -> bool {
        if from == to
            || matches!(to, TypeInfo::Named { name, .. } if name == well_known::OBJECT)
            || matches!(from, TypeInfo::TypeParameter(_))
            || matches!(to, TypeInfo::TypeParameter(_))
        {
            return true;
        }
        if let (
            TypeInfo::Array { element: a, rank: ra },
            TypeInfo::Array { element: b, rank: rb },
        ) = (from, to)
        {
            return ra == rb && self.is_reference_type(a) && self.is_assignable(a, b);
        }
        if let (TypeInfo::Named { name: a, .. }, TypeInfo::Named { name: b, .. }) = (from, to)
            && well_known::widens_to(a, b)
        {
            return true;
        }
        if self.is_variant_conversion(from, to) {
            return true;
        }
        self.supertypes(from)
            .iter()
            .any(|candidate| candidate == to || self.is_variant_conversion(candidate, to))
    }

    fn is_variant_conversion(&self, from: &TypeInfo, to: &TypeInfo) -> bool {
        let (
            TypeInfo::Named { name: a, type_arguments: from_args },
            TypeInfo::Named { name: b, type_arguments: to_args },
        ) = (from, to)
        else {
            return false;
        };
        a == b
            && well_known::COVARIANT_INTERFACES.contains(&a.as_str())
            && from_args.len() == to_args.len()
            && from_args
                .iter()
                .zip(to_args)
                .all(|(f, t)| f == t || (self.is_reference_type(f) && self.is_assignable(f, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeInfo {
        TypeInfo::named(well_known::INT32)
    }

    fn list_of(element: TypeInfo) -> TypeInfo {
        TypeInfo::generic(well_known::LIST, vec![element])
    }

    #[test]
    fn test_list_implements_collection_interfaces() {
        let table = TypeTable::new();
        let interfaces = table.all_interfaces(&list_of(int()));
        assert!(interfaces.contains(&TypeInfo::generic(well_known::COLLECTION, vec![int()])));
        assert!(interfaces.contains(&TypeInfo::generic(well_known::ENUMERABLE, vec![int()])));
        assert!(interfaces.contains(&TypeInfo::generic(well_known::READ_ONLY_LIST, vec![int()])));
        assert!(!interfaces.contains(&TypeInfo::named(well_known::OBJECT)));
    }

    #[test]
    fn test_queue_is_not_a_generic_collection() {
        let table = TypeTable::new();
        let queue = TypeInfo::generic(well_known::QUEUE, vec![int()]);
        let interfaces = table.all_interfaces(&queue);
        assert!(interfaces.iter().all(|i| i.metadata_name() != Some(well_known::COLLECTION)));
        assert!(interfaces.contains(&TypeInfo::generic(well_known::ENUMERABLE, vec![int()])));
    }

    #[test]
    fn test_array_conversions() {
        let table = TypeTable::new();
        let array = TypeInfo::array(int(), 1);
        assert!(table.is_assignable(&array, &TypeInfo::generic(well_known::ENUMERABLE, vec![int()])));
        assert!(table.is_assignable(&array, &TypeInfo::named(well_known::ARRAY)));
        let matrix = TypeInfo::array(int(), 2);
        assert!(!table.is_assignable(&matrix, &TypeInfo::generic(well_known::ENUMERABLE, vec![int()])));
    }

    #[test]
    fn test_covariance_needs_reference_elements() {
        let table = TypeTable::new();
        let strings = list_of(TypeInfo::named(well_known::STRING));
        let objects = TypeInfo::generic(well_known::ENUMERABLE, vec![TypeInfo::named(well_known::OBJECT)]);
        assert!(table.is_assignable(&strings, &objects));
        assert!(!table.is_assignable(&list_of(int()), &objects));
        assert!(!table.is_assignable(&strings, &list_of(TypeInfo::named(well_known::OBJECT))));
    }

    #[test]
    fn test_numeric_widening() {
        let table = TypeTable::new();
        assert!(table.is_assignable(&int(), &TypeInfo::named(well_known::INT64)));
        assert!(!table.is_assignable(&TypeInfo::named(well_known::INT64), &int()));
    }

    #[test]
    fn test_reference_types() {
        let table = TypeTable::new();
        assert!(table.is_reference_type(&list_of(int())));
        assert!(!table.is_reference_type(&int()));
        assert!(!table.is_reference_type(&TypeInfo::named("Unknown")));
    }
}

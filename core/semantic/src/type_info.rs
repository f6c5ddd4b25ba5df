//! Type Information
//!
//! This module defines the representation of types used throughout the binder.
//!
//! Types are identified by CLR metadata names: `System.Int32`,
//! ``System.Collections.Generic.List`1``. A constructed generic type carries its
//! type arguments next to the metadata name of its definition, so the open
//! (constructed-from) form of any [`TypeInfo::Named`] is simply its `name`.
//!
//! Type parameters appear as [`TypeInfo::TypeParameter`] inside definitions and
//! signatures; [`TypeInfo::substitute`] replaces them with concrete types.

use core::fmt;
use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;

use crate::well_known;

#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub enum TypeInfo {
    Named {
        name: String,
        type_arguments: Vec<TypeInfo>,
    },
    Array {
        element: Box<TypeInfo>,
        rank: u32,
    },
    TypeParameter(String),
}

impl TypeInfo {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        TypeInfo::Named {
            name: name.into(),
            type_arguments: vec![],
        }
    }

    #[must_use]
    pub fn generic(name: impl Into<String>, type_arguments: Vec<TypeInfo>) -> Self {
        TypeInfo::Named {
            name: name.into(),
            type_arguments,
        }
    }

    #[must_use]
    pub fn array(element: TypeInfo, rank: u32) -> Self {
        TypeInfo::Array {
            element: Box::new(element),
            rank,
        }
    }

    #[must_use]
    pub fn type_parameter(name: impl Into<String>) -> Self {
        TypeInfo::TypeParameter(name.into())
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, TypeInfo::Array { .. })
    }

    /// `true` for a constructed generic named type such as `List<int>`.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self, TypeInfo::Named { type_arguments, .. } if !type_arguments.is_empty())
    }

    /// Metadata name of the definition this type is constructed from.
    #[must_use]
    pub fn metadata_name(&self) -> Option<&str> {
        match self {
            TypeInfo::Named { name, .. } => Some(name),
            TypeInfo::Array { .. } | TypeInfo::TypeParameter(_) => None,
        }
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[TypeInfo] {
        match self {
            TypeInfo::Named { type_arguments, .. } => type_arguments,
            TypeInfo::Array { .. } | TypeInfo::TypeParameter(_) => &[],
        }
    }

    #[must_use]
    pub fn element_type(&self) -> Option<&TypeInfo> {
        match self {
            TypeInfo::Array { element, .. } => Some(element),
            TypeInfo::Named { .. } | TypeInfo::TypeParameter(_) => None,
        }
    }

    /// Substitute type parameters using the given mapping.
    #[must_use = "substitution returns a new TypeInfo, original is unchanged"]
    pub fn substitute(&self, substitutions: &FxHashMap<String, TypeInfo>) -> TypeInfo {
        if substitutions.is_empty() {
            return self.clone();
        }
        match self {
            TypeInfo::TypeParameter(name) => substitutions
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeInfo::Array { element, rank } => TypeInfo::Array {
                element: Box::new(element.substitute(substitutions)),
                rank: *rank,
            },
            TypeInfo::Named {
                name,
                type_arguments,
            } => TypeInfo::Named {
                name: name.clone(),
                type_arguments: type_arguments
                    .iter()
                    .map(|arg| arg.substitute(substitutions))
                    .collect(),
            },
        }
    }

    /// Check if this type contains any unresolved type parameters.
    #[must_use = "this is a pure check with no side effects"]
    pub fn has_unresolved_params(&self) -> bool {
        match self {
            TypeInfo::TypeParameter(_) => true,
            TypeInfo::Array { element, .. } => element.has_unresolved_params(),
            TypeInfo::Named { type_arguments, .. } => {
                type_arguments.iter().any(TypeInfo::has_unresolved_params)
            }
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TypeInfo::TypeParameter(name) => write!(f, "{name}"),
            TypeInfo::Array { .. } => {
                // Outermost rank is written first: `int[,][]` is a 2-D array of `int[]`.
                let mut ranks = vec![];
                let mut current = self;
                while let TypeInfo::Array { element, rank } = current {
                    ranks.push(*rank);
                    current = element;
                }
                write!(f, "{current}")?;
                for rank in ranks {
                    write!(f, "[{}]", ",".repeat(rank.saturating_sub(1) as usize))?;
                }
                Ok(())
            }
            TypeInfo::Named {
                name,
                type_arguments,
            } => {
                if let Some(keyword) = well_known::keyword_for(name) {
                    return write!(f, "{keyword}");
                }
                let simple = name.rsplit('.').next().unwrap_or(name);
                let simple = simple.split('`').next().unwrap_or(simple);
                if type_arguments.is_empty() {
                    return write!(f, "{simple}");
                }
                let arguments = type_arguments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{simple}<{arguments}>")
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Class => write!(f, "class"),
            TypeKind::Struct => write!(f, "struct"),
            TypeKind::Interface => write!(f, "interface"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeInfo,
    pub is_params: bool,
    pub is_optional: bool,
}

impl ParameterInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        Self {
            name: name.into(),
            ty,
            is_params: false,
            is_optional: false,
        }
    }
}

/// A method or constructor signature, possibly substituted for a
/// constructed receiver and inferred method type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub containing_type: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterInfo>,
    /// `None` for constructors.
    pub return_type: Option<TypeInfo>,
    pub is_static: bool,
}

impl MethodSignature {
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    #[must_use = "substitution returns a new signature, original is unchanged"]
    pub fn substitute(&self, substitutions: &FxHashMap<String, TypeInfo>) -> MethodSignature {
        MethodSignature {
            parameters: self
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    ty: p.ty.substitute(substitutions),
                    ..p.clone()
                })
                .collect(),
            return_type: self.return_type.as_ref().map(|r| r.substitute(substitutions)),
            ..self.clone()
        }
    }

    /// Smallest and largest argument counts this signature accepts.
    #[must_use]
    pub fn arity_range(&self) -> (usize, Option<usize>) {
        let required = self
            .parameters
            .iter()
            .filter(|p| !p.is_optional && !p.is_params)
            .count();
        let variadic = self.parameters.last().is_some_and(|p| p.is_params);
        (
            required,
            (!variadic).then_some(self.parameters.len()),
        )
    }
}

/// A field or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub ty: TypeInfo,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub metadata_name: String,
    pub kind: TypeKind,
    pub type_parameters: Vec<String>,
    /// Direct base class and interfaces, over this definition's own type parameters.
    pub base_types: Vec<TypeInfo>,
    pub constructors: Vec<MethodSignature>,
    pub methods: Vec<MethodSignature>,
    pub members: Vec<MemberInfo>,
}

impl PartialEq for TypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.metadata_name == other.metadata_name
    }
}

impl Eq for TypeDefinition {}

impl TypeDefinition {
    #[must_use]
    pub fn new(metadata_name: impl Into<String>, kind: TypeKind, type_parameters: &[&str]) -> Self {
        Self {
            metadata_name: metadata_name.into(),
            kind,
            type_parameters: type_parameters.iter().map(ToString::to_string).collect(),
            base_types: vec![],
            constructors: vec![],
            methods: vec![],
            members: vec![],
        }
    }

    /// The definition's type as seen from inside it: `List<T>` for ``List`1``.
    #[must_use]
    pub fn self_type(&self) -> TypeInfo {
        TypeInfo::generic(
            self.metadata_name.clone(),
            self.type_parameters
                .iter()
                .map(TypeInfo::type_parameter)
                .collect(),
        )
    }

    /// Maps this definition's type parameters to the arguments of `constructed`.
    #[must_use]
    pub fn substitutions_for(&self, constructed: &TypeInfo) -> FxHashMap<String, TypeInfo> {
        self.type_parameters
            .iter()
            .cloned()
            .zip(constructed.type_arguments().iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        self.kind != TypeKind::Struct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Method,
    Constructor,
    Property,
    Field,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Type => write!(f, "type"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Constructor => write!(f, "constructor"),
            SymbolKind::Property => write!(f, "property"),
            SymbolKind::Field => write!(f, "field"),
        }
    }
}

/// A declared member or type together with the attributes written on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub containing_type: Option<String>,
    /// Attribute names as written (`GeneratedCode`, `System.ObsoleteAttribute`).
    pub attributes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_keywords_and_short_names() {
        let list = TypeInfo::generic(
            "System.Collections.Generic.List`1",
            vec![TypeInfo::named("System.Int32")],
        );
        assert_eq!(list.to_string(), "List<int>");
        let jagged = TypeInfo::array(TypeInfo::array(TypeInfo::named("System.String"), 1), 2);
        assert_eq!(jagged.to_string(), "string[,][]");
    }

    #[test]
    fn test_substitute_reaches_nested_arguments() {
        let open = TypeInfo::generic(
            "System.Collections.Generic.IEnumerable`1",
            vec![TypeInfo::array(TypeInfo::type_parameter("T"), 1)],
        );
        let mut map = FxHashMap::default();
        map.insert("T".to_string(), TypeInfo::named("System.Int32"));
        let closed = open.substitute(&map);
        assert!(!closed.has_unresolved_params());
        assert_eq!(closed.to_string(), "IEnumerable<int[]>");
    }

    #[test]
    fn test_arity_range() {
        let mut signature = MethodSignature {
            name: "M".into(),
            containing_type: "C".into(),
            type_parameters: vec![],
            parameters: vec![ParameterInfo::new("a", TypeInfo::named("System.Int32"))],
            return_type: None,
            is_static: false,
        };
        assert_eq!(signature.arity_range(), (1, Some(1)));
        signature.parameters.push(ParameterInfo {
            is_params: true,
            ..ParameterInfo::new("rest", TypeInfo::array(TypeInfo::named("System.Int32"), 1))
        });
        assert_eq!(signature.arity_range(), (1, None));
    }
}

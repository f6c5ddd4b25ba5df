//! Structural and type checks that prove a located creation produces an
//! empty sequence nobody can mutate or tell apart from `Array.Empty<T>()`.

use std::sync::Arc;

use zeroalloc_ast::nodes::{
    ArrayCreationExpression, ArrayType, Expression, LiteralKind, ObjectCreationExpression,
    TypeSyntax, next_node_id,
};
use zeroalloc_semantic::SemanticModel;
use zeroalloc_semantic::type_info::TypeInfo;
use zeroalloc_semantic::well_known;

use crate::creation::CreationExpression;

/// Element type syntax for the replacement, or `None` when the creation
/// cannot be proven replaceable.
#[must_use]
pub fn prove(creation: &CreationExpression, model: &dyn SemanticModel) -> Option<TypeSyntax> {
    let element = match creation {
        CreationExpression::Array(array) => prove_array(array),
        CreationExpression::Object(object) => prove_object(object, model),
    };
    tracing::debug!(creation = creation.id(), eligible = element.is_some(), "eligibility");
    element
}

fn prove_array(array: &ArrayCreationExpression) -> Option<TypeSyntax> {
    let initializer_empty = array.initializer.as_ref().is_none_or(|i| i.expressions.is_empty());
    if !initializer_empty {
        return None;
    }
    let (outer, inner) = array.ty.rank_specifiers.split_first()?;
    // Array.Empty<T>() is always a single-dimensional, zero-length T[].
    let [size] = outer.sizes.as_slice() else {
        return None;
    };
    if !size.as_ref().is_none_or(is_zero_literal) {
        return None;
    }
    if inner.is_empty() {
        return Some(array.ty.element_type.clone());
    }
    Some(TypeSyntax::Array(Arc::new(ArrayType {
        id: next_node_id(),
        element_type: array.ty.element_type.clone(),
        rank_specifiers: inner.to_vec(),
    })))
}

fn is_zero_literal(expression: &Expression) -> bool {
    let Expression::Literal(literal) = expression else {
        return false;
    };
    if literal.kind != LiteralKind::Number {
        return false;
    }
    let lower = literal.text.to_ascii_lowercase();
    let digits = lower.trim_end_matches(['u', 'l']);
    let digits = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0b")).unwrap_or(digits);
    !digits.is_empty() && digits.chars().all(|c| c == '0' || c == '_')
}

fn prove_object(object: &ObjectCreationExpression, model: &dyn SemanticModel) -> Option<TypeSyntax> {
    let ty = model.type_of(object.id)?;
    if !is_collection_type(model, ty) {
        tracing::trace!(%ty, "not a collection type");
        return None;
    }
    if object.initializer.as_ref().is_some_and(|i| !i.expressions.is_empty()) {
        return None;
    }
    if is_copy_construction(object, model) {
        tracing::trace!(%ty, "copy construction");
        return None;
    }
    match object.ty.type_arguments() {
        [element] => Some(element.clone()),
        _ => None,
    }
}

/// An array, or a type that is or implements ``ICollection`1``.
#[must_use]
pub fn is_collection_type(model: &dyn SemanticModel, ty: &TypeInfo) -> bool {
    ty.is_array() || has_open_form(model, ty, &[well_known::COLLECTION])
}

/// Arguments are present and the bound constructor takes a sequence, so the
/// new collection may start out non-empty. A creation with arguments whose
/// constructor is unknown counts as a copy.
fn is_copy_construction(object: &ObjectCreationExpression, model: &dyn SemanticModel) -> bool {
    let has_arguments = object.arguments.as_ref().is_some_and(|list| !list.arguments.is_empty());
    if !has_arguments {
        return false;
    }
    let Some(constructor) = model.call_target(object.id) else {
        return true;
    };
    constructor.parameters.iter().any(|parameter| {
        parameter.ty.is_array()
            || has_open_form(
                model,
                &parameter.ty,
                &[well_known::COLLECTION, well_known::ENUMERABLE],
            )
    })
}

fn has_open_form(model: &dyn SemanticModel, ty: &TypeInfo, shapes: &[&str]) -> bool {
    std::iter::once(ty.clone())
        .chain(model.all_interfaces(ty))
        .any(|candidate| candidate.metadata_name().is_some_and(|name| shapes.contains(&name)))
}

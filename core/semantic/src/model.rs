use rustc_hash::FxHashMap;

use crate::errors::BindError;
use crate::type_info::{DeclaredSymbol, MethodSignature, TypeDefinition, TypeInfo};
use crate::type_table::TypeTable;

/// Read-only semantic queries over one bound document.
///
/// Node ids are those of the document the model was bound from; a model
/// never answers for nodes of an edited document.
pub trait SemanticModel: Sync {
    /// Static type of an expression or type-syntax node.
    fn type_of(&self, node_id: u64) -> Option<&TypeInfo>;

    /// The method or constructor an invocation or object creation binds to.
    fn call_target(&self, node_id: u64) -> Option<&MethodSignature>;

    /// Symbol declared by a type, method, constructor, property or field node.
    fn declared_symbol(&self, node_id: u64) -> Option<&DeclaredSymbol>;

    fn type_by_metadata_name(&self, metadata_name: &str) -> Option<&TypeDefinition>;

    /// Interfaces `ty` implements, transitively.
    fn all_interfaces(&self, ty: &TypeInfo) -> Vec<TypeInfo>;

    fn is_reference_type(&self, ty: &TypeInfo) -> bool;
}

/// The binder's output.
#[derive(Debug, Clone, Default)]
pub struct TypedModel {
    pub(crate) node_types: FxHashMap<u64, TypeInfo>,
    pub(crate) call_targets: FxHashMap<u64, MethodSignature>,
    pub(crate) declared_symbols: FxHashMap<u64, DeclaredSymbol>,
    pub(crate) types: TypeTable,
    pub(crate) errors: Vec<BindError>,
}

impl TypedModel {
    #[must_use]
    pub fn errors(&self) -> &[BindError] {
        &self.errors
    }

    #[must_use]
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Number of nodes with a recorded type.
    #[must_use]
    pub fn typed_node_count(&self) -> usize {
        self.node_types.len()
    }
}

impl SemanticModel for TypedModel {
    fn type_of(&self, node_id: u64) -> Option<&TypeInfo> {
        self.node_types.get(&node_id)
    }

    fn call_target(&self, node_id: u64) -> Option<&MethodSignature> {
        self.call_targets.get(&node_id)
    }

    fn declared_symbol(&self, node_id: u64) -> Option<&DeclaredSymbol> {
        self.declared_symbols.get(&node_id)
    }

    fn type_by_metadata_name(&self, metadata_name: &str) -> Option<&TypeDefinition> {
        self.types.get(metadata_name)
    }

    fn all_interfaces(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        self.types.all_interfaces(ty)
    }

    fn is_reference_type(&self, ty: &TypeInfo) -> bool {
        self.types.is_reference_type(ty)
    }
}

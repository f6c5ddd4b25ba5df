//! Binder
//!
//! Binds one parsed document in three passes:
//!
//! 1. every source type is declared, so references resolve in any order;
//! 2. declared types are completed with base types, constructors, methods,
//!    properties and fields, and each declaration gets a [`DeclaredSymbol`];
//! 3. member bodies are bound, recording the type of every expression and
//!    type-syntax node plus the target of every call and object creation.
//!
//! Binding never fails as a whole. Unknown names and types are recorded as
//! [`BindError`]s and the affected expressions are left untyped.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use zeroalloc_ast::document::Document;
use zeroalloc_ast::nodes::{
    AccessorKind, ArgumentList, ArrayCreationExpression, ArrayType, AstChild, Attribute, Block,
    ConstructorDeclaration, Expression, InitializerExpression, InvocationExpression,
    LiteralExpression, LiteralKind, MemberAccessExpression, MemberBody, MemberDeclaration,
    MethodDeclaration, ObjectCreationExpression, Opaque, ParameterList, ParameterModifier,
    PropertyBody, SimpleName, Statement, SyntaxNode, TypeDeclaration, TypeKeyword, TypeSyntax,
    UsingDirective,
};

use crate::errors::{BindError, Location};
use crate::model::TypedModel;
use crate::type_info::{
    DeclaredSymbol, MemberInfo, MethodSignature, ParameterInfo, SymbolKind, TypeDefinition,
    TypeInfo, TypeKind,
};
use crate::well_known;

/// Binds `document` against the well-known types and its own declarations.
#[must_use]
pub fn bind(document: &Document) -> TypedModel {
    let mut binder = Binder::new(document);
    let declared = binder.declare_types();
    for declared_type in &declared {
        binder.complete_type(declared_type);
    }
    for declared_type in &declared {
        binder.bind_type_members(declared_type);
    }
    tracing::debug!(
        path = %document.path().display(),
        types = declared.len(),
        typed_nodes = binder.model.node_types.len(),
        calls = binder.model.call_targets.len(),
        errors = binder.model.errors.len(),
        "bound document"
    );
    binder.model
}

/// Name-resolution context of a declaration.
#[derive(Debug, Clone, Default)]
struct Context {
    namespace: String,
    imports: Vec<String>,
    type_parameters: Vec<String>,
    containing_type: Option<String>,
}

struct DeclaredType {
    declaration: Arc<TypeDeclaration>,
    metadata_name: String,
    /// Context inside the type body.
    context: Context,
}

/// Lexical scopes of a member body.
#[derive(Debug, Default)]
struct Scope {
    frames: Vec<FxHashMap<String, TypeInfo>>,
    method_type_parameters: Vec<String>,
}

impl Scope {
    fn new(method_type_parameters: Vec<String>) -> Self {
        Self {
            frames: vec![FxHashMap::default()],
            method_type_parameters,
        }
    }

    fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn declare(&mut self, name: &str, ty: TypeInfo) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// What the left side of a `.` denotes.
enum Receiver {
    Value(TypeInfo),
    Type(TypeInfo),
    Namespace(String),
    Unknown,
}

struct ArgumentType {
    name: Option<String>,
    ty: Option<TypeInfo>,
}

struct Binder<'a> {
    document: &'a Document,
    model: TypedModel,
    /// Source types by simple name and arity.
    user_types: FxHashMap<(String, usize), String>,
    /// Opaque constructs currently being bound. Names they declare
    /// (`foreach` variables, lambda parameters, patterns) are not tracked.
    opaque_depth: usize,
}

impl<'a> Binder<'a> {
    fn new(document: &'a Document) -> Self {
        Self {
            document,
            model: TypedModel::default(),
            user_types: FxHashMap::default(),
            opaque_depth: 0,
        }
    }

    fn location(&self, node_id: u64) -> Location {
        self.document
            .arena()
            .span(node_id)
            .map(|span| {
                let (line, column) = self.document.line_column(span.start);
                Location { line, column }
            })
            .unwrap_or_default()
    }

    fn report(&mut self, error: BindError) {
        if self.opaque_depth > 0 && matches!(error, BindError::UnknownName { .. }) {
            return;
        }
        tracing::trace!(%error, "bind error");
        self.model.errors.push(error);
    }

    // Pass 1

    fn declare_types(&mut self) -> Vec<DeclaredType> {
        let root = self.document.root();
        let context = Context {
            imports: imported_namespaces(&root.usings),
            ..Context::default()
        };
        let mut declared = vec![];
        self.declare_members(&root.members, &context, &mut declared);
        declared
    }

    fn declare_members(
        &mut self,
        members: &[MemberDeclaration],
        context: &Context,
        declared: &mut Vec<DeclaredType>,
    ) {
        for member in members {
            match member {
                MemberDeclaration::Namespace(namespace) => {
                    let mut inner = context.clone();
                    inner.namespace = qualify(&context.namespace, &namespace.name);
                    inner.imports.extend(imported_namespaces(&namespace.usings));
                    self.declare_members(&namespace.members, &inner, declared);
                }
                MemberDeclaration::Type(declaration) => {
                    self.declare_type(declaration, context, declared);
                }
                MemberDeclaration::Method(_)
                | MemberDeclaration::Constructor(_)
                | MemberDeclaration::Property(_)
                | MemberDeclaration::Field(_)
                | MemberDeclaration::Other(_) => {}
            }
        }
    }

    fn declare_type(
        &mut self,
        declaration: &Arc<TypeDeclaration>,
        context: &Context,
        declared: &mut Vec<DeclaredType>,
    ) {
        let name = declaration.name.name.clone();
        let arity = declaration.type_parameters.len();
        let simple = well_known::metadata_name(&name, arity);
        let metadata_name = match &context.containing_type {
            Some(outer) => format!("{outer}+{simple}"),
            None => qualify(&context.namespace, &simple),
        };
        if self.model.types.contains(&metadata_name) {
            let location = self.location(declaration.id);
            self.report(BindError::DuplicateType {
                name: metadata_name,
                location,
            });
            return;
        }

        let kind = match declaration.keyword {
            TypeKeyword::Class | TypeKeyword::Record => TypeKind::Class,
            TypeKeyword::Struct => TypeKind::Struct,
            TypeKeyword::Interface => TypeKind::Interface,
        };
        let type_parameters: Vec<&str> = declaration
            .type_parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        self.model
            .types
            .insert(TypeDefinition::new(&metadata_name, kind, &type_parameters));
        self.user_types
            .entry((name.clone(), arity))
            .or_insert_with(|| metadata_name.clone());
        self.declare_symbol(
            declaration.id,
            &name,
            SymbolKind::Type,
            context.containing_type.as_ref(),
            &declaration.attributes,
        );

        let mut inner = context.clone();
        inner.containing_type = Some(metadata_name.clone());
        inner
            .type_parameters
            .extend(type_parameters.iter().map(ToString::to_string));
        self.declare_members(&declaration.members, &inner, declared);
        declared.push(DeclaredType {
            declaration: Arc::clone(declaration),
            metadata_name,
            context: inner,
        });
    }

    fn declare_symbol(
        &mut self,
        node_id: u64,
        name: &str,
        kind: SymbolKind,
        containing_type: Option<&String>,
        attributes: &[Arc<Attribute>],
    ) {
        self.model.declared_symbols.insert(
            node_id,
            DeclaredSymbol {
                name: name.to_string(),
                kind,
                containing_type: containing_type.cloned(),
                attributes: attributes.iter().map(|a| a.name.name.clone()).collect(),
            },
        );
    }

    // Pass 2

    fn complete_type(&mut self, declared: &DeclaredType) {
        let context = &declared.context;
        let declaration = &declared.declaration;
        let owner = Some(&declared.metadata_name);

        let base_types: Vec<TypeInfo> = declaration
            .base_types
            .iter()
            .filter_map(|base| self.resolve_type(base, context, &[]))
            .collect();
        let mut constructors = vec![];
        let mut methods = vec![];
        let mut members = vec![];

        for member in &declaration.members {
            match member {
                MemberDeclaration::Method(method) => {
                    methods.push(self.method_signature(method, declared));
                    self.declare_symbol(
                        method.id,
                        &method.name.name,
                        SymbolKind::Method,
                        owner,
                        &method.attributes,
                    );
                }
                MemberDeclaration::Constructor(constructor) => {
                    constructors.push(self.constructor_signature(constructor, declared));
                    self.declare_symbol(
                        constructor.id,
                        &constructor.name.name,
                        SymbolKind::Constructor,
                        owner,
                        &constructor.attributes,
                    );
                }
                MemberDeclaration::Property(property) => {
                    let ty = self.resolve_or_placeholder(&property.ty, context, &[]);
                    members.push(MemberInfo {
                        name: property.name.name.clone(),
                        ty,
                        is_static: is_static(&property.modifiers),
                    });
                    self.declare_symbol(
                        property.id,
                        &property.name.name,
                        SymbolKind::Property,
                        owner,
                        &property.attributes,
                    );
                }
                MemberDeclaration::Field(field) => {
                    let ty = self.resolve_or_placeholder(&field.ty, context, &[]);
                    members.push(MemberInfo {
                        name: field.name.name.clone(),
                        ty,
                        is_static: is_static(&field.modifiers),
                    });
                    self.declare_symbol(
                        field.id,
                        &field.name.name,
                        SymbolKind::Field,
                        owner,
                        &field.attributes,
                    );
                }
                MemberDeclaration::Type(_)
                | MemberDeclaration::Namespace(_)
                | MemberDeclaration::Other(_) => {}
            }
        }

        let Some(definition) = self.model.types.get_mut(&declared.metadata_name) else {
            return;
        };
        let needs_default_constructor = match definition.kind {
            TypeKind::Class => constructors.is_empty(),
            TypeKind::Struct => !constructors.iter().any(|c| c.parameters.is_empty()),
            TypeKind::Interface => false,
        };
        if needs_default_constructor {
            constructors.push(MethodSignature {
                name: declaration.name.name.clone(),
                containing_type: declared.metadata_name.clone(),
                type_parameters: vec![],
                parameters: vec![],
                return_type: None,
                is_static: false,
            });
        }
        definition.base_types = base_types;
        definition.constructors = constructors;
        definition.methods = methods;
        definition.members = members;
    }

    fn method_signature(&mut self, method: &MethodDeclaration, declared: &DeclaredType) -> MethodSignature {
        let type_parameters: Vec<String> = method
            .type_parameters
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let return_type =
            self.resolve_or_placeholder(&method.return_type, &declared.context, &type_parameters);
        let parameters = self.parameter_infos(&method.parameters, &declared.context, &type_parameters);
        MethodSignature {
            name: method.name.name.clone(),
            containing_type: declared.metadata_name.clone(),
            type_parameters,
            parameters,
            return_type: Some(return_type),
            is_static: is_static(&method.modifiers),
        }
    }

    fn constructor_signature(
        &mut self,
        constructor: &ConstructorDeclaration,
        declared: &DeclaredType,
    ) -> MethodSignature {
        MethodSignature {
            name: constructor.name.name.clone(),
            containing_type: declared.metadata_name.clone(),
            type_parameters: vec![],
            parameters: self.parameter_infos(&constructor.parameters, &declared.context, &[]),
            return_type: None,
            is_static: is_static(&constructor.modifiers),
        }
    }

    fn parameter_infos(
        &mut self,
        list: &ParameterList,
        context: &Context,
        method_type_parameters: &[String],
    ) -> Vec<ParameterInfo> {
        list.parameters
            .iter()
            .map(|parameter| {
                let ty = self.resolve_or_placeholder(&parameter.ty, context, method_type_parameters);
                ParameterInfo {
                    is_params: parameter.modifier == Some(ParameterModifier::Params),
                    is_optional: parameter.default.is_some(),
                    ..ParameterInfo::new(parameter.name.name.clone(), ty)
                }
            })
            .collect()
    }

    // Type resolution

    /// Resolves a type-syntax node and records its type. Unknown names are
    /// reported once, at the innermost node that failed.
    fn resolve_type(
        &mut self,
        syntax: &TypeSyntax,
        context: &Context,
        method_type_parameters: &[String],
    ) -> Option<TypeInfo> {
        let resolved = match syntax {
            TypeSyntax::Predefined(predefined) => {
                well_known::predefined(&predefined.keyword).map(TypeInfo::named)
            }
            TypeSyntax::Identifier(identifier) => {
                let name = &identifier.name;
                if method_type_parameters.contains(name) || context.type_parameters.contains(name) {
                    Some(TypeInfo::type_parameter(name.clone()))
                } else if let Some(found) = self.lookup_type(name, 0, context) {
                    Some(TypeInfo::named(found))
                } else {
                    self.report_unknown_type(name, identifier.id);
                    None
                }
            }
            TypeSyntax::Generic(generic) => {
                let arguments: Vec<Option<TypeInfo>> = generic
                    .type_arguments
                    .iter()
                    .map(|argument| self.resolve_type(argument, context, method_type_parameters))
                    .collect();
                match self.lookup_type(&generic.name, arguments.len(), context) {
                    Some(found) => arguments
                        .into_iter()
                        .collect::<Option<Vec<_>>>()
                        .map(|arguments| TypeInfo::generic(found, arguments)),
                    None => {
                        let name = format!("{}<{}>", generic.name, ",".repeat(arguments.len().saturating_sub(1)));
                        self.report_unknown_type(&name, generic.id);
                        None
                    }
                }
            }
            TypeSyntax::Array(array) => self.resolve_array_type(array, context, method_type_parameters),
            // Nullable annotations do not change which creations are empty.
            TypeSyntax::Nullable(nullable) => {
                self.resolve_type(&nullable.element_type, context, method_type_parameters)
            }
        };
        if let Some(ty) = &resolved {
            self.model.node_types.insert(syntax.id(), ty.clone());
        }
        resolved
    }

    /// `int[0][]` is an array of `int[]`: the first specifier is the outermost rank.
    fn resolve_array_type(
        &mut self,
        array: &ArrayType,
        context: &Context,
        method_type_parameters: &[String],
    ) -> Option<TypeInfo> {
        let element = self.resolve_type(&array.element_type, context, method_type_parameters)?;
        let ty = array.rank_specifiers.iter().rev().fold(element, |inner, specifier| {
            TypeInfo::array(inner, u32::try_from(specifier.sizes.len()).unwrap_or(u32::MAX))
        });
        self.model.node_types.insert(array.id, ty.clone());
        Some(ty)
    }

    fn resolve_or_placeholder(
        &mut self,
        syntax: &TypeSyntax,
        context: &Context,
        method_type_parameters: &[String],
    ) -> TypeInfo {
        self.resolve_type(syntax, context, method_type_parameters)
            .unwrap_or_else(|| TypeInfo::named(syntax.name().unwrap_or("?")))
    }

    fn report_unknown_type(&mut self, name: &str, node_id: u64) {
        let location = self.location(node_id);
        self.report(BindError::UnknownType {
            name: name.to_string(),
            location,
        });
    }

    /// Finds the metadata name `name` refers to: an exact name, a source
    /// type, then the enclosing namespaces and the imported ones.
    fn lookup_type(&self, name: &str, arity: usize, context: &Context) -> Option<String> {
        if arity == 0
            && let Some(predefined) = well_known::predefined(name)
        {
            return Some(predefined.to_string());
        }
        let simple = well_known::metadata_name(name, arity);
        if self.model.types.contains(&simple) {
            return Some(simple);
        }
        if !name.contains('.')
            && let Some(found) = self.user_types.get(&(name.to_string(), arity))
        {
            return Some(found.clone());
        }
        namespace_chain(&context.namespace)
            .into_iter()
            .chain(context.imports.iter().map(String::as_str))
            .map(|namespace| format!("{namespace}.{simple}"))
            .find(|candidate| self.model.types.contains(candidate))
    }

    fn self_type(&self, context: &Context) -> Option<TypeInfo> {
        let name = context.containing_type.as_ref()?;
        self.model.types.get(name).map(TypeDefinition::self_type)
    }

    // Pass 3

    fn bind_type_members(&mut self, declared: &DeclaredType) {
        let context = &declared.context;
        for member in &declared.declaration.members {
            match member {
                MemberDeclaration::Method(method) => {
                    let mut scope = Scope::new(
                        method.type_parameters.iter().map(|p| p.name.clone()).collect(),
                    );
                    self.declare_parameters(&method.parameters, context, &mut scope);
                    if let Some(body) = &method.body {
                        self.bind_member_body(body, context, &mut scope);
                    }
                }
                MemberDeclaration::Constructor(constructor) => {
                    let mut scope = Scope::new(vec![]);
                    self.declare_parameters(&constructor.parameters, context, &mut scope);
                    if let Some(initializer) = &constructor.initializer {
                        self.bind_arguments(&initializer.arguments, context, &mut scope);
                    }
                    if let Some(body) = &constructor.body {
                        self.bind_member_body(body, context, &mut scope);
                    }
                }
                MemberDeclaration::Property(property) => {
                    let property_type = self.model.node_types.get(&property.ty.id()).cloned();
                    match &property.body {
                        PropertyBody::Arrow(arrow) => {
                            let mut scope = Scope::new(vec![]);
                            self.bind_expression(&arrow.expression, context, &mut scope);
                        }
                        PropertyBody::Accessors(list) => {
                            for accessor in &list.accessors {
                                let mut scope = Scope::new(vec![]);
                                if accessor.kind != AccessorKind::Get
                                    && let Some(ty) = &property_type
                                {
                                    scope.declare("value", ty.clone());
                                }
                                if let Some(body) = &accessor.body {
                                    self.bind_member_body(body, context, &mut scope);
                                }
                            }
                        }
                    }
                    if let Some(initializer) = &property.initializer {
                        self.bind_expression(initializer, context, &mut Scope::new(vec![]));
                    }
                }
                MemberDeclaration::Field(field) => {
                    if let Some(value) = &field.value {
                        self.bind_expression(value, context, &mut Scope::new(vec![]));
                    }
                }
                MemberDeclaration::Other(opaque) => {
                    self.bind_opaque(opaque, context, &mut Scope::new(vec![]));
                }
                MemberDeclaration::Type(_) | MemberDeclaration::Namespace(_) => {}
            }
        }
    }

    fn declare_parameters(&mut self, list: &ParameterList, context: &Context, scope: &mut Scope) {
        for parameter in &list.parameters {
            if let Some(default) = &parameter.default {
                self.bind_expression(default, context, scope);
            }
            if let Some(ty) = self.model.node_types.get(&parameter.ty.id()).cloned() {
                scope.declare(&parameter.name.name, ty);
            }
        }
    }

    fn bind_member_body(&mut self, body: &MemberBody, context: &Context, scope: &mut Scope) {
        match body {
            MemberBody::Block(block) => self.bind_block(block, context, scope),
            MemberBody::Arrow(arrow) => {
                self.bind_expression(&arrow.expression, context, scope);
            }
        }
    }

    fn bind_block(&mut self, block: &Block, context: &Context, scope: &mut Scope) {
        scope.push();
        for statement in &block.statements {
            self.bind_statement(statement, context, scope);
        }
        scope.pop();
    }

    fn bind_statement(&mut self, statement: &Statement, context: &Context, scope: &mut Scope) {
        match statement {
            Statement::Block(block) => self.bind_block(block, context, scope),
            Statement::Return(ret) => {
                if let Some(expression) = &ret.expression {
                    self.bind_expression(expression, context, scope);
                }
            }
            Statement::Yield(statement) => {
                if let Some(expression) = &statement.expression {
                    self.bind_expression(expression, context, scope);
                }
            }
            Statement::Expression(statement) => {
                self.bind_expression(&statement.expression, context, scope);
            }
            Statement::LocalDeclaration(local) => {
                let is_var = matches!(&local.ty, TypeSyntax::Identifier(i) if i.name == "var");
                let ty = if is_var {
                    let value = local
                        .value
                        .as_ref()
                        .and_then(|value| self.bind_expression(value, context, scope));
                    if let Some(ty) = &value {
                        self.model.node_types.insert(local.ty.id(), ty.clone());
                    }
                    value
                } else {
                    let ty = self.resolve_type(&local.ty, context, &scope.method_type_parameters);
                    if let Some(value) = &local.value {
                        self.bind_expression(value, context, scope);
                    }
                    ty
                };
                if let Some(ty) = ty {
                    scope.declare(&local.name.name, ty);
                }
            }
            Statement::Other(opaque) => self.bind_opaque(opaque, context, scope),
        }
    }

    /// Binds the statements and expressions nested in an opaque construct,
    /// in a scope of their own.
    fn bind_opaque(&mut self, opaque: &Opaque, context: &Context, scope: &mut Scope) {
        self.opaque_depth += 1;
        scope.push();
        for node in opaque.nodes() {
            if let Some(statement) = Statement::from_syntax(node) {
                self.bind_statement(&statement, context, scope);
            } else if let Some(expression) = Expression::from_syntax(node) {
                self.bind_expression(&expression, context, scope);
            } else if let SyntaxNode::ArgumentList(list) = node {
                self.bind_arguments(list, context, scope);
            }
        }
        scope.pop();
        self.opaque_depth -= 1;
    }

    // Expressions

    fn bind_expression(
        &mut self,
        expression: &Expression,
        context: &Context,
        scope: &mut Scope,
    ) -> Option<TypeInfo> {
        let ty = match expression {
            Expression::Literal(literal) => literal_type(literal),
            Expression::Identifier(identifier) => {
                let ty = self.lookup_value(&identifier.name, context, scope);
                if ty.is_none() {
                    let location = self.location(identifier.id);
                    self.report(BindError::UnknownName {
                        name: identifier.name.clone(),
                        location,
                    });
                }
                ty
            }
            Expression::GenericName(_) => None,
            Expression::MemberAccess(access) => match self.bind_member_access(access, context, scope) {
                Receiver::Value(ty) => Some(ty),
                Receiver::Namespace(name) => {
                    let location = self.location(access.id);
                    self.report(BindError::UnknownName { name, location });
                    None
                }
                Receiver::Type(_) | Receiver::Unknown => None,
            },
            Expression::Invocation(invocation) => self.bind_invocation(invocation, context, scope),
            Expression::ObjectCreation(creation) => self.bind_object_creation(creation, context, scope),
            Expression::ArrayCreation(creation) => self.bind_array_creation(creation, context, scope),
            Expression::Assignment(assignment) => {
                let left = self.bind_expression(&assignment.left, context, scope);
                self.bind_expression(&assignment.right, context, scope);
                left
            }
            Expression::Initializer(initializer) => {
                self.bind_initializer(initializer, context, scope);
                None
            }
            Expression::Other(opaque) => {
                self.bind_opaque(opaque, context, scope);
                None
            }
        };
        if let Some(ty) = &ty {
            self.model.node_types.insert(expression.id(), ty.clone());
        }
        ty
    }

    /// Locals, then parameters, then members of the enclosing type.
    fn lookup_value(&self, name: &str, context: &Context, scope: &Scope) -> Option<TypeInfo> {
        if name == "this" {
            return self.self_type(context);
        }
        if let Some(ty) = scope.lookup(name) {
            return Some(ty.clone());
        }
        let self_type = self.self_type(context)?;
        self.find_member(&self_type, name, None)
    }

    /// Field or property `name` on `ty` or one of its supertypes.
    fn find_member(&self, ty: &TypeInfo, name: &str, want_static: Option<bool>) -> Option<TypeInfo> {
        let types = &self.model.types;
        std::iter::once(ty.clone())
            .chain(types.supertypes(ty))
            .find_map(|candidate| {
                let definition = types.definition_of(&candidate)?;
                let member = definition.members.iter().find(|m| {
                    m.name == name && want_static.is_none_or(|s| s == m.is_static)
                })?;
                Some(member.ty.substitute(&definition.substitutions_for(&candidate)))
            })
    }

    /// Methods named `name` on `ty` and its supertypes, substituted for `ty`.
    fn find_methods(&self, ty: &TypeInfo, name: &str, want_static: Option<bool>) -> Vec<MethodSignature> {
        let types = &self.model.types;
        std::iter::once(ty.clone())
            .chain(types.supertypes(ty))
            .flat_map(|candidate| {
                let Some(definition) = types.definition_of(&candidate) else {
                    return vec![];
                };
                let substitutions = definition.substitutions_for(&candidate);
                definition
                    .methods
                    .iter()
                    .filter(|m| m.name == name && want_static.is_none_or(|s| s == m.is_static))
                    .map(|m| m.substitute(&substitutions))
                    .collect()
            })
            .collect()
    }

    fn bind_receiver(&mut self, expression: &Expression, context: &Context, scope: &mut Scope) -> Receiver {
        let receiver = match expression {
            Expression::Identifier(identifier) => {
                if let Some(ty) = self.lookup_value(&identifier.name, context, scope) {
                    Receiver::Value(ty)
                } else if let Some(found) = self.lookup_type(&identifier.name, 0, context) {
                    Receiver::Type(TypeInfo::named(found))
                } else {
                    Receiver::Namespace(identifier.name.clone())
                }
            }
            Expression::GenericName(generic) => {
                let arguments: Option<Vec<TypeInfo>> = generic
                    .type_arguments
                    .iter()
                    .map(|a| self.resolve_type(a, context, &scope.method_type_parameters))
                    .collect();
                match (self.lookup_type(&generic.name, generic.type_arguments.len(), context), arguments) {
                    (Some(found), Some(arguments)) => Receiver::Type(TypeInfo::generic(found, arguments)),
                    _ => Receiver::Unknown,
                }
            }
            Expression::MemberAccess(access) => self.bind_member_access(access, context, scope),
            other => self
                .bind_expression(other, context, scope)
                .map_or(Receiver::Unknown, Receiver::Value),
        };
        if let Receiver::Value(ty) | Receiver::Type(ty) = &receiver {
            self.model.node_types.insert(expression.id(), ty.clone());
        }
        receiver
    }

    fn bind_member_access(
        &mut self,
        access: &MemberAccessExpression,
        context: &Context,
        scope: &mut Scope,
    ) -> Receiver {
        let (name, arity) = match &access.name {
            SimpleName::Identifier(identifier) => (identifier.name.clone(), 0),
            SimpleName::Generic(generic) => (generic.name.clone(), generic.type_arguments.len()),
        };
        let receiver = match self.bind_receiver(&access.expression, context, scope) {
            Receiver::Namespace(namespace) => {
                let qualified = qualify(&namespace, &name);
                match self.lookup_type(&qualified, arity, context) {
                    Some(found) if arity == 0 => Receiver::Type(TypeInfo::named(found)),
                    Some(found) => self.constructed(&found, &access.name, context, scope),
                    None => Receiver::Namespace(qualified),
                }
            }
            Receiver::Type(ty) => {
                if let Some(member) = self.find_member(&ty, &name, Some(true)) {
                    Receiver::Value(member)
                } else {
                    let nested = ty
                        .metadata_name()
                        .map(|outer| format!("{outer}+{}", well_known::metadata_name(&name, arity)))
                        .filter(|nested| self.model.types.contains(nested));
                    match nested {
                        Some(nested) if arity == 0 => Receiver::Type(TypeInfo::named(nested)),
                        Some(nested) => self.constructed(&nested, &access.name, context, scope),
                        None => self.unknown_member(&name, access.id),
                    }
                }
            }
            Receiver::Value(ty) => match self.find_member(&ty, &name, Some(false)) {
                Some(member) => Receiver::Value(member),
                None => self.unknown_member(&name, access.id),
            },
            Receiver::Unknown => Receiver::Unknown,
        };
        if let Receiver::Value(ty) | Receiver::Type(ty) = &receiver {
            self.model.node_types.insert(access.id, ty.clone());
        }
        receiver
    }

    fn constructed(&mut self, found: &str, name: &SimpleName, context: &Context, scope: &Scope) -> Receiver {
        let arguments: Option<Vec<TypeInfo>> = match name {
            SimpleName::Generic(generic) => generic
                .type_arguments
                .iter()
                .map(|a| self.resolve_type(a, context, &scope.method_type_parameters))
                .collect(),
            SimpleName::Identifier(_) => Some(vec![]),
        };
        arguments.map_or(Receiver::Unknown, |arguments| {
            Receiver::Type(TypeInfo::generic(found, arguments))
        })
    }

    fn unknown_member(&mut self, name: &str, node_id: u64) -> Receiver {
        let location = self.location(node_id);
        self.report(BindError::UnknownName {
            name: name.to_string(),
            location,
        });
        Receiver::Unknown
    }

    fn bind_arguments(&mut self, list: &ArgumentList, context: &Context, scope: &mut Scope) -> Vec<ArgumentType> {
        list.arguments
            .iter()
            .map(|argument| ArgumentType {
                name: argument.name.as_ref().map(|n| n.name.clone()),
                ty: self.bind_expression(&argument.expression, context, scope),
            })
            .collect()
    }

    fn bind_invocation(
        &mut self,
        invocation: &InvocationExpression,
        context: &Context,
        scope: &mut Scope,
    ) -> Option<TypeInfo> {
        let method_type_parameters = scope.method_type_parameters.clone();
        let (candidates, name, explicit) = match &invocation.expression {
            Expression::Identifier(identifier) => {
                let candidates = self
                    .self_type(context)
                    .map(|ty| self.find_methods(&ty, &identifier.name, None))
                    .unwrap_or_default();
                (candidates, identifier.name.clone(), vec![])
            }
            Expression::GenericName(generic) => {
                let explicit = self.resolve_type_arguments(&generic.type_arguments, context, &method_type_parameters);
                let candidates = self
                    .self_type(context)
                    .map(|ty| self.find_methods(&ty, &generic.name, None))
                    .unwrap_or_default();
                (candidates, generic.name.clone(), explicit?)
            }
            Expression::MemberAccess(access) => {
                let (name, explicit) = match &access.name {
                    SimpleName::Identifier(identifier) => (identifier.name.clone(), vec![]),
                    SimpleName::Generic(generic) => (
                        generic.name.clone(),
                        self.resolve_type_arguments(&generic.type_arguments, context, &method_type_parameters)?,
                    ),
                };
                let candidates = match self.bind_receiver(&access.expression, context, scope) {
                    Receiver::Value(ty) => self.find_methods(&ty, &name, Some(false)),
                    Receiver::Type(ty) => self.find_methods(&ty, &name, Some(true)),
                    Receiver::Namespace(namespace) => {
                        self.unknown_member(&namespace, access.expression.id());
                        self.bind_arguments(&invocation.arguments, context, scope);
                        return None;
                    }
                    Receiver::Unknown => {
                        self.bind_arguments(&invocation.arguments, context, scope);
                        return None;
                    }
                };
                (candidates, name, explicit)
            }
            other => {
                self.bind_expression(other, context, scope);
                self.bind_arguments(&invocation.arguments, context, scope);
                return None;
            }
        };

        let arguments = self.bind_arguments(&invocation.arguments, context, scope);
        if candidates.is_empty() {
            self.unknown_member(&name, invocation.id);
            return None;
        }
        let Some(signature) = self.select_overload(&candidates, &explicit, &arguments) else {
            let location = self.location(invocation.id);
            self.report(BindError::NoApplicableOverload {
                name,
                arguments: arguments.len(),
                location,
            });
            return None;
        };
        let return_type = signature.return_type.clone();
        self.model.call_targets.insert(invocation.id, signature);
        return_type
    }

    fn resolve_type_arguments(
        &mut self,
        arguments: &[TypeSyntax],
        context: &Context,
        method_type_parameters: &[String],
    ) -> Option<Vec<TypeInfo>> {
        arguments
            .iter()
            .map(|argument| self.resolve_type(argument, context, method_type_parameters))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn bind_object_creation(
        &mut self,
        creation: &ObjectCreationExpression,
        context: &Context,
        scope: &mut Scope,
    ) -> Option<TypeInfo> {
        let ty = self.resolve_type(&creation.ty, context, &scope.method_type_parameters);
        let arguments = creation
            .arguments
            .as_ref()
            .map(|list| self.bind_arguments(list, context, scope))
            .unwrap_or_default();
        if let Some(initializer) = &creation.initializer {
            for expression in &initializer.expressions {
                match expression {
                    // Member initializers name members of the created type, not locals.
                    Expression::Assignment(assignment) => {
                        self.bind_expression(&assignment.right, context, scope);
                    }
                    other => {
                        self.bind_expression(other, context, scope);
                    }
                }
            }
        }
        let ty = ty?;
        let candidates: Vec<MethodSignature> = match self.model.types.definition_of(&ty) {
            Some(definition) if !ty.is_array() => {
                let substitutions = definition.substitutions_for(&ty);
                definition
                    .constructors
                    .iter()
                    .map(|c| c.substitute(&substitutions))
                    .collect()
            }
            _ => return Some(ty),
        };
        match self.select_overload(&candidates, &[], &arguments) {
            Some(signature) => {
                self.model.call_targets.insert(creation.id, signature);
            }
            None => {
                let location = self.location(creation.id);
                self.report(BindError::NoApplicableOverload {
                    name: ty.to_string(),
                    arguments: arguments.len(),
                    location,
                });
            }
        }
        Some(ty)
    }

    fn bind_array_creation(
        &mut self,
        creation: &ArrayCreationExpression,
        context: &Context,
        scope: &mut Scope,
    ) -> Option<TypeInfo> {
        let ty = self.resolve_array_type(&creation.ty, context, &scope.method_type_parameters);
        for specifier in &creation.ty.rank_specifiers {
            for size in specifier.sizes.iter().flatten() {
                self.bind_expression(size, context, scope);
            }
        }
        if let Some(initializer) = &creation.initializer {
            self.bind_initializer(initializer, context, scope);
        }
        ty
    }

    fn bind_initializer(&mut self, initializer: &InitializerExpression, context: &Context, scope: &mut Scope) {
        for expression in &initializer.expressions {
            self.bind_expression(expression, context, scope);
        }
    }

    // Overload resolution

    /// The first candidate the arguments fit, with method type arguments
    /// taken from `explicit` or inferred from the argument types.
    fn select_overload(
        &self,
        candidates: &[MethodSignature],
        explicit: &[TypeInfo],
        arguments: &[ArgumentType],
    ) -> Option<MethodSignature> {
        candidates
            .iter()
            .find_map(|candidate| self.applicable(candidate, explicit, arguments))
    }

    fn applicable(
        &self,
        candidate: &MethodSignature,
        explicit: &[TypeInfo],
        arguments: &[ArgumentType],
    ) -> Option<MethodSignature> {
        let (required, maximum) = candidate.arity_range();
        if arguments.len() < required || maximum.is_some_and(|m| arguments.len() > m) {
            return None;
        }

        let mut inferred = FxHashMap::default();
        if !explicit.is_empty() {
            if explicit.len() != candidate.type_parameters.len() {
                return None;
            }
            inferred.extend(candidate.type_parameters.iter().cloned().zip(explicit.iter().cloned()));
        } else if !candidate.type_parameters.is_empty() {
            for (index, argument) in arguments.iter().enumerate() {
                if let (Some(parameter), Some(ty)) = (parameter_for(candidate, index, argument), &argument.ty) {
                    self.infer(&parameter.ty, ty, &candidate.type_parameters, &mut inferred);
                }
            }
        }

        let signature = candidate.substitute(&inferred);
        for (index, argument) in arguments.iter().enumerate() {
            let parameter = parameter_for(&signature, index, argument)?;
            let Some(ty) = &argument.ty else {
                continue;
            };
            let types = &self.model.types;
            let fits = types.is_assignable(ty, &parameter.ty)
                || (parameter.is_params
                    && parameter
                        .ty
                        .element_type()
                        .is_some_and(|element| types.is_assignable(ty, element)));
            if !fits {
                return None;
            }
        }
        Some(signature)
    }

    fn infer(
        &self,
        parameter: &TypeInfo,
        argument: &TypeInfo,
        type_parameters: &[String],
        inferred: &mut FxHashMap<String, TypeInfo>,
    ) {
        match parameter {
            TypeInfo::TypeParameter(name) if type_parameters.contains(name) => {
                inferred.entry(name.clone()).or_insert_with(|| argument.clone());
            }
            TypeInfo::Array { element, rank } => {
                if let TypeInfo::Array {
                    element: argument_element,
                    rank: argument_rank,
                } = argument
                    && rank == argument_rank
                {
                    self.infer(element, argument_element, type_parameters, inferred);
                }
            }
            TypeInfo::Named { name, type_arguments } if !type_arguments.is_empty() => {
                let matching = std::iter::once(argument.clone())
                    .chain(self.model.types.supertypes(argument))
                    .find(|candidate| candidate.metadata_name() == Some(name.as_str()));
                if let Some(matching) = matching {
                    for (p, a) in type_arguments.iter().zip(matching.type_arguments()) {
                        self.infer(p, a, type_parameters, inferred);
                    }
                }
            }
            TypeInfo::Named { .. } | TypeInfo::TypeParameter(_) => {}
        }
    }
}

/// Parameter an argument binds to: by label, by position, or the `params` tail.
fn parameter_for<'s>(
    signature: &'s MethodSignature,
    index: usize,
    argument: &ArgumentType,
) -> Option<&'s ParameterInfo> {
    match &argument.name {
        Some(name) => signature.parameters.iter().find(|p| &p.name == name),
        None => signature
            .parameters
            .get(index)
            .or_else(|| signature.parameters.last().filter(|p| p.is_params)),
    }
}

fn literal_type(literal: &LiteralExpression) -> Option<TypeInfo> {
    let name = match literal.kind {
        LiteralKind::Number => number_type(&literal.text),
        LiteralKind::String => well_known::STRING,
        LiteralKind::Char => well_known::CHAR,
        LiteralKind::True | LiteralKind::False => well_known::BOOLEAN,
        LiteralKind::Null => return None,
    };
    Some(TypeInfo::named(name))
}

fn number_type(text: &str) -> &'static str {
    let lower = text.to_ascii_lowercase();
    let hex = lower.starts_with("0x");
    if lower.ends_with("ul") || lower.ends_with("lu") {
        well_known::UINT64
    } else if lower.ends_with('l') {
        well_known::INT64
    } else if lower.ends_with('u') {
        well_known::UINT32
    } else if !hex && lower.ends_with('f') {
        well_known::SINGLE
    } else if lower.ends_with('m') {
        well_known::DECIMAL
    } else if !hex && (lower.ends_with('d') || lower.contains('.') || lower.contains('e')) {
        well_known::DOUBLE
    } else {
        well_known::INT32
    }
}

fn imported_namespaces(usings: &[Arc<UsingDirective>]) -> Vec<String> {
    usings
        .iter()
        .filter(|u| !u.is_static && u.alias.is_none())
        .map(|u| u.name.clone())
        .collect()
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// `A.B.C` -> `A.B.C`, `A.B`, `A`.
fn namespace_chain(namespace: &str) -> Vec<&str> {
    let mut chain = vec![];
    let mut current = namespace;
    while !current.is_empty() {
        chain.push(current);
        current = current.rsplit_once('.').map_or("", |(outer, _)| outer);
    }
    chain
}

fn is_static(modifiers: &[String]) -> bool {
    modifiers.iter().any(|m| m == "static" || m == "const")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SemanticModel;
    use zeroalloc_ast::nodes::{SyntaxKind, SyntaxNode};

    fn bound(source: &str) -> (Document, TypedModel) {
        let document = Document::parse("test.cs", source).unwrap();
        let model = bind(&document);
        (document, model)
    }

    fn first_of_kind(document: &Document, kind: SyntaxKind) -> SyntaxNode {
        document.arena().nodes_of_kind(&[kind]).into_iter().next().unwrap()
    }

    #[test]
    fn test_binds_method_return_and_creation_types() {
        let (document, model) = bound(
            "using System.Collections.Generic;\nclass C { IEnumerable<int> M() { return new List<int>(); } }",
        );
        assert!(model.errors().is_empty(), "{:?}", model.errors());
        let creation = first_of_kind(&document, SyntaxKind::ObjectCreationExpression);
        assert_eq!(model.type_of(creation.id()).unwrap().to_string(), "List<int>");
        let target = model.call_target(creation.id()).unwrap();
        assert!(target.is_constructor());
        assert!(target.parameters.is_empty());
        let method = first_of_kind(&document, SyntaxKind::MethodDeclaration);
        let SyntaxNode::MethodDeclaration(method) = method else { unreachable!() };
        assert_eq!(
            model.type_of(method.return_type.id()).unwrap().metadata_name(),
            Some(well_known::ENUMERABLE)
        );
    }

    #[test]
    fn test_binds_creations_inside_control_flow() {
        let (document, model) = bound(
            "using System.Collections.Generic;\nclass C {\n    IEnumerable<int> M(bool b) {\n        if (b) { return new List<int>(); }\n        while (b) { b = false; }\n        return new int[0];\n    }\n}",
        );
        assert!(model.errors().is_empty(), "{:?}", model.errors());
        let creation = first_of_kind(&document, SyntaxKind::ObjectCreationExpression);
        assert_eq!(model.type_of(creation.id()).unwrap().to_string(), "List<int>");
        let array = first_of_kind(&document, SyntaxKind::ArrayCreationExpression);
        assert_eq!(model.type_of(array.id()).unwrap().to_string(), "int[]");
    }

    #[test]
    fn test_jagged_array_creation_type() {
        let (document, model) = bound("class C { object M() { return new int[0][]; } }");
        let creation = first_of_kind(&document, SyntaxKind::ArrayCreationExpression);
        let ty = model.type_of(creation.id()).unwrap();
        assert_eq!(ty, &TypeInfo::array(TypeInfo::array(TypeInfo::named(well_known::INT32), 1), 1));
    }

    #[test]
    fn test_unimported_type_is_unknown() {
        let (_, model) = bound("class C { object M() { return new List<int>(); } }");
        assert!(matches!(
            model.errors(),
            [BindError::UnknownType { name, .. }] if name == "List<>"
        ));
    }

    #[test]
    fn test_fully_qualified_static_call() {
        let (document, model) = bound("class C { int[] M() => System.Array.Empty<int>(); }");
        assert!(model.errors().is_empty(), "{:?}", model.errors());
        let invocation = first_of_kind(&document, SyntaxKind::InvocationExpression);
        assert_eq!(model.type_of(invocation.id()).unwrap().to_string(), "int[]");
        assert_eq!(model.call_target(invocation.id()).unwrap().containing_type, well_known::ARRAY);
    }

    #[test]
    fn test_overload_resolution_and_inference() {
        let (document, model) = bound(
            "using System.Collections.Generic;\n\
             class C {\n\
                 void Take(IReadOnlyList<string> items) { }\n\
                 T First<T>(IEnumerable<T> items);\n\
                 void M() { Take(new string[0]); var x = First(new List<int>()); }\n\
             }",
        );
        let calls = document.arena().nodes_of_kind(&[SyntaxKind::InvocationExpression]);
        let take = model.call_target(calls[0].id()).unwrap();
        assert_eq!(take.parameters[0].ty.to_string(), "IReadOnlyList<string>");
        let first = model.call_target(calls[1].id()).unwrap();
        assert_eq!(first.return_type.as_ref().unwrap().to_string(), "int");
        assert!(model.errors().is_empty(), "{:?}", model.errors());
    }

    #[test]
    fn test_user_types_and_declared_symbols() {
        let (document, model) = bound(
            "namespace App {\n\
                 [GeneratedCode(\"tool\", \"1\")]\n\
                 class Bag { public Bag(int size) { } public int Size { get; } }\n\
                 class User { object Make() { return new Bag(3); } }\n\
             }",
        );
        let creation = first_of_kind(&document, SyntaxKind::ObjectCreationExpression);
        let target = model.call_target(creation.id()).unwrap();
        assert_eq!(target.containing_type, "App.Bag");
        let ty = first_of_kind(&document, SyntaxKind::TypeDeclaration);
        let symbol = model.declared_symbol(ty.id()).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Type);
        assert_eq!(symbol.attributes, vec!["GeneratedCode".to_string()]);
        assert!(model.type_by_metadata_name("App.Bag").unwrap().is_reference_type());
    }

    #[test]
    fn test_no_applicable_constructor() {
        let (_, model) = bound(
            "using System.Collections.Generic;\nclass C { object M() { return new List<int>(\"x\"); } }",
        );
        assert!(matches!(model.errors(), [BindError::NoApplicableOverload { .. }]));
    }

    #[test]
    fn test_number_literal_suffixes() {
        assert_eq!(number_type("0"), well_known::INT32);
        assert_eq!(number_type("10L"), well_known::INT64);
        assert_eq!(number_type("1.5"), well_known::DOUBLE);
        assert_eq!(number_type("2f"), well_known::SINGLE);
        assert_eq!(number_type("0xFF"), well_known::INT32);
    }

    #[test]
    fn test_namespace_chain() {
        assert_eq!(namespace_chain("A.B.C"), vec!["A.B.C", "A.B", "A"]);
        assert!(namespace_chain("").is_empty());
    }
}

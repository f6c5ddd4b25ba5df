//! AST builder that converts `tree-sitter-c-sharp` concrete syntax trees into
//! typed nodes.
//!
//! The builder walks the CST depth-first. Declarations, `return`, `yield`,
//! locals, invocations, member access, assignments and `new` expressions
//! become typed nodes. Every other construct (`if`, loops, `try`, lambdas,
//! operators, indexers, events...) becomes an [`Opaque`] node that keeps its
//! source text verbatim around the statements and expressions nested inside
//! it, so creations anywhere in a body stay reachable.
//!
//! # Node IDs and spans
//!
//! Each typed node takes a fresh id from [`next_node_id`] when its builder
//! starts, and the byte range of the CST node it came from is recorded for
//! that id.
//!
//! # Errors
//!
//! tree-sitter recovers from malformed input by inserting `ERROR` and
//! `MISSING` nodes. The first one found, in source order, is reported as a
//! [`SyntaxError`] and no tree is built.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tree_sitter::{Node, Parser, Tree};

use crate::errors::SyntaxError;
use crate::nodes::{
    AccessorDeclaration, AccessorKind, AccessorList, Argument, ArgumentList,
    ArrayCreationExpression, ArrayRankSpecifier, ArrayType, ArrowExpressionClause,
    AssignmentExpression, Attribute, Block, CompilationUnit, ConstructorDeclaration,
    ConstructorInitializer, Expression, ExpressionStatement, FieldDeclaration, GenericName,
    Identifier, InitializerExpression, InvocationExpression, LiteralExpression, LiteralKind,
    LocalDeclarationStatement, MemberAccessExpression, MemberBody, MemberDeclaration,
    MethodDeclaration, NamespaceDeclaration, NullableType, ObjectCreationExpression, Opaque,
    Parameter, ParameterList, ParameterModifier, Piece, PredefinedType, PropertyBody,
    PropertyDeclaration, ReturnStatement, SimpleName, Statement, SyntaxNode, TextRange,
    TypeDeclaration, TypeKeyword, TypeSyntax, UsingDirective, YieldKind, YieldStatement,
    next_node_id,
};

pub(crate) struct BuildOutput {
    pub root: Arc<CompilationUnit>,
    pub spans: FxHashMap<u64, TextRange>,
}

/// Parses `source` with the C# grammar. `None` if the grammar cannot be
/// loaded or the parser gives up.
pub(crate) fn parse_tree(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

/// Builds the typed tree for `source` from its parse `tree`.
pub(crate) fn build(source: &str, tree: &Tree) -> Result<BuildOutput, SyntaxError> {
    let root = tree.root_node();
    if let Some(error) = first_error(root, source) {
        return Err(error);
    }
    let mut builder = Builder {
        source,
        spans: FxHashMap::default(),
    };
    let root = builder.compilation_unit(root);
    Ok(BuildOutput {
        root,
        spans: builder.spans,
    })
}

fn first_error(node: Node<'_>, source: &str) -> Option<SyntaxError> {
    if node.is_missing() {
        return Some(SyntaxError::new(
            node.start_byte(),
            format!("missing `{}`", node.kind()),
        ));
    }
    if node.is_error() {
        let snippet: String = source
            .get(node.byte_range())
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(30)
            .collect();
        return Some(SyntaxError::new(
            node.start_byte(),
            format!("unexpected `{}`", snippet.trim()),
        ));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|child| first_error(child, source))
}

/// Named children without comments and other extras.
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|child| child.kind() == kind)
}

fn children_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    named_children(node)
        .into_iter()
        .filter(|child| child.kind() == kind)
        .collect()
}

/// Whether `node` has the anonymous token `token` as a direct child.
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token)
}

/// The first named child after the anonymous token `token`.
fn after_token<'t>(node: Node<'t>, token: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let mut seen = false;
    for child in node.children(&mut cursor) {
        if seen && child.is_named() && !child.is_extra() {
            return Some(child);
        }
        if !child.is_named() && child.kind() == token {
            seen = true;
        }
    }
    None
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "predefined_type"
            | "identifier"
            | "implicit_type"
            | "generic_name"
            | "qualified_name"
            | "alias_qualified_name"
            | "array_type"
            | "nullable_type"
            | "tuple_type"
            | "pointer_type"
            | "function_pointer_type"
            | "ref_type"
            | "scoped_type"
    )
}

/// The declared type of `node`: its `type` (or `returns`) field, else the
/// first type-shaped child that is not `name`.
fn type_child<'t>(node: Node<'t>, name: Option<Node<'t>>) -> Option<Node<'t>> {
    node.child_by_field_name("returns")
        .or_else(|| node.child_by_field_name("type"))
        .or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| is_type_kind(child.kind()) && Some(*child) != name)
        })
}

struct Builder<'s> {
    source: &'s str,
    spans: FxHashMap<u64, TextRange>,
}

impl<'s> Builder<'s> {
    fn record(&mut self, node: Node<'_>) -> u64 {
        let id = next_node_id();
        self.spans
            .insert(id, TextRange::new(node.start_byte(), node.end_byte()));
        id
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Node text with whitespace removed, for dotted names.
    fn compact_text(&self, node: Node<'_>) -> String {
        self.text(node).split_whitespace().collect()
    }

    // Declarations

    fn compilation_unit(&mut self, root: Node<'_>) -> Arc<CompilationUnit> {
        let id = next_node_id();
        self.spans.insert(id, TextRange::new(0, self.source.len()));
        let mut usings = Vec::new();
        let mut members = Vec::new();
        let mut file_scoped: Option<FileScopedNamespace> = None;
        for child in named_children(root) {
            if child.kind() == "file_scoped_namespace_declaration" {
                let mut namespace = FileScopedNamespace {
                    id: next_node_id(),
                    start: child.start_byte(),
                    end: child.end_byte(),
                    name: child
                        .child_by_field_name("name")
                        .map(|name| self.compact_text(name))
                        .unwrap_or_default(),
                    usings: Vec::new(),
                    members: Vec::new(),
                };
                let name = child.child_by_field_name("name");
                for item in named_children(child) {
                    if Some(item) != name {
                        self.item(item, &mut namespace.usings, &mut namespace.members);
                    }
                }
                file_scoped = Some(namespace);
                continue;
            }
            match &mut file_scoped {
                Some(namespace) => {
                    self.item(child, &mut namespace.usings, &mut namespace.members);
                    namespace.end = namespace.end.max(child.end_byte());
                }
                None => self.item(child, &mut usings, &mut members),
            }
        }
        if let Some(namespace) = file_scoped {
            self.spans
                .insert(namespace.id, TextRange::new(namespace.start, namespace.end));
            members.push(MemberDeclaration::Namespace(Arc::new(NamespaceDeclaration {
                id: namespace.id,
                name: namespace.name,
                file_scoped: true,
                usings: namespace.usings,
                members: namespace.members,
            })));
        }
        Arc::new(CompilationUnit {
            id,
            usings,
            members,
        })
    }

    fn item(
        &mut self,
        node: Node<'_>,
        usings: &mut Vec<Arc<UsingDirective>>,
        members: &mut Vec<MemberDeclaration>,
    ) {
        if node.kind() == "using_directive" {
            usings.push(self.using_directive(node));
        } else {
            members.push(self.member(node));
        }
    }

    fn using_directive(&mut self, node: Node<'_>) -> Arc<UsingDirective> {
        let id = self.record(node);
        let named = named_children(node);
        let alias = if let Some(name_equals) = child_of_kind(node, "name_equals") {
            named_children(name_equals)
                .first()
                .map(|alias| self.compact_text(*alias))
        } else if has_token(node, "=") {
            named.first().map(|alias| self.compact_text(*alias))
        } else {
            None
        };
        let name = named
            .last()
            .map(|name| self.compact_text(*name))
            .unwrap_or_default();
        Arc::new(UsingDirective {
            id,
            is_static: has_token(node, "static"),
            alias,
            name,
        })
    }

    fn member(&mut self, node: Node<'_>) -> MemberDeclaration {
        match node.kind() {
            "namespace_declaration" => MemberDeclaration::Namespace(self.namespace(node)),
            "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "record_declaration"
            | "record_struct_declaration" => MemberDeclaration::Type(self.type_declaration(node)),
            "method_declaration" => MemberDeclaration::Method(self.method(node)),
            "constructor_declaration" => MemberDeclaration::Constructor(self.constructor(node)),
            "property_declaration" if property_is_modelled(node) => {
                MemberDeclaration::Property(self.property(node))
            }
            "field_declaration" if single_declarator(node).is_some() => {
                MemberDeclaration::Field(self.field(node))
            }
            _ => MemberDeclaration::Other(self.opaque(node)),
        }
    }

    fn namespace(&mut self, node: Node<'_>) -> Arc<NamespaceDeclaration> {
        let id = self.record(node);
        let name = node
            .child_by_field_name("name")
            .map(|name| self.compact_text(name))
            .unwrap_or_default();
        let mut usings = Vec::new();
        let mut members = Vec::new();
        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "declaration_list"));
        if let Some(body) = body {
            for item in named_children(body) {
                self.item(item, &mut usings, &mut members);
            }
        }
        Arc::new(NamespaceDeclaration {
            id,
            name,
            file_scoped: false,
            usings,
            members,
        })
    }

    fn type_declaration(&mut self, node: Node<'_>) -> Arc<TypeDeclaration> {
        let id = self.record(node);
        let keyword = match node.kind() {
            "struct_declaration" | "record_struct_declaration" => TypeKeyword::Struct,
            "interface_declaration" => TypeKeyword::Interface,
            "record_declaration" if has_token(node, "struct") => TypeKeyword::Struct,
            "record_declaration" => TypeKeyword::Record,
            _ => TypeKeyword::Class,
        };
        let (attributes, modifiers) = self.attributes_and_modifiers(node);
        let name = self.name_of(node);
        let type_parameters = self.type_parameters(node);
        let mut base_types = Vec::new();
        if let Some(list) = child_of_kind(node, "base_list") {
            for base in named_children(list) {
                let ty = if is_type_kind(base.kind()) {
                    Some(base)
                } else {
                    type_child(base, None)
                };
                if let Some(ty) = ty {
                    base_types.push(self.type_syntax(ty));
                }
            }
        }
        let mut members = Vec::new();
        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "declaration_list"));
        if let Some(body) = body {
            for member in named_children(body) {
                members.push(self.member(member));
            }
        }
        Arc::new(TypeDeclaration {
            id,
            attributes,
            modifiers,
            keyword,
            name,
            type_parameters,
            base_types,
            members,
        })
    }

    fn attributes_and_modifiers(&mut self, node: Node<'_>) -> (Vec<Arc<Attribute>>, Vec<String>) {
        let mut attributes = Vec::new();
        let mut modifiers = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "attribute_list" => {
                    for attribute in children_of_kind(child, "attribute") {
                        attributes.push(self.attribute(attribute));
                    }
                }
                "modifier" => modifiers.push(self.text(child).to_string()),
                _ => {}
            }
        }
        (attributes, modifiers)
    }

    fn attribute(&mut self, node: Node<'_>) -> Arc<Attribute> {
        let id = self.record(node);
        let name = match node
            .child_by_field_name("name")
            .or_else(|| named_children(node).first().copied())
        {
            Some(name) => self.identifier(name),
            None => self.empty_identifier(node),
        };
        let arguments = child_of_kind(node, "attribute_argument_list").map(|list| self.argument_list(list));
        Arc::new(Attribute {
            id,
            name,
            arguments,
        })
    }

    fn name_of(&mut self, node: Node<'_>) -> Arc<Identifier> {
        match node
            .child_by_field_name("name")
            .or_else(|| child_of_kind(node, "identifier"))
        {
            Some(name) => self.identifier(name),
            None => self.empty_identifier(node),
        }
    }

    fn type_parameters(&mut self, node: Node<'_>) -> Vec<Arc<Identifier>> {
        let Some(list) = child_of_kind(node, "type_parameter_list") else {
            return Vec::new();
        };
        children_of_kind(list, "type_parameter")
            .into_iter()
            .map(|parameter| self.name_of(parameter))
            .collect()
    }

    fn method(&mut self, node: Node<'_>) -> Arc<MethodDeclaration> {
        let id = self.record(node);
        let (attributes, modifiers) = self.attributes_and_modifiers(node);
        let name_node = node.child_by_field_name("name");
        let return_type = self.type_or_placeholder(type_child(node, name_node), node);
        let name = self.name_of(node);
        let type_parameters = self.type_parameters(node);
        let parameters = self.parameters_of(node);
        let body = self.member_body(node);
        Arc::new(MethodDeclaration {
            id,
            attributes,
            modifiers,
            return_type,
            name,
            type_parameters,
            parameters,
            body,
        })
    }

    fn constructor(&mut self, node: Node<'_>) -> Arc<ConstructorDeclaration> {
        let id = self.record(node);
        let (attributes, modifiers) = self.attributes_and_modifiers(node);
        let name = self.name_of(node);
        let parameters = self.parameters_of(node);
        let initializer = child_of_kind(node, "constructor_initializer").and_then(|initializer| {
            let arguments = child_of_kind(initializer, "argument_list")?;
            let id = self.record(initializer);
            let keyword = if has_token(initializer, "base") { "base" } else { "this" };
            Some(Arc::new(ConstructorInitializer {
                id,
                keyword: keyword.to_string(),
                arguments: self.argument_list(arguments),
            }))
        });
        let body = self.member_body(node);
        Arc::new(ConstructorDeclaration {
            id,
            attributes,
            modifiers,
            name,
            parameters,
            initializer,
            body,
        })
    }

    fn property(&mut self, node: Node<'_>) -> Arc<PropertyDeclaration> {
        let id = self.record(node);
        let (attributes, modifiers) = self.attributes_and_modifiers(node);
        let name_node = node.child_by_field_name("name");
        let ty = self.type_or_placeholder(type_child(node, name_node), node);
        let name = self.name_of(node);
        let (body, initializer) = if let Some(list) = child_of_kind(node, "accessor_list") {
            let accessors = self.accessor_list(list);
            let initializer = after_token(node, "=").map(|value| self.expression(value));
            (PropertyBody::Accessors(accessors), initializer)
        } else {
            let arrow = child_of_kind(node, "arrow_expression_clause")
                .map(|arrow| self.arrow(arrow))
                .unwrap_or_else(|| self.arrow(node));
            (PropertyBody::Arrow(arrow), None)
        };
        Arc::new(PropertyDeclaration {
            id,
            attributes,
            modifiers,
            ty,
            name,
            body,
            initializer,
        })
    }

    fn accessor_list(&mut self, node: Node<'_>) -> Arc<AccessorList> {
        let id = self.record(node);
        let mut accessors = Vec::new();
        for accessor in children_of_kind(node, "accessor_declaration") {
            let Some(kind) = accessor_kind(accessor) else {
                continue;
            };
            let accessor_id = self.record(accessor);
            let modifiers = children_of_kind(accessor, "modifier")
                .into_iter()
                .map(|modifier| self.text(modifier).to_string())
                .collect();
            let body = self.member_body(accessor);
            accessors.push(Arc::new(AccessorDeclaration {
                id: accessor_id,
                modifiers,
                kind,
                body,
            }));
        }
        Arc::new(AccessorList { id, accessors })
    }

    fn field(&mut self, node: Node<'_>) -> Arc<FieldDeclaration> {
        let id = self.record(node);
        let (attributes, modifiers) = self.attributes_and_modifiers(node);
        let (ty, name, value) = match single_declarator(node) {
            Some((declaration, declarator)) => self.declaration(declaration, declarator),
            None => (
                self.type_or_placeholder(None, node),
                self.empty_identifier(node),
                None,
            ),
        };
        Arc::new(FieldDeclaration {
            id,
            attributes,
            modifiers,
            ty,
            name,
            value,
        })
    }

    /// Type, name and initial value of a one-declarator variable declaration.
    fn declaration(
        &mut self,
        declaration: Node<'_>,
        declarator: Node<'_>,
    ) -> (TypeSyntax, Arc<Identifier>, Option<Expression>) {
        let ty = self.type_or_placeholder(type_child(declaration, None), declaration);
        let name = self.name_of(declarator);
        let value = self.initial_value(declarator);
        (ty, name, value)
    }

    fn initial_value(&mut self, node: Node<'_>) -> Option<Expression> {
        let value = match child_of_kind(node, "equals_value_clause") {
            Some(clause) => named_children(clause).first().copied(),
            None => after_token(node, "="),
        };
        value.map(|value| self.expression(value))
    }

    fn parameters_of(&mut self, node: Node<'_>) -> Arc<ParameterList> {
        match node
            .child_by_field_name("parameters")
            .or_else(|| child_of_kind(node, "parameter_list"))
        {
            Some(list) => self.parameter_list(list),
            None => {
                let id = next_node_id();
                let at = node.end_byte();
                self.spans.insert(id, TextRange::new(at, at));
                Arc::new(ParameterList {
                    id,
                    parameters: Vec::new(),
                })
            }
        }
    }

    fn parameter_list(&mut self, node: Node<'_>) -> Arc<ParameterList> {
        let id = self.record(node);
        let mut parameters = Vec::new();
        for parameter in named_children(node) {
            if matches!(parameter.kind(), "parameter" | "parameter_array")
                && let Some(parameter) = self.parameter(parameter)
            {
                parameters.push(parameter);
            }
        }
        Arc::new(ParameterList { id, parameters })
    }

    fn parameter(&mut self, node: Node<'_>) -> Option<Arc<Parameter>> {
        let name_node = node.child_by_field_name("name");
        let ty_node = type_child(node, name_node)?;
        let id = self.record(node);
        let modifier = {
            let mut cursor = node.walk();
            node.children(&mut cursor).find_map(|child| {
                if child.is_named() && child.kind() != "modifier" && child.kind() != "parameter_modifier" {
                    None
                } else {
                    ParameterModifier::from_keyword(self.text(child))
                }
            })
        };
        let ty = self.type_syntax(ty_node);
        let name = self.name_of(node);
        let default = self.initial_value(node);
        Some(Arc::new(Parameter {
            id,
            modifier,
            ty,
            name,
            default,
        }))
    }

    fn member_body(&mut self, node: Node<'_>) -> Option<MemberBody> {
        for child in named_children(node) {
            match child.kind() {
                "block" => return Some(MemberBody::Block(self.block(child))),
                "arrow_expression_clause" => return Some(MemberBody::Arrow(self.arrow(child))),
                _ => {}
            }
        }
        None
    }

    fn arrow(&mut self, node: Node<'_>) -> Arc<ArrowExpressionClause> {
        let id = self.record(node);
        let expression = self.expression_child(node);
        Arc::new(ArrowExpressionClause { id, expression })
    }

    // Statements

    fn block(&mut self, node: Node<'_>) -> Arc<Block> {
        let id = self.record(node);
        let statements = named_children(node)
            .into_iter()
            .map(|statement| self.statement(statement))
            .collect();
        Arc::new(Block { id, statements })
    }

    fn statement(&mut self, node: Node<'_>) -> Statement {
        match node.kind() {
            "block" => Statement::Block(self.block(node)),
            "return_statement" => {
                let id = self.record(node);
                let expression = named_children(node)
                    .first()
                    .map(|expression| self.expression(*expression));
                Statement::Return(Arc::new(ReturnStatement { id, expression }))
            }
            "yield_statement" => {
                let id = self.record(node);
                let (kind, expression) = if has_token(node, "break") {
                    (YieldKind::Break, None)
                } else {
                    let expression = named_children(node)
                        .first()
                        .map(|expression| self.expression(*expression));
                    (YieldKind::Return, expression)
                };
                Statement::Yield(Arc::new(YieldStatement {
                    id,
                    kind,
                    expression,
                }))
            }
            "expression_statement" if !named_children(node).is_empty() => {
                let id = self.record(node);
                let expression = self.expression_child(node);
                Statement::Expression(Arc::new(ExpressionStatement { id, expression }))
            }
            "local_declaration_statement" if local_is_modelled(node) => {
                match single_declarator(node) {
                    Some((declaration, declarator)) => {
                        let id = self.record(node);
                        let (ty, name, value) = self.declaration(declaration, declarator);
                        Statement::LocalDeclaration(Arc::new(LocalDeclarationStatement {
                            id,
                            ty,
                            name,
                            value,
                        }))
                    }
                    None => Statement::Other(self.opaque(node)),
                }
            }
            _ => Statement::Other(self.opaque(node)),
        }
    }

    // Expressions

    fn expression_child(&mut self, node: Node<'_>) -> Expression {
        match named_children(node).first() {
            Some(expression) => self.expression(*expression),
            None => Expression::Other(self.opaque(node)),
        }
    }

    fn expression(&mut self, node: Node<'_>) -> Expression {
        let built = match node.kind() {
            "identifier" | "predefined_type" => Some(Expression::Identifier(self.identifier(node))),
            "this" | "this_expression" => Some(Expression::Identifier(self.named_identifier(node, "this"))),
            "generic_name" => Some(Expression::GenericName(self.generic_name(node, node, ""))),
            "qualified_name" => self.qualified_expression(node),
            "integer_literal" | "real_literal" => Some(self.literal(node, LiteralKind::Number)),
            "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
                Some(self.literal(node, LiteralKind::String))
            }
            "character_literal" => Some(self.literal(node, LiteralKind::Char)),
            "boolean_literal" => {
                let kind = if self.text(node).trim() == "true" {
                    LiteralKind::True
                } else {
                    LiteralKind::False
                };
                Some(self.literal(node, kind))
            }
            "null_literal" => Some(self.literal(node, LiteralKind::Null)),
            "object_creation_expression" => self.object_creation(node),
            "array_creation_expression" => self.array_creation(node),
            "invocation_expression" => self.invocation(node),
            "member_access_expression" => self.member_access(node),
            "assignment_expression" => self.assignment(node),
            "initializer_expression" => Some(Expression::Initializer(self.initializer(node))),
            _ => None,
        };
        built.unwrap_or_else(|| Expression::Other(self.opaque(node)))
    }

    fn literal(&mut self, node: Node<'_>, kind: LiteralKind) -> Expression {
        let id = self.record(node);
        Expression::Literal(Arc::new(LiteralExpression {
            id,
            kind,
            text: self.text(node).to_string(),
        }))
    }

    fn object_creation(&mut self, node: Node<'_>) -> Option<Expression> {
        let ty_node = type_child(node, None).filter(|ty| ty.kind() != "array_type")?;
        let arguments = child_of_kind(node, "argument_list");
        let initializer = child_of_kind(node, "initializer_expression");
        if arguments.is_none() && initializer.is_none() {
            return None;
        }
        let id = self.record(node);
        let ty = self.type_syntax(ty_node);
        let arguments = arguments.map(|list| self.argument_list(list));
        let initializer = initializer.map(|initializer| self.initializer(initializer));
        Some(Expression::ObjectCreation(Arc::new(ObjectCreationExpression {
            id,
            ty,
            arguments,
            initializer,
        })))
    }

    fn array_creation(&mut self, node: Node<'_>) -> Option<Expression> {
        let ty_node = node
            .child_by_field_name("type")
            .or_else(|| child_of_kind(node, "array_type"))
            .filter(|ty| ty.kind() == "array_type")?;
        let id = self.record(node);
        let ty = self.array_type(ty_node);
        let initializer = child_of_kind(node, "initializer_expression").map(|initializer| self.initializer(initializer));
        Some(Expression::ArrayCreation(Arc::new(ArrayCreationExpression {
            id,
            ty,
            initializer,
        })))
    }

    fn invocation(&mut self, node: Node<'_>) -> Option<Expression> {
        let arguments = node
            .child_by_field_name("arguments")
            .or_else(|| child_of_kind(node, "argument_list"))?;
        let function = node
            .child_by_field_name("function")
            .or_else(|| named_children(node).first().copied())
            .filter(|function| *function != arguments)?;
        let id = self.record(node);
        let expression = self.expression(function);
        let arguments = self.argument_list(arguments);
        Some(Expression::Invocation(Arc::new(InvocationExpression {
            id,
            expression,
            arguments,
        })))
    }

    fn member_access(&mut self, node: Node<'_>) -> Option<Expression> {
        if !has_token(node, ".") {
            return None;
        }
        let named = named_children(node);
        let receiver = node
            .child_by_field_name("expression")
            .or_else(|| named.first().copied())?;
        let name = node
            .child_by_field_name("name")
            .or_else(|| named.last().copied())
            .filter(|name| *name != receiver && matches!(name.kind(), "identifier" | "generic_name"))?;
        let id = self.record(node);
        let expression = self.expression(receiver);
        let name = self.simple_name(name, "");
        Some(Expression::MemberAccess(Arc::new(MemberAccessExpression {
            id,
            expression,
            name,
        })))
    }

    /// `A.B.C` in expression position, as nested member access.
    fn qualified_expression(&mut self, node: Node<'_>) -> Option<Expression> {
        let named = named_children(node);
        let qualifier = node
            .child_by_field_name("qualifier")
            .or_else(|| named.first().copied())?;
        let name = node
            .child_by_field_name("name")
            .or_else(|| named.last().copied())
            .filter(|name| *name != qualifier && matches!(name.kind(), "identifier" | "generic_name"))?;
        let id = self.record(node);
        let expression = self.expression(qualifier);
        let name = self.simple_name(name, "");
        Some(Expression::MemberAccess(Arc::new(MemberAccessExpression {
            id,
            expression,
            name,
        })))
    }

    fn assignment(&mut self, node: Node<'_>) -> Option<Expression> {
        let simple = match node.child_by_field_name("operator") {
            Some(operator) => self.text(operator).trim() == "=",
            None => has_token(node, "="),
        };
        if !simple {
            return None;
        }
        let operands: Vec<Node<'_>> = named_children(node)
            .into_iter()
            .filter(|child| child.kind() != "assignment_operator")
            .collect();
        let left = node
            .child_by_field_name("left")
            .or_else(|| operands.first().copied())?;
        let right = node
            .child_by_field_name("right")
            .or_else(|| operands.last().copied())
            .filter(|right| *right != left)?;
        let id = self.record(node);
        let left = self.expression(left);
        let right = self.expression(right);
        Some(Expression::Assignment(Arc::new(AssignmentExpression {
            id,
            left,
            right,
        })))
    }

    fn initializer(&mut self, node: Node<'_>) -> Arc<InitializerExpression> {
        let id = self.record(node);
        let expressions = named_children(node)
            .into_iter()
            .map(|expression| self.expression(expression))
            .collect();
        Arc::new(InitializerExpression { id, expressions })
    }

    /// `(...)` of a call or creation, or `(...)` of an attribute.
    fn argument_list(&mut self, node: Node<'_>) -> Arc<ArgumentList> {
        let id = self.record(node);
        let arguments = named_children(node)
            .into_iter()
            .filter(|argument| matches!(argument.kind(), "argument" | "attribute_argument"))
            .map(|argument| self.argument(argument))
            .collect();
        Arc::new(ArgumentList { id, arguments })
    }

    fn argument(&mut self, node: Node<'_>) -> Arc<Argument> {
        let id = self.record(node);
        let named = named_children(node);
        let labelled = named.len() > 1
            && named[0].kind() == "identifier"
            && (has_token(node, ":") || has_token(node, "="));
        let name = match node.child_by_field_name("name") {
            Some(name) => Some(self.identifier(name)),
            None if labelled => Some(self.identifier(named[0])),
            None => None,
        };
        let modifier = {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|child| !child.is_named())
                .find_map(|child| ParameterModifier::from_keyword(child.kind()))
        };
        let expression = match named.last() {
            Some(expression) => self.expression(*expression),
            None => Expression::Other(self.opaque(node)),
        };
        Arc::new(Argument {
            id,
            name,
            modifier,
            expression,
        })
    }

    // Names and types

    fn identifier(&mut self, node: Node<'_>) -> Arc<Identifier> {
        let name = self.compact_text(node);
        self.named_identifier(node, &name)
    }

    fn named_identifier(&mut self, node: Node<'_>, name: &str) -> Arc<Identifier> {
        let id = self.record(node);
        Arc::new(Identifier {
            id,
            name: name.to_string(),
        })
    }

    /// Zero-width identifier at the start of `node`, for a name the grammar
    /// left out.
    fn empty_identifier(&mut self, node: Node<'_>) -> Arc<Identifier> {
        let id = next_node_id();
        let at = node.start_byte();
        self.spans.insert(id, TextRange::new(at, at));
        Arc::new(Identifier {
            id,
            name: String::new(),
        })
    }

    fn simple_name(&mut self, node: Node<'_>, prefix: &str) -> SimpleName {
        if node.kind() == "generic_name" {
            SimpleName::Generic(self.generic_name(node, node, prefix))
        } else {
            let name = format!("{prefix}{}", self.compact_text(node));
            SimpleName::Identifier(self.named_identifier(node, &name))
        }
    }

    /// `Name<T, U>`; the node id covers `span`, which is wider than `node`
    /// when a qualifier is folded into the name.
    fn generic_name(&mut self, node: Node<'_>, span: Node<'_>, prefix: &str) -> Arc<GenericName> {
        let id = self.record(span);
        let name = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "identifier")
            .map(|identifier| self.compact_text(identifier))
            .unwrap_or_default();
        let type_arguments: Vec<TypeSyntax> = child_of_kind(node, "type_argument_list")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .map(|argument| self.type_syntax(argument))
                    .collect()
            })
            .unwrap_or_default();
        Arc::new(GenericName {
            id,
            name: format!("{prefix}{name}"),
            type_arguments,
        })
    }

    fn type_or_placeholder(&mut self, node: Option<Node<'_>>, owner: Node<'_>) -> TypeSyntax {
        match node {
            Some(node) => self.type_syntax(node),
            None => TypeSyntax::Identifier(self.empty_identifier(owner)),
        }
    }

    fn type_syntax(&mut self, node: Node<'_>) -> TypeSyntax {
        match node.kind() {
            "predefined_type" => {
                let id = self.record(node);
                TypeSyntax::Predefined(Arc::new(PredefinedType {
                    id,
                    keyword: self.text(node).to_string(),
                }))
            }
            "generic_name" => TypeSyntax::Generic(self.generic_name(node, node, "")),
            "qualified_name" => self.qualified_type(node),
            "array_type" => TypeSyntax::Array(self.array_type(node)),
            "nullable_type" => {
                let id = self.record(node);
                let element_type = self.type_or_placeholder(type_child(node, None), node);
                TypeSyntax::Nullable(Arc::new(NullableType { id, element_type }))
            }
            _ => TypeSyntax::Identifier(self.identifier(node)),
        }
    }

    /// `A.B.List<T>` as one dotted generic or identifier name.
    fn qualified_type(&mut self, node: Node<'_>) -> TypeSyntax {
        let named = named_children(node);
        let qualifier = node
            .child_by_field_name("qualifier")
            .or_else(|| named.first().copied());
        let name = node
            .child_by_field_name("name")
            .or_else(|| named.last().copied())
            .filter(|name| Some(*name) != qualifier);
        match (qualifier, name) {
            (Some(qualifier), Some(name)) if name.kind() == "generic_name" => {
                let prefix = format!("{}.", self.compact_text(qualifier));
                TypeSyntax::Generic(self.generic_name(name, node, &prefix))
            }
            _ => TypeSyntax::Identifier(self.identifier(node)),
        }
    }

    /// Nested CST array types flatten into one node whose rank specifiers
    /// are in source order: `int[0][]` has element `int` and ranks `[0]`, `[]`.
    fn array_type(&mut self, node: Node<'_>) -> Arc<ArrayType> {
        let id = self.record(node);
        let mut ranks: Vec<Node<'_>> = Vec::new();
        let mut current = node;
        let element = loop {
            let mut own = children_of_kind(current, "array_rank_specifier");
            own.append(&mut ranks);
            ranks = own;
            let inner = current.child_by_field_name("type").or_else(|| {
                named_children(current)
                    .into_iter()
                    .find(|child| child.kind() != "array_rank_specifier")
            });
            match inner {
                Some(inner) if inner.kind() == "array_type" => current = inner,
                other => break other,
            }
        };
        let element_type = self.type_or_placeholder(element, node);
        let rank_specifiers = ranks
            .into_iter()
            .map(|rank| self.rank_specifier(rank))
            .collect();
        Arc::new(ArrayType {
            id,
            element_type,
            rank_specifiers,
        })
    }

    /// `[` size? (`,` size?)* `]`; omitted sizes are `None`.
    fn rank_specifier(&mut self, node: Node<'_>) -> Arc<ArrayRankSpecifier> {
        let id = self.record(node);
        let children: Vec<Node<'_>> = {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|child| !child.is_extra())
                .collect()
        };
        let mut sizes = Vec::new();
        let mut size = None;
        for child in children {
            if child.is_named() {
                size = Some(self.expression(child));
            } else if matches!(child.kind(), "," | "]") {
                sizes.push(size.take());
            }
        }
        Arc::new(ArrayRankSpecifier { id, sizes })
    }

    // Everything else

    fn opaque(&mut self, node: Node<'_>) -> Arc<Opaque> {
        let id = self.record(node);
        let mut pieces = Vec::new();
        let mut written = node.start_byte();
        self.flatten(node, &mut pieces, &mut written);
        self.push_text(&mut pieces, written, node.end_byte());
        Arc::new(Opaque {
            id,
            kind: node.kind().to_string(),
            pieces,
        })
    }

    /// Splits `node` into verbatim text and typed children. Statements and
    /// structured expressions become typed; names, literals and tokens stay
    /// text; anything else is split further.
    fn flatten(&mut self, node: Node<'_>, pieces: &mut Vec<Piece>, written: &mut usize) {
        for child in named_children(node) {
            let kind = child.kind();
            let typed = if kind == "block" || kind.ends_with("_statement") {
                Some(SyntaxNode::from(self.statement(child)))
            } else if kind.ends_with("_expression") {
                Some(SyntaxNode::from(self.expression(child)))
            } else {
                None
            };
            match typed {
                Some(typed) => {
                    self.push_text(pieces, *written, child.start_byte());
                    pieces.push(Piece::Node(typed));
                    *written = child.end_byte();
                }
                None if child.named_child_count() > 0 => self.flatten(child, pieces, written),
                None => {}
            }
        }
    }

    fn push_text(&self, pieces: &mut Vec<Piece>, from: usize, to: usize) {
        if from < to
            && let Some(text) = self.source.get(from..to)
        {
            pieces.push(Piece::Text(text.to_string()));
        }
    }
}

struct FileScopedNamespace {
    id: u64,
    start: usize,
    end: usize,
    name: String,
    usings: Vec<Arc<UsingDirective>>,
    members: Vec<MemberDeclaration>,
}

fn accessor_kind(node: Node<'_>) -> Option<AccessorKind> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(|child| match child.kind() {
        "get" => Some(AccessorKind::Get),
        "set" => Some(AccessorKind::Set),
        "init" => Some(AccessorKind::Init),
        _ => None,
    })
}

/// Properties with `get`/`set`/`init` accessors or an arrow body.
fn property_is_modelled(node: Node<'_>) -> bool {
    match child_of_kind(node, "accessor_list") {
        Some(list) => children_of_kind(list, "accessor_declaration")
            .into_iter()
            .all(|accessor| accessor_kind(accessor).is_some()),
        None => child_of_kind(node, "arrow_expression_clause").is_some(),
    }
}

/// Plain `Type name = value;` locals; `using`, `await using` and `const`
/// declarations stay opaque.
fn local_is_modelled(node: Node<'_>) -> bool {
    !has_token(node, "using")
        && !has_token(node, "await")
        && child_of_kind(node, "modifier").is_none()
}

/// The variable declaration and its only declarator, when it declares
/// exactly one plainly named variable.
fn single_declarator(node: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    let declaration = child_of_kind(node, "variable_declaration")?;
    let declarators = children_of_kind(declaration, "variable_declarator");
    let [declarator] = declarators.as_slice() else {
        return None;
    };
    let plain = child_of_kind(*declarator, "identifier").is_some()
        && child_of_kind(*declarator, "bracketed_argument_list").is_none()
        && child_of_kind(*declarator, "tuple_pattern").is_none();
    plain.then_some((declaration, *declarator))
}

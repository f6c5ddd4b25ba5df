//! Canonical source printer.
//!
//! Emits four-space indented C# for any subtree and records the range of
//! every node it writes. In reuse mode, a node that is the very same
//! allocation as a node of an existing document is copied verbatim from that
//! document's text, so untouched code keeps its original bytes.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::document::Document;
use crate::nodes::{
    AccessorDeclaration, AccessorList, Attribute, Expression, MemberBody, MemberDeclaration,
    Piece, PropertyBody, SyntaxNode, TextRange, UsingDirective,
};

const INDENT: &str = "    ";

pub struct Printer<'a> {
    out: String,
    indent: usize,
    base: usize,
    spans: FxHashMap<u64, TextRange>,
    reuse: Option<&'a Document>,
}

impl Default for Printer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Printer<'a> {
    #[must_use]
    pub fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
            base: 0,
            spans: FxHashMap::default(),
            reuse: None,
        }
    }

    /// A printer whose output will be spliced into `document`'s text at
    /// `base`; spans are recorded relative to the spliced text.
    pub(crate) fn reusing(document: &'a Document, base: usize) -> Self {
        Printer {
            base,
            reuse: Some(document),
            ..Printer::new()
        }
    }

    #[must_use]
    pub fn finish(self) -> (String, FxHashMap<u64, TextRange>) {
        (self.out, self.spans)
    }

    pub fn print(&mut self, node: &SyntaxNode) {
        if self.try_reuse(node) {
            return;
        }
        let start = self.offset();
        self.print_node(node);
        let end = self.offset();
        self.spans.insert(node.id(), TextRange::new(start, end));
    }

    fn offset(&self) -> usize {
        self.base + self.out.len()
    }

    fn try_reuse(&mut self, node: &SyntaxNode) -> bool {
        let Some(document) = self.reuse else {
            return false;
        };
        let arena = document.arena();
        let same = arena
            .find_node(node.id())
            .is_some_and(|existing| existing.ptr_eq(node));
        let Some(range) = arena.span(node.id()).filter(|_| same) else {
            return false;
        };
        let Some(text) = document.text().get(range.start..range.end) else {
            return false;
        };
        let delta = self.offset().cast_signed() - range.start.cast_signed();
        self.out.push_str(text);
        let mut stack = vec![node.clone()];
        while let Some(current) = stack.pop() {
            if let Some(span) = arena.span(current.id()) {
                self.spans.insert(current.id(), span.shifted(delta));
            }
            stack.extend(current.children());
        }
        true
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn line_break(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn child<T: Clone + Into<SyntaxNode>>(&mut self, child: &T) {
        self.print(&child.clone().into());
    }

    fn separated<T: Clone + Into<SyntaxNode>>(&mut self, items: &[T], separator: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.child(item);
        }
    }

    fn modifiers(&mut self, modifiers: &[String]) {
        for modifier in modifiers {
            self.push(modifier);
            self.push(" ");
        }
    }

    fn attributes(&mut self, attributes: &[Arc<Attribute>]) {
        for attribute in attributes {
            self.push("[");
            self.child(attribute);
            self.push("]");
            self.line_break();
        }
    }

    fn usings_and_members(&mut self, usings: &[Arc<UsingDirective>], members: &[MemberDeclaration]) {
        for (i, using) in usings.iter().enumerate() {
            if i > 0 {
                self.line_break();
            }
            self.child(using);
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 || !usings.is_empty() {
                self.push("\n");
                self.line_break();
            }
            self.child(member);
        }
    }

    fn member_body(&mut self, body: Option<&MemberBody>) {
        match body {
            None => self.push(";"),
            Some(MemberBody::Block(block)) => {
                self.line_break();
                self.child(block);
            }
            Some(MemberBody::Arrow(arrow)) => {
                self.push(" ");
                self.child(arrow);
                self.push(";");
            }
        }
    }

    fn type_parameters<T: Clone + Into<SyntaxNode>>(&mut self, parameters: &[T]) {
        if !parameters.is_empty() {
            self.push("<");
            self.separated(parameters, ", ");
            self.push(">");
        }
    }

    fn optional_expression(&mut self, prefix: &str, expression: Option<&Expression>) {
        if let Some(expression) = expression {
            self.push(prefix);
            self.child(expression);
        }
    }

    fn accessor_list(&mut self, list: &AccessorList) {
        let single_line = list
            .accessors
            .iter()
            .all(|a| !matches!(a.body, Some(MemberBody::Block(_))));
        if single_line {
            self.push("{ ");
            self.separated(&list.accessors, " ");
            self.push(" }");
            return;
        }
        self.push("{");
        self.indent += 1;
        for accessor in &list.accessors {
            self.line_break();
            self.child(accessor);
        }
        self.indent -= 1;
        self.line_break();
        self.push("}");
    }

    fn accessor(&mut self, accessor: &AccessorDeclaration) {
        self.modifiers(&accessor.modifiers);
        self.push(accessor.kind.as_str());
        self.member_body(accessor.body.as_ref());
    }

    #[allow(clippy::too_many_lines)]
    fn print_node(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::CompilationUnit(n) => {
                self.usings_and_members(&n.usings, &n.members);
                if !n.usings.is_empty() || !n.members.is_empty() {
                    self.push("\n");
                }
            }
            SyntaxNode::UsingDirective(n) => {
                self.push("using ");
                if n.is_static {
                    self.push("static ");
                }
                if let Some(alias) = &n.alias {
                    self.push(alias);
                    self.push(" = ");
                }
                self.push(&n.name);
                self.push(";");
            }
            SyntaxNode::NamespaceDeclaration(n) => {
                self.push("namespace ");
                self.push(&n.name);
                if n.file_scoped {
                    self.push(";");
                    if !n.usings.is_empty() || !n.members.is_empty() {
                        self.push("\n");
                        self.line_break();
                    }
                    self.usings_and_members(&n.usings, &n.members);
                } else {
                    self.line_break();
                    self.push("{");
                    self.indent += 1;
                    if !n.usings.is_empty() || !n.members.is_empty() {
                        self.line_break();
                    }
                    self.usings_and_members(&n.usings, &n.members);
                    self.indent -= 1;
                    self.line_break();
                    self.push("}");
                }
            }
            SyntaxNode::TypeDeclaration(n) => {
                self.attributes(&n.attributes);
                self.modifiers(&n.modifiers);
                self.push(n.keyword.as_str());
                self.push(" ");
                self.child(&n.name);
                self.type_parameters(&n.type_parameters);
                if !n.base_types.is_empty() {
                    self.push(" : ");
                    self.separated(&n.base_types, ", ");
                }
                self.line_break();
                self.push("{");
                self.indent += 1;
                for (i, member) in n.members.iter().enumerate() {
                    if i > 0 {
                        self.push("\n");
                    }
                    self.line_break();
                    self.child(member);
                }
                self.indent -= 1;
                self.line_break();
                self.push("}");
            }
            SyntaxNode::Attribute(n) => {
                self.child(&n.name);
                if let Some(arguments) = &n.arguments {
                    self.child(arguments);
                }
            }
            SyntaxNode::MethodDeclaration(n) => {
                self.attributes(&n.attributes);
                self.modifiers(&n.modifiers);
                self.child(&n.return_type);
                self.push(" ");
                self.child(&n.name);
                self.type_parameters(&n.type_parameters);
                self.child(&n.parameters);
                self.member_body(n.body.as_ref());
            }
            SyntaxNode::ConstructorDeclaration(n) => {
                self.attributes(&n.attributes);
                self.modifiers(&n.modifiers);
                self.child(&n.name);
                self.child(&n.parameters);
                if let Some(initializer) = &n.initializer {
                    self.push(" : ");
                    self.child(initializer);
                }
                self.member_body(n.body.as_ref());
            }
            SyntaxNode::ConstructorInitializer(n) => {
                self.push(&n.keyword);
                self.child(&n.arguments);
            }
            SyntaxNode::PropertyDeclaration(n) => {
                self.attributes(&n.attributes);
                self.modifiers(&n.modifiers);
                self.child(&n.ty);
                self.push(" ");
                self.child(&n.name);
                self.push(" ");
                self.child(&n.body);
                match (&n.body, &n.initializer) {
                    (PropertyBody::Arrow(_), _) => self.push(";"),
                    (PropertyBody::Accessors(_), Some(initializer)) => {
                        self.push(" = ");
                        self.child(initializer);
                        self.push(";");
                    }
                    (PropertyBody::Accessors(_), None) => {}
                }
            }
            SyntaxNode::FieldDeclaration(n) => {
                self.attributes(&n.attributes);
                self.modifiers(&n.modifiers);
                self.child(&n.ty);
                self.push(" ");
                self.child(&n.name);
                self.optional_expression(" = ", n.value.as_ref());
                self.push(";");
            }
            SyntaxNode::ParameterList(n) => {
                self.push("(");
                self.separated(&n.parameters, ", ");
                self.push(")");
            }
            SyntaxNode::Parameter(n) => {
                if let Some(modifier) = n.modifier {
                    self.push(modifier.as_str());
                    self.push(" ");
                }
                self.child(&n.ty);
                self.push(" ");
                self.child(&n.name);
                self.optional_expression(" = ", n.default.as_ref());
            }
            SyntaxNode::AccessorList(n) => self.accessor_list(n),
            SyntaxNode::AccessorDeclaration(n) => self.accessor(n),
            SyntaxNode::Block(n) => {
                if n.statements.is_empty() {
                    self.push("{ }");
                    return;
                }
                self.push("{");
                self.indent += 1;
                for statement in &n.statements {
                    self.line_break();
                    self.child(statement);
                }
                self.indent -= 1;
                self.line_break();
                self.push("}");
            }
            SyntaxNode::ArrowExpressionClause(n) => {
                self.push("=> ");
                self.child(&n.expression);
            }
            SyntaxNode::ReturnStatement(n) => {
                self.push("return");
                self.optional_expression(" ", n.expression.as_ref());
                self.push(";");
            }
            SyntaxNode::YieldStatement(n) => {
                self.push("yield ");
                self.push(n.kind.as_str());
                self.optional_expression(" ", n.expression.as_ref());
                self.push(";");
            }
            SyntaxNode::ExpressionStatement(n) => {
                self.child(&n.expression);
                self.push(";");
            }
            SyntaxNode::LocalDeclarationStatement(n) => {
                self.child(&n.ty);
                self.push(" ");
                self.child(&n.name);
                self.optional_expression(" = ", n.value.as_ref());
                self.push(";");
            }
            SyntaxNode::ObjectCreationExpression(n) => {
                self.push("new ");
                self.child(&n.ty);
                if let Some(arguments) = &n.arguments {
                    self.child(arguments);
                }
                if let Some(initializer) = &n.initializer {
                    self.push(" ");
                    self.child(initializer);
                }
            }
            SyntaxNode::ArrayCreationExpression(n) => {
                self.push("new ");
                self.child(&n.ty);
                if let Some(initializer) = &n.initializer {
                    self.push(" ");
                    self.child(initializer);
                }
            }
            SyntaxNode::InvocationExpression(n) => {
                self.child(&n.expression);
                self.child(&n.arguments);
            }
            SyntaxNode::MemberAccessExpression(n) => {
                self.child(&n.expression);
                self.push(".");
                self.child(&n.name);
            }
            SyntaxNode::AssignmentExpression(n) => {
                self.child(&n.left);
                self.push(" = ");
                self.child(&n.right);
            }
            SyntaxNode::ArgumentList(n) => {
                self.push("(");
                self.separated(&n.arguments, ", ");
                self.push(")");
            }
            SyntaxNode::Argument(n) => {
                if let Some(name) = &n.name {
                    self.child(name);
                    self.push(": ");
                }
                if let Some(modifier) = n.modifier {
                    self.push(modifier.as_str());
                    self.push(" ");
                }
                self.child(&n.expression);
            }
            SyntaxNode::InitializerExpression(n) => {
                if n.expressions.is_empty() {
                    self.push("{ }");
                } else {
                    self.push("{ ");
                    self.separated(&n.expressions, ", ");
                    self.push(" }");
                }
            }
            SyntaxNode::Identifier(n) => self.push(&n.name),
            SyntaxNode::GenericName(n) => {
                self.push(&n.name);
                self.push("<");
                self.separated(&n.type_arguments, ", ");
                self.push(">");
            }
            SyntaxNode::LiteralExpression(n) => self.push(&n.text),
            SyntaxNode::PredefinedType(n) => self.push(&n.keyword),
            SyntaxNode::ArrayType(n) => {
                self.child(&n.element_type);
                self.separated(&n.rank_specifiers, "");
            }
            SyntaxNode::NullableType(n) => {
                self.child(&n.element_type);
                self.push("?");
            }
            SyntaxNode::Opaque(n) => {
                for piece in &n.pieces {
                    match piece {
                        Piece::Text(text) => self.push(text),
                        Piece::Node(node) => self.print(node),
                    }
                }
            }
            SyntaxNode::ArrayRankSpecifier(n) => {
                self.push("[");
                for (i, size) in n.sizes.iter().enumerate() {
                    if i > 0 {
                        self.push(",");
                    }
                    if let Some(size) = size {
                        self.child(size);
                    }
                }
                self.push("]");
            }
        }
    }
}

/// Renders `node` on its own, starting at offset zero.
#[must_use]
pub fn render(node: &SyntaxNode) -> String {
    let mut printer = Printer::new();
    printer.print(node);
    printer.finish().0
}

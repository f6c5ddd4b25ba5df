use std::sync::Arc;

use crate::nodes::{
    AccessorKind, Argument, ArgumentList, AstChild, CompilationUnit, Expression, GenericName,
    Identifier, InvocationExpression, LiteralKind, MemberAccessExpression, Opaque,
    ParameterModifier, Piece, SimpleName, SyntaxNode, TypeKeyword, TypeSyntax, YieldKind,
    next_node_id,
};

impl TypeKeyword {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKeyword::Class => "class",
            TypeKeyword::Struct => "struct",
            TypeKeyword::Interface => "interface",
            TypeKeyword::Record => "record",
        }
    }
}

impl AccessorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
            AccessorKind::Init => "init",
        }
    }
}

impl YieldKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            YieldKind::Return => "return",
            YieldKind::Break => "break",
        }
    }
}

impl ParameterModifier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterModifier::Params => "params",
            ParameterModifier::Ref => "ref",
            ParameterModifier::Out => "out",
            ParameterModifier::In => "in",
            ParameterModifier::This => "this",
        }
    }

    /// Modifier spelled by `keyword`, if any.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "params" => Some(ParameterModifier::Params),
            "ref" => Some(ParameterModifier::Ref),
            "out" => Some(ParameterModifier::Out),
            "in" => Some(ParameterModifier::In),
            "this" => Some(ParameterModifier::This),
            _ => None,
        }
    }
}

impl LiteralKind {
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, LiteralKind::Number)
    }
}

impl CompilationUnit {
    /// Whether a top-level or namespace-level `using` imports `namespace`.
    #[must_use]
    pub fn imports(&self, namespace: &str) -> bool {
        fn scan(usings: &[Arc<crate::nodes::UsingDirective>], namespace: &str) -> bool {
            usings
                .iter()
                .any(|u| !u.is_static && u.alias.is_none() && u.name == namespace)
        }
        fn scan_members(members: &[crate::nodes::MemberDeclaration], namespace: &str) -> bool {
            members.iter().any(|member| match member {
                crate::nodes::MemberDeclaration::Namespace(ns) => {
                    scan(&ns.usings, namespace) || scan_members(&ns.members, namespace)
                }
                _ => false,
            })
        }
        scan(&self.usings, namespace) || scan_members(&self.members, namespace)
    }
}

impl Identifier {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Identifier {
            id: next_node_id(),
            name: name.into(),
        })
    }

    /// The right-most segment of a dotted name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl GenericName {
    #[must_use]
    pub fn new(name: impl Into<String>, type_arguments: Vec<TypeSyntax>) -> Arc<Self> {
        Arc::new(GenericName {
            id: next_node_id(),
            name: name.into(),
            type_arguments,
        })
    }
}

impl MemberAccessExpression {
    #[must_use]
    pub fn new(expression: Expression, name: SimpleName) -> Arc<Self> {
        Arc::new(MemberAccessExpression {
            id: next_node_id(),
            expression,
            name,
        })
    }
}

impl InvocationExpression {
    #[must_use]
    pub fn new(expression: Expression, arguments: Vec<Arc<Argument>>) -> Arc<Self> {
        Arc::new(InvocationExpression {
            id: next_node_id(),
            expression,
            arguments: Arc::new(ArgumentList {
                id: next_node_id(),
                arguments,
            }),
        })
    }
}

impl ArgumentList {
    #[must_use]
    pub fn position_of(&self, argument_id: u64) -> Option<usize> {
        self.arguments.iter().position(|a| a.id == argument_id)
    }
}

impl TypeSyntax {
    /// Textual name used for lookups: keyword, dotted name, or generic name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Predefined(p) => Some(&p.keyword),
            TypeSyntax::Identifier(i) => Some(&i.name),
            TypeSyntax::Generic(g) => Some(&g.name),
            TypeSyntax::Nullable(n) => n.element_type.name(),
            TypeSyntax::Array(_) => None,
        }
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[TypeSyntax] {
        match self {
            TypeSyntax::Generic(g) => &g.type_arguments,
            _ => &[],
        }
    }
}

impl Opaque {
    /// Lambdas, anonymous methods and local functions: a `return` inside
    /// one leaves that function, not the enclosing member.
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(
            self.kind.as_str(),
            "lambda_expression" | "anonymous_method_expression" | "local_function_statement"
        )
    }

    /// Typed children in source order.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Node(node) => Some(node),
            Piece::Text(_) => None,
        })
    }
}

fn push<T: Clone + Into<SyntaxNode>>(out: &mut Vec<SyntaxNode>, item: &T) {
    out.push(item.clone().into());
}

fn push_opt<T: Clone + Into<SyntaxNode>>(out: &mut Vec<SyntaxNode>, item: Option<&T>) {
    if let Some(item) = item {
        push(out, item);
    }
}

fn extend<T: Clone + Into<SyntaxNode>>(out: &mut Vec<SyntaxNode>, items: &[T]) {
    out.extend(items.iter().cloned().map(Into::into));
}

fn replace_one<T: AstChild>(slot: &T, old: u64, new: &SyntaxNode) -> Option<T> {
    if slot.child_id() == old {
        T::from_syntax(new)
    } else {
        None
    }
}

fn replace_opt<T: AstChild>(slot: &Option<T>, old: u64, new: &SyntaxNode) -> Option<Option<T>> {
    slot.as_ref()
        .and_then(|slot| replace_one(slot, old, new))
        .map(Some)
}

fn replace_vec<T: AstChild>(items: &[T], old: u64, new: &SyntaxNode) -> Option<Vec<T>> {
    let index = items.iter().position(|item| item.child_id() == old)?;
    let replacement = T::from_syntax(new)?;
    let mut items = items.to_vec();
    items[index] = replacement;
    Some(items)
}

fn replace_piece(pieces: &[Piece], old: u64, new: &SyntaxNode) -> Option<Vec<Piece>> {
    let index = pieces
        .iter()
        .position(|piece| matches!(piece, Piece::Node(node) if node.id() == old))?;
    let mut pieces = pieces.to_vec();
    pieces[index] = Piece::Node(new.clone());
    Some(pieces)
}

fn replace_opt_vec<T: AstChild>(
    items: &[Option<T>],
    old: u64,
    new: &SyntaxNode,
) -> Option<Vec<Option<T>>> {
    let index = items
        .iter()
        .position(|item| item.as_ref().is_some_and(|i| i.child_id() == old))?;
    let replacement = T::from_syntax(new)?;
    let mut items = items.to_vec();
    items[index] = Some(replacement);
    Some(items)
}

/// Copies `$node`, swapping the first field slot whose child has id `$old`.
/// The copy keeps the node id.
macro_rules! rebuild {
    ($variant:ident, $node:expr, $old:expr, $new:expr; $( $field:ident => $how:ident ),+ $(,)?) => {{
        let mut copy = (**$node).clone();
        let replaced = false
            $( || match $how(&$node.$field, $old, $new) {
                Some(value) => {
                    copy.$field = value;
                    true
                }
                None => false,
            } )+;
        replaced.then(|| SyntaxNode::$variant(Arc::new(copy)))
    }};
}

impl SyntaxNode {
    /// Direct children in source order.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn children(&self) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        match self {
            SyntaxNode::CompilationUnit(n) => {
                extend(&mut out, &n.usings);
                extend(&mut out, &n.members);
            }
            SyntaxNode::NamespaceDeclaration(n) => {
                extend(&mut out, &n.usings);
                extend(&mut out, &n.members);
            }
            SyntaxNode::TypeDeclaration(n) => {
                extend(&mut out, &n.attributes);
                push(&mut out, &n.name);
                extend(&mut out, &n.type_parameters);
                extend(&mut out, &n.base_types);
                extend(&mut out, &n.members);
            }
            SyntaxNode::Attribute(n) => {
                push(&mut out, &n.name);
                push_opt(&mut out, n.arguments.as_ref());
            }
            SyntaxNode::MethodDeclaration(n) => {
                extend(&mut out, &n.attributes);
                push(&mut out, &n.return_type);
                push(&mut out, &n.name);
                extend(&mut out, &n.type_parameters);
                push(&mut out, &n.parameters);
                push_opt(&mut out, n.body.as_ref());
            }
            SyntaxNode::ConstructorDeclaration(n) => {
                extend(&mut out, &n.attributes);
                push(&mut out, &n.name);
                push(&mut out, &n.parameters);
                push_opt(&mut out, n.initializer.as_ref());
                push_opt(&mut out, n.body.as_ref());
            }
            SyntaxNode::ConstructorInitializer(n) => push(&mut out, &n.arguments),
            SyntaxNode::PropertyDeclaration(n) => {
                extend(&mut out, &n.attributes);
                push(&mut out, &n.ty);
                push(&mut out, &n.name);
                push(&mut out, &n.body);
                push_opt(&mut out, n.initializer.as_ref());
            }
            SyntaxNode::FieldDeclaration(n) => {
                extend(&mut out, &n.attributes);
                push(&mut out, &n.ty);
                push(&mut out, &n.name);
                push_opt(&mut out, n.value.as_ref());
            }
            SyntaxNode::ParameterList(n) => extend(&mut out, &n.parameters),
            SyntaxNode::Parameter(n) => {
                push(&mut out, &n.ty);
                push(&mut out, &n.name);
                push_opt(&mut out, n.default.as_ref());
            }
            SyntaxNode::AccessorList(n) => extend(&mut out, &n.accessors),
            SyntaxNode::AccessorDeclaration(n) => push_opt(&mut out, n.body.as_ref()),
            SyntaxNode::Block(n) => extend(&mut out, &n.statements),
            SyntaxNode::ArrowExpressionClause(n) => push(&mut out, &n.expression),
            SyntaxNode::ReturnStatement(n) => push_opt(&mut out, n.expression.as_ref()),
            SyntaxNode::YieldStatement(n) => push_opt(&mut out, n.expression.as_ref()),
            SyntaxNode::ExpressionStatement(n) => push(&mut out, &n.expression),
            SyntaxNode::LocalDeclarationStatement(n) => {
                push(&mut out, &n.ty);
                push(&mut out, &n.name);
                push_opt(&mut out, n.value.as_ref());
            }
            SyntaxNode::ObjectCreationExpression(n) => {
                push(&mut out, &n.ty);
                push_opt(&mut out, n.arguments.as_ref());
                push_opt(&mut out, n.initializer.as_ref());
            }
            SyntaxNode::ArrayCreationExpression(n) => {
                push(&mut out, &n.ty);
                push_opt(&mut out, n.initializer.as_ref());
            }
            SyntaxNode::InvocationExpression(n) => {
                push(&mut out, &n.expression);
                push(&mut out, &n.arguments);
            }
            SyntaxNode::MemberAccessExpression(n) => {
                push(&mut out, &n.expression);
                push(&mut out, &n.name);
            }
            SyntaxNode::AssignmentExpression(n) => {
                push(&mut out, &n.left);
                push(&mut out, &n.right);
            }
            SyntaxNode::ArgumentList(n) => extend(&mut out, &n.arguments),
            SyntaxNode::Argument(n) => {
                push_opt(&mut out, n.name.as_ref());
                push(&mut out, &n.expression);
            }
            SyntaxNode::InitializerExpression(n) => extend(&mut out, &n.expressions),
            SyntaxNode::GenericName(n) => extend(&mut out, &n.type_arguments),
            SyntaxNode::ArrayType(n) => {
                push(&mut out, &n.element_type);
                extend(&mut out, &n.rank_specifiers);
            }
            SyntaxNode::NullableType(n) => push(&mut out, &n.element_type),
            SyntaxNode::ArrayRankSpecifier(n) => {
                for size in n.sizes.iter().flatten() {
                    push(&mut out, size);
                }
            }
            SyntaxNode::Opaque(n) => out.extend(n.nodes().cloned()),
            SyntaxNode::UsingDirective(_)
            | SyntaxNode::Identifier(_)
            | SyntaxNode::LiteralExpression(_)
            | SyntaxNode::PredefinedType(_) => {}
        }
        out
    }

    /// A copy of this node with the direct child `old` replaced by `new`.
    ///
    /// The copy keeps this node's id and shares every other child. Returns
    /// `None` when `old` is not a direct child or `new` does not fit its slot.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn with_replaced_child(&self, old: u64, new: &SyntaxNode) -> Option<SyntaxNode> {
        match self {
            SyntaxNode::CompilationUnit(n) => rebuild!(CompilationUnit, n, old, new;
                usings => replace_vec, members => replace_vec),
            SyntaxNode::NamespaceDeclaration(n) => rebuild!(NamespaceDeclaration, n, old, new;
                usings => replace_vec, members => replace_vec),
            SyntaxNode::TypeDeclaration(n) => rebuild!(TypeDeclaration, n, old, new;
                attributes => replace_vec, name => replace_one,
                type_parameters => replace_vec, base_types => replace_vec,
                members => replace_vec),
            SyntaxNode::Attribute(n) => rebuild!(Attribute, n, old, new;
                name => replace_one, arguments => replace_opt),
            SyntaxNode::MethodDeclaration(n) => rebuild!(MethodDeclaration, n, old, new;
                attributes => replace_vec, return_type => replace_one, name => replace_one,
                type_parameters => replace_vec, parameters => replace_one,
                body => replace_opt),
            SyntaxNode::ConstructorDeclaration(n) => rebuild!(ConstructorDeclaration, n, old, new;
                attributes => replace_vec, name => replace_one, parameters => replace_one,
                initializer => replace_opt, body => replace_opt),
            SyntaxNode::ConstructorInitializer(n) => rebuild!(ConstructorInitializer, n, old, new;
                arguments => replace_one),
            SyntaxNode::PropertyDeclaration(n) => rebuild!(PropertyDeclaration, n, old, new;
                attributes => replace_vec, ty => replace_one, name => replace_one,
                body => replace_one, initializer => replace_opt),
            SyntaxNode::FieldDeclaration(n) => rebuild!(FieldDeclaration, n, old, new;
                attributes => replace_vec, ty => replace_one, name => replace_one,
                value => replace_opt),
            SyntaxNode::ParameterList(n) => rebuild!(ParameterList, n, old, new;
                parameters => replace_vec),
            SyntaxNode::Parameter(n) => rebuild!(Parameter, n, old, new;
                ty => replace_one, name => replace_one, default => replace_opt),
            SyntaxNode::AccessorList(n) => rebuild!(AccessorList, n, old, new;
                accessors => replace_vec),
            SyntaxNode::AccessorDeclaration(n) => rebuild!(AccessorDeclaration, n, old, new;
                body => replace_opt),
            SyntaxNode::Block(n) => rebuild!(Block, n, old, new; statements => replace_vec),
            SyntaxNode::ArrowExpressionClause(n) => rebuild!(ArrowExpressionClause, n, old, new;
                expression => replace_one),
            SyntaxNode::ReturnStatement(n) => rebuild!(ReturnStatement, n, old, new;
                expression => replace_opt),
            SyntaxNode::YieldStatement(n) => rebuild!(YieldStatement, n, old, new;
                expression => replace_opt),
            SyntaxNode::ExpressionStatement(n) => rebuild!(ExpressionStatement, n, old, new;
                expression => replace_one),
            SyntaxNode::LocalDeclarationStatement(n) => rebuild!(LocalDeclarationStatement, n, old, new;
                ty => replace_one, name => replace_one, value => replace_opt),
            SyntaxNode::ObjectCreationExpression(n) => rebuild!(ObjectCreationExpression, n, old, new;
                ty => replace_one, arguments => replace_opt, initializer => replace_opt),
            SyntaxNode::ArrayCreationExpression(n) => rebuild!(ArrayCreationExpression, n, old, new;
                ty => replace_one, initializer => replace_opt),
            SyntaxNode::InvocationExpression(n) => rebuild!(InvocationExpression, n, old, new;
                expression => replace_one, arguments => replace_one),
            SyntaxNode::MemberAccessExpression(n) => rebuild!(MemberAccessExpression, n, old, new;
                expression => replace_one, name => replace_one),
            SyntaxNode::AssignmentExpression(n) => rebuild!(AssignmentExpression, n, old, new;
                left => replace_one, right => replace_one),
            SyntaxNode::ArgumentList(n) => rebuild!(ArgumentList, n, old, new;
                arguments => replace_vec),
            SyntaxNode::Argument(n) => rebuild!(Argument, n, old, new;
                name => replace_opt, expression => replace_one),
            SyntaxNode::InitializerExpression(n) => rebuild!(InitializerExpression, n, old, new;
                expressions => replace_vec),
            SyntaxNode::GenericName(n) => rebuild!(GenericName, n, old, new;
                type_arguments => replace_vec),
            SyntaxNode::ArrayType(n) => rebuild!(ArrayType, n, old, new;
                element_type => replace_one, rank_specifiers => replace_vec),
            SyntaxNode::NullableType(n) => rebuild!(NullableType, n, old, new;
                element_type => replace_one),
            SyntaxNode::ArrayRankSpecifier(n) => rebuild!(ArrayRankSpecifier, n, old, new;
                sizes => replace_opt_vec),
            SyntaxNode::Opaque(n) => rebuild!(Opaque, n, old, new; pieces => replace_piece),
            SyntaxNode::UsingDirective(_)
            | SyntaxNode::Identifier(_)
            | SyntaxNode::LiteralExpression(_)
            | SyntaxNode::PredefinedType(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{LiteralExpression, ReturnStatement};

    fn literal(text: &str) -> Expression {
        Expression::Literal(Arc::new(LiteralExpression {
            id: next_node_id(),
            kind: LiteralKind::Number,
            text: text.to_string(),
        }))
    }

    #[test]
    fn test_replaced_child_keeps_parent_id() {
        let statement = Arc::new(ReturnStatement {
            id: next_node_id(),
            expression: Some(literal("1")),
        });
        let old_id = statement.expression.as_ref().map(Expression::id).unwrap();
        let node = SyntaxNode::ReturnStatement(Arc::clone(&statement));
        let replacement = literal("2").syntax();
        let rebuilt = node.with_replaced_child(old_id, &replacement).unwrap();
        assert_eq!(rebuilt.id(), statement.id);
        assert!(rebuilt.children()[0].ptr_eq(&replacement));
    }

    #[test]
    fn test_replaced_child_rejects_foreign_id() {
        let node: SyntaxNode = ReturnStatement {
            id: next_node_id(),
            expression: Some(literal("1")),
        }
        .into();
        assert!(node.with_replaced_child(0, &literal("2").syntax()).is_none());
    }

    #[test]
    fn test_replaced_child_rejects_wrong_shape() {
        let argument = Arc::new(Argument {
            id: next_node_id(),
            name: None,
            modifier: None,
            expression: literal("1"),
        });
        let list: SyntaxNode = ArgumentList {
            id: next_node_id(),
            arguments: vec![Arc::clone(&argument)],
        }
        .into();
        assert!(
            list.with_replaced_child(argument.id, &literal("2").syntax())
                .is_none()
        );
    }

    #[test]
    fn test_argument_list_keeps_siblings() {
        let first = Arc::new(Argument {
            id: next_node_id(),
            name: None,
            modifier: None,
            expression: literal("1"),
        });
        let second = Arc::new(Argument {
            id: next_node_id(),
            name: Some(Identifier::new("count")),
            modifier: None,
            expression: literal("2"),
        });
        let list = SyntaxNode::from(ArgumentList {
            id: next_node_id(),
            arguments: vec![Arc::clone(&first), Arc::clone(&second)],
        });
        let argument = SyntaxNode::Argument(Arc::clone(&second))
            .with_replaced_child(second.expression.id(), &literal("3").syntax())
            .unwrap();
        let SyntaxNode::ArgumentList(rebuilt) = list.with_replaced_child(second.id, &argument).unwrap() else {
            panic!("expected argument list");
        };
        assert!(Arc::ptr_eq(&rebuilt.arguments[0], &first));
        assert_eq!(rebuilt.arguments[1].id, second.id);
        assert_eq!(rebuilt.arguments[1].name, second.name);
    }

    #[test]
    fn test_opaque_pieces_keep_text() {
        let condition = literal("1");
        let node = SyntaxNode::from(Opaque {
            id: next_node_id(),
            kind: "if_statement".to_string(),
            pieces: vec![
                Piece::Text("if (".to_string()),
                Piece::Node(condition.syntax()),
                Piece::Text(") { }".to_string()),
            ],
        });
        assert_eq!(node.children().len(), 1);
        let SyntaxNode::Opaque(rebuilt) = node.with_replaced_child(condition.id(), &literal("2").syntax()).unwrap() else {
            panic!("expected opaque node");
        };
        assert_eq!(rebuilt.pieces[0], Piece::Text("if (".to_string()));
        assert!(matches!(&rebuilt.pieces[1], Piece::Node(SyntaxNode::LiteralExpression(l)) if l.text == "2"));
        assert!(!rebuilt.is_function());
    }

    #[test]
    fn test_node_ids_are_unique_and_nonzero() {
        let ids: Vec<u64> = (0..1000).map(|_| next_node_id()).collect();
        assert!(ids.iter().all(|id| *id != 0));
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

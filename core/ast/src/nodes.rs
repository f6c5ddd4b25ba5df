use core::fmt;
use std::{
    fmt::{Display, Formatter},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-wide unique node id. Zero is never handed out.
///
/// The counter is 64 bits wide and never reset, so a host would need more
/// than 2^64 allocations before an id repeats.
#[must_use]
pub fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Half-open `[start, end)` byte range into a document's text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[must_use]
    pub fn shifted(&self, delta: isize) -> TextRange {
        TextRange {
            start: self.start.saturating_add_signed(delta),
            end: self.end.saturating_add_signed(delta),
        }
    }
}

impl Display for TextRange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A slot in a parent node that can hold a child of a particular shape.
///
/// Used by the persistent rebuild in `nodes_impl` to swap one child for a
/// replacement while every sibling keeps pointing at the original allocation.
pub trait AstChild: Sized + Clone {
    fn child_id(&self) -> u64;
    fn from_syntax(node: &SyntaxNode) -> Option<Self>;
}

#[macro_export]
macro_rules! ast_node {
    (
        $(#[$outer:meta])*
        $struct_vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $struct_vis struct $name {
            pub id: u64,
            $(
                $(#[$field_attr])*
                $field_vis $field_name : $field_ty,
            )*
        }
    };
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident { $($fields:tt)* }
        )+
    ) => {
        $(
            ast_node! {
                $(#[$outer])*
                $struct_vis struct $name { $($fields)* }
            }
        )+
    };
}

macro_rules! ast_enum {
    (
        $(#[$outer:meta])*
        $enum_vis:vis enum $name:ident {
            $( $arm:ident($node:ident), )+
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $enum_vis enum $name {
            $( $arm(Arc<$node>), )+
        }

        impl $name {
            #[must_use]
            pub fn id(&self) -> u64 {
                match self {
                    $( $name::$arm(n) => n.id, )+
                }
            }

            #[must_use]
            pub fn syntax(&self) -> SyntaxNode {
                match self {
                    $( $name::$arm(n) => SyntaxNode::$node(Arc::clone(n)), )+
                }
            }
        }

        impl AstChild for $name {
            fn child_id(&self) -> u64 {
                self.id()
            }

            fn from_syntax(node: &SyntaxNode) -> Option<Self> {
                match node {
                    $( SyntaxNode::$node(n) => Some($name::$arm(Arc::clone(n))), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for SyntaxNode {
            fn from(value: $name) -> Self {
                value.syntax()
            }
        }
    };
}

macro_rules! syntax_nodes {
    ( $( $node:ident ),+ $(,)? ) => {
        /// Discriminant of every node shape the tree can hold.
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
        pub enum SyntaxKind {
            $( $node, )+
        }

        /// A shared reference to any node of the tree.
        #[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
        pub enum SyntaxNode {
            $( $node(Arc<$node>), )+
        }

        impl SyntaxNode {
            #[must_use]
            pub fn id(&self) -> u64 {
                match self {
                    $( SyntaxNode::$node(n) => n.id, )+
                }
            }

            #[must_use]
            pub fn kind(&self) -> SyntaxKind {
                match self {
                    $( SyntaxNode::$node(_) => SyntaxKind::$node, )+
                }
            }

            /// `true` when both references point at the same allocation.
            #[must_use]
            pub fn ptr_eq(&self, other: &SyntaxNode) -> bool {
                match (self, other) {
                    $( (SyntaxNode::$node(a), SyntaxNode::$node(b)) => Arc::ptr_eq(a, b), )+
                    _ => false,
                }
            }
        }

        $(
            impl From<Arc<$node>> for SyntaxNode {
                fn from(node: Arc<$node>) -> Self {
                    SyntaxNode::$node(node)
                }
            }

            impl From<$node> for SyntaxNode {
                fn from(node: $node) -> Self {
                    SyntaxNode::$node(Arc::new(node))
                }
            }

            impl AstChild for Arc<$node> {
                fn child_id(&self) -> u64 {
                    self.id
                }

                fn from_syntax(node: &SyntaxNode) -> Option<Self> {
                    if let SyntaxNode::$node(n) = node {
                        Some(Arc::clone(n))
                    } else {
                        None
                    }
                }
            }
        )+
    };
}

syntax_nodes! {
    CompilationUnit,
    UsingDirective,
    NamespaceDeclaration,
    TypeDeclaration,
    Attribute,
    MethodDeclaration,
    ConstructorDeclaration,
    PropertyDeclaration,
    FieldDeclaration,
    ParameterList,
    Parameter,
    AccessorList,
    AccessorDeclaration,
    Block,
    ArrowExpressionClause,
    ReturnStatement,
    YieldStatement,
    ExpressionStatement,
    LocalDeclarationStatement,
    ObjectCreationExpression,
    ArrayCreationExpression,
    InvocationExpression,
    MemberAccessExpression,
    AssignmentExpression,
    ArgumentList,
    Argument,
    InitializerExpression,
    Identifier,
    GenericName,
    LiteralExpression,
    PredefinedType,
    ArrayType,
    NullableType,
    ArrayRankSpecifier,
    ConstructorInitializer,
    Opaque,
}

ast_enum! {
    pub enum MemberDeclaration {
        Namespace(NamespaceDeclaration),
        Type(TypeDeclaration),
        Method(MethodDeclaration),
        Constructor(ConstructorDeclaration),
        Property(PropertyDeclaration),
        Field(FieldDeclaration),
        Other(Opaque),
    }
}

ast_enum! {
    pub enum MemberBody {
        Block(Block),
        Arrow(ArrowExpressionClause),
    }
}

ast_enum! {
    pub enum PropertyBody {
        Accessors(AccessorList),
        Arrow(ArrowExpressionClause),
    }
}

ast_enum! {
    pub enum Statement {
        Block(Block),
        Return(ReturnStatement),
        Yield(YieldStatement),
        Expression(ExpressionStatement),
        LocalDeclaration(LocalDeclarationStatement),
        Other(Opaque),
    }
}

ast_enum! {
    pub enum Expression {
        ObjectCreation(ObjectCreationExpression),
        ArrayCreation(ArrayCreationExpression),
        Invocation(InvocationExpression),
        MemberAccess(MemberAccessExpression),
        Assignment(AssignmentExpression),
        Initializer(InitializerExpression),
        Identifier(Identifier),
        GenericName(GenericName),
        Literal(LiteralExpression),
        Other(Opaque),
    }
}

ast_enum! {
    pub enum TypeSyntax {
        Predefined(PredefinedType),
        Identifier(Identifier),
        Generic(GenericName),
        Array(ArrayType),
        Nullable(NullableType),
    }
}

ast_enum! {
    pub enum SimpleName {
        Identifier(Identifier),
        Generic(GenericName),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum TypeKeyword {
    Class,
    Struct,
    Interface,
    Record,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum YieldKind {
    Return,
    Break,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Number,
    String,
    Char,
    True,
    False,
    Null,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum ParameterModifier {
    Params,
    Ref,
    Out,
    In,
    This,
}

ast_nodes! {

    pub struct CompilationUnit {
        pub usings: Vec<Arc<UsingDirective>>,
        pub members: Vec<MemberDeclaration>,
    }

    /// `using [static] Name;` or `using Alias = Name;`.
    pub struct UsingDirective {
        pub is_static: bool,
        pub alias: Option<String>,
        pub name: String,
    }

    pub struct NamespaceDeclaration {
        pub name: String,
        pub file_scoped: bool,
        pub usings: Vec<Arc<UsingDirective>>,
        pub members: Vec<MemberDeclaration>,
    }

    pub struct TypeDeclaration {
        pub attributes: Vec<Arc<Attribute>>,
        pub modifiers: Vec<String>,
        pub keyword: TypeKeyword,
        pub name: Arc<Identifier>,
        pub type_parameters: Vec<Arc<Identifier>>,
        pub base_types: Vec<TypeSyntax>,
        pub members: Vec<MemberDeclaration>,
    }

    pub struct Attribute {
        pub name: Arc<Identifier>,
        pub arguments: Option<Arc<ArgumentList>>,
    }

    pub struct MethodDeclaration {
        pub attributes: Vec<Arc<Attribute>>,
        pub modifiers: Vec<String>,
        pub return_type: TypeSyntax,
        pub name: Arc<Identifier>,
        pub type_parameters: Vec<Arc<Identifier>>,
        pub parameters: Arc<ParameterList>,
        pub body: Option<MemberBody>,
    }

    pub struct ConstructorDeclaration {
        pub attributes: Vec<Arc<Attribute>>,
        pub modifiers: Vec<String>,
        pub name: Arc<Identifier>,
        pub parameters: Arc<ParameterList>,
        pub initializer: Option<Arc<ConstructorInitializer>>,
        pub body: Option<MemberBody>,
    }

    /// `: base(...)` or `: this(...)`.
    pub struct ConstructorInitializer {
        pub keyword: String,
        pub arguments: Arc<ArgumentList>,
    }

    pub struct PropertyDeclaration {
        pub attributes: Vec<Arc<Attribute>>,
        pub modifiers: Vec<String>,
        pub ty: TypeSyntax,
        pub name: Arc<Identifier>,
        pub body: PropertyBody,
        pub initializer: Option<Expression>,
    }

    pub struct FieldDeclaration {
        pub attributes: Vec<Arc<Attribute>>,
        pub modifiers: Vec<String>,
        pub ty: TypeSyntax,
        pub name: Arc<Identifier>,
        pub value: Option<Expression>,
    }

    pub struct ParameterList {
        pub parameters: Vec<Arc<Parameter>>,
    }

    pub struct Parameter {
        pub modifier: Option<ParameterModifier>,
        pub ty: TypeSyntax,
        pub name: Arc<Identifier>,
        pub default: Option<Expression>,
    }

    pub struct AccessorList {
        pub accessors: Vec<Arc<AccessorDeclaration>>,
    }

    pub struct AccessorDeclaration {
        pub modifiers: Vec<String>,
        pub kind: AccessorKind,
        pub body: Option<MemberBody>,
    }

    pub struct Block {
        pub statements: Vec<Statement>,
    }

    pub struct ArrowExpressionClause {
        pub expression: Expression,
    }

    pub struct ReturnStatement {
        pub expression: Option<Expression>,
    }

    pub struct YieldStatement {
        pub kind: YieldKind,
        pub expression: Option<Expression>,
    }

    pub struct ExpressionStatement {
        pub expression: Expression,
    }

    pub struct LocalDeclarationStatement {
        pub ty: TypeSyntax,
        pub name: Arc<Identifier>,
        pub value: Option<Expression>,
    }

    pub struct ObjectCreationExpression {
        pub ty: TypeSyntax,
        pub arguments: Option<Arc<ArgumentList>>,
        pub initializer: Option<Arc<InitializerExpression>>,
    }

    pub struct ArrayCreationExpression {
        pub ty: Arc<ArrayType>,
        pub initializer: Option<Arc<InitializerExpression>>,
    }

    pub struct InvocationExpression {
        pub expression: Expression,
        pub arguments: Arc<ArgumentList>,
    }

    pub struct MemberAccessExpression {
        pub expression: Expression,
        pub name: SimpleName,
    }

    pub struct AssignmentExpression {
        pub left: Expression,
        pub right: Expression,
    }

    pub struct ArgumentList {
        pub arguments: Vec<Arc<Argument>>,
    }

    pub struct Argument {
        pub name: Option<Arc<Identifier>>,
        pub modifier: Option<ParameterModifier>,
        pub expression: Expression,
    }

    pub struct InitializerExpression {
        pub expressions: Vec<Expression>,
    }

    /// A simple or dotted name (`List`, `System.Array`).
    pub struct Identifier {
        pub name: String,
    }

    pub struct GenericName {
        pub name: String,
        pub type_arguments: Vec<TypeSyntax>,
    }

    pub struct LiteralExpression {
        pub kind: LiteralKind,
        pub text: String,
    }

    pub struct PredefinedType {
        pub keyword: String,
    }

    pub struct ArrayType {
        pub element_type: TypeSyntax,
        pub rank_specifiers: Vec<Arc<ArrayRankSpecifier>>,
    }

    /// `T?`
    pub struct NullableType {
        pub element_type: TypeSyntax,
    }

    /// One `[...]` of an array type. `sizes` has one slot per dimension;
    /// omitted sizes are `None`.
    pub struct ArrayRankSpecifier {
        pub sizes: Vec<Option<Expression>>,
    }

    /// A construct kept as written (`if`, loops, lambdas, operators,
    /// indexers...). `kind` is the grammar's node kind. `pieces` alternate
    /// the verbatim source between children with the typed children
    /// themselves, so nested statements and expressions stay reachable.
    pub struct Opaque {
        pub kind: String,
        pub pieces: Vec<Piece>,
    }
}

/// One part of an [`Opaque`] node.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Piece {
    Text(String),
    Node(SyntaxNode),
}

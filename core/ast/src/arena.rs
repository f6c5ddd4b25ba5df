use crate::nodes::{SyntaxKind, SyntaxNode, TextRange};
use rustc_hash::FxHashMap;

/// Per-document navigation index: every node by id, its parent and ordered
/// children, and its source range.
#[derive(Default, Clone, Debug)]
pub struct Arena {
    pub(crate) nodes: FxHashMap<u64, SyntaxNode>,
    pub(crate) node_routes: FxHashMap<u64, NodeRoute>,
    spans: FxHashMap<u64, TextRange>,
    root_id: u64,
}

impl Arena {
    pub(crate) fn index(root: &SyntaxNode, spans: FxHashMap<u64, TextRange>) -> Self {
        let mut arena = Arena {
            spans,
            root_id: root.id(),
            ..Arena::default()
        };
        let mut stack = vec![(root.clone(), None)];
        while let Some((node, parent)) = stack.pop() {
            let id = node.id();
            let children = node.children();
            arena.add_node(node, parent);
            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }
        arena
    }

    /// Adds a node to the arena and records its parent-child relationship.
    fn add_node(&mut self, node: SyntaxNode, parent_id: Option<u64>) {
        debug_assert!(node.id() != 0, "Node ID must be non-zero");
        debug_assert!(
            !self.nodes.contains_key(&node.id()),
            "Node with ID {} already exists in the arena",
            node.id()
        );
        let id = node.id();
        self.nodes.insert(id, node);
        if let Some(parent) = parent_id.and_then(|p| self.node_routes.get_mut(&p)) {
            parent.children.push(id);
        }
        self.node_routes.insert(
            id,
            NodeRoute {
                id,
                parent: parent_id,
                children: vec![],
            },
        );
    }

    #[must_use]
    pub fn root(&self) -> Option<SyntaxNode> {
        self.find_node(self.root_id)
    }

    #[must_use]
    pub fn find_node(&self, id: u64) -> Option<SyntaxNode> {
        self.nodes.get(&id).cloned()
    }

    #[must_use]
    pub fn find_parent_node(&self, id: u64) -> Option<u64> {
        self.node_routes.get(&id).and_then(|route| route.parent)
    }

    #[must_use]
    pub fn parent(&self, id: u64) -> Option<SyntaxNode> {
        self.find_parent_node(id).and_then(|p| self.find_node(p))
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    #[must_use]
    pub fn ancestors(&self, id: u64) -> Vec<SyntaxNode> {
        let mut result = Vec::new();
        let mut current = self.find_parent_node(id);
        while let Some(parent) = current {
            if let Some(node) = self.find_node(parent) {
                result.push(node);
            }
            current = self.find_parent_node(parent);
        }
        result
    }

    /// First ancestor (nearest first) for which `select` yields a value.
    pub fn find_ancestor<T, F>(&self, id: u64, mut select: F) -> Option<T>
    where
        F: FnMut(&SyntaxNode) -> Option<T>,
    {
        self.ancestors(id).iter().find_map(|node| select(node))
    }

    #[must_use]
    pub fn children(&self, id: u64) -> Vec<SyntaxNode> {
        self.node_routes
            .get(&id)
            .map(|route| {
                route
                    .children
                    .iter()
                    .filter_map(|child_id| self.nodes.get(child_id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn span(&self, id: u64) -> Option<TextRange> {
        self.spans.get(&id).copied()
    }

    pub(crate) fn spans(&self) -> &FxHashMap<u64, TextRange> {
        &self.spans
    }

    /// The deepest node whose range contains `range`.
    #[must_use]
    pub fn covering_node(&self, range: TextRange) -> Option<SyntaxNode> {
        let root_span = self.span(self.root_id)?;
        if !root_span.contains_range(range) {
            return None;
        }
        let mut current = self.root_id;
        loop {
            let next = self.node_routes.get(&current).and_then(|route| {
                route.children.iter().copied().find(|child| {
                    self.span(*child)
                        .is_some_and(|span| span.contains_range(range))
                })
            });
            match next {
                Some(child) => current = child,
                None => return self.find_node(current),
            }
        }
    }

    pub fn filter_nodes<T: Fn(&SyntaxNode) -> bool>(&self, fn_predicate: T) -> Vec<SyntaxNode> {
        self.nodes
            .values()
            .filter(|node| fn_predicate(node))
            .cloned()
            .collect()
    }

    /// Nodes of any of `kinds`, in source order.
    #[must_use]
    pub fn nodes_of_kind(&self, kinds: &[SyntaxKind]) -> Vec<SyntaxNode> {
        let mut nodes = self.filter_nodes(|node| kinds.contains(&node.kind()));
        nodes.sort_by_key(|node| (self.span(node.id()).map_or(0, |s| s.start), node.id()));
        nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Default, Debug)]
pub struct NodeRoute {
    pub id: u64,
    parent: Option<u64>,
    children: Vec<u64>,
}

//
// syntax/tree.rs
//
// Arena syntax tree with parent links and a pruning visitor
//

/// Half-open byte range `[start, end)` into the source text.
///
/// Containment tests for cursor offsets are inclusive of `end`, so a cursor
/// sitting right after a node still counts as inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Zero-based line and UTF-16 column, the unit editors count in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    pub line: u32,
    pub character: u32,
}

/// Index of a node in its [`SyntaxTree`]. Only meaningful for the tree that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Stylesheet,
    /// Selector plus block
    Ruleset,
    /// Selector list of a ruleset
    Selector,
    /// `{ ... }` body of a ruleset, mixin or at-rule
    Declarations,
    /// `property: value`
    Declaration,
    Property,
    Value,
    /// `@name: value`
    VariableDeclaration,
    /// `@name` or `@{name}`, in declarations, parameters and values
    VariableName,
    /// `.name(params) { ... }`
    MixinDeclaration,
    /// `.name(args);`
    MixinReference,
    /// Parenthesized parameter list of a mixin declaration
    Parameters,
    /// `@name` or `@name: default` inside [`NodeKind::Parameters`]
    Parameter,
    /// Name of a mixin declaration or reference
    Identifier,
    /// `@import (options) "path";`
    Import,
    StringLiteral,
    /// Any other at-rule (`@media`, `@font-face`, `@plugin`, ...)
    AtRule,
}

impl NodeKind {
    /// Kinds whose body introduces a lexical scope for variables and mixins.
    pub fn is_block_owner(self) -> bool {
        matches!(
            self,
            NodeKind::Ruleset | NodeKind::MixinDeclaration | NodeKind::AtRule
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` for synthetic nodes that have no source text
    pub range: Option<TextRange>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A parsed stylesheet.
///
/// Nodes live in a flat arena; parent and child links are indices, so the
/// tree has no reference cycles and is cheap to move between threads.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
    line_starts: Vec<usize>,
}

impl SyntaxTree {
    /// Create a tree holding only the stylesheet root, spanning `source`.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            nodes: vec![Node {
                kind: NodeKind::Stylesheet,
                range: Some(TextRange::new(0, source.len())),
                parent: None,
                children: Vec::new(),
            }],
            line_starts: std::iter::once(0)
                .chain(source.match_indices('\n').map(|(i, _)| i + 1))
                .collect(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.node(id).range
    }

    /// Start offset, or `None` for synthetic nodes.
    pub fn offset(&self, id: NodeId) -> Option<usize> {
        self.range(id).map(|r| r.start)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Source text covered by the node; empty for synthetic nodes.
    pub fn text(&self, id: NodeId) -> &str {
        match self.range(id) {
            Some(range) => self.source.get(range.start..range.end).unwrap_or(""),
            None => "",
        }
    }

    /// Line and UTF-16 column of a byte offset. Offsets past the end clamp
    /// to the end of the text.
    pub fn position_at(&self, offset: usize) -> TextPosition {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let character = self
            .source
            .get(line_start..offset)
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(0);
        TextPosition {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    /// Pre-order walk from the root. Returning `false` from `visit` skips
    /// the node's children.
    pub fn accept<F>(&self, visit: F)
    where
        F: FnMut(NodeId) -> bool,
    {
        self.accept_from(self.root(), visit);
    }

    /// Pre-order walk from `start`, with the same pruning rule as [`accept`].
    ///
    /// [`accept`]: SyntaxTree::accept
    pub fn accept_from<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(NodeId) -> bool,
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visit(id) {
                continue;
            }
            // Reverse so the first child is visited first
            stack.extend(self.children(id).iter().rev().copied());
        }
    }

    // ========================================================================
    // Semantic accessors
    // ========================================================================

    /// Name of a declaration-like node.
    ///
    /// - variable declarations, parameters and variable names: the variable
    ///   name without the `@` sigil (and without `{}` for interpolations)
    /// - mixin declarations and references: the identifier text
    /// - rulesets: the selector text
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::VariableName => Some(strip_variable_sigil(self.text(id))),
            NodeKind::VariableDeclaration | NodeKind::Parameter => self
                .child_of_kind(id, NodeKind::VariableName)
                .map(|name| strip_variable_sigil(self.text(name))),
            NodeKind::MixinDeclaration | NodeKind::MixinReference => self
                .child_of_kind(id, NodeKind::Identifier)
                .map(|ident| self.text(ident)),
            NodeKind::Identifier => Some(self.text(id)),
            NodeKind::Ruleset => self.selectors(id).map(|sel| self.text(sel)),
            _ => None,
        }
    }

    /// Right-hand side of a variable declaration or property declaration.
    pub fn value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::VariableDeclaration | NodeKind::Declaration => {
                self.child_of_kind(id, NodeKind::Value)
            }
            _ => None,
        }
    }

    /// Default value of a mixin parameter.
    pub fn default_value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Parameter => self.child_of_kind(id, NodeKind::Value),
            _ => None,
        }
    }

    /// Parameter list of a mixin declaration.
    pub fn parameters(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::MixinDeclaration => self.child_of_kind(id, NodeKind::Parameters),
            _ => None,
        }
    }

    /// Selector list of a ruleset.
    pub fn selectors(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Ruleset => self.child_of_kind(id, NodeKind::Selector),
            _ => None,
        }
    }

    /// `{ ... }` body of a ruleset, mixin declaration or at-rule.
    pub fn body(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id).is_block_owner() {
            self.child_of_kind(id, NodeKind::Declarations)
        } else {
            None
        }
    }

    /// Smallest node whose range contains `offset`.
    ///
    /// Among candidates of equal length the one visited last wins, which is
    /// the deepest. Synthetic nodes are walked through but never returned.
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        let mut candidate: Option<(NodeId, usize)> = None;

        self.accept(|id| {
            let Some(range) = self.range(id) else {
                return true;
            };
            if !range.contains_offset(offset) {
                return false;
            }
            match candidate {
                Some((_, len)) if range.len() > len => {}
                _ => candidate = Some((id, range.len())),
            }
            true
        });

        candidate.map(|(id, _)| id)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Append a node under `parent` and return its id.
    pub(crate) fn push(
        &mut self,
        kind: NodeKind,
        range: Option<TextRange>,
        parent: NodeId,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Move the end of a node's range, used once a block is closed.
    pub(crate) fn set_end(&mut self, id: NodeId, end: usize) {
        if let Some(range) = self.nodes[id.index()].range.as_mut() {
            range.end = end.max(range.start);
        }
    }
}

fn strip_variable_sigil(text: &str) -> &str {
    let name = text.strip_prefix('@').unwrap_or(text);
    match name.strip_prefix('{') {
        Some(inner) => inner.strip_suffix('}').unwrap_or(inner),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `a { b }` built by hand, with a synthetic node between root and `a`.
    fn hand_built() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut tree = SyntaxTree::new("@x: 1;");
        let root = tree.root();
        let synthetic = tree.push(NodeKind::Value, None, root);
        let decl = tree.push(
            NodeKind::VariableDeclaration,
            Some(TextRange::new(0, 6)),
            synthetic,
        );
        let name = tree.push(NodeKind::VariableName, Some(TextRange::new(0, 2)), decl);
        (tree, synthetic, decl, name)
    }

    #[test]
    fn test_accept_visits_in_preorder() {
        let (tree, synthetic, decl, name) = hand_built();
        let mut seen = Vec::new();
        tree.accept(|id| {
            seen.push(id);
            true
        });
        assert_eq!(seen, vec![tree.root(), synthetic, decl, name]);
    }

    #[test]
    fn test_accept_prunes_on_false() {
        let (tree, synthetic, _, _) = hand_built();
        let mut seen = Vec::new();
        tree.accept(|id| {
            seen.push(id);
            id != synthetic
        });
        assert_eq!(seen, vec![tree.root(), synthetic]);
    }

    #[test]
    fn test_node_at_offset_skips_synthetic_nodes() {
        let (tree, synthetic, _, name) = hand_built();
        let found = tree.node_at_offset(1).unwrap();
        assert_eq!(found, name);
        assert_ne!(found, synthetic);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (tree, synthetic, decl, name) = hand_built();
        let chain: Vec<_> = tree.ancestors(name).collect();
        assert_eq!(chain, vec![decl, synthetic, tree.root()]);
    }

    #[test]
    fn test_text_of_synthetic_node_is_empty() {
        let (tree, synthetic, _, name) = hand_built();
        assert_eq!(tree.text(synthetic), "");
        assert_eq!(tree.text(name), "@x");
        assert_eq!(tree.name(name), Some("x"));
    }

    #[test]
    fn test_strip_variable_sigil() {
        assert_eq!(strip_variable_sigil("@color"), "color");
        assert_eq!(strip_variable_sigil("@{color}"), "color");
        assert_eq!(strip_variable_sigil("plain"), "plain");
    }

    #[test]
    fn test_position_at_counts_utf16_columns() {
        let tree = SyntaxTree::new("@a: 1;\n.\u{e9}x { }");
        assert_eq!(tree.position_at(0), TextPosition { line: 0, character: 0 });
        assert_eq!(tree.position_at(7), TextPosition { line: 1, character: 0 });
        // `é` is two bytes but one UTF-16 unit
        assert_eq!(tree.position_at(10), TextPosition { line: 1, character: 2 });
        assert_eq!(tree.position_at(999).line, 1);
    }

    #[test]
    fn test_text_range_contains_end() {
        let range = TextRange::new(2, 5);
        assert!(range.contains_offset(2));
        assert!(range.contains_offset(5));
        assert!(!range.contains_offset(6));
        assert_eq!(range.len(), 3);
    }
}

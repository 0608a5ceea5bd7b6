//
// symbols/extract.rs
//
// Document-level symbol extraction
//

use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::import::{classify_import, Import};
use super::{Mixin, Symbols, Variable};

/// Collect the document-level symbols of a stylesheet in one pre-order pass.
///
/// Only variables declared directly under the stylesheet root are collected;
/// nested declarations are visible through scope resolution instead. Mixins
/// are collected wherever they appear except inside another mixin's body.
pub fn extract_symbols(tree: &SyntaxTree) -> Symbols {
    let mut symbols = Symbols::default();
    let root = tree.root();

    tree.accept(|id| match tree.kind(id) {
        NodeKind::Import => {
            symbols
                .imports
                .extend(make_imports(tree, id).into_iter().filter(Import::is_resolvable));
            false
        }
        NodeKind::VariableDeclaration => {
            if tree.parent(id) == Some(root) {
                symbols.variables.push(make_variable(tree, id));
            }
            false
        }
        NodeKind::MixinDeclaration => {
            symbols.mixins.push(make_mixin(tree, id));
            // Mixins local to this body are not project-wide declarations
            false
        }
        _ => true,
    });

    symbols
}

pub(crate) fn make_variable(tree: &SyntaxTree, id: NodeId) -> Variable {
    let offset = tree.offset(id).unwrap_or(0);
    Variable {
        name: tree.name(id).unwrap_or_default().to_string(),
        value: tree.value(id).map(|value| tree.text(value).to_string()),
        offset,
        position: tree.position_at(offset),
        mixin: None,
    }
}

fn make_parameter(tree: &SyntaxTree, id: NodeId, mixin: &str) -> Variable {
    let offset = tree.offset(id).unwrap_or(0);
    Variable {
        name: tree.name(id).unwrap_or_default().to_string(),
        value: tree
            .default_value(id)
            .map(|value| tree.text(value).to_string()),
        offset,
        position: tree.position_at(offset),
        mixin: Some(mixin.to_string()),
    }
}

pub(crate) fn make_parameters(tree: &SyntaxTree, mixin: NodeId) -> Vec<Variable> {
    let name = tree.name(mixin).unwrap_or_default();
    match tree.parameters(mixin) {
        Some(params) => tree
            .children_of_kind(params, NodeKind::Parameter)
            .map(|param| make_parameter(tree, param, name))
            .collect(),
        None => Vec::new(),
    }
}

pub(crate) fn make_mixin(tree: &SyntaxTree, id: NodeId) -> Mixin {
    let offset = tree.offset(id).unwrap_or(0);
    Mixin {
        name: tree.name(id).unwrap_or_default().to_string(),
        parameters: make_parameters(tree, id),
        parent: parent_selectors(tree, id),
        offset,
        position: tree.position_at(offset),
    }
}

/// Selector chain of the rulesets enclosing `id`, outermost first.
///
/// ```less
/// .a > .b {
///   .c(@a) { }
/// }
/// ```
///
/// gives `.a > .b` for `.c`.
fn parent_selectors(tree: &SyntaxTree, id: NodeId) -> Option<String> {
    let mut selectors = Vec::new();

    for ancestor in tree.ancestors(id) {
        if tree.kind(ancestor) != NodeKind::Ruleset {
            continue;
        }
        let Some(text) = tree.name(ancestor) else {
            continue;
        };
        if text.contains('&') || text.contains("#{") || text.contains("@{") {
            return None;
        }
        selectors.push(text);
    }

    if selectors.is_empty() {
        return None;
    }
    selectors.reverse();
    Some(selectors.join(" "))
}

fn make_imports(tree: &SyntaxTree, id: NodeId) -> Vec<Import> {
    let options = tree
        .child_of_kind(id, NodeKind::Value)
        .map(|value| tree.text(value));

    tree.children_of_kind(id, NodeKind::StringLiteral)
        .map(|literal| classify_import(tree.text(literal), options))
        .collect()
}

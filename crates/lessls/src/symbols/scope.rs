//
// symbols/scope.rs
//
// Symbols visible from a cursor offset
//

use crate::syntax::{parse, NodeId, NodeKind, SyntaxTree};

use super::extract::{extract_symbols, make_mixin, make_parameters, make_variable};
use super::Symbols;

/// Symbols lexically visible at `offset` from enclosing blocks.
///
/// Walks from the innermost node at `offset` up to the stylesheet root. A
/// mixin declaration contributes its parameters, the variables and mixins
/// declared directly in its body, and itself; rulesets and at-rule blocks
/// contribute the variables and mixins declared directly in their bodies.
/// Variables come back nearest declaration first. Top-level symbols are not
/// included; see [`symbols_at_offset`].
pub fn resolve_at_offset(tree: &SyntaxTree, offset: usize) -> Symbols {
    let mut symbols = Symbols::default();

    let Some(node) = tree.node_at_offset(offset) else {
        return symbols;
    };

    let root = tree.root();
    for ancestor in tree.ancestors(node) {
        if ancestor == root {
            break;
        }
        match tree.kind(ancestor) {
            NodeKind::MixinDeclaration => {
                symbols.variables.extend(make_parameters(tree, ancestor));
                collect_body(tree, ancestor, &mut symbols);
                symbols.mixins.push(make_mixin(tree, ancestor));
            }
            NodeKind::Ruleset | NodeKind::AtRule => collect_body(tree, ancestor, &mut symbols),
            _ => {}
        }
    }

    symbols.sort_nearest_first();
    symbols
}

/// Document-level symbols merged with those visible at `offset`.
pub fn symbols_at_offset(tree: &SyntaxTree, offset: usize) -> Symbols {
    let mut merged = extract_symbols(tree);
    let scoped = resolve_at_offset(tree, offset);

    merged.variables.extend(scoped.variables);
    for mixin in scoped.mixins {
        // A namespaced mixin is both document-level and in scope
        if !merged.mixins.iter().any(|known| known.offset == mixin.offset) {
            merged.mixins.push(mixin);
        }
    }

    merged.sort_nearest_first();
    merged
}

/// Parse `text` and collect its symbols, scoped to `offset` when given.
///
/// Text that cannot be parsed yields no symbols rather than an error, so a
/// half-typed comment never breaks completion in other files.
pub fn symbols_from_text(text: &str, offset: Option<usize>) -> Symbols {
    match parse(text) {
        Ok(tree) => match offset {
            Some(offset) => symbols_at_offset(&tree, offset),
            None => extract_symbols(&tree),
        },
        Err(err) => {
            log::debug!("Discarding symbols of unparsable document: {}", err);
            Symbols::default()
        }
    }
}

fn collect_body(tree: &SyntaxTree, owner: NodeId, symbols: &mut Symbols) {
    let Some(body) = tree.body(owner) else {
        return;
    };
    for &child in tree.children(body) {
        match tree.kind(child) {
            NodeKind::VariableDeclaration => symbols.variables.push(make_variable(tree, child)),
            NodeKind::MixinDeclaration => symbols.mixins.push(make_mixin(tree, child)),
            _ => {}
        }
    }
}

//
// syntax/parser.rs
//
// Tolerant recursive-descent parser for LESS stylesheets
//

use super::lexer::{tokenize, Token, TokenKind};
use super::tree::{NodeId, NodeKind, SyntaxTree, TextRange};
use super::ParseError;

/// Parse `text` into a syntax tree.
///
/// The parser never rejects malformed statements: it skips to the next `;`
/// or `}` and keeps going, and an unclosed block runs to the end of the
/// text. The only failure is input the lexer cannot tokenize.
pub fn parse(text: &str) -> Result<SyntaxTree, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        source: text,
        tokens,
        pos: 0,
        tree: SyntaxTree::new(text),
    };
    let root = parser.tree.root();
    parser.parse_items(root, false);

    log::trace!(
        "Parsed stylesheet ({} bytes, {} tokens, {} nodes)",
        text.len(),
        parser.tokens.len(),
        parser.tree.len()
    );

    Ok(parser.tree)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    tree: SyntaxTree,
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    fn token_text(&self, index: usize) -> &'a str {
        let range = self.tokens[index].range;
        &self.source[range.start..range.end]
    }

    fn span(&self, first: usize, last: usize) -> TextRange {
        TextRange::new(self.tokens[first].range.start, self.tokens[last].range.end)
    }

    /// Index of the first `{`, `;` or `}` outside parentheses, or the
    /// token count when the statement runs to the end.
    fn find_terminator(&self, from: usize) -> usize {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(from) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => {
                    return i;
                }
                _ => {}
            }
        }
        self.tokens.len()
    }

    /// Index of the `)` matching the `(` at `open`, searching before `limit`.
    fn matching_paren(&self, open: usize, limit: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in open..limit.min(self.tokens.len()) {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn find_colon(&self, start: usize, stop: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in start..stop {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::Colon if depth == 0 => return Some(i),
                _ => {}
            }
        }
        None
    }

    /// `.name` or `#name` at the start of a statement.
    fn starts_like_mixin(&self, index: usize) -> bool {
        if self.kind_at(index) != Some(TokenKind::Word) {
            return false;
        }
        let text = self.token_text(index);
        text.len() > 1 && (text.starts_with('.') || text.starts_with('#'))
    }

    /// For a head ending in `{`, the index of the `)` closing the mixin
    /// parameter list when the head is `.name(...)` optionally followed by a
    /// `when` guard.
    fn mixin_params_close(&self, start: usize, lbrace: usize) -> Option<usize> {
        if !self.starts_like_mixin(start) || self.kind_at(start + 1) != Some(TokenKind::LParen) {
            return None;
        }
        let close = self.matching_paren(start + 1, lbrace)?;
        let rest = close + 1;
        if rest == lbrace
            || (self.kind_at(rest) == Some(TokenKind::Word) && self.token_text(rest) == "when")
        {
            Some(close)
        } else {
            None
        }
    }

    /// Consume a trailing `;` if present and close the node's range.
    fn finish_statement(&mut self, node: NodeId, mut end: usize) {
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Semicolon {
                end = token.range.end;
                self.pos += 1;
            }
        }
        self.tree.set_end(node, end);
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    fn parse_items(&mut self, parent: NodeId, in_block: bool) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::RBrace => {
                    if in_block {
                        return;
                    }
                    // Stray closing brace at the top level
                    self.pos += 1;
                }
                TokenKind::Semicolon => self.pos += 1,
                TokenKind::AtKeyword => self.parse_at_keyword(parent),
                _ => self.parse_statement(parent),
            }
        }
    }

    fn parse_at_keyword(&mut self, parent: NodeId) {
        if self.token_text(self.pos).eq_ignore_ascii_case("@import") {
            self.parse_import(parent);
        } else if self.kind_at(self.pos + 1) == Some(TokenKind::Colon) {
            self.parse_variable_declaration(parent);
        } else {
            self.parse_at_rule(parent);
        }
    }

    /// `{ items }`, with `pos` on the opening brace. Returns the end offset.
    fn parse_block(&mut self, owner: NodeId) -> usize {
        let open = self.tokens[self.pos];
        self.pos += 1;
        let decls = self
            .tree
            .push(NodeKind::Declarations, Some(open.range), owner);
        self.parse_items(decls, true);

        let end = match self.peek() {
            Some(token) if token.kind == TokenKind::RBrace => {
                self.pos += 1;
                token.range.end
            }
            _ => self.source.len(),
        };
        self.tree.set_end(decls, end);
        end
    }

    /// Skip a balanced `{ ... }` run without building nodes. Returns the end
    /// offset.
    fn skip_braces(&mut self) -> usize {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return token.range.end;
                    }
                }
                _ => {}
            }
        }
        self.source.len()
    }

    /// Add a `Value` node over tokens `first..stop`, with a `VariableName`
    /// child for every variable reference inside it. Returns the end offset.
    fn push_value(&mut self, parent: NodeId, first: usize, stop: usize) -> usize {
        let range = self.span(first, stop - 1);
        let value = self.tree.push(NodeKind::Value, Some(range), parent);
        for i in first..stop {
            let token = self.tokens[i];
            if matches!(token.kind, TokenKind::AtKeyword | TokenKind::Interpolation) {
                self.tree
                    .push(NodeKind::VariableName, Some(token.range), value);
            }
        }
        range.end
    }

    fn parse_variable_declaration(&mut self, parent: NodeId) {
        let at = self.tokens[self.pos];
        let node = self
            .tree
            .push(NodeKind::VariableDeclaration, Some(at.range), parent);
        self.tree.push(NodeKind::VariableName, Some(at.range), node);

        // Name and colon
        self.pos += 2;
        let mut end = self.tokens[self.pos - 1].range.end;

        if self.kind_at(self.pos) == Some(TokenKind::LBrace) {
            // Detached ruleset: `@detached: { ... }`
            let start = self.tokens[self.pos].range.start;
            end = self.skip_braces();
            self.tree
                .push(NodeKind::Value, Some(TextRange::new(start, end)), node);
        } else {
            let stop = self.find_terminator(self.pos);
            if stop > self.pos {
                end = self.push_value(node, self.pos, stop);
            }
            self.pos = stop;
        }

        self.finish_statement(node, end);
    }

    fn parse_at_rule(&mut self, parent: NodeId) {
        let at = self.tokens[self.pos];
        let node = self.tree.push(NodeKind::AtRule, Some(at.range), parent);
        self.pos += 1;

        let mut end = at.range.end;
        let stop = self.find_terminator(self.pos);
        if stop > self.pos {
            end = self.push_value(node, self.pos, stop);
        }
        self.pos = stop;

        if self.kind_at(self.pos) == Some(TokenKind::LBrace) {
            end = self.parse_block(node);
            self.tree.set_end(node, end);
        } else {
            self.finish_statement(node, end);
        }
    }

    fn parse_import(&mut self, parent: NodeId) {
        let at = self.tokens[self.pos];
        let node = self.tree.push(NodeKind::Import, Some(at.range), parent);
        self.pos += 1;

        let stop = self.find_terminator(self.pos);
        let mut i = self.pos;

        // Import options: `(reference, optional)`
        if self.kind_at(i) == Some(TokenKind::LParen) {
            if let Some(close) = self.matching_paren(i, stop) {
                self.tree
                    .push(NodeKind::Value, Some(self.span(i, close)), node);
                i = close + 1;
            }
        }

        while i < stop {
            let token = self.tokens[i];
            match token.kind {
                TokenKind::String | TokenKind::Url => {
                    self.tree
                        .push(NodeKind::StringLiteral, Some(token.range), node);
                }
                TokenKind::Word
                    if self.token_text(i) == "url"
                        && self.kind_at(i + 1) == Some(TokenKind::LParen) =>
                {
                    if let Some(close) = self.matching_paren(i + 1, stop) {
                        self.tree
                            .push(NodeKind::StringLiteral, Some(self.span(i, close)), node);
                        i = close;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        let end = if stop > self.pos {
            self.tokens[stop - 1].range.end
        } else {
            at.range.end
        };
        self.pos = stop;
        self.finish_statement(node, end);
    }

    fn parse_statement(&mut self, parent: NodeId) {
        let start = self.pos;
        let stop = self.find_terminator(start);

        if self.kind_at(stop) == Some(TokenKind::LBrace) {
            match self.mixin_params_close(start, stop) {
                Some(close) => self.parse_mixin_declaration(parent, start, close, stop),
                None => self.parse_ruleset(parent, start, stop),
            }
            return;
        }

        if stop == start {
            // Nothing to build; make progress past the terminator
            self.pos += 1;
            return;
        }

        if self.starts_like_mixin(start) {
            self.parse_mixin_reference(parent, start, stop);
        } else if let Some(colon) = self.find_colon(start, stop) {
            self.parse_declaration(parent, start, colon, stop);
        } else {
            log::trace!(
                "Skipping unrecognized statement at offset {}",
                self.tokens[start].range.start
            );
            self.pos = stop;
            if self.kind_at(self.pos) == Some(TokenKind::Semicolon) {
                self.pos += 1;
            }
        }
    }

    fn parse_ruleset(&mut self, parent: NodeId, start: usize, lbrace: usize) {
        let range_start = self.tokens[start].range.start;
        let node = self.tree.push(
            NodeKind::Ruleset,
            Some(TextRange::new(range_start, range_start)),
            parent,
        );
        if lbrace > start {
            self.tree
                .push(NodeKind::Selector, Some(self.span(start, lbrace - 1)), node);
        }
        self.pos = lbrace;
        let end = self.parse_block(node);
        self.tree.set_end(node, end);
    }

    fn parse_mixin_declaration(&mut self, parent: NodeId, start: usize, close: usize, lbrace: usize) {
        let name = self.tokens[start];
        let node = self
            .tree
            .push(NodeKind::MixinDeclaration, Some(name.range), parent);
        self.tree.push(NodeKind::Identifier, Some(name.range), node);

        let open = start + 1;
        let params = self
            .tree
            .push(NodeKind::Parameters, Some(self.span(open, close)), node);
        self.parse_parameters(params, open + 1, close);

        // Guards (`when (...)`) carry no declarations
        self.pos = lbrace;
        let end = self.parse_block(node);
        self.tree.set_end(node, end);
    }

    /// Parameters between `first` and the closing paren. LESS separates them
    /// with `;` when any top-level `;` is present, otherwise with `,`.
    fn parse_parameters(&mut self, params: NodeId, first: usize, close: usize) {
        let mut depth = 0usize;
        let mut uses_semicolons = false;
        for i in first..close {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::Semicolon if depth == 0 => {
                    uses_semicolons = true;
                    break;
                }
                _ => {}
            }
        }
        let separator = if uses_semicolons {
            TokenKind::Semicolon
        } else {
            TokenKind::Comma
        };

        let mut segments = Vec::new();
        let mut segment_start = first;
        depth = 0;
        for i in first..close {
            match self.tokens[i].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                kind if kind == separator && depth == 0 => {
                    segments.push((segment_start, i));
                    segment_start = i + 1;
                }
                _ => {}
            }
        }
        segments.push((segment_start, close));

        for (a, b) in segments {
            // Pattern-matching literals (`dark`, `...`) bind nothing
            if a >= b || self.tokens[a].kind != TokenKind::AtKeyword {
                continue;
            }
            let name = self.tokens[a];
            let param = self
                .tree
                .push(NodeKind::Parameter, Some(self.span(a, b - 1)), params);
            self.tree.push(NodeKind::VariableName, Some(name.range), param);
            if a + 2 < b && self.kind_at(a + 1) == Some(TokenKind::Colon) {
                self.push_value(param, a + 2, b);
            }
        }
    }

    fn parse_mixin_reference(&mut self, parent: NodeId, start: usize, stop: usize) {
        let node = self
            .tree
            .push(NodeKind::MixinReference, Some(self.span(start, stop - 1)), parent);

        let paren = (start..stop).find(|&i| self.kind_at(i) == Some(TokenKind::LParen));
        let name_stop = (start..paren.unwrap_or(stop))
            .find(|&i| i > start && self.token_text(i).starts_with('!'))
            .unwrap_or(paren.unwrap_or(stop));
        self.tree
            .push(NodeKind::Identifier, Some(self.span(start, name_stop - 1)), node);

        if let Some(open) = paren {
            let close = self.matching_paren(open, stop).unwrap_or(stop - 1);
            self.push_value(node, open, close + 1);
        }

        self.pos = stop;
        let end = self.tokens[stop - 1].range.end;
        self.finish_statement(node, end);
    }

    fn parse_declaration(&mut self, parent: NodeId, start: usize, colon: usize, stop: usize) {
        let node = self
            .tree
            .push(NodeKind::Declaration, Some(self.span(start, stop - 1)), parent);
        if colon > start {
            self.tree
                .push(NodeKind::Property, Some(self.span(start, colon - 1)), node);
        }
        if colon + 1 < stop {
            self.push_value(node, colon + 1, stop);
        }

        self.pos = stop;
        let end = self.tokens[stop - 1].range.end;
        self.finish_statement(node, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of_children(tree: &SyntaxTree, id: NodeId) -> Vec<NodeKind> {
        tree.children(id).iter().map(|&c| tree.kind(c)).collect()
    }

    #[test]
    fn test_parse_variable_declaration() {
        let tree = parse("@name: \"value\";").unwrap();
        let decl = tree.children(tree.root())[0];
        assert_eq!(tree.kind(decl), NodeKind::VariableDeclaration);
        assert_eq!(tree.name(decl), Some("name"));
        let value = tree.value(decl).unwrap();
        assert_eq!(tree.text(value), "\"value\"");
        assert_eq!(tree.range(decl), Some(TextRange::new(0, 15)));
    }

    #[test]
    fn test_parse_variable_without_value() {
        let tree = parse("@a: ;").unwrap();
        let decl = tree.children(tree.root())[0];
        assert_eq!(tree.kind(decl), NodeKind::VariableDeclaration);
        assert!(tree.value(decl).is_none());
    }

    #[test]
    fn test_parse_ruleset_with_nested_variable() {
        let tree = parse(".a > .b { @c: 1; color: @c; }").unwrap();
        let ruleset = tree.children(tree.root())[0];
        assert_eq!(tree.kind(ruleset), NodeKind::Ruleset);
        assert_eq!(tree.name(ruleset), Some(".a > .b"));

        let body = tree.body(ruleset).unwrap();
        assert_eq!(
            kinds_of_children(&tree, body),
            vec![NodeKind::VariableDeclaration, NodeKind::Declaration]
        );

        let decl = tree.children(body)[1];
        let value = tree.value(decl).unwrap();
        let reference = tree.child_of_kind(value, NodeKind::VariableName).unwrap();
        assert_eq!(tree.name(reference), Some("c"));
    }

    #[test]
    fn test_parse_mixin_declaration_parameters() {
        let tree = parse(".mixin(@a: 1, @b) {}").unwrap();
        let mixin = tree.children(tree.root())[0];
        assert_eq!(tree.kind(mixin), NodeKind::MixinDeclaration);
        assert_eq!(tree.name(mixin), Some(".mixin"));

        let params = tree.parameters(mixin).unwrap();
        let list: Vec<_> = tree.children_of_kind(params, NodeKind::Parameter).collect();
        assert_eq!(list.len(), 2);
        assert_eq!(tree.name(list[0]), Some("a"));
        assert_eq!(tree.text(tree.default_value(list[0]).unwrap()), "1");
        assert_eq!(tree.name(list[1]), Some("b"));
        assert!(tree.default_value(list[1]).is_none());
    }

    #[test]
    fn test_parse_semicolon_separated_parameters() {
        let tree = parse(".m(@a: 1, 2; @b: rgba(0,0,0,.5)) {}").unwrap();
        let mixin = tree.children(tree.root())[0];
        let params = tree.parameters(mixin).unwrap();
        let list: Vec<_> = tree.children_of_kind(params, NodeKind::Parameter).collect();
        assert_eq!(list.len(), 2);
        assert_eq!(tree.text(tree.default_value(list[0]).unwrap()), "1, 2");
        assert_eq!(
            tree.text(tree.default_value(list[1]).unwrap()),
            "rgba(0,0,0,.5)"
        );
    }

    #[test]
    fn test_parse_guarded_mixin() {
        let tree = parse(".m(@c) when (iscolor(@c)) { color: @c; }").unwrap();
        let mixin = tree.children(tree.root())[0];
        assert_eq!(tree.kind(mixin), NodeKind::MixinDeclaration);
        assert!(tree.body(mixin).is_some());
    }

    #[test]
    fn test_parse_mixin_reference() {
        let tree = parse(".a { .mixin(1, @x) !important; }").unwrap();
        let ruleset = tree.children(tree.root())[0];
        let body = tree.body(ruleset).unwrap();
        let reference = tree.children(body)[0];
        assert_eq!(tree.kind(reference), NodeKind::MixinReference);
        assert_eq!(tree.name(reference), Some(".mixin"));
    }

    #[test]
    fn test_parse_imports() {
        let tree = parse("@import (reference) \"a\";\n@import url(b.less);").unwrap();
        let imports: Vec<_> = tree.children(tree.root()).to_vec();
        assert_eq!(imports.len(), 2);
        assert_eq!(
            kinds_of_children(&tree, imports[0]),
            vec![NodeKind::Value, NodeKind::StringLiteral]
        );
        let literal = tree.child_of_kind(imports[1], NodeKind::StringLiteral).unwrap();
        assert_eq!(tree.text(literal), "url(b.less)");
    }

    #[test]
    fn test_parse_media_block() {
        let tree = parse("@media (min-width: 10px) { @a: 1; }").unwrap();
        let media = tree.children(tree.root())[0];
        assert_eq!(tree.kind(media), NodeKind::AtRule);
        let body = tree.body(media).unwrap();
        assert_eq!(
            kinds_of_children(&tree, body),
            vec![NodeKind::VariableDeclaration]
        );
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let text = ".a { @b: 1;";
        let tree = parse(text).unwrap();
        let ruleset = tree.children(tree.root())[0];
        assert_eq!(tree.range(ruleset).unwrap().end, text.len());
    }

    #[test]
    fn test_recovers_from_garbage() {
        let tree = parse("}}} ;; garbage ; @a: 1;").unwrap();
        let kinds = kinds_of_children(&tree, tree.root());
        assert_eq!(kinds, vec![NodeKind::VariableDeclaration]);
    }

    #[test]
    fn test_detached_ruleset_value() {
        let tree = parse("@d: { color: red; }; @e: 2;").unwrap();
        let children = tree.children(tree.root()).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.text(tree.value(children[0]).unwrap()), "{ color: red; }");
        assert_eq!(tree.name(children[1]), Some("e"));
    }

    #[test]
    fn test_unterminated_comment_fails() {
        assert!(parse("@a: 1; /*").is_err());
    }
}

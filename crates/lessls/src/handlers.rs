//
// handlers.rs
//
// Completion, hover, definition and signature help over scanned symbols
//

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tower_lsp::lsp_types::*;

use crate::config::ScannerConfig;
use crate::path::{document_display_path, path_to_uri};
use crate::scanner::CurrentDocument;
use crate::symbols::{Mixin, SymbolsRecord, Variable};
use crate::syntax::{self, NodeKind, SyntaxTree, TextPosition, TextRange};

/// Characters that end the word being completed.
const WORD_DELIMITERS: &[char] = &[
    ' ', '\t', '\n', '\r', '"', '\'', ':', ';', ',', '[', ']', '(', ')', '}',
];

fn cursor_offset(current: &CurrentDocument) -> usize {
    current
        .offset
        .unwrap_or(current.text.len())
        .min(current.text.len())
}

fn lsp_position(position: TextPosition) -> Position {
    Position::new(position.line, position.character)
}

fn lsp_range(tree: &SyntaxTree, range: TextRange) -> Range {
    Range::new(
        lsp_position(tree.position_at(range.start)),
        lsp_position(tree.position_at(range.end)),
    )
}

fn find_variable<'a>(
    records: &'a [Arc<SymbolsRecord>],
    name: &str,
) -> Option<(&'a SymbolsRecord, &'a Variable)> {
    records.iter().find_map(|record| {
        record
            .variables
            .iter()
            .find(|variable| variable.name == name)
            .map(|variable| (record.as_ref(), variable))
    })
}

fn find_mixin<'a>(
    records: &'a [Arc<SymbolsRecord>],
    name: &str,
) -> Option<(&'a SymbolsRecord, &'a Mixin)> {
    records.iter().find_map(|record| {
        record
            .mixins
            .iter()
            .find(|mixin| mixin.name == name || mixin.qualified_name() == name)
            .map(|mixin| (record.as_ref(), mixin))
    })
}

fn variable_source(variable: &Variable) -> String {
    match &variable.value {
        Some(value) => format!("@{}: {}", variable.name, value),
        None => format!("@{}", variable.name),
    }
}

/// `name(@a: 1, @b)`
fn mixin_signature(mixin: &Mixin) -> String {
    let parameters: Vec<String> = mixin.parameters.iter().map(variable_source).collect();
    format!("{}({})", mixin.qualified_name(), parameters.join(", "))
}

// ============================================================================
// Completion
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorContext {
    Code,
    Comment,
    String,
}

/// Lexical context at `offset`: inside a comment, a quoted string or plain
/// code. `//` directly after `:` or inside an unquoted `url(...)` is part of
/// a URL, not a comment.
fn cursor_context(text: &str, offset: usize) -> CursorContext {
    #[derive(Clone, Copy)]
    enum State {
        Code,
        Url,
        LineComment,
        BlockComment,
        Quoted(u8),
    }

    let bytes = text.as_bytes();
    let end = offset.min(bytes.len());
    let mut state = State::Code;
    let mut i = 0;

    while i < end {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match byte {
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 2;
                    continue;
                }
                b'/' if next == Some(b'/') && (i == 0 || bytes[i - 1] != b':') => {
                    state = State::LineComment;
                }
                b'"' | b'\'' => state = State::Quoted(byte),
                b'u' | b'U' if starts_unquoted_url(bytes, i) => {
                    state = State::Url;
                    i += 4;
                    continue;
                }
                _ => {}
            },
            State::Url => {
                if byte == b')' || byte == b'\n' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if byte == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    state = State::Code;
                    i += 2;
                    continue;
                }
            }
            State::Quoted(quote) => {
                if byte == b'\\' {
                    i += 2;
                    continue;
                }
                if byte == quote || byte == b'\n' {
                    state = State::Code;
                }
            }
        }
        i += 1;
    }

    match state {
        State::Code | State::Url => CursorContext::Code,
        State::LineComment | State::BlockComment => CursorContext::Comment,
        State::Quoted(_) => CursorContext::String,
    }
}

/// `url(` at `i`, not part of a longer name and not followed by a quote.
fn starts_unquoted_url(bytes: &[u8], i: usize) -> bool {
    let opens = bytes
        .get(i..i + 4)
        .is_some_and(|head| head.eq_ignore_ascii_case(b"url("));
    let standalone = i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'-');
    let quoted = matches!(bytes.get(i + 4), Some(b'"' | b'\''));
    opens && standalone && !quoted
}

/// The word ending at `offset`.
fn current_word(text: &str, offset: usize) -> &str {
    let Some(before) = text.get(..offset) else {
        return "";
    };
    let start = before.rfind(WORD_DELIMITERS).map_or(0, |i| i + 1);
    &before[start..]
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// `@`, `@name`, `@{` or `@{name`
fn is_variable_word(word: &str) -> bool {
    let Some(rest) = word.strip_prefix('@') else {
        return false;
    };
    let rest = rest.strip_prefix('{').unwrap_or(rest);
    rest.chars().all(is_name_char)
}

/// `.`, `#`, `.name` or `#name`
fn is_mixin_word(word: &str) -> bool {
    let Some(rest) = word.strip_prefix(['.', '#']) else {
        return false;
    };
    rest.chars().all(is_name_char)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suggestion {
    /// Variables replacing the text from `start`
    Variables { start: usize, interpolation: bool },
    /// Mixins replacing the text from `start`
    Mixins { start: usize },
    Nothing,
}

fn suggestion_at(text: &str, offset: usize) -> Suggestion {
    let context = cursor_context(text, offset);
    if context == CursorContext::Comment {
        return Suggestion::Nothing;
    }

    let word = current_word(text, offset);
    let word_start = offset - word.len();

    if let Some(at) = word.rfind('@') {
        let variable = &word[at..];
        if !is_variable_word(variable) {
            return Suggestion::Nothing;
        }
        let interpolation = variable.starts_with("@{");
        // Inside quotes only `@{...}` is evaluated
        if context == CursorContext::String && !interpolation {
            return Suggestion::Nothing;
        }
        return Suggestion::Variables {
            start: word_start + at,
            interpolation,
        };
    }

    if context == CursorContext::String {
        return Suggestion::Nothing;
    }

    if word.is_empty() {
        // Empty property value: `color: |`
        let in_value = text.get(..offset).is_some_and(|before| before.trim_end().ends_with(':'));
        return if in_value {
            Suggestion::Variables {
                start: offset,
                interpolation: false,
            }
        } else {
            Suggestion::Nothing
        };
    }

    if is_mixin_word(word) {
        Suggestion::Mixins { start: word_start }
    } else {
        Suggestion::Nothing
    }
}

/// Document path shown next to a suggestion, prefixed with the implicitly
/// label when the current document does not import it.
fn suggestion_detail(
    current: &CurrentDocument,
    current_record: Option<&SymbolsRecord>,
    record: &SymbolsRecord,
    config: &ScannerConfig,
) -> String {
    let path = document_display_path(&current.path, &record.document);
    let implicit = record.document != current.path
        && !current_record.is_some_and(|own| own.imports_document(&record.document));

    match (&config.implicitly_label, implicit) {
        (Some(label), true) => format!("{} {}", label, path),
        _ => path,
    }
}

/// Completion items for the word at the cursor.
///
/// Variables are offered after `@` (also inside `@{` interpolation, even in
/// strings) and for an empty property value; mixins after `.` or `#`.
/// Nothing is offered inside comments. The first occurrence of a symbol per
/// document wins, so scoped declarations shadow outer ones.
pub fn completion(
    current: &CurrentDocument,
    position: Position,
    records: &[Arc<SymbolsRecord>],
    config: &ScannerConfig,
) -> CompletionList {
    let offset = cursor_offset(current);
    let text = &current.text;
    let current_record = records
        .iter()
        .find(|record| record.document == current.path)
        .map(Arc::as_ref);

    let replace_range = |start: usize| {
        let typed = text.get(start..offset).unwrap_or("").encode_utf16().count() as u32;
        Range::new(
            Position::new(position.line, position.character.saturating_sub(typed)),
            position,
        )
    };

    let mut items: IndexMap<(String, &Path), CompletionItem> = IndexMap::new();

    match suggestion_at(text, offset) {
        Suggestion::Variables {
            start,
            interpolation,
        } if config.suggest_variables => {
            let range = replace_range(start);
            for record in records {
                let detail = suggestion_detail(current, current_record, record, config);
                for variable in &record.variables {
                    let label = format!("@{}", variable.name);
                    let new_text = if interpolation {
                        format!("@{{{}", variable.name)
                    } else {
                        label.clone()
                    };
                    items
                        .entry((label.clone(), record.document.as_path()))
                        .or_insert_with(|| CompletionItem {
                            label,
                            kind: Some(CompletionItemKind::VARIABLE),
                            detail: Some(detail.clone()),
                            documentation: variable.value.clone().map(Documentation::String),
                            filter_text: Some(new_text.clone()),
                            text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
                                range, new_text,
                            ))),
                            ..Default::default()
                        });
                }
            }
        }
        Suggestion::Mixins { start } if config.suggest_mixins => {
            let range = replace_range(start);
            for record in records {
                let detail = suggestion_detail(current, current_record, record, config);
                for mixin in &record.mixins {
                    let signature = mixin_signature(mixin);
                    let label = mixin.qualified_name();
                    let (new_text, format) = if mixin.parameters.is_empty() {
                        (format!("{}();", label), InsertTextFormat::PLAIN_TEXT)
                    } else {
                        (format!("{}($1);", label), InsertTextFormat::SNIPPET)
                    };
                    items
                        .entry((signature.clone(), record.document.as_path()))
                        .or_insert_with(|| CompletionItem {
                            label,
                            kind: Some(CompletionItemKind::FUNCTION),
                            detail: Some(detail.clone()),
                            documentation: Some(Documentation::String(signature)),
                            filter_text: Some(mixin.name.clone()),
                            insert_text_format: Some(format),
                            text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
                                range, new_text,
                            ))),
                            ..Default::default()
                        });
                }
            }
        }
        _ => {}
    }

    log::trace!("Offering {} completion items", items.len());

    CompletionList {
        is_incomplete: false,
        items: items.into_values().collect(),
    }
}

// ============================================================================
// Hover
// ============================================================================

/// Hover for a variable name or a mixin identifier at the cursor.
pub fn hover(current: &CurrentDocument, records: &[Arc<SymbolsRecord>]) -> Option<Hover> {
    let tree = syntax::parse(&current.text).ok()?;
    let node = tree.node_at_offset(cursor_offset(current))?;

    let (code, record) = match tree.kind(node) {
        NodeKind::VariableName => {
            let (record, variable) = find_variable(records, tree.name(node)?)?;
            (format!("{};", variable_source(variable)), record)
        }
        NodeKind::Identifier => {
            let owner = tree.parent(node)?;
            if !matches!(
                tree.kind(owner),
                NodeKind::MixinDeclaration | NodeKind::MixinReference
            ) {
                return None;
            }
            let (record, mixin) = find_mixin(records, tree.name(owner)?)?;
            (format!("{} {{\u{2026}}}", mixin_signature(mixin)), record)
        }
        _ => return None,
    };

    let value = format!(
        "```less\n{}\n```\n{}",
        code,
        document_display_path(&current.path, &record.document)
    );

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: tree.range(node).map(|range| lsp_range(&tree, range)),
    })
}

// ============================================================================
// Goto Definition
// ============================================================================

/// Declaration of the variable or mixin referenced at the cursor.
///
/// `None` when the cursor is on a declaration itself or on a mixin
/// parameter.
pub fn goto_definition(
    current: &CurrentDocument,
    records: &[Arc<SymbolsRecord>],
) -> Option<Location> {
    let tree = syntax::parse(&current.text).ok()?;
    let node = tree.node_at_offset(cursor_offset(current))?;
    let parent = tree.parent(node)?;

    let (record, position, length) = match (tree.kind(node), tree.kind(parent)) {
        (NodeKind::VariableName, NodeKind::VariableDeclaration | NodeKind::Parameter) => {
            return None
        }
        (NodeKind::VariableName, _) => {
            let name = tree.name(node)?;
            let (record, variable) = find_variable(records, name)?;
            // Sigil included
            (record, variable.position, name.encode_utf16().count() + 1)
        }
        (NodeKind::Identifier, NodeKind::MixinReference) => {
            let (record, mixin) = find_mixin(records, tree.name(parent)?)?;
            (record, mixin.position, mixin.name.encode_utf16().count())
        }
        _ => return None,
    };

    let start = lsp_position(position);
    let end = Position::new(start.line, start.character + length as u32);

    Some(Location {
        uri: path_to_uri(&record.document)?,
        range: Range::new(start, end),
    })
}

// ============================================================================
// Signature Help
// ============================================================================

/// A mixin call left open before the cursor.
#[derive(Debug, PartialEq, Eq)]
struct MixinCall<'a> {
    name: &'a str,
    arguments: usize,
}

/// Parse the unfinished mixin call on `line`, e.g. `h1 { .m(1, ` gives
/// `.m` with two arguments.
fn parse_mixin_call(line: &str) -> Option<MixinCall<'_>> {
    let mut text = line.trim();
    if text.ends_with(");") || !text.contains('(') {
        return None;
    }
    if let Some(brace) = text.find('{') {
        text = text[brace + 1..].trim_start();
    }

    // Innermost open paren preceded by a mixin name
    let open = open_parens(text).into_iter().rev().find(|&open| {
        let name = text[..open].trim();
        name.starts_with(['.', '#']) && !name.contains(['(', ')'])
    })?;

    Some(MixinCall {
        name: text[..open].trim(),
        arguments: count_arguments(&text[open + 1..]),
    })
}

/// Byte offsets of the parens in `text` that are still open at its end.
fn open_parens(text: &str) -> Vec<usize> {
    let mut open = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => open.push(i),
            ')' => {
                open.pop();
            }
            _ => {}
        }
    }
    open
}

/// Arguments typed so far, split on `,` or `;` outside nested parens and
/// quotes. A trailing separator starts a new, empty argument.
fn count_arguments(arguments: &str) -> usize {
    if arguments.trim().is_empty() {
        return 0;
    }

    let mut count = 1;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in arguments.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' | ';' if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

/// Overloads of the mixin being called at the cursor: every mixin with the
/// called name and at least as many parameters as arguments typed.
pub fn signature_help(
    current: &CurrentDocument,
    records: &[Arc<SymbolsRecord>],
) -> Option<SignatureHelp> {
    let before = current.text.get(..cursor_offset(current))?;
    let line = before.rsplit('\n').next().unwrap_or(before);
    let call = parse_mixin_call(line)?;

    let signatures: Vec<SignatureInformation> = records
        .iter()
        .flat_map(|record| record.mixins.iter())
        .filter(|mixin| {
            (mixin.name == call.name || mixin.qualified_name() == call.name)
                && mixin.parameters.len() >= call.arguments
        })
        .map(|mixin| {
            let parameters: Vec<String> = mixin.parameters.iter().map(variable_source).collect();
            SignatureInformation {
                label: format!("{} ({})", mixin.qualified_name(), parameters.join(", ")),
                documentation: None,
                parameters: Some(
                    mixin
                        .parameters
                        .iter()
                        .map(|parameter| ParameterInformation {
                            label: ParameterLabel::Simple(format!("@{}", parameter.name)),
                            documentation: None,
                        })
                        .collect(),
                ),
                active_parameter: None,
            }
        })
        .collect();

    if signatures.is_empty() {
        return None;
    }

    Some(SignatureHelp {
        signatures,
        active_signature: Some(0),
        active_parameter: Some(call.arguments.saturating_sub(1) as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::symbols_from_text;
    use std::path::PathBuf;

    fn current(text: &str, offset: usize) -> CurrentDocument {
        CurrentDocument {
            path: PathBuf::from("/w/test.less"),
            text: text.to_string(),
            offset: Some(offset),
        }
    }

    fn variable(name: &str, value: Option<&str>, line: u32, character: u32) -> Variable {
        Variable {
            name: name.to_string(),
            value: value.map(str::to_string),
            offset: 0,
            position: TextPosition { line, character },
            mixin: None,
        }
    }

    fn mixin(name: &str, parameters: &[&str]) -> Mixin {
        Mixin {
            name: name.to_string(),
            parameters: parameters
                .iter()
                .map(|p| variable(p, None, 0, 0))
                .collect(),
            parent: None,
            offset: 0,
            position: TextPosition {
                line: 1,
                character: 1,
            },
        }
    }

    /// `one.less` with `@one: 1`, `@two` and `.test`
    fn one_less() -> Arc<SymbolsRecord> {
        Arc::new(SymbolsRecord {
            document: PathBuf::from("/w/one.less"),
            variables: vec![
                variable("one", Some("1"), 1, 1),
                variable("two", None, 2, 1),
            ],
            mixins: vec![mixin(".test", &[])],
            imports: Vec::new(),
            last_modified: None,
        })
    }

    fn with_current(doc: &CurrentDocument, others: &[Arc<SymbolsRecord>]) -> Vec<Arc<SymbolsRecord>> {
        let symbols = symbols_from_text(&doc.text, doc.offset);
        let mut records = vec![Arc::new(SymbolsRecord::new(doc.path.clone(), symbols, None))];
        records.extend(others.iter().cloned());
        records
    }

    fn complete(text: &str, offset: usize, config: &ScannerConfig) -> CompletionList {
        let doc = current(text, offset);
        let position = Position::new(0, offset as u32);
        completion(&doc, position, &[one_less()], config)
    }

    fn count(text: &str, offset: usize) -> usize {
        complete(text, offset, &ScannerConfig::default()).items.len()
    }

    // ------------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------------

    #[test]
    fn test_completion_variables_and_mixins() {
        assert_eq!(count("@", 1), 2);
        assert_eq!(count(".", 1), 1);
        assert_eq!(count("#", 1), 1);
    }

    #[test]
    fn test_completion_empty_property_value() {
        assert_eq!(count(".a { content:  }", 14), 2);
    }

    #[test]
    fn test_completion_in_url() {
        let text = ".a { background: url(../images/one.png); }";
        assert_eq!(count(text, 34), 0);

        let text = ".a { background: url(../images/@{one}/one.png); }";
        assert_eq!(count(text, 36), 2);
        assert_eq!(count(text, 41), 0);
    }

    #[test]
    fn test_completion_in_quotes_only_for_interpolation() {
        let text = r#".a { background: url("../images/@{one}/@one.png"); .test("test", @one); }"#;
        assert_eq!(count(text, 43), 0);
        assert_eq!(count(text, 37), 2);
        assert_eq!(count(text, 69), 2);
    }

    #[test]
    fn test_completion_in_comments() {
        assert_eq!(count("// @", 4), 0);
        assert_eq!(count("/* @ */", 4), 0);
        assert_eq!(count("/* @ */ @", 9), 2);
        assert_eq!(count("// a\n@", 6), 2);
    }

    #[test]
    fn test_url_scheme_is_not_a_comment() {
        assert_eq!(cursor_context("a { b: url(http://x.com/@", 25), CursorContext::Code);
    }

    #[test]
    fn test_protocol_relative_url_is_not_a_comment() {
        let text = ".a { background: url(//cdn/x.png); color: @";
        assert_eq!(count(text, text.len()), 2);
        assert_eq!(cursor_context("a { b: url(//cdn/@", 18), CursorContext::Code);
        assert_eq!(cursor_context("a { b: url(//cdn/x.png); } // @", 31), CursorContext::Comment);
        assert_eq!(cursor_context("a { b: myurl(//x", 16), CursorContext::Comment);
    }

    #[test]
    fn test_completion_respects_suggest_flags() {
        let config = ScannerConfig {
            suggest_variables: false,
            suggest_mixins: false,
            ..Default::default()
        };
        assert!(complete("@", 1, &config).items.is_empty());
        assert!(complete(".", 1, &config).items.is_empty());
    }

    #[test]
    fn test_completion_implicitly_label() {
        let item = &complete("@", 1, &ScannerConfig::default()).items[0];
        assert_eq!(item.label, "@one");
        assert_eq!(item.detail.as_deref(), Some("(implicitly) one.less"));
        assert_eq!(item.documentation, Some(Documentation::String("1".to_string())));

        let config = ScannerConfig {
            implicitly_label: Some("\u{1f47b}".to_string()),
            ..Default::default()
        };
        let item = &complete("@", 1, &config).items[0];
        assert_eq!(item.detail.as_deref(), Some("\u{1f47b} one.less"));

        let config = ScannerConfig {
            implicitly_label: None,
            ..Default::default()
        };
        let item = &complete("@", 1, &config).items[0];
        assert_eq!(item.detail.as_deref(), Some("one.less"));
    }

    #[test]
    fn test_completion_imported_document_has_no_label() {
        let doc = current("@import \"one\";\n@", 16);
        let records = with_current(&doc, &[one_less()]);
        let list = completion(&doc, Position::new(1, 1), &records, &ScannerConfig::default());

        let one = list.items.iter().find(|item| item.label == "@one").unwrap();
        assert_eq!(one.detail.as_deref(), Some("one.less"));
    }

    #[test]
    fn test_completion_current_document_symbols() {
        let doc = current("@local: red;\n.a { color: @ }", 26);
        let records = with_current(&doc, &[]);
        let list = completion(&doc, Position::new(1, 13), &records, &ScannerConfig::default());

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].label, "@local");
        assert_eq!(list.items[0].detail.as_deref(), Some("current"));
    }

    #[test]
    fn test_completion_shadowed_variable_offered_once() {
        let text = "@c: 1;\n.a { @c: 2; .b { color: @ } }";
        let doc = current(text, text.len() - 4);
        let records = with_current(&doc, &[]);
        let list = completion(&doc, Position::new(1, 25), &records, &ScannerConfig::default());

        assert_eq!(list.items.len(), 1);
        assert_eq!(
            list.items[0].documentation,
            Some(Documentation::String("2".to_string()))
        );
    }

    #[test]
    fn test_completion_edit_replaces_typed_word() {
        let list = complete(".a { color: @o", 14, &ScannerConfig::default());
        let Some(CompletionTextEdit::Edit(edit)) = &list.items[0].text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range, Range::new(Position::new(0, 12), Position::new(0, 14)));
        assert_eq!(edit.new_text, "@one");
    }

    #[test]
    fn test_completion_interpolation_edit() {
        let list = complete("~\"@{o", 5, &ScannerConfig::default());
        let Some(CompletionTextEdit::Edit(edit)) = &list.items[0].text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.new_text, "@{one");
    }

    #[test]
    fn test_completion_mixin_snippet() {
        let record = Arc::new(SymbolsRecord {
            document: PathBuf::from("/w/one.less"),
            variables: Vec::new(),
            mixins: vec![mixin(".size", &["w", "h"])],
            imports: Vec::new(),
            last_modified: None,
        });
        let doc = current(".a { .s", 7);
        let list = completion(&doc, Position::new(0, 7), &[record], &ScannerConfig::default());

        let item = &list.items[0];
        assert_eq!(item.label, ".size");
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert_eq!(
            item.documentation,
            Some(Documentation::String(".size(@w, @h)".to_string()))
        );
    }

    #[test]
    fn test_current_word() {
        assert_eq!(current_word(".a { color: @o", 14), "@o");
        assert_eq!(current_word("url(../a/@{x", 12), "../a/@{x");
        assert_eq!(current_word("a", 0), "");
    }

    // ------------------------------------------------------------------------
    // Hover
    // ------------------------------------------------------------------------

    fn hover_value(hover: Hover) -> String {
        match hover.contents {
            HoverContents::Markup(content) => content.value,
            other => panic!("unexpected hover contents: {:?}", other),
        }
    }

    #[test]
    fn test_hover_variable() {
        let doc = current("@one: 1;\n.a { content: @one; }", 25);
        let records = with_current(&doc, &[]);
        let value = hover_value(hover(&doc, &records).unwrap());

        assert_eq!(value, "```less\n@one: 1;\n```\ncurrent");
    }

    #[test]
    fn test_hover_mixin_reference() {
        let doc = current(".one(@a) { content: \"nope\"; }\n.one(1);", 32);
        let records = with_current(&doc, &[]);
        let value = hover_value(hover(&doc, &records).unwrap());

        assert!(value.contains(".one(@a) {\u{2026}}"), "{}", value);
    }

    #[test]
    fn test_hover_from_other_document() {
        let doc = current(".a { .test(); }", 7);
        let value = hover_value(hover(&doc, &[one_less()]).unwrap());

        assert!(value.ends_with("\none.less"), "{}", value);
    }

    #[test]
    fn test_hover_nothing() {
        let doc = current(".one(@a) { content: \"nope\"; }", 14);
        let records = with_current(&doc, &[]);
        assert!(hover(&doc, &records).is_none());

        let doc = current(".a { content: @missing; }", 16);
        assert!(hover(&doc, &[one_less()]).is_none());
    }

    // ------------------------------------------------------------------------
    // Goto Definition
    // ------------------------------------------------------------------------

    fn with_mixin_record() -> Arc<SymbolsRecord> {
        Arc::new(SymbolsRecord {
            document: PathBuf::from("/w/one.less"),
            variables: vec![variable("a", Some("1"), 1, 1)],
            mixins: vec![mixin(".mixin", &[])],
            imports: Vec::new(),
            last_modified: None,
        })
    }

    #[test]
    fn test_definition_variable() {
        let doc = current(".a { content: @a; }", 15);
        let location = goto_definition(&doc, &[with_mixin_record()]).unwrap();

        assert_eq!(location.uri.path(), "/w/one.less");
        assert_eq!(location.range, Range::new(Position::new(1, 1), Position::new(1, 3)));
    }

    #[test]
    fn test_definition_mixin() {
        let doc = current(".a { .mixin(); }", 8);
        let location = goto_definition(&doc, &[with_mixin_record()]).unwrap();

        assert_eq!(location.range, Range::new(Position::new(1, 1), Position::new(1, 7)));
    }

    #[test]
    fn test_definition_on_declarations() {
        let records = [with_mixin_record()];
        assert!(goto_definition(&current("@a: 1;", 2), &records).is_none());
        assert!(goto_definition(&current(".a(@a) {}", 2), &records).is_none());
        assert!(goto_definition(&current(".a(@a) {}", 4), &records).is_none());
    }

    #[test]
    fn test_definition_in_current_document() {
        let doc = current("@x: 1;\n.a { b: @x; }", 16);
        let records = with_current(&doc, &[]);
        let location = goto_definition(&doc, &records).unwrap();

        assert_eq!(location.uri.path(), "/w/test.less");
        assert_eq!(location.range, Range::new(Position::new(0, 0), Position::new(0, 2)));
    }

    // ------------------------------------------------------------------------
    // Signature Help
    // ------------------------------------------------------------------------

    fn overloads() -> Vec<Arc<SymbolsRecord>> {
        vec![Arc::new(SymbolsRecord {
            document: PathBuf::from("/w/one.less"),
            variables: Vec::new(),
            mixins: vec![
                mixin(".one", &[]),
                mixin(".two", &[]),
                mixin(".two", &["a"]),
                mixin(".two", &["a", "b"]),
            ],
            imports: Vec::new(),
            last_modified: None,
        })]
    }

    fn help(text: &str) -> Option<SignatureHelp> {
        signature_help(&current(text, text.len()), &overloads())
    }

    #[test]
    fn test_signature_help_empty() {
        assert_eq!(help(".one(").unwrap().signatures.len(), 1);
        assert_eq!(help(".two(").unwrap().signatures.len(), 3);
    }

    #[test]
    fn test_signature_help_closed() {
        assert!(help(".two(1);").is_none());
        assert!(help(".two").is_none());
    }

    #[test]
    fn test_signature_help_counts_arguments() {
        for text in [
            ".two(1,",
            ".two(1;",
            ".two(rgba(0,0,0,.0001),",
            ".two(\"\\\",;\",",
            ".two(@a: 1,",
        ] {
            let signature = help(text).unwrap();
            assert_eq!(signature.active_parameter, Some(1), "{}", text);
            assert_eq!(signature.signatures.len(), 1, "{}", text);
            assert_eq!(signature.signatures[0].label, ".two (@a, @b)", "{}", text);
        }
    }

    #[test]
    fn test_signature_help_after_selector() {
        let signature = signature_help(&current("h1 { .two(1, }", 12), &overloads()).unwrap();
        assert_eq!(signature.signatures.len(), 1);
    }

    #[test]
    fn test_signature_help_uses_current_line() {
        assert_eq!(help(".one(1);\n.two(").unwrap().signatures.len(), 3);
    }

    #[test]
    fn test_signature_help_unknown_mixin() {
        assert!(help(".three(").is_none());
        assert!(help("color: rgba(").is_none());
    }

    #[test]
    fn test_parse_mixin_call() {
        assert_eq!(
            parse_mixin_call("  .m(a, fn(b,"),
            Some(MixinCall {
                name: ".m",
                arguments: 2
            })
        );
        assert_eq!(
            parse_mixin_call("#ns .m("),
            Some(MixinCall {
                name: "#ns .m",
                arguments: 0
            })
        );
    }
}

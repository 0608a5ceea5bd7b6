//
// syntax/lexer.rs
//
// Token stream for LESS stylesheets
//

use logos::Logos;

use super::tree::TextRange;
use super::ParseError;

/// Token kinds produced by the lexer.
///
/// Whitespace and terminated comments are skipped. Everything that is not
/// punctuation, a string or an at-keyword collapses into `Word`, so selector
/// and value text is recovered from source ranges rather than from tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(error = LexError)]
pub enum TokenKind {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("/")]
    Slash,
    /// `@name`, covering variables, `@import`, `@media` and friends
    #[regex(r"@[A-Za-z_-][A-Za-z0-9_-]*")]
    AtKeyword,
    /// `@{name}`
    #[regex(r"@\{[A-Za-z0-9_-]+\}")]
    Interpolation,
    /// Quoted string; the closing quote is optional so a string that is
    /// still being typed ends at the line break.
    #[regex(r#""([^"\\\n]|\\.)*"?"#)]
    #[regex(r#"'([^'\\\n]|\\.)*'?"#)]
    String,
    /// Unquoted `url(...)`, lexed whole so `//` inside it is not a comment
    #[regex(r#"url\([^)"'\n]*\)"#)]
    Url,
    /// Never emitted: `block_comment` skips a closed comment and fails on
    /// an open one.
    #[token("/*", block_comment)]
    BlockComment,
    #[regex(r#"[^ \t\r\n\f{}();:,"'@/]+"#)]
    Word,
    /// Any character the other rules reject (e.g. a lone `@`)
    Delim,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LexError {
    #[default]
    Unrecognized,
    UnterminatedComment,
}

fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> logos::FilterResult<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            logos::FilterResult::Error(LexError::UnterminatedComment)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

/// Split `text` into tokens.
///
/// Fails only on a block comment that is never closed, since everything
/// after it would be swallowed.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(text);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(LexError::UnterminatedComment) => {
                return Err(ParseError::UnterminatedComment { offset: span.start });
            }
            Err(LexError::Unrecognized) => TokenKind::Delim,
        };
        tokens.push(Token {
            kind,
            range: TextRange::new(span.start, span.end),
        });
    }

    Ok(tokens)
}

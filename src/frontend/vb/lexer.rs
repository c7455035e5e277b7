//! Line-oriented Visual Basic lexer
//!
//! Produces a flat token stream where statement boundaries are explicit
//! (`Newline` and `Colon` tokens). Line continuations, both the explicit
//! ` _` form and the implicit ones (after operators, commas and opening
//! brackets, or before a closing bracket), are folded away here so the
//! parser never sees them. Comments and preprocessor directives are dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword; keywords are recognized by the parser
    Word,
    /// `[Name]`
    EscapedIdentifier,
    String,
    Character,
    Number,
    Date,
    InterpolatedString,
    Symbol,
    /// `:` statement separator
    Colon,
    Newline,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }

    pub fn is_statement_end(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Colon | TokenKind::Eof)
    }
}

/// Symbols after which a line break does not end the statement
const CONTINUING_SYMBOLS: &[&str] = &[
    ",", "(", "{", "&", "+", "-", "*", "/", "\\", "^", "=", "<", ">", "<=", ">=", "<>", ":=", ".", "&=", "+=",
    "-=", "*=", "/=", "\\=", "^=", "<<", ">>", "?.",
];

/// Operator keywords after which a line break does not end the statement
const CONTINUING_WORDS: &[&str] = &["And", "AndAlso", "Or", "OrElse", "Xor", "Mod", "Is", "IsNot", "Like"];

const MULTI_CHAR_SYMBOLS: &[&str] = &[
    "<<=", ">>=", ":=", "<>", "<=", ">=", "<<", ">>", "&=", "+=", "-=", "*=", "/=", "\\=", "^=", "?.",
];

struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    tokens: Vec<Token>,
    at_line_start: bool,
}

/// Tokenize a Visual Basic source file
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
        at_line_start: true,
    };
    lexer.run();
    lexer.tokens
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'s> Lexer<'s> {
    fn peek_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|s| s.chars().next())
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..).and_then(|s| s.chars().next())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            start,
            end: self.pos,
        });
        self.at_line_start = false;
    }

    fn skip_to_line_end(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    /// Whether the next line opens with a closing bracket
    fn next_line_closes(&self) -> bool {
        self.source[self.pos..]
            .trim_start_matches(|c: char| c.is_whitespace())
            .starts_with([')', '}'])
    }

    /// Whether the previous token lets the statement run onto the next line
    fn continues_line(&self) -> bool {
        if self.next_line_closes() {
            return true;
        }
        let Some(last) = self.tokens.last() else {
            return false;
        };
        let text = last.text(self.source);
        match last.kind {
            TokenKind::Symbol => CONTINUING_SYMBOLS.contains(&text),
            TokenKind::Word => CONTINUING_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text)),
            _ => false,
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek_char() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.pos += 1;
                    if !self.continues_line() {
                        self.push(TokenKind::Newline, start);
                    }
                    self.at_line_start = true;
                }
                ' ' | '\t' | '\r' | '\u{feff}' | '\u{a0}' => self.pos += c.len_utf8(),
                '\'' | '\u{2018}' | '\u{2019}' => self.skip_to_line_end(),
                '#' if self.at_line_start => self.skip_to_line_end(),
                '#' => self.lex_date(),
                '"' | '\u{201c}' | '\u{201d}' => self.lex_string(),
                '$' if self.char_at(self.pos + 1) == Some('"') => self.lex_interpolated(),
                '[' => self.lex_escaped_identifier(),
                '&' if self.is_radix_prefix() => self.lex_radix_number(),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_ident_start(c) => self.lex_word(),
                ':' if self.char_at(self.pos + 1) != Some('=') => {
                    self.pos += 1;
                    self.push(TokenKind::Colon, start);
                }
                _ => self.lex_symbol(),
            }
        }
        let end = self.bytes.len();
        self.tokens.push(Token {
            kind: TokenKind::Newline,
            start: end,
            end,
        });
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            start: end,
            end,
        });
    }

    fn lex_word(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !is_ident_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        let text = &self.source[start..self.pos];

        if text == "_" {
            // Explicit continuation: ` _` followed by the end of the line
            let rest = self.source[self.pos..].split('\n').next().unwrap_or("");
            let trimmed = rest.trim();
            if trimmed.is_empty() || trimmed.starts_with('\'') {
                self.skip_to_line_end();
                if self.pos < self.bytes.len() {
                    self.pos += 1;
                }
                return;
            }
        }
        if text.eq_ignore_ascii_case("REM") {
            self.skip_to_line_end();
            return;
        }
        if matches!(self.peek_char(), Some('$') | Some('%')) && self.char_at(self.pos + 1) != Some('"') {
            self.pos += 1;
        }
        self.push(TokenKind::Word, start);
    }

    fn lex_escaped_identifier(&mut self) {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
            if c == ']' || c == '\n' {
                break;
            }
        }
        self.push(TokenKind::EscapedIdentifier, start);
    }

    fn lex_string(&mut self) {
        let start = self.pos;
        self.pos += self.peek_char().map(char::len_utf8).unwrap_or(1);
        loop {
            match self.peek_char() {
                None | Some('\n') => break,
                Some('"') | Some('\u{201c}') | Some('\u{201d}') => {
                    let width = self.peek_char().map(char::len_utf8).unwrap_or(1);
                    self.pos += width;
                    if self.peek_char() == Some('"') {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
                Some(c) => self.pos += c.len_utf8(),
            }
        }
        let is_char_literal = matches!(self.peek_char(), Some('c') | Some('C'))
            && !self.char_at(self.pos + 1).is_some_and(is_ident_char);
        if is_char_literal {
            self.pos += 1;
            self.push(TokenKind::Character, start);
        } else {
            self.push(TokenKind::String, start);
        }
    }

    fn lex_interpolated(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let mut braces = 0usize;
        while let Some(c) = self.peek_char() {
            match c {
                '\n' => break,
                '{' => braces += 1,
                '}' => braces = braces.saturating_sub(1),
                '"' if braces > 0 => {
                    // String literal inside a hole
                    self.pos += 1;
                    while let Some(inner) = self.peek_char() {
                        self.pos += inner.len_utf8();
                        if inner == '"' || inner == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                '"' => {
                    self.pos += 1;
                    if self.peek_char() == Some('"') {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        self.push(TokenKind::InterpolatedString, start);
    }

    fn lex_date(&mut self) {
        let start = self.pos;
        let line_rest = &self.source[self.pos + 1..];
        let close = line_rest
            .find(|c| c == '#' || c == '\n')
            .filter(|&i| line_rest.as_bytes()[i] == b'#');
        match close {
            Some(i) => {
                self.pos += i + 2;
                self.push(TokenKind::Date, start);
            }
            None => {
                self.pos += 1;
                self.push(TokenKind::Symbol, start);
            }
        }
    }

    fn is_radix_prefix(&self) -> bool {
        matches!(self.char_at(self.pos + 1), Some('H' | 'h' | 'O' | 'o' | 'B' | 'b'))
            && self.char_at(self.pos + 2).is_some_and(|c| c.is_ascii_hexdigit())
    }

    fn lex_radix_number(&mut self) {
        let start = self.pos;
        self.pos += 2;
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            self.pos += 1;
        }
        self.push(TokenKind::Number, start);
    }

    fn lex_number(&mut self) {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' && !seen_dot && self.char_at(self.pos + 1).is_some_and(|n| n.is_ascii_digit()) {
                seen_dot = true;
                self.pos += 1;
            } else if (c == 'E' || c == 'e')
                && self
                    .char_at(self.pos + 1)
                    .is_some_and(|n| n.is_ascii_digit() || n == '+' || n == '-')
            {
                self.pos += 2;
            } else {
                break;
            }
        }
        // Type suffixes such as `D`, `UL` or `!`
        let mut suffix = 0;
        while let Some(c) = self.peek_char() {
            if suffix < 2 && matches!(c, 'D' | 'd' | 'F' | 'f' | 'R' | 'r' | 'I' | 'i' | 'S' | 's' | 'L' | 'l' | 'U' | 'u' | 'C' | 'c' | '@' | '!' | '%') {
                self.pos += 1;
                suffix += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn lex_symbol(&mut self) {
        let start = self.pos;
        let rest = &self.source[self.pos..];
        if let Some(sym) = MULTI_CHAR_SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.pos += sym.len();
        } else {
            let c = self.peek_char().unwrap_or(' ');
            self.pos += c.len_utf8();
        }
        self.push(TokenKind::Symbol, start);
    }
}

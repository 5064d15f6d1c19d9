//! Tokenizer for the drawing-script language.

use super::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Template(Vec<TemplateChunk>),
    Ident(String),
    Punct(&'static str),
    Eof,
}

/// A piece of a template literal: literal text, or the tokens of a `${...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateChunk {
    Text(String),
    Expr(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Longest punctuators first so greedy matching works.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "=>", "==", "!=", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=",
    "/=", "%=", "(", ")", "{", "}", "[", "]", ";", ",", ".", "+", "-", "*", "/", "%", "<", ">",
    "=", "!", "?", ":",
];

pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
    };
    let mut tokens = lexer.lex_until(None)?;
    tokens.push(Token {
        kind: TokenKind::Eof,
        line: lexer.line,
    });
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    /// Lex tokens until end of input, or until the unmatched `}` closing a
    /// template substitution when `close` is set.
    fn lex_until(&mut self, close: Option<char>) -> Result<Vec<Token>, ScriptError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                if close.is_some() {
                    return Err(self.error("unterminated template substitution"));
                }
                return Ok(tokens);
            };
            let line = self.line;

            if close == Some(c) && depth == 0 {
                self.bump();
                return Ok(tokens);
            }

            let kind = if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
                self.number()?
            } else if c == '\'' || c == '"' {
                self.bump();
                TokenKind::Str(self.string(c)?)
            } else if c == '`' {
                self.bump();
                self.template()?
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                self.ident()
            } else {
                let punct = self.punct()?;
                match punct {
                    "{" => depth += 1,
                    "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
                TokenKind::Punct(punct)
            };
            tokens.push(Token { kind, line });
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ScriptError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn number(&mut self) -> Result<TokenKind, ScriptError> {
        let start = self.pos;
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits: String = self.chars[digits_start..self.pos].iter().collect();
            return u64::from_str_radix(&digits, 16)
                .map(|n| TokenKind::Number(n as f64))
                .map_err(|_| self.error("invalid hex literal"));
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("invalid number literal `{text}`")))
    }

    fn escape(&mut self) -> Result<char, ScriptError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'x' => self.hex_escape(2)?,
            'u' if self.peek() == Some('{') => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != '}') {
                    self.bump();
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                self.bump();
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))?
            }
            'u' => self.hex_escape(4)?,
            other => other,
        })
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, ScriptError> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                _ => return Err(self.error("invalid hex escape")),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid hex escape"))
    }

    fn string(&mut self, quote: char) -> Result<String, ScriptError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    // Line continuation.
                    if self.peek() == Some('\n') {
                        self.bump();
                        continue;
                    }
                    out.push(self.escape()?);
                }
                Some('\n') | None => return Err(self.error("unterminated string literal")),
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self) -> Result<TokenKind, ScriptError> {
        let mut chunks = Vec::new();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('`') => break,
                Some('\\') => text.push(self.escape()?),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    if !text.is_empty() {
                        chunks.push(TemplateChunk::Text(std::mem::take(&mut text)));
                    }
                    let mut tokens = self.lex_until(Some('}'))?;
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        line: self.line,
                    });
                    chunks.push(TemplateChunk::Expr(tokens));
                }
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated template literal")),
            }
        }
        if !text.is_empty() {
            chunks.push(TemplateChunk::Text(text));
        }
        Ok(TokenKind::Template(chunks))
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        TokenKind::Ident(self.chars[start..self.pos].iter().collect())
    }

    fn punct(&mut self) -> Result<&'static str, ScriptError> {
        for punct in PUNCTUATORS {
            let matches = punct
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_at(i) == Some(c));
            if matches {
                for _ in 0..punct.chars().count() {
                    self.bump();
                }
                return Ok(punct);
            }
        }
        let c = self.peek().unwrap_or('?');
        Err(self.error(format!("unexpected character `{c}`")))
    }
}

//! Recursive-descent parser producing [`Stmt`] lists.
//!
//! Semicolons are optional: a statement ends where the next token cannot
//! continue the current expression.

use std::rc::Rc;

use super::ast::{AssignOp, BinaryOp, Expr, Function, FunctionBody, LogicalOp, Stmt, TemplatePart, UnaryOp};
use super::lexer::{TemplateChunk, Token, TokenKind};
use super::ScriptError;

pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, ScriptError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut program = Vec::new();
    while !parser.at_eof() {
        program.push(parser.statement()?);
    }
    Ok(program)
}

static EOF: TokenKind = TokenKind::Eof;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    // ---- token helpers ----

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&EOF)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), TokenKind::Punct(p) if *p == punct)
    }

    fn is_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(w) if w == word)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> Result<(), ScriptError> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{punct}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ScriptError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn unexpected(&self, wanted: &str) -> ScriptError {
        let found = match self.peek() {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Template(_) => "template literal".to_string(),
            TokenKind::Ident(name) => format!("`{name}`"),
            TokenKind::Punct(p) => format!("`{p}`"),
            TokenKind::Eof => "end of input".to_string(),
        };
        ScriptError::Syntax {
            line: self.line(),
            message: format!("expected {wanted}, found {found}"),
        }
    }

    fn end_statement(&mut self) {
        self.eat_punct(";");
    }

    // ---- statements ----

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        if self.eat_punct(";") {
            return Ok(Stmt::Empty);
        }
        if self.is_punct("{") {
            return Ok(Stmt::Block(self.block()?));
        }

        let keyword = match self.peek() {
            TokenKind::Ident(word) => word.clone(),
            _ => String::new(),
        };
        match keyword.as_str() {
            "const" | "let" | "var" => {
                self.pos += 1;
                let decl = self.declarations()?;
                self.end_statement();
                Ok(decl)
            }
            "if" => self.if_statement(),
            "for" => self.for_statement(),
            "while" => {
                self.pos += 1;
                self.expect_punct("(")?;
                let test = self.expression()?;
                self.expect_punct(")")?;
                Ok(Stmt::While(test, Box::new(self.statement()?)))
            }
            "return" => {
                self.pos += 1;
                let value = if self.is_punct(";") || self.is_punct("}") || self.at_eof() {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.end_statement();
                Ok(Stmt::Return(value))
            }
            "break" => {
                self.pos += 1;
                self.end_statement();
                Ok(Stmt::Break)
            }
            "continue" => {
                self.pos += 1;
                self.end_statement();
                Ok(Stmt::Continue)
            }
            "function" => {
                self.pos += 1;
                let name = self.expect_ident()?;
                let function = self.function_rest(Some(name))?;
                Ok(Stmt::Function(function))
            }
            _ => {
                let expr = self.expression()?;
                self.end_statement();
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            body.push(self.statement()?);
        }
        self.pos += 1;
        Ok(body)
    }

    /// Declarator list after `const`/`let`/`var`.
    fn declarations(&mut self) -> Result<Stmt, ScriptError> {
        let mut decls = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat_punct("=") {
                Some(self.assignment()?)
            } else {
                None
            };
            decls.push((name, init));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(Stmt::Declare(decls))
    }

    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.pos += 1;
        self.expect_punct("(")?;
        let test = self.expression()?;
        self.expect_punct(")")?;
        let then = Box::new(self.statement()?);
        let otherwise = if self.is_keyword("else") {
            self.pos += 1;
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(test, then, otherwise))
    }

    fn for_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.pos += 1;
        self.expect_punct("(")?;

        let init = if self.eat_punct(";") {
            None
        } else {
            let init = if self.is_keyword("const") || self.is_keyword("let") || self.is_keyword("var") {
                self.pos += 1;
                if matches!(self.peek_at(1), TokenKind::Ident(w) if w == "of") {
                    let name = self.expect_ident()?;
                    self.pos += 1;
                    let iterable = self.expression()?;
                    self.expect_punct(")")?;
                    let body = Box::new(self.statement()?);
                    return Ok(Stmt::ForOf { name, iterable, body });
                }
                self.declarations()?
            } else {
                Stmt::Expr(self.expression()?)
            };
            self.expect_punct(";")?;
            Some(Box::new(init))
        };

        let test = if self.is_punct(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(";")?;

        let update = if self.is_punct(")") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(")")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Parameter list and body following `function name?`.
    fn function_rest(&mut self, name: Option<String>) -> Result<Rc<Function>, ScriptError> {
        let params = self.params()?;
        let body = FunctionBody::Block(self.block()?);
        Ok(Rc::new(Function { name, params, body }))
    }

    fn params(&mut self) -> Result<Vec<String>, ScriptError> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.eat_punct(")") {
            params.push(self.expect_ident()?);
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        Ok(params)
    }

    // ---- expressions ----

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.assignment()
    }

    /// Whether the tokens at the cursor start an arrow function.
    fn at_arrow(&self) -> bool {
        match self.peek() {
            TokenKind::Ident(_) => matches!(self.peek_at(1), TokenKind::Punct("=>")),
            TokenKind::Punct("(") => {
                let mut depth = 0usize;
                let mut offset = 0;
                loop {
                    match self.peek_at(offset) {
                        TokenKind::Punct("(") => depth += 1,
                        TokenKind::Punct(")") => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.peek_at(offset + 1), TokenKind::Punct("=>"));
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn arrow(&mut self) -> Result<Expr, ScriptError> {
        let params = if self.is_punct("(") {
            self.params()?
        } else {
            vec![self.expect_ident()?]
        };
        self.expect_punct("=>")?;
        let body = if self.is_punct("{") {
            FunctionBody::Block(self.block()?)
        } else {
            FunctionBody::Expr(Box::new(self.assignment()?))
        };
        Ok(Expr::Function(Rc::new(Function {
            name: None,
            params,
            body,
        })))
    }

    fn assignment(&mut self) -> Result<Expr, ScriptError> {
        if self.at_arrow() {
            return self.arrow();
        }

        let target = self.conditional()?;
        let op = match self.peek() {
            TokenKind::Punct("=") => AssignOp::Assign,
            TokenKind::Punct("+=") => AssignOp::Compound(BinaryOp::Add),
            TokenKind::Punct("-=") => AssignOp::Compound(BinaryOp::Sub),
            TokenKind::Punct("*=") => AssignOp::Compound(BinaryOp::Mul),
            TokenKind::Punct("/=") => AssignOp::Compound(BinaryOp::Div),
            TokenKind::Punct("%=") => AssignOp::Compound(BinaryOp::Rem),
            _ => return Ok(target),
        };
        if !matches!(target, Expr::Ident(_) | Expr::Member(..) | Expr::Index(..)) {
            return Err(ScriptError::Syntax {
                line: self.line(),
                message: "invalid assignment target".to_string(),
            });
        }
        self.pos += 1;
        let value = self.assignment()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn conditional(&mut self) -> Result<Expr, ScriptError> {
        let test = self.logical_or()?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let then = self.assignment()?;
        self.expect_punct(":")?;
        let otherwise = self.assignment()?;
        Ok(Expr::Conditional(
            Box::new(test),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn logical_or(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.logical_and()?;
        loop {
            let op = if self.eat_punct("||") {
                LogicalOp::Or
            } else if self.eat_punct("??") {
                LogicalOp::Nullish
            } else {
                return Ok(left);
            };
            let right = self.logical_and()?;
            left = Expr::Logical(op, Box::new(left), Box::new(right));
        }
    }

    fn logical_and(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.equality()?;
        while self.eat_punct("&&") {
            let right = self.equality()?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// One left-associative binary precedence level.
    fn binary_level(
        &mut self,
        ops: &[(&str, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ScriptError>,
    ) -> Result<Expr, ScriptError> {
        let mut left = next(self)?;
        'outer: loop {
            for (punct, op) in ops {
                if self.eat_punct(punct) {
                    let right = next(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn equality(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("===", BinaryOp::StrictEq),
                ("!==", BinaryOp::StrictNotEq),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::NotEq),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("<=", BinaryOp::LtEq),
                (">=", BinaryOp::GtEq),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Rem)],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.peek() {
            TokenKind::Punct("!") => Some(UnaryOp::Not),
            TokenKind::Punct("-") => Some(UnaryOp::Neg),
            TokenKind::Punct("+") => Some(UnaryOp::Plus),
            TokenKind::Ident(w) if w == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            return Ok(Expr::Unary(op, Box::new(self.unary()?)));
        }

        for (punct, increment) in [("++", true), ("--", false)] {
            if self.eat_punct(punct) {
                let target = self.unary()?;
                return Ok(Expr::Update {
                    increment,
                    prefix: true,
                    target: Box::new(target),
                });
            }
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ScriptError> {
        let expr = self.call_member()?;
        for (punct, increment) in [("++", true), ("--", false)] {
            if self.eat_punct(punct) {
                return Ok(Expr::Update {
                    increment,
                    prefix: false,
                    target: Box::new(expr),
                });
            }
        }
        Ok(expr)
    }

    fn call_member(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat_punct(".") {
                let name = self.expect_ident()?;
                expr = Expr::Member(Box::new(expr), name);
            } else if self.eat_punct("[") {
                let index = self.expression()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.is_punct("(") {
                let args = self.arguments()?;
                expr = Expr::Call(Box::new(expr), args);
            } else {
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ScriptError> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        while !self.eat_punct(")") {
            args.push(self.assignment()?);
            if !self.is_punct(")") {
                self.expect_punct(",")?;
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        let line = self.line();
        match self.advance() {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::Template(chunks) => self.template(chunks),
            TokenKind::Punct("(") => {
                let expr = self.expression()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            TokenKind::Punct("[") => {
                let mut items = Vec::new();
                while !self.eat_punct("]") {
                    items.push(self.assignment()?);
                    if !self.is_punct("]") {
                        self.expect_punct(",")?;
                    }
                }
                Ok(Expr::Array(items))
            }
            TokenKind::Punct("{") => self.object(),
            TokenKind::Ident(word) => match word.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                "undefined" => Ok(Expr::Undefined),
                "function" => {
                    let name = match self.peek() {
                        TokenKind::Ident(name) => {
                            let name = name.clone();
                            self.pos += 1;
                            Some(name)
                        }
                        _ => None,
                    };
                    Ok(Expr::Function(self.function_rest(name)?))
                }
                "new" => {
                    let class = self.expect_ident()?;
                    let args = if self.is_punct("(") {
                        self.arguments()?
                    } else {
                        Vec::new()
                    };
                    Ok(Expr::New(class, args))
                }
                "const" | "let" | "var" | "if" | "else" | "for" | "while" | "return" | "break"
                | "continue" | "class" | "import" | "export" | "await" | "async" | "this"
                | "try" | "throw" => Err(ScriptError::Syntax {
                    line,
                    message: format!("unexpected keyword `{word}`"),
                }),
                _ => Ok(Expr::Ident(word)),
            },
            _ => {
                self.pos -= 1;
                Err(self.unexpected("an expression"))
            }
        }
    }

    fn object(&mut self) -> Result<Expr, ScriptError> {
        let mut props = Vec::new();
        while !self.eat_punct("}") {
            let key = match self.advance() {
                TokenKind::Ident(name) => name,
                TokenKind::Str(s) => s,
                TokenKind::Number(n) => super::value::number_to_string(n),
                _ => {
                    self.pos -= 1;
                    return Err(self.unexpected("a property name"));
                }
            };
            let value = if self.eat_punct(":") {
                self.assignment()?
            } else {
                Expr::Ident(key.clone())
            };
            props.push((key, value));
            if !self.is_punct("}") {
                self.expect_punct(",")?;
            }
        }
        Ok(Expr::Object(props))
    }

    fn template(&mut self, chunks: Vec<TemplateChunk>) -> Result<Expr, ScriptError> {
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match chunk {
                TemplateChunk::Text(text) => parts.push(TemplatePart::Text(text)),
                TemplateChunk::Expr(tokens) => {
                    let mut inner = Parser { tokens, pos: 0 };
                    let expr = inner.expression()?;
                    if !inner.at_eof() {
                        return Err(inner.unexpected("`}`"));
                    }
                    parts.push(TemplatePart::Expr(expr));
                }
            }
        }
        Ok(Expr::Template(parts))
    }
}

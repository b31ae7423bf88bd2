use std::collections::HashSet;

use log::debug;

use crate::{
    ast::{
        Block, BoolExpr, Case, CaseLabel, Command, Comparator, Condition, Ident, If, Jump,
        LogicalOperator, Loop, MapScriptEntry, MapScriptTable, MapScriptTarget, MapScripts, Mart,
        Movement, Operator, OperatorKind, Program, Raw, Scope, Script, Statement, Switch,
        TableEntry, Text, TextDecl, FLAG_FALSE, FLAG_TRUE,
    },
    lexer::{self, extract},
    session::Session,
    token::{Spanned, Token, TokenKind},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Upper bound for `step * N` in movement declarations.
pub const MAX_REPEAT_COUNT: usize = 255;

/// Either the parsed program, or every diagnostic found while parsing it.
pub type ParseResult<T> = std::result::Result<T, Vec<Spanned<Error>>>;

/// Lexes and parses the provided source.
///
/// Parsing stops at the first error of each top-level statement and resumes
/// at the next one, so that independent mistakes are all reported. No
/// program is returned if there was any error.
pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    session: &mut Session,
) -> ParseResult<Program> {
    assert!(tokens.is_empty());

    lexer::lex(src, tokens);
    debug!("lexed {} tokens", tokens.len());

    let mut p = Parser::new(src, tokens, session);
    let program = p.parse_program()?;
    debug!(
        "parsed {} top-level statements and {} implicit texts",
        program.statements.len(),
        program.texts.len()
    );
    Ok(program)
}

struct Parser<'src, 'tok, 'ses> {
    src: &'src str,
    tokens: &'tok [Token],
    session: &'ses mut Session,
    cursor: usize,
    implicit_texts: Vec<Text>,
}

impl Parser<'_, '_, '_> {
    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::with_capacity(16);
        let mut errors = Vec::new();
        while self.except([]) {
            let start = self.cursor;
            match self.parse_top_level() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    errors.push(error);
                    self.synchronize(start);
                }
            }
        }

        if errors.is_empty() {
            Ok(Program {
                statements,
                texts: std::mem::take(&mut self.implicit_texts),
            })
        } else {
            Err(errors)
        }
    }

    fn parse_top_level(&mut self) -> Result<Statement> {
        let c = self.peek();
        match c.kind {
            TokenKind::Script => self.parse_script().map(Statement::Script),
            TokenKind::Raw | TokenKind::RawGlobal => self.parse_raw().map(Statement::Raw),
            TokenKind::Text => self.parse_text().map(Statement::Text),
            TokenKind::Movement => self.parse_movement().map(Statement::Movement),
            TokenKind::Mart => self.parse_mart().map(Statement::Mart),
            TokenKind::MapScripts => self.parse_mapscripts().map(Statement::MapScripts),
            kind if kind.is_error() => Err(c.span().wrap(Error::Lexer(kind))),
            _ => Err(c.span().wrap(Error::InvalidTopLevel(self.literal(c).into()))),
        }
    }

    fn parse_script(&mut self) -> Result<Script> {
        self.consume(TokenKind::Script)?;
        let scope = self.parse_scope(Scope::Global)?;
        let name = self.parse_ident()?;
        let body = self.parse_block()?;
        Ok(Script { name, body, scope })
    }

    fn parse_raw(&mut self) -> Result<Raw> {
        let keyword = self.consume_any(&[TokenKind::Raw, TokenKind::RawGlobal])?;
        let scope = match keyword.kind {
            TokenKind::RawGlobal => Scope::Global,
            _ => Scope::Local,
        };
        let value = self.consume(TokenKind::RawString)?;
        Ok(Raw {
            value: extract::raw_string(value, self.src),
            scope,
            span: keyword.span(),
        })
    }

    fn parse_text(&mut self) -> Result<TextDecl> {
        self.consume(TokenKind::Text)?;
        let scope = self.parse_scope(Scope::Local)?;
        let name = self.parse_ident()?;
        let open = self.consume(TokenKind::LBrace)?;

        let kind = if self.is(TokenKind::Identifier) {
            Some(extract::ident(self.advance(), self.src))
        } else {
            None
        };
        let first = self.consume(TokenKind::String)?;
        let mut value = String::from(extract::string(first, self.src));
        while self.is(TokenKind::String) {
            value.push_str(&extract::string(self.advance(), self.src));
        }
        self.close(TokenKind::RBrace, open)?;

        Ok(TextDecl {
            name,
            value: value.into_boxed_str(),
            kind,
            scope,
        })
    }

    fn parse_movement(&mut self) -> Result<Movement> {
        self.consume(TokenKind::Movement)?;
        let scope = self.parse_scope(Scope::Local)?;
        let name = self.parse_ident()?;
        let open = self.consume(TokenKind::LBrace)?;

        let mut steps = Vec::new();
        while !self.take(TokenKind::RBrace) {
            self.ensure_open(open)?;
            let step = self.parse_ident()?;
            let count = if self.take(TokenKind::Star) {
                let count = self.consume(TokenKind::Number)?;
                extract::literal(count, self.src)
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n <= MAX_REPEAT_COUNT)
                    .ok_or_else(|| count.span().wrap(Error::InvalidRepeatCount))?
            } else {
                1
            };
            steps.extend(std::iter::repeat_n(step.name, count));
            self.take(TokenKind::Comma);
        }

        Ok(Movement { name, steps, scope })
    }

    fn parse_mart(&mut self) -> Result<Mart> {
        self.consume(TokenKind::Mart)?;
        let scope = self.parse_scope(Scope::Local)?;
        let name = self.parse_ident()?;
        let open = self.consume(TokenKind::LBrace)?;

        let mut items = Vec::new();
        while !self.take(TokenKind::RBrace) {
            self.ensure_open(open)?;
            items.push(self.parse_ident()?.name);
            self.take(TokenKind::Comma);
        }

        Ok(Mart { name, items, scope })
    }

    fn parse_mapscripts(&mut self) -> Result<MapScripts> {
        self.consume(TokenKind::MapScripts)?;
        let scope = self.parse_scope(Scope::Global)?;
        let name = self.parse_ident()?;
        let open = self.consume(TokenKind::LBrace)?;

        let mut entries = Vec::new();
        let mut tables = Vec::new();
        while !self.take(TokenKind::RBrace) {
            self.ensure_open(open)?;
            let trigger = self.parse_ident()?;
            if self.is(TokenKind::LBracket) {
                let entries = self.parse_mapscript_table()?;
                tables.push(MapScriptTable { trigger, entries });
            } else {
                let target = self.parse_mapscript_target()?;
                entries.push(MapScriptEntry { trigger, target });
            }
        }

        Ok(MapScripts {
            name,
            entries,
            tables,
            scope,
        })
    }

    fn parse_mapscript_table(&mut self) -> Result<Vec<TableEntry>> {
        let open = self.consume(TokenKind::LBracket)?;
        let mut entries = Vec::new();
        while !self.take(TokenKind::RBracket) {
            self.ensure_open(open)?;
            let row = self.peek();
            let condition = self.collect_tokens(|k| k == TokenKind::Comma, open)?;
            self.consume(TokenKind::Comma)?;
            let value = self.collect_tokens(
                |k| matches!(k, TokenKind::Colon | TokenKind::LBrace),
                open,
            )?;
            if condition.is_empty() || value.is_empty() {
                return Err(row.span().wrap(Error::MissingTableValue));
            }
            let target = self.parse_mapscript_target()?;
            entries.push(TableEntry {
                condition,
                value,
                target,
            });
        }
        Ok(entries)
    }

    fn parse_mapscript_target(&mut self) -> Result<MapScriptTarget> {
        let c = self.peek();
        match c.kind {
            TokenKind::Colon => {
                self.advance();
                self.parse_ident().map(MapScriptTarget::Symbol)
            }
            TokenKind::LBrace => self.parse_block().map(MapScriptTarget::Inline),
            _ => Err(self.unexpected_any(c, &[TokenKind::Colon, TokenKind::LBrace])),
        }
    }

    fn parse_scope(&mut self, default: Scope) -> Result<Scope> {
        if !self.take(TokenKind::LParen) {
            return Ok(default);
        }
        let ident = self.parse_ident()?;
        let scope = match &*ident.name {
            "global" => Scope::Global,
            "local" => Scope::Local,
            _ => return Err(ident.span.wrap(Error::InvalidScope(ident.name))),
        };
        self.consume(TokenKind::RParen)?;
        Ok(scope)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let open = self.consume(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.take(TokenKind::RBrace) {
            self.ensure_open(open)?;
            statements.push(self.parse_statement()?);
        }
        Ok(Block {
            statements,
            span: open.span(),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let c = self.peek();
        match c.kind {
            TokenKind::Identifier => self.parse_command().map(Statement::Command),
            TokenKind::If => self.parse_if().map(Statement::If),
            TokenKind::While => self.parse_while().map(Statement::While),
            TokenKind::Do => self.parse_do_while().map(Statement::DoWhile),
            TokenKind::Switch => self.parse_switch().map(Statement::Switch),
            TokenKind::Break => Ok(Statement::Break(self.parse_jump())),
            TokenKind::Continue => Ok(Statement::Continue(self.parse_jump())),
            TokenKind::LBrace => self.parse_block().map(Statement::Block),
            kind if kind.is_error() => Err(c.span().wrap(Error::Lexer(kind))),
            _ => Err(c.span().wrap(Error::InvalidStatement(self.literal(c).into()))),
        }
    }

    /// Parses a command and its arguments. String literals found among the
    /// arguments are moved into the implicit text pool and replaced by their
    /// generated label.
    fn parse_command(&mut self) -> Result<Command> {
        let name = self.parse_ident()?;
        let mut args = Vec::new();

        if self.take(TokenKind::LParen) {
            let mut parts: Vec<Box<str>> = Vec::new();
            let mut depth = 0_u32;
            let mut split = false;
            loop {
                let c = self.advance();
                match c.kind {
                    TokenKind::Eof => {
                        let error = Error::UnterminatedArgumentList(name.name.clone());
                        return Err(name.span.wrap(error));
                    }
                    TokenKind::RParen if depth == 0 => break,
                    TokenKind::Comma if depth == 0 => {
                        args.push(parts.join(" ").into_boxed_str());
                        parts.clear();
                        split = true;
                    }
                    TokenKind::LParen => {
                        depth += 1;
                        parts.push(self.literal(c).into());
                    }
                    TokenKind::RParen => {
                        depth -= 1;
                        parts.push(self.literal(c).into());
                    }
                    TokenKind::String => parts.push(self.implicit_text(c)),
                    kind if kind.is_error() => return Err(c.span().wrap(Error::Lexer(kind))),
                    _ => parts.push(self.literal(c).into()),
                }
            }
            // `f()` has no arguments, but every comma delimits one, even if empty.
            if split || !parts.is_empty() {
                args.push(parts.join(" ").into_boxed_str());
            }
        }
        self.take(TokenKind::Semicolon);

        Ok(Command { name, args })
    }

    fn implicit_text(&mut self, token: Token) -> Box<str> {
        let name = self.session.next_text_label();
        self.implicit_texts.push(Text {
            name: name.clone(),
            value: extract::string(token, self.src),
            kind: None,
            scope: Scope::Local,
            span: token.span(),
        });
        name
    }

    fn parse_jump(&mut self) -> Jump {
        let keyword = self.advance();
        self.take(TokenKind::Semicolon);
        Jump {
            target: None,
            span: keyword.span(),
        }
    }

    fn parse_if(&mut self) -> Result<If> {
        let keyword = self.consume(TokenKind::If)?;
        let consequence = self.parse_condition()?;

        let mut elifs = Vec::new();
        while self.take(TokenKind::Elif) {
            elifs.push(self.parse_condition()?);
        }

        let alternative = if self.take(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(If {
            consequence,
            elifs,
            alternative,
            span: keyword.span(),
        })
    }

    fn parse_while(&mut self) -> Result<Loop> {
        let keyword = self.consume(TokenKind::While)?;
        let id = self.session.next_construct();
        let condition = self.parse_condition()?;
        Ok(Loop {
            id,
            condition,
            span: keyword.span(),
        })
    }

    fn parse_do_while(&mut self) -> Result<Loop> {
        let keyword = self.consume(TokenKind::Do)?;
        let id = self.session.next_construct();
        let body = self.parse_block()?;
        self.consume(TokenKind::While)?;
        let expr = self.parse_paren_bool()?;
        self.take(TokenKind::Semicolon);
        Ok(Loop {
            id,
            condition: Condition { expr, body },
            span: keyword.span(),
        })
    }

    fn parse_switch(&mut self) -> Result<Switch> {
        let keyword = self.consume(TokenKind::Switch)?;
        let id = self.session.next_construct();

        let outer = self.consume(TokenKind::LParen)?;
        self.ensure_open(outer)?;
        let var = self.consume(TokenKind::Var)?;
        let paren = self.close(TokenKind::LParen, outer)?;
        let operand = self.collect_tokens(|_| false, paren)?;
        if operand.is_empty() {
            return Err(var.span().wrap(Error::MissingOperand(OperatorKind::Var)));
        }
        self.consume(TokenKind::RParen)?;
        self.close(TokenKind::RParen, outer)?;
        let open = self.consume(TokenKind::LBrace)?;

        let mut cases: Vec<Case> = Vec::new();
        let mut seen_values = HashSet::new();
        while !self.take(TokenKind::RBrace) {
            self.ensure_open(open)?;
            let c = self.peek();
            let label = match c.kind {
                TokenKind::Case => {
                    self.advance();
                    let value = self.collect_tokens(|k| k == TokenKind::Colon, open)?;
                    if value.is_empty() {
                        return Err(c.span().wrap(Error::MissingCaseValue));
                    }
                    if !seen_values.insert(value.clone()) {
                        return Err(c.span().wrap(Error::DuplicateCaseValue(value)));
                    }
                    CaseLabel::Value(value)
                }
                TokenKind::Default => {
                    self.advance();
                    if cases.iter().any(Case::is_default) {
                        return Err(c.span().wrap(Error::DuplicateDefaultCase));
                    }
                    CaseLabel::Default
                }
                _ => {
                    let expected = &[TokenKind::Case, TokenKind::Default, TokenKind::RBrace];
                    return Err(self.unexpected_any(c, expected));
                }
            };
            self.consume(TokenKind::Colon)?;

            let mut statements = Vec::new();
            while !matches!(
                self.peek().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                statements.push(self.parse_statement()?);
            }
            let body = Block {
                statements,
                span: c.span(),
            };
            cases.push(Case { label, body });
        }

        Ok(Switch {
            id,
            operand,
            cases,
            span: keyword.span(),
        })
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let expr = self.parse_paren_bool()?;
        let body = self.parse_block()?;
        Ok(Condition { expr, body })
    }

    fn parse_paren_bool(&mut self) -> Result<BoolExpr> {
        let open = self.consume(TokenKind::LParen)?;
        let expr = self.parse_bool(open)?;
        self.close(TokenKind::RParen, open)?;
        Ok(expr)
    }

    /// Parses operator expressions joined by `&&` and `||`. Both bind equally
    /// and associate to the left; parentheses nest explicitly.
    ///
    /// `open` is the enclosing `(`, which an early end of input is reported
    /// against.
    fn parse_bool(&mut self, open: Token) -> Result<BoolExpr> {
        let mut lhs = self.parse_bool_term(open)?;
        loop {
            let op = match self.peek().kind {
                TokenKind::And => LogicalOperator::And,
                TokenKind::Or => LogicalOperator::Or,
                _ => break Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_bool_term(open)?;
            lhs = BoolExpr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_bool_term(&mut self, open: Token) -> Result<BoolExpr> {
        self.ensure_open(open)?;
        let c = self.peek();
        match c.kind {
            TokenKind::LParen => self.parse_paren_bool(),
            TokenKind::Flag | TokenKind::Var => self.parse_operator(open).map(BoolExpr::Operator),
            kind if kind.is_error() => Err(c.span().wrap(Error::Lexer(kind))),
            _ => Err(c.span().wrap(Error::InvalidConditionTerm(self.literal(c).into()))),
        }
    }

    fn parse_operator(&mut self, outer: Token) -> Result<Operator> {
        let keyword = self.advance();
        let kind = match keyword.kind {
            TokenKind::Flag => OperatorKind::Flag,
            _ => OperatorKind::Var,
        };

        let open = self.close(TokenKind::LParen, outer)?;
        let operand = self.collect_tokens(|_| false, open)?;
        if operand.is_empty() {
            return Err(keyword.span().wrap(Error::MissingOperand(kind)));
        }
        self.consume(TokenKind::RParen)?;

        self.ensure_open(outer)?;
        let c = self.peek();
        let comparator = match (kind, c.kind) {
            (_, TokenKind::Eq) => Comparator::Eq,
            (OperatorKind::Var, TokenKind::NotEq) => Comparator::Ne,
            (OperatorKind::Var, TokenKind::Less) => Comparator::Lt,
            (OperatorKind::Var, TokenKind::LessEq) => Comparator::Le,
            (OperatorKind::Var, TokenKind::Greater) => Comparator::Gt,
            (OperatorKind::Var, TokenKind::GreaterEq) => Comparator::Ge,
            (_, kind) if kind.is_error() => return Err(c.span().wrap(Error::Lexer(kind))),
            _ => {
                let actual = self.literal(c).into();
                return Err(c.span().wrap(Error::InvalidConditionOperator { kind, actual }));
            }
        };
        self.advance();

        self.ensure_open(outer)?;
        let c = self.peek();
        let value: Box<str> = match kind {
            OperatorKind::Flag => {
                let value = match c.kind {
                    TokenKind::True => FLAG_TRUE,
                    TokenKind::False => FLAG_FALSE,
                    TokenKind::RParen | TokenKind::And | TokenKind::Or => {
                        return Err(c.span().wrap(Error::MissingComparisonValue(kind)));
                    }
                    _ => {
                        let actual = self.literal(c).into();
                        return Err(c.span().wrap(Error::InvalidFlagComparisonValue(actual)));
                    }
                };
                self.advance();
                value.into()
            }
            OperatorKind::Var => {
                let value =
                    self.collect_tokens(|k| matches!(k, TokenKind::And | TokenKind::Or), outer)?;
                if value.is_empty() {
                    return Err(c.span().wrap(Error::MissingComparisonValue(kind)));
                }
                value
            }
        };

        Ok(Operator {
            kind,
            operand,
            comparator,
            value,
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: extract::ident(token, self.src),
            span: token.span(),
        })
    }

    /// Collects the literals of the tokens up to (but not including) an
    /// unbalanced `)` or a token for which `stop` holds at nesting depth zero.
    /// The literals are joined by single spaces.
    ///
    /// Reaching the end of input is reported against `open`.
    fn collect_tokens(&mut self, stop: impl Fn(TokenKind) -> bool, open: Token) -> Result<Box<str>> {
        let src = self.src;
        let mut parts = Vec::new();
        let mut depth = 0_u32;
        loop {
            let c = self.peek();
            match c.kind {
                TokenKind::Eof => return Err(self.unterminated(open)),
                TokenKind::RParen if depth == 0 => break,
                kind if depth == 0 && stop(kind) => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                kind if kind.is_error() => return Err(c.span().wrap(Error::Lexer(kind))),
                _ => (),
            }
            parts.push(extract::literal(c, src));
            self.advance();
        }
        Ok(parts.join(" ").into_boxed_str())
    }
}

impl Parser<'_, '_, '_> {
    fn new<'src, 'tok, 'ses>(
        src: &'src str,
        tokens: &'tok [Token],
        session: &'ses mut Session,
    ) -> Parser<'src, 'tok, 'ses> {
        let mut p = Parser {
            src,
            tokens,
            session,
            cursor: 0,
            implicit_texts: Vec::new(),
        };
        p.setup();
        p
    }

    /// Setups the parser, skipping any trivia if necessary.
    fn setup(&mut self) {
        while self.peek().kind.is_trivia() {
            self.advance();
        }
    }

    fn literal(&self, token: Token) -> &str {
        extract::literal(token, self.src)
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.peek(); // Before any advancement
        while {
            self.cursor += 1;
            self.peek().kind.is_trivia()
        } {}
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not,
    /// returns an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if c.kind == expect {
            return Ok(self.advance());
        }
        let error = if c.kind.is_error() {
            Error::Lexer(c.kind)
        } else {
            Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }
        };
        Err(c.span().wrap(error))
    }

    /// Advances if the current token matches any of the provided tokens. If
    /// not, returns an error.
    fn consume_any(&mut self, expect: &'static [TokenKind]) -> Result<Token> {
        let c = self.peek();
        if expect.contains(&c.kind) {
            return Ok(self.advance());
        }
        Err(self.unexpected_any(c, expect))
    }

    /// Consumes the closing delimiter of the construct opened by `open`.
    fn close(&mut self, expect: TokenKind, open: Token) -> Result<Token> {
        self.ensure_open(open)?;
        self.consume(expect)
    }

    /// Fails if the input ended while the construct opened by `open` is still
    /// open. The error refers to the opening token's line.
    fn ensure_open(&self, open: Token) -> Result<()> {
        if self.is(TokenKind::Eof) {
            Err(self.unterminated(open))
        } else {
            Ok(())
        }
    }

    fn unterminated(&self, open: Token) -> Spanned<Error> {
        let error = match open.kind {
            TokenKind::LParen => Error::UnterminatedParen,
            TokenKind::LBracket => Error::UnterminatedTable,
            _ => Error::UnterminatedBlock,
        };
        open.span().wrap(error)
    }

    fn unexpected_any(&self, c: Token, expected: &[TokenKind]) -> Spanned<Error> {
        let error = if c.kind.is_error() {
            Error::Lexer(c.kind)
        } else {
            Error::UnexpectedAny {
                actual: c.kind,
                expected: Box::from(expected),
            }
        };
        c.span().wrap(error)
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&mut self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        for e in except {
            if c.kind == e {
                return false;
            }
        }
        c.kind != TokenKind::Eof
    }

    /// Skips tokens after a failed top-level statement, up to the start of the
    /// next one. At least one token is skipped if the failed statement didn't
    /// consume any.
    fn synchronize(&mut self, start: usize) {
        if self.cursor == start {
            self.advance();
        }
        loop {
            let c = self.peek().kind;
            if c == TokenKind::Eof || c.starts_top_level() {
                break;
            }
            self.advance();
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("could not parse top-level statement for '{0}'")]
    InvalidTopLevel(Box<str>),
    #[error("could not parse statement for '{0}'")]
    InvalidStatement(Box<str>),
    #[error("expected token {expected}, but got {actual}")]
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("expected one of {}, but got {actual}", one_of(.expected))]
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    #[error("invalid scope '{0}'. Only 'global' and 'local' are allowed")]
    InvalidScope(Box<str>),
    #[error("missing closing curly brace for block statement")]
    UnterminatedBlock,
    #[error("missing closing parenthesis")]
    UnterminatedParen,
    #[error("missing closing bracket for map script table")]
    UnterminatedTable,
    #[error("missing closing parenthesis for command '{0}'")]
    UnterminatedArgumentList(Box<str>),
    #[error("invalid condition '{0}', expected `flag(...)` or `var(...)`")]
    InvalidConditionTerm(Box<str>),
    #[error("missing value for {0} operator")]
    MissingOperand(OperatorKind),
    #[error("invalid condition operator '{actual}'. {}", allowed_operators(.kind))]
    InvalidConditionOperator { kind: OperatorKind, actual: Box<str> },
    #[error("missing comparison value for {0} operator")]
    MissingComparisonValue(OperatorKind),
    #[error("invalid flag comparison value '{0}'. Only 'TRUE' and 'FALSE' are allowed")]
    InvalidFlagComparisonValue(Box<str>),
    #[error("multiple `default` cases found in switch statement")]
    DuplicateDefaultCase,
    #[error("duplicate switch case '{0}'")]
    DuplicateCaseValue(Box<str>),
    #[error("missing value for switch case")]
    MissingCaseValue,
    #[error("map script table rows need a condition and a value")]
    MissingTableValue,
    #[error("invalid movement repeat count, expected a number up to 255")]
    InvalidRepeatCount,
    /// A token kind which holds the [`TokenKind::is_error`] property.
    #[error("{0}")]
    Lexer(TokenKind),
}

fn one_of(kinds: &[TokenKind]) -> String {
    let kinds: Vec<_> = kinds.iter().map(ToString::to_string).collect();
    kinds.join(", ")
}

fn allowed_operators(kind: &OperatorKind) -> &'static str {
    match kind {
        OperatorKind::Flag => "Only '==' is allowed.",
        OperatorKind::Var => "Only '==', '!=', '<', '<=', '>' and '>=' are allowed.",
    }
}

// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{path::PathBuf, rc::Rc};

use strum::AsRefStr;

use crate::{
    AssignExpression, AssignKind, BiExpression, BiOperator, ClassStatement, Comparison, ExceptHandler, Expression, FileLocation, FileRange, ForStatement, FunctionBody, FunctionCallExpression, FunctionStatement, IfStatement, ImportName, ImportStatement, InputStatement, Keyword, Lexer, LexerError, ListComprehension, LogicalOperator, MapEntry, MathOperator, Parameter, ParseTree, PostfixExpression, PostfixExpressionKind, PrimaryExpression, PrintStatement, Punctuator, QString, RaiseStatement, Ranged, ReturnStatement, SliceExpression, SourceCode, Statement, StatementKind, StaticField, TemplateStringExpressionPart, TemplateStringToken, TernaryExpression, Token, TokenKind, TryStatement, UnaryExpression, UnaryExpressionKind, UpdateExpression, VariableStatement, WhileStatement
};

pub type ParseResult<T> = Result<T, ParseError>;

type Snapshot = (usize, FileLocation, FileLocation);

const CLASS_MEMBER_MODIFIERS: &[&str] = &["public", "private", "protected", "static", "async", "override", "virtual", "readonly"];

/// Tokenizes and parses a whole source unit.
pub fn parse_source(source_code: &SourceCode) -> ParseResult<ParseTree> {
    let tokens = Lexer::new(source_code).tokenize()?;
    let mut parser = Parser::new(source_code.path().to_path_buf(), &tokens);
    parser.parse_tree()
}

#[derive(Clone)]
pub struct Parser<'tokens> {
    pub path: PathBuf,
    tokens: &'tokens [Token],
    pub cursor: usize,
    pub token_begin: FileLocation,
    pub token_end: FileLocation,

    /// Number of open brackets; newlines are insignificant while non-zero.
    nesting: usize,
    end_of_file_token: Token,
}

impl<'tokens> Parser<'tokens> {
    pub fn new(path: PathBuf, tokens: &'tokens [Token]) -> Self {
        let end = tokens.last().map(|x| x.end).unwrap_or_default();

        Self {
            path,
            tokens,
            cursor: 0,
            token_begin: Default::default(),
            token_end: Default::default(),
            nesting: 0,
            end_of_file_token: Token {
                kind: TokenKind::EndOfFile,
                text: QString::empty(),
                begin: end,
                end,
            },
        }
    }

    pub fn parse_tree(&mut self) -> ParseResult<ParseTree> {
        let mut tree = ParseTree::new(self.path.clone());

        loop {
            self.skip_separators();

            if self.is_at_end() {
                break;
            }

            if self.token_at(self.cursor).kind == TokenKind::Dedent {
                self.cursor += 1;
                continue;
            }

            tree.push(self.parse_statement()?);
        }

        Ok(tree)
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.peek_token().kind == TokenKind::EndOfFile
    }

    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.parse_decorators()?;

        let token = self.peek_token().clone();
        let start = token.begin;

        let kind = match &token.kind {
            TokenKind::Keyword(Keyword::Let) => {
                self.consume_token();
                StatementKind::Variable(self.parse_variable_statement(false)?)
            }

            TokenKind::Keyword(Keyword::Const) => {
                self.consume_token();
                StatementKind::Variable(self.parse_variable_statement(true)?)
            }

            TokenKind::Keyword(Keyword::Fn) if self.peek_nth_token(1).as_identifier().is_some() => {
                self.consume_token();
                let name = self.expect_identifier("function name")?;
                StatementKind::Function(Rc::new(self.parse_function(start, name, None)?))
            }

            TokenKind::Keyword(Keyword::Class) => {
                self.consume_token();
                StatementKind::Class(self.parse_class_statement()?)
            }

            TokenKind::Keyword(Keyword::If) => {
                self.consume_token();
                StatementKind::If(self.parse_if_statement()?)
            }

            TokenKind::Keyword(Keyword::While) => {
                self.consume_token();
                let condition = self.parse_expression()?;
                let body = self.parse_body("while condition")?;
                StatementKind::While(WhileStatement {
                    condition,
                    body,
                    update: None,
                })
            }

            TokenKind::Keyword(Keyword::For) => {
                self.consume_token();
                self.parse_for_statement(start)?
            }

            TokenKind::Keyword(Keyword::Break) => {
                self.consume_token();
                self.expect_statement_end("`break`")?;
                StatementKind::Break
            }

            TokenKind::Keyword(Keyword::Continue) => {
                self.consume_token();
                self.expect_statement_end("`continue`")?;
                StatementKind::Continue
            }

            TokenKind::Keyword(Keyword::Return) => {
                self.consume_token();
                let expression = self.parse_optional_tuple("`return`")?;
                StatementKind::Return(ReturnStatement { expression })
            }

            TokenKind::Keyword(Keyword::Raise) => {
                self.consume_token();
                let expression = self.parse_optional_tuple("`raise`")?;
                StatementKind::Raise(RaiseStatement { expression })
            }

            TokenKind::Keyword(Keyword::Try) => {
                self.consume_token();
                StatementKind::Try(self.parse_try_statement()?)
            }

            TokenKind::Keyword(keyword @ (Keyword::Print | Keyword::Printf)) => {
                self.consume_token();
                StatementKind::Print(self.parse_print_statement(*keyword)?)
            }

            TokenKind::Keyword(Keyword::Cout) => {
                self.consume_token();
                StatementKind::Print(self.parse_cout_statement(&token)?)
            }

            TokenKind::Keyword(Keyword::Cin) => {
                self.consume_token();
                StatementKind::Input(self.parse_cin_statement()?)
            }

            TokenKind::Keyword(Keyword::Input | Keyword::Scanf) => {
                self.parse_input_statement()?
            }

            TokenKind::Keyword(Keyword::Import) => {
                self.consume_token();
                StatementKind::Import(self.parse_import_statement()?)
            }

            TokenKind::Keyword(Keyword::From) => {
                self.consume_token();
                StatementKind::Import(self.parse_from_import_statement()?)
            }

            TokenKind::Keyword(Keyword::Pass) => {
                self.consume_token();
                self.expect_statement_end("`pass`")?;
                StatementKind::Block(Vec::new())
            }

            TokenKind::Keyword(keyword) if keyword.is_type() => {
                self.parse_typed_declaration(start)?
            }

            TokenKind::Keyword(keyword) if keyword.is_reserved() => {
                return Err(ParseError::ReservedKeyword { token });
            }

            TokenKind::Punctuator(Punctuator::LeftCurlyBracket) => {
                self.consume_token();
                StatementKind::Block(self.parse_braced_statements()?)
            }

            TokenKind::Indent => {
                self.consume_token();
                StatementKind::Block(self.parse_indented_statements()?)
            }

            TokenKind::Identifier(name) if name != "lambda" && self.peek_nth_token(1).as_identifier().is_some() => {
                self.parse_typed_declaration(start)?
            }

            TokenKind::Identifier(..) if self.peek_nth_token(1).kind == TokenKind::Punctuator(Punctuator::Colon) => {
                StatementKind::Variable(self.parse_variable_statement(false)?)
            }

            _ => self.parse_expression_statement()?,
        };

        Ok(Statement {
            range: FileRange::new(start, self.token_end),
            kind,
        })
    }

    fn parse_decorators(&mut self) -> ParseResult<Vec<QString>> {
        let mut decorators = Vec::new();

        while self.peek_punctuator() == Some(Punctuator::AtSign) {
            self.consume_token();
            let name = self.expect_identifier("decorator name")?;

            while self.peek_punctuator() == Some(Punctuator::Period) {
                self.consume_token();
                self.expect_identifier("decorator name")?;
            }

            if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
                self.skip_bracketed("decorator arguments")?;
            }

            decorators.push(name.into_value());
            self.skip_separators();
        }

        Ok(decorators)
    }

    fn parse_variable_statement(&mut self, is_const: bool) -> ParseResult<VariableStatement> {
        let mut type_annotation = self.parse_type_prefix();
        let name = self.expect_identifier("variable name")?;

        if self.peek_punctuator() == Some(Punctuator::Colon) {
            self.consume_token();
            type_annotation = Some(self.parse_type_annotation()?);
        }

        let expression = if self.peek_punctuator() == Some(Punctuator::Assignment) {
            self.consume_token();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_statement_end("variable declaration")?;

        Ok(VariableStatement {
            name,
            is_const,
            type_annotation,
            expression,
        })
    }

    /// `int x = 1`, `char name[20]`, `String s` or `int add(int a, int b) { ... }`.
    fn parse_typed_declaration(&mut self, start: FileLocation) -> ParseResult<StatementKind> {
        let reset = self.snapshot();
        let type_annotation = self.parse_type_prefix();

        let Some(name) = self.peek_token().as_identifier() else {
            self.restore(reset);
            return self.parse_expression_statement();
        };
        self.consume_token();

        if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            let function = self.parse_function(start, name, type_annotation)?;
            return Ok(StatementKind::Function(Rc::new(function)));
        }

        while self.peek_punctuator() == Some(Punctuator::LeftSquareBracket) {
            self.skip_bracketed("array declarator")?;
        }

        let expression = if self.peek_punctuator() == Some(Punctuator::Assignment) {
            self.consume_token();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_statement_end("variable declaration")?;

        Ok(StatementKind::Variable(VariableStatement {
            name,
            is_const: false,
            type_annotation,
            expression,
        }))
    }

    /// Skips C-style type words (`unsigned int`, `const char*`, `Foo`) in
    /// front of a name, returning the last one.
    fn parse_type_prefix(&mut self) -> Option<Ranged<QString>> {
        let mut type_name = None;

        loop {
            let token = self.peek_token();
            let is_type = match &token.kind {
                TokenKind::Keyword(Keyword::Const) => true,
                TokenKind::Keyword(keyword) => keyword.is_type(),
                TokenKind::Identifier(..) => type_name.is_none() && self.peek_nth_token(1).as_identifier().is_some(),
                TokenKind::Punctuator(Punctuator::Asterisk | Punctuator::BitwiseAnd) => type_name.is_some(),
                _ => false,
            };

            if !is_type {
                break;
            }

            let token = self.consume_token();
            if matches!(token.kind, TokenKind::Keyword(..) | TokenKind::Identifier(..)) && token.kind != TokenKind::Keyword(Keyword::Const) {
                type_name = Some(Ranged::new(token.range(), token.text.clone()));
            }
        }

        type_name
    }

    fn parse_type_annotation(&mut self) -> ParseResult<Ranged<QString>> {
        let previous = self.previous_text();
        let token = self.peek_token().clone();

        let is_type = match &token.kind {
            TokenKind::Identifier(..) => true,
            TokenKind::Keyword(keyword) => keyword.is_type() || *keyword == Keyword::Nil,
            _ => false,
        };

        if !is_type {
            return Err(ParseError::ExpectedIdentifier { token, purpose: "type name", previous });
        }

        self.consume_token();

        loop {
            match self.peek_punctuator() {
                Some(Punctuator::LeftSquareBracket) => self.skip_bracketed("type arguments")?,
                Some(Punctuator::Period | Punctuator::BitwiseOr) => {
                    self.consume_token();
                    self.parse_type_annotation()?;
                }
                _ => break,
            }
        }

        Ok(Ranged::new(token.range(), token.text.clone()))
    }

    fn parse_function(&mut self, start: FileLocation, name: Ranged<QString>, return_type: Option<Ranged<QString>>) -> ParseResult<FunctionStatement> {
        self.expect_punctuator(Punctuator::LeftParenthesis, "function name")?;
        let parameters = self.nested(Self::parse_parameter_list)?;

        let mut return_type = return_type;
        if self.peek_punctuator() == Some(Punctuator::Arrow) {
            self.consume_token();
            return_type = Some(self.parse_type_annotation()?);
        } else if self.is_return_type_annotation() {
            self.consume_token();
            return_type = Some(self.parse_type_annotation()?);
        }

        if self.peek_keyword() == Some(Keyword::Const) {
            self.consume_token();
        }

        // A prototype such as `int add(int a, int b);` declares nothing yet.
        let body = if self.peek_punctuator() == Some(Punctuator::Semicolon) {
            self.consume_token();
            Vec::new()
        } else {
            self.parse_body("function signature")?
        };

        Ok(FunctionStatement {
            range: FileRange::new(start, self.token_end),
            name,
            parameters,
            body: FunctionBody::Block(body),
            return_type,
        })
    }

    /// `fn add(a, b): number { ... }`
    fn is_return_type_annotation(&self) -> bool {
        if self.peek_punctuator() != Some(Punctuator::Colon) {
            return false;
        }

        let is_type = match &self.peek_nth_token(1).kind {
            TokenKind::Identifier(..) => true,
            TokenKind::Keyword(keyword) => keyword.is_type(),
            _ => false,
        };

        is_type && self.peek_nth_token(2).kind == TokenKind::Punctuator(Punctuator::LeftCurlyBracket)
    }

    /// Parses parameters after the opening parenthesis, up to and including
    /// the closing one.
    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut parameters = Vec::new();

        loop {
            if self.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                self.consume_token();
                break;
            }

            parameters.push(self.parse_parameter()?);

            match self.peek_punctuator() {
                Some(Punctuator::Comma) => {
                    self.consume_token();
                }

                Some(Punctuator::RightParenthesis) => (),

                _ => return Err(self.expected("`,` or `)`", "parameter")),
            }
        }

        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        while matches!(self.peek_punctuator(), Some(Punctuator::Asterisk | Punctuator::Power)) {
            self.consume_token();
        }

        let mut type_annotation = self.parse_type_prefix();

        let previous = self.previous_text();
        let token = self.peek_token().clone();
        let name = match &token.kind {
            TokenKind::Identifier(name) => Ranged::new(token.range(), name.clone()),
            TokenKind::Keyword(Keyword::This) => Ranged::new(token.range(), token.text.clone()),
            TokenKind::EndOfFile => return Err(ParseError::UnexpectedEndOfFile { token, context: "parameter list" }),
            _ => return Err(ParseError::ExpectedIdentifier { token, purpose: "parameter name", previous }),
        };
        self.consume_token();

        while self.peek_punctuator() == Some(Punctuator::LeftSquareBracket) {
            self.skip_bracketed("array parameter")?;
        }

        if self.peek_punctuator() == Some(Punctuator::Colon) {
            self.consume_token();
            type_annotation = Some(self.parse_type_annotation()?);
        }

        let default = if self.peek_punctuator() == Some(Punctuator::Assignment) {
            self.consume_token();
            Some(self.parse_ternary_expression()?)
        } else {
            None
        };

        Ok(Parameter {
            name,
            type_annotation,
            default,
        })
    }

    /// Accepts `{ ... }`, `:` followed by an indented block, `:` followed by
    /// a statement on the same line, or a single bare statement.
    fn parse_body(&mut self, context: &'static str) -> ParseResult<Vec<Statement>> {
        let nesting = std::mem::replace(&mut self.nesting, 0);
        let result = self.parse_body_inner(context);
        self.nesting = nesting;
        result
    }

    fn parse_body_inner(&mut self, context: &'static str) -> ParseResult<Vec<Statement>> {
        if self.peek_past_newlines().kind == TokenKind::Punctuator(Punctuator::LeftCurlyBracket) {
            self.skip_newlines();
            self.consume_token();
            return self.parse_braced_statements();
        }

        if self.peek_punctuator() == Some(Punctuator::Colon) {
            self.consume_token();

            match self.peek_past_newlines().kind {
                TokenKind::Indent => {
                    self.skip_newlines();
                    self.consume_token();
                    return self.parse_indented_statements();
                }

                TokenKind::EndOfFile | TokenKind::Dedent => {
                    return Err(self.expected("an indented block", context));
                }

                _ if self.peek_token().kind == TokenKind::Newline => {
                    return Err(self.expected("an indented block", context));
                }

                _ => return Ok(vec![self.parse_statement()?]),
            }
        }

        self.skip_newlines();
        if self.is_at_end() {
            return Err(ParseError::UnexpectedEndOfFile {
                token: self.peek_token().clone(),
                context,
            });
        }

        Ok(vec![self.parse_statement()?])
    }

    /// Statements up to and including the closing `}`.
    fn parse_braced_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();

            let token = self.peek_token();
            match token.kind {
                TokenKind::Punctuator(Punctuator::RightCurlyBracket) => {
                    self.consume_token();
                    break;
                }

                TokenKind::EndOfFile => {
                    return Err(ParseError::UnexpectedEndOfFile { token: token.clone(), context: "block" });
                }

                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(statements)
    }

    /// Statements up to and including the closing [`TokenKind::Dedent`].
    fn parse_indented_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();

            match self.peek_token().kind {
                TokenKind::Dedent => {
                    self.consume_token();
                    break;
                }

                TokenKind::EndOfFile => break,

                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(statements)
    }

    fn parse_if_statement(&mut self) -> ParseResult<IfStatement> {
        let condition = self.parse_expression()?;
        let body = self.parse_body("if condition")?;

        let else_body = match self.peek_past_newlines().kind {
            TokenKind::Keyword(Keyword::Elif) => {
                self.skip_newlines();
                Some(vec![self.parse_else_if()?])
            }

            TokenKind::Keyword(Keyword::Else) => {
                self.skip_newlines();
                if self.peek_nth_token(1).kind == TokenKind::Keyword(Keyword::If) {
                    self.consume_token();
                    Some(vec![self.parse_else_if()?])
                } else {
                    self.consume_token();
                    Some(self.parse_body("`else`")?)
                }
            }

            _ => None,
        };

        Ok(IfStatement {
            condition,
            body,
            else_body,
        })
    }

    /// `elif` and `else if` become a nested if statement.
    fn parse_else_if(&mut self) -> ParseResult<Statement> {
        let start = self.consume_token().begin;
        let statement = self.parse_if_statement()?;

        Ok(Statement {
            range: FileRange::new(start, self.token_end),
            kind: StatementKind::If(statement),
        })
    }

    fn parse_for_statement(&mut self, start: FileLocation) -> ParseResult<StatementKind> {
        if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) && self.is_c_style_for_header() {
            return self.parse_c_style_for_statement(start);
        }

        let (iterators, iterable) = if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            self.consume_token();

            let (iterators, iterable) = self.nested(|parser| {
                let iterators = parser.parse_for_iterators()?;

                // `for (key, value) in map`
                if parser.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                    parser.consume_token();
                    return Ok((iterators, None));
                }

                let iterable = parser.parse_for_iterable()?;
                parser.expect_punctuator(Punctuator::RightParenthesis, "for header")?;
                Ok((iterators, Some(iterable)))
            })?;

            match iterable {
                Some(iterable) => (iterators, iterable),
                None => (iterators, self.parse_for_iterable()?),
            }
        } else {
            let iterators = self.parse_for_iterators()?;
            (iterators, self.parse_for_iterable()?)
        };

        let body = self.parse_body("for header")?;

        Ok(StatementKind::For(ForStatement {
            iterators,
            iterable,
            body,
        }))
    }

    fn parse_for_iterators(&mut self) -> ParseResult<Vec<Ranged<QString>>> {
        if self.peek_keyword() == Some(Keyword::Let) || self.peek_keyword() == Some(Keyword::Const) {
            self.consume_token();
        }
        self.parse_type_prefix();

        let mut iterators = vec![self.expect_identifier("loop variable")?];
        while self.peek_punctuator() == Some(Punctuator::Comma) {
            self.consume_token();
            iterators.push(self.expect_identifier("loop variable")?);
        }

        Ok(iterators)
    }

    fn parse_for_iterable(&mut self) -> ParseResult<Ranged<Expression>> {
        match self.peek_keyword() {
            Some(Keyword::In | Keyword::Of) => {
                self.consume_token();
                self.parse_expression()
            }

            _ => Err(self.expected("`in` or `of`", "loop variable")),
        }
    }

    fn is_c_style_for_header(&self) -> bool {
        let open = self.next_index();
        let Some(close) = self.find_closing_bracket(open) else {
            return false;
        };

        let mut depth = 0usize;
        for token in &self.tokens[open..close] {
            match &token.kind {
                TokenKind::Punctuator(punctuator) if punctuator.is_opening_bracket() => depth += 1,
                TokenKind::Punctuator(punctuator) if punctuator.is_closing_bracket() => depth = depth.saturating_sub(1),
                TokenKind::Punctuator(Punctuator::Semicolon) if depth == 1 => return true,
                _ => (),
            }
        }

        false
    }

    /// `for (init; condition; update) body` becomes a block holding the
    /// initializer and a while loop carrying the update.
    fn parse_c_style_for_statement(&mut self, start: FileLocation) -> ParseResult<StatementKind> {
        self.consume_token();

        let (initializer, condition, update) = self.nested(|parser| {
            let initializer = if parser.peek_punctuator() == Some(Punctuator::Semicolon) {
                parser.consume_token();
                None
            } else {
                Some(parser.parse_statement()?)
            };

            let condition = if parser.peek_punctuator() == Some(Punctuator::Semicolon) {
                None
            } else {
                Some(parser.parse_expression()?)
            };
            parser.expect_punctuator(Punctuator::Semicolon, "loop condition")?;

            let update = if parser.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                None
            } else {
                let update = parser.parse_expression()?;
                Some(if parser.peek_punctuator() == Some(Punctuator::Comma) {
                    parser.parse_tuple_tail(update)?
                } else {
                    update
                })
            };
            parser.expect_punctuator(Punctuator::RightParenthesis, "loop update")?;

            Ok((initializer, condition, update))
        })?;

        let body = self.parse_body("for header")?;

        let condition = condition.unwrap_or_else(|| {
            Ranged::at(start, Expression::Primary(PrimaryExpression::Boolean(true)))
        });

        let while_statement = StatementKind::While(WhileStatement {
            condition,
            body,
            update,
        });

        Ok(match initializer {
            Some(initializer) => StatementKind::Block(vec![
                initializer,
                Statement {
                    range: FileRange::new(start, self.token_end),
                    kind: while_statement,
                },
            ]),
            None => while_statement,
        })
    }

    /// An optional expression until the end of the statement, where `a, b`
    /// becomes a tuple.
    fn parse_optional_tuple(&mut self, context: &'static str) -> ParseResult<Option<Ranged<Expression>>> {
        if self.at_statement_end() {
            self.expect_statement_end(context)?;
            return Ok(None);
        }

        let expression = self.parse_expression()?;
        let expression = if self.peek_punctuator() == Some(Punctuator::Comma) {
            self.parse_tuple_tail(expression)?
        } else {
            expression
        };

        self.expect_statement_end(context)?;
        Ok(Some(expression))
    }

    fn parse_try_statement(&mut self) -> ParseResult<TryStatement> {
        let body = self.parse_body("`try`")?;

        let mut handlers = Vec::new();
        while self.peek_past_newlines().kind == TokenKind::Keyword(Keyword::Except) {
            self.skip_newlines();
            self.consume_token();
            handlers.push(self.parse_except_handler()?);
        }

        let finally = if self.peek_past_newlines().kind == TokenKind::Keyword(Keyword::Finally) {
            self.skip_newlines();
            self.consume_token();
            Some(self.parse_body("`finally`")?)
        } else {
            None
        };

        if handlers.is_empty() && finally.is_none() {
            return Err(self.expected("`except`, `catch` or `finally`", "try block"));
        }

        Ok(TryStatement {
            body,
            handlers,
            finally,
        })
    }

    fn parse_except_handler(&mut self) -> ParseResult<ExceptHandler> {
        let (error_type, binding) = match self.peek_token().kind {
            TokenKind::Punctuator(Punctuator::LeftParenthesis) => {
                self.consume_token();
                let mut names = self.nested(Self::parse_parenthesized_catch_names)?;

                if self.peek_keyword() == Some(Keyword::As) {
                    self.consume_token();
                    let binding = self.expect_identifier("exception name")?;
                    (names.into_iter().next(), Some(binding))
                } else if names.len() == 1 && self.peek_punctuator() == Some(Punctuator::Colon) {
                    // `except (ValueError):`
                    (names.pop(), None)
                } else {
                    let binding = names.pop();
                    (names.into_iter().next(), binding)
                }
            }

            TokenKind::Identifier(..) => {
                let error_type = self.expect_identifier("exception type")?;
                let binding = if self.peek_keyword() == Some(Keyword::As) {
                    self.consume_token();
                    Some(self.expect_identifier("exception name")?)
                } else {
                    None
                };
                (Some(error_type), binding)
            }

            _ => (None, None),
        };

        let body = self.parse_body("`except`")?;

        Ok(ExceptHandler {
            error_type,
            binding,
            body,
        })
    }

    fn parse_parenthesized_catch_names(&mut self) -> ParseResult<Vec<Ranged<QString>>> {
        let mut names = Vec::new();

        loop {
            let token = self.consume_token();
            match &token.kind {
                TokenKind::Punctuator(Punctuator::RightParenthesis) => break,
                TokenKind::EndOfFile => return Err(ParseError::UnexpectedEndOfFile { token, context: "catch clause" }),
                TokenKind::Identifier(name) => names.push(Ranged::new(token.range(), name.clone())),
                _ => (),
            }
        }

        Ok(names)
    }

    fn parse_print_statement(&mut self, keyword: Keyword) -> ParseResult<PrintStatement> {
        let mut statement = PrintStatement {
            arguments: Vec::new(),
            separator: None,
            end: None,
            newline: keyword == Keyword::Print,
        };

        if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            self.consume_token();
            self.nested(|parser| parser.parse_print_arguments(&mut statement))?;
        } else if !self.at_statement_end() {
            loop {
                statement.arguments.push(self.parse_ternary_expression()?);

                if self.peek_punctuator() != Some(Punctuator::Comma) {
                    break;
                }
                self.consume_token();
            }
        }

        self.expect_statement_end("print statement")?;
        Ok(statement)
    }

    /// `sep=` and `end=` are honoured; other keyword arguments are ignored.
    fn parse_print_arguments(&mut self, statement: &mut PrintStatement) -> ParseResult<()> {
        loop {
            if self.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                self.consume_token();
                return Ok(());
            }

            let keyword_argument = match (&self.peek_token().kind, &self.peek_nth_token(1).kind) {
                (TokenKind::Identifier(name), TokenKind::Punctuator(Punctuator::Assignment)) => Some(name.clone()),
                _ => None,
            };

            if let Some(name) = keyword_argument {
                self.consume_token();
                self.consume_token();

                let value = self.parse_ternary_expression()?;
                match name.as_str() {
                    "sep" => statement.separator = Some(value),
                    "end" => statement.end = Some(value),
                    _ => (),
                }
            } else {
                statement.arguments.push(self.parse_ternary_expression()?);
            }

            match self.peek_punctuator() {
                Some(Punctuator::Comma) => {
                    self.consume_token();
                }
                Some(Punctuator::RightParenthesis) => (),
                _ => return Err(self.expected("`,` or `)`", "print argument")),
            }
        }
    }

    /// `cout << a << endl;`
    fn parse_cout_statement(&mut self, cout: &Token) -> ParseResult<PrintStatement> {
        let mut arguments = Vec::new();

        while self.peek_punctuator() == Some(Punctuator::LeftShift) {
            self.consume_token();

            if self.peek_keyword() == Some(Keyword::Endl) {
                let endl = self.consume_token();
                arguments.push(string_literal(endl.range(), QString::new_static("\n")));
            } else {
                arguments.push(self.parse_additive_expression()?);
            }
        }

        self.expect_statement_end("`cout`")?;

        Ok(PrintStatement {
            arguments,
            separator: Some(string_literal(cout.range(), QString::empty())),
            end: None,
            newline: false,
        })
    }

    /// `cin >> a >> b;`
    fn parse_cin_statement(&mut self) -> ParseResult<InputStatement> {
        let mut targets = Vec::new();

        while self.peek_punctuator() == Some(Punctuator::RightShift) {
            self.consume_token();
            targets.push(self.expect_identifier("input target")?);
        }

        if targets.is_empty() {
            return Err(self.expected("`>>`", "`cin`"));
        }

        self.expect_statement_end("`cin`")?;

        Ok(InputStatement {
            prompt: None,
            targets,
        })
    }

    /// `input(name)`, `input("Name: ", name)` and `scanf("%d", &n)` read into
    /// a variable. Anything else is an ordinary expression statement.
    fn parse_input_statement(&mut self) -> ParseResult<StatementKind> {
        let reset = self.snapshot();
        self.consume_token();

        if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            self.consume_token();
            let arguments = self.nested(Self::parse_call_arguments)?;

            if self.at_statement_end() {
                if let Some(statement) = input_statement_from_arguments(arguments) {
                    self.expect_statement_end("input statement")?;
                    return Ok(StatementKind::Input(statement));
                }
            }
        }

        self.restore(reset);
        self.parse_expression_statement()
    }

    fn parse_import_statement(&mut self) -> ParseResult<ImportStatement> {
        let module = self.parse_module_path()?;

        let alias = if self.peek_keyword() == Some(Keyword::As) {
            self.consume_token();
            Some(self.expect_identifier("module alias")?)
        } else {
            None
        };

        self.expect_statement_end("import")?;

        Ok(ImportStatement {
            module,
            alias,
            names: Vec::new(),
            star: false,
        })
    }

    fn parse_from_import_statement(&mut self) -> ParseResult<ImportStatement> {
        let module = self.parse_module_path()?;
        self.expect_keyword(Keyword::Import, "module path")?;

        let mut statement = ImportStatement {
            module,
            alias: None,
            names: Vec::new(),
            star: false,
        };

        if self.peek_punctuator() == Some(Punctuator::Asterisk) {
            self.consume_token();
            statement.star = true;
        } else if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            self.consume_token();
            statement.names = self.nested(|parser| {
                let names = parser.parse_import_names()?;
                parser.expect_punctuator(Punctuator::RightParenthesis, "imported names")?;
                Ok(names)
            })?;
        } else {
            statement.names = self.parse_import_names()?;
        }

        self.expect_statement_end("import")?;
        Ok(statement)
    }

    fn parse_import_names(&mut self) -> ParseResult<Vec<ImportName>> {
        let mut names = Vec::new();

        loop {
            let name = self.expect_identifier("imported name")?;
            let alias = if self.peek_keyword() == Some(Keyword::As) {
                self.consume_token();
                Some(self.expect_identifier("import alias")?)
            } else {
                None
            };

            names.push(ImportName { name, alias });

            if self.peek_punctuator() != Some(Punctuator::Comma) {
                break;
            }
            self.consume_token();

            if self.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                break;
            }
        }

        Ok(names)
    }

    /// A dotted module path such as `a.b.c`.
    fn parse_module_path(&mut self) -> ParseResult<Ranged<QString>> {
        let first = self.expect_identifier("module name")?;
        if self.peek_punctuator() != Some(Punctuator::Period) {
            return Ok(first);
        }

        let start = first.range().start();
        let mut path = first.value().to_string();

        while self.peek_punctuator() == Some(Punctuator::Period) {
            self.consume_token();
            let part = self.expect_identifier("module name")?;
            path.push('.');
            path.push_str(part.value());
        }

        Ok(Ranged::between(start, self.token_end, QString::from(path)))
    }

    fn parse_class_statement(&mut self) -> ParseResult<ClassStatement> {
        let name = self.expect_identifier("class name")?;
        let base = self.parse_class_base()?;

        let mut class = ClassStatement {
            name,
            base,
            methods: Vec::new(),
            static_methods: Vec::new(),
            static_fields: Vec::new(),
        };

        match self.peek_past_newlines().kind {
            TokenKind::Punctuator(Punctuator::LeftCurlyBracket) => {
                self.skip_newlines();
                self.consume_token();
                self.parse_class_members(&mut class, TokenKind::Punctuator(Punctuator::RightCurlyBracket))?;

                if self.peek_punctuator() == Some(Punctuator::Semicolon) {
                    self.consume_token();
                }
            }

            TokenKind::Punctuator(Punctuator::Colon) => {
                self.consume_token();

                if self.peek_past_newlines().kind == TokenKind::Indent {
                    self.skip_newlines();
                    self.consume_token();
                    self.parse_class_members(&mut class, TokenKind::Dedent)?;
                } else if self.peek_keyword() == Some(Keyword::Pass) {
                    self.consume_token();
                    self.expect_statement_end("`pass`")?;
                } else {
                    return Err(self.expected("an indented class body", "class declaration"));
                }
            }

            _ => return Err(self.expected("`{` or `:`", "class declaration")),
        }

        Ok(class)
    }

    /// `(Base)`, `extends Base` or `: public Base`.
    fn parse_class_base(&mut self) -> ParseResult<Option<Ranged<QString>>> {
        match self.peek_token().kind {
            TokenKind::Punctuator(Punctuator::LeftParenthesis) => {
                self.consume_token();
                self.nested(|parser| {
                    let mut bases = Vec::new();

                    loop {
                        let token = parser.consume_token();
                        match &token.kind {
                            TokenKind::Punctuator(Punctuator::RightParenthesis) => break,
                            TokenKind::EndOfFile => return Err(ParseError::UnexpectedEndOfFile { token, context: "base class list" }),
                            TokenKind::Identifier(name) => bases.push(Ranged::new(token.range(), name.clone())),
                            _ => (),
                        }
                    }

                    Ok(bases.into_iter().find(|base| base.value() != "object"))
                })
            }

            TokenKind::Keyword(Keyword::Extends) => {
                self.consume_token();
                Ok(Some(self.expect_identifier("base class name")?))
            }

            TokenKind::Punctuator(Punctuator::Colon) => {
                let is_access_specifier = match &self.peek_nth_token(1).kind {
                    TokenKind::Identifier(specifier) => matches!(specifier.as_str(), "public" | "private" | "protected"),
                    _ => false,
                };

                if !is_access_specifier {
                    return Ok(None);
                }

                self.consume_token();
                self.consume_token();
                Ok(Some(self.expect_identifier("base class name")?))
            }

            _ => Ok(None),
        }
    }

    fn parse_class_members(&mut self, class: &mut ClassStatement, end: TokenKind) -> ParseResult<()> {
        loop {
            self.skip_separators();

            let token = self.peek_token();
            if token.kind == end {
                self.consume_token();
                return Ok(());
            }

            if token.kind == TokenKind::EndOfFile {
                if end == TokenKind::Dedent {
                    return Ok(());
                }

                return Err(ParseError::UnexpectedEndOfFile { token: token.clone(), context: "class body" });
            }

            self.parse_class_member(class)?;
        }
    }

    fn parse_class_member(&mut self, class: &mut ClassStatement) -> ParseResult<()> {
        let mut is_static = self.parse_decorators()?
            .iter()
            .any(|decorator| decorator == "staticmethod" || decorator == "classmethod");

        let start = self.peek_token().begin;

        loop {
            let token = self.peek_token();
            match &token.kind {
                TokenKind::Identifier(modifier) if CLASS_MEMBER_MODIFIERS.contains(&modifier.as_str()) => {
                    let next = self.peek_nth_token(1);
                    if matches!(next.kind, TokenKind::Punctuator(Punctuator::LeftParenthesis | Punctuator::Assignment)) {
                        break;
                    }

                    is_static |= modifier == "static";
                    self.consume_token();

                    // `public:` labels a section instead of a single member.
                    if self.peek_punctuator() == Some(Punctuator::Colon) {
                        self.consume_token();
                        return Ok(());
                    }
                }

                TokenKind::Keyword(Keyword::Const) => {
                    self.consume_token();
                }

                _ => break,
            }
        }

        let token = self.peek_token().clone();
        match &token.kind {
            TokenKind::StringLiteral(..) | TokenKind::TemplateString(..) | TokenKind::Keyword(Keyword::Pass) => {
                self.consume_token();
                self.expect_statement_end("class member")?;
            }

            TokenKind::Keyword(Keyword::Fn) => {
                self.consume_token();
                let name = self.expect_member_name("method name")?;
                self.parse_method(class, start, name, None, is_static)?;
            }

            TokenKind::Punctuator(Punctuator::BitwiseNot) => {
                self.consume_token();
                let name = self.expect_identifier("destructor name")?;
                let name = Ranged::new(name.range(), QString::new_static("__del__"));
                self.parse_method(class, start, name, None, is_static)?;
            }

            TokenKind::Keyword(keyword) if keyword.is_type() => {
                let type_annotation = self.parse_type_prefix();
                let name = self.expect_member_name("member name")?;
                self.parse_class_member_rest(class, start, name, type_annotation, is_static)?;
            }

            TokenKind::Identifier(..) if self.peek_nth_token(1).as_identifier().is_some() => {
                let type_annotation = self.parse_type_prefix();
                let name = self.expect_member_name("member name")?;
                self.parse_class_member_rest(class, start, name, type_annotation, is_static)?;
            }

            TokenKind::Identifier(..) | TokenKind::Keyword(..) => {
                let name = self.expect_member_name("member name")?;
                self.parse_class_member_rest(class, start, name, None, is_static)?;
            }

            TokenKind::EndOfFile => {
                return Err(ParseError::UnexpectedEndOfFile { token, context: "class body" });
            }

            _ => return Err(ParseError::ExpectedToken { token, expected: "a class member", context: "class body" }),
        }

        Ok(())
    }

    /// Whatever follows a member name: a method, a field with an initializer
    /// or a bare annotation.
    fn parse_class_member_rest(
        &mut self,
        class: &mut ClassStatement,
        start: FileLocation,
        name: Ranged<QString>,
        type_annotation: Option<Ranged<QString>>,
        is_static: bool,
    ) -> ParseResult<()> {
        match self.peek_punctuator() {
            Some(Punctuator::LeftParenthesis) => {
                return self.parse_method(class, start, name, type_annotation, is_static);
            }

            Some(Punctuator::Colon) => {
                self.consume_token();
                self.parse_type_annotation()?;
            }

            _ => (),
        }

        while self.peek_punctuator() == Some(Punctuator::LeftSquareBracket) {
            self.skip_bracketed("array declarator")?;
        }

        if self.peek_punctuator() == Some(Punctuator::Assignment) {
            self.consume_token();
            let value = self.parse_expression()?;
            class.static_fields.push(StaticField { name, value });
        }

        self.expect_statement_end("class member")
    }

    fn parse_method(
        &mut self,
        class: &mut ClassStatement,
        start: FileLocation,
        name: Ranged<QString>,
        return_type: Option<Ranged<QString>>,
        is_static: bool,
    ) -> ParseResult<()> {
        let name = canonical_method_declaration(name, class.name.value());
        let method = Rc::new(self.parse_function(start, name, return_type)?);

        if is_static {
            class.static_methods.push(method);
        } else {
            class.methods.push(method);
        }

        Ok(())
    }

    fn parse_expression_statement(&mut self) -> ParseResult<StatementKind> {
        let expression = self.parse_expression()?;

        let expression = if self.peek_punctuator() == Some(Punctuator::Comma) {
            self.parse_tuple_statement(expression)?
        } else {
            expression
        };

        self.expect_statement_end("expression")?;
        Ok(StatementKind::Expression(expression))
    }

    /// `a, b = b, a` and `x = 1, 2`.
    fn parse_tuple_statement(&mut self, first: Ranged<Expression>) -> ParseResult<Ranged<Expression>> {
        let range = first.range();
        let start = range.start();

        let first = match first.into_value() {
            Expression::Assign(mut assign) => {
                assign.source = Box::new(self.parse_tuple_tail(*assign.source)?);
                return Ok(Ranged::between(start, self.token_end, Expression::Assign(assign)));
            }
            other => Ranged::new(range, other),
        };

        let destination = self.parse_tuple_tail(first)?;
        let Some(kind) = assign_kind(&self.peek_token().kind) else {
            return Ok(destination);
        };

        let operator = self.consume_token();
        if !destination.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { token: operator });
        }

        let source = self.parse_expression()?;
        let source = if self.peek_punctuator() == Some(Punctuator::Comma) {
            self.parse_tuple_tail(source)?
        } else {
            source
        };

        Ok(Ranged::new(
            FileRange::new(start, self.token_end),
            Expression::Assign(AssignExpression {
                kind: Ranged::new(operator.range(), kind),
                destination: Box::new(destination),
                source: Box::new(source),
            }),
        ))
    }

    /// Collects `, b, c` after `first` into a tuple.
    fn parse_tuple_tail(&mut self, first: Ranged<Expression>) -> ParseResult<Ranged<Expression>> {
        let start = first.range().start();
        let mut elements = vec![first];

        while self.peek_punctuator() == Some(Punctuator::Comma) {
            self.consume_token();

            if self.at_statement_end() || self.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                break;
            }

            elements.push(self.parse_ternary_expression()?);
        }

        Ok(Ranged::new(
            FileRange::new(start, self.token_end),
            Expression::Primary(PrimaryExpression::Tuple(elements)),
        ))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let destination = self.parse_ternary_expression()?;

        let Some(kind) = assign_kind(&self.peek_token().kind) else {
            return Ok(destination);
        };

        let operator = self.consume_token();
        if !destination.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { token: operator });
        }

        let source = self.parse_assignment_expression()?;
        let range = FileRange::new(destination.range().start(), source.range().end());

        Ok(Ranged::new(range, Expression::Assign(AssignExpression {
            kind: Ranged::new(operator.range(), kind),
            destination: Box::new(destination),
            source: Box::new(source),
        })))
    }

    /// `condition ? then : otherwise` and `then if condition else otherwise`.
    fn parse_ternary_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let expression = self.parse_logical_or_expression()?;

        let (condition, then) = match self.peek_token().kind {
            TokenKind::Punctuator(Punctuator::QuestionMark) => {
                self.consume_token();
                let then = self.parse_ternary_expression()?;
                self.expect_punctuator(Punctuator::Colon, "ternary branch")?;
                (expression, then)
            }

            TokenKind::Keyword(Keyword::If) => {
                self.consume_token();
                let condition = self.parse_logical_or_expression()?;
                self.expect_keyword(Keyword::Else, "conditional expression")?;
                (condition, expression)
            }

            _ => return Ok(expression),
        };

        let otherwise = self.parse_ternary_expression()?;
        let start = condition.range().start().min(then.range().start());
        let range = FileRange::new(start, otherwise.range().end());

        Ok(Ranged::new(range, Expression::Ternary(TernaryExpression {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })))
    }

    fn parse_logical_or_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_logical_and_expression, &[
            (TokenKind::Keyword(Keyword::Or), BiOperator::Logical(LogicalOperator::Or)),
            (TokenKind::Punctuator(Punctuator::LogicalOr), BiOperator::Logical(LogicalOperator::Or)),
        ])
    }

    fn parse_logical_and_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_logical_not_expression, &[
            (TokenKind::Keyword(Keyword::And), BiOperator::Logical(LogicalOperator::And)),
            (TokenKind::Punctuator(Punctuator::LogicalAnd), BiOperator::Logical(LogicalOperator::And)),
        ])
    }

    /// The `not` keyword binds looser than comparisons: `not a == b` negates
    /// the comparison.
    fn parse_logical_not_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        if self.peek_keyword() != Some(Keyword::Not) {
            return self.parse_bitwise_or_expression();
        }

        let operator = self.consume_token();
        let rhs = self.parse_logical_not_expression()?;
        Ok(unary_expression(UnaryExpressionKind::Not, operator.range(), rhs))
    }

    fn parse_bitwise_or_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_bitwise_xor_expression, &[
            (TokenKind::Punctuator(Punctuator::BitwiseOr), BiOperator::Math(MathOperator::BitwiseOr)),
        ])
    }

    fn parse_bitwise_xor_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_bitwise_and_expression, &[
            (TokenKind::Punctuator(Punctuator::BitwiseXor), BiOperator::Math(MathOperator::BitwiseXor)),
        ])
    }

    fn parse_bitwise_and_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_equality_expression, &[
            (TokenKind::Punctuator(Punctuator::BitwiseAnd), BiOperator::Math(MathOperator::BitwiseAnd)),
        ])
    }

    fn parse_equality_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_relational_expression, &[
            (TokenKind::Punctuator(Punctuator::Equals), BiOperator::Comparison(Comparison::Equality)),
            (TokenKind::Punctuator(Punctuator::StrictEquals), BiOperator::Comparison(Comparison::Equality)),
            (TokenKind::Punctuator(Punctuator::NotEquals), BiOperator::Comparison(Comparison::Inequality)),
            (TokenKind::Punctuator(Punctuator::StrictNotEquals), BiOperator::Comparison(Comparison::Inequality)),
        ])
    }

    fn parse_relational_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let mut expression = self.parse_shift_expression()?;

        loop {
            let operator = match self.peek_token().kind {
                TokenKind::Punctuator(Punctuator::LessThan) => BiOperator::Comparison(Comparison::LessThan),
                TokenKind::Punctuator(Punctuator::LessThanOrEqual) => BiOperator::Comparison(Comparison::LessThanOrEqual),
                TokenKind::Punctuator(Punctuator::GreaterThan) => BiOperator::Comparison(Comparison::GreaterThan),
                TokenKind::Punctuator(Punctuator::GreaterThanOrEqual) => BiOperator::Comparison(Comparison::GreaterThanOrEqual),
                TokenKind::Keyword(Keyword::In) => BiOperator::Membership { negated: false },
                TokenKind::Keyword(Keyword::Not) if self.peek_nth_token(1).kind == TokenKind::Keyword(Keyword::In) => {
                    BiOperator::Membership { negated: true }
                }
                _ => break,
            };

            let start = self.consume_token().begin;
            if operator == (BiOperator::Membership { negated: true }) {
                self.consume_token();
            }

            let operator = Ranged::between(start, self.token_end, operator);
            let rhs = self.parse_shift_expression()?;
            expression = bi_expression(operator, expression, rhs);
        }

        Ok(expression)
    }

    fn parse_shift_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_additive_expression, &[
            (TokenKind::Punctuator(Punctuator::LeftShift), BiOperator::Math(MathOperator::LeftShift)),
            (TokenKind::Punctuator(Punctuator::RightShift), BiOperator::Math(MathOperator::RightShift)),
        ])
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_multiplicative_expression, &[
            (TokenKind::Punctuator(Punctuator::PlusSign), BiOperator::Math(MathOperator::Add)),
            (TokenKind::Punctuator(Punctuator::HyphenMinus), BiOperator::Math(MathOperator::Subtract)),
        ])
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        self.parse_bi_expression(Self::parse_power_expression, &[
            (TokenKind::Punctuator(Punctuator::Asterisk), BiOperator::Math(MathOperator::Multiply)),
            (TokenKind::Punctuator(Punctuator::Solidus), BiOperator::Math(MathOperator::Divide)),
            (TokenKind::Punctuator(Punctuator::FloorDivision), BiOperator::Math(MathOperator::FloorDivide)),
            (TokenKind::Punctuator(Punctuator::PercentageSign), BiOperator::Math(MathOperator::Modulo)),
        ])
    }

    /// Right associative: `2 ** 3 ** 2` is `2 ** 9`.
    fn parse_power_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let lhs = self.parse_unary_expression()?;

        if self.peek_punctuator() != Some(Punctuator::Power) {
            return Ok(lhs);
        }

        let operator = Ranged::new(self.consume_token().range(), BiOperator::Math(MathOperator::Power));
        let rhs = self.parse_power_expression()?;
        Ok(bi_expression(operator, lhs, rhs))
    }

    fn parse_bi_expression<F>(&mut self, mut operand: F, operators: &[(TokenKind, BiOperator)]) -> ParseResult<Ranged<Expression>>
            where F: FnMut(&mut Self) -> ParseResult<Ranged<Expression>> {
        let mut expression = operand(self)?;

        loop {
            let next = self.peek_token();
            let Some(operator) = operators.iter().find(|(kind, _)| *kind == next.kind).map(|(_, operator)| *operator) else {
                break;
            };

            let operator = Ranged::new(self.consume_token().range(), operator);
            let rhs = operand(self)?;
            expression = bi_expression(operator, expression, rhs);
        }

        Ok(expression)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let token = self.peek_token();

        let kind = match token.kind {
            TokenKind::Punctuator(Punctuator::HyphenMinus) => UnaryExpressionKind::Negate,
            TokenKind::Punctuator(Punctuator::PlusSign) => UnaryExpressionKind::Plus,
            TokenKind::Punctuator(Punctuator::Not) | TokenKind::Keyword(Keyword::Not) => UnaryExpressionKind::Not,
            TokenKind::Punctuator(Punctuator::BitwiseNot) => UnaryExpressionKind::BitwiseNot,

            TokenKind::Punctuator(punctuator @ (Punctuator::Increment | Punctuator::Decrement)) => {
                let operator = self.consume_token();
                let target = self.parse_unary_expression()?;
                if !target.is_assignable() {
                    return Err(ParseError::InvalidAssignmentTarget { token: operator });
                }

                let range = FileRange::new(operator.begin, target.range().end());
                return Ok(Ranged::new(range, Expression::Update(UpdateExpression {
                    target: Box::new(target),
                    increment: punctuator == Punctuator::Increment,
                    prefix: true,
                })));
            }

            // Address-of and dereference carry no meaning here.
            TokenKind::Punctuator(Punctuator::BitwiseAnd | Punctuator::Asterisk) => {
                self.consume_token();
                return self.parse_unary_expression();
            }

            TokenKind::Keyword(Keyword::New) => {
                self.consume_token();
                return self.parse_new_expression();
            }

            _ => return self.parse_postfix_expression(),
        };

        // `-a ** 2` negates the power.
        let operator = self.consume_token();
        let rhs = self.parse_power_expression()?;
        Ok(unary_expression(kind, operator.range(), rhs))
    }

    /// `new Foo(args)` is a plain call of the class; `new Foo` calls it
    /// without arguments.
    fn parse_new_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let class = self.parse_primary_expression()?;
        let start = class.range().start();

        let arguments = if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
            self.consume_token();
            self.nested(Self::parse_call_arguments)?
        } else {
            Vec::new()
        };

        let call = Ranged::between(start, self.token_end, Expression::Postfix(PostfixExpression {
            lhs: Box::new(class),
            kind: Ranged::between(start, self.token_end, PostfixExpressionKind::Call(FunctionCallExpression {
                arguments,
            })),
        }));

        self.parse_postfix_chain(call)
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let expression = self.parse_primary_expression()?;
        self.parse_postfix_chain(expression)
    }

    fn parse_postfix_chain(&mut self, mut expression: Ranged<Expression>) -> ParseResult<Ranged<Expression>> {
        let start = expression.range().start();

        loop {
            let Some(punctuator) = self.peek_punctuator() else {
                break;
            };

            let kind_start = self.peek_token().begin;
            let kind = match punctuator {
                Punctuator::LeftParenthesis => {
                    self.consume_token();
                    let arguments = self.nested(Self::parse_call_arguments)?;
                    PostfixExpressionKind::Call(FunctionCallExpression { arguments })
                }

                Punctuator::Period => {
                    self.consume_token();
                    PostfixExpressionKind::Member(self.expect_member_name("member name")?)
                }

                Punctuator::LeftSquareBracket => {
                    self.consume_token();
                    self.nested(Self::parse_subscript)?
                }

                Punctuator::Increment | Punctuator::Decrement if expression.is_assignable() => {
                    self.consume_token();
                    expression = Ranged::between(start, self.token_end, Expression::Update(UpdateExpression {
                        target: Box::new(expression),
                        increment: punctuator == Punctuator::Increment,
                        prefix: false,
                    }));
                    continue;
                }

                _ => break,
            };

            let range = FileRange::new(start, self.token_end);
            expression = Ranged::new(range, Expression::Postfix(PostfixExpression {
                lhs: Box::new(expression),
                kind: Ranged::between(kind_start, self.token_end, kind),
            }));
        }

        Ok(expression)
    }

    /// Arguments up to and including the closing parenthesis. Keyword
    /// argument names are dropped.
    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Ranged<Expression>>> {
        let mut arguments = Vec::new();

        loop {
            if self.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                self.consume_token();
                break;
            }

            if self.peek_token().as_identifier().is_some()
                    && self.peek_nth_token(1).kind == TokenKind::Punctuator(Punctuator::Assignment) {
                self.consume_token();
                self.consume_token();
            }

            arguments.push(self.parse_ternary_expression()?);

            match self.peek_punctuator() {
                Some(Punctuator::Comma) => {
                    self.consume_token();
                }
                Some(Punctuator::RightParenthesis) => (),
                _ => return Err(self.expected("`,` or `)`", "argument")),
            }
        }

        Ok(arguments)
    }

    /// `[index]` or `[start:stop:step]`, including the closing bracket.
    fn parse_subscript(&mut self) -> ParseResult<PostfixExpressionKind> {
        let start = if self.peek_punctuator() == Some(Punctuator::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        let start = match (start, self.peek_punctuator()) {
            (Some(index), Some(Punctuator::RightSquareBracket)) => {
                self.consume_token();
                return Ok(PostfixExpressionKind::Subscript(index));
            }
            (start, _) => start,
        };

        self.expect_punctuator(Punctuator::Colon, "slice start")?;

        let stop = match self.peek_punctuator() {
            Some(Punctuator::Colon | Punctuator::RightSquareBracket) => None,
            _ => Some(Box::new(self.parse_expression()?)),
        };

        let mut step = None;
        if self.peek_punctuator() == Some(Punctuator::Colon) {
            self.consume_token();
            if self.peek_punctuator() != Some(Punctuator::RightSquareBracket) {
                step = Some(Box::new(self.parse_expression()?));
            }
        }

        self.expect_punctuator(Punctuator::RightSquareBracket, "slice")?;

        Ok(PostfixExpressionKind::Slice(SliceExpression {
            start,
            stop,
            step,
        }))
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Ranged<Expression>> {
        let token = self.consume_token();
        let start = token.begin;

        let expression = match &token.kind {
            TokenKind::Number(text) => PrimaryExpression::Number(parse_number(&token, text)?),

            TokenKind::StringLiteral(literal) => PrimaryExpression::StringLiteral(literal.clone()),

            TokenKind::TemplateString(parts) => self.parse_template_string(parts)?,

            TokenKind::Identifier(name) if self.peek_punctuator() == Some(Punctuator::FatArrow) => {
                let parameter = Parameter {
                    name: Ranged::new(token.range(), name.clone()),
                    type_annotation: None,
                    default: None,
                };
                self.consume_token();
                self.parse_arrow_function(start, vec![parameter])?
            }

            TokenKind::Identifier(name) if name == "lambda" && self.is_python_lambda() => {
                self.parse_python_lambda(start)?
            }

            TokenKind::Identifier(name) => PrimaryExpression::Reference(Ranged::new(token.range(), name.clone())),

            TokenKind::Keyword(Keyword::True) => PrimaryExpression::Boolean(true),
            TokenKind::Keyword(Keyword::False) => PrimaryExpression::Boolean(false),
            TokenKind::Keyword(Keyword::Nil) => PrimaryExpression::Nil,
            TokenKind::Keyword(Keyword::This) => PrimaryExpression::ReferenceThis,
            TokenKind::Keyword(Keyword::Endl) => PrimaryExpression::StringLiteral(QString::new_static("\n")),

            TokenKind::Keyword(Keyword::Super) => {
                self.skip_super_arguments();
                PrimaryExpression::Super
            }

            TokenKind::Keyword(Keyword::Fn) => {
                let name = self.peek_token().as_identifier();
                if name.is_some() {
                    self.consume_token();
                }

                let name = name.unwrap_or_else(|| Ranged::new(token.range(), QString::new_static("lambda")));
                PrimaryExpression::Lambda(Rc::new(self.parse_function(start, name, None)?))
            }

            TokenKind::Keyword(Keyword::Input) => {
                let prompt = if self.peek_punctuator() == Some(Punctuator::LeftParenthesis) {
                    self.consume_token();
                    self.nested(|parser| {
                        if parser.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                            parser.consume_token();
                            return Ok(None);
                        }

                        let prompt = parser.parse_ternary_expression()?;
                        parser.expect_punctuator(Punctuator::RightParenthesis, "input prompt")?;
                        Ok(Some(Box::new(prompt)))
                    })?
                } else {
                    None
                };

                PrimaryExpression::Input { prompt }
            }

            // `int("5")`, `print(...)` inside expressions: calls of natives.
            TokenKind::Keyword(keyword) if (keyword.is_type() || matches!(keyword, Keyword::Print | Keyword::Printf))
                    && self.peek_punctuator() == Some(Punctuator::LeftParenthesis) => {
                PrimaryExpression::Reference(Ranged::new(token.range(), token.text.clone()))
            }

            TokenKind::Keyword(keyword) if keyword.is_reserved() => {
                return Err(ParseError::ReservedKeyword { token });
            }

            TokenKind::Punctuator(Punctuator::LeftParenthesis) => self.parse_parenthesized_expression(start)?,

            TokenKind::Punctuator(Punctuator::LeftSquareBracket) => self.nested(Self::parse_array_expression)?,

            TokenKind::Punctuator(Punctuator::LeftCurlyBracket) => self.nested(Self::parse_map_expression)?,

            TokenKind::EndOfFile => {
                return Err(ParseError::UnexpectedEndOfFile { token, context: "expression" });
            }

            _ => return Err(ParseError::UnknownStartOfExpression { token }),
        };

        let range = FileRange::new(start, self.token_end);
        Ok(Ranged::new(range, Expression::Primary(expression)))
    }

    /// `super().method` is the same as `super.method`.
    fn skip_super_arguments(&mut self) {
        if self.peek_punctuator() != Some(Punctuator::LeftParenthesis) {
            return;
        }

        let open = self.next_index();
        let Some(close) = self.find_closing_bracket(open) else {
            return;
        };

        if self.token_at(close + 1).kind == TokenKind::Punctuator(Punctuator::Period) {
            self.token_begin = self.token_at(open).begin;
            self.token_end = self.token_at(close).end;
            self.cursor = close + 1;
        }
    }

    /// After the opening parenthesis: an arrow function's parameters, a
    /// parenthesized expression or a tuple.
    fn parse_parenthesized_expression(&mut self, start: FileLocation) -> ParseResult<PrimaryExpression> {
        let open = self.cursor.saturating_sub(1);
        if let Some(close) = self.find_closing_bracket(open) {
            if self.token_at(close + 1).kind == TokenKind::Punctuator(Punctuator::FatArrow) {
                let parameters = self.nested(Self::parse_parameter_list)?;
                self.expect_punctuator(Punctuator::FatArrow, "parameter list")?;
                return self.parse_arrow_function(start, parameters);
            }
        }

        self.nested(|parser| {
            if parser.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                parser.consume_token();
                return Ok(PrimaryExpression::Tuple(Vec::new()));
            }

            let first = parser.parse_expression()?;
            if parser.peek_punctuator() != Some(Punctuator::Comma) {
                parser.expect_punctuator(Punctuator::RightParenthesis, "expression")?;
                return Ok(PrimaryExpression::Parenthesized(Box::new(first)));
            }

            let mut elements = vec![first];
            while parser.peek_punctuator() == Some(Punctuator::Comma) {
                parser.consume_token();
                if parser.peek_punctuator() == Some(Punctuator::RightParenthesis) {
                    break;
                }
                elements.push(parser.parse_expression()?);
            }

            parser.expect_punctuator(Punctuator::RightParenthesis, "tuple")?;
            Ok(PrimaryExpression::Tuple(elements))
        })
    }

    /// The body after `=>`: a block or a single expression.
    fn parse_arrow_function(&mut self, start: FileLocation, parameters: Vec<Parameter>) -> ParseResult<PrimaryExpression> {
        let body = if self.peek_punctuator() == Some(Punctuator::LeftCurlyBracket) {
            FunctionBody::Block(self.parse_body("`=>`")?)
        } else {
            FunctionBody::Expression(self.parse_expression()?)
        };

        let range = FileRange::new(start, self.token_end);
        Ok(PrimaryExpression::Lambda(Rc::new(FunctionStatement {
            range,
            name: Ranged::at(start, QString::new_static("lambda")),
            parameters,
            body,
            return_type: None,
        })))
    }

    fn is_python_lambda(&self) -> bool {
        self.peek_token().as_identifier().is_some()
            || self.peek_punctuator() == Some(Punctuator::Colon)
    }

    /// `lambda a, b: a + b`
    fn parse_python_lambda(&mut self, start: FileLocation) -> ParseResult<PrimaryExpression> {
        let mut parameters = Vec::new();

        while self.peek_punctuator() != Some(Punctuator::Colon) {
            let name = self.expect_identifier("lambda parameter")?;
            parameters.push(Parameter {
                name,
                type_annotation: None,
                default: None,
            });

            if self.peek_punctuator() == Some(Punctuator::Comma) {
                self.consume_token();
            }
        }

        self.consume_token();
        let body = self.parse_ternary_expression()?;

        Ok(PrimaryExpression::Lambda(Rc::new(FunctionStatement {
            range: FileRange::new(start, self.token_end),
            name: Ranged::at(start, QString::new_static("lambda")),
            parameters,
            body: FunctionBody::Expression(body),
            return_type: None,
        })))
    }

    /// After the opening bracket: an array literal or a list comprehension.
    fn parse_array_expression(&mut self) -> ParseResult<PrimaryExpression> {
        if self.peek_punctuator() == Some(Punctuator::RightSquareBracket) {
            self.consume_token();
            return Ok(PrimaryExpression::Array(Vec::new()));
        }

        let first = self.parse_expression()?;

        if self.peek_keyword() == Some(Keyword::For) {
            self.consume_token();
            return self.parse_list_comprehension(first);
        }

        let mut elements = vec![first];
        loop {
            match self.peek_punctuator() {
                Some(Punctuator::Comma) => {
                    self.consume_token();
                    if self.peek_punctuator() == Some(Punctuator::RightSquareBracket) {
                        continue;
                    }
                    elements.push(self.parse_expression()?);
                }

                Some(Punctuator::RightSquareBracket) => {
                    self.consume_token();
                    break;
                }

                _ => return Err(self.expected("`,` or `]`", "array element")),
            }
        }

        Ok(PrimaryExpression::Array(elements))
    }

    fn parse_list_comprehension(&mut self, element: Ranged<Expression>) -> ParseResult<PrimaryExpression> {
        let mut iterators = vec![self.expect_identifier("loop variable")?];
        while self.peek_punctuator() == Some(Punctuator::Comma) {
            self.consume_token();
            iterators.push(self.expect_identifier("loop variable")?);
        }

        self.expect_keyword(Keyword::In, "loop variable")?;
        let iterable = self.parse_logical_or_expression()?;

        let condition = if self.peek_keyword() == Some(Keyword::If) {
            self.consume_token();
            Some(self.parse_logical_or_expression()?)
        } else {
            None
        };

        self.expect_punctuator(Punctuator::RightSquareBracket, "list comprehension")?;

        Ok(PrimaryExpression::ListComprehension(Box::new(ListComprehension {
            element,
            iterators,
            iterable,
            condition,
        })))
    }

    /// After the opening brace. A bare name before `:` is a string key.
    fn parse_map_expression(&mut self) -> ParseResult<PrimaryExpression> {
        let mut entries = Vec::new();

        loop {
            if self.peek_punctuator() == Some(Punctuator::RightCurlyBracket) {
                self.consume_token();
                break;
            }

            let token = self.peek_token();
            let is_bare_key = match &token.kind {
                TokenKind::Identifier(..) => true,
                TokenKind::Keyword(keyword) => keyword.is_type(),
                _ => false,
            } && self.peek_nth_token(1).kind == TokenKind::Punctuator(Punctuator::Colon);

            let key = if is_bare_key {
                let token = self.consume_token();
                string_literal(token.range(), token.text.clone())
            } else {
                self.parse_ternary_expression()?
            };

            self.expect_punctuator(Punctuator::Colon, "map key")?;
            let value = self.parse_expression()?;
            entries.push(MapEntry { key, value });

            match self.peek_punctuator() {
                Some(Punctuator::Comma) => {
                    self.consume_token();
                }
                Some(Punctuator::RightCurlyBracket) => (),
                _ => return Err(self.expected("`,` or `}`", "map entry")),
            }
        }

        Ok(PrimaryExpression::Map(entries))
    }

    fn parse_template_string(&mut self, template_string: &[TemplateStringToken]) -> ParseResult<PrimaryExpression> {
        let mut parts = Vec::new();

        for token in template_string {
            let part = match token {
                TemplateStringToken::Plain { str, .. } => TemplateStringExpressionPart::String(str.clone()),
                TemplateStringToken::Expression(tokens) => {
                    let mut parser = Parser::new(self.path.clone(), tokens);
                    parser.nesting = 1;

                    let expression = parser.parse_expression()?;
                    if !parser.is_at_end() {
                        return Err(ParseError::ResidualTokensInTemplateString {
                            token: parser.peek_token().clone(),
                        });
                    }

                    TemplateStringExpressionPart::Expression(expression)
                }
            };

            parts.push(part);
        }

        Ok(PrimaryExpression::TemplateString { parts })
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn token_at(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.end_of_file_token)
    }

    /// Index of the next significant token. Newlines only count outside
    /// brackets.
    fn next_index(&self) -> usize {
        let mut index = self.cursor;

        if self.nesting > 0 {
            while self.token_at(index).kind == TokenKind::Newline {
                index += 1;
            }
        }

        index
    }

    fn peek_token(&self) -> &Token {
        self.token_at(self.next_index())
    }

    fn peek_nth_token(&self, n: usize) -> &Token {
        let mut index = self.next_index();

        for _ in 0..n {
            if self.token_at(index).kind == TokenKind::EndOfFile {
                break;
            }

            index += 1;
            if self.nesting > 0 {
                while self.token_at(index).kind == TokenKind::Newline {
                    index += 1;
                }
            }
        }

        self.token_at(index)
    }

    fn peek_past_newlines(&self) -> &Token {
        let mut index = self.cursor;
        while self.token_at(index).kind == TokenKind::Newline {
            index += 1;
        }
        self.token_at(index)
    }

    fn peek_punctuator(&self) -> Option<Punctuator> {
        match self.peek_token().kind {
            TokenKind::Punctuator(punctuator) => Some(punctuator),
            _ => None,
        }
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek_token().kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// Never advances past the end of the stream.
    fn consume_token(&mut self) -> Token {
        let index = self.next_index();
        let token = self.token_at(index).clone();

        if token.kind != TokenKind::EndOfFile {
            self.cursor = index + 1;
        }

        self.token_begin = token.begin;
        self.token_end = token.end;
        token
    }

    fn skip_newlines(&mut self) {
        while self.token_at(self.cursor).kind == TokenKind::Newline {
            self.cursor += 1;
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.token_at(self.cursor).kind, TokenKind::Newline | TokenKind::Punctuator(Punctuator::Semicolon)) {
            self.cursor += 1;
        }
    }

    /// Skips a bracketed region starting at the next token.
    fn skip_bracketed(&mut self, context: &'static str) -> ParseResult<()> {
        let open = self.next_index();

        let Some(close) = self.find_closing_bracket(open) else {
            return Err(ParseError::UnexpectedEndOfFile {
                token: self.token_at(self.tokens.len()).clone(),
                context,
            });
        };

        self.token_begin = self.token_at(open).begin;
        self.token_end = self.token_at(close).end;
        self.cursor = close + 1;
        Ok(())
    }

    fn find_closing_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;

        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            match &token.kind {
                TokenKind::Punctuator(punctuator) if punctuator.is_opening_bracket() => depth += 1,
                TokenKind::Punctuator(punctuator) if punctuator.is_closing_bracket() => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(index);
                    }
                }
                TokenKind::EndOfFile => return None,
                _ => (),
            }
        }

        None
    }

    fn snapshot(&self) -> Snapshot {
        (self.cursor, self.token_begin, self.token_end)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        (self.cursor, self.token_begin, self.token_end) = snapshot;
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek_token().kind,
            TokenKind::Newline | TokenKind::EndOfFile | TokenKind::Dedent
                | TokenKind::Punctuator(Punctuator::Semicolon | Punctuator::RightCurlyBracket)
        )
    }

    /// A statement ends at `;`, a newline, the end of a block or the end of
    /// the file. Only the semicolon is consumed.
    fn expect_statement_end(&mut self, context: &'static str) -> ParseResult<()> {
        if self.peek_punctuator() == Some(Punctuator::Semicolon) {
            self.consume_token();
            return Ok(());
        }

        if self.at_statement_end() {
            return Ok(());
        }

        Err(self.expected("end of statement", context))
    }

    fn expected(&self, expected: &'static str, context: &'static str) -> ParseError {
        let token = self.peek_token().clone();

        if token.kind == TokenKind::EndOfFile {
            return ParseError::UnexpectedEndOfFile { token, context };
        }

        ParseError::ExpectedToken { token, expected, context }
    }

    fn expect_punctuator(&mut self, punctuator: Punctuator, context: &'static str) -> ParseResult<Token> {
        let token = self.peek_token().clone();

        match token.kind {
            TokenKind::Punctuator(found) if found == punctuator => Ok(self.consume_token()),
            TokenKind::EndOfFile => Err(ParseError::UnexpectedEndOfFile { token, context }),
            _ => Err(ParseError::ExpectedPunctuator { token, expected: punctuator, context }),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, context: &'static str) -> ParseResult<Token> {
        let token = self.peek_token().clone();

        match token.kind {
            TokenKind::Keyword(found) if found == keyword => Ok(self.consume_token()),
            TokenKind::EndOfFile => Err(ParseError::UnexpectedEndOfFile { token, context }),
            _ => Err(ParseError::ExpectedKeyword { token, expected: keyword, context }),
        }
    }

    fn expect_identifier(&mut self, purpose: &'static str) -> ParseResult<Ranged<QString>> {
        let previous = self.previous_text();
        let token = self.peek_token().clone();

        match token.as_identifier() {
            Some(identifier) => {
                self.consume_token();
                Ok(identifier)
            }

            None if token.kind == TokenKind::EndOfFile => Err(ParseError::UnexpectedEndOfFile { token, context: purpose }),

            None => Err(ParseError::ExpectedIdentifier { token, purpose, previous }),
        }
    }

    /// Member names may be spelled like keywords: `obj.print`, `def input(self)`.
    fn expect_member_name(&mut self, purpose: &'static str) -> ParseResult<Ranged<QString>> {
        let previous = self.previous_text();
        let token = self.peek_token().clone();

        match &token.kind {
            TokenKind::Identifier(..) | TokenKind::Keyword(..) => {
                self.consume_token();
                Ok(Ranged::new(token.range(), token.text.clone()))
            }

            TokenKind::EndOfFile => Err(ParseError::UnexpectedEndOfFile { token, context: purpose }),

            _ => Err(ParseError::ExpectedIdentifier { token, purpose, previous }),
        }
    }

    fn previous_text(&self) -> QString {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|token| token.text.clone())
            .unwrap_or_default()
    }
}

fn assign_kind(kind: &TokenKind) -> Option<AssignKind> {
    let TokenKind::Punctuator(punctuator) = kind else {
        return None;
    };

    Some(match punctuator {
        Punctuator::Assignment => AssignKind::Regular,
        Punctuator::AddAssign => AssignKind::Math(MathOperator::Add),
        Punctuator::SubtractAssign => AssignKind::Math(MathOperator::Subtract),
        Punctuator::MultiplyAssign => AssignKind::Math(MathOperator::Multiply),
        Punctuator::DivideAssign => AssignKind::Math(MathOperator::Divide),
        Punctuator::ModuloAssign => AssignKind::Math(MathOperator::Modulo),
        _ => return None,
    })
}

fn bi_expression(operator: Ranged<BiOperator>, lhs: Ranged<Expression>, rhs: Ranged<Expression>) -> Ranged<Expression> {
    let range = FileRange::new(lhs.range().start(), rhs.range().end());

    Ranged::new(range, Expression::BiExpression(BiExpression {
        operator,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }))
}

fn unary_expression(kind: UnaryExpressionKind, operator: FileRange, rhs: Ranged<Expression>) -> Ranged<Expression> {
    let range = FileRange::new(operator.start(), rhs.range().end());

    Ranged::new(range, Expression::Unary(UnaryExpression {
        kind: Ranged::new(operator, kind),
        rhs: Box::new(rhs),
    }))
}

fn string_literal(range: FileRange, value: QString) -> Ranged<Expression> {
    Ranged::new(range, Expression::Primary(PrimaryExpression::StringLiteral(value)))
}

fn parse_number(token: &Token, text: &str) -> ParseResult<f64> {
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok().map(|value| value as f64),
        None => text.parse().ok(),
    };

    value.ok_or_else(|| ParseError::InvalidNumber { token: token.clone() })
}

/// The last argument must name the target; an optional argument before it
/// is the prompt.
fn input_statement_from_arguments(mut arguments: Vec<Ranged<Expression>>) -> Option<InputStatement> {
    if arguments.len() > 2 {
        return None;
    }

    let target = arguments.pop()?;
    let name = target.value().as_identifier()?.clone();

    Some(InputStatement {
        prompt: arguments.pop(),
        targets: vec![Ranged::new(target.range(), name)],
    })
}

/// The name a special method is stored under, whatever language spelled it.
#[must_use]
pub fn canonical_method_name(name: &str) -> &str {
    match name {
        "constructor" | "__init__" => "init",
        "destructor" => "__del__",
        "toString" | "to_string" | "__repr__" => "__str__",
        other => other,
    }
}

fn canonical_method_declaration(name: Ranged<QString>, class_name: &str) -> Ranged<QString> {
    if name.value() == class_name {
        return Ranged::new(name.range(), QString::new_static("init"));
    }

    match canonical_method_name(name.value()) {
        "init" => Ranged::new(name.range(), QString::new_static("init")),
        "__del__" => Ranged::new(name.range(), QString::new_static("__del__")),
        "__str__" => Ranged::new(name.range(), QString::new_static("__str__")),
        _ => name,
    }
}

#[derive(Clone, Debug, thiserror::Error, AsRefStr)]
pub enum ParseError {
    #[error("Expected `{expected}` after {context}, but found `{token}`")]
    ExpectedPunctuator { token: Token, expected: Punctuator, context: &'static str },

    #[error("Expected keyword `{expected}` after {context}, but found `{token}`")]
    ExpectedKeyword { token: Token, expected: Keyword, context: &'static str },

    #[error("Expected {expected} after {context}, but found `{token}`")]
    ExpectedToken { token: Token, expected: &'static str, context: &'static str },

    #[error("Expected {purpose} after `{previous}`, but found `{token}`")]
    ExpectedIdentifier { token: Token, purpose: &'static str, previous: QString },

    #[error("Invalid assignment target before `{token}`")]
    InvalidAssignmentTarget { token: Token },

    #[error("Invalid number literal `{token}`")]
    InvalidNumber { token: Token },

    #[error("`{token}` is reserved and has no meaning yet")]
    ReservedKeyword { token: Token },

    #[error("Residual token after expression inside template string: `{token}`")]
    ResidualTokensInTemplateString { token: Token },

    #[error("Unexpected end of file while parsing {context}")]
    UnexpectedEndOfFile { token: Token, context: &'static str },

    #[error("Unknown start of expression: `{token}`")]
    UnknownStartOfExpression { token: Token },

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl ParseError {
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::ExpectedPunctuator { token, .. } => Some(token),
            Self::ExpectedKeyword { token, .. } => Some(token),
            Self::ExpectedToken { token, .. } => Some(token),
            Self::ExpectedIdentifier { token, .. } => Some(token),
            Self::InvalidAssignmentTarget { token } => Some(token),
            Self::InvalidNumber { token } => Some(token),
            Self::ReservedKeyword { token } => Some(token),
            Self::ResidualTokensInTemplateString { token } => Some(token),
            Self::UnexpectedEndOfFile { token, .. } => Some(token),
            Self::UnknownStartOfExpression { token } => Some(token),
            Self::Lexical(..) => None,
        }
    }

    #[must_use]
    pub fn range(&self) -> FileRange {
        match self {
            Self::Lexical(error) => error.location.as_zero_range(),
            _ => self.token().map(|token| token.range()).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(input: &str) -> ParseTree {
        let source_code = SourceCode::anonymous(input.to_string());
        match parse_source(&source_code) {
            Ok(tree) => tree,
            Err(e) => panic!("failed to parse {input:?}: {e}"),
        }
    }

    fn parse_error(input: &str) -> ParseError {
        let source_code = SourceCode::anonymous(input.to_string());
        match parse_source(&source_code) {
            Ok(tree) => panic!("expected {input:?} to fail, got {:#?}", tree.statements()),
            Err(e) => e,
        }
    }

    fn single_statement(input: &str) -> StatementKind {
        let tree = parse(input);
        assert_eq!(tree.statements().len(), 1, "statements of {input:?}: {:#?}", tree.statements());
        tree.statements()[0].kind.clone()
    }

    /// Renders an expression with every operator parenthesized.
    fn render(expression: &Expression) -> String {
        match expression {
            Expression::BiExpression(bi) => format!("({} {} {})", render(&bi.lhs), bi.operator.as_str(), render(&bi.rhs)),
            Expression::Unary(unary) => format!("({}{})", unary.kind.as_str(), render(&unary.rhs)),
            Expression::Assign(assign) => format!("({} {} {})", render(&assign.destination), assign.kind.as_str(), render(&assign.source)),
            Expression::Ternary(ternary) => format!("({} ? {} : {})", render(&ternary.condition), render(&ternary.then), render(&ternary.otherwise)),
            other => other.to_string(),
        }
    }

    fn expression(input: &str) -> String {
        match single_statement(input) {
            StatementKind::Expression(expression) => render(&expression),
            other => panic!("expected an expression statement, got {other:#?}"),
        }
    }

    fn names(functions: &[Rc<FunctionStatement>]) -> Vec<&str> {
        functions.iter().map(|function| function.name.as_str()).collect()
    }

    #[rstest]
    #[case("1 + 2 * 3", "(1 + (2 * 3))")]
    #[case("(1 + 2) * 3", "((1 + 2) * 3)")]
    #[case("2 ** 3 ** 2", "(2 ** (3 ** 2))")]
    #[case("a = b = 3", "(a = (b = 3))")]
    #[case("x += 1", "(x += 1)")]
    #[case("a or b and c", "(a or (b and c))")]
    #[case("a || b && c", "(a or (b and c))")]
    #[case("x < 3 == true", "((x < 3) == true)")]
    #[case("a === b", "(a == b)")]
    #[case("1 << 2 + 3", "(1 << (2 + 3))")]
    #[case("a & b | c ^ d", "((a & b) | (c ^ d))")]
    #[case("-a ** 2", "(-(a ** 2))")]
    #[case("2 ** -1", "(2 ** (-1))")]
    #[case("not a == b", "(!(a == b))")]
    #[case("!a == b", "((!a) == b)")]
    #[case("x not in xs", "(x not in xs)")]
    #[case("c ? a : b", "(c ? a : b)")]
    #[case("a if c else b", "(c ? a : b)")]
    #[case("7 // 2", "(7 // 2)")]
    #[case("a.b.c(1)[2]", "a.b.c(1)[2]")]
    #[case("a[1:2]", "a[1:2]")]
    #[case("a[::2]", "a[::2]")]
    #[case("a[:-1]", "a[:-1]")]
    #[case("i++", "i++")]
    #[case("--i", "--i")]
    fn expression_precedence(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expression(input), expected);
    }

    #[rstest]
    #[case("def add(a, b):\n    return a + b\n")]
    #[case("fn add(a, b) { return a + b }")]
    #[case("function add(a, b) {\n    return a + b;\n}")]
    #[case("int add(int a, int b) {\n    return a + b;\n}")]
    #[case("def add(a: int, b: int) -> int:\n    return a + b\n")]
    fn function_in_every_syntax(#[case] input: &str) {
        let StatementKind::Function(function) = single_statement(input) else {
            panic!("expected a function");
        };

        assert_eq!(function.name.as_str(), "add");
        let parameters: Vec<&str> = function.parameters.iter().map(|parameter| parameter.name.as_str()).collect();
        assert_eq!(parameters, ["a", "b"]);

        let FunctionBody::Block(body) = &function.body else {
            panic!("expected a block body");
        };
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0].kind, StatementKind::Return(..)));
    }

    #[test]
    fn c_function_keeps_type_annotations() {
        let StatementKind::Function(function) = single_statement("int add(int a, int b) { return a + b; }") else {
            panic!("expected a function");
        };

        assert_eq!(function.return_type.as_ref().map(|ty| ty.as_str()), Some("int"));
        assert_eq!(function.parameters[0].type_annotation.as_ref().map(|ty| ty.as_str()), Some("int"));
    }

    #[test]
    fn parameter_defaults() {
        let StatementKind::Function(function) = single_statement("def greet(name, greeting=\"hi\"):\n    pass\n") else {
            panic!("expected a function");
        };

        assert!(function.parameters[0].default.is_none());
        assert!(function.parameters[1].default.is_some());
    }

    #[rstest]
    #[case("let x = 10")]
    #[case("var x = 10;")]
    #[case("int x = 10;")]
    #[case("let x: int = 10")]
    #[case("x: int = 10")]
    fn variable_declarations(#[case] input: &str) {
        let StatementKind::Variable(variable) = single_statement(input) else {
            panic!("expected a variable statement");
        };

        assert_eq!(variable.name.as_str(), "x");
        assert!(!variable.is_const);
        assert!(variable.expression.is_some());
    }

    #[rstest]
    #[case("const M = 5")]
    #[case("const int M = 5;")]
    fn const_declarations(#[case] input: &str) {
        let StatementKind::Variable(variable) = single_statement(input) else {
            panic!("expected a variable statement");
        };

        assert_eq!(variable.name.as_str(), "M");
        assert!(variable.is_const);
    }

    #[rstest]
    #[case("if a:\n    x\nelif b:\n    y\nelse:\n    z\n")]
    #[case("if (a) { x } else if (b) { y } else { z }")]
    #[case("if a {\n    x\n}\nelse if b {\n    y\n}\nelse {\n    z\n}")]
    fn if_chains(#[case] input: &str) {
        let StatementKind::If(statement) = single_statement(input) else {
            panic!("expected an if statement");
        };

        let else_body = statement.else_body.expect("outer else");
        assert_eq!(else_body.len(), 1);

        let StatementKind::If(nested) = &else_body[0].kind else {
            panic!("expected a nested if statement");
        };
        assert_eq!(nested.else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn nested_indented_blocks() {
        let tree = parse("if a:\n    if b:\n        x\n    y\nz\n");
        assert_eq!(tree.statements().len(), 2);

        let StatementKind::If(outer) = &tree.statements()[0].kind else {
            panic!("expected an if statement");
        };
        assert_eq!(outer.body.len(), 2);
        assert!(outer.else_body.is_none());
    }

    #[test]
    fn single_line_body_after_colon() {
        let StatementKind::While(statement) = single_statement("while x > 0: x -= 1") else {
            panic!("expected a while statement");
        };

        assert_eq!(statement.body.len(), 1);
    }

    #[test]
    fn c_style_for_is_a_while_loop() {
        let StatementKind::Block(block) = single_statement("for (int i = 0; i < 3; i++) { print(i); }") else {
            panic!("expected a block");
        };

        assert!(matches!(block[0].kind, StatementKind::Variable(..)));
        let StatementKind::While(statement) = &block[1].kind else {
            panic!("expected a while loop");
        };
        assert_eq!(render(&statement.condition), "(i < 3)");
        assert_eq!(statement.update.as_ref().map(|update| render(update)), Some("i++".to_string()));
    }

    #[rstest]
    #[case("for x in xs:\n    print(x)\n", &["x"])]
    #[case("for k, v in m { print(k) }", &["k", "v"])]
    #[case("for (let x of xs) { print(x) }", &["x"])]
    #[case("for (k, v) in m:\n    print(k)\n", &["k", "v"])]
    fn for_in_loops(#[case] input: &str, #[case] expected: &[&str]) {
        let StatementKind::For(statement) = single_statement(input) else {
            panic!("expected a for statement");
        };

        let iterators: Vec<&str> = statement.iterators.iter().map(|iterator| iterator.as_str()).collect();
        assert_eq!(iterators, expected);
        assert_eq!(statement.body.len(), 1);
    }

    #[test]
    fn python_class() {
        let input = "class Dog(Animal):\n    \"\"\"A dog.\"\"\"\n    legs = 4\n\n    def __init__(self, name):\n        self.name = name\n\n    def toString(self):\n        return self.name\n\n    @staticmethod\n    def create():\n        return Dog(\"rex\")\n";
        let StatementKind::Class(class) = single_statement(input) else {
            panic!("expected a class");
        };

        assert_eq!(class.name.as_str(), "Dog");
        assert_eq!(class.base.as_ref().map(|base| base.as_str()), Some("Animal"));
        assert_eq!(names(&class.methods), ["init", "__str__"]);
        assert_eq!(names(&class.static_methods), ["create"]);
        assert_eq!(class.static_fields.len(), 1);
        assert_eq!(class.static_fields[0].name.as_str(), "legs");
    }

    #[test]
    fn javascript_class() {
        let input = "class Dog extends Animal {\n    constructor(name) {\n        super(name);\n    }\n    static create() {\n        return new Dog(\"rex\");\n    }\n    bark() { print(\"woof\") }\n}";
        let StatementKind::Class(class) = single_statement(input) else {
            panic!("expected a class");
        };

        assert_eq!(class.base.as_ref().map(|base| base.as_str()), Some("Animal"));
        assert_eq!(names(&class.methods), ["init", "bark"]);
        assert_eq!(names(&class.static_methods), ["create"]);
    }

    #[test]
    fn cpp_class() {
        let input = "class Dog : public Animal {\npublic:\n    int age;\n    Dog(int a) { age = a; }\n    void bark() { cout << \"woof\" << endl; }\n};";
        let StatementKind::Class(class) = single_statement(input) else {
            panic!("expected a class");
        };

        assert_eq!(class.base.as_ref().map(|base| base.as_str()), Some("Animal"));
        assert_eq!(names(&class.methods), ["init", "bark"]);
    }

    #[test]
    fn print_keyword_arguments() {
        let StatementKind::Print(statement) = single_statement("print(a, b, sep=\"-\", end=\"\")") else {
            panic!("expected a print statement");
        };

        assert_eq!(statement.arguments.len(), 2);
        assert!(statement.separator.is_some());
        assert!(statement.end.is_some());
        assert!(statement.newline);
    }

    #[rstest]
    #[case("print \"a\", b", 2, true)]
    #[case("printf(\"%d\\n\", x);", 2, false)]
    #[case("print()", 0, true)]
    fn print_forms(#[case] input: &str, #[case] arguments: usize, #[case] newline: bool) {
        let StatementKind::Print(statement) = single_statement(input) else {
            panic!("expected a print statement");
        };

        assert_eq!(statement.arguments.len(), arguments);
        assert_eq!(statement.newline, newline);
    }

    #[test]
    fn cout_chain() {
        let StatementKind::Print(statement) = single_statement("cout << \"a\" << x + 1 << endl;") else {
            panic!("expected a print statement");
        };

        assert_eq!(statement.arguments.len(), 3);
        assert!(!statement.newline);
        assert_eq!(statement.arguments[2].to_string(), "\"\\n\"");
    }

    #[test]
    fn cin_chain() {
        let StatementKind::Input(statement) = single_statement("cin >> a >> b;") else {
            panic!("expected an input statement");
        };

        let targets: Vec<&str> = statement.targets.iter().map(|target| target.as_str()).collect();
        assert_eq!(targets, ["a", "b"]);
    }

    #[rstest]
    #[case("input(name)", false)]
    #[case("input(\"Name: \", name)", true)]
    #[case("scanf(\"%d\", &n);", true)]
    fn input_statements(#[case] input: &str, #[case] has_prompt: bool) {
        let StatementKind::Input(statement) = single_statement(input) else {
            panic!("expected an input statement");
        };

        assert_eq!(statement.targets.len(), 1);
        assert_eq!(statement.prompt.is_some(), has_prompt);
    }

    #[rstest]
    #[case("x = input(\"p\")")]
    #[case("input(\"Press enter\")")]
    #[case("n = int(input())")]
    fn input_expressions(#[case] input: &str) {
        assert!(single_statement(input).is_expression());
    }

    #[test]
    fn from_import_with_aliases() {
        let StatementKind::Import(statement) = single_statement("from math.extra import sqrt as root, pi") else {
            panic!("expected an import statement");
        };

        assert_eq!(statement.module.as_str(), "math.extra");
        assert_eq!(statement.names.len(), 2);
        assert_eq!(statement.names[0].alias.as_ref().map(|alias| alias.as_str()), Some("root"));
        assert!(!statement.star);
    }

    #[test]
    fn tuple_assignment() {
        assert_eq!(expression("a, b = b, a"), "(a, b = b, a)");
    }

    #[rstest]
    #[case("try:\n    x\nexcept ValueError as e:\n    y\nfinally:\n    z\n", Some("ValueError"), Some("e"), true)]
    #[case("try { x } catch (e) { y }", None, Some("e"), false)]
    #[case("try { x } catch (Exception e) { y }", Some("Exception"), Some("e"), false)]
    #[case("try:\n    x\nexcept:\n    y\n", None, None, false)]
    fn try_statements(#[case] input: &str, #[case] error_type: Option<&str>, #[case] binding: Option<&str>, #[case] has_finally: bool) {
        let StatementKind::Try(statement) = single_statement(input) else {
            panic!("expected a try statement");
        };

        let handler = &statement.handlers[0];
        assert_eq!(handler.error_type.as_ref().map(|ty| ty.as_str()), error_type);
        assert_eq!(handler.binding.as_ref().map(|binding| binding.as_str()), binding);
        assert_eq!(statement.finally.is_some(), has_finally);
    }

    #[test]
    fn map_literal_bare_keys_are_strings() {
        assert_eq!(expression("m = {name: 1, \"x\": 2, 3: 4}"), "(m = {\"name\": 1, \"x\": 2, 3: 4})");
    }

    #[test]
    fn map_literal_across_lines() {
        assert_eq!(expression("m = {\n    a: 1,\n    b: 2,\n}"), "(m = {\"a\": 1, \"b\": 2})");
    }

    #[test]
    fn list_comprehension() {
        assert_eq!(expression("[x * 2 for x in xs if x > 1]"), "[x * 2 for x in xs if x > 1]");
    }

    #[rstest]
    #[case("(a, b) => a + b", 2)]
    #[case("x => x * 2", 1)]
    #[case("() => { return 1 }", 0)]
    #[case("fn (a) { return a }", 1)]
    #[case("lambda a, b: a + b", 2)]
    fn lambdas(#[case] input: &str, #[case] parameters: usize) {
        let StatementKind::Expression(expression) = single_statement(input) else {
            panic!("expected an expression statement");
        };

        let Expression::Primary(PrimaryExpression::Lambda(function)) = expression.value() else {
            panic!("expected a lambda, got {expression:?}");
        };
        assert_eq!(function.parameters.len(), parameters);
    }

    #[test]
    fn template_string_parts() {
        assert_eq!(expression("`a ${b + 1} c`"), "`a ${b + 1} c`");
    }

    #[test]
    fn new_expression_calls_the_class() {
        assert_eq!(expression("new Dog(\"rex\")"), "Dog(\"rex\")");
        assert_eq!(expression("new Dog"), "Dog()");
    }

    #[test]
    fn super_call_forms() {
        assert_eq!(expression("super().speak()"), "super.speak()");
        assert_eq!(expression("super(name)"), "super(name)");
    }

    #[test]
    fn newline_ends_an_expression() {
        let tree = parse("a\n+b");
        assert_eq!(tree.statements().len(), 2);
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        assert_eq!(expression("f(1,\n  2)"), "f(1, 2)");
    }

    #[test]
    fn statement_lines() {
        let tree = parse("let x = 10\nlet y = 20\nprint(x + y)");
        let lines: Vec<usize> = tree.statements().iter().map(Statement::line).collect();
        assert_eq!(lines, [1, 2, 3]);
    }

    #[test]
    fn fibonacci_on_one_line() {
        let tree = parse("fn fib(n) { if n <= 1 { return n } return fib(n-1)+fib(n-2) } print(fib(10))");
        assert_eq!(tree.statements().len(), 2);
    }

    #[rstest]
    #[case("let = 5", "ExpectedIdentifier")]
    #[case("1 +", "UnexpectedEndOfFile")]
    #[case("5 = x", "InvalidAssignmentTarget")]
    #[case("scan x", "ReservedKeyword")]
    #[case("(1, 2", "UnexpectedEndOfFile")]
    #[case("`${1 2}`", "ResidualTokensInTemplateString")]
    #[case("try { x }", "UnexpectedEndOfFile")]
    #[case(")", "UnknownStartOfExpression")]
    #[case("\"abc", "Lexical")]
    #[case("f(1 2)", "ExpectedToken")]
    #[case("if x:\nprint(x)", "ExpectedToken")]
    #[case("x = 1 2", "ExpectedToken")]
    fn parse_errors(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_error(input).name(), expected);
    }

    #[test]
    fn error_reports_the_offending_position() {
        let error = parse_error("let a = 1\nlet b = )");
        let token = error.token().expect("error should carry a token");
        assert_eq!(token.line(), 2);
        assert_eq!(token.column(), 9);
    }
}

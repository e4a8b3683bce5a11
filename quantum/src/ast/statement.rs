// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::rc::Rc;

use crate::{Expression, FileRange, QString, Ranged};

#[derive(Debug, Clone)]
pub struct Statement {
    pub range: FileRange,
    pub kind: StatementKind,
}

impl Statement {
    /// One-based line on which this statement starts.
    #[must_use]
    pub fn line(&self) -> usize {
        self.range.start().line() + 1
    }
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Block(Vec<Statement>),
    Break,
    Continue,
    Class(ClassStatement),
    Expression(Ranged<Expression>),
    For(ForStatement),
    Function(Rc<FunctionStatement>),
    If(IfStatement),
    Import(ImportStatement),
    Input(InputStatement),
    Print(PrintStatement),
    Raise(RaiseStatement),
    Return(ReturnStatement),
    Try(TryStatement),
    Variable(VariableStatement),
    While(WhileStatement),
}

impl StatementKind {
    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(..))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Block(..) => "block",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Class(..) => "class",
            Self::Expression(..) => "expression",
            Self::For(..) => "for",
            Self::Function(..) => "function",
            Self::If(..) => "if",
            Self::Import(..) => "import",
            Self::Input(..) => "input",
            Self::Print(..) => "print",
            Self::Raise(..) => "raise",
            Self::Return(..) => "return",
            Self::Try(..) => "try",
            Self::Variable(..) => "variable",
            Self::While(..) => "while",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClassStatement {
    pub name: Ranged<QString>,
    pub base: Option<Ranged<QString>>,
    pub methods: Vec<Rc<FunctionStatement>>,
    pub static_methods: Vec<Rc<FunctionStatement>>,
    pub static_fields: Vec<StaticField>,
}

#[derive(Clone, Debug)]
pub struct StaticField {
    pub name: Ranged<QString>,
    pub value: Ranged<Expression>,
}

/// `for a in iterable` and `for a, b in iterable`.
#[derive(Clone, Debug)]
pub struct ForStatement {
    pub iterators: Vec<Ranged<QString>>,
    pub iterable: Ranged<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug)]
pub struct FunctionStatement {
    pub range: FileRange,
    pub name: Ranged<QString>,
    pub parameters: Vec<Parameter>,
    pub body: FunctionBody,
    pub return_type: Option<Ranged<QString>>,
}

impl FunctionStatement {
    /// Parameters that receive arguments; a leading `self`/`this` is bound
    /// implicitly for methods.
    #[must_use]
    pub fn explicit_parameters(&self) -> &[Parameter] {
        match self.parameters.first() {
            Some(first) if first.is_receiver() => &self.parameters[1..],
            _ => &self.parameters,
        }
    }
}

#[derive(Clone, Debug)]
pub enum FunctionBody {
    Block(Vec<Statement>),

    /// Arrow function shorthand: `x => x * 2`.
    Expression(Ranged<Expression>),
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: Ranged<QString>,
    pub type_annotation: Option<Ranged<QString>>,
    pub default: Option<Ranged<Expression>>,
}

impl Parameter {
    #[must_use]
    pub fn is_receiver(&self) -> bool {
        matches!(self.name.as_str(), "self" | "this")
    }
}

/// `elif` and `else if` chains are nested in `else_body`.
#[derive(Clone, Debug)]
pub struct IfStatement {
    pub condition: Ranged<Expression>,
    pub body: Vec<Statement>,
    pub else_body: Option<Vec<Statement>>,
}

#[derive(Clone, Debug)]
pub struct ImportStatement {
    /// Dotted module path, e.g. `a.b`.
    pub module: Ranged<QString>,
    pub alias: Option<Ranged<QString>>,

    /// Names selected with `from module import ...`.
    pub names: Vec<ImportName>,
    pub star: bool,
}

#[derive(Clone, Debug)]
pub struct ImportName {
    pub name: Ranged<QString>,
    pub alias: Option<Ranged<QString>>,
}

#[derive(Clone, Debug)]
pub struct InputStatement {
    /// Also the `scanf` format; its `%` specifier decides how the line converts.
    pub prompt: Option<Ranged<Expression>>,

    /// Every target reads one line; `cin >> a >> b` has two.
    pub targets: Vec<Ranged<QString>>,
}

#[derive(Clone, Debug)]
pub struct PrintStatement {
    pub arguments: Vec<Ranged<Expression>>,
    pub separator: Option<Ranged<Expression>>,
    pub end: Option<Ranged<Expression>>,
    pub newline: bool,
}

#[derive(Clone, Debug)]
pub struct RaiseStatement {
    pub expression: Option<Ranged<Expression>>,
}

#[derive(Clone, Debug)]
pub struct ReturnStatement {
    pub expression: Option<Ranged<Expression>>,
}

#[derive(Clone, Debug)]
pub struct TryStatement {
    pub body: Vec<Statement>,
    pub handlers: Vec<ExceptHandler>,
    pub finally: Option<Vec<Statement>>,
}

#[derive(Clone, Debug)]
pub struct ExceptHandler {
    pub error_type: Option<Ranged<QString>>,
    pub binding: Option<Ranged<QString>>,
    pub body: Vec<Statement>,
}

impl ExceptHandler {
    /// `Exception` and `Error` catch every error kind.
    #[must_use]
    pub fn catches_everything(&self) -> bool {
        match &self.error_type {
            None => true,
            Some(ty) => matches!(ty.as_str(), "Exception" | "Error"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VariableStatement {
    pub name: Ranged<QString>,
    pub is_const: bool,
    pub type_annotation: Option<Ranged<QString>>,
    pub expression: Option<Ranged<Expression>>,
}

/// Also the desugared form of a C-style `for (init; condition; update)`.
#[derive(Clone, Debug)]
pub struct WhileStatement {
    pub condition: Ranged<Expression>,
    pub body: Vec<Statement>,
    pub update: Option<Ranged<Expression>>,
}

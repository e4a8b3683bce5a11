// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{fmt::{Debug, Display, Write}, rc::Rc};

use crate::{FunctionStatement, QString, Ranged};

#[derive(Clone, Debug)]
pub enum PrimaryExpression {
    Nil,
    Boolean(bool),
    Number(f64),
    StringLiteral(QString),
    TemplateString {
        parts: Vec<TemplateStringExpressionPart>,
    },
    Reference(Ranged<QString>),
    ReferenceThis,

    /// `super`, and `super()` when it is followed by a member access.
    Super,

    Array(Vec<Ranged<Expression>>),
    Map(Vec<MapEntry>),
    Tuple(Vec<Ranged<Expression>>),
    Lambda(Rc<FunctionStatement>),
    ListComprehension(Box<ListComprehension>),
    Parenthesized(Box<Ranged<Expression>>),

    /// `input(prompt)` used as a value.
    Input {
        prompt: Option<Box<Ranged<Expression>>>,
    },
}

impl Display for PrimaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Number(n) => Display::fmt(n, f),
            Self::StringLiteral(str) => f.write_fmt(format_args!("{:?}", str.as_str())),
            Self::TemplateString { parts } => {
                f.write_char('`')?;
                for part in parts {
                    match part {
                        TemplateStringExpressionPart::String(str) => f.write_str(str)?,
                        TemplateStringExpressionPart::Expression(expr) => {
                            f.write_fmt(format_args!("${{{}}}", expr.value()))?;
                        }
                    }
                }
                f.write_char('`')
            }
            Self::Reference(name) => f.write_str(name.as_str()),
            Self::ReferenceThis => f.write_str("this"),
            Self::Super => f.write_str("super"),
            Self::Array(elements) => {
                f.write_char('[')?;
                write_list(f, elements)?;
                f.write_char(']')
            }
            Self::Map(entries) => {
                f.write_char('{')?;
                for (idx, entry) in entries.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    f.write_fmt(format_args!("{}: {}", entry.key.value(), entry.value.value()))?;
                }
                f.write_char('}')
            }
            Self::Tuple(elements) => write_list(f, elements),
            Self::Lambda(function) => f.write_fmt(format_args!("fn {}(...)", function.name.value())),
            Self::ListComprehension(comprehension) => {
                f.write_fmt(format_args!("[{} for ", comprehension.element.value()))?;
                for (idx, name) in comprehension.iterators.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(name)?;
                }
                f.write_fmt(format_args!(" in {}", comprehension.iterable.value()))?;
                if let Some(condition) = &comprehension.condition {
                    f.write_fmt(format_args!(" if {}", condition.value()))?;
                }
                f.write_char(']')
            }
            Self::Parenthesized(expr) => {
                f.write_char('(')?;
                Display::fmt(expr.value(), f)?;
                f.write_char(')')
            }
            Self::Input { .. } => f.write_str("input(...)"),
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, elements: &[Ranged<Expression>]) -> std::fmt::Result {
    for (idx, element) in elements.iter().enumerate() {
        if idx != 0 {
            f.write_str(", ")?;
        }

        Display::fmt(element.value(), f)?;
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub enum TemplateStringExpressionPart {
    String(QString),
    Expression(Ranged<Expression>),
}

#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: Ranged<Expression>,
    pub value: Ranged<Expression>,
}

/// `[element for a, b in iterable if condition]`
#[derive(Debug, Clone)]
pub struct ListComprehension {
    pub element: Ranged<Expression>,
    pub iterators: Vec<Ranged<QString>>,
    pub iterable: Ranged<Expression>,
    pub condition: Option<Ranged<Expression>>,
}

#[derive(Clone, Debug)]
pub enum Expression {
    Assign(AssignExpression),
    BiExpression(BiExpression),
    Postfix(PostfixExpression),
    Primary(PrimaryExpression),
    Ternary(TernaryExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
}

impl Expression {
    #[must_use]
    pub fn as_identifier(&self) -> Option<&QString> {
        match self {
            Self::Primary(PrimaryExpression::Reference(ident)) => Some(ident.value()),
            _ => None,
        }
    }

    /// Whether this expression may appear on the left side of `=`.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        match self {
            Self::Primary(PrimaryExpression::Reference(..)) => true,
            Self::Primary(PrimaryExpression::Tuple(elements)) => {
                elements.iter().all(|element| element.is_assignable())
            }
            Self::Postfix(postfix) => matches!(
                postfix.kind.value(),
                PostfixExpressionKind::Member(..) | PostfixExpressionKind::Subscript(..)
            ),
            _ => false,
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assign(expr) => Display::fmt(expr, f),
            Self::BiExpression(expr) => Display::fmt(expr, f),
            Self::Postfix(expr) => Display::fmt(expr, f),
            Self::Primary(expr) => Display::fmt(expr, f),
            Self::Ternary(expr) => Display::fmt(expr, f),
            Self::Unary(expr) => Display::fmt(expr, f),
            Self::Update(expr) => Display::fmt(expr, f),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AssignExpression {
    pub kind: Ranged<AssignKind>,
    pub destination: Box<Ranged<Expression>>,
    pub source: Box<Ranged<Expression>>,
}

impl Display for AssignExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.destination.value(), f)?;
        f.write_fmt(format_args!(" {} ", self.kind.value().as_str()))?;
        Display::fmt(self.source.value(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignKind {
    Regular,
    Math(MathOperator),
}

impl AssignKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "=",
            Self::Math(MathOperator::Add) => "+=",
            Self::Math(MathOperator::Subtract) => "-=",
            Self::Math(MathOperator::Multiply) => "*=",
            Self::Math(MathOperator::Divide) => "/=",
            Self::Math(MathOperator::Modulo) => "%=",
            Self::Math(MathOperator::FloorDivide) => "//=",
            Self::Math(MathOperator::Power) => "**=",
            Self::Math(MathOperator::BitwiseAnd) => "&=",
            Self::Math(MathOperator::BitwiseOr) => "|=",
            Self::Math(MathOperator::BitwiseXor) => "^=",
            Self::Math(MathOperator::LeftShift) => "<<=",
            Self::Math(MathOperator::RightShift) => ">>=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostfixExpression {
    pub lhs: Box<Ranged<Expression>>,
    pub kind: Ranged<PostfixExpressionKind>,
}

impl Display for PostfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.lhs.value(), f)?;

        match self.kind.value() {
            PostfixExpressionKind::Call(call) => {
                Display::fmt(call, f)
            }

            PostfixExpressionKind::Member(member) => {
                f.write_char('.')?;
                f.write_str(member.as_str())
            }

            PostfixExpressionKind::Subscript(expr) => {
                f.write_char('[')?;
                Display::fmt(expr.value(), f)?;
                f.write_char(']')
            }

            PostfixExpressionKind::Slice(slice) => {
                f.write_char('[')?;
                if let Some(start) = &slice.start {
                    Display::fmt(start.value(), f)?;
                }
                f.write_char(':')?;
                if let Some(stop) = &slice.stop {
                    Display::fmt(stop.value(), f)?;
                }
                if let Some(step) = &slice.step {
                    f.write_char(':')?;
                    Display::fmt(step.value(), f)?;
                }
                f.write_char(']')
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum PostfixExpressionKind {
    Call(FunctionCallExpression),
    Member(Ranged<QString>),
    Subscript(Box<Ranged<Expression>>),
    Slice(SliceExpression),
}

/// `[start:stop:step]`, every part optional.
#[derive(Debug, Clone)]
pub struct SliceExpression {
    pub start: Option<Box<Ranged<Expression>>>,
    pub stop: Option<Box<Ranged<Expression>>>,
    pub step: Option<Box<Ranged<Expression>>>,
}

#[derive(Clone, Debug)]
pub struct FunctionCallExpression {
    pub arguments: Vec<Ranged<Expression>>,
}

impl Display for FunctionCallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('(')?;
        write_list(f, &self.arguments)?;
        f.write_char(')')
    }
}

#[derive(Debug, Clone)]
pub struct TernaryExpression {
    pub condition: Box<Ranged<Expression>>,
    pub then: Box<Ranged<Expression>>,
    pub otherwise: Box<Ranged<Expression>>,
}

impl Display for TernaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} ? {} : {}", self.condition.value(), self.then.value(), self.otherwise.value()))
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub kind: Ranged<UnaryExpressionKind>,
    pub rhs: Box<Ranged<Expression>>,
}

impl Display for UnaryExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.value().as_str())?;
        Display::fmt(self.rhs.value(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryExpressionKind {
    Negate,
    Plus,
    Not,
    BitwiseNot,
}

impl UnaryExpressionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitwiseNot => "~",
        }
    }
}

/// `++x`, `x++`, `--x` and `x--`.
#[derive(Debug, Clone)]
pub struct UpdateExpression {
    pub target: Box<Ranged<Expression>>,
    pub increment: bool,
    pub prefix: bool,
}

impl Display for UpdateExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = if self.increment { "++" } else { "--" };
        if self.prefix {
            f.write_fmt(format_args!("{operator}{}", self.target.value()))
        } else {
            f.write_fmt(format_args!("{}{operator}", self.target.value()))
        }
    }
}

#[derive(Clone, Debug)]
pub struct BiExpression {
    pub operator: Ranged<BiOperator>,
    pub lhs: Box<Ranged<Expression>>,
    pub rhs: Box<Ranged<Expression>>,
}

impl Display for BiExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.lhs.value(), f)?;

        f.write_char(' ')?;
        f.write_str(self.operator.as_str())?;
        f.write_char(' ')?;

        Display::fmt(self.rhs.value(), f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BiOperator {
    Comparison(Comparison),
    Logical(LogicalOperator),
    Math(MathOperator),
    Membership { negated: bool },
}

impl BiOperator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comparison(comp) => comp.as_str(),
            Self::Logical(logical) => logical.as_str(),
            Self::Math(math) => math.as_str(),
            Self::Membership { negated: false } => "in",
            Self::Membership { negated: true } => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
}

impl MathOperator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::FloorDivide => "//",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }
}

impl From<MathOperator> for BiOperator {
    fn from(value: MathOperator) -> Self {
        Self::Math(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equality,
    Inequality,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl From<Comparison> for BiOperator {
    fn from(value: Comparison) -> Self {
        Self::Comparison(value)
    }
}

impl Comparison {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equality => "==",
            Self::Inequality => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl From<LogicalOperator> for BiOperator {
    fn from(value: LogicalOperator) -> Self {
        Self::Logical(value)
    }
}

// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod expression;
mod statement;

pub use self::{
    expression::{
        AssignExpression,
        AssignKind,
        BiExpression,
        BiOperator,
        Comparison,
        Expression,
        FunctionCallExpression,
        ListComprehension,
        LogicalOperator,
        MapEntry,
        MathOperator,
        PostfixExpression,
        PostfixExpressionKind,
        PrimaryExpression,
        SliceExpression,
        TemplateStringExpressionPart,
        TernaryExpression,
        UnaryExpression,
        UnaryExpressionKind,
        UpdateExpression,
    },
    statement::{
        ClassStatement,
        ExceptHandler,
        ForStatement,
        FunctionBody,
        FunctionStatement,
        IfStatement,
        ImportName,
        ImportStatement,
        InputStatement,
        Parameter,
        PrintStatement,
        RaiseStatement,
        ReturnStatement,
        Statement,
        StatementKind,
        StaticField,
        TryStatement,
        VariableStatement,
        WhileStatement,
    },
};

// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::rc::Rc;

use quantum::*;

use crate::{
    format::format_printf,
    operators,
    Builtin,
    Debugger,
    Function,
    Host,
    Interpreter,
    Runtime,
    RuntimeError,
    Value,
    ValueMap,
};

impl<H, D> Interpreter<H, D>
        where H: Host, D: Debugger {
    /// Evaluates an expression. Errors carry the range of the innermost
    /// expression that produced them.
    pub fn evaluate(&mut self, expression: &Ranged<Expression>) -> Result<Value, RuntimeError> {
        let result = match expression.value() {
            Expression::Assign(expr) => self.evaluate_assign_expression(expr),
            Expression::BiExpression(expr) => self.evaluate_bi_expression(expr),
            Expression::Postfix(expr) => self.evaluate_postfix_expression(expr),
            Expression::Primary(expr) => self.evaluate_primary_expression(expr),
            Expression::Ternary(expr) => {
                if self.evaluate(&expr.condition)?.is_truthy() {
                    self.evaluate(&expr.then)
                } else {
                    self.evaluate(&expr.otherwise)
                }
            }
            Expression::Unary(expr) => self.evaluate_unary_expression(expr),
            Expression::Update(expr) => self.evaluate_update_expression(expr),
        };

        result.map_err(|e| e.or_range(expression.range()))
    }

    fn evaluate_primary_expression(&mut self, expression: &PrimaryExpression) -> Result<Value, RuntimeError> {
        match expression {
            PrimaryExpression::Nil => Ok(Value::Nil),
            PrimaryExpression::Boolean(boolean) => Ok(Value::Bool(*boolean)),
            PrimaryExpression::Number(number) => Ok(Value::Number(*number)),
            PrimaryExpression::StringLiteral(str) => Ok(Value::String(str.clone())),

            PrimaryExpression::TemplateString { parts } => {
                let mut string = String::new();

                for part in parts {
                    match part {
                        TemplateStringExpressionPart::String(str) => {
                            string += str;
                        }

                        TemplateStringExpressionPart::Expression(expression) => {
                            let value = self.evaluate(expression)?;
                            string += &self.display(&value)?;
                        }
                    }
                }

                Ok(string.into())
            }

            PrimaryExpression::Reference(reference) => {
                self.scope.get(reference.value()).map_err(|e| e.or_range(reference.range()))
            }

            PrimaryExpression::ReferenceThis => {
                self.scope.find("this")
                    .ok_or_else(|| RuntimeError::name_error("`this` used outside of a method"))
            }

            PrimaryExpression::Super => {
                Err(RuntimeError::runtime("`super` must be called or followed by a member"))
            }

            PrimaryExpression::Array(elements) | PrimaryExpression::Tuple(elements) => {
                Ok(Value::array(self.evaluate_arguments(elements)?))
            }

            PrimaryExpression::Map(entries) => {
                let mut map = ValueMap::new();
                for entry in entries {
                    let key = self.evaluate(&entry.key)?.to_key();
                    let value = self.evaluate(&entry.value)?;
                    map.insert(key, value);
                }
                Ok(Value::map(map))
            }

            PrimaryExpression::Lambda(declaration) => {
                Ok(Value::Function(Rc::new(Function {
                    declaration: Rc::clone(declaration),
                    closure: self.scope.clone(),
                    binding: None,
                })))
            }

            PrimaryExpression::ListComprehension(comprehension) => {
                self.evaluate_list_comprehension(comprehension)
            }

            PrimaryExpression::Parenthesized(expression) => self.evaluate(expression),

            PrimaryExpression::Input { prompt } => {
                if let Some(prompt) = prompt {
                    let prompt = self.evaluate(prompt)?;
                    let text = self.display(&prompt)?;
                    self.host.emit(&text);
                }

                Ok(self.host.read_line().map(Value::from).unwrap_or_default())
            }
        }
    }

    fn evaluate_list_comprehension(&mut self, comprehension: &ListComprehension) -> Result<Value, RuntimeError> {
        let iterable = self.evaluate(&comprehension.iterable)?;
        let elements = Self::iterate(&iterable, comprehension.iterators.len() > 1)
            .map_err(|e| e.or_range(comprehension.iterable.range()))?;

        let outer = self.scope.clone();
        let mut values = Vec::new();

        for element in elements {
            let scope = outer.push();
            Self::bind_iterators(&scope, &comprehension.iterators, element)?;
            self.scope = scope;

            let value = self.evaluate_comprehension_element(comprehension);
            self.scope = outer.clone();

            if let Some(value) = value? {
                values.push(value);
            }
        }

        Ok(Value::array(values))
    }

    fn evaluate_comprehension_element(&mut self, comprehension: &ListComprehension) -> Result<Option<Value>, RuntimeError> {
        if let Some(condition) = &comprehension.condition {
            if !self.evaluate(condition)?.is_truthy() {
                return Ok(None);
            }
        }

        self.evaluate(&comprehension.element).map(Some)
    }

    fn evaluate_assign_expression(&mut self, expression: &AssignExpression) -> Result<Value, RuntimeError> {
        let value = match expression.kind.value() {
            AssignKind::Regular => self.evaluate(&expression.source)?,
            AssignKind::Math(operator) => {
                let current = self.evaluate(&expression.destination)?;
                let rhs = self.evaluate(&expression.source)?;
                self.evaluate_math(*operator, current, rhs)
                    .map_err(|e| e.or_range(expression.kind.range()))?
            }
        };

        self.assign(&expression.destination, value.clone())?;
        Ok(value)
    }

    fn assign(&mut self, destination: &Ranged<Expression>, value: Value) -> Result<(), RuntimeError> {
        match destination.value() {
            Expression::Primary(PrimaryExpression::Reference(name)) => {
                self.scope.assign(name.value(), value).map_err(|e| e.or_range(name.range()))
            }

            Expression::Primary(PrimaryExpression::Parenthesized(inner)) => self.assign(inner, value),

            Expression::Primary(PrimaryExpression::Tuple(targets)) => {
                let values = match &value {
                    Value::Array(values) if values.borrow().len() == targets.len() => values.borrow().clone(),
                    _ => {
                        return Err(RuntimeError::type_error(format!(
                            "cannot unpack {} into {} targets",
                            value.type_name(),
                            targets.len(),
                        )).or_range(destination.range()));
                    }
                };

                for (target, value) in targets.iter().zip(values) {
                    self.assign(target, value)?;
                }
                Ok(())
            }

            Expression::Postfix(postfix) => match postfix.kind.value() {
                PostfixExpressionKind::Member(member) => {
                    let object = self.evaluate(&postfix.lhs)?;
                    self.set_member(&object, member, value).map_err(|e| e.or_range(member.range()))
                }

                PostfixExpressionKind::Subscript(index) => {
                    let object = self.evaluate(&postfix.lhs)?;
                    let index = self.evaluate(index)?;
                    operators::set_index(&object, &index, value).map_err(|e| e.or_range(destination.range()))
                }

                _ => Err(RuntimeError::runtime("cannot assign to this expression").or_range(destination.range())),
            },

            _ => Err(RuntimeError::runtime("cannot assign to this expression").or_range(destination.range())),
        }
    }

    fn evaluate_update_expression(&mut self, expression: &UpdateExpression) -> Result<Value, RuntimeError> {
        let current = self.evaluate(&expression.target)?.as_number()?;
        let updated = if expression.increment { current + 1.0 } else { current - 1.0 };

        self.assign(&expression.target, Value::Number(updated))?;
        Ok(Value::Number(if expression.prefix { updated } else { current }))
    }

    fn evaluate_unary_expression(&mut self, expression: &UnaryExpression) -> Result<Value, RuntimeError> {
        let rhs = self.evaluate(&expression.rhs)?;

        match expression.kind.value() {
            UnaryExpressionKind::Negate => Ok(Value::Number(-rhs.as_number()?)),
            UnaryExpressionKind::Plus => Ok(Value::Number(rhs.as_number()?)),
            UnaryExpressionKind::Not => Ok(Value::Bool(!rhs.is_truthy())),
            UnaryExpressionKind::BitwiseNot => Ok(Value::Number(!rhs.as_integer()? as f64)),
        }
    }

    fn evaluate_bi_expression(&mut self, expression: &BiExpression) -> Result<Value, RuntimeError> {
        let lhs = self.evaluate(&expression.lhs)?;

        if let BiOperator::Logical(operator) = *expression.operator {
            let short_circuits = match operator {
                LogicalOperator::And => !lhs.is_truthy(),
                LogicalOperator::Or => lhs.is_truthy(),
            };

            return if short_circuits { Ok(lhs) } else { self.evaluate(&expression.rhs) };
        }

        let rhs = self.evaluate(&expression.rhs)?;

        let result = match *expression.operator {
            BiOperator::Comparison(comparison) => Self::compare(comparison, &lhs, &rhs),
            BiOperator::Math(operator) => self.evaluate_math(operator, lhs, rhs),
            BiOperator::Membership { negated } => {
                operators::contains(&rhs, &lhs).map(|found| Value::Bool(found != negated))
            }
            BiOperator::Logical(..) => Ok(rhs),
        };

        result.map_err(|e| e.or_range(expression.operator.range()))
    }

    fn compare(comparison: Comparison, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
        let result = match comparison {
            Comparison::Equality => lhs == rhs,
            Comparison::Inequality => lhs != rhs,
            Comparison::LessThan => lhs.compare(rhs)?.is_lt(),
            Comparison::LessThanOrEqual => lhs.compare(rhs)?.is_le(),
            Comparison::GreaterThan => lhs.compare(rhs)?.is_gt(),
            Comparison::GreaterThanOrEqual => lhs.compare(rhs)?.is_ge(),
        };

        Ok(Value::Bool(result))
    }

    /// Arithmetic, with the two operations that render values: `+` on
    /// strings and `%` formatting.
    pub(crate) fn evaluate_math(&mut self, operator: MathOperator, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match (operator, &lhs, &rhs) {
            (MathOperator::Add, Value::String(..), _) | (MathOperator::Add, _, Value::String(..)) => {
                let text = self.display(&lhs)? + &self.display(&rhs)?;
                Ok(text.into())
            }

            (MathOperator::Modulo, Value::String(format), arguments) => {
                let arguments = match arguments {
                    Value::Array(values) => values.borrow().clone(),
                    other => vec![other.clone()],
                };
                let text = format_printf(format, &arguments, &mut |value| self.display(value))?;
                Ok(text.into())
            }

            _ => operators::arithmetic(operator, &lhs, &rhs),
        }
    }

    fn evaluate_postfix_expression(&mut self, expression: &PostfixExpression) -> Result<Value, RuntimeError> {
        if let Expression::Primary(PrimaryExpression::Super) = expression.lhs.value() {
            return self.evaluate_super(expression);
        }

        let lhs = self.evaluate(&expression.lhs)?;

        match expression.kind.value() {
            PostfixExpressionKind::Call(call) => {
                let arguments = self.evaluate_arguments(&call.arguments)?;
                self.call_value(&lhs, arguments, expression.kind.range())
            }

            PostfixExpressionKind::Member(member) => {
                self.get_member(&lhs, member).map_err(|e| e.or_range(member.range()))
            }

            PostfixExpressionKind::Subscript(index) => {
                let index = self.evaluate(index)?;
                operators::index(&lhs, &index)
            }

            PostfixExpressionKind::Slice(slice) => {
                let start = self.evaluate_slice_bound(slice.start.as_deref())?;
                let stop = self.evaluate_slice_bound(slice.stop.as_deref())?;
                let step = self.evaluate_slice_bound(slice.step.as_deref())?;
                operators::slice(&lhs, start, stop, step)
            }
        }
    }

    fn evaluate_slice_bound(&mut self, bound: Option<&Ranged<Expression>>) -> Result<Option<i64>, RuntimeError> {
        let Some(bound) = bound else {
            return Ok(None);
        };

        match self.evaluate(bound)? {
            Value::Nil => Ok(None),
            value => value.as_integer().map(Some).map_err(|e| e.or_range(bound.range())),
        }
    }

    /// `super(args)` runs the base initializer on the current instance;
    /// `super.name` finds `name` starting at the base class.
    fn evaluate_super(&mut self, expression: &PostfixExpression) -> Result<Value, RuntimeError> {
        let binding = self.frames.iter().rev()
            .flatten()
            .next()
            .cloned()
            .ok_or_else(|| RuntimeError::runtime("`super` used outside of a method"))?;

        let base = binding.class.base.clone().ok_or_else(|| {
            RuntimeError::runtime(format!("class `{}` has no base class", binding.class.name))
        })?;

        match expression.kind.value() {
            PostfixExpressionKind::Call(call) => {
                let arguments = self.evaluate_arguments(&call.arguments)?;
                self.initialize(&base, binding.this, arguments, expression.kind.range())?;
                Ok(Value::Nil)
            }

            PostfixExpressionKind::Member(member) => {
                let (method, defining_class) = base.find_method(member).ok_or_else(|| {
                    RuntimeError::name_error(format!("`{}` has no method `{}`", base.name, member.value()))
                        .or_range(member.range())
                })?;
                Ok(defining_class.bind(method, binding.this))
            }

            _ => Err(RuntimeError::runtime("`super` must be called or followed by a member")),
        }
    }

    /// Fields shadow methods, which shadow static members.
    pub(crate) fn get_member(&mut self, object: &Value, name: &QString) -> Result<Value, RuntimeError> {
        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.fields.borrow().get(name) {
                    return Ok(value.clone());
                }

                if let Some((method, defining_class)) = instance.class.find_method(name) {
                    return Ok(defining_class.bind(method, object.clone()));
                }

                if let Some(value) = instance.class.find_static_field(name) {
                    return Ok(value);
                }

                if let Some(method) = instance.class.find_static_method(name) {
                    return Ok(instance.class.unbound(method));
                }

                Err(RuntimeError::name_error(format!("`{}` has no member `{name}`", instance.class.name)))
            }

            Value::Class(class) => {
                if let Some(value) = class.find_static_field(name) {
                    return Ok(value);
                }

                if let Some(method) = class.find_static_method(name) {
                    return Ok(class.unbound(method));
                }

                if let Some((method, defining_class)) = class.find_method(name) {
                    return Ok(defining_class.unbound(method));
                }

                Err(RuntimeError::name_error(format!("class `{}` has no member `{name}`", class.name)))
            }

            Value::Map(map) => {
                if let Some(value) = map.borrow().get(name) {
                    return Ok(value.clone());
                }

                Ok(Builtin::method(object, name).unwrap_or_default())
            }

            Value::String(str) if name == "length" => Ok(str.chars().count().into()),
            Value::Array(array) if name == "length" => Ok(array.borrow().len().into()),

            Value::String(..) | Value::Array(..) => Builtin::method(object, name).ok_or_else(|| {
                RuntimeError::name_error(format!("{} has no member `{name}`", object.type_name()))
            }),

            other => Err(RuntimeError::type_error(format!("cannot read member `{name}` of {}", other.type_name()))),
        }
    }

    fn set_member(&mut self, object: &Value, name: &QString, value: Value) -> Result<(), RuntimeError> {
        match object {
            Value::Instance(instance) => {
                instance.fields.borrow_mut().insert(name.clone(), value);
            }

            Value::Class(class) => {
                class.static_fields.borrow_mut().insert(name.clone(), value);
            }

            Value::Map(map) => {
                map.borrow_mut().insert(name.clone(), value);
            }

            other => {
                return Err(RuntimeError::type_error(format!("cannot set member `{name}` on {}", other.type_name())));
            }
        }

        Ok(())
    }
}

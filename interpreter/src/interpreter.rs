// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{cell::RefCell, collections::HashMap, mem::replace, rc::Rc};

use log::{debug, warn};
use quantum::*;

use crate::{
    format::{format_printf, has_format_specifier},
    signal::StatementResult,
    value::Visit,
    Class,
    Debugger,
    DebuggerFunction,
    DebuggerFunctionType,
    ErrorKind,
    Function,
    Host,
    Instance,
    MethodBinding,
    RuntimeError,
    Scope,
    Signal,
    Value,
    ValueMap,
};

/// What natives may ask of the interpreter that runs them.
pub trait Runtime {
    fn call(&mut self, callee: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeError>;

    /// Display text of a value, honouring `__str__` on instances.
    fn display(&mut self, value: &Value) -> Result<String, RuntimeError>;

    fn emit(&mut self, text: &str);
}

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

pub struct Interpreter<H, D = ()>
        where H: Host, D: Debugger {
    pub(crate) host: H,
    pub(crate) debugger: D,
    pub(crate) globals: Scope,
    pub(crate) scope: Scope,

    /// The method binding of every active call, innermost last. `super`
    /// resolves against the last one.
    pub(crate) frames: Vec<Option<MethodBinding>>,
    max_call_depth: usize,
    modules: HashMap<QString, Value>,

    /// Errors whose `except` handler is running, for a bare `raise`.
    handled_errors: Vec<RuntimeError>,

    /// Start of the statement being executed; natives calling back into the
    /// interpreter report this as their caller.
    pub(crate) location: FileRange,
}

impl<H, D> Interpreter<H, D>
        where H: Host, D: Debugger {
    /// An interpreter with empty globals. The host installs its natives,
    /// for example with [`crate::Builtin::install`].
    pub fn new(host: H, debugger: D) -> Self {
        let globals = Scope::new_top_level();
        Self {
            host,
            debugger,
            scope: globals.clone(),
            globals,
            frames: Vec::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            modules: HashMap::new(),
            handled_errors: Vec::new(),
            location: FileRange::default(),
        }
    }

    #[must_use]
    pub fn with_max_call_depth(self, max_call_depth: usize) -> Self {
        Self {
            max_call_depth,
            ..self
        }
    }

    #[must_use]
    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Runs a whole source unit in the current scope. Functions are declared
    /// before anything runs, so they may be called above their definition.
    ///
    /// Returns the value of the last expression statement, which is what a
    /// REPL echoes.
    pub fn execute_tree(&mut self, tree: &ParseTree) -> Result<Value, RuntimeError> {
        let result = self.execute_unit(tree);

        if let Err(error) = &result {
            self.debugger.on_runtime_error(error);
        }

        result
    }

    fn execute_unit(&mut self, tree: &ParseTree) -> Result<Value, RuntimeError> {
        for statement in tree.functions() {
            self.execute_statement(statement).map_err(Signal::into_error)?;
        }

        let mut last_value = Value::Nil;
        for statement in tree.statements() {
            if let StatementKind::Function(..) = statement.kind {
                continue;
            }

            if let StatementKind::Expression(expression) = &statement.kind {
                self.debugger.on_statement(statement);
                self.location = statement.range;

                let value = self.evaluate(expression)?;
                last_value = match expression.value() {
                    Expression::Assign(..) | Expression::Update(..) => Value::Nil,
                    _ => value,
                };
                continue;
            }

            match self.execute_statement(statement) {
                Ok(()) => last_value = Value::Nil,
                Err(Signal::Return(value)) => return Ok(value),
                Err(signal) => return Err(signal.into_error()),
            }
        }

        Ok(last_value)
    }

    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> StatementResult {
        self.debugger.on_statement(statement);
        self.location = statement.range;

        let result = match &statement.kind {
            StatementKind::Block(statements) => self.execute_block(statements),
            StatementKind::Break => Err(Signal::Break),
            StatementKind::Continue => Err(Signal::Continue),
            StatementKind::Class(class) => self.execute_class_statement(class).map_err(Signal::from),

            StatementKind::Expression(expression) => {
                self.evaluate(expression)?;
                Ok(())
            }

            StatementKind::For(statement) => self.execute_for_statement(statement),

            StatementKind::Function(function) => {
                let value = Value::Function(Rc::new(Function {
                    declaration: Rc::clone(function),
                    closure: self.scope.clone(),
                    binding: None,
                }));
                self.scope.define(function.name.value().clone(), value, false)?;
                Ok(())
            }

            StatementKind::If(statement) => self.execute_if_statement(statement),
            StatementKind::Import(statement) => self.execute_import_statement(statement).map_err(Signal::from),
            StatementKind::Input(statement) => self.execute_input_statement(statement).map_err(Signal::from),
            StatementKind::Print(statement) => self.execute_print_statement(statement).map_err(Signal::from),
            StatementKind::Raise(statement) => Err(Signal::Error(self.execute_raise_statement(statement))),

            StatementKind::Return(statement) => {
                let value = match &statement.expression {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                Err(Signal::Return(value))
            }

            StatementKind::Try(statement) => self.execute_try_statement(statement),

            StatementKind::Variable(variable) => {
                let value = match &variable.expression {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                self.scope.define(variable.name.value().clone(), value, variable.is_const)?;
                Ok(())
            }

            StatementKind::While(statement) => self.execute_while_statement(statement),
        };

        match result {
            Err(Signal::Error(error)) => Err(Signal::Error(error.or_range(statement.range))),
            other => other,
        }
    }

    fn execute_statements(&mut self, statements: &[Statement]) -> StatementResult {
        for statement in statements {
            self.execute_statement(statement)?;
        }

        Ok(())
    }

    /// Runs `statements` in a fresh child scope.
    pub(crate) fn execute_block(&mut self, statements: &[Statement]) -> StatementResult {
        let scope = self.scope.push();
        self.execute_in_scope(scope, statements)
    }

    fn execute_in_scope(&mut self, scope: Scope, statements: &[Statement]) -> StatementResult {
        let previous = replace(&mut self.scope, scope);
        let result = self.execute_statements(statements);
        self.scope = previous;
        result
    }

    fn execute_if_statement(&mut self, statement: &IfStatement) -> StatementResult {
        if self.evaluate(&statement.condition)?.is_truthy() {
            return self.execute_block(&statement.body);
        }

        match &statement.else_body {
            Some(else_body) => self.execute_block(else_body),
            None => Ok(()),
        }
    }

    fn execute_while_statement(&mut self, statement: &WhileStatement) -> StatementResult {
        while self.evaluate(&statement.condition)?.is_truthy() {
            match self.execute_block(&statement.body) {
                Ok(()) | Err(Signal::Continue) => (),
                Err(Signal::Break) => break,
                Err(signal) => return Err(signal),
            }

            if let Some(update) = &statement.update {
                self.evaluate(update)?;
            }
        }

        Ok(())
    }

    fn execute_for_statement(&mut self, statement: &ForStatement) -> StatementResult {
        let iterable = self.evaluate(&statement.iterable)?;
        let elements = Self::iterate(&iterable, statement.iterators.len() > 1)
            .map_err(|e| e.or_range(statement.iterable.range()))?;

        for element in elements {
            let scope = self.scope.push();
            Self::bind_iterators(&scope, &statement.iterators, element)?;

            match self.execute_in_scope(scope, &statement.body) {
                Ok(()) | Err(Signal::Continue) => (),
                Err(Signal::Break) => break,
                Err(signal) => return Err(signal),
            }
        }

        Ok(())
    }

    /// The elements a `for` loop visits. Maps yield their keys, or
    /// `[key, value]` pairs when the loop unpacks them.
    pub(crate) fn iterate(iterable: &Value, pairs: bool) -> Result<Vec<Value>, RuntimeError> {
        match iterable {
            Value::Array(array) => Ok(array.borrow().clone()),
            Value::String(str) => Ok(str.chars().map(|c| Value::string(c.to_string())).collect()),
            Value::Map(map) if pairs => Ok(map.borrow()
                .iter()
                .map(|(key, value)| Value::array(vec![Value::String(key.clone()), value.clone()]))
                .collect()),
            Value::Map(map) => Ok(map.borrow().keys().cloned().map(Value::String).collect()),
            other => Err(RuntimeError::type_error(format!("{} is not iterable", other.type_name()))),
        }
    }

    pub(crate) fn bind_iterators(scope: &Scope, iterators: &[Ranged<QString>], element: Value) -> Result<(), RuntimeError> {
        let [iterator] = iterators else {
            let Value::Array(values) = &element else {
                return Err(RuntimeError::type_error(format!(
                    "cannot unpack {} into {} variables",
                    element.type_name(),
                    iterators.len(),
                )));
            };

            let values = values.borrow();
            for (idx, iterator) in iterators.iter().enumerate() {
                let value = values.get(idx).cloned().unwrap_or_default();
                scope.define(iterator.value().clone(), value, false)?;
            }
            return Ok(());
        };

        scope.define(iterator.value().clone(), element, false)?;
        Ok(())
    }

    fn execute_class_statement(&mut self, statement: &ClassStatement) -> Result<(), RuntimeError> {
        let base = match &statement.base {
            Some(base) => match self.scope.get(base.value()).map_err(|e| e.or_range(base.range()))? {
                Value::Class(class) => Some(class),
                other => {
                    return Err(RuntimeError::type_error(format!("cannot inherit from {}", other.type_name()))
                        .or_range(base.range()));
                }
            },
            None => None,
        };

        let methods = statement.methods.iter()
            .map(|method| (method.name.value().clone(), Rc::clone(method)))
            .collect();

        let static_methods = statement.static_methods.iter()
            .map(|method| (method.name.value().clone(), Rc::clone(method)))
            .collect();

        let mut static_fields = ValueMap::new();
        for field in &statement.static_fields {
            let value = self.evaluate(&field.value)?;
            static_fields.insert(field.name.value().clone(), value);
        }

        debug!(
            "declaring class `{}` with {} method(s), base {:?}",
            statement.name.value(),
            statement.methods.len(),
            base.as_ref().map(|base| base.name.as_str()),
        );

        let class = Class {
            name: statement.name.value().clone(),
            is_exception: base.as_ref().is_some_and(|base| base.is_exception),
            base,
            methods,
            static_methods,
            static_fields: RefCell::new(static_fields),
            closure: self.scope.clone(),
        };

        self.scope.define(statement.name.value().clone(), Value::Class(Rc::new(class)), false)?;
        Ok(())
    }

    fn execute_try_statement(&mut self, statement: &TryStatement) -> StatementResult {
        let result = match self.execute_block(&statement.body) {
            Err(Signal::Error(error)) => {
                match statement.handlers.iter().find(|handler| Self::handles(handler, &error)) {
                    Some(handler) => self.execute_except_handler(handler, error),
                    None => Err(Signal::Error(error)),
                }
            }
            other => other,
        };

        if let Some(finally) = &statement.finally {
            self.execute_block(finally)?;
        }

        result
    }

    fn handles(handler: &ExceptHandler, error: &RuntimeError) -> bool {
        if error.kind == ErrorKind::Exit {
            return false;
        }

        if handler.catches_everything() {
            return true;
        }

        let Some(name) = &handler.error_type else {
            return true;
        };

        if error.kind.is_caught_by(name) {
            return true;
        }

        matches!(&error.payload, Some(Value::Instance(instance)) if instance.class.is_a(name))
    }

    fn execute_except_handler(&mut self, handler: &ExceptHandler, error: RuntimeError) -> StatementResult {
        let scope = self.scope.push();
        if let Some(binding) = &handler.binding {
            let value = match &error.payload {
                Some(payload) => payload.clone(),
                None => Value::string(error.message.clone()),
            };
            scope.define(binding.value().clone(), value, false)?;
        }

        self.handled_errors.push(error);
        let result = self.execute_in_scope(scope, &handler.body);
        self.handled_errors.pop();
        result
    }

    fn execute_raise_statement(&mut self, statement: &RaiseStatement) -> RuntimeError {
        let Some(expression) = &statement.expression else {
            return self.handled_errors.last()
                .cloned()
                .unwrap_or_else(|| RuntimeError::runtime("no active exception to re-raise"));
        };

        match self.raised_error(expression) {
            Ok(error) | Err(error) => error.or_range(expression.range()),
        }
    }

    /// The error for `raise value`. Instances read as `Class: message`.
    fn raised_error(&mut self, expression: &Ranged<Expression>) -> Result<RuntimeError, RuntimeError> {
        let value = self.evaluate(expression)?;

        let message = match &value {
            Value::Instance(instance) => {
                let message = instance.fields.borrow().get("message").cloned();
                match message {
                    Some(message) => format!("{}: {}", instance.class.name, self.display(&message)?),
                    None if instance.class.is_exception => instance.class.name.to_string(),
                    None => self.display(&value)?,
                }
            }
            other => self.display(other)?,
        };

        Ok(RuntimeError::raised(message, value))
    }

    fn execute_print_statement(&mut self, statement: &PrintStatement) -> Result<(), RuntimeError> {
        let arguments = self.evaluate_arguments(&statement.arguments)?;

        let separator = match &statement.separator {
            Some(separator) => {
                let separator = self.evaluate(separator)?;
                self.display(&separator)?
            }
            None => " ".to_string(),
        };

        let end = match &statement.end {
            Some(end) => {
                let end = self.evaluate(end)?;
                self.display(&end)?
            }
            None if statement.newline => "\n".to_string(),
            None => String::new(),
        };

        let mut text = match arguments.split_first() {
            Some((Value::String(format), rest)) if !rest.is_empty() && has_format_specifier(format) => {
                format_printf(format, rest, &mut |value| self.display(value))?
            }
            _ => {
                let mut text = String::new();
                for (idx, argument) in arguments.iter().enumerate() {
                    if idx != 0 {
                        text += &separator;
                    }
                    text += &self.display(argument)?;
                }
                text
            }
        };

        text += &end;
        self.host.emit(&text);
        Ok(())
    }

    fn execute_input_statement(&mut self, statement: &InputStatement) -> Result<(), RuntimeError> {
        let prompt = match &statement.prompt {
            Some(prompt) => Some(self.evaluate(prompt)?),
            None => None,
        };

        let conversion = match &prompt {
            Some(Value::String(format)) => ScanConversion::from_format(format),
            _ => None,
        };

        if let (Some(prompt), None) = (&prompt, conversion) {
            let text = self.display(prompt)?;
            self.host.emit(&text);
        }

        for target in &statement.targets {
            let value = match self.host.read_line() {
                Some(line) => ScanConversion::convert(conversion, &line)?,
                None => Value::Nil,
            };

            self.scope.assign(target.value(), value).map_err(|e| e.or_range(target.range()))?;
        }

        Ok(())
    }

    fn execute_import_statement(&mut self, statement: &ImportStatement) -> Result<(), RuntimeError> {
        let Some(module) = self.load_module(statement.module.value())? else {
            warn!("module `{}` could not be found, ignoring import", statement.module.value());
            return Ok(());
        };

        let Value::Map(members) = &module else {
            return Ok(());
        };

        if statement.star {
            for (name, value) in members.borrow().iter() {
                self.scope.define(name.clone(), value.clone(), false)?;
            }
            return Ok(());
        }

        if !statement.names.is_empty() {
            for import in &statement.names {
                let value = members.borrow().get(import.name.value()).cloned().ok_or_else(|| {
                    RuntimeError::name_error(format!(
                        "module `{}` has no member `{}`",
                        statement.module.value(),
                        import.name.value(),
                    )).or_range(import.name.range())
                })?;

                let name = import.alias.as_ref().unwrap_or(&import.name);
                self.scope.define(name.value().clone(), value, false)?;
            }
            return Ok(());
        }

        let name = match &statement.alias {
            Some(alias) => alias.value().clone(),
            None => {
                let path = statement.module.value();
                let start = path.rfind('.').map_or(0, |dot| dot + 1);
                path.sliced(start, path.len())
            }
        };

        self.scope.define(name, module, false)?;
        Ok(())
    }

    /// Loads and runs a module once, yielding its top-level bindings as a
    /// map. A global map with the same name (such as `math`) stands in for
    /// modules the host does not know.
    fn load_module(&mut self, name: &QString) -> Result<Option<Value>, RuntimeError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(Some(module.clone()));
        }

        let Some(source_code) = self.host.load_module(name) else {
            return Ok(self.globals.find(name).filter(|value| matches!(value, Value::Map(..))));
        };

        debug!("loading module `{name}` from {}", source_code.path().display());
        let tree = parse_source(&source_code)?;

        let scope = self.globals.push_function();
        let previous = replace(&mut self.scope, scope.clone());
        let result = self.execute_unit(&tree);
        self.scope = previous;
        result?;

        let module = Value::map(scope.variables().into_iter().collect());
        self.modules.insert(name.clone(), module.clone());
        Ok(Some(module))
    }

    pub(crate) fn evaluate_arguments(&mut self, arguments: &[Ranged<Expression>]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }
        Ok(values)
    }

    pub(crate) fn call_value(&mut self, callee: &Value, arguments: Vec<Value>, location: FileRange) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_function(function, arguments, location),

            Value::Native(native) => {
                let function = DebuggerFunction {
                    ty: DebuggerFunctionType::Native,
                    name: native.name.as_str(),
                    caller_location: location,
                    callee_location: None,
                };

                self.debugger.enter_function(function, &arguments);
                let result = (native.function)(self, arguments, native.receiver.clone());
                self.debugger.leave_function(function);
                result
            }

            Value::Class(class) => self.instantiate(class, arguments, location),

            other => Err(RuntimeError::type_error(format!("{} is not callable", other.type_name()))),
        }
    }

    fn call_function(&mut self, function: &Rc<Function>, arguments: Vec<Value>, location: FileRange) -> Result<Value, RuntimeError> {
        if self.frames.len() >= self.max_call_depth {
            return Err(RuntimeError::runtime(format!(
                "maximum call depth of {} exceeded in `{}`",
                self.max_call_depth,
                function.name(),
            )));
        }

        let declaration = &function.declaration;
        let scope = function.closure.push_function();

        let parameters = match &function.binding {
            Some(binding) => {
                scope.define("self", binding.this.clone(), false)?;
                scope.define("this", binding.this.clone(), false)?;
                declaration.explicit_parameters()
            }
            None => &declaration.parameters,
        };

        let debugger_function = DebuggerFunction {
            ty: match &function.binding {
                Some(..) if function.name() == "init" => DebuggerFunctionType::Constructor,
                Some(..) => DebuggerFunctionType::Method,
                None => DebuggerFunctionType::Normal,
            },
            name: function.name(),
            caller_location: location,
            callee_location: Some(declaration.name.range()),
        };

        self.debugger.enter_function(debugger_function, &arguments);
        let previous = replace(&mut self.scope, scope);
        self.frames.push(function.binding.clone());

        let result = self.bind_arguments(parameters, arguments)
            .and_then(|()| self.execute_function_body(&declaration.body));

        self.frames.pop();
        self.scope = previous;
        self.debugger.leave_function(debugger_function);

        result
    }

    /// Missing arguments take their default, or nil. Extra arguments are
    /// ignored.
    fn bind_arguments(&mut self, parameters: &[Parameter], arguments: Vec<Value>) -> Result<(), RuntimeError> {
        let mut arguments = arguments.into_iter();

        for parameter in parameters {
            let value = match (arguments.next(), &parameter.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.evaluate(default)?,
                (None, None) => Value::Nil,
            };

            if parameter.is_receiver() {
                self.scope.define("self", value.clone(), false)?;
                self.scope.define("this", value, false)?;
            } else {
                self.scope.define(parameter.name.value().clone(), value, false)?;
            }
        }

        Ok(())
    }

    fn execute_function_body(&mut self, body: &FunctionBody) -> Result<Value, RuntimeError> {
        match body {
            FunctionBody::Expression(expression) => self.evaluate(expression),
            FunctionBody::Block(statements) => match self.execute_statements(statements) {
                Ok(()) => Ok(Value::Nil),
                Err(Signal::Return(value)) => Ok(value),
                Err(signal) => Err(signal.into_error()),
            },
        }
    }

    fn instantiate(&mut self, class: &Rc<Class>, arguments: Vec<Value>, location: FileRange) -> Result<Value, RuntimeError> {
        let instance = Value::Instance(Rc::new(Instance {
            class: Rc::clone(class),
            fields: RefCell::default(),
        }));

        self.initialize(class, instance.clone(), arguments, location)?;
        Ok(instance)
    }

    /// Runs the nearest `init` of `class` on `this`. Exception classes
    /// without one keep their first argument as `message`.
    pub(crate) fn initialize(&mut self, class: &Rc<Class>, this: Value, arguments: Vec<Value>, location: FileRange) -> Result<(), RuntimeError> {
        if let Some((init, defining_class)) = class.find_method("init") {
            let init = defining_class.bind(init, this);
            self.call_value(&init, arguments, location)?;
            return Ok(());
        }

        if class.is_exception {
            if let (Value::Instance(instance), Some(message)) = (&this, arguments.into_iter().next()) {
                instance.fields.borrow_mut().insert(QString::new_static("message"), message);
            }
        }

        Ok(())
    }
}

impl<H, D> Runtime for Interpreter<H, D>
        where H: Host, D: Debugger {
    fn call(&mut self, callee: &Value, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let location = self.location;
        self.call_value(callee, arguments, location)
    }

    fn display(&mut self, value: &Value) -> Result<String, RuntimeError> {
        match value {
            Value::Instance(instance) => {
                let Some((method, defining_class)) = instance.class.find_method("__str__") else {
                    return Ok(value.to_string());
                };

                let method = defining_class.bind(method, value.clone());
                match self.call(&method, Vec::new())? {
                    Value::String(str) => Ok(str.to_string()),
                    other => self.display(&other),
                }
            }

            Value::Array(array) => {
                let Some(_visit) = Visit::enter(Visit::display(array)) else {
                    return Ok("[...]".into());
                };

                let elements = array.borrow().clone();
                let mut text = String::from("[");
                for (idx, element) in elements.iter().enumerate() {
                    if idx != 0 {
                        text += ", ";
                    }
                    text += &self.display_nested(element)?;
                }
                text.push(']');
                Ok(text)
            }

            Value::Map(map) => {
                let Some(_visit) = Visit::enter(Visit::display(map)) else {
                    return Ok("{...}".into());
                };

                let entries: Vec<_> = map.borrow().iter().map(|(key, value)| (key.clone(), value.clone())).collect();
                let mut text = String::from("{");
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx != 0 {
                        text += ", ";
                    }
                    text += &format!("\"{key}\": ");
                    text += &self.display_nested(value)?;
                }
                text.push('}');
                Ok(text)
            }

            other => Ok(other.to_string()),
        }
    }

    fn emit(&mut self, text: &str) {
        self.host.emit(text);
    }
}

impl<H, D> Interpreter<H, D>
        where H: Host, D: Debugger {
    fn display_nested(&mut self, value: &Value) -> Result<String, RuntimeError> {
        match value {
            Value::String(str) => Ok(format!("\"{str}\"")),
            other => self.display(other),
        }
    }
}

/// How `input`/`scanf` converts a line, decided by the format's specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanConversion {
    Integer,
    Number,
    Text,
}

impl ScanConversion {
    fn from_format(format: &str) -> Option<Self> {
        let mut chars = format.chars().skip_while(|c| *c != '%').skip(1)
            .skip_while(|c| c.is_ascii_digit() || matches!(c, 'l' | 'h'));

        match chars.next()? {
            'd' | 'i' | 'u' => Some(Self::Integer),
            'f' | 'g' | 'e' => Some(Self::Number),
            's' | 'c' => Some(Self::Text),
            _ => None,
        }
    }

    /// Without a format, numeric text becomes a number.
    fn convert(conversion: Option<Self>, line: &str) -> Result<Value, RuntimeError> {
        let trimmed = line.trim();
        let number = || trimmed.parse::<f64>().map_err(|_| {
            RuntimeError::type_error(format!("expected a number, but read \"{trimmed}\""))
        });

        match conversion {
            Some(Self::Integer) => Ok(Value::Number(number()?.trunc())),
            Some(Self::Number) => Ok(Value::Number(number()?)),
            Some(Self::Text) => Ok(Value::string(line)),
            None => Ok(match trimmed.parse::<f64>() {
                Ok(number) if !trimmed.is_empty() => Value::Number(number),
                _ => Value::string(line),
            }),
        }
    }
}

// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::HashMap,
    fmt::{Debug, Display, Write},
    rc::Rc,
};

use quantum::{canonical_method_name, FunctionStatement, QString};

use crate::{format::format_number, RuntimeError, Runtime, Scope};

pub type NativeCallback = Rc<dyn Fn(&mut dyn Runtime, Vec<Value>, Option<Value>) -> Result<Value, RuntimeError>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(QString),
    Array(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<ValueMap>>),
    Function(Rc<Function>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    #[must_use]
    pub fn string(str: impl Into<QString>) -> Self {
        Self::String(str.into())
    }

    #[must_use]
    pub fn array(values: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(values)))
    }

    #[must_use]
    pub fn map(map: ValueMap) -> Self {
        Self::Map(Rc::new(RefCell::new(map)))
    }

    #[must_use]
    pub fn native(
        name: impl Into<QString>,
        function: impl Fn(&mut dyn Runtime, Vec<Value>, Option<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self::Native(Rc::new(NativeFunction {
            name: name.into(),
            function: Rc::new(function),
            receiver: None,
        }))
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Bool(..) => "bool",
            Self::Number(..) => "number",
            Self::String(..) => "string",
            Self::Array(..) => "array",
            Self::Map(..) => "map",
            Self::Function(..) => "function",
            Self::Native(..) => "native",
            Self::Class(..) => "class",
            Self::Instance(instance) => instance.class.name.as_str(),
        }
    }

    /// Address of the allocation shared by reference values. Plain values
    /// have none.
    #[must_use]
    pub fn identity(&self) -> Option<usize> {
        let ptr = match self {
            Self::Array(array) => Rc::as_ptr(array).cast::<()>(),
            Self::Map(map) => Rc::as_ptr(map).cast(),
            Self::Function(function) => Rc::as_ptr(function).cast(),
            Self::Native(native) => Rc::as_ptr(native).cast(),
            Self::Class(class) => Rc::as_ptr(class).cast(),
            Self::Instance(instance) => Rc::as_ptr(instance).cast(),
            _ => return None,
        };

        Some(ptr as usize)
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::String(str) => !str.is_empty(),
            Self::Array(array) => !array.borrow().is_empty(),
            Self::Map(map) => !map.borrow().is_empty(),
            Self::Function(..) | Self::Native(..) | Self::Class(..) | Self::Instance(..) => true,
        }
    }

    pub fn as_number(&self) -> Result<f64, RuntimeError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            _ => Err(self.expected("number")),
        }
    }

    /// Truncates towards zero, the way bitwise operators and indices see numbers.
    pub fn as_integer(&self) -> Result<i64, RuntimeError> {
        let number = self.as_number()?;
        if !number.is_finite() {
            return Err(RuntimeError::type_error(format!("cannot convert {} to an integer", format_number(number))));
        }
        Ok(number.trunc() as i64)
    }

    pub fn as_string(&self) -> Result<&QString, RuntimeError> {
        match self {
            Self::String(str) => Ok(str),
            _ => Err(self.expected("string")),
        }
    }

    pub fn as_array(&self) -> Result<&Rc<RefCell<Vec<Value>>>, RuntimeError> {
        match self {
            Self::Array(array) => Ok(array),
            _ => Err(self.expected("array")),
        }
    }

    pub fn as_map(&self) -> Result<&Rc<RefCell<ValueMap>>, RuntimeError> {
        match self {
            Self::Map(map) => Ok(map),
            _ => Err(self.expected("map")),
        }
    }

    #[must_use]
    pub fn expected(&self, expected: &str) -> RuntimeError {
        RuntimeError::type_error(format!("expected {expected}, but got {}", self.type_name()))
    }

    /// The text used for map keys, which are always strings.
    #[must_use]
    pub fn to_key(&self) -> QString {
        match self {
            Self::String(str) => str.clone(),
            other => other.to_string().into(),
        }
    }

    /// Ordering for `<` and friends: numbers (bools count as 0 and 1) and strings.
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        match (self, other) {
            (Self::String(lhs), Self::String(rhs)) => Ok(lhs.as_str().cmp(rhs.as_str())),
            (Self::Number(..) | Self::Bool(..), Self::Number(..) | Self::Bool(..)) => {
                let (lhs, rhs) = (self.as_number()?, other.as_number()?);
                lhs.partial_cmp(&rhs)
                    .ok_or_else(|| RuntimeError::type_error("cannot order NaN"))
            }
            _ => Err(RuntimeError::type_error(format!(
                "cannot compare {} with {}",
                self.type_name(),
                other.type_name(),
            ))),
        }
    }

    fn write_nested(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(str) => write!(f, "\"{str}\""),
            other => Display::fmt(other, f),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(str) => f.write_str(str),
            Self::Array(array) => {
                let Some(_visit) = Visit::enter(Visit::display(array)) else {
                    return f.write_str("[...]");
                };

                f.write_char('[')?;
                for (idx, element) in array.borrow().iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    element.write_nested(f)?;
                }
                f.write_char(']')
            }
            Self::Map(map) => {
                let Some(_visit) = Visit::enter(Visit::display(map)) else {
                    return f.write_str("{...}");
                };

                f.write_char('{')?;
                for (idx, (key, value)) in map.borrow().iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{key}\": ")?;
                    value.write_nested(f)?;
                }
                f.write_char('}')
            }
            Self::Function(function) => write!(f, "<fn {}>", function.name()),
            Self::Native(native) => write!(f, "<native fn {}>", native.name),
            Self::Class(class) => write!(f, "<class {}>", class.name),
            Self::Instance(instance) => {
                if instance.class.is_exception {
                    if let Some(message) = instance.fields.borrow().get("message") {
                        return Display::fmt(message, f);
                    }
                }
                write!(f, "<{} instance>", instance.class.name)
            }
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(str) => Debug::fmt(str.as_str(), f),
            other => Display::fmt(other, f),
        }
    }
}

/// Structural for scalars, arrays and maps; identity for everything that
/// has behaviour. Two self-containing collections are equal when nothing
/// but their cycles could tell them apart.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(lhs), Self::Bool(rhs)) => lhs == rhs,
            (Self::Number(lhs), Self::Number(rhs)) => lhs == rhs,
            (Self::String(lhs), Self::String(rhs)) => lhs == rhs,
            (Self::Array(lhs), Self::Array(rhs)) => Rc::ptr_eq(lhs, rhs) || match Visit::enter(Visit::compare(lhs, rhs)) {
                Some(_visit) => *lhs.borrow() == *rhs.borrow(),
                None => true,
            },
            (Self::Map(lhs), Self::Map(rhs)) => Rc::ptr_eq(lhs, rhs) || match Visit::enter(Visit::compare(lhs, rhs)) {
                Some(_visit) => *lhs.borrow() == *rhs.borrow(),
                None => true,
            },
            (Self::Function(lhs), Self::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Self::Native(lhs), Self::Native(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Self::Class(lhs), Self::Class(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Self::Instance(lhs), Self::Instance(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

thread_local! {
    static VISITING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Marks an array or map as being displayed or compared further up the
/// stack, until dropped.
pub(crate) struct Visit {
    key: (usize, usize),
}

impl Visit {
    pub(crate) fn display<T>(collection: &Rc<T>) -> (usize, usize) {
        (Rc::as_ptr(collection).cast::<()>() as usize, 0)
    }

    fn compare<T>(lhs: &Rc<T>, rhs: &Rc<T>) -> (usize, usize) {
        (Rc::as_ptr(lhs).cast::<()>() as usize, Rc::as_ptr(rhs).cast::<()>() as usize)
    }

    /// `None` when `key` is already being visited.
    pub(crate) fn enter(key: (usize, usize)) -> Option<Self> {
        VISITING.with_borrow_mut(|visiting| {
            if visiting.contains(&key) {
                return None;
            }

            visiting.push(key);
            Some(Self { key })
        })
    }
}

impl Drop for Visit {
    fn drop(&mut self) {
        VISITING.with_borrow_mut(|visiting| {
            if let Some(idx) = visiting.iter().rposition(|key| *key == self.key) {
                visiting.remove(idx);
            }
        });
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<QString> for Value {
    fn from(value: QString) -> Self {
        Self::String(value)
    }
}

/// String-keyed map that iterates in insertion order.
#[derive(Clone, Default)]
pub struct ValueMap {
    entries: Vec<(QString, Value)>,
    indices: HashMap<QString, usize>,
}

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.indices.get(key).map(|idx| &self.entries[*idx].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    /// Overwriting keeps the original position of the key.
    pub fn insert(&mut self, key: QString, value: Value) -> Option<Value> {
        if let Some(idx) = self.indices.get(&key) {
            return Some(std::mem::replace(&mut self.entries[*idx].1, value));
        }

        self.indices.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.indices.remove(key)?;
        let (_, value) = self.entries.remove(idx);

        for index in self.indices.values_mut() {
            if *index > idx {
                *index -= 1;
            }
        }

        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QString, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &QString> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl FromIterator<(QString, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (QString, Value)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A script function together with the scope it closes over.
pub struct Function {
    pub declaration: Rc<FunctionStatement>,
    pub closure: Scope,
    pub binding: Option<MethodBinding>,
}

impl Function {
    #[must_use]
    pub fn name(&self) -> &str {
        self.declaration.name.value()
    }
}

/// The receiver of a method and the class that defined it, which is where
/// `super` starts looking.
#[derive(Clone)]
pub struct MethodBinding {
    pub this: Value,
    pub class: Rc<Class>,
}

pub struct NativeFunction {
    pub name: QString,
    pub function: NativeCallback,

    /// The value a built-in method was looked up on.
    pub receiver: Option<Value>,
}

pub struct Class {
    pub name: QString,
    pub base: Option<Rc<Class>>,
    pub methods: HashMap<QString, Rc<FunctionStatement>>,
    pub static_methods: HashMap<QString, Rc<FunctionStatement>>,
    pub static_fields: RefCell<ValueMap>,
    pub closure: Scope,
    pub is_exception: bool,
}

impl Class {
    /// Walks the inheritance chain, returning the method and the class that
    /// defines it.
    #[must_use]
    pub fn find_method(self: &Rc<Self>, name: &str) -> Option<(Rc<FunctionStatement>, Rc<Class>)> {
        let name = canonical_method_name(name);
        let mut class = Some(self);
        while let Some(current) = class {
            if let Some(method) = current.methods.get(name) {
                return Some((Rc::clone(method), Rc::clone(current)));
            }
            class = current.base.as_ref();
        }
        None
    }

    #[must_use]
    pub fn find_static_method(self: &Rc<Self>, name: &str) -> Option<Rc<FunctionStatement>> {
        let mut class = Some(self);
        while let Some(current) = class {
            if let Some(method) = current.static_methods.get(name) {
                return Some(Rc::clone(method));
            }
            class = current.base.as_ref();
        }
        None
    }

    #[must_use]
    pub fn find_static_field(self: &Rc<Self>, name: &str) -> Option<Value> {
        let mut class = Some(self);
        while let Some(current) = class {
            if let Some(value) = current.static_fields.borrow().get(name) {
                return Some(value.clone());
            }
            class = current.base.as_ref();
        }
        None
    }

    /// Whether this class is `name` or inherits from it.
    #[must_use]
    pub fn is_a(&self, name: &str) -> bool {
        let mut class = Some(self);
        while let Some(current) = class {
            if current.name == name {
                return true;
            }
            class = current.base.as_deref();
        }
        false
    }

    /// Binds a method to `this`, resolved from `class`.
    #[must_use]
    pub fn bind(self: &Rc<Self>, declaration: Rc<FunctionStatement>, this: Value) -> Value {
        Value::Function(Rc::new(Function {
            declaration,
            closure: self.closure.clone(),
            binding: Some(MethodBinding {
                this,
                class: Rc::clone(self),
            }),
        }))
    }

    /// A method reached through the class itself, where the receiver is an
    /// ordinary argument.
    #[must_use]
    pub fn unbound(&self, declaration: Rc<FunctionStatement>) -> Value {
        Value::Function(Rc::new(Function {
            declaration,
            closure: self.closure.clone(),
            binding: None,
        }))
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<ValueMap>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn numbers(values: &[f64]) -> Value {
        Value::array(values.iter().copied().map(Value::Number).collect())
    }

    #[rstest]
    #[case(Value::Nil, false)]
    #[case(Value::Bool(true), true)]
    #[case(Value::Number(0.0), false)]
    #[case(Value::Number(-0.5), true)]
    #[case(Value::string(""), false)]
    #[case(Value::string("0"), true)]
    #[case(numbers(&[]), false)]
    #[case(numbers(&[0.0]), true)]
    #[case(Value::map(ValueMap::new()), false)]
    fn truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[rstest]
    #[case(Value::Number(42.0), "42")]
    #[case(Value::Number(3.5), "3.5")]
    #[case(Value::Number(-0.0), "0")]
    #[case(Value::Bool(false), "false")]
    #[case(Value::Nil, "nil")]
    #[case(numbers(&[1.0, 2.5]), "[1, 2.5]")]
    #[case(Value::array(vec![Value::string("a"), Value::Nil]), "[\"a\", nil]")]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn map_display_keeps_insertion_order() {
        let map: ValueMap = [
            (QString::from("z"), Value::Number(1.0)),
            (QString::from("a"), Value::string("x")),
        ].into_iter().collect();

        assert_eq!(Value::map(map).to_string(), "{\"z\": 1, \"a\": \"x\"}");
    }

    #[test]
    fn map_remove_keeps_order_of_the_rest() {
        let mut map = ValueMap::new();
        map.insert("a".into(), Value::Number(1.0));
        map.insert("b".into(), Value::Number(2.0));
        map.insert("c".into(), Value::Number(3.0));
        map.insert("a".into(), Value::Number(4.0));

        assert_eq!(map.remove("b"), Some(Value::Number(2.0)));
        assert_eq!(map.keys().map(QString::as_str).collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(map.get("c"), Some(&Value::Number(3.0)));
        assert_eq!(map.get("a"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn arrays_compare_structurally() {
        assert_eq!(numbers(&[1.0, 2.0]), numbers(&[1.0, 2.0]));
        assert_ne!(numbers(&[1.0, 2.0]), numbers(&[2.0, 1.0]));
    }

    #[test]
    fn arrays_share_mutation() {
        let array = numbers(&[1.0]);
        let alias = array.clone();
        alias.as_array().unwrap().borrow_mut().push(Value::Number(2.0));
        assert_eq!(array.to_string(), "[1, 2]");
    }

    #[rstest]
    #[case(Value::Number(1.0), Value::Number(2.0), Ordering::Less)]
    #[case(Value::Bool(true), Value::Number(1.0), Ordering::Equal)]
    #[case(Value::string("b"), Value::string("a"), Ordering::Greater)]
    fn ordering(#[case] lhs: Value, #[case] rhs: Value, #[case] expected: Ordering) {
        assert_eq!(lhs.compare(&rhs).unwrap(), expected);
    }

    #[test]
    fn ordering_mixed_kinds_is_a_type_error() {
        let error = Value::string("a").compare(&Value::Number(1.0)).unwrap_err();
        assert_eq!(error.kind, crate::ErrorKind::TypeError);
    }

    fn self_containing_array(first: f64) -> Value {
        let array = numbers(&[first]);
        array.as_array().unwrap().borrow_mut().push(array.clone());
        array
    }

    fn self_containing_map() -> Value {
        let map = Value::map(ValueMap::new());
        map.as_map().unwrap().borrow_mut().insert("self".into(), map.clone());
        map
    }

    #[rstest]
    #[case(self_containing_array(1.0), "[1, [...]]")]
    #[case(self_containing_map(), "{\"self\": {...}}")]
    fn cycles_are_displayed_once(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case(self_containing_array(1.0), self_containing_array(1.0), true)]
    #[case(self_containing_array(1.0), self_containing_array(2.0), false)]
    #[case(self_containing_map(), self_containing_map(), true)]
    #[case(self_containing_array(1.0), numbers(&[1.0]), false)]
    fn cycles_compare_without_recursing_forever(#[case] lhs: Value, #[case] rhs: Value, #[case] expected: bool) {
        assert_eq!(lhs == rhs, expected);
        assert_eq!(VISITING.with_borrow(Vec::len), 0);
    }
}

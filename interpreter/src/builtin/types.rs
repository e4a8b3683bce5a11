// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use super::BuiltinFunction;

/// Methods available on every value of a built-in type.
#[derive(Clone, Copy)]
pub struct BuiltinType {
    pub name: &'static str,
    pub documentation: &'static str,
    pub methods: &'static [BuiltinFunction],
}

impl BuiltinType {
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&'static BuiltinFunction> {
        self.methods.iter().find(|method| method.name == name)
    }
}

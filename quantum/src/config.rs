// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// The contents of a `quantum.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigRoot {
    pub log: ConfigSectionLog,
    pub interpreter: ConfigSectionInterpreter,
    pub repl: ConfigSectionRepl,
}

impl ConfigRoot {
    pub fn parse(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionLog {
    pub level: LogLevel,

    /// Log every function entry and exit at trace level.
    pub trace_calls: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionInterpreter {
    pub max_call_depth: usize,
    pub module_extensions: Vec<String>,
}

impl Default for ConfigSectionInterpreter {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            module_extensions: vec!["qt".into(), "py".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionRepl {
    pub prompt: String,

    /// Print the value of expression statements that are not nil.
    pub echo: bool,
}

impl Default for ConfigSectionRepl {
    fn default() -> Self {
        Self {
            prompt: ">>> ".into(),
            echo: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ConfigRoot::parse("").unwrap();
        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.interpreter.max_call_depth, 1000);
        assert_eq!(config.interpreter.module_extensions, ["qt", "py"]);
        assert_eq!(config.repl.prompt, ">>> ");
        assert!(config.repl.echo);
    }

    #[test]
    fn sections_are_kebab_case() {
        let config = ConfigRoot::parse(r#"
            [log]
            level = "trace"
            trace-calls = true

            [interpreter]
            max-call-depth = 64
        "#).unwrap();

        assert_eq!(config.log.level, LogLevel::Trace);
        assert!(config.log.trace_calls);
        assert_eq!(config.interpreter.max_call_depth, 64);
        assert_eq!(config.interpreter.module_extensions, ["qt", "py"]);
    }
}

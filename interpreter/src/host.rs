// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    collections::VecDeque,
    io::{stdin, stdout, BufRead, Write},
    path::PathBuf,
};

use log::{debug, warn};
use quantum::SourceCode;

/// Everything the interpreter needs from the outside world.
pub trait Host {
    /// Writes program output. Line breaks are part of `text`.
    fn emit(&mut self, text: &str);

    /// One line of input without its line break, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;

    /// Source of the module `name` (a dotted path), if the host knows it.
    fn load_module(&mut self, name: &str) -> Option<SourceCode> {
        _ = name;
        None
    }
}

/// Collects output in memory and serves input from a fixed list.
#[derive(Debug, Default)]
pub struct BufferedHost {
    output: String,
    input: VecDeque<String>,
    modules: Vec<(String, String)>,
}

impl BufferedHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input<I, S>(self, lines: I) -> Self
            where I: IntoIterator<Item = S>, S: Into<String> {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.modules.push((name.into(), source.into()));
        self
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The output split into lines; an unterminated last line is kept.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.output.split('\n').map(ToString::to_string).collect();
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }
}

impl Host for BufferedHost {
    fn emit(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn load_module(&mut self, name: &str) -> Option<SourceCode> {
        self.modules.iter()
            .find(|(module, _)| module == name)
            .map(|(module, source)| SourceCode::new(format!("{module}.qt"), source.as_str()))
    }
}

/// Standard input and output, with modules read from disk next to the script.
#[derive(Debug)]
pub struct ConsoleHost {
    directory: PathBuf,
    extensions: Vec<String>,
}

impl ConsoleHost {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            directory: directory.into(),
            extensions,
        }
    }
}

impl Host for ConsoleHost {
    fn emit(&mut self, text: &str) {
        let mut stdout = stdout().lock();
        _ = stdout.write_all(text.as_bytes());
        if text.contains('\n') {
            _ = stdout.flush();
        }
    }

    fn read_line(&mut self) -> Option<String> {
        _ = stdout().flush();

        let mut line = String::new();
        match stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(..) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(e) => {
                warn!("failed to read from standard input: {e}");
                None
            }
        }
    }

    fn load_module(&mut self, name: &str) -> Option<SourceCode> {
        let relative: PathBuf = name.split('.').collect();

        for extension in &self.extensions {
            let path = self.directory.join(&relative).with_extension(extension);
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    debug!("resolved module `{name}` to {}", path.display());
                    return Some(SourceCode::new(path, contents));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("failed to read module `{name}` from {}: {e}", path.display());
                    return None;
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&["a\n", "b\n"], &["a", "b"])]
    #[case(&["a", "b\nc"], &["ab", "c"])]
    #[case(&["\n"], &[""])]
    #[case(&[], &[])]
    fn buffered_lines(#[case] emitted: &[&str], #[case] expected: &[&str]) {
        let mut host = BufferedHost::new();
        for text in emitted {
            host.emit(text);
        }
        assert_eq!(host.lines(), expected);
    }

    #[test]
    fn buffered_input_runs_out() {
        let mut host = BufferedHost::new().with_input(["1", "two"]);
        assert_eq!(host.read_line().as_deref(), Some("1"));
        assert_eq!(host.read_line().as_deref(), Some("two"));
        assert_eq!(host.read_line(), None);
    }
}

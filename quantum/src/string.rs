// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{borrow::Borrow, cmp::Ordering, fmt::{Debug, Display}, hash::Hash, ops::{Deref, Range}, sync::Arc};

/// A cheaply clonable string. Slices of the source code share the allocation
/// of the whole file, so tokens and AST nodes never copy identifier text.
#[derive(Clone)]
pub struct QString {
    inner: QStringImpl,
}

#[derive(Clone)]
enum QStringImpl {
    Shared {
        data: Arc<str>,
        start: usize,
        end: usize,
    },
    Static {
        str: &'static str,
    },
}

impl QString {
    #[must_use]
    pub const fn empty() -> Self {
        Self::new_static("")
    }

    #[must_use]
    pub const fn new_static(str: &'static str) -> Self {
        Self {
            inner: QStringImpl::Static { str },
        }
    }

    #[must_use]
    pub fn new(str: impl Into<Arc<str>>) -> Self {
        let data: Arc<str> = str.into();
        let end = data.len();

        Self {
            inner: QStringImpl::Shared {
                data,
                start: 0,
                end,
            },
        }
    }

    /// Byte-indexed sub-slice relative to this string.
    #[must_use]
    pub fn sliced(&self, start: usize, end: usize) -> Self {
        if start == end {
            return Self::empty();
        }

        debug_assert!(start <= end, "slice {start}..{end} is reversed");
        debug_assert!(end <= self.len(), "slice {start}..{end} exceeds length {}", self.len());

        match &self.inner {
            QStringImpl::Shared { data, start: offset, .. } => Self {
                inner: QStringImpl::Shared {
                    data: Arc::clone(data),
                    start: offset + start,
                    end: offset + end,
                },
            },

            QStringImpl::Static { str } => Self {
                inner: QStringImpl::Static {
                    str: &str[start..end],
                },
            },
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match &self.inner {
            QStringImpl::Shared { data, start, end } => &data[*start..*end],
            QStringImpl::Static { str } => str,
        }
    }
}

impl Default for QString {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for QString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

impl Display for QString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.as_str(), f)
    }
}

impl Deref for QString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl Borrow<str> for QString {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for QString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for QString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for QString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq for QString {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for QString {}

impl PartialOrd for QString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for QString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialEq<str> for QString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for QString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

pub trait Slice<T> {
    fn slice(&self, t: T) -> Self;
}

impl Slice<Range<usize>> for QString {
    fn slice(&self, t: Range<usize>) -> Self {
        self.sliced(t.start, t.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello world", 0..5, "hello")]
    #[case("hello world", 6..11, "world")]
    #[case("hello world", 3..3, "")]
    fn slices_share_the_source(#[case] input: &str, #[case] range: Range<usize>, #[case] expected: &str) {
        let string = QString::from(input);
        assert_eq!(string.slice(range), expected);
    }

    #[test]
    fn nested_slices_are_relative() {
        let string = QString::from("let answer = 42");
        let inner = string.sliced(4, 15).sliced(0, 6);
        assert_eq!(inner.as_str(), "answer");
    }
}

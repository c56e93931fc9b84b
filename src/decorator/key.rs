//! Cache key resolution from call arguments.
//!
//! A key is either a pattern such as `"user:{}:{role}"`, filled from the
//! call's positional and named arguments, or a closure over the arguments.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::error::{CacheError, Result};

// == Key Args ==
/// Call arguments a key pattern can refer to.
///
/// Both lookups default to "absent", so a closure-keyed argument type can
/// implement this with an empty `impl` block.
pub trait KeyArgs {
    /// Value substituted for `{}` / `{index}`.
    fn positional(&self, _index: usize) -> Option<String> {
        None
    }

    /// Value substituted for `{name}`.
    fn named(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Positional and named arguments collected at the call site.
///
/// ```
/// use easycache::decorator::CallArgs;
///
/// let args = CallArgs::new().arg(42).kwarg("lang", "en");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Adds a named argument; a repeated name replaces the earlier value.
    pub fn kwarg(mut self, name: &str, value: impl Display) -> Self {
        let value = value.to_string();
        match self.named.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name.to_string(), value)),
        }
        self
    }
}

impl KeyArgs for CallArgs {
    fn positional(&self, index: usize) -> Option<String> {
        self.positional.get(index).cloned()
    }

    fn named(&self, name: &str) -> Option<String> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

impl KeyArgs for String {
    fn positional(&self, index: usize) -> Option<String> {
        (index == 0).then(|| self.clone())
    }
}

impl KeyArgs for &str {
    fn positional(&self, index: usize) -> Option<String> {
        (index == 0).then(|| self.to_string())
    }
}

macro_rules! scalar_key_args {
    ($($ty:ty),*) => {
        $(
            impl KeyArgs for $ty {
                fn positional(&self, index: usize) -> Option<String> {
                    (index == 0).then(|| self.to_string())
                }
            }
        )*
    };
}

scalar_key_args!(i32, i64, u32, u64, usize, bool);

macro_rules! tuple_key_args {
    ($(($($idx:tt $name:ident),+)),*) => {
        $(
            impl<$($name: Display),+> KeyArgs for ($($name,)+) {
                fn positional(&self, index: usize) -> Option<String> {
                    match index {
                        $($idx => Some(self.$idx.to_string()),)+
                        _ => None,
                    }
                }
            }
        )*
    };
}

tuple_key_args!(
    (0 A),
    (0 A, 1 B),
    (0 A, 1 B, 2 C),
    (0 A, 1 B, 2 C, 3 D)
);

// == Key Template ==
/// How a wrapped function derives its cache key.
pub enum KeyTemplate<A> {
    /// Pattern with `{}`, `{0}` and `{name}` placeholders; `{{`/`}}` escape braces
    Pattern(String),
    /// Closure invoked with the call's arguments
    Callable(Arc<dyn Fn(&A) -> String + Send + Sync>),
}

impl<A> KeyTemplate<A> {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        KeyTemplate::Pattern(pattern.into())
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&A) -> String + Send + Sync + 'static,
    {
        KeyTemplate::Callable(Arc::new(f))
    }
}

impl<A: KeyArgs> KeyTemplate<A> {
    /// Produces the key for one call.
    pub fn resolve(&self, args: &A) -> Result<String> {
        match self {
            KeyTemplate::Pattern(pattern) => render(pattern, args),
            KeyTemplate::Callable(f) => Ok(f(args)),
        }
    }
}

impl<A> Clone for KeyTemplate<A> {
    fn clone(&self) -> Self {
        match self {
            KeyTemplate::Pattern(p) => KeyTemplate::Pattern(p.clone()),
            KeyTemplate::Callable(f) => KeyTemplate::Callable(Arc::clone(f)),
        }
    }
}

impl<A> fmt::Debug for KeyTemplate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyTemplate::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            KeyTemplate::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl<A> From<&str> for KeyTemplate<A> {
    fn from(pattern: &str) -> Self {
        KeyTemplate::Pattern(pattern.to_string())
    }
}

impl<A> From<String> for KeyTemplate<A> {
    fn from(pattern: String) -> Self {
        KeyTemplate::Pattern(pattern)
    }
}

// == Render ==
/// Fills a key pattern from `args`.
///
/// Automatic (`{}`) and explicit (`{0}`) numbering cannot be mixed in one
/// pattern.
pub fn render<A: KeyArgs + ?Sized>(pattern: &str, args: &A) -> Result<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut next_auto = 0usize;
    let mut numbering: Option<bool> = None; // Some(true) = automatic

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid(pattern, "single '}' encountered")),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(invalid(pattern, "unclosed '{'")),
                        Some(ch) => field.push(ch),
                    }
                }

                let value = if field.is_empty() {
                    if numbering == Some(false) {
                        return Err(invalid(pattern, "cannot mix automatic and manual numbering"));
                    }
                    numbering = Some(true);
                    let index = next_auto;
                    next_auto += 1;
                    args.positional(index)
                        .ok_or_else(|| missing(pattern, &index.to_string()))?
                } else if let Ok(index) = field.parse::<usize>() {
                    if numbering == Some(true) {
                        return Err(invalid(pattern, "cannot mix automatic and manual numbering"));
                    }
                    numbering = Some(false);
                    args.positional(index).ok_or_else(|| missing(pattern, &field))?
                } else if is_identifier(&field) {
                    args.named(&field).ok_or_else(|| missing(pattern, &field))?
                } else {
                    return Err(invalid(pattern, &format!("unsupported field '{}'", field)));
                };

                out.push_str(&value);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn invalid(pattern: &str, reason: &str) -> CacheError {
    CacheError::InvalidKey(format!("{}: {}", pattern, reason))
}

fn missing(pattern: &str, field: &str) -> CacheError {
    CacheError::InvalidKey(format!("{}: no argument for '{{{}}}'", pattern, field))
}

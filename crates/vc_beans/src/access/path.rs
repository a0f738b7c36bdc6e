use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

// -----------------------------------------------------------------------------
// Delimiters

/// Separates nested segments.
pub const NESTED: char = '.';
/// Opens an index subscript.
pub const INDEXED_START: char = '[';
/// Closes an index subscript.
pub const INDEXED_END: char = ']';
/// Opens a key subscript.
pub const MAPPED_START: char = '(';
/// Closes a key subscript.
pub const MAPPED_END: char = ')';

// -----------------------------------------------------------------------------
// ParseError

/// An error that occurs when parsing a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Position in `path`.
    pub offset: usize,
    /// The path that the error occurred in.
    pub path: String,
    /// The underlying error.
    pub error: Cow<'static, str>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encountered an error at offset {} while parsing `{}`: {}",
            self.offset, self.path, self.error,
        )
    }
}

impl core::error::Error for ParseError {}

// -----------------------------------------------------------------------------
// Scanning

/// Byte offset of the first `.` outside of any subscript.
///
/// Brackets `[]` and parentheses `()` are counted together, so a key may
/// contain dots: `a(x.y).b` splits after `a(x.y)`.
pub fn next_separator(path: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (i, c) in path.char_indices() {
        match c {
            INDEXED_START | MAPPED_START => depth += 1,
            INDEXED_END | MAPPED_END => depth = depth.saturating_sub(1),
            NESTED if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Byte offset of the last `.` outside of any subscript.
pub fn last_separator(path: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (i, c) in path.char_indices().rev() {
        match c {
            INDEXED_END | MAPPED_END => depth += 1,
            INDEXED_START | MAPPED_START => depth = depth.saturating_sub(1),
            NESTED if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// The first segment expression of `path`.
///
/// ```
/// use vc_beans::access::next;
/// assert_eq!(next("a(x.y).b[1]"), "a(x.y)");
/// assert_eq!(next("a"), "a");
/// ```
pub fn next(path: &str) -> &str {
    &path[..next_separator(path).unwrap_or(path.len())]
}

/// `path` without its first segment, `None` if it has only one.
pub fn remove(path: &str) -> Option<&str> {
    next_separator(path).map(|at| &path[at + 1..])
}

/// Splits `path` into everything before the last segment and the last segment.
///
/// ```
/// use vc_beans::access::split_last;
/// assert_eq!(split_last("a.b(k.x)"), (Some("a"), "b(k.x)"));
/// assert_eq!(split_last("a"), (None, "a"));
/// ```
pub fn split_last(path: &str) -> (Option<&str>, &str) {
    match last_separator(path) {
        Some(at) => (Some(&path[..at]), &path[at + 1..]),
        None => (None, path),
    }
}

/// Returns `true` if `path` has more than one segment.
#[inline]
pub fn has_nested(path: &str) -> bool {
    next_separator(path).is_some()
}

/// Returns `true` if the first segment of `expr` has an index subscript.
pub fn is_indexed(expr: &str) -> bool {
    for c in expr.chars() {
        match c {
            NESTED | MAPPED_START => return false,
            INDEXED_START => return true,
            _ => {}
        }
    }
    false
}

/// Returns `true` if the first segment of `expr` has a key subscript.
pub fn is_mapped(expr: &str) -> bool {
    for c in expr.chars() {
        match c {
            NESTED | INDEXED_START => return false,
            MAPPED_START => return true,
            _ => {}
        }
    }
    false
}

/// The property name of the first segment of `expr`, without subscripts.
pub fn property_name(expr: &str) -> &str {
    let expr = next(expr);
    match expr.find([INDEXED_START, MAPPED_START]) {
        Some(at) => &expr[..at],
        None => expr,
    }
}

/// The key of the first segment of `expr`, if it has one.
pub fn key(expr: &str) -> Option<&str> {
    let expr = next(expr);
    let open = expr.find(MAPPED_START)?;
    expr[open + 1..].strip_suffix(MAPPED_END)
}

/// The index of the first segment of `expr`, if it has one.
pub fn index(expr: &str) -> Result<Option<usize>, ParseError> {
    match Segment::parse(next(expr))?.kind {
        SegmentKind::Indexed(index) => Ok(Some(index)),
        _ => Ok(None),
    }
}

// -----------------------------------------------------------------------------
// Segment

/// How a segment addresses its property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// `name`
    Simple,
    /// `name[index]`
    Indexed(usize),
    /// `name(key)`
    Mapped(String),
}

/// One segment of a [`PropertyPath`].
///
/// The name may be empty for subscripts applied to the target itself,
/// e.g. `[0]` on a list or `(key)` on a map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub kind: SegmentKind,
}

impl Segment {
    #[inline]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SegmentKind::Simple,
        }
    }

    #[inline]
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            kind: SegmentKind::Indexed(index),
        }
    }

    #[inline]
    pub fn mapped(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SegmentKind::Mapped(key.into()),
        }
    }

    /// Parses a single segment expression.
    #[inline]
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        Self::parse_at(expr, 0, expr)
    }

    /// Parses `expr`, found at `offset` of `path`.
    pub(crate) fn parse_at(expr: &str, offset: usize, path: &str) -> Result<Self, ParseError> {
        let fail = |at: usize, error: Cow<'static, str>| ParseError {
            offset: offset + at,
            path: path.into(),
            error,
        };
        let unmatched = |name: &str| {
            name.find([INDEXED_END, MAPPED_END])
                .map(|at| fail(at, "unmatched closing bracket".into()))
        };

        let Some(open) = expr.find([INDEXED_START, MAPPED_START]) else {
            if let Some(err) = unmatched(expr) {
                return Err(err);
            }
            if expr.is_empty() {
                return Err(fail(0, "empty property name".into()));
            }
            return Ok(Self::simple(expr));
        };

        let name = &expr[..open];
        if let Some(err) = unmatched(name) {
            return Err(err);
        }

        let indexed = expr[open..].starts_with(INDEXED_START);
        let close = if indexed { INDEXED_END } else { MAPPED_END };
        let Some(inner) = expr[open + 1..].strip_suffix(close) else {
            return Err(fail(expr.len(), format!("expected `{close}` at end of segment").into()));
        };

        if indexed {
            let index = inner
                .parse::<usize>()
                .map_err(|_| fail(open + 1, format!("invalid index `{inner}`").into()))?;
            Ok(Self::indexed(name, index))
        } else {
            Ok(Self::mapped(name, inner))
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match &self.kind {
            SegmentKind::Simple => Ok(()),
            SegmentKind::Indexed(index) => write!(f, "{INDEXED_START}{index}{INDEXED_END}"),
            SegmentKind::Mapped(key) => write!(f, "{MAPPED_START}{key}{MAPPED_END}"),
        }
    }
}

// -----------------------------------------------------------------------------
// PropertyPath

/// A parsed property path, `a.b[2].c(k)`.
///
/// Always holds at least one segment.
///
/// # Examples
///
/// ```
/// use vc_beans::access::{PropertyPath, Segment};
///
/// let path = PropertyPath::parse("a.b[2].c(k)").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[Segment::simple("a"), Segment::indexed("b", 2), Segment::mapped("c", "k")]
/// );
/// assert_eq!(path.to_string(), "a.b[2].c(k)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Box<[Segment]>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self, ParseError> {
        if path.is_empty() {
            return Err(ParseError {
                offset: 0,
                path: String::new(),
                error: "empty property path".into(),
            });
        }

        let mut segments = Vec::new();
        let mut offset = 0;
        let mut rest = path;
        while let Some(at) = next_separator(rest) {
            segments.push(Segment::parse_at(&rest[..at], offset, path)?);
            offset += at + 1;
            rest = &rest[at + 1..];
        }
        segments.push(Segment::parse_at(rest, offset, path)?);

        Ok(Self {
            segments: segments.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Every segment but the last.
    #[inline]
    pub fn parents(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }

    #[inline]
    pub fn last(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    /// The first `len` segments rendered as a path.
    pub fn prefix(&self, len: usize) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().take(len).enumerate() {
            if i > 0 {
                out.push(NESTED);
            }
            out.push_str(&format!("{segment}"));
        }
        out
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{NESTED}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = ParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixed_path() {
        let path = PropertyPath::parse("a.b[2].c(k)").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::simple("a"),
                Segment::indexed("b", 2),
                Segment::mapped("c", "k"),
            ]
        );
        assert_eq!(path.parents().len(), 2);
        assert_eq!(path.last(), &Segment::mapped("c", "k"));
        assert_eq!(path.prefix(2), "a.b[2]");
    }

    #[test]
    fn keys_may_contain_separators() {
        let path = PropertyPath::parse("m(x.y).z").unwrap();
        assert_eq!(path.segments(), &[Segment::mapped("m", "x.y"), Segment::simple("z")]);
    }

    #[test]
    fn subscripts_without_name() {
        assert_eq!(Segment::parse("[3]").unwrap(), Segment::indexed("", 3));
        assert_eq!(Segment::parse("(k)").unwrap(), Segment::mapped("", "k"));
    }

    #[test]
    fn syntax_errors() {
        let err = PropertyPath::parse("a.b[x]").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.path, "a.b[x]");

        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse("a..b").is_err());
        assert!(PropertyPath::parse("a[1").is_err());
        assert!(PropertyPath::parse("a]").is_err());
        assert!(PropertyPath::parse("a[-1]").is_err());
        assert!(PropertyPath::parse("a(k)b").is_err());
    }

    #[test]
    fn scans_agree() {
        for path in ["a.b", "a(x.y).b[1].c", "m(k.l)", "x[0](y.z)", "single"] {
            let first = next_separator(path);
            let last = last_separator(path);
            assert_eq!(first.is_some(), last.is_some(), "{path}");
            assert_eq!(first.is_some(), has_nested(path));
        }
        assert_eq!(last_separator("a(x.y).b[1].c"), Some(11));
        assert_eq!(next_separator("a(x.y).b[1].c"), Some(6));
    }

    #[test]
    fn resolver_helpers() {
        assert_eq!(next("a.b.c"), "a");
        assert_eq!(remove("a.b.c"), Some("b.c"));
        assert_eq!(remove("a"), None);
        assert_eq!(split_last("a.b.c"), (Some("a.b"), "c"));

        assert!(is_indexed("list[1].x"));
        assert!(!is_indexed("m(k[1])"));
        assert!(is_mapped("m(k)"));
        assert!(!is_mapped("a.m(k)"));

        assert_eq!(property_name("list[1].x"), "list");
        assert_eq!(key("m(k).x"), Some("k"));
        assert_eq!(index("list[7]"), Ok(Some(7)));
        assert_eq!(index("list"), Ok(None));
    }
}

//! URI path template expansion (the `{name}` / `{+name}` subset of RFC 6570).
//!
//! Generated clients keep request paths as templates such as
//! `v1/{+name}:cancel` and expand them once per call with that call's
//! parameter values. Only two expression forms are understood:
//!
//! - `{name}`: simple expansion, everything except unreserved characters
//!   (`A-Z a-z 0-9 - . _ ~`) is percent-encoded;
//! - `{+name}`: reserved expansion, RFC 3986 reserved characters
//!   (`:/?#[]@!$&'()*+,;=`) are additionally left as they are.
//!
//! A name missing from the expansion map expands to the empty string. A `{`
//! that is not closed before the next `{` (or the end of the template) is a
//! literal and comes out as `%7B`.
//!
//! [`expand`] works on path text only: a literal `?` or `#` is escaped like any
//! other character. Use [`expand_url`] for a URL that carries a query or a
//! fragment.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use url::{Position, Url};

/// Characters escaped by simple expansion: everything but unreserved.
const SIMPLE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters escaped by reserved expansion: everything but unreserved and reserved.
const RESERVED: &AsciiSet = &SIMPLE
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Characters escaped in the literal (non-expression) parts of a template.
///
/// Literal text is already in path form, so existing `%XX` escapes and
/// path-legal delimiters are kept; only bytes that can never appear raw in an
/// escaped path are encoded.
const LITERAL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// How a substituted value is percent-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionMode {
    /// `{name}`: only unreserved characters pass through.
    Simple,
    /// `{+name}`: unreserved and reserved characters pass through.
    Reserved,
}

impl ExpansionMode {
    fn ascii_set(self) -> &'static AsciiSet {
        match self {
            Self::Simple => SIMPLE,
            Self::Reserved => RESERVED,
        }
    }
}

/// Percent-encodes `value` for substitution into a path.
///
/// Multi-byte UTF-8 sequences are escaped byte by byte with uppercase hex
/// digits, e.g. `£` becomes `%C2%A3`.
#[must_use]
pub fn escape(value: &str, mode: ExpansionMode) -> String {
    utf8_percent_encode(value, mode.ascii_set()).to_string()
}

/// Source of placeholder values for [`expand`].
///
/// Lookups are by exact (case-sensitive) name.
pub trait Expansions {
    /// Returns the value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<K, V, S> Expansions for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Expansions for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Expansions for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_ref())
    }
}

impl<K, V, const N: usize> Expansions for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.as_slice().lookup(name)
    }
}

impl<T: Expansions + ?Sized> Expansions for &T {
    fn lookup(&self, name: &str) -> Option<&str> {
        (**self).lookup(name)
    }
}

/// Expands every `{name}` / `{+name}` expression in `template`.
///
/// `template` is a path, optionally prefixed with scheme and host, without a
/// query or fragment. The result is an escaped path string: substituted values
/// are encoded per their [`ExpansionMode`], and literal text has characters
/// that are illegal in a path (space, `?`, `#`, stray braces, non-ASCII, ...)
/// percent-encoded.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use googleapi::uri_template::expand;
///
/// let values = HashMap::from([("bucket", "red/blue"), ("object", "a/b")]);
/// assert_eq!(expand("b/{bucket}/o/{+object}", &values), "b/red%2Fblue/o/a/b");
/// ```
#[must_use]
pub fn expand<E: Expansions + ?Sized>(template: &str, values: &E) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        push_literal(&mut out, &rest[..open]);
        let after = &rest[open + 1..];

        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                push_expression(&mut out, &after[..close], values);
                rest = &after[close + 1..];
            }
            Some(next_open) => {
                // Unterminated: the brace is literal, rescan from the next one.
                tracing::trace!(template, "unterminated template expression");
                out.push_str("%7B");
                push_literal(&mut out, &after[..next_open]);
                rest = &after[next_open..];
            }
            None => {
                tracing::trace!(template, "unterminated template expression");
                out.push_str("%7B");
                rest = after;
                break;
            }
        }
    }

    push_literal(&mut out, rest);
    out
}

/// Expands the path of `url` and returns the resulting URL text.
///
/// Scheme, host, query and fragment are copied unchanged. Braces that the URL
/// parser escaped (`%7B` / `%7D`) are treated as template delimiters. The
/// expanded path is not re-parsed, so a value such as `..` stays a literal
/// segment instead of being collapsed by dot-segment normalization.
///
/// ```
/// use googleapi::uri_template::expand_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/b/{bucket}/o?alt=json")?;
/// assert_eq!(
///     expand_url(&url, &[("bucket", "a b")]),
///     "https://example.com/b/a%20b/o?alt=json"
/// );
/// # Ok::<(), url::ParseError>(())
/// ```
#[must_use]
pub fn expand_url<E: Expansions + ?Sized>(url: &Url, values: &E) -> String {
    let template = unescape_braces(url.path());
    let mut out = String::from(&url[..Position::BeforePath]);
    out.push_str(&expand(&template, values));
    out.push_str(&url[Position::AfterPath..]);
    out
}

fn push_literal(out: &mut String, literal: &str) {
    out.extend(utf8_percent_encode(literal, LITERAL));
}

fn push_expression<E: Expansions + ?Sized>(out: &mut String, body: &str, values: &E) {
    let (name, mode) = match body.strip_prefix('+') {
        Some(name) => (name, ExpansionMode::Reserved),
        None => (body, ExpansionMode::Simple),
    };
    if let Some(value) = values.lookup(name) {
        out.extend(utf8_percent_encode(value, mode.ascii_set()));
    }
}

pub(crate) fn unescape_braces(path: &str) -> String {
    path.replace("%7B", "{")
        .replace("%7b", "{")
        .replace("%7D", "}")
        .replace("%7d", "}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_expand_table() {
        let cases: &[(&str, &[(&str, &str)], &str)] = &[
            ("http://www.golang.org/", &[], "http://www.golang.org/"),
            (
                "http://www.golang.org/{bucket}/delete",
                &[("bucket", "red")],
                "http://www.golang.org/red/delete",
            ),
            (
                "http://www.golang.org/{bucket}/delete",
                &[("bucket", "red/blue")],
                "http://www.golang.org/red%2Fblue/delete",
            ),
            (
                "http://www.golang.org/{bucket}/delete",
                &[("bucket", "red or blue")],
                "http://www.golang.org/red%20or%20blue/delete",
            ),
            (
                "http://www.golang.org/{object}/delete",
                &[("bucket", "red or blue")],
                "http://www.golang.org//delete",
            ),
            (
                "http://www.golang.org/{one}/{two}/{three}/get",
                &[("one", "ONE"), ("two", "TWO"), ("three", "THREE")],
                "http://www.golang.org/ONE/TWO/THREE/get",
            ),
            (
                "http://www.golang.org/{bucket}/get",
                &[("bucket", "\u{a3}100")],
                "http://www.golang.org/%C2%A3100/get",
            ),
            (
                "http://www.golang.org/{bucket}/get",
                &[("bucket", r"/\@:,.")],
                "http://www.golang.org/%2F%5C%40%3A%2C./get",
            ),
            (
                "http://www.golang.org/{bucket/get",
                &[("bucket", "red")],
                "http://www.golang.org/%7Bbucket/get",
            ),
            (
                "http://www.golang.org/{+topic}",
                &[("topic", "/topics/myproject/mytopic")],
                "http://www.golang.org//topics/myproject/mytopic",
            ),
        ];

        for (i, (template, pairs, want)) in cases.iter().enumerate() {
            let got = expand(template, &values(pairs));
            assert_eq!(&got, want, "case {}", i + 1);
        }
    }

    #[test]
    fn test_simple_mode_round_trips_through_decode() {
        let inputs = [
            "plain",
            "with space",
            "a/b?c#d[e]@f",
            "!$&'()*+,;=",
            "-._~",
            "\u{a3}100 \u{20ac} \u{65e5}\u{672c}",
            "100%",
        ];
        for input in inputs {
            let got = expand("{v}", &[("v", input)]);
            let decoded = percent_decode_str(&got).decode_utf8().unwrap();
            assert_eq!(decoded, input, "escaped form: {got}");
        }
    }

    #[test]
    fn test_reserved_and_simple_modes_differ_on_slash() {
        let vals = [("name", "/a/b")];
        assert_eq!(expand("{+name}", &vals), "/a/b");
        assert_eq!(expand("{name}", &vals), "%2Fa%2Fb");
    }

    #[test]
    fn test_reserved_mode_escapes_non_reserved() {
        let vals = [("name", "a b%c\u{e9}:d")];
        assert_eq!(expand("{+name}", &vals), "a%20b%25c%C3%A9:d");
    }

    #[test]
    fn test_unterminated_brace_before_next_expression() {
        let vals = [("b", "x")];
        assert_eq!(expand("{a/{b}/c", &vals), "%7Ba/x/c");
    }

    #[test]
    fn test_trailing_unterminated_brace() {
        assert_eq!(expand("a/{", &[("a", "x")]), "a/%7B");
    }

    #[test]
    fn test_stray_closing_brace_is_escaped() {
        assert_eq!(expand("a}/b", &[("a", "x")]), "a%7D/b");
    }

    #[test]
    fn test_empty_expression_expands_to_nothing() {
        assert_eq!(expand("a/{}/b", &[("", "x")]), "a/x/b");
        assert_eq!(expand("a/{}/b", &[("z", "x")]), "a//b");
    }

    #[test]
    fn test_literal_escapes_are_kept() {
        assert_eq!(expand("a%2Fb/{v}", &[("v", "c")]), "a%2Fb/c");
    }

    #[test]
    fn test_expand_accepts_btree_map() {
        let vals = BTreeMap::from([("project".to_owned(), "p 1".to_owned())]);
        assert_eq!(expand("projects/{project}", &vals), "projects/p%201");
    }

    #[test]
    fn test_expand_url_touches_only_path() {
        let url = Url::parse("https://storage.example.com/b/{bucket}/o/{+object}?alt=json#frag")
            .unwrap();
        assert_eq!(
            expand_url(&url, &[("bucket", "my bucket"), ("object", "dir/file.txt")]),
            "https://storage.example.com/b/my%20bucket/o/dir/file.txt?alt=json#frag"
        );
    }

    #[test]
    fn test_expand_url_keeps_dot_segment_values() {
        let url = Url::parse("https://h.example.com/b/{object}/x").unwrap();
        assert_eq!(
            expand_url(&url, &[("object", "..")]),
            "https://h.example.com/b/../x"
        );
        assert_eq!(
            expand_url(&url, &[("object", ".")]),
            "https://h.example.com/b/./x"
        );

        let url = Url::parse("https://h.example.com/v1/{+name}/get").unwrap();
        assert_eq!(
            expand_url(&url, &[("name", "a/../../admin")]),
            "https://h.example.com/v1/a/../../admin/get"
        );
    }

    #[test]
    fn test_expand_url_keeps_port_and_credentials() {
        let url = Url::parse("http://user:pw@localhost:8080/{id}").unwrap();
        assert_eq!(expand_url(&url, &[("id", "7")]), "http://user:pw@localhost:8080/7");
    }

    #[test]
    fn test_expand_escapes_query_delimiters_in_literal_text() {
        assert_eq!(
            expand("b/{bucket}?alt=json#f", &[("bucket", "x")]),
            "b/x%3Falt=json%23f"
        );
    }

    #[test]
    fn test_escape_modes() {
        assert_eq!(escape("a/b c", ExpansionMode::Simple), "a%2Fb%20c");
        assert_eq!(escape("a/b c", ExpansionMode::Reserved), "a/b%20c");
    }
}

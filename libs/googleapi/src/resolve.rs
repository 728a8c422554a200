//! Resolution of templated method paths against a service base URL.
//!
//! Generated clients store each method path as a template relative to the
//! service root, e.g. `{+parent}/workspaces` or `/upload/storage/v1/b/{bucket}/o`.
//! [`resolve_relative`] combines the two once, at request-construction time,
//! and leaves every `{...}` expression in place for the per-call expansion in
//! [`crate::uri_template`].

use thiserror::Error;
use url::Url;

/// Classification of relative-resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveErrorKind {
    /// The base URL is not an absolute URL
    InvalidBase,
    /// The relative reference cannot be parsed as a URL reference
    InvalidReference,
}

/// Failure to resolve a method path against its base URL.
///
/// Both inputs are baked into generated code, so this error means the
/// generator produced a malformed template. Callers should surface it as a
/// bug and never retry.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResolveError {
    /// Base URL failed to parse
    #[error("invalid base URL '{url}': {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Relative reference failed to parse
    #[error("invalid relative reference '{reference}': {reason}")]
    InvalidReference {
        reference: String,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },
}

impl ResolveError {
    /// Returns the failure classification.
    #[must_use]
    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            Self::InvalidBase { .. } => ResolveErrorKind::InvalidBase,
            Self::InvalidReference { .. } => ResolveErrorKind::InvalidReference,
        }
    }
}

/// Resolves the templated reference `rel` against the absolute URL `base`.
///
/// - A reference starting with `/` replaces the base path and keeps the base
///   scheme, host and port (`/upload/...` endpoints live on the same host).
/// - Any other reference is resolved relative to the base path per RFC 3986.
/// - `{...}` expressions are passed through unexpanded; braces and colons
///   inside them never influence the resolution.
/// - A colon after the first path segment (`{+name}:cancel`) is a custom
///   method suffix and is appended verbatim after resolution.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidBase`] if `base` is not an absolute URL and
/// [`ResolveError::InvalidReference`] if `rel` is not a URL reference (for
/// instance `:8080foo`, which has an empty scheme).
///
/// # Example
///
/// ```
/// use googleapi::resolve::resolve_relative;
///
/// let url = resolve_relative("https://www.googleapis.com/tagmanager/v2/", "{+path}:create_version")?;
/// assert_eq!(url, "https://www.googleapis.com/tagmanager/v2/{+path}:create_version");
/// # Ok::<(), googleapi::resolve::ResolveError>(())
/// ```
pub fn resolve_relative(base: &str, rel: &str) -> Result<String, ResolveError> {
    let base_url = Url::parse(base).map_err(|source| ResolveError::InvalidBase {
        url: base.to_owned(),
        source,
    })?;

    let guarded = GuardedTemplate::new(rel, base);
    let text = guarded.text();

    let resolved = match text.find(':') {
        Some(0) => {
            return Err(ResolveError::InvalidReference {
                reference: rel.to_owned(),
                reason: "missing scheme before ':'".to_owned(),
            });
        }
        Some(colon) if is_scheme(&text[..colon]) && text[colon + 1..].starts_with("//") => {
            // Fully qualified URL, the base is irrelevant.
            join(&base_url, text, rel)?
        }
        Some(colon) => {
            let mut joined = join(&base_url, &text[..colon], rel)?;
            joined.push_str(&text[colon..]);
            joined
        }
        None => join(&base_url, text, rel)?,
    };

    Ok(guarded.restore(&resolved))
}

fn join(base: &Url, reference: &str, original: &str) -> Result<String, ResolveError> {
    base.join(reference)
        .map(String::from)
        .map_err(|err| ResolveError::InvalidReference {
            reference: original.to_owned(),
            reason: err.to_string(),
        })
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// A reference with its `{...}` expressions swapped for opaque tokens.
///
/// The tokens consist of unreserved characters only, so URL parsing neither
/// escapes nor normalizes them, and they contain no `:` or `/`.
struct GuardedTemplate {
    text: String,
    marker: String,
    expressions: Vec<String>,
}

impl GuardedTemplate {
    /// Guards `template`; the token marker occurs in neither `template` nor `base`.
    fn new(template: &str, base: &str) -> Self {
        let mut marker = String::from("~x");
        while template.contains(&marker) || base.contains(&marker) {
            marker.insert(0, '~');
        }

        let mut text = String::with_capacity(template.len());
        let mut expressions = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find(['{', '}']) {
                Some(close) if after.as_bytes()[close] == b'}' => {
                    text.push_str(&rest[..open]);
                    text.push_str(&token(&marker, expressions.len()));
                    expressions.push(rest[open..=open + 1 + close].to_owned());
                    rest = &after[close + 1..];
                }
                Some(next_open) => {
                    text.push_str(&rest[..=open + next_open]);
                    rest = &after[next_open..];
                }
                None => break,
            }
        }
        text.push_str(rest);

        Self {
            text,
            marker,
            expressions,
        }
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn restore(&self, resolved: &str) -> String {
        let mut out = crate::uri_template::unescape_braces(resolved);
        for (i, expression) in self.expressions.iter().enumerate() {
            out = out.replacen(&token(&self.marker, i), expression, 1);
        }
        out
    }
}

fn token(marker: &str, index: usize) -> String {
    format!("{marker}{index}~")
}

//! Protocol-tagged URI parsing and store-form serialization for Truth
//! documents (`spec.md` §3 `Subject::Uri`, §4.2 step 5, §6).
//!
//! Truth's *source* syntax for a URI statement is a registered protocol tag
//! immediately followed by `//` and a path, terminated by whitespace —
//! `file//project/module`, not the RFC 3986 `file:///project/module`. The
//! *store form* used for equality/serialization restores the familiar
//! `protocol://path` shape, optionally suffixed with a type path:
//! `protocol://path[/typePath]`.

use std::fmt;

/// The closed set of protocols a Truth URI can be tagged with
/// (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    File,
    Http,
    Https,
    Internal,
    None,
    Unknown,
}

impl Protocol {
    pub const ALL: [Protocol; 6] =
        [Protocol::File, Protocol::Http, Protocol::Https, Protocol::Internal, Protocol::None, Protocol::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::File => "file",
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Internal => "internal",
            Protocol::None => "none",
            Protocol::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Protocol> {
        match s {
            "file" => Some(Protocol::File),
            "http" => Some(Protocol::Http),
            "https" => Some(Protocol::Https),
            "internal" => Some(Protocol::Internal),
            "none" => Some(Protocol::None),
            "unknown" => Some(Protocol::Unknown),
            _ => None,
        }
    }

    /// Whether this protocol is a real network scheme, as opposed to one of
    /// the three internal bookkeeping protocols.
    pub fn is_web(&self) -> bool {
        matches!(self, Protocol::Http | Protocol::Https)
    }

    /// `spec.md` §6: "URI omitted when protocol ∈ {internal, none, unknown}"
    /// in fault rendering.
    pub fn is_omitted_from_rendering(&self) -> bool {
        matches!(self, Protocol::Internal | Protocol::None | Protocol::Unknown)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A protocol-tagged Truth URI.
#[derive(Debug, Clone)]
pub struct Uri {
    protocol: Protocol,
    path: String,
    type_path: Option<String>,
}

impl Uri {
    pub fn new(protocol: Protocol, path: impl Into<String>) -> Self {
        Uri { protocol, path: normalize_path(&path.into()), type_path: None }
    }

    pub fn with_type_path(mut self, type_path: impl Into<String>) -> Self {
        self.type_path = Some(type_path.into());
        self
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn type_path(&self) -> Option<&str> {
        self.type_path.as_deref()
    }

    /// Attempts to read one URI token from the start of `text`, per
    /// `spec.md` §4.2 step 5: for each registered protocol prefix
    /// `<proto>//`, try to read a URI terminated by whitespace.
    ///
    /// Returns the parsed `Uri` and the number of bytes consumed from
    /// `text` (the protocol tag, the `//`, and the path — not any trailing
    /// whitespace).
    pub fn parse_source(text: &str) -> Option<(Uri, usize)> {
        for protocol in Protocol::ALL {
            let prefix = protocol.as_str();
            let tagged = format!("{prefix}//");
            if let Some(rest) = text.strip_prefix(tagged.as_str()) {
                let path_len = rest.find([' ', '\t']).unwrap_or(rest.len());
                if path_len == 0 {
                    continue;
                }
                let path = &rest[..path_len];
                let (path, type_path) = split_type_path(path);
                let mut uri = Uri::new(protocol, path);
                if let Some(tp) = type_path {
                    uri = uri.with_type_path(tp);
                }
                return Some((uri, tagged.len() + path_len));
            }
        }
        None
    }

    /// The canonical serialized form used for equality and as a lookup key:
    /// `protocol://path[/typePath]` (`spec.md` §6).
    pub fn store_string(&self) -> String {
        match &self.type_path {
            Some(tp) => format!("{}://{}/{}", self.protocol, self.path, tp),
            None => format!("{}://{}", self.protocol, self.path),
        }
    }

    /// Resolves `relative` against this URI the way a relative import would
    /// resolve against its containing document (`spec.md` §2 Uri
    /// component: "relative resolution").
    ///
    /// `relative` starting with a registered protocol tag is treated as
    /// absolute and parsed on its own; otherwise it is joined onto this
    /// URI's path using POSIX-style `..`/`.` segment resolution.
    pub fn resolve_relative(&self, relative: &str) -> Uri {
        if let Some((uri, _)) = Uri::parse_source(relative) {
            return uri;
        }
        let joined = join_path(&self.path, relative);
        Uri::new(self.protocol, joined)
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.store_string() == other.store_string()
    }
}
impl Eq for Uri {}

impl std::hash::Hash for Uri {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.store_string().hash(state);
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.store_string())
    }
}

fn split_type_path(path: &str) -> (&str, Option<&str>) {
    // A type-path suffix is distinguished from an ordinary path segment by
    // a trailing `#` marker (the path proper never contains one).
    match path.split_once('#') {
        Some((base, type_path)) if !type_path.is_empty() => (base, Some(type_path)),
        _ => (path, None),
    }
}

fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn join_path(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    if !segments.is_empty() {
        segments.pop(); // drop the base's own file segment
    }
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Checks whether a referring document's protocol would make a `file://`
/// target an insecure downgrade (`spec.md` §4.7 step 4).
pub fn is_insecure_reference(referrer_protocol: Protocol, target_protocol: Protocol) -> bool {
    referrer_protocol.is_web() && target_protocol == Protocol::File
}

/// Validates that a `http`/`https` URI's path is well-formed once rendered
/// in its store form, using `url::Url` rather than hand-rolled RFC 3986
/// validation.
pub fn validate_web_uri(uri: &Uri) -> bool {
    if !uri.protocol().is_web() {
        return true;
    }
    url::Url::parse(&uri.store_string()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_protocol_prefix() {
        let (uri, len) = Uri::parse_source("file//a/b.truth rest of line").expect("parses");
        assert_eq!(uri.protocol(), Protocol::File);
        assert_eq!(uri.path(), "a/b.truth");
        assert_eq!(len, "file//a/b.truth".len());
    }

    #[test]
    fn unknown_prefix_does_not_match() {
        assert!(Uri::parse_source("ftp//a/b").is_none());
    }

    #[test]
    fn store_string_round_trips_protocol_and_path() {
        let uri = Uri::new(Protocol::Https, "example.com/lib");
        assert_eq!(uri.store_string(), "https://example.com/lib");
    }

    #[test]
    fn equality_compares_normalized_protocol_and_path() {
        let a = Uri::new(Protocol::File, "/a/b/");
        let b = Uri::new(Protocol::File, "a/b");
        assert_eq!(a, b);
    }

    #[test]
    fn type_path_is_serialized_and_parsed() {
        let (uri, _) = Uri::parse_source("internal//lib/core#Number end").expect("parses");
        assert_eq!(uri.path(), "lib/core");
        assert_eq!(uri.type_path(), Some("Number"));
        assert_eq!(uri.store_string(), "internal://lib/core/Number");
    }

    #[test]
    fn insecure_reference_flags_file_from_https() {
        assert!(is_insecure_reference(Protocol::Https, Protocol::File));
        assert!(!is_insecure_reference(Protocol::File, Protocol::File));
        assert!(!is_insecure_reference(Protocol::Http, Protocol::Https));
    }

    #[test]
    fn resolve_relative_joins_sibling_path() {
        let base = Uri::new(Protocol::File, "project/a/b.truth");
        let resolved = base.resolve_relative("../c.truth");
        assert_eq!(resolved.path(), "project/c.truth");
    }

    #[test]
    fn validate_web_uri_accepts_well_formed_https() {
        let uri = Uri::new(Protocol::Https, "example.com/lib");
        assert!(validate_web_uri(&uri));
    }

    #[test]
    fn validate_web_uri_ignores_non_web_protocols() {
        let uri = Uri::new(Protocol::Internal, "lib/core");
        assert!(validate_web_uri(&uri));
    }

    #[test]
    fn resolve_relative_with_absolute_protocol_ignores_base() {
        let base = Uri::new(Protocol::File, "project/a.truth");
        let resolved = base.resolve_relative("https//example.com/x");
        assert_eq!(resolved.protocol(), Protocol::Https);
    }
}

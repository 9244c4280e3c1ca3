use std::fmt;
use std::str::FromStr;

use crate::error::NegotiationError;

/// The `*` wildcard, valid as a whole type (`*/*`) or as a subtype.
pub const WILDCARD: &str = "*";

/// A parsed media type: `type/subtype` plus ordered parameters.
///
/// Type, subtype and parameter names are kept lowercase. Parameter values
/// are stored verbatim, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeType {
    type_: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl MimeType {
    /// Parse a single media-type token such as `text/plain;version=0.0.4`.
    ///
    /// A bare `*` is read as `*/*`. Parameters without `=` are skipped.
    pub fn parse(input: &str) -> Result<Self, NegotiationError> {
        if input.trim().is_empty() {
            return Err(NegotiationError::parse(input, "must not be empty"));
        }

        let (full_type, params) = match input.find(';') {
            Some(i) => (&input[..i], Some(&input[i + 1..])),
            None => (input, None),
        };
        let mut full_type = full_type.trim();
        if full_type == WILDCARD {
            full_type = "*/*";
        }

        let slash = full_type
            .find('/')
            .ok_or_else(|| NegotiationError::parse(input, "does not contain '/'"))?;
        if slash == full_type.len() - 1 {
            return Err(NegotiationError::parse(
                input,
                "does not contain subtype after '/'",
            ));
        }

        let type_ = &full_type[..slash];
        let subtype = &full_type[slash + 1..];
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(NegotiationError::parse(
                input,
                "wildcard type is legal only in '*/*' (all media types)",
            ));
        }
        check_token(input, type_)?;
        check_token(input, subtype)?;

        let mut parameters = Vec::new();
        if let Some(params) = params {
            for param in split_unquoted(params, ';') {
                let param = param.trim();
                let Some(eq) = param.find('=') else {
                    continue;
                };
                let name = param[..eq].trim();
                let value = param[eq + 1..].trim();
                check_token(input, name)?;
                if !is_quoted(value) {
                    check_token(input, value)?;
                }
                upsert(&mut parameters, name.to_ascii_lowercase(), value.to_owned());
            }
        }

        Ok(Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters,
        })
    }

    /// Build a media type from compile-time constants.
    ///
    /// # Panics
    ///
    /// Panics if any part is not a valid token, like
    /// `http::HeaderValue::from_static`.
    pub fn from_static(
        type_: &'static str,
        subtype: &'static str,
        parameters: &[(&'static str, &'static str)],
    ) -> Self {
        assert!(is_token(type_), "invalid media type: {type_}");
        assert!(is_token(subtype), "invalid media subtype: {subtype}");
        let mut params = Vec::with_capacity(parameters.len());
        for &(name, value) in parameters {
            assert!(is_token(name), "invalid parameter name: {name}");
            assert!(
                is_token(value) || is_quoted(value),
                "invalid parameter value: {value}"
            );
            upsert(&mut params, name.to_ascii_lowercase(), value.to_owned());
        }
        Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: params,
        }
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Raw value of the named parameter (case-insensitive name).
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == WILDCARD
    }

    /// `*` or a suffixed wildcard such as `*+json`.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD || self.subtype.starts_with("*+")
    }

    /// Structured syntax suffix: `json` for `vnd.api+json`.
    pub fn subtype_suffix(&self) -> Option<&str> {
        let i = self.subtype.rfind('+')?;
        let suffix = &self.subtype[i + 1..];
        (!suffix.is_empty()).then_some(suffix)
    }

    /// Whether either type covers the other. Symmetric; parameters ignored.
    pub fn is_compatible_with(&self, other: &MimeType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        if self.type_ != other.type_ {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if !(self.is_wildcard_subtype() || other.is_wildcard_subtype()) {
            return false;
        }
        if self.subtype == WILDCARD || other.subtype == WILDCARD {
            return true;
        }

        let this_suffix = self.subtype_suffix();
        let other_suffix = other.subtype_suffix();
        if self.is_wildcard_subtype() {
            if let Some(suffix) = this_suffix {
                return suffix == other.subtype || Some(suffix) == other_suffix;
            }
        } else if let Some(suffix) = other_suffix {
            return self.subtype == suffix || Some(suffix) == this_suffix;
        }
        false
    }

    pub fn equals_type_and_subtype(&self, other: &MimeType) -> bool {
        self.type_.eq_ignore_ascii_case(&other.type_)
            && self.subtype.eq_ignore_ascii_case(&other.subtype)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for MimeType {
    type Err = NegotiationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split an `Accept`-style header element into its media-type tokens.
///
/// Commas inside quoted strings do not split. Blank entries are dropped.
pub fn tokenize(header: &str) -> Vec<&str> {
    split_unquoted(header, ',')
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

// ─── Helpers ─────────────────────────────────────────────────────

fn split_unquoted(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn upsert(params: &mut Vec<(String, String)>, name: String, value: String) {
    match params.iter_mut().find(|(k, _)| *k == name) {
        Some(slot) => slot.1 = value,
        None => params.push((name, value)),
    }
}

fn check_token(input: &str, token: &str) -> Result<(), NegotiationError> {
    if is_token(token) {
        Ok(())
    } else {
        Err(NegotiationError::parse(
            input,
            format!("invalid token \"{token}\""),
        ))
    }
}

/// RFC 7230 `token`: one or more `tchar`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mime(s: &str) -> MimeType {
        MimeType::parse(s).unwrap()
    }

    #[test]
    fn parses_type_subtype_and_parameters() {
        let m = mime("Text/Plain; version=0.0.4; charset=utf-8");
        assert_eq!(m.type_(), "text");
        assert_eq!(m.subtype(), "plain");
        assert_eq!(m.parameter("version"), Some("0.0.4"));
        assert_eq!(m.parameter("CHARSET"), Some("utf-8"));
        assert_eq!(m.to_string(), "text/plain;version=0.0.4;charset=utf-8");
    }

    #[test]
    fn bare_wildcard_is_all_types() {
        let m = mime("*");
        assert!(m.is_wildcard_type());
        assert!(m.is_wildcard_subtype());
    }

    #[test]
    fn quoted_parameter_keeps_separators() {
        let m = mime(r#"multipart/mixed; boundary="a;b,c""#);
        assert_eq!(m.parameter("boundary"), Some(r#""a;b,c""#));
    }

    #[test]
    fn parameter_without_value_is_ignored() {
        let m = mime("text/html; level; q=0.5");
        assert_eq!(m.parameters().len(), 1);
        assert_eq!(m.parameter("q"), Some("0.5"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in [
            "",
            "   ",
            "not a mime type",
            "text",
            "text/",
            "*/json",
            "/json",
            "text/pl ain",
            "text/plain; ver sion=1",
        ] {
            let err = MimeType::parse(bad).unwrap_err();
            assert!(
                matches!(err, NegotiationError::Parse { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn parse_error_names_the_input() {
        let err = MimeType::parse("not a mime type").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid media type \"not a mime type\": does not contain '/'"
        );
    }

    #[test]
    fn wildcards_are_compatible_both_ways() {
        let all = mime("*/*");
        let json = mime("application/json");
        let app = mime("application/*");
        let text = mime("text/plain");

        assert!(all.is_compatible_with(&json));
        assert!(json.is_compatible_with(&all));
        assert!(app.is_compatible_with(&json));
        assert!(json.is_compatible_with(&app));
        assert!(!app.is_compatible_with(&text));
        assert!(!json.is_compatible_with(&text));
    }

    #[test]
    fn compatibility_ignores_parameters() {
        let a = mime("application/openmetrics-text; version=1.0.0; charset=utf-8");
        let b = mime("application/openmetrics-text; version=0.0.1");
        assert!(a.is_compatible_with(&b));
    }

    #[test]
    fn suffix_wildcards() {
        let any_json = mime("application/*+json");
        assert!(any_json.is_compatible_with(&mime("application/json")));
        assert!(any_json.is_compatible_with(&mime("application/vnd.api+json")));
        assert!(mime("application/vnd.api+json").is_compatible_with(&any_json));
        assert!(!any_json.is_compatible_with(&mime("application/xml")));
        assert!(!any_json.is_compatible_with(&mime("application/vnd.api+xml")));
    }

    #[test]
    fn equal_type_and_subtype_ignores_case_and_parameters() {
        let a = mime("application/openmetrics-text; version=1.0.0");
        let b = MimeType::from_static("application", "OpenMetrics-Text", &[]);
        assert!(a.equals_type_and_subtype(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn tokenize_splits_outside_quotes() {
        assert_eq!(
            tokenize(r#"text/plain;q=0.5, application/x;p="a,b" ,, */*"#),
            vec!["text/plain;q=0.5", r#"application/x;p="a,b""#, "*/*"]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize(" , ").is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid media subtype")]
    fn from_static_rejects_bad_tokens() {
        MimeType::from_static("text", "pla in", &[]);
    }
}

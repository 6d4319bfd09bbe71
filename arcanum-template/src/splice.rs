//! Marker-anchored text splicing.
//!
//! Every mutation of a template is the same operation: find the first
//! occurrence of a closing marker and put a fragment right before it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TemplateError, TemplateResult};

/// Closing tags that mutations are anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `</head>`: meta tags and font links
    Head,
    /// `</style>`: CSS rules
    Style,
    /// `</body>`: inserted tags
    Body,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::Head, Marker::Style, Marker::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Head => "</head>",
            Marker::Style => "</style>",
            Marker::Body => "</body>",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a splice cannot find its marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMarkerPolicy {
    /// Leave the document untouched and say nothing
    Ignore,
    /// Leave the document untouched and report a warning
    #[default]
    Warn,
    /// Append the fragment at the end of the document
    Append,
}

impl FromStr for MissingMarkerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(MissingMarkerPolicy::Ignore),
            "warn" => Ok(MissingMarkerPolicy::Warn),
            "append" => Ok(MissingMarkerPolicy::Append),
            other => Err(format!(
                "unknown missing-marker policy '{}': expected ignore, warn or append",
                other
            )),
        }
    }
}

/// Insert `fragment` immediately before the first occurrence of `marker`.
///
/// Returns `doc` unchanged when the marker is absent. Not idempotent:
/// inserting the same fragment twice leaves two copies.
pub fn insert_fragment(doc: &str, fragment: &str, marker: Marker) -> String {
    try_insert_fragment(doc, fragment, marker).unwrap_or_else(|_| doc.to_string())
}

/// Like [`insert_fragment`] but reports a missing marker as an error
pub fn try_insert_fragment(doc: &str, fragment: &str, marker: Marker) -> TemplateResult<String> {
    let needle = marker.as_str();
    let idx = doc.find(needle).ok_or_else(|| TemplateError::MarkerNotFound {
        marker: needle.to_string(),
    })?;

    let mut out = String::with_capacity(doc.len() + fragment.len());
    out.push_str(&doc[..idx]);
    out.push_str(fragment);
    out.push_str(&doc[idx..]);
    Ok(out)
}

/// Markers that are absent from `doc`, in head/style/body order
pub fn missing_markers(doc: &str) -> Vec<Marker> {
    Marker::ALL
        .into_iter()
        .filter(|m| !doc.contains(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "<html><head><style>body{}</style></head><body><p>x</p></body></html>";

    #[test]
    fn test_insert_before_marker() {
        let out = insert_fragment(DOC, "<hr />", Marker::Body);
        let idx = DOC.find("</body>").unwrap();
        assert_eq!(out, format!("{}<hr />{}", &DOC[..idx], &DOC[idx..]));
    }

    #[test]
    fn test_missing_marker_is_identity() {
        let doc = "<div>no markers here</div>";
        for marker in Marker::ALL {
            assert_eq!(insert_fragment(doc, "<b>x</b>", marker), doc);
        }
    }

    #[test]
    fn test_try_insert_reports_missing_marker() {
        let err = try_insert_fragment("<p></p>", "x", Marker::Style).unwrap_err();
        assert!(matches!(err, TemplateError::MarkerNotFound { ref marker } if marker == "</style>"));
    }

    #[test]
    fn test_insert_is_not_idempotent() {
        let once = insert_fragment(DOC, "<hr />", Marker::Body);
        let twice = insert_fragment(&once, "<hr />", Marker::Body);
        assert_eq!(twice.matches("<hr />").count(), 2);
    }

    #[test]
    fn test_only_first_marker_is_used() {
        let doc = "<style>a{}</style><style>b{}</style>";
        let out = insert_fragment(doc, "c{}", Marker::Style);
        assert_eq!(out, "<style>a{}c{}</style><style>b{}</style>");
    }

    #[test]
    fn test_missing_markers() {
        assert!(missing_markers(DOC).is_empty());
        assert_eq!(
            missing_markers("<head></head>"),
            vec![Marker::Style, Marker::Body]
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("append".parse::<MissingMarkerPolicy>(), Ok(MissingMarkerPolicy::Append));
        assert!("loud".parse::<MissingMarkerPolicy>().is_err());
    }
}

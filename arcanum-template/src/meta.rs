use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};
use crate::tag::escape_attribute;

/// Kind of meta tag, as chosen in the meta tag form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetaKind {
    #[default]
    Standard,
    OpenGraph,
    Twitter,
}

/// One pending `<meta>` entry.
///
/// Entries with a `property` render as `property=`, the rest as `name=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MetaKind,
}

impl MetaTag {
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            property: None,
            content: content.into(),
            kind: MetaKind::Standard,
        }
    }

    pub fn property(property: impl Into<String>, content: impl Into<String>) -> Self {
        let property = property.into();
        let kind = if property.starts_with("twitter:") {
            MetaKind::Twitter
        } else {
            MetaKind::OpenGraph
        };
        Self {
            name: None,
            property: Some(property),
            content: content.into(),
            kind,
        }
    }

    /// Parse `name=content` or `og:title=content` style input; keys with a
    /// colon prefix (`og:`, `article:`, `fb:`) become properties.
    pub fn parse(pair: &str) -> TemplateResult<Self> {
        let (key, content) = pair.split_once('=').ok_or_else(|| TemplateError::InvalidMetaTag {
            reason: format!("expected key=content, got '{}'", pair),
        })?;
        let key = key.trim();
        let tag = if key.contains(':') && !key.starts_with("twitter:") {
            MetaTag::property(key, content)
        } else if key.starts_with("twitter:") {
            MetaTag {
                kind: MetaKind::Twitter,
                ..MetaTag::named(key, content)
            }
        } else {
            MetaTag::named(key, content)
        };
        tag.validate()?;
        Ok(tag)
    }

    fn key(&self) -> Option<&str> {
        self.property
            .as_deref()
            .or(self.name.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// An entry needs a name or property, and content
    pub fn validate(&self) -> TemplateResult<()> {
        if self.key().is_none() {
            return Err(TemplateError::InvalidMetaTag {
                reason: "name or property is required".to_string(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(TemplateError::InvalidMetaTag {
                reason: "content is required".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_html(&self) -> String {
        let content = escape_attribute(&self.content);
        match (&self.property, &self.name) {
            (Some(property), _) => format!(
                r#"<meta property="{}" content="{}" />"#,
                escape_attribute(property),
                content
            ),
            (None, Some(name)) => format!(
                r#"<meta name="{}" content="{}" />"#,
                escape_attribute(name),
                content
            ),
            (None, None) => format!(r#"<meta content="{}" />"#, content),
        }
    }
}

/// One `<meta .../>` line per entry, in order, each newline-terminated
pub fn build_meta_block(entries: &[MetaTag]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_html());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_keeps_order_and_attribute_kind() {
        let block = build_meta_block(&[
            MetaTag::named("description", "X"),
            MetaTag::property("og:title", "Y"),
        ]);
        assert_eq!(
            block,
            "<meta name=\"description\" content=\"X\" />\n<meta property=\"og:title\" content=\"Y\" />\n"
        );
    }

    #[test]
    fn test_validate_requires_key_and_content() {
        assert!(MetaTag::named("author", "Selene").validate().is_ok());
        assert!(MetaTag::named("", "Selene").validate().is_err());
        assert!(MetaTag::named("author", "  ").validate().is_err());
        let keyless = MetaTag {
            name: None,
            property: None,
            content: "x".to_string(),
            kind: MetaKind::Standard,
        };
        assert!(keyless.validate().is_err());
    }

    #[test]
    fn test_parse_pairs() {
        let og = MetaTag::parse("og:image=https://example.com/a.png").unwrap();
        assert_eq!(og.property.as_deref(), Some("og:image"));
        assert_eq!(og.kind, MetaKind::OpenGraph);

        let tw = MetaTag::parse("twitter:card=summary").unwrap();
        assert_eq!(tw.name.as_deref(), Some("twitter:card"));
        assert_eq!(tw.kind, MetaKind::Twitter);

        let plain = MetaTag::parse("keywords=tarot, astrologia").unwrap();
        assert_eq!(plain.to_html(), r#"<meta name="keywords" content="tarot, astrologia" />"#);

        assert!(MetaTag::parse("nocontent").is_err());
        assert!(MetaTag::parse("robots=").is_err());
    }

    #[test]
    fn test_content_escaped() {
        let tag = MetaTag::named("description", r#"Lo "oculto" & lo visible"#);
        assert_eq!(
            tag.to_html(),
            r#"<meta name="description" content="Lo &quot;oculto&quot; &amp; lo visible" />"#
        );
    }

    #[test]
    fn test_persisted_kinds() {
        let tag: MetaTag =
            serde_json::from_str(r#"{"property":"og:title","content":"Y","type":"open-graph"}"#)
                .unwrap();
        assert_eq!(tag.kind, MetaKind::OpenGraph);
        assert_eq!(tag.to_html(), r#"<meta property="og:title" content="Y" />"#);

        let untyped: MetaTag = serde_json::from_str(r#"{"name":"author","content":"Selene"}"#).unwrap();
        assert_eq!(untyped.kind, MetaKind::Standard);

        let http_equiv =
            serde_json::from_str::<MetaTag>(r#"{"name":"refresh","content":"5","type":"http-equiv"}"#);
        assert!(http_equiv.is_err());
    }
}

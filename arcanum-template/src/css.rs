//! CSS rule fragments spliced before `</style>`.

use std::fmt;

/// A single-declaration CSS rule with a leading comment line
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub comment: String,
    pub selector: String,
    pub property: String,
    pub value: String,
}

impl CssRule {
    pub fn new(
        comment: impl Into<String>,
        selector: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            comment: comment.into(),
            selector: selector.into(),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Rendered fragment, ready for insertion
    pub fn to_fragment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n/* {} */\n{} {{\n  {}: {};\n}}\n",
            sanitize_comment(&self.comment),
            self.selector.trim(),
            self.property,
            self.value
        )
    }
}

fn sanitize_comment(s: &str) -> String {
    s.replace("*/", "* /")
}

/// Quote a font family for use in `font-family`
fn quote_family(family: &str) -> String {
    format!("'{}'", family.replace('\'', "\\'"))
}

/// Generic fallback family for a Google Fonts category
pub fn generic_family(category: &str) -> &'static str {
    match category {
        "serif" => "serif",
        "monospace" => "monospace",
        "handwriting" => "cursive",
        "display" => "cursive",
        _ => "sans-serif",
    }
}

/// `selector { <property>: <color>; }`
pub fn color_rule(name: &str, selector: &str, property: &str, color: &str) -> CssRule {
    CssRule::new(format!("Color: {}", name), selector, property, color)
}

/// `selector { background: <gradient>; }`
pub fn gradient_rule(name: &str, selector: &str, gradient_css: &str) -> CssRule {
    CssRule::new(format!("Gradient: {}", name), selector, "background", gradient_css)
}

/// `selector { font-family: '<family>', <generic>; }`
pub fn font_rule(family: &str, category: &str, selector: &str) -> CssRule {
    CssRule::new(
        format!("Font: {}", family),
        selector,
        "font-family",
        format!("{}, {}", quote_family(family), generic_family(category)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_color_rule_fragment() {
        let rule = color_rule("Amatista", "h1, h2", "color", "#7b2cbf");
        assert_eq!(
            rule.to_fragment(),
            "\n/* Color: Amatista */\nh1, h2 {\n  color: #7b2cbf;\n}\n"
        );
    }

    #[test]
    fn test_font_rule_uses_generic_fallback() {
        let rule = font_rule("Playfair Display", "serif", "body");
        assert_eq!(rule.value, "'Playfair Display', serif");
        assert_eq!(font_rule("Roboto", "sans-serif", "body").value, "'Roboto', sans-serif");
        assert_eq!(font_rule("Pacifico", "handwriting", "h1").value, "'Pacifico', cursive");
    }

    #[test]
    fn test_gradient_rule_property() {
        let rule = gradient_rule("Aurora", ".hero", "linear-gradient(90deg, #000000, #ffffff)");
        assert_eq!(rule.property, "background");
        assert!(rule.to_fragment().contains(".hero {\n  background: linear-gradient("));
    }

    #[test]
    fn test_comment_cannot_close_early() {
        let rule = color_rule("a */ b", "body", "color", "#000000");
        assert!(rule.to_fragment().starts_with("\n/* Color: a * / b */"));
    }
}

use crate::error::{TemplateError, TemplateResult};
use regex::Regex;
use std::sync::OnceLock;

const MIN_GRADIENT_COLORS: usize = 2;
const MAX_GRADIENT_COLORS: usize = 10;
const MAX_ANGLE: f64 = 360.0;

fn hex_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap())
}

fn tag_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(?:[-:][a-z0-9]+)*$").unwrap())
}

fn attribute_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:.-]*$").unwrap())
}

/// Validate a `#rrggbb` color value
pub fn validate_hex_color(value: &str) -> TemplateResult<()> {
    if hex_color_re().is_match(value) {
        Ok(())
    } else {
        Err(TemplateError::InvalidColor {
            value: value.to_string(),
            reason: "expected #rrggbb".to_string(),
        })
    }
}

/// Validate an element name. Namespaced Blogger tags such as `b:section` pass.
pub fn validate_tag_name(tag: &str) -> TemplateResult<()> {
    if tag_name_re().is_match(tag) {
        Ok(())
    } else {
        Err(TemplateError::InvalidTag {
            tag: tag.to_string(),
        })
    }
}

pub fn validate_attribute_name(tag: &str, name: &str) -> TemplateResult<()> {
    if attribute_name_re().is_match(name) {
        Ok(())
    } else {
        Err(TemplateError::InvalidAttribute {
            tag: tag.to_string(),
            name: name.to_string(),
        })
    }
}

/// Validate gradient stops and angle
pub fn validate_gradient(colors: &[String], angle: f64) -> TemplateResult<()> {
    if colors.len() < MIN_GRADIENT_COLORS {
        return Err(TemplateError::InvalidGradient {
            reason: format!("needs at least {} colors", MIN_GRADIENT_COLORS),
        });
    }
    if colors.len() > MAX_GRADIENT_COLORS {
        return Err(TemplateError::InvalidGradient {
            reason: format!("at most {} colors", MAX_GRADIENT_COLORS),
        });
    }
    for color in colors {
        validate_hex_color(color)?;
    }
    if !(0.0..=MAX_ANGLE).contains(&angle) {
        return Err(TemplateError::InvalidGradient {
            reason: format!("angle {} out of range 0-{}", angle, MAX_ANGLE),
        });
    }
    Ok(())
}

pub fn validate_selector(selector: &str) -> TemplateResult<()> {
    if selector.trim().is_empty() {
        return Err(TemplateError::InvalidSelector {
            selector: selector.to_string(),
        });
    }
    Ok(())
}

/// Non-empty (after trimming) required text field
pub fn require(field: &str, value: &str) -> TemplateResult<()> {
    if value.trim().is_empty() {
        return Err(TemplateError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        for ok in ["#000000", "#ffffff", "#7B2CBF", "#c9a227"] {
            assert!(validate_hex_color(ok).is_ok(), "{} should be valid", ok);
        }
        for bad in ["", "#fff", "7b2cbf", "#7b2cbg", "purple", "#7b2cbf00"] {
            assert!(validate_hex_color(bad).is_err(), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_tag_names() {
        for ok in ["div", "h1", "b:section", "my-widget"] {
            assert!(validate_tag_name(ok).is_ok(), "{} should be valid", ok);
        }
        for bad in ["", "Div", "my tag", "1p", "<div>"] {
            assert!(validate_tag_name(bad).is_err(), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_attribute_names() {
        assert!(validate_attribute_name("a", "href").is_ok());
        assert!(validate_attribute_name("div", "data-id").is_ok());
        assert!(validate_attribute_name("b:widget", "expr:href").is_ok());
        assert!(validate_attribute_name("div", "on click").is_err());
    }

    #[test]
    fn test_gradient_rules() {
        let two = vec!["#000000".to_string(), "#ffffff".to_string()];
        assert!(validate_gradient(&two, 135.0).is_ok());
        assert!(validate_gradient(&two[..1], 0.0).is_err());
        assert!(validate_gradient(&two, 361.0).is_err());
        assert!(validate_gradient(&two, -1.0).is_err());
        let bad = vec!["#000000".to_string(), "red".to_string()];
        assert!(matches!(
            validate_gradient(&bad, 90.0),
            Err(TemplateError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_require() {
        assert!(require("name", "Luna").is_ok());
        assert!(matches!(
            require("name", "   "),
            Err(TemplateError::MissingField { ref field }) if field == "name"
        ));
    }
}

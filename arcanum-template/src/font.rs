//! Google Fonts catalog: fetch, fallback, and `<link>`/CSS fragments.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{TemplateError, TemplateResult};

/// Public font-listing endpoint
pub const DEFAULT_FONTS_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts?sort=popularity";

/// Appended as `key=` to the catalog URL when set
pub const API_KEY_ENV: &str = "GOOGLE_FONTS_API_KEY";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A font family as listed by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamily {
    /// Family name (e.g., "Playfair Display")
    pub family: String,
    /// Google Fonts category: serif, sans-serif, display, handwriting, monospace
    #[serde(default = "default_category")]
    pub category: String,
    /// Variants such as "regular", "italic", "700", "700italic"
    #[serde(default)]
    pub variants: Vec<String>,
}

fn default_category() -> String {
    "sans-serif".to_string()
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    items: Vec<FontFamily>,
}

impl FontFamily {
    pub fn new(family: &str, category: &str, variants: &[&str]) -> Self {
        Self {
            family: family.to_string(),
            category: category.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Upright weights to load. `regular` maps to 400, italics are skipped.
    pub fn weights(&self) -> Vec<u16> {
        let mut weights: Vec<u16> = self
            .variants
            .iter()
            .filter_map(|v| match v.as_str() {
                "regular" => Some(400),
                other => other.parse::<u16>().ok(),
            })
            .collect();
        weights.sort_unstable();
        weights.dedup();
        if weights.is_empty() {
            weights.push(400);
        }
        weights
    }
}

/// The fixed list used when the catalog cannot be fetched
pub fn fallback_fonts() -> Vec<FontFamily> {
    vec![
        FontFamily::new("Roboto", "sans-serif", &["300", "regular", "500", "700"]),
        FontFamily::new("Open Sans", "sans-serif", &["300", "regular", "600", "700"]),
        FontFamily::new("Lato", "sans-serif", &["300", "regular", "700"]),
        FontFamily::new("Montserrat", "sans-serif", &["300", "regular", "500", "700"]),
        FontFamily::new("Poppins", "sans-serif", &["300", "regular", "500", "700"]),
        FontFamily::new("Playfair Display", "serif", &["regular", "700"]),
        FontFamily::new("Merriweather", "serif", &["300", "regular", "700"]),
    ]
}

/// Parse a catalog response body `{ items: [{ family, category, variants }] }`
pub fn parse_catalog(body: &str) -> TemplateResult<Vec<FontFamily>> {
    let response: CatalogResponse =
        serde_json::from_str(body).map_err(|e| TemplateError::MalformedCatalog(e.to_string()))?;
    Ok(response.items)
}

/// Catalog URL with the API key from the environment, if any
pub fn catalog_url(base: &str) -> String {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => {
            let sep = if base.contains('?') { '&' } else { '?' };
            format!("{}{}key={}", base, sep, key)
        }
        _ => base.to_string(),
    }
}

/// One GET to the catalog endpoint
pub async fn fetch_catalog(client: &reqwest::Client, url: &str) -> TemplateResult<Vec<FontFamily>> {
    let body = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_catalog(&body)
}

/// Fetch the catalog, substituting [`fallback_fonts`] on any failure
pub async fn load_catalog(client: &reqwest::Client, url: &str) -> Vec<FontFamily> {
    let result = fetch_catalog(client, url).await;
    catalog_or_fallback(result)
}

/// Resolve a fetch result to a usable list. Failures and empty lists are
/// logged and replaced by the fallback.
pub fn catalog_or_fallback(result: TemplateResult<Vec<FontFamily>>) -> Vec<FontFamily> {
    match result {
        Ok(fonts) if !fonts.is_empty() => {
            debug!(count = fonts.len(), "font catalog loaded");
            fonts
        }
        Ok(_) => {
            warn!("font catalog was empty, using fallback fonts");
            fallback_fonts()
        }
        Err(e) => {
            warn!(error = %e, "font catalog unavailable, using fallback fonts");
            fallback_fonts()
        }
    }
}

/// Case-insensitive lookup by family name
pub fn find_family<'a>(fonts: &'a [FontFamily], family: &str) -> Option<&'a FontFamily> {
    fonts.iter().find(|f| f.family.eq_ignore_ascii_case(family))
}

/// Google Fonts stylesheet `<link>` for a family and weights
pub fn google_fonts_link(family: &str, weights: &[u16]) -> String {
    let family_param = family.trim().replace(' ', "+");
    let weights = if weights.is_empty() {
        "400".to_string()
    } else {
        weights
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(";")
    };
    format!(
        "<link href=\"https://fonts.googleapis.com/css2?family={}:wght@{}&amp;display=swap\" rel=\"stylesheet\" />\n",
        family_param, weights
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fallback_list() {
        let names: Vec<_> = fallback_fonts().into_iter().map(|f| f.family).collect();
        assert_eq!(
            names,
            vec![
                "Roboto",
                "Open Sans",
                "Lato",
                "Montserrat",
                "Poppins",
                "Playfair Display",
                "Merriweather"
            ]
        );
    }

    #[test]
    fn test_parse_catalog() {
        let body = r#"{"kind":"webfonts#webfontList","items":[
            {"family":"Cinzel","category":"serif","variants":["regular","700"],"subsets":["latin"]},
            {"family":"Inter","variants":["regular"]}
        ]}"#;
        let fonts = parse_catalog(body).unwrap();
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].family, "Cinzel");
        assert_eq!(fonts[1].category, "sans-serif");
    }

    #[test]
    fn test_malformed_catalog_falls_back() {
        let result = parse_catalog("{not json");
        assert!(matches!(result, Err(TemplateError::MalformedCatalog(_))));
        assert_eq!(catalog_or_fallback(result), fallback_fonts());
        assert_eq!(catalog_or_fallback(parse_catalog(r#"{"error":{}}"#)), fallback_fonts());
        assert_eq!(catalog_or_fallback(Ok(vec![])), fallback_fonts());
    }

    #[test]
    fn test_weights_from_variants() {
        let font = FontFamily::new("X", "serif", &["700italic", "700", "regular", "italic", "300"]);
        assert_eq!(font.weights(), vec![300, 400, 700]);
        assert_eq!(FontFamily::new("Y", "serif", &["italic"]).weights(), vec![400]);
    }

    #[test]
    fn test_google_fonts_link() {
        assert_eq!(
            google_fonts_link("Playfair Display", &[400, 700]),
            "<link href=\"https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;700&amp;display=swap\" rel=\"stylesheet\" />\n"
        );
    }

    #[test]
    fn test_find_family_ignores_case() {
        let fonts = fallback_fonts();
        assert_eq!(find_family(&fonts, "open sans").unwrap().family, "Open Sans");
        assert!(find_family(&fonts, "Comic Sans").is_none());
    }

    #[tokio::test]
    async fn test_rejected_fetch_uses_fallback() {
        let client = reqwest::Client::new();
        // Port 9 (discard) on loopback refuses the connection
        let fonts = load_catalog(&client, "http://127.0.0.1:9/webfonts").await;
        assert_eq!(fonts, fallback_fonts());
    }
}

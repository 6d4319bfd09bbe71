//! Tag catalog and tag fragment builder.

use serde::Serialize;
use std::fmt;

/// Ordered attribute list. Order is preserved in the rendered tag.
pub type Attributes = Vec<(String, String)>;

/// Tags rendered without inner content
pub const SELF_CLOSING_TAGS: &[&str] = &["img", "input", "meta", "link", "br", "hr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Structure,
    Text,
    Media,
    Forms,
    Head,
    Blogger,
}

impl TagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagCategory::Structure => "structure",
            TagCategory::Text => "text",
            TagCategory::Media => "media",
            TagCategory::Forms => "forms",
            TagCategory::Head => "head",
            TagCategory::Blogger => "blogger",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry describing an insertable tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub attributes: &'static [&'static str],
    pub example: &'static str,
    pub category: TagCategory,
    pub icon: &'static str,
}

impl TagDescriptor {
    pub fn is_self_closing(&self) -> bool {
        is_self_closing(self.name)
    }
}

const CATALOG: &[TagDescriptor] = &[
    TagDescriptor {
        name: "div",
        description: "Contenedor genérico para agrupar bloques de contenido",
        attributes: &["class", "id", "style"],
        example: r#"<div class="container">Hello</div>"#,
        category: TagCategory::Structure,
        icon: "📦",
    },
    TagDescriptor {
        name: "section",
        description: "Sección temática de la página",
        attributes: &["class", "id"],
        example: r#"<section id="beneficios">...</section>"#,
        category: TagCategory::Structure,
        icon: "🧩",
    },
    TagDescriptor {
        name: "header",
        description: "Cabecera de la página o de una sección",
        attributes: &["class", "id"],
        example: r#"<header class="site-header">...</header>"#,
        category: TagCategory::Structure,
        icon: "🔝",
    },
    TagDescriptor {
        name: "footer",
        description: "Pie de página con enlaces y créditos",
        attributes: &["class", "id"],
        example: r#"<footer class="site-footer">...</footer>"#,
        category: TagCategory::Structure,
        icon: "🔚",
    },
    TagDescriptor {
        name: "nav",
        description: "Bloque de navegación principal",
        attributes: &["class", "id", "aria-label"],
        example: r#"<nav aria-label="principal">...</nav>"#,
        category: TagCategory::Structure,
        icon: "🧭",
    },
    TagDescriptor {
        name: "article",
        description: "Contenido independiente, como una entrada del blog",
        attributes: &["class", "id"],
        example: r#"<article class="post">...</article>"#,
        category: TagCategory::Structure,
        icon: "📰",
    },
    TagDescriptor {
        name: "h1",
        description: "Título principal de la página",
        attributes: &["class", "id"],
        example: "<h1>El despertar interior</h1>",
        category: TagCategory::Text,
        icon: "🔠",
    },
    TagDescriptor {
        name: "h2",
        description: "Subtítulo de sección",
        attributes: &["class", "id"],
        example: "<h2>Beneficios</h2>",
        category: TagCategory::Text,
        icon: "🔡",
    },
    TagDescriptor {
        name: "p",
        description: "Párrafo de texto",
        attributes: &["class", "style"],
        example: "<p>Texto del párrafo</p>",
        category: TagCategory::Text,
        icon: "📝",
    },
    TagDescriptor {
        name: "span",
        description: "Fragmento de texto en línea",
        attributes: &["class", "style"],
        example: r#"<span class="highlight">luz</span>"#,
        category: TagCategory::Text,
        icon: "✏️",
    },
    TagDescriptor {
        name: "a",
        description: "Enlace a otra página o recurso",
        attributes: &["href", "target", "rel", "class"],
        example: r#"<a href="https://example.com" target="_blank">Visitar</a>"#,
        category: TagCategory::Text,
        icon: "🔗",
    },
    TagDescriptor {
        name: "ul",
        description: "Lista sin orden",
        attributes: &["class"],
        example: "<ul><li>Elemento</li></ul>",
        category: TagCategory::Text,
        icon: "📋",
    },
    TagDescriptor {
        name: "blockquote",
        description: "Cita o testimonio destacado",
        attributes: &["class", "cite"],
        example: r#"<blockquote class="testimonio">...</blockquote>"#,
        category: TagCategory::Text,
        icon: "💬",
    },
    TagDescriptor {
        name: "img",
        description: "Imagen",
        attributes: &["src", "alt", "width", "height", "loading"],
        example: r#"<img src="luna.jpg" alt="Luna llena"></img>"#,
        category: TagCategory::Media,
        icon: "🖼️",
    },
    TagDescriptor {
        name: "iframe",
        description: "Contenido incrustado, como un vídeo",
        attributes: &["src", "width", "height", "allowfullscreen"],
        example: r#"<iframe src="https://www.youtube.com/embed/ID"></iframe>"#,
        category: TagCategory::Media,
        icon: "🎬",
    },
    TagDescriptor {
        name: "br",
        description: "Salto de línea",
        attributes: &[],
        example: "<br />",
        category: TagCategory::Text,
        icon: "↩️",
    },
    TagDescriptor {
        name: "hr",
        description: "Separador horizontal",
        attributes: &["class"],
        example: "<hr />",
        category: TagCategory::Structure,
        icon: "➖",
    },
    TagDescriptor {
        name: "form",
        description: "Formulario de contacto o suscripción",
        attributes: &["action", "method", "class"],
        example: r#"<form action="/contacto" method="post">...</form>"#,
        category: TagCategory::Forms,
        icon: "📨",
    },
    TagDescriptor {
        name: "input",
        description: "Campo de entrada de formulario",
        attributes: &["type", "name", "placeholder", "value", "required"],
        example: r#"<input type="email" name="email" placeholder="Tu correo" />"#,
        category: TagCategory::Forms,
        icon: "⌨️",
    },
    TagDescriptor {
        name: "button",
        description: "Botón de acción",
        attributes: &["type", "class", "onclick"],
        example: r#"<button type="submit">Enviar</button>"#,
        category: TagCategory::Forms,
        icon: "🔘",
    },
    TagDescriptor {
        name: "meta",
        description: "Metadatos del documento",
        attributes: &["name", "property", "content", "charset"],
        example: r#"<meta name="description" content="..." />"#,
        category: TagCategory::Head,
        icon: "🏷️",
    },
    TagDescriptor {
        name: "link",
        description: "Recurso externo, como una hoja de estilos o fuente",
        attributes: &["rel", "href", "type"],
        example: r#"<link rel="stylesheet" href="estilos.css" />"#,
        category: TagCategory::Head,
        icon: "🔌",
    },
    TagDescriptor {
        name: "b:section",
        description: "Sección de widgets de Blogger",
        attributes: &["id", "class", "maxwidgets", "showaddelement"],
        example: r#"<b:section id="main" class="main" showaddelement="yes"></b:section>"#,
        category: TagCategory::Blogger,
        icon: "🅱️",
    },
    TagDescriptor {
        name: "b:widget",
        description: "Widget de Blogger dentro de una sección",
        attributes: &["id", "type", "title", "locked"],
        example: r#"<b:widget id="Blog1" type="Blog" locked="true"></b:widget>"#,
        category: TagCategory::Blogger,
        icon: "🧱",
    },
];

/// The full tag catalog, in display order
pub fn catalog() -> &'static [TagDescriptor] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static TagDescriptor> {
    CATALOG.iter().find(|t| t.name == name)
}

pub fn by_category(category: TagCategory) -> impl Iterator<Item = &'static TagDescriptor> {
    CATALOG.iter().filter(move |t| t.category == category)
}

pub fn is_self_closing(name: &str) -> bool {
    SELF_CLOSING_TAGS.contains(&name)
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render `<name attr="v"...>content</name>`.
///
/// Attributes with empty values are dropped. Tags in [`SELF_CLOSING_TAGS`]
/// ignore `content`. `img` closes with `</img>` (Blogger markup), the rest
/// with ` />`.
pub fn build_tag_fragment(name: &str, attributes: &[(String, String)], content: &str) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        if value.is_empty() {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }

    if name == "img" {
        out.push_str("></img>");
    } else if is_self_closing(name) {
        out.push_str(" />");
    } else {
        out.push('>');
        out.push_str(content);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
    out
}

/// Parse `key=value` pairs as given on the command line
pub fn parse_attribute(pair: &str) -> Option<(String, String)> {
    let (key, value) = pair.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

use anyhow::{bail, Context, Result};
use arcanum_template::font::{self, find_family};
use arcanum_template::splice::missing_markers;
use arcanum_template::store::KeyValueStore;
use arcanum_template::tag::{self, parse_attribute, TagCategory};
use arcanum_template::{
    export, ColorStore, Config, Confirm, DeviceWidth, Editor, FileStore, FileSurface, FontFamily,
    GradientKind, GradientStore, MetaTag, Notice, PreviewRenderer, PromptBundleStore,
    SnapshotStore, BASIC_TEMPLATE,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arcanum")]
#[command(about = "Blogspot template editor with live preview and saved snapshots", long_about = None)]
struct Cli {
    /// Config file (default: ./arcanum.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template document to edit
    #[arg(long, short, global = true, default_value = "template.xml")]
    document: PathBuf,

    /// Answer yes to confirmation prompts
    #[arg(long, short, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the basic starter template to the document
    Init,
    /// Insert a tag before </body>
    InsertTag {
        name: String,
        /// Attribute as key=value (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Insert meta tags (key=content, e.g. description=... og:title=...) before </head>
    Meta {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Link a Google font and apply it to a selector
    Font {
        family: String,
        #[arg(long, default_value = "body")]
        selector: String,
        /// Skip the catalog request and use the fallback list
        #[arg(long)]
        offline: bool,
    },
    /// Apply a color (hex value or saved color id) to a selector
    Color {
        /// #rrggbb value, or the id of a saved color with --saved
        value: String,
        #[arg(long)]
        saved: bool,
        #[arg(long, default_value = "Custom")]
        name: String,
        #[arg(long, default_value = "body")]
        selector: String,
        #[arg(long, default_value = "color")]
        property: String,
    },
    /// Apply a saved gradient as background of a selector
    Gradient {
        id: String,
        #[arg(long, default_value = "body")]
        selector: String,
    },
    /// Named template snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Saved colors
    Colors {
        #[command(subcommand)]
        action: ColorAction,
    },
    /// Saved gradients
    Gradients {
        #[command(subcommand)]
        action: GradientAction,
    },
    /// Saved prompt bundles
    Bundles {
        #[command(subcommand)]
        action: BundleAction,
    },
    /// Render the document into the preview directory
    Preview {
        /// desktop, tablet, mobile or a pixel width
        #[arg(long)]
        device: Option<DeviceWidth>,
    },
    /// Write the document as template-blogspot.xml
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write prompt text read from stdin to a .txt file
    ExportPrompt {
        file_name: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the document verbatim (pipe into a clipboard tool)
    Copy,
    /// Check that the document still has its splice markers
    Check,
    /// List the tag catalog
    Tags {
        #[arg(long, value_enum)]
        category: Option<TagCategory>,
    },
    /// List available fonts
    Fonts {
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    Save { name: String },
    List,
    Load { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum ColorAction {
    Add { name: String, value: String },
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum GradientAction {
    Add {
        name: String,
        #[arg(required = true, num_args = 2..)]
        colors: Vec<String>,
        #[arg(long, default_value = "linear")]
        kind: GradientKind,
        #[arg(long, default_value_t = 90.0)]
        angle: f64,
    },
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum BundleAction {
    List,
    Delete { id: String },
}

/// Confirmation through a terminal prompt, or unconditionally with --yes
struct TerminalConfirm {
    yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

struct Session {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    document_path: PathBuf,
    confirm: TerminalConfirm,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref()).context("loading config")?;
        let store = FileStore::open(&config.data_dir)
            .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
        Ok(Self {
            config,
            store: Arc::new(store),
            document_path: cli.document.clone(),
            confirm: TerminalConfirm { yes: cli.yes },
        })
    }

    fn read_document(&self) -> Result<String> {
        fs::read_to_string(&self.document_path).with_context(|| {
            format!(
                "reading {} (run `arcanum init` to create it)",
                self.document_path.display()
            )
        })
    }

    /// The working document, or an empty one if the file does not exist yet
    fn read_document_or_empty(&self) -> Result<String> {
        read_optional(&self.document_path)
    }

    fn editor(&self) -> Result<Editor> {
        let document = self.read_document()?;
        Ok(self.editor_on(document))
    }

    fn editor_on(&self, document: String) -> Editor {
        let mut renderer = PreviewRenderer::new(Box::new(FileSurface::new(self.config.preview_dir())));
        renderer.set_width(self.config.device);
        Editor::new(
            document,
            renderer,
            SnapshotStore::open(self.store.clone()),
            self.config.editor_options(),
        )
    }

    fn write_document(&self, document: &str) -> Result<()> {
        fs::write(&self.document_path, document)
            .with_context(|| format!("writing {}", self.document_path.display()))
    }

    /// Persist the document if the operation changed it
    fn finish(&self, before: &str, editor: &Editor, notice: Notice) -> Result<()> {
        if editor.document() != before {
            self.write_document(editor.document())?;
        }
        println!("{}", notice);
        Ok(())
    }

    fn export_dir(&self, dir: Option<PathBuf>) -> PathBuf {
        dir.unwrap_or_else(|| self.config.export_dir.clone())
    }
}

fn read_optional(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

async fn font_list(config: &Config, offline: bool) -> Vec<FontFamily> {
    if offline {
        return font::fallback_fonts();
    }
    let client = reqwest::Client::new();
    font::load_catalog(&client, &font::catalog_url(&config.fonts_url)).await
}

fn parse_attributes(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            parse_attribute(pair).with_context(|| format!("invalid attribute '{}': expected key=value", pair))
        })
        .collect()
}

async fn run(cli: Cli) -> Result<()> {
    let mut session = Session::open(&cli)?;

    match cli.command {
        Commands::Init => {
            if session.document_path.exists() {
                let prompt = format!(
                    "{} exists. Replace it with the basic template?",
                    session.document_path.display()
                );
                if !session.confirm.confirm(&prompt) {
                    println!("{}", Notice::info("Init cancelled"));
                    return Ok(());
                }
            }
            session.write_document(BASIC_TEMPLATE)?;
            let editor = session.editor_on(BASIC_TEMPLATE.to_string());
            println!(
                "{}",
                Notice::success(format!(
                    "Basic template written to {} ({} preview render)",
                    session.document_path.display(),
                    editor.renderer().renders()
                ))
            );
        }
        Commands::InsertTag {
            name,
            attrs,
            content,
        } => {
            let attributes = parse_attributes(&attrs)?;
            let mut editor = session.editor()?;
            let before = editor.document().to_string();
            let notice = editor.insert_tag(&name, &attributes, &content)?;
            session.finish(&before, &editor, notice)?;
        }
        Commands::Meta { entries } => {
            let mut editor = session.editor()?;
            let before = editor.document().to_string();
            for entry in &entries {
                editor.add_meta_tag(MetaTag::parse(entry)?)?;
            }
            let notice = editor.apply_meta_tags()?;
            session.finish(&before, &editor, notice)?;
        }
        Commands::Font {
            family,
            selector,
            offline,
        } => {
            let fonts = font_list(&session.config, offline).await;
            let font = match find_family(&fonts, &family) {
                Some(f) => f.clone(),
                None => {
                    tracing::warn!(%family, "font not in catalog, linking regular weight only");
                    FontFamily::new(&family, "sans-serif", &["regular"])
                }
            };
            let mut editor = session.editor()?;
            let before = editor.document().to_string();
            let notice = editor.apply_font(&font, &selector)?;
            session.finish(&before, &editor, notice)?;
        }
        Commands::Color {
            value,
            saved,
            name,
            selector,
            property,
        } => {
            let mut editor = session.editor()?;
            let before = editor.document().to_string();
            let notice = if saved {
                let colors = ColorStore::open(session.store.clone());
                let color = colors.get(&value)?;
                editor.apply_named_color(color, &selector, &property)?
            } else {
                editor.apply_color(&name, &value, &selector, &property)?
            };
            session.finish(&before, &editor, notice)?;
        }
        Commands::Gradient { id, selector } => {
            let gradients = GradientStore::open(session.store.clone());
            let gradient = gradients.get(&id)?;
            let mut editor = session.editor()?;
            let before = editor.document().to_string();
            let notice = editor.apply_gradient(gradient, &selector)?;
            session.finish(&before, &editor, notice)?;
        }
        Commands::Snapshot { action } => match action {
            SnapshotAction::Save { name } => {
                let mut editor = session.editor()?;
                let snapshot = editor.save_snapshot(&name)?;
                println!(
                    "{}",
                    Notice::success(format!("Template '{}' saved as {}", snapshot.name, snapshot.id))
                );
            }
            SnapshotAction::List => {
                let snapshots = SnapshotStore::open(session.store.clone());
                if snapshots.is_empty() {
                    println!("No saved templates");
                }
                for s in snapshots.list() {
                    println!("{}  {}  {}  ({} bytes)", s.id, s.date.format("%Y-%m-%d %H:%M"), s.name, s.code.len());
                }
            }
            SnapshotAction::Load { id } => {
                let current = session.read_document_or_empty()?;
                let mut editor = session.editor_on(current.clone());
                let notice = editor.load_snapshot(&id, &mut session.confirm)?;
                session.finish(&current, &editor, notice)?;
            }
            SnapshotAction::Delete { id } => {
                let current = session.read_document_or_empty()?;
                let mut editor = session.editor_on(current);
                let notice = editor.delete_snapshot(&id, &mut session.confirm)?;
                println!("{}", notice);
            }
        },
        Commands::Colors { action } => {
            let mut colors = ColorStore::open(session.store.clone());
            match action {
                ColorAction::Add { name, value } => {
                    let color = colors.create(&name, &value)?;
                    println!("{}", Notice::success(format!("Color '{}' saved as {}", color.name, color.id)));
                }
                ColorAction::List => {
                    for c in colors.list() {
                        println!("{}  {}  {}", c.id, c.value, c.name);
                    }
                }
                ColorAction::Delete { id } => {
                    let name = colors.get(&id)?.name.clone();
                    if session.confirm.confirm(&format!("Delete color '{}'?", name)) {
                        colors.delete(&id)?;
                        println!("{}", Notice::success(format!("Color '{}' deleted", name)));
                    } else {
                        println!("{}", Notice::info("Delete cancelled"));
                    }
                }
            }
        }
        Commands::Gradients { action } => {
            let mut gradients = GradientStore::open(session.store.clone());
            match action {
                GradientAction::Add {
                    name,
                    colors,
                    kind,
                    angle,
                } => {
                    let g = gradients.create(&name, colors, kind, angle)?;
                    println!("{}", Notice::success(format!("Gradient '{}' saved as {}", g.name, g.id)));
                }
                GradientAction::List => {
                    for g in gradients.list() {
                        println!("{}  {}  {}", g.id, g.name, g.css_value());
                    }
                }
                GradientAction::Delete { id } => {
                    let name = gradients.get(&id)?.name.clone();
                    if session.confirm.confirm(&format!("Delete gradient '{}'?", name)) {
                        gradients.delete(&id)?;
                        println!("{}", Notice::success(format!("Gradient '{}' deleted", name)));
                    } else {
                        println!("{}", Notice::info("Delete cancelled"));
                    }
                }
            }
        }
        Commands::Bundles { action } => {
            let mut bundles = PromptBundleStore::open(session.store.clone());
            match action {
                BundleAction::List => {
                    for b in bundles.list() {
                        println!("{}  {}  ({} options)", b.id, b.name, b.options.len());
                    }
                }
                BundleAction::Delete { id } => {
                    let removed = bundles.delete(&id)?;
                    println!("{}", Notice::success(format!("Bundle '{}' deleted", removed.name)));
                }
            }
        }
        Commands::Preview { device } => {
            if let Some(device) = device {
                session.config.device = device;
            }
            let editor = session.editor()?;
            let index = session.config.preview_dir().join(arcanum_template::preview::INDEX_FILE);
            println!(
                "{}",
                Notice::success(format!(
                    "Preview ({}) written to {} ({} render(s))",
                    editor.renderer().width(),
                    index.display(),
                    editor.renderer().renders()
                ))
            );
        }
        Commands::Export { dir } => {
            let document = session.read_document()?;
            let path = export::export_template(&document, &session.export_dir(dir))?;
            println!("{}", Notice::success(format!("Template exported to {}", path.display())));
        }
        Commands::ExportPrompt { file_name, dir } => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading prompt from stdin")?;
            let path = export::export_prompt(&text, &session.export_dir(dir), &file_name)?;
            println!("{}", Notice::success(format!("Prompt exported to {}", path.display())));
        }
        Commands::Copy => {
            let document = session.read_document()?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
        }
        Commands::Check => {
            let document = session.read_document()?;
            check(&session.document_path, &document)?;
        }
        Commands::Tags { category } => {
            for t in tag::catalog()
                .iter()
                .filter(|t| category.map_or(true, |c| t.category == c))
            {
                println!("{} {:<11} [{}] {}", t.icon, t.name, t.category, t.description);
                println!("    attrs: {}", t.attributes.join(", "));
                println!("    e.g.   {}", t.example);
            }
        }
        Commands::Fonts { offline } => {
            for f in font_list(&session.config, offline).await {
                println!("{:<28} {:<12} {}", f.family, f.category, f.variants.join(","));
            }
        }
    }

    Ok(())
}

fn check(path: &Path, document: &str) -> Result<()> {
    let missing = missing_markers(document);
    if missing.is_empty() {
        println!("✓ {} has all splice markers", path.display());
        return Ok(());
    }
    eprintln!("✗ {} is missing markers:", path.display());
    for marker in &missing {
        eprintln!("    {}", marker);
    }
    bail!("{} marker(s) missing; edits anchored to them will not apply", missing.len())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arcanum_template=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("✗ {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_optional_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_optional(&dir.path().join("template.xml")).unwrap(), "");
    }

    #[test]
    fn test_read_optional_propagates_other_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xml");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(read_optional(&path).is_err());
        assert!(read_optional(dir.path()).is_err());

        fs::write(&path, "<body></body>").unwrap();
        assert_eq!(read_optional(&path).unwrap(), "<body></body>");
    }

    #[test]
    fn test_tags_category_parsed_by_clap() {
        let cli = Cli::try_parse_from(["arcanum", "tags", "--category", "blogger"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tags {
                category: Some(TagCategory::Blogger)
            }
        ));
        assert!(Cli::try_parse_from(["arcanum", "tags", "--category", "widgets"]).is_err());
    }
}

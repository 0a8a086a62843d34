use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use diaprops::{init_logging, ArrayDocument, ArrayEditor, ArrayFlavor, EditorSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and resize array-valued property documents", long_about = None)]
struct Cli {
    /// Editor settings file (.toml or .json)
    #[arg(long, value_name = "SETTINGS_FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a document and print its rows as a tree
    Inspect {
        /// JSON document with "columns" and "records"
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Resize the top-level records and print the saved JSON
        #[arg(long, value_name = "ROWS")]
        resize: Option<usize>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<EditorSettings> {
    match path {
        Some(path) => EditorSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(EditorSettings::load_or_default()),
    }
}

fn inspect(document: &Path, resize: Option<usize>, settings: EditorSettings) -> Result<()> {
    let text = std::fs::read_to_string(document)
        .with_context(|| format!("Open {}", document.display()))?;
    let doc = ArrayDocument::from_json_str(&text)
        .with_context(|| format!("Failed to parse {}", document.display()))?;
    let property = doc
        .to_property()
        .with_context(|| format!("Failed to load records of '{}'", doc.name))?;

    let editor = ArrayEditor::for_property(property, settings);
    let flavor = match editor.property().flavor() {
        ArrayFlavor::Static { len } => format!("static, {} rows", len),
        ArrayFlavor::Dynamic => "dynamic".to_string(),
    };
    println!("{} ({})", editor.property().descr().label, flavor);
    for column in editor.columns() {
        let access = if column.is_editable() { "rw" } else { "ro" };
        println!("  {:<16} {:<18} {}", column.name, column.kind.to_string(), access);
    }
    print!("{}", editor.tree().render());

    let Some(len) = resize else {
        return Ok(());
    };
    let mut property = editor.into_property();
    if !property.flavor().is_resizable() {
        bail!("'{}' is a static array and cannot be resized", property.name());
    }
    let changed = property.records_mut().resize(len)?;
    if changed {
        property.mark_set();
    }
    println!("{}", serde_json::to_string_pretty(&property.save())?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    // Initialize logging
    init_logging(&settings.log_level)?;
    tracing::debug!("diaprops {} built {}", diaprops::VERSION, diaprops::BUILD_DATE);

    match cli.command {
        Command::Inspect { document, resize } => inspect(&document, resize, settings),
    }
}

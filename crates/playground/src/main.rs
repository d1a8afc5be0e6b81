use std::fs;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use docblocks_core::{
    ContentModel, DocumentValue, Editor, EditorConfig, EditorHandle, EditorState, KeyPress,
    PluginRegistry, Selection,
};
use docblocks_view::{BlockBody, BlockView, ListMarker, RenderContext, ViewRegistry};
use tracing_subscriber::EnvFilter;

/// Replays key presses against a block document and prints the result
#[derive(Parser, Debug)]
#[command(name = "docblocks")]
#[command(about = "Drive the block editor from the command line", long_about = None)]
struct Args {
    /// Document JSON to load. Starts from an empty document when omitted.
    #[arg(value_name = "DOC")]
    document: Option<PathBuf>,

    /// Editor configuration JSON
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Text typed at the end of the document before any key is replayed
    #[arg(long)]
    text: Option<String>,

    /// Comma-separated key presses, e.g. "enter,tab,shift-tab,ctrl-enter"
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,

    /// Print the rendered view model as JSON instead of the document
    #[arg(long)]
    view: bool,

    /// Render as a read-only preview
    #[arg(long)]
    readonly: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let content = load_document(args.document.as_ref())?;

    let mut state = EditorState::create(content);
    if let Some(last) = state.content().last_block() {
        state = state.with_selection(Selection::caret(last.key().clone(), last.len()));
    }
    let handle = EditorHandle::new(Editor::with_config(config), state)?;

    if let Some(text) = &args.text {
        handle.insert_text(text)?;
    }
    for spec in args.keys.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
        let press = KeyPress::parse(spec).ok_or_else(|| anyhow!("unknown key: {spec}"))?;
        tracing::debug!(key = spec, "replaying");
        handle.handle_key(&press)?;
    }

    let state = handle.get_editor_state();
    let registry = PluginRegistry::standard();
    let cx = RenderContext::new(&state, &registry).preview(args.readonly);
    let views = if args.readonly {
        ViewRegistry::preview().render_document(&cx)?
    } else {
        ViewRegistry::standard().render_document(&cx)?
    };

    for view in &views {
        println!("{}", outline_line(view));
    }
    println!();
    if args.view {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        println!("{}", DocumentValue::from_content(state.content()).to_json_pretty()?);
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default().with_defaults());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    Ok(EditorConfig::from_json_str(&json)?)
}

fn load_document(path: Option<&PathBuf>) -> anyhow::Result<ContentModel> {
    let Some(path) = path else {
        return Ok(ContentModel::empty());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;
    let value = DocumentValue::from_json_str(&json)
        .with_context(|| format!("failed to parse document: {}", path.display()))?;
    Ok(value.into_content()?)
}

fn outline_line(view: &BlockView) -> String {
    let indent = "  ".repeat(view.depth);
    let marker = match view.marker {
        Some(ListMarker::Bullet) => "- ".to_string(),
        Some(ListMarker::Number { index }) => format!("{index}. "),
        Some(ListMarker::Check { checked: true }) => "[x] ".to_string(),
        Some(ListMarker::Check { checked: false }) => "[ ] ".to_string(),
        Some(ListMarker::Toggle { open: true }) => "v ".to_string(),
        Some(ListMarker::Toggle { open: false }) => "> ".to_string(),
        None => String::new(),
    };
    let body = match &view.body {
        BlockBody::Divider { dashed: true } => "- - -".to_string(),
        BlockBody::Divider { dashed: false } => "---".to_string(),
        BlockBody::Atomic { kind: Some(kind), .. } => format!("[{kind:?}]"),
        BlockBody::Atomic { kind: None, .. } => "[missing]".to_string(),
        BlockBody::Embed { live: false, error: Some(error), .. } => {
            format!("{} ({error})", view.plain_text())
        }
        _ => view.plain_text(),
    };
    let comments = match &view.comments {
        Some(overlay) => format!("  ({} comments)", overlay.message_count()),
        None => String::new(),
    };
    format!("{indent}{marker}{body}{comments}")
}

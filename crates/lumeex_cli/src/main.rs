//! Command-line admin client for a Lumeex backend.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use lumeex_client::{
    AdminConsole, DeleteOutcome, DocumentKind, NoticeBoard, SectionEditor, UploadFile,
};
use lumeex_core::config::Config;
use lumeex_core::delete::PendingDelete;
use lumeex_core::dirty::SectionStatus;
use lumeex_core::filter::{ActiveFilter, AdminFilter, FilterOutcome, GalleryView};
use lumeex_core::models::site::format_keywords;
use lumeex_core::models::theme::{parse_weights, GoogleFont};
use lumeex_core::public::shuffled_order;
use lumeex_core::{CollectionKind, Item, TagIndex, OUTPUT_ZIP_NAME, TAG_QUERY_KEY};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lumeex", about = "Lumeex admin CLI", version)]
struct Cli {
    /// Admin server URL (can also be set via LUMEEX_SERVER env var)
    #[arg(short, long, env = "LUMEEX_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds, 0 disables it
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CollectionArg {
    Gallery,
    Hero,
}

impl From<CollectionArg> for CollectionKind {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Gallery => CollectionKind::Gallery,
            CollectionArg::Hero => CollectionKind::Hero,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List the items of a collection, or of every collection
    List {
        #[arg(value_enum)]
        collection: Option<CollectionArg>,
        /// Only show gallery items without tags
        #[arg(long)]
        untagged: bool,
    },
    /// Show gallery tags ranked by frequency
    Tags,
    /// Suggest tags for a gallery item
    Suggest {
        index: usize,
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Add a tag to a gallery item
    Tag { index: usize, tag: String },
    /// Remove a tag from a gallery item
    Untag { index: usize, tag: String },
    /// Delete one photo
    Delete {
        #[arg(value_enum)]
        collection: CollectionArg,
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every photo of a collection
    DeleteAll {
        #[arg(value_enum)]
        collection: CollectionArg,
        #[arg(short, long)]
        yes: bool,
    },
    /// Rescan the collection's photo folder
    Refresh {
        #[arg(value_enum)]
        collection: CollectionArg,
    },
    /// Upload photos to a collection
    Upload {
        #[arg(value_enum)]
        collection: CollectionArg,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Preview the public gallery filter for a URL or `?tag=` query
    Filter {
        location: Option<String>,
        /// Tag clicks applied after the initial load, in order
        #[arg(long = "click")]
        clicks: Vec<String>,
        /// Shuffle the gallery like the public page, with a fixed seed
        #[arg(long)]
        shuffle_seed: Option<u64>,
    },
    /// Site info sections
    Site {
        #[command(subcommand)]
        action: SectionAction,
    },
    /// Theme sections
    Theme {
        #[command(subcommand)]
        action: SectionAction,
    },
    /// Local and Google fonts of the current theme
    Fonts {
        #[command(subcommand)]
        action: FontAction,
    },
    /// Favicon of the current theme
    Favicon {
        #[command(subcommand)]
        action: FileAction,
    },
    /// Social thumbnail of the site
    Thumbnail {
        #[command(subcommand)]
        action: FileAction,
    },
    /// Installed themes
    Themes {
        #[command(subcommand)]
        action: ThemesAction,
    },
    /// Build the static site
    Build,
    /// Download the built site as a zip archive
    Download {
        #[arg(default_value = ".")]
        dest: PathBuf,
    },
    /// Print the preview server address
    Preview,
}

#[derive(Subcommand)]
enum SectionAction {
    /// Show the save state of every section
    Status,
    /// Print a section
    Get { section: String },
    /// Set a field (dotted path; JSON or plain text value) and save its section
    Set {
        section: String,
        path: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum FontAction {
    List,
    Upload { file: PathBuf },
    Remove { font: String },
    /// Add a Google font family
    AddGoogle {
        family: String,
        /// Comma-separated weights
        #[arg(long, default_value = "")]
        weights: String,
    },
    RemoveGoogle { index: usize },
}

#[derive(Subcommand)]
enum FileAction {
    Upload { file: PathBuf },
    Remove,
}

#[derive(Subcommand)]
enum ThemesAction {
    List,
    Upload { folder: PathBuf },
    Remove { theme: String },
}

fn explicit_server_override(server: Option<String>) -> Option<String> {
    server.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_config(mut config: Config, server: Option<String>, timeout: Option<u64>) -> Config {
    if let Some(server) = explicit_server_override(server) {
        config.server_url = server;
    }
    if let Some(secs) = timeout {
        config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    config
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn item_json(index: usize, item: &Item) -> Value {
    json!({ "index": index, "src": item.src, "tags": item.tags() })
}

fn format_items(items: &[Item], indices: &[usize], json: bool) -> Result<String, String> {
    let mut rows = Vec::with_capacity(indices.len());
    let mut values = Vec::with_capacity(indices.len());
    for &index in indices {
        let Some(item) = items.get(index) else {
            return Err(format!("no item at index {}", index));
        };
        if json {
            values.push(item_json(index, item));
        } else {
            rows.push(format!("{:>4}  {:<40} {}", index, item.src, item.tags().join(", ")));
        }
    }
    if json {
        return encode_json(&values);
    }
    Ok(rows.join("\n"))
}

/// Lists several collections, keyed by their API name in JSON.
fn format_collections(
    listings: &[(CollectionKind, &[Item], Vec<usize>)],
    json: bool,
) -> Result<String, String> {
    if json {
        let mut map = serde_json::Map::new();
        for (kind, items, indices) in listings {
            let values = indices
                .iter()
                .map(|&index| {
                    items
                        .get(index)
                        .map(|item| item_json(index, item))
                        .ok_or_else(|| format!("no item at index {}", index))
                })
                .collect::<Result<Vec<_>, _>>()?;
            map.insert(kind.api_segment().to_string(), Value::Array(values));
        }
        return encode_json(&map);
    }
    let mut blocks = Vec::with_capacity(listings.len());
    for (kind, items, indices) in listings {
        let rows = format_items(items, indices, false)?;
        if rows.is_empty() {
            blocks.push(format!("{}: (empty)", kind));
        } else {
            blocks.push(format!("{}:\n{}", kind, rows));
        }
    }
    Ok(blocks.join("\n"))
}

fn format_tag_index(index: &TagIndex, json: bool) -> Result<String, String> {
    if json {
        return encode_json(index.entries());
    }
    Ok(index
        .entries()
        .iter()
        .map(|entry| format!("{:>4}  {}", entry.count, entry.tag))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_statuses(statuses: &[(&str, SectionStatus)], json: bool) -> Result<String, String> {
    if json {
        let map: serde_json::Map<String, Value> = statuses
            .iter()
            .map(|(name, status)| (name.to_string(), json!(status)))
            .collect();
        return encode_json(&map);
    }
    Ok(statuses
        .iter()
        .map(|(name, status)| match status {
            SectionStatus::Saved => format!("{:<14} saved", name),
            other => format!("{:<14} {}", name, other.message()),
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_filter_outcome(
    items: &[Item],
    outcome: &FilterOutcome,
    json: bool,
) -> Result<String, String> {
    if json {
        let visible: Vec<&str> = outcome
            .visible
            .iter()
            .filter_map(|&index| items.get(index).map(|item| item.src.as_str()))
            .collect();
        let section = outcome
            .last_clicked_section
            .and_then(|index| items.get(index))
            .map(|item| item.src.as_str());
        return encode_json(&json!({
            "visible": visible,
            "query": outcome.query,
            "last_clicked_section": section,
            "scroll_into_view": outcome.scroll_into_view,
        }));
    }
    let mut lines = vec![format!(
        "query: {}",
        if outcome.query.is_empty() { "(none)" } else { outcome.query.as_str() }
    )];
    lines.push(format_items(items, &outcome.visible, false)?);
    Ok(lines.join("\n"))
}

/// Renders a section as `key: value` lines. String lists are shown the way
/// the keyword field is typed, comma-separated.
fn format_section(value: &Value, json: bool) -> Result<String, String> {
    if json {
        return encode_json(value);
    }
    let Value::Object(map) = value else {
        return Ok(field_text(value));
    };
    Ok(map
        .iter()
        .map(|(key, field)| format!("{}: {}", key, field_text(field)))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(entries) if entries.iter().all(Value::is_string) => {
            let words: Vec<String> = entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            format_keywords(&words)
        }
        other => other.to_string(),
    }
}

/// Accepts a JSON literal, falling back to the raw text as a string.
fn parse_field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Extracts the `tag` query value from a full URL, a bare `?tag=` query or a
/// plain comma-separated tag list.
fn tag_param(location: &str) -> Option<String> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    let url = if location.starts_with('?') {
        reqwest::Url::parse("http://localhost/")
            .and_then(|base| base.join(location))
            .ok()
    } else {
        reqwest::Url::parse(location).ok()
    };
    match url {
        Some(url) => url
            .query_pairs()
            .find(|(key, _)| key == TAG_QUERY_KEY)
            .map(|(_, value)| value.into_owned()),
        None => Some(location.to_string()),
    }
}

fn confirm(prompt: &str, yes: bool) -> io::Result<bool> {
    if yes {
        return Ok(true);
    }
    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", prompt)?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_output(output: Result<String, String>, action: &str) -> anyhow::Result<()> {
    match output {
        Ok(output) if output.is_empty() => Ok(()),
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(message) => bail!("{} failed: {}", action, message),
    }
}

fn print_notices(board: &mut NoticeBoard) {
    for notice in board.drain() {
        eprintln!("{}", notice.text);
    }
}

async fn upload_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(
            UploadFile::from_path(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        );
    }
    Ok(files)
}

async fn run_section(
    editor: &mut SectionEditor,
    action: SectionAction,
    json: bool,
) -> anyhow::Result<()> {
    editor.load().await.context("Load failed")?;
    match action {
        SectionAction::Status => {
            let statuses = editor.statuses()?;
            print_output(format_statuses(&statuses, json), "Status")
        }
        SectionAction::Get { section } => {
            let value = editor.current(&section)?;
            print_output(format_section(value, json), "Get")
        }
        SectionAction::Set {
            section,
            path,
            value,
        } => {
            match (editor.kind(), section.as_str(), path.as_str()) {
                (DocumentKind::SiteInfo, "info", "keywords") => editor.set_keywords(&value)?,
                (DocumentKind::Theme, "colors", color) => editor.set_color(color, &value)?,
                _ => editor.set_field(&section, &path, parse_field_value(&value))?,
            };
            let status = editor.save_section(&section).await.context("Save failed")?;
            if json {
                let output = encode_json(&json!({ "section": section, "status": status }));
                print_output(output, "Set")
            } else {
                print_output(format_statuses(&[(section.as_str(), status)], false), "Set")
            }
        }
    }
}

async fn current_theme(console: &mut AdminConsole) -> anyhow::Result<String> {
    console.theme.load().await.context("Loading theme failed")?;
    console
        .theme
        .theme_name()
        .map(str::to_string)
        .context("Server did not report a theme name")
}

async fn run(console: &mut AdminConsole, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Completions { .. } => bail!("completions are generated without a server"),
        Commands::List {
            collection,
            untagged,
        } => {
            let kinds = match collection {
                Some(arg) => vec![CollectionKind::from(arg)],
                None => CollectionKind::ALL.to_vec(),
            };
            for &kind in &kinds {
                console.store_mut(kind).load().await.context("List failed")?;
            }
            let filter = AdminFilter {
                untagged_only: untagged,
            };
            let listings: Vec<_> = kinds
                .iter()
                .map(|&kind| {
                    let store = console.store(kind);
                    (kind, store.items(), store.visible_indices(filter))
                })
                .collect();
            let output = match listings.as_slice() {
                [(_, items, indices)] => format_items(items, indices, json),
                _ => format_collections(&listings, json),
            };
            print_output(output, "List")?;
        }
        Commands::Tags => {
            console.gallery.load().await.context("Tags failed")?;
            print_output(format_tag_index(&console.gallery.tag_index(), json), "Tags")?;
        }
        Commands::Suggest { index, prefix } => {
            console.gallery.load().await.context("Suggest failed")?;
            let suggestions = console.gallery.suggestions(index, &prefix)?;
            let output = if json {
                encode_json(&suggestions)
            } else {
                Ok(suggestions.join("\n"))
            };
            print_output(output, "Suggest")?;
        }
        Commands::Tag { index, tag } => {
            console.gallery.load().await.context("Tag failed")?;
            let added = console.gallery.add_tag(index, &tag)?;
            console.flush().await.context("Tag failed")?;
            if !added {
                eprintln!("Tag '{}' already present", tag.trim());
            }
            print_output(format_items(console.gallery.items(), &[index], json), "Tag")?;
        }
        Commands::Untag { index, tag } => {
            console.gallery.load().await.context("Untag failed")?;
            let removed = console.gallery.remove_tag(index, &tag)?;
            console.flush().await.context("Untag failed")?;
            if !removed {
                eprintln!("Tag '{}' not present", tag);
            }
            print_output(format_items(console.gallery.items(), &[index], json), "Untag")?;
        }
        Commands::Delete {
            collection,
            index,
            yes,
        } => {
            let kind: CollectionKind = collection.into();
            console.store_mut(kind).load().await.context("Delete failed")?;
            let prompt = console.request_delete(PendingDelete::item(kind, index));
            if !confirm(prompt, yes)? {
                console.cancel_delete();
                eprintln!("Cancelled");
                return Ok(());
            }
            let outcome = console.confirm_delete().await.context("Delete failed")?;
            console.flush().await.context("Delete failed")?;
            if let (true, DeleteOutcome::Item { src, .. }) = (json, outcome) {
                print_output(encode_json(&json!({ "deleted": src })), "Delete")?;
            }
        }
        Commands::DeleteAll { collection, yes } => {
            let kind: CollectionKind = collection.into();
            console.store_mut(kind).load().await.context("Delete all failed")?;
            let prompt = console.request_delete(PendingDelete::all(kind));
            if !confirm(prompt, yes)? {
                console.cancel_delete();
                eprintln!("Cancelled");
                return Ok(());
            }
            console.confirm_delete().await.context("Delete all failed")?;
            console.flush().await.context("Delete all failed")?;
        }
        Commands::Refresh { collection } => {
            let store = console.store_mut(collection.into());
            store.refresh_from_folder().await.context("Refresh failed")?;
            let indices: Vec<usize> = (0..store.len()).collect();
            print_output(format_items(store.items(), &indices, json), "Refresh")?;
        }
        Commands::Upload { collection, files } => {
            let files = upload_files(&files).await?;
            let store = console.store_mut(collection.into());
            store.load().await.context("Upload failed")?;
            let uploaded = store.upload(files).await.context("Upload failed")?;
            if json {
                print_output(encode_json(&json!({ "uploaded": uploaded })), "Upload")?;
            }
        }
        Commands::Filter {
            location,
            clicks,
            shuffle_seed,
        } => {
            console.gallery.load().await.context("Filter failed")?;
            let items = console.gallery.items();
            let order = match shuffle_seed {
                Some(seed) => shuffled_order(items.len(), &mut StdRng::seed_from_u64(seed)),
                None => (0..items.len()).collect(),
            };
            let mut view = GalleryView::with_order(order, console.config().filter);
            let param = location.as_deref().and_then(tag_param);
            let mut filter = ActiveFilter::from_tag_param(param.as_deref());
            let mut outcome = view.apply_initial(items, &filter);
            for click in &clicks {
                filter.toggle(click);
                outcome = view.apply(items, &filter);
            }
            print_output(format_filter_outcome(items, &outcome, json), "Filter")?;
        }
        Commands::Site { action } => run_section(&mut console.site_info, action, json).await?,
        Commands::Theme { action } => run_section(&mut console.theme, action, json).await?,
        Commands::Fonts { action } => {
            let theme = current_theme(console).await?;
            match action {
                FontAction::List => {
                    let google = console.theme.theme_config()?.google_fonts;
                    let options = console.assets.font_options(&theme, &google).await?;
                    print_output(
                        if json { encode_json(&options) } else { Ok(options.join("\n")) },
                        "Fonts",
                    )?;
                }
                FontAction::Upload { file } => {
                    let file = UploadFile::from_path(&file).await?;
                    let fonts = console.assets.upload_font(&theme, file).await?;
                    let output = if json { encode_json(&fonts) } else { Ok(fonts.join("\n")) };
                    print_output(output, "Upload font")?;
                }
                FontAction::Remove { font } => {
                    let fonts = console.assets.remove_font(&theme, &font).await?;
                    let output = if json { encode_json(&fonts) } else { Ok(fonts.join("\n")) };
                    print_output(output, "Remove font")?;
                }
                FontAction::AddGoogle { family, weights } => {
                    let font = GoogleFont {
                        family,
                        weights: parse_weights(&weights),
                    };
                    let fonts = console.theme.push_google_font(font).await?;
                    print_output(encode_json(&fonts), "Add Google font")?;
                }
                FontAction::RemoveGoogle { index } => {
                    let fonts = console.theme.remove_google_font(index).await?;
                    print_output(encode_json(&fonts), "Remove Google font")?;
                }
            }
        }
        Commands::Favicon { action } => {
            current_theme(console).await?;
            match action {
                FileAction::Upload { file } => {
                    let file = UploadFile::from_path(&file).await?;
                    let filename = console.theme.upload_favicon(file).await?;
                    println!("{}", filename);
                }
                FileAction::Remove => {
                    console.theme.remove_favicon().await?;
                }
            }
        }
        Commands::Thumbnail { action } => {
            console.site_info.load().await.context("Loading site info failed")?;
            match action {
                FileAction::Upload { file } => {
                    let file = UploadFile::from_path(&file).await?;
                    let filename = console.site_info.upload_thumbnail(file).await?;
                    println!("{}", filename);
                }
                FileAction::Remove => console.site_info.remove_thumbnail().await?,
            }
        }
        Commands::Themes { action } => match action {
            ThemesAction::List => {
                let themes = console.assets.themes().await?;
                let output = if json { encode_json(&themes) } else { Ok(themes.join("\n")) };
                print_output(output, "Themes")?;
            }
            ThemesAction::Upload { folder } => {
                let theme = console.assets.upload_theme(&folder).await?;
                println!("{}", theme);
            }
            ThemesAction::Remove { theme } => console.assets.remove_theme(&theme).await?,
        },
        Commands::Build => {
            let report = console.publisher.build().await.context("Build failed")?;
            if json {
                print_output(
                    encode_json(&json!({ "ok": report.ok, "message": report.message })),
                    "Build",
                )?;
            }
            if !report.ok {
                bail!("Build failed");
            }
        }
        Commands::Download { dest } => {
            let path = console
                .publisher
                .download_output_zip(Path::new(&dest), OUTPUT_ZIP_NAME)
                .await
                .context("Download failed")?;
            println!("{}", path.display());
        }
        Commands::Preview => println!("{}", console.preview_url()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumeex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = resolve_config(Config::from_env(), server, timeout);
    tracing::debug!(server = %config.server_url, "connecting to admin server");
    let mut console = AdminConsole::new(config)?;
    let result = run(&mut console, command, json).await;
    print_notices(console.notices());
    if let Err(err) = result {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}

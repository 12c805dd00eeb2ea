use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jot::{NoteDraft, NoteId, NoteStore, Storage, Tag, TagId, ViewCache, filter_notes};

/// jot - local markdown notes with tags
#[derive(Parser)]
#[command(name = "jot")]
#[command(about = "A local markdown note manager with tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new note with optional tags
    Add(AddCommand),
    /// List notes, optionally filtered by title and tags
    List(ListCommand),
    /// Show a single note in full
    Show(ShowCommand),
    /// Edit a note; omitted fields keep their current value
    Edit(EditCommand),
    /// Delete a note
    Delete(DeleteCommand),
    /// Manage tags
    Tags(TagsCommand),
}

/// Add a new note
#[derive(Parser)]
struct AddCommand {
    /// The note's title
    #[arg(value_name = "TITLE")]
    title: String,

    /// The note's markdown body
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    markdown: String,

    /// Comma-separated tags to apply; unknown labels are created
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

/// List notes
#[derive(Parser)]
struct ListCommand {
    /// Keep only notes whose title contains this text (case-insensitive)
    #[arg(long, value_name = "QUERY")]
    title: Option<String>,

    /// Keep only notes carrying every one of these comma-separated tags
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

/// Show a note
#[derive(Parser)]
struct ShowCommand {
    /// The note's id
    #[arg(value_name = "ID")]
    id: String,
}

/// Edit a note
#[derive(Parser)]
struct EditCommand {
    /// The note's id
    #[arg(value_name = "ID")]
    id: String,

    /// Replacement title
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Replacement markdown body
    #[arg(short, long, value_name = "TEXT")]
    markdown: Option<String>,

    /// Replacement comma-separated tags; unknown labels are created
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

/// Delete a note
#[derive(Parser)]
struct DeleteCommand {
    /// The note's id
    #[arg(value_name = "ID")]
    id: String,
}

/// Manage tags
#[derive(Parser)]
struct TagsCommand {
    #[command(subcommand)]
    command: TagsSubcommand,
}

#[derive(Subcommand)]
enum TagsSubcommand {
    /// List all tags with their ids
    List,
    /// Rename a tag; notes keep their references
    Rename {
        /// The tag's id
        #[arg(value_name = "ID")]
        id: String,
        /// The new label
        #[arg(value_name = "LABEL")]
        label: String,
    },
    /// Delete a tag; notes keep a dangling reference that is dropped on display
    Delete {
        /// The tag's id
        #[arg(value_name = "ID")]
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = open_store().and_then(|mut store| match &cli.command {
        Commands::Add(cmd) => execute_add(cmd, &mut store),
        Commands::List(cmd) => execute_list(cmd, &store),
        Commands::Show(cmd) => execute_show(cmd, &store),
        Commands::Edit(cmd) => execute_edit(cmd, &mut store),
        Commands::Delete(cmd) => execute_delete(cmd, &mut store),
        Commands::Tags(cmd) => execute_tags(cmd, &mut store),
    });

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures like empty titles and lookups of
/// ids that do not exist. Internal errors include storage and I/O failures.
fn is_user_error(error: &anyhow::Error) -> bool {
    // Check if the error message indicates a user error
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty") || error_msg.contains("no note with id")
}

/// Opens the store over the default data directory.
fn open_store() -> Result<NoteStore> {
    let dir = get_data_dir()?;
    let storage = Storage::open(&dir)
        .with_context(|| format!("Failed to open data directory: {}", dir.display()))?;
    Ok(NoteStore::open(storage))
}

/// Gets the cross-platform data directory.
///
/// Returns `{data_dir}/jot` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
fn get_data_dir() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("jot"))
}

/// Handles the add command by creating a new note.
fn execute_add(cmd: &AddCommand, store: &mut NoteStore) -> Result<()> {
    // Validate title is not empty or whitespace-only
    if cmd.title.trim().is_empty() {
        anyhow::bail!("Note title cannot be empty");
    }

    let labels = cmd.tags.as_deref().map(parse_tags).unwrap_or_default();
    let tags = resolve_tag_labels(store, &labels)?;

    let id = store
        .create_note(NoteDraft::new(&cmd.title, &cmd.markdown, tags))
        .context("Failed to create note")?;

    print!("Note created (id: {id})");
    if !labels.is_empty() {
        print!(" with tags: {}", labels.join(", "));
    }
    println!();
    Ok(())
}

/// Handles the list command: resolves views and applies the title/tag filter.
fn execute_list(cmd: &ListCommand, store: &NoteStore) -> Result<()> {
    let selected = selected_tags(store, cmd.tags.as_deref());

    let mut cache = ViewCache::new();
    let views = cache.views(store);
    let filtered = filter_notes(views, cmd.title.as_deref().unwrap_or(""), &selected);

    if filtered.is_empty() {
        println!("No notes found");
        return Ok(());
    }

    for note in &filtered {
        let labels: Vec<&str> = note.tags.iter().map(Tag::label).collect();
        if labels.is_empty() {
            println!("{}  {}", note.id, note.title);
        } else {
            println!("{}  {}  [{}]", note.id, note.title, labels.join(", "));
        }
    }
    Ok(())
}

/// Handles the show command by printing one note in full.
fn execute_show(cmd: &ShowCommand, store: &NoteStore) -> Result<()> {
    let id = NoteId::new(cmd.id.as_str());
    let note = store
        .get_note(&id)
        .ok_or_else(|| anyhow::anyhow!("no note with id {id}"))?;

    let resolved = jot::resolve_tags(note, store.tags());
    let labels: Vec<&str> = resolved.iter().map(Tag::label).collect();

    println!("{}", note.title());
    if !labels.is_empty() {
        println!("tags: {}", labels.join(", "));
    }
    if !note.markdown().is_empty() {
        println!();
        println!("{}", note.markdown());
    }
    Ok(())
}

/// Handles the edit command.
///
/// Omitted flags keep the note's current values, but the store still
/// receives a full replacement draft: title, markdown, and tags are always
/// written together.
fn execute_edit(cmd: &EditCommand, store: &mut NoteStore) -> Result<()> {
    if let Some(title) = &cmd.title
        && title.trim().is_empty()
    {
        anyhow::bail!("Note title cannot be empty");
    }

    let id = NoteId::new(cmd.id.as_str());
    let Some(note) = store.get_note(&id) else {
        println!("No note with id {id}; nothing changed");
        return Ok(());
    };

    let current_title = note.title().to_string();
    let current_markdown = note.markdown().to_string();
    let current_tags = jot::resolve_tags(note, store.tags());

    let title = cmd.title.clone().unwrap_or(current_title);
    let markdown = cmd.markdown.clone().unwrap_or(current_markdown);
    let tags = match cmd.tags.as_deref() {
        Some(text) => resolve_tag_labels(store, &parse_tags(text))?,
        None => current_tags,
    };

    store
        .update_note(&id, NoteDraft::new(title, markdown, tags))
        .context("Failed to update note")?;

    println!("Note updated (id: {id})");
    Ok(())
}

/// Handles the delete command.
fn execute_delete(cmd: &DeleteCommand, store: &mut NoteStore) -> Result<()> {
    let id = NoteId::new(cmd.id.as_str());
    if store.get_note(&id).is_none() {
        println!("No note with id {id}; nothing changed");
        return Ok(());
    }

    store.delete_note(&id).context("Failed to delete note")?;
    println!("Note deleted (id: {id})");
    Ok(())
}

/// Handles the tags subcommands.
fn execute_tags(cmd: &TagsCommand, store: &mut NoteStore) -> Result<()> {
    match &cmd.command {
        TagsSubcommand::List => {
            if store.tags().is_empty() {
                println!("No tags");
                return Ok(());
            }
            for tag in store.tags() {
                println!("{}  {}", tag.id(), tag.label());
            }
            Ok(())
        }
        TagsSubcommand::Rename { id, label } => {
            if label.trim().is_empty() {
                anyhow::bail!("Tag label cannot be empty");
            }
            let id = TagId::new(id.as_str());
            if store.tags().iter().all(|tag| tag.id() != &id) {
                println!("No tag with id {id}; nothing changed");
                return Ok(());
            }
            store
                .rename_tag(&id, label.as_str())
                .context("Failed to rename tag")?;
            println!("Tag renamed (id: {id})");
            Ok(())
        }
        TagsSubcommand::Delete { id } => {
            let id = TagId::new(id.as_str());
            if store.tags().iter().all(|tag| tag.id() != &id) {
                println!("No tag with id {id}; nothing changed");
                return Ok(());
            }
            store.delete_tag(&id).context("Failed to delete tag")?;
            println!("Tag deleted (id: {id})");
            Ok(())
        }
    }
}

/// Resolves comma-separated `--tags` input into selected tags for filtering.
///
/// Unlike `resolve_tag_labels`, unknown labels are a user-visible miss here,
/// not a creation: filtering on a label that names no tag matches nothing.
fn selected_tags(store: &NoteStore, tags: Option<&str>) -> Vec<Tag> {
    let Some(text) = tags else {
        return Vec::new();
    };

    parse_tags(text)
        .into_iter()
        .map(|label| match store.find_tag_by_label(&label) {
            Some(tag) => tag.clone(),
            // A label no tag carries can never match conjunctively; a
            // placeholder tag with a fresh id keeps the AND semantics
            None => Tag::new(label),
        })
        .collect()
}

/// Resolves tag labels for a note draft, creating tags for unknown labels.
///
/// Mirrors the original creatable tag picker: typing a label that does not
/// exist yet registers it as a new tag.
fn resolve_tag_labels(store: &mut NoteStore, labels: &[String]) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for label in labels {
        let tag = match store.find_tag_by_label(label) {
            Some(tag) => tag.clone(),
            None => {
                let tag = Tag::new(label.as_str());
                store
                    .add_tag(tag.clone())
                    .context("Failed to create tag")?;
                tag
            }
        };
        tags.push(tag);
    }
    Ok(tags)
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty
/// strings.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

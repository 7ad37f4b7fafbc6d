use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stowage::huffman::{compress, decompress, CompressedStream};
use stowage::index::{FileEntry, FileIndex, FileMetadata, DEFAULT_ORDER};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stowage",
    about = "Local file organization and space-efficient storage"
)]
struct Cli {
    /// Location of the persisted index snapshot.
    #[arg(long, default_value = "index.dat", global = true)]
    index: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a file into the stowage container format.
    Compress {
        /// Input file to compress.
        input: PathBuf,
        /// Output path; a directory derives `<stem>.huff` from the input.
        output: Option<PathBuf>,
    },
    /// Decompress a stowage container back to its original bytes.
    Decompress {
        /// Compressed container to decode.
        input: PathBuf,
        /// Output path; a directory derives `<stem>_dec.txt` from the input.
        output: Option<PathBuf>,
    },
    /// Register a file in the index.
    Insert {
        /// Filename used for exact-match lookup.
        name: String,
        /// Full path used for ordered listing.
        path: String,
    },
    /// Exact-match lookup by filename.
    Search {
        /// Filename to look up.
        name: String,
    },
    /// List indexed entries in path order.
    List {
        /// Lowest path to include (inclusive).
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Highest path to include (inclusive).
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress { input, output } => run_compress(&input, output)?,
        Commands::Decompress { input, output } => run_decompress(&input, output)?,
        Commands::Insert { name, path } => run_insert(&cli.index, name, path)?,
        Commands::Search { name } => run_search(&cli.index, &name)?,
        Commands::List { from, to } => run_list(&cli.index, from, to)?,
    }

    Ok(())
}

fn run_compress(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let stream =
        compress(&bytes).with_context(|| format!("failed to compress {}", input.display()))?;

    let out = resolve_output(input, output, |stem| format!("{stem}.huff"));
    fs::write(&out, stream.to_bytes()?)
        .with_context(|| format!("failed to write {}", out.display()))?;

    println!(
        "compressed {} -> {} ({} -> {} bytes)",
        input.display(),
        out.display(),
        bytes.len(),
        stream.compressed_len()
    );
    Ok(())
}

fn run_decompress(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let stream = CompressedStream::from_bytes(&bytes)
        .with_context(|| format!("{} is not a stowage container", input.display()))?;
    let restored =
        decompress(&stream).with_context(|| format!("failed to decode {}", input.display()))?;

    let out = resolve_output(input, output, |stem| format!("{stem}_dec.txt"));
    fs::write(&out, &restored).with_context(|| format!("failed to write {}", out.display()))?;

    println!(
        "decompressed {} -> {} ({} bytes)",
        input.display(),
        out.display(),
        restored.len()
    );
    Ok(())
}

fn run_insert(index_path: &Path, name: String, path: String) -> Result<()> {
    let mut index = load_or_create(index_path)?;

    let size = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
    let compressed = Path::new(&path)
        .extension()
        .is_some_and(|ext| ext == "huff");
    let entry = FileEntry::new(
        name.clone(),
        path,
        FileMetadata {
            size,
            offset: 0,
            compressed,
        },
    );

    index
        .insert(entry)
        .with_context(|| format!("failed to index '{name}'"))?;
    index
        .save(index_path)
        .with_context(|| format!("failed to save index to {}", index_path.display()))?;

    println!("indexed '{name}' ({} entries total)", index.len());
    Ok(())
}

fn run_search(index_path: &Path, name: &str) -> Result<()> {
    let index = load_or_create(index_path)?;

    match index.find_by_name(name) {
        Some(entry) => println!(
            "found '{name}' -> {} ({} bytes{})",
            entry.path,
            entry.metadata.size,
            if entry.metadata.compressed {
                ", compressed"
            } else {
                ""
            }
        ),
        None => println!("'{name}' not found"),
    }
    Ok(())
}

fn run_list(index_path: &Path, from: Option<String>, to: Option<String>) -> Result<()> {
    let index = load_or_create(index_path)?;
    let mut count = 0usize;

    match (from, to) {
        (Some(low), Some(high)) => {
            for (path, entry) in index.list_range(&low, &high) {
                print_entry(path, entry);
                count += 1;
            }
        }
        _ => {
            for (path, entry) in index.list_all() {
                print_entry(path, entry);
                count += 1;
            }
        }
    }

    println!("{count} entries");
    Ok(())
}

fn print_entry(path: &str, entry: &FileEntry) {
    println!(
        " - {} -> {path} ({} bytes{})",
        entry.name,
        entry.metadata.size,
        if entry.metadata.compressed {
            ", compressed"
        } else {
            ""
        }
    );
}

/// Load the persisted index, falling back to a fresh one when the snapshot
/// is missing or unreadable.
fn load_or_create(path: &Path) -> Result<FileIndex> {
    if path.exists() {
        match FileIndex::load(path) {
            Ok(index) => return Ok(index),
            Err(err) => tracing::warn!(
                error = %err,
                path = %path.display(),
                "failed to load index snapshot, starting fresh"
            ),
        }
    }
    Ok(FileIndex::new(DEFAULT_ORDER)?)
}

/// Resolve the output path: use `output` as given, derive a sibling name
/// when it is omitted, or derive inside `output` when it is a directory.
fn resolve_output(
    input: &Path,
    output: Option<PathBuf>,
    default_name: impl Fn(&str) -> String,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    match output {
        Some(path) if path.is_dir() => path.join(default_name(&stem)),
        Some(path) => path,
        None => input.with_file_name(default_name(&stem)),
    }
}

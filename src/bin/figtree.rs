use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use figtree::{Document, NodeId, NodeType, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "figtree", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize an archive: version, pages, node counts, metadata.
    Info(InfoArgs),
    /// List the document's pages with their ids.
    Pages(PagesArgs),
    /// Render a subtree to an SVG file.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input archive.
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct PagesArgs {
    /// Input archive.
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input archive.
    file: PathBuf,

    /// Node id to render (`session:local`); defaults to the first page.
    #[arg(long)]
    node: Option<String>,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Uniform output scale.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Embed image fills as base64 data URIs.
    #[arg(long, default_value_t = false)]
    images: bool,

    /// Solid background color (CSS), empty for none.
    #[arg(long, default_value = "")]
    background: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Pages(args) => cmd_pages(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let doc = Document::open(&args.file)?;
    let pages: Vec<serde_json::Value> = doc
        .pages()
        .iter()
        .map(|p| serde_json::json!({ "id": p.id.to_string(), "name": p.name }))
        .collect();
    let info = serde_json::json!({
        "version": doc.version(),
        "pages": pages,
        "nodes": doc.find_nodes(None, None).len(),
        "texts": doc.find_nodes(Some(NodeType::Text), None).len(),
        "metadata": doc.metadata(),
        "warnings": doc.warnings(),
    });
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_pages(args: PagesArgs) -> anyhow::Result<()> {
    let doc = Document::open(&args.file)?;
    for page in doc.pages() {
        println!("{}\t{}", page.id, page.name);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = Document::open(&args.file)?;

    let id = match &args.node {
        Some(s) => NodeId::parse(s)?,
        None => doc
            .pages()
            .first()
            .map(|p| p.id)
            .context("document has no pages; pass --node")?,
    };

    let opts = RenderOptions {
        scale: args.scale,
        include_images: args.images,
        background: args.background.clone(),
        ..RenderOptions::default()
    };
    let out = doc.render(id, &opts)?;
    for warning in &out.warnings {
        tracing::warn!("{warning}");
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &out.svg)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

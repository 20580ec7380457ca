use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, SourceArgs};
use gistbook::{
    Catalogue,
    DataDir,
    DocumentRecord,
    SearchDocument,
    SearchIndex,
    catalogue::{self, CatalogueStats},
    error,
    ingestion,
    record,
    search,
    taxonomy,
    walker::{self, Exclusions},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("GISTBOOK_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Build(args) => {
            cmd_build(&data_dir, &args.source)?;
        }
        Command::Search(args) => {
            cmd_search(&data_dir, &args)?;
        }
        Command::Show(args) => {
            cmd_show(&data_dir, &args)?;
        }
        Command::Stats(args) => {
            cmd_stats(&data_dir, &args.source, args.json)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

/// Load document records from the notebooks directory or the metadata file.
fn load_records(
    data_dir: &DataDir,
    source: &SourceArgs,
) -> error::Result<Vec<DocumentRecord>> {
    if let Some(ref root) = source.notebooks {
        if !root.is_dir() {
            return Err(error::Error::Config(format!(
                "notebooks directory does not exist: {}",
                root.display()
            )));
        }
        let exclusions = Exclusions::new(&source.exclude)?;
        let files = walker::discover_notebooks(root, &exclusions)?;
        eprintln!("Found {} notebooks", files.len());

        let ingested = ingestion::ingest_notebooks(&files);
        if !ingested.failures.is_empty() {
            eprintln!("Errors encountered:");
            for (path, e) in &ingested.failures {
                eprintln!("  - {}: {e}", path.display());
            }
        }
        return Ok(ingested.records);
    }

    let path = source
        .metadata
        .clone()
        .unwrap_or_else(|| data_dir.metadata_file());
    let records = record::load_records(&path)?;
    eprintln!("Loaded {} notebook metadata entries", records.len());
    Ok(records)
}

fn cmd_build(data_dir: &DataDir, source: &SourceArgs) -> error::Result<()> {
    let records = load_records(data_dir, source)?;
    let search_docs: Vec<SearchDocument> =
        records.iter().map(SearchDocument::from).collect();
    let nav = taxonomy::build(&records);

    let search_path = data_dir.search_index_file();
    let nav_path = data_dir.navigation_file();
    record::write_artifact(&search_path, &search_docs)?;
    record::write_artifact(&nav_path, &nav)?;
    eprintln!(
        "Wrote {} search documents to {}",
        search_docs.len(),
        search_path.display()
    );
    eprintln!(
        "Wrote navigation with {} top-level categories to {}",
        nav.len(),
        nav_path.display()
    );

    print_stats(&CatalogueStats::collect(&records, &nav));
    Ok(())
}

fn cmd_search(data_dir: &DataDir, args: &cli::SearchArgs) -> error::Result<()> {
    let docs = record::load_search_documents(&data_dir.search_index_file())?;
    let index = SearchIndex::build(&docs);
    let results = index.query(&args.query, args.count);

    if args.json {
        search::format_json(&results, &args.query)?;
    } else {
        search::format_human(&results);
    }
    Ok(())
}

fn cmd_show(data_dir: &DataDir, args: &cli::ShowArgs) -> error::Result<()> {
    let catalogue = Catalogue::new(load_records(data_dir, &args.source)?);
    let doc = catalogue.get(&args.id).ok_or_else(|| error::Error::NotFound {
        kind: "notebook",
        name: args.id.clone(),
    })?;
    let toc = catalogue::table_of_contents(doc);

    if args.json {
        let out = serde_json::json!({
            "id": doc.id,
            "title": doc.title,
            "category": doc.category,
            "subcategory": doc.subcategory,
            "path": doc.path,
            "tags": doc.tags,
            "toc": toc,
        });
        println!("{out}");
        return Ok(());
    }

    println!("{}", doc.title);
    if doc.subcategory.is_empty() {
        println!("{}", doc.category);
    } else {
        println!("{} › {}", doc.category, doc.subcategory);
    }
    if !doc.tags.is_empty() {
        let tags: Vec<String> =
            doc.tags.iter().map(|t| t.replace('_', " ")).collect();
        println!("Tags: {}", tags.join(", "));
    }
    println!("Route: {}", doc.path);

    if toc.is_empty() {
        return Ok(());
    }
    println!("\nOn this page:");
    for entry in &toc {
        println!("{}- {} (#{})", "  ".repeat(entry.indent), entry.text, entry.anchor);
    }
    Ok(())
}

fn cmd_stats(
    data_dir: &DataDir,
    source: &SourceArgs,
    json: bool,
) -> error::Result<()> {
    let records = load_records(data_dir, source)?;
    let nav = taxonomy::build(&records);
    let stats = CatalogueStats::collect(&records, &nav);

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &CatalogueStats) {
    println!("Statistics:");
    println!("  Total notebooks: {}", stats.total);
    println!("  Categories: {}", stats.categories);
    println!("  Unique tags: {}", stats.unique_tags);
    if stats.top_categories.is_empty() {
        return;
    }
    println!("\nBrowse by category:");
    for cat in &stats.top_categories {
        println!("  {} ({})", cat.label, cat.count);
    }
}

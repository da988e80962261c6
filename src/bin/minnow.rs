use std::{
    io::{BufRead, Write, stdin, stdout},
    path::{Path, PathBuf},
};

use clap::Parser;
use miette::{IntoDiagnostic, Report, Result};
use tracing_subscriber::EnvFilter;

use minnow_db::{Database, QueryResult, loader};

const DEFAULT_MANIFEST: &str = "db.lcsv";

#[derive(Parser)]
#[clap(name = "minnow", about = "Query CSV-backed tables with a small SQL dialect")]
struct Arguments {
    /// Manifest of `table_name, csv_path` lines to load on start.
    ///
    /// Defaults to `db.lcsv` in the working directory when that file exists.
    manifest: Option<PathBuf>,

    /// Queries to execute.
    ///
    /// If omitted, an interactive session will be started.
    #[clap(short = 'e', long = "execute")]
    queries: Vec<String>,

    /// Log level used when RUST_LOG is not set.
    #[clap(long, default_value = "error")]
    log_level: tracing::Level,

    /// Print every loaded table before querying.
    #[clap(long)]
    show_tables: bool,
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    configure_logging(args.log_level);

    let mut db = Database::new();

    let manifest = args.manifest.or_else(|| {
        let default = Path::new(DEFAULT_MANIFEST);
        default.exists().then(|| default.to_path_buf())
    });
    if let Some(manifest) = manifest {
        let loaded = loader::load_manifest(&mut db, &manifest)?;
        tracing::info!(manifest = %manifest.display(), tables = ?loaded, "loaded manifest");
    }

    if args.show_tables {
        print!("{db}");
    }

    if !args.queries.is_empty() {
        for query in &args.queries {
            run_query(&mut db, query)?;
        }
        return Ok(());
    }

    println!("Enter SQL queries terminated by ';' (exit to quit)");

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    while let Some(query) = read_statement(&mut stdin, &mut stdout)? {
        // Hard failures end one-shot runs, but an interactive session carries on.
        if let Err(report) = run_query(&mut db, &query) {
            eprintln!("{report:?}");
        }
    }

    println!("Exiting Minnow");

    Ok(())
}

fn configure_logging(level: tracing::Level) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Executes one statement and prints its outcome.
///
/// Reported errors are printed and swallowed; hard failures are returned.
fn run_query(db: &mut Database, query: &str) -> Result<()> {
    match db.execute_query(query) {
        Ok(result @ QueryResult::Rows(_)) => {
            if let Some(table) = result.into_table() {
                print!("{table}");
            }
        }
        Ok(QueryResult::Status(status)) => println!("{status}"),
        Ok(QueryResult::Reported(err)) => {
            eprintln!("{:?}", Report::new(err).with_source_code(query.to_string()));
        }
        Err(err) => return Err(Report::new(err).with_source_code(query.to_string())),
    }

    Ok(())
}

/// Reads lines until one ends with `;` and joins them with spaces.
///
/// Returns `None` at end of input or when the user asks to leave.
fn read_statement(input: &mut impl BufRead, output: &mut impl Write) -> Result<Option<String>> {
    let mut lines: Vec<String> = Vec::new();

    loop {
        let prompt = if lines.is_empty() { "SQL> " } else { "  -> " };
        output.write_all(prompt.as_bytes()).into_diagnostic()?;
        output.flush().into_diagnostic()?;

        let mut buf = String::new();
        if input.read_line(&mut buf).into_diagnostic()? == 0 {
            return Ok((!lines.is_empty()).then(|| lines.join(" ")));
        }

        let line = buf.trim();
        if line.is_empty() {
            continue;
        }

        if lines.is_empty()
            && matches!(
                line.trim_end_matches(';').to_ascii_lowercase().as_str(),
                "exit" | "quit"
            )
        {
            return Ok(None);
        }

        lines.push(line.to_string());
        if line.ends_with(';') {
            return Ok(Some(lines.join(" ")));
        }
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use humspine::HumdrumFile;
use humspine::fetch::{FileFetcher, Loader};
use humspine::render::{self, TableOptions};

mod diagnostics;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "humspine")]
#[command(about = "Humdrum spine analyzer and table renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Humdrum file as an HTML table (one column per track).
    Table {
        /// Input path or file:// URI.
        #[arg(long)]
        input: String,

        /// Output path; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Emit a complete HTML page instead of the bare table.
        #[arg(long)]
        page: bool,

        /// Skip class attributes on rows.
        #[arg(long)]
        no_class: bool,

        /// Append the raw file in a textarea below the table.
        #[arg(long)]
        textarea: bool,

        /// Add resolved-value tooltips to null tokens.
        #[arg(long)]
        resolve: bool,
    },

    /// Print the stylesheet the table classes refer to.
    Css,

    /// Analyze a file and report its tracks and warnings.
    Check {
        /// Input path or file:// URI.
        #[arg(long)]
        input: String,

        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TrackSummary {
    id: u32,
    ex_interp: Option<String>,
    created: usize,
    terminated: Option<usize>,
}

#[derive(Serialize)]
struct CheckSummary {
    lines: usize,
    max_tracks: u32,
    tracks: Vec<TrackSummary>,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Table {
            input,
            out,
            page,
            no_class,
            textarea,
            resolve,
        } => {
            // 1) Load and analyze.
            let mut file = load(&input)?;
            file.analyze()
                .with_context(|| diagnostics::error_message(format!("analyze {}", input)))?;
            for w in file.warnings().unwrap_or_default() {
                diagnostics::warn(w.to_string());
            }

            // 2) Render.
            let opts = TableOptions {
                full_page: page,
                classes: !no_class,
                textarea,
                resolve_titles: resolve,
            };
            let html = render::render_table(&file, &opts)?;

            // 3) Write.
            match out {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| diagnostics::error_message(format!("write {}", path)))?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", html),
            }
        }

        Commands::Css => print!("{}", render::css()),

        Commands::Check { input, json } => {
            let mut file = load(&input)?;

            // A malformed file is the check's finding, not a crash.
            if let Err(err) = file.analyze() {
                eprintln!("{}", diagnostics::error_message(err.to_string()));
                std::process::exit(1);
            }
            for w in file.warnings().unwrap_or_default() {
                diagnostics::warn(w.to_string());
            }

            let summary = summarize(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn load(input: &str) -> Result<HumdrumFile> {
    Loader::new(FileFetcher)
        .load(input)
        .with_context(|| diagnostics::error_message(format!("load {}", input)))
}

fn summarize(file: &HumdrumFile) -> Result<CheckSummary> {
    let tracks = file
        .registry()?
        .iter()
        .map(|t| TrackSummary {
            id: t.id.0,
            ex_interp: t.ex_interp.clone(),
            created: t.created,
            terminated: t.terminated,
        })
        .collect();
    Ok(CheckSummary {
        lines: file.len(),
        max_tracks: file.max_tracks()?,
        tracks,
        warnings: file.warnings()?.iter().map(|w| w.to_string()).collect(),
    })
}

fn print_summary(summary: &CheckSummary) {
    println!("{} lines, {} tracks", summary.lines, summary.max_tracks);
    for t in &summary.tracks {
        let name = match &t.ex_interp {
            Some(n) => format!("**{}", n),
            None => "(unnamed)".to_string(),
        };
        let end = match t.terminated {
            Some(l) => (l + 1).to_string(),
            None => "end".to_string(),
        };
        println!("  track {}: {} lines {}-{}", t.id, name, t.created + 1, end);
    }
}

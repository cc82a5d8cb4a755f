use clap::Parser;
use md2jira::config::Config;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "md2jira", about = "md2jira — convert Markdown to Jira wiki markup")]
struct Cli {
    /// Input file(s) or directory (default: stdin)
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render HTML with highlighted code instead of Jira markup
    #[arg(long)]
    html: bool,

    /// Log every rendered node to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Collapse code blocks longer than N lines (default: from config or 20)
    #[arg(long)]
    collapse_after: Option<usize>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the fence-tag to Jira language table and exit
    #[arg(long)]
    list_languages: bool,
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "md2jira=debug" } else { "md2jira=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(cli: &Cli) -> String {
    if cli.inputs.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .unwrap_or_else(|e| die(&format!("cannot read stdin: {}", e)));
        return text;
    }

    let files = md2jira::list_files(&cli.inputs).unwrap_or_else(|e| die(&format!("{}", e)));
    if files.is_empty() {
        die("no input files found");
    }

    let mut all_text = String::new();
    for fp in &files {
        if !all_text.is_empty() {
            all_text.push('\n');
        }
        let content = fs::read_to_string(fp)
            .unwrap_or_else(|e| die(&format!("cannot read {}: {}", fp.display(), e)));
        all_text.push_str(&content);
    }
    all_text
}

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => Config::load_from_path(path),
        None => Config::discover(),
    };
    let mut config = loaded.unwrap_or_else(|e| die(&e.to_string()));

    // CLI overrides
    if cli.verbose {
        config.enable_verbose_logging();
    }
    if let Some(n) = cli.collapse_after {
        config.collapse_threshold = n;
    }

    init_logging(config.verbose);

    if cli.list_languages {
        for (tag, jira) in md2jira::languages::languages() {
            println!("{}\t{}", tag, jira);
        }
        return;
    }

    let input = read_input(&cli);
    let result = if cli.html {
        md2jira::html_with(&input, &config)
    } else {
        md2jira::convert_with(&input, &config)
    };

    if let Some(ref output_path) = cli.output {
        fs::write(output_path, &result)
            .unwrap_or_else(|e| die(&format!("cannot write {}: {}", output_path.display(), e)));
        tracing::info!("wrote {} bytes to {}", result.len(), output_path.display());
    } else {
        print!("{}", result);
    }
}

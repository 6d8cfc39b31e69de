//! paramharvest CLI - build fuzzing wordlists from archived URLs

use clap::{Parser, Subcommand, ValueEnum};
use paramharvest::{
    ArchiveQuery, ExtensionDenylist, FetchError, HarvestResponse, Harvester, Interrupt,
    RetryPolicy, UserAgentPool, ARCHIVE_BASE_URL, DEFAULT_PLACEHOLDER,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit code for a run cancelled by Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

/// Output format for results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// One URL per line
    #[default]
    Txt,
    /// JSON with URLs and statistics
    Json,
}

/// paramharvest - query-parameter wordlists from the Wayback Machine
#[derive(Parser, Debug)]
#[command(name = "paramharvest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (debug level)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch archived URLs for a domain and print the wordlist
    Harvest {
        /// Domain to look up
        domain: String,

        /// Proxy URL for the archive request (http, https or socks5)
        #[arg(long)]
        proxy: Option<String>,

        /// Value written into every query parameter
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Output format
        #[arg(long, short, default_value = "txt")]
        output: OutputFormat,

        /// Also write the wordlist to DIR/<domain>.txt
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,

        /// Maximum number of attempts
        #[arg(long, default_value_t = paramharvest::MAX_ATTEMPTS)]
        retries: u32,

        /// Seconds to wait between attempts
        #[arg(long, default_value_t = paramharvest::RETRY_DELAY.as_secs())]
        retry_delay: u64,

        /// Per-attempt timeout in seconds
        #[arg(
            long,
            default_value_t = paramharvest::ATTEMPT_TIMEOUT.as_secs(),
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout: u64,

        /// User-Agent to pick from (repeatable, replaces the built-in pool)
        #[arg(long = "user-agent", value_name = "UA")]
        user_agents: Vec<String>,

        /// Archive host to query
        #[arg(long, default_value = ARCHIVE_BASE_URL)]
        archive_url: String,

        /// Additional extension to exclude (repeatable)
        #[arg(long = "exclude-ext", value_name = "EXT")]
        exclude_ext: Vec<String>,
    },
    /// Normalize raw URLs from a file (or stdin) without fetching
    Clean {
        /// File with whitespace-separated URLs; stdin when omitted
        file: Option<PathBuf>,

        /// Value written into every query parameter
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Output format
        #[arg(long, short, default_value = "txt")]
        output: OutputFormat,

        /// Additional extension to exclude (repeatable)
        #[arg(long = "exclude-ext", value_name = "EXT")]
        exclude_ext: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Harvest {
            domain,
            proxy,
            placeholder,
            output,
            save,
            retries,
            retry_delay,
            timeout,
            user_agents,
            archive_url,
            exclude_ext,
        } => {
            let retry = RetryPolicy::default()
                .max_attempts(retries)
                .delay(Duration::from_secs(retry_delay))
                .attempt_timeout(Duration::from_secs(timeout));

            let mut query = ArchiveQuery::new(domain).placeholder(placeholder);
            if let Some(proxy) = proxy {
                query = query.proxy(proxy);
            }

            let (handle, interrupt) = Interrupt::pair();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.interrupt();
                }
            });

            let harvester = Harvester::builder()
                .archive_base(archive_url)
                .user_agents(UserAgentPool::new(user_agents))
                .retry(retry)
                .denylist(denylist_with(&exclude_ext))
                .interrupt(interrupt.clone())
                .build();

            run_harvest(&harvester, &query, &interrupt, output, save.as_deref()).await;
        }
        Commands::Clean {
            file,
            placeholder,
            output,
            exclude_ext,
        } => {
            let harvester = Harvester::builder()
                .denylist(denylist_with(&exclude_ext))
                .build();
            run_clean(&harvester, file.as_deref(), &placeholder, output);
        }
    }
}

/// Log to stderr so stdout stays a clean wordlist
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "paramharvest=debug"
    } else {
        "paramharvest=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn denylist_with(extra: &[String]) -> ExtensionDenylist {
    let mut denylist = ExtensionDenylist::default();
    for ext in extra {
        denylist.insert(ext);
    }
    denylist
}

async fn run_harvest(
    harvester: &Harvester,
    query: &ArchiveQuery,
    interrupt: &Interrupt,
    output: OutputFormat,
    save: Option<&Path>,
) {
    // The harvester only watches the interrupt between attempts
    let result = tokio::select! {
        result = harvester.harvest(query) => result,
        _ = interrupt.triggered() => Err(FetchError::Interrupted),
    };

    let mut response = match result {
        Ok(response) => response,
        Err(FetchError::Interrupted) => {
            eprintln!("Interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            eprintln!("Error: {}", error_chain(&e));
            std::process::exit(1);
        }
    };
    response.urls.sort();

    if let Some(dir) = save {
        match save_wordlist(dir, &response) {
            Ok(path) => eprintln!("Saved {} URLs to {}", response.urls.len(), path.display()),
            Err(e) => {
                eprintln!("Error writing results to {}: {}", dir.display(), e);
                std::process::exit(1);
            }
        }
    }

    print_response(&response, output);
}

fn run_clean(harvester: &Harvester, file: Option<&Path>, placeholder: &str, output: OutputFormat) {
    let raw = match read_input(file) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };

    let cleaned = harvester.clean(&raw, placeholder);
    let mut urls: Vec<String> = cleaned.urls.into_iter().collect();
    urls.sort();

    let response = HarvestResponse {
        domain: String::new(),
        placeholder: placeholder.to_string(),
        urls,
        stats: cleaned.stats,
    };
    print_response(&response, output);
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn print_response(response: &HarvestResponse, output: OutputFormat) {
    match output {
        OutputFormat::Txt => {
            if !response.urls.is_empty() {
                writeln_safe(&format_wordlist(&response.urls));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(response).unwrap_or_else(|e| {
                eprintln!("Error serializing response: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
    }
}

/// One URL per line, no trailing newline
fn format_wordlist(urls: &[String]) -> String {
    urls.join("\n")
}

/// File name for a domain's saved wordlist
fn result_file_name(domain: &str) -> String {
    let name: String = domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = name.trim_start_matches('.');
    if name.is_empty() {
        "results.txt".to_string()
    } else {
        format!("{}.txt", name)
    }
}

/// Write `dir/<domain>.txt`, creating `dir` if needed
fn save_wordlist(dir: &Path, response: &HarvestResponse) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(result_file_name(&response.domain));
    let mut contents = format_wordlist(&response.urls);
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Error message followed by its sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

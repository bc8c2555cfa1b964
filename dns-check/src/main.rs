//! DNS Check CLI Application
//!
//! A command-line interface that probes a list of candidate DNS resolvers
//! and writes the usable ones to a file or standard output. This CLI
//! application is a thin shell around the dns-check-lib library.

mod sink;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use dns_check_lib::{
    load_env_config, parse_duration_string, prepare_candidates, CandidateSource, ConfigManager,
    DnsChecker, EnvConfig, FileConfig, ProbeConfig, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_LIST_URL,
    MAX_CONCURRENCY,
};
use futures::StreamExt;
use sink::ResultSink;
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for dns-check
#[derive(Parser, Debug)]
#[command(name = "dns-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find usable DNS resolvers in a candidate list")]
#[command(
    long_about = "Probe candidate DNS resolvers concurrently and write the usable ones, one per line.\n\nA resolver is usable when it is reachable over UDP on port 53 and the target hostname resolves on this host."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Resolver list file (one address per line)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Resolver List"
    )]
    pub file: Option<String>,

    /// Download the resolver list from this URL [default: public-dns.info list]
    #[arg(
        short = 'g',
        long = "url",
        value_name = "URL",
        help_heading = "Resolver List"
    )]
    pub url: Option<String>,

    /// Hostname to resolve [default: google.com]
    #[arg(
        short = 'd',
        long = "domain",
        value_name = "HOSTNAME",
        help_heading = "Probe"
    )]
    pub domain: Option<String>,

    /// Reachability timeout per probe, e.g. 5s, 500ms [default: 5s]
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Probe")]
    pub timeout: Option<String>,

    /// Resolution timeout per probe [default: 5s]
    #[arg(
        long = "resolve-timeout",
        value_name = "DURATION",
        help_heading = "Probe"
    )]
    pub resolve_timeout: Option<String>,

    /// Max concurrent probes [default: 10, max: 1000]
    #[arg(
        short = 't',
        long = "threads",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub threads: Option<usize>,

    /// Write usable resolvers to this file instead of stdout
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<String>,

    /// Print the candidates that would be probed and exit
    #[arg(long = "dry-run", help_heading = "Output")]
    pub dry_run: bool,

    /// Print the --dry-run list as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,

    /// Only log errors and skip the header and summary
    #[arg(short = 'q', long = "quiet", help_heading = "Configuration")]
    pub quiet: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, Default)]
struct RunSettings {
    probe: ProbeConfig,
    source: Option<CandidateSource>,
    output: Option<String>,
}

impl RunSettings {
    /// The configured source, or the public list when nothing was configured.
    fn source(&self) -> CandidateSource {
        self.source
            .clone()
            .unwrap_or_else(|| CandidateSource::Url(DEFAULT_LIST_URL.to_string()))
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.file.is_some() && args.url.is_some() {
        return Err("Cannot specify both --file and --url".to_string());
    }

    if args.verbose && args.quiet {
        return Err("Cannot specify both --verbose and --quiet".to_string());
    }

    if args.json && !args.dry_run {
        return Err("--json is only supported together with --dry-run".to_string());
    }

    if let Some(threads) = args.threads {
        if threads == 0 || threads > MAX_CONCURRENCY {
            return Err(format!(
                "Concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            ));
        }
    }

    if let Some(domain) = &args.domain {
        if domain.trim().is_empty() {
            return Err("Hostname cannot be empty".to_string());
        }
    }

    for (flag, value) in [
        ("--timeout", &args.timeout),
        ("--resolve-timeout", &args.resolve_timeout),
    ] {
        if let Some(value) = value {
            if parse_duration_string(value).is_none() {
                return Err(format!(
                    "Invalid {} '{}'. Use format like '5s', '500ms', '2m'",
                    flag, value
                ));
            }
        }
    }

    Ok(())
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main probing logic
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let info = dns_check_lib::info();
    debug!(version = info.version, "dns-check starting");

    let settings = build_settings(&args)?;
    let source = settings.source();

    // Any failure to obtain the list aborts before a probe is spawned
    let candidates = prepare_candidates(&source.load(DEFAULT_DOWNLOAD_TIMEOUT).await?);

    if args.dry_run {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        } else {
            for candidate in &candidates {
                println!("{}", candidate);
            }
        }
        eprintln!("{} resolvers would be probed", candidates.len());
        return Ok(());
    }

    if candidates.is_empty() && !args.quiet {
        ui::print_warning(&format!("No resolvers found in {}", source));
    }

    let mut sink = ResultSink::open(settings.output.as_deref()).await?;

    if !args.quiet {
        ui::print_header(
            candidates.len(),
            settings.probe.concurrency,
            &settings.probe.hostname,
            &source,
        );
    }

    let start_time = Instant::now();
    let checker = DnsChecker::with_config(settings.probe);
    let mut stream = checker.check_servers_stream(&candidates);

    while let Some(server) = stream.next().await {
        sink.write_server(&server).await?;
    }

    let target = sink.target().to_string();
    let usable = sink.finish().await?;

    if !args.quiet {
        ui::print_summary(candidates.len(), usable, &target, start_time.elapsed());
    }

    Ok(())
}

/// Build run settings: defaults < config file < environment < CLI.
fn build_settings(args: &Args) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config();

    let file_config = if let Some(explicit_config_path) = &args.config {
        debug!(path = %explicit_config_path, "using config file from --config");
        config_manager
            .load_file(explicit_config_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", explicit_config_path, e))?
    } else if let Some(env_config_path) = &env_config.config {
        debug!(path = %env_config_path, "using config file from DNS_CHECK_CONFIG");
        config_manager
            .load_file(env_config_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", env_config_path, e))?
    } else {
        config_manager.discover_and_load().unwrap_or_default()
    };

    let settings = merge_file_config(RunSettings::default(), file_config);
    let settings = apply_environment_config(settings, &env_config);
    Ok(apply_cli_args(settings, args))
}

/// Pick a list source. A layer that names either one replaces whatever a
/// lower layer chose.
fn choose_source(
    current: Option<CandidateSource>,
    file: Option<&String>,
    url: Option<&String>,
) -> Option<CandidateSource> {
    match (file, url) {
        (Some(file), _) => Some(CandidateSource::File(file.into())),
        (None, Some(url)) => Some(CandidateSource::Url(url.clone())),
        (None, None) => current,
    }
}

/// Apply config file defaults.
fn merge_file_config(mut settings: RunSettings, file_config: FileConfig) -> RunSettings {
    let Some(defaults) = file_config.defaults else {
        return settings;
    };

    if let Some(hostname) = defaults.hostname {
        settings.probe = settings.probe.with_hostname(hostname);
    }
    if let Some(concurrency) = defaults.concurrency {
        settings.probe = settings.probe.with_concurrency(concurrency);
    }
    if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
        settings.probe = settings.probe.with_timeout(timeout);
    }
    if let Some(timeout) = defaults
        .resolve_timeout
        .as_deref()
        .and_then(parse_duration_string)
    {
        settings.probe = settings.probe.with_resolve_timeout(timeout);
    }

    settings.source = choose_source(
        settings.source,
        defaults.file.as_ref(),
        defaults.url.as_ref(),
    );
    settings.output = defaults.output.or(settings.output);
    settings
}

/// Apply `DNS_CHECK_*` environment values.
fn apply_environment_config(mut settings: RunSettings, env_config: &EnvConfig) -> RunSettings {
    if let Some(hostname) = &env_config.hostname {
        settings.probe = settings.probe.with_hostname(hostname.clone());
    }
    if let Some(concurrency) = env_config.concurrency {
        settings.probe = settings.probe.with_concurrency(concurrency);
    }
    if let Some(timeout) = env_config.timeout {
        settings.probe = settings.probe.with_timeout(timeout);
    }
    if let Some(timeout) = env_config.resolve_timeout {
        settings.probe = settings.probe.with_resolve_timeout(timeout);
    }

    settings.source = choose_source(
        settings.source,
        env_config.file.as_ref(),
        env_config.url.as_ref(),
    );
    if env_config.output.is_some() {
        settings.output = env_config.output.clone();
    }
    settings
}

/// Apply CLI arguments (highest precedence). Arguments are validated first.
fn apply_cli_args(mut settings: RunSettings, args: &Args) -> RunSettings {
    if let Some(domain) = &args.domain {
        settings.probe = settings.probe.with_hostname(domain.trim());
    }
    if let Some(threads) = args.threads {
        settings.probe = settings.probe.with_concurrency(threads);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_duration_string) {
        settings.probe = settings.probe.with_timeout(timeout);
    }
    if let Some(timeout) = args
        .resolve_timeout
        .as_deref()
        .and_then(parse_duration_string)
    {
        settings.probe = settings.probe.with_resolve_timeout(timeout);
    }

    settings.source = choose_source(settings.source, args.file.as_ref(), args.url.as_ref());
    if args.output.is_some() {
        settings.output = args.output.clone();
    }
    settings
}

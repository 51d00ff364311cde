//! `fetch` — print the body of a single HTTP GET.
//!
//! Exit codes: 0 success, 2 usage or invalid input, 3 timeout, 4 transport
//! failure, 5 HTTP error status.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use fetch_core::{timeout_from_secs, ErrorKind, Fetcher, Outcome, DEFAULT_MAX_REDIRECTS};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fetch", version, about = "Fetch a URL with one GET request and print the body")]
struct Cli {
    /// Absolute http:// or https:// URL
    url: String,

    /// Limit for the whole request, in seconds
    #[arg(
        short,
        long,
        env = "FETCH_TIMEOUT",
        default_value_t = 10.0,
        allow_negative_numbers = true
    )]
    timeout: f64,

    /// Redirect hops to follow before a 3xx is treated as final
    #[arg(long, env = "FETCH_MAX_REDIRECTS", default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    /// Extra request header, `NAME:VALUE`. May be repeated
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::Timeout => 3,
        ErrorKind::Transport => 4,
        ErrorKind::Http => 5,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = init_result {
        eprintln!("warning: tracing already initialized: {err}");
    }
}

async fn run(cli: &Cli) -> Outcome {
    let timeout = timeout_from_secs(cli.timeout)?;
    let fetcher = Fetcher::new().with_max_redirects(cli.max_redirects);

    let mut request = fetcher.build_request(&cli.url, timeout)?;
    for (name, value) in &cli.headers {
        request = request.with_header(name, value)?;
    }
    fetcher.execute(request).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli).await {
        Ok(body) => {
            let mut stdout = std::io::stdout().lock();
            let written = stdout.write_all(body.as_bytes()).and_then(|()| {
                if body.ends_with('\n') {
                    Ok(())
                } else {
                    stdout.write_all(b"\n")
                }
            });
            if let Err(err) = written.and_then(|()| stdout.flush()) {
                tracing::debug!(error = %err, "failed to write body");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(url = %cli.url, kind = ?err.kind(), "fetch failed");
            eprintln!("error: {err}");
            ExitCode::from(exit_code(err.kind()))
        }
    }
}

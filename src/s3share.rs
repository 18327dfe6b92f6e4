mod config;
mod s3;
mod share;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use config::Config;
use s3::{ObjectStore, S3Client, ShareError};
use share::{SharePlan, UploadRequest};

#[derive(Parser, Debug)]
#[command(
    name = "s3share",
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload a file to AWS S3 and print a short-lived pre-signed download URL",
    long_about = "Stores the file under a fresh random key (keeping its extension), tags it with its \
                  original name and path, and prints a pre-signed GET URL on stdout. \
                  Configure via .env file or environment variables.",
    after_help = "Examples:\n  \
                  s3share /home/me/report.pdf                 # Upload and print a 60s link\n  \
                  s3share /home/me/report.pdf --expires-in 3600\n  \
                  s3share /home/me/report.pdf --dry-run       # Show key and tags only\n\n\
                  Configuration (.env):\n  \
                  AWS_REGION=us-east-1\n  \
                  S3_BUCKET=fbm-files\n  \
                  S3_KEY_PREFIX=files/\n  \
                  S3_URL_EXPIRY_SECS=60"
)]
struct Cli {
    /// Absolute path of the file to upload
    file_path: PathBuf,

    /// Key prefix for this upload (overrides S3_KEY_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Pre-signed URL lifetime in seconds (overrides S3_URL_EXPIRY_SECS, max: 604800)
    #[arg(long, value_name = "SECS")]
    expires_in: Option<u64>,

    /// Show the key and tags that would be used without uploading
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();

    // Initialize tracing/logging with support for LOG_LEVEL from .env
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Full error chain, followed by remediation hints when there are any
fn render_error(e: &anyhow::Error) -> String {
    let chain = format!("{:#}", e);
    match e.downcast_ref::<ShareError>() {
        Some(share_error) => {
            let hints = share_error.user_message();
            if hints == share_error.to_string() {
                chain
            } else {
                format!("{}\n\n{}", chain, hints)
            }
        }
        None => chain,
    }
}

async fn execute(cli: Cli) -> Result<()> {
    info!("S3 Share Tool v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?.with_overrides(cli.prefix, cli.expires_in)?;
    let request = UploadRequest::new(cli.file_path)?;

    if cli.dry_run {
        let plan = SharePlan::new(&config, &request);
        eprintln!(
            "  {} {} → s3://{}/{}",
            style("WOULD UPLOAD").green().bold(),
            request.original_name(),
            config.bucket,
            plan.key
        );
        eprintln!("  {} {}", style("TAGS").dim(), plan.tags);
        return Ok(());
    }

    let s3_client = S3Client::new(config.clone()).await?;

    eprintln!(
        "{}",
        style(format!(
            "📦 Sharing {} via s3://{}/{}",
            request.original_name(),
            s3_client.bucket(),
            config.key_prefix
        ))
        .cyan()
        .bold()
    );

    let mut stdout = std::io::stdout().lock();
    let link = share::run(&s3_client, &config, &request, &mut stdout)
        .await
        .with_context(|| format!("Failed to share {}", request.local_path().display()))?;

    eprintln!(
        "{}",
        style(format!("Link valid for {}s", link.expires_in.as_secs())).dim()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_missing_file_path_is_rejected() {
        let err = Cli::try_parse_from(["s3share"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "s3share",
            "/tmp/report.pdf",
            "--prefix",
            "reports/",
            "--expires-in",
            "300",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.file_path, PathBuf::from("/tmp/report.pdf"));
        assert_eq!(cli.prefix.as_deref(), Some("reports/"));
        assert_eq!(cli.expires_in, Some(300));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_error_keeps_context_and_hints() {
        let err = anyhow::Error::new(ShareError::file_access(
            std::path::Path::new("/tmp/missing.pdf"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ))
        .context("Failed to share /tmp/missing.pdf");

        let rendered = render_error(&err);

        assert!(rendered.starts_with("Failed to share /tmp/missing.pdf: Cannot read file"));
        assert!(rendered.contains("ls -la /tmp/missing.pdf"));
    }

    #[test]
    fn test_error_without_hints_is_not_repeated() {
        let err = anyhow::Error::new(ShareError::sign("files/x.pdf", "bad key"))
            .context("Failed to share /tmp/x.pdf");

        assert_eq!(
            render_error(&err),
            "Failed to share /tmp/x.pdf: Cannot pre-sign 'files/x.pdf': bad key"
        );
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! Tracing setup for the proctor binary
//!
//! Logs go to stderr so they never mix with a graded program's captured
//! output or the check report on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with an env filter and a compact stderr formatter.
///
/// `RUST_LOG` wins when set; otherwise `proctor=info,warn`, or
/// `proctor=debug,info` when `verbose`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "proctor=debug,proctor_supervisor=debug,proctor_adapters=debug,info"
    } else {
        "proctor=info,proctor_supervisor=info,proctor_adapters=info,warn"
    }
}

//! Log setup for the `codepost` binary.
//!
//! Everything goes to stderr; stdout is reserved for command output such as
//! rendered templates, so `codepost render ... > file` stays clean.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding filter directives, e.g. `codepost_core=debug`.
pub const LOG_ENV: &str = "CODEPOST_LOG";

/// HTTP internals only speak up at `warn` unless asked for explicitly.
const QUIET_DEPENDENCIES: [&str; 3] = ["hyper=warn", "reqwest=warn", "rustls=warn"];

/// Filter for one run. Valid `directives` win outright; otherwise `level`
/// applies to codepost and the HTTP stack stays quiet.
fn filter_for(directives: Option<&str>, level: Level) -> EnvFilter {
    if let Some(filter) = directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }
    let mut filter = EnvFilter::new(level.as_str());
    for directive in QUIET_DEPENDENCIES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the process-wide subscriber, reading [`LOG_ENV`] and then
/// `RUST_LOG`. `json` switches to one JSON object per line. A second call is
/// a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let filter = filter_for(directives.as_deref(), level);
    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(output.json()).try_init()
    } else {
        registry.with(output).try_init()
    };
    installed.ok();
}

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `FLASHCARD_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so they stay out of the review prompts.
pub fn init_tracing(filter: &str) {
    let env_filter =
        EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

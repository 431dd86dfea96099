//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "genrelay_core=info,genrelay_server=info,genrelay=info";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `DEFAULT_FILTER`. Calling this twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_logging(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true);

    let _ = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };
}

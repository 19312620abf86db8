use env_logger::Env;

/// Installs the process logger.
///
/// `verbosity` is the number of `-v` flags: none logs warnings, `-v` info,
/// `-vv` debug and more trace. A `RUST_LOG` variable takes precedence.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default_filter = format!("life_calendar={level}");
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

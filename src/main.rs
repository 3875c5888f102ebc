use std::io::Write as _;
use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hexarith::Invocation;

fn setup_logging() {
    // stdout carries the result only, so logs go to stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn invalid_argument() -> ExitCode {
    eprint!("Invalid Argument");
    ExitCode::FAILURE
}

fn emit(text: &str) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    setup_logging();

    match Invocation::from_args(std::env::args_os()).and_then(|invocation| invocation.evaluate()) {
        Ok(text) => emit(&text),
        // domain errors replace the result but are not a failed run
        Err(err) if err.is_domain() => emit(&err.to_string()),
        Err(err) => {
            debug!(%err, "rejected arguments");
            invalid_argument()
        }
    }
}

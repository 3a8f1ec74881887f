//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use waymark_cli::CliError;

fn main() {
    env_logger::Builder::from_env(Env::new().filter_or("WAYMARK_LOG", "warn")).init();
    match waymark_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => report(&err),
    }
}

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn report(err: &CliError) -> ! {
    eprintln!("waymark: {err}");
    std::process::exit(1);
}

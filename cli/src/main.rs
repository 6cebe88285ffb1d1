//! deck CLI - interactive one-off processes and container control

use clap::Parser;

use deck_cli::cli::Cli;
use deck_cli::output::json::{error_code, format_error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    deck_cli::logging::init(cli.verbose, cli.no_color);
    let json = cli.json;

    let code = match cli.run().await {
        Ok(()) => 0,
        Err(e) => {
            if json {
                match format_error(&format!("{e:#}"), error_code(&e)) {
                    Ok(out) => eprintln!("{out}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                eprintln!("Error: {e:#}");
            }
            1
        }
    };
    // A blocking stdin read may outlive the session; don't wait for it.
    std::process::exit(code);
}

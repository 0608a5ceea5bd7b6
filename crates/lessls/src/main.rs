//
// main.rs
//
// Command-line entry point
//

use std::env;

use lessls::backend;

fn print_usage() {
    println!(
        "lessls {}, a LESS Language Server.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: lessls [OPTIONS]

Available options:

--stdio                      Start the LSP server using stdio transport
--version                    Print the version
--help                       Print this help message

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    for arg in argv {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("lessls {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    // Logs go to stderr; stdout carries the protocol
    env_logger::init();

    backend::start_lsp().await
}

use appctl::build_info::version_info;
use appctl::tracing_support::init_subscriber_with_config;
use appctl::{execute, Cli, CliError, Commands, Context};
use appctl_host::WasmAppHost;
use clap::Parser;

fn fail(e: &CliError) -> ! {
    eprintln!("{}", e);
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    // Usage errors exit here with clap's code 2
    let cli = Cli::parse();
    init_subscriber_with_config(cli.tracing_config());

    let command = match cli.command {
        Commands::App(command) => command,
        Commands::Version => {
            println!("{}", version_info());
            return;
        }
    };

    let context = Context::load(cli.config.as_deref()).unwrap_or_else(|e| fail(&e));

    let host = match WasmAppHost::new() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let exit_code = execute(command, &context, &host)
        .await
        .unwrap_or_else(|e| fail(&e));

    std::process::exit(exit_code);
}

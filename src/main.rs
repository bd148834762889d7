use fact::{
    actions::build_action,
    commands::create_cli_commands,
    configuration::{ConfigPaths, Configuration},
    context::ExecutionContext,
    error::FactError,
    logging,
};
use tracing::{info, warn};

/// Main entry point for the program
#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => ::std::process::exit(exitcode::OK),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ::std::process::exit(e.exit_code().code());
        }
    }
}

async fn run() -> Result<(), FactError> {
    let paths = ConfigPaths::from_env()?;
    let path = paths.main();
    let configuration = Configuration::load_or_default(&path)?;

    logging::init(&configuration)?;
    if path.exists() {
        info!("Loaded configuration: {}", path.display());
    } else {
        info!("Missing configuration, using defaults: {}", path.display());
    }
    if configuration.ignored_static_asset_flag() {
        warn!("static_asset_id is set without an unresolved_asset_name, ignoring it");
    }

    let matches = create_cli_commands(&configuration).get_matches();
    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => return Err(FactError::CommandNotFound(String::from("unknown"))),
    };

    let action = build_action(name, sub_matches)?;
    let mut context = ExecutionContext::from_environment(configuration, paths)?;
    action.run(&mut context).await
}

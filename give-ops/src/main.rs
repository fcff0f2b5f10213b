use anyhow::{Context, Result};
use bridge_common::logging::init_logging;
use bridge_common::output::Output;
use bridge_common::{
    HomeserverClient, Registration, DEFAULT_HOMESERVER, DEFAULT_REGISTRATION_PATH,
};
use clap::Parser;
use give_ops::{
    fetch_room, AlwaysYes, GrantOptions, GrantOutcome, PromptConfirm, OPS_LEVEL, SILENT_LEVEL,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "give-ops", version)]
#[command(about = "Grant full ops to a user in a portal room", long_about = None)]
struct Cli {
    /// The path to the AS registration file
    #[arg(short, long, default_value = DEFAULT_REGISTRATION_PATH)]
    registration: PathBuf,
    /// The user ID to grant ops to eg '@matthew:matrix.org'
    #[arg(short = 'i', long = "userid")]
    user_id: String,
    /// The alias of the portal room eg '#freenode_#matrix-dev:matrix.org'
    #[arg(short, long)]
    alias: String,
    /// Base homeserver URL eg 'https://matrix.org'
    #[arg(short = 's', long, default_value = DEFAULT_HOMESERVER)]
    homeserver: String,
    /// Power level to grant
    #[arg(long, default_value_t = OPS_LEVEL)]
    level: i64,
    /// Current power level that is raised without asking
    #[arg(long, default_value_t = SILENT_LEVEL)]
    silent_level: i64,
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        Output::error(format!("error: {err:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    Output::info(format!("Granting ops to {} in {}", cli.user_id, cli.alias));

    let registration = Registration::load(&cli.registration)?;
    let token = registration.as_token()?;
    let hs = HomeserverClient::new(&cli.homeserver, token)?;

    let options = GrantOptions {
        level: cli.level,
        silent_level: cli.silent_level,
        ..GrantOptions::new(cli.user_id, cli.alias)
    };

    let context = || format!("failed to grant ops to {} in {}", options.user_id, options.alias);

    let pending = fetch_room(&hs, &options.alias).with_context(context)?;
    println!("Modifying existing power level event:");
    println!("{}", serde_json::to_string(&pending.event)?);

    let outcome = if cli.yes {
        pending.apply(&hs, &options, &mut AlwaysYes)
    } else {
        pending.apply(&hs, &options, &mut PromptConfirm::stdio())
    }
    .with_context(context)?;

    match outcome {
        GrantOutcome::Granted { .. } => Output::success("Granted."),
        GrantOutcome::Declined { .. } => Output::warning("Aborted; power levels unchanged."),
    }

    Ok(())
}

use anyhow::{Context, Result};
use bridge_common::logging::init_logging;
use bridge_common::output::Output;
use bridge_common::{
    HomeserverClient, Registration, DEFAULT_HOMESERVER, DEFAULT_REGISTRATION_PATH,
};
use clap::Parser;
use provision::{LinkOptions, ProvisionAction, ProvisionClient, DEFAULT_IRC_SERVER};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "provision", version)]
#[command(about = "Link or unlink matrix rooms to IRC", long_about = None)]
struct Cli {
    /// The path to the AS registration file
    #[arg(short, long, default_value = DEFAULT_REGISTRATION_PATH)]
    registration: PathBuf,
    /// The user ID requesting the bridge eg '@noteness:matrix.org'
    #[arg(short = 'i', long = "userid")]
    user_id: String,
    /// The alias of the matrix room eg '#diaspin:diasp.in'
    #[arg(short, long)]
    alias: String,
    /// Base homeserver URL eg 'https://matrix.org'
    #[arg(short = 'e', long, default_value = DEFAULT_HOMESERVER)]
    homeserver: String,
    /// IRC server to bridge to
    #[arg(short = 's', long, default_value = DEFAULT_IRC_SERVER)]
    ircserver: String,
    /// IRC channel to bridge to
    #[arg(short, long)]
    channel: String,
    /// Nick of the op in channel
    #[arg(short, long)]
    op: String,
    /// Channel key
    #[arg(short, long)]
    key: Option<String>,
    /// Unlink instead of linking
    #[arg(short, long)]
    unlink: bool,
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
    let registration = Registration::load(&cli.registration)?;
    let bridge_url = registration.url()?;
    let token = registration.as_token()?;

    let action = if cli.unlink {
        ProvisionAction::Unlink
    } else {
        ProvisionAction::Link
    };
    match action {
        ProvisionAction::Link => Output::info(format!(
            "Linking {} to {}:{}",
            cli.alias, cli.ircserver, cli.channel
        )),
        ProvisionAction::Unlink => Output::info(format!(
            "Unlinking {} from {}:{}",
            cli.alias, cli.ircserver, cli.channel
        )),
    }

    let hs = HomeserverClient::new(&cli.homeserver, token)?;
    let bridge = ProvisionClient::new(bridge_url)?;
    let options = LinkOptions {
        action,
        alias: cli.alias,
        user_id: cli.user_id,
        irc_server: cli.ircserver,
        channel: cli.channel,
        op_nick: cli.op,
        key: cli.key,
    };

    let response = provision::run(&hs, &bridge, &options)
        .with_context(|| format!("failed to {action} {}", options.alias))?;
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

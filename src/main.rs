use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

mod app;
mod config;
mod directory;
mod gig;
mod http;
mod post;
mod prelude;
mod social;

#[cfg(test)]
mod test_server;

use app::Mode;
use config::Credentials;
use directory::Lml;
use prelude::*;
use social::Reddit;

/// Posts today's Melbourne gigs from lml.live to r/livemusicmelbourne.
#[derive(Parser, Debug)]
#[command(name = "livemusicbot", version)]
struct Args {
  /// Dry run - prints list of gigs to stdout, but doesn't post to reddit
  #[arg(short, long)]
  dry_run: bool,

  /// Authenticate against reddit, print the account name and exit
  #[arg(long, conflicts_with = "dry_run")]
  whoami: bool,

  /// Timeout for each HTTP request, in seconds
  #[arg(long, default_value_t = 30, env = "LIVEMUSICBOT_TIMEOUT_SECS")]
  timeout_secs: u64,

  /// One of off, error, warn, info, debug, trace
  #[arg(long, default_value = "info", env = "LIVEMUSICBOT_LOG", value_parser = parse_level)]
  log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
  s.parse::<LevelFilter>()
   .map_err(|_| format!("{:?} is not one of off, error, warn, info, debug, trace", s))
}

fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
  fern::Dispatch::new().format(|out, message, record| {
                         out.finish(format_args!("{} [{}] {}: {}",
                                                 chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
                                                 record.level(),
                                                 record.target(),
                                                 message))
                       })
                       .level(level)
                       .level_for("hyper", LevelFilter::Warn)
                       .level_for("reqwest", LevelFilter::Warn)
                       .level_for("rustls", LevelFilter::Warn)
                       .chain(std::io::stderr())
                       .apply()
}

async fn execute(args: &Args) -> Result<app::Outcome, app::Error> {
  // A post needs credentials. Load them before anything touches the network.
  let mut reddit = if args.dry_run {
    None
  } else {
    Some(Credentials::from_env().map(Reddit::new)?)
  };

  let reqw = app::init_reqw(Duration::from_secs(args.timeout_secs))?;

  match (args.whoami, reddit.as_mut()) {
    | (true, Some(reddit)) => return app::whoami(&reqw, reddit, &mut std::io::stdout()).await,
    | _ => (),
  };

  let lml = Lml::new(app::WINDOW);
  let mode = match reddit.as_mut() {
    | Some(reddit) => Mode::Post(reddit),
    | None => Mode::DryRun,
  };

  app::run(&reqw, &lml, mode, &mut std::io::stdout()).await
}

#[tokio::main]
async fn main() {
  let args = Args::parse();

  if let Err(e) = init_logger(args.log_level) {
    eprintln!("Failed to set up logging: {}", e);
  }
  log::debug!("{:#?}", args);

  let code = execute(&args).await
                           .tap(|outcome| log::info!("Finished: {:?}", outcome))
                           .tap_err(|e| log::error!("{:#?}", e))
                           .map(|_| 0)
                           .unwrap_or_else(|e| {
                             eprintln!("Error: {}", e);
                             1
                           });

  std::process::exit(code);
}

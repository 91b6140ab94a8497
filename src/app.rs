use std::{io::Write, time::Duration};

use thiserror::Error as DeriveError;

use crate::{config,
            directory::{self, Directory, Period, Window},
            post,
            prelude::*,
            social::{self, Social}};

pub const DEFAULT_LOCATION: &str = "melbourne";

/// How today's gigs are looked up.
pub const WINDOW: Window = Window::Index;

pub const SUBREDDIT_URL: &str = "https://old.reddit.com/r/livemusicmelbourne";

const USER_AGENT: &str = concat!("livemusicbot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, DeriveError)]
pub enum Error {
  #[error("{0}")]
  Config(config::Error),

  #[error("Failed to fetch gigs: {0}")]
  Directory(directory::Error),

  #[error("Reddit error: {0}")]
  Social(social::Error),

  #[error("reqwest error: {0:#?}")]
  Reqwest(reqwest::Error),

  #[error("Failed to write output: {0}")]
  Io(std::io::Error),
}

impl From<config::Error> for Error {
  fn from(e: config::Error) -> Self {
    Self::Config(e)
  }
}

impl From<directory::Error> for Error {
  fn from(e: directory::Error) -> Self {
    Self::Directory(e)
  }
}

impl From<social::Error> for Error {
  fn from(e: social::Error) -> Self {
    Self::Social(e)
  }
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Self::Io(e)
  }
}

/// What to do with the post once it's composed.
pub enum Mode<'a, S: Social> {
  DryRun,
  Post(&'a mut S),
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
  NoGigs,
  DryRun,
  Posted,
  WhoAmI(String),
}

pub fn init_reqw(timeout: Duration) -> Result<reqwest::Client, Error> {
  reqwest::Client::builder().use_rustls_tls()
                            .user_agent(USER_AGENT)
                            .timeout(timeout)
                            .build()
                            .map_err(Error::Reqwest)
}

pub async fn run<D: Directory, S: Social>(reqw: &reqwest::Client,
                                          directory: &D,
                                          mode: Mode<'_, S>,
                                          out: &mut impl Write)
                                          -> Result<Outcome, Error> {
  log::info!("Finding today's gigs...");

  let gigs = directory.gigs(reqw, Period::Today, DEFAULT_LOCATION)
                      .await
                      .tap_err(|e| log::error!("> {:#?}", e))?;

  if gigs.is_empty() {
    writeln!(out, "No gigs for today :(")?;
    writeln!(out, "I'm off to the pub. Bye for now.")?;
    return Ok(Outcome::NoGigs);
  }

  let body = post::body(&gigs);

  let social = match mode {
    | Mode::DryRun => {
      writeln!(out, "{}", body)?;
      return Ok(Outcome::DryRun);
    },
    | Mode::Post(social) => social,
  };

  log::info!("Posting {} gigs to reddit...", gigs.len());

  social.authenticate(reqw).await?;
  social.submit_post(reqw, post::KIND, post::SUBREDDIT, post::TITLE, &body)
        .await?;

  writeln!(out, "Done!")?;
  writeln!(out, "You can check it out here: {}", SUBREDDIT_URL)?;
  writeln!(out, "I'm off to the pub. Bye for now.")?;

  Ok(Outcome::Posted)
}

/// Authenticate and report which account the credentials belong to.
pub async fn whoami<S: Social>(reqw: &reqwest::Client,
                               social: &mut S,
                               out: &mut impl Write)
                               -> Result<Outcome, Error> {
  social.authenticate(reqw).await?;
  let me = social.whoami(reqw).await?;

  writeln!(out, "Authenticated as u/{}", me.name)?;

  Ok(Outcome::WhoAmI(me.name))
}

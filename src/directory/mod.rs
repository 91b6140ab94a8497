use std::{fmt, str::FromStr};

use async_trait::async_trait;
use thiserror::Error as DeriveError;

use crate::{gig::{self, Gig},
            http};

pub mod lml;
pub use lml::{Lml, Window};

/// A named window the directory knows how to list gigs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
  Today,
  NextSevenDays,
  ThisWeekend,
  NextWeekend,
  Default,
}

impl Period {
  pub const ALL: [Period; 5] = [Period::Today,
                                Period::NextSevenDays,
                                Period::ThisWeekend,
                                Period::NextWeekend,
                                Period::Default];

  pub fn as_str(&self) -> &'static str {
    match self {
      | Self::Today => "today",
      | Self::NextSevenDays => "next_seven_days",
      | Self::ThisWeekend => "this_weekend",
      | Self::NextWeekend => "next_weekend",
      | Self::Default => "default",
    }
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.iter()
             .copied()
             .find(|p| p.as_str() == s)
             .ok_or_else(|| Error::InvalidPeriod(s.to_string()))
  }
}

#[async_trait]
pub trait Directory: Sync {
  async fn gigs(&self,
                reqw: &reqwest::Client,
                period: Period,
                location: &str)
                -> Result<Vec<Gig>, Error>;

  /// Same as [`Directory::gigs`] for a period given by name. Unknown names
  /// fail before anything is requested.
  async fn gigs_named(&self,
                      reqw: &reqwest::Client,
                      period: &str,
                      location: &str)
                      -> Result<Vec<Gig>, Error> {
    let period = period.parse::<Period>()?;
    self.gigs(reqw, period, location).await
  }
}

#[derive(Debug, DeriveError)]
pub enum Error {
  #[error("Invalid period {0:?}, expected one of today, next_seven_days, this_weekend, next_weekend, default")]
  InvalidPeriod(String),

  #[error("Period {0} is not listed in the gig index")]
  PeriodNotListed(Period),

  #[error("Period {0} can't be queried with this window strategy")]
  UnsupportedPeriod(Period),

  #[error("Invalid url: {0}")]
  Url(url::ParseError),

  #[error("reqwest error: {0:#?}")]
  Reqwest(reqwest::Error),

  #[error("{url} responded {status}: {body}")]
  Status {
    url:    String,
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("serde_json error: {0:#?}")]
  Json(serde_json::Error),

  #[error("Invalid gig: {0}")]
  Gig(gig::Error),
}

impl From<url::ParseError> for Error {
  fn from(e: url::ParseError) -> Self {
    Self::Url(e)
  }
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    Self::Reqwest(e)
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Json(e)
  }
}

impl From<http::Failure> for Error {
  fn from(f: http::Failure) -> Self {
    Self::Status { url:    f.url,
                   status: f.status,
                   body:   f.body, }
  }
}

impl From<gig::Error> for Error {
  fn from(e: gig::Error) -> Self {
    Self::Gig(e)
  }
}

use async_trait::async_trait;
use serde::{Deserialize as De, Serialize as Ser};
use thiserror::Error as DeriveError;

use crate::http;

pub mod reddit;
pub use reddit::Reddit;

/// The account a social client is acting as.
#[derive(Debug, Clone, Ser, De, PartialEq)]
pub struct Me {
  pub name: String,
}

#[async_trait]
pub trait Social: Send + Sync {
  /// Exchange credentials for an access token. Only ever moves the client
  /// from unauthenticated to authenticated.
  async fn authenticate(&mut self, reqw: &reqwest::Client) -> Result<(), Error>;

  async fn submit_post(&self,
                       reqw: &reqwest::Client,
                       kind: &str,
                       target: &str,
                       title: &str,
                       body: &str)
                       -> Result<(), Error>;

  async fn whoami(&self, reqw: &reqwest::Client) -> Result<Me, Error>;
}

#[derive(Debug, DeriveError)]
pub enum Error {
  #[error("Authentication failed: {0}")]
  Auth(String),

  #[error("Missing access token")]
  MissingToken,

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
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    Self::Reqwest(e)
  }
}

impl From<http::Failure> for Error {
  fn from(f: http::Failure) -> Self {
    Self::Status { url:    f.url,
                   status: f.status,
                   body:   f.body, }
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Json(e)
  }
}

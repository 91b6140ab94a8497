use std::{env, fmt};

use thiserror::Error as DeriveError;

use crate::prelude::*;

#[derive(Debug, DeriveError)]
pub enum Error {
  #[error("Required environment variables missing: {0:?}")]
  EnvVarsMissing(Vec<String>),
}

/// Reddit script-app credentials, read from `REDDIT_*` environment variables.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
  pub client_id:     String,
  pub client_secret: String,
  pub username:      String,
  pub password:      String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
     .field("client_id", &self.client_id)
     .field("client_secret", &"<redacted>")
     .field("username", &self.username)
     .field("password", &"<redacted>")
     .finish()
  }
}

impl Credentials {
  pub fn from_env() -> Result<Self, Error> {
    Self::from_lookup(|k| env::var(k).ok())
  }

  /// Reports every missing variable, not just the first.
  pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
    let mut creds = Credentials::default();

    macro_rules! set_from_env {
      ($k:ident) => {{
        let key = format!("REDDIT_{}", std::stringify!($k).to_uppercase());
        get(&key).tap(|v| creds.$k = v.to_string()).ok_or(key)
      }};
    }

    let results = vec![set_from_env!(client_id),
                       set_from_env!(client_secret),
                       set_from_env!(username),
                       set_from_env!(password),];

    let errs = results.into_iter()
                      .filter_map(Result::err)
                      .collect::<Vec<_>>();

    if !errs.is_empty() {
      log::error!("Missing environment variables: {:?}", errs);
      Err(Error::EnvVarsMissing(errs))
    } else {
      log::debug!("Loaded credentials: {:?}", creds);
      Ok(creds)
    }
  }
}

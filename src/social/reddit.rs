use async_trait::async_trait;
use maplit::hashmap;
use serde::{de::DeserializeOwned as DeOwned, Deserialize as De, Serialize as Ser};

use super::{Error, Me, Social};
use crate::{config::Credentials, http, prelude::*};

pub const AUTH_BASE_URL: &str = "https://www.reddit.com";
pub const API_BASE_URL: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
  NotAuthed,
  Authed { token: String },
}

impl Auth {
  pub fn token(&self) -> Option<&str> {
    match self {
      | Self::NotAuthed => None,
      | Self::Authed { token } => Some(token),
    }
  }

  pub fn dbg_label(&self) -> &'static str {
    match self {
      | Self::NotAuthed => "NotAuthed",
      | Self::Authed { .. } => "Authed",
    }
  }
}

#[derive(Debug)]
pub struct Reddit {
  pub auth_base_url: String,
  pub api_base_url:  String,
  creds:             Credentials,
  auth:              Auth,
}

#[derive(Debug, Ser, De)]
struct TokenResponse {
  access_token: Option<String>,
  error:        Option<String>,
}

impl Reddit {
  pub fn new(creds: Credentials) -> Self {
    Reddit { auth_base_url: AUTH_BASE_URL.into(),
             api_base_url: API_BASE_URL.into(),
             creds,
             auth: Auth::NotAuthed }
  }

  pub fn auth(&self) -> &Auth {
    &self.auth
  }

  fn token(&self) -> Result<&str, Error> {
    self.auth
        .token()
        .ok_or(Error::MissingToken)
        .tap_err(|_| log::error!("reddit is {}, authenticate first", self.auth.dbg_label()))
  }

  fn parse<T: DeOwned>(json: String) -> Result<T, Error> {
    serde_json::from_str(&json).tap_err(|_| log::error!("> Failed to parse response: {}", json))
                               .map_err(Into::into)
  }

  async fn fetch_access_token(&self, reqw: &reqwest::Client) -> Result<String, Error> {
    let url = format!("{}/api/v1/access_token", self.auth_base_url);
    log::info!("POST {}", url);

    let form = hashmap! {
      "grant_type" => "password",
      "username" => self.creds.username.as_str(),
      "password" => self.creds.password.as_str(),
    };

    let resp = reqw.post(url)
                   .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
                   .form(&form)
                   .send()
                   .await?;

    let json = http::fail_if_error(resp).await?.text().await?;

    Self::parse::<TokenResponse>(json).and_then(|r| match r {
                                         | TokenResponse { access_token: Some(token), .. } => Ok(token),
                                         | TokenResponse { error: Some(e), .. } => Err(Error::Auth(e)),
                                         | _ => Err(Error::Auth("response had no access_token".into())),
                                       })
  }
}

#[async_trait]
impl Social for Reddit {
  async fn authenticate(&mut self, reqw: &reqwest::Client) -> Result<(), Error> {
    if let Auth::Authed { .. } = self.auth {
      log::warn!("Already authenticated against reddit, keeping the current token");
      return Ok(());
    }

    log::info!("Authenticating against reddit as {}...", self.creds.username);

    let token = self.fetch_access_token(reqw)
                    .await
                    .map_err(|e| match e {
                      | Error::Auth(_) => e,
                      | other => Error::Auth(other.to_string()),
                    })
                    .tap_err(|e| log::error!("> {}", e))?;

    self.auth = Auth::Authed { token };
    log::info!("> OK");

    Ok(())
  }

  async fn submit_post(&self,
                       reqw: &reqwest::Client,
                       kind: &str,
                       target: &str,
                       title: &str,
                       body: &str)
                       -> Result<(), Error> {
    let token = self.token()?;

    let url = format!("{}/api/submit", self.api_base_url);
    log::info!("POST {}", url);
    log::debug!("> {} post {:?} to r/{}", kind, title, target);

    let form = hashmap! {
      "kind" => kind,
      "sr" => target,
      "title" => title,
      "text" => body,
    };

    let resp = reqw.post(url).bearer_auth(token).form(&form).send().await?;

    http::fail_if_error(resp).await
                             .map_err(Into::into)
                             .tap(|_| log::info!("> OK"))
                             .map(|_| ())
  }

  async fn whoami(&self, reqw: &reqwest::Client) -> Result<Me, Error> {
    let token = self.token()?;

    let url = format!("{}/api/v1/me", self.api_base_url);
    log::info!("GET {}", url);

    let resp = reqw.get(url).bearer_auth(token).send().await?;
    let json = http::fail_if_error(resp).await?.text().await?;

    Self::parse::<Me>(json).tap(|me| log::info!("> OK: {}", me.name))
  }
}

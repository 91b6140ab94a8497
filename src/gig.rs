use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize as De, Deserializer, Serialize as Ser};
use thiserror::Error as DeriveError;
use url::form_urlencoded;

use crate::{post, prelude::*};

pub const LML_GIG_BASE_URL: &str = "https://lml.live/gigs";

/// Host of the "submit a link" page the discuss link points at.
pub const DISCUSSION_HOST: &str = "https://reddit.com";

#[derive(Debug, DeriveError)]
pub enum Error {
  #[error("Missing required field {0}")]
  MissingField(&'static str),

  #[error("Failed to parse date {raw:?}: {source}")]
  Date {
    raw:    String,
    source: chrono::ParseError,
  },

  #[error("Gig payload has an unexpected shape: {0}")]
  Shape(serde_json::Error),
}

/// A gig as it comes off the wire. Every field is optional here;
/// [`Gig::from_lml`] decides what is actually required.
#[derive(Debug, Default, Ser, De, PartialEq)]
pub struct LmlGig {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id:    Option<String>,
  pub name:  Option<String>,
  pub date:  Option<String>,
  pub venue: Option<LmlVenue>,
}

#[derive(Debug, Default, Ser, De, PartialEq)]
pub struct LmlVenue {
  pub name: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D)
                                              -> Result<Option<String>, D::Error> {
  #[derive(De)]
  #[serde(untagged)]
  enum Id {
    Str(String),
    Num(serde_json::Number),
  }

  Option::<Id>::deserialize(d).map(|id| {
                                 id.map(|id| match id {
                                     | Id::Str(s) => s,
                                     | Id::Num(n) => n.to_string(),
                                   })
                               })
}

/// One validated gig listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Gig {
  id:    String,
  name:  String,
  date:  NaiveDate,
  venue: String,
}

impl Gig {
  pub fn from_lml(gig: LmlGig) -> Result<Self, Error> {
    let LmlGig { id, name, date, venue } = gig;

    let id = id.ok_or(Error::MissingField("id"))?;
    let name = name.ok_or(Error::MissingField("name"))?;
    let date = date.ok_or(Error::MissingField("date"))?;
    let venue = venue.and_then(|v| v.name)
                     .ok_or(Error::MissingField("venue.name"))?;

    parse_date(&date).map(|date| Gig { id, name, date, venue })
  }

  pub fn from_value(val: serde_json::Value) -> Result<Self, Error> {
    serde_json::from_value::<LmlGig>(val).map_err(Error::Shape)
                                         .bind(Self::from_lml)
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  pub fn venue(&self) -> &str {
    &self.venue
  }

  /// `<name> - <venue> - <Fri, 05 Jan 2024>`
  pub fn display_name(&self) -> String {
    format!("{} - {} - {}",
            self.name,
            self.venue,
            self.date.format("%a, %d %b %Y"))
  }

  pub fn lml_url(&self) -> String {
    format!("{}/{}", LML_GIG_BASE_URL, self.id)
  }

  /// The title parameter is built from the unsanitized display name.
  pub fn discussion_url(&self) -> String {
    let title = escape(&self.display_name());

    format!("{}/r/{}/submit?url={}&title={}",
            DISCUSSION_HOST,
            post::SUBREDDIT,
            self.lml_url(),
            title)
  }

  pub fn to_reddit_s(&self) -> String {
    format!("{} [[discuss]({})] [[view gig]({})]",
            sanitize(&self.display_name()),
            self.discussion_url(),
            self.lml_url())
  }
}

impl fmt::Display for Gig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.to_reddit_s())
  }
}

/// Form-style escaping that leaves `~` alone and escapes `*`, which reddit's
/// markdown would otherwise read as emphasis.
fn escape(s: &str) -> String {
  form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>()
                                               .replace('*', "%2A")
                                               .replace("%7E", "~")
}

fn sanitize(s: &str) -> String {
  s.replace('`', "")
}

fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
  let s = raw.trim();

  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_local().date()))
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
    .map_err(|source| Error::Date { raw: raw.to_string(),
                                    source })
}

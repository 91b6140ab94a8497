use async_trait::async_trait;
use chrono::{Local, NaiveTime, TimeZone};
use serde::{de::DeserializeOwned as DeOwned, Deserialize as De, Serialize as Ser};
use serde_json::{Map, Value};
use url::Url;

use super::{Directory, Error, Period};
use crate::{gig::{Gig, LmlGig},
            http,
            prelude::*};

pub const BASE_URL: &str = "https://api.lml.live";

/// How a [`Period`] is turned into a gig query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
  /// Look the period up in the `/gigs` index and follow its href.
  Index,
  /// Query `/gigs/query` directly with today's local midnight as both ends
  /// of the range. Only knows about [`Period::Today`].
  Today,
}

/// Client for the Live Music Locator gig directory.
#[derive(Debug)]
pub struct Lml {
  pub base_url: String,
  pub window:   Window,
}

/// An entry of the `/gigs` index. Either a bare href or `{ "href": .. }`.
#[derive(Debug, Ser, De, PartialEq)]
#[serde(untagged)]
enum IndexEntry {
  Href(String),
  Link { href: String },
}

impl IndexEntry {
  fn href(&self) -> &str {
    match self {
      | Self::Href(href) => href,
      | Self::Link { href } => href,
    }
  }
}

impl Lml {
  pub fn new(window: Window) -> Self {
    Lml { base_url: BASE_URL.into(),
          window }
  }

  fn base(&self) -> Result<Url, Error> {
    Url::parse(&self.base_url).map_err(Into::into)
  }

  async fn get<T: DeOwned>(&self, reqw: &reqwest::Client, url: Url) -> Result<T, Error> {
    log::info!("GET {}", url);

    let resp = reqw.get(url).send().await?;
    let json = http::fail_if_error(resp).await?.text().await?;

    serde_json::from_str::<T>(&json).tap_err(|_| log::error!("> Failed to parse response: {}", json))
                                    .map_err(Into::into)
  }

  /// Entries other than the requested period are left unparsed.
  async fn index(&self, reqw: &reqwest::Client) -> Result<Map<String, Value>, Error> {
    let url = self.base()?.join("/gigs")?;

    self.get::<Map<String, Value>>(reqw, url)
        .await
        .tap(|idx| log::debug!("> index lists {:?}", idx.keys().collect::<Vec<_>>()))
  }

  async fn resolve(&self,
                   reqw: &reqwest::Client,
                   period: Period,
                   location: &str)
                   -> Result<Url, Error> {
    let index = self.index(reqw).await?;
    let entry = index.get(period.as_str())
                     .cloned()
                     .and_then(|v| {
                       serde_json::from_value::<IndexEntry>(v)
                         .tap_err(|e| log::error!("> index entry for {} is unusable: {}", period, e))
                         .ok()
                     })
                     .ok_or(Error::PeriodNotListed(period))?;

    self.base()?
        .join(entry.href())
        .map(|url| with_location(url, location))
        .map_err(Into::into)
  }

  fn query_url(&self, location: &str, midnight: &str) -> Result<Url, Error> {
    let mut url = self.base()?.join("/gigs/query")?;
    url.query_pairs_mut()
       .append_pair("date_from", midnight)
       .append_pair("date_to", midnight)
       .append_pair("location", location);
    Ok(url)
  }
}

#[async_trait]
impl Directory for Lml {
  async fn gigs(&self,
                reqw: &reqwest::Client,
                period: Period,
                location: &str)
                -> Result<Vec<Gig>, Error> {
    log::debug!("gigs ({:?} window) for {} in {}", self.window, period, location);

    let url = match self.window {
      | Window::Index => self.resolve(reqw, period, location).await?,
      | Window::Today if period == Period::Today => self.query_url(location, &local_midnight())?,
      | Window::Today => return Err(Error::UnsupportedPeriod(period)),
    };

    self.get::<Vec<LmlGig>>(reqw, url)
        .await?
        .into_iter()
        .map(Gig::from_lml)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
        .tap(|gigs| log::info!("> Got {} gigs from lml", gigs.len()))
  }
}

/// Replace every `location` query parameter of `url`, or append one.
pub fn with_location(mut url: Url, location: &str) -> Url {
  let mut found = false;
  let pairs = url.query_pairs()
                 .map(|(k, v)| {
                   if k == "location" {
                     found = true;
                     (k.into_owned(), location.to_string())
                   } else {
                     (k.into_owned(), v.into_owned())
                   }
                 })
                 .collect::<Vec<_>>();

  {
    let mut query = url.query_pairs_mut();
    query.clear();
    for (k, v) in &pairs {
      query.append_pair(k, v);
    }
    if !found {
      query.append_pair("location", location);
    }
  }

  url
}

/// Start of today in local time, e.g. `2024-01-05 00:00:00 +1100`.
fn local_midnight() -> String {
  let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);

  Local.from_local_datetime(&midnight)
       .earliest()
       .map(|dt| dt.format("%Y-%m-%d %H:%M:%S %z").to_string())
       .unwrap_or_else(|| midnight.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_server;

  const GIGS: &str = r##"[
    { "id": "1", "name": "Show A", "date": "2024-01-05", "venue": { "name": "Pub" } },
    { "id": "2", "name": "Show B", "date": "2024-01-05T21:00:00+11:00", "venue": { "name": "Club" } }
  ]"##;

  fn unreachable() -> Lml {
    Lml { base_url: "http://127.0.0.1:1".into(),
          window:   Window::Index }
  }

  #[test]
  pub fn with_location_should_replace_existing_param() {
    let url = Url::parse("https://api.lml.live/gigs/query?date_from=2024-01-05&location=sydney&date_to=2024-01-05").unwrap();

    let url = with_location(url, "melbourne");

    assert_eq!(url.query(),
               Some("date_from=2024-01-05&location=melbourne&date_to=2024-01-05"));
  }

  #[test]
  pub fn with_location_should_append_when_missing() {
    let url = Url::parse("https://api.lml.live/gigs/query?date_from=2024-01-05").unwrap();

    let url = with_location(url, "melbourne");

    assert_eq!(url.query(), Some("date_from=2024-01-05&location=melbourne"));
  }

  #[test]
  pub fn index_entry_should_accept_both_shapes() {
    let json = r##"{ "today": { "href": "/gigs/query?a=1" }, "this_weekend": "/gigs/query?b=2" }"##;

    let idx = serde_json::from_str::<Map<String, Value>>(json).expect("should deserialize");
    let entry = |k: &str| serde_json::from_value::<IndexEntry>(idx[k].clone()).expect("should be an entry");

    assert_eq!(entry("today").href(), "/gigs/query?a=1");
    assert_eq!(entry("this_weekend").href(), "/gigs/query?b=2");
  }

  #[test]
  pub fn query_url_should_carry_window_and_location() {
    let lml = Lml::new(Window::Today);

    let url = lml.query_url("melbourne", "2024-01-05 00:00:00 +1100").unwrap();

    assert_eq!(url.as_str(),
               "https://api.lml.live/gigs/query?date_from=2024-01-05+00%3A00%3A00+%2B1100&date_to=2024-01-05+00%3A00%3A00+%2B1100&location=melbourne");
  }

  #[test]
  pub fn local_midnight_should_start_today() {
    let today = Local::now().date_naive().format("%Y-%m-%d 00:00:00").to_string();

    assert!(local_midnight().starts_with(&today));
  }

  #[tokio::test]
  pub async fn unknown_period_name_should_fail_before_requesting() {
    let reqw = reqwest::Client::new();

    let res = unreachable().gigs_named(&reqw, "fortnight", "melbourne").await;

    assert!(matches!(res, Err(Error::InvalidPeriod(_))), "got {:?}", res);
  }

  #[tokio::test]
  pub async fn today_window_should_reject_other_periods() {
    let reqw = reqwest::Client::new();
    let lml = Lml { window: Window::Today,
                    ..unreachable() };

    let res = lml.gigs(&reqw, Period::ThisWeekend, "melbourne").await;

    assert!(matches!(res, Err(Error::UnsupportedPeriod(Period::ThisWeekend))),
            "got {:?}",
            res);
  }

  #[tokio::test]
  pub async fn index_window_should_follow_href_with_location() {
    // ARRANGE
    let index = r##"{
      "today": { "href": "/gigs/query?date_from=2024-01-05&date_to=2024-01-05&location=sydney" },
      "next_seven_days": { "href": "/gigs/query?date_from=2024-01-05&date_to=2024-01-12&location=sydney" }
    }"##;
    let server = test_server::serve(vec![("GET", "/gigs", 200, index.into()),
                                         ("GET", "/gigs/query", 200, GIGS.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Index };

    // ACT
    let gigs = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne")
                  .await
                  .expect("should fetch");

    // ASSERT
    let reqs = server.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].path, "/gigs");
    assert_eq!(reqs[1].path,
               "/gigs/query?date_from=2024-01-05&date_to=2024-01-05&location=melbourne");

    assert_eq!(gigs.len(), 2);
    assert_eq!(gigs[0].name(), "Show A");
    assert_eq!(gigs[1].venue(), "Club");
    assert_eq!(gigs[1].date(), gigs[0].date());
  }

  #[tokio::test]
  pub async fn index_should_ignore_unrelated_entries() {
    // ARRANGE
    let index = r##"{
      "today": { "href": "/gigs/query?location=sydney" },
      "count": 4,
      "meta": { "generated": "2024-01-05" },
      "_links": [{ "rel": "self" }]
    }"##;
    let server = test_server::serve(vec![("GET", "/gigs", 200, index.into()),
                                         ("GET", "/gigs/query", 200, GIGS.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Index };

    // ACT
    let gigs = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne")
                  .await
                  .expect("should fetch");

    // ASSERT
    assert_eq!(gigs.len(), 2);
    assert_eq!(server.requests()[1].path, "/gigs/query?location=melbourne");
  }

  #[tokio::test]
  pub async fn malformed_period_entry_should_be_not_listed() {
    let server = test_server::serve(vec![("GET", "/gigs", 200, r#"{ "today": 4 }"#.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Index };

    let res = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne").await;

    assert!(matches!(res, Err(Error::PeriodNotListed(Period::Today))), "got {:?}", res);
    assert_eq!(server.requests().len(), 1);
  }

  #[tokio::test]
  pub async fn index_without_period_should_fail() {
    let server =
      test_server::serve(vec![("GET", "/gigs", 200, r#"{ "today": { "href": "/gigs/query" } }"#.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Index };

    let res = lml.gigs(&reqwest::Client::new(), Period::NextWeekend, "melbourne").await;

    assert!(matches!(res, Err(Error::PeriodNotListed(Period::NextWeekend))),
            "got {:?}",
            res);
    assert_eq!(server.requests().len(), 1);
  }

  #[tokio::test]
  pub async fn today_window_should_query_directly() {
    let server = test_server::serve(vec![("GET", "/gigs/query", 200, GIGS.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Today };

    let gigs = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne")
                  .await
                  .expect("should fetch");

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].path.starts_with("/gigs/query?date_from="), "{}", reqs[0].path);
    assert!(reqs[0].path.ends_with("&location=melbourne"), "{}", reqs[0].path);
    assert_eq!(gigs.len(), 2);
  }

  #[tokio::test]
  pub async fn non_success_status_should_fail() {
    let server = test_server::serve(vec![("GET", "/gigs", 503, r#"{"error":"down"}"#.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Index };

    let res = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne").await;

    match res {
      | Err(Error::Status { status, body, .. }) => {
        assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"error":"down"}"#);
      },
      | other => panic!("expected status error, got {:?}", other),
    }
  }

  #[tokio::test]
  pub async fn invalid_gig_should_fail_the_whole_fetch() {
    let gigs = r##"[
      { "id": "1", "name": "Show A", "date": "2024-01-05", "venue": { "name": "Pub" } },
      { "id": "2", "name": "Show B", "venue": { "name": "Club" } }
    ]"##;
    let server = test_server::serve(vec![("GET", "/gigs/query", 200, gigs.into())]).await;
    let lml = Lml { base_url: server.base_url.clone(),
                    window:   Window::Today };

    let res = lml.gigs(&reqwest::Client::new(), Period::Today, "melbourne").await;

    assert!(matches!(res, Err(Error::Gig(crate::gig::Error::MissingField("date")))),
            "got {:?}",
            res);
  }
}

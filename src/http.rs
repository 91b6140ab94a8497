/// A non-2xx response, body read to the end.
#[derive(Debug)]
pub struct Failure {
  pub url:    String,
  pub status: reqwest::StatusCode,
  pub body:   String,
}

pub async fn fail_if_error(r: reqwest::Response) -> Result<reqwest::Response, Failure> {
  if !r.status().is_success() {
    log::error!("> status {}", r.status());
    let url = r.url().to_string();
    let status = r.status();
    let body = r.text().await.unwrap_or_default();
    log::error!("> body {}", body);
    Err(Failure { url, status, body })
  } else {
    Ok(r)
  }
}

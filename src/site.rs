//! HTTP access to the portfolio site: the manifest, images, and the
//! contact form endpoint.

use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::debug;

use crate::catalog::Manifest;
use crate::constants::constants;

/// Fetch and decode the site manifest.
pub async fn fetch_manifest(client: &Client, url: &str) -> Result<Manifest> {
  debug!(url = %url, "site: fetching manifest");
  let response =
    client.get(url).send().await.with_context(|| format!("Failed to fetch manifest from {}", url))?;
  let response = response.error_for_status().context("Manifest request returned an error status")?;
  let manifest = response.json::<Manifest>().await.context("Failed to decode manifest JSON")?;
  Ok(manifest)
}

/// Fetch one image and decode it.
pub async fn fetch_image(client: &Client, url: &str) -> Result<DynamicImage> {
  let response = client.get(url).send().await.with_context(|| format!("Failed to fetch image from {}", url))?;
  let response = response.error_for_status().with_context(|| format!("Image request failed for {}", url))?;
  let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
  let image = image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image from {}", url))?;
  Ok(image)
}

/// Fetch a batch of images with bounded concurrency, streaming each
/// decoded image back as it lands. Failures are logged and skipped.
pub async fn fetch_images(client: Client, urls: Vec<String>, tx: mpsc::Sender<(String, DynamicImage)>) {
  stream::iter(urls)
    .map(|url| {
      let client = client.clone();
      let tx = tx.clone();
      async move {
        match fetch_image(&client, &url).await {
          Ok(image) => {
            let _ = tx.send((url, image)).await;
          }
          Err(e) => debug!(url = %url, err = %e, "site: image fetch failed"),
        }
      }
    })
    .buffer_unordered(constants().image_fetch_concurrency)
    .collect::<()>()
    .await;
}

/// The request the form endpoint expects: urlencoded fields, JSON reply.
fn contact_request(client: &Client, endpoint: &str, fields: &[(String, String)]) -> reqwest::RequestBuilder {
  client.post(endpoint).header(reqwest::header::ACCEPT, "application/json").form(fields)
}

/// POST the contact form fields. An ok status is success; any other
/// outcome is a uniform failure.
pub async fn submit_contact(client: &Client, endpoint: &str, fields: &[(String, String)]) -> Result<()> {
  let response = contact_request(client, endpoint, fields).send().await.context("Failed to reach the form endpoint")?;
  if !response.status().is_success() {
    return Err(anyhow!("Form endpoint returned {}", response.status()));
  }
  Ok(())
}

/// Resolve a possibly relative manifest path against the URL the manifest
/// was fetched from. Falls back to the raw string when resolution fails.
pub fn resolve_url(base: &str, raw: &str) -> String {
  if raw.starts_with("http://") || raw.starts_with("https://") {
    return raw.to_string();
  }
  match reqwest::Url::parse(base).and_then(|b| b.join(raw)) {
    Ok(url) => url.to_string(),
    Err(_) => raw.to_string(),
  }
}

/// Derive the plain watch URL from a YouTube embed URL. mpv wants the
/// watch form; anything that is not an embed URL passes through unchanged.
pub fn watch_url_from_embed(embed: &str) -> String {
  let Some(idx) = embed.find("/embed/") else {
    return embed.to_string();
  };
  let id: String =
    embed[idx + "/embed/".len()..].chars().take_while(|c| !matches!(c, '?' | '&' | '#' | '/')).collect();
  if id.is_empty() { embed.to_string() } else { format!("https://www.youtube.com/watch?v={}", id) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn watch_url_from_plain_embed() {
    assert_eq!(
      watch_url_from_embed("https://www.youtube.com/embed/dQw4w9WgXcQ"),
      "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
  }

  #[test]
  fn watch_url_strips_query() {
    assert_eq!(
      watch_url_from_embed("https://www.youtube.com/embed/abc123?rel=0&autoplay=1"),
      "https://www.youtube.com/watch?v=abc123"
    );
  }

  #[test]
  fn watch_url_from_nocookie_domain() {
    assert_eq!(
      watch_url_from_embed("https://www.youtube-nocookie.com/embed/abc123"),
      "https://www.youtube.com/watch?v=abc123"
    );
  }

  #[test]
  fn watch_url_ignores_trailing_path() {
    assert_eq!(
      watch_url_from_embed("https://www.youtube.com/embed/abc123/extra"),
      "https://www.youtube.com/watch?v=abc123"
    );
  }

  #[test]
  fn non_embed_url_passes_through() {
    assert_eq!(watch_url_from_embed("https://vimeo.com/12345"), "https://vimeo.com/12345");
    assert_eq!(watch_url_from_embed("https://www.youtube.com/embed/"), "https://www.youtube.com/embed/");
  }

  #[test]
  fn resolve_relative_path() {
    assert_eq!(
      resolve_url("https://site.example.com/data.json", "images/cover.jpg"),
      "https://site.example.com/images/cover.jpg"
    );
  }

  #[test]
  fn resolve_root_relative_path() {
    assert_eq!(
      resolve_url("https://site.example.com/deep/data.json", "/images/cover.jpg"),
      "https://site.example.com/images/cover.jpg"
    );
  }

  #[test]
  fn resolve_absolute_passes_through() {
    assert_eq!(resolve_url("https://site.example.com/data.json", "https://cdn.example.com/x.jpg"), "https://cdn.example.com/x.jpg");
  }

  #[test]
  fn resolve_with_bad_base_falls_back() {
    assert_eq!(resolve_url("not a url", "images/cover.jpg"), "images/cover.jpg");
  }

  #[test]
  fn contact_request_posts_urlencoded_fields() {
    let fields = vec![
      ("name".to_string(), "Ana Torres".to_string()),
      ("email".to_string(), "ana@example.com".to_string()),
      ("message".to_string(), "Hola desde Madrid".to_string()),
    ];
    let request = contact_request(&Client::new(), "https://forms.example.com/f/abc", &fields)
      .build()
      .expect("request should build");

    assert_eq!(request.method().as_str(), "POST");
    let headers = request.headers();
    assert_eq!(headers.get(reqwest::header::ACCEPT).and_then(|v| v.to_str().ok()), Some("application/json"));
    assert_eq!(
      headers.get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
      Some("application/x-www-form-urlencoded")
    );
    let body = request.body().and_then(|b| b.as_bytes()).expect("form body should be buffered");
    assert_eq!(
      std::str::from_utf8(body).expect("urlencoded body is ascii"),
      "name=Ana+Torres&email=ana%40example.com&message=Hola+desde+Madrid"
    );
  }
}

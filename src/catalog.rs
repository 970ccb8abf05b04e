//! The item catalog: everything renderable, parsed once from the site's
//! `data.json` manifest.
//!
//! Cards are immutable after construction. Search text is lowercased here
//! so the per-keystroke filter never re-normalizes, and relative media
//! URLs are resolved against the manifest URL up front.

use serde::Deserialize;

use crate::constants::constants;
use crate::site;

// --- Manifest wire format ---

/// Top-level shape of `data.json`. Either section may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
  #[serde(default)]
  pub videos: Vec<VideoEntry>,
  #[serde(default)]
  pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
  pub title: String,
  pub embed_url: String,
  #[serde(default)]
  pub search_tags: String,
  /// Category label ("type" in the manifest). Missing means the default
  /// category.
  #[serde(rename = "type")]
  pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
  pub title: String,
  /// Kind of score, e.g. "Solo arrangement" ("type" in the manifest).
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub notation_type: Option<String>,
  pub image_url: Option<String>,
  pub audio_url: Option<String>,
  #[serde(default)]
  pub is_free: bool,
  pub price_text: Option<String>,
  pub link: Option<String>,
  #[serde(default)]
  pub search_tags: String,
}

// --- Catalog ---

/// A video card ready for rendering and playback.
#[derive(Debug, Clone)]
pub struct VideoCard {
  pub title: String,
  /// Plain watch URL derived from the embed URL; what mpv actually opens.
  pub watch_url: String,
  pub category: String,
  /// Lowercased search tags, precomputed at catalog build.
  pub search_text: String,
}

/// A score card: preview image, optional audio sample, purchase info.
#[derive(Debug, Clone)]
pub struct ScoreCard {
  pub title: String,
  pub kind: Option<String>,
  pub notation: Option<String>,
  pub image_url: String,
  pub audio_url: Option<String>,
  pub is_free: bool,
  pub price_text: Option<String>,
  pub link: Option<String>,
  pub search_text: String,
}

impl ScoreCard {
  /// "Solo arrangement • Standard notation", omitting whichever part is
  /// missing.
  pub fn subtitle(&self) -> String {
    match (self.kind.as_deref(), self.notation.as_deref()) {
      (Some(kind), Some(notation)) => format!("{} • {}", kind, notation),
      (Some(kind), None) => kind.to_string(),
      (None, Some(notation)) => notation.to_string(),
      (None, None) => String::new(),
    }
  }

  pub fn price_label(&self) -> String {
    if self.is_free {
      "Free".to_string()
    } else {
      match self.price_text {
        Some(ref price) => format!("€{}", price),
        None => "Paid".to_string(),
      }
    }
  }
}

/// The full set of renderable items. Built once after the manifest fetch
/// and never mutated afterwards.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
  pub videos: Vec<VideoCard>,
  pub scores: Vec<ScoreCard>,
}

impl Catalog {
  /// Materialize cards from the manifest, filling in defaults for missing
  /// optional fields and resolving relative URLs against `base_url` (the
  /// URL the manifest itself was fetched from).
  pub fn from_manifest(manifest: Manifest, base_url: &str) -> Self {
    let videos = manifest
      .videos
      .into_iter()
      .map(|v| VideoCard {
        title: v.title,
        watch_url: site::watch_url_from_embed(&v.embed_url),
        category: v.category.unwrap_or_else(|| constants().default_video_category.clone()),
        search_text: v.search_tags.to_lowercase(),
      })
      .collect();

    let scores = manifest
      .scores
      .into_iter()
      .map(|s| {
        let image = s.image_url.unwrap_or_else(|| constants().default_score_image.clone());
        ScoreCard {
          title: s.title,
          kind: s.kind,
          notation: s.notation_type,
          image_url: site::resolve_url(base_url, &image),
          audio_url: s.audio_url.map(|u| site::resolve_url(base_url, &u)),
          is_free: s.is_free,
          price_text: s.price_text,
          link: s.link.map(|u| site::resolve_url(base_url, &u)),
          search_text: s.search_tags.to_lowercase(),
        }
      })
      .collect();

    Self { videos, scores }
  }

  pub fn is_empty(&self) -> bool {
    self.videos.is_empty() && self.scores.is_empty()
  }

  /// Distinct video categories in first-seen order, with the "all"
  /// sentinel in front.
  pub fn video_categories(&self) -> Vec<String> {
    let mut categories = vec![crate::browse::ALL_CATEGORY.to_string()];
    for video in &self.videos {
      if !categories.contains(&video.category) {
        categories.push(video.category.clone());
      }
    }
    categories
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASE: &str = "https://guitar.example.com/data.json";

  fn parse(json: &str) -> Manifest {
    serde_json::from_str(json).expect("manifest should parse")
  }

  #[test]
  fn manifest_parses_camel_case_fields() {
    let manifest = parse(
      r#"{
        "videos": [
          {"title": "Asturias", "embedUrl": "https://www.youtube.com/embed/abc123", "searchTags": "Albeniz Asturias", "type": "Classical guitar cover"}
        ],
        "scores": [
          {"title": "Recuerdos", "type": "Solo arrangement", "notationType": "Standard notation",
           "imageUrl": "images/recuerdos.jpg", "audioUrl": "audio/recuerdos.mp3",
           "isFree": false, "priceText": "7.50", "searchTags": "Tarrega tremolo"}
        ]
      }"#,
    );
    assert_eq!(manifest.videos.len(), 1);
    assert_eq!(manifest.videos[0].embed_url, "https://www.youtube.com/embed/abc123");
    assert_eq!(manifest.videos[0].category.as_deref(), Some("Classical guitar cover"));
    assert_eq!(manifest.scores[0].kind.as_deref(), Some("Solo arrangement"));
    assert_eq!(manifest.scores[0].notation_type.as_deref(), Some("Standard notation"));
    assert_eq!(manifest.scores[0].price_text.as_deref(), Some("7.50"));
  }

  #[test]
  fn manifest_sections_default_to_empty() {
    let manifest = parse("{}");
    assert!(manifest.videos.is_empty());
    assert!(manifest.scores.is_empty());
  }

  #[test]
  fn video_defaults_applied() {
    let manifest = parse(r#"{"videos": [{"title": "Etude", "embedUrl": "https://www.youtube.com/embed/x1"}]}"#);
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.videos[0].category, constants().default_video_category);
    assert_eq!(catalog.videos[0].search_text, "");
  }

  #[test]
  fn video_search_text_is_lowercased() {
    let manifest = parse(
      r#"{"videos": [{"title": "Asturias", "embedUrl": "https://www.youtube.com/embed/x1", "searchTags": "Albeniz SPAIN"}]}"#,
    );
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.videos[0].search_text, "albeniz spain");
  }

  #[test]
  fn video_watch_url_derived_from_embed() {
    let manifest =
      parse(r#"{"videos": [{"title": "T", "embedUrl": "https://www.youtube.com/embed/abc123?rel=0"}]}"#);
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.videos[0].watch_url, "https://www.youtube.com/watch?v=abc123");
  }

  #[test]
  fn score_default_image_resolved_on_base() {
    let manifest = parse(r#"{"scores": [{"title": "Lagrima", "searchTags": "tarrega"}]}"#);
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(
      catalog.scores[0].image_url,
      format!("https://guitar.example.com/{}", constants().default_score_image)
    );
  }

  #[test]
  fn score_relative_urls_resolved() {
    let manifest = parse(
      r#"{"scores": [{"title": "L", "imageUrl": "images/l.jpg", "audioUrl": "audio/l.mp3", "link": "scores/l.pdf"}]}"#,
    );
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.scores[0].image_url, "https://guitar.example.com/images/l.jpg");
    assert_eq!(catalog.scores[0].audio_url.as_deref(), Some("https://guitar.example.com/audio/l.mp3"));
    assert_eq!(catalog.scores[0].link.as_deref(), Some("https://guitar.example.com/scores/l.pdf"));
  }

  #[test]
  fn subtitle_joins_kind_and_notation() {
    let manifest = parse(
      r#"{"scores": [
        {"title": "A", "type": "Solo arrangement", "notationType": "Tabs"},
        {"title": "B", "type": "Solo arrangement"},
        {"title": "C"}
      ]}"#,
    );
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.scores[0].subtitle(), "Solo arrangement • Tabs");
    assert_eq!(catalog.scores[1].subtitle(), "Solo arrangement");
    assert_eq!(catalog.scores[2].subtitle(), "");
  }

  #[test]
  fn price_label_variants() {
    let manifest = parse(
      r#"{"scores": [
        {"title": "A", "isFree": true},
        {"title": "B", "isFree": false, "priceText": "12.00"},
        {"title": "C"}
      ]}"#,
    );
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.scores[0].price_label(), "Free");
    assert_eq!(catalog.scores[1].price_label(), "€12.00");
    assert_eq!(catalog.scores[2].price_label(), "Paid");
  }

  #[test]
  fn categories_distinct_in_first_seen_order() {
    let manifest = parse(
      r#"{"videos": [
        {"title": "1", "embedUrl": "e", "type": "Cover"},
        {"title": "2", "embedUrl": "e", "type": "Original"},
        {"title": "3", "embedUrl": "e", "type": "Cover"},
        {"title": "4", "embedUrl": "e", "type": "Lesson"}
      ]}"#,
    );
    let catalog = Catalog::from_manifest(manifest, BASE);
    assert_eq!(catalog.video_categories(), vec!["all", "Cover", "Original", "Lesson"]);
  }
}

//! Compile-time constants loaded from `constants.ron`.

use std::sync::LazyLock;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Where `data.json` lives unless overridden by config or CLI.
  pub manifest_url: String,
  /// Formspree endpoint the contact form posts to.
  pub contact_endpoint: String,
  /// Category assumed for videos whose manifest entry has no type.
  pub default_video_category: String,
  /// Preview image for scores without one, relative to the site root.
  pub default_score_image: String,
  /// The CV scan shown from the contact page, relative to the site root.
  pub cv_image: String,
  /// Video gallery paging per viewport class.
  pub wide_initial_page: usize,
  pub wide_page_step: usize,
  pub narrow_initial_page: usize,
  pub narrow_page_step: usize,
  /// Terminal narrower than this gets the narrow paging.
  pub narrow_width_cols: u16,
  /// Seconds the "Message Sent!" confirmation stays up.
  pub sent_reset_secs: u64,
  /// Parallel score image downloads.
  pub image_fetch_concurrency: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

pub fn constants() -> &'static Constants {
  &CONSTANTS
}

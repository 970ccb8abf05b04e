//! Overlay state: the image viewer and the theater panel.
//!
//! The two overlays are independent; opening or closing one never touches
//! the other. Only the global escape key is special, and that is handled
//! in the input layer (it reaches the theater even under the image
//! viewer).

use image::DynamicImage;

/// The score preview / CV image viewer. Closing drops the fetched image.
#[derive(Default)]
pub enum ImageOverlay {
  #[default]
  Closed,
  /// Fetch in flight for `source`.
  Loading { source: String },
  Open { source: String, image: DynamicImage },
}

impl ImageOverlay {
  pub fn open(&mut self, source: String) {
    *self = ImageOverlay::Loading { source };
  }

  /// Attach a fetched image, but only if the overlay is still waiting for
  /// that source. A close or a newer open in the meantime wins.
  pub fn resolve(&mut self, source: &str, image: DynamicImage) {
    if let ImageOverlay::Loading { source: wanted } = self
      && wanted == source
    {
      *self = ImageOverlay::Open { source: source.to_string(), image };
    }
  }

  pub fn close(&mut self) {
    *self = ImageOverlay::Closed;
  }

  pub fn is_open(&self) -> bool {
    !matches!(self, ImageOverlay::Closed)
  }

  pub fn source(&self) -> Option<&str> {
    match self {
      ImageOverlay::Closed => None,
      ImageOverlay::Loading { source } | ImageOverlay::Open { source, .. } => Some(source),
    }
  }
}

/// What the theater panel shows. The video process itself lives in the
/// media guard; this is presentation only.
#[derive(Default)]
pub enum TheaterOverlay {
  #[default]
  Closed,
  Open { title: String, details: String },
}

impl TheaterOverlay {
  pub fn open(&mut self, title: String, details: String) {
    *self = TheaterOverlay::Open { title, details };
  }

  pub fn close(&mut self) {
    *self = TheaterOverlay::Closed;
  }

  pub fn is_open(&self) -> bool {
    matches!(self, TheaterOverlay::Open { .. })
  }
}

#[derive(Default)]
pub struct Overlays {
  pub image: ImageOverlay,
  pub theater: TheaterOverlay,
}

impl Overlays {
  /// While any overlay is up it owns the keyboard.
  pub fn capturing_input(&self) -> bool {
    self.image.is_open() || self.theater.is_open()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pixel() -> DynamicImage {
    DynamicImage::new_rgb8(1, 1)
  }

  #[test]
  fn image_overlay_opens_loading() {
    let mut overlay = ImageOverlay::default();
    assert!(!overlay.is_open());
    overlay.open("https://x/a.jpg".to_string());
    assert!(overlay.is_open());
    assert_eq!(overlay.source(), Some("https://x/a.jpg"));
    assert!(matches!(overlay, ImageOverlay::Loading { .. }));
  }

  #[test]
  fn resolve_attaches_matching_image() {
    let mut overlay = ImageOverlay::default();
    overlay.open("https://x/a.jpg".to_string());
    overlay.resolve("https://x/a.jpg", pixel());
    assert!(matches!(overlay, ImageOverlay::Open { .. }));
  }

  #[test]
  fn resolve_ignores_stale_source() {
    let mut overlay = ImageOverlay::default();
    overlay.open("https://x/b.jpg".to_string());
    overlay.resolve("https://x/a.jpg", pixel());
    assert!(matches!(overlay, ImageOverlay::Loading { .. }));
    assert_eq!(overlay.source(), Some("https://x/b.jpg"));
  }

  #[test]
  fn resolve_after_close_is_ignored() {
    let mut overlay = ImageOverlay::default();
    overlay.open("https://x/a.jpg".to_string());
    overlay.close();
    overlay.resolve("https://x/a.jpg", pixel());
    assert!(!overlay.is_open());
    assert!(overlay.source().is_none());
  }

  #[test]
  fn overlays_are_independent() {
    let mut overlays = Overlays::default();
    overlays.image.open("https://x/a.jpg".to_string());
    overlays.theater.open("Asturias".to_string(), "Classical guitar cover".to_string());
    assert!(overlays.image.is_open());
    assert!(overlays.theater.is_open());

    overlays.theater.close();
    assert!(overlays.image.is_open());
    assert!(!overlays.theater.is_open());
  }

  #[test]
  fn any_open_overlay_captures_input() {
    let mut overlays = Overlays::default();
    assert!(!overlays.capturing_input());
    overlays.theater.open("T".to_string(), String::new());
    assert!(overlays.capturing_input());
  }
}

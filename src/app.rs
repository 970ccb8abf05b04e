//! Application state and the intents that mutate it.
//!
//! Every visible-set change (search edit, category switch, load more)
//! stops all media first, then recomputes the projections. Async work
//! (manifest fetch, image fetches, form submission) runs on spawned tasks
//! and is drained non-blockingly by [`App::check_pending`] each tick.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use anyhow::Result;
use image::DynamicImage;
use ratatui::{layout::Rect, widgets::ListState};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browse::{ALL_CATEGORY, PageSizes, ScoreFilter, VideoFilter};
use crate::catalog::{Catalog, Manifest, ScoreCard, VideoCard};
use crate::config::Config;
use crate::constants::constants;
use crate::contact::ContactForm;
use crate::display::DisplayMode;
use crate::media::MediaGuard;
use crate::overlay::Overlays;
use crate::site;
use crate::theme::{THEMES, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Videos,
  Scores,
  Contact,
}

impl View {
  pub fn title(self) -> &'static str {
    match self {
      View::Videos => "Videos",
      View::Scores => "Scores",
      View::Contact => "Contact",
    }
  }

  pub fn next(self) -> View {
    match self {
      View::Videos => View::Scores,
      View::Scores => View::Contact,
      View::Contact => View::Videos,
    }
  }

  pub fn prev(self) -> View {
    match self {
      View::Videos => View::Contact,
      View::Scores => View::Videos,
      View::Contact => View::Scores,
    }
  }
}

/// Terminal graphics protocol rendering state (Kitty/Sixel). The UI
/// records which cell rectangle wants an image this frame; the main loop
/// diffs against what was last sent and writes the protocol stream after
/// the draw.
#[derive(Default)]
pub struct GraphicsCache {
  /// Image the score panel reserved space for this frame.
  pub panel: Option<(String, Rect)>,
  /// Image the overlay reserved space for this frame. Wins over the panel.
  pub overlay: Option<(String, Rect)>,
  pub last_sent: Option<(String, Rect)>,
  /// Resize cache for the cell-buffer modes, keyed by source and size.
  pub resized: Option<(String, u16, u16, DynamicImage)>,
}

/// In-flight async task receivers and handles.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) manifest_rx: Option<oneshot::Receiver<Result<Manifest>>>,
  pub(crate) overlay_rx: Option<oneshot::Receiver<Result<(String, DynamicImage)>>>,
  pub(crate) submit_rx: Option<oneshot::Receiver<Result<()>>>,
  pub(crate) prefetch_rx: Option<mpsc::Receiver<(String, DynamicImage)>>,
  pub(crate) prefetch_handle: Option<JoinHandle<()>>,
}

pub struct App {
  pub view: View,
  pub searching: bool,
  pub should_quit: bool,
  pub theme_index: usize,

  pub catalog: Catalog,
  pub catalog_loaded: bool,
  pub categories: Vec<String>,
  pub category_index: usize,

  pub videos: VideoFilter,
  pub scores: ScoreFilter,
  pub visible_videos: Vec<usize>,
  pub visible_scores: Vec<usize>,
  pub video_list: ListState,
  pub score_list: ListState,
  pub search_cursor: usize,
  pub search_scroll: usize,

  pub guard: MediaGuard,
  pub overlays: Overlays,
  pub form: ContactForm,

  pub http: reqwest::Client,
  pub manifest_url: String,
  manifest_override: Option<String>,

  pub display_mode: DisplayMode,
  pub gfx: GraphicsCache,
  pub images: HashMap<String, DynamicImage>,

  pub status_message: Option<String>,
  /// Informational message, lower priority than status and errors.
  pub info_message: Option<String>,
  pub last_error: Option<String>,
  error_time: Option<Instant>,

  pub(crate) tasks: AsyncTasks,
}

impl App {
  pub fn new(display_mode: DisplayMode, cli_manifest: Option<String>, pages: PageSizes) -> Self {
    let config = Config::load();
    let theme_index =
      config.theme_name.as_deref().and_then(|name| THEMES.iter().position(|t| t.name == name)).unwrap_or(0);
    let manifest_override = config.manifest_url;
    let manifest_url =
      cli_manifest.or_else(|| manifest_override.clone()).unwrap_or_else(|| constants().manifest_url.clone());

    Self {
      view: View::Videos,
      searching: false,
      should_quit: false,
      theme_index,
      catalog: Catalog::default(),
      catalog_loaded: false,
      categories: vec![ALL_CATEGORY.to_string()],
      category_index: 0,
      videos: VideoFilter::new(pages),
      scores: ScoreFilter::default(),
      visible_videos: Vec::new(),
      visible_scores: Vec::new(),
      video_list: ListState::default(),
      score_list: ListState::default(),
      search_cursor: 0,
      search_scroll: 0,
      guard: MediaGuard::new(),
      overlays: Overlays::default(),
      form: ContactForm::new(),
      http: reqwest::Client::new(),
      manifest_url,
      manifest_override,
      display_mode,
      gfx: GraphicsCache::default(),
      images: HashMap::new(),
      status_message: None,
      info_message: None,
      last_error: None,
      error_time: None,
      tasks: AsyncTasks::default(),
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index % THEMES.len()]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    let config =
      Config { theme_name: Some(self.theme().name.to_string()), manifest_url: self.manifest_override.clone() };
    config.save();
  }

  pub fn set_error(&mut self, message: String) {
    warn!(message = %message, "app error");
    self.last_error = Some(message);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Errors disappear on their own after a few seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() > Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  /// Switch pages. Leaves search mode but keeps each gallery's filter
  /// state; playback continues across the switch.
  pub fn set_view(&mut self, view: View) {
    self.view = view;
    self.searching = false;
    self.info_message = None;
  }

  // --- Search and filtering ---

  pub fn search_term(&self) -> &str {
    match self.view {
      View::Scores => &self.scores.search,
      _ => &self.videos.search,
    }
  }

  /// The focused gallery's search buffer, edited in place by the input
  /// layer.
  pub fn search_buffer_mut(&mut self) -> &mut String {
    match self.view {
      View::Scores => &mut self.scores.search,
      _ => &mut self.videos.search,
    }
  }

  /// Recompute both galleries' visible index lists and clamp the
  /// selections to the new lengths.
  pub fn refresh_visible(&mut self) {
    self.visible_videos = self.videos.visible(&self.catalog);
    self.visible_scores = self.scores.matches(&self.catalog);
    Self::clamp_selection(&mut self.video_list, self.visible_videos.len());
    Self::clamp_selection(&mut self.score_list, self.visible_scores.len());
  }

  fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
      state.select(None);
    } else if let Some(selected) = state.selected()
      && selected >= len
    {
      state.select(Some(len - 1));
    }
  }

  /// A search edit happened in the focused gallery: stop all media, then
  /// re-project.
  pub async fn search_changed(&mut self) {
    self.guard.stop_all().await;
    if self.view != View::Scores {
      self.videos.search_changed(&self.catalog);
      self.category_index = 0;
    }
    self.refresh_visible();
  }

  /// Cycle to the next video category. Stops all media, clears the
  /// search term, and restarts paging from the initial page.
  pub async fn next_category(&mut self) {
    if self.categories.len() < 2 {
      return;
    }
    self.guard.stop_all().await;
    self.category_index = (self.category_index + 1) % self.categories.len();
    let category = self.categories[self.category_index].clone();
    self.videos.set_category(&category);
    self.search_cursor = 0;
    self.search_scroll = 0;
    self.refresh_visible();
    debug!(category = %category, "videos: category switched");
  }

  /// Reveal one more page of videos.
  pub async fn load_more(&mut self) {
    if !self.videos.has_more(&self.catalog) {
      return;
    }
    self.guard.stop_all().await;
    self.videos.load_more();
    self.refresh_visible();
    debug!(reveal = self.videos.reveal(), "videos: load more");
  }

  pub fn selected_video(&self) -> Option<&VideoCard> {
    let selected = self.video_list.selected()?;
    let &index = self.visible_videos.get(selected)?;
    self.catalog.videos.get(index)
  }

  pub fn selected_score(&self) -> Option<&ScoreCard> {
    let selected = self.score_list.selected()?;
    let &index = self.visible_scores.get(selected)?;
    self.catalog.scores.get(index)
  }

  // --- Playback ---

  pub async fn play_selected_video(&mut self) {
    let Some(card) = self.selected_video() else {
      return;
    };
    let url = card.watch_url.clone();
    if let Err(e) = self.guard.request_play(&url).await {
      self.set_error(format!("Playback error: {:#}", e));
    }
  }

  pub async fn play_selected_score(&mut self) {
    let Some(card) = self.selected_score() else {
      return;
    };
    let Some(audio) = card.audio_url.clone() else {
      self.info_message = Some("No audio sample for this score.".to_string());
      return;
    };
    if let Err(e) = self.guard.request_play(&audio).await {
      self.set_error(format!("Playback error: {:#}", e));
    }
  }

  /// Theater mode: stop everything, then start the selected video fresh
  /// in the external window and raise the overlay panel.
  pub async fn open_theater(&mut self) {
    let Some(card) = self.selected_video() else {
      return;
    };
    let url = card.watch_url.clone();
    let title = card.title.clone();
    let details = card.category.clone();
    match self.guard.open_theater(&url).await {
      Ok(()) => self.overlays.theater.open(title, details),
      Err(e) => self.set_error(format!("Theater error: {:#}", e)),
    }
  }

  pub async fn close_theater(&mut self) {
    self.guard.close_theater().await;
    self.overlays.theater.close();
  }

  // --- Images ---

  /// Raise the image overlay for `source`, fetching it first if the
  /// prefetch has not landed yet. Re-opening the showing source is a
  /// no-op.
  pub fn open_image_overlay(&mut self, source: String) {
    if self.overlays.image.source() == Some(source.as_str()) {
      return;
    }
    self.overlays.image.open(source.clone());
    if let Some(image) = self.images.get(&source) {
      let image = image.clone();
      self.overlays.image.resolve(&source, image);
      return;
    }
    let client = self.http.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = site::fetch_image(&client, &source).await.map(|image| (source, image));
      let _ = tx.send(result);
    });
    self.tasks.overlay_rx = Some(rx);
  }

  pub fn open_selected_score_image(&mut self) {
    let Some(card) = self.selected_score() else {
      return;
    };
    let source = card.image_url.clone();
    self.open_image_overlay(source);
  }

  /// The CV scan, reachable from the contact page.
  pub fn open_cv_image(&mut self) {
    let source = site::resolve_url(&self.manifest_url, &constants().cv_image);
    self.open_image_overlay(source);
  }

  // --- Background work ---

  /// Kick off the one startup manifest fetch.
  pub fn trigger_manifest_fetch(&mut self) {
    let client = self.http.clone();
    let url = self.manifest_url.clone();
    self.status_message = Some("Loading catalog...".to_string());
    info!(url = %url, "catalog: fetching manifest");
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(site::fetch_manifest(&client, &url).await);
    });
    self.tasks.manifest_rx = Some(rx);
  }

  /// Prefetch the score previews and the CV so the panel and overlay
  /// open without a visible wait. Results stream back progressively.
  fn trigger_image_prefetch(&mut self) {
    if let Some(handle) = self.tasks.prefetch_handle.take() {
      handle.abort();
    }
    let mut urls: Vec<String> = self.catalog.scores.iter().map(|s| s.image_url.clone()).collect();
    urls.push(site::resolve_url(&self.manifest_url, &constants().cv_image));
    let mut seen = HashSet::new();
    urls.retain(|url| !self.images.contains_key(url) && seen.insert(url.clone()));
    if urls.is_empty() {
      return;
    }
    debug!(count = urls.len(), "images: prefetching");
    let client = self.http.clone();
    let (tx, rx) = mpsc::channel(16);
    self.tasks.prefetch_handle = Some(tokio::spawn(site::fetch_images(client, urls, tx)));
    self.tasks.prefetch_rx = Some(rx);
  }

  /// Submit the contact form on a background task, if it is ready.
  pub fn trigger_submit(&mut self) {
    let Some(fields) = self.form.begin_send() else {
      return;
    };
    info!("contact: submitting");
    let client = self.http.clone();
    let endpoint = constants().contact_endpoint.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(site::submit_contact(&client, &endpoint, &fields).await);
    });
    self.tasks.submit_rx = Some(rx);
  }

  /// Drain every pending async result without blocking. Called once per
  /// tick from the main loop.
  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.manifest_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          self.catalog_loaded = true;
          match result {
            Ok(manifest) => {
              self.catalog = Catalog::from_manifest(manifest, &self.manifest_url);
              self.categories = self.catalog.video_categories();
              self.category_index = 0;
              // A search typed while the fetch was in flight was seeded
              // against the empty catalog; re-seed it on the real one.
              self.videos.search_changed(&self.catalog);
              self.refresh_visible();
              if !self.visible_videos.is_empty() {
                self.video_list.select(Some(0));
              }
              if !self.visible_scores.is_empty() {
                self.score_list.select(Some(0));
              }
              info!(videos = self.catalog.videos.len(), scores = self.catalog.scores.len(), "catalog: loaded");
              self.trigger_image_prefetch();
            }
            Err(e) => {
              // An unreachable site degrades to an empty catalog; no
              // error banner.
              warn!(err = %e, "catalog: manifest fetch failed");
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.manifest_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.catalog_loaded = true;
          warn!("catalog: manifest task dropped");
        }
      }
    }

    if let Some(mut rx) = self.tasks.overlay_rx.take() {
      match rx.try_recv() {
        Ok(Ok((source, image))) => {
          self.images.insert(source.clone(), image.clone());
          self.overlays.image.resolve(&source, image);
        }
        Ok(Err(e)) => {
          self.overlays.image.close();
          self.set_error(format!("Image load failed: {:#}", e));
        }
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.overlay_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => {
          self.overlays.image.close();
          self.set_error("Image load failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.submit_rx.take() {
      match rx.try_recv() {
        Ok(Ok(())) => {
          info!("contact: sent");
          self.form.resolve(Ok(()));
        }
        Ok(Err(e)) => {
          warn!(err = %e, "contact: submission failed");
          self.form.resolve(Err(format!("Error sending message: {:#}", e)));
        }
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.submit_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => self.form.resolve(Err("Error sending message.".to_string())),
      }
    }

    if let Some(rx) = self.tasks.prefetch_rx.as_mut() {
      while let Ok((url, image)) = rx.try_recv() {
        self.images.insert(url, image);
      }
    }

    self.guard.check_status();
    // The theater window can be closed from the outside; drop the panel
    // with it.
    if self.overlays.theater.is_open() && !self.guard.theater_open() {
      self.overlays.theater.close();
    }
    self.form.tick(Instant::now());
    self.expire_error();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn views_cycle_both_ways() {
    assert_eq!(View::Videos.next(), View::Scores);
    assert_eq!(View::Contact.next(), View::Videos);
    assert_eq!(View::Videos.prev(), View::Contact);
    assert_eq!(View::Scores.prev(), View::Videos);
  }

  #[test]
  fn clamp_selection_bounds() {
    let mut state = ListState::default();
    state.select(Some(7));
    App::clamp_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    App::clamp_selection(&mut state, 0);
    assert_eq!(state.selected(), None);

    // An empty selection stays empty when items appear.
    App::clamp_selection(&mut state, 5);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn manifest_arrival_reseeds_an_active_search() {
    let pages = PageSizes { initial: 9, step: 6 };
    let mut app = App::new(DisplayMode::Ascii, Some("https://site.test/data.json".to_string()), pages);

    // A search typed before the catalog loads seeds the reveal from zero
    // matches.
    app.videos.search = "guitar".to_string();
    app.videos.search_changed(&app.catalog);
    app.refresh_visible();
    assert!(app.visible_videos.is_empty());

    let manifest: Manifest = serde_json::from_str(
      r#"{"videos": [
        {"title": "Asturias", "embedUrl": "https://www.youtube.com/embed/a1", "searchTags": "albeniz guitar"},
        {"title": "Recuerdos", "embedUrl": "https://www.youtube.com/embed/a2", "searchTags": "tarrega guitar"},
        {"title": "Capricho", "embedUrl": "https://www.youtube.com/embed/a3", "searchTags": "legnani guitar"},
        {"title": "BWV 998", "embedUrl": "https://www.youtube.com/embed/a4", "searchTags": "bach guitar"},
        {"title": "Interview", "embedUrl": "https://www.youtube.com/embed/a5", "searchTags": "talk"}
      ]}"#,
    )
    .expect("manifest should parse");
    // The CV scan is pre-cached so draining the manifest spawns no
    // prefetch task.
    app.images.insert(site::resolve_url(&app.manifest_url, &constants().cv_image), DynamicImage::new_rgb8(1, 1));
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(Ok(manifest));
    app.tasks.manifest_rx = Some(rx);

    app.check_pending();

    assert_eq!(app.visible_videos, app.videos.matches(&app.catalog));
    assert_eq!(app.visible_videos.len(), 4);
    assert!(!app.videos.has_more(&app.catalog));
  }
}

//! Visible-set selection for the two galleries.
//!
//! The video gallery pages: a reveal count caps how many matches show, and
//! "load more" grows it by a fixed step. The score gallery never pages.
//! Neither filter touches the catalog; they only project index lists, so
//! the visible set can be recomputed from scratch after every change.

use crate::catalog::Catalog;
use crate::constants::constants;

/// Sentinel category matching every video.
pub const ALL_CATEGORY: &str = "all";

/// Page sizing for the video gallery. Picked once at startup from the
/// terminal width; resizing the window later never re-seeds paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
  pub initial: usize,
  pub step: usize,
}

impl PageSizes {
  pub fn for_width(cols: u16) -> Self {
    let c = constants();
    if cols < c.narrow_width_cols {
      Self { initial: c.narrow_initial_page, step: c.narrow_page_step }
    } else {
      Self { initial: c.wide_initial_page, step: c.wide_page_step }
    }
  }
}

/// Search, category, and paging state for the video gallery.
///
/// The `search` buffer is edited in place by the input layer; call
/// [`VideoFilter::search_changed`] afterwards to re-seed the derived
/// state. A non-empty search reveals every match at once, so searching is
/// never paged; only category browsing is.
#[derive(Debug, Clone)]
pub struct VideoFilter {
  pub search: String,
  pub category: String,
  reveal: usize,
  pages: PageSizes,
}

impl VideoFilter {
  pub fn new(pages: PageSizes) -> Self {
    Self { search: String::new(), category: ALL_CATEGORY.to_string(), reveal: pages.initial, pages }
  }

  pub fn reveal(&self) -> usize {
    self.reveal
  }

  /// Re-seed after the search buffer changed. Any search implies the
  /// "all" category; an emptied search falls back to the initial page.
  pub fn search_changed(&mut self, catalog: &Catalog) {
    self.category = ALL_CATEGORY.to_string();
    self.reveal = if self.search.is_empty() { self.pages.initial } else { self.matches(catalog).len() };
  }

  /// Switch category. Clears the search term and restarts paging from
  /// the initial page.
  pub fn set_category(&mut self, category: &str) {
    self.search.clear();
    self.category = category.to_string();
    self.reveal = self.pages.initial;
  }

  /// Grow the reveal window by one page step.
  pub fn load_more(&mut self) {
    self.reveal = self.reveal.saturating_add(self.pages.step);
  }

  /// Indices of matching videos, in catalog order.
  pub fn matches(&self, catalog: &Catalog) -> Vec<usize> {
    let needle = self.search.to_lowercase();
    catalog
      .videos
      .iter()
      .enumerate()
      .filter(|(_, v)| self.category == ALL_CATEGORY || v.category == self.category)
      .filter(|(_, v)| needle.is_empty() || v.search_text.contains(&needle))
      .map(|(i, _)| i)
      .collect()
  }

  /// Matches truncated to the reveal window.
  pub fn visible(&self, catalog: &Catalog) -> Vec<usize> {
    let mut matches = self.matches(catalog);
    matches.truncate(self.reveal);
    matches
  }

  /// Whether matches exist beyond the reveal window (the "load more"
  /// affordance).
  pub fn has_more(&self, catalog: &Catalog) -> bool {
    self.matches(catalog).len() > self.reveal
  }
}

/// Search state for the score gallery. Every match is always shown.
#[derive(Debug, Clone, Default)]
pub struct ScoreFilter {
  pub search: String,
}

impl ScoreFilter {
  pub fn matches(&self, catalog: &Catalog) -> Vec<usize> {
    let needle = self.search.to_lowercase();
    catalog
      .scores
      .iter()
      .enumerate()
      .filter(|(_, s)| needle.is_empty() || s.search_text.contains(&needle))
      .map(|(i, _)| i)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Catalog, ScoreCard, VideoCard};

  const WIDE: PageSizes = PageSizes { initial: 9, step: 6 };

  fn video(title: &str, category: &str, tags: &str) -> VideoCard {
    VideoCard {
      title: title.to_string(),
      watch_url: format!("https://www.youtube.com/watch?v={}", title),
      category: category.to_string(),
      search_text: tags.to_lowercase(),
    }
  }

  fn score(title: &str, tags: &str) -> ScoreCard {
    ScoreCard {
      title: title.to_string(),
      kind: None,
      notation: None,
      image_url: String::new(),
      audio_url: None,
      is_free: true,
      price_text: None,
      link: None,
      search_text: tags.to_lowercase(),
    }
  }

  fn videos_catalog(count: usize) -> Catalog {
    let videos = (0..count).map(|i| video(&format!("v{}", i), "Cover", &format!("tag{} guitar", i))).collect();
    Catalog { videos, scores: Vec::new() }
  }

  #[test]
  fn empty_search_shows_initial_page() {
    let catalog = videos_catalog(20);
    let filter = VideoFilter::new(WIDE);
    assert_eq!(filter.visible(&catalog).len(), 9);
    assert!(filter.has_more(&catalog));
  }

  #[test]
  fn search_reveals_every_match_unpaged() {
    let catalog = videos_catalog(20);
    let mut filter = VideoFilter::new(WIDE);
    filter.search = "guitar".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.visible(&catalog).len(), 20);
    assert!(!filter.has_more(&catalog));
  }

  #[test]
  fn clearing_search_restores_initial_page() {
    let catalog = videos_catalog(20);
    let mut filter = VideoFilter::new(WIDE);
    filter.search = "guitar".to_string();
    filter.search_changed(&catalog);
    filter.search.clear();
    filter.search_changed(&catalog);
    assert_eq!(filter.visible(&catalog).len(), 9);
  }

  #[test]
  fn search_resets_category_to_all() {
    let catalog = videos_catalog(5);
    let mut filter = VideoFilter::new(WIDE);
    filter.set_category("Cover");
    filter.search = "tag1".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.category, ALL_CATEGORY);
  }

  #[test]
  fn category_change_clears_search_and_reseeds_paging() {
    let catalog = videos_catalog(20);
    let mut filter = VideoFilter::new(WIDE);
    filter.search = "guitar".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.reveal(), 20);

    filter.set_category("Cover");
    assert!(filter.search.is_empty());
    assert_eq!(filter.reveal(), 9);
    assert_eq!(filter.visible(&catalog).len(), 9);
  }

  #[test]
  fn load_more_grows_by_step_and_clamps() {
    let catalog = videos_catalog(12);
    let mut filter = VideoFilter::new(WIDE);
    assert_eq!(filter.visible(&catalog).len(), 9);

    filter.load_more();
    assert_eq!(filter.reveal(), 15);
    assert_eq!(filter.visible(&catalog).len(), 12);
    assert!(!filter.has_more(&catalog));
  }

  #[test]
  fn category_filter_with_load_more() {
    // Ten videos, categories A A B A B B A A B A: six A and four B.
    let categories = ["A", "A", "B", "A", "B", "B", "A", "A", "B", "A"];
    let videos = categories.iter().enumerate().map(|(i, c)| video(&format!("v{}", i), c, "")).collect();
    let catalog = Catalog { videos, scores: Vec::new() };

    let mut filter = VideoFilter::new(WIDE);
    filter.set_category("B");
    assert_eq!(filter.visible(&catalog), vec![2, 4, 5, 8]);
    assert!(!filter.has_more(&catalog));

    filter.load_more();
    assert_eq!(filter.visible(&catalog), vec![2, 4, 5, 8]);
    assert!(!filter.has_more(&catalog));
  }

  #[test]
  fn matches_preserve_catalog_order() {
    let videos = vec![
      video("v0", "Cover", "spain"),
      video("v1", "Cover", "brazil"),
      video("v2", "Cover", "spain dance"),
      video("v3", "Cover", "spain suite"),
    ];
    let catalog = Catalog { videos, scores: Vec::new() };
    let mut filter = VideoFilter::new(WIDE);
    filter.search = "spain".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.matches(&catalog), vec![0, 2, 3]);
  }

  #[test]
  fn search_is_case_insensitive_over_tags_only() {
    let videos = vec![video("Asturias", "Cover", "albeniz"), video("v1", "Cover", "TARREGA")];
    let catalog = Catalog { videos, scores: Vec::new() };
    let mut filter = VideoFilter::new(WIDE);

    filter.search = "ALBENIZ".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.matches(&catalog), vec![0]);

    filter.search = "tarrega".to_string();
    filter.search_changed(&catalog);
    assert_eq!(filter.matches(&catalog), vec![1]);

    // Titles are not searched, only tags.
    filter.search = "asturias".to_string();
    filter.search_changed(&catalog);
    assert!(filter.matches(&catalog).is_empty());
  }

  #[test]
  fn has_more_false_when_exactly_filled() {
    let catalog = videos_catalog(9);
    let filter = VideoFilter::new(WIDE);
    assert!(!filter.has_more(&catalog));
  }

  #[test]
  fn page_sizes_by_terminal_width() {
    let c = constants();
    let narrow = PageSizes::for_width(c.narrow_width_cols - 1);
    let wide = PageSizes::for_width(c.narrow_width_cols);
    assert_eq!(narrow, PageSizes { initial: c.narrow_initial_page, step: c.narrow_page_step });
    assert_eq!(wide, PageSizes { initial: c.wide_initial_page, step: c.wide_page_step });
    assert!(narrow.initial < wide.initial);
  }

  #[test]
  fn score_filter_never_pages() {
    let scores = (0..40).map(|i| score(&format!("s{}", i), "etude")).collect();
    let catalog = Catalog { videos: Vec::new(), scores };
    let mut filter = ScoreFilter::default();
    assert_eq!(filter.matches(&catalog).len(), 40);

    filter.search = "ETUDE".to_string();
    assert_eq!(filter.matches(&catalog).len(), 40);

    filter.search = "sonata".to_string();
    assert!(filter.matches(&catalog).is_empty());
  }
}

use anyhow::Result;
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use ratatui::widgets::ListState;

use crate::app::{App, View};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn select_next(state: &mut ListState, count: usize) {
  if count > 0 {
    let i = state.selected().map_or(0, |i| (i + 1) % count);
    state.select(Some(i));
  }
}

fn select_prev(state: &mut ListState, count: usize) {
  if count > 0 {
    let i = state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
    state.select(Some(i));
  }
}

/// Open a URL with the platform handler, reaping the child off-thread.
fn open_in_browser(app: &mut App, url: &str) {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  match std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
  {
    Ok(mut child) => {
      std::thread::spawn(move || {
        let _ = child.wait();
      });
    }
    Err(e) => app.set_error(format!("Failed to open browser: {}", e)),
  }
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  // Escape reaches the theater no matter what else is on screen; it
  // never closes the image viewer.
  if key.code == KeyCode::Esc && app.overlays.theater.is_open() {
    app.close_theater().await;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  // An open overlay owns the rest of the keyboard; the image viewer sits
  // above the theater when both are up.
  if app.overlays.capturing_input() {
    if app.overlays.image.is_open() {
      if let KeyCode::Char('x') | KeyCode::Char('q') | KeyCode::Enter = key.code {
        app.overlays.image.close();
      }
    } else if let KeyCode::Char('x') | KeyCode::Char('q') = key.code {
      app.close_theater().await;
    }
    return Ok(());
  }

  if app.searching {
    return handle_search_key(app, key).await;
  }

  match app.view {
    View::Videos => handle_videos_key(app, key).await,
    View::Scores => handle_scores_key(app, key).await,
    View::Contact => handle_contact_key(app, key).await,
  }
}

/// Live edits to the focused gallery's search box. Every change is an
/// event: media stops and the visible set is recomputed immediately.
async fn handle_search_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Char(c) => {
      let cursor = app.search_cursor;
      let buffer = app.search_buffer_mut();
      let byte_idx = char_to_byte_index(buffer, cursor);
      buffer.insert(byte_idx, c);
      app.search_cursor += 1;
      app.search_changed().await;
    }
    KeyCode::Backspace => {
      if app.search_cursor > 0 {
        app.search_cursor -= 1;
        let cursor = app.search_cursor;
        let buffer = app.search_buffer_mut();
        let byte_idx = char_to_byte_index(buffer, cursor);
        buffer.remove(byte_idx);
        app.search_changed().await;
      }
    }
    KeyCode::Delete => {
      let cursor = app.search_cursor;
      let buffer = app.search_buffer_mut();
      if cursor < buffer.chars().count() {
        let byte_idx = char_to_byte_index(buffer, cursor);
        buffer.remove(byte_idx);
        app.search_changed().await;
      }
    }
    KeyCode::Left => app.search_cursor = app.search_cursor.saturating_sub(1),
    KeyCode::Right => {
      if app.search_cursor < app.search_term().chars().count() {
        app.search_cursor += 1;
      }
    }
    KeyCode::Home => app.search_cursor = 0,
    KeyCode::End => app.search_cursor = app.search_term().chars().count(),
    KeyCode::Enter | KeyCode::Down => {
      // Keep the term, go back to browsing the (already filtered) list.
      app.searching = false;
    }
    KeyCode::Esc => {
      app.search_buffer_mut().clear();
      app.search_cursor = 0;
      app.search_scroll = 0;
      app.search_changed().await;
      app.searching = false;
    }
    _ => {}
  }
  Ok(())
}

async fn handle_videos_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  app.info_message = None;
  match key.code {
    KeyCode::Char('q') => app.should_quit = true,
    KeyCode::Tab => app.set_view(app.view.next()),
    KeyCode::BackTab => app.set_view(app.view.prev()),
    KeyCode::Char('2') => app.set_view(View::Scores),
    KeyCode::Char('3') => app.set_view(View::Contact),
    KeyCode::Char('/') => {
      app.searching = true;
      app.search_cursor = app.search_term().chars().count();
    }
    KeyCode::Char('f') => app.next_category().await,
    KeyCode::Char('m') => app.load_more().await,
    KeyCode::Enter | KeyCode::Char(' ') => app.play_selected_video().await,
    KeyCode::Char('t') => app.open_theater().await,
    KeyCode::Char('s') => app.guard.stop_all().await,
    KeyCode::Char('o') => {
      if let Some(card) = app.selected_video() {
        let url = card.watch_url.clone();
        open_in_browser(app, &url);
      }
    }
    KeyCode::Down | KeyCode::Char('j') => select_next(&mut app.video_list, app.visible_videos.len()),
    KeyCode::Up | KeyCode::Char('k') => select_prev(&mut app.video_list, app.visible_videos.len()),
    KeyCode::Esc => app.clear_error(),
    _ => {}
  }
  Ok(())
}

async fn handle_scores_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  app.info_message = None;
  match key.code {
    KeyCode::Char('q') => app.should_quit = true,
    KeyCode::Tab => app.set_view(app.view.next()),
    KeyCode::BackTab => app.set_view(app.view.prev()),
    KeyCode::Char('1') => app.set_view(View::Videos),
    KeyCode::Char('3') => app.set_view(View::Contact),
    KeyCode::Char('/') => {
      app.searching = true;
      app.search_cursor = app.search_term().chars().count();
    }
    KeyCode::Enter | KeyCode::Char(' ') => app.play_selected_score().await,
    KeyCode::Char('v') => app.open_selected_score_image(),
    KeyCode::Char('s') => app.guard.stop_all().await,
    KeyCode::Char('o') => {
      if let Some(card) = app.selected_score() {
        match card.link.clone() {
          Some(url) => open_in_browser(app, &url),
          None => app.info_message = Some("No link for this score.".to_string()),
        }
      }
    }
    KeyCode::Down | KeyCode::Char('j') => select_next(&mut app.score_list, app.visible_scores.len()),
    KeyCode::Up | KeyCode::Char('k') => select_prev(&mut app.score_list, app.visible_scores.len()),
    KeyCode::Esc => app.clear_error(),
    _ => {}
  }
  Ok(())
}

/// Contact form keys. Characters type into the focused field, so view
/// switching is Esc only.
async fn handle_contact_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('v') {
    app.open_cv_image();
    return Ok(());
  }
  match key.code {
    KeyCode::Tab | KeyCode::Down => app.form.focus_next(),
    KeyCode::BackTab | KeyCode::Up => app.form.focus_prev(),
    KeyCode::Enter => app.trigger_submit(),
    KeyCode::Esc => app.set_view(View::Videos),
    KeyCode::Char(c) => {
      if app.form.can_edit() {
        let cursor = app.form.cursor;
        let field = app.form.field_mut();
        let byte_idx = char_to_byte_index(field, cursor);
        field.insert(byte_idx, c);
        app.form.cursor += 1;
      }
    }
    KeyCode::Backspace => {
      if app.form.can_edit() && app.form.cursor > 0 {
        app.form.cursor -= 1;
        let cursor = app.form.cursor;
        let field = app.form.field_mut();
        let byte_idx = char_to_byte_index(field, cursor);
        field.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.form.can_edit() {
        let cursor = app.form.cursor;
        let field = app.form.field_mut();
        if cursor < field.chars().count() {
          let byte_idx = char_to_byte_index(field, cursor);
          field.remove(byte_idx);
        }
      }
    }
    KeyCode::Left => app.form.cursor = app.form.cursor.saturating_sub(1),
    KeyCode::Right => {
      let focus = app.form.focus;
      if app.form.cursor < app.form.field(focus).chars().count() {
        app.form.cursor += 1;
      }
    }
    KeyCode::Home => app.form.cursor = 0,
    KeyCode::End => {
      let focus = app.form.focus;
      app.form.cursor = app.form.field(focus).chars().count();
    }
    _ => {}
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("guitar", 0), 0);
    assert_eq!(char_to_byte_index("guitar", 4), 4);
    assert_eq!(char_to_byte_index("guitar", 6), 6); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "tárrega";
    assert_eq!(char_to_byte_index(s, 0), 0); // 't'
    assert_eq!(char_to_byte_index(s, 1), 1); // 'á' starts at byte 1
    assert_eq!(char_to_byte_index(s, 2), 3); // 'r' starts after the 2-byte 'á'
    assert_eq!(char_to_byte_index(s, 7), 8); // past end
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }

  // --- selection movement ---

  #[test]
  fn selection_wraps_both_ways() {
    let mut state = ListState::default();
    select_next(&mut state, 3);
    assert_eq!(state.selected(), Some(0));
    select_prev(&mut state, 3);
    assert_eq!(state.selected(), Some(2));
    select_next(&mut state, 3);
    assert_eq!(state.selected(), Some(0));
  }

  #[test]
  fn selection_ignores_empty_list() {
    let mut state = ListState::default();
    select_next(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}

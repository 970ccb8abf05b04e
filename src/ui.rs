use image::imageops::FilterType;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Margin, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, View};
use crate::browse::ALL_CATEGORY;
use crate::contact::{Field, FormPhase};
use crate::display::DisplayMode;
use crate::graphics::{InlineImage, fit_area};
use crate::overlay::{ImageOverlay, TheaterOverlay};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// The chars of `s` visible in a window of `width` display columns
/// starting at column `scroll`.
fn scrolled_window(s: &str, scroll: usize, width: usize) -> String {
  s.chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + width)
    .map(|(_, _, c)| c)
    .collect()
}

/// Centered sub-rectangle taking the given percentages of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
  let [_, vertical, _] = Layout::vertical([
    Constraint::Percentage((100 - percent_y) / 2),
    Constraint::Percentage(percent_y),
    Constraint::Percentage((100 - percent_y) / 2),
  ])
  .areas(area);
  let [_, horizontal, _] = Layout::horizontal([
    Constraint::Percentage((100 - percent_x) / 2),
    Constraint::Percentage(percent_x),
    Constraint::Percentage((100 - percent_x) / 2),
  ])
  .areas(vertical);
  horizontal
}

fn bordered(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(ratatui::widgets::BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  app.gfx.panel = None;
  app.gfx.overlay = None;

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  match app.view {
    View::Videos | View::Scores => {
      let [header_area, main_area, status_area, search_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
      ])
      .areas(frame.area());

      render_header(frame, app, header_area);
      if app.view == View::Videos {
        render_videos(frame, app, main_area);
      } else {
        render_scores(frame, app, main_area);
      }
      render_status(frame, app, status_area);
      render_search(frame, app, search_area);
      render_footer(frame, app, footer_area);
    }
    View::Contact => {
      let [header_area, main_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
      ])
      .areas(frame.area());

      render_header(frame, app, header_area);
      render_contact(frame, app, main_area);
      render_status(frame, app, status_area);
      render_footer(frame, app, footer_area);
    }
  }

  // Overlays draw over everything else; they never close each other.
  if app.overlays.theater.is_open() {
    render_theater_overlay(frame, app);
  }
  if app.overlays.image.is_open() {
    render_image_overlay(frame, app);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut spans =
    vec![Span::styled(" ♪ capo ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)), Span::styled("│", Style::default().fg(theme.border))];
  for view in [View::Videos, View::Scores, View::Contact] {
    let style = if view == app.view {
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::styled(format!("  {}  ", view.title()), style));
  }
  frame.render_widget(Line::from(spans), area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_videos(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let match_count = app.videos.matches(&app.catalog).len();
  let category = app.videos.category.clone();

  let title = if category == ALL_CATEGORY {
    format!(" Videos — {} of {} ", app.visible_videos.len(), match_count)
  } else {
    format!(" Videos [{}] — {} of {} ", category, app.visible_videos.len(), match_count)
  };
  let mut block = bordered(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
  if app.videos.has_more(&app.catalog) {
    block = block.title_bottom(
      Line::from(vec![
        Span::styled(" m ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(" Load more ", Style::default().fg(theme.muted)),
      ])
      .right_aligned(),
    );
  }

  if app.visible_videos.is_empty() {
    render_empty_gallery(frame, app, area, block, "No videos match.");
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let active = app.guard.active_source().map(str::to_string);
  let paused = app.guard.is_paused();

  let items: Vec<ListItem> = app
    .visible_videos
    .iter()
    .enumerate()
    .map(|(i, &index)| {
      let card = &app.catalog.videos[index];
      let is_selected = Some(i) == app.video_list.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let marker = if active.as_deref() == Some(card.watch_url.as_str()) {
        if paused { "⏸ " } else { "♪ " }
      } else {
        ""
      };
      let right = if category == ALL_CATEGORY { card.category.clone() } else { String::new() };

      let line = if right.is_empty() {
        let title = truncate_str(&format!("{}{}", marker, card.title), inner_w);
        Line::from(Span::styled(title, Style::default().fg(fg)))
      } else {
        let right_w = right.chars().count();
        let title_max = inner_w.saturating_sub(right_w + 2);
        let title = truncate_str(&format!("{}{}", marker, card.title), title_max);
        let gap = inner_w.saturating_sub(title.chars().count() + right_w);
        Line::from(vec![
          Span::styled(title, Style::default().fg(fg)),
          Span::raw(" ".repeat(gap)),
          Span::styled(right, Style::default().fg(theme.muted)),
        ])
      };

      ListItem::new(line).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.video_list);
}

fn render_scores(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [list_area, panel_area] = Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).areas(area);

  let title = format!(" Scores — {} ", app.visible_scores.len());
  let block = bordered(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if app.visible_scores.is_empty() {
    render_empty_gallery(frame, app, list_area, block, "No scores match.");
  } else {
    let inner_w = list_area.width.saturating_sub(4) as usize;
    let active = app.guard.active_source().map(str::to_string);
    let paused = app.guard.is_paused();

    let items: Vec<ListItem> = app
      .visible_scores
      .iter()
      .enumerate()
      .map(|(i, &index)| {
        let card = &app.catalog.scores[index];
        let is_selected = Some(i) == app.score_list.selected();
        let fg = if is_selected { theme.highlight_fg } else { theme.fg };
        let bg = if is_selected {
          theme.highlight_bg
        } else if i % 2 == 1 {
          theme.stripe_bg
        } else {
          theme.bg
        };

        let playing = card.audio_url.as_deref().is_some_and(|url| active.as_deref() == Some(url));
        let marker = if playing {
          if paused { "⏸ " } else { "♪ " }
        } else {
          ""
        };
        let right = match card.audio_url {
          Some(_) => format!("♪ {}", card.price_label()),
          None => card.price_label(),
        };

        let right_w = right.chars().count();
        let title_max = inner_w.saturating_sub(right_w + 2);
        let title = truncate_str(&format!("{}{}", marker, card.title), title_max);
        let gap = inner_w.saturating_sub(title.chars().count() + right_w);
        let right_fg = if is_selected {
          theme.highlight_fg
        } else if card.is_free {
          theme.status
        } else {
          theme.muted
        };
        let line = Line::from(vec![
          Span::styled(title, Style::default().fg(fg)),
          Span::raw(" ".repeat(gap)),
          Span::styled(right, Style::default().fg(right_fg)),
        ]);

        ListItem::new(line).bg(bg)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_symbol("▶ ")
      .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(list, list_area, &mut app.score_list);
  }

  render_score_panel(frame, app, panel_area);
}

/// The preview panel next to the score list: sheet image on top, details
/// below. The image is skipped while the image overlay covers it anyway.
fn render_score_panel(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = bordered(theme)
    .title(" Preview ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .padding(Padding::horizontal(1));

  let Some(card) = app.selected_score() else {
    frame.render_widget(block, area);
    return;
  };
  let card = card.clone();

  let inner = block.inner(area);
  frame.render_widget(block, area);
  if inner.height < 7 {
    return;
  }
  let [image_area, info_area] = Layout::vertical([Constraint::Min(4), Constraint::Length(6)]).areas(inner);

  if !app.overlays.image.is_open() {
    match app.images.get(&card.image_url) {
      Some(image) => {
        if app.display_mode.uses_protocol() {
          let fit = fit_area(image, image_area);
          app.gfx.panel = Some((card.image_url.clone(), fit));
        } else {
          let needs_resize = match &app.gfx.resized {
            Some((source, w, h, _)) => {
              source != &card.image_url || *w != image_area.width || *h != image_area.height
            }
            None => true,
          };
          if needs_resize {
            let fit = fit_area(image, image_area);
            // Half-block cells are two pixel rows tall.
            let target_h = match app.display_mode {
              DisplayMode::Direct => fit.height as u32 * 2,
              _ => fit.height as u32,
            };
            let resized = image.resize_to_fill(fit.width.max(1) as u32, target_h.max(1), FilterType::Lanczos3);
            app.gfx.resized = Some((card.image_url.clone(), image_area.width, image_area.height, resized));
          }
          if let Some((_, _, _, ref resized)) = app.gfx.resized {
            frame.render_widget(InlineImage { image: resized, display_mode: app.display_mode }, image_area);
          }
        }
      }
      None => {
        let loading = Paragraph::new(Line::from(Span::styled("Loading preview…", Style::default().fg(theme.muted))))
          .alignment(Alignment::Center);
        frame.render_widget(loading, image_area);
      }
    }
  }

  let inner_w = info_area.width as usize;
  let price_fg = if card.is_free { theme.status } else { theme.accent };
  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&card.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(truncate_str(&card.subtitle(), inner_w), Style::default().fg(theme.muted))),
    Line::from(Span::styled(card.price_label(), Style::default().fg(price_fg))),
  ];
  if let Some(link) = &card.link {
    lines.push(Line::from(Span::styled(
      truncate_str(link, inner_w),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )));
  }
  if card.audio_url.is_some() {
    lines.push(Line::from(Span::styled("Enter plays the audio sample", Style::default().fg(theme.muted))));
  }
  frame.render_widget(Paragraph::new(lines), info_area);
}

fn render_empty_gallery(frame: &mut Frame, app: &App, area: Rect, block: Block, no_match: &str) {
  let theme = app.theme();
  let lines = if !app.catalog_loaded {
    vec![
      Line::from(""),
      Line::from(Span::styled("Loading catalog...", Style::default().fg(theme.muted))),
    ]
  } else if app.catalog.is_empty() {
    vec![
      Line::from(""),
      Line::from(Span::styled("♪  capo", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
      Line::from(""),
      Line::from(Span::styled("The catalog is empty.", Style::default().fg(theme.fg))),
      Line::from(Span::styled("Check the manifest URL in the config, or pass --manifest-url.", Style::default().fg(theme.muted))),
    ]
  } else {
    vec![
      Line::from(""),
      Line::from(Span::styled(no_match.to_string(), Style::default().fg(theme.fg))),
      Line::from(Span::styled("Press / to search, Esc in the search box clears it.", Style::default().fg(theme.muted))),
    ]
  };
  let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);
  frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ {}", info), Style::default().fg(theme.muted))
  } else if let Some(status) = app.guard.last_status() {
    (format!(" ♪ {}", status), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_search(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.searching { theme.accent } else { theme.border };
  let title = match app.view {
    View::Scores => " Search scores ",
    _ => " Search videos ",
  };
  let search_block = Block::bordered()
    .title(title)
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let term = app.search_term().to_string();
  let cursor_col = display_width(&term, app.search_cursor);

  if cursor_col < app.search_scroll {
    app.search_scroll = cursor_col;
  } else if cursor_col >= app.search_scroll + inner_w {
    app.search_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible = scrolled_window(&term, app.search_scroll, inner_w);
  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(search_block);
  frame.render_widget(paragraph, area);

  if app.searching {
    let cursor_x = area.x + 2 + (cursor_col - app.search_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_contact(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let width = area.width.min(64);
  let [_, column, _] =
    Layout::horizontal([Constraint::Fill(1), Constraint::Length(width), Constraint::Fill(1)]).areas(area);
  let [intro_area, name_area, email_area, message_area, submit_area, note_area] = Layout::vertical([
    Constraint::Length(2),
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Length(2),
    Constraint::Length(1),
  ])
  .areas(column);

  let intro = vec![
    Line::from(Span::styled("Get in touch", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled("Messages go straight to the artist's inbox.", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(intro), intro_area);

  render_form_field(frame, app, name_area, Field::Name);
  render_form_field(frame, app, email_area, Field::Email);
  render_form_field(frame, app, message_area, Field::Message);

  let label_style = match app.form.phase() {
    FormPhase::Idle => Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    FormPhase::Sending => Style::default().fg(theme.muted),
    FormPhase::Sent { .. } => Style::default().fg(theme.status).add_modifier(Modifier::BOLD),
    FormPhase::Error { .. } => Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
  };
  let submit = Paragraph::new(vec![
    Line::from(""),
    Line::from(Span::styled(format!("[ {} ]", app.form.submit_label()), label_style)),
  ])
  .alignment(Alignment::Center);
  frame.render_widget(submit, submit_area);

  let note = match app.form.error_message() {
    Some(message) => Line::from(Span::styled(message.to_string(), Style::default().fg(theme.error))),
    None => Line::from(Span::styled("Enter sends · Ctrl+V views the CV · Esc goes back", Style::default().fg(theme.muted))),
  };
  frame.render_widget(Paragraph::new(note).alignment(Alignment::Center), note_area);
}

fn render_form_field(frame: &mut Frame, app: &mut App, area: Rect, field: Field) {
  let theme = app.theme();
  let focused = app.form.focus == field;
  let border_color = if focused && app.form.can_edit() { theme.accent } else { theme.border };
  let block = Block::bordered()
    .title(format!(" {} ", field.label()))
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let text = app.form.field(field).to_string();

  let visible = if focused {
    let cursor_col = display_width(&text, app.form.cursor);
    if cursor_col < app.form.scroll {
      app.form.scroll = cursor_col;
    } else if cursor_col >= app.form.scroll + inner_w {
      app.form.scroll = cursor_col.saturating_sub(inner_w) + 1;
    }
    if app.form.can_edit() {
      frame.set_cursor_position((area.x + 2 + (cursor_col - app.form.scroll) as u16, area.y + 1));
    }
    scrolled_window(&text, app.form.scroll, inner_w)
  } else {
    truncate_str(&text, inner_w)
  };

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block);
  frame.render_widget(paragraph, area);
}

fn render_theater_overlay(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let TheaterOverlay::Open { title, details } = &app.overlays.theater else {
    return;
  };
  let area = centered_rect(62, 46, frame.area());
  frame.render_widget(Clear, area);

  let block = bordered(theme)
    .title(" Theater ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.accent))
    .title_bottom(Line::from(Span::styled(" Esc Close ", Style::default().fg(theme.muted))).right_aligned())
    .style(Style::default().bg(theme.bg));

  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(details.clone(), Style::default().fg(theme.muted))),
    Line::from(""),
    Line::from(Span::styled("Playing the full video in an external mpv window.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Everything else stays stopped until you close it.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(block);
  frame.render_widget(paragraph, area);
}

fn render_image_overlay(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let area = frame.area().inner(Margin { horizontal: 2, vertical: 1 });
  if area.is_empty() {
    return;
  }
  frame.render_widget(Clear, area);

  let block = bordered(theme)
    .title(" Preview ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .title_bottom(Line::from(Span::styled(format!(" {} ", app.display_mode.label()), Style::default().fg(theme.muted))))
    .title_bottom(Line::from(Span::styled(" x Close ", Style::default().fg(theme.muted))).right_aligned())
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  match &app.overlays.image {
    ImageOverlay::Loading { .. } => {
      let loading = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Loading image…", Style::default().fg(theme.muted))),
      ])
      .alignment(Alignment::Center);
      frame.render_widget(loading, inner);
    }
    ImageOverlay::Open { source, image } => {
      if app.display_mode.uses_protocol() {
        let fit = fit_area(image, inner);
        app.gfx.overlay = Some((source.clone(), fit));
      } else {
        let needs_resize = match &app.gfx.resized {
          Some((cached, w, h, _)) => cached != source || *w != inner.width || *h != inner.height,
          None => true,
        };
        if needs_resize {
          let fit = fit_area(image, inner);
          let target_h = match app.display_mode {
            DisplayMode::Direct => fit.height as u32 * 2,
            _ => fit.height as u32,
          };
          let resized = image.resize_to_fill(fit.width.max(1) as u32, target_h.max(1), FilterType::Lanczos3);
          app.gfx.resized = Some((source.clone(), inner.width, inner.height, resized));
        }
        if let Some((_, _, _, ref resized)) = app.gfx.resized {
          frame.render_widget(InlineImage { image: resized, display_mode: app.display_mode }, inner);
        }
      }
    }
    ImageOverlay::Closed => {}
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let playing = app.guard.active_source().is_some();
  let keys: Vec<(&str, &str)> = if app.overlays.image.is_open() {
    vec![("x", "Close"), ("^t", "Theme")]
  } else if app.overlays.theater.is_open() {
    vec![("Esc", "Close"), ("^t", "Theme")]
  } else if app.searching {
    vec![("Enter", "Done"), ("Esc", "Clear")]
  } else {
    match app.view {
      View::Videos => {
        let mut k = vec![("/", "Search"), ("f", "Category"), ("Enter", "Play"), ("t", "Theater")];
        if app.videos.has_more(&app.catalog) {
          k.push(("m", "More"));
        }
        if playing {
          k.push(("s", "Stop"));
        }
        k.push(("Tab", "Scores"));
        k.push(("q", "Quit"));
        k
      }
      View::Scores => {
        let mut k = vec![("/", "Search"), ("Enter", "Listen"), ("v", "View"), ("o", "Link")];
        if playing {
          k.push(("s", "Stop"));
        }
        k.push(("Tab", "Contact"));
        k.push(("q", "Quit"));
        k
      }
      View::Contact => vec![("Tab", "Field"), ("Enter", "Send"), ("^v", "CV"), ("Esc", "Videos")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

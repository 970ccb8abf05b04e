//! Image drawing across four terminal capabilities.
//!
//! [`InlineImage`] renders into the cell buffer (half-block or ASCII).
//! Kitty and Sixel bypass the buffer entirely: the UI reserves a cell
//! rectangle and the main loop writes the protocol stream after the
//! frame is drawn.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use color_quant::NeuQuant;
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

/// The largest sub-rectangle of `area` that keeps the image's aspect
/// ratio, centered. Terminal cells are roughly twice as tall as wide, so
/// a square image needs twice as many columns as rows.
pub fn fit_area(image: &DynamicImage, area: Rect) -> Rect {
  if area.is_empty() || image.width() == 0 || image.height() == 0 {
    return area;
  }
  let aspect = image.width() as f32 / image.height() as f32;
  let mut w = area.width as f32;
  let mut h = w / (aspect * 2.0);
  if h > area.height as f32 {
    h = area.height as f32;
    w = h * aspect * 2.0;
  }
  let w = (w.round() as u16).clamp(1, area.width);
  let h = (h.round() as u16).clamp(1, area.height);
  Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

// --- Cell-buffer rendering ---

/// Renders a pre-resized image into the cell buffer. In the Kitty and
/// Sixel modes this widget draws nothing; the protocol write happens
/// outside the frame.
pub struct InlineImage<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

impl Widget for InlineImage<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_halfblock(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
      DisplayMode::Kitty | DisplayMode::Sixel => {}
    }
  }
}

/// One cell per pixel column, two pixel rows per cell via `▀` with the
/// upper pixel as fg and the lower as bg.
fn render_halfblock(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(area.width as u32);
  let img_h = rgb.height();
  let rows = img_h.div_ceil(2).min(area.height as u32);
  let offset_x = ((area.width as u32).saturating_sub(img_w) / 2) as u16;
  let offset_y = ((area.height as u32).saturating_sub(img_h.div_ceil(2)) / 2) as u16;

  for row in 0..rows {
    for col in 0..img_w {
      let upper = rgb.get_pixel(col, row * 2);
      let lower_y = row * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = rgb.get_pixel(col, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      // col and row are bounded by the area dimensions, so the casts fit.
      buf.set_string(
        area.x + offset_x + col as u16,
        area.y + offset_y + row as u16,
        "▀",
        Style::default().fg(fg).bg(bg),
      );
    }
  }
}

const LUMA_RAMP: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let img_w = luma.width().min(area.width as u32);
  let img_h = luma.height().min(area.height as u32);
  let offset_x = ((area.width as u32).saturating_sub(img_w) / 2) as u16;
  let offset_y = ((area.height as u32).saturating_sub(img_h) / 2) as u16;

  for row in 0..img_h {
    for col in 0..img_w {
      let value = luma.get_pixel(col, row)[0] as usize;
      let glyph = LUMA_RAMP[value * (LUMA_RAMP.len() - 1) / 255];
      buf.set_string(area.x + offset_x + col as u16, area.y + offset_y + row as u16, glyph, Style::default());
    }
  }
}

// --- Kitty graphics protocol ---
//
// The image goes out as base64'd PNG in <=4096-byte APC chunks:
//
//   Transmit:  \x1B_G a=T,f=100,t=d,i=1,p=1,c=<cols>,r=<rows>,q=2,m=1;<chunk>\x1B\\
//   Continue:  \x1B_G m=1;<chunk>\x1B\\   (m=0 on the last chunk)
//   Delete placement: \x1B_G a=d,d=i,i=1,q=2\x1B\\
//   Delete all:       \x1B_G a=d,d=a,q=2\x1B\\
//
// A fixed image ID and placement ID (i=1, p=1) make a re-send replace the
// previous placement without a visible gap. `c`/`r` let the terminal do
// the scaling, so the PNG is sent at full resolution.

const KITTY_CHUNK_SIZE: usize = 4096;

/// Remove the single placement this app uses, leaving other images alone.
pub fn kitty_delete_placement() -> Result<()> {
  let mut stdout = std::io::stdout();
  write!(stdout, "\x1B_Ga=d,d=i,i=1,q=2\x1B\\").context("Failed to write kitty delete placement")?;
  stdout.flush().context("Failed to flush kitty delete placement")?;
  Ok(())
}

/// Delete every Kitty image on screen (used on exit and before re-sends).
pub fn kitty_delete_all() -> Result<()> {
  let mut stdout = std::io::stdout();
  write!(stdout, "\x1B_Ga=d,d=a,q=2\x1B\\").context("Failed to write kitty delete all")?;
  stdout.flush().context("Failed to flush kitty delete")?;
  Ok(())
}

/// Draw an image over the cell rectangle `area` via the Kitty protocol.
pub fn draw_kitty_image(image: &DynamicImage, area: Rect) -> Result<()> {
  if area.is_empty() {
    return Ok(());
  }

  let mut png = Vec::new();
  image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).context("Failed to encode image as PNG for kitty")?;
  let encoded = BASE64.encode(&png);
  let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(KITTY_CHUNK_SIZE).collect();
  let last = chunks.len().saturating_sub(1);

  let mut stdout = std::io::stdout();
  write!(stdout, "\x1B[{};{}H", area.y.saturating_add(1), area.x.saturating_add(1))
    .context("Failed to position cursor for kitty image")?;

  for (i, chunk) in chunks.iter().enumerate() {
    let data = std::str::from_utf8(chunk).context("base64 chunk was not valid UTF-8")?;
    let more = if i < last { 1 } else { 0 };
    if i == 0 {
      write!(stdout, "\x1B_Ga=T,f=100,t=d,i=1,p=1,c={},r={},q=2,m={};{}\x1B\\", area.width, area.height, more, data)
        .context("Failed to write kitty image header chunk")?;
    } else {
      write!(stdout, "\x1B_Gm={};{}\x1B\\", more, data).context("Failed to write kitty image continuation chunk")?;
    }
  }

  stdout.flush().context("Failed to flush kitty image")?;
  Ok(())
}

// --- Sixel graphics protocol ---
//
// DCS q <data> ST, where DCS = \x1BP and ST = \x1B\\. Colors are palette
// registers (#<n>;2;<r%>;<g%>;<b%>); each data character carries a 6-pixel
// vertical strip (0x3F offset), `$` rewinds within the strip, `-` advances
// to the next one, and `!<n><ch>` run-length-encodes repeats.

const SIXEL_MAX_COLORS: usize = 256;

/// Draw an image over the cell rectangle `area` via the Sixel protocol.
/// The image is resized here to the area's pixel size (8x16 per cell).
pub fn draw_sixel_image(image: &DynamicImage, area: Rect) -> Result<()> {
  if area.is_empty() {
    return Ok(());
  }

  let pixel_w = area.width as u32 * 8;
  let pixel_h = area.height as u32 * 16;
  let rgb = image.resize_to_fill(pixel_w, pixel_h, FilterType::Lanczos3).into_rgb8();
  let (w, h) = (rgb.width() as usize, rgb.height() as usize);

  let rgba: Vec<u8> = rgb.pixels().flat_map(|p| [p[0], p[1], p[2], 255]).collect();
  let quantizer = NeuQuant::new(3, SIXEL_MAX_COLORS, &rgba);
  let color_map = quantizer.color_map_rgb();
  // NeuQuant is built with 256 colors, so every index fits in a u8.
  let indices: Vec<u8> = rgb.pixels().map(|p| quantizer.index_of(&[p[0], p[1], p[2], 255]) as u8).collect();

  let mut out = String::with_capacity(w * h / 4);
  out.push_str("\x1BPq");
  out.push_str(&format!("\"1;1;{};{}", w, h));
  for (i, color) in color_map.chunks_exact(3).enumerate() {
    out.push_str(&format!(
      "#{};2;{};{};{}",
      i,
      color[0] as u32 * 100 / 255,
      color[1] as u32 * 100 / 255,
      color[2] as u32 * 100 / 255
    ));
  }

  // Each strip covers 6 pixel rows. Group its columns by palette index
  // first, then emit one pass per color actually present in the strip.
  for strip in 0..h.div_ceil(6) {
    let y_base = strip * 6;
    let mut by_color: HashMap<u8, Vec<u8>> = HashMap::new();

    for x in 0..w {
      for bit in 0..6usize {
        let y = y_base + bit;
        if y >= h {
          break;
        }
        let color = indices[y * w + x];
        let columns = by_color.entry(color).or_insert_with(|| vec![0; w]);
        columns[x] |= 1 << bit;
      }
    }

    let mut colors: Vec<_> = by_color.into_iter().collect();
    colors.sort_unstable_by_key(|(color, _)| *color);
    for (color, columns) in colors {
      out.push_str(&format!("#{}", color));
      push_sixel_run(&mut out, &columns);
      out.push('$');
    }
    out.push('-');
  }

  out.push_str("\x1B\\");

  let mut stdout = std::io::stdout();
  write!(stdout, "\x1B[{};{}H{}", area.y.saturating_add(1), area.x.saturating_add(1), out)
    .context("Failed to write sixel image")?;
  stdout.flush().context("Failed to flush sixel image")?;
  Ok(())
}

/// Emit one color pass over a strip, run-length-encoding repeats longer
/// than three columns.
fn push_sixel_run(out: &mut String, columns: &[u8]) {
  let mut i = 0;
  while i < columns.len() {
    let value = columns[i];
    let ch = (value + 0x3F) as char;
    let mut run = 1;
    while i + run < columns.len() && columns[i + run] == value {
      run += 1;
    }
    if run > 3 {
      out.push_str(&format!("!{}{}", run, ch));
    } else {
      for _ in 0..run {
        out.push(ch);
      }
    }
    i += run;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fit_area_portrait_sheet() {
    // A 3:4 portrait scan in a wide area is height-limited.
    let image = DynamicImage::new_rgb8(600, 800);
    let area = Rect { x: 0, y: 0, width: 80, height: 20 };
    let fit = fit_area(&image, area);
    assert_eq!(fit.height, 20);
    assert_eq!(fit.width, 30);
    assert_eq!(fit.x, 25);
    assert_eq!(fit.y, 0);
  }

  #[test]
  fn fit_area_wide_image() {
    let image = DynamicImage::new_rgb8(1600, 200);
    let area = Rect { x: 2, y: 1, width: 40, height: 30 };
    let fit = fit_area(&image, area);
    assert_eq!(fit.width, 40);
    assert!(fit.height <= 4);
    assert_eq!(fit.x, 2);
  }

  #[test]
  fn fit_area_never_exceeds_bounds() {
    let image = DynamicImage::new_rgb8(1, 1000);
    let area = Rect { x: 0, y: 0, width: 10, height: 10 };
    let fit = fit_area(&image, area);
    assert!(fit.width >= 1 && fit.width <= 10);
    assert!(fit.height >= 1 && fit.height <= 10);
  }

  #[test]
  fn sixel_run_length_encoding() {
    let mut out = String::new();
    push_sixel_run(&mut out, &[0b000001; 8]);
    assert_eq!(out, "!8@");

    let mut out = String::new();
    push_sixel_run(&mut out, &[0, 0, 0b000001]);
    assert_eq!(out, "??@");
  }
}

//! Color themes, named after tonewoods.

use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 4] = [
  Theme {
    name: "spruce",
    bg: Color::Rgb(30, 32, 28),
    fg: Color::Rgb(214, 210, 196),
    accent: Color::Rgb(222, 170, 80),
    muted: Color::Rgb(130, 132, 120),
    border: Color::Rgb(70, 74, 64),
    status: Color::Rgb(150, 190, 130),
    error: Color::Rgb(224, 108, 96),
    highlight_fg: Color::Rgb(30, 32, 28),
    highlight_bg: Color::Rgb(222, 170, 80),
    stripe_bg: Color::Rgb(37, 39, 34),
    key_fg: Color::Rgb(30, 32, 28),
    key_bg: Color::Rgb(150, 152, 140),
  },
  Theme {
    name: "cedar",
    bg: Color::Rgb(36, 28, 26),
    fg: Color::Rgb(220, 206, 196),
    accent: Color::Rgb(206, 128, 86),
    muted: Color::Rgb(140, 122, 112),
    border: Color::Rgb(82, 64, 58),
    status: Color::Rgb(168, 178, 120),
    error: Color::Rgb(228, 110, 100),
    highlight_fg: Color::Rgb(36, 28, 26),
    highlight_bg: Color::Rgb(206, 128, 86),
    stripe_bg: Color::Rgb(44, 34, 32),
    key_fg: Color::Rgb(36, 28, 26),
    key_bg: Color::Rgb(160, 140, 130),
  },
  Theme {
    name: "ebony",
    bg: Color::Rgb(18, 18, 20),
    fg: Color::Rgb(216, 216, 220),
    accent: Color::Rgb(140, 170, 220),
    muted: Color::Rgb(110, 112, 120),
    border: Color::Rgb(58, 60, 66),
    status: Color::Rgb(130, 190, 160),
    error: Color::Rgb(230, 100, 100),
    highlight_fg: Color::Rgb(18, 18, 20),
    highlight_bg: Color::Rgb(140, 170, 220),
    stripe_bg: Color::Rgb(26, 26, 30),
    key_fg: Color::Rgb(18, 18, 20),
    key_bg: Color::Rgb(130, 132, 140),
  },
  Theme {
    name: "parchment",
    bg: Color::Rgb(246, 240, 226),
    fg: Color::Rgb(56, 50, 40),
    accent: Color::Rgb(160, 98, 54),
    muted: Color::Rgb(150, 140, 122),
    border: Color::Rgb(196, 186, 166),
    status: Color::Rgb(96, 140, 84),
    error: Color::Rgb(180, 62, 54),
    highlight_fg: Color::Rgb(246, 240, 226),
    highlight_bg: Color::Rgb(160, 98, 54),
    stripe_bg: Color::Rgb(238, 230, 212),
    key_fg: Color::Rgb(246, 240, 226),
    key_bg: Color::Rgb(130, 118, 100),
  },
];

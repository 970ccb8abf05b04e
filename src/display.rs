use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Kitty,
  Sixel,
  Direct,
  Ascii,
}

/// How images (score previews, the CV scan) are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  Ascii,
  Direct,
  Sixel,
  Kitty,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
      DisplayMode::Sixel => "Sixel",
      DisplayMode::Kitty => "Kitty",
    }
  }

  /// Whether this mode bypasses the cell buffer and writes a terminal
  /// graphics protocol directly after each frame.
  pub fn uses_protocol(self) -> bool {
    matches!(self, DisplayMode::Kitty | DisplayMode::Sixel)
  }
}

/// Detect the best display mode the terminal supports.
///
/// Checks Kitty graphics first, then Sixel, then true-color half-block,
/// then ASCII. Kitty is also recognized through `KITTY_WINDOW_ID`, which
/// survives a multiplexer overriding `TERM`.
pub fn detect_display_mode() -> DisplayMode {
  let term = std::env::var("TERM").unwrap_or_default();
  let term_program = std::env::var("TERM_PROGRAM").unwrap_or_default().to_lowercase();

  if term == "xterm-kitty"
    || std::env::var("KITTY_WINDOW_ID").is_ok()
    || matches!(term_program.as_str(), "kitty" | "wezterm" | "ghostty")
  {
    return DisplayMode::Kitty;
  }

  if matches!(term_program.as_str(), "foot" | "mlterm" | "contour") || term.contains("sixel") {
    return DisplayMode::Sixel;
  }

  let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
  if colorterm == "truecolor" || colorterm == "24bit" {
    return DisplayMode::Direct;
  }

  DisplayMode::Ascii
}

pub fn resolve_display_mode(cli: CliDisplayMode) -> DisplayMode {
  match cli {
    CliDisplayMode::Auto => detect_display_mode(),
    CliDisplayMode::Kitty => DisplayMode::Kitty,
    CliDisplayMode::Sixel => DisplayMode::Sixel,
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
  }
}

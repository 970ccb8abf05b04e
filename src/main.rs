mod app;
mod browse;
mod catalog;
mod config;
mod constants;
mod contact;
mod display;
mod graphics;
mod input;
mod media;
mod overlay;
mod site;
mod theme;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::App;
use browse::PageSizes;
use display::{CliDisplayMode, DisplayMode};
use graphics::{draw_kitty_image, draw_sixel_image, kitty_delete_all, kitty_delete_placement};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Display mode: 'auto', 'kitty', 'sixel', 'direct', or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Fetch the site catalog from this URL instead of the configured one
  #[arg(short, long)]
  manifest_url: Option<String>,

  /// Print shell completions and exit
  #[arg(long, value_enum)]
  completions: Option<Shell>,
}

// --- Logging ---

/// Log to a daily file under the user data dir; the terminal itself belongs to the UI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let dirs = ProjectDirs::from("", "", "capo")?;
  let log_dir = dirs.data_local_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "capo.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "capo=info".into()))
    .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
    .init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "capo", &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging();

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let display_mode = display::resolve_display_mode(args.display_mode);

  // Page depths come from the startup width; resizing later never re-seeds them.
  let pages = PageSizes::for_width(terminal.size()?.width);
  let mut app = App::new(display_mode, args.manifest_url, pages);
  app.trigger_manifest_fetch();

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if display_mode.uses_protocol() {
      // The overlay wins the single placement slot when both want it.
      if let Some((source, area)) = app.gfx.overlay.clone().or_else(|| app.gfx.panel.clone()) {
        let key = (source, area);
        if app.gfx.last_sent.as_ref() != Some(&key)
          && let Some(image) = app.images.get(&key.0)
        {
          match display_mode {
            DisplayMode::Kitty => {
              kitty_delete_placement()?;
              draw_kitty_image(image, area)?;
            }
            DisplayMode::Sixel => draw_sixel_image(image, area)?,
            _ => {}
          }
          app.gfx.last_sent = Some(key);
        }
      } else if app.gfx.last_sent.is_some() {
        if display_mode == DisplayMode::Kitty {
          kitty_delete_placement()?;
        }
        app.gfx.last_sent = None;
      }
    }

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  if display_mode == DisplayMode::Kitty {
    kitty_delete_all()?;
  }
  app.guard.stop_all().await;
  Ok(())
}

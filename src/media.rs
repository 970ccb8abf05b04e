//! The media exclusivity guard: at most one thing plays at a time.
//!
//! Audio previews run as a headless mpv process with an IPC socket for
//! pause toggling. Theater playback runs as a separate windowed mpv
//! process behind [`EmbedSurface`]. Every transition goes through
//! [`MediaGuard::stop_all`] first, which is best effort and never fails.

use std::process::Stdio;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a play request should do, relative to the active handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
  /// Same source is already active: toggle pause, keep the position.
  Toggle,
  /// Different (or no) active source: stop everything, start fresh.
  Switch,
}

pub fn classify_request(active: Option<&str>, requested: &str) -> PlayAction {
  match active {
    Some(current) if current == requested => PlayAction::Toggle,
    _ => PlayAction::Switch,
  }
}

/// A live audio process and its IPC socket.
struct AudioHandle {
  source: String,
  process: Child,
  socket_path: String,
  paused: bool,
}

/// Where full videos play: an external mpv window. The guard only knows
/// open and stop, so swapping the player means touching this type alone.
#[derive(Default)]
pub struct EmbedSurface {
  process: Option<Child>,
}

impl EmbedSurface {
  pub fn is_open(&self) -> bool {
    self.process.is_some()
  }

  async fn open(&mut self, url: &str) -> Result<()> {
    self.stop_all().await;
    let child = Command::new("mpv")
      .args(["--fs", "--really-quiet", url])
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .spawn()
      .map_err(map_spawn_error)?;
    self.process = Some(child);
    Ok(())
  }

  /// Kill any embedded playback. Best effort.
  async fn stop_all(&mut self) {
    if let Some(mut child) = self.process.take() {
      debug!("media: closing theater window");
      if let Err(e) = child.kill().await {
        warn!(err = %e, "media: failed to kill theater mpv");
      }
      let _ = child.wait().await;
    }
  }

  /// Notice a window the user closed from the outside.
  fn reap(&mut self) {
    if let Some(child) = self.process.as_mut()
      && matches!(child.try_wait(), Ok(Some(_)))
    {
      debug!("media: theater window exited");
      self.process = None;
    }
  }
}

pub struct MediaGuard {
  active: Option<AudioHandle>,
  embeds: EmbedSurface,
  monitor_handle: Option<JoinHandle<()>>,
  status_rx: Option<mpsc::Receiver<String>>,
  last_status: Option<String>,
}

impl MediaGuard {
  pub fn new() -> Self {
    Self { active: None, embeds: EmbedSurface::default(), monitor_handle: None, status_rx: None, last_status: None }
  }

  pub fn active_source(&self) -> Option<&str> {
    self.active.as_ref().map(|h| h.source.as_str())
  }

  pub fn is_paused(&self) -> bool {
    self.active.as_ref().is_some_and(|h| h.paused)
  }

  pub fn theater_open(&self) -> bool {
    self.embeds.is_open()
  }

  /// The one entry point for starting audio. Re-requesting the active
  /// source toggles pause; anything else stops all playback and starts
  /// the new source from the beginning.
  pub async fn request_play(&mut self, source: &str) -> Result<()> {
    match classify_request(self.active_source(), source) {
      PlayAction::Toggle => self.toggle_pause().await,
      PlayAction::Switch => {
        self.stop_all().await;
        self.start(source).await
      }
    }
  }

  /// Stop everything: the audio handle and any theater window. Never an
  /// error; after this no handle is active.
  pub async fn stop_all(&mut self) {
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
    }
    self.status_rx = None;
    self.last_status = None;
    if let Some(mut handle) = self.active.take() {
      debug!(source = %handle.source, "media: stopping audio");
      if let Err(e) = handle.process.kill().await {
        warn!(err = %e, "media: failed to kill mpv");
      }
      let _ = handle.process.wait().await;
      let _ = std::fs::remove_file(&handle.socket_path);
    }
    self.embeds.stop_all().await;
  }

  /// Open theater playback: stop everything first, then start the
  /// windowed player fresh.
  pub async fn open_theater(&mut self, url: &str) -> Result<()> {
    self.stop_all().await;
    info!(url = %url, "media: opening theater");
    self.embeds.open(url).await
  }

  pub async fn close_theater(&mut self) {
    self.embeds.stop_all().await;
  }

  async fn toggle_pause(&mut self) -> Result<()> {
    let Some(handle) = self.active.as_mut() else {
      return Ok(());
    };
    let stream = UnixStream::connect(&handle.socket_path).await.context("Failed to connect to mpv socket")?;
    stream.writable().await.context("mpv socket not writable")?;
    let command = b"{\"command\":[\"cycle\",\"pause\"]}\n";
    let written = stream.try_write(command).context("Failed to write to mpv socket")?;
    if written < command.len() {
      bail!("Partial write to mpv socket");
    }
    handle.paused = !handle.paused;
    debug!(paused = handle.paused, "media: toggled pause");
    Ok(())
  }

  async fn start(&mut self, source: &str) -> Result<()> {
    let socket = std::env::temp_dir().join(format!("capo-mpv-{}.sock", std::process::id()));
    let socket_path = socket.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // A stale socket from a crashed run would block mpv from binding.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--no-video",
      "--term-status-msg=Time: ${time-pos/full} / ${duration/full} | ${pause} ${percent-pos}%",
      &format!("--input-ipc-server={}", socket_path),
      source,
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // If stderr were piped but never drained, a full pipe buffer would
    // block mpv.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(map_spawn_error)?;
    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;

    let (tx, rx) = mpsc::channel::<String>(10);
    self.status_rx = Some(rx);
    self.monitor_handle = Some(tokio::spawn(async move {
      let mut lines = BufReader::new(stdout).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    }));

    info!(source = %source, "media: playing");
    self.active = Some(AudioHandle { source: source.to_string(), process: child, socket_path, paused: false });
    Ok(())
  }

  /// Drain mpv status lines and reap a finished track so the play
  /// indicator falls back to stopped on its own.
  pub fn check_status(&mut self) {
    if let Some(rx) = self.status_rx.as_mut() {
      while let Ok(status) = rx.try_recv() {
        self.last_status = Some(status);
      }
    }
    let ended = match self.active.as_mut() {
      Some(handle) => matches!(handle.process.try_wait(), Ok(Some(_))),
      None => false,
    };
    if ended && let Some(handle) = self.active.take() {
      debug!(source = %handle.source, "media: playback ended");
      let _ = std::fs::remove_file(&handle.socket_path);
      if let Some(monitor) = self.monitor_handle.take() {
        monitor.abort();
      }
      self.status_rx = None;
      self.last_status = None;
    }
    self.embeds.reap();
  }

  /// Most recent raw mpv status line, if audio is playing.
  pub fn last_status(&self) -> Option<String> {
    self.last_status.clone()
  }
}

fn map_spawn_error(e: std::io::Error) -> anyhow::Error {
  if e.kind() == std::io::ErrorKind::NotFound {
    anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
  } else {
    anyhow!(e).context("Failed to spawn mpv process")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_active_source_switches() {
    assert_eq!(classify_request(None, "https://a"), PlayAction::Switch);
  }

  #[test]
  fn same_source_toggles() {
    assert_eq!(classify_request(Some("https://a"), "https://a"), PlayAction::Toggle);
  }

  #[test]
  fn different_source_switches() {
    assert_eq!(classify_request(Some("https://a"), "https://b"), PlayAction::Switch);
  }

  #[test]
  fn guard_starts_idle() {
    let guard = MediaGuard::new();
    assert!(guard.active_source().is_none());
    assert!(!guard.is_paused());
    assert!(!guard.theater_open());
    assert!(guard.last_status().is_none());
  }
}

//! Contact form state machine: idle, sending, sent, error.
//!
//! Submission snapshots the fields and freezes the submit control; success
//! clears the form and shows a confirmation that reverts to idle after a
//! fixed delay, failure keeps the fields for an immediate retry.

use std::time::{Duration, Instant};

use crate::constants::constants;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  Email,
  Message,
}

impl Field {
  pub fn label(self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Email => "Email",
      Field::Message => "Message",
    }
  }

  pub fn next(self) -> Field {
    match self {
      Field::Name => Field::Email,
      Field::Email => Field::Message,
      Field::Message => Field::Name,
    }
  }

  pub fn prev(self) -> Field {
    match self {
      Field::Name => Field::Message,
      Field::Email => Field::Name,
      Field::Message => Field::Email,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
  Idle,
  Sending,
  Sent { since: Instant },
  Error { message: String },
}

pub struct ContactForm {
  pub name: String,
  pub email: String,
  pub message: String,
  pub focus: Field,
  /// Char index of the cursor within the focused field.
  pub cursor: usize,
  /// Horizontal scroll of the focused field, managed by the renderer.
  pub scroll: usize,
  phase: FormPhase,
}

impl ContactForm {
  pub fn new() -> Self {
    Self {
      name: String::new(),
      email: String::new(),
      message: String::new(),
      focus: Field::Name,
      cursor: 0,
      scroll: 0,
      phase: FormPhase::Idle,
    }
  }

  pub fn phase(&self) -> &FormPhase {
    &self.phase
  }

  pub fn field(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Email => &self.email,
      Field::Message => &self.message,
    }
  }

  /// The focused field's buffer, for in-place editing.
  pub fn field_mut(&mut self) -> &mut String {
    match self.focus {
      Field::Name => &mut self.name,
      Field::Email => &mut self.email,
      Field::Message => &mut self.message,
    }
  }

  pub fn focus_next(&mut self) {
    self.focus = self.focus.next();
    self.cursor = self.field(self.focus).chars().count();
    self.scroll = 0;
  }

  pub fn focus_prev(&mut self) {
    self.focus = self.focus.prev();
    self.cursor = self.field(self.focus).chars().count();
    self.scroll = 0;
  }

  /// Typing is allowed except while a submission is in flight.
  pub fn can_edit(&self) -> bool {
    !matches!(self.phase, FormPhase::Sending)
  }

  /// Freeze the form for submission and return the field pairs to POST.
  /// Returns None when the form is mid-flight, confirming, or a field is
  /// still empty.
  pub fn begin_send(&mut self) -> Option<Vec<(String, String)>> {
    if !matches!(self.phase, FormPhase::Idle | FormPhase::Error { .. }) {
      return None;
    }
    if self.name.trim().is_empty() || self.email.trim().is_empty() || self.message.trim().is_empty() {
      self.phase = FormPhase::Error { message: "Fill in every field before sending.".to_string() };
      return None;
    }
    self.phase = FormPhase::Sending;
    Some(vec![
      ("name".to_string(), self.name.clone()),
      ("email".to_string(), self.email.clone()),
      ("message".to_string(), self.message.clone()),
    ])
  }

  /// Apply the submission outcome. Success clears the fields; failure
  /// keeps them so the user can retry as-is.
  pub fn resolve(&mut self, result: Result<(), String>) {
    if !matches!(self.phase, FormPhase::Sending) {
      return;
    }
    match result {
      Ok(()) => {
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.focus = Field::Name;
        self.cursor = 0;
        self.scroll = 0;
        self.phase = FormPhase::Sent { since: Instant::now() };
      }
      Err(message) => self.phase = FormPhase::Error { message },
    }
  }

  /// Let the sent confirmation fall back to idle once it has been shown
  /// long enough.
  pub fn tick(&mut self, now: Instant) {
    if let FormPhase::Sent { since } = self.phase
      && now.duration_since(since) >= Duration::from_secs(constants().sent_reset_secs)
    {
      self.phase = FormPhase::Idle;
    }
  }

  pub fn submit_label(&self) -> &'static str {
    match self.phase {
      FormPhase::Idle => "Send Message",
      FormPhase::Sending => "Sending...",
      FormPhase::Sent { .. } => "Message Sent!",
      FormPhase::Error { .. } => "Try Again",
    }
  }

  pub fn error_message(&self) -> Option<&str> {
    match &self.phase {
      FormPhase::Error { message } => Some(message),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filled_form() -> ContactForm {
    let mut form = ContactForm::new();
    form.name = "Ana".to_string();
    form.email = "ana@example.com".to_string();
    form.message = "Hola".to_string();
    form
  }

  #[test]
  fn begin_send_snapshots_fields() {
    let mut form = filled_form();
    let fields = form.begin_send().expect("complete form should send");
    assert_eq!(
      fields,
      vec![
        ("name".to_string(), "Ana".to_string()),
        ("email".to_string(), "ana@example.com".to_string()),
        ("message".to_string(), "Hola".to_string()),
      ]
    );
    assert_eq!(form.submit_label(), "Sending...");
    assert!(!form.can_edit());
  }

  #[test]
  fn begin_send_requires_every_field() {
    let mut form = filled_form();
    form.email.clear();
    assert!(form.begin_send().is_none());
    assert_eq!(form.submit_label(), "Try Again");
    assert!(form.error_message().is_some());
  }

  #[test]
  fn begin_send_blocked_while_sending() {
    let mut form = filled_form();
    assert!(form.begin_send().is_some());
    assert!(form.begin_send().is_none());
  }

  #[test]
  fn success_clears_fields_and_confirms() {
    let mut form = filled_form();
    form.begin_send();
    form.resolve(Ok(()));
    assert!(form.name.is_empty());
    assert!(form.email.is_empty());
    assert!(form.message.is_empty());
    assert_eq!(form.submit_label(), "Message Sent!");
    // Confirmation phase: button disabled but typing allowed again.
    assert!(form.begin_send().is_none());
    assert!(form.can_edit());
  }

  #[test]
  fn failure_keeps_fields_for_retry() {
    let mut form = filled_form();
    form.begin_send();
    form.resolve(Err("Form endpoint returned 502".to_string()));
    assert_eq!(form.name, "Ana");
    assert_eq!(form.submit_label(), "Try Again");
    assert_eq!(form.error_message(), Some("Form endpoint returned 502"));
    assert!(form.begin_send().is_some());
  }

  #[test]
  fn confirmation_reverts_to_idle_after_delay() {
    let mut form = filled_form();
    form.begin_send();
    form.resolve(Ok(()));
    form.tick(Instant::now());
    assert_eq!(form.submit_label(), "Message Sent!");
    form.tick(Instant::now() + Duration::from_secs(constants().sent_reset_secs + 1));
    assert_eq!(form.submit_label(), "Send Message");
  }

  #[test]
  fn resolve_outside_sending_is_ignored() {
    let mut form = filled_form();
    form.resolve(Ok(()));
    assert_eq!(form.name, "Ana");
    assert_eq!(form.submit_label(), "Send Message");
  }

  #[test]
  fn focus_cycles_and_resets_cursor() {
    let mut form = filled_form();
    assert_eq!(form.focus, Field::Name);
    form.focus_next();
    assert_eq!(form.focus, Field::Email);
    assert_eq!(form.cursor, form.email.chars().count());
    form.focus_next();
    form.focus_next();
    assert_eq!(form.focus, Field::Name);
    form.focus_prev();
    assert_eq!(form.focus, Field::Message);
  }
}

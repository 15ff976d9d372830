use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// This is a user facing error, usually caused by plugin configuration.
#[derive(Error, Debug, Deserialize, PartialEq, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  /// A summary user-facing message
  pub message: String,

  /// Indicates where this diagnostic was emitted from, usually a plugin name
  pub origin: Option<String>,

  /// Hints for the user
  pub hints: Option<Vec<String>>,
}

impl Diagnostic {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      ..Default::default()
    }
  }

  pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
    self.origin = Some(origin.into());
    self
  }

  pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hints.get_or_insert_with(Vec::new).push(hint.into());
    self
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.origin {
      Some(origin) => write!(f, "[{}] {}", origin, self.message),
      None => f.write_str(&self.message),
    }
  }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FromEnvError {
  #[error("Invalid value for {0}: {1}")]
  InvalidKey(String, anyhow::Error),
}

/// Reads an environment variable, treating empty values as unset
pub fn optional_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

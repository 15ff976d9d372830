use std::fmt::Display;
use std::fmt::Formatter;

use base64::Engine;
use sha2::Digest;
use sha2::Sha384;

/// A Subresource Integrity descriptor, `<algorithm>-<base64 digest>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Integrity {
  Sha256(String),
  Sha384(String),
  Sha512(String),
}

impl Integrity {
  pub fn parse(input: impl AsRef<str>) -> anyhow::Result<Self> {
    let input = input.as_ref();
    tracing::trace!("parse:integrity {}", input);

    let Some((tag, hash)) = input.split_once('-') else {
      return Err(anyhow::anyhow!("Unable to parse integrity \"{}\"", input));
    };

    base64::prelude::BASE64_STANDARD
      .decode(hash)
      .map_err(|err| anyhow::anyhow!("Digest of \"{}\" is not valid base64: {}", input, err))?;

    match tag {
      "sha256" => Ok(Self::Sha256(hash.to_string())),
      "sha384" => Ok(Self::Sha384(hash.to_string())),
      "sha512" => Ok(Self::Sha512(hash.to_string())),
      _ => Err(anyhow::anyhow!("Unsupported hash algorithm {}", tag)),
    }
  }

  pub fn sha384(bytes: &[u8]) -> Self {
    Self::Sha384(base64::prelude::BASE64_STANDARD.encode(Sha384::digest(bytes)))
  }

  pub fn algorithm(&self) -> &'static str {
    match self {
      Integrity::Sha256(_) => "sha256",
      Integrity::Sha384(_) => "sha384",
      Integrity::Sha512(_) => "sha512",
    }
  }

  pub fn b64(&self) -> &str {
    match self {
      Integrity::Sha256(hash) => hash,
      Integrity::Sha384(hash) => hash,
      Integrity::Sha512(hash) => hash,
    }
  }
}

impl Display for Integrity {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}-{}", self.algorithm(), self.b64())
  }
}

use std::fmt::Debug;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::IntegrityError;

/// Where the preload helper assigns `href` and then applies the nonce, e.g.
/// `href=e,t&&n.setAttribute("nonce"` with minified identifiers.
static MINIFIED_NONCE_CALL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"href=([0-9A-Za-z_]+),([0-9A-Za-z_]+)&&([0-9A-Za-z_]+)\.setAttribute\("nonce""#)
    .unwrap()
});

/// A located call site in minified preload code
#[derive(Clone, Debug, PartialEq)]
pub struct InjectionSite {
  /// Byte range of the whole matched call sequence
  pub range: Range<usize>,
  /// Identifier holding the dependency URL assigned to `href`
  pub href_value: String,
  /// Identifier guarding the nonce call
  pub guard: String,
  /// Identifier of the `<link>` element being configured
  pub link: String,
}

impl InjectionSite {
  /// The call sequence with an integrity lookup spliced in before the nonce call
  pub fn patched(&self) -> String {
    format!(
      "href={href},{link}.setAttribute(\"integrity\", integrityMap[{href}]),{guard}&&{link}.setAttribute(\"nonce\"",
      href = self.href_value,
      guard = self.guard,
      link = self.link,
    )
  }
}

/// Locates the place in generated code to inject the integrity attribute into.
///
/// The generated code shape is not a published contract, implementations
/// target one known shape and report when it is absent.
pub trait InjectionSiteMatcher: Debug + Send + Sync {
  fn find_injection_site(&self, source: &str) -> Result<InjectionSite, IntegrityError>;
}

/// Matches the minified output of the import analysis preload helper
#[derive(Debug, Default)]
pub struct MinifiedPreloadMatcher {}

impl InjectionSiteMatcher for MinifiedPreloadMatcher {
  fn find_injection_site(&self, source: &str) -> Result<InjectionSite, IntegrityError> {
    let captures = MINIFIED_NONCE_CALL
      .captures(source)
      .ok_or(IntegrityError::MinifiedNamesNotFound)?;

    if captures.len() != 4 {
      return Err(IntegrityError::MinifiedNamesNotFound);
    }

    let (Some(whole), Some(href_value), Some(guard), Some(link)) = (
      captures.get(0),
      captures.get(1),
      captures.get(2),
      captures.get(3),
    ) else {
      return Err(IntegrityError::MinifiedNamesNotFound);
    };

    Ok(InjectionSite {
      range: whole.range(),
      href_value: href_value.as_str().to_string(),
      guard: guard.as_str().to_string(),
      link: link.as_str().to_string(),
    })
  }
}

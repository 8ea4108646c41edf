//! Extracts author intent from a PR body: routing overrides, cc list, and emoji override.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
  static ref SKIP_SHORTHAND: Regex = Regex::new(r"(?i)!reviews?-skip").unwrap();
  static ref DIRECTIVE_LINE: Regex = Regex::new(r"(?im)!reviews?:?[ \t]*([^\r\n]*)").unwrap();
  static ref CHANNEL_TOKEN: Regex = Regex::new(r"^#([A-Za-z0-9_-]+)$").unwrap();
  static ref USER_TOKEN: Regex = Regex::new(r"^@([A-Za-z0-9._-]+)$").unwrap();
  static ref EMOJI_NAME_TOKEN: Regex = Regex::new(r"^:([^:\s]+):$").unwrap();
}

/// Parsed author intent for one PR body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Directives {
  /// True if the body contained at least one `!review` directive, well-formed or not.
  pub has_directive: bool,
  /// Sticky: once set by an explicit `skip` token, stays set until an explicit `no` token.
  pub skip: bool,
  pub channel: Option<String>,
  pub user_to_cc: Vec<String>,
  pub custom_emoji: Option<String>,
}

/// Parse every `!review` directive in `body`, applying "last occurrence wins" per field and
/// sticky `skip` semantics.
pub fn parse(body: &str) -> Directives {
  let normalized = SKIP_SHORTHAND.replace_all(body, "!review: skip");

  let mut out = Directives::default();

  for caps in DIRECTIVE_LINE.captures_iter(&normalized) {
    out.has_directive = true;

    let rest = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let mut line_cc = Vec::new();
    let mut line_channel = None;
    let mut line_emoji = None;

    for token in rest.split_whitespace() {
      if token.eq_ignore_ascii_case("skip") {
        out.skip = true;
      } else if token.eq_ignore_ascii_case("no") {
        out.skip = false;
      } else if let Some(caps) = CHANNEL_TOKEN.captures(token) {
        line_channel = Some(caps[1].to_string());
      } else if let Some(caps) = USER_TOKEN.captures(token) {
        line_cc.push(caps[1].to_string());
      } else if let Some(caps) = EMOJI_NAME_TOKEN.captures(token) {
        line_emoji = Some(caps[1].to_string());
      } else if is_standalone_emoji(token) {
        line_emoji = Some(token.to_string());
      }
    }

    if line_channel.is_some() {
      out.channel = line_channel;
    }
    if !line_cc.is_empty() {
      out.user_to_cc = line_cc;
    }
    if line_emoji.is_some() {
      out.custom_emoji = line_emoji;
    }
  }

  out
}

/// A single Unicode character in the emoji/pictograph/symbol ranges, standing alone as a token.
fn is_standalone_emoji(token: &str) -> bool {
  let mut chars = token.chars();
  match (chars.next(), chars.next()) {
    | (Some(c), None) => is_emoji_char(c),
    | _ => false,
  }
}

fn is_emoji_char(c: char) -> bool {
  let n = c as u32;
  matches!(n,
           0x1F300..=0x1FAFF
           | 0x2600..=0x27BF
           | 0x2190..=0x21FF
           | 0x2B00..=0x2BFF
           | 0x1F1E6..=0x1F1FF)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_body_has_no_directive() {
    let d = parse("");
    assert_eq!(d, Directives::default());
  }

  #[test]
  fn review_skip_shorthand_sets_skip() {
    let d = parse("fixes a bug\n\n!review-skip\n");
    assert!(d.has_directive);
    assert!(d.skip);
  }

  #[test]
  fn channel_override_token() {
    let d = parse("!review: #override");
    assert_eq!(d.channel.as_deref(), Some("override"));
  }

  #[test]
  fn multiple_cc_tokens_on_one_line_all_append() {
    let d = parse("!review: @alice @bob");
    assert_eq!(d.user_to_cc, vec!["alice".to_string(), "bob".to_string()]);
  }

  #[test]
  fn later_line_replaces_earlier_line_per_field() {
    let d = parse("!review: #first\n!review: #second");
    assert_eq!(d.channel.as_deref(), Some("second"));
  }

  #[test]
  fn skip_persists_across_later_non_skip_directive() {
    let d = parse("!review: skip\n!review: #somewhere");
    assert!(d.skip);
    assert_eq!(d.channel.as_deref(), Some("somewhere"));
  }

  #[test]
  fn explicit_no_clears_skip() {
    let d = parse("!review: skip\n!review: no");
    assert!(!d.skip);
  }

  #[test]
  fn custom_emoji_name_token() {
    let d = parse("!review: :tada:");
    assert_eq!(d.custom_emoji.as_deref(), Some("tada"));
  }

  #[test]
  fn bare_review_with_no_colon_is_accepted() {
    let d = parse("!review skip");
    assert!(d.has_directive);
    assert!(d.skip);
  }

  #[test]
  fn malformed_tokens_are_ignored_not_fatal() {
    let d = parse("!review: #!!! @@@ :::");
    assert!(d.has_directive);
    assert_eq!(d.channel, None);
    assert!(d.user_to_cc.is_empty());
    assert_eq!(d.custom_emoji, None);
  }
}

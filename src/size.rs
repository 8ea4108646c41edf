//! Line-delta size-bucket emoji lookup.

/// Emoji name for `n = additions + deletions`, per the fixed strictly-less-than-or-equal
/// breakpoint table.
pub fn bucket_emoji(n: u64) -> &'static str {
  match n {
    | n if n <= 2 => "ant",
    | n if n <= 10 => "mouse",
    | n if n <= 50 => "raccoon",
    | n if n <= 200 => "dog2",
    | n if n <= 500 => "wolf",
    | n if n <= 1000 => "gorilla",
    | n if n <= 2000 => "elephant",
    | _ => "whale2",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn breakpoints_are_inclusive_upper_bounds() {
    assert_eq!(bucket_emoji(2), "ant");
    assert_eq!(bucket_emoji(3), "mouse");
    assert_eq!(bucket_emoji(10), "mouse");
    assert_eq!(bucket_emoji(11), "raccoon");
  }

  #[test]
  fn zero_is_smallest_bucket() {
    assert_eq!(bucket_emoji(0), "ant");
  }

  #[test]
  fn very_large_is_whale() {
    assert_eq!(bucket_emoji(2001), "whale2");
    assert_eq!(bucket_emoji(1_000_000), "whale2");
  }
}

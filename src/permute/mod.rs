//! Seed URL permutation expansion
//!
//! A seed pattern may contain bracketed tokens like `[1-100]` or `[a,b,c]`.
//! Each token is a comma-separated list of literals or inclusive integer
//! ranges, and a pattern with several tokens expands to the Cartesian
//! product of their options (the leftmost token varies slowest).

use regex::Regex;

/// Expands a seed pattern into concrete URLs.
///
/// A pattern without bracket tokens expands to itself:
///
/// ```
/// use wisp_crawler::permute::expand;
///
/// assert_eq!(expand("http://example.com/"), vec!["http://example.com/"]);
/// assert_eq!(
///     expand("item[1-3]"),
///     vec!["item1", "item2", "item3"],
/// );
/// ```
///
/// Malformed ranges never fail; they degrade to literal passthrough, so
/// `"[a-b]"` expands to the single option `a-b`.
pub fn expand(pattern: &str) -> Vec<String> {
    // A token may not span brackets, so "[[1-2]]" yields the inner
    // "[1-2]" as the only token and the outer brackets stay literal.
    let token = Regex::new(r"\[([^\[\]]*)\]").expect("token pattern is valid");

    let mut results = vec![String::new()];
    let mut tail = 0;
    for m in token.captures_iter(pattern) {
        let whole = m.get(0).expect("group 0 always present");
        let literal = &pattern[tail..whole.start()];
        for r in &mut results {
            r.push_str(literal);
        }
        results = cross(results, &parse_options(&m[1]));
        tail = whole.end();
    }
    for r in &mut results {
        r.push_str(&pattern[tail..]);
    }
    results
}

/// Appends every option to every partial string; the existing partials vary
/// slowest, so options of later tokens are the fastest-varying.
fn cross(partials: Vec<String>, options: &[String]) -> Vec<String> {
    let mut next = Vec::with_capacity(partials.len() * options.len());
    for partial in &partials {
        for option in options {
            next.push(format!("{}{}", partial, option));
        }
    }
    next
}

/// Parses the content of one bracket token into its list of options.
///
/// Options are comma-separated. An `a-b` entry with two integer bounds
/// expands to the inclusive ascending range; anything else stays a literal.
fn parse_options(content: &str) -> Vec<String> {
    let content = content.replace(' ', "");
    let mut options = Vec::new();
    for part in content.split(',') {
        let bounds: Vec<&str> = part.split('-').collect();
        if bounds.len() == 2 {
            match (bounds[0].parse::<i64>(), bounds[1].parse::<i64>()) {
                (Ok(begin), Ok(end)) => {
                    for i in begin..=end {
                        options.push(i.to_string());
                    }
                }
                _ => options.push(part.to_string()),
            }
        } else {
            options.push(part.to_string());
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tokens_passthrough() {
        assert_eq!(expand("http://example.com/"), vec!["http://example.com/"]);
        assert_eq!(expand(""), vec![""]);
        assert_eq!(expand("no brackets here"), vec!["no brackets here"]);
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(expand("item[1-3]"), vec!["item1", "item2", "item3"]);
    }

    #[test]
    fn test_literal_list() {
        assert_eq!(expand("x[a,b,c]"), vec!["xa", "xb", "xc"]);
    }

    #[test]
    fn test_cartesian_product_order() {
        // The left token's options vary slower.
        assert_eq!(
            expand("a[x,y]b[1-2]"),
            vec!["axb1", "axb2", "ayb1", "ayb2"],
        );
    }

    #[test]
    fn test_mixed_range_and_literal() {
        assert_eq!(expand("[1-2,last]"), vec!["1", "2", "last"]);
    }

    #[test]
    fn test_malformed_range_is_literal() {
        assert_eq!(expand("[a-b]"), vec!["a-b"]);
        assert_eq!(expand("[1-b]"), vec!["1-b"]);
        assert_eq!(expand("[1-2-3]"), vec!["1-2-3"]);
    }

    #[test]
    fn test_negative_number_is_literal() {
        // "-5" splits into an empty bound, which fails integer parsing.
        assert_eq!(expand("[-5]"), vec!["-5"]);
    }

    #[test]
    fn test_spaces_stripped() {
        assert_eq!(expand("[a, b, 1-2]"), vec!["a", "b", "1", "2"]);
    }

    #[test]
    fn test_adjacent_brackets_are_separate_tokens() {
        assert_eq!(expand("[[1-2]]"), vec!["[1]", "[2]"]);
    }

    #[test]
    fn test_descending_range_yields_no_options() {
        assert_eq!(expand("a[3-1]b"), Vec::<String>::new());
    }

    #[test]
    fn test_large_range_bounds() {
        let expanded = expand("p[1-100]");
        assert_eq!(expanded.len(), 100);
        assert_eq!(expanded[0], "p1");
        assert_eq!(expanded[99], "p100");
    }
}

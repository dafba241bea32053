//! Odometer enumeration of search prefixes.
//!
//! Prefixes are strings over a 28-symbol alphabet (`a`–`z`, space, `_`),
//! enumerated shortest first and, within a length, in alphabet order. The
//! successor function is a base-28 increment with carry, where running off
//! the most significant symbol grows the string by one.

/// The prefix alphabet, in enumeration order.
pub const PREFIX_ALPHABET: &[u8; 28] = b"abcdefghijklmnopqrstuvwxyz _";

/// Error returned for a prefix containing a symbol outside the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid prefix {prefix:?}: symbol {symbol:?} is not in the alphabet")]
pub struct InvalidPrefix {
    prefix: String,
    symbol: char,
}

/// Returns the prefix following `prefix` in odometer order.
///
/// # Examples
///
/// ```
/// use station_builder::domain::next_prefix;
///
/// assert_eq!(next_prefix("").unwrap(), "a");
/// assert_eq!(next_prefix("hrb").unwrap(), "hrc");
/// assert_eq!(next_prefix("hr_").unwrap(), "hsa");
/// assert_eq!(next_prefix("___").unwrap(), "aaaa");
/// ```
pub fn next_prefix(prefix: &str) -> Result<String, InvalidPrefix> {
    let mut digits = symbol_indices(prefix)?;
    let last = PREFIX_ALPHABET.len() - 1;

    // Empty input carries straight through and becomes the first symbol.
    let mut carry = true;
    for digit in digits.iter_mut().rev() {
        if *digit == last {
            *digit = 0;
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, 0);
    }

    Ok(digits
        .into_iter()
        .map(|d| char::from(PREFIX_ALPHABET[d]))
        .collect())
}

fn symbol_indices(prefix: &str) -> Result<Vec<usize>, InvalidPrefix> {
    prefix
        .chars()
        .map(|c| {
            u8::try_from(c)
                .ok()
                .and_then(|b| PREFIX_ALPHABET.iter().position(|&s| s == b))
                .ok_or_else(|| InvalidPrefix {
                    prefix: prefix.to_string(),
                    symbol: c,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(p: &str) -> String {
        next_prefix(p).unwrap()
    }

    #[test]
    fn empty_maps_to_first_symbol() {
        assert_eq!(next(""), "a");
    }

    #[test]
    fn no_overflow() {
        assert_eq!(next("hrb"), "hrc");
        assert_eq!(next("a"), "b");
        assert_eq!(next("y"), "z");
    }

    #[test]
    fn space_and_wildcard_follow_z() {
        assert_eq!(next("z"), " ");
        assert_eq!(next(" "), "_");
        assert_eq!(next("hrz"), "hr ");
    }

    #[test]
    fn last_symbol_overflow() {
        assert_eq!(next("hr_"), "hsa");
    }

    #[test]
    fn second_to_last_symbol_overflow() {
        assert_eq!(next("h__"), "iaa");
    }

    #[test]
    fn full_overflow_grows_length() {
        assert_eq!(next("_"), "aa");
        assert_eq!(next("___"), "aaaa");
    }

    #[test]
    fn rejects_symbols_outside_alphabet() {
        assert!(next_prefix("hR").is_err());
        assert!(next_prefix("ä").is_err());
        assert!(next_prefix("a1").is_err());
        assert!(next_prefix("?").is_err());
        assert!(next_prefix("ab _").is_ok());
    }

    #[test]
    fn enumerates_all_single_symbols_first() {
        let mut p = String::new();
        let mut seen = Vec::new();
        for _ in 0..PREFIX_ALPHABET.len() {
            p = next(&p);
            seen.push(p.clone());
        }
        assert!(seen.iter().all(|s| s.len() == 1));
        assert_eq!(next(&p), "aa");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Position of a prefix in the enumeration (bijective base 28).
    fn rank(p: &str) -> u128 {
        symbol_indices(p)
            .unwrap()
            .into_iter()
            .fold(0u128, |acc, d| acc * 28 + d as u128 + 1)
    }

    proptest! {
        /// Each step moves exactly one position forward.
        #[test]
        fn next_is_successor(p in "[a-z _]{0,8}") {
            prop_assert_eq!(rank(&next(&p)), rank(&p) + 1);
        }

        /// Two steps keep strictly increasing and never shrink.
        #[test]
        fn strictly_increasing(p in "[a-z _]{0,8}") {
            let n1 = next(&p);
            let n2 = next(&n1);
            prop_assert!(rank(&n2) > rank(&n1));
            prop_assert!(n1.len() >= p.len());
            prop_assert!(n2.len() >= n1.len());
        }
    }

    fn next(p: &str) -> String {
        next_prefix(p).unwrap()
    }
}

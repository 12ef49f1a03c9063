//! Syntactic validation of nicknames, hostnames, and channel names.
//!
//! These are deliberately narrower than the generic RFC 2812 target grammar
//! in [`crate::parsers`]: they encode the exact admission rules this server
//! enforces at registration and channel-join time, not every shape RFC 2812
//! allows a `target` to take.

use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{recognize, verify},
    multi::many0,
    sequence::{pair, preceded},
};

/// `^[A-Za-z][A-Za-z0-9\-\[\]\\\`^{}]{0,8}$`
pub fn validate_nick(nick: &str) -> bool {
    fn tail_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || "-[]\\`^{}".contains(c)
    }
    fn parser(input: &str) -> IResult<&str, &str> {
        verify(
            recognize(pair(
                satisfy(|c: char| c.is_ascii_alphabetic()),
                nom::bytes::complete::take_while(tail_char),
            )),
            |s: &str| s.len() <= 9,
        )
        .parse(input)
    }
    matches!(parser(nick), Ok(("", _)))
}

/// RFC 952 style hostname:
/// `^[A-Za-z][A-Za-z0-9-]{0,22}[A-Za-z0-9](\.[A-Za-z][A-Za-z0-9-]{0,21}[A-Za-z0-9])*$`
pub fn validate_host(host: &str) -> bool {
    fn label(input: &str) -> IResult<&str, &str> {
        // First char alpha, then greedily take the rest of the label and
        // verify afterward that it ends on an alphanumeric (not '-') and
        // fits the 24-char max (1 leading + 22 middle + 1 trailing).
        verify(
            recognize(pair(
                satisfy(|c: char| c.is_ascii_alphabetic()),
                take_while(|c: char| c.is_ascii_alphanumeric() || c == '-'),
            )),
            |s: &str| s.len() <= 24 && s.chars().last().is_some_and(|c| c.is_ascii_alphanumeric()),
        )
        .parse(input)
    }
    fn parser(input: &str) -> IResult<&str, &str> {
        recognize(pair(label, many0(preceded(char('.'), label)))).parse(input)
    }
    matches!(parser(host), Ok(("", _)))
}

/// `^[#&][^\x00\x07\x0A\x0D ,:]{1,49}$`
pub fn validate_channel(channel: &str) -> bool {
    fn is_chan_char(c: char) -> bool {
        !matches!(c, '\u{0000}' | '\u{0007}' | '\n' | '\r' | ' ' | ',' | ':')
    }
    fn parser(input: &str) -> IResult<&str, &str> {
        let (input, _) = nom::branch::alt((char('#'), char('&'))).parse(input)?;
        verify(take_while1(is_chan_char), |s: &str| s.len() <= 49).parse(input)
    }
    matches!(parser(channel), Ok(("", _)))
}

/// `^\S+$`
pub fn validate_user(user: &str) -> bool {
    !user.is_empty() && !user.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_boundaries() {
        assert!(validate_nick("a"));
        assert!(validate_nick("Wiz"));
        assert!(validate_nick("a12345678")); // 9 chars total
        assert!(!validate_nick("a123456789")); // 10 chars, too long
        assert!(!validate_nick("1abc")); // first char must be a letter
        assert!(!validate_nick(""));
        assert!(validate_nick("guy[ta]"));
    }

    #[test]
    fn host_rfc952_shapes() {
        assert!(validate_host("irc.example.com"));
        assert!(validate_host("a"));
        assert!(!validate_host("1a.com")); // label must start with a letter
        assert!(!validate_host("-bad.com"));
        assert!(!validate_host(""));
    }

    #[test]
    fn channel_prefix_and_length() {
        assert!(validate_channel("#hack"));
        assert!(validate_channel("&local"));
        assert!(!validate_channel("hack")); // missing prefix
        assert!(!validate_channel("#")); // empty after prefix
        assert!(!validate_channel("#a b")); // space not allowed
        assert!(!validate_channel(&format!("#{}", "a".repeat(50)))); // too long
        assert!(validate_channel(&format!("#{}", "a".repeat(49))));
    }

    #[test]
    fn user_token_rejects_whitespace() {
        assert!(validate_user("alice"));
        assert!(!validate_user("al ice"));
        assert!(!validate_user(""));
    }
}

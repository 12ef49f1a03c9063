//! The wire codec: turns one `\r\n`-terminated IRC line into a structured
//! [`Message`] and back. Grammar follows RFC 1459 section 2.3.1.
//!
//!     message    =  [ ":" prefix SPACE ] command [ params ] crlf
//!     prefix     =  servername / ( nickname [ [ "!" user ] "@" host ] )
//!     command    =  1*letter / 3digit
//!     params     =  *14( SPACE middle ) [ SPACE ":" trailing ]

use crate::errors::IrcError;
use crate::parsers::{middle_parser, trailing_parser};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{map, opt},
    multi::many0,
    sequence::{pair, preceded},
};

pub const MAX_LINE_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub sender: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl Prefix {
    pub fn new(sender: impl Into<String>) -> Self {
        Prefix {
            sender: sender.into(),
            user: None,
            host: None,
        }
    }

    pub fn with_user_host(sender: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix {
            sender: sender.into(),
            user: Some(user.into()),
            host: Some(host.into()),
        }
    }

    fn render(&self) -> String {
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => format!("{}!{}@{}", self.sender, user, host.to_lowercase()),
            (None, Some(host)) => format!("{}@{}", self.sender, host.to_lowercase()),
            _ => self.sender.clone(),
        }
    }
}

/// Either a known verb (`"NICK"`, `"PRIVMSG"`, ...), uppercased, or a 3-digit
/// numeric reply code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Verb(String),
    Numeric(u16),
}

impl Command {
    pub fn verb(s: &str) -> Self {
        Command::Verb(s.to_ascii_uppercase())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Command::Numeric(_))
    }

    pub fn as_str_upper(&self) -> String {
        match self {
            Command::Verb(v) => v.clone(),
            Command::Numeric(n) => format!("{n:03}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: Command,
    /// Ordered middle parameters. For numeric replies, `params[0]` is
    /// conventionally the reply's recipient nick/`*`.
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

impl Default for Command {
    fn default() -> Self {
        Command::Verb(String::new())
    }
}

impl Message {
    pub fn new(command: Command, params: Vec<String>, trailing: Option<String>) -> Self {
        Message {
            prefix: None,
            command,
            params,
            trailing,
        }
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Numeric reply helper: `recipient` becomes `params[0]`.
    pub fn numeric(code: u16, recipient: impl Into<String>, params: Vec<String>, trailing: Option<String>) -> Self {
        let mut all = vec![recipient.into()];
        all.extend(params);
        Message::new(Command::Numeric(code), all, trailing)
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        if let Some(p) = &self.prefix {
            out.push(':');
            out.push_str(&p.render());
            out.push(' ');
        }
        out.push_str(&self.command.as_str_upper());
        for p in &self.params {
            out.push(' ');
            out.push_str(p);
        }
        if let Some(t) = &self.trailing {
            out.push_str(" :");
            out.push_str(t);
        }
        out.push_str("\r\n");
        out
    }

    pub fn parse(line: &str) -> Result<Message, IrcError> {
        let line = line.strip_suffix("\r\n").or_else(|| line.strip_suffix('\n')).unwrap_or(line);
        if line.len() + 2 > MAX_LINE_LEN {
            return Err(IrcError::LineTooLong);
        }
        if line.is_empty() {
            return Err(IrcError::EmptyLine);
        }
        match message_parser(line) {
            Ok((rest, msg)) if rest.is_empty() => Ok(msg),
            Ok((rest, _)) => Err(IrcError::ParsingError(format!("trailing garbage: {rest:?}"))),
            Err(e) => Err(IrcError::ParsingError(format!("{e}"))),
        }
    }
}

fn prefix_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ')(input)
}

fn parse_prefix(token: &str) -> Prefix {
    // nickname [ [ "!" user ] "@" host ] / servername
    if let Some((sender_user, host)) = token.split_once('@') {
        if let Some((sender, user)) = sender_user.split_once('!') {
            Prefix::with_user_host(sender, user, host)
        } else {
            Prefix {
                sender: sender_user.to_string(),
                user: None,
                host: Some(host.to_lowercase()),
            }
        }
    } else {
        Prefix::new(token)
    }
}

fn command_token(input: &str) -> IResult<&str, Command> {
    alt((
        map(digit1, |d: &str| Command::Numeric(d.parse::<u16>().unwrap_or(0))),
        map(take_while1(|c: char| c.is_ascii_alphabetic()), Command::verb),
    ))
    .parse(input)
}

fn message_parser(input: &str) -> IResult<&str, Message> {
    let (input, prefix) = opt(preceded(char(':'), pair(prefix_token, space1))).parse(input)?;
    let prefix = prefix.map(|(tok, _)| parse_prefix(tok));

    let (input, command) = command_token(input)?;

    let (input, params) = many0(preceded(space1, middle_parser)).parse(input)?;
    let params: Vec<String> = params.into_iter().map(String::from).collect();

    let (input, trailing) = opt(preceded((space1, char(':')), trailing_parser)).parse(input)?;
    let trailing = trailing.map(String::from);

    Ok((
        input,
        Message {
            prefix,
            command,
            params,
            trailing,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_verb() {
        let m = Message::parse("NICK alice\r\n").unwrap();
        assert_eq!(m.command, Command::verb("NICK"));
        assert_eq!(m.params, vec!["alice".to_string()]);
        assert!(m.trailing.is_none());
    }

    #[test]
    fn parses_prefix_and_trailing() {
        let m = Message::parse(":alice!alice@host PRIVMSG #hack :hi there\r\n").unwrap();
        let prefix = m.prefix.unwrap();
        assert_eq!(prefix.sender, "alice");
        assert_eq!(prefix.user.as_deref(), Some("alice"));
        assert_eq!(prefix.host.as_deref(), Some("host"));
        assert_eq!(m.params, vec!["#hack".to_string()]);
        assert_eq!(m.trailing.as_deref(), Some("hi there"));
    }

    #[test]
    fn parses_numeric_reply() {
        let m = Message::parse(":srv 001 alice :Welcome\r\n").unwrap();
        assert_eq!(m.command, Command::Numeric(1));
        assert_eq!(m.params, vec!["alice".to_string()]);
    }

    #[test]
    fn round_trips_through_serialize() {
        let m = Message::new(Command::verb("JOIN"), vec!["#hack".into()], None)
            .with_prefix(Prefix::with_user_host("alice", "alice", "Host.Example"));
        let line = m.serialize();
        assert_eq!(line, ":alice!alice@host.example JOIN #hack\r\n");
        let parsed = Message::parse(&line).unwrap();
        assert_eq!(parsed.command, m.command);
        assert_eq!(parsed.params, m.params);
    }

    #[test]
    fn rejects_line_over_512_bytes() {
        let long_trailing = "a".repeat(520);
        let line = format!("PRIVMSG #hack :{long_trailing}\r\n");
        assert!(matches!(Message::parse(&line), Err(IrcError::LineTooLong)));
    }

    #[test]
    fn accepts_line_at_512_bytes() {
        // 512 bytes total including the terminating CRLF.
        let prefix = "PRIVMSG #hack :";
        let pad = 512 - 2 - prefix.len();
        let line = format!("{prefix}{}\r\n", "a".repeat(pad));
        assert_eq!(line.len(), 512);
        assert!(Message::parse(&line).is_ok());
    }

    #[test]
    fn rejects_empty_line() {
        assert!(matches!(Message::parse("\r\n"), Err(IrcError::EmptyLine)));
    }
}

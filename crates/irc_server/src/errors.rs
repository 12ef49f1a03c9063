use thiserror::Error;

/// Wire-level rejects from the codec, before a session even exists.
#[derive(Error, Debug, Clone)]
pub enum IrcError {
    #[error("Parsing error: '{0}'")]
    ParsingError(String),

    #[error("line exceeds 512 bytes")]
    LineTooLong,

    #[error("empty line")]
    EmptyLine,
}

/// The flat error taxonomy used by the registries and channel operations.
///
/// Handlers match on this exhaustively and translate it into a numeric
/// reply via the routing plane; it never escapes a single handler call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("no such server: {0}")]
    NoSuchServer(String),

    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("not on channel: {0}")]
    NotOnChannel(String),

    #[error("banned from channel: {0}")]
    BannedFromChannel(String),

    #[error("bad channel key: {0}")]
    BadChannelKey(String),

    #[error("channel operator privileges needed: {0}")]
    ChanOpPrivsNeeded(String),

    #[error("nick already in use: {0}")]
    NickAlreadyInUse(String),

    #[error("nick collision: {0}")]
    NickCollision(String),

    #[error("not registered")]
    NotRegistered,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("need more params for {0}")]
    NeedMoreParams(String),

    #[error("no privileges")]
    NoPrivileges,

    #[error("unknown command: {0}")]
    InvalidCommand(String),

    #[error("internal invariant violation: {0}")]
    Internal(String),
}

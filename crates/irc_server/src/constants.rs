//! Numeric reply codes (RFC 1459 section 6) and their fixed text.

pub const RPL_WELCOME_NB: u16 = 1;
pub const RPL_WELCOME_STR: &str = "Welcome to the Internet Relay Network";

pub const RPL_YOURHOST_NB: u16 = 2;
pub const RPL_CREATED_NB: u16 = 3;

pub const RPL_UMODEIS_NB: u16 = 221;

pub const RPL_YOUREOPER_NB: u16 = 381;
pub const RPL_YOUREOPER_STR: &str = "You are now an IRC operator";

pub const RPL_TOPIC_NB: u16 = 332;
pub const RPL_NOTOPIC_STR: &str = "No topic yet";

pub const RPL_NAMREPLY_NB: u16 = 353;

pub const RPL_ENDOFNAMES_NB: u16 = 366;
pub const RPL_ENDOFNAMES_STR: &str = "End of NAMES list";

// 401    ERR_NOSUCHNICK
//        "<nickname> :No such nick/channel"
pub const ERR_NOSUCHNICK_NB: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "No such nick/channel";

// 402    ERR_NOSUCHSERVER
//        "<server name> :No such server"
pub const ERR_NOSUCHSERVER_NB: u16 = 402;
pub const ERR_NOSUCHSERVER_STR: &str = "No such server";

// 403    ERR_NOSUCHCHANNEL
//        "<channel name> :No such channel"
pub const ERR_NOSUCHCHANNEL_NB: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel";

// 431    ERR_NONICKNAMEGIVEN
//        ":No nickname given"
pub const ERR_NONICKNAMEGIVEN_NB: u16 = 431;
pub const ERR_NONICKNAMEGIVEN_STR: &str = "No nickname given";

// 436    ERR_NICKCOLLISION
//        "<nick> :Nickname collision KILL"
pub const ERR_NICKCOLLISION_NB: u16 = 436;
pub const ERR_NICKCOLLISION_STR: &str = "Nickname collision KILL";

// 442    ERR_NOTONCHANNEL
//        "<channel> :You're not on that channel"
pub const ERR_NOTONCHANNEL_NB: u16 = 442;
pub const ERR_NOTONCHANNEL_STR: &str = "You're not on that channel";

// 451    ERR_NOTREGISTERED
//        ":You have not registered"
pub const ERR_NOTREGISTERED_NB: u16 = 451;
pub const ERR_NOTREGISTERED_STR: &str = "You have not registered";

// 461    ERR_NEEDMOREPARAMS
//        "<command> :Not enough parameters"
pub const ERR_NEEDMOREPARAMS_NB: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";

// 462    ERR_ALREADYREGISTRED
//        ":Unauthorized command (already registered)"
pub const ERR_ALREADYREGISTRED_NB: u16 = 462;
pub const ERR_ALREADYREGISTRED_STR: &str = "Unauthorized command (already registered)";

// 464    ERR_PASSWDMISMATCH
//        ":Password incorrect"
pub const ERR_PASSWDMISMATCH_NB: u16 = 464;
pub const ERR_PASSWDMISMATCH_STR: &str = "Password incorrect";

// 471-475 channel join failures
pub const ERR_CHANNELISFULL_NB: u16 = 471;
pub const ERR_INVITEONLYCHAN_NB: u16 = 473;
pub const ERR_INVITEONLYCHAN_STR: &str = "Cannot join channel (+i)";

pub const ERR_BANNEDFROMCHAN_NB: u16 = 474;
pub const ERR_BANNEDFROMCHAN_STR: &str = "Cannot join channel (+b)";

pub const ERR_BADCHANNELKEY_NB: u16 = 475;
pub const ERR_BADCHANNELKEY_STR: &str = "Cannot join channel (+k)";

// 481    ERR_NOPRIVILEGES
pub const ERR_NOPRIVILEGES_NB: u16 = 481;
pub const ERR_NOPRIVILEGES_STR: &str = "Permission Denied- You're not an IRC operator";

// 482    ERR_CHANOPRIVSNEEDED
//        "<channel> :You're not channel operator"
pub const ERR_CHANOPRIVSNEEDED_NB: u16 = 482;
pub const ERR_CHANOPRIVSNEEDED_STR: &str = "You're not channel operator";

// 421    ERR_UNKNOWNCOMMAND
//        "<command> :Unknown command"
pub const ERR_UNKNOWNCOMMAND_NB: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";

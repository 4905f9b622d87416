//! Plain-text chat commands (`!addchannel`, `!removechannel`).

pub const REPLY_CHANNEL_ADDED: &str = "channel added";
pub const REPLY_CHANNEL_ALREADY_ADDED: &str = "channel already added";
pub const REPLY_CHANNEL_REMOVED: &str = "channel removed";
pub const REPLY_CHANNEL_NOT_TRACKED: &str = "channel not tracked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `addchannel` / `trackchannel`
    AddChannel,
    /// `removechannel` / `untrackchannel`
    RemoveChannel,
    Unknown(String),
}

impl Command {
    /// Parse `text` as a command if it starts with `prefix`.
    ///
    /// Only the first whitespace-delimited token after the prefix is
    /// considered; anything after it is ignored.
    pub fn parse(prefix: &str, text: &str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }
        let rest = text.strip_prefix(prefix)?;
        let token = rest.split_whitespace().next().unwrap_or_default();

        Some(match token {
            "addchannel" | "trackchannel" => Self::AddChannel,
            "removechannel" | "untrackchannel" => Self::RemoveChannel,
            other => Self::Unknown(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("!addchannel", Some(Command::AddChannel))]
    #[case("!trackchannel", Some(Command::AddChannel))]
    #[case("!addchannel please", Some(Command::AddChannel))]
    #[case("!removechannel", Some(Command::RemoveChannel))]
    #[case("!untrackchannel", Some(Command::RemoveChannel))]
    #[case("!  removechannel", Some(Command::RemoveChannel))]
    #[case("!dance", Some(Command::Unknown("dance".into())))]
    #[case("!", Some(Command::Unknown(String::new())))]
    #[case("!AddChannel", Some(Command::Unknown("AddChannel".into())))]
    #[case("addchannel", None)]
    #[case("Buy milk!", None)]
    fn parse(#[case] text: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::parse("!", text), expected);
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(Command::parse("cl:", "cl:addchannel"), Some(Command::AddChannel));
        assert_eq!(Command::parse("cl:", "!addchannel"), None);
    }

    #[test]
    fn empty_prefix_disables_commands() {
        assert_eq!(Command::parse("", "addchannel"), None);
    }
}

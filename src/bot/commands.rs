//! Bot command parsing

/// Commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/address`, with whatever text followed it (possibly empty)
    Address(String),
    Settings,
    Cancel,
    Unknown(String),
}

impl Command {
    /// Commands advertised to Telegram, with their menu descriptions
    pub const MENU: [(&'static str, &'static str); 5] = [
        ("start", "Start the bot"),
        ("help", "Show what the bot can do"),
        ("address", "Find an address in Venice"),
        ("settings", "Change the bot language"),
        ("cancel", "Stop the current operation"),
    ];

    /// Parse a message text as a command.
    ///
    /// Returns `None` when the text is not a command at all. Accepts the
    /// `/command@BotName` form used in group chats.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default().to_lowercase();
        if name.is_empty() {
            return None;
        }

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "address" => Command::Address(args.split_whitespace().collect::<Vec<_>>().join(" ")),
            "settings" => Command::Settings,
            "cancel" => Command::Cancel,
            _ => Command::Unknown(name),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/settings"), Some(Command::Settings));
        assert_eq!(Command::parse("/cancel"), Some(Command::Cancel));
        assert_eq!(Command::parse("/HELP"), Some(Command::Help));
    }

    #[test]
    fn test_parse_address_arguments() {
        assert_eq!(Command::parse("/address"), Some(Command::Address(String::new())));
        assert_eq!(Command::parse("/address   "), Some(Command::Address(String::new())));
        assert_eq!(
            Command::parse("/address San  Marco   1"),
            Some(Command::Address("San Marco 1".to_string()))
        );
        assert_eq!(
            Command::parse("/address@DequaBot Cannaregio 100"),
            Some(Command::Address("Cannaregio 100".to_string()))
        );
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(Command::parse("San Marco 1"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("/ address"), None);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            Command::parse("/weather today"),
            Some(Command::Unknown("weather".to_string()))
        );
    }
}

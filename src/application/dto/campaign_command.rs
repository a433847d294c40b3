//! Campaign command grammar
//!
//! After the trigger prefix is stripped the remainder is split on whitespace. The
//! first token is the verb (case-sensitive), the rest are its arguments.

use crate::domain::value_objects::Direction;

/// What `map` should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapScope {
    /// Cells within sight of the character
    Sight,
    /// Only the character's coordinates
    Location,
    /// The whole grid
    All,
}

/// Argument of `walk`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Missing,
    /// Something other than n/e/s/w
    Unknown,
    Toward(Direction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignCommand {
    Info,
    Status,
    Stop,
    Leave,
    Walk(Heading),
    Map(MapScope),
    Look,
    Examine(Option<String>),
    Attack(Option<String>),
}

/// Result of reading a raw chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// The message does not start with the trigger prefix
    NotACommand,
    Command(CampaignCommand),
    /// Prefixed, but the verb is not part of the grammar
    Unknown(String),
}

impl CampaignCommand {
    /// Parse `content` if it starts with `prefix` (matched case-insensitively).
    pub fn parse(content: &str, prefix: &str) -> ParsedInput {
        let Some(rest) = strip_prefix_ignore_case(content, prefix) else {
            return ParsedInput::NotACommand;
        };

        let mut tokens = rest.split_whitespace();
        let verb = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match Self::from_verb(verb, &args) {
            Some(command) => ParsedInput::Command(command),
            None => ParsedInput::Unknown(verb.to_string()),
        }
    }

    fn from_verb(verb: &str, args: &[&str]) -> Option<Self> {
        let command = match verb {
            "info" => CampaignCommand::Info,
            "status" => CampaignCommand::Status,
            "stop" => CampaignCommand::Stop,
            "leave" => CampaignCommand::Leave,
            "walk" | "w" => CampaignCommand::Walk(match args.first() {
                None => Heading::Missing,
                Some(arg) => Direction::from_arg(arg).map_or(Heading::Unknown, Heading::Toward),
            }),
            "map" => CampaignCommand::Map(match args.first() {
                Some(&"loc") => MapScope::Location,
                Some(&"all") => MapScope::All,
                _ => MapScope::Sight,
            }),
            "look" => CampaignCommand::Look,
            "examine" => CampaignCommand::Examine(joined(args)),
            "attack" => CampaignCommand::Attack(joined(args)),
            _ => return None,
        };
        Some(command)
    }

    /// Verb name as used in logs
    pub fn verb(&self) -> &'static str {
        match self {
            CampaignCommand::Info => "info",
            CampaignCommand::Status => "status",
            CampaignCommand::Stop => "stop",
            CampaignCommand::Leave => "leave",
            CampaignCommand::Walk(_) => "walk",
            CampaignCommand::Map(_) => "map",
            CampaignCommand::Look => "look",
            CampaignCommand::Examine(_) => "examine",
            CampaignCommand::Attack(_) => "attack",
        }
    }
}

fn joined(args: &[&str]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    }
}

fn strip_prefix_ignore_case<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    let head = content.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        content.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedInput {
        CampaignCommand::parse(content, "!c")
    }

    #[test]
    fn test_unprefixed_messages_are_ignored() {
        assert_eq!(parse("hello there"), ParsedInput::NotACommand);
        assert_eq!(parse("c walk n"), ParsedInput::NotACommand);
        assert_eq!(parse(""), ParsedInput::NotACommand);
    }

    #[test]
    fn test_prefix_is_case_insensitive_but_verb_is_not() {
        assert_eq!(parse("!C info"), ParsedInput::Command(CampaignCommand::Info));
        assert_eq!(parse("!c Info"), ParsedInput::Unknown("Info".to_string()));
    }

    #[test]
    fn test_walk_and_alias() {
        assert_eq!(
            parse("!c walk n"),
            ParsedInput::Command(CampaignCommand::Walk(Heading::Toward(Direction::North)))
        );
        assert_eq!(
            parse("!c   w    e"),
            ParsedInput::Command(CampaignCommand::Walk(Heading::Toward(Direction::East)))
        );
        assert_eq!(
            parse("!c walk up"),
            ParsedInput::Command(CampaignCommand::Walk(Heading::Unknown))
        );
        assert_eq!(
            parse("!c walk"),
            ParsedInput::Command(CampaignCommand::Walk(Heading::Missing))
        );
    }

    #[test]
    fn test_map_scopes() {
        assert_eq!(
            parse("!c map"),
            ParsedInput::Command(CampaignCommand::Map(MapScope::Sight))
        );
        assert_eq!(
            parse("!c map loc"),
            ParsedInput::Command(CampaignCommand::Map(MapScope::Location))
        );
        assert_eq!(
            parse("!c map all"),
            ParsedInput::Command(CampaignCommand::Map(MapScope::All))
        );
    }

    #[test]
    fn test_targets_keep_every_word() {
        assert_eq!(
            parse("!c attack Cave Troll"),
            ParsedInput::Command(CampaignCommand::Attack(Some("Cave Troll".to_string())))
        );
        assert_eq!(
            parse("!c examine start flag"),
            ParsedInput::Command(CampaignCommand::Examine(Some("start flag".to_string())))
        );
        assert_eq!(parse("!c attack"), ParsedInput::Command(CampaignCommand::Attack(None)));
    }

    #[test]
    fn test_unknown_and_empty_verbs() {
        assert_eq!(parse("!c dance"), ParsedInput::Unknown("dance".to_string()));
        assert_eq!(parse("!c"), ParsedInput::Unknown(String::new()));
    }
}

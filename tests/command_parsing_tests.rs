#![allow(clippy::unwrap_used)]

use teloxide::utils::command::BotCommands;
use trelox_bot::bot::commands::Command;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_simple_commands_parse() {
        let cases = [
            ("/help", Command::Help),
            ("/start", Command::Start),
            ("/challenge", Command::Challenge),
            ("/tasks", Command::Tasks),
            ("/addtask", Command::AddTask),
            ("/stats", Command::Stats),
            ("/badges", Command::Badges),
        ];
        
        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "testbot").unwrap(), expected, "failed on {input}");
        }
    }

    #[test]
    fn test_donetask_takes_argument() {
        assert_eq!(
            Command::parse("/donetask 3", "testbot").unwrap(),
            Command::DoneTask("3".to_string())
        );
    }

    #[test]
    fn test_command_addressed_to_bot() {
        assert_eq!(Command::parse("/stats@testbot", "testbot").unwrap(), Command::Stats);
        assert!(Command::parse("/stats@otherbot", "testbot").is_err());
    }

    #[test]
    fn test_unknown_commands_rejected() {
        assert!(Command::parse("/settings", "testbot").is_err());
        assert!(Command::parse("/schedule", "testbot").is_err());
        assert!(Command::parse("not a command", "testbot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        
        for command in ["/help", "/start", "/challenge", "/tasks", "/addtask", "/donetask", "/stats", "/badges"] {
            assert!(help.contains(command), "missing {command} in help text");
        }
    }
}

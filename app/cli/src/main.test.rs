use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_line() {
    assert_eq!(parse_line("  \n"), ReplInput::Empty);
    assert_eq!(parse_line("/exit\n"), ReplInput::Exit);
    assert_eq!(parse_line("/quit"), ReplInput::Exit);
    assert_eq!(parse_line("/clear"), ReplInput::Clear);
    assert_eq!(parse_line("/threads"), ReplInput::Threads);
    assert_eq!(parse_line("/help"), ReplInput::Help);
    assert_eq!(parse_line("/roll d20"), ReplInput::Unknown("/roll d20"));
    assert_eq!(
        parse_line("  What is a saving throw?  \n"),
        ReplInput::Question("What is a saving throw?")
    );
}

#[test]
fn test_cli_parses_ask() {
    let cli = Cli::try_parse_from(["askgpt", "--raw", "ask", "who", "goes", "first?"]).unwrap();
    assert!(cli.raw);
    match cli.command {
        Some(Command::Ask { question }) => assert_eq!(question.join(" "), "who goes first?"),
        _ => panic!("expected ask"),
    }
}

#[test]
fn test_cli_defaults_to_chat() {
    let cli = Cli::try_parse_from(["askgpt", "--home", "/tmp/askgpt"]).unwrap();
    assert!(cli.command.is_none());
    assert_eq!(cli.home, Some(PathBuf::from("/tmp/askgpt")));
    assert!(Cli::try_parse_from(["askgpt", "ask"]).is_err());
}

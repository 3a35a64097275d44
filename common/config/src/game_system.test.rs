use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builtin_ids() {
    let ids: Vec<&str> = GameSystem::all().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["generic", "dnd5e", "pf2e", "foundry-ironsworn"]);
    assert_eq!(GameSystem::all()[0].id, DEFAULT_GAME_SYSTEM);
}

#[test]
fn test_prompt_composition() {
    let generic = GameSystem::find("generic").unwrap().prompt();
    assert!(generic.starts_with("You are a game master for a tabletop roleplaying game. "));
    assert!(generic.contains("Keep responses as short as possible."));
    assert!(generic.ends_with("Never use Markdown."));

    let dnd = GameSystem::find("dnd5e").unwrap().prompt();
    assert!(dnd.contains("Stick to the rules as much as possible. Properly format spells"));
    assert!(dnd.ends_with("Never use Markdown."));
}

#[test]
fn test_unknown_falls_back_to_generic() {
    assert!(GameSystem::find("gurps").is_none());
    assert_eq!(GameSystem::find_or_default("gurps").id, "generic");
    assert_eq!(GameSystem::find_or_default("pf2e").name, "Pathfinder Second Edition");
}

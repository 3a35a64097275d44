//! Built-in game-system prompts.

/// Shared guidance appended to every game-system role sentence.
const GUIDANCE: &str = "I would like you to help me with running the game by coming up with ideas, answering questions, and improvising. Keep responses as short as possible. Stick to the rules as much as possible.";

/// Formatting instruction; replies are rendered as HTML by the host.
const FORMAT: &str =
    "Always format each answer as HTML code without CSS, including lists and tables. Never use Markdown.";

/// Id of the fallback game system.
pub const DEFAULT_GAME_SYSTEM: &str = "generic";

/// A tabletop game system with its default system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSystem {
    /// Stable identifier stored in settings.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    role: &'static str,
    extra: Option<&'static str>,
}

const GAME_SYSTEMS: &[GameSystem] = &[
    GameSystem {
        id: "generic",
        name: "Generic tabletop RPG",
        role: "You are a game master for a tabletop roleplaying game.",
        extra: None,
    },
    GameSystem {
        id: "dnd5e",
        name: "Dungeons & Dragons 5th Edition",
        role: "You are a dungeon master for a Dungeons & Dragons 5th Edition game.",
        extra: Some("Properly format spells, monsters, conditions, and so on."),
    },
    GameSystem {
        id: "pf2e",
        name: "Pathfinder Second Edition",
        role: "You are a game master for a Pathfinder 2nd Edition game.",
        extra: Some("Properly format spells, monsters, conditions, and so on."),
    },
    GameSystem {
        id: "foundry-ironsworn",
        name: "Ironsworn",
        role: "You are a game master for an Ironsworn game.",
        extra: Some("Properly format moves, oracle tables, and so on."),
    },
];

impl GameSystem {
    /// Every built-in game system.
    pub fn all() -> &'static [GameSystem] {
        GAME_SYSTEMS
    }

    /// Look up a game system by id.
    pub fn find(id: &str) -> Option<&'static GameSystem> {
        GAME_SYSTEMS.iter().find(|system| system.id == id)
    }

    /// Look up a game system, falling back to `generic` for unknown ids.
    pub fn find_or_default(id: &str) -> &'static GameSystem {
        Self::find(id).unwrap_or(&GAME_SYSTEMS[0])
    }

    /// Full system prompt for this game system.
    pub fn prompt(&self) -> String {
        match self.extra {
            Some(extra) => format!("{} {GUIDANCE} {extra} {FORMAT}", self.role),
            None => format!("{} {GUIDANCE} {FORMAT}", self.role),
        }
    }
}

#[cfg(test)]
#[path = "game_system.test.rs"]
mod tests;

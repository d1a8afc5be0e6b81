use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Tab,
    Backspace,
    Delete,
    Space,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl or Cmd, whichever the platform uses for commands.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::none(),
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses `enter`, `shift-tab`, `ctrl-enter`, `space`, `a`, ...
    ///
    /// A lone `-` is the minus character.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input == "-" {
            return Some(Self::new(Key::Char('-')));
        }
        let mut parts: Vec<&str> = input.split('-').collect();
        let last = parts.pop()?;
        let mut modifiers = Modifiers::none();
        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return None,
            }
        }
        let key = match last.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "space" => Key::Space,
            "escape" | "esc" => Key::Escape,
            _ => {
                let mut chars = last.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Char(ch)
            }
        };
        Some(Self { key, modifiers })
    }

    /// The text this press would insert when nothing intercepts it.
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.command() || self.modifiers.alt {
            return None;
        }
        match self.key {
            Key::Space => Some(' '),
            Key::Char(ch) if !ch.is_control() => Some(ch),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl-")?;
        }
        if self.modifiers.alt {
            f.write_str("alt-")?;
        }
        if self.modifiers.meta {
            f.write_str("meta-")?;
        }
        if self.modifiers.shift {
            f.write_str("shift-")?;
        }
        match self.key {
            Key::Enter => f.write_str("enter"),
            Key::Tab => f.write_str("tab"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("delete"),
            Key::Space => f.write_str("space"),
            Key::Escape => f.write_str("escape"),
            Key::Char(ch) => write!(f, "{ch}"),
        }
    }
}

/// Named structural intents returned by key-binding resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCommand {
    #[serde(rename = "reset_type_command")]
    ResetType,
    #[serde(rename = "tab_command")]
    Tab,
    #[serde(rename = "tab_command_disabled")]
    TabDisabled,
    #[serde(rename = "decrease_depth_command")]
    DecreaseDepth,
    InsertBlockAfterTitle,
    InsertBlockAfterHeading,
    InsertBlockAfterToggle,
    InsertBlockIntoToggle,
    InsertBlockAfterTable,
    InsertBlockAfterAtomic,
    ActivateEmbedBlock,
    SplitListItem,
    #[serde(rename = "toggle_state_command")]
    ToggleState,
    #[serde(rename = "remove_block_command")]
    RemoveBlock,
}

impl BlockCommand {
    pub const ALL: [BlockCommand; 14] = [
        BlockCommand::ResetType,
        BlockCommand::Tab,
        BlockCommand::TabDisabled,
        BlockCommand::DecreaseDepth,
        BlockCommand::InsertBlockAfterTitle,
        BlockCommand::InsertBlockAfterHeading,
        BlockCommand::InsertBlockAfterToggle,
        BlockCommand::InsertBlockIntoToggle,
        BlockCommand::InsertBlockAfterTable,
        BlockCommand::InsertBlockAfterAtomic,
        BlockCommand::ActivateEmbedBlock,
        BlockCommand::SplitListItem,
        BlockCommand::ToggleState,
        BlockCommand::RemoveBlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockCommand::ResetType => "reset_type_command",
            BlockCommand::Tab => "tab_command",
            BlockCommand::TabDisabled => "tab_command_disabled",
            BlockCommand::DecreaseDepth => "decrease_depth_command",
            BlockCommand::InsertBlockAfterTitle => "insert_block_after_title",
            BlockCommand::InsertBlockAfterHeading => "insert_block_after_heading",
            BlockCommand::InsertBlockAfterToggle => "insert_block_after_toggle",
            BlockCommand::InsertBlockIntoToggle => "insert_block_into_toggle",
            BlockCommand::InsertBlockAfterTable => "insert_block_after_table",
            BlockCommand::InsertBlockAfterAtomic => "insert_block_after_atomic",
            BlockCommand::ActivateEmbedBlock => "activate_embed_block",
            BlockCommand::SplitListItem => "split_list_item",
            BlockCommand::ToggleState => "toggle_state_command",
            BlockCommand::RemoveBlock => "remove_block_command",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.as_str() == name)
    }
}

impl fmt::Display for BlockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modified_keys() {
        let press = KeyPress::parse("shift-tab").unwrap();
        assert_eq!(press.key, Key::Tab);
        assert!(press.modifiers.shift);

        let press = KeyPress::parse("ctrl-enter").unwrap();
        assert_eq!(press.key, Key::Enter);
        assert!(press.modifiers.command());

        assert_eq!(KeyPress::parse("-").unwrap().key, Key::Char('-'));
        assert_eq!(KeyPress::parse("x").unwrap().printable(), Some('x'));
        assert_eq!(KeyPress::parse("space").unwrap().printable(), Some(' '));
        assert!(KeyPress::parse("hyper-x").is_none());
        assert!(KeyPress::parse("ab").is_none());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for input in ["enter", "shift-tab", "ctrl-enter", "backspace", "q"] {
            let press = KeyPress::parse(input).unwrap();
            assert_eq!(press.to_string(), input);
        }
    }

    #[test]
    fn command_names_match_wire_names() {
        for cmd in BlockCommand::ALL {
            let json = serde_json::to_value(cmd).unwrap();
            assert_eq!(json.as_str(), Some(cmd.as_str()));
            assert_eq!(BlockCommand::from_name(cmd.as_str()), Some(cmd));
        }
    }
}

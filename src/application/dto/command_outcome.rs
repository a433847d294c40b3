//! Command results - what a handler said and what it changed

use serde::Serialize;

use crate::domain::value_objects::{MonsterId, UserId};

/// A message to send back to the channel the command came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Plain message to the channel
    Text { text: String },
    /// Message addressed to the command's author
    Mention { user: UserId, text: String },
    /// Ordered lines, split across deliveries by the transport if too long
    Lines { lines: Vec<String>, paginate: bool },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text { text: text.into() }
    }

    pub fn mention(user: &UserId, text: impl Into<String>) -> Self {
        Reply::Mention {
            user: user.clone(),
            text: text.into(),
        }
    }
}

/// Entities a handler mutated and therefore needs persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnEffects {
    pub characters: Vec<UserId>,
    pub monsters: Vec<MonsterId>,
    pub campaign: bool,
    pub delete_campaign: bool,
}

impl TurnEffects {
    pub fn touch_character(&mut self, uid: &UserId) {
        if !self.characters.contains(uid) {
            self.characters.push(uid.clone());
        }
    }

    pub fn touch_monster(&mut self, id: MonsterId) {
        if !self.monsters.contains(&id) {
            self.monsters.push(id);
        }
    }

    pub fn merge(&mut self, other: TurnEffects) {
        for uid in &other.characters {
            self.touch_character(uid);
        }
        for id in other.monsters {
            self.touch_monster(id);
        }
        self.campaign |= other.campaign;
        self.delete_campaign |= other.delete_campaign;
    }

    /// True when nothing needs to be written
    pub fn is_read_only(&self) -> bool {
        self.characters.is_empty()
            && self.monsters.is_empty()
            && !self.campaign
            && !self.delete_campaign
    }
}

/// What happened when the command's changes were written back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceReport {
    /// The command only read state
    Untouched,
    Saved,
    Deleted,
    /// State changed in memory but could not be written; the command can be retried
    Failed { error: String },
}

/// Everything a command produced, in the order it should be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub verb: String,
    pub replies: Vec<Reply>,
    pub persistence: PersistenceReport,
    /// Whether the monsters took a turn after this command
    pub monster_turn: bool,
}

impl CommandOutcome {
    pub fn reply_only(verb: impl Into<String>, replies: Vec<Reply>) -> Self {
        Self {
            verb: verb.into(),
            replies,
            persistence: PersistenceReport::Untouched,
            monster_turn: false,
        }
    }

    /// Every textual line of every reply, for logging and tests
    pub fn texts(&self) -> Vec<&str> {
        self.replies
            .iter()
            .flat_map(|reply| match reply {
                Reply::Text { text } | Reply::Mention { text, .. } => vec![text.as_str()],
                Reply::Lines { lines, .. } => lines.iter().map(String::as_str).collect(),
            })
            .collect()
    }
}

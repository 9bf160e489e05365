//! Board Models
//!
//! Data structures matching the board server's `/state` response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column keys in board display order.
pub const STATUSES: [&str; 6] = ["next", "doing", "reviewing", "approving", "rejected", "done"];

/// Statuses rendered with the compact card template.
const COMPACT_STATUSES: [&str; 2] = ["done", "next"];

/// Naming convention for team-classification stickers.
const TEAM_STICKER_PREFIX: &str = "team-";

/// A team member as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    pub name: String,
}

/// Members keyed by member id.
pub type Members = HashMap<String, Member>;

/// Decorative or classificatory tag attached to a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub name: String,
    /// Routes the chip to the label container instead of the sticker container.
    #[serde(default)]
    pub is_label: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Extra CSS class appended to the chip.
    #[serde(default)]
    pub class: String,
}

impl Sticker {
    /// Team name carried by a team-classification sticker, if any.
    pub fn team(&self) -> Option<&str> {
        self.name.strip_prefix(TEAM_STICKER_PREFIX)
    }
}

/// One work item on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    #[serde(default)]
    pub assignees: Members,
    /// Days the card has spent in play.
    #[serde(default)]
    pub in_play: u32,
    pub status: String,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Card {
    /// The card's team classification, taken from the first team sticker.
    pub fn team(&self) -> Option<&str> {
        self.stickers.iter().find_map(|s| s.team())
    }
}

/// One displayed support roster entry per schedule key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    #[serde(default, rename = "type")]
    pub schedule: String,
    #[serde(default)]
    pub member: String,
}

/// One complete, atomically-fetched board snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub support: HashMap<String, Support>,
    #[serde(default)]
    pub free_team_members: Members,
}

/// Whether cards in this status use the compact template.
pub fn is_compact_status(status: &str) -> bool {
    COMPACT_STATUSES.contains(&status)
}

/// Members sorted by id, pinning a deterministic display order.
pub fn sorted_members(members: &Members) -> Vec<&Member> {
    let mut sorted: Vec<&Member> = members.values().collect();
    sorted.sort_by_key(|m| m.id);
    sorted
}

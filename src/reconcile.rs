//! Reconciler
//!
//! The diffing core. Each pass takes the freshly fetched board state and
//! mutates the presentation tree to agree with it: new cards are dealt in,
//! moved cards are retired from their old column and re-dealt, unchanged
//! cards are repopulated in place, and cards that dropped out of the
//! snapshot are retired. A pass is idempotent: running it twice against the
//! same snapshot performs no further structural work.

use crate::animate::Animator;
use crate::dom::{Dom, Template};
use crate::models::{sorted_members, BoardState, Card, Members, Support};
use crate::sched::Scheduler;
use crate::tree::{Entry, PresentationTree};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Selectors the reconciler expects inside a card node and the page.
pub mod selectors {
    pub const HEADER_LINK: &str = ":scope > header > a";
    pub const HEADER_DAYS: &str = ":scope > header > span";
    pub const ASSIGNEES: &str = ":scope > main";
    pub const STICKERS: &str = ".stickers";
    pub const LABELS: &str = ".labels";
    pub const COLUMN_COUNT: &str = ":scope > header .count";
    pub const FOOTER: &str = "body > footer";

    /// Slot in the page header showing who covers a support schedule.
    pub fn support_slot(schedule: &str) -> String {
        format!("body > header .{}", schedule)
    }
}

pub struct Reconciler<D: Dom, S: Scheduler> {
    dom: D,
    anim: Animator<D, S>,
    listeners: RefCell<Vec<Box<dyn Fn()>>>,
}

impl<D: Dom, S: Scheduler> Reconciler<D, S> {
    pub fn new(dom: D, anim: Animator<D, S>) -> Self {
        Reconciler { dom, anim, listeners: RefCell::new(Vec::new()) }
    }

    /// Register a callback fired after every completed pass.
    pub fn on_updated(&self, f: Box<dyn Fn()>) {
        self.listeners.borrow_mut().push(f);
    }

    /// One reconciliation pass. The synchronous diff runs to completion
    /// before any listener fires; animations it started keep running on
    /// the scheduler afterwards.
    pub fn reconcile(&self, state: &BoardState, tree: &Rc<RefCell<PresentationTree<D::Node>>>) {
        {
            let mut tree = tree.borrow_mut();
            let mut seen: HashSet<u64> = HashSet::new();
            let mut column_counts: HashMap<&str, usize> = HashMap::new();

            for card in &state.cards {
                if !seen.insert(card.id) {
                    log::warn!("[RECONCILER] duplicate card id {} in snapshot, skipped", card.id);
                    continue;
                }

                // Stable ordinal among same-status cards seen so far.
                let pos_slot = column_counts.entry(card.status.as_str()).or_insert(0);
                let pos = *pos_slot;
                *pos_slot += 1;

                match tree.status_of(card.id).map(str::to_owned) {
                    None => self.deal_card(card, pos, &mut tree),
                    Some(current) if current != card.status => {
                        // Column move: the old node exits while a fresh one
                        // enters the target column.
                        if let Some(entry) = tree.remove(card.id) {
                            self.retire_node(entry.node);
                        }
                        self.deal_card(card, pos, &mut tree);
                    }
                    Some(_) => {
                        self.reposition(card, pos, &mut tree);
                        if let Some(entry) = tree.get(card.id) {
                            let node = entry.node.clone();
                            self.populate(&node, card);
                        }
                        tree.set_team(card.id, card.team().map(str::to_owned));
                    }
                }
            }

            // Cards that disappeared from the snapshot are retired.
            for id in tree.ids() {
                if !seen.contains(&id) {
                    if let Some(entry) = tree.remove(id) {
                        log::info!("[RECONCILER] card {} left the board", id);
                        self.retire_node(entry.node);
                    }
                }
            }
        }

        self.update_free_members(&state.free_team_members);
        self.update_support(&state.support);
        self.notify_updated();
    }

    /// Instantiate, populate, insert, and entrance-animate a card node.
    fn deal_card(&self, card: &Card, pos: usize, tree: &mut PresentationTree<D::Node>) {
        let Some(column) = self.dom.find(&card.status) else {
            log::error!("[RECONCILER] no column container for status {:?}", card.status);
            return;
        };
        let Some(node) = self.dom.create_card(Template::for_status(&card.status)) else {
            log::error!(
                "[RECONCILER] no template for status {:?}, card {} skipped",
                card.status,
                card.id
            );
            return;
        };

        self.dom.hide(&node);
        self.populate(&node, card);

        let reference = tree.column_entries(&card.status).get(pos).map(|e| e.node.clone());
        self.dom.insert_before(&column, &node, reference.as_ref());
        tree.insert(
            &card.status,
            pos,
            Entry {
                id: card.id,
                status: card.status.clone(),
                team: card.team().map(str::to_owned),
                node: node.clone(),
            },
        );

        self.anim.enter(card.id, &node);
    }

    /// Move an in-column node to its snapshot ordinal, without animation.
    fn reposition(&self, card: &Card, pos: usize, tree: &mut PresentationTree<D::Node>) {
        if tree.position(card.id) == Some(pos) {
            return;
        }
        let Some(column) = self.dom.find(&card.status) else {
            return;
        };
        if let Some(entry) = tree.remove(card.id) {
            let reference = tree.column_entries(&card.status).get(pos).map(|e| e.node.clone());
            self.dom.insert_before(&column, &entry.node, reference.as_ref());
            tree.insert(&card.status, pos, entry);
        }
    }

    /// Exit-animate a node that left the tree; detach once the exit is done.
    fn retire_node(&self, node: D::Node) {
        let dom = self.dom.clone();
        let doomed = node.clone();
        self.anim.retire(&node, Box::new(move || dom.detach(&doomed)));
    }

    /// Rewrite everything derived from the card's data. Idempotent, and
    /// tolerant of containers the compact template does not carry.
    fn populate(&self, node: &D::Node, card: &Card) {
        self.dom.set_attr(node, "id", &card.id.to_string());
        self.dom.set_attr(node, "class", &format!("card {}", card.status));
        self.set_header(node, card);
        self.set_assignees(node, card);
        self.set_stickers(node, card);
    }

    fn set_header(&self, node: &D::Node, card: &Card) {
        if let Some(link) = self.dom.query(node, selectors::HEADER_LINK) {
            self.dom.set_attr(&link, "href", &card.url);
            self.dom.set_text(&link, &card.title);
        }
        if let Some(days) = self.dom.query(node, selectors::HEADER_DAYS) {
            self.dom.set_text(&days, &days_label(card.in_play));
        }
    }

    fn set_assignees(&self, node: &D::Node, card: &Card) {
        if let Some(main) = self.dom.query(node, selectors::ASSIGNEES) {
            self.dom.set_html(&main, &assignee_block(&card.assignees));
        }
    }

    fn set_stickers(&self, node: &D::Node, card: &Card) {
        let stickers = self.dom.query(node, selectors::STICKERS);
        let labels = self.dom.query(node, selectors::LABELS);

        let mut sticker_html = String::new();
        let mut label_html = String::new();
        for sticker in &card.stickers {
            let target = if sticker.is_label { &mut label_html } else { &mut sticker_html };
            target.push_str(&sticker_chip(sticker));
        }

        if let Some(container) = stickers {
            self.dom.set_html(&container, &sticker_html);
        }
        if let Some(container) = labels {
            self.dom.set_html(&container, &label_html);
        }
    }

    fn update_free_members(&self, free: &Members) {
        let Some(footer) = self.dom.query_document(selectors::FOOTER) else {
            return;
        };
        if let Some(count) = self.dom.query(&footer, "span") {
            self.dom.set_text(&count, &free.len().to_string());
        }
        if let Some(list) = self.dom.query(&footer, "ul") {
            let items: String = sorted_members(free)
                .iter()
                .map(|m| format!("<li>{}</li>", m.name))
                .collect();
            self.dom.set_html(&list, &items);
        }
    }

    fn update_support(&self, support: &HashMap<String, Support>) {
        let mut schedules: Vec<&String> = support.keys().collect();
        schedules.sort();
        for schedule in schedules {
            if let Some(slot) = self.dom.query_document(&selectors::support_slot(schedule)) {
                self.dom.set_text(&slot, &support[schedule].member);
            }
        }
    }

    fn notify_updated(&self) {
        for listener in self.listeners.borrow().iter() {
            listener();
        }
    }
}

/// Elapsed-time label; exactly 1 is singular, everything else is plural.
pub fn days_label(days: u32) -> String {
    format!("{} day{}", days, if days == 1 { "" } else { "s" })
}

/// Assignee block markup, or a placeholder when nobody is on the card.
fn assignee_block(assignees: &Members) -> String {
    if assignees.is_empty() {
        return "<h4 class='text-danger'>Nobody is working on this</h4><p>Sad times.</p>"
            .to_string();
    }
    let items: String = sorted_members(assignees)
        .iter()
        .map(|m| format!("<li>{}</li>", m.name))
        .collect();
    format!(
        "<h4>Assignee{}</h4><ul>{}</ul>",
        if assignees.len() > 1 { "s" } else { "" },
        items
    )
}

/// One sticker/label chip. Image wins over title text; content trails as a
/// small note.
fn sticker_chip(sticker: &crate::models::Sticker) -> String {
    let mut class = format!("sticker sticker-{}", sticker.name);
    if !sticker.class.is_empty() {
        class.push(' ');
        class.push_str(&sticker.class);
    }
    let body = if !sticker.image.is_empty() {
        format!("<img src=\"{}\" title=\"{}\">", sticker.image, sticker.title)
    } else {
        sticker.title.clone()
    };
    let note = if !sticker.content.is_empty() {
        format!("<small>{}</small>", sticker.content)
    } else {
        String::new()
    };
    format!("<span class=\"{}\">{}{}</span>", class, body, note)
}

//! Team Filter
//!
//! Ephemeral visibility layered over the reconciled tree. Filtering to a
//! team hides every card classified under a different team; cards with no
//! team classification always stay visible. The filter resets itself after
//! half an hour so an unattended display never stays narrowed for good.

use crate::animate::Animator;
use crate::dom::Dom;
use crate::sched::Scheduler;
use crate::tree::PresentationTree;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Auto-reset delay for an applied filter.
pub const FILTER_RESET_MS: u32 = 30 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    AllVisible,
    TeamFiltered(String),
}

struct FilterInner<D: Dom, S: Scheduler> {
    anim: Animator<D, S>,
    sched: S,
    tree: Rc<RefCell<PresentationTree<D::Node>>>,
    state: RefCell<FilterState>,
    reset_timer: RefCell<Option<S::Handle>>,
}

pub struct TeamFilter<D: Dom, S: Scheduler> {
    inner: Rc<FilterInner<D, S>>,
}

impl<D: Dom, S: Scheduler> Clone for TeamFilter<D, S> {
    fn clone(&self) -> Self {
        TeamFilter { inner: self.inner.clone() }
    }
}

impl<D: Dom, S: Scheduler> TeamFilter<D, S> {
    pub fn new(
        anim: Animator<D, S>,
        sched: S,
        tree: Rc<RefCell<PresentationTree<D::Node>>>,
    ) -> Self {
        TeamFilter {
            inner: Rc::new(FilterInner {
                anim,
                sched,
                tree,
                state: RefCell::new(FilterState::AllVisible),
                reset_timer: RefCell::new(None),
            }),
        }
    }

    pub fn state(&self) -> FilterState {
        self.inner.state.borrow().clone()
    }

    /// Show only cards with no team classification or classified as `team`,
    /// and arm the auto-reset timer. Re-filtering supersedes the previously
    /// armed timer; only one is ever outstanding.
    pub fn filter_team(&self, team: &str) {
        log::info!("[FILTER] showing team {:?}", team);

        for (id, node, card_team) in self.visible_entries() {
            match card_team {
                Some(t) if t != team => self.inner.anim.exit(id, &node),
                _ => self.inner.anim.enter(id, &node),
            }
        }
        *self.inner.state.borrow_mut() = FilterState::TeamFiltered(team.to_string());

        let weak: Weak<FilterInner<D, S>> = Rc::downgrade(&self.inner);
        let handle = self.inner.sched.timeout(
            FILTER_RESET_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    log::info!("[FILTER] auto-reset expired");
                    TeamFilter { inner }.reset_filter();
                }
            }),
        );
        // Replacing the handle cancels any previously armed reset.
        *self.inner.reset_timer.borrow_mut() = Some(handle);
    }

    /// Show every card and cancel any pending auto-reset.
    pub fn reset_filter(&self) {
        self.inner.reset_timer.borrow_mut().take();

        for (id, node, _) in self.visible_entries() {
            self.inner.anim.enter(id, &node);
        }
        *self.inner.state.borrow_mut() = FilterState::AllVisible;
    }

    fn visible_entries(&self) -> Vec<(u64, D::Node, Option<String>)> {
        self.inner
            .tree
            .borrow()
            .entries()
            .map(|e| (e.id, e.node.clone(), e.team.clone()))
            .collect()
    }
}

//! Counter Monitor
//!
//! Per-column occupancy versus the column's configured limit. Refreshed
//! after every reconciliation pass and by one periodic sweep owned by the
//! monitor itself, armed exactly once.

use crate::dom::Dom;
use crate::reconcile::selectors;
use crate::sched::Scheduler;
use crate::tree::PresentationTree;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Period of the background sweep.
pub const SWEEP_INTERVAL_MS: u32 = 15_000;

/// Column attribute carrying the card limit; `0` or absent means unlimited.
pub const LIMIT_ATTR: &str = "data-cards";

const OVER_LIMIT_CLASS: &str = "over-limit";

/// Computed occupancy of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnState {
    pub key: String,
    pub limit: Option<u32>,
    pub live_count: usize,
    pub over_limit: bool,
}

struct CounterInner<D: Dom, S: Scheduler> {
    dom: D,
    sweep: RefCell<Option<S::Handle>>,
}

pub struct CounterMonitor<D: Dom, S: Scheduler> {
    inner: Rc<CounterInner<D, S>>,
}

impl<D: Dom, S: Scheduler> Clone for CounterMonitor<D, S> {
    fn clone(&self) -> Self {
        CounterMonitor { inner: self.inner.clone() }
    }
}

impl<D: Dom, S: Scheduler> CounterMonitor<D, S> {
    pub fn new(dom: D) -> Self {
        CounterMonitor { inner: Rc::new(CounterInner { dom, sweep: RefCell::new(None) }) }
    }

    /// Recompute every column's count and over-limit flag.
    pub fn refresh(&self, tree: &PresentationTree<D::Node>) -> Vec<ColumnState> {
        run_refresh(&self.inner.dom, tree)
    }

    /// Arm the periodic sweep. Calling this again is a no-op; the monitor
    /// owns a single repeating task for its whole lifetime.
    pub fn start(&self, sched: &S, tree: Rc<RefCell<PresentationTree<D::Node>>>) {
        if self.inner.sweep.borrow().is_some() {
            return;
        }
        let weak: Weak<CounterInner<D, S>> = Rc::downgrade(&self.inner);
        let handle = sched.interval(
            SWEEP_INTERVAL_MS,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    run_refresh(&inner.dom, &tree.borrow());
                }
            }),
        );
        *self.inner.sweep.borrow_mut() = Some(handle);
    }
}

fn run_refresh<D: Dom>(dom: &D, tree: &PresentationTree<D::Node>) -> Vec<ColumnState> {
    let mut states = Vec::new();

    for key in tree.column_keys() {
        let Some(column) = dom.find(key) else {
            continue;
        };
        let limit = dom.attr(&column, LIMIT_ATTR).and_then(|v| v.parse::<u32>().ok());
        let live_count = tree.column_entries(key).len();
        let over_limit = matches!(limit, Some(l) if l > 0 && live_count as u32 > l);

        if let Some(count) = dom.query(&column, selectors::COLUMN_COUNT) {
            dom.set_text(&count, &live_count.to_string());
        }
        dom.toggle_class(&column, OVER_LIMIT_CLASS, over_limit);

        states.push(ColumnState { key: key.to_string(), limit, live_count, over_limit });
    }

    states
}

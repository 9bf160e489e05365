//! Board Application
//!
//! Wires the engine to the page: polls the server, reconciles, keeps the
//! counters fresh, and binds the team filter controls.

use crate::animate::Animator;
use crate::browser::{BrowserDom, BrowserScheduler};
use crate::counter::CounterMonitor;
use crate::dom::Dom;
use crate::filter::TeamFilter;
use crate::logging;
use crate::models::STATUSES;
use crate::reconcile::Reconciler;
use crate::state;
use crate::tree::PresentationTree;
use gloo_timers::callback::Interval;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

/// Poll period; fires regardless of in-flight animations.
pub const POLL_INTERVAL_MS: u32 = 15_000;

/// Attribute on filter controls naming the team, with `all` as the reset.
const TEAM_CONTROL_ATTR: &str = "data-team";

type Tree = Rc<RefCell<PresentationTree<Element>>>;

pub struct Application {
    dom: BrowserDom,
    tree: Tree,
    reconciler: Reconciler<BrowserDom, BrowserScheduler>,
    counter: CounterMonitor<BrowserDom, BrowserScheduler>,
    filter: TeamFilter<BrowserDom, BrowserScheduler>,
}

impl Application {
    pub fn mount() -> Rc<Application> {
        let document = web_sys::window()
            .expect("window should be available")
            .document()
            .expect("document should be available");
        let dom = BrowserDom::new(document);
        let sched = BrowserScheduler;

        let anim = Animator::new(dom.clone(), sched.clone());
        let tree: Tree = Rc::new(RefCell::new(PresentationTree::new(&STATUSES)));
        let reconciler = Reconciler::new(dom.clone(), anim.clone());
        let counter = CounterMonitor::new(dom.clone());
        let filter = TeamFilter::new(anim, sched.clone(), tree.clone());

        let refresh_counter = counter.clone();
        let refresh_tree = tree.clone();
        reconciler.on_updated(Box::new(move || {
            refresh_counter.refresh(&refresh_tree.borrow());
        }));

        Rc::new(Application { dom, tree, reconciler, counter, filter })
    }

    pub fn run(self: &Rc<Self>) {
        logging::init();
        log::info!("[APP] running team board");

        self.bind_filter_controls();
        self.counter.start(&BrowserScheduler, self.tree.clone());

        // First paint immediately, then on the fixed poll interval.
        self.poll();
        let app = self.clone();
        Interval::new(POLL_INTERVAL_MS, move || app.poll()).forget();
    }

    fn poll(self: &Rc<Self>) {
        let app = self.clone();
        spawn_local(async move {
            match state::fetch_state().await {
                Ok(state) => {
                    app.reconciler.reconcile(&state, &app.tree);
                    log::info!("[APP] reconciled {} cards", state.cards.len());
                }
                // Keep the stale presentation; the next poll may succeed.
                Err(err) => log::error!("[APP] snapshot fetch failed: {}", err),
            }
        });
    }

    fn bind_filter_controls(self: &Rc<Self>) {
        let Some(controls) = self
            .dom
            .query_document("body")
            .and_then(|body| body.query_selector_all(&format!("[{}]", TEAM_CONTROL_ATTR)).ok())
        else {
            return;
        };

        for i in 0..controls.length() {
            let Some(control) = controls.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let team = control.get_attribute(TEAM_CONTROL_ATTR).unwrap_or_default();
            let app = self.clone();
            let on_click = Closure::<dyn FnMut()>::new(move || {
                if team == "all" {
                    app.filter.reset_filter();
                } else {
                    app.filter.filter_team(&team);
                }
            });
            let _ = control
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            on_click.forget();
        }
    }
}

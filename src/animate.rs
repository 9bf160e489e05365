//! Animation Controller
//!
//! Drives enter/exit transitions for card nodes. Each animation is a
//! cancellable task keyed by card id; arming a task for a key supersedes
//! whatever was outstanding for that key, so a card re-appearing mid-exit
//! cannot race its own removal. Retirements (node leaving the tree for
//! good) are tracked separately and gate detachment on completion.

use crate::dom::Dom;
use crate::sched::Scheduler;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Delay matching the slide transition's assumed duration. A best-effort
/// stagger, not a measured completion.
pub const REVEAL_DELAY_MS: u32 = 750;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Scheduled,
    Running,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TaskKey {
    /// Animation of the live node for a card id.
    Card(u64),
    /// One-way teardown of a node that left the tree.
    Retire(u64),
}

struct Task<H> {
    kind: TaskKind,
    state: TaskState,
    // Keeps the timer armed; dropping it cancels.
    _handle: H,
}

struct AnimState<H> {
    tasks: HashMap<TaskKey, Task<H>>,
    next_retire: u64,
}

pub struct Animator<D: Dom, S: Scheduler> {
    dom: D,
    sched: S,
    state: Rc<RefCell<AnimState<S::Handle>>>,
}

impl<D: Dom, S: Scheduler> Clone for Animator<D, S> {
    fn clone(&self) -> Self {
        Animator { dom: self.dom.clone(), sched: self.sched.clone(), state: self.state.clone() }
    }
}

impl<D: Dom, S: Scheduler> Animator<D, S> {
    pub fn new(dom: D, sched: S) -> Self {
        Animator {
            dom,
            sched,
            state: Rc::new(RefCell::new(AnimState { tasks: HashMap::new(), next_retire: 0 })),
        }
    }

    /// Reveal a hidden node: opacity 0, slide down, then fade in after the
    /// reveal delay. No-op on visible nodes, except that it lifts a
    /// superseded fade-out.
    pub fn enter(&self, id: u64, node: &D::Node) {
        let superseded = self.state.borrow_mut().tasks.remove(&TaskKey::Card(id));

        if !self.dom.is_hidden(node) {
            if let Some(task) = superseded {
                if task.kind == TaskKind::Exit && task.state != TaskState::Complete {
                    // The cancelled exit already started fading; bring the
                    // node back instead of leaving it translucent.
                    self.dom.animate_opacity(node, 1.0);
                }
            }
            return;
        }
        drop(superseded);

        self.dom.set_opacity(node, 0.0);
        self.dom.slide_down(node);

        let key = TaskKey::Card(id);
        let handle = self.schedule_reveal(key, node.clone());
        self.state
            .borrow_mut()
            .tasks
            .insert(key, Task { kind: TaskKind::Enter, state: TaskState::Scheduled, _handle: handle });
    }

    /// Fade a visible node out and collapse it after the reveal delay. The
    /// node stays in the document (used by the team filter). No-op when
    /// already hidden.
    pub fn exit(&self, id: u64, node: &D::Node) {
        let key = TaskKey::Card(id);
        self.state.borrow_mut().tasks.remove(&key);

        if self.dom.is_hidden(node) {
            return;
        }

        let handle = self.schedule_collapse(key, node.clone(), None);
        self.state
            .borrow_mut()
            .tasks
            .insert(key, Task { kind: TaskKind::Exit, state: TaskState::Scheduled, _handle: handle });
    }

    /// Exit-animate a node that has left the presentation tree, then run
    /// `on_complete` (the detachment hook) once the collapse is done.
    /// Retirements are keyed separately so a fresh node entering under the
    /// same card id cannot cancel them.
    pub fn retire(&self, node: &D::Node, on_complete: Box<dyn FnOnce()>) {
        if self.dom.is_hidden(node) {
            on_complete();
            return;
        }

        let key = {
            let mut state = self.state.borrow_mut();
            state.next_retire += 1;
            TaskKey::Retire(state.next_retire)
        };
        let handle = self.schedule_collapse(key, node.clone(), Some(on_complete));
        self.state
            .borrow_mut()
            .tasks
            .insert(key, Task { kind: TaskKind::Exit, state: TaskState::Scheduled, _handle: handle });
    }

    /// Outstanding task for a card id, if any.
    pub fn pending(&self, id: u64) -> Option<(TaskKind, TaskState)> {
        self.state
            .borrow()
            .tasks
            .get(&TaskKey::Card(id))
            .map(|t| (t.kind, t.state))
    }

    /// Number of nodes currently exit-animating towards detachment.
    pub fn retiring(&self) -> usize {
        self.state
            .borrow()
            .tasks
            .keys()
            .filter(|k| matches!(k, TaskKey::Retire(_)))
            .count()
    }

    fn schedule_reveal(&self, key: TaskKey, node: D::Node) -> S::Handle {
        let dom = self.dom.clone();
        let state = Rc::downgrade(&self.state);
        self.sched.timeout(
            REVEAL_DELAY_MS,
            Box::new(move || {
                if let Some(state) = state.upgrade() {
                    if let Some(task) = state.borrow_mut().tasks.get_mut(&key) {
                        task.state = TaskState::Running;
                    }
                }
                dom.animate_opacity(&node, 1.0);
                if let Some(state) = state.upgrade() {
                    if let Some(task) = state.borrow_mut().tasks.get_mut(&key) {
                        task.state = TaskState::Complete;
                    }
                    state.borrow_mut().tasks.remove(&key);
                }
            }),
        )
    }

    fn schedule_collapse(
        &self,
        key: TaskKey,
        node: D::Node,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> S::Handle {
        self.dom.set_opacity(&node, 1.0);
        self.dom.animate_opacity(&node, 0.0);

        let dom = self.dom.clone();
        let state = Rc::downgrade(&self.state);
        self.sched.timeout(
            REVEAL_DELAY_MS,
            Box::new(move || {
                if let Some(state) = state.upgrade() {
                    if let Some(task) = state.borrow_mut().tasks.get_mut(&key) {
                        task.state = TaskState::Running;
                    }
                }
                dom.slide_up(&node);
                dom.hide(&node);
                if let Some(f) = on_complete {
                    f();
                }
                if let Some(state) = state.upgrade() {
                    if let Some(task) = state.borrow_mut().tasks.get_mut(&key) {
                        task.state = TaskState::Complete;
                    }
                    state.borrow_mut().tasks.remove(&key);
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::mock::MockDom;
    use crate::sched::manual::ManualScheduler;
    use crate::dom::Template;
    use std::cell::Cell;

    fn setup() -> (MockDom, ManualScheduler, Animator<MockDom, ManualScheduler>) {
        let dom = MockDom::new(&["doing"]);
        let sched = ManualScheduler::new();
        let anim = Animator::new(dom.clone(), sched.clone());
        (dom, sched, anim)
    }

    fn hidden_card(dom: &MockDom) -> usize {
        let node = dom.create_card(Template::Full).expect("template");
        dom.hide(&node);
        node
    }

    #[test]
    fn test_enter_reveals_then_fades_in() {
        let (dom, sched, anim) = setup();
        let node = hidden_card(&dom);

        anim.enter(1, &node);
        assert!(!dom.is_hidden(&node));
        assert_eq!(dom.node(node).opacity, 0.0);
        assert_eq!(anim.pending(1), Some((TaskKind::Enter, TaskState::Scheduled)));

        sched.advance(REVEAL_DELAY_MS as u64);
        assert_eq!(dom.node(node).opacity, 1.0);
        assert_eq!(anim.pending(1), None);
    }

    #[test]
    fn test_enter_is_idempotent_on_visible_node() {
        let (dom, sched, anim) = setup();
        let node = dom.create_card(Template::Full).expect("template");

        anim.enter(1, &node);
        assert_eq!(anim.pending(1), None);
        assert_eq!(dom.node(node).opacity, 0.0);

        sched.advance(10_000);
        assert_eq!(dom.node(node).opacity, 0.0);
    }

    #[test]
    fn test_exit_fades_then_collapses() {
        let (dom, sched, anim) = setup();
        let node = dom.create_card(Template::Full).expect("template");

        anim.exit(1, &node);
        assert_eq!(dom.node(node).opacity, 0.0);
        assert!(!dom.is_hidden(&node));
        assert_eq!(anim.pending(1), Some((TaskKind::Exit, TaskState::Scheduled)));

        sched.advance(REVEAL_DELAY_MS as u64);
        assert!(dom.is_hidden(&node));
        assert_eq!(anim.pending(1), None);
    }

    #[test]
    fn test_exit_is_idempotent_on_hidden_node() {
        let (dom, sched, anim) = setup();
        let node = hidden_card(&dom);

        anim.exit(1, &node);
        assert_eq!(anim.pending(1), None);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_enter_supersedes_pending_exit() {
        let (dom, sched, anim) = setup();
        let node = dom.create_card(Template::Full).expect("template");

        anim.exit(1, &node);
        anim.enter(1, &node);

        // The exit timer is cancelled and the fade lifted.
        assert_eq!(anim.pending(1), None);
        assert_eq!(dom.node(node).opacity, 1.0);
        sched.advance(10_000);
        assert!(!dom.is_hidden(&node));
    }

    #[test]
    fn test_retire_detaches_on_completion() {
        let (dom, sched, anim) = setup();
        let node = dom.create_card(Template::Full).expect("template");
        let detached = Rc::new(Cell::new(false));

        let flag = detached.clone();
        anim.retire(&node, Box::new(move || flag.set(true)));
        assert_eq!(anim.retiring(), 1);
        assert!(!detached.get());

        sched.advance(REVEAL_DELAY_MS as u64);
        assert!(detached.get());
        assert!(dom.is_hidden(&node));
        assert_eq!(anim.retiring(), 0);
    }

    #[test]
    fn test_retire_survives_reentry_of_same_id() {
        let (dom, sched, anim) = setup();
        let old = dom.create_card(Template::Full).expect("template");
        let fresh = hidden_card(&dom);
        let detached = Rc::new(Cell::new(false));

        let flag = detached.clone();
        anim.retire(&old, Box::new(move || flag.set(true)));
        anim.enter(7, &fresh);

        sched.advance(REVEAL_DELAY_MS as u64);
        // Both ran: the old node was torn down, the new node revealed.
        assert!(detached.get());
        assert_eq!(dom.node(fresh).opacity, 1.0);
    }

    #[test]
    fn test_retire_of_hidden_node_completes_immediately() {
        let (dom, _sched, anim) = setup();
        let node = hidden_card(&dom);
        let detached = Rc::new(Cell::new(false));

        let flag = detached.clone();
        anim.retire(&node, Box::new(move || flag.set(true)));
        assert!(detached.get());
        assert_eq!(anim.retiring(), 0);
    }
}

//! Controller that performs transitions and dispatches events.

use crate::checkpoint::Checkpoint;
use crate::core::{Event, History, State, Transition};
use crate::error::FsmError;
use crate::machine::config::FsmConfig;
use tracing::{debug, trace, warn};

/// A finite state machine controller.
///
/// The controller starts without a current state. [`set_initial_state`]
/// installs one, after which [`transition_to`] and [`fire_event`] drive it.
/// Every state change is appended to the [`History`].
///
/// Hooks and handlers run synchronously inside these calls and receive the
/// controller, so they can trigger further transitions. A graph whose hooks
/// cycle forever is stopped by the depth bound in [`FsmConfig`], which fails
/// with [`FsmError::RecursionLimit`]. That bound is only as good as the
/// thread's stack: the default fits 512 KiB in debug builds, and raising
/// `max_depth` needs a matching stack size.
///
/// The controller does no internal locking. Share one instance across
/// threads only behind external synchronization.
///
/// [`set_initial_state`]: Fsm::set_initial_state
/// [`transition_to`]: Fsm::transition_to
/// [`fire_event`]: Fsm::fire_event
///
/// # Example
///
/// ```rust
/// use microfsm::core::{Event, State};
/// use microfsm::Fsm;
///
/// let finish = Event::of("FINISH").unwrap();
/// let done = State::builder().name("done").build().unwrap();
///
/// let target = done.clone();
/// let running = State::builder()
///     .name("running")
///     .on_event(finish.clone(), move |fsm| fsm.transition_to(target.clone()))
///     .build()
///     .unwrap();
///
/// let mut fsm = Fsm::new();
/// fsm.set_initial_state(running).unwrap();
/// fsm.fire_event(&finish).unwrap();
///
/// assert_eq!(fsm.current_state(), Some(&done));
/// assert_eq!(fsm.transitions().len(), 2);
/// ```
#[derive(Debug)]
pub struct Fsm {
    current: Option<State>,
    history: History,
    config: FsmConfig,
    depth: usize,
}

impl Fsm {
    /// Create an uninitialized controller with the default configuration.
    pub fn new() -> Self {
        Self {
            current: None,
            history: History::new(),
            config: FsmConfig::default(),
            depth: 0,
        }
    }

    pub fn with_config(config: FsmConfig) -> Result<Self, FsmError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Install the first state of the machine.
    ///
    /// This runs the same algorithm as [`Fsm::transition_to`], so the first
    /// recorded transition has no source state. Calling it again on an
    /// initialized machine is allowed and behaves like `transition_to`.
    pub fn set_initial_state(&mut self, state: State) -> Result<(), FsmError> {
        if let Some(current) = &self.current {
            warn!(
                current = %current,
                state = %state,
                "initial state set on an already initialized machine"
            );
        }
        self.transition_to(state)
    }

    /// Move the machine to `state`.
    ///
    /// Runs the current state's exit hook, records the transition, makes
    /// `state` current and then runs its entry hook. An error from the exit
    /// hook leaves the machine where it was. An error from the entry hook is
    /// returned after the transition has been recorded.
    ///
    /// The exit hook may itself call back into the controller. The recorded
    /// source is whatever state is current once the hook returns. An exit
    /// hook that calls `transition_to` unconditionally re-enters its own exit
    /// hook on every attempt and ends in [`FsmError::RecursionLimit`] without
    /// recording anything; guard such calls with a condition.
    pub fn transition_to(&mut self, state: State) -> Result<(), FsmError> {
        self.nested(|fsm| fsm.enter(state))
    }

    /// Dispatch `event` to the current state's handler.
    ///
    /// Fails with [`FsmError::NoActiveState`] before initialization and with
    /// [`FsmError::UnhandledEvent`] when the current state has no handler for
    /// the event; neither failure changes the machine. The handler runs once
    /// and no transition is recorded unless it requests one.
    pub fn fire_event(&mut self, event: &Event) -> Result<(), FsmError> {
        self.nested(|fsm| {
            let state = fsm.current.clone().ok_or(FsmError::NoActiveState)?;
            let Some(handler) = state.handler(event) else {
                debug!(event = %event, state = %state, "no handler for event");
                return Err(FsmError::UnhandledEvent {
                    event: event.name().to_string(),
                    state: state.name().to_string(),
                });
            };

            trace!(event = %event, state = %state, "dispatching event");
            handler(fsm)
        })
    }

    pub fn current_state(&self) -> Option<&State> {
        self.current.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the current state has a handler for `event`.
    pub fn can_handle(&self, event: &Event) -> bool {
        self.current.as_ref().is_some_and(|s| s.handles(event))
    }

    /// Every transition since the machine was created, oldest first.
    pub fn transitions(&self) -> &[Transition] {
        self.history.transitions()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    /// Snapshot the current state and history for later recovery.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::capture(self)
    }

    fn enter(&mut self, state: State) -> Result<(), FsmError> {
        let leaving = self.current.clone();
        if let Some(on_exit) = leaving.as_ref().and_then(State::on_exit) {
            trace!(state = %state_name(leaving.as_ref()), "running exit hook");
            on_exit(self)?;
        }

        // The exit hook may itself have moved the machine.
        let from = self.current.take();
        debug!(
            from = %state_name(from.as_ref()),
            to = %state,
            "transition"
        );
        self.history.record(Transition::of(from, state.clone()));
        self.current = Some(state.clone());

        if let Some(on_entry) = state.on_entry() {
            trace!(state = %state, "running entry hook");
            on_entry(self)?;
        }
        Ok(())
    }

    fn nested<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, FsmError>,
    ) -> Result<T, FsmError> {
        if self.depth >= self.config.max_depth {
            warn!(
                limit = self.config.max_depth,
                state = %state_name(self.current.as_ref()),
                "nested transition depth exceeded"
            );
            return Err(FsmError::RecursionLimit {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let mut guard = DepthGuard(self);
        let result = op(&mut *guard.0);
        drop(guard);
        result
    }
}

/// Releases one nesting level on drop, so a hook that panics and is caught
/// by the host does not leave the depth counter inflated.
struct DepthGuard<'a>(&'a mut Fsm);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.depth -= 1;
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

fn state_name(state: Option<&State>) -> &str {
    state.map_or("<none>", State::name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};

    fn event(name: &str) -> Event {
        Event::of(name).unwrap()
    }

    fn plain(name: &str) -> State {
        State::builder().name(name).build().unwrap()
    }

    fn log_hook(
        log: &Arc<Mutex<Vec<String>>>,
        line: &str,
    ) -> impl Fn(&mut Fsm) -> Result<(), FsmError> + Send + Sync + 'static {
        let log = Arc::clone(log);
        let line = line.to_string();
        move |_| {
            log.lock().unwrap().push(line.clone());
            Ok(())
        }
    }

    #[test]
    fn new_machine_has_no_state() {
        let fsm = Fsm::new();
        assert!(fsm.current_state().is_none());
        assert!(!fsm.is_initialized());
        assert!(fsm.transitions().is_empty());
    }

    #[test]
    fn initial_state_records_sourceless_transition() {
        let first = plain("first");
        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();

        assert_eq!(fsm.current_state(), Some(&first));
        assert_eq!(fsm.transitions(), &[Transition::of(None, first)]);
    }

    #[test]
    fn fire_without_state_fails() {
        let mut fsm = Fsm::new();
        let err = fsm.fire_event(&event("EVENT1")).unwrap_err();

        assert_eq!(err, FsmError::NoActiveState);
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn fire_unhandled_event_fails_without_mutation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = State::builder()
            .name("first")
            .on_event(event("EVENT1"), log_hook(&log, "Fired event1"))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        let err = fsm.fire_event(&event("EVENT2")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(matches!(
            err,
            FsmError::UnhandledEvent { ref event, ref state } if event == "EVENT2" && state == "first"
        ));
        assert_eq!(fsm.current_state(), Some(&first));
        assert_eq!(fsm.transitions().len(), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn fire_valid_events_invoke_matching_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = State::builder()
            .name("first")
            .on_event(event("EVENT1"), log_hook(&log, "Fired event1"))
            .on_event(event("EVENT2"), log_hook(&log, "Fired event2"))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first).unwrap();
        fsm.fire_event(&event("EVENT1")).unwrap();
        fsm.fire_event(&event("EVENT2")).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["Fired event1", "Fired event2"]);
        assert_eq!(fsm.transitions().len(), 1);
    }

    #[test]
    fn transition_runs_exit_before_entry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = State::builder()
            .name("first")
            .on_entry(log_hook(&log, "onEntry of first state"))
            .on_exit(log_hook(&log, "onExit of first state"))
            .build()
            .unwrap();
        let second = State::builder()
            .name("second")
            .on_entry(log_hook(&log, "onEntry of second state"))
            .on_exit(log_hook(&log, "onExit of second state"))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["onEntry of first state"]);

        fsm.transition_to(second.clone()).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "onEntry of first state",
                "onExit of first state",
                "onEntry of second state",
            ]
        );
        assert_eq!(fsm.current_state(), Some(&second));
        assert_eq!(fsm.transitions()[1], Transition::of(Some(first), second));
    }

    #[test]
    fn repeated_initial_state_behaves_like_transition() {
        let first = plain("first");
        let second = plain("second");

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        fsm.set_initial_state(second.clone()).unwrap();

        assert_eq!(
            fsm.transitions(),
            &[
                Transition::of(None, first.clone()),
                Transition::of(Some(first), second),
            ]
        );
    }

    #[test]
    fn self_transition_runs_both_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let idle = State::builder()
            .name("idle")
            .on_entry(log_hook(&log, "enter"))
            .on_exit(log_hook(&log, "exit"))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(idle.clone()).unwrap();
        fsm.transition_to(idle.clone()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["enter", "exit", "enter"]);
        assert_eq!(fsm.transitions()[1], Transition::of(Some(idle.clone()), idle));
    }

    #[test]
    fn failing_exit_hook_leaves_state_unchanged() {
        let first = State::builder()
            .name("first")
            .on_exit(|fsm| fsm.fire_event(&Event::of("MISSING").unwrap()))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        let err = fsm.transition_to(plain("second")).unwrap_err();

        assert!(matches!(err, FsmError::UnhandledEvent { .. }));
        assert_eq!(fsm.current_state(), Some(&first));
        assert_eq!(fsm.transitions().len(), 1);
    }

    #[test]
    fn failing_entry_hook_propagates_after_recording() {
        let broken = State::builder()
            .name("broken")
            .on_entry(|fsm| fsm.fire_event(&Event::of("MISSING").unwrap()))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        let err = fsm.set_initial_state(broken.clone()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(fsm.current_state(), Some(&broken));
        assert_eq!(fsm.transitions().len(), 1);
    }

    #[test]
    fn entry_hook_can_fire_next_event() {
        let next = event("NEXT");
        let end = plain("end");
        let target = end.clone();
        let fire = next.clone();
        let start = State::builder()
            .name("start")
            .on_entry(move |fsm| fsm.fire_event(&fire))
            .on_event(next, move |fsm| fsm.transition_to(target.clone()))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(start.clone()).unwrap();

        assert_eq!(fsm.current_state(), Some(&end));
        assert_eq!(
            fsm.transitions(),
            &[Transition::of(None, start.clone()), Transition::of(Some(start), end)]
        );
        assert_eq!(fsm.depth, 0);
    }

    fn ping_pong() -> (State, State) {
        let event1 = event("EVENT1");
        let event2 = event("EVENT2");
        let first_slot: Arc<OnceLock<State>> = Arc::new(OnceLock::new());
        let second_slot: Arc<OnceLock<State>> = Arc::new(OnceLock::new());

        let to_second = Arc::clone(&second_slot);
        let fire1 = event1.clone();
        let first = State::builder()
            .name("first")
            .on_entry(move |fsm| fsm.fire_event(&fire1))
            .on_event(event1, move |fsm| {
                fsm.transition_to(to_second.get().expect("second is built").clone())
            })
            .build()
            .unwrap();

        let to_first = Arc::clone(&first_slot);
        let fire2 = event2.clone();
        let second = State::builder()
            .name("second")
            .on_entry(move |fsm| fsm.fire_event(&fire2))
            .on_event(event2, move |fsm| {
                fsm.transition_to(to_first.get().expect("first is built").clone())
            })
            .build()
            .unwrap();

        first_slot.set(first.clone()).unwrap();
        second_slot.set(second.clone()).unwrap();
        (first, second)
    }

    #[test]
    fn mutual_recursion_exhausts_depth() {
        let (first, _second) = ping_pong();

        let mut fsm = Fsm::new();
        let err = fsm.set_initial_state(first).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
        assert_eq!(
            err,
            FsmError::RecursionLimit {
                limit: crate::machine::DEFAULT_MAX_DEPTH
            }
        );
        assert_eq!(fsm.depth, 0);
    }

    #[test]
    fn recursion_limit_counts_nested_operations() {
        let (first, second) = ping_pong();

        let mut fsm = Fsm::with_config(FsmConfig::new(8)).unwrap();
        let err = fsm.set_initial_state(first.clone()).unwrap_err();

        assert_eq!(err, FsmError::RecursionLimit { limit: 8 });
        // Transitions alternate with dispatches, so four of the eight
        // operations recorded a transition.
        assert_eq!(fsm.transitions().len(), 4);
        assert_eq!(fsm.history().path(), vec!["first", "second", "first", "second"]);
        assert_eq!(fsm.current_state(), Some(&second));
    }

    #[test]
    fn with_config_rejects_zero_depth() {
        let result = Fsm::with_config(FsmConfig::new(0));
        assert!(matches!(result, Err(FsmError::InvalidArgument { .. })));
    }

    #[test]
    fn can_handle_reflects_current_state() {
        let go = event("GO");
        let idle = State::builder()
            .name("idle")
            .on_event(go.clone(), |_| Ok(()))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        assert!(!fsm.can_handle(&go));
        fsm.set_initial_state(idle).unwrap();
        assert!(fsm.can_handle(&go));
        assert!(!fsm.can_handle(&event("STOP")));
    }

    #[test]
    fn states_are_shared_across_machines() {
        let end = plain("end");
        let target = end.clone();
        let go = event("GO");
        let start = State::builder()
            .name("start")
            .on_event(go.clone(), move |fsm| fsm.transition_to(target.clone()))
            .build()
            .unwrap();

        let mut a = Fsm::new();
        let mut b = Fsm::new();
        a.set_initial_state(start.clone()).unwrap();
        b.set_initial_state(start.clone()).unwrap();
        a.fire_event(&go).unwrap();

        assert_eq!(a.current_state(), Some(&end));
        assert_eq!(b.current_state(), Some(&start));
    }

    #[test]
    fn default_depth_fits_small_thread_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(512 * 1024)
            .spawn(|| {
                let (first, _second) = ping_pong();
                let mut fsm = Fsm::new();
                fsm.set_initial_state(first).map_err(|e| e.kind())
            })
            .unwrap();

        assert_eq!(handle.join().unwrap(), Err(ErrorKind::ResourceExhaustion));
    }

    #[test]
    fn exit_hook_transition_becomes_recorded_source() {
        let detour = plain("detour");
        let target = detour.clone();
        let detoured = Arc::new(AtomicBool::new(false));
        let once = Arc::clone(&detoured);
        let first = State::builder()
            .name("first")
            .on_exit(move |fsm| {
                if once.swap(true, Ordering::SeqCst) {
                    return Ok(());
                }
                fsm.transition_to(target.clone())
            })
            .build()
            .unwrap();
        let second = plain("second");

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        fsm.transition_to(second.clone()).unwrap();

        assert!(detoured.load(Ordering::SeqCst));
        assert_eq!(
            fsm.transitions(),
            &[
                Transition::of(None, first.clone()),
                Transition::of(Some(first), detour.clone()),
                Transition::of(Some(detour), second.clone()),
            ]
        );
        assert_eq!(fsm.current_state(), Some(&second));
    }

    #[test]
    fn unconditional_exit_hook_transition_exhausts_depth() {
        let detour = plain("detour");
        let first = State::builder()
            .name("first")
            .on_exit(move |fsm| fsm.transition_to(detour.clone()))
            .build()
            .unwrap();

        let mut fsm = Fsm::new();
        fsm.set_initial_state(first.clone()).unwrap();
        let err = fsm.transition_to(plain("second")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
        assert_eq!(fsm.current_state(), Some(&first));
        assert_eq!(fsm.history().path(), vec!["first"]);
        assert_eq!(fsm.depth, 0);
    }

    #[test]
    fn panicking_handler_releases_depth() {
        let boom = event("BOOM");
        let next = event("NEXT");
        let end = plain("end");
        let target = end.clone();
        let idle = State::builder()
            .name("idle")
            .on_event(boom.clone(), |_| panic!("handler failure"))
            .on_event(next.clone(), move |fsm| fsm.transition_to(target.clone()))
            .build()
            .unwrap();

        let mut fsm = Fsm::with_config(FsmConfig::new(2)).unwrap();
        fsm.set_initial_state(idle).unwrap();

        for _ in 0..3 {
            let caught = panic::catch_unwind(AssertUnwindSafe(|| fsm.fire_event(&boom)));
            assert!(caught.is_err());
        }

        assert_eq!(fsm.depth, 0);
        fsm.fire_event(&next).unwrap();
        assert_eq!(fsm.current_state(), Some(&end));
    }
}

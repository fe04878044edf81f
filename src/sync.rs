use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, info, warn};

use crate::cookies::{Cookie, CookieHost, DeleteOutcome, HostError, Subscription};
use crate::graph::{GraphStats, build_graph};
use crate::physics::{ForceSimulation, PriorLayout, SimulationConfig, TickStatus};
use crate::util::plural;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Failure,
}

/// Transient message shown over the graph until dismissed or replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DestructiveAction {
    DeleteAll,
    DeleteDomain(String),
}

impl DestructiveAction {
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteAll => "Delete ALL cookies?".to_owned(),
            Self::DeleteDomain(domain) => format!("Delete all cookies for {domain}?"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub events: usize,
    /// A new graph replaced the previous one; drags and selections that
    /// pointed into it must be revalidated.
    pub rebuilt: bool,
}

struct PendingSnapshot {
    generation: u64,
    rx: Receiver<Result<Vec<Cookie>, HostError>>,
}

struct PendingDelete {
    action: DestructiveAction,
    rx: Receiver<Result<DeleteOutcome, HostError>>,
}

/// Connects a cookie host to the graph for as long as the graph view is
/// visible. Every change notification triggers a full re-fetch and rebuild.
pub struct SyncController<H: CookieHost> {
    host: H,
    config: SimulationConfig,
    preserve_layout: bool,
    active: bool,
    subscription: Option<Subscription>,
    generation: u64,
    pending: Option<PendingSnapshot>,
    pending_delete: Option<PendingDelete>,
    confirmation: Option<DestructiveAction>,
    simulation: Option<ForceSimulation>,
    prior: PriorLayout,
    loaded: bool,
    stats: GraphStats,
    notice: Option<Notice>,
}

impl<H: CookieHost> SyncController<H> {
    pub fn new(host: H, config: SimulationConfig) -> Self {
        Self {
            host,
            config,
            preserve_layout: true,
            active: false,
            subscription: None,
            generation: 0,
            pending: None,
            pending_delete: None,
            confirmation: None,
            simulation: None,
            prior: PriorLayout::default(),
            loaded: false,
            stats: GraphStats::default(),
            notice: None,
        }
    }

    /// When disabled every rebuild starts from a fresh spiral layout.
    pub fn with_preserved_layout(mut self, preserve: bool) -> Self {
        self.preserve_layout = preserve;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }

        info!("cookie graph view activated");
        self.active = true;
        self.host.set_content_visible(false);
        self.subscription = Some(self.host.subscribe());
        self.request_snapshot();
    }

    /// Stops ticking and unsubscribes before returning. Requests still in
    /// flight are abandoned; their results are never applied.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        info!("cookie graph view deactivated");
        self.active = false;
        if let Some(mut simulation) = self.simulation.take() {
            simulation.stop();
            if self.preserve_layout {
                self.prior = simulation.prior_layout();
            }
        }
        if let Some(subscription) = self.subscription.take() {
            self.host.unsubscribe(subscription.id);
        }
        self.generation += 1;
        self.pending = None;
        self.pending_delete = None;
        self.confirmation = None;
        self.loaded = false;
        self.stats = GraphStats::default();
        self.host.set_content_visible(true);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reload(&mut self) {
        if self.active {
            self.request_snapshot();
        }
    }

    /// Supersedes any outstanding request: its receiver is dropped here, so
    /// a late answer has nowhere to land.
    fn request_snapshot(&mut self) {
        self.generation += 1;
        debug!(generation = self.generation, "requesting cookie snapshot");
        self.pending = Some(PendingSnapshot {
            generation: self.generation,
            rx: self.host.request_snapshot(),
        });
    }

    pub fn poll(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if !self.active {
            return outcome;
        }

        outcome.events = self.drain_change_events();
        let resubscribed = self.ensure_subscribed();
        if outcome.events > 0 || resubscribed {
            debug!(
                events = outcome.events,
                resubscribed, "cookies changed; refetching snapshot"
            );
            self.request_snapshot();
        }

        outcome.rebuilt = self.resolve_snapshot();
        self.resolve_delete();
        outcome
    }

    /// Changes made while the stream was closed were never seen, so a fresh
    /// subscription is followed by a full refetch.
    fn ensure_subscribed(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }

        info!("re-subscribing to cookie changes");
        self.subscription = Some(self.host.subscribe());
        true
    }

    fn drain_change_events(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_ref() else {
            return 0;
        };

        let mut count = 0;
        loop {
            match subscription.events.try_recv() {
                Ok(event) => {
                    debug!(
                        cookie = %event.cookie.name,
                        domain = %event.cookie.domain,
                        cause = %event.cause,
                        removed = event.removed,
                        "cookie changed"
                    );
                    count += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("cookie change stream closed by host");
                    self.subscription = None;
                    break;
                }
            }
        }
        count
    }

    fn resolve_snapshot(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match pending.rx.try_recv() {
            Ok(_) if pending.generation != self.generation => {
                debug!(generation = pending.generation, "discarding stale snapshot");
                false
            }
            Ok(Ok(cookies)) => self.rebuild(&cookies),
            Ok(Err(error)) => {
                warn!(%error, "cookie snapshot failed");
                self.notice = Some(Notice::failure(format!("Failed to load cookies: {error}")));
                false
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                false
            }
            Err(TryRecvError::Disconnected) => {
                warn!("cookie host dropped a snapshot request");
                self.notice = Some(Notice::failure("Cookie host did not answer"));
                false
            }
        }
    }

    fn rebuild(&mut self, cookies: &[Cookie]) -> bool {
        let graph = build_graph(cookies);
        let stats = graph.stats();

        let previous = self.simulation.take();
        if self.preserve_layout
            && let Some(previous) = &previous
        {
            self.prior = previous.prior_layout();
        }

        let next = if graph.is_empty() {
            None
        } else {
            match ForceSimulation::new(graph, self.config) {
                Ok(simulation) => Some(simulation.with_prior_layout(&self.prior)),
                Err(error) => {
                    warn!(%error, "refusing to simulate cookie graph");
                    self.notice = Some(Notice::failure(error.to_string()));
                    self.simulation = previous;
                    return false;
                }
            }
        };

        info!(
            cookies = stats.total_cookies,
            domains = stats.total_domains,
            links = stats.connections,
            "cookie graph rebuilt"
        );
        self.simulation = next;
        self.stats = stats;
        self.loaded = true;
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.kind == NoticeKind::Failure)
        {
            self.notice = None;
        }
        true
    }

    pub fn request_delete_all(&mut self) {
        self.confirmation = Some(DestructiveAction::DeleteAll);
    }

    pub fn request_delete_domain(&mut self, domain: &str) {
        self.confirmation = Some(DestructiveAction::DeleteDomain(domain.to_owned()));
    }

    pub fn pending_confirmation(&self) -> Option<&DestructiveAction> {
        self.confirmation.as_ref()
    }

    pub fn cancel_confirmation(&mut self) {
        self.confirmation = None;
    }

    /// Runs the staged destructive action. Returns false when nothing was
    /// staged or a delete is already in flight.
    pub fn confirm(&mut self) -> bool {
        if self.pending_delete.is_some() {
            return false;
        }
        let Some(action) = self.confirmation.take() else {
            return false;
        };

        info!(?action, "running confirmed cookie deletion");
        let rx = match &action {
            DestructiveAction::DeleteAll => self.host.delete_all(),
            DestructiveAction::DeleteDomain(domain) => self.host.delete_by_domain(domain),
        };
        self.pending_delete = Some(PendingDelete { action, rx });
        true
    }

    fn resolve_delete(&mut self) {
        let Some(pending) = self.pending_delete.take() else {
            return;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                self.pending_delete = Some(pending);
                return;
            }
            Err(TryRecvError::Disconnected) => Err(HostError::Unavailable(
                "delete request was dropped".to_owned(),
            )),
        };

        match result {
            Ok(DeleteOutcome {
                success: true,
                count,
            }) => {
                let scope = match &pending.action {
                    DestructiveAction::DeleteAll => String::new(),
                    DestructiveAction::DeleteDomain(domain) => format!(" from {domain}"),
                };
                self.notice = Some(Notice::info(format!(
                    "Deleted {}{scope}",
                    plural(count, "cookie", "cookies")
                )));
                self.request_snapshot();
            }
            Ok(DeleteOutcome { success: false, .. }) => {
                warn!(action = ?pending.action, "cookie host reported a failed delete");
                self.notice = Some(Notice::failure("Deleting cookies failed"));
            }
            Err(error) => {
                warn!(%error, action = ?pending.action, "cookie delete failed");
                self.notice = Some(Notice::failure(format!("Deleting cookies failed: {error}")));
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_deleting(&self) -> bool {
        self.pending_delete.is_some()
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn simulation(&self) -> Option<&ForceSimulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
        self.simulation.as_mut()
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.set_config(config);
        }
    }

    /// One simulation step; the host calls this once per rendered frame.
    pub fn tick(&mut self) -> TickStatus {
        match self.simulation.as_mut() {
            Some(simulation) if self.active => simulation.tick(),
            _ => TickStatus::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::mpsc::{self, Sender};

    use eframe::egui::vec2;

    use super::*;
    use crate::cookies::{CookieChangeEvent, SubscriptionId, test_cookie};
    use crate::interaction::InteractionController;

    type SnapshotSender = Sender<Result<Vec<Cookie>, HostError>>;
    type DeleteSender = Sender<Result<DeleteOutcome, HostError>>;

    /// Host whose requests stay unanswered until the test answers them.
    #[derive(Default)]
    struct FakeHost {
        state: RefCell<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        snapshots: Vec<SnapshotSender>,
        deletes: Vec<(Option<String>, DeleteSender)>,
        subscribers: Vec<(SubscriptionId, Sender<CookieChangeEvent>)>,
        unsubscribed: Vec<SubscriptionId>,
        visibility: Vec<bool>,
    }

    impl FakeHost {
        fn snapshot_requests(&self) -> usize {
            self.state.borrow().snapshots.len()
        }

        fn answer_snapshot(&self, request: usize, result: Result<Vec<Cookie>, HostError>) {
            let _ = self.state.borrow().snapshots[request].send(result);
        }

        fn answer_delete(&self, request: usize, result: Result<DeleteOutcome, HostError>) {
            let _ = self.state.borrow().deletes[request].1.send(result);
        }

        fn emit(&self, cookie: Cookie, removed: bool) {
            for (_, sender) in &self.state.borrow().subscribers {
                let _ = sender.send(CookieChangeEvent {
                    cookie: cookie.clone(),
                    cause: "explicit".to_owned(),
                    removed,
                });
            }
        }
    }

    impl CookieHost for FakeHost {
        fn request_snapshot(&self) -> Receiver<Result<Vec<Cookie>, HostError>> {
            let (tx, rx) = mpsc::channel();
            self.state.borrow_mut().snapshots.push(tx);
            rx
        }

        fn subscribe(&self) -> Subscription {
            let (tx, rx) = mpsc::channel();
            let mut state = self.state.borrow_mut();
            let id = state.subscribers.len() as SubscriptionId + 1;
            state.subscribers.push((id, tx));
            Subscription { id, events: rx }
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            let mut state = self.state.borrow_mut();
            state.subscribers.retain(|(existing, _)| *existing != id);
            state.unsubscribed.push(id);
        }

        fn delete_all(&self) -> Receiver<Result<DeleteOutcome, HostError>> {
            let (tx, rx) = mpsc::channel();
            self.state.borrow_mut().deletes.push((None, tx));
            rx
        }

        fn delete_by_domain(&self, domain: &str) -> Receiver<Result<DeleteOutcome, HostError>> {
            let (tx, rx) = mpsc::channel();
            self.state
                .borrow_mut()
                .deletes
                .push((Some(domain.to_owned()), tx));
            rx
        }

        fn set_content_visible(&self, visible: bool) {
            self.state.borrow_mut().visibility.push(visible);
        }
    }

    fn scenario() -> Vec<Cookie> {
        vec![
            test_cookie("a", "x.com"),
            test_cookie("b", "x.com"),
            test_cookie("c", "y.com"),
        ]
    }

    fn active_controller() -> SyncController<FakeHost> {
        let mut controller = SyncController::new(FakeHost::default(), SimulationConfig::default());
        controller.activate();
        controller
    }

    fn loaded_controller() -> SyncController<FakeHost> {
        let mut controller = active_controller();
        controller.host().answer_snapshot(0, Ok(scenario()));
        assert!(controller.poll().rebuilt);
        controller
    }

    fn stats(total_cookies: usize, total_domains: usize, connections: usize) -> GraphStats {
        GraphStats {
            total_cookies,
            total_domains,
            connections,
        }
    }

    #[test]
    fn activation_hides_content_and_builds_from_snapshot() {
        let mut controller = active_controller();
        assert_eq!(controller.host().state.borrow().visibility, vec![false]);
        assert_eq!(controller.host().state.borrow().subscribers.len(), 1);
        assert!(controller.is_loading());
        assert!(!controller.poll().rebuilt);

        controller.host().answer_snapshot(0, Ok(scenario()));
        assert!(controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(3, 2, 3));
        assert!(!controller.is_loading());

        let simulation = controller.simulation().unwrap();
        assert!(simulation.is_running());
        assert_eq!(simulation.graph().nodes.len(), 5);
    }

    #[test]
    fn activate_twice_subscribes_once() {
        let mut controller = active_controller();
        controller.activate();
        assert_eq!(controller.host().state.borrow().subscribers.len(), 1);
        assert_eq!(controller.host().snapshot_requests(), 1);
    }

    #[test]
    fn empty_snapshot_starts_no_engine() {
        let mut controller = active_controller();
        controller.host().answer_snapshot(0, Ok(Vec::new()));
        assert!(controller.poll().rebuilt);
        assert!(controller.has_loaded());
        assert!(controller.simulation().is_none());
        assert_eq!(controller.stats(), GraphStats::default());
        assert_eq!(controller.tick(), TickStatus::Stopped);
    }

    #[test]
    fn change_event_refetches_full_snapshot() {
        let mut controller = loaded_controller();
        controller.host().emit(test_cookie("d", "z.org"), false);

        let outcome = controller.poll();
        assert_eq!(outcome.events, 1);
        assert_eq!(controller.host().snapshot_requests(), 2);

        let mut cookies = scenario();
        cookies.push(test_cookie("d", "z.org"));
        controller.host().answer_snapshot(1, Ok(cookies));
        assert!(controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(4, 3, 4));
    }

    #[test]
    fn burst_of_events_triggers_one_refetch() {
        let mut controller = loaded_controller();
        for name in ["p", "q", "r"] {
            controller.host().emit(test_cookie(name, "x.com"), false);
        }
        assert_eq!(controller.poll().events, 3);
        assert_eq!(controller.host().snapshot_requests(), 2);
    }

    #[test]
    fn superseded_snapshot_never_overwrites_newer_graph() {
        let mut controller = active_controller();
        controller.host().emit(test_cookie("c", "y.com"), true);
        controller.poll();
        assert_eq!(controller.host().snapshot_requests(), 2);

        controller
            .host()
            .answer_snapshot(1, Ok(vec![test_cookie("c", "y.com")]));
        assert!(controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(1, 1, 1));

        controller.host().answer_snapshot(0, Ok(scenario()));
        assert!(!controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(1, 1, 1));
    }

    #[test]
    fn superseded_snapshot_answered_first_is_ignored() {
        let mut controller = active_controller();
        controller.host().emit(test_cookie("c", "y.com"), true);
        controller.poll();

        controller.host().answer_snapshot(0, Ok(scenario()));
        assert!(!controller.poll().rebuilt);
        assert!(!controller.has_loaded());

        controller
            .host()
            .answer_snapshot(1, Ok(vec![test_cookie("c", "y.com")]));
        assert!(controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(1, 1, 1));
    }

    #[test]
    fn deactivation_stops_unsubscribes_and_restores_content() {
        let mut controller = loaded_controller();
        controller.deactivate();

        let state = controller.host().state.borrow();
        assert_eq!(state.visibility, vec![false, true]);
        assert_eq!(state.unsubscribed, vec![1]);
        assert!(state.subscribers.is_empty());
        drop(state);

        assert!(!controller.is_active());
        assert!(controller.simulation().is_none());
        assert_eq!(controller.tick(), TickStatus::Stopped);
    }

    #[test]
    fn snapshot_resolving_after_deactivation_is_discarded() {
        let mut controller = active_controller();
        controller.deactivate();
        controller.host().answer_snapshot(0, Ok(scenario()));

        assert_eq!(controller.poll(), PollOutcome::default());
        assert!(controller.simulation().is_none());
        assert_eq!(controller.stats(), GraphStats::default());
    }

    #[test]
    fn reactivation_seeds_from_the_last_layout() {
        let mut controller = loaded_controller();
        for _ in 0..30 {
            controller.tick();
        }
        let domain = controller
            .simulation()
            .and_then(|simulation| simulation.node("domain:x.com"))
            .unwrap()
            .position;

        controller.deactivate();
        controller.activate();
        controller.host().answer_snapshot(1, Ok(scenario()));
        controller.poll();

        let reseeded = controller
            .simulation()
            .and_then(|simulation| simulation.node("domain:x.com"))
            .unwrap()
            .position;
        assert_eq!(reseeded, domain);
    }

    #[test]
    fn snapshot_failure_keeps_previous_graph() {
        let mut controller = loaded_controller();
        controller.reload();
        controller
            .host()
            .answer_snapshot(1, Err(HostError::Unavailable("offline".to_owned())));

        assert!(!controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(3, 2, 3));
        assert!(controller.simulation().is_some());
        assert_eq!(controller.notice().unwrap().kind, NoticeKind::Failure);

        controller.reload();
        controller.host().answer_snapshot(2, Ok(scenario()));
        controller.poll();
        assert!(controller.notice().is_none());
    }

    #[test]
    fn deletes_wait_for_confirmation() {
        let mut controller = loaded_controller();
        controller.request_delete_domain("x.com");
        assert_eq!(
            controller.pending_confirmation(),
            Some(&DestructiveAction::DeleteDomain("x.com".to_owned()))
        );
        assert!(controller.host().state.borrow().deletes.is_empty());

        controller.cancel_confirmation();
        assert!(!controller.confirm());
        assert!(controller.host().state.borrow().deletes.is_empty());

        controller.request_delete_all();
        assert!(controller.confirm());
        assert_eq!(controller.host().state.borrow().deletes[0].0, None);
        assert!(controller.pending_confirmation().is_none());
    }

    #[test]
    fn delete_by_domain_then_rebuild() {
        let mut controller = loaded_controller();
        controller.request_delete_domain("x.com");
        assert!(controller.confirm());
        assert!(controller.is_deleting());

        controller.host().answer_delete(
            0,
            Ok(DeleteOutcome {
                success: true,
                count: 2,
            }),
        );
        controller.poll();
        assert_eq!(
            controller.notice(),
            Some(&Notice::info("Deleted 2 cookies from x.com"))
        );
        assert_eq!(controller.host().snapshot_requests(), 2);

        controller
            .host()
            .answer_snapshot(1, Ok(vec![test_cookie("c", "y.com")]));
        assert!(controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(1, 1, 1));
    }

    #[test]
    fn failed_delete_leaves_graph_unchanged() {
        let mut controller = loaded_controller();
        controller.request_delete_all();
        controller.confirm();
        controller.host().answer_delete(
            0,
            Ok(DeleteOutcome {
                success: false,
                count: 0,
            }),
        );

        assert!(!controller.poll().rebuilt);
        assert_eq!(controller.stats(), stats(3, 2, 3));
        assert_eq!(controller.host().snapshot_requests(), 1);
        assert_eq!(controller.notice().unwrap().kind, NoticeKind::Failure);
    }

    #[test]
    fn closed_change_stream_is_reopened_and_refetched() {
        let mut controller = loaded_controller();
        controller.host().state.borrow_mut().subscribers.clear();

        assert_eq!(controller.poll().events, 0);
        assert!(controller.simulation().is_some());
        assert_eq!(controller.host().state.borrow().subscribers.len(), 1);
        assert_eq!(controller.host().snapshot_requests(), 2);

        controller.host().emit(test_cookie("d", "z.org"), false);
        assert_eq!(controller.poll().events, 1);
        assert_eq!(controller.host().snapshot_requests(), 3);
    }

    fn rebuild_without_first_cookie(
        controller: &mut SyncController<FakeHost>,
        interaction: &mut InteractionController,
    ) {
        controller.host().emit(test_cookie("a", "x.com"), true);
        controller.poll();
        controller.host().answer_snapshot(
            1,
            Ok(vec![test_cookie("b", "x.com"), test_cookie("c", "y.com")]),
        );
        assert!(controller.poll().rebuilt);
        interaction.carry_over(controller.simulation_mut());
    }

    #[test]
    fn selection_keeps_its_cookie_across_a_rebuild() {
        let mut controller = loaded_controller();
        let mut interaction = InteractionController::default();
        interaction.select(controller.simulation().unwrap(), "cookie:1");

        rebuild_without_first_cookie(&mut controller, &mut interaction);

        let selected = interaction
            .selected()
            .and_then(|id| controller.simulation()?.node(id))
            .and_then(|node| node.cookie_record())
            .map(|cookie| cookie.name.clone());
        assert_eq!(selected.as_deref(), Some("b"));
    }

    #[test]
    fn drag_keeps_its_pin_across_a_rebuild() {
        let mut controller = loaded_controller();
        let mut interaction = InteractionController::default();
        let pointer = vec2(64.0, -32.0);
        let simulation = controller.simulation_mut().unwrap();
        assert!(interaction.begin_drag(simulation, "cookie:1", pointer));

        rebuild_without_first_cookie(&mut controller, &mut interaction);

        let dragged = interaction.dragged_node().unwrap().to_owned();
        for _ in 0..5 {
            controller.tick();
            let node = controller.simulation().unwrap().node(&dragged).unwrap();
            assert_eq!(node.cookie_record().unwrap().name, "b");
            assert_eq!(node.position, pointer);
        }
    }
}

//! Tests for the optimistic move state machine.

use std::sync::Arc;

use async_trait::async_trait;
use rstest::rstest;
use tokio::sync::broadcast;
use tokio::sync::{Notify, Semaphore};

use super::fixtures::{admin, board_rig, code, column, employee, task_at};
use crate::board::adapters::memory::InMemoryBoardBackend;
use crate::board::domain::{RejectReason, StatusCode, StatusDefinition, Task, TaskId, Team};
use crate::board::ports::{BackendError, BackendResult, BoardBackend, TaskFilters};
use crate::board::services::{
    MoveError, MoveEvent, MoveIntent, MoveOutcome, OptimisticMutator, TaskStore,
};

/// Backend whose status updates block until the test releases them, so a
/// move can be observed while it is persisting.
#[derive(Debug)]
struct GatedBackend {
    inner: InMemoryBoardBackend,
    started: Notify,
    gate: Semaphore,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            inner: InMemoryBoardBackend::new(),
            started: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    async fn wait_for_update(&self) {
        self.started.notified().await;
    }

    fn release_update(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl BoardBackend for GatedBackend {
    async fn fetch_tasks(&self, filters: &TaskFilters) -> BackendResult<Vec<Task>> {
        self.inner.fetch_tasks(filters).await
    }

    async fn fetch_status_definitions(&self, team: Team) -> BackendResult<Vec<StatusDefinition>> {
        self.inner.fetch_status_definitions(team).await
    }

    async fn update_task_status(&self, id: TaskId, status: &StatusCode) -> BackendResult<()> {
        self.started.notify_one();
        let permit = self.gate.acquire().await.expect("gate stays open");
        permit.forget();
        self.inner.update_task_status(id, status).await
    }

    async fn delete_task(&self, id: TaskId) -> BackendResult<()> {
        self.inner.delete_task(id).await
    }
}

mockall::mock! {
    Backend {}

    #[async_trait]
    impl BoardBackend for Backend {
        async fn fetch_tasks(&self, filters: &TaskFilters) -> BackendResult<Vec<Task>>;
        async fn fetch_status_definitions(&self, team: Team) -> BackendResult<Vec<StatusDefinition>>;
        async fn update_task_status(&self, id: TaskId, status: &StatusCode) -> BackendResult<()>;
        async fn delete_task(&self, id: TaskId) -> BackendResult<()>;
    }
}

fn drain_events(receiver: &mut broadcast::Receiver<MoveEvent>) -> Vec<MoveEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn gated_rig(
    task: &Task,
) -> (
    TaskStore,
    Arc<GatedBackend>,
    OptimisticMutator<GatedBackend>,
) {
    let backend = Arc::new(GatedBackend::new());
    backend
        .inner
        .upsert_task(task.clone())
        .expect("seeding the gated backend succeeds");
    let store = TaskStore::new();
    store.insert(task.clone());
    let mutator = OptimisticMutator::new(store.clone(), Arc::clone(&backend));
    (store, backend, mutator)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_move_is_visible_locally_before_the_backend_resolves() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = gated_rig(&task);

    let mover = mutator.clone();
    let user = admin(Team::Creative);
    let request = tokio::spawn(async move {
        mover
            .request_move(MoveIntent::new(id, column(Team::Creative, "done"), user))
            .await
    });
    backend.wait_for_update().await;

    // The persistence call has started but not resolved; the local value
    // already shows the destination status.
    let held = store.get(id).expect("task held");
    assert_eq!(held.status(), &code("done"));
    assert!(store.is_in_flight(id));

    backend.release_update();
    let outcome = request
        .await
        .expect("request task completes")
        .expect("move succeeds");
    assert!(matches!(outcome, MoveOutcome::Committed(status) if status == code("done")));
    assert!(!store.is_in_flight(id));
    let confirmed = backend
        .inner
        .task(id)
        .expect("backend readable")
        .expect("task persisted");
    assert_eq!(confirmed.status(), &code("done"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_move_emits_validating_applied_committed() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (_store, _backend, mutator) = board_rig(std::slice::from_ref(&task));
    let mut events = mutator.subscribe_events();

    mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "done"),
            admin(Team::Creative),
        ))
        .await
        .expect("move succeeds");

    let seen = drain_events(&mut events);
    assert!(matches!(
        seen.as_slice(),
        [
            MoveEvent::Validating { .. },
            MoveEvent::Applied { status: applied, .. },
            MoveEvent::Committed { status: committed, .. },
        ] if applied == &code("done") && committed == &code("done")
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_move_never_reaches_the_backend() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let mut mock = MockBackend::new();
    mock.expect_update_task_status().never();
    let backend = Arc::new(mock);
    let store = TaskStore::new();
    store.insert(task);
    let mutator = OptimisticMutator::new(store.clone(), backend);
    let mut events = mutator.subscribe_events();

    let outcome = mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "done"),
            employee(Team::Creative, &["todo", "in_progress"]),
        ))
        .await
        .expect("rejection is a normal outcome");

    assert!(matches!(
        outcome,
        MoveOutcome::Rejected(RejectReason::PermissionDenied)
    ));
    let held = store.get(id).expect("task held");
    assert_eq!(held.status(), &code("todo"));
    assert!(!store.is_in_flight(id));
    let seen = drain_events(&mut events);
    assert!(matches!(
        seen.as_slice(),
        [
            MoveEvent::Validating { .. },
            MoveEvent::Rejected {
                reason: RejectReason::PermissionDenied,
                ..
            },
        ]
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn no_change_move_triggers_no_persistence_and_no_apply_events() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = board_rig(std::slice::from_ref(&task));
    let mut events = mutator.subscribe_events();

    let outcome = mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "todo"),
            admin(Team::Creative),
        ))
        .await
        .expect("no-op move succeeds");

    assert!(matches!(outcome, MoveOutcome::NoChange));
    assert!(
        backend
            .update_calls()
            .expect("backend readable")
            .is_empty()
    );
    assert!(!store.is_in_flight(id));
    let seen = drain_events(&mut events);
    assert!(matches!(seen.as_slice(), [MoveEvent::Validating { .. }]));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_persistence_rolls_back_to_the_exact_prior_status() {
    let task = task_at(Team::Creative, "in_progress", "Poster", 0);
    let bystander = task_at(Team::Creative, "todo", "Bystander", 1);
    let id = task.id();
    let bystander_id = bystander.id();
    let (store, backend, mutator) = board_rig(&[task, bystander]);
    let mut events = mutator.subscribe_events();
    backend
        .fail_next_update(BackendError::transport(std::io::Error::other(
            "connection reset",
        )))
        .expect("failure scripted");

    let outcome = mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "done"),
            admin(Team::Creative),
        ))
        .await
        .expect("rollback is a normal outcome");

    assert!(matches!(outcome, MoveOutcome::RolledBack(_)));
    let held = store.get(id).expect("task held");
    assert_eq!(held.status(), &code("in_progress"));
    assert!(!store.is_in_flight(id));
    let untouched = store.get(bystander_id).expect("bystander held");
    assert_eq!(untouched.status(), &code("todo"));
    let seen = drain_events(&mut events);
    assert!(matches!(
        seen.as_slice(),
        [
            MoveEvent::Validating { .. },
            MoveEvent::Applied { .. },
            MoveEvent::RolledBack { restored, .. },
        ] if restored == &code("in_progress")
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rolled_back_move_can_be_retried_with_a_fresh_intent() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = board_rig(std::slice::from_ref(&task));
    backend
        .fail_next_update(BackendError::Rejected("maintenance window".to_owned()))
        .expect("failure scripted");
    let intent = MoveIntent::new(id, column(Team::Creative, "done"), admin(Team::Creative));

    let first = mutator
        .request_move(intent.clone())
        .await
        .expect("rollback is a normal outcome");
    assert!(matches!(first, MoveOutcome::RolledBack(_)));

    let second = mutator.request_move(intent).await.expect("retry succeeds");
    assert!(matches!(second, MoveOutcome::Committed(_)));
    let held = store.get(id).expect("task held");
    assert_eq!(held.status(), &code("done"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queued_intent_is_revalidated_after_the_in_flight_move_resolves() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = gated_rig(&task);
    let user = admin(Team::Creative);

    let mover = mutator.clone();
    let first_user = user.clone();
    let request = tokio::spawn(async move {
        mover
            .request_move(MoveIntent::new(
                id,
                column(Team::Creative, "in_progress"),
                first_user,
            ))
            .await
    });
    backend.wait_for_update().await;

    // Two re-drags while the first move persists; only the latest survives.
    let replaced = mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "done"),
            user.clone(),
        ))
        .await
        .expect("queued outcome");
    assert!(matches!(replaced, MoveOutcome::Queued));
    let latest = mutator
        .request_move(MoveIntent::new(id, column(Team::Creative, "todo"), user))
        .await
        .expect("queued outcome");
    assert!(matches!(latest, MoveOutcome::Queued));

    backend.release_update();
    // The drained intent persists again and blocks on the gate once more.
    backend.wait_for_update().await;
    backend.release_update();

    let first = request
        .await
        .expect("request task completes")
        .expect("first move succeeds");
    assert!(matches!(first, MoveOutcome::Committed(status) if status == code("in_progress")));

    let held = store.get(id).expect("task held");
    assert_eq!(held.status(), &code("todo"));
    assert!(!store.is_in_flight(id));

    // The replaced middle intent never reached the backend.
    let calls = backend.inner.update_calls().expect("backend readable");
    let sent: Vec<&str> = calls.iter().map(|(_, status)| status.as_str()).collect();
    assert_eq!(sent, vec!["in_progress", "todo"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cancels_its_queued_and_in_flight_work() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = gated_rig(&task);
    let user = admin(Team::Creative);

    let mover = mutator.clone();
    let first_user = user.clone();
    let request = tokio::spawn(async move {
        mover
            .request_move(MoveIntent::new(
                id,
                column(Team::Creative, "in_progress"),
                first_user,
            ))
            .await
    });
    backend.wait_for_update().await;

    let queued = mutator
        .request_move(MoveIntent::new(id, column(Team::Creative, "done"), user))
        .await
        .expect("queued outcome");
    assert!(matches!(queued, MoveOutcome::Queued));

    mutator.delete_task(id).await.expect("delete succeeds");
    assert!(!store.contains(id));

    let mut events = mutator.subscribe_events();
    backend.release_update();
    let outcome = request
        .await
        .expect("request task completes")
        .expect("resolution is a normal outcome");

    // The update hit a deleted task; the rollback is an id-addressed no-op
    // and the queued intent was dropped rather than drained.
    assert!(matches!(outcome, MoveOutcome::RolledBack(_)));
    assert!(!store.contains(id));
    assert!(drain_events(&mut events).is_empty());
    let calls = backend.inner.update_calls().expect("backend readable");
    assert_eq!(calls.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_locally_even_when_the_backend_refuses() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let id = task.id();
    let (store, backend, mutator) = board_rig(std::slice::from_ref(&task));
    backend
        .fail_next_delete(BackendError::transport(std::io::Error::other(
            "connection reset",
        )))
        .expect("failure scripted");

    let result = mutator.delete_task(id).await;

    assert!(result.is_err());
    assert!(!store.contains(id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_an_unknown_task_is_an_error() {
    let (_store, _backend, mutator) = board_rig(&[]);
    let id = TaskId::new();

    let result = mutator
        .request_move(MoveIntent::new(
            id,
            column(Team::Creative, "done"),
            admin(Team::Creative),
        ))
        .await;

    assert!(matches!(result, Err(MoveError::UnknownTask(unknown)) if unknown == id));
}

//! Tests for the move decision function.

use super::fixtures::{admin, code, column, employee, task_at};
use crate::board::domain::{MoveDecision, RejectReason, Team, validate};
use rstest::rstest;

#[rstest]
fn cross_team_destination_is_rejected() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let user = admin(Team::Creative);

    let decision = validate(&task, &column(Team::Web, "todo"), &user);

    assert_eq!(decision, MoveDecision::Reject(RejectReason::CrossTeam));
    assert_eq!(task.status(), &code("todo"));
}

#[rstest]
fn cross_team_wins_over_permission_when_both_apply() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    // The user could not act on the web column either; the cross-team rule
    // is evaluated first.
    let user = employee(Team::Creative, &["todo"]);

    let decision = validate(&task, &column(Team::Web, "deploy"), &user);

    assert_eq!(decision, MoveDecision::Reject(RejectReason::CrossTeam));
}

#[rstest]
fn disallowed_status_is_rejected_for_employees() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let user = employee(Team::Creative, &["todo", "in_progress"]);

    let decision = validate(&task, &column(Team::Creative, "done"), &user);

    assert_eq!(
        decision,
        MoveDecision::Reject(RejectReason::PermissionDenied)
    );
}

#[rstest]
fn the_identical_move_succeeds_for_an_admin() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let user = admin(Team::Creative);

    let decision = validate(&task, &column(Team::Creative, "done"), &user);

    assert_eq!(decision, MoveDecision::Apply(code("done")));
}

#[rstest]
fn destination_matching_current_status_is_no_change() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let user = employee(Team::Creative, &["todo"]);

    let decision = validate(&task, &column(Team::Creative, "todo"), &user);

    assert_eq!(decision, MoveDecision::NoChange);
}

#[rstest]
fn accepted_move_carries_the_destination_status() {
    let task = task_at(Team::Creative, "todo", "Poster", 0);
    let user = employee(Team::Creative, &["todo", "in_progress"]);

    let decision = validate(&task, &column(Team::Creative, "in_progress"), &user);

    assert_eq!(decision, MoveDecision::Apply(code("in_progress")));
}

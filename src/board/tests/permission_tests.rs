//! Tests for the permission gate.

use super::fixtures::{admin, code, employee};
use crate::board::domain::{ParseRoleError, ParseTeamError, Role, Team};
use rstest::rstest;

#[rstest]
#[case(Team::Creative, "todo")]
#[case(Team::Creative, "never_granted")]
#[case(Team::Web, "deploy")]
fn admin_can_act_on_any_team_and_status(#[case] team: Team, #[case] status: &str) {
    let user = admin(Team::Creative);

    assert!(user.can_act(&code(status), team));
}

#[rstest]
#[case("todo", true)]
#[case("in_progress", true)]
#[case("done", false)]
fn employee_action_is_gated_by_allowed_statuses(#[case] status: &str, #[case] expected: bool) {
    let user = employee(Team::Creative, &["todo", "in_progress"]);

    assert_eq!(user.can_act(&code(status), Team::Creative), expected);
}

#[rstest]
fn employee_cannot_act_across_teams_even_with_allowed_status() {
    let user = employee(Team::Creative, &["todo"]);

    assert!(!user.can_act(&code("todo"), Team::Web));
}

#[rstest]
fn visibility_is_open_within_the_team_regardless_of_allowed_set() {
    let user = employee(Team::Creative, &["todo"]);

    // "done" is not in the allowed set; the column is still visible.
    assert!(user.can_view_column(Team::Creative));
    assert!(!user.can_act(&code("done"), Team::Creative));
}

#[rstest]
fn visibility_is_denied_outside_the_team_for_non_admins() {
    let user = employee(Team::Creative, &["todo"]);

    assert!(!user.can_view_column(Team::Web));
    assert!(admin(Team::Creative).can_view_column(Team::Web));
}

#[rstest]
#[case("admin", Role::Admin)]
#[case(" Manager ", Role::Manager)]
#[case("EMPLOYEE", Role::Employee)]
fn role_parsing_normalizes_case_and_whitespace(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(Role::try_from(raw), Ok(expected));
}

#[rstest]
fn role_parsing_rejects_unknown_values() {
    assert_eq!(
        Role::try_from("owner"),
        Err(ParseRoleError("owner".to_owned()))
    );
}

#[rstest]
#[case("creative", Team::Creative)]
#[case(" Web ", Team::Web)]
fn team_parsing_normalizes_case_and_whitespace(#[case] raw: &str, #[case] expected: Team) {
    assert_eq!(Team::try_from(raw), Ok(expected));
}

#[rstest]
fn team_parsing_rejects_unknown_values() {
    assert_eq!(
        Team::try_from("sales"),
        Err(ParseTeamError("sales".to_owned()))
    );
}

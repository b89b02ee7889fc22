//! Tests for the column projection.

use super::fixtures::{code, creative_vocabulary, task_at};
use crate::board::domain::{Team, all_visible, project};
use rstest::rstest;

#[rstest]
fn builds_columns_in_vocabulary_order_with_tasks_in_input_order() {
    let vocabulary = creative_vocabulary();
    let tasks = vec![
        task_at(Team::Creative, "in_progress", "Banner artwork", 0),
        task_at(Team::Creative, "todo", "Logo refresh", 1),
        task_at(Team::Creative, "in_progress", "Brand guide", 2),
    ];

    let columns = project(&vocabulary, &tasks, all_visible);

    let codes: Vec<&str> = columns
        .iter()
        .map(|column| column.definition().code().as_str())
        .collect();
    assert_eq!(codes, vec!["todo", "in_progress", "done"]);

    let in_progress = columns
        .iter()
        .find(|column| column.definition().code() == &code("in_progress"))
        .expect("in_progress column exists");
    let titles: Vec<&str> = in_progress
        .tasks()
        .iter()
        .map(crate::board::domain::Task::title)
        .collect();
    assert_eq!(titles, vec!["Banner artwork", "Brand guide"]);
    assert_eq!(in_progress.count(), 2);

    let done = columns
        .iter()
        .find(|column| column.definition().code() == &code("done"))
        .expect("done column exists");
    assert_eq!(done.count(), 0);
}

#[rstest]
fn permission_filter_hides_columns_but_not_their_neighbours() {
    let vocabulary = creative_vocabulary();
    let tasks = vec![task_at(Team::Creative, "done", "Shipped piece", 0)];
    let hidden = code("in_progress");

    let columns = project(&vocabulary, &tasks, |status| status != &hidden);

    let codes: Vec<&str> = columns
        .iter()
        .map(|column| column.definition().code().as_str())
        .collect();
    assert_eq!(codes, vec!["todo", "done"]);
    let done = columns.last().expect("done column exists");
    assert_eq!(done.count(), 1);
}

#[rstest]
fn task_with_status_outside_vocabulary_is_excluded() {
    let vocabulary = creative_vocabulary();
    let tasks = vec![
        task_at(Team::Creative, "archived", "Orphaned item", 0),
        task_at(Team::Creative, "todo", "Valid item", 1),
    ];

    let columns = project(&vocabulary, &tasks, all_visible);

    let total: usize = columns.iter().map(crate::board::domain::Column::count).sum();
    assert_eq!(total, 1);
}

#[rstest]
fn empty_vocabulary_projects_to_an_empty_board() {
    let tasks = vec![task_at(Team::Creative, "todo", "Unplaceable", 0)];

    let columns = project(&[], &tasks, all_visible);

    assert!(columns.is_empty());
}

#[rstest]
fn identical_inputs_yield_identical_projections() {
    let vocabulary = creative_vocabulary();
    let tasks = vec![
        task_at(Team::Creative, "todo", "First", 0),
        task_at(Team::Creative, "done", "Second", 1),
    ];

    let first = project(&vocabulary, &tasks, all_visible);
    let second = project(&vocabulary, &tasks, all_visible);

    assert_eq!(first, second);
}

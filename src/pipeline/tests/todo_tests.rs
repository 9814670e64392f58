//! Todo aggregate behaviour and ledger statistics.

use crate::pipeline::domain::{
    PipelineDomainError, RowId, SpreadsheetId, Todo, TodoChanges, TodoDetails, TodoPriority,
    TodoStats, TodoTitle,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn todo() -> Todo {
    Todo::new(
        SpreadsheetId::new(),
        Some(RowId::new()),
        TodoTitle::new("Run proof of concept").expect("valid title"),
        TodoDetails::default(),
        None,
        &DefaultClock,
    )
}

#[rstest]
fn blank_title_is_rejected() {
    assert_eq!(TodoTitle::new("   "), Err(PipelineDomainError::EmptyTodoTitle));
}

#[rstest]
#[case("LOW", TodoPriority::Low)]
#[case(" medium ", TodoPriority::Medium)]
#[case("high", TodoPriority::High)]
fn priority_parses_case_insensitively(#[case] raw: &str, #[case] expected: TodoPriority) {
    assert_eq!(TodoPriority::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_priority_is_rejected() {
    assert!(TodoPriority::try_from("urgent").is_err());
}

#[rstest]
fn new_todo_starts_open_with_medium_priority(todo: Todo) {
    assert!(!todo.is_completed());
    assert_eq!(todo.priority(), TodoPriority::Medium);
}

#[rstest]
fn toggle_flips_completion(mut todo: Todo) {
    todo.toggle(&DefaultClock);
    assert!(todo.is_completed());

    todo.toggle(&DefaultClock);
    assert!(!todo.is_completed());
}

#[rstest]
fn apply_clears_optional_fields(mut todo: Todo) {
    todo.apply(
        TodoChanges {
            description: Some(Some("Book lab time".to_owned())),
            ..TodoChanges::default()
        },
        &DefaultClock,
    );
    assert_eq!(todo.description(), Some("Book lab time"));

    todo.apply(
        TodoChanges {
            description: Some(None),
            priority: Some(TodoPriority::High),
            ..TodoChanges::default()
        },
        &DefaultClock,
    );
    assert_eq!(todo.description(), None);
    assert_eq!(todo.priority(), TodoPriority::High);
}

#[rstest]
fn unbind_row_makes_todo_pipeline_level(mut todo: Todo) {
    let at = todo.updated_at();
    todo.unbind_row(at);

    assert_eq!(todo.row_id(), None);
}

#[rstest]
fn stats_count_completion_and_priority() {
    let sheet = SpreadsheetId::new();
    let make = |priority: TodoPriority, done: bool| {
        let mut todo = Todo::new(
            sheet,
            None,
            TodoTitle::new("Follow up").expect("valid title"),
            TodoDetails {
                priority,
                ..TodoDetails::default()
            },
            None,
            &DefaultClock,
        );
        todo.set_completed(done, &DefaultClock);
        todo
    };
    let todos = vec![
        make(TodoPriority::High, true),
        make(TodoPriority::High, false),
        make(TodoPriority::Low, false),
    ];

    let stats = TodoStats::from_todos(&todos);

    assert_eq!(
        stats,
        TodoStats {
            total: 3,
            completed: 1,
            pending: 2,
            high_priority: 2,
            medium_priority: 0,
            low_priority: 1,
        }
    );
}

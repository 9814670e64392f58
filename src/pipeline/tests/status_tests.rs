//! Status derivation from todo counts.

use crate::pipeline::domain::{RowCompletion, TechnicalWinStatus};
use rstest::rstest;

#[rstest]
#[case(0, 0, 0, TechnicalWinStatus::NoTodos)]
#[case(3, 0, 0, TechnicalWinStatus::InProgress)]
#[case(3, 1, 33, TechnicalWinStatus::InProgress)]
#[case(3, 2, 67, TechnicalWinStatus::InProgress)]
#[case(3, 3, 100, TechnicalWinStatus::Completed)]
#[case(8, 1, 13, TechnicalWinStatus::InProgress)]
#[case(2, 1, 50, TechnicalWinStatus::InProgress)]
fn completion_rounds_half_up(
    #[case] total: usize,
    #[case] completed: usize,
    #[case] percentage: u8,
    #[case] status: TechnicalWinStatus,
) {
    let completion = RowCompletion::from_counts(total, completed);

    assert_eq!(completion.percentage(), percentage);
    assert_eq!(completion.status(), status);
}

#[rstest]
fn completed_count_is_clamped_to_total() {
    let completion = RowCompletion::from_counts(2, 5);

    assert_eq!(completion.completed(), 2);
    assert_eq!(completion.status(), TechnicalWinStatus::Completed);
}

#[rstest]
#[case(TechnicalWinStatus::NoTodos, "No Todos")]
#[case(TechnicalWinStatus::InProgress, "In Progress")]
#[case(TechnicalWinStatus::Completed, "Completed")]
fn labels_match_row_attribute_values(#[case] status: TechnicalWinStatus, #[case] label: &str) {
    assert_eq!(status.label(), label);
}

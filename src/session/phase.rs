use serde::{Deserialize, Serialize};

/// Lifecycle of one interview session
///
/// `Idle` is the initial state; `Completed` is terminal until a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    QuestionsLoading,
    AwaitingStart,
    Recording,
    Analyzing,
    ReportPending,
    Completed,
}

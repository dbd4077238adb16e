//! Repositories for the quiz tables.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`.
//! Multi-statement writes open their own transaction through
//! [`in_transaction`](super::connection::in_transaction), so callers must
//! not wrap them in an outer one.

pub mod question;
pub mod quiz;
pub mod theme;

pub use question::QuestionRepo;
pub use quiz::QuizRepo;
pub use theme::ThemeRepo;

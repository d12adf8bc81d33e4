//! Port contracts for the board.

pub mod repository;

#[cfg(test)]
pub use repository::MockBoardRepository;
pub use repository::{BoardRepository, BoardRepositoryError, BoardRepositoryResult};

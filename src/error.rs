use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Error {
    /// pop / peek / find_min / extract_min on a container with no elements
    #[error("container is empty")]
    EmptyContainer,

    /// decrease_key was asked to increase a key
    #[error("new key is greater than the current key")]
    InvalidKeyOrdering,

    /// the handle's node was already removed by extract_min or delete
    #[error("handle refers to a node that is no longer in the heap")]
    StaleHandle,
}

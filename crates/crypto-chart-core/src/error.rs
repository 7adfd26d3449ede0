use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Invalid moving-average window: {0} (must be at least 1)")]
    InvalidWindow(usize),
}

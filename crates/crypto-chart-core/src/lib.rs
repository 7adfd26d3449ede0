pub mod candle;
pub mod error;
pub mod indicators;
pub mod range;
pub mod table;

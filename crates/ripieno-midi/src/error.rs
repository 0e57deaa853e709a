//! Error types for ripieno-midi.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid MIDI channel: {0}. Must be between 0 and 15")]
    InvalidChannel(i32),

    #[error("Invalid MIDI data byte: {0}. Must be between 0 and 127")]
    InvalidDataByte(u8),

    #[error("Event queue full ({capacity} events)")]
    QueueFull { capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

//! File-system adapters.

mod atomic_io;
mod json_file_message_repository;

pub use json_file_message_repository::JsonFileMessageRepository;

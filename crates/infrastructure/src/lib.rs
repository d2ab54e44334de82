//! Infrastructure adapters for registration ports.

#![forbid(unsafe_code)]

mod in_memory_member_directory;
mod in_memory_submission_sink;
mod json_file_loader;
mod json_lines_submission_sink;

pub use in_memory_member_directory::InMemoryMemberDirectory;
pub use in_memory_submission_sink::InMemorySubmissionSink;
pub use json_file_loader::{read_form_definition, read_form_values};
pub use json_lines_submission_sink::JsonLinesSubmissionSink;

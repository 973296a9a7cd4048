pub mod definition;
pub mod element;
pub mod errors;
pub mod indices;
pub mod lexical;

pub use definition::{enum_pattern, variable_pattern, DefinitionKind, DefinitionMatch};
pub use element::{element_span, find_index};
pub use errors::LocateError;
pub use indices::{enum_value, index_tokens, parse_indices};
pub use lexical::blank_comments;

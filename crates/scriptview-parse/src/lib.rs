mod element;
mod parse;

pub use element::{classify_element, DropReason, ElementVerdict};
pub use parse::{parse_script, parse_script_with_stats, ParseStats};

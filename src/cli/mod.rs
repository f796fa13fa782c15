//! Command Line Interface module
//!
//! - `lookup`: Flags, option merging and the one-shot batch lookup
//! - `interactive`: Prompt loop used when no words are given

pub mod interactive;
pub mod lookup;

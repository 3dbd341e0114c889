//! jscript_scanner: Tokenizer for jscript source text.
//!
//! Produces tokens lazily from an in-memory string or a streaming byte
//! source, with:
//! - Unicode-aware whitespace, line terminators and identifiers
//! - `\uXXXX` escapes in identifiers and the full string escape set
//! - decimal, hexadecimal and legacy octal numbers
//! - regular expression literals in regex-allowed positions
//! - single-token pushback and checkpoint/rewind for lookahead

mod char_codes;
mod scanner;
mod source;
mod token;

pub use char_codes::{is_identifier_part, is_identifier_start};
pub use scanner::{Checkpoint, Scanner};
pub use source::SourceBuffer;
pub use token::{Token, TokenFlags};

//! # Streaming Scan
//!
//! Sequential search over the whole corpus with bounded memory.
//!
//! ```text
//! chunk 1: "00000001|GAR"          carry: "00000001|GAR"
//! chunk 2: "CIA|LOPEZ\n0000"       line:  "00000001|GARCIA|LOPEZ"   carry: "0000"
//! chunk 3: "0002|PEREZ\n"          line:  "00000002|PEREZ"          carry: ""
//! ```
//!
//! Only the carry-over fragment and one chunk are resident at a time. The
//! scan stops pulling chunks as soon as the result quota is met, and the
//! stream (with its connection) is dropped on every exit path.

mod engine;
mod lines;

pub use engine::{MatchScope, ScanEngine, SearchQuery};
pub use lines::{complete_lines, LineAssembler};

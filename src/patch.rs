//! Unified diff application: external tool first, manual parse-and-apply second.
//!
//! ```text
//! --- a/src/lib.rs
//! +++ b/src/lib.rs
//! @@ -1,3 +1,3 @@
//!  one
//! -two
//! +TWO
//!  three
//! ```
mod applying;
mod error;
mod external;
mod filesystem;
mod model;
mod orchestrator;
mod outcome;
mod parsing;
mod preview;
mod text;

pub use applying::{ContextPolicy, apply_all_hunks, apply_hunk, apply_hunk_at};
pub use error::{ExternalFailure, HunkError, HunkFailure, ParseError, ParseWarning, PatchError};
pub use external::{Disabled, ExternalApply, GitApply};
pub use model::{FileChange, FileKind, Hunk, HunkLine, PatchDocument};
pub use orchestrator::{PatchOrchestrator, apply};
pub use outcome::{ApplyMethod, ApplyResult, FailReason, FileOutcome, SkipReason};
pub use parsing::{normalize_input, parse_diff};
pub use preview::summarize;

//! # world-canon
//!
//! Canon: the accumulated, agreed-upon facts about story entities across a
//! project's episodes, and the gates that keep new material consistent
//! with it.
//!
//! ## Architecture
//!
//! ```text
//! Canon                 ← immutable value; Arc-shared entity records
//!     │
//! CanonDiff             ← proposed partial update (added/modified facts)
//!     │
//! apply_canon_diff      ← structural check → hard-contradiction check → pure merge
//!     │
//! evaluate_shotlist     ← allow/deny over a ShotList, priority-ordered reasons
//! validate_draft        ← Script draft vs canon → CanonViolationReport
//! ```
//!
//! Nothing here holds process-wide state: callers own the
//! load → apply → save lifecycle and pass canon values explicitly.

pub mod canon;
pub mod decision;
pub mod diff;
pub mod draft;
pub mod error;
pub mod gate;
pub mod policy;

pub use canon::{Canon, EntityRecord, HardField, is_valid_entity_id};
pub use decision::{
    CANON_CONTRADICTION, CanonDecision, DECISION_SCHEMA_ID, DECISION_SCHEMA_VERSION,
    FORBIDDEN_TOKEN, Producer, ShotSignal, Verdict, assert_shotlist_canon, evaluate_shotlist,
    scan_shot,
};
pub use diff::{CanonDiff, DiffError, DiffOutcome, apply_canon_diff, apply_diff};
pub use draft::{DraftGateOutcome, validate_draft, validate_draft_value};
pub use error::{CanonError, DecisionError, PolicyError};
pub use gate::check_hard_contradictions;
pub use policy::{DEFAULT_FORBIDDEN_TOKEN, DecisionPolicy};

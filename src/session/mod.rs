//! Session stage machine — the linear intake wizard core.
//!
//! A session is a single value that accumulates the lead record as the user
//! walks landing → pay → auth → survey → report → done. Transitions are
//! explicit user actions; the machine is pure and hands side-effect
//! requests back to the caller.

pub mod machine;
pub mod model;
pub mod stage;

pub use machine::apply;
pub use model::{Action, Answer, Effect, Identity, Referral, Session};
pub use stage::Stage;

//! Combat resolution pipeline.
//!
//! [`resolve`] settles one action against one collided target. The pure
//! pieces it is built from (parry roll, aggro formula, knockback distance,
//! reward scaling, result descriptors) are public so hosts and tests can use
//! them directly.
mod aggro;
mod defeat;
mod knockback;
mod parry;
mod report;
mod resolve;
mod retaliation;

pub use aggro::{AggroModifiers, hit_aggro};
pub use defeat::{member_share, scale_reward};
pub use knockback::{knockback_tiles, push};
pub use parry::{ParryOutcome, bypasses_parry, hit_roll, parry_rate, roll_parry};
pub use report::{LogEntry, PopupDescriptor, PopupKind, skill_narration, skill_popups};

pub(crate) use defeat::handle_defeat;
pub(crate) use resolve::resolve;

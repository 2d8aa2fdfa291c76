//! Entities - immutable game content shared between characters

mod ancestry;
mod path;
mod spell;

pub use ancestry::{Ancestry, ANCESTRY_MODIFIER_LEVEL, INITIAL_CHOICE_LEVEL};
pub use path::{Path, PathTier};
pub use spell::{Spell, SpellTradition, SpellType};

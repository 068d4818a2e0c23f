//! Entity schema: scientists, planets and the missions that join them.
//!
//! Every field assignment goes through a validator, on create and on update, before the store
//! sees the value.

pub mod fields;
mod mission;
mod planet;
mod scientist;

pub use fields::{body_to_map, FieldMap};
pub use mission::{Mission, MissionPatch, NewMission};
pub use planet::{NewPlanet, Planet, PlanetPatch};
pub use scientist::{NewScientist, Scientist, ScientistPatch};

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Scientist,
    Planet,
    Mission,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Scientist => "Scientist",
            EntityKind::Planet => "Planet",
            EntityKind::Mission => "Mission",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Scientist => "scientists",
            EntityKind::Planet => "planets",
            EntityKind::Mission => "missions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Host boundary traits: the engine only talks to its environment through these.

pub mod clock;
pub mod feedback;
pub mod input;
pub mod suspension;

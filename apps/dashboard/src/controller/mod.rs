//! Controller layer: error classification for the shell's status banner.

pub mod events;

pub mod engine;

pub use engine::{GoalTrackPurge, HabitRhythmEngine};

pub mod workout;

pub use workout::{Exercise, ExerciseId, LoggedSet, SessionId, SetId, SubjectId, WorkoutSession};

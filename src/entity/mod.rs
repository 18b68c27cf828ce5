//! Database entity models for workout-tracker-store.
//!
//! This module contains the Sea-ORM entity definitions for every table the
//! crate reads or writes. The current schema is split into user data
//! (`user`, `accountability_partner`), the exercise library (`exercise`),
//! user-authored plans (`workout_template`, `workout_exercise`) and tracked
//! runs of those plans (`workout_session`, `workout_set`).
//!
//! The `legacy` module holds the deprecated table shapes that are only read
//! by the legacy upgrade in [`crate::upgrade`].

/// Symmetric accountability-partner join rows between two users.
pub mod accountability_partner;

/// Exercise library entries, populated by the asset importer.
pub mod exercise;

/// Deprecated table shapes kept as upgrade sources.
pub mod legacy;

/// Registered users.
pub mod user;

/// Ordered exercise entries owned by a workout template.
pub mod workout_exercise;

/// One dated run-through of a workout template.
pub mod workout_session;

/// Performed values for one set inside a workout session.
pub mod workout_set;

/// User-authored workout plans.
pub mod workout_template;

pub use accountability_partner::Entity as AccountabilityPartner;
pub use exercise::Entity as Exercise;
pub use user::Entity as User;
pub use workout_exercise::Entity as WorkoutExercise;
pub use workout_session::Entity as WorkoutSession;
pub use workout_set::Entity as WorkoutSet;
pub use workout_template::Entity as WorkoutTemplate;

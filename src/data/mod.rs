/// Track data returned by the recent-track extractors
pub mod track;

/// Profile data from the Last.fm user profile
pub mod profile;

/// Tasteometer comparison results
pub mod comparison;

pub use comparison::{Comparison, ScoreRating};
pub use profile::Profile;
pub use track::{RecentTrack, TrackTime};

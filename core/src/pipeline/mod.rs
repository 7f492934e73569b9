//! The three batch stages of the trend pipeline.
//!
//! Data flows strictly Stage 1 -> Stage 2 -> Stage 3; each stage fully
//! materializes its output before the next one starts, because the keyed
//! grouping in stages 1 and 2 must see every value for a key before acting.

pub mod driver;
pub mod genre_year_count;
pub mod track_genre_join;
pub mod unemployment_join;

pub use genre_year_count::GenreYearAggregator;
pub use track_genre_join::{TrackFact, TrackGenreJoin};
pub use unemployment_join::UnemploymentBroadcastJoin;

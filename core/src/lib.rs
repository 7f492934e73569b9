//! Listenomics Core - genre-trend vs. unemployment fusion pipeline
//!
//! This is the core crate of the Listenomics project: a three-stage batch
//! join/aggregate pipeline over song metadata plus a correlation engine that
//! measures how genre popularity tracks the unemployment rate.

pub mod analysis;
pub mod broadcast;
pub mod pipeline;
pub mod records;
pub mod scheduler;
pub mod shuffle;
pub mod storage;
pub mod traits;
pub mod unemployment;

pub use analysis::{CorrelationBand, CorrelationResult};
pub use broadcast::BroadcastVariable;
pub use pipeline::{GenreYearAggregator, TrackGenreJoin, UnemploymentBroadcastJoin};
pub use records::{EnrichedRecord, GenreYearCount, TrackGenreFact, TrackYearFact, YearGenre};
pub use unemployment::UnemploymentTable;

//! Armory Search Engine
//!
//! This crate provides the loadout search:
//! - Ability index and per-category candidate filtering with dominance
//! - Jewel fitting against a slot budget
//! - Depth-first solver with incremental dominance and an optimistic bound
//! - Result ranking by configured criteria
//! - Cooperative cancellation, progress events and statistics
//! - A session manager running one search at a time on a worker thread

pub mod cancel;
pub mod candidate;
pub mod combination;
pub mod event;
pub mod index;
pub mod jewel;
pub mod manager;
pub mod ranker;
pub mod request;
pub mod solver;
pub mod statistics;

pub use cancel::CancellationHandle;
pub use candidate::{Candidate, CandidateFilter, Choice, LoadoutPart};
pub use combination::{Combination, JewelAssignment, JewelPlacement, SlotRef, SlotSource};
pub use event::{LoggingSink, ProgressSink, SearchEvent};
pub use index::{AbilityIndex, EntityRef, Levels, Relevance};
pub use jewel::JewelFitter;
pub use manager::{SearchJob, SearchManager};
pub use ranker::ResultRanker;
pub use request::{SearchReport, SearchRequest, SearchResult, SearchStatus};
pub use solver::{Solver, SolverState};
pub use statistics::SearchStatistics;

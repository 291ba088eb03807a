//! Kizuna Domain Library
//!
//! Core domain types and interfaces for the Kizuna matching engine:
//! compatibility scoring, ranked recommendations and the connection
//! request lifecycle.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Profile, Recommendation, Connection)
//!   - `value_objects/`: Immutable value types (GeoPoint, PreferenceSet, WeightVector, UserPair)
//!   - `services/`: Pure scoring and ranking functions
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!
//! # Usage
//!
//! ```rust,ignore
//! use kizuna::domain::{CompatibilityScorer, Profile, WeightVector};
//! use kizuna::ports::{ConnectionRepository, ProfileRepository};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CompatibilityScore, CompatibilityScorer, Connection, ConnectionOutcome, ConnectionRequest,
    DomainError, GenerationOutcome, GeoPoint, PairState, PairTransition, PreferenceCategory,
    PreferenceSet, Profile, ProfileRecord, Recommendation, ScoreComponents, ScoringParams,
    UserPair, WeightVector,
};
pub use ports::{ConnectionRepository, ProfileRepository, RecommendationRepository};

//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod geo_point;
mod preference;
mod user_pair;
mod weight_vector;

pub use geo_point::*;
pub use preference::*;
pub use user_pair::*;
pub use weight_vector::*;

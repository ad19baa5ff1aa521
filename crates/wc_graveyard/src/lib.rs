//! Graveyard links per zone and the closest-graveyard resolver.

pub mod registry;
pub mod resolver;

pub use registry::{
    GraveyardData, GraveyardError, GraveyardRegistry, GraveyardSink, WorldSafeLocsEntry,
};
pub use resolver::{ResolverEnv, ResolverSettings, TieBreakPolicy};

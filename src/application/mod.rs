pub mod engine;
pub mod normalizer;
pub mod pricing;
pub mod service;

pub use engine::{
    AggregationEngine, AggregationOutcome, EngineSettings, ExchangeFailure, SnapshotSource,
};
pub use normalizer::{normalize, SymbolNormalizer};
pub use pricing::PricingService;
pub use service::{TallyRun, TallyService};

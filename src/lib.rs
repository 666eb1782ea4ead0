pub mod aggregator;
pub mod config;
pub mod error;
pub mod extractor;
pub mod record;
pub mod reputation;
pub mod scanner;
pub mod summary;

pub use aggregator::{RiskAssessment, RiskCategory};
pub use config::Config;
pub use error::ScanError;
pub use extractor::{ExtractedSignals, SignalExtractor};
pub use record::{MemoryScanStore, ScanRecord, ScanStore};
pub use reputation::{ReputationClass, ReputationResult};
pub use scanner::ScanEngine;

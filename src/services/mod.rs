pub mod chart;
pub mod chat;
pub mod indicators;
pub mod matches;
pub mod operations;
pub mod prompts;
pub mod roster_store;
pub mod scanner;
pub mod sectors;

pub use chart::{ChartService, ChartView};
pub use chat::ChatService;
pub use matches::{parse_matches, MAX_MATCHES, MIN_CONFIDENCE};
pub use operations::{OperationBoard, RequestSequencer, ScanBoard, Ticket};
pub use roster_store::RosterStore;
pub use scanner::{PatternScanner, ScanSettings};
pub use sectors::{SectorRosters, UniverseResolver, MAX_UNIVERSE};

pub mod chart;
pub mod chat;
pub mod indicator;
pub mod pattern;
pub mod scan;

pub use chart::*;
pub use chat::*;
pub use indicator::*;
pub use pattern::*;
pub use scan::*;

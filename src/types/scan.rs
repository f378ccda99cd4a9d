use serde::{Deserialize, Serialize};
use std::fmt;

use super::PatternMatch;

/// Market sector tag used to pick a scan universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectorId {
    #[default]
    All,
    Technology,
    Finance,
    Healthcare,
    Consumer,
    Industrial,
    Energy,
    Materials,
    Utilities,
    RealEstate,
}

impl SectorId {
    /// Concrete sectors in enumeration order (excludes `All`).
    pub const SECTORS: [SectorId; 9] = [
        SectorId::Technology,
        SectorId::Finance,
        SectorId::Healthcare,
        SectorId::Consumer,
        SectorId::Industrial,
        SectorId::Energy,
        SectorId::Materials,
        SectorId::Utilities,
        SectorId::RealEstate,
    ];

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Some(Self::All),
            "technology" | "tech" => Some(Self::Technology),
            "finance" | "financial" => Some(Self::Finance),
            "healthcare" => Some(Self::Healthcare),
            "consumer" => Some(Self::Consumer),
            "industrial" | "industrials" => Some(Self::Industrial),
            "energy" => Some(Self::Energy),
            "materials" => Some(Self::Materials),
            "utilities" => Some(Self::Utilities),
            "realestate" | "real_estate" | "real-estate" => Some(Self::RealEstate),
            _ => None,
        }
    }

    /// Tag used on the wire and in storage.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Technology => "technology",
            Self::Finance => "finance",
            Self::Healthcare => "healthcare",
            Self::Consumer => "consumer",
            Self::Industrial => "industrial",
            Self::Energy => "energy",
            Self::Materials => "materials",
            Self::Utilities => "utilities",
            Self::RealEstate => "realestate",
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "All Sectors",
            Self::Technology => "Technology",
            Self::Finance => "Financial Services",
            Self::Healthcare => "Healthcare",
            Self::Consumer => "Consumer",
            Self::Industrial => "Industrial",
            Self::Energy => "Energy",
            Self::Materials => "Materials",
            Self::Utilities => "Utilities",
            Self::RealEstate => "Real Estate",
        }
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A request to scan a sector for one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(alias = "pattern")]
    pub pattern_name: String,
    #[serde(default, alias = "sector")]
    pub sector_filter: SectorId,
}

impl ScanRequest {
    pub fn new(pattern_name: impl Into<String>, sector_filter: SectorId) -> Self {
        Self {
            pattern_name: pattern_name.into(),
            sector_filter,
        }
    }
}

/// Result of a scan that reached the analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_id: String,
    pub pattern: String,
    pub sector: SectorId,
    pub matches: Vec<PatternMatch>,
    pub scanned_symbols: Vec<String>,
    pub failed_symbols: Vec<String>,
    pub timestamp: i64,
}

/// Symbol returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    pub symbol: String,
    pub display_name: String,
}

/// User-added symbol in a sector roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorStock {
    pub symbol: String,
    pub name: String,
    pub sector: SectorId,
}

/// Progress of an asynchronous operation as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum OperationState<T> {
    InFlight,
    Complete(T),
    Failed(String),
}

impl<T> OperationState<T> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OperationState::InFlight)
    }
}

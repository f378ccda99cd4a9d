//! Validation and ranking of pattern matches returned by the analysis model.
//!
//! The model answers in free text that should contain a JSON array. Anything
//! that does not validate degrades to an empty match list.

use crate::types::{PatternAnalysis, PatternMatch, SectorId};
use serde_json::Value;
use tracing::{debug, warn};

/// Matches below this confidence are never surfaced.
pub const MIN_CONFIDENCE: f64 = 70.0;

/// Maximum number of matches returned from a scan.
pub const MAX_MATCHES: usize = 10;

/// Strip code fences and surrounding prose, leaving the JSON array text.
///
/// When the body is not JSON on its own, every `[` is tried as the start of
/// an array. Arrays of objects win over empty arrays, which win over any
/// other array, so bracketed asides in the prose are skipped.
pub fn extract_json_payload(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Drop the language tag line (```json) if present
        body = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest,
        };
        if let Some(end) = body.rfind("```") {
            body = &body[..end];
        }
        body = body.trim();
    }

    if serde_json::from_str::<Value>(body).is_ok() {
        return body;
    }

    let candidates: Vec<(&str, Vec<Value>)> = body
        .match_indices('[')
        .filter_map(|(start, _)| {
            let mut stream = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Array(items))) => Some((&body[start..start + stream.byte_offset()], items)),
                _ => None,
            }
        })
        .collect();

    let of_objects = |items: &[Value]| items.iter().all(Value::is_object);
    candidates
        .iter()
        .find(|(_, items)| !items.is_empty() && of_objects(items))
        .or_else(|| candidates.iter().find(|(_, items)| items.is_empty()))
        .or_else(|| candidates.first())
        .map(|(slice, _)| *slice)
        .unwrap_or(body)
}

/// Parse, validate and rank the model output.
///
/// Returns an empty list for non-array payloads, parse failures, or any
/// element missing a required field.
pub fn parse_matches(text: &str) -> Vec<PatternMatch> {
    let payload = extract_json_payload(text);

    let parsed: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!("Analysis output is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let Some(entries) = parsed.as_array() else {
        warn!("Analysis output is not a JSON array");
        return Vec::new();
    };

    let mut matches = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match validate_entry(entry) {
            Ok(m) => matches.push(m),
            Err(reason) => {
                warn!("Rejecting analysis output, entry {} is malformed: {}", i, reason);
                return Vec::new();
            }
        }
    }

    rank_matches(matches)
}

/// Drop matches under the confidence floor, sort by confidence (descending,
/// ties keep their input order) and cap the list.
pub fn rank_matches(mut matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
    matches.retain(|m| m.confidence >= MIN_CONFIDENCE);
    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matches.truncate(MAX_MATCHES);
    matches
}

fn validate_entry(entry: &Value) -> Result<PatternMatch, String> {
    let obj = entry.as_object().ok_or("entry is not an object")?;

    let symbol = obj
        .get("symbol")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("missing symbol")?;

    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or("missing numeric confidence")?;
    if !(0.0..=100.0).contains(&confidence) {
        return Err(format!("confidence {} out of range", confidence));
    }

    let price = obj
        .get("price")
        .and_then(|v| v.as_f64())
        .ok_or("missing numeric price")?;
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("price {} is not positive", price));
    }

    let analysis = match obj.get("analysis") {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<PatternAnalysis>(raw.clone()) {
            Ok(a) => Some(a),
            Err(e) => {
                debug!("Ignoring malformed analysis block for {}: {}", symbol, e);
                None
            }
        },
    };

    Ok(PatternMatch {
        symbol: symbol.to_uppercase(),
        confidence,
        price,
        sector: obj
            .get("sector")
            .and_then(|v| v.as_str())
            .and_then(SectorId::from_str)
            .filter(|s| *s != SectorId::All)
            .map(|s| s.tag().to_string())
            .unwrap_or_default(),
        pattern_complete: obj
            .get("patternComplete")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        volume_confirms: obj
            .get("volumeConfirms")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        analysis,
    })
}

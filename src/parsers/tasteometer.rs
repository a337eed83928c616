use crate::data::Comparison;
use crate::helpers::lastfm::LastfmError;
use crate::parsers::{first_text, parse_xml, require};

/// Parse a tasteometer.compare response.
///
/// `<result>` and a numeric `<score>` are required. Shared artists are the
/// `<name>` of each `<artist>` below `<result>`, artists without a name are skipped.
pub fn parse_comparison(document: &str) -> Result<Comparison, LastfmError> {
    let doc = parse_xml(document)?;
    let result = require(doc.root_element(), "result")?;

    let score_text = first_text(result, "score")
        .ok_or_else(|| LastfmError::Parse("Missing <score> element".to_string()))?;
    let score = score_text
        .parse::<f64>()
        .map_err(|e| LastfmError::Parse(format!("Invalid score '{}': {}", score_text, e)))?;
    if !(0.0..=1.0).contains(&score) {
        return Err(LastfmError::Parse(format!("Score {} out of range", score)));
    }

    let artists = result
        .descendants()
        .filter(|n| n.has_tag_name("artist"))
        .filter_map(|artist| first_text(artist, "name"))
        .collect();

    Ok(Comparison { score, artists })
}

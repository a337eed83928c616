use crate::data::profile::{Profile, NOT_SPECIFIED};
use crate::helpers::lastfm::LastfmError;
use crate::parsers::{find, first_text, parse_xml};

/// Parse a user profile document.
///
/// Accepts the 1.0 `<profile>` document as well as the 2.0 `<user>` element
/// of user.getinfo. The root is required; every field falls back to
/// "not specified".
pub fn parse_profile(id: &str, document: &str) -> Result<Profile, LastfmError> {
    let doc = parse_xml(document)?;
    let root = doc.root_element();
    let profile = find(root, "profile")
        .or_else(|| find(root, "user"))
        .ok_or_else(|| LastfmError::Parse("Missing <profile> element".to_string()))?;

    let field = |name: &str| first_text(profile, name).unwrap_or_else(|| NOT_SPECIFIED.to_string());

    Ok(Profile {
        id: id.to_string(),
        realname: field("realname"),
        registered: field("registered"),
        age: field("age"),
        gender: field("gender"),
        country: field("country"),
        playcount: field("playcount"),
    })
}

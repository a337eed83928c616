use serde::{Deserialize, Serialize};

/// Placeholder for profile fields the user did not fill in
pub const NOT_SPECIFIED: &str = "not specified";

/// Public profile of a Last.fm user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub realname: String,
    pub registered: String,
    pub age: String,
    pub gender: String,
    pub country: String,
    pub playcount: String,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (realname: {}) registered on {}; age: {} / {}; Country: {}; Tracks played: {}",
            self.id, self.realname, self.registered, self.age, self.gender, self.country, self.playcount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_display() {
        let profile = Profile {
            id: "czshadow".to_string(),
            realname: "Kevin".to_string(),
            registered: NOT_SPECIFIED.to_string(),
            age: NOT_SPECIFIED.to_string(),
            gender: NOT_SPECIFIED.to_string(),
            country: NOT_SPECIFIED.to_string(),
            playcount: "12345".to_string(),
        };
        assert_eq!(
            profile.to_string(),
            "czshadow (realname: Kevin) registered on not specified; age: not specified / not specified; \
             Country: not specified; Tracks played: 12345"
        );
    }
}

//! Canonical identities and provider profile payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProfileFormat;

/// The account a session belongs to, independent of the provider's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable, non-empty id for the provider account.
    pub subject_id: String,
    pub display_name: String,
    pub provider_id: String,
}

/// Profile returned by EVE Online's `/oauth/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EveProfile {
    #[serde(rename = "CharacterID", default)]
    pub character_id: Option<u64>,
    #[serde(rename = "CharacterName", default)]
    pub character_name: Option<String>,
    #[serde(rename = "CharacterOwnerHash", default)]
    pub owner_hash: Option<String>,
}

/// Profile returned by Discord's `/users/@me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub discriminator: Option<Discriminator>,
    #[serde(default)]
    pub global_name: Option<String>,
}

/// Discord sends the discriminator as a four digit string; older clients and
/// fixtures use a number. Numbers are zero-padded so both forms agree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    Text(String),
    Number(u64),
}

impl Discriminator {
    fn as_string(&self) -> Option<String> {
        match self {
            Discriminator::Text(text) if text.trim().is_empty() => None,
            Discriminator::Text(text) => Some(text.trim().to_string()),
            Discriminator::Number(number) => Some(format!("{number:04}")),
        }
    }
}

/// Provider payload, tagged by shape.
#[derive(Debug, Clone)]
pub enum RawProfile {
    Eve(EveProfile),
    Discord(DiscordProfile),
}

impl RawProfile {
    /// Parse a profile body according to the provider's format.
    pub fn parse(format: ProfileFormat, body: &[u8]) -> Result<Self, serde_json::Error> {
        match format {
            ProfileFormat::Eve => serde_json::from_slice(body).map(RawProfile::Eve),
            ProfileFormat::Discord => serde_json::from_slice(body).map(RawProfile::Discord),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("{provider} profile is missing required field '{field}'")]
    MissingField {
        provider: String,
        field: &'static str,
    },
}

/// Map a raw provider profile to the canonical identity.
pub fn normalize(provider_id: &str, raw: RawProfile) -> Result<Identity, NormalizationError> {
    let missing = |field| NormalizationError::MissingField {
        provider: provider_id.to_string(),
        field,
    };

    match raw {
        RawProfile::Eve(profile) => {
            let character_id = profile
                .character_id
                .filter(|id| *id != 0)
                .ok_or_else(|| missing("CharacterID"))?;
            let name = non_blank(profile.character_name).ok_or_else(|| missing("CharacterName"))?;
            Ok(Identity {
                subject_id: character_id.to_string(),
                display_name: name,
                provider_id: provider_id.to_string(),
            })
        }
        RawProfile::Discord(profile) => {
            let username = non_blank(profile.username).ok_or_else(|| missing("username"))?;
            let discriminator = profile
                .discriminator
                .as_ref()
                .and_then(Discriminator::as_string)
                .ok_or_else(|| missing("discriminator"))?;
            let display_name = non_blank(profile.global_name).unwrap_or_else(|| username.clone());
            Ok(Identity {
                subject_id: format!("{username}#{discriminator}"),
                display_name,
                provider_id: provider_id.to_string(),
            })
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eve(body: &str) -> RawProfile {
        RawProfile::parse(ProfileFormat::Eve, body.as_bytes()).unwrap()
    }

    fn discord(body: &str) -> RawProfile {
        RawProfile::parse(ProfileFormat::Discord, body.as_bytes()).unwrap()
    }

    #[test]
    fn test_eve_profile_normalizes_to_character_id() {
        let identity = normalize(
            "eve",
            eve(r#"{"CharacterID": 42, "CharacterName": "Test", "CharacterOwnerHash": "abc"}"#),
        )
        .unwrap();
        assert_eq!(identity.subject_id, "42");
        assert_eq!(identity.display_name, "Test");
        assert_eq!(identity.provider_id, "eve");
    }

    #[test]
    fn test_eve_profile_missing_id() {
        let err = normalize("eve", eve(r#"{"CharacterName": "Test"}"#)).unwrap_err();
        assert_eq!(
            err,
            NormalizationError::MissingField {
                provider: "eve".to_string(),
                field: "CharacterID",
            }
        );
    }

    #[test]
    fn test_eve_profile_zero_id_rejected() {
        let err = normalize("eve", eve(r#"{"CharacterID": 0, "CharacterName": "X"}"#)).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField { field: "CharacterID", .. }));
    }

    #[test]
    fn test_eve_profile_wrong_type_is_parse_error() {
        assert!(RawProfile::parse(ProfileFormat::Eve, br#"{"CharacterID": "abc"}"#).is_err());
        assert!(RawProfile::parse(ProfileFormat::Eve, b"not json").is_err());
    }

    #[test]
    fn test_discord_numeric_discriminator() {
        let identity =
            normalize("discord", discord(r#"{"username":"alice","discriminator":1234}"#)).unwrap();
        assert_eq!(identity.subject_id, "alice#1234");
        assert_eq!(identity.display_name, "alice");
    }

    #[test]
    fn test_discord_string_discriminator_and_global_name() {
        let identity = normalize(
            "discord",
            discord(r#"{"id":"80351110224678912","username":"bob","discriminator":"0001","global_name":"Bobby"}"#),
        )
        .unwrap();
        assert_eq!(identity.subject_id, "bob#0001");
        assert_eq!(identity.display_name, "Bobby");
    }

    #[test]
    fn test_discord_discriminator_forms_agree() {
        let text = discord(r#"{"username":"alice","discriminator":"0001"}"#);
        let number = discord(r#"{"username":"alice","discriminator":1}"#);
        let text = normalize("discord", text).unwrap();
        let number = normalize("discord", number).unwrap();
        assert_eq!(text.subject_id, "alice#0001");
        assert_eq!(number.subject_id, text.subject_id);
    }

    #[test]
    fn test_discord_missing_discriminator() {
        let err = normalize("discord", discord(r#"{"username":"alice"}"#)).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField { field: "discriminator", .. }));
    }

    #[test]
    fn test_discord_blank_username() {
        let err =
            normalize("discord", discord(r#"{"username":"  ","discriminator":"1"}"#)).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField { field: "username", .. }));
    }

    #[test]
    fn test_same_account_same_subject() {
        let body = r#"{"CharacterID": 90000001, "CharacterName": "Pilot"}"#;
        let first = normalize("eve", eve(body)).unwrap();
        let second = normalize("eve", eve(body)).unwrap();
        assert_eq!(first.subject_id, second.subject_id);
    }
}

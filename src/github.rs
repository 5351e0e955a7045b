//! Purpose: GitHub repository descriptor decoded from the REST API payload.
//! Exports: `Repo`, `DEFAULT_REPO_URL`, `decode_repo`.
//! Role: The domain record the CLI fetches and summarizes.
//! Invariants: Fields are read in declaration order; the first failing field wins.
//! Invariants: A `Repo` only exists fully decoded; it is never mutated afterwards.

use crate::core::error::Error;
use crate::json::{self, DecodeError, FromJson, Json, ToJson};
use time::OffsetDateTime;
use url::Url;

pub const DEFAULT_REPO_URL: &str = "https://api.github.com/repos/vdka/json";

#[derive(Clone, Debug, PartialEq)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub html_url: Url,
    pub fork: bool,
    pub stargazers_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub pushed_at: OffsetDateTime,
}

impl Repo {
    pub fn summary(&self) -> String {
        format!(
            "{} has {} stars. Why not make it 1 more!",
            self.full_name, self.stargazers_count
        )
    }
}

impl FromJson for Repo {
    fn from_json(json: &Json) -> Result<Self, DecodeError> {
        Ok(Self {
            name: json.get("name")?,
            full_name: json.get("full_name")?,
            description: json.get("description")?,
            html_url: json.get("html_url")?,
            fork: json.get("fork")?,
            stargazers_count: json.get("stargazers_count")?,
            created_at: json.get("created_at")?,
            updated_at: json.get("updated_at")?,
            pushed_at: json.get("pushed_at")?,
        })
    }
}

impl ToJson for Repo {
    fn to_json(&self) -> Json {
        Json::Object(vec![
            ("name".to_string(), self.name.to_json()),
            ("full_name".to_string(), self.full_name.to_json()),
            ("description".to_string(), self.description.to_json()),
            ("html_url".to_string(), self.html_url.to_json()),
            ("fork".to_string(), self.fork.to_json()),
            ("stargazers_count".to_string(), self.stargazers_count.to_json()),
            ("created_at".to_string(), self.created_at.to_json()),
            ("updated_at".to_string(), self.updated_at.to_json()),
            ("pushed_at".to_string(), self.pushed_at.to_json()),
        ])
    }
}

/// Parses `body` and decodes it as a `Repo`.
pub fn decode_repo(body: &[u8]) -> Result<Repo, Error> {
    let value = json::parse(body).inspect_err(|err| {
        tracing::debug!(hint = %json::hint_for_error(err, "repo.body"), "response is not json");
    })?;
    let repo = value.decode::<Repo>().inspect_err(|err| {
        tracing::debug!(error = %err, "response does not describe a repository");
    })?;
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::{Repo, decode_repo};
    use crate::core::error::ErrorKind;
    use crate::json::{DecodeError, FromJson, Json, ToJson, parse};
    use time::macros::datetime;

    const BODY: &str = r#"{"name":"json","full_name":"vdka/json","description":"d","html_url":"https://github.com/vdka/json","fork":false,"stargazers_count":42,"created_at":"2016-01-01T00:00:00Z","updated_at":"2016-01-02T00:00:00Z","pushed_at":"2016-01-03T00:00:00Z"}"#;

    fn body_without(key: &str) -> Json {
        let Json::Object(members) = parse(BODY.as_bytes()).expect("parse") else {
            panic!("expected object");
        };
        Json::Object(members.into_iter().filter(|(name, _)| name != key).collect())
    }

    fn body_with(key: &str, value: Json) -> Json {
        let Json::Object(members) = parse(BODY.as_bytes()).expect("parse") else {
            panic!("expected object");
        };
        Json::Object(
            members
                .into_iter()
                .map(|(name, old)| {
                    if name == key {
                        (name, value.clone())
                    } else {
                        (name, old)
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn decodes_every_field() {
        let repo = decode_repo(BODY.as_bytes()).expect("repo");
        assert_eq!(repo.name, "json");
        assert_eq!(repo.full_name, "vdka/json");
        assert_eq!(repo.description, "d");
        assert_eq!(repo.html_url.as_str(), "https://github.com/vdka/json");
        assert!(!repo.fork);
        assert_eq!(repo.stargazers_count, 42);
        assert_eq!(repo.created_at, datetime!(2016-01-01 00:00:00 UTC));
        assert_eq!(repo.updated_at, datetime!(2016-01-02 00:00:00 UTC));
        assert_eq!(repo.pushed_at, datetime!(2016-01-03 00:00:00 UTC));
    }

    #[test]
    fn summary_line_matches_expected_text() {
        let repo = decode_repo(BODY.as_bytes()).expect("repo");
        assert_eq!(repo.summary(), "vdka/json has 42 stars. Why not make it 1 more!");
    }

    #[test]
    fn extra_members_are_ignored() {
        let mut value = parse(BODY.as_bytes()).expect("parse");
        if let Json::Object(members) = &mut value {
            members.push(("watchers".to_string(), Json::Integer(7)));
        }
        assert!(Repo::from_json(&value).is_ok());
    }

    #[test]
    fn missing_key_names_the_key() {
        for key in ["name", "html_url", "stargazers_count", "pushed_at"] {
            assert_eq!(
                Repo::from_json(&body_without(key)),
                Err(DecodeError::KeyNotFound(key.to_string()))
            );
        }
    }

    #[test]
    fn wrong_type_is_bad_value() {
        let cases = [
            ("name", Json::Integer(1)),
            ("description", Json::Null),
            ("fork", Json::from("false")),
            ("stargazers_count", Json::Double(42.0)),
            ("html_url", Json::from("not a url")),
            ("created_at", Json::from("not-a-date")),
        ];
        for (key, value) in cases {
            assert_eq!(
                Repo::from_json(&body_with(key, value.clone())),
                Err(DecodeError::BadValue(value))
            );
        }
    }

    #[test]
    fn first_declared_failure_wins() {
        let value = body_with("fork", Json::Null);
        let value = match value {
            Json::Object(members) => Json::Object(
                members
                    .into_iter()
                    .filter(|(name, _)| name != "pushed_at")
                    .collect(),
            ),
            other => other,
        };
        assert_eq!(
            Repo::from_json(&value),
            Err(DecodeError::BadValue(Json::Null))
        );
    }

    #[test]
    fn timestamps_accept_numeric_forms() {
        let value = body_with("created_at", Json::Integer(0));
        let repo = Repo::from_json(&value).expect("repo");
        assert_eq!(repo.created_at, time::OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn reencoding_decodes_back_equal() {
        let repo = decode_repo(BODY.as_bytes()).expect("repo");
        let encoded = repo.to_json();
        assert_eq!(encoded.to_string(), BODY);
        assert_eq!(Repo::from_json(&encoded), Ok(repo));
    }

    #[test]
    fn decode_repo_maps_error_kinds() {
        let err = decode_repo(b"{not json").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = decode_repo(br#"{"name":"json"}"#).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.message(), Some("key not found \"full_name\""));

        let err = decode_repo(b"[]").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}

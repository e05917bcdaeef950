use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token class carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Audience claim as it appears on the wire: a single value or a list.
///
/// The same representation is used for the decode-side expectation, so the
/// match rule is a plain intersection check between two tagged values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    /// True when the two audiences share at least one value.
    pub fn intersects(&self, other: &Audience) -> bool {
        self.values()
            .any(|value| other.values().any(|candidate| candidate == value))
    }

    fn values(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Audience::One(value) => std::slice::from_ref(value),
            Audience::Many(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Audience::One(value.to_owned())
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Audience::One(value)
    }
}

impl From<Vec<String>> for Audience {
    fn from(values: Vec<String>) -> Self {
        Audience::Many(values)
    }
}

impl From<Vec<&str>> for Audience {
    fn from(values: Vec<&str>) -> Self {
        Audience::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// Full claim set carried inside a token.
///
/// Reserved claims are typed; everything else round-trips through `extra`
/// so decode returns the payload unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, any JSON identifier (string, number, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Value>,
    /// Unique token id, generated at encode time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    /// Set on access tokens only: issued from direct credential login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Caller-supplied custom claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Access/refresh tokens minted together for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn audience_deserializes_scalar_and_list() {
        let one: Audience = serde_json::from_value(json!("foo")).unwrap();
        assert_eq!(one, Audience::One("foo".to_string()));

        let many: Audience = serde_json::from_value(json!(["foo", "bar"])).unwrap();
        assert_eq!(
            many,
            Audience::Many(vec!["foo".to_string(), "bar".to_string()])
        );
    }

    #[test]
    fn audience_intersects_on_any_overlap() {
        let expected = Audience::from(vec!["foo", "bar"]);
        assert!(expected.intersects(&Audience::from("foo")));
        assert!(expected.intersects(&Audience::from(vec!["bar"])));
        assert!(expected.intersects(&Audience::from(vec!["foo", "bar", "baz"])));
    }

    #[test]
    fn audience_disjoint_does_not_intersect() {
        let expected = Audience::from("foo");
        assert!(!expected.intersects(&Audience::from("bar")));
        assert!(!expected.intersects(&Audience::from(vec!["bar", "baz"])));
    }

    #[test]
    fn token_type_uses_lowercase_names() {
        assert_eq!(serde_json::to_value(TokenType::Access).unwrap(), json!("access"));
        assert_eq!(serde_json::to_value(TokenType::Refresh).unwrap(), json!("refresh"));
    }

    #[test]
    fn claims_round_trip_preserves_custom_claims() {
        let payload = json!({
            "sub": "test",
            "jti": "123",
            "type": "access",
            "fresh": true,
            "role": "admin",
            "team": ["a", "b"]
        });

        let claims: Claims = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(claims.sub, Some(json!("test")));
        assert_eq!(claims.token_type, Some(TokenType::Access));
        assert_eq!(claims.fresh, Some(true));
        assert_eq!(claims.extra.get("role"), Some(&json!("admin")));

        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn absent_claims_are_not_serialized() {
        let claims: Claims = serde_json::from_value(json!({"sub": 1})).unwrap();
        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back, json!({"sub": 1}));
    }
}

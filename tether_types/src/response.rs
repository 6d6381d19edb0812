//! Typed success bodies. Every body goes through [`Expected::from_value`],
//! which checks required keys before anything reads them.

use crate::{Error, Result, Scalar};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub trait Expected: DeserializeOwned {
    /// keys that must be present and non-null.
    const REQUIRED: &'static [&'static str];

    /// cross-field rules serde can't express.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    fn from_value(value: Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::ShapeMismatch(format!("expected a json object, got {}", value)))?;
        let missing: Vec<&str> = Self::REQUIRED
            .iter()
            .copied()
            .filter(|key| object.get(*key).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(Error::ShapeMismatch(format!("missing {}", missing.join(", "))));
        }
        let body: Self = serde_json::from_value(value).map_err(|e| Error::ShapeMismatch(e.to_string()))?;
        body.check()?;
        Ok(body)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreatedClient {
    pub client_id: Scalar,
    pub token: Scalar,
}

impl Expected for CreatedClient {
    const REQUIRED: &'static [&'static str] = &["client_id", "token"];

    // booleans are never ids; falsy values are not usable either.
    fn check(&self) -> Result<()> {
        let unusable = |value: &Scalar| matches!(value, Scalar::Bool(_)) || value.is_falsy();
        if unusable(&self.client_id) || unusable(&self.token) {
            return Err(Error::ShapeMismatch("unusable client_id or token".to_owned()));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreatedComment {
    pub id: Scalar,
    pub avatar: String,
    pub author: String,
    pub content: String,
    pub get_absolute_url: String,
    pub time_create: String,
    pub is_child: bool,
    #[serde(default)]
    pub parent_id: Option<Scalar>,
}

impl Expected for CreatedComment {
    const REQUIRED: &'static [&'static str] = &[
        "id",
        "avatar",
        "author",
        "content",
        "get_absolute_url",
        "time_create",
        "is_child",
    ];

    fn check(&self) -> Result<()> {
        if self.is_child && self.parent_id.is_none() {
            return Err(Error::ShapeMismatch("missing parent_id".to_owned()));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FollowState {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub get_absolute_url: Option<String>,
}

impl Expected for FollowState {
    const REQUIRED: &'static [&'static str] = &["status", "slug"];

    // a new follower entry needs both its link and its picture.
    fn check(&self) -> Result<()> {
        if self.status && (self.avatar.is_none() || self.get_absolute_url.is_none()) {
            return Err(Error::ShapeMismatch("missing avatar or get_absolute_url".to_owned()));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RatingSum {
    pub rating_sum: Scalar,
}

impl Expected for RatingSum {
    const REQUIRED: &'static [&'static str] = &["rating_sum"];
}

#[cfg(test)]
mod tests {
    use super::{CreatedClient, CreatedComment, Expected, FollowState, RatingSum};
    use crate::Error;
    use serde_json::json;

    #[test]
    fn client_needs_both_keys() {
        let err = CreatedClient::from_value(json!({"client_id": 3})).unwrap_err();
        assert_eq!(err, Error::ShapeMismatch("missing token".to_string()));
        let err = CreatedClient::from_value(json!({"client_id": null, "token": "t"})).unwrap_err();
        assert_eq!(err, Error::ShapeMismatch("missing client_id".to_string()));
        for body in vec![
            json!({"client_id": "", "token": "t"}),
            json!({"client_id": false, "token": "t"}),
            json!({"client_id": true, "token": "t"}),
            json!({"client_id": 0, "token": "t"}),
            json!({"client_id": 3, "token": false}),
        ] {
            assert!(CreatedClient::from_value(body).unwrap_err().is_shape_mismatch());
        }
        let ok = CreatedClient::from_value(json!({"client_id": 3, "token": "t"})).unwrap();
        assert_eq!(ok.client_id.to_string(), "3");
    }

    #[test]
    fn non_object_is_a_mismatch() {
        assert!(RatingSum::from_value(json!([1, 2])).unwrap_err().is_shape_mismatch());
        assert!(RatingSum::from_value(json!("ok")).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let err = FollowState::from_value(json!({"status": "yes", "slug": "bob"})).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn unfollow_needs_no_avatar() {
        let state = FollowState::from_value(json!({"status": false, "slug": "bob"})).unwrap();
        assert_eq!(state.message, None);
        let err = FollowState::from_value(json!({"status": true, "slug": "bob"})).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn child_comment_needs_parent() {
        let body = json!({
            "id": 5, "avatar": "/a.png", "author": "ann", "content": "hi",
            "get_absolute_url": "/u/ann/", "time_create": "now", "is_child": true,
        });
        assert!(CreatedComment::from_value(body).unwrap_err().is_shape_mismatch());
    }
}

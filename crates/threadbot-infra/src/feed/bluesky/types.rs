//! XRPC request/response bodies used by [`BlueskyClient`](super::BlueskyClient).

use serde::{Deserialize, Serialize};

use threadbot_types::thread::ReplyRefs;

pub const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub access_jwt: String,
    pub did: String,
}

/// An `app.bsky.feed.post` record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: &'a str,
    /// RFC 3339 timestamp.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<&'a ReplyRefs>,
}

impl<'a> PostRecord<'a> {
    pub fn new(text: &'a str, created_at: String, reply: Option<&'a ReplyRefs>) -> Self {
        Self {
            record_type: POST_COLLECTION,
            text,
            created_at,
            reply,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'static str,
    pub record: PostRecord<'a>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}

/// Error body returned by XRPC endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrpcErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl XrpcErrorBody {
    /// `Error: message`, or whichever half is present.
    pub fn describe(&self) -> Option<String> {
        match (&self.error, &self.message) {
            (Some(e), Some(m)) => Some(format!("{e}: {m}")),
            (Some(e), None) => Some(e.clone()),
            (None, Some(m)) => Some(m.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbot_types::thread::StrongRef;

    #[test]
    fn test_top_level_record_has_no_reply() {
        let record = PostRecord::new("Hello.", "2024-01-01T00:00:00.000Z".to_string(), None);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["$type"], "app.bsky.feed.post");
        assert_eq!(json["text"], "Hello.");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
        assert!(json.get("reply").is_none());
    }

    #[test]
    fn test_reply_record_shape() {
        let refs = ReplyRefs {
            root: StrongRef {
                uri: "at://did:plc:a/app.bsky.feed.post/1".to_string(),
                cid: "cidroot".to_string(),
            },
            parent: StrongRef {
                uri: "at://did:plc:b/app.bsky.feed.post/2".to_string(),
                cid: "cidparent".to_string(),
            },
        };
        let request = CreateRecordRequest {
            repo: "did:plc:c",
            collection: POST_COLLECTION,
            record: PostRecord::new("Reply.", "2024-01-01T00:00:00.000Z".to_string(), Some(&refs)),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["repo"], "did:plc:c");
        assert_eq!(json["collection"], "app.bsky.feed.post");
        assert_eq!(json["record"]["reply"]["root"]["cid"], "cidroot");
        assert_eq!(
            json["record"]["reply"]["parent"]["uri"],
            "at://did:plc:b/app.bsky.feed.post/2"
        );
    }

    #[test]
    fn test_session_response_parse() {
        let json = r#"{"accessJwt":"eyJ...","refreshJwt":"eyR...","handle":"zuck.bsky.social","did":"did:plc:zuck"}"#;
        let session: CreateSessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(session.did, "did:plc:zuck");
    }

    #[test]
    fn test_error_body_describe() {
        let body: XrpcErrorBody =
            serde_json::from_str(r#"{"error":"AuthenticationRequired","message":"Invalid identifier or password"}"#)
                .unwrap();
        assert_eq!(
            body.describe().as_deref(),
            Some("AuthenticationRequired: Invalid identifier or password")
        );
        assert!(XrpcErrorBody::default().describe().is_none());
    }
}

use domain::artifact::PushRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /artifact/push`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushParams {
    /// User whose live sessions should receive the artifact.
    pub user_id: String,
    pub chat_id: Option<String>,
    /// Full HTML string.
    pub content: String,
    pub title: Option<String>,
}

impl From<PushParams> for PushRequest {
    fn from(params: PushParams) -> Self {
        PushRequest {
            target_user_id: params.user_id,
            chat_id: params.chat_id,
            content: params.content,
            title: params.title,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PushResponse {
    /// Always `"ok"`: the broadcast was issued.
    pub status: String,
    /// Live sessions in the target room when the push was made. May be zero.
    pub session_count: usize,
}

impl PushResponse {
    pub fn ok(session_count: usize) -> Self {
        Self {
            status: "ok".to_string(),
            session_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_optionals_stay_none() {
        let params: PushParams =
            serde_json::from_str(r#"{"user_id":"u1","content":"<p>hi</p>"}"#).unwrap();
        let request = PushRequest::from(params);

        assert_eq!(request.target_user_id, "u1");
        assert_eq!(request.chat_id, None);
        assert_eq!(request.title, None);
    }

    #[test]
    fn explicit_null_is_none_and_empty_string_is_kept() {
        let params: PushParams =
            serde_json::from_str(r#"{"user_id":"u1","content":"x","chat_id":null,"title":""}"#)
                .unwrap();

        assert_eq!(params.chat_id, None);
        assert_eq!(params.title.as_deref(), Some(""));
    }

    #[test]
    fn missing_content_fails_to_parse() {
        assert!(serde_json::from_str::<PushParams>(r#"{"user_id":"u1"}"#).is_err());
    }
}

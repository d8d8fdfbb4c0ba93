//! Advisor chat.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::AppState;
use super::auth::AuthUser;
use super::error::{ApiError, ApiResult, OrInternal};
use crate::constants::chat::HISTORY_PAGE_LIMIT;
use crate::storage::{ChatStore, FieldStore, LivestockStore};
use crate::types::{ChatMessage, ChatRole, FieldProfile, HerdProfile};

const CHAT_FAILED: &str = "Ошибка при общении с AI";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = ChatStore::new(&state.db)
        .recent(&auth.user.id, HISTORY_PAGE_LIMIT)
        .or_internal("Ошибка при загрузке истории чата")?;
    Ok(Json(messages))
}

pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = ChatStore::new(&state.db)
        .clear(&auth.user.id)
        .or_internal("Ошибка при удалении истории")?;
    info!("Cleared {} chat messages of {}", removed, auth.user.username);
    Ok(Json(json!({ "message": "История чата удалена" })))
}

/// Store the question, answer it with the farm as context, store the answer.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatExchange>> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Сообщение не может быть пустым"));
    }

    let user_id = &auth.user.id;
    let store = ChatStore::new(&state.db);
    let user_message = store
        .append(user_id, ChatRole::User, content)
        .or_internal(CHAT_FAILED)?;

    let history = store
        .recent(user_id, state.advisor.chat_history_limit())
        .or_internal(CHAT_FAILED)?;
    let fields: Vec<FieldProfile> = FieldStore::new(&state.db)
        .list_for_user(user_id)
        .or_internal(CHAT_FAILED)?
        .iter()
        .map(FieldProfile::from)
        .collect();
    let herds: Vec<HerdProfile> = LivestockStore::new(&state.db)
        .list_for_user(user_id)
        .or_internal(CHAT_FAILED)?
        .iter()
        .map(HerdProfile::from)
        .collect();

    let reply = state
        .advisor
        .chat(&history, &fields, &herds)
        .await
        .or_internal(CHAT_FAILED)?;

    let assistant_message = store
        .append(user_id, ChatRole::Assistant, &reply)
        .or_internal(CHAT_FAILED)?;

    Ok(Json(ChatExchange {
        user_message,
        assistant_message,
    }))
}

#[cfg(test)]
mod tests {
    use crate::ai::FakeProvider;
    use crate::api::test_support::{TestApp, read_json};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_exchange_is_persisted() {
        let app = TestApp::with_fake(
            FakeProvider::new().with_default("А что вы уже пробовали против сорняков?"),
        );
        let token = app.register("farmer").await;
        app.create_field(&token).await;

        let response = app
            .post_json(
                "/api/chat/message",
                Some(&token),
                json!({"content": "Как бороться с сорняками?"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["userMessage"]["role"], "user");
        assert_eq!(body["assistantMessage"]["role"], "assistant");
        assert_eq!(
            body["assistantMessage"]["content"],
            "А что вы уже пробовали против сорняков?"
        );

        // the farm is in the system prompt, the question in the turns
        let request = app.fake.requests().pop().unwrap();
        assert!(request.system.as_deref().unwrap().contains("Северное"));
        assert_eq!(
            request.messages.last().unwrap().text,
            "Как бороться с сорняками?"
        );

        let history = read_json(app.get("/api/chat/history", Some(&token)).await).await;
        assert_eq!(history.as_array().unwrap().len(), 2);

        let cleared = app.delete("/api/chat/history", Some(&token)).await;
        assert_eq!(read_json(cleared).await["message"], "История чата удалена");
        let history = read_json(app.get("/api/chat/history", Some(&token)).await).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let app = TestApp::new();
        let token = app.register("farmer").await;

        let response = app
            .post_json("/api/chat/message", Some(&token), json!({"content": "   "}))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Сообщение не может быть пустым");
        assert_eq!(app.fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let app = TestApp::with_fake(FakeProvider::failing());
        let token = app.register("farmer").await;

        let response = app
            .post_json("/api/chat/message", Some(&token), json!({"content": "Привет"}))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["error"], "Ошибка при общении с AI");
    }

    #[tokio::test]
    async fn test_empty_reply_is_replaced() {
        let app = TestApp::with_fake(FakeProvider::new().with_default("  "));
        let token = app.register("farmer").await;

        let body = read_json(
            app.post_json("/api/chat/message", Some(&token), json!({"content": "Привет"}))
                .await,
        )
        .await;
        assert_eq!(
            body["assistantMessage"]["content"],
            "Извините, не могу ответить на этот вопрос."
        );
    }
}

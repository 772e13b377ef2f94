//! Telegram notifier plugin.
//!
//! Sends one `sendMessage` call per notification to the Telegram Bot API.
//!
//! Bot API reference: https://core.telegram.org/bots/api#sendmessage

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;

use super::plugin::{FormField, FormRow, FormSchema, NotifierPlugin, NotifierType};
use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult, NotificationError};
use crate::models::{NotifierSettings, SettingsKind};
use crate::repositories::SettingsStore;

/// Single-word tags, optionally followed by attributes. Only the bare form
/// (`<b>`, `</I>`) is ever removed.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)([a-z]+)(\s[^<>]*)?>").expect("tag pattern is valid")
});

pub struct TelegramNotifier {
    client: reqwest::Client,
    store: Arc<dyn SettingsStore>,
    api_base_url: String,
}

impl TelegramNotifier {
    pub const NAME: &'static str = "telegram";

    pub fn new(
        client: reqwest::Client,
        store: Arc<dyn SettingsStore>,
        config: &TelegramConfig,
    ) -> Self {
        Self {
            client,
            store,
            api_base_url: config.api_base_url.clone(),
        }
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, token)
    }
}

/// `body`, followed by `url` on its own line when present and non-empty.
fn compose_text(body: &str, url: Option<&str>) -> String {
    match url {
        Some(url) if !url.is_empty() => format!("{}\n{}", body, url),
        _ => body.to_string(),
    }
}

/// Removes bare tags such as `<b>` and `</i>`, case-insensitively.
///
/// Attributed tags stay, and so does the closing tag of an attributed
/// element: `<b class=x>bold</b>` is returned unchanged.
fn strip_tags(text: &str) -> Cow<'_, str> {
    let mut open: Vec<(String, bool)> = Vec::new();
    let mut out = String::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(text) {
        let Some(tag) = caps.get(0) else { continue };
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let attributed = caps.get(3).is_some();

        let keep = if !closing {
            open.push((name, attributed));
            attributed
        } else if attributed {
            true
        } else {
            match open.iter().rposition(|(n, _)| *n == name) {
                Some(i) => open.remove(i).1,
                None => false,
            }
        };

        if !keep {
            out.push_str(&text[last..tag.start()]);
            last = tag.end();
        }
    }

    if last == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

#[async_trait]
impl NotifierPlugin for TelegramNotifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn form(&self) -> FormSchema {
        vec![FormRow {
            fields: vec![
                FormField::text("chat_id", "Chat ID", 50),
                FormField::text("access_token", "Access token", 50),
            ],
        }]
    }

    fn notifier_type(&self) -> NotifierType {
        NotifierType::ShortText
    }

    fn settings_kind(&self) -> SettingsKind {
        SettingsKind::Telegram
    }

    // The header is not part of the Telegram message.
    async fn notify(&self, _header: &str, body: &str, url: Option<&str>) -> AppResult<bool> {
        let settings = self.store.load(Self::NAME).await?;
        let Some((chat_id, token)) = settings
            .as_ref()
            .and_then(NotifierSettings::as_telegram)
            .and_then(|s| s.credentials())
        else {
            tracing::warn!(plugin = Self::NAME, "Notifier credentials are not configured");
            return Err(NotificationError::missing_credentials().into());
        };

        let text = compose_text(body, url);
        let text = strip_tags(&text);

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint(token))
            .form(&[("chat_id", chat_id.to_string()), ("text", text.into_owned())])
            .send()
            .await
            .map_err(|e| {
                // The request URL embeds the bot token
                let e = e.without_url();
                tracing::warn!(
                    plugin = Self::NAME,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Notification request failed"
                );
                NotificationError::transport(Self::NAME, e)
            })?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status != StatusCode::OK {
            tracing::warn!(
                plugin = Self::NAME,
                status = status.as_u16(),
                duration_ms,
                "Notification rejected"
            );
            return Err(NotificationError::rejected(Self::NAME, status.as_u16()).into());
        }

        tracing::info!(
            plugin = Self::NAME,
            status = status.as_u16(),
            duration_ms,
            "Notification sent"
        );
        Ok(true)
    }

    fn validate_settings(&self, settings: &NotifierSettings) -> AppResult<()> {
        let Some(telegram) = settings.as_telegram() else {
            return Err(AppError::Validation {
                field: "plugin".to_string(),
                reason: format!("Expected {} settings", Self::NAME),
            });
        };

        // The token becomes a path segment of the request URL
        if let Some(token) = telegram.access_token.as_deref()
            && token.chars().any(|c| c.is_whitespace() || c == '/' || c == '?' || c == '#')
        {
            return Err(AppError::Validation {
                field: "access_token".to_string(),
                reason: "Access token must not contain whitespace, '/', '?' or '#'".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationErrorKind;
    use crate::models::TelegramSettings;
    use crate::repositories::InMemorySettingsStore;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:ABC-def";
    const CHAT_ID: i64 = 42;

    fn notifier(server: &MockServer, store: InMemorySettingsStore) -> TelegramNotifier {
        let config = TelegramConfig {
            api_base_url: server.uri(),
            ..TelegramConfig::default()
        };
        TelegramNotifier::new(reqwest::Client::new(), Arc::new(store), &config)
    }

    fn configured_store() -> InMemorySettingsStore {
        InMemorySettingsStore::new().with_settings(
            TelegramNotifier::NAME,
            NotifierSettings::Telegram(TelegramSettings::new(CHAT_ID, TOKEN)),
        )
    }

    async fn mock_send(server: &MockServer, status: u16, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"ok":true}"#))
            .expect(times)
            .mount(server)
            .await;
    }

    /// Decodes the form body of every request the server received.
    async fn sent_forms(server: &MockServer) -> Vec<HashMap<String, String>> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let body = String::from_utf8_lossy(&request.body);
                reqwest::Url::parse(&format!("http://form.local/?{}", body))
                    .unwrap()
                    .query_pairs()
                    .into_owned()
                    .collect()
            })
            .collect()
    }

    fn notification_kind(err: &AppError) -> NotificationErrorKind {
        match err {
            AppError::Notification(e) => e.kind(),
            other => panic!("Expected notification error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_settings_makes_no_request() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 0).await;
        let notifier = notifier(&server, InMemorySettingsStore::new());

        let err = notifier.notify("H", "hello", None).await.unwrap_err();
        assert_eq!(
            notification_kind(&err),
            NotificationErrorKind::MissingCredentials
        );
    }

    #[tokio::test]
    async fn test_empty_token_makes_no_request() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 0).await;
        let store = InMemorySettingsStore::new().with_settings(
            TelegramNotifier::NAME,
            NotifierSettings::Telegram(TelegramSettings::new(CHAT_ID, "")),
        );

        let err = notifier(&server, store)
            .notify("H", "hello", None)
            .await
            .unwrap_err();
        assert_eq!(
            notification_kind(&err),
            NotificationErrorKind::MissingCredentials
        );
    }

    #[tokio::test]
    async fn test_missing_chat_id_makes_no_request() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 0).await;
        let store = InMemorySettingsStore::new().with_settings(
            TelegramNotifier::NAME,
            NotifierSettings::Telegram(TelegramSettings {
                chat_id: None,
                access_token: Some(TOKEN.to_string()),
            }),
        );

        let err = notifier(&server, store)
            .notify("H", "hello", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Access Token or User Id was not specified (code 1)");
    }

    #[tokio::test]
    async fn test_sends_chat_id_and_text() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        let sent = notifier(&server, configured_store())
            .notify("H", "hello", None)
            .await
            .unwrap();
        assert!(sent);

        let forms = sent_forms(&server).await;
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["chat_id"], "42");
        assert_eq!(forms[0]["text"], "hello");
    }

    #[tokio::test]
    async fn test_url_appended_on_new_line() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        notifier(&server, configured_store())
            .notify("H", "hello", Some("http://x"))
            .await
            .unwrap();

        assert_eq!(sent_forms(&server).await[0]["text"], "hello\nhttp://x");
    }

    #[tokio::test]
    async fn test_empty_url_adds_nothing() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        notifier(&server, configured_store())
            .notify("H", "hello", Some(""))
            .await
            .unwrap();

        assert_eq!(sent_forms(&server).await[0]["text"], "hello");
    }

    #[tokio::test]
    async fn test_header_not_sent() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        notifier(&server, configured_store())
            .notify("Download finished", "body", None)
            .await
            .unwrap();

        let forms = sent_forms(&server).await;
        assert_eq!(forms[0]["text"], "body");
        assert!(!forms[0].contains_key("header"));
    }

    #[tokio::test]
    async fn test_simple_tags_stripped_before_send() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        notifier(&server, configured_store())
            .notify("H", "<b>bold</b> text", None)
            .await
            .unwrap();

        assert_eq!(sent_forms(&server).await[0]["text"], "bold text");
    }

    #[tokio::test]
    async fn test_attributed_tags_sent_unchanged() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;

        notifier(&server, configured_store())
            .notify("H", "<b class=x>bold</b>", None)
            .await
            .unwrap();

        assert_eq!(sent_forms(&server).await[0]["text"], "<b class=x>bold</b>");
    }

    #[tokio::test]
    async fn test_non_200_is_delivery_failure() {
        for status in [201, 403, 500] {
            let server = MockServer::start().await;
            mock_send(&server, status, 1).await;

            let err = notifier(&server, configured_store())
                .notify("H", "hello", None)
                .await
                .unwrap_err();

            match err {
                AppError::Notification(e) => {
                    assert_eq!(e.kind(), NotificationErrorKind::DeliveryFailed);
                    assert_eq!(e.code(), 2);
                    assert_eq!(e.status(), Some(status));
                }
                other => panic!("Expected notification error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_is_delivery_failure_without_token() {
        // Nothing listens on the discard port
        let config = TelegramConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..TelegramConfig::default()
        };
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            Arc::new(configured_store()),
            &config,
        );

        let err = notifier.notify("H", "hello", None).await.unwrap_err();
        match err {
            AppError::Notification(e) => {
                assert_eq!(e.kind(), NotificationErrorKind::DeliveryFailed);
                assert!(e.status().is_none());
                let source = std::error::Error::source(&e).map(|s| s.to_string());
                assert!(!source.unwrap_or_default().contains(TOKEN));
            }
            other => panic!("Expected notification error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_identical_calls_are_independent() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 2).await;
        let notifier = notifier(&server, configured_store());

        assert!(notifier.notify("H", "same", None).await.unwrap());
        assert!(notifier.notify("H", "same", None).await.unwrap());

        assert_eq!(sent_forms(&server).await.len(), 2);
    }

    #[tokio::test]
    async fn test_settings_reread_on_every_call() {
        let server = MockServer::start().await;
        mock_send(&server, 200, 1).await;
        let store = Arc::new(InMemorySettingsStore::new());
        let config = TelegramConfig {
            api_base_url: server.uri(),
            ..TelegramConfig::default()
        };
        let notifier = TelegramNotifier::new(reqwest::Client::new(), store.clone(), &config);

        assert!(notifier.notify("H", "first", None).await.is_err());

        store
            .save(
                TelegramNotifier::NAME,
                &NotifierSettings::Telegram(TelegramSettings::new(CHAT_ID, TOKEN)),
            )
            .await
            .unwrap();
        assert!(notifier.notify("H", "second", None).await.unwrap());
    }

    #[test]
    fn test_default_endpoint() {
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            Arc::new(InMemorySettingsStore::new()),
            &TelegramConfig::default(),
        );
        assert_eq!(
            notifier.endpoint("T"),
            "https://api.telegram.org/botT/sendMessage"
        );
    }

    #[test]
    fn test_metadata() {
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            Arc::new(InMemorySettingsStore::new()),
            &TelegramConfig::default(),
        );
        assert_eq!(notifier.name(), "telegram");
        assert_eq!(notifier.notifier_type(), NotifierType::ShortText);

        let form = notifier.form();
        assert_eq!(form.len(), 1);
        let keys: Vec<_> = form[0].fields.iter().map(|f| (f.key, f.label, f.flex)).collect();
        assert_eq!(
            keys,
            vec![("chat_id", "Chat ID", 50), ("access_token", "Access token", 50)]
        );
    }

    #[test]
    fn test_validate_settings_rejects_token_with_slash() {
        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            Arc::new(InMemorySettingsStore::new()),
            &TelegramConfig::default(),
        );
        let bad = NotifierSettings::Telegram(TelegramSettings::new(1, "123/abc"));
        assert!(notifier.validate_settings(&bad).is_err());

        let unset = NotifierSettings::Telegram(TelegramSettings::default());
        assert!(notifier.validate_settings(&unset).is_ok());
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>bold</b> text"), "bold text");
        assert_eq!(strip_tags("<B>x</B><i>y</i>"), "xy");
        assert_eq!(strip_tags("<b class=x>bold</b>"), "<b class=x>bold</b>");
        assert_eq!(strip_tags("<b><i x=1>y</i></b>"), "<i x=1>y</i>");
        assert_eq!(strip_tags("stray</i> close"), "stray close");
        assert_eq!(strip_tags("a < b > c"), "a < b > c");
        assert_eq!(strip_tags("<h1>t</h1>"), "<h1>t</h1>");
    }

    #[test]
    fn test_compose_text() {
        assert_eq!(compose_text("hello", None), "hello");
        assert_eq!(compose_text("hello", Some("http://x")), "hello\nhttp://x");
        assert_eq!(compose_text("hello", Some("")), "hello");
    }

    proptest! {
        #[test]
        fn strip_tags_leaves_tag_free_text_alone(text in "[^<>]*") {
            prop_assert_eq!(strip_tags(&text), text.as_str());
        }

        #[test]
        fn strip_tags_removes_every_simple_tag(
            word in "[a-zA-Z]{1,8}",
            inner in "[^<>]{0,20}",
        ) {
            let wrapped = format!("<{word}>{inner}</{word}>");
            prop_assert_eq!(strip_tags(&wrapped), inner.as_str());
        }
    }
}

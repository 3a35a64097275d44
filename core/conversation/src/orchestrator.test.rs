use super::*;
use crate::license::MANAGED_UNAVAILABLE;
use async_trait::async_trait;
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct FixedValidator(LicenseStatus);

#[async_trait]
impl LicenseValidator for FixedValidator {
    async fn validate(&self, _license_code: &str) -> Result<LicenseStatus> {
        Ok(self.0.clone())
    }
}

fn personal(credential: &str, assistant_id: &str) -> RequestConfig {
    RequestConfig {
        credential: credential.to_string(),
        assistant_id: assistant_id.to_string(),
        ..Default::default()
    }
}

fn managed(license_code: &str) -> RequestConfig {
    RequestConfig {
        mode: ConfigMode::Managed,
        license_code: license_code.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_personal_routes() {
    let conversation = Conversation::new();

    assert_eq!(
        conversation.select_route(&personal("sk-1", "")).await.unwrap(),
        Route::Stateless {
            credential: "sk-1".to_string()
        }
    );
    assert_eq!(
        conversation.select_route(&personal("sk-1", " asst_1 ")).await.unwrap(),
        Route::Stateful {
            credential: "sk-1".to_string(),
            assistant_id: "asst_1".to_string()
        }
    );
}

#[tokio::test]
async fn test_personal_without_key_is_configuration_error() {
    let conversation = Conversation::new();
    let error = conversation
        .select_route(&personal("  ", "asst_1"))
        .await
        .unwrap_err();

    assert!(matches!(error, ConversationError::Configuration(_)));
    assert_eq!(error.user_message(), MISSING_API_KEY);
}

#[tokio::test]
async fn test_managed_default_validator_reports_unavailable() {
    let conversation = Conversation::new();
    assert_eq!(
        conversation.select_route(&managed("LIC-1")).await.unwrap(),
        Route::Advisory(MANAGED_UNAVAILABLE.to_string())
    );
    assert_eq!(
        conversation.select_route(&managed("")).await.unwrap(),
        Route::Advisory(MISSING_LICENSE.to_string())
    );
}

#[tokio::test]
async fn test_managed_valid_license() {
    let conversation =
        Conversation::new().with_license_validator(Arc::new(FixedValidator(LicenseStatus::Valid {
            credential: "sk-managed".to_string(),
            assistant_id: "asst_managed".to_string(),
        })));

    // The personal assistant id is ignored in managed mode.
    let mut config = managed("LIC-1");
    config.assistant_id = "asst_personal".to_string();

    assert_eq!(
        conversation.select_route(&config).await.unwrap(),
        Route::Stateful {
            credential: "sk-managed".to_string(),
            assistant_id: "asst_managed".to_string()
        }
    );
}

#[tokio::test]
async fn test_managed_license_without_assistant() {
    let conversation =
        Conversation::new().with_license_validator(Arc::new(FixedValidator(LicenseStatus::Valid {
            credential: "sk-managed".to_string(),
            assistant_id: String::new(),
        })));

    assert_eq!(
        conversation.select_route(&managed("LIC-1")).await.unwrap(),
        Route::Advisory(MANAGED_REQUIRES_ASSISTANT.to_string())
    );
}

#[test]
fn test_route_debug_hides_credential() {
    let route = Route::Stateful {
        credential: "sk-secret".to_string(),
        assistant_id: "asst_1".to_string(),
    };
    let debug = format!("{route:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("asst_1"));
}

#[test]
fn test_client_reused_for_same_credential() {
    let conversation = Conversation::new();
    conversation.client("sk-1", "https://api.openai.com/v1").unwrap();
    conversation.client("sk-1", "https://api.openai.com/v1").unwrap();
    assert_eq!(
        conversation
            .client
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| c.credential.as_str()),
        Some("sk-1")
    );

    conversation.client("sk-2", "https://api.openai.com/v1").unwrap();
    assert_eq!(
        conversation
            .client
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| c.credential.as_str()),
        Some("sk-2")
    );
}

#[test]
fn test_reply_accessors() {
    assert_eq!(Reply::Message("<p>Hi</p>".into()).text(), "<p>Hi</p>");
    assert!(Reply::Advisory("later".into()).is_advisory());
    assert!(!Reply::Message("x".into()).is_advisory());
}

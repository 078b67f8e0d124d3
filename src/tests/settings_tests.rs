#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::{routes, Method};
    use crate::error::UiError;
    use crate::settings::{validate_settings, SettingsForm};
    use crate::tests::fakes::FakeTransport;
    use crate::types::Settings;

    fn settings_json() -> String {
        json!({
            "s3_bucket": "robot-logs",
            "s3_prefix": "fleet/",
            "aws_region": "eu-central-1",
            "upload_concurrency": 4,
            "skip_duplicates": true,
            "auto_upload": false,
            "retention_days": 30
        })
        .to_string()
    }

    fn loaded() -> SettingsForm {
        let mut form = SettingsForm::new();
        form.set_loaded(serde_json::from_str(&settings_json()).unwrap());
        form
    }

    fn field_of(err: UiError) -> String {
        match err {
            UiError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keys_survive_roundtrip() {
        let s: Settings = serde_json::from_str(&settings_json()).unwrap();
        assert_eq!(s.extra.get("retention_days"), Some(&json!(30)));
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["retention_days"], json!(30));
    }

    #[test]
    fn test_set_field_marks_dirty_and_discard_restores() {
        let mut form = loaded();
        assert!(!form.is_dirty());
        form.set_field("upload_concurrency", " 8 ").unwrap();
        form.set_field("auto_upload", "yes").unwrap();
        form.set_field("default_folder", "").unwrap();
        assert!(form.is_dirty());
        assert_eq!(form.draft().unwrap().upload_concurrency, 8);
        assert!(form.draft().unwrap().auto_upload);
        assert_eq!(form.draft().unwrap().default_folder, None);

        form.discard();
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut form = loaded();
        assert_eq!(field_of(form.set_field("upload_concurrency", "many").unwrap_err()), "upload_concurrency");
        assert_eq!(field_of(form.set_field("auto_upload", "maybe").unwrap_err()), "auto_upload");
        assert_eq!(field_of(form.set_field("colour", "blue").unwrap_err()), "colour");
        assert!(SettingsForm::new().set_field("s3_bucket", "x").is_err());
    }

    #[test]
    fn test_validation_rules() {
        let mut s: Settings = serde_json::from_str(&settings_json()).unwrap();
        assert!(validate_settings(&s).is_ok());

        s.upload_concurrency = 0;
        assert_eq!(
            validate_settings(&s).unwrap_err().to_string(),
            "Upload concurrency must be between 1 and 32"
        );
        s.upload_concurrency = 33;
        assert!(validate_settings(&s).is_err());
        s.upload_concurrency = 32;
        assert!(validate_settings(&s).is_ok());

        s.s3_bucket = "  ".into();
        assert_eq!(validate_settings(&s).unwrap_err().to_string(), "Bucket name must not be empty");
    }

    #[tokio::test]
    async fn test_invalid_draft_is_never_sent() {
        let transport = FakeTransport::new();
        let api = transport.client();
        let mut form = loaded();
        form.set_field("s3_bucket", "").unwrap();
        assert!(form.save(&api).await.is_err());
        assert!(transport.request_paths().is_empty());
    }

    #[tokio::test]
    async fn test_save_puts_draft_and_resets_baseline() {
        let transport = FakeTransport::new();
        let mut saved: serde_json::Value = serde_json::from_str(&settings_json()).unwrap();
        saved["upload_concurrency"] = json!(8);
        transport.on(Method::Put, routes::SETTINGS, 200, &saved.to_string());
        let api = transport.client();

        let mut form = loaded();
        form.set_field("upload_concurrency", "8").unwrap();
        form.save(&api).await.unwrap();

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Put);
        let body: serde_json::Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["upload_concurrency"], json!(8));
        assert_eq!(body["retention_days"], json!(30));
        drop(requests);
        assert!(!form.is_dirty());
    }

    #[tokio::test]
    async fn test_cache_actions_refresh_stats() {
        let transport = FakeTransport::new();
        transport.on(Method::Post, routes::CACHE_SYNC, 200, r#"{"message":"ok","affected":12}"#);
        transport.on(Method::Get, routes::CACHE_STATS, 200, r#"{"total_entries":12,"uploaded_files":10}"#);
        let api = transport.client();

        let mut form = SettingsForm::new();
        let resp = form.sync_cache(&api).await.unwrap();
        assert_eq!(resp.affected, 12);
        assert_eq!(form.cache.as_ref().unwrap().uploaded_files, 10);
        assert_eq!(transport.request_paths(), vec![routes::CACHE_SYNC.to_string(), routes::CACHE_STATS.to_string()]);
    }

    #[tokio::test]
    async fn test_update_text() {
        let transport = FakeTransport::new();
        transport.on(
            Method::Get,
            routes::VERSION_CHECK,
            200,
            r#"{"current_version":"1.2.0","latest_version":"1.4.0","update_available":true}"#,
        );
        let api = transport.client();
        let mut form = SettingsForm::new();
        assert_eq!(form.update_text(), None);
        form.check_update(&api).await.unwrap();
        assert_eq!(form.update_text().as_deref(), Some("Update available: 1.4.0"));
    }
}

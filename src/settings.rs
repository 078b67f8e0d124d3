//! Settings page: editable upload settings, version info and cache maintenance.

use tracing::info;

use crate::api::{ApiClient, HttpTransport};
use crate::error::{UiError, UiResult};
use crate::types::{CacheActionResponse, CacheStats, Settings, UpdateCheck, VersionInfo};

pub const MAX_CONCURRENCY: u32 = 32;

/// Loaded settings plus a local draft; the page is dirty while they differ.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    saved: Option<Settings>,
    draft: Option<Settings>,
    pub version: Option<VersionInfo>,
    pub update: Option<UpdateCheck>,
    pub cache: Option<CacheStats>,
}

impl SettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loaded(&mut self, settings: Settings) {
        self.draft = Some(settings.clone());
        self.saved = Some(settings);
    }

    pub async fn load<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        let settings = api.get_settings().await?;
        self.set_loaded(settings);
        Ok(())
    }

    pub fn draft(&self) -> Option<&Settings> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Settings> {
        self.draft.as_mut()
    }

    pub fn is_dirty(&self) -> bool {
        self.saved != self.draft
    }

    /// Throw away local edits.
    pub fn discard(&mut self) {
        self.draft = self.saved.clone();
    }

    /// Set one field from text input.
    pub fn set_field(&mut self, field: &str, value: &str) -> UiResult<()> {
        let draft = self.draft.as_mut().ok_or_else(|| UiError::validation(field, "Settings not loaded yet"))?;
        let value = value.trim();
        match field {
            "s3_bucket" => draft.s3_bucket = value.to_string(),
            "s3_prefix" => draft.s3_prefix = value.to_string(),
            "aws_region" => draft.aws_region = value.to_string(),
            "default_folder" => {
                draft.default_folder = if value.is_empty() { None } else { Some(value.to_string()) }
            }
            "upload_concurrency" => {
                draft.upload_concurrency = value
                    .parse()
                    .map_err(|_| UiError::validation(field, format!("'{}' is not a number", value)))?
            }
            "skip_duplicates" => draft.skip_duplicates = parse_bool(field, value)?,
            "auto_upload" => draft.auto_upload = parse_bool(field, value)?,
            other => return Err(UiError::validation(other, format!("Unknown setting '{}'", other))),
        }
        Ok(())
    }

    pub fn validate(&self) -> UiResult<()> {
        let Some(d) = &self.draft else {
            return Err(UiError::validation("settings", "Settings not loaded yet"));
        };
        validate_settings(d)
    }

    /// Validate and save the draft. The server's answer becomes the new baseline.
    pub async fn save<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        self.validate()?;
        let Some(draft) = &self.draft else {
            return Ok(());
        };
        let saved = api.save_settings(draft).await?;
        info!(bucket = %saved.s3_bucket, concurrency = saved.upload_concurrency, "settings saved");
        self.set_loaded(saved);
        Ok(())
    }

    pub async fn load_version<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        self.version = Some(api.version().await?);
        Ok(())
    }

    pub async fn check_update<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<&UpdateCheck> {
        let check = api.check_update().await?;
        Ok(self.update.insert(check))
    }

    pub async fn refresh_cache<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        self.cache = Some(api.cache_stats().await?);
        Ok(())
    }

    /// Sync the upload cache with the bucket, then reload its stats.
    pub async fn sync_cache<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<CacheActionResponse> {
        let resp = api.sync_cache().await?;
        self.refresh_cache(api).await?;
        Ok(resp)
    }

    pub async fn invalidate_cache<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<CacheActionResponse> {
        let resp = api.invalidate_cache().await?;
        self.refresh_cache(api).await?;
        Ok(resp)
    }

    /// `Update available: 1.4.0` / `Up to date`
    pub fn update_text(&self) -> Option<String> {
        self.update.as_ref().map(|u| match (&u.latest_version, u.update_available) {
            (Some(latest), true) => format!("Update available: {}", latest),
            _ => "Up to date".to_string(),
        })
    }
}

pub fn validate_settings(s: &Settings) -> UiResult<()> {
    if s.s3_bucket.trim().is_empty() {
        return Err(UiError::validation("s3_bucket", "Bucket name must not be empty"));
    }
    if s.upload_concurrency == 0 || s.upload_concurrency > MAX_CONCURRENCY {
        return Err(UiError::validation(
            "upload_concurrency",
            format!("Upload concurrency must be between 1 and {}", MAX_CONCURRENCY),
        ));
    }
    Ok(())
}

fn parse_bool(field: &str, value: &str) -> UiResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(UiError::validation(field, format!("'{}' is not a boolean", value))),
    }
}

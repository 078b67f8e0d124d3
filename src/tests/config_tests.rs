#[cfg(test)]
mod tests {
    use crate::config::{self, UiConfig};

    #[test]
    fn test_default_config() {
        let cfg = UiConfig::default();
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.progress.analysis_weight, 70.0);
        assert_eq!(cfg.progress.upload_weight, 30.0);
        assert_eq!(cfg.progress.frame_interval_ms, 16);
        assert_eq!(cfg.browser.folders_per_page, 50);
        assert!(config::validate(&cfg).is_ok());

        let w = cfg.phase_weights();
        assert_eq!(w.analysis + w.upload, 100.0);
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let mut cfg = UiConfig::default();
        cfg.progress.upload_weight = 40.0;
        let err = config::validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("must equal 100"));

        cfg.progress.analysis_weight = 60.0;
        assert!(config::validate(&cfg).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = UiConfig::default();
        cfg.api.base_url = " ".into();
        assert!(config::validate(&cfg).is_err());

        let mut cfg = UiConfig::default();
        cfg.progress.frame_interval_ms = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = UiConfig::default();
        cfg.logs.page_size = 0;
        assert!(config::validate(&cfg).unwrap_err().to_string().contains("logs.page_size"));
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_env_overrides_defaults() {
        std::env::set_var("WOLKENLIFT__API__BASE_URL", "http://uploader.local:9000");
        std::env::set_var("WOLKENLIFT__COMPLETION__PAGE_SIZE", "25");
        let cfg = config::load();
        std::env::remove_var("WOLKENLIFT__API__BASE_URL");
        std::env::remove_var("WOLKENLIFT__COMPLETION__PAGE_SIZE");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.api.base_url, "http://uploader.local:9000");
        assert_eq!(cfg.completion.page_size, 25);
    }
}

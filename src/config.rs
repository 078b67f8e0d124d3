use serde::Deserialize;

use crate::progress::PhaseWeights;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    pub analysis_weight: f64,
    pub upload_weight: f64,
    /// Render tick for targets without an animation frame (native client).
    pub frame_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    pub folders_per_page: usize,
    pub review_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    pub page_size: usize,
    pub default_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    pub state_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub api: ApiConfig,
    pub progress: ProgressConfig,
    pub browser: BrowserConfig,
    pub completion: CompletionConfig,
    pub logs: LogsConfig,
    pub persistence: PersistenceConfig,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for UiConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(ui_cfg) => ui_cfg,
                Err(e) => panic!("Failed to deserialize default config: {}", e),
            },
            Err(e) => panic!("Failed to parse default config: {}", e),
        }
    }
}

impl UiConfig {
    /// Phase weights for the overall progress bar. Only valid after [`validate`] passed.
    pub fn phase_weights(&self) -> PhaseWeights {
        PhaseWeights {
            analysis: self.progress.analysis_weight,
            upload: self.progress.upload_weight,
        }
    }
}

/// Load configuration: embedded defaults -> wolkenlift.toml -> $WOLKENLIFT_CONFIG -> env.
#[cfg(feature = "native")]
pub fn load() -> anyhow::Result<UiConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: wolkenlift.toml (in CWD)
        .add_source(::config::File::with_name("wolkenlift").required(false));

    if let Ok(custom_path) = std::env::var("WOLKENLIFT_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("WOLKENLIFT").separator("__"));

    let cfg = builder.build()?;
    let ui_cfg: UiConfig = cfg.try_deserialize()?;
    validate(&ui_cfg)?;
    Ok(ui_cfg)
}

pub fn validate(cfg: &UiConfig) -> anyhow::Result<()> {
    // API
    if cfg.api.base_url.trim().is_empty() {
        return Err(anyhow::anyhow!("api.base_url must not be empty"));
    }
    if cfg.api.request_timeout_ms == 0 {
        return Err(anyhow::anyhow!("api.request_timeout_ms must be > 0"));
    }

    // Progress
    let p = &cfg.progress;
    if p.analysis_weight < 0.0 || p.upload_weight < 0.0 {
        return Err(anyhow::anyhow!("progress weights must not be negative"));
    }
    if ((p.analysis_weight + p.upload_weight) - 100.0).abs() > 1e-6 {
        return Err(anyhow::anyhow!(
            "progress.analysis_weight + progress.upload_weight must equal 100 (got {} + {})",
            p.analysis_weight,
            p.upload_weight
        ));
    }
    if p.frame_interval_ms == 0 {
        return Err(anyhow::anyhow!("progress.frame_interval_ms must be > 0"));
    }
    if p.frame_interval_ms > 1000 {
        tracing::warn!("progress.frame_interval_ms={} - progress will look choppy", p.frame_interval_ms);
    }

    // Paging
    if cfg.browser.folders_per_page == 0 {
        return Err(anyhow::anyhow!("browser.folders_per_page must be > 0"));
    }
    if cfg.browser.review_page_size == 0 {
        return Err(anyhow::anyhow!("browser.review_page_size must be > 0"));
    }
    if cfg.completion.page_size == 0 {
        return Err(anyhow::anyhow!("completion.page_size must be > 0"));
    }
    if cfg.logs.page_size == 0 {
        return Err(anyhow::anyhow!("logs.page_size must be > 0"));
    }

    Ok(())
}

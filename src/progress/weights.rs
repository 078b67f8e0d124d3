use crate::error::{UiError, UiResult};
use crate::types::FileState;

/// Sub-phase of a job. Analysis always precedes upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analysis,
    Upload,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Analysis => "Analyzing",
            Phase::Upload => "Uploading",
        }
    }

    /// Status that counts as "waiting in line" during this phase.
    pub fn queued_state(&self) -> FileState {
        match self {
            Phase::Analysis => FileState::Pending,
            Phase::Upload => FileState::Ready,
        }
    }
}

/// Share of the overall progress bar each phase owns. Sums to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseWeights {
    pub analysis: f64,
    pub upload: f64,
}

impl Default for PhaseWeights {
    fn default() -> Self {
        Self { analysis: 70.0, upload: 30.0 }
    }
}

impl PhaseWeights {
    pub fn new(analysis: f64, upload: f64) -> UiResult<Self> {
        if analysis < 0.0 || upload < 0.0 || ((analysis + upload) - 100.0).abs() > 1e-6 {
            return Err(UiError::Config(format!(
                "phase weights must be non-negative and sum to 100 (got {} + {})",
                analysis, upload
            )));
        }
        Ok(Self { analysis, upload })
    }

    /// Weight of all phases before `phase`.
    pub fn prior(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Analysis => 0.0,
            Phase::Upload => self.analysis,
        }
    }

    pub fn weight(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Analysis => self.analysis,
            Phase::Upload => self.upload,
        }
    }

    /// `fraction * weight(phase) + prior(phase)`; fraction is clamped to 0..=1.
    pub fn overall(&self, phase: Phase, fraction: f64) -> f64 {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        fraction * self.weight(phase) + self.prior(phase)
    }
}

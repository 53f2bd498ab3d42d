use lead_analyzer::config::AnalyticsConfig;
use lead_analyzer::leads::outreach::{OutreachChannel, PodcastFormat, ScriptTemplate};
use lead_analyzer::leads::LeadStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<Mutex<LeadStore>>,
    pub(crate) analytics: AnalyticsConfig,
}

impl AppState {
    pub(crate) fn new(metrics: PrometheusHandle, analytics: AnalyticsConfig) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            store: Arc::new(Mutex::new(LeadStore::new())),
            analytics,
        }
    }

    /// Callers must drop the guard before awaiting.
    pub(crate) fn store(&self) -> MutexGuard<'_, LeadStore> {
        self.store.lock().expect("lead store mutex poisoned")
    }
}

pub(crate) fn parse_template(raw: &str) -> Result<ScriptTemplate, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

pub(crate) fn parse_podcast_format(raw: &str) -> Result<PodcastFormat, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

pub(crate) fn parse_channel(raw: &str) -> Result<OutreachChannel, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new().build_recorder().handle();
    AppState::new(handle, AnalyticsConfig::default())
}

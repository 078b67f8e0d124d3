//! App-Zustand der Web-UI: eine Session pro Seitenaufruf, geteilt über den Dioxus-Kontext.
//!
//! Die Session liegt in einem `RefCell` und wird nie über ein `.await` hinweg
//! geliehen. Teilmodelle, die während eines Requests gebraucht werden (Browser,
//! Einstellungen, Logs), werden für die Dauer des Requests herausgenommen.
//! Neu gerendert wird nur, wenn `rev` hochgezählt wird: nach einem Frame-Flush
//! oder einer Benutzeraktion.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use chrono::Utc;
use dioxus::prelude::*;
use tracing::{debug, warn};

use wolkenlift::api::ApiClient;
use wolkenlift::browser::FolderBrowser;
use wolkenlift::config::UiConfig;
use wolkenlift::error::{UiError, UiResult};
use wolkenlift::logs::LogViewer;
use wolkenlift::progress::ConsumerOutcome;
use wolkenlift::settings::SettingsForm;
use wolkenlift::state::Session;
use wolkenlift::types::ScanFolderRequest;
use wolkenlift::upload::{self, JobStart, UploadOptions};

use crate::api::{EventSourceConnector, Hub, HubEvent, LocalStore, RafScheduler, ReqwasmTransport};
use crate::ui_utils::show_toast;

pub type WebSession = Session<EventSourceConnector, RafScheduler>;

#[derive(Clone)]
pub struct AppState {
    pub session: Rc<RefCell<WebSession>>,
    pub api: Rc<ApiClient<ReqwasmTransport>>,
    pub store: Rc<RefCell<LocalStore>>,
    pub rev: Signal<u64>,
}

impl AppState {
    pub fn new(rev: Signal<u64>) -> Self {
        let config = Arc::new(UiConfig::default());
        let hub = Hub::default();
        let session = Rc::new(RefCell::new(Session::new(
            config,
            EventSourceConnector::new(hub.clone()),
            RafScheduler::new(hub.clone()),
        )));
        let weak = Rc::downgrade(&session);
        hub.bind(move |ev| on_hub_event(&weak, rev, ev));
        Self { session, api: Rc::new(ApiClient::new(ReqwasmTransport)), store: Rc::new(RefCell::new(LocalStore)), rev }
    }

    /// Toasts ausgeben und einen Render anstoßen.
    pub fn touch(&self) {
        let toasts = self.session.borrow_mut().notifications.drain();
        for t in toasts {
            show_toast(&t.message, t.level.css_class());
        }
        let mut rev = self.rev;
        *rev.write() += 1;
    }

    /// Synchrone Änderung an der Session, danach Render.
    pub fn update(&self, f: impl FnOnce(&mut WebSession)) {
        f(&mut self.session.borrow_mut());
        self.touch();
    }

    pub fn report(&self, err: &UiError) {
        self.session.borrow_mut().report(err);
        self.touch();
    }

    fn config(&self) -> Arc<UiConfig> {
        self.session.borrow().config.clone()
    }

    // ----- Ordner -----

    /// Ordner öffnen (None: gemerkter Ordner bzw. Server-Wurzel) und im Hintergrund scannen.
    pub async fn open_folder(&self, path: Option<String>) {
        let per_page = self.config().browser.folders_per_page;
        let mut browser = std::mem::replace(&mut self.session.borrow_mut().browser, FolderBrowser::new(per_page));
        let res = browser.open(&self.api, path.as_deref()).await;
        self.session.borrow_mut().browser = browser;
        match res {
            Ok(()) => {
                self.touch();
                if let Err(e) = self.start_background_scan().await {
                    self.session.borrow_mut().report(&e);
                }
            }
            Err(e) => self.session.borrow_mut().report(&e),
        }
        self.touch();
    }

    /// Ordner beim ersten Laden: gemerkter Ordner, sonst Standardordner aus den Einstellungen.
    pub fn initial_path(&self) -> Option<String> {
        let default_folder = self
            .session
            .borrow()
            .settings
            .draft()
            .and_then(|s| s.default_folder.clone());
        FolderBrowser::initial_path(&*self.store.borrow(), default_folder.as_deref())
    }

    async fn start_background_scan(&self) -> UiResult<()> {
        let (root, previous) = {
            let mut s = self.session.borrow_mut();
            let Some(root) = s.browser.current_path().map(|p| p.to_string()) else {
                return Ok(());
            };
            if !s.scan.needs_restart(&root) && s.scan.is_streaming() {
                s.restore_scan_badges();
                return Ok(());
            }
            (root, s.scan.reset())
        };
        if let Some(prev) = previous {
            if let Err(e) = self.api.cancel_scan(&prev).await {
                warn!(scan_id = %prev, error = %e, "could not cancel previous scan");
            }
        }
        let resp = self.api.start_async_scan(&ScanFolderRequest { path: root.clone(), recursive: true }).await?;
        let replaced = {
            let mut s = self.session.borrow_mut();
            let replaced = s.scan.attach(&root, &resp.scan_id)?;
            s.browser.mark_scanning();
            replaced
        };
        // Zwei schnelle Navigationen: der ältere Scan läuft sonst weiter.
        if let Some(prev) = replaced {
            if let Err(e) = self.api.cancel_scan(&prev).await {
                warn!(scan_id = %prev, error = %e, "could not cancel replaced scan");
            }
        }
        Ok(())
    }

    /// Hintergrund-Scan beenden, z. B. beim Verlassen der Ordneransicht.
    pub async fn stop_background_scan(&self) {
        let previous = self.session.borrow_mut().scan.reset();
        if let Some(scan_id) = previous {
            if let Err(e) = self.api.cancel_scan(&scan_id).await {
                debug!(scan_id = %scan_id, error = %e, "scan cancel failed");
            }
        }
    }

    /// Aktuellen Ordner rekursiv scannen und das Ergebnis zur Auswahl anzeigen.
    pub async fn scan_for_review(&self) {
        let Some(root) = self.session.borrow().browser.current_path().map(|p| p.to_string()) else {
            return;
        };
        match self.api.scan_folder(&ScanFolderRequest { path: root, recursive: true }).await {
            Ok(resp) => {
                // Fehler (leerer Scan) meldet die Session selbst.
                let _ = self.session.borrow_mut().set_scan_result(resp);
            }
            Err(e) => self.session.borrow_mut().report(&e),
        }
        self.touch();
    }

    // ----- Jobs -----

    /// Job für die ausgewählten Dateien starten. `true`, wenn ein Fortschritts-Stream läuft.
    pub async fn start_upload(&self, opts: UploadOptions) -> bool {
        let (paths, root) = {
            let s = self.session.borrow();
            let paths = s.review.as_ref().map(|r| r.selected_paths()).unwrap_or_default();
            (paths, s.review.as_ref().map(|r| r.root().to_string()))
        };
        let started = match upload::request_job(&self.api, paths, opts).await {
            Ok(JobStart::PreFilter(stats)) => {
                self.session.borrow_mut().pre_filter = Some(stats);
                false
            }
            Ok(JobStart::Started { job_id, files, pre_filter }) => {
                let mut s = self.session.borrow_mut();
                s.pre_filter = pre_filter;
                match s.begin_job(&job_id, &files, Utc::now()) {
                    Ok(()) => true,
                    Err(e) => {
                        s.report(&e);
                        false
                    }
                }
            }
            Err(e) => {
                self.session.borrow_mut().report(&e);
                false
            }
        };
        if started {
            if let Some(root) = root {
                if let Err(e) = FolderBrowser::remember(&mut *self.store.borrow_mut(), &root) {
                    warn!(error = %e, "could not remember folder");
                }
            }
        }
        self.touch();
        started
    }

    /// Serverseitig abbrechen (best effort), lokal immer.
    pub async fn cancel_job(&self) {
        let job_id = self.session.borrow().job_id.clone();
        if let Some(job_id) = job_id {
            if let Err(e) = upload::cancel_job(&self.api, &job_id).await {
                warn!(job_id = %job_id, error = %e, "server-side cancel failed");
            }
        }
        self.session.borrow_mut().cancel_job_locally();
        self.touch();
    }

    /// Noch laufenden Job wieder aufnehmen. `true`, wenn einer gefunden wurde.
    pub async fn resume_active(&self) -> bool {
        if self.session.borrow().job_id.is_some() {
            return false;
        }
        let resumed = match upload::find_active_job(&self.api).await {
            Ok(Some(job)) => {
                let mut s = self.session.borrow_mut();
                match s.resume_job(&job, Utc::now()) {
                    Ok(()) => true,
                    Err(e) => {
                        s.report(&e);
                        false
                    }
                }
            }
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "active job lookup failed");
                false
            }
        };
        self.touch();
        resumed
    }

    // ----- Einstellungen -----

    fn take_settings(&self) -> SettingsForm {
        std::mem::replace(&mut self.session.borrow_mut().settings, SettingsForm::new())
    }

    fn put_settings(&self, form: SettingsForm) {
        self.session.borrow_mut().settings = form;
    }

    pub async fn load_settings(&self) {
        let mut form = self.take_settings();
        let res = form.load(&self.api).await;
        if let Err(e) = form.load_version(&self.api).await {
            debug!(error = %e, "version unavailable");
        }
        if let Err(e) = form.refresh_cache(&self.api).await {
            debug!(error = %e, "cache stats unavailable");
        }
        self.put_settings(form);
        if let Err(e) = res {
            self.session.borrow_mut().report(&e);
        }
        self.touch();
    }

    pub async fn save_settings(&self) {
        let mut form = self.take_settings();
        let res = form.save(&self.api).await;
        self.put_settings(form);
        match res {
            Ok(()) => {
                self.session.borrow_mut().notifications.success("Einstellungen gespeichert");
            }
            Err(e) => self.session.borrow_mut().report(&e),
        }
        self.touch();
    }

    pub async fn check_update(&self) {
        let mut form = self.take_settings();
        let res = form.check_update(&self.api).await.map(|_| ());
        self.put_settings(form);
        if let Err(e) = res {
            self.session.borrow_mut().report(&e);
        }
        self.touch();
    }

    /// `invalidate`: Cache verwerfen statt mit dem Bucket abgleichen.
    pub async fn cache_action(&self, invalidate: bool) {
        let mut form = self.take_settings();
        let res = if invalidate {
            form.invalidate_cache(&self.api).await
        } else {
            form.sync_cache(&self.api).await
        };
        self.put_settings(form);
        match res {
            Ok(r) => {
                let text = r.message.unwrap_or_else(|| format!("{} Einträge", r.affected));
                self.session.borrow_mut().notifications.success(text);
            }
            Err(e) => self.session.borrow_mut().report(&e),
        }
        self.touch();
    }

    // ----- Logs -----

    pub async fn refresh_logs(&self, with_files: bool) {
        let cfg = self.config();
        let mut viewer = std::mem::replace(
            &mut self.session.borrow_mut().logs,
            LogViewer::new(cfg.logs.page_size, cfg.logs.default_limit),
        );
        let mut res = viewer.refresh(&self.api).await;
        if res.is_ok() {
            res = viewer.load_stats(&self.api).await;
        }
        if res.is_ok() && with_files {
            res = viewer.load_files(&self.api).await;
        }
        self.session.borrow_mut().logs = viewer;
        if let Err(e) = res {
            self.session.borrow_mut().report(&e);
        }
        self.touch();
    }
}

/// SSE-Nachrichten und Animation-Frames in die Session leiten.
fn on_hub_event(session: &Weak<RefCell<WebSession>>, mut rev: Signal<u64>, ev: HubEvent) {
    let Some(session) = session.upgrade() else {
        return;
    };
    let Ok(mut s) = session.try_borrow_mut() else {
        // Nur möglich, wenn ein Callback synchron in eine Ausleihe fällt: im nächsten Tick erneut.
        let weak = Rc::downgrade(&session);
        wasm_bindgen_futures::spawn_local(async move { on_hub_event(&weak, rev, ev) });
        return;
    };
    let changed = match ev {
        HubEvent::Stream { stream_id, message } => {
            if Some(stream_id) == s.progress.connection_id() {
                !matches!(s.handle_progress(message, Utc::now()), ConsumerOutcome::Continue | ConsumerOutcome::Ignored)
            } else if Some(stream_id) == s.scan.connection_id() {
                s.handle_scan(message);
                true
            } else {
                debug!(stream_id, "message from closed stream dropped");
                false
            }
        }
        HubEvent::Frame => !s.progress.flush().is_noop(),
    };
    let toasts = s.notifications.drain();
    drop(s);
    for t in toasts {
        show_toast(&t.message, t.level.css_class());
    }
    if changed {
        *rev.write() += 1;
    }
}

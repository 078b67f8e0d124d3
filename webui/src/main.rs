use dioxus::events::FormData;
use dioxus::prelude::*;

use chrono::Utc;
use dioxus_router::prelude::*;

use wolkenlift::browser::{ReviewLine, REVIEW_COLUMNS};
use wolkenlift::completion::{csv_filename, COMPLETION_COLUMNS};
use wolkenlift::format::fmt_bytes;
use wolkenlift::logs::level_css_class;
use wolkenlift::sorting::SortDirection;
use wolkenlift::state::{PANEL_ERROR, PANEL_REVIEW};
use wolkenlift::types::LogLevel;
use wolkenlift::upload::UploadOptions;

mod api;
mod state;
mod ui_utils;
use state::AppState;
use ui_utils::{bar_width, download_csv};

const LOG_LEVELS: [LogLevel; 5] = [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error, LogLevel::Critical];

// ----- Routing -----
#[derive(Routable, Clone, Debug, PartialEq)]
pub enum Route {
    #[route("/")]
    Browse {},
    #[route("/progress")]
    Progress {},
    #[route("/completion")]
    Completion {},
    #[route("/settings")]
    Settings {},
    #[route("/logs")]
    Logs {},
}

pub fn main() {
    console_error_panic_hook::set_once();
    dioxus_web::launch::launch(app, vec![], Default::default());
}

fn app() -> Element {
    // Render-Zähler: jede Änderung an der Session zählt ihn hoch
    let rev = use_signal(|| 0_u64);
    use_context_provider(|| AppState::new(rev));

    rsx! {
        div { // root wrapper
            // App Header
            div { class: "app-header",
                div { class: "container",
                    div { class: "brand",
                        span { "☁ Wolkenlift" }
                    }
                    nav {
                        Link { to: Route::Browse {}, "Ordner" }
                        Link { to: Route::Progress {}, "Fortschritt" }
                        Link { to: Route::Completion {}, "Abschluss" }
                        Link { to: Route::Settings {}, "Einstellungen" }
                        Link { to: Route::Logs {}, "Logs" }
                    }
                }
            }
            // App Content (Router)
            Router::<Route> {}
            // Toast container for notifications
            div { id: "toasts", class: "toast-container" }
        }
    }
}

// ----- Ordneransicht mit Hintergrund-Scan und Auswahl -----
#[component]
fn Browse() -> Element {
    let state = use_context::<AppState>();
    let nav = use_navigator();
    let auto_upload = use_signal(|| false);
    let skip_duplicates = use_signal(|| true);
    let pre_filter_only = use_signal(|| false);
    let busy = use_signal(|| false);

    // Erster Aufruf: laufenden Job übernehmen, sonst zuletzt genutzten Ordner öffnen
    {
        let state = state.clone();
        use_effect(move || {
            let state = state.clone();
            spawn(async move {
                if state.resume_active().await {
                    nav.push(Route::Progress {});
                    return;
                }
                let path = state.initial_path();
                state.open_folder(path).await;
            });
        });
    }
    // Verlassen der Ansicht beendet den Hintergrund-Scan
    {
        let state = state.clone();
        use_drop(move || {
            let state = state.clone();
            wasm_bindgen_futures::spawn_local(async move { state.stop_background_scan().await });
        });
    }

    let _rev = *state.rev.read();
    let s = state.session.borrow();
    let b = &s.browser;
    let current = b.current_path().unwrap_or("").to_string();
    let parent = b.parent_path().map(|p| p.to_string());
    let crumbs: Vec<(String, String)> = b.breadcrumbs().iter().map(|c| (c.name.clone(), c.path.clone())).collect();
    let links: Vec<(String, String)> = b.quick_links().iter().map(|q| (q.name.clone(), q.path.clone())).collect();
    let rows: Vec<_> = b.page_rows().into_iter().cloned().collect();
    let files = b.files().to_vec();
    let page_label = b.pagination().label();
    let (has_prev, has_next) = (b.pagination().has_prev(), b.pagination().has_next());
    let root_files = b.root_files();
    let scan_done = s.scan.aggregator().map(|a| a.is_complete()).unwrap_or(false);
    let scan_blocked = scan_done && !b.upload_enabled();
    let review = s.review.clone().filter(|_| s.panels.is_visible(PANEL_REVIEW));
    let pre_filter = s.pre_filter.clone();
    drop(s);

    let open = {
        let state = state.clone();
        move |path: Option<String>| {
            let state = state.clone();
            spawn(async move { state.open_folder(path).await });
        }
    };

    rsx! {
        div { style: panel_style(),
            h2 { "Ordner" }
            // Breadcrumbs und Schnellzugriff
            div { style: "display:flex;gap:6px;flex-wrap:wrap;align-items:center;",
                { crumbs.into_iter().map(|(name, path)| {
                    let open = open.clone();
                    rsx!{ button { style: btn_style(), onclick: move |_| open(Some(path.clone())), "{name}" } }
                }) }
                if let Some(par) = parent {
                    button { style: btn_style(), onclick: {
                            let open = open.clone();
                            move |_| open(Some(par.clone()))
                        }, "⬆ Übergeordnet" }
                }
            }
            div { style: "margin:6px 0;color:#a0aec0;", "{current}" }
            if !links.is_empty() {
                div { style: "display:flex;gap:6px;flex-wrap:wrap;",
                    { links.into_iter().map(|(name, path)| {
                        let open = open.clone();
                        rsx!{ button { style: btn_style(), title: "{path}", onclick: move |_| open(Some(path.clone())), "★ {name}" } }
                    }) }
                }
            }

            // Unterordner mit Scan-Badges
            table { style: table_style(),
                thead { tr { th { "Ordner" } th { ".mcap" } th { "Geändert" } th { "Status" } } }
                tbody {
                    { rows.into_iter().map(|k| {
                        let open = open.clone();
                        let path = k.row.path.clone();
                        let badge = k.row.badge;
                        let count = k.row.mcap_count.map(|c| c.to_string()).unwrap_or_default();
                        let modified = k.row.modified.clone().unwrap_or_default();
                        rsx!{ tr { key: "{k.key}",
                            td { a { href: "#", onclick: move |e: Event<MouseData>| { e.prevent_default(); open(Some(path.clone())) }, "📁 {k.row.name}" } }
                            td { "{count}" }
                            td { "{modified}" }
                            td { { badge.map(|bd| rsx!(span { class: "{bd.css_class()}", "{bd.label()}" })) } }
                        } }
                    }) }
                }
            }
            if !files.is_empty() {
                table { style: table_style(),
                    thead { tr { th { "Datei" } th { "Größe" } th { "Geändert" } } }
                    tbody {
                        { files.iter().map(|f| {
                            let size = f.size_formatted.clone().unwrap_or_else(|| fmt_bytes(f.size));
                            let modified = f.modified.clone().unwrap_or_default();
                            rsx!{ tr { key: "{f.path}", td { "{f.name}" } td { "{size}" } td { "{modified}" } } }
                        }) }
                    }
                }
            }
            if root_files.total > 0 {
                div { style: "margin-top:6px;color:#a0aec0;",
                    "Dateien in diesem Ordner: {root_files.total}, davon hochgeladen: {root_files.uploaded}" }
            }
            div { style: "display:flex;gap:8px;align-items:center;margin-top:8px;",
                button { style: btn_style(), disabled: !has_prev, onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| { s.browser.prev_page(); })
                    }, "◀" }
                span { "{page_label}" }
                button { style: btn_style(), disabled: !has_next, onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| { s.browser.next_page(); })
                    }, "▶" }
                button { style: btn_primary_style(), disabled: scan_blocked || *busy.read(), onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            let mut busy = busy.clone();
                            spawn(async move {
                                busy.set(true);
                                state.scan_for_review().await;
                                busy.set(false);
                            });
                        }
                    }, "Dateien auswählen…" }
                if scan_blocked { span { style: "color:#a0aec0;", "Alle Dateien sind bereits hochgeladen" } }
            }
        }

        // Auswahl vor dem Upload
        if let Some(review) = review {
            div { style: panel_style(),
                h2 { "Auswahl: {review.root()}" }
                div { style: "color:#a0aec0;", "{review.summary_text()}" }
                div { style: "display:flex;gap:6px;flex-wrap:wrap;margin:8px 0;",
                    button { style: btn_style(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.select_all(true) })
                        }, "Alle" }
                    button { style: btn_style(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.select_all(false) })
                        }, "Keine" }
                    button { style: btn_style(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.select_only_new() })
                        }, "Nur neue" }
                    button { style: btn_style(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.expand_all() })
                        }, "Alle aufklappen" }
                    button { style: btn_style(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.collapse_all() })
                        }, "Alle zuklappen" }
                }
                table { style: table_style(),
                    thead { tr {
                        th { "" }
                        { REVIEW_COLUMNS.iter().map(|col| {
                            let state = state.clone();
                            let col = *col;
                            let ind = review.sort().indicator(col);
                            rsx!{ th { style: "cursor:pointer;",
                                onclick: move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.toggle_sort(col) }),
                                "{review_column_label(col)} {ind}" } }
                        }) }
                    } }
                    tbody {
                        { review.page_lines().into_iter().map(|line| match line {
                            ReviewLine::Group(g) => {
                                let state = state.clone();
                                let folder = g.folder.clone();
                                let c = g.counts();
                                let marker = if g.expanded { "▾" } else { "▸" };
                                let size = fmt_bytes(g.total_size());
                                rsx!{ tr { key: "g:{g.folder}", style: "cursor:pointer;background:#111827;",
                                    onclick: move |_| { let folder = folder.clone(); state.update(move |s| if let Some(r) = s.review.as_mut() { r.toggle_group(&folder); }) },
                                    td { "{marker}" }
                                    td { colspan: "4", "{g.title()} ({c.total} Dateien, {c.pending()} neu, {size})" }
                                } }
                            }
                            ReviewLine::File(f) => {
                                let state = state.clone();
                                let path = f.file.path.clone();
                                let status = if f.file.already_uploaded { "hochgeladen" } else { "neu" };
                                let modified = f.file.modified.clone().unwrap_or_default();
                                let size = f.file.size_formatted.clone().unwrap_or_else(|| fmt_bytes(f.file.size));
                                rsx!{ tr { key: "f:{f.file.path}",
                                    td { input { r#type: "checkbox", checked: f.selected,
                                        oninput: move |_| { let path = path.clone(); state.update(move |s| if let Some(r) = s.review.as_mut() { r.toggle_file(&path); }) } } }
                                    td { "{f.file.name}" }
                                    td { "{size}" }
                                    td { "{modified}" }
                                    td { "{status}" }
                                } }
                            }
                        }) }
                    }
                }
                div { style: "display:flex;gap:8px;align-items:center;margin-top:8px;",
                    button { style: btn_style(), disabled: !review.pagination().has_prev(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.pagination_mut().prev(); })
                        }, "◀" }
                    span { "{review.pagination().label()}" }
                    button { style: btn_style(), disabled: !review.pagination().has_next(), onclick: {
                            let state = state.clone();
                            move |_| state.update(|s| if let Some(r) = s.review.as_mut() { r.pagination_mut().next(); })
                        }, "▶" }
                }
                // Upload-Optionen
                div { style: "display:flex;gap:14px;flex-wrap:wrap;margin-top:10px;",
                    label { input { r#type: "checkbox", checked: *auto_upload.read(), oninput: move |_| { let current = *auto_upload.read(); let mut auto_upload = auto_upload.clone(); auto_upload.set(!current); } } " Direkt hochladen" }
                    label { input { r#type: "checkbox", checked: *skip_duplicates.read(), oninput: move |_| { let current = *skip_duplicates.read(); let mut skip_duplicates = skip_duplicates.clone(); skip_duplicates.set(!current); } } " Duplikate überspringen" }
                    label { input { r#type: "checkbox", checked: *pre_filter_only.read(), oninput: move |_| { let current = *pre_filter_only.read(); let mut pre_filter_only = pre_filter_only.clone(); pre_filter_only.set(!current); } } " Nur vorab prüfen" }
                }
                div { style: "margin-top:10px;",
                    button { style: btn_primary_style(), disabled: review.selected_count() == 0 || *busy.read(), onclick: {
                            let state = state.clone();
                            move |_| {
                                let state = state.clone();
                                let mut busy = busy.clone();
                                let opts = UploadOptions {
                                    auto_upload: *auto_upload.read(),
                                    skip_duplicates: *skip_duplicates.read(),
                                    pre_filter_only: *pre_filter_only.read(),
                                };
                                spawn(async move {
                                    busy.set(true);
                                    let started = state.start_upload(opts).await;
                                    busy.set(false);
                                    if started {
                                        nav.push(Route::Progress {});
                                    }
                                });
                            }
                        }, "{review.selected_count()} Dateien analysieren ({fmt_bytes(review.selected_bytes())})" }
                }
                if let Some(pf) = pre_filter {
                    div { style: "margin-top:8px;color:#a0aec0;",
                        "Vorabprüfung: {pf.total_files} Dateien, {pf.new_files} neu, {pf.duplicate_files} Duplikate, {fmt_bytes(pf.total_size)}" }
                }
            }
        }
    }
}

fn review_column_label(col: &str) -> &'static str {
    match col {
        "name" => "Name",
        "size" => "Größe",
        "modified" => "Geändert",
        "status" => "Status",
        _ => "",
    }
}

// ----- Fortschritt eines laufenden Jobs -----
#[component]
fn Progress() -> Element {
    let state = use_context::<AppState>();
    let nav = use_navigator();

    // Ende des Jobs: zur Zusammenfassung
    {
        let state = state.clone();
        use_effect(move || {
            let _ = *state.rev.read();
            if state.session.borrow().completion.is_some() {
                nav.push(Route::Completion {});
            }
        });
    }

    let _rev = *state.rev.read();
    let s = state.session.borrow();
    let job_id = s.job_id.clone();
    let overall = s.progress.reconciler().overall().cloned();
    let phase = s.progress.phase().label();
    let rows: Vec<_> = s.progress.reconciler().rows().iter().cloned().collect();
    let error = if s.panels.is_visible(PANEL_ERROR) { s.panels.text(PANEL_ERROR).map(|t| t.to_string()) } else { None };
    drop(s);

    let Some(job_id) = job_id else {
        return rsx! {
            div { style: panel_style(),
                h2 { "Fortschritt" }
                if let Some(err) = error {
                    div { style: "color:#f87171;margin-bottom:8px;", "Fehler: {err}" }
                }
                p { "Kein laufender Job." }
                Link { to: Route::Browse {}, "Zur Ordneransicht" }
            }
        };
    };

    rsx! {
        div { style: panel_style(),
            div { style: "display:flex;justify-content:space-between;align-items:center;",
                h2 { "Job {job_id}" }
                button { style: btn_danger_style(), onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            spawn(async move {
                                state.cancel_job().await;
                                nav.push(Route::Browse {});
                            });
                        }
                    }, "Abbrechen" }
            }
            // Gesamtfortschritt
            { match overall {
                Some(o) => rsx! {
                    div { style: "margin:8px 0;",
                        div { "{o.phase_label}: {o.percent_text} · {o.files_text}" }
                        div { class: "bar", div { class: "bar-fill", style: bar_width(o.percent) } }
                        div { style: "color:#a0aec0;", "{o.bytes_text} {o.eta_text}" }
                    }
                },
                None => rsx! { div { style: "margin:8px 0;color:#a0aec0;", "{phase} …" } },
            } }
            if let Some(err) = error {
                div { style: "color:#f87171;margin:8px 0;", "Fehler: {err}" }
            }
            table { style: table_style(),
                thead { tr { th { "Datei" } th { "Status" } th { "Fortschritt" } th { "Größe" } th { "" } } }
                tbody {
                    { rows.into_iter().map(|k| {
                        let r = k.row;
                        let extra = r.queue_label.clone().or(r.error_text.clone()).unwrap_or_default();
                        // Identität als Key: In-place-Updates lassen den Spinner weiterlaufen
                        rsx!{ tr { key: "{k.identity}",
                            td { "{r.filename}" }
                            td { span { class: "{r.badge.tone.css_class()}",
                                if r.badge.spinner { span { class: "spinner" } }
                                "{r.badge.label}" } }
                            td {
                                { r.bar_percent.map(|p| rsx!(div { class: "bar", div { class: "bar-fill", style: bar_width(p) } })) }
                                "{r.progress_text}"
                            }
                            td { "{r.size_text}" }
                            td { style: "color:#a0aec0;", "{extra}" }
                        } }
                    }) }
                }
            }
        }
    }
}

// ----- Abschlussbericht -----
#[component]
fn Completion() -> Element {
    let state = use_context::<AppState>();
    let nav = use_navigator();

    let _rev = *state.rev.read();
    let s = state.session.borrow();
    let summary = s.completion.clone();
    let table = s.completion_table.clone();
    drop(s);

    let (Some(summary), Some(table)) = (summary, table) else {
        return rsx! {
            div { style: panel_style(),
                h2 { "Abschluss" }
                p { "Noch kein abgeschlossener Job." }
                Link { to: Route::Browse {}, "Zur Ordneransicht" }
            }
        };
    };
    let c = summary.counts;
    let csv = table.to_csv();
    let job_id = summary.job_id.clone();

    rsx! {
        div { style: panel_style(),
            h2 { "{summary.outcome.title()}" }
            p { "{summary.headline()}" }
            p { style: "color:#a0aec0;", "{summary.bytes_text()} in {summary.elapsed_text()}" }
            if let Some(msg) = summary.message.clone() {
                div { style: "color:#f87171;", "Fehler: {msg}" }
            }
            div { style: "display:flex;gap:14px;margin:8px 0;",
                span { "✔ {c.completed}" } span { "✖ {c.failed}" } span { "⏭ {c.skipped}" } span { "… {c.unfinished}" }
            }
            div { style: "display:flex;gap:8px;",
                button { style: btn_style(), onclick: move |_| download_csv(&csv_filename(&job_id, Utc::now()), &csv), "CSV export" }
                button { style: btn_primary_style(), onclick: {
                        let state = state.clone();
                        move |_| {
                            state.update(|s| s.reset());
                            nav.push(Route::Browse {});
                        }
                    }, "Neuer Upload" }
            }
            table { style: table_style(),
                thead { tr {
                    { COMPLETION_COLUMNS.iter().map(|col| {
                        let state = state.clone();
                        let col = *col;
                        let ind = table.sort().indicator(col);
                        rsx!{ th { style: "cursor:pointer;",
                            onclick: move |_| state.update(|s| if let Some(t) = s.completion_table.as_mut() { t.toggle_sort(col) }),
                            "{completion_column_label(col)} {ind}" } }
                    }) }
                } }
                tbody {
                    { table.page_rows().iter().map(|r| {
                        let dup = if r.duplicate { "ja" } else { "" };
                        let err = r.error.clone().unwrap_or_default();
                        rsx!{ tr { key: "{r.filename}",
                            td { "{r.filename}" } td { "{r.status.as_str()}" } td { "{r.size_text}" } td { "{dup}" } td { "{err}" }
                        } }
                    }) }
                }
            }
            div { style: "display:flex;gap:8px;align-items:center;margin-top:8px;",
                button { style: btn_style(), disabled: !table.pagination().has_prev(), onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| if let Some(t) = s.completion_table.as_mut() { t.pagination_mut().prev(); })
                    }, "◀" }
                span { "{table.pagination().label()}" }
                button { style: btn_style(), disabled: !table.pagination().has_next(), onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| if let Some(t) = s.completion_table.as_mut() { t.pagination_mut().next(); })
                    }, "▶" }
            }
        }
    }
}

fn completion_column_label(col: &str) -> &'static str {
    match col {
        "filename" => "Datei",
        "status" => "Status",
        "size" => "Größe",
        "duplicate" => "Duplikat",
        "error" => "Fehler",
        _ => "",
    }
}

// ----- Einstellungen -----
#[component]
fn Settings() -> Element {
    let state = use_context::<AppState>();

    {
        let state = state.clone();
        use_effect(move || {
            let state = state.clone();
            spawn(async move { state.load_settings().await });
        });
    }

    let _rev = *state.rev.read();
    let s = state.session.borrow();
    let form = &s.settings;
    let draft = form.draft().cloned();
    let dirty = form.is_dirty();
    let invalid = if dirty { form.validate().err().map(|e| e.to_string()) } else { None };
    let version = form.version.clone();
    let update_text = form.update_text();
    let release_url = form.update.as_ref().and_then(|u| u.release_url.clone());
    let cache = form.cache.clone().map(|c| {
        (
            format!("{} Einträge, {} hochgeladen, {}", c.total_entries, c.uploaded_files, fmt_bytes(c.total_size)),
            format!("Letzter Abgleich: {}", c.last_sync.unwrap_or_else(|| "nie".into())),
        )
    });
    drop(s);

    let Some(d) = draft else {
        return rsx! { div { style: panel_style(), h2 { "Einstellungen" } p { "Lade…" } } };
    };
    let folder = d.default_folder.clone().unwrap_or_default();

    rsx! {
        div { style: panel_style(),
            h2 { "Einstellungen" }
            div { style: "display:grid;grid-template-columns:200px 1fr;gap:8px;align-items:center;",
                label { "S3-Bucket" }
                input { value: "{d.s3_bucket}", oninput: {
                        let state = state.clone();
                        move |e: Event<FormData>| set_setting(&state, "s3_bucket", e.value())
                    } }
                label { "S3-Präfix" }
                input { value: "{d.s3_prefix}", oninput: {
                        let state = state.clone();
                        move |e: Event<FormData>| set_setting(&state, "s3_prefix", e.value())
                    } }
                label { "AWS-Region" }
                input { value: "{d.aws_region}", oninput: {
                        let state = state.clone();
                        move |e: Event<FormData>| set_setting(&state, "aws_region", e.value())
                    } }
                label { "Parallele Uploads" }
                input { r#type: "number", min: "1", value: "{d.upload_concurrency}", onchange: {
                        let state = state.clone();
                        move |e: Event<FormData>| set_setting(&state, "upload_concurrency", e.value())
                    } }
                label { "Standardordner" }
                input { value: "{folder}", oninput: {
                        let state = state.clone();
                        move |e: Event<FormData>| set_setting(&state, "default_folder", e.value())
                    } }
                label { "Duplikate überspringen" }
                input { r#type: "checkbox", checked: d.skip_duplicates, oninput: {
                        let state = state.clone();
                        let current = d.skip_duplicates;
                        move |_| set_setting(&state, "skip_duplicates", (!current).to_string())
                    } }
                label { "Direkt hochladen" }
                input { r#type: "checkbox", checked: d.auto_upload, oninput: {
                        let state = state.clone();
                        let current = d.auto_upload;
                        move |_| set_setting(&state, "auto_upload", (!current).to_string())
                    } }
            }
            if let Some(msg) = invalid {
                div { style: "color:#fbbf24;margin-top:6px;", "{msg}" }
            }
            div { style: "display:flex;gap:8px;margin-top:10px;",
                button { style: btn_primary_style(), disabled: !dirty, onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            spawn(async move { state.save_settings().await });
                        }
                    }, "Speichern" }
                button { style: btn_style(), disabled: !dirty, onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| s.settings.discard())
                    }, "Verwerfen" }
            }
        }
        div { style: panel_style(),
            h2 { "Version" }
            if let Some(v) = version {
                p { "Version {v.version}" }
            }
            div { style: "display:flex;gap:8px;align-items:center;",
                button { style: btn_style(), onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            spawn(async move { state.check_update().await });
                        }
                    }, "Nach Updates suchen" }
                if let Some(t) = update_text { span { "{t}" } }
                if let Some(url) = release_url { a { href: "{url}", target: "_blank", "Release" } }
            }
        }
        div { style: panel_style(),
            h2 { "Upload-Cache" }
            if let Some((stats, last_sync)) = cache {
                p { "{stats}" }
                p { style: "color:#a0aec0;", "{last_sync}" }
            }
            div { style: "display:flex;gap:8px;",
                button { style: btn_style(), onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            spawn(async move { state.cache_action(false).await });
                        }
                    }, "Mit Bucket abgleichen" }
                button { style: btn_danger_style(), onclick: {
                        let state = state.clone();
                        move |_| {
                            let state = state.clone();
                            spawn(async move { state.cache_action(true).await });
                        }
                    }, "Cache verwerfen" }
            }
        }
    }
}

fn set_setting(state: &AppState, field: &'static str, value: String) {
    state.update(|s| {
        if let Err(e) = s.settings.set_field(field, &value) {
            s.report(&e);
        }
    });
}

// ----- Server-Logs -----
#[component]
fn Logs() -> Element {
    let state = use_context::<AppState>();

    {
        let state = state.clone();
        use_effect(move || {
            let state = state.clone();
            spawn(async move { state.refresh_logs(true).await });
        });
    }

    let refresh = {
        let state = state.clone();
        move || {
            let state = state.clone();
            spawn(async move { state.refresh_logs(false).await });
        }
    };

    let _rev = *state.rev.read();
    let s = state.session.borrow();
    let v = &s.logs;
    let level = v.query().level.map(|l| l.as_str()).unwrap_or("");
    let search = v.query().search.clone().unwrap_or_default();
    let order = if matches!(v.order(), SortDirection::Desc) { "Neueste zuerst" } else { "Älteste zuerst" };
    let entries = v.page_entries().to_vec();
    let page_label = v.pagination().label();
    let (has_prev, has_next) = (v.pagination().has_prev(), v.pagination().has_next());
    let counts: Vec<(LogLevel, u64)> = LOG_LEVELS.iter().map(|l| (*l, v.level_count(*l))).collect();
    let total = v.stats.as_ref().map(|st| st.total).unwrap_or(0);
    let files = v.files.clone();
    drop(s);

    rsx! {
        div { style: panel_style(),
            h2 { "Logs" }
            div { style: "display:flex;gap:10px;flex-wrap:wrap;color:#a0aec0;",
                span { "{total} Einträge" }
                { counts.into_iter().map(|(l, n)| rsx!(span { class: "{level_css_class(l)}", "{l.as_str()}: {n}" })) }
            }
            div { style: "display:flex;gap:8px;align-items:center;margin:8px 0;",
                select { value: "{level}", oninput: {
                        let state = state.clone();
                        let refresh = refresh.clone();
                        move |e: Event<FormData>| {
                            let lvl = LogLevel::parse(&e.value());
                            state.update(|s| s.logs.set_level(lvl));
                            refresh();
                        }
                    },
                    option { value: "", "Alle" }
                    { LOG_LEVELS.iter().map(|l| rsx!(option { value: "{l.as_str()}", "{l.as_str()}" })) }
                }
                input { placeholder: "Suche", value: "{search}", oninput: {
                        let state = state.clone();
                        move |e: Event<FormData>| {
                            let text = e.value();
                            state.update(|s| s.logs.set_search(&text));
                        }
                    } }
                button { style: btn_style(), onclick: {
                        let refresh = refresh.clone();
                        move |_| refresh()
                    }, "Aktualisieren" }
                button { style: btn_style(), onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| s.logs.toggle_order())
                    }, "{order}" }
            }
            table { style: table_style(),
                thead { tr { th { "Zeit" } th { "Level" } th { "Quelle" } th { "Meldung" } } }
                tbody {
                    { entries.iter().enumerate().map(|(i, e)| {
                        let src = e.source.clone().unwrap_or_default();
                        rsx!{ tr { key: "{e.timestamp}-{i}",
                            td { style: "white-space:nowrap;", "{e.timestamp}" }
                            td { span { class: "{level_css_class(e.level)}", "{e.level.as_str()}" } }
                            td { "{src}" }
                            td { "{e.message}" }
                        } }
                    }) }
                }
            }
            div { style: "display:flex;gap:8px;align-items:center;margin-top:8px;",
                button { style: btn_style(), disabled: !has_prev, onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| { s.logs.pagination_mut().prev(); })
                    }, "◀" }
                span { "{page_label}" }
                button { style: btn_style(), disabled: !has_next, onclick: {
                        let state = state.clone();
                        move |_| state.update(|s| { s.logs.pagination_mut().next(); })
                    }, "▶" }
            }
            if !files.is_empty() {
                h3 { "Logdateien" }
                ul {
                    { files.iter().map(|f| rsx!(li { key: "{f.name}", "{f.name} ({fmt_bytes(f.size)})" })) }
                }
            }
        }
    }
}

// ----- Styles & Helfer -----
fn panel_style() -> &'static str {
    "max-width:1200px;margin:20px auto;padding:16px;background:#0b0c10;color:#e5e7eb;border:1px solid #222533;border-radius:12px;"
}

fn btn_style() -> &'static str {
    "background:#1f2937;color:#e5e7eb;border:1px solid #374151;border-radius:8px;padding:6px 10px;cursor:pointer;"
}

fn btn_danger_style() -> &'static str {
    "background:#7f1d1d;color:#fff;border:1px solid #991b1b;border-radius:8px;padding:6px 10px;cursor:pointer;"
}

fn btn_primary_style() -> &'static str {
    "background:#2563eb;color:#fff;border:none;border-radius:8px;padding:6px 10px;cursor:pointer;"
}

fn table_style() -> &'static str {
    "width:100%;border-collapse:collapse;margin-top:8px;background:#0f1117;border:1px solid #222533;border-radius:8px;"
}

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;

// Show a transient toast in the #toasts container
pub fn show_toast(message: &str, level_class: &str) {
    if level_class.ends_with("error") {
        web_sys::console::error_1(&message.into());
    }
    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            if let Some(container) = doc.get_element_by_id("toasts") {
                if let Ok(toast) = doc.create_element("div") {
                    toast.set_class_name(&format!("toast fade-in {}", level_class));
                    toast.set_text_content(Some(message));
                    if container.append_child(&toast).is_err() {
                        return; // Failed to append, exit early
                    }

                    // Fehler bleiben länger stehen
                    let timeout = if level_class.ends_with("error") { 5000 } else { 2500 };
                    Timeout::new(timeout, move || {
                        let _ = container.remove_child(&toast);
                    })
                    .forget();
                }
            }
        }
    }
}

// Trigger a CSV download using a data URI
pub fn download_csv(filename: &str, content: &str) {
    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            if let Ok(a) = doc.create_element("a") {
                let href = format!(
                    "data:text/csv;charset=utf-8,{}",
                    urlencoding::encode(content)
                );
                let _ = a.set_attribute("href", &href);
                let _ = a.set_attribute("download", filename);
                if let Some(body) = doc.body() {
                    let _ = body.append_child(&a);
                    if let Some(ae) = a.dyn_ref::<web_sys::HtmlElement>() {
                        ae.click();
                    }
                    let _ = body.remove_child(&a);
                }
            }
        }
    }
}

// Breite eines Fortschrittsbalkens als CSS-Wert
pub fn bar_width(percent: f64) -> String {
    format!("width: {:.1}%;", percent.clamp(0.0, 100.0))
}

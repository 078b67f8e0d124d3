//! Browser-Backends für die Seams des Kerns: reqwasm (HTTP), EventSource (SSE),
//! requestAnimationFrame (Frame-Batching) und localStorage (letzter Ordner).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use wolkenlift::api::{ApiRequest, ApiResponse, HttpTransport, Method};
use wolkenlift::error::{UiError, UiResult};
use wolkenlift::progress::FrameScheduler;
use wolkenlift::storage::KeyValueStore;
use wolkenlift::stream::{StreamConnector, StreamHandle, StreamMessage};

pub const BASE: &str = ""; // use same-origin relative URLs

fn url(path: &str) -> String { format!("{}{}", BASE, path) }

fn map_net<E: std::fmt::Display>(e: E) -> UiError { UiError::Network(e.to_string()) }

// ----- HTTP -----

#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwasmTransport;

#[async_trait(?Send)]
impl HttpTransport for ReqwasmTransport {
    async fn send(&self, request: ApiRequest) -> UiResult<ApiResponse> {
        let target = url(&request.path);
        let mut req = match request.method {
            Method::Get => reqwasm::http::Request::get(&target),
            Method::Post => reqwasm::http::Request::post(&target),
            Method::Put => reqwasm::http::Request::put(&target),
        };
        if let Some(body) = request.body {
            req = req.header("Content-Type", "application/json").body(body);
        }
        let resp = req.send().await.map_err(map_net)?;
        let status = resp.status();
        let body = resp.text().await.map_err(map_net)?;
        Ok(ApiResponse { status, body })
    }
}

// ----- Event-Hub: SSE-Nachrichten und Frames zurück in die Session -----

#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    Stream { stream_id: u64, message: StreamMessage },
    Frame,
}

/// Verteiler für asynchrone Browser-Callbacks. Der Handler wird gebunden,
/// sobald die Session existiert; vorher eintreffende Events verfallen.
#[derive(Clone, Default)]
pub struct Hub {
    handler: Rc<RefCell<Option<Rc<dyn Fn(HubEvent)>>>>,
}

impl Hub {
    pub fn bind(&self, f: impl Fn(HubEvent) + 'static) {
        *self.handler.borrow_mut() = Some(Rc::new(f));
    }

    fn emit(&self, ev: HubEvent) {
        let handler = self.handler.borrow().clone();
        if let Some(h) = handler {
            h(ev);
        }
    }
}

// ----- SSE über EventSource -----

#[derive(Clone)]
pub struct EventSourceConnector {
    hub: Hub,
    next_id: Rc<Cell<u64>>,
}

impl EventSourceConnector {
    pub fn new(hub: Hub) -> Self {
        Self { hub, next_id: Rc::new(Cell::new(1)) }
    }
}

pub struct EventSourceHandle {
    id: u64,
    es: EventSource,
    open: bool,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl StreamHandle for EventSourceHandle {
    fn id(&self) -> u64 {
        self.id
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.es.set_onmessage(None);
        self.es.set_onerror(None);
        self.es.close();
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for EventSourceHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl StreamConnector for EventSourceConnector {
    type Handle = EventSourceHandle;

    fn open(&mut self, path: &str) -> UiResult<EventSourceHandle> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let es = EventSource::new(&url(path)).map_err(|e| UiError::Stream(format!("EventSource: {:?}", e)))?;

        // Zustellung per spawn_local: eine terminale Nachricht darf diesen Handle
        // (und damit die Closure) schließen, ohne dass sie gerade läuft.
        let hub = self.hub.clone();
        let on_message = Closure::wrap(Box::new(move |ev: MessageEvent| {
            if let Some(text) = ev.data().as_string() {
                let hub = hub.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    hub.emit(HubEvent::Stream { stream_id: id, message: StreamMessage::Data(text) });
                });
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        es.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let hub = self.hub.clone();
        let on_error = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
            let hub = hub.clone();
            wasm_bindgen_futures::spawn_local(async move {
                hub.emit(HubEvent::Stream {
                    stream_id: id,
                    message: StreamMessage::Error("EventSource error".into()),
                });
            });
        }) as Box<dyn FnMut(web_sys::Event)>);
        es.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(EventSourceHandle { id, es, open: true, _on_message: on_message, _on_error: on_error })
    }
}

// ----- Frame-Batching über requestAnimationFrame -----

/// Höchstens ein ausstehender Animation-Frame; der Flush läuft im Hub-Handler.
pub struct RafScheduler {
    hub: Hub,
    pending: Rc<Cell<bool>>,
}

impl RafScheduler {
    pub fn new(hub: Hub) -> Self {
        Self { hub, pending: Rc::new(Cell::new(false)) }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        if self.pending.replace(true) {
            return;
        }
        let hub = self.hub.clone();
        let pending = self.pending.clone();
        let cb = Closure::once_into_js(move || {
            pending.set(false);
            hub.emit(HubEvent::Frame);
        });
        let scheduled = web_sys::window()
            .map(|w| w.request_animation_frame(cb.unchecked_ref()).is_ok())
            .unwrap_or(false);
        if !scheduled {
            self.pending.set(false);
        }
    }
}

// ----- localStorage -----

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

fn local_storage() -> UiResult<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| UiError::Storage("localStorage nicht verfügbar".into()))
}

fn storage_err(e: wasm_bindgen::JsValue) -> UiError {
    UiError::Storage(format!("{:?}", e))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> UiResult<Option<String>> {
        local_storage()?.get_item(key).map_err(storage_err)
    }

    fn set(&mut self, key: &str, value: &str) -> UiResult<()> {
        local_storage()?.set_item(key, value).map_err(storage_err)
    }

    fn remove(&mut self, key: &str) -> UiResult<()> {
        local_storage()?.remove_item(key).map_err(storage_err)
    }
}

//! Incremental `text/event-stream` decoder for targets without `EventSource`.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, `None` for the default "message" type.
    pub event: Option<String>,
    pub data: String,
}

/// Feeds arbitrary chunks, yields complete events. Comment lines (keep-alives)
/// and unknown fields are skipped; `id:`/`retry:` are accepted but not used.
#[derive(Debug, Default)]
pub struct SseParser {
    line: String,
    data: Vec<String>,
    event: Option<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<SseEvent> {
        let mut out = Vec::new();
        for ch in chunk.chars() {
            match ch {
                '\n' => {
                    let line = std::mem::take(&mut self.line);
                    let line = line.strip_suffix('\r').unwrap_or(&line);
                    if let Some(ev) = self.process_line(line) {
                        out.push(ev);
                    }
                }
                c => self.line.push(c),
            }
        }
        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.find(':') {
            Some(i) => {
                let v = &line[i + 1..];
                (&line[..i], v.strip_prefix(' ').unwrap_or(v))
            }
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent { event, data })
    }

    /// True while a partially received event is buffered.
    pub fn has_partial(&self) -> bool {
        !self.line.is_empty() || !self.data.is_empty()
    }
}

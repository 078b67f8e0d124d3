use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub visible: bool,
    pub text: Option<String>,
}

/// Id-keyed visibility and text for the static parts of a page
/// (status lines, error panels, button captions).
#[derive(Debug, Clone, Default)]
pub struct Panels {
    panels: HashMap<&'static str, PanelState>,
    revision: u64,
}

impl Panels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, id: &'static str) {
        let p = self.panels.entry(id).or_default();
        if !p.visible {
            p.visible = true;
            self.revision += 1;
        }
    }

    pub fn hide(&mut self, id: &'static str) {
        if let Some(p) = self.panels.get_mut(id) {
            if p.visible {
                p.visible = false;
                self.revision += 1;
            }
        }
    }

    pub fn set_visible(&mut self, id: &'static str, visible: bool) {
        if visible {
            self.show(id)
        } else {
            self.hide(id)
        }
    }

    pub fn set_text(&mut self, id: &'static str, text: impl Into<String>) {
        let text = text.into();
        let p = self.panels.entry(id).or_default();
        if p.text.as_deref() != Some(text.as_str()) {
            p.text = Some(text);
            self.revision += 1;
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.panels.get(id).map(|p| p.visible).unwrap_or(false)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.panels.get(id).and_then(|p| p.text.as_deref())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

//! Bookkeeping for template-backed modals (login, register, ...).
//!
//! A closed modal is cached in its sanitized form and reused on the next
//! open. Opening while another modal is visible defers until it has hidden.

use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPlan {
    /// Nothing visible; inject and show now.
    ShowNow(String),
    /// Hide the visible modal first; `take_pending` yields the name afterwards.
    AfterHide(String),
}

#[derive(Debug, Default)]
pub struct ModalRegistry {
    cache: HashMap<String, String>,
    pending: Option<String>,
}

impl ModalRegistry {
    pub fn request_open(&mut self, name: &str, another_visible: bool) -> Option<OpenPlan> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if another_visible {
            debug!("deferring modal {} until the visible one hides", name);
            self.pending = Some(name.to_owned());
            Some(OpenPlan::AfterHide(name.to_owned()))
        } else {
            Some(OpenPlan::ShowNow(name.to_owned()))
        }
    }

    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Cached markup if present, otherwise the page template.
    pub fn markup_for<F>(&self, name: &str, template: F) -> Option<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match self.cache.get(name) {
            Some(cached) => Some(cached.clone()),
            None => template(name),
        }
    }

    pub fn remember(&mut self, name: &str, sanitized: String) {
        self.cache.insert(name.to_owned(), sanitized);
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }
}

/// DOM id of the `<script type="text/template">` holding modal `name`.
pub fn template_id(name: &str) -> String {
    format!("tpl-modal-{}", name)
}

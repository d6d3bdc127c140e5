//! Ordered set of session documents plus the active selection.

use std::sync::Arc;

use crate::document::{DocumentHandle, DocumentId};

/// Documents in insertion order, with a non-owning reference to the active one.
///
/// `active`, when set, always names a document present in `documents`.
#[derive(Debug, Default)]
pub struct Registry {
    documents: Vec<Arc<DocumentHandle>>,
    active: Option<DocumentId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document and make it active.
    pub fn add(&mut self, handle: Arc<DocumentHandle>) {
        debug_assert!(
            self.get(handle.id()).is_none(),
            "document ids are unique per session"
        );
        self.active = Some(handle.id());
        self.documents.push(handle);
    }

    /// Make `id` active. Returns `true` only if the active document changed;
    /// unknown ids are ignored.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        if self.get(id).is_none() || self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Documents, most recently added first. Storage order is untouched.
    pub fn list(&self) -> impl DoubleEndedIterator<Item = &Arc<DocumentHandle>> + ExactSizeIterator {
        self.documents.iter().rev()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Arc<DocumentHandle>> {
        self.documents.iter().find(|d| d.id() == id)
    }

    pub fn active(&self) -> Option<&Arc<DocumentHandle>> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Arc<DocumentHandle> {
        Arc::new(DocumentHandle::from_path(
            name,
            name.as_bytes().to_vec(),
            std::env::temp_dir().join(name),
        ))
    }

    #[test]
    fn list_is_reverse_insertion_order() {
        let mut reg = Registry::new();
        let names = ["a.pdf", "b.pdf", "c.pdf", "d.pdf"];
        for n in names {
            let d = doc(n);
            let id = d.id();
            reg.add(d);
            assert_eq!(reg.active_id(), Some(id), "newest document is active");
        }
        let listed: Vec<&str> = reg.list().map(|d| d.name()).collect();
        assert_eq!(listed, vec!["d.pdf", "c.pdf", "b.pdf", "a.pdf"]);
    }

    #[test]
    fn set_active_unknown_id_is_noop() {
        let mut reg = Registry::new();
        let d = doc("a.pdf");
        let id = d.id();
        reg.add(d);
        assert!(!reg.set_active(DocumentId::new()));
        assert_eq!(reg.active_id(), Some(id));
    }

    #[test]
    fn set_active_on_empty_registry_stays_empty() {
        let mut reg = Registry::new();
        assert!(!reg.set_active(DocumentId::new()));
        assert!(reg.active().is_none());
    }

    #[test]
    fn set_active_switches_and_reports_change() {
        let mut reg = Registry::new();
        let a = doc("a.pdf");
        let a_id = a.id();
        reg.add(a);
        reg.add(doc("b.pdf"));
        assert!(reg.set_active(a_id));
        assert_eq!(reg.active().map(|d| d.name()), Some("a.pdf"));
        // Re-selecting the same document is not a change.
        assert!(!reg.set_active(a_id));
    }
}

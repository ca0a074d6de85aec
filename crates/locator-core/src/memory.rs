//! In-memory page engine
//!
//! `StaticPage` is a deterministic stand-in for a rendered page: elements are
//! declared in document order together with the expressions they answer to.
//! It records every query and text read so callers can check exactly which
//! expressions were tried.

use crate::{
    engine::QueryEngine,
    errors::EngineError,
    types::{ElementRef, Scope},
    union::CombinedExpression,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// One element of a [`StaticPage`]
#[derive(Debug, Clone)]
pub struct StaticElement {
    matches: Vec<String>,
    parent: Option<usize>,
    visible: bool,
    enabled: bool,
    text: Option<String>,
    stale_text_reads: usize,
    failing_gates: bool,
}

impl StaticElement {
    /// Visible, enabled element matched by `expression`
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            matches: vec![expression.into()],
            parent: None,
            visible: true,
            enabled: true,
            text: None,
            stale_text_reads: 0,
            failing_gates: false,
        }
    }

    /// Also match `expression`
    pub fn matching(mut self, expression: impl Into<String>) -> Self {
        self.matches.push(expression.into());
        self
    }

    /// Nest under the element at document position `parent`
    pub fn child_of(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Make the next `reads` text reads fail as stale
    pub fn failing_text_reads(mut self, reads: usize) -> Self {
        self.stale_text_reads = reads;
        self
    }

    /// Make visibility and enabled checks error
    pub fn failing_gates(mut self) -> Self {
        self.failing_gates = true;
        self
    }
}

#[derive(Debug, Default)]
struct PageState {
    queries: HashMap<String, usize>,
    text_reads: HashMap<usize, usize>,
    stale_reads_left: HashMap<usize, usize>,
    detached: HashSet<usize>,
}

/// Deterministic in-memory [`QueryEngine`]
#[derive(Debug, Default)]
pub struct StaticPage {
    elements: Vec<StaticElement>,
    invalid: HashSet<String>,
    state: Mutex<PageState>,
}

impl StaticPage {
    /// Elements are in document order; their position is their id.
    pub fn new(elements: Vec<StaticElement>) -> Self {
        let stale_reads_left = elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.stale_text_reads > 0)
            .map(|(idx, el)| (idx, el.stale_text_reads))
            .collect();
        Self {
            elements,
            invalid: HashSet::new(),
            state: Mutex::new(PageState {
                stale_reads_left,
                ..PageState::default()
            }),
        }
    }

    /// Reject `expression` as malformed
    pub fn with_invalid(mut self, expression: impl Into<String>) -> Self {
        self.invalid.insert(expression.into());
        self
    }

    /// Reference for the element at document position `index`
    pub fn element_ref(index: usize) -> ElementRef {
        ElementRef(format!("node-{}", index))
    }

    /// Remove an element (and its subtree) from the page
    pub fn detach(&self, index: usize) {
        let mut state = self.state.lock();
        state.detached.insert(index);
        for (idx, _) in self.elements.iter().enumerate() {
            if self.has_ancestor(idx, &[index]) {
                state.detached.insert(idx);
            }
        }
    }

    /// How many times `expression` was queried, single or combined
    pub fn query_count(&self, expression: &str) -> usize {
        self.state.lock().queries.get(expression).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.state.lock().queries.values().sum()
    }

    pub fn text_read_count(&self, index: usize) -> usize {
        self.state.lock().text_reads.get(&index).copied().unwrap_or(0)
    }

    fn index_of(&self, element: &ElementRef) -> Result<usize, EngineError> {
        element
            .as_str()
            .strip_prefix("node-")
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|idx| *idx < self.elements.len())
            .ok_or_else(|| EngineError::Internal(format!("unknown element {}", element)))
    }

    fn live_index(&self, element: &ElementRef) -> Result<usize, EngineError> {
        let idx = self.index_of(element)?;
        if self.state.lock().detached.contains(&idx) {
            return Err(EngineError::Stale(element.to_string()));
        }
        Ok(idx)
    }

    fn has_ancestor(&self, idx: usize, roots: &[usize]) -> bool {
        let mut current = self.elements[idx].parent;
        while let Some(parent) = current {
            if roots.contains(&parent) {
                return true;
            }
            current = self.elements.get(parent).and_then(|el| el.parent);
        }
        false
    }

    /// `None` means the whole document
    fn roots(&self, scope: &Scope) -> Result<Option<Vec<usize>>, EngineError> {
        match scope {
            Scope::Document => Ok(None),
            Scope::Element(element) => Ok(Some(vec![self.live_index(element)?])),
            Scope::Collection { parent, expression } => {
                let members = expression.members();
                Ok(Some(self.matching(parent, |el| {
                    el.matches.iter().any(|m| members.contains(m))
                })?))
            }
        }
    }

    fn matching<F>(&self, scope: &Scope, predicate: F) -> Result<Vec<usize>, EngineError>
    where
        F: Fn(&StaticElement) -> bool,
    {
        let roots = self.roots(scope)?;
        let detached = self.state.lock().detached.clone();
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(idx, el)| {
                !detached.contains(idx)
                    && predicate(el)
                    && roots
                        .as_ref()
                        .map_or(true, |roots| self.has_ancestor(*idx, roots))
            })
            .map(|(idx, _)| idx)
            .collect())
    }

    fn record_query(&self, key: &str) {
        *self.state.lock().queries.entry(key.to_string()).or_insert(0) += 1;
    }

    fn check_gate(&self, element: &ElementRef) -> Result<&StaticElement, EngineError> {
        let idx = self.live_index(element)?;
        let el = &self.elements[idx];
        if el.failing_gates {
            return Err(EngineError::Stale(element.to_string()));
        }
        Ok(el)
    }
}

#[async_trait]
impl QueryEngine for StaticPage {
    async fn query_first(
        &self,
        scope: &Scope,
        expression: &str,
    ) -> Result<Option<ElementRef>, EngineError> {
        self.record_query(expression);
        if self.invalid.contains(expression) {
            return Err(EngineError::InvalidExpression(expression.to_string()));
        }
        let found = self.matching(scope, |el| el.matches.iter().any(|m| m == expression))?;
        Ok(found.first().map(|idx| Self::element_ref(*idx)))
    }

    async fn query_all(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<Vec<ElementRef>, EngineError> {
        self.record_query(expression.as_str());
        if let Some(bad) = expression.members().iter().find(|m| self.invalid.contains(*m)) {
            return Err(EngineError::InvalidExpression(bad.clone()));
        }
        let members = expression.members();
        let found = self.matching(scope, |el| el.matches.iter().any(|m| members.contains(m)))?;
        Ok(found.into_iter().map(Self::element_ref).collect())
    }

    async fn is_visible(&self, element: &ElementRef) -> Result<bool, EngineError> {
        Ok(self.check_gate(element)?.visible)
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, EngineError> {
        Ok(self.check_gate(element)?.enabled)
    }

    async fn text_content(&self, element: &ElementRef) -> Result<Option<String>, EngineError> {
        let idx = self.index_of(element)?;
        let mut state = self.state.lock();
        *state.text_reads.entry(idx).or_insert(0) += 1;
        if state.detached.contains(&idx) {
            return Err(EngineError::Stale(element.to_string()));
        }
        if let Some(left) = state.stale_reads_left.get_mut(&idx) {
            if *left > 0 {
                *left -= 1;
                return Err(EngineError::Stale(element.to_string()));
            }
        }
        Ok(self.elements[idx].text.clone())
    }
}

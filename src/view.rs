//! Boundary to the rendering layer.
//!
//! Anything that touches the host view (object URLs for fetched audio,
//! reviewer notices, field sizing) goes through here. The normalizer and generators never
//! depend on this module.

use crate::notices::Notice;
use std::collections::HashMap;

/// Lines a text field grows to before it scrolls.
pub const TEXTAREA_MAX_LINES: u32 = 5;

/// Line height assumed when the host cannot report one.
pub const FALLBACK_LINE_HEIGHT_PX: u32 = 15;

/// Host-side resources the session needs but does not own.
pub trait ViewAdapter {
    /// Playable reference to fetched audio (an object URL in a browser).
    type Handle;

    fn publish_audio(&mut self, bytes: Vec<u8>) -> Self::Handle;

    /// Called when a published handle is replaced or cleared.
    fn release_audio(&mut self, handle: Self::Handle);

    /// Show a notice to the reviewer (a toast in a browser).
    fn notify(&mut self, notice: &Notice);
}

/// In-memory adapter; handles are `blob:` style strings.
#[derive(Debug, Default)]
pub struct MemoryView {
    next_id: u64,
    published: HashMap<String, Vec<u8>>,
    shown: Vec<Notice>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &str) -> Option<&[u8]> {
        self.published.get(handle).map(Vec::as_slice)
    }

    /// Number of handles published and not yet released.
    pub fn live_count(&self) -> usize {
        self.published.len()
    }

    /// Notices delivered through [`ViewAdapter::notify`], oldest first.
    pub fn shown(&self) -> &[Notice] {
        &self.shown
    }
}

impl ViewAdapter for MemoryView {
    type Handle = String;

    fn publish_audio(&mut self, bytes: Vec<u8>) -> String {
        self.next_id += 1;
        let handle = format!("blob:review/{}", self.next_id);
        self.published.insert(handle.clone(), bytes);
        handle
    }

    fn release_audio(&mut self, handle: String) {
        self.published.remove(&handle);
    }

    fn notify(&mut self, notice: &Notice) {
        self.shown.push(notice.clone());
    }
}

/// Size for an auto-growing text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextareaFit {
    pub height_px: u32,
    /// Whether content overflows and the field should scroll.
    pub scrolls: bool,
}

/// Grow a field to its content, capped at `max_lines`.
/// A `line_height_px` of 0 means unknown.
///
/// Called by the host view layer when a multi-line field changes; the
/// session itself never sizes fields.
pub fn fit_textarea(scroll_height_px: u32, line_height_px: u32, max_lines: u32) -> TextareaFit {
    let line_height = if line_height_px == 0 {
        FALLBACK_LINE_HEIGHT_PX
    } else {
        line_height_px
    };
    let max_height = line_height * max_lines;
    TextareaFit {
        height_px: scroll_height_px.min(max_height),
        scrolls: scroll_height_px > max_height,
    }
}

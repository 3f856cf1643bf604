//! Page record assembly from structural events.
//!
//! Fields are matched by their path relative to the `page` element, so a
//! `text` element is only taken as the body when it sits directly under
//! `revision`. Everything else inside a page is consumed and ignored.

use super::events::StructuralEvent;
use crate::error::{ExtractError, ExtractResult};

/// Element that delimits one record.
pub const PAGE: &str = "page";

const TITLE: &str = "title";
const NAMESPACE: &str = "ns";
const REVISION: &str = "revision";
const TEXT: &str = "text";

/// Raw fields of one page before filtering and cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub title: Option<String>,
    /// `None` when the `ns` element is missing or not an integer
    pub namespace_id: Option<i64>,
    /// Markup of the latest revision
    pub body_text: Option<String>,
}

impl RawRecord {
    pub fn new(title: impl Into<String>, namespace_id: i64, body_text: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            namespace_id: Some(namespace_id),
            body_text: Some(body_text.into()),
        }
    }
}

/// Field a text event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Namespace,
    Body,
}

/// Per-record scratch state. Dropped wholesale when the page closes.
#[derive(Debug, Default)]
struct PageScratch {
    /// Element names opened inside the page, outermost first
    path: Vec<String>,
    title: Option<String>,
    namespace: Option<String>,
    body: Option<String>,
}

impl PageScratch {
    fn field(&self) -> Option<Field> {
        match self.path.as_slice() {
            [name] if name == TITLE => Some(Field::Title),
            [name] if name == NAMESPACE => Some(Field::Namespace),
            [rev, name] if rev == REVISION && name == TEXT => Some(Field::Body),
            _ => None,
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Namespace => &mut self.namespace,
            Field::Body => &mut self.body,
        }
    }

    fn finish(self) -> RawRecord {
        RawRecord {
            title: self.title,
            namespace_id: self.namespace.and_then(|ns| ns.trim().parse().ok()),
            body_text: self.body,
        }
    }
}

/// Watches the event sequence and emits one [`RawRecord`] per `page`.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    current: Option<PageScratch>,
    completed: u64,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a page is currently being assembled.
    pub fn in_record(&self) -> bool {
        self.current.is_some()
    }

    /// Number of records emitted so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Feed one event. Returns the finished record when a page closes.
    ///
    /// `position` is only used for error reporting.
    pub fn feed(
        &mut self,
        event: StructuralEvent,
        position: u64,
    ) -> ExtractResult<Option<RawRecord>> {
        if self.current.is_none() {
            if event.is_open(PAGE) {
                self.current = Some(PageScratch::default());
            }
            return Ok(None);
        }
        let Some(page) = self.current.as_mut() else {
            return Ok(None);
        };

        match event {
            StructuralEvent::Open(name) => {
                if name == PAGE {
                    return Err(ExtractError::malformed(
                        position,
                        "<page> opened before the previous page was closed",
                    ));
                }
                if page.path.is_empty() && name == REVISION {
                    // A later revision supersedes the body of an earlier one.
                    page.body = None;
                }
                page.path.push(name);
                if let Some(field) = page.field() {
                    page.slot(field).get_or_insert_with(String::new);
                }
            }
            StructuralEvent::Text(text) => {
                if let Some(field) = page.field() {
                    page.slot(field).get_or_insert_with(String::new).push_str(&text);
                }
            }
            StructuralEvent::Close(name) => {
                if page.path.is_empty() {
                    if name != PAGE {
                        return Err(ExtractError::malformed(
                            position,
                            format!("</{}> closes a page that was never opened with it", name),
                        ));
                    }
                    let record = self.current.take().map(PageScratch::finish);
                    self.completed += 1;
                    return Ok(record);
                }
                page.path.pop();
            }
        }

        Ok(None)
    }
}

use url::form_urlencoded;

use crate::{Record, ResultSet};

/// Builds the canonical navigable reference for a record id.
pub trait DetailUriBuilder {
    fn detail_uri(&self, id: &str) -> String;
}

/// Fixed `{prefix}{escaped id}` template, `/snap/<id>` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailUriTemplate {
    prefix: String,
}

impl DetailUriTemplate {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for DetailUriTemplate {
    fn default() -> Self {
        Self::new("/snap/")
    }
}

impl DetailUriBuilder for DetailUriTemplate {
    fn detail_uri(&self, id: &str) -> String {
        let escaped: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
        format!("{}{}", self.prefix, escaped)
    }
}

/// Attaches the derived `detail_uri` to a record. Only that field is touched.
///
/// Records without an id keep `detail_uri = None`. Calling this again yields
/// the same value.
pub fn annotate(record: &mut Record, builder: &dyn DetailUriBuilder) {
    let uri = if record.id().is_empty() {
        None
    } else {
        Some(builder.detail_uri(record.id()))
    };
    record.set_detail_uri(uri);
}

pub fn annotate_all(results: &mut ResultSet, builder: &dyn DetailUriBuilder) {
    for record in results.records_mut() {
        annotate(record, builder);
    }
}

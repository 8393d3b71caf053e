//! Trailhead facts: fetching, normalizing and caching.

mod cached;
mod error;
mod html;
mod record;
mod source;

pub use cached::{CachedTrailheadClient, TRAILHEAD_NAMESPACE};
pub use error::FetchError;
pub use html::{
    Element, attr_value, elements, extract_record, has_class, pair_fields, tag_texts, text_content,
};
pub use record::{
    COORDINATE_FIELDS, FieldValue, InvalidRecord, MAIN_ROUTES_FIELDS, PARKING_FIELDS, Record,
};
pub use source::{HttpRecordSource, HttpSourceConfig, PageSource, RecordSource};

//! Ready-made record types.
//!
//! The blog-post type covers every column kind: a text partition key, an
//! auto-generated time-based clustering key, scalar data columns with and
//! without defaults, and one list, set and map column each.

use std::sync::{Arc, OnceLock};
use widecol_core::{
    ClusteringOrder, CollectionType, ColumnOptions, Config, Consistency, CoreResult, KeyOptions,
    Model, Record, RecordType, ScalarType, Value,
};

/// Declares a fresh blog-post record type.
///
/// Each call returns a distinct type with its own scope slot, which keeps
/// scope tests independent of each other.
pub fn blog_post_type() -> Arc<RecordType> {
    RecordType::builder("posts")
        .config(
            Config::new()
                .keyspace("blog")
                .default_consistency(Consistency::LocalQuorum)
                .inspect_limit(5),
        )
        .key("blog_id", ScalarType::Text, KeyOptions::new())
        .key(
            "id",
            ScalarType::TimeUuid,
            KeyOptions::new().auto().order(ClusteringOrder::Desc),
        )
        .column("title", ScalarType::Text, ColumnOptions::new())
        .column("body", ScalarType::Text, ColumnOptions::new().default_value(""))
        .column("views", ScalarType::BigInt, ColumnOptions::new().default_value(0))
        .collection(
            "comments",
            CollectionType::List(ScalarType::Text),
            ColumnOptions::new(),
        )
        .collection(
            "tags",
            CollectionType::Set(ScalarType::Text),
            ColumnOptions::new().default_value(Value::set(["draft"])),
        )
        .collection(
            "meta",
            CollectionType::Map(ScalarType::Text, ScalarType::Text),
            ColumnOptions::new(),
        )
        .virtual_attribute("slug", |record, value| {
            let title = value.as_text().unwrap_or_default().replace('-', " ");
            record.set("title", title)?;
            record.set_transient("slug", value)
        })
        .build()
        .expect("blog post fixture declares valid columns")
}

/// Declares a minimal type: an auto-generated `id` key and a `tags` set.
pub fn tagged_type() -> Arc<RecordType> {
    RecordType::builder("tagged")
        .key("id", ScalarType::Uuid, KeyOptions::new().auto())
        .collection(
            "tags",
            CollectionType::Set(ScalarType::Text),
            ColumnOptions::new(),
        )
        .build()
        .expect("tagged fixture declares valid columns")
}

/// Process-wide blog-post model.
#[derive(Debug, Clone, Copy)]
pub struct Post;

impl Model for Post {
    fn record_type() -> &'static Arc<RecordType> {
        static TYPE: OnceLock<Arc<RecordType>> = OnceLock::new();
        TYPE.get_or_init(blog_post_type)
    }
}

/// Creates a new post in `blog_id`.
pub fn new_post(blog_id: &str) -> CoreResult<Record> {
    Post::new_record([("blog_id", blog_id)])
}

/// Creates a post as if it had been read back from the store.
pub fn loaded_post(blog_id: &str, title: &str) -> CoreResult<Record> {
    let id = uuid::Uuid::now_v1(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
    Post::record_type().hydrate([
        ("blog_id", Value::from(blog_id)),
        ("id", Value::TimeUuid(id)),
        ("title", Value::from(title)),
    ])
}

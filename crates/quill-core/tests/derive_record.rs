//! Tests for the `#[derive(Record)]` and `#[derive(Entity)]` macro output.

use quill_core::builder::{Insert, Update};
use quill_core::{
    fields_of, DialectKind, Entity, FieldSet, FromRow, ParamSet, Params, Record, Row, SqlValue,
};
use quill_derive::{Entity, Record};

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(table = "Menu")]
pub struct Menu {
    #[field(name = "Id")]
    pub id: i64,
    #[field(name = "Url")]
    pub url: String,
    #[field(name = "ParentId")]
    pub parent_id: Option<i64>,
    #[field(skip)]
    pub children: Vec<Menu>,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct BlogPost {
    #[field(primary_key)]
    pub post_key: i64,
    pub title: String,
    pub published: bool,
}

#[derive(Record)]
pub struct UrlChange {
    #[field(name = "Url")]
    pub url: String,
}

#[derive(Debug, Entity)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

fn menu() -> Menu {
    Menu {
        id: 4,
        url: String::from("/home"),
        parent_id: None,
        children: Vec::new(),
    }
}

#[test]
fn test_fields_follow_declaration_order() {
    assert_eq!(fields_of(&menu()).as_slice(), &["Id", "Url", "ParentId"]);
    assert_eq!(Menu::FIELDS.len(), 4);
    assert!(!Menu::FIELDS[3].mapped);
}

#[test]
fn test_skipped_field_never_appears() {
    for _ in 0..3 {
        let fields = FieldSet::of::<Menu>();
        assert!(!fields.contains("children"));
        assert_eq!(fields, Menu::columns());
    }
}

#[test]
fn test_field_values() {
    let value = menu();
    assert_eq!(value.field_value("Id"), Some(SqlValue::Int(4)));
    assert_eq!(
        value.field_value("Url"),
        Some(SqlValue::Text(String::from("/home")))
    );
    assert_eq!(value.field_value("ParentId"), Some(SqlValue::Null));
    assert_eq!(value.field_value("children"), None);
}

#[test]
fn test_entity_meta() {
    assert_eq!(Menu::META.table, "Menu");
    assert_eq!(Menu::META.primary_key, "Id");
    assert_eq!(Menu::META.type_name, "Menu");

    assert_eq!(BlogPost::META.table, "blog_post");
    assert_eq!(BlogPost::META.primary_key, "post_key");

    assert_eq!(Tag::META.table, "tag");
    assert_eq!(Tag::META.primary_key, "id");
}

#[test]
fn test_from_row() {
    let row = Row::new(vec![
        (String::from("Id"), SqlValue::Int(9)),
        (String::from("Url"), SqlValue::Text(String::from("/a"))),
        (String::from("ParentId"), SqlValue::Int(1)),
    ]);
    let value = Menu::from_row(&row).unwrap();
    assert_eq!(value.id, 9);
    assert_eq!(value.url, "/a");
    assert_eq!(value.parent_id, Some(1));
    assert!(value.children.is_empty());
}

#[test]
fn test_from_row_missing_column() {
    let row = Row::new(vec![(String::from("Id"), SqlValue::Int(9))]);
    assert!(Menu::from_row(&row).is_err());
}

#[test]
fn test_from_row_bool_from_integer() {
    let row = Row::new(vec![
        (String::from("post_key"), SqlValue::Int(1)),
        (String::from("title"), SqlValue::Text(String::from("t"))),
        (String::from("published"), SqlValue::Int(1)),
    ]);
    let post = BlogPost::from_row(&row).unwrap();
    assert!(post.published);
}

#[test]
fn test_record_drives_builders() {
    let sqlite = DialectKind::Sqlite.policy();
    let value = menu();
    let insert = Insert::into(sqlite, Menu::META.table)
        .data(&value)
        .key(Menu::META.primary_key)
        .build()
        .unwrap();
    assert_eq!(
        insert.sql,
        "INSERT INTO \"Menu\" (\"Url\", \"ParentId\") VALUES (@Url, @ParentId); SELECT last_insert_rowid()"
    );

    let change = UrlChange {
        url: String::from("/new"),
    };
    let key = ParamSet::new().with("Id", 4_i64).unwrap();
    let update = Update::table(sqlite, "Menu")
        .data(&change)
        .filter(&key)
        .build()
        .unwrap();
    assert_eq!(update.sql, "UPDATE \"Menu\" SET \"Url\" = @Url WHERE \"Id\" = @Id");
    assert_eq!(change.to_param_set().len(), 1);
}

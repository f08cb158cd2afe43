mod common;
use common::setup_db;

use diesel::QueryableByName;
use diesel::result::Error as DieselError;
use diesel::sql_types::{BigInt, Text};
use model_catalog::db::statement::SqlParam;

#[derive(QueryableByName, Debug, PartialEq)]
struct Named {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    name: String,
}

#[test]
fn execute_and_fetch_modes() {
    let (_db, catalog) = setup_db();

    let n = catalog
        .execute(
            "INSERT INTO models (name, price) VALUES (?, ?)",
            &["Foo".into(), SqlParam::Integer(5)],
        )
        .unwrap();
    assert_eq!(n, 1);

    let one: Option<Named> = catalog
        .fetch_one("SELECT id, name FROM models WHERE name = ?", &["Foo".into()])
        .unwrap();
    assert_eq!(one.map(|r| r.name).as_deref(), Some("Foo"));

    let none: Option<Named> = catalog
        .fetch_one("SELECT id, name FROM models WHERE name = ?", &["Bar".into()])
        .unwrap();
    assert!(none.is_none());

    let all: Vec<Named> = catalog
        .fetch_all("SELECT id, name FROM models ORDER BY id", &[])
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn storage_errors_surface_to_the_caller() {
    let (_db, catalog) = setup_db();

    let err = catalog
        .execute("INSERT INTO no_such_table VALUES (1)", &[])
        .unwrap_err();
    assert!(err.downcast_ref::<DieselError>().is_some());
    assert!(format!("{err:#}").contains("no_such_table"));

    // Constraint violations are errors too, not silently ignored.
    catalog
        .execute("INSERT INTO models (name) VALUES (?)", &["Foo".into()])
        .unwrap();
    assert!(
        catalog
            .execute("INSERT INTO models (name) VALUES (?)", &["Foo".into()])
            .is_err()
    );
}

#[test]
fn table_introspection() {
    let (_db, catalog) = setup_db();
    assert!(catalog.table_exists("models").unwrap());
    assert!(!catalog.table_exists("nope").unwrap());
    assert_eq!(
        catalog.table_columns("models").unwrap(),
        vec!["id", "name", "price"]
    );

    let tables = catalog.list_tables().unwrap();
    for t in ["models", "markets", "model_markets"] {
        assert!(tables.iter().any(|x| x == t), "missing {t}");
    }
}

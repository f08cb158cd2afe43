mod common;
use common::setup_db;

use model_catalog::Resolution;

fn seeded() -> (common::TestDb, model_catalog::Database) {
    let (db, catalog) = setup_db();
    for name in ["iPhone 13", "iPhone 13 Pro", "Galaxy S21"] {
        catalog.add_model(name, 0).unwrap();
    }
    (db, catalog)
}

#[test]
fn cyrillic_prefix_is_stripped_and_contained_match_wins() {
    let (_db, catalog) = seeded();
    assert_eq!(
        catalog.resolve_model_name("Айфон iPhone 13 Pro   ").unwrap(),
        Resolution {
            needs_review: false,
            name: "iPhone 13 Pro".into()
        }
    );
}

#[test]
fn unknown_device_is_flagged_for_review() {
    let (_db, catalog) = seeded();
    assert_eq!(
        catalog.resolve_model_name("Some Unknown Device XYZ").unwrap(),
        Resolution {
            needs_review: true,
            name: "Some Unknown Device XYZ".into()
        }
    );
}

#[test]
fn exact_names_resolve_to_themselves() {
    let (_db, catalog) = seeded();
    for name in catalog.get_models_names().unwrap() {
        let r = catalog.resolve_model_name(&name).unwrap();
        assert!(!r.needs_review);
        assert_eq!(r.name, name);
    }
}

#[test]
fn threshold_is_configurable() {
    let (_db, catalog) = seeded();
    // Not contained, but close: only the threshold decides the review flag.
    let strict = catalog.resolve_model_name("galaxy s 21").unwrap();
    assert!(strict.needs_review);

    let lenient = catalog.with_review_threshold(50);
    let r = lenient.resolve_model_name("galaxy s 21").unwrap();
    assert!(!r.needs_review);
    assert_eq!(r.name, "galaxy s 21");
}

#[test]
fn close_uncontained_name_passes_default_threshold_unchanged() {
    let (_db, catalog) = seeded();
    catalog.add_model("iPhone 13 Pro Max", 0).unwrap();
    assert_eq!(
        catalog.resolve_model_name("Смартфон iPhone 13 Proo Max").unwrap(),
        Resolution {
            needs_review: false,
            name: "iPhone 13 Proo Max".into()
        }
    );
}

#[test]
fn empty_catalog_always_needs_review() {
    let (_db, catalog) = setup_db();
    let r = catalog.resolve_model_name("iPhone 13").unwrap();
    assert!(r.needs_review);
    assert_eq!(r.name, "iPhone 13");
}

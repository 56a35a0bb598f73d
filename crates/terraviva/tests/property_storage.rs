use rusqlite::Connection;
use tempfile::TempDir;
use terraviva::db::Database;
use terraviva::domain::{NewOwner, NewProperty};
use terraviva::repository::{owners, properties, RepositoryError};

fn test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("test.db"));
    db.init_schema().expect("schema initializes");
    (dir, db)
}

fn seed_owner(db: &Database, name: &str) -> i64 {
    owners::insert(
        db,
        &NewOwner {
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
        },
    )
    .expect("owner inserts")
}

fn listing(owner_id: Option<i64>, title: &str) -> NewProperty {
    NewProperty {
        owner_id,
        title_es: title.to_string(),
        description_es: "Terreno con vista".to_string(),
        title_en: format!("{title} (en)"),
        description_en: "Land with a view".to_string(),
        price: "45000".to_string(),
        location: "Valle Central".to_string(),
        kind: "land".to_string(),
        status: "available".to_string(),
        images: Vec::new(),
        contact_phone: "555-0123".to_string(),
    }
}

#[test]
fn image_list_round_trips_in_order() {
    let (_dir, db) = test_db();
    let owner_id = seed_owner(&db, "Rosa");

    let mut property = listing(Some(owner_id), "Lote costero");
    property.images = vec![
        "uploads/aa_frente.jpg".to_string(),
        "uploads/bb_plano.png".to_string(),
        "uploads/cc_acceso.webp".to_string(),
    ];
    let id = properties::insert(&db, &property).expect("insert");

    let stored = properties::get(&db, id).expect("get").expect("exists");
    assert_eq!(stored.images, property.images, "order must be preserved");
}

#[test]
fn empty_or_null_image_column_decodes_to_empty_list() {
    let (_dir, db) = test_db();
    let id = properties::insert(&db, &listing(None, "Sin fotos")).expect("insert");

    // Null out the column behind the repository's back.
    let conn = Connection::open(db.path()).expect("open raw connection");
    conn.execute("UPDATE properties SET images = NULL WHERE id = ?1", [id])
        .expect("raw update");

    let stored = properties::get(&db, id).expect("get").expect("exists");
    assert!(stored.images.is_empty());
}

#[test]
fn list_joins_owner_name_and_orders_newest_first() {
    let (_dir, db) = test_db();
    let owner_id = seed_owner(&db, "Rosa");

    let first = properties::insert(&db, &listing(Some(owner_id), "Antigua")).expect("insert");
    let second = properties::insert(&db, &listing(None, "Reciente")).expect("insert");

    // Backdate the first row so the ordering is deterministic.
    let conn = Connection::open(db.path()).expect("open raw connection");
    conn.execute(
        "UPDATE properties SET created_at = '2020-01-01 00:00:00' WHERE id = ?1",
        [first],
    )
    .expect("raw update");

    let listed = properties::list(&db).expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second);
    assert_eq!(listed[1].id, first);
    assert_eq!(listed[1].owner_name.as_deref(), Some("Rosa"));
    assert_eq!(listed[0].owner_name, None, "ownerless row joins to NULL");
}

#[test]
fn owner_soft_delete_leaves_dangling_reference_on_property() {
    let (_dir, db) = test_db();
    let owner_id = seed_owner(&db, "Rosa");
    let id = properties::insert(&db, &listing(Some(owner_id), "Lote")).expect("insert");

    owners::soft_delete(&db, owner_id).expect("owner delete");

    let stored = properties::get(&db, id).expect("get").expect("exists");
    assert_eq!(stored.owner_id, Some(owner_id), "reference is kept");
    assert_eq!(
        stored.owner_name.as_deref(),
        Some("Rosa"),
        "join ignores the owner's activity flag"
    );
}

#[test]
fn list_by_owner_filters_and_skips_the_join() {
    let (_dir, db) = test_db();
    let rosa = seed_owner(&db, "Rosa");
    let miguel = seed_owner(&db, "Miguel");

    properties::insert(&db, &listing(Some(rosa), "De Rosa")).expect("insert");
    properties::insert(&db, &listing(Some(miguel), "De Miguel")).expect("insert");

    let listed = properties::list_by_owner(&db, rosa).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title_es, "De Rosa");
    assert_eq!(listed[0].owner_name, None);
}

#[test]
fn update_rewrites_fields_and_reserializes_images() {
    let (_dir, db) = test_db();
    let id = properties::insert(&db, &listing(None, "Original")).expect("insert");

    let mut edited = listing(None, "Editada");
    edited.status = "sold".to_string();
    edited.images = vec!["uploads/zz_nuevo.png".to_string()];
    properties::update(&db, id, &edited).expect("update");

    let stored = properties::get(&db, id).expect("get").expect("exists");
    assert_eq!(stored.title_es, "Editada");
    assert_eq!(stored.status, "sold");
    assert_eq!(stored.images, vec!["uploads/zz_nuevo.png".to_string()]);
}

#[test]
fn soft_deleted_property_is_hidden_from_all_reads() {
    let (_dir, db) = test_db();
    let owner_id = seed_owner(&db, "Rosa");
    let id = properties::insert(&db, &listing(Some(owner_id), "Lote")).expect("insert");

    properties::soft_delete(&db, id).expect("soft delete");

    assert!(properties::get(&db, id).expect("get").is_none());
    assert!(properties::list(&db).expect("list").is_empty());
    assert!(properties::list_by_owner(&db, owner_id)
        .expect("list by owner")
        .is_empty());
}

#[test]
fn mutations_on_unknown_property_are_not_found() {
    let (_dir, db) = test_db();
    assert!(matches!(
        properties::update(&db, 404, &listing(None, "Nada")),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        properties::soft_delete(&db, 404),
        Err(RepositoryError::NotFound)
    ));
}

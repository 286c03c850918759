//! Temp-file database fixtures for repository tests.

use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, get_connection, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::members::UserDB;
use crate::schema::users;

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

/// Must be called inside a Tokio runtime; the writer actor is spawned on it.
pub fn setup() -> TestDb {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}

/// Inserts a member directly, bypassing the writer.
pub fn insert_member(db: &TestDb, owner_id: &str, id: &str, first_name: &str, phone: &str) {
    let now = Utc::now().naive_utc();
    let row = UserDB {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: Some("Test".to_string()),
        email: None,
        avatar_url: None,
        country_code: "+92".to_string(),
        phone_number: phone.to_string(),
        role: "MEMBER".to_string(),
        is_active: true,
        created_by: Some(owner_id.to_string()),
        created_at: now,
        updated_at: now,
    };
    let mut conn = get_connection(&db.pool).expect("Failed to get connection");
    diesel::insert_into(users::table)
        .values(&row)
        .execute(&mut conn)
        .expect("Failed to insert member");
}

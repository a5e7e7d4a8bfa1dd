use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Public URL of the uploaded profile picture, NULL until one is set
ALTER TABLE users ADD COLUMN profile_picture TEXT;
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

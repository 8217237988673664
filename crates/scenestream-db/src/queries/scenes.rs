//! Scene query operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use scenestream_common::{Error, Result, SceneId};

use crate::models::Scene;

const SCENE_COLUMNS: &str = "id, title, created_at";

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn scene_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<SceneId> {
    let raw: i64 = row.get(idx)?;
    SceneId::new(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

fn row_to_scene(row: &Row<'_>) -> rusqlite::Result<Scene> {
    Ok(Scene {
        id: scene_id_column(row, 0)?,
        title: row.get(1)?,
        created_at: parse_timestamp(&row.get::<_, String>(2)?),
    })
}

/// Create a new scene.
pub fn create_scene(conn: &Connection, title: &str) -> Result<Scene> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO scenes (title, created_at) VALUES (?, ?)",
        params![title, now.to_rfc3339()],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Scene {
        id: SceneId::new(conn.last_insert_rowid())?,
        title: title.to_string(),
        created_at: now,
    })
}

/// Get a scene by ID, `NotFound` if it does not exist.
pub fn get_scene(conn: &Connection, id: SceneId) -> Result<Scene> {
    find_scene(conn, id)?.ok_or_else(|| Error::not_found(format!("scene {id}")))
}

/// Get a scene by ID if it exists.
pub fn find_scene(conn: &Connection, id: SceneId) -> Result<Option<Scene>> {
    conn.query_row(
        &format!("SELECT {SCENE_COLUMNS} FROM scenes WHERE id = ?"),
        [id.get()],
        row_to_scene,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List scenes ordered by ID.
pub fn list_scenes(conn: &Connection) -> Result<Vec<Scene>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {SCENE_COLUMNS} FROM scenes ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;

    let scenes = stmt
        .query_map([], row_to_scene)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(scenes)
}

/// Delete a scene and, through the foreign key, its files.
pub fn delete_scene(conn: &Connection, id: SceneId) -> Result<()> {
    let affected = conn
        .execute("DELETE FROM scenes WHERE id = ?", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found(format!("scene {id}")));
    }
    Ok(())
}

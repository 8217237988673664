//! Media file query operations.
//!
//! Each scene owns any number of files; at most one of them is primary and
//! that one is what gets streamed. The first file added to a scene becomes
//! its primary file.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use scenestream_common::{Error, MediaFileId, Result, SceneId};

use super::scenes::{find_scene, get_scene, parse_timestamp, scene_id_column};
use crate::models::{MediaFileRecord, NewMediaFile, Scene};

const FILE_COLUMNS: &str = "id, scene_id, file_path, container, video_codec, audio_codec, \
     width, height, duration_secs, bit_rate, file_size, is_primary, created_at";

fn to_sql_int(name: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::invalid_input(format!("{name} out of range: {value}")))
}

fn row_to_file(row: &Row<'_>) -> rusqlite::Result<MediaFileRecord> {
    let raw_id: i64 = row.get(0)?;
    let id = MediaFileId::new(raw_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(MediaFileRecord {
        id,
        scene_id: scene_id_column(row, 1)?,
        file_path: row.get(2)?,
        container: row.get(3)?,
        video_codec: row.get(4)?,
        audio_codec: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        duration_secs: row.get(8)?,
        bit_rate: u64::try_from(row.get::<_, i64>(9)?).unwrap_or(0),
        file_size: u64::try_from(row.get::<_, i64>(10)?).unwrap_or(0),
        is_primary: row.get::<_, i32>(11)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(12)?),
    })
}

/// Register a probed file for a scene.
pub fn create_media_file(
    conn: &Connection,
    scene_id: SceneId,
    file: &NewMediaFile,
) -> Result<MediaFileRecord> {
    get_scene(conn, scene_id)?;

    let is_primary = get_primary_file(conn, scene_id)?.is_none();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO media_files (scene_id, file_path, container, video_codec, audio_codec,
                                  width, height, duration_secs, bit_rate, file_size,
                                  is_primary, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            scene_id.get(),
            file.file_path,
            file.container,
            file.video_codec,
            file.audio_codec,
            file.width,
            file.height,
            file.duration_secs.max(0.0),
            to_sql_int("bit_rate", file.bit_rate)?,
            to_sql_int("file_size", file.file_size)?,
            is_primary as i32,
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(MediaFileRecord {
        id: MediaFileId::new(conn.last_insert_rowid())?,
        scene_id,
        file_path: file.file_path.clone(),
        container: file.container.clone(),
        video_codec: file.video_codec.clone(),
        audio_codec: file.audio_codec.clone(),
        width: file.width,
        height: file.height,
        duration_secs: file.duration_secs.max(0.0),
        bit_rate: file.bit_rate,
        file_size: file.file_size,
        is_primary,
        created_at: now,
    })
}

/// Get a media file by ID.
pub fn get_media_file(conn: &Connection, id: MediaFileId) -> Result<MediaFileRecord> {
    conn.query_row(
        &format!("SELECT {FILE_COLUMNS} FROM media_files WHERE id = ?"),
        [id.get()],
        row_to_file,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found(format!("media file {id}")),
        _ => Error::database(e.to_string()),
    })
}

/// The file streamed for a scene, if one is set.
pub fn get_primary_file(conn: &Connection, scene_id: SceneId) -> Result<Option<MediaFileRecord>> {
    conn.query_row(
        &format!("SELECT {FILE_COLUMNS} FROM media_files WHERE scene_id = ? AND is_primary = 1"),
        [scene_id.get()],
        row_to_file,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// A scene and its primary file, read in one transaction.
///
/// `None` when the scene does not exist.
pub fn find_scene_with_primary(
    conn: &Connection,
    scene_id: SceneId,
) -> Result<Option<(Scene, Option<MediaFileRecord>)>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let Some(scene) = find_scene(&tx, scene_id)? else {
        return Ok(None);
    };
    let primary = get_primary_file(&tx, scene_id)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Some((scene, primary)))
}

/// All files of a scene, primary first.
pub fn list_media_files_for_scene(
    conn: &Connection,
    scene_id: SceneId,
) -> Result<Vec<MediaFileRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM media_files WHERE scene_id = ? ORDER BY is_primary DESC, id"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let files = stmt
        .query_map([scene_id.get()], row_to_file)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(files)
}

/// Make `file_id` the primary file of `scene_id`.
///
/// The file must belong to the scene.
pub fn set_primary_file(conn: &Connection, scene_id: SceneId, file_id: MediaFileId) -> Result<()> {
    let file = get_media_file(conn, file_id)?;
    if file.scene_id != scene_id {
        return Err(Error::invalid_input(format!(
            "media file {file_id} does not belong to scene {scene_id}"
        )));
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    tx.execute(
        "UPDATE media_files SET is_primary = 0 WHERE scene_id = ?",
        [scene_id.get()],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    tx.execute(
        "UPDATE media_files SET is_primary = 1 WHERE id = ?",
        [file_id.get()],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Delete a media file. A deleted primary leaves the scene without one.
pub fn delete_media_file(conn: &Connection, id: MediaFileId) -> Result<()> {
    let affected = conn
        .execute("DELETE FROM media_files WHERE id = ?", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found(format!("media file {id}")));
    }
    Ok(())
}

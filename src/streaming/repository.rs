//! Scene lookup used by stream resolution.

use scenestream_common::{Result, SceneId};
use scenestream_db::models::{MediaFileRecord, Scene};
use scenestream_db::pool::{get_conn, DbPool};
use scenestream_db::queries::media_files;

/// Read-only access to scenes and their primary files.
pub trait SceneRepository: Send + Sync {
    /// A scene with its primary file, read as one consistent snapshot.
    ///
    /// `None` when the scene does not exist.
    fn scene_with_primary(&self, id: SceneId) -> Result<Option<(Scene, Option<MediaFileRecord>)>>;
}

/// [`SceneRepository`] over the SQLite pool.
#[derive(Clone)]
pub struct DbSceneRepository {
    pool: DbPool,
}

impl DbSceneRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SceneRepository for DbSceneRepository {
    fn scene_with_primary(&self, id: SceneId) -> Result<Option<(Scene, Option<MediaFileRecord>)>> {
        let conn = get_conn(&self.pool)?;
        media_files::find_scene_with_primary(&conn, id)
    }
}

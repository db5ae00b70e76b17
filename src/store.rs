use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::OnConflict,
};
use tokio::sync::OnceCell;

use crate::{
    db,
    entities::favorite_movie,
    models::{FavoriteMovie, NewFavorite},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection is not available")]
    Disconnected,

    #[error("{0}")]
    Db(#[from] DbErr),
}

#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Inserts the favorite, or refreshes title and year if the id is already stored.
    async fn upsert_favorite(&self, favorite: NewFavorite) -> Result<i32, StoreError>;

    /// All favorites, most recently added first.
    async fn list_favorites(&self) -> Result<Vec<FavoriteMovie>, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    async fn remove_favorite(&self, imdb_id: &str) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReconnectPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { attempts: 1, delay: Duration::from_secs(2) }
    }
}

/// sea-orm backed store. The connection slot is filled once, either by the
/// initial connect or by the reconnect task.
#[derive(Clone, Default)]
pub struct DbFavoritesStore {
    conn: Arc<OnceCell<DatabaseConnection>>,
}

impl DbFavoritesStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { conn: Arc::new(OnceCell::new_with(Some(db))) }
    }

    /// A handle with no connection; every operation fails until one is attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub async fn connect(database_url: &str, policy: ReconnectPolicy) -> Self {
        let store = Self::disconnected();
        match db::connect_and_migrate(database_url).await {
            Ok(db) => {
                tracing::info!("connected to database");
                store.attach(db);
            },
            Err(err) => {
                tracing::warn!(error = %err, "database connection failed");
                store.spawn_reconnect(database_url.to_string(), policy);
            },
        }
        store
    }

    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    fn attach(&self, db: DatabaseConnection) {
        if self.conn.set(db).is_err() {
            tracing::debug!("database connection already attached");
        }
    }

    fn spawn_reconnect(&self, database_url: String, policy: ReconnectPolicy) {
        let store = self.clone();
        tokio::spawn(async move {
            for attempt in 1..=policy.attempts {
                tokio::time::sleep(policy.delay).await;
                match db::connect_and_migrate(&database_url).await {
                    Ok(db) => {
                        tracing::info!(attempt, "reconnected to database");
                        store.attach(db);
                        return;
                    },
                    Err(err) => {
                        tracing::warn!(attempt, error = %err, "database reconnect failed");
                    },
                }
            }
            tracing::error!(
                attempts = policy.attempts,
                "giving up on database, favorites are unavailable"
            );
        });
    }

    fn db(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn.get().ok_or(StoreError::Disconnected)
    }
}

#[async_trait]
impl FavoritesStore for DbFavoritesStore {
    async fn upsert_favorite(&self, favorite: NewFavorite) -> Result<i32, StoreError> {
        let db = self.db()?;
        let model = favorite_movie::ActiveModel {
            id: Default::default(),
            imdb_id: Set(favorite.imdb_id.clone()),
            title: Set(favorite.title),
            year: Set(favorite.year),
            kind: Set(favorite.kind),
            poster: Set(favorite.poster),
            created_at: Set(now_millis()),
        };

        let inserted = favorite_movie::Entity::insert(model)
            .on_conflict(
                OnConflict::column(favorite_movie::Column::ImdbId)
                    .update_columns([favorite_movie::Column::Title, favorite_movie::Column::Year])
                    .to_owned(),
            )
            .exec(db)
            .await;

        match inserted {
            Ok(res) => Ok(res.last_insert_id),
            // MySQL reports zero affected rows when the update changed nothing
            Err(DbErr::RecordNotInserted) => {
                let id: Option<i32> = favorite_movie::Entity::find()
                    .select_only()
                    .column(favorite_movie::Column::Id)
                    .filter(favorite_movie::Column::ImdbId.eq(favorite.imdb_id))
                    .into_tuple()
                    .one(db)
                    .await?;
                id.ok_or(StoreError::Db(DbErr::RecordNotInserted))
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn list_favorites(&self) -> Result<Vec<FavoriteMovie>, StoreError> {
        let rows = favorite_movie::Entity::find()
            .order_by_desc(favorite_movie::Column::CreatedAt)
            .order_by_desc(favorite_movie::Column::Id)
            .all(self.db()?)
            .await?;
        Ok(rows.into_iter().map(FavoriteMovie::from).collect())
    }

    async fn remove_favorite(&self, imdb_id: &str) -> Result<u64, StoreError> {
        let res = favorite_movie::Entity::delete_many()
            .filter(favorite_movie::Column::ImdbId.eq(imdb_id))
            .exec(self.db()?)
            .await?;
        Ok(res.rows_affected)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db()?.ping().await?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn store() -> DbFavoritesStore {
        DbFavoritesStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    fn favorite(imdb_id: &str, title: &str) -> NewFavorite {
        NewFavorite {
            imdb_id: imdb_id.to_string(),
            title: title.to_string(),
            year: "2008".to_string(),
            kind: "movie".to_string(),
            poster: "N/A".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_updates_title_and_year_but_keeps_row() {
        let store = store().await;
        let first = store.upsert_favorite(favorite("tt0468569", "Dark Knight")).await.unwrap();
        let before = store.list_favorites().await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut again = favorite("tt0468569", "The Dark Knight");
        again.year = "2008–".to_string();
        again.kind = "series".to_string();
        again.poster = "https://example.test/p.jpg".to_string();
        let second = store.upsert_favorite(again).await.unwrap();

        let after = store.list_favorites().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].title, "The Dark Knight");
        assert_eq!(after[0].year, "2008–");
        assert_eq!(after[0].created_at, before[0].created_at);
        // category and poster keep their first values
        assert_eq!(after[0].kind, "movie");
        assert_eq!(after[0].poster, "N/A");
    }

    #[tokio::test]
    async fn lists_most_recent_first() {
        let store = store().await;
        store.upsert_favorite(favorite("tt0000001", "A")).await.unwrap();
        store.upsert_favorite(favorite("tt0000002", "B")).await.unwrap();

        let ids: Vec<String> =
            store.list_favorites().await.unwrap().into_iter().map(|f| f.imdb_id).collect();
        assert_eq!(ids, ["tt0000002", "tt0000001"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        assert!(store().await.list_favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_reports_affected_rows() {
        let store = store().await;
        store.upsert_favorite(favorite("tt1375666", "Inception")).await.unwrap();

        assert_eq!(store.remove_favorite("tt1375666").await.unwrap(), 1);
        assert_eq!(store.remove_favorite("tt1375666").await.unwrap(), 0);
        assert_eq!(store.remove_favorite("tt9999999").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn disconnected_store_fails_every_operation() {
        let store = DbFavoritesStore::disconnected();
        assert!(!store.is_connected());
        assert_matches!(
            store.upsert_favorite(favorite("tt1", "x")).await,
            Err(StoreError::Disconnected)
        );
        assert_matches!(store.list_favorites().await, Err(StoreError::Disconnected));
        assert_matches!(store.remove_favorite("tt1").await, Err(StoreError::Disconnected));
        assert_matches!(store.ping().await, Err(StoreError::Disconnected));
    }

    #[tokio::test]
    async fn failed_connect_retries_once_then_stays_down() {
        let policy = ReconnectPolicy { attempts: 1, delay: Duration::from_millis(10) };
        let store =
            DbFavoritesStore::connect("sqlite:///nonexistent-dir/cinefav.db?mode=ro", policy).await;
        assert!(!store.is_connected());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!store.is_connected());
        assert_matches!(store.list_favorites().await, Err(StoreError::Disconnected));
    }

    #[tokio::test]
    async fn reconnect_attaches_once_database_becomes_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let url = format!("sqlite://{}?mode=rwc", data_dir.join("cinefav.db").display());

        // the parent directory is missing, so the first attempt fails
        let policy = ReconnectPolicy { attempts: 1, delay: Duration::from_millis(200) };
        let store = DbFavoritesStore::connect(&url, policy).await;
        assert!(!store.is_connected());

        std::fs::create_dir(&data_dir).unwrap();
        for _ in 0..50 {
            if store.is_connected() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(store.is_connected());

        store.upsert_favorite(favorite("tt1375666", "Inception")).await.unwrap();
        assert_eq!(store.list_favorites().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn connect_attaches_on_success() {
        let store = DbFavoritesStore::connect("sqlite::memory:", ReconnectPolicy::default()).await;
        assert!(store.is_connected());
        store.ping().await.unwrap();
    }
}

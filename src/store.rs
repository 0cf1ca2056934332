use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info, warn};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{InsertOutcome, MovieDetails},
};

/// Size of the ranked list shown on the home page.
pub const TOP_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the top rated movies with `rank` brought in line with their order.
    ///
    /// This is a read with a write side effect: stale ranks are rewritten through
    /// [`refresh_ranking`] before the list is handed back.
    pub async fn list_top_movies(&self) -> AppResult<Vec<movie::Model>> {
        let txn = self.db.begin().await?;

        let movies = top_movies().all(&txn).await?;
        let changed = refresh_ranking(&txn, &movies).await?;
        let movies = if changed > 0 { top_movies().all(&txn).await? } else { movies };

        txn.commit().await?;

        if changed > 0 {
            debug!(changed, listed = movies.len(), "ranking refreshed");
        }
        Ok(movies)
    }

    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<movie::Model>> {
        let found = movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    /// Inserts a catalog record. The unique title index decides duplicates, so two
    /// concurrent inserts of one title cannot both succeed. A duplicate hands back the
    /// record already stored under that title.
    pub async fn insert(&self, details: MovieDetails) -> AppResult<InsertOutcome> {
        let title = details.title.clone();
        let model = movie::ActiveModel {
            title: Set(details.title),
            release_date: Set(details.release_date),
            overview: Set(details.overview),
            poster_url: Set(details.poster_url),
            ..Default::default()
        };

        let txn = self.db.begin().await?;
        match model.insert(&txn).await {
            Ok(created) => {
                txn.commit().await?;
                info!(id = created.id, title = %created.title, "movie added");
                Ok(InsertOutcome::Created(created))
            },
            Err(err) => {
                // The insert error is the one worth reporting.
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, cause = %err, "rollback after failed insert failed");
                }
                if !matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(AppError::Persistence(err));
                }
                let existing = self
                    .find_by_title(&title)
                    .await?
                    .ok_or_else(|| AppError::Persistence(err))?;
                debug!(id = existing.id, title = %title, "movie already present");
                Ok(InsertOutcome::Duplicate(existing))
            },
        }
    }

    pub async fn update_rating(&self, id: i32, rating: f64, review: String) -> AppResult<()> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Rating, Expr::value(rating))
            .col_expr(movie::Column::Review, Expr::value(review))
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::not_found(format!("movie {id}")));
        }
        info!(id, rating, "movie rated");
        Ok(())
    }

    pub async fn delete_by_id(&self, id: i32) -> AppResult<movie::Model> {
        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Err(AppError::not_found(format!("movie {id}")));
        };
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(id, title = %existing.title, "movie deleted");
        Ok(existing)
    }
}

fn top_movies() -> Select<movie::Entity> {
    movie::Entity::find()
        .order_by_desc(movie::Column::Rating)
        .order_by_asc(movie::Column::Id)
        .limit(TOP_LIMIT)
}

/// Assigns ranks `1..=movies.len()` in slice order and writes only the rows whose rank
/// changed. Returns how many rows were written.
pub async fn refresh_ranking<C: ConnectionTrait>(
    conn: &C,
    movies: &[movie::Model],
) -> AppResult<usize> {
    let mut changed = 0;
    for (pos, m) in movies.iter().enumerate() {
        let rank = pos as i32 + 1;
        if m.rank == Some(rank) {
            continue;
        }
        let mut active: movie::ActiveModel = m.clone().into();
        active.rank = Set(Some(rank));
        active.update(conn).await?;
        changed += 1;
    }
    Ok(changed)
}

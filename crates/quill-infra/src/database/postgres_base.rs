use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use quill_core::error::RepoError;
use quill_core::ports::BaseRepository;

/// Constraint names created by the migration, and the field each one guards.
const CONSTRAINT_FIELDS: &[(&str, &str)] = &[
    ("idx-users-username", "username"),
    ("idx-groups-slug", "slug"),
    ("idx-follows-user-author", "author"),
    ("chk-follows-not-self", "author"),
    ("fk-posts-author", "author"),
    ("fk-posts-group", "group"),
    ("fk-comments-post", "post"),
    ("fk-comments-author", "author"),
    ("fk-follows-user", "user"),
    ("fk-follows-author", "author"),
];

/// Translate a database error, naming the violated field where possible.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    let message = err.to_string();
    let field = CONSTRAINT_FIELDS
        .iter()
        .find(|(name, _)| message.contains(name))
        .map(|(_, field)| *field);

    match (err.sql_err(), field) {
        (Some(SqlErr::UniqueConstraintViolation(_)), field) => {
            RepoError::constraint(field.unwrap_or("id"), "already exists")
        }
        (Some(SqlErr::ForeignKeyConstraintViolation(_)), field) => {
            RepoError::constraint(field.unwrap_or("id"), "referenced row does not exist")
        }
        (_, Some(field)) => RepoError::constraint(field, message),
        (_, None) => match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(message),
            _ => RepoError::Query(message),
        },
    }
}

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Clone + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Ids are generated by the domain, so a set primary key does not tell
        // a new row from an existing one: try the update, fall back to insert.
        let active_model: E::ActiveModel = entity.into();
        let model = match active_model.clone().update(&self.db).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => {
                active_model.insert(&self.db).await.map_err(map_db_err)?
            }
            Err(e) => return Err(map_db_err(e)),
        };

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

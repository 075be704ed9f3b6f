use crate::types::note::{Note, NoteDraft, NoteUpdate};
use async_trait::async_trait;
use handle_errors::Error;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, Error>;
    async fn get(&self, id: &str) -> Result<Note, Error>;
    async fn create(&self, draft: NoteDraft) -> Result<Note, Error>;
    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Note, Error>;
    async fn delete(&self, id: &str) -> Result<Note, Error>;
}

/// Handle shared by every route. Cloning it only clones the `Arc`.
#[derive(Clone)]
pub struct Store {
    notes: Arc<dyn NoteStore>,
}

impl Store {
    pub fn new<S: NoteStore + 'static>(notes: S) -> Self {
        Store {
            notes: Arc::new(notes),
        }
    }

    pub async fn postgres(db_url: &str) -> Result<Self, Error> {
        Ok(Store::new(PostgresStore::new(db_url).await?))
    }

    pub async fn get_every_note(&self) -> Result<Vec<Note>, Error> {
        self.notes.list().await
    }

    pub async fn get_note(&self, id: &str) -> Result<Note, Error> {
        self.notes.get(id).await
    }

    pub async fn add_note(&self, draft: NoteDraft) -> Result<Note, Error> {
        self.notes.create(draft).await
    }

    pub async fn update_note(&self, id: &str, update: NoteUpdate) -> Result<Note, Error> {
        self.notes.update(id, update).await
    }

    pub async fn delete_note(&self, id: &str) -> Result<Note, Error> {
        self.notes.delete(id).await
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("note with id: {} not found", id))
}

/// Notes kept in process, with sequential ids.
#[derive(Default)]
pub struct MemoryStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        MemoryStore {
            notes: RwLock::new(notes),
        }
    }

    /// The sample notes served when no database is configured.
    pub fn seeded() -> Self {
        let sample = [
            ("HTML is easy", true),
            ("Browser can execute only JavaScript", false),
            (
                "GET and POST are the most important methods of HTTP protocol",
                true,
            ),
            (
                "GET and POST are the most important methods of HTTP protocol",
                true,
            ),
        ];
        MemoryStore::with_notes(
            sample
                .iter()
                .enumerate()
                .map(|(i, (content, important))| Note {
                    id: (i + 1).to_string(),
                    content: content.to_string(),
                    important: *important,
                })
                .collect(),
        )
    }
}

fn next_id(notes: &[Note]) -> String {
    let max = notes
        .iter()
        .filter_map(|note| note.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Note>, Error> {
        Ok(self.notes.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Note, Error> {
        self.notes
            .read()
            .await
            .iter()
            .find(|note| note.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, draft: NoteDraft) -> Result<Note, Error> {
        let mut notes = self.notes.write().await;
        let note = Note {
            id: next_id(&notes),
            content: draft.content,
            important: draft.important,
        };
        notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Note, Error> {
        let mut notes = self.notes.write().await;
        let note = notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| not_found(id))?;
        update.apply(note);
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> Result<Note, Error> {
        let mut notes = self.notes.write().await;
        match notes.iter().position(|note| note.id == id) {
            Some(index) => Ok(notes.remove(index)),
            None => Err(not_found(id)),
        }
    }
}

const CREATE_NOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL CHECK (char_length(content) >= 5),
    important BOOLEAN NOT NULL DEFAULT FALSE
)";

pub struct PostgresStore {
    pub connection: PgPool,
}

impl PostgresStore {
    pub async fn new(db_url: &str) -> Result<Self, Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(db_url)
            .await
            .map_err(|e| {
                error!("cannot connect to database: {}", e);
                Error::DatabaseQueryError(e)
            })?;

        sqlx::query(CREATE_NOTES_TABLE)
            .execute(&db_pool)
            .await
            .map_err(Error::DatabaseQueryError)?;
        info!("connected to database");

        Ok(PostgresStore {
            connection: db_pool,
        })
    }
}

/// Ids are v4 uuids. Anything else cannot name a stored note.
fn parse_id(id: &str) -> Result<String, Error> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| Error::InvalidArgument("malformatted id".to_string()))
}

fn note_from_row(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        content: row.get("content"),
        important: row.get("important"),
    }
}

fn query_error(e: sqlx::Error) -> Error {
    error!("{}", e);
    Error::DatabaseQueryError(e)
}

#[async_trait]
impl NoteStore for PostgresStore {
    async fn list(&self) -> Result<Vec<Note>, Error> {
        sqlx::query("SELECT id, content, important FROM notes")
            .map(note_from_row)
            .fetch_all(&self.connection)
            .await
            .map_err(query_error)
    }

    async fn get(&self, id: &str) -> Result<Note, Error> {
        let key = parse_id(id)?;
        match sqlx::query("SELECT id, content, important FROM notes WHERE id = $1")
            .bind(key)
            .map(note_from_row)
            .fetch_optional(&self.connection)
            .await
        {
            Ok(Some(note)) => Ok(note),
            Ok(None) => Err(not_found(id)),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn create(&self, draft: NoteDraft) -> Result<Note, Error> {
        sqlx::query(
            "INSERT INTO notes (id, content, important)
            VALUES ($1, $2, $3)
            RETURNING id, content, important",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(draft.content)
        .bind(draft.important)
        .map(note_from_row)
        .fetch_one(&self.connection)
        .await
        .map_err(query_error)
    }

    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Note, Error> {
        let key = parse_id(id)?;
        match sqlx::query(
            "UPDATE notes
            SET content = COALESCE($1, content), important = COALESCE($2, important)
            WHERE id = $3
            RETURNING id, content, important",
        )
        .bind(update.content)
        .bind(update.important)
        .bind(key)
        .map(note_from_row)
        .fetch_optional(&self.connection)
        .await
        {
            Ok(Some(note)) => Ok(note),
            Ok(None) => Err(not_found(id)),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn delete(&self, id: &str) -> Result<Note, Error> {
        let key = parse_id(id)?;
        match sqlx::query(
            "DELETE FROM notes
            WHERE id = $1
            RETURNING id, content, important",
        )
        .bind(key)
        .map(note_from_row)
        .fetch_optional(&self.connection)
        .await
        {
            Ok(Some(note)) => Ok(note),
            Ok(None) => Err(not_found(id)),
            Err(e) => Err(query_error(e)),
        }
    }
}

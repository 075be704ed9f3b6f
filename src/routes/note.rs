use crate::store::Store;
use crate::types::note::{NewNote, NoteUpdate};
use percent_encoding::percent_decode_str;
use tracing::{info, instrument};
use warp::http::StatusCode;

pub async fn get_every_note(store: Store) -> Result<impl warp::Reply, warp::Rejection> {
    let notes = store.get_every_note().await?;
    Ok(warp::reply::json(&notes))
}

pub async fn get_note(id: String, store: Store) -> Result<impl warp::Reply, warp::Rejection> {
    let id = percent_decode_str(&id).decode_utf8_lossy();
    match store.get_note(&id).await {
        Ok(note) => Ok(warp::reply::json(&note)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

#[instrument(skip(store))]
pub async fn add_note(store: Store, note: NewNote) -> Result<impl warp::Reply, warp::Rejection> {
    let draft = note.validate()?;
    match store.add_note(draft).await {
        Ok(note) => {
            info!("note created: {}", note.id);
            Ok(warp::reply::json(&note))
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

#[instrument(skip(store))]
pub async fn update_note(
    id: String,
    store: Store,
    update: NoteUpdate,
) -> Result<impl warp::Reply, warp::Rejection> {
    let id = percent_decode_str(&id).decode_utf8_lossy();
    update.validate()?;
    match store.update_note(&id, update).await {
        Ok(note) => {
            info!("note updated: {}", note.id);
            Ok(warp::reply::json(&note))
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

#[instrument(skip(store))]
pub async fn delete_note(id: String, store: Store) -> Result<impl warp::Reply, warp::Rejection> {
    let id = percent_decode_str(&id).decode_utf8_lossy();
    match store.delete_note(&id).await {
        Ok(note) => {
            info!("note deleted: {}", note.id);
            Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

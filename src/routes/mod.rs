pub mod note;

use crate::store::Store;
use handle_errors::return_error;
use warp::{http::Method, Filter};

/// Every `/api/notes` route, with CORS, tracing and error recovery applied.
pub fn notes_api(
    store: Store,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("Content-Type")
        .allow_methods(&[Method::PUT, Method::DELETE, Method::GET, Method::POST]);

    let get_every_note = warp::get()
        .and(warp::path("api"))
        .and(warp::path("notes"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(note::get_every_note);

    let get_note = warp::get()
        .and(warp::path("api"))
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(note::get_note);

    let add_note = warp::post()
        .and(warp::path("api"))
        .and(warp::path("notes"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(note::add_note);

    let update_note = warp::put()
        .and(warp::path("api"))
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(note::update_note);

    let delete_note = warp::delete()
        .and(warp::path("api"))
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(note::delete_note);

    get_every_note
        .or(get_note)
        .or(add_note)
        .or(update_note)
        .or(delete_note)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "notes request",
                method = %info.method(),
                path = %info.path(),
                id = %uuid::Uuid::new_v4(),
            )
        }))
        .with(cors)
        .recover(return_error)
}

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::json;

use common::{film_json, ids, send, user_json};
use filmorate::app::AppState;

async fn like_makes_film_popular(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (_, user) = send(&app, test::TestRequest::post().uri("/users").set_json(user_json("mail@mail.ru", "dolore")).to_request()).await;
    let user = user.unwrap()["id"].as_i64().unwrap();

    let (status, film) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json("nisi eiusmod", "1967-03-25")).to_request()).await;
    let film = film.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(film["rate"], 0);
    assert_eq!(film["likeFromUserId"], json!([]));
    assert_eq!(film["genres"], json!([]));
    assert_eq!(film["mpa"], json!({"id": 1, "name": "G"}));
    let film = film["id"].as_i64().unwrap();

    let (status, _) = send(&app, test::TestRequest::put().uri(&format!("/films/{film}/like/{user}")).to_request()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/films/{film}")).to_request()).await;
    let body = body.unwrap();
    assert_eq!(body["likeFromUserId"], json!([user]));
    assert_eq!(body["rate"], 1);

    let (status, popular) = send(&app, test::TestRequest::get().uri("/films/popular?count=1").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&popular.unwrap()), vec![film]);
}

async fn popular_ties_are_ordered_by_descending_id(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (_, user) = send(&app, test::TestRequest::post().uri("/users").set_json(user_json("mail@mail.ru", "dolore")).to_request()).await;
    let user = user.unwrap()["id"].as_i64().unwrap();

    let mut films = Vec::new();
    for name in ["first", "second", "third"] {
        let (_, body) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json(name, "2000-01-01")).to_request()).await;
        films.push(body.unwrap()["id"].as_i64().unwrap());
    }

    // sans like: id décroissant, tous les films sous le compte par défaut
    let (_, popular) = send(&app, test::TestRequest::get().uri("/films/popular").to_request()).await;
    let popular = popular.unwrap();
    assert_eq!(ids(&popular), vec![films[2], films[1], films[0]]);
    assert_eq!(popular[0]["likeFromUserId"], json!([]));

    send(&app, test::TestRequest::put().uri(&format!("/films/{}/like/{user}", films[0])).to_request()).await;

    let (_, popular) = send(&app, test::TestRequest::get().uri("/films/popular?count=2").to_request()).await;
    assert_eq!(ids(&popular.unwrap()), vec![films[0], films[2]]);

    let (status, body) = send(&app, test::TestRequest::get().uri("/films/popular?count=0").to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Incorrect count");
}

async fn duplicate_like_is_a_conflict(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (_, user) = send(&app, test::TestRequest::post().uri("/users").set_json(user_json("mail@mail.ru", "dolore")).to_request()).await;
    let (_, film) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json("nisi eiusmod", "1967-03-25")).to_request()).await;
    let user = user.unwrap()["id"].as_i64().unwrap();
    let film = film.unwrap()["id"].as_i64().unwrap();

    let uri = format!("/films/{film}/like/{user}");
    send(&app, test::TestRequest::put().uri(&uri).to_request()).await;
    let (status, body) = send(&app, test::TestRequest::put().uri(&uri).to_request()).await;
    let body = body.unwrap();

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert_eq!(
        body["message"],
        format!("Like on filmId {film} from userId {user} already exist")
    );

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/films/{film}")).to_request()).await;
    assert_eq!(body.unwrap()["rate"], 1);
}

async fn deleting_missing_like_is_not_found(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (_, user) = send(&app, test::TestRequest::post().uri("/users").set_json(user_json("mail@mail.ru", "dolore")).to_request()).await;
    let (_, film) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json("nisi eiusmod", "1967-03-25")).to_request()).await;
    let user = user.unwrap()["id"].as_i64().unwrap();
    let film = film.unwrap()["id"].as_i64().unwrap();

    let uri = format!("/films/{film}/like/{user}");
    let (status, body) = send(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body.unwrap()["message"],
        format!("Like on filmId {film} from userId {user} does not exist")
    );

    send(&app, test::TestRequest::put().uri(&uri).to_request()).await;
    let (status, _) = send(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, test::TestRequest::get().uri(&format!("/films/{film}")).to_request()).await;
    assert_eq!(body.unwrap()["rate"], 0);

    let (status, body) = send(&app, test::TestRequest::put().uri(&format!("/films/{film}/like/9999")).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["message"], "User with ID 9999 does not exist");
}

async fn release_date_boundary_is_enforced(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, body) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json("too early", "1895-12-27")).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Incorrect release date");

    let (status, _) = send(&app, test::TestRequest::post().uri("/films").set_json(film_json("first screening", "1895-12-28")).to_request()).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut no_mpa = film_json("no rating", "2000-01-01");
    no_mpa.as_object_mut().unwrap().remove("mpa");
    let (status, body) = send(&app, test::TestRequest::post().uri("/films").set_json(no_mpa).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["message"], "Empty mpa");

    let (_, all) = send(&app, test::TestRequest::get().uri("/films").to_request()).await;
    assert_eq!(all.unwrap().as_array().unwrap().len(), 1);
}

async fn genres_are_deduplicated_and_replaced_on_update(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let mut payload = film_json("New film", "1999-04-30");
    payload["mpa"] = json!({"id": 3});
    payload["genres"] = json!([{"id": 3}, {"id": 1}, {"id": 3}]);
    let (_, film) = send(&app, test::TestRequest::post().uri("/films").set_json(payload.clone()).to_request()).await;
    let film = film.unwrap();
    assert_eq!(
        film["genres"],
        json!([{"id": 1, "name": "Комедия"}, {"id": 3, "name": "Мультфильм"}])
    );
    assert_eq!(film["mpa"]["name"], "PG-13");
    let id = film["id"].as_i64().unwrap();

    payload["id"] = json!(id);
    payload["genres"] = json!([{"id": 2}]);
    let (status, film) = send(&app, test::TestRequest::put().uri("/films").set_json(payload.clone()).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(film.unwrap()["genres"], json!([{"id": 2, "name": "Драма"}]));

    payload["genres"] = json!([{"id": 42}]);
    let (status, _) = send(&app, test::TestRequest::put().uri("/films").set_json(payload.clone()).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // rien n'a été écrit par la mise à jour refusée
    let (_, film) = send(&app, test::TestRequest::get().uri(&format!("/films/{id}")).to_request()).await;
    assert_eq!(film.unwrap()["genres"], json!([{"id": 2, "name": "Драма"}]));

    payload["id"] = json!(9999);
    payload["genres"] = json!([]);
    let (status, body) = send(&app, test::TestRequest::put().uri("/films").set_json(payload).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["message"], "Film with ID 9999 does not exist");
}

async fn dictionaries_are_served(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, genres) = send(&app, test::TestRequest::get().uri("/genres").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&genres.unwrap()), vec![1, 2, 3, 4, 5, 6]);

    let (_, genre) = send(&app, test::TestRequest::get().uri("/genres/6").to_request()).await;
    assert_eq!(genre.unwrap(), json!({"id": 6, "name": "Боевик"}));

    let (status, _) = send(&app, test::TestRequest::get().uri("/genres/9999").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, ratings) = send(&app, test::TestRequest::get().uri("/mpa").to_request()).await;
    let ratings = ratings.unwrap();
    assert_eq!(ids(&ratings), vec![1, 2, 3, 4, 5]);
    assert_eq!(ratings[4]["name"], "NC-17");

    let (status, body) = send(&app, test::TestRequest::get().uri("/mpa/9999").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["message"], "Mpa with ID 9999 does not exist");
}

async fn health_reports_storage(state: AppState) {
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/health").to_request()).await;
    let body = body.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["storage"] == "memory" || body["storage"] == "database");
}

on_both_storages!(
    like_makes_film_popular,
    popular_ties_are_ordered_by_descending_id,
    duplicate_like_is_a_conflict,
    deleting_missing_like_is_not_found,
    release_date_boundary_is_enforced,
    genres_are_deduplicated_and_replaced_on_update,
    dictionaries_are_served,
    health_reports_storage,
);

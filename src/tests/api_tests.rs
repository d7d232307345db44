#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Router};
    use serde_json::{json, Value};

    use crate::config::StorageKind;
    use crate::tests::{send, test_app};

    const ENGINES: [StorageKind; 2] = [StorageKind::File, StorageKind::Db];

    async fn create(app: &Router, uri: &str, body: Value) -> Value {
        let (status, json) = send(app, "POST", uri, Some(&body.to_string())).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, json);
        json
    }

    fn id(v: &Value) -> &str {
        v["id"].as_str().unwrap()
    }

    fn message(v: &Value) -> &str {
        v["error"]["message"].as_str().unwrap_or_default()
    }

    /// state -> city, user, place in the city, two amenities
    async fn seed(app: &Router) -> (Value, Value, Value, Value, Value, Value) {
        let state = create(app, "/api/v1/states", json!({"name": "California"})).await;
        let city = create(app, &format!("/api/v1/states/{}/cities", id(&state)), json!({"name": "SF"})).await;
        let user = create(app, "/api/v1/users", json!({"email": "a@b.io", "password": "pw"})).await;
        let place = create(
            app,
            &format!("/api/v1/cities/{}/places", id(&city)),
            json!({"user_id": id(&user), "name": "Loft", "price_by_night": 120}),
        )
        .await;
        let wifi = create(app, "/api/v1/amenities", json!({"name": "Wifi"})).await;
        let pool = create(app, "/api/v1/amenities", json!({"name": "Pool"})).await;
        (state, city, user, place, wifi, pool)
    }

    #[tokio::test]
    async fn test_status_and_stats() {
        let (_dir, app, _) = test_app(StorageKind::File).await;
        let (status, body) = send(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK"}));

        seed(&app).await;
        let (_, stats) = send(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(
            stats,
            json!({"amenities": 2, "cities": 1, "places": 1, "reviews": 0, "states": 1, "users": 1})
        );
    }

    #[tokio::test]
    async fn test_state_crud() {
        for kind in ENGINES {
            let (_dir, app, _) = test_app(kind).await;
            let state = create(&app, "/api/v1/states", json!({"name": "Texas"})).await;
            assert_eq!(state["__class__"], "State");
            let uri = format!("/api/v1/states/{}", id(&state));

            let (status, fetched) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(fetched["name"], "Texas");
            assert_eq!(fetched["id"], state["id"]);

            let (_, list) = send(&app, "GET", "/api/v1/states", None).await;
            assert_eq!(list.as_array().map(Vec::len), Some(1));

            let put = json!({"name": "Lone Star", "id": "forged", "created_at": "2000-01-01T00:00:00Z"});
            let (status, updated) = send(&app, "PUT", &uri, Some(&put.to_string())).await;
            assert_eq!(status, StatusCode::OK, "{:?}", kind);
            assert_eq!(updated["name"], "Lone Star");
            assert_eq!(updated["id"], state["id"]);
            assert_eq!(updated["created_at"], state["created_at"]);

            let (status, body) = send(&app, "DELETE", &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({}));
            let (status, _) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_bad_bodies() {
        let (_dir, app, _) = test_app(StorageKind::File).await;

        let (status, body) = send(&app, "POST", "/api/v1/states", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message(&body), "Not a JSON");

        let (status, body) = send(&app, "POST", "/api/v1/amenities", Some("[1, 2]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message(&body), "Not a JSON");

        let (status, body) = send(&app, "POST", "/api/v1/states", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message(&body), "Missing name");

        let (status, body) = send(&app, "POST", "/api/v1/states", Some(r#"{"name": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_users_hide_password_and_update_email() {
        let (_dir, app, _) = test_app(StorageKind::Db).await;

        let (_, body) = send(&app, "POST", "/api/v1/users", Some(r#"{"password": "x"}"#)).await;
        assert_eq!(message(&body), "Missing email");
        let (_, body) = send(&app, "POST", "/api/v1/users", Some(r#"{"email": "x@y.z"}"#)).await;
        assert_eq!(message(&body), "Missing password");

        let user = create(&app, "/api/v1/users", json!({"email": "x@y.z", "password": "pw", "first_name": "Ada"})).await;
        assert!(user.get("password").is_none());
        assert_eq!(user["first_name"], "Ada");

        let uri = format!("/api/v1/users/{}", id(&user));
        let put = json!({"email": "ada@y.z", "last_name": "Lovelace", "id": "forged"});
        let (status, updated) = send(&app, "PUT", &uri, Some(&put.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["email"], "ada@y.z");
        assert_eq!(updated["id"], user["id"]);
        assert_eq!(updated["last_name"], "Lovelace");
        assert!(updated.get("password").is_none());

        let (_, fetched) = send(&app, "GET", &uri, None).await;
        assert_eq!(fetched["email"], "ada@y.z");
    }

    #[tokio::test]
    async fn test_place_creation_checks() {
        for kind in ENGINES {
            let (_dir, app, _) = test_app(kind).await;
            let (_, city, user, place, _, _) = seed(&app).await;
            let places_uri = format!("/api/v1/cities/{}/places", id(&city));

            let (status, _) =
                send(&app, "POST", "/api/v1/cities/nope/places", Some(r#"{"user_id": "x", "name": "y"}"#)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, body) = send(&app, "POST", &places_uri, Some(r#"{"name": "y"}"#)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message(&body), "Missing user_id");

            let (status, _) = send(&app, "POST", &places_uri, Some(r#"{"user_id": "ghost", "name": "y"}"#)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let body = json!({"user_id": id(&user)}).to_string();
            let (status, body) = send(&app, "POST", &places_uri, Some(&body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message(&body), "Missing name");

            assert_eq!(place["price_by_night"], 120);
            assert_eq!(place["city_id"], city["id"]);
            let (_, list) = send(&app, "GET", &places_uri, None).await;
            assert_eq!(list.as_array().map(Vec::len), Some(1), "{:?}", kind);

            let put = json!({"city_id": "elsewhere", "user_id": "someone", "max_guest": 4});
            let uri = format!("/api/v1/places/{}", id(&place));
            let (status, updated) = send(&app, "PUT", &uri, Some(&put.to_string())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(updated["city_id"], city["id"]);
            assert_eq!(updated["user_id"], user["id"]);
            assert_eq!(updated["max_guest"], 4);
        }
    }

    #[tokio::test]
    async fn test_reviews() {
        for kind in ENGINES {
            let (_dir, app, _) = test_app(kind).await;
            let (_, _, user, place, _, _) = seed(&app).await;
            let reviews_uri = format!("/api/v1/places/{}/reviews", id(&place));

            let (status, _) = send(&app, "POST", "/api/v1/places/nope/reviews", Some("{}")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (_, body) = send(&app, "POST", &reviews_uri, Some(r#"{"text": "hi"}"#)).await;
            assert_eq!(message(&body), "Missing user_id");
            let (_, body) = send(&app, "POST", &reviews_uri, Some(&json!({"user_id": id(&user)}).to_string())).await;
            assert_eq!(message(&body), "Missing text");

            let review = create(&app, &reviews_uri, json!({"user_id": id(&user), "text": "Great stay"})).await;
            assert_eq!(review["place_id"], place["id"]);

            let (_, list) = send(&app, "GET", &reviews_uri, None).await;
            assert_eq!(list[0]["text"], "Great stay");

            // Deleting the place takes its reviews along
            send(&app, "DELETE", &format!("/api/v1/places/{}", id(&place)), None).await;
            let (status, _) = send(&app, "GET", &format!("/api/v1/reviews/{}", id(&review)), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{:?}", kind);
        }
    }

    #[tokio::test]
    async fn test_amenity_links() {
        for kind in ENGINES {
            let (_dir, app, state) = test_app(kind).await;
            let (_, _, _, place, wifi, _) = seed(&app).await;
            let link = format!("/api/v1/places/{}/amenities/{}", id(&place), id(&wifi));

            let (status, body) = send(&app, "POST", &link, None).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["name"], "Wifi");
            let (status, _) = send(&app, "POST", &link, None).await;
            assert_eq!(status, StatusCode::OK);

            let (_, list) = send(&app, "GET", &format!("/api/v1/places/{}/amenities", id(&place)), None).await;
            assert_eq!(list.as_array().map(Vec::len), Some(1), "{:?}", kind);
            let (_, fetched) = send(&app, "GET", &format!("/api/v1/places/{}", id(&place)), None).await;
            assert_eq!(fetched["amenity_ids"], json!([id(&wifi)]));
            assert_eq!(state.metrics.get_snapshot().amenity_links, 1);

            let (status, _) =
                send(&app, "POST", &format!("/api/v1/places/{}/amenities/ghost", id(&place)), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (status, _) = send(&app, "POST", &format!("/api/v1/places/ghost/amenities/{}", id(&wifi)), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, body) = send(&app, "DELETE", &link, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({}));
            let (status, _) = send(&app, "DELETE", &link, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_places_search() {
        for kind in ENGINES {
            let (_dir, app, _) = test_app(kind).await;
            let (state, city, user, loft, wifi, pool) = seed(&app).await;
            let nv = create(&app, "/api/v1/states", json!({"name": "Nevada"})).await;
            let reno = create(&app, &format!("/api/v1/states/{}/cities", id(&nv)), json!({"name": "Reno"})).await;
            let cabin = create(
                &app,
                &format!("/api/v1/cities/{}/places", id(&reno)),
                json!({"user_id": id(&user), "name": "Cabin"}),
            )
            .await;
            for amenity in [&wifi, &pool] {
                send(&app, "POST", &format!("/api/v1/places/{}/amenities/{}", id(&loft), id(amenity)), None).await;
            }
            send(&app, "POST", &format!("/api/v1/places/{}/amenities/{}", id(&cabin), id(&wifi)), None).await;

            let names = |v: &Value| {
                let mut n: Vec<String> =
                    v.as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap().to_string()).collect();
                n.sort();
                n
            };

            let (status, all) = send(&app, "POST", "/api/v1/places_search", Some("{}")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(names(&all), vec!["Cabin", "Loft"]);

            let empty_lists = r#"{"states": [], "cities": [], "amenities": []}"#;
            let (_, all) = send(&app, "POST", "/api/v1/places_search", Some(empty_lists)).await;
            assert_eq!(names(&all), vec!["Cabin", "Loft"]);

            let by_state = json!({"states": [id(&state)]}).to_string();
            let (_, found) = send(&app, "POST", "/api/v1/places_search", Some(&by_state)).await;
            assert_eq!(names(&found), vec!["Loft"], "{:?}", kind);

            let by_city_or_state = json!({"states": [id(&state)], "cities": [id(&reno)]}).to_string();
            let (_, found) = send(&app, "POST", "/api/v1/places_search", Some(&by_city_or_state)).await;
            assert_eq!(names(&found), vec!["Cabin", "Loft"]);

            let by_amenities = json!({"amenities": [id(&wifi), id(&pool)]}).to_string();
            let (_, found) = send(&app, "POST", "/api/v1/places_search", Some(&by_amenities)).await;
            assert_eq!(names(&found), vec!["Loft"]);

            let combined = json!({"cities": [id(&city), id(&reno)], "amenities": [id(&wifi)]}).to_string();
            let (_, found) = send(&app, "POST", "/api/v1/places_search", Some(&combined)).await;
            assert_eq!(names(&found), vec!["Cabin", "Loft"]);

            let (status, body) = send(&app, "POST", "/api/v1/places_search", Some("nope")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message(&body), "Not a JSON");
        }
    }

    #[tokio::test]
    async fn test_deleting_state_removes_its_cities() {
        for kind in ENGINES {
            let (_dir, app, _) = test_app(kind).await;
            let (state, city, _, place, _, _) = seed(&app).await;

            let (status, _) = send(&app, "DELETE", &format!("/api/v1/states/{}", id(&state)), None).await;
            assert_eq!(status, StatusCode::OK);
            let (status, _) = send(&app, "GET", &format!("/api/v1/cities/{}", id(&city)), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (status, _) = send(&app, "GET", &format!("/api/v1/places/{}", id(&place)), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{:?}", kind);
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (_dir, app, _) = test_app(StorageKind::File).await;
        let (status, body) = send(&app, "GET", "/api/v1/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let (_dir, app, _) = test_app(StorageKind::File).await;
        let req = axum::http::Request::builder().uri("/api/v1/status").body(axum::body::Body::empty()).unwrap();
        let response = tower::ServiceExt::oneshot(app, req).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    }
}

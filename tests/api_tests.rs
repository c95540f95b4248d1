mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{login, send, test_app, SLOW_EMAIL, TAKEN_EMAIL};

#[tokio::test]
async fn test_health_check() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data_source"], "mock");
}

#[tokio::test]
async fn test_protected_route_without_token_redirects_to_login() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/dashboard/financiero", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect_to"], "/login");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/acciones", Some("no-es-un-jwt"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect_to"], "/login");
}

#[tokio::test]
async fn test_login_then_financial_dashboard() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/financiero?weeks=6",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["saldo_total"]["display"], "$285,000");
    assert_eq!(body["data"]["ventana_semanal"]["mostrando"], "Mostrando: 6 semanas");
}

#[tokio::test]
async fn test_malformed_login_is_bad_request() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "no-es-correo", "password": "equivocada" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["notification"]["message"], "Correo electrónico inválido");
}

#[tokio::test]
async fn test_identity_timeout_is_gateway_timeout() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": SLOW_EMAIL, "password": "secreto123" })),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_unparsable_query_and_path_return_json_errors() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/financiero?weeks=abc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, Method::GET, "/api/agenda/accion/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_failed_login_stays_on_form() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@flota.mx", "password": "equivocada" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["notification"]["kind"], "error");
    assert_eq!(body["notification"]["message"], "Invalid login credentials");
    assert!(body.get("redirect_to").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "nombre": "Ana",
            "apellido": "Pérez",
            "email": TAKEN_EMAIL,
            "password": "secreto123",
            "confirm_password": "secreto123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["notification"]["message"], "Este correo electrónico ya está registrado");
}

#[tokio::test]
async fn test_oauth_url_and_unknown_provider() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/api/auth/oauth/google", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "google");

    let (status, _) = send(&app, Method::GET, "/api/auth/oauth/myspace", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect_to"], "/login");

    let (status, _) = send(&app, Method::GET, "/api/agenda", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_path_is_json_not_found() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/reportes/anuales", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_action_lifecycle() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/acciones",
        Some(&token),
        Some(json!({
            "tipo": "correctiva",
            "descripcion": "Revisar termo de la unidad ECO-1004",
            "categoria": "Otro",
            "categoria_personalizada": "Cadena de frío",
            "usuario_asignado": "Sofía García",
            "fecha_asignacion": "2023-06-01",
            "resultado_esperado": "Unidad operativa"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["categoria"], "Cadena de frío");
    assert_eq!(body["data"]["fecha_evaluacion"], "2023-06-08");
    let id = body["data"]["id"].as_u64().unwrap();

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/acciones/{}/estado", id),
        Some(&token),
        Some(json!({ "estado": "completada" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/acciones/{}/estado", id),
        Some(&token),
        Some(json!({ "estado": "pendiente" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/acciones/{}/notificar", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["destinatario"], "Sofía García");
}

#[tokio::test]
async fn test_invalid_action_is_validation_error() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/acciones",
        Some(&token),
        Some(json!({
            "tipo": "preventiva",
            "descripcion": "",
            "categoria": "Mantenimiento",
            "usuario_asignado": "Laura Ramírez",
            "resultado_esperado": "Unidad operativa"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_quality_alerts_unknown_facility() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/calidad/alertas?cedis=cedis9",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_operational_drill_down_not_found() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/operativo/drilldown/clientes",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Datos de Viajes por Cliente");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/dashboard/operativo/drilldown/desconocido",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//! Escenarios de extremo a extremo del pipeline filtro -> datos -> KPIs ->
//! paginación, más login y agenda.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Local};
use serde_json::{json, Value};

use flota_dashboard::dto::action_dto::CreateActionRequest;
use flota_dashboard::dto::auth_dto::LoginRequest;
use flota_dashboard::models::action::{ActionType, EventStatus};
use flota_dashboard::models::auth::NotificationKind;
use flota_dashboard::models::quality::{Facility, TimeRange};
use flota_dashboard::presentation::kpi::{average, round1};
use flota_dashboard::presentation::paginate;
use flota_dashboard::repositories::{sample_data, MockFleetRepository};
use flota_dashboard::services::{ActionService, AgendaService, AuthService};

use common::{anchor, login, send, test_app, test_state};

fn first_cells(body: &Value) -> Vec<String> {
    body["data"]["table"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["cells"][0].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_twelve_trips_in_pages_of_five() {
    let trips = sample_data::trips();
    assert_eq!(trips.len(), 12);

    let first: Vec<&str> = paginate(&trips, 5, 1).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(first, vec!["VJ-0001", "VJ-0002", "VJ-0003", "VJ-0004", "VJ-0005"]);

    let last: Vec<&str> = paginate(&trips, 5, 3).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(last, vec!["VJ-0011", "VJ-0012"]);
}

#[tokio::test]
async fn test_trips_endpoint_pages_and_clamps() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/operativo/viajes?page=3&page_size=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first_cells(&body), vec!["VJ-0011", "VJ-0012"]);
    assert_eq!(body["data"]["total_pages"], 3);

    let (_, beyond) = send(
        &app,
        Method::GET,
        "/api/dashboard/operativo/viajes?page=9&page_size=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(beyond["data"]["page"], 3);
    assert_eq!(first_cells(&beyond), vec!["VJ-0011", "VJ-0012"]);
}

#[tokio::test]
async fn test_facility_filter_drives_average_temperature() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/calidad?cedis=cedis2&rango=week&page_size=50",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fleet = MockFleetRepository::new(Some(42))
        .with_anchor(anchor())
        .generate_vehicles(TimeRange::Week);
    let sites: std::collections::HashSet<Facility> = fleet.iter().map(|v| v.cedis).collect();
    assert_eq!(sites.len(), 4);

    let subset: Vec<_> = fleet.iter().filter(|v| v.cedis == Facility::Sur).collect();
    let expected = average(&subset.iter().map(|v| v.avg_temp).collect::<Vec<_>>()).map(round1);

    let rows = body["data"]["incidencias"]["items"].as_array().unwrap();
    assert_eq!(rows.len(), subset.len());
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    let expected_ids: Vec<&str> = subset.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, expected_ids);

    assert_eq!(body["data"]["temperatura_promedio"]["value"].as_f64(), expected);
}

#[tokio::test]
async fn test_invalid_password_does_not_navigate() {
    let state = test_state();
    let outcome = AuthService::new(&state)
        .login(LoginRequest {
            email: "ana@flota.mx".to_string(),
            password: "equivocada".to_string(),
        })
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.notification.kind, NotificationKind::Error);
    assert!(outcome.redirect_to.is_none());
    assert!(outcome.session.is_none());
}

#[tokio::test]
async fn test_past_pending_action_is_overdue_on_agenda() {
    let state = test_state();
    let today = Local::now().date_naive();
    let evaluation = today - Duration::days(10);

    let created = ActionService::new(&state)
        .create(CreateActionRequest {
            tipo: ActionType::Preventiva,
            descripcion: "Auditoría de bitácoras".to_string(),
            categoria: "Administrativo".to_string(),
            categoria_personalizada: None,
            usuario_asignado: "Rodrigo Sánchez".to_string(),
            fecha_asignacion: Some(evaluation - Duration::days(3)),
            resultado_esperado: "Cumplimiento normativo".to_string(),
            resultado_personalizado: None,
            fecha_evaluacion: Some(evaluation),
            notas: None,
        })
        .await
        .unwrap();
    let row = created.data.unwrap();
    assert!(row.vencida);

    let agenda = AgendaService::new(&state);
    let day = agenda
        .day(&evaluation.format("%Y-%m-%d").to_string())
        .await
        .unwrap();
    let event = day
        .events
        .iter()
        .find(|e| e.event.accion_id == row.action.id)
        .unwrap();
    assert_eq!(event.status, EventStatus::Vencido);

    let month = agenda
        .month(Some(&evaluation.format("%Y-%m").to_string()))
        .await
        .unwrap();
    assert!(month
        .days
        .iter()
        .any(|d| d.date == evaluation && d.status == EventStatus::Vencido));
}

#[tokio::test]
async fn test_fleet_table_hidden_columns_over_http() {
    let (app, _) = test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/operativo/flota?hidden=operador_asignado,poliza_seguro&page_size=3",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let headers = &body["data"]["table"]["headers"];
    assert!(!headers.as_array().unwrap().contains(&json!("Operador")));
    assert_eq!(body["data"]["total_pages"], 3);
    assert_eq!(first_cells(&body), vec!["FL001", "FL002", "FL003"]);
}

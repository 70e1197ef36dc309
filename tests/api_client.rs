use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use movilizaciones::api::{ApiClient, ApiError, Session, ValidacionForm};
use movilizaciones::dashboard::{Dashboard, Refresh};
use movilizaciones::error::{AppError, ErrorClass};
use movilizaciones::movilizacion::{Estado, FilterSpec, Transicion};

const TOKEN: &str = "aaa.bbb.ccc";

fn session() -> Session {
    Session::new(TOKEN).unwrap()
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn sample() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "estado": "PENDIENTE",
            "fecha_solicitud": "2025-08-05T10:00:00Z",
            "Usuario": { "nombre": "Ana Torres", "ci": "0911111111" },
            "Animals": [{ "cantidad": 5 }],
            "Aves": []
        },
        {
            "id": 2,
            "estado": "finalizado",
            "fecha_solicitud": "2025-07-20T08:00:00Z",
            "Usuario": { "nombre": "Bruno Paz" },
            "Animals": [],
            "Aves": [{ "total_aves": 100 }]
        }
    ])
}

#[tokio::test]
async fn list_accepts_bare_array_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample()))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server).list(&session()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].estado, Estado::Pendiente);
    assert_eq!(records[1].bird_count(), 100);
}

#[tokio::test]
async fn list_accepts_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": sample() })))
        .mount(&server)
        .await;

    let records = client(&server).list(&session()).await.unwrap();
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn filter_remote_sends_only_active_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/filtrar"))
        .and(query_param("estado", "aprobado"))
        .and(query_param("fechaInicio", "2025-08-01"))
        .and(query_param("fechaFin", "2025-08-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let filters = FilterSpec {
        estado: Some("Aprobado".into()),
        fecha_inicio: chrono::NaiveDate::from_ymd_opt(2025, 8, 1),
        fecha_fin: chrono::NaiveDate::from_ymd_opt(2025, 8, 31),
        granjero: Some("   ".into()),
        ..Default::default()
    };
    let records = client(&server).filter_remote(&session(), &filters).await.unwrap();
    assert!(records.is_empty());

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains("granjero"));
}

#[tokio::test]
async fn unauthorized_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expirado" })))
        .mount(&server)
        .await;

    let err = client(&server).list(&session()).await.unwrap_err();
    assert!(matches!(err, ApiError::Auth { status: 401 }));
}

#[tokio::test]
async fn server_error_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Error al obtener la movilización" })),
        )
        .mount(&server)
        .await;

    match client(&server).get(&session(), 7).await.unwrap_err() {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error al obtener la movilización");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).list(&session()).await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri()), Duration::from_millis(100)).unwrap();
    let err = client.list(&session()).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn get_unwraps_single_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 9, "estado": "Aprobado" } })),
        )
        .mount(&server)
        .await;

    let record = client(&server).get(&session(), 9).await.unwrap();
    assert_eq!(record.id, 9);
    assert_eq!(record.estado, Estado::Aprobado);
}

#[tokio::test]
async fn estado_stats_are_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/estadisticas/estados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "estado": "pendiente", "total": "3" },
                { "estado": "APROBADO", "total": 2 },
                { "estado": "aprobado", "total": 1 }
            ]
        })))
        .mount(&server)
        .await;

    let counts = client(&server).estado_stats(&session()).await.unwrap();
    let aprobado = counts.iter().find(|c| c.estado == Estado::Aprobado).unwrap();
    assert_eq!(aprobado.total, 3);
    assert_eq!(counts.iter().map(|c| c.total).sum::<u64>(), 6);
}

#[tokio::test]
async fn certificate_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/4/certificado"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 fake".to_vec()))
        .mount(&server)
        .await;

    let bytes = client(&server).certificate(&session(), 4).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn by_cedula_without_cedula_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .by_cedula(&session(), "  ", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
}

#[tokio::test]
async fn by_cedula_queries_filter_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/filtrar"))
        .and(query_param("cedula", "0911111111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sample()[0].clone()])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server)
        .by_cedula(&session(), "0911111111", None, None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn approval_posts_validation_form() {
    let server = MockServer::start().await;
    let form = ValidacionForm {
        tiempo_validez: "5 horas".into(),
        hora_inicio: "08:00".into(),
        hora_fin: "13:00".into(),
        firma_tecnico: "LM".into(),
    };
    Mock::given(method("POST"))
        .and(path("/api/movilizaciones/1/validacion"))
        .and(body_json(&form))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let estado = client(&server)
        .request_transition(&session(), 1, &Transicion::Aprobar(form))
        .await
        .unwrap();
    assert_eq!(estado, Estado::Aprobado);
}

#[tokio::test]
async fn rejection_puts_observations() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/movilizaciones/1/rechazar"))
        .and(body_json(json!({ "observaciones_tecnico": "Documentos incompletos" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transicion = Transicion::Rechazar {
        observaciones: "Documentos incompletos".into(),
    };
    let estado = client(&server)
        .request_transition(&session(), 1, &transicion)
        .await
        .unwrap();
    assert_eq!(estado, Estado::Rechazado);
}

#[tokio::test]
async fn failed_transition_keeps_record_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 2, "estado": "aprobado" })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/movilizaciones/2/finalizar"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "fallo" })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(client(&server), session());
    let record = dashboard.source().get(dashboard.session(), 2).await.unwrap();
    let err = dashboard
        .request_transition(&record, &Transicion::Finalizar)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::Status { status: 500, .. })));
    assert_eq!(record.estado, Estado::Aprobado);
}

#[tokio::test]
async fn dashboard_filters_backend_records_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample()))
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(client(&server), session());
    let filters = FilterSpec {
        fecha_inicio: chrono::NaiveDate::from_ymd_opt(2025, 8, 1),
        fecha_fin: chrono::NaiveDate::from_ymd_opt(2025, 8, 31),
        ..Default::default()
    };
    let Refresh::Loaded(view) = dashboard.refresh(&filters, false).await.unwrap() else {
        panic!("expected a loaded view");
    };
    assert_eq!(view.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(view.totals.total_animales, 5);
    assert_eq!(view.totals.total_aves, 0);
}

#[tokio::test]
async fn dashboard_degrades_when_backend_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movilizaciones"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(client(&server), session());
    let Refresh::Loaded(view) = dashboard.refresh(&FilterSpec::default(), false).await.unwrap() else {
        panic!("expected a loaded view");
    };
    assert!(view.records.is_empty());
    assert!(view.notice.unwrap().contains("503"));
}

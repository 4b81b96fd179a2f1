mod common;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use callhub_backend::{
    common::error::AppError,
    models::{
        auth::LoginUserPayload,
        call_report::{CallReportFilters, CallReportState, IntakePayload},
    },
    routes,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

async fn seed_report(state: &callhub_backend::config::AppState, company_id: i64, phone: &str, name: &str, text: &str) -> Result<i64> {
    let payload: IntakePayload = common::from_json(json!({
        "company_id": company_id,
        "profile": { "phone": phone, "name": name },
        "text": text,
        "json": {},
        "state": "confirmed"
    }));
    Ok(state.call_report_service.intake(&payload).await?.id)
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn company_admin_never_sees_other_companies(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let ours = common::create_company(&pool, "Barbearia Centro").await;
    let theirs = common::create_company(&pool, "Salão Norte").await;

    let own_report = seed_report(&state, ours, "5511000000001", "Ana", "Corte").await?;
    let foreign_report = seed_report(&state, theirs, "5511000000002", "Bia", "Escova").await?;

    let admin = common::admin_of(ours);
    let page = state
        .call_report_service
        .list_for_company(&admin, ours, &CallReportFilters::default())
        .await?;
    let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![own_report]);

    // Rota de outra empresa, relatório de outra empresa e listagem global
    let err = state
        .call_report_service
        .list_for_company(&admin, theirs, &CallReportFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state.call_report_service.show(&admin, foreign_report).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .call_report_service
        .list_all(&admin, &CallReportFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn super_admin_lists_everything_or_the_route_company(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let ours = common::create_company(&pool, "Barbearia Centro").await;
    let theirs = common::create_company(&pool, "Salão Norte").await;
    seed_report(&state, ours, "5511000000001", "Ana", "Corte").await?;
    seed_report(&state, theirs, "5511000000002", "Bia", "Escova").await?;

    let root = common::super_admin();
    let all = state.call_report_service.list_all(&root, &CallReportFilters::default()).await?;
    assert_eq!(all.total, 2);

    let only_theirs = state
        .call_report_service
        .list_for_company(&root, theirs, &CallReportFilters::default())
        .await?;
    assert_eq!(only_theirs.total, 1);
    assert_eq!(only_theirs.items[0].company.as_ref().map(|c| c.id), Some(theirs));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn missing_company_is_not_found_even_for_super_admin(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());

    let err = state
        .call_report_service
        .list_for_company(&common::super_admin(), 404, &CallReportFilters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn search_matches_summary_or_customer_fields_ignoring_case(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;
    let by_summary = seed_report(&state, company, "5511000000001", "Ana", "Quer HIDRATAÇÃO").await?;
    let by_name = seed_report(&state, company, "5511000000002", "Hidra Souza", "Corte").await?;
    seed_report(&state, company, "5511000000003", "Bia", "Escova").await?;

    let filters = CallReportFilters {
        search: Some("hidra".into()),
        ..Default::default()
    };
    let page = state.call_report_service.list_all(&common::super_admin(), &filters).await?;
    let mut ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![by_summary, by_name]);

    let filters = CallReportFilters {
        search: Some("000003".into()),
        ..Default::default()
    };
    let page = state.call_report_service.list_all(&common::super_admin(), &filters).await?;
    assert_eq!(page.total, 1);

    let by_email = state
        .call_report_service
        .intake(&common::from_json(json!({
            "company_id": company,
            "profile": { "phone": "5511000000004", "name": "Zé", "email": "Zed@Mail.com" },
            "text": "Barba",
            "json": {},
            "state": "confirmed"
        })))
        .await?
        .id;
    let filters = CallReportFilters {
        search: Some("zed@m".into()),
        ..Default::default()
    };
    let page = state.call_report_service.list_all(&common::super_admin(), &filters).await?;
    let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![by_email]);
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn state_and_date_filters_narrow_the_listing(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;

    for (phone, call_state, timestamp) in [
        ("5511000000001", "confirmed", "2025-01-10"),
        ("5511000000002", "failed", "2025-01-11 09:00:00"),
        ("5511000000003", "failed", "2025-02-01T23:59:59Z"),
    ] {
        let payload: IntakePayload = common::from_json(json!({
            "company_id": company,
            "profile": { "phone": phone, "name": "Cliente" },
            "text": "Resumo",
            "json": {},
            "state": call_state,
            "timestamp": timestamp
        }));
        state.call_report_service.intake(&payload).await?;
    }

    let filters = CallReportFilters {
        state: Some(CallReportState::Failed),
        date_from: chrono::NaiveDate::from_ymd_opt(2025, 1, 11),
        date_to: chrono::NaiveDate::from_ymd_opt(2025, 1, 31),
        ..Default::default()
    };
    let page = state.call_report_service.list_all(&common::super_admin(), &filters).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].state, CallReportState::Failed);
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reports_are_immutable_even_for_super_admin(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;
    let report = seed_report(&state, company, "5511000000001", "Ana", "Corte").await?;

    for caller in [common::super_admin(), common::admin_of(company)] {
        let err = state.call_report_service.update(&caller, report).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = state.call_report_service.delete(&caller, report).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let err = state.call_report_service.delete(&common::super_admin(), 404).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(common::count(&pool, "call_reports").await, 1);
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn changing_a_report_over_http_is_forbidden_with_a_valid_session(pool: PgPool) -> Result<()> {
    let state = common::state(pool.clone());
    let company = common::create_company(&pool, "Barbearia Centro").await;
    let report = seed_report(&state, company, "5511000000001", "Ana", "Corte").await?;

    state
        .auth_service
        .bootstrap_super_admin("Root", "root@callhub.dev", "senha-forte-123")
        .await?;
    let login: LoginUserPayload = common::from_json(json!({ "email": "root@callhub.dev", "password": "senha-forte-123" }));
    let (token, _) = state.auth_service.login_user(&login).await?;

    let app = routes::app(state);
    let uri = format!("/api/v1/call-reports/{}", report);

    for method in ["PUT", "PATCH", "DELETE"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(&uri)
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "state": "failed" }).to_string()))?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", method);

        let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
        assert_eq!(body["error"], "Relatórios de ligação são imutáveis.");

        let anonymous = app
            .clone()
            .oneshot(Request::builder().method(method).uri(&uri).body(Body::empty())?)
            .await?;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED, "{}", method);
    }

    let still_confirmed: String = sqlx::query_scalar("SELECT state::text FROM call_reports WHERE id = $1")
        .bind(report)
        .fetch_one(&pool)
        .await?;
    assert_eq!(still_confirmed, "confirmed");
    assert_eq!(common::count(&pool, "call_reports").await, 1);
    Ok(())
}

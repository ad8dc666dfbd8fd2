mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::fixtures::{ANA, GESTOR, ticket_json, user};
use helpdesk::ai::AiFeedback;
use helpdesk::error::GENERIC_FAILURE_MESSAGE;
use helpdesk::user::UserForm;
use helpdesk::{
    AccessLevel, HelpdeskApi, HelpdeskError, HttpApi, TicketPriority, TicketStatus, TicketView,
};

fn client(server: &MockServer, email: &str) -> HttpApi {
    HttpApi::new(&format!("{}/api", server.uri()), email, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_every_request_carries_user_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chamados/15"))
        .and(header("x-user-email", ANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_json(15, "Aberto", ANA)))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = client(&server, ANA).get_ticket(15).await.unwrap();

    assert_eq!(ticket.id, 15);
    assert_eq!(ticket.status, TicketStatus::Aberto);
    assert_eq!(ticket.priority, TicketPriority::Alta);
    assert_eq!(ticket.opened_by_user.email, ANA);
}

#[tokio::test]
async fn test_bare_list_payload() {
    let server = MockServer::start().await;
    let body = json!([
        ticket_json(1, "Aberto", ANA)["data"].clone(),
        ticket_json(2, "Escalado", ANA)["data"].clone(),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/chamados/escalados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let tickets = client(&server, GESTOR)
        .list_tickets(TicketView::Escalated)
        .await
        .unwrap();

    let ids: Vec<u64> = tickets.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_reject_sends_reason_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/123/rejeitar"))
        .and(header("x-user-email", GESTOR))
        .and(body_json(json!({ "motivo": "Fora do escopo do suporte" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, GESTOR)
        .reject_ticket(123, "Fora do escopo do suporte")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_feedback_body_uses_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/8/feedback-ia"))
        .and(body_json(json!({ "feedback": "DEU_CERTO" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, ANA)
        .submit_ai_feedback(8, AiFeedback::DeuCerto)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deactivation_is_a_delete_with_reason() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/31"))
        .and(body_json(json!({ "motivo": "Desligado da empresa" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, GESTOR)
        .deactivate_user(31, "Desligado da empresa")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_message_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/5/aprovar"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "Chamado já foi aprovado por outro gestor" })),
        )
        .mount(&server)
        .await;

    let err = client(&server, GESTOR).approve_ticket(5).await.unwrap_err();

    match &err {
        HelpdeskError::Request { status, message } => {
            assert_eq!(*status, 409);
            assert_eq!(message, "Chamado já foi aprovado por outro gestor");
        }
        other => panic!("expected a request error, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Chamado já foi aprovado por outro gestor");
}

#[tokio::test]
async fn test_message_wins_over_error_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/6/aprovar"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Erro ao aprovar chamado",
            "error": "connection reset"
        })))
        .mount(&server)
        .await;

    let err = client(&server, GESTOR).approve_ticket(6).await.unwrap_err();
    assert_eq!(err.user_message(), "Erro ao aprovar chamado");
}

#[tokio::test]
async fn test_escalation_posts_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/12/escalar"))
        .and(header("x-user-email", ANA))
        .and(body_json(json!({ "motivo": "Sem acesso" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, ANA)
        .escalate_ticket(12, "Sem acesso")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resolve_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/13/resolver"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chamados/14/resolver-escalado"))
        .and(header("x-user-email", GESTOR))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, GESTOR);
    api.resolve_ticket(13).await.unwrap();
    api.resolve_escalated(14).await.unwrap();

    let err = api.resolve_escalated(99).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::TicketNotFound(99)));
}

#[tokio::test]
async fn test_restore_posts_backup_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/restore/4"))
        .and(header("x-user-email", GESTOR))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, GESTOR).restore_user(4).await.unwrap();
}

#[tokio::test]
async fn test_update_user_is_a_put_with_form() {
    let server = MockServer::start().await;
    let updated = user(10, "Ana Souza", ANA, AccessLevel::USUARIO);
    let form = UserForm::from_user(&updated);
    Mock::given(method("PUT"))
        .and(path("/api/users/10"))
        .and(body_json(json!({
            "matricula": "M010",
            "name": "Ana Souza",
            "email": ANA,
            "department": "TI",
            "profileId": 1,
            "accessLevel": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": updated })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server, ANA).update_user(10, &form).await.unwrap();
    assert_eq!(user.name, "Ana Souza");
    assert_eq!(user.access_level, AccessLevel::USUARIO);
}

#[tokio::test]
async fn test_error_without_message_uses_generic_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Internal</html>"))
        .mount(&server)
        .await;

    let err = client(&server, GESTOR).list_users().await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_missing_ticket_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chamados/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Não encontrado" })))
        .mount(&server)
        .await;

    let err = client(&server, ANA).get_ticket(77).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::TicketNotFound(77)));
}

#[tokio::test]
async fn test_missing_statistics_endpoint_is_a_plain_404() {
    let server = MockServer::start().await;

    let err = client(&server, GESTOR).statistics().await.unwrap_err();
    assert!(matches!(err, HelpdeskError::Request { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    drop(server);

    let api = HttpApi::new(&base, ANA, Duration::from_secs(2)).unwrap();
    let err = api.list_tickets(TicketView::Own).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::Network(_)), "got {err:?}");
}

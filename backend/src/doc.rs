//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! domain schemas they exchange and the session cookie security scheme. The
//! document backs Swagger UI in debug builds and the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    ApprovalReceipt, ConfirmedLogs, LeaderboardEntry, NewAccountRequest, PendingStudentSummary,
    StudentAccolades, SubmitHoursRequest,
};
use crate::domain::{
    Accolade, AccoladeKind, Account, ConfirmationRequest, Error, ErrorCode, Principal,
    RequestStatus, Role, ServiceLogEntry,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::requests::RejectRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Volunteer ledger API",
        description = "Submit, review and rank volunteer service hours."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_principal,
        crate::inbound::http::accounts::create_account,
        crate::inbound::http::requests::submit_request,
        crate::inbound::http::requests::list_pending,
        crate::inbound::http::requests::approve_request,
        crate::inbound::http::requests::reject_request,
        crate::inbound::http::students::student_history,
        crate::inbound::http::students::confirmed_logs,
        crate::inbound::http::students::student_accolades,
        crate::inbound::http::leaderboard::leaderboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Principal,
        Role,
        Account,
        LoginRequest,
        NewAccountRequest,
        SubmitHoursRequest,
        RejectRequest,
        ConfirmationRequest,
        RequestStatus,
        ServiceLogEntry,
        ApprovalReceipt,
        ConfirmedLogs,
        PendingStudentSummary,
        LeaderboardEntry,
        Accolade,
        AccoladeKind,
        StudentAccolades,
        ProbeStatus,
    )),
    tags(
        (name = "auth", description = "Login and session management"),
        (name = "accounts", description = "Account administration"),
        (name = "requests", description = "Submitting and reviewing hours"),
        (name = "students", description = "Per-student ledger views"),
        (name = "leaderboard", description = "Public ranking by hours"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("ApprovalReceipt", "newTotalHours")]
    #[case("LeaderboardEntry", "accolades")]
    fn schemas_expose_camel_case_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas
            .get(schema)
            .unwrap_or_else(|| panic!("{schema} schema registered"));
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/requests/{id}/approve")]
    #[case("/api/v1/leaderboard")]
    #[case("/health/ready")]
    fn documents_routes(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}

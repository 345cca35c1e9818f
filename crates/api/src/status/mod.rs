use crate::error::AgendaError;
use actix_web::{web, HttpResponse};
use agenda_api_structs::get_service_health::*;
use agenda_infra::AgendaContext;
use tracing::error;

async fn status(ctx: web::Data<AgendaContext>) -> Result<HttpResponse, AgendaError> {
    let database_latency_millis = ctx
        .repos
        .health
        .check_database_connection()
        .await
        .map_err(|e| {
            error!("Database health check failed: {:?}", e);
            AgendaError::ServiceUnavailable("Database is not reachable".into())
        })?;

    Ok(HttpResponse::Ok().json(APIResponse {
        message: "Agenda is up and running".into(),
        database_latency_millis,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}

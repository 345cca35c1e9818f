use agenda_api::Application;
use agenda_infra::AgendaContext;

pub struct TestApp {
    pub address: String,
    pub ctx: AgendaContext,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with_context(AgendaContext::create_inmemory()).await
}

pub async fn spawn_app_with_context(mut ctx: AgendaContext) -> TestApp {
    ctx.config.port = 0; // Random port
    ctx.config.worker_poll_interval_millis = 10;

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        address,
        ctx,
        client: reqwest::Client::new(),
    }
}

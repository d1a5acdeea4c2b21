use actix_web::*;
use anyhow::Context as _;
use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl HttpServerConfig {
    pub async fn run_server<F>(&self, scopes: F) -> anyhow::Result<()>
    where
        F: Fn() -> Vec<Scope> + Send + Clone + 'static,
    {
        let http_server = HttpServer::new(move || {
            let mut app = App::new().wrap(tracing_actix_web::TracingLogger::default());

            for scope in scopes() {
                app = app.service(scope);
            }

            app
        })
        .workers(1)
        .disable_signals()
        .bind((self.host.as_str(), self.port))?;

        http_server
            .run()
            .await
            .with_context(|| format!("Error running HTTP server on {}:{}", self.host, self.port))
    }
}

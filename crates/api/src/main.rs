use axum::Router;
use clap::Parser;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use api::routes;
use api::state::AppState;
use common::{init_logging, settings::Settings};
use repos::Repo;
use rollout::Resolver;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[arg(short = 'C', long, default_value = "config")]
    config_dir: String,
}

struct FoodlineApp {
    settings: Arc<Settings>,
}

impl FoodlineApp {
    fn new(config_dir: &str) -> Self {
        Self {
            settings: Arc::new(
                Settings::with_config_dir(config_dir).expect("Failed to load settings"),
            ),
        }
    }

    async fn run(&self) {
        init_logging(&self.settings.logger.level);

        info!("Starting server on port {}", self.settings.server.port);

        let pool = self.init_db().await.expect("Failed to connect to database");
        let repo = Repo::new(pool);

        let state = AppState {
            repo,
            settings: self.settings.clone(),
            resolver: Resolver::default(),
        };

        let base_path = self.settings.server.base_path.clone();
        let routes_all = Router::new()
            .nest(&base_path, routes::routes(state.clone()).await)
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.settings.server.port));
        axum_server::bind(addr)
            .serve(routes_all.into_make_service())
            .await
            .expect("Server failed");
    }

    async fn init_db(&self) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&self.settings.database.uri)
            .await?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        Ok(pool)
    }
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let app = FoodlineApp::new(&args.config_dir);
    app.run().await;
}

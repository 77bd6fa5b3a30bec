use inventory_api::{app, state::AppState};

const DEFAULT_LOG_FILTER: &str = "inventory_api=debug,axum=info,tower_http=info";

fn init_tracing() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let json_logs = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));

    let fmt = tracing_subscriber::fmt().with_env_filter(env_filter);
    if json_logs {
        fmt.with_target(false).json().init();
    } else {
        fmt.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let (state, db) = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migration failed; continuing with existing schema");
    }

    let server = state.config.server.clone();
    app::serve(app::build_app(state), &server).await
}

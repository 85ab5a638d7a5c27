use access_journal_backend::{
    config::{get_config, init_config, init_tracing},
    database::{
        bootstrap::{ensure_admin, run_migrations},
        pool::create_pool,
    },
    routes::app_router,
    utils::time::now_naive,
    AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    ensure_admin(&pool, &config.admin_initial_password).await?;

    let app_state = AppState::new(pool, config);

    {
        let state = app_state.clone();
        let interval = Duration::from_secs(config.expiry_sweep_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Err(e) = state
                    .external_connection_service
                    .sweep_expired(now_naive())
                    .await
                {
                    tracing::error!(error = ?e, "expired connection sweep failed");
                }
            }
        });
    }

    let app = app_router(app_state, config.login_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

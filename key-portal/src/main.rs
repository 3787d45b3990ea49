use dotenvy::dotenv;
use key_portal::config::get_configuration;
use key_portal::models::RequestFilter;
use key_portal::services::Navigation;
use key_portal::Portal;
use portal_core::observability::init_tracing;
use secrecy::ExposeSecret;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &configuration.telemetry.service_name,
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    let portal = Portal::new(&configuration.api);

    let mut navigation = portal.subscribe();
    tokio::spawn(async move {
        while let Ok(signal) = navigation.recv().await {
            match signal {
                Navigation::Login => warn!("Admin session ended, login required"),
            }
        }
    });

    info!(base_url = %configuration.api.base_url, "Checking key portal backend");

    let (healthy, catalog) = tokio::join!(
        portal.public().check_health(),
        portal.public().load_catalog()
    );

    info!(
        healthy,
        models = catalog.all.models.len(),
        featured = catalog.featured.models.len(),
        "Backend status"
    );
    if let Some(e) = &catalog.all.error {
        warn!(error = %e, status = e.status(), "Model list unavailable");
    }
    if let Some(e) = &catalog.featured.error {
        warn!(error = %e, status = e.status(), "Featured model list unavailable");
    }

    let admin = &configuration.admin;
    if let (Some(username), Some(password)) = (&admin.username, &admin.password) {
        if !portal.session().login(username, password.expose_secret()).await {
            return Err(anyhow::anyhow!("Admin login failed for '{}'", username));
        }

        let pending = portal
            .admin()
            .list_requests(RequestFilter::Pending)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list pending requests: {}", e))?;

        info!(count = pending.len(), "Pending key requests");
        for request in &pending {
            info!(
                request_id = %request.request_id,
                email = %request.email,
                model = %request.model,
                created_at = %request.created_at,
                "Pending request"
            );
        }

        portal.session().logout();
    }

    Ok(())
}

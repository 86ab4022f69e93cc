//! Development runner: boots the stack against the in-memory store and prints
//! the dashboard for a demo catalog.

use std::sync::Arc;

use almox_app::{AppContext, bootstrap};
use almox_auth::InMemoryIdentityProvider;
use almox_infra::InMemoryDocumentStore;
use almox_inventory::{Categoria, NewExit, NewItem};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = bootstrap()?;

    let email = std::env::var("ALMOX_DEV_EMAIL").unwrap_or_else(|_| {
        tracing::warn!("ALMOX_DEV_EMAIL not set; using dev default");
        "admin@almoxarifado.local".to_string()
    });
    let password = std::env::var("ALMOX_DEV_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let identity = InMemoryIdentityProvider::new().with_account(&email, &password, true);
    let ctx = AppContext::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(identity),
        settings,
    );

    let session = ctx.login(&email, &password).await?;
    let item = session
        .create_item(NewItem {
            nome: "Papel A4".to_string(),
            codigo: Some("7891234567890".to_string()),
            categoria: Categoria::Expediente,
            unidade: "CX".to_string(),
            quantidade: Some(8.0),
            ..NewItem::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    session
        .record_exit(NewExit {
            item_id: Some(item.id.clone()),
            quantidade: Some(4.0),
            setor_destino: Some("Secretaria de Educação".to_string()),
            ..NewExit::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let dashboard = session
        .dashboard()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    tracing::info!(
        items = dashboard.summary.total_items,
        low_stock = dashboard.summary.low_stock,
        expiring = dashboard.summary.expiring,
        entries_today = dashboard.entries_today,
        exits_today = dashboard.exits_today,
        "dashboard"
    );

    session.logout().await?;
    Ok(())
}

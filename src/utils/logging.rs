use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installe le subscriber global (filtre via RUST_LOG, `info` par défaut).
/// Les logs de la crate `log` (actix Logger) sont redirigés vers tracing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    // un subscriber déjà installé (tests) reste en place
    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        tracing::debug!(error = %err, "Tracing subscriber already set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_keeps_the_first_subscriber() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }
}

use crate::apis::eventbrite::EventbriteApi;
use crate::apis::proxy::ProxyApi;
use crate::apis::seatgeek::SeatGeekApi;
use crate::apis::ticketmaster::TicketmasterApi;
use crate::config::Config;
use crate::types::{EventProvider, Source};
use std::sync::Arc;

/// Build the adapter for one catalog
pub fn create_provider(
    source: Source,
    config: &Config,
    client: reqwest::Client,
) -> Arc<dyn EventProvider> {
    let settings = &config.providers;
    match source {
        Source::Ticketmaster => Arc::new(TicketmasterApi::new(client, settings, config.page_size)),
        Source::Eventbrite => Arc::new(EventbriteApi::new(client, settings, config.page_size)),
        Source::Seatgeek => Arc::new(SeatGeekApi::new(client, settings, config.page_size)),
        Source::Konzertkasse => Arc::new(ProxyApi::new(
            client,
            Source::Konzertkasse,
            settings.konzertkasse_proxy_url.clone(),
        )),
        Source::Reservix => Arc::new(ProxyApi::new(
            client,
            Source::Reservix,
            settings.reservix_proxy_url.clone(),
        )),
    }
}

/// Every known adapter in default enumeration order. Unconfigured adapters
/// are included; they return nothing without touching the network.
pub fn create_all(config: &Config, client: reqwest::Client) -> Vec<Arc<dyn EventProvider>> {
    Source::ALL
        .iter()
        .map(|source| create_provider(*source, config, client.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_all_sources_in_order() {
        let providers = create_all(&Config::default(), reqwest::Client::new());
        let order: Vec<Source> = providers.iter().map(|p| p.source()).collect();
        assert_eq!(order, Source::ALL.to_vec());
        assert!(providers.iter().all(|p| !p.is_configured()));
    }
}

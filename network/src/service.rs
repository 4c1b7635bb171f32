use std::sync::Arc;

use serde_json::json;

use crate::config::ServiceConfig;
use crate::endpoint::{Endpoint, HttpHeaders, HttpMethod, HttpTask, Parameters};

pub mod parameters {
    pub const OFFSET: &str = "offset";
    pub const LIMIT: &str = "limit";
}

const ACCEPT_V5: &str = "application/vnd.twitchtv.v5+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopGamesRoute {
    TopGames { limit: u32, offset: u32 },
}

/// A route of the top games service bound to the service configuration.
#[derive(Debug, Clone)]
pub struct TopGamesService {
    config: Arc<ServiceConfig>,
    route: TopGamesRoute,
}

impl TopGamesService {
    pub fn new(config: Arc<ServiceConfig>, route: TopGamesRoute) -> Self {
        Self { config, route }
    }

    pub fn top_games(config: Arc<ServiceConfig>, limit: u32, offset: u32) -> Self {
        Self::new(config, TopGamesRoute::TopGames { limit, offset })
    }

    pub fn route(&self) -> TopGamesRoute {
        self.route
    }
}

impl Endpoint for TopGamesService {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn path(&self) -> &str {
        match self.route {
            TopGamesRoute::TopGames { .. } => "games/top",
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn headers(&self) -> Option<HttpHeaders> {
        let mut headers = HttpHeaders::from([("Accept".to_string(), ACCEPT_V5.to_string())]);
        if let Some(client_id) = &self.config.client_id {
            headers.insert("Client-ID".to_string(), client_id.clone());
        }
        Some(headers)
    }

    fn task(&self) -> HttpTask {
        match self.route {
            TopGamesRoute::TopGames { limit, offset } => {
                let mut query = Parameters::new();
                query.insert(parameters::LIMIT.to_string(), json!(limit));
                query.insert(parameters::OFFSET.to_string(), json!(offset));
                HttpTask::Parametrized {
                    body: None,
                    query: Some(query),
                }
            }
        }
    }
}

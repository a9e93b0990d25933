//! Server configuration

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server
    pub bind_address: SocketAddr,
    /// Grid width (narrow-row column count)
    pub map_width: u32,
    /// Grid height (row count)
    pub map_height: u32,
    /// Hex circumradius for tile-center geometry
    pub hex_radius: f64,
    /// Terrain seed; None derives one from the system clock
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7777".parse().unwrap(),
            map_width: 24,
            map_height: 18,
            hex_radius: 1.0,
            seed: None,
        }
    }
}

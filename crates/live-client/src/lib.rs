pub mod client_controller;
pub mod connection;
pub mod net_client;
pub mod transport;

#[cfg(feature = "native")]
pub mod ws_transport;

#[cfg(test)]
mod mock_transport;

use anyhow::Context;
use iss_tracker_sim::SimState;
use log::info;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    result::Result as StdResult,
};
use tokio::net::TcpListener;

type Result<T = (), E = anyhow::Error> = StdResult<T, E>;

#[tokio::main]
async fn main() -> Result {
    colog::init();

    let args = std::env::args().collect::<Vec<_>>();
    let socket_addr = args
        .get(1)
        .map(|raw_binding| raw_binding.parse::<SocketAddr>())
        .transpose()
        .context("Invalid socket addr passed")?
        .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3537));

    let listener = TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("Failed to bind {socket_addr}"))?;

    info!(
        "Starting ISS endpoint simulator {} on http://{socket_addr}/iss-now.json",
        env!("CARGO_PKG_VERSION")
    );

    iss_tracker_sim::serve(listener, SimState::default()).await
}

use std::net::SocketAddr;

use listenfd::ListenFd;
use tokio::net::TcpListener;

/// Binds the gateway's listening socket (§4.7 "graceful restart"), first
/// checking whether one was handed down by a parent process (the common
/// `LISTEN_FDS`-style convention: the file descriptor is inherited across
/// `exec`, and its index is communicated through the environment). If none
/// is present this simply binds fresh.
///
/// `listenfd`'s own fd-to-socket conversion is where the `unsafe` this
/// requires lives; this crate forbids `unsafe_code`, so the inheritance
/// path is entirely delegated to it rather than reimplemented here.
///
/// A supervising process manager drives the actual handoff (start the new
/// process with the inherited fd set, signal the old one to stop
/// accepting and drain); this function only knows how to pick up a socket
/// that is already there.
pub async fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let mut listenfd = ListenFd::from_env();
    if let Some(listener) = listenfd.take_tcp_listener(0)? {
        listener.set_nonblocking(true)?;
        return TcpListener::from_std(listener);
    }
    TcpListener::bind(addr).await
}

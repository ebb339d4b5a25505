use axum::Router;
use warden_pipeline::{build_chain, BoxedChain, PipelineState};

/// Fixed path prefix under which every admin handler lives (§6).
pub const ADMIN_PREFIX: &str = "/warden";

/// An immutable snapshot of "what serves what": one boxed chain per API
/// mount point, plus the admin router. Built fresh on every reload (§4.7)
/// and swapped in as a unit — never mutated in place.
pub struct RoutingTable {
    /// `(mount path, chain)`, sorted longest-prefix-first so the first
    /// match in `mounts()` is always the most specific one.
    mounts: Vec<(String, BoxedChain)>,
    admin: Router,
}

impl RoutingTable {
    #[must_use]
    pub fn new(mut mounts: Vec<(String, BoxedChain)>, admin: Router) -> Self {
        mounts.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Self { mounts, admin }
    }

    /// The chain whose mount path is the longest prefix of `path`, if any.
    #[must_use]
    pub fn match_mount(&self, path: &str) -> Option<&BoxedChain> {
        self.mounts
            .iter()
            .find(|(mount, _)| path.starts_with(mount.as_str()))
            .map(|(_, chain)| chain)
    }

    #[must_use]
    pub fn admin(&self) -> &Router {
        &self.admin
    }
}

/// Compose one [`RoutingTable`] from a freshly-compiled set of per-API
/// pipeline states, mounting each at its own `proxy.listen_path`, plus the
/// already-guarded admin router.
#[must_use]
pub fn build_table(states: Vec<PipelineState>, admin: Router) -> RoutingTable {
    let mounts = states
        .into_iter()
        .map(|state| {
            let mount = state.spec.definition.proxy.listen_path.clone();
            (mount, build_chain(state))
        })
        .collect();
    RoutingTable::new(mounts, admin)
}

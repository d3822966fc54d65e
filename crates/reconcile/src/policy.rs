//! Policy evaluation - desired flag projection for a host

use crate::host::HostRecord;
use crate::types::{PolicyFlags, PolicyOptions};

/// Compute the desired flags for `host` under `opts`
///
/// SSL, HTTP/2 and HSTS are always forced on. The optional flags are only
/// ever turned on: when their option is off the host keeps its current value.
/// Exploit blocking is never forced on a host whose primary domain matches an
/// exemption.
pub fn evaluate(host: &HostRecord, opts: &PolicyOptions) -> PolicyFlags {
    let current = PolicyFlags::from_host(host);

    let force_block = opts.block_exploits && !opts.is_exempt(host.primary_domain());
    if opts.block_exploits && !force_block {
        log::debug!(
            "{}: exempt from block_exploits, keeping {}",
            host.primary_domain(),
            current.block_exploits
        );
    }

    PolicyFlags {
        ssl_forced: true,
        http2_support: true,
        hsts_enabled: true,
        hsts_subdomains: opts.enable_hsts_subdomains,
        block_exploits: force_block || current.block_exploits,
        caching_enabled: opts.enable_caching || current.caching_enabled,
        allow_websocket_upgrade: opts.enable_websockets || current.allow_websocket_upgrade,
    }
}

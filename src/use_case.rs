//! Trust domains a serialization call can belong to.

use std::fmt;

/// Identifies the purpose, and therefore the trust boundary, of a
/// serialization operation.
///
/// The four wire use-cases are resolved to schemes by a
/// [`SerializationFactory`](crate::SerializationFactory). [`UseCase::Checkpoint`]
/// tags contexts that belong to the checkpoint path; the standard factory has
/// no scheme for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UseCase {
    /// Messages exchanged between peers on the network.
    P2p,
    /// Payloads decoded and produced by an RPC server.
    RpcServer,
    /// Payloads decoded and produced by an RPC client.
    RpcClient,
    /// Entities written to durable storage.
    Storage,
    /// Snapshots of suspended computations.
    Checkpoint,
}

impl UseCase {
    /// The four use-cases served by wire serialization.
    pub const WIRE: [UseCase; 4] = [
        UseCase::P2p,
        UseCase::RpcServer,
        UseCase::RpcClient,
        UseCase::Storage,
    ];

    /// Stable lowercase label, used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UseCase::P2p => "p2p",
            UseCase::RpcServer => "rpc_server",
            UseCase::RpcClient => "rpc_client",
            UseCase::Storage => "storage",
            UseCase::Checkpoint => "checkpoint",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

//! Canonical contexts and factory shared by the whole process.

use std::sync::OnceLock;

use crate::{
    allowlist::TypeAllowlist,
    context::SerializationContext,
    factory::SerializationFactory,
    use_case::UseCase,
};

/// Process-wide table of the four standard wire contexts and the standard
/// factory.
///
/// The table is built in full on first access and never changes afterwards;
/// every accessor returns the same instance on every call.
///
/// ```
/// use ledgerwire::{SerializationDefaults, UseCase};
///
/// let defaults = SerializationDefaults::instance();
/// assert_eq!(defaults.storage_context().use_case(), UseCase::Storage);
/// assert_eq!(defaults.p2p_context(), SerializationDefaults::instance().p2p_context());
/// ```
#[derive(Debug)]
pub struct SerializationDefaults {
    p2p_context: SerializationContext,
    rpc_server_context: SerializationContext,
    rpc_client_context: SerializationContext,
    storage_context: SerializationContext,
    serialization_factory: SerializationFactory,
}

impl SerializationDefaults {
    /// The process-wide table.
    #[must_use]
    pub fn instance() -> &'static SerializationDefaults {
        static INSTANCE: OnceLock<SerializationDefaults> = OnceLock::new();
        INSTANCE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let context = |use_case| SerializationContext::new(use_case, TypeAllowlist::builtin());
        let p2p_context = context(UseCase::P2p);
        let serialization_factory = SerializationFactory::builder(p2p_context.clone())
            .with_standard_schemes()
            .build();
        Self {
            p2p_context,
            rpc_server_context: context(UseCase::RpcServer),
            rpc_client_context: context(UseCase::RpcClient),
            storage_context: context(UseCase::Storage),
            serialization_factory,
        }
    }

    /// Context for peer-to-peer messages.
    #[must_use]
    pub fn p2p_context(&self) -> &SerializationContext { &self.p2p_context }

    /// Context used by RPC servers.
    #[must_use]
    pub fn rpc_server_context(&self) -> &SerializationContext { &self.rpc_server_context }

    /// Context used by RPC clients.
    #[must_use]
    pub fn rpc_client_context(&self) -> &SerializationContext { &self.rpc_client_context }

    /// Context for durable storage.
    #[must_use]
    pub fn storage_context(&self) -> &SerializationContext { &self.storage_context }

    /// The canonical factory.
    #[must_use]
    pub fn serialization_factory(&self) -> &SerializationFactory { &self.serialization_factory }

    /// Canonical context for `use_case`, if it is a wire use-case.
    #[must_use]
    pub fn context_for(&self, use_case: UseCase) -> Option<&SerializationContext> {
        match use_case {
            UseCase::P2p => Some(&self.p2p_context),
            UseCase::RpcServer => Some(&self.rpc_server_context),
            UseCase::RpcClient => Some(&self.rpc_client_context),
            UseCase::Storage => Some(&self.storage_context),
            UseCase::Checkpoint => None,
        }
    }
}

pub mod collect;
pub mod identity;
pub mod page;

pub use collect::ContextCollector;
pub use identity::{
    IdentityConfig, IdentityError, IdentityManager, IdentityProvider, IdentityStore, MemoryStore,
    StaticIdentity,
};
pub use page::{PageEnvironment, PageState, SimulatedPage};

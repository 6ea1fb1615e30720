//! Provider framework for kconnect.
//!
//! This crate holds the plugin registry, the discovery and identity provider
//! contracts, the builtin EKS, Azure AD and AWS IAM plugins, and the
//! orchestrator that selects providers by name and runs them.
//!
//! Providers receive their collaborators (an [`HttpClient`] and a
//! [`CommandRunner`]) at construction time, so tests can substitute fakes.

pub mod discovery;
pub mod error;
pub mod exec;
pub mod http;
pub mod identity;
pub mod orchestrator;
pub mod plugins;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use discovery::{ClusterConfig, DiscoveryProvider, GetClusterInput, GetClusterOutput};
pub use error::{BoxError, ProviderError, Result};
pub use exec::{
    CommandError, CommandInvocation, CommandOutput, CommandRunner, ProcessRunner, StdioMode,
};
pub use http::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
    ReqwestHttpClientBuilder,
};
pub use identity::{
    AuthenticateInput, AuthenticateOutput, Credentials, Identity, IdentityBuilder,
    IdentityProvider, IdentitySummary,
};
pub use orchestrator::{ConnectOutput, ConnectRequest, Orchestrator};
pub use registry::{
    ConfigItemsFn, DiscoveryFactory, DiscoveryRegistration, IdentityFactory, IdentityRegistration,
    PluginCreationInput, PluginKind, PluginRegistration, PluginRegistry,
};

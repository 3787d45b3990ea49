pub mod admin_client;
pub mod executor;
pub mod public_client;

pub use admin_client::AdminClient;
pub use executor::{Navigation, Navigator, RequestDescriptor, RequestExecutor};
pub use public_client::{ModelCatalog, ModelListing, PublicClient};

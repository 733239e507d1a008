//! Background resolution: requests, negotiation, caching, and the manager that
//! applies resolved variants to a surface.

pub mod cache;
pub mod manager;
pub mod negotiation;
pub mod request;
pub mod resolver;
pub mod surface;
pub mod variant;

pub use cache::{CacheStats, VariantCache};
pub use manager::{BackgroundManager, BackgroundState, UpdateOutcome};
pub use negotiation::{DecodeProbe, FormatNegotiator, ImageCrateProbe, ModernFormats};
pub use request::{AcceptList, ImageFormat, ImageRequest};
pub use resolver::{BackgroundResolver, Resolved, ResolverStats};
pub use surface::{BackgroundSurface, DirectorySurface, Layer, MemorySurface};
pub use variant::{ImageVariant, Legend};

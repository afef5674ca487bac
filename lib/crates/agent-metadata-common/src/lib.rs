pub mod artifact;
pub mod digest;
pub mod oci;
pub mod types;

pub use artifact::{ArtifactDefinition, ArtifactError, ArtifactFormat, OciConfig, is_valid_artifact_name};
pub use digest::{Digest, DigestError};
pub use oci::{Descriptor, ImageIndex, Manifest, Platform};
pub use types::*;

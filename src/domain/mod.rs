mod container;
pub mod suite;
pub mod traits;

pub use container::{BindMount, ContainerSpec, ContainerSummary, NetworkSpec};
pub use suite::{
    MountLayout, ServiceRole, Suite, SuiteNetwork, SuiteService, container_name_from_image,
};
pub use traits::ContainerRuntime;

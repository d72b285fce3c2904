mod cidr;
mod fqdn;
mod network;
mod policy;
mod status;

pub use cidr::*;
pub use fqdn::*;
pub use network::*;
pub use policy::*;
pub use status::*;

pub mod carrier;
pub mod result;
pub mod shipment;
pub mod site;

pub use carrier::*;
pub use result::*;
pub use shipment::*;
pub use site::*;

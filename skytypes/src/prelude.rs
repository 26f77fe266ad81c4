pub use crate::look_angle::LookAngle;
pub use crate::observer::ObserverLocation;
pub use crate::position::EciPosition;
pub use crate::record::CatalogRecord;

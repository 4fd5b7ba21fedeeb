pub mod link;
pub mod scan_event;

pub use link::Entity as LinkEntity;
pub use scan_event::Entity as ScanEventEntity;

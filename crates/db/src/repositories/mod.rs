//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod holiday_item_repo;
pub mod holiday_repo;
pub mod holiday_variant_repo;
pub mod menu_item_repo;
pub mod override_repo;
pub mod post_repo;
pub mod staff_repo;

pub use holiday_item_repo::HolidayItemRepo;
pub use holiday_repo::HolidayRepo;
pub use holiday_variant_repo::HolidayVariantRepo;
pub use menu_item_repo::MenuItemRepo;
pub use override_repo::OverrideRepo;
pub use post_repo::PostRepo;
pub use staff_repo::StaffRepo;

pub mod category;
pub mod listing;
pub mod location;
pub mod price;

pub use category::Category;
pub use listing::*;
pub use location::Location;
pub use price::Price;

mod order;

pub use order::dependency_order;

pub mod customers;
pub mod deliveries;
pub mod locations;
pub mod numbering;
pub mod products;
pub mod stock;
pub mod suppliers;
pub mod users;
pub mod warehouses;

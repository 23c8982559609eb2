pub use super::electricity_prices::Entity as ElectricityPrices;

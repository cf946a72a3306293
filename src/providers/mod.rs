pub mod currency_api;

pub mod dab_constants;

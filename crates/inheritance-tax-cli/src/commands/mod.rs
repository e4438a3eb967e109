pub mod division;
pub mod family;
pub mod tax;

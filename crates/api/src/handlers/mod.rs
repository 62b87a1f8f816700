pub mod admin;
pub mod dashboard;
pub mod locales;
pub mod site;
pub mod workbench;

mod confirm;
mod controls;
mod details;
mod panels;

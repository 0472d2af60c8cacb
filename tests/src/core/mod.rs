mod catalog;
mod decoder;
mod formatter;
mod rename;
